//! Preconditions shared by every remote invocation

use crate::confirm::Confirmer;
use crate::workflow::TransferWorkflow;
use audit::{Stage, TransferJournal};
use gateway::{RemoteSession, ToolingStatus};
use shared::{Result, TransferError, WrongServiceSelectedError};
use tracing::{info, warn};

impl<S: RemoteSession + ?Sized, C: Confirmer + ?Sized> TransferWorkflow<'_, S, C> {
    /// Tooling and service binding gates; returns the bound service name
    pub(crate) fn preflight(&self, journal: &mut TransferJournal) -> Result<String> {
        journal.enter(Stage::ToolingCheck);
        self.check_tooling()?;

        journal.enter(Stage::ServiceBindingCheck);
        self.check_service_binding()
    }

    fn check_tooling(&self) -> Result<()> {
        let program = self.session.program().to_string();
        self.reporter.step(&format!("Checking {} CLI", program));
        match self.session.check_tooling() {
            ToolingStatus::Ready => Ok(()),
            ToolingStatus::Missing => Err(TransferError::ToolingMissing { program }),
            ToolingStatus::NotAuthenticated => Err(TransferError::NotAuthenticated { program }),
        }
    }

    /// The selected service must exist and must not be the database host itself
    fn check_service_binding(&self) -> Result<String> {
        let selected = self.session.selected_service()?;

        let usable = selected
            .as_deref()
            .filter(|name| !self.config.is_database_service(name));

        match usable {
            Some(service) => {
                info!(service, database = self.config.database(), "service binding ok");
                self.reporter.success(&format!(
                    "Service '{}', database '{}'",
                    service,
                    self.config.database()
                ));
                Ok(service.to_string())
            }
            None => {
                let available = self.session.available_services().unwrap_or_else(|e| {
                    warn!(error = %e, "could not list services");
                    Vec::new()
                });
                Err(WrongServiceSelectedError {
                    selected,
                    available,
                    select_command: self.session.select_command(),
                }
                .into())
            }
        }
    }
}
