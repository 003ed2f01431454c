//! Outcome classification for remote calls

use regex::bytes::{RegexSet, RegexSetBuilder};

/// Case-insensitive scanner for error transcripts in captured output
#[derive(Debug, Clone)]
pub struct FailureMarkers {
    markers: Vec<String>,
    patterns: RegexSet,
}

impl FailureMarkers {
    /// Build a scanner from literal substrings
    pub fn new<I, S>(markers: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers: Vec<String> = markers
            .into_iter()
            .map(|m| m.as_ref().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if markers.is_empty() {
            return Err(crate::TransferError::Config("no failure markers configured".to_string()));
        }

        let patterns = RegexSetBuilder::new(markers.iter().map(|m| regex::escape(m)))
            .case_insensitive(true)
            .unicode(false)
            .build()
            .map_err(|e| crate::TransferError::Config(format!("invalid failure marker: {}", e)))?;

        Ok(Self { markers, patterns })
    }

    /// First configured marker that occurs anywhere in `content`
    pub fn find(&self, content: &[u8]) -> Option<&str> {
        let index = self.patterns.matches(content).iter().next()?;
        self.markers.get(index).map(|m| m.as_str())
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

/// Tri-state result of a remote attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Reported success, but the output is an error transcript
    SoftFailure { marker: String },
    /// Reported a non-zero exit (`None` when killed by a signal)
    HardFailure { exit_code: Option<i32> },
}

impl Outcome {
    /// Classify by exit status first, then by content
    pub fn classify(success: bool, exit_code: Option<i32>, content: &[u8], markers: &FailureMarkers) -> Self {
        if !success {
            return Outcome::HardFailure { exit_code };
        }
        match markers.find(content) {
            Some(marker) => Outcome::SoftFailure {
                marker: marker.to_string(),
            },
            None => Outcome::Success,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_markers() -> FailureMarkers {
        FailureMarkers::new(["error", "failed", "not found"]).unwrap()
    }

    #[test]
    fn test_markers_case_insensitive() {
        let markers = default_markers();
        assert_eq!(markers.find(b"Error: connection refused"), Some("error"));
        assert_eq!(markers.find(b"database NOT FOUND"), Some("not found"));
        assert_eq!(markers.find(b"Failed to authenticate"), Some("failed"));
        assert_eq!(markers.find(b"clean output"), None);
    }

    #[test]
    fn test_markers_scan_binary_content() {
        let markers = default_markers();
        let mut content = vec![0x6d, 0xe2, 0x99, 0x81, 0xff, 0x00];
        assert_eq!(markers.find(&content), None);

        content.extend_from_slice(b"\x00ERROR\x00");
        assert_eq!(markers.find(&content), Some("error"));
    }

    #[test]
    fn test_markers_escape_regex_syntax() {
        let markers = FailureMarkers::new(["exit(1)"]).unwrap();
        assert_eq!(markers.find(b"process exit(1)"), Some("exit(1)"));
        assert_eq!(markers.find(b"exit1"), None);
    }

    #[test]
    fn test_markers_require_at_least_one() {
        assert!(FailureMarkers::new(Vec::<String>::new()).is_err());
        assert!(FailureMarkers::new([""]).is_err());
    }

    // ============== Classification ==============

    #[test]
    fn test_classify_hard_failure_wins() {
        let outcome = Outcome::classify(false, Some(2), b"archive bytes", &default_markers());
        assert_eq!(outcome, Outcome::HardFailure { exit_code: Some(2) });
    }

    #[test]
    fn test_classify_soft_failure() {
        let outcome = Outcome::classify(true, Some(0), b"Error: connection refused", &default_markers());
        assert_eq!(
            outcome,
            Outcome::SoftFailure {
                marker: "error".to_string()
            }
        );
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_classify_success() {
        let outcome = Outcome::classify(true, Some(0), &[0x6d, 0xe2, 0x99, 0x81], &default_markers());
        assert!(outcome.is_success());
    }
}
