//! Remote shell scripts for dump and restore
//!
//! Scripts are plain POSIX `sh`. The connection URI is resolved on the
//! remote side from the configured variables, first non-empty wins.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use shared::TransferConfig;
use std::io::{self, Read, Write};

/// Printed by the restore script only after a successful restore
pub const RESTORE_SENTINEL: &str = "__DBTRANSFER_RESTORE_OK__";

/// Exit code used when no connection variable is set remotely
pub const EXIT_NO_URI: i32 = 64;

/// Exit code used when the embedded payload cannot be decoded
pub const EXIT_BAD_PAYLOAD: i32 = 65;

/// Raw bytes per encoded line; 57 bytes encode to exactly 76 characters
const BYTES_PER_LINE: usize = 57;

/// Quote a value for `sh` using single quotes
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// `${A:-${B:-}}` chain over the URI variables
fn uri_expansion(variables: &[String]) -> String {
    let mut expr = String::new();
    for var in variables.iter().rev() {
        expr = format!("${{{}:-{}}}", var, expr);
    }
    expr
}

fn uri_resolution(config: &TransferConfig) -> String {
    format!(
        "uri=\"{}\"\nif [ -z \"$uri\" ]; then echo \"none of {} is set in the service environment\" >&2; exit {}; fi\n",
        uri_expansion(&config.uri_variables),
        config.uri_variables.join(", "),
        EXIT_NO_URI
    )
}

/// Script that writes the archive of the configured database to stdout
pub fn dump_script(config: &TransferConfig) -> String {
    let mut script = String::from("set -u\n");
    script.push_str(&uri_resolution(config));
    script.push_str(&format!(
        "exec {} --uri=\"$uri\" --db={} --archive --quiet\n",
        config.dump_program,
        shell_quote(config.database())
    ));
    script
}

/// Encode `input` as base64 lines of 76 characters into `output`
pub fn encode_payload<R: Read, W: Write>(mut input: R, mut output: W) -> io::Result<u64> {
    let mut buf = vec![0u8; BYTES_PER_LINE * 1024];
    let mut pending = Vec::with_capacity(BYTES_PER_LINE);
    let mut total = 0u64;

    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        total += n as u64;
        pending.extend_from_slice(&buf[..n]);

        let whole = pending.len() - pending.len() % BYTES_PER_LINE;
        for line in pending[..whole].chunks(BYTES_PER_LINE) {
            output.write_all(STANDARD.encode(line).as_bytes())?;
            output.write_all(b"\n")?;
        }
        pending.drain(..whole);
    }

    if !pending.is_empty() {
        output.write_all(STANDARD.encode(&pending).as_bytes())?;
        output.write_all(b"\n")?;
    }
    output.flush()?;
    Ok(total)
}

/// Parameters of one remote restore
#[derive(Debug, Clone)]
pub struct RestoreScript<'a> {
    /// Remote path of the decoded archive
    pub remote_path: &'a str,
    /// Heredoc delimiter; must not occur as a line in `payload`
    pub delimiter: &'a str,
    /// Base64 text, one line per 76 characters
    pub payload: &'a str,
    /// Database the archive was dumped from
    pub source_database: &'a str,
    pub drop_existing: bool,
}

impl RestoreScript<'_> {
    /// Render the full script: decode, report size, restore, always remove the temp file
    pub fn render(&self, config: &TransferConfig) -> String {
        let mut script = String::with_capacity(self.payload.len() + 1024);
        script.push_str("set -u\n");
        script.push_str(&format!("tmp={}\n", shell_quote(self.remote_path)));
        script.push_str("trap 'rm -f \"$tmp\"' EXIT HUP INT TERM\n");
        script.push_str(&format!("base64 -d > \"$tmp\" <<'{}'\n", self.delimiter));
        script.push_str(self.payload);
        if !self.payload.is_empty() && !self.payload.ends_with('\n') {
            script.push('\n');
        }
        script.push_str(self.delimiter);
        script.push('\n');
        script.push_str(&format!(
            "if [ $? -ne 0 ]; then echo \"could not decode archive payload\" >&2; exit {}; fi\n",
            EXIT_BAD_PAYLOAD
        ));
        script.push_str("echo \"remote archive: $(wc -c < \"$tmp\" | tr -d ' ') bytes\"\n");
        script.push_str(&uri_resolution(config));

        let drop = if self.drop_existing { " --drop" } else { "" };
        script.push_str(&format!(
            "{} --uri=\"$uri\" {} --archive=\"$tmp\"{}\n",
            config.restore_program,
            namespace_args(self.source_database, config.database()),
            drop
        ));
        script.push_str("status=$?\n");
        script.push_str(&format!(
            "if [ $status -eq 0 ]; then echo {}; fi\n",
            RESTORE_SENTINEL
        ));
        script.push_str("exit $status\n");
        script
    }
}

/// Restore only the source database's namespaces, renamed onto the target
pub fn namespace_args(source: &str, target: &str) -> String {
    let include = shell_quote(&format!("{}.*", source));
    if source == target {
        format!("--nsInclude={}", include)
    } else {
        format!(
            "--nsInclude={} --nsFrom={} --nsTo={}",
            include,
            include,
            shell_quote(&format!("{}.*", target))
        )
    }
}

/// Whether the restore script reported completion
pub fn restore_completed(stdout: &[u8]) -> bool {
    String::from_utf8_lossy(stdout)
        .lines()
        .any(|line| line.trim() == RESTORE_SENTINEL)
}

/// Remote output with the sentinel line removed, for display
pub fn strip_sentinel(text: &str) -> String {
    text.lines()
        .filter(|line| line.trim() != RESTORE_SENTINEL)
        .collect::<Vec<_>>()
        .join("\n")
}
