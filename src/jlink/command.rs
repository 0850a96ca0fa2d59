//! Typed jlink invocation

use crate::error::{JlinkError, JlinkResult};
use crate::platform::Endian;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Max number of output lines kept in link error messages
const ERROR_TAIL_LINES: usize = 50;

/// Last `ERROR_TAIL_LINES` lines of a tool's combined output
pub(crate) fn error_output_tail(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].join("\n")
}

/// One jlink run
#[derive(Debug, Clone)]
pub struct JlinkCommand {
    pub executable: PathBuf,
    pub module_path: OsString,
    pub modules: Vec<String>,
    pub endian: Endian,
    pub compress: String,
    pub strip_debug: bool,
    pub output: PathBuf,
}

impl JlinkCommand {
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            format!("--compress={}", self.compress).into(),
            "--no-header-files".into(),
            "--no-man-pages".into(),
        ];
        if self.strip_debug {
            args.push("--strip-debug".into());
        }
        args.extend([
            "--endian".into(),
            self.endian.as_str().into(),
            "--module-path".into(),
            self.module_path.clone(),
            "--add-modules".into(),
            self.modules.join(",").into(),
            "--output".into(),
            self.output.clone().into_os_string(),
        ]);
        args
    }

    /// Run jlink, failing with its output tail on a non-zero exit
    pub async fn run(&self) -> JlinkResult<()> {
        let args = self.args();
        debug!("Executing: {} {:?}", self.executable.display(), args);

        let output = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                JlinkError::link_failed(format!(
                    "could not launch {}: {}",
                    self.executable.display(),
                    e
                ))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(JlinkError::LinkFailed {
            reason: format!("jlink exited with {}", output.status),
            output: error_output_tail(&stdout, &stderr),
        })
    }
}
