//! Reporting a failed training job to the platform.
//!
//! The platform surfaces the contents of `<output_dir>/failure` as the job's
//! failure reason and treats a non-zero exit status as a failed job.

use crate::error::TrainingError;
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit status of a failed training job.
pub const FAILURE_EXIT_CODE: u8 = 255;

/// Name of the failure artifact inside the output directory.
pub const FAILURE_FILENAME: &str = "failure";

/// Formatted description of a training failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureReport {
    message: String,
}

impl FailureReport {
    /// Formats `err` and its chain of causes.
    pub fn new(err: &TrainingError) -> Self {
        let mut message = format!("Exception during training: {}\n", err);
        let mut cause = err.source();
        while let Some(e) = cause {
            message.push_str(&format!("Caused by: {}\n", e));
            cause = e.source();
        }
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Writes the report to `<output_dir>/failure`, creating the directory
    /// if needed. Returns the path written.
    pub fn write_to(&self, output_dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(FAILURE_FILENAME);
        fs::write(&path, &self.message)?;
        Ok(path)
    }

    /// Writes the artifact, echoes the report on stderr and returns the
    /// failure exit status. A failure to write the artifact is logged and
    /// does not change the status.
    pub fn emit(&self, output_dir: &Path) -> ExitCode {
        match self.write_to(output_dir) {
            Ok(path) => log::debug!("failure written to {}", path.display()),
            Err(e) => log::error!(
                "could not write failure file to {}: {}",
                output_dir.display(),
                e
            ),
        }
        eprint!("{}", self.message);
        ExitCode::from(FAILURE_EXIT_CODE)
    }
}
