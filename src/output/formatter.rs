// qsapy - A transpiler turning QS script syntax trees into Python source
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! External formatter integration (`black`).

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

/// Formatter binary looked up on `PATH`.
const BLACK_BINARY: &str = "black";

/// Maximum line length passed to the formatter.
pub const LINE_LENGTH: u32 = 120;

/// Errors that can occur while running the external formatter.
#[derive(Debug, Error)]
pub enum FormatterError {
    /// The formatter is not installed.
    #[error("black not found on PATH")]
    NotFound,

    /// The formatter could not be started or fed.
    #[error("Failed to run black: {0}")]
    Io(#[from] io::Error),

    /// The formatter rejected the input.
    #[error("black exited with {status}: {stderr}")]
    Rejected { status: i32, stderr: String },

    /// The formatter produced something that is not text.
    #[error("black produced invalid UTF-8")]
    InvalidOutput,
}

/// Find the formatter on the system.
pub fn find_black() -> Option<PathBuf> {
    which::which(BLACK_BINARY).ok()
}

/// Pipe `code` through the formatter at `black`.
pub fn run_black(black: &Path, code: &str) -> Result<String, FormatterError> {
    let mut child = Command::new(black)
        .args(["--quiet", "--fast", "--line-length"])
        .arg(LINE_LENGTH.to_string())
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(code.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(FormatterError::Rejected {
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    String::from_utf8(output.stdout).map_err(|_| FormatterError::InvalidOutput)
}

/// Format `code` with black if it is installed.
///
/// Errors are logged and the input is returned unchanged.
pub fn format_python(code: &str) -> String {
    if code.is_empty() {
        return String::new();
    }
    let result = find_black()
        .ok_or(FormatterError::NotFound)
        .and_then(|black| run_black(&black, code));
    match result {
        // Unchanged input comes back as is.
        Ok(formatted) if !formatted.is_empty() => formatted,
        Ok(_) => code.to_string(),
        Err(err) => {
            tracing::debug!("formatter skipped: {}", err);
            code.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary() {
        let err = run_black(Path::new("/nonexistent/black"), "x = 1\n").unwrap_err();
        assert!(matches!(err, FormatterError::Io(_)));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_python(""), "");
    }

    #[test]
    fn test_format_keeps_valid_code() {
        // With or without black installed the statement survives.
        let formatted = format_python("x = 1\n");
        assert!(formatted.contains("x = 1"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FormatterError::NotFound.to_string(), "black not found on PATH");
        let rejected = FormatterError::Rejected {
            status: 123,
            stderr: "cannot parse".into(),
        };
        assert_eq!(rejected.to_string(), "black exited with 123: cannot parse");
    }
}
