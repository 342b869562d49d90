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

//! Output module for the qsapy transpiler.
//!
//! This module turns the event stream into Python text:
//! - Rendering with indentation and spacing
//! - Optional formatting with `black`
//! - Writing the result to disk

mod formatter;
mod render;

pub use formatter::{find_black, format_python, run_black, FormatterError, LINE_LENGTH};
pub use render::{render, Renderer};

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, TranspileError};

/// Write rendered Python to a file.
pub fn write_file(text: &str, path: &Path) -> Result<()> {
    let mut file = File::create(path).map_err(|e| TranspileError::write(path, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| TranspileError::write(path, e))?;
    Ok(())
}
