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

//! qsapy Transpiler Library
//!
//! This library turns QS scripts, given as the XML syntax tree produced by
//! the QS front end, into Python modules running on the `qsa` runtime.
//!
//! # Modules
//!
//! - [`error`] - Error types and error reporting
//! - [`lexer`] - Tokenization of the XML input
//! - [`parser`] - Parsing tokens into a syntax tree
//! - [`ast`] - Syntax tree nodes and path queries
//! - [`symbols`] - Identifier rewriting and scopes
//! - [`codegen`] - Python code generation (event stream)
//! - [`output`] - Rendering, formatting and file writing
//! - [`driver`] - Templates, entry points and batch conversion
//!
//! # Example
//!
//! ```no_run
//! use qsapy::{codegen, output, parser};
//!
//! fn transpile(xml: &str) -> Result<String, Box<dyn std::error::Error>> {
//!     // Parse
//!     let tree = parser::parse_document(xml)?;
//!
//!     // Generate events
//!     let events = codegen::generate(&tree, true);
//!
//!     // Render Python text
//!     Ok(output::render(&events))
//! }
//! ```

pub mod ast;
pub mod codegen;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod symbols;

// Re-export commonly used types
pub use ast::Node;
pub use driver::{pythonize, pythonize_str, transpile_tree, TranspileOptions};
pub use error::{format_error, ErrorCode, Result, SourceLocation, Span, TranspileError};
pub use lexer::Token;

/// The version of the transpiler.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the transpiler.
pub const NAME: &str = "qsapy";

/// Transpile an XML syntax tree into a Python module.
///
/// Uses the default options except that the output is not run through
/// `black`, so the result does not depend on the host.
///
/// # Example
///
/// ```
/// let python = qsapy::transpile("<Source/>").unwrap();
/// assert!(python.contains("class FormInternalObj(qsa.FormDBWidget):"));
/// ```
pub fn transpile(source: &str) -> Result<String> {
    let options = TranspileOptions {
        format: false,
        ..TranspileOptions::default()
    };
    pythonize_str(source, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "qsapy");
    }

    #[test]
    fn test_transpile_reports_malformed_input() {
        let err = transpile("<Source><If></Source>").unwrap_err();
        assert_eq!(err.code, ErrorCode::MismatchedClosingTag);
    }
}
