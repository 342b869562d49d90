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

//! Handler trace file.
//!
//! Records which handler produced which event, one line per record, as
//! `NNNN<indent>Handler: text`. The sink is shared between batch workers;
//! every record is written under the lock so lines never interleave.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// A write-serialised destination for trace records.
pub struct TraceSink {
    inner: Mutex<TraceState>,
}

struct TraceState {
    writer: Box<dyn Write + Send>,
    records: usize,
}

impl TraceSink {
    /// Create (truncate) a trace file.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }

    /// Trace into any writer.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(TraceState {
                writer: Box::new(writer),
                records: 0,
            }),
        }
    }

    /// Write one record.
    pub fn record(&self, depth: usize, handler: &str, text: &str) {
        let Ok(mut state) = self.inner.lock() else {
            return;
        };
        state.records += 1;
        let line = format!(
            "{:04}{}{}: {}\n",
            state.records,
            " ".repeat(depth + 1),
            handler,
            text.replace('\n', " ")
        );
        if let Err(err) = state.writer.write_all(line.as_bytes()) {
            tracing::debug!("trace write failed: {}", err);
        }
    }

    /// Flush buffered records.
    pub fn flush(&self) -> io::Result<()> {
        match self.inner.lock() {
            Ok(mut state) => state.writer.flush(),
            Err(_) => Ok(()),
        }
    }
}

impl std::fmt::Debug for TraceSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceSink").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_records_are_numbered() {
        let buffer = SharedBuffer::default();
        let sink = TraceSink::from_writer(buffer.clone());
        sink.record(0, "Source", "begin-gen");
        sink.record(2, "Identifier", "expr: x");
        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text, "0001 Source: begin-gen\n0002   Identifier: expr: x\n");
    }
}
