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

//! Event stream to indented Python text.

use std::collections::HashMap;

use crate::codegen::{py_repr_list, Event};

/// One indentation level.
const INDENT: &str = "    ";

/// Lines at one depth after which a blank separator line is inserted.
const LINES_PER_PARAGRAPH: usize = 4;

/// Block kinds followed by a blank line when closed.
const SPACED_BLOCKS: &[&str] = &["class", "def", "else", "except"];

/// Renders events into text, keeping the block stack.
#[derive(Debug, Default)]
pub struct Renderer {
    out: String,
    stack: Vec<String>,
    last_line_for_indent: HashMap<usize, usize>,
    numline: usize,
    last_was_begin: bool,
}

impl Renderer {
    /// Create an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current block depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn write_line(&mut self, text: &str) {
        let line = format!("{}{}", INDENT.repeat(self.stack.len()), text);
        self.out.push_str(line.trim_end());
        self.out.push('\n');
    }

    fn code_line(&mut self, text: &str) {
        self.numline += 1;
        let depth = self.stack.len();
        let since_last = self
            .last_line_for_indent
            .get(&depth)
            .map_or(0, |last| self.numline - last);
        if since_last > LINES_PER_PARAGRAPH {
            self.out.push('\n');
        }
        self.last_line_for_indent.insert(depth, self.numline);
        self.write_line(text);
    }

    fn end_block(&mut self, label: &str) {
        if self.last_was_begin {
            self.write_line("pass");
            self.last_line_for_indent.insert(self.stack.len(), self.numline);
        }

        match self.stack.pop() {
            Some(open) if open == label => {}
            open => {
                let expected = open.unwrap_or_else(|| "(none)".to_string());
                let message = format!(
                    "# END-ERROR!! was {} but {} found. ({})",
                    expected,
                    label,
                    py_repr_list(&self.stack)
                );
                self.write_line(&message);
            }
        }

        if label
            .split('-')
            .nth(1)
            .is_some_and(|kind| SPACED_BLOCKS.contains(&kind))
        {
            self.out.push('\n');
            self.last_line_for_indent.insert(self.stack.len(), self.numline);
        }
    }

    /// Render one event.
    pub fn push(&mut self, event: &Event) {
        match event {
            // A break nobody intercepted is still a break.
            Event::Line(text) | Event::Break(text) => self.code_line(text),
            Event::Debug(text) => {
                let text = format!("# DEBUG:: {}", text.replace('\n', " "));
                self.write_line(&text);
            }
            Event::Expr(text) => self.write_line(&format!("# EXPR??:: {}", text)),
            Event::LineAfter(text) => self.write_line(&format!("# LINE+1??:: {}", text)),
            Event::Begin(label) => {
                self.stack.push(label.clone());
                self.last_line_for_indent.insert(self.stack.len(), self.numline);
            }
            Event::End(label) => self.end_block(label),
        }
        self.last_was_begin = matches!(event, Event::Begin(_));
    }

    /// The rendered text.
    pub fn finish(self) -> String {
        self.out
    }
}

/// Render a whole event stream.
pub fn render<'a>(events: impl IntoIterator<Item = &'a Event>) -> String {
    let mut renderer = Renderer::new();
    for event in events {
        renderer.push(event);
    }
    renderer.finish()
}
