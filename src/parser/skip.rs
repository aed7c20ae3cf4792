// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Skipping expressions without evaluating them
//!
//! Used when the environment asks for a fragment instead of a value. The
//! skipped text only has to be well-bracketed and properly quoted; anything
//! else inside it is tolerated, including dump-style `<...>` groups.

use super::interpreter::Interpreter;
use crate::diagnostics::quote_or_name;
use crate::error::{EvaluationError, EvaluationResult};

impl Interpreter<'_> {
    /// Move the cursor past one expression starting at the cursor.
    pub(super) fn skip_expression(&mut self) -> EvaluationResult<()> {
        let Some(c) = self.peek() else {
            return Err(EvaluationError::internal(
                "skip_expression called at the end of the text",
            ));
        };

        let closing = match c {
            '{' => Some('}'),
            '[' => Some(']'),
            '<' => Some('>'),
            '(' => Some(')'),
            _ => None,
        };
        if let Some(closing) = closing {
            self.pos += 1;
            self.skip_listing(closing)?;
            self.pos += 1;
            return Ok(());
        }

        let start = self.pos;
        if c == '"' || c == '\'' {
            self.pos += 1;
            while let Some(c2) = self.peek() {
                self.pos += c2.len_utf8();
                if c2 == '\\' {
                    if let Some(escaped) = self.peek() {
                        self.pos += escaped.len_utf8();
                    }
                } else if c2 == c {
                    return Ok(());
                }
            }
            return Err(self.missing_quote(c, start));
        }

        if c == 'r' {
            if let Some(q @ ('"' | '\'')) = self.char_at(self.pos + 1) {
                self.fetch_raw_string(q)?;
                return Ok(());
            }
        }

        let (_, token_end) = self.scan_unquoted_token()?;
        if self.skip_ws()? == Some('(') {
            self.pos += 1;
            self.skip_listing(')')?;
            self.pos += 1;
        } else {
            self.pos = token_end;
        }
        Ok(())
    }

    /// Skip the items of a bracketed listing; the cursor ends up on
    /// `terminator`.
    fn skip_listing(&mut self, terminator: char) -> EvaluationResult<()> {
        let listing_start = self.pos - 1;
        self.skip_ws()?;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.syntax_error_at(
                    format!(
                        "Reached the end of the text, but the closing {} is missing.",
                        quote_or_name(terminator)
                    ),
                    listing_start,
                ));
            };
            if c == terminator {
                return Ok(());
            }
            if matches!(c, ',' | ':' | ';' | '=') {
                self.pos += 1;
            } else {
                self.skip_expression()?;
            }
            if self.skip_ws()? == Some(terminator) {
                return Ok(());
            }
        }
    }
}
