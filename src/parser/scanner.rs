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

//! Whitespace, comment and separator scanning

use super::interpreter::Interpreter;
use crate::diagnostics::quote_or_name;
use crate::error::EvaluationResult;

/// Separator found between two items of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Separator {
    /// Explicit comma, or a line break acting as one
    Comma,
    /// Colon between a key and its value
    Colon,
    /// The terminator of the listing; the cursor stays on it
    Terminator,
    /// End of the text inside a bracketed listing
    End,
}

/// Unicode whitespace minus the no-break spaces and NEL, plus the ASCII
/// separator controls and the byte order mark
#[inline]
pub(super) fn is_ws(c: char) -> bool {
    match c {
        '\u{FEFF}' | '\u{1C}'..='\u{1F}' => true,
        '\u{85}' | '\u{A0}' | '\u{2007}' | '\u{202F}' => false,
        c => c.is_whitespace(),
    }
}

#[inline]
pub(super) fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Characters an unquoted string, number or function name is made of
#[inline]
pub(super) fn is_unquoted_string_char(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphanumeric() || matches!(c, '$' | '-' | '.' | '@' | '_')
    } else {
        c.is_alphanumeric()
    }
}

const PLUS_OPERATOR_MESSAGE: &str = "The + operator is not supported. (Hint: if you want to \
    break a string into multiple lines, use a quoted string literal, finish the line with \\, \
    then just continue the literal in the next line with optional indentation.";

impl Interpreter<'_> {
    /// Advance past whitespace and comments.
    ///
    /// Returns the first character that is neither, or `None` at the end of
    /// the text. Records whether a line break was crossed in
    /// `found_newline`; line comments count as one, block comments don't.
    pub(super) fn skip_ws(&mut self) -> EvaluationResult<Option<char>> {
        self.found_newline = false;
        while let Some(c) = self.peek() {
            if is_ws(c) {
                if is_line_break(c) {
                    self.found_newline = true;
                }
                self.pos += c.len_utf8();
                continue;
            }
            if c != '/' {
                return Ok(Some(c));
            }
            match self.char_at(self.pos + 1) {
                Some('/') => {
                    self.pos += 2;
                    loop {
                        match self.peek() {
                            None => return Ok(None),
                            Some(c) if is_line_break(c) => {
                                self.found_newline = true;
                                break;
                            }
                            Some(c) => self.pos += c.len_utf8(),
                        }
                    }
                }
                Some('*') => {
                    let comment_start = self.pos;
                    let Some(len) = self.text[self.pos + 2..self.end].find("*/") else {
                        return Err(self.syntax_error_at(
                            "Comment was not closed with \"*/\".",
                            comment_start,
                        ));
                    };
                    self.pos += 2 + len + 2;
                }
                _ => return Ok(Some(c)),
            }
        }
        Ok(None)
    }

    /// Skip the separator after an item of a listing.
    ///
    /// `terminator` is the closing bracket, or `None` for a top-level
    /// listing that ends with the text. `comma_bad` and `colon_bad` reject
    /// the respective separator with the given reason. On return the cursor
    /// is on the next item or on the terminator.
    pub(super) fn skip_separator(
        &mut self,
        terminator: Option<char>,
        comma_bad: Option<&str>,
        colon_bad: Option<&str>,
    ) -> EvaluationResult<Separator> {
        let initial_pos = self.pos;
        let Some(c) = self.skip_ws()? else {
            return Ok(if terminator.is_none() {
                Separator::Terminator
            } else {
                Separator::End
            });
        };

        match c {
            '+' => Err(self.syntax_error(PLUS_OPERATOR_MESSAGE)),
            ',' | ':' => {
                if c == ',' {
                    if let Some(reason) = comma_bad {
                        return Err(self.syntax_error(format!(
                            "Comma (,) shouldn't be used here. {reason}"
                        )));
                    }
                } else if let Some(reason) = colon_bad {
                    return Err(
                        self.syntax_error(format!("Colon (:) shouldn't be used here. {reason}"))
                    );
                }
                self.pos += 1;
                self.skip_ws()?;
                Ok(if c == ',' {
                    Separator::Comma
                } else {
                    Separator::Colon
                })
            }
            c if Some(c) == terminator => Ok(Separator::Terminator),
            ';' => Err(self.syntax_error(
                "Semicolon (;) was unexpected here. If you want to separate items in a \
                 listing then use comma (,) instead.",
            )),
            '=' => Err(self.syntax_error(
                "Equals sign (=) was unexpected here. If you want to associate a key with \
                 a value then use colon (:) instead.",
            )),
            _ if self.found_newline => match comma_bad {
                Some(reason) => Err(self.syntax_error(format!(
                    "Line-break shouldn't be used before this item as separator (which is \
                     the same as using comma). {reason}"
                ))),
                None => Ok(Separator::Comma),
            },
            c if self.pos == initial_pos => Err(self.syntax_error(format!(
                "Character {} shouldn't occur here.",
                quote_or_name(c)
            ))),
            _ => Err(self.syntax_error(
                "No separator was used before the item. Items in listings should be separated \
                 with comma (,) or line-break. Keys and values in maps should be separated \
                 with colon (:).",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(' ', true)]
    #[case('\t', true)]
    #[case('\u{FEFF}', true)]
    #[case('\u{A0}', false)]
    #[case('\u{85}', false)]
    #[case('\u{1F}', true)]
    #[case('x', false)]
    fn test_is_ws(#[case] c: char, #[case] expected: bool) {
        assert_eq!(is_ws(c), expected);
    }

    #[rstest]
    #[case('a', true)]
    #[case('Z', true)]
    #[case('7', true)]
    #[case('$', true)]
    #[case('@', true)]
    #[case('.', true)]
    #[case('-', true)]
    #[case('_', true)]
    #[case('+', false)]
    #[case('#', false)]
    #[case('é', true)]
    #[case('\u{2028}', false)]
    fn test_is_unquoted_string_char(#[case] c: char, #[case] expected: bool) {
        assert_eq!(is_unquoted_string_char(c), expected);
    }
}
