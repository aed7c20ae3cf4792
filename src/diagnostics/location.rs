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

//! Source location tracking for error reporting

use std::fmt;
use std::sync::Arc;

/// 1-based line and column of a character in a source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, counted in characters, tabs not expanded)
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A byte offset into a source text, together with the text itself and the
/// optional file name it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    text: Arc<str>,
    offset: usize,
    file_name: Option<Arc<str>>,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(text: Arc<str>, offset: usize, file_name: Option<Arc<str>>) -> Self {
        Self {
            text,
            offset,
            file_name,
        }
    }

    /// The full source text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset into the text
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// File name used in messages, if any
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Line and column of the offset; `None` at or after the end of the text
    pub fn position(&self) -> Option<Position> {
        if self.offset >= self.text.len() {
            return None;
        }
        LineMap::new(&self.text)
            .locate_char(char_index(&self.text, self.offset))
            .map(|row| row.position)
    }
}

/// The line that contains a located character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Row {
    /// Line and column of the character
    pub position: Position,
    /// Char index of the first character of the line
    pub begin: usize,
    /// Char index one past the last character of the line (line break excluded)
    pub end: usize,
    /// Char index of the located character, moved back onto the line if it
    /// pointed into a CR-LF line break
    pub index: usize,
}

/// Char-indexed view of a source text for line/column computations.
///
/// A line break is `\n`, or `\r` not followed by `\n`.
pub(crate) struct LineMap {
    chars: Vec<char>,
}

impl LineMap {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }

    pub(crate) fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Locate a char index; `None` if it isn't inside the text.
    pub(crate) fn locate_char(&self, index: usize) -> Option<Row> {
        let ln = self.chars.len();
        if index >= ln {
            return None;
        }

        let mut begin = 0;
        let mut line = 1;
        let mut last = '\0';
        for (i, &c) in self.chars[..=index].iter().enumerate() {
            if last == '\n' || (last == '\r' && c != '\n') {
                begin = i;
                line += 1;
            }
            last = c;
        }

        let mut i = index;
        while i < ln {
            let c = self.chars[i];
            if c == '\n' || c == '\r' {
                if c == '\n' && i > 0 && self.chars[i - 1] == '\r' {
                    i -= 1;
                }
                break;
            }
            i += 1;
        }
        let end = i;
        let index = index.min(end);

        Some(Row {
            position: Position::new(line, index - begin + 1),
            begin,
            end,
            index,
        })
    }
}

/// Convert a byte offset to a char index. Offsets inside a multi-byte
/// character resolve to that character.
pub(crate) fn char_index(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    text[..offset].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_of(text: &str, offset: usize) -> Option<Position> {
        SourceLocation::new(Arc::from(text), offset, None).position()
    }

    #[test]
    fn test_first_line() {
        assert_eq!(position_of("abc", 0), Some(Position::new(1, 1)));
        assert_eq!(position_of("abc", 2), Some(Position::new(1, 3)));
    }

    #[test]
    fn test_line_breaks() {
        let text = "a\nbc\r\nd\re";
        assert_eq!(position_of(text, 3), Some(Position::new(2, 2)));
        assert_eq!(position_of(text, 6), Some(Position::new(3, 1)));
        assert_eq!(position_of(text, 8), Some(Position::new(4, 1)));
    }

    #[test]
    fn test_columns_count_characters() {
        assert_eq!(position_of("éé x", 5), Some(Position::new(1, 4)));
    }

    #[test]
    fn test_end_of_text_has_no_position() {
        assert_eq!(position_of("abc", 3), None);
        assert_eq!(position_of("abc", 30), None);
    }
}
