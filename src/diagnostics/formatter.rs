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

//! Formatting located errors as a message followed by a quoted source line
//! and a caret marker

use super::location::{LineMap, SourceLocation, char_index};
use super::quote::expand_tabs;

/// Default width budget for the quoted source line
pub const DEFAULT_MAX_QUOTE_LENGTH: usize = 56;

/// Default distance of tab stops when quoting source lines
pub const DEFAULT_TAB_WIDTH: usize = 8;

const LINE_BREAK: &str = "\n";
const ELLIPSIS: &str = "...";

/// Renders an error message with the location it refers to:
///
/// ```text
/// CJSON syntax error: Unexpected character.
/// Error location: line 2, column 5 in settings.cjson:
/// foo: }
///      ^
/// ```
#[derive(Debug, Clone)]
pub struct SnippetFormatter {
    max_quote_length: usize,
    tab_width: usize,
    #[cfg(feature = "terminal")]
    use_color: bool,
}

impl Default for SnippetFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SnippetFormatter {
    /// Create a formatter with the default quoting width and tab stops
    pub fn new() -> Self {
        Self {
            max_quote_length: DEFAULT_MAX_QUOTE_LENGTH,
            tab_width: DEFAULT_TAB_WIDTH,
            #[cfg(feature = "terminal")]
            use_color: false,
        }
    }

    /// Set the width budget of the quoted source line
    pub fn with_max_quote_length(mut self, max_quote_length: usize) -> Self {
        self.max_quote_length = max_quote_length;
        self
    }

    /// Set the distance of tab stops
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    /// Set whether to use color (terminal feature only)
    #[cfg(feature = "terminal")]
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Format `message` followed by the description of `location`.
    pub fn format(&self, message: &str, location: &SourceLocation) -> String {
        let text = location.text();
        let source_name = location.file_name().unwrap_or("the text");

        if location.offset() >= text.len() {
            return if location.offset() == text.len() {
                format!("{message}{LINE_BREAK}Error location: The very end of {source_name}.")
            } else {
                format!("{message}{LINE_BREAK}Error location: ??? (after the end of {source_name})")
            };
        }

        let map = LineMap::new(text);
        let Some(row) = map.locate_char(char_index(text, location.offset())) else {
            return format!("{message}{LINE_BREAK}Error location: The very end of {source_name}.");
        };

        let mut out = String::with_capacity(message.len() + 80);
        out.push_str(message);
        out.push_str(LINE_BREAK);
        out.push_str(&format!("Error location: {}", row.position));
        if let Some(file_name) = location.file_name() {
            out.push_str(" in ");
            out.push_str(file_name);
        }
        out.push(':');
        out.push_str(LINE_BREAK);

        if row.begin >= row.end {
            out.push_str("(Can't show the line because it is empty.)");
            return out;
        }

        let chars = map.chars();
        let before: String = chars[row.begin..row.index].iter().collect();
        let after: String = chars[row.index..row.end].iter().collect();
        let (before, after) = self.fit_quote(before, after);

        out.push_str(&before);
        out.push_str(&after);
        out.push_str(LINE_BREAK);
        out.extend(std::iter::repeat_n(' ', before.chars().count()));
        out.push_str(&self.caret());
        out
    }

    /// Expand tabs and shorten the two halves of the quoted line so that
    /// they fit the width budget, keeping the part next to the caret.
    fn fit_quote(&self, before: String, after: String) -> (String, String) {
        let mut before = expand_tabs(&before, self.tab_width, 0);
        let len_before = before.chars().count();
        let mut after = expand_tabs(&after, self.tab_width, len_before);
        let mut len_after = after.chars().count();
        let max = self.max_quote_length;

        if len_before + len_after > max {
            let new_len_after = len_after
                .saturating_sub(len_before + len_after - max)
                .max(6);
            if new_len_after < len_after {
                let kept: String = after.chars().take(new_len_after - ELLIPSIS.len()).collect();
                after = format!("{kept}{ELLIPSIS}");
                len_after = new_len_after;
            }
            if len_before + len_after > max {
                let skip = (len_before + len_after - max + ELLIPSIS.len()).min(len_before);
                let kept: String = before.chars().skip(skip).collect();
                before = format!("{ELLIPSIS}{kept}");
            }
        }
        (before, after)
    }

    fn caret(&self) -> String {
        #[cfg(feature = "terminal")]
        if self.use_color {
            use colored::Colorize;
            return "^".red().bold().to_string();
        }
        "^".to_string()
    }
}

/// Format with the default settings.
pub fn format_source_error(message: &str, location: &SourceLocation) -> String {
    SnippetFormatter::new().format(message, location)
}
