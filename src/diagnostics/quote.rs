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

//! Quoting helpers shared by error messages and the value dump

use std::fmt::Write;

/// Quote a string as a double-quoted literal.
///
/// Backslash, quotation mark and the control characters `\n \r \t \b \f` get
/// their usual escapes; other characters below U+0020 are written as
/// `\u00XX`. The result can be read back by the CJSON string syntax.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Quote a single character for an error message.
///
/// Quotation characters are referred to by name, since quoting them would be
/// hard to read: `'"'` becomes `"quotation mark"`.
pub fn quote_or_name(c: char) -> String {
    match c {
        '\\' => "'\\\\'".to_string(),
        '\'' => "\"apostrophe-quote\"".to_string(),
        '"' => "\"quotation mark\"".to_string(),
        '\n' => "'\\n'".to_string(),
        '\r' => "'\\r'".to_string(),
        '\t' => "'\\t'".to_string(),
        '\u{8}' => "'\\b'".to_string(),
        '\u{c}' => "'\\f'".to_string(),
        c if (c as u32) < 0x20 => format!("'\\u{:04x}'", c as u32),
        c => format!("'{c}'"),
    }
}

/// Replace tab characters with spaces, assuming tab stops every `tab_width`
/// columns and that `text` starts at column `start_col` (0-based).
pub fn expand_tabs(text: &str, tab_width: usize, start_col: usize) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    let tab_width = tab_width.max(1);
    let mut out = String::with_capacity(text.len() + 16);
    let mut col = start_col;
    for c in text.chars() {
        if c == '\t' {
            let spaces = tab_width * (1 + col / tab_width) - col;
            out.extend(std::iter::repeat_n(' ', spaces));
            col += spaces;
        } else {
            out.push(c);
            col += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(quote("l1\nl2\t"), "\"l1\\nl2\\t\"");
        assert_eq!(quote("\u{1}"), "\"\\u0001\"");
        assert_eq!(quote("ünï"), "\"ünï\"");
    }

    #[test]
    fn test_quote_or_name() {
        assert_eq!(quote_or_name('}'), "'}'");
        assert_eq!(quote_or_name('"'), "\"quotation mark\"");
        assert_eq!(quote_or_name('\''), "\"apostrophe-quote\"");
        assert_eq!(quote_or_name('\n'), "'\\n'");
        assert_eq!(quote_or_name('\u{1b}'), "'\\u001b'");
    }

    #[test]
    fn test_expand_tabs() {
        assert_eq!(expand_tabs("a\tb", 8, 0), "a       b");
        assert_eq!(expand_tabs("\tx", 8, 3), "     x");
        assert_eq!(expand_tabs("no tabs", 8, 0), "no tabs");
    }
}
