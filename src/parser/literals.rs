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

//! Literal scanning: quoted strings, raw strings, unquoted tokens and numbers

use super::interpreter::Interpreter;
use super::scanner::{is_line_break, is_unquoted_string_char, is_ws};
use crate::diagnostics::quote_or_name;
use crate::error::{EvaluationError, EvaluationResult};
use crate::model::CjsonValue;
use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::BigInt;
use rust_decimal::Decimal;

/// Largest scale a `rust_decimal::Decimal` can carry
const MAX_DECIMAL_SCALE: i64 = 28;

/// Longest digit run that still fits an `i128` mantissa
const MAX_MANTISSA_DIGITS: usize = 38;

impl Interpreter<'_> {
    /// Read a `"..."` or `'...'` literal starting at the cursor, processing
    /// escapes. The cursor ends up after the closing quote.
    pub(super) fn fetch_quoted_string(&mut self, quote: char) -> EvaluationResult<String> {
        let start = self.pos;
        self.pos += quote.len_utf8();

        let mut out = String::new();
        let mut chunk_start = self.pos;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.missing_quote(quote, start));
            };
            if c == quote {
                out.push_str(&self.text[chunk_start..self.pos]);
                self.pos += c.len_utf8();
                return Ok(out);
            }
            if c != '\\' {
                self.pos += c.len_utf8();
                continue;
            }

            out.push_str(&self.text[chunk_start..self.pos]);
            let escape_pos = self.pos;
            let Some(escaped) = self.char_at(escape_pos + 1) else {
                return Err(self.missing_quote(quote, start));
            };
            self.pos = escape_pos + 1 + escaped.len_utf8();
            match escaped {
                '"' | '\'' | '\\' | '{' | '/' => out.push(escaped),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'f' => out.push('\u{c}'),
                'b' => out.push('\u{8}'),
                'g' => out.push('>'),
                'l' => out.push('<'),
                'a' => out.push('&'),
                'x' | 'u' => out.push(self.fetch_hex_escape(escape_pos)?),
                c if is_ws(c) => self.skip_line_continuation(c, escape_pos)?,
                other => {
                    return Err(self.syntax_error_at(
                        format!("Invalid escape sequence \\{other} in the string literal."),
                        escape_pos,
                    ));
                }
            }
            chunk_start = self.pos;
        }
    }

    /// Read the 1 to 4 hexadecimal digits of a `\x` or `\u` escape.
    fn fetch_hex_escape(&mut self, escape_pos: usize) -> EvaluationResult<char> {
        let digits_start = self.pos;
        let mut code = 0u32;
        while self.pos - digits_start < 4 {
            let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) else {
                break;
            };
            code = code * 16 + digit;
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(self.syntax_error_at(
                "Invalid hexadecimal UNICODE escape in the string literal.",
                escape_pos,
            ));
        }
        char::from_u32(code).ok_or_else(|| {
            self.syntax_error_at(
                format!(
                    "Invalid hexadecimal UNICODE escape in the string literal. \
                     U+{code:04X} is a surrogate code point, which can't stand alone."
                ),
                escape_pos,
            )
        })
    }

    /// `\` followed by whitespace: drop whitespace up to and including the
    /// next line break, then the indentation of the following line.
    fn skip_line_continuation(&mut self, first: char, escape_pos: usize) -> EvaluationResult<()> {
        let mut found_break = false;
        let mut c = first;
        let mut at = escape_pos + 1;
        loop {
            if is_line_break(c) {
                if found_break {
                    break;
                }
                found_break = true;
                if c == '\r' && self.char_at(at + 1) == Some('\n') {
                    at += 1;
                }
            }
            at += c.len_utf8();
            match self.char_at(at) {
                Some(next) if is_ws(next) => c = next,
                _ => break,
            }
        }
        if !found_break {
            return Err(self.syntax_error_at(
                "Invalid usage of escape sequence \\white-space. This escape sequence can be \
                 used only before line-break.",
                escape_pos,
            ));
        }
        self.pos = at;
        Ok(())
    }

    /// Read an `r"..."` or `r'...'` literal; its content is taken verbatim.
    pub(super) fn fetch_raw_string(&mut self, quote: char) -> EvaluationResult<String> {
        let start = self.pos;
        let content_start = start + 1 + quote.len_utf8();
        match self.text[content_start..self.end].find(quote) {
            Some(len) => {
                self.pos = content_start + len + quote.len_utf8();
                Ok(self.text[content_start..content_start + len].to_string())
            }
            None => {
                self.pos = self.end;
                Err(self.missing_quote(quote, start))
            }
        }
    }

    /// Advance over an unquoted token and return its byte range. A single
    /// `+` is allowed as the first character.
    pub(super) fn scan_unquoted_token(&mut self) -> EvaluationResult<(usize, usize)> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_unquoted_string_char(c) && !(self.pos == start && c == '+') {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == start {
            return Err(self.syntax_error_at("Unexpected character.", start));
        }
        Ok((start, self.pos))
    }

    pub(super) fn missing_quote(&self, quote: char, start: usize) -> EvaluationError {
        self.syntax_error_at(
            format!(
                "The closing {} of the string is missing.",
                quote_or_name(quote)
            ),
            start,
        )
    }
}

/// Interpret an unquoted token in value position: `true`, `false`, `null`,
/// a number, or otherwise the token itself as a string.
pub(super) fn unquoted_literal(token: &str) -> CjsonValue {
    match token {
        "true" => return CjsonValue::Boolean(true),
        "false" => return CjsonValue::Boolean(false),
        "null" => return CjsonValue::Null,
        _ => {}
    }

    if token.starts_with(|c: char| c.is_ascii_digit() || c == '+' || c == '-') {
        let number = token.strip_prefix('+').unwrap_or(token);
        if let Ok(i) = number.parse::<i32>() {
            return CjsonValue::Integer(i);
        }
        if let Some(parts) = DecimalParts::split(number) {
            if let Some(d) = parts.to_decimal() {
                return CjsonValue::Decimal(d);
            }
            if let Some(d) = parts.to_big_decimal() {
                log::trace!("Number {token} is out of the 96-bit decimal range");
                return CjsonValue::BigDecimal(d);
            }
        }
    }
    CjsonValue::String(token.to_string())
}

/// Components of a number written as
/// `[+-]?(digits[.digits?]|.digits)([eE][+-]?digits)?`
#[derive(Debug, PartialEq)]
struct DecimalParts<'a> {
    negative: bool,
    int_digits: &'a str,
    frac_digits: &'a str,
    exponent: i64,
}

impl<'a> DecimalParts<'a> {
    fn split(s: &'a str) -> Option<Self> {
        let (negative, rest) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        let (mantissa, exponent) = match rest.find(['e', 'E']) {
            Some(i) => (&rest[..i], rest[i + 1..].parse::<i64>().ok()?),
            None => (rest, 0),
        };
        let (int_digits, frac_digits) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_digits.is_empty() && frac_digits.is_empty())
            || !all_digits(int_digits)
            || !all_digits(frac_digits)
        {
            return None;
        }
        Some(Self {
            negative,
            int_digits,
            frac_digits,
            exponent,
        })
    }

    fn to_decimal(&self) -> Option<Decimal> {
        let mut scale = (self.frac_digits.len() as i64).checked_sub(self.exponent)?;
        let mut digits = format!("{}{}", self.int_digits, self.frac_digits);
        if scale < 0 {
            let zeros = usize::try_from(-scale).ok()?;
            if zeros > MAX_MANTISSA_DIGITS {
                return None;
            }
            digits.extend(std::iter::repeat_n('0', zeros));
            scale = 0;
        }

        let significant = digits.trim_start_matches('0');
        let mut mantissa: i128 = if significant.is_empty() {
            0
        } else if significant.len() > MAX_MANTISSA_DIGITS {
            return None;
        } else {
            significant.parse().ok()?
        };

        while scale > MAX_DECIMAL_SCALE && mantissa % 10 == 0 {
            if mantissa == 0 {
                scale = MAX_DECIMAL_SCALE;
                break;
            }
            mantissa /= 10;
            scale -= 1;
        }
        if scale > MAX_DECIMAL_SCALE {
            return None;
        }
        if self.negative {
            mantissa = -mantissa;
        }
        Decimal::try_from_i128_with_scale(mantissa, u32::try_from(scale).ok()?).ok()
    }

    fn to_big_decimal(&self) -> Option<BigDecimal> {
        let scale = (self.frac_digits.len() as i64).checked_sub(self.exponent)?;
        let digits = format!("{}{}", self.int_digits, self.frac_digits);
        let mut mantissa = BigInt::parse_bytes(digits.as_bytes(), 10)?;
        if self.negative {
            mantissa = -mantissa;
        }
        Some(BigDecimal::new(mantissa, scale))
    }
}
