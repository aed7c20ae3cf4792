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

//! Loading CJSON files
//!
//! A CJSON file may name its character encoding in a leading line comment,
//! like `// encoding: ISO-8859-2` or `// charset: windows-1250`. Without such
//! a header the file is read as UTF-8.

use crate::error::LoadError;
use encoding_rs::Encoding;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Labels decoded as ISO-8859-1 proper, mapping each byte to the code point
/// of the same value
const LATIN1_LABELS: &[&str] = &[
    "iso-8859-1",
    "iso8859-1",
    "iso_8859-1",
    "iso_8859_1",
    "iso8859_1",
    "8859_1",
    "latin1",
    "l1",
    "cp819",
    "ibm819",
    "csisolatin1",
];

/// Find the charset named in an `// encoding: ...` or `// charset: ...`
/// header comment.
///
/// The comment must be the first thing in the file, after an optional UTF-8
/// byte order mark and whitespace. The keyword is case-insensitive.
pub fn extract_charset_comment(bytes: &[u8]) -> Option<String> {
    let mut p = 0;
    if bytes.starts_with(UTF8_BOM) {
        p = UTF8_BOM.len();
    }
    while p < bytes.len() && is_latin1_whitespace(bytes[p]) {
        p += 1;
    }

    if !bytes[p..].starts_with(b"//") {
        return None;
    }
    p = skip_blanks(bytes, p + 2);

    let word_start = p;
    while p < bytes.len() && bytes[p].is_ascii_alphabetic() {
        p += 1;
    }
    let word = &bytes[word_start..p];
    if !word.eq_ignore_ascii_case(b"encoding") && !word.eq_ignore_ascii_case(b"charset") {
        return None;
    }

    p = skip_blanks(bytes, p);
    if bytes.get(p) != Some(&b':') {
        return None;
    }
    p = skip_blanks(bytes, p + 1);

    let value_end = bytes[p..]
        .iter()
        .position(|&b| b == b'\n' || b == b'\r')
        .map_or(bytes.len(), |len| p + len);
    let charset: String = bytes[p..value_end].iter().map(|&b| char::from(b)).collect();
    let charset = charset.trim();
    if charset.is_empty() {
        None
    } else {
        Some(charset.to_string())
    }
}

/// Decode the content of a CJSON file, honoring its charset header.
///
/// `source` describes where the bytes came from (usually a path) and is only
/// used in error messages. Malformed sequences are replaced with U+FFFD. A
/// byte order mark is kept; the interpreter treats it as whitespace.
pub fn load_cjson_bytes(bytes: &[u8], source: Option<&str>) -> Result<String, LoadError> {
    let Some(charset) = extract_charset_comment(bytes) else {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    };
    log::debug!(
        "Charset header \"{charset}\" found in {}",
        source.unwrap_or("CJSON text")
    );

    if LATIN1_LABELS
        .iter()
        .any(|label| label.eq_ignore_ascii_case(&charset))
    {
        return Ok(bytes.iter().map(|&b| char::from(b)).collect());
    }

    match Encoding::for_label(charset.as_bytes()) {
        Some(encoding) => {
            let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
            if had_errors {
                log::debug!(
                    "Malformed {} input in {} was replaced",
                    encoding.name(),
                    source.unwrap_or("CJSON text")
                );
            }
            Ok(text.into_owned())
        }
        None => Err(LoadError::UnsupportedEncoding {
            charset,
            source_name: source.map(str::to_string),
        }),
    }
}

/// Read and decode a CJSON file.
pub fn load_cjson_file(path: impl AsRef<Path>) -> Result<String, LoadError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;
    load_cjson_bytes(&bytes, Some(&display))
}

/// Whitespace among the single-byte characters, including the ASCII separator
/// controls
fn is_latin1_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | 0x0B | 0x0C | b'\r' | 0x1C..=0x1F | b' ')
}

fn skip_blanks(bytes: &[u8], mut p: usize) -> usize {
    while p < bytes.len() && is_latin1_whitespace(bytes[p]) && bytes[p] != b'\n' && bytes[p] != b'\r'
    {
        p += 1;
    }
    p
}
