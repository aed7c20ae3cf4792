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

//! Value dump: CJSON-like rendering of value trees for diagnostics
//!
//! The output is valid CJSON for trees made of scalars, lists and maps, so
//! evaluating a dump yields an equal tree. Unresolved function calls,
//! fragments and foreign values are rendered readably but not re-evaluable.

use super::value::{CjsonMap, CjsonValue, big_decimal_text};
use crate::diagnostics::quote::quote;

const LINE_BREAK: &str = "\n";
const INDENT: &str = "    ";

/// Multi-line dump with 4-space indentation.
pub fn dump(value: &CjsonValue) -> String {
    let mut out = String::new();
    dump_value(&mut out, value, "");
    out
}

/// Compact single-line dump, e.g. `{"a":1, "b":[2, 3]}`.
pub fn dump_single_line(value: &CjsonValue) -> String {
    let mut out = String::new();
    dump_value_single_line(&mut out, value);
    out
}

fn dump_value(out: &mut String, value: &CjsonValue, indent: &str) {
    match value {
        CjsonValue::Map(map) => {
            out.push('{');
            out.push_str(LINE_BREAK);
            dump_map(out, map, &format!("{indent}{INDENT}"));
            out.push_str(indent);
            out.push('}');
        }
        CjsonValue::List(items) => {
            out.push('[');
            out.push_str(LINE_BREAK);
            let inner = format!("{indent}{INDENT}");
            for item in items {
                out.push_str(&inner);
                dump_value(out, item, &inner);
                out.push_str(LINE_BREAK);
            }
            out.push_str(indent);
            out.push(']');
        }
        other => dump_scalar(out, other),
    }
}

fn dump_map(out: &mut String, map: &CjsonMap, indent: &str) {
    for (key, value) in map {
        out.push_str(indent);
        out.push_str(&quote(key));
        out.push_str(": ");
        dump_value(out, value, indent);
        out.push_str(LINE_BREAK);
    }
}

fn dump_value_single_line(out: &mut String, value: &CjsonValue) {
    match value {
        CjsonValue::Map(map) => {
            out.push('{');
            for (i, (key, value)) in map.iter().enumerate() {
                if i != 0 {
                    out.push_str(", ");
                }
                out.push_str(&quote(key));
                out.push(':');
                dump_value_single_line(out, value);
            }
            out.push('}');
        }
        CjsonValue::List(items) => {
            out.push('[');
            dump_list_single_line(out, items);
            out.push(']');
        }
        other => dump_scalar(out, other),
    }
}

fn dump_list_single_line(out: &mut String, items: &[CjsonValue]) {
    for (i, item) in items.iter().enumerate() {
        if i != 0 {
            out.push_str(", ");
        }
        dump_value_single_line(out, item);
    }
}

/// Everything but maps and lists looks the same in both dump styles.
fn dump_scalar(out: &mut String, value: &CjsonValue) {
    match value {
        CjsonValue::Null => out.push_str("null"),
        CjsonValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        CjsonValue::Integer(i) => out.push_str(&i.to_string()),
        CjsonValue::Long(l) => out.push_str(&l.to_string()),
        CjsonValue::Decimal(d) => out.push_str(&d.to_string()),
        CjsonValue::BigDecimal(d) => out.push_str(&big_decimal_text(d)),
        CjsonValue::String(s) => out.push_str(&quote(s)),
        CjsonValue::FunctionCall(call) => {
            out.push_str(call.name());
            out.push('(');
            dump_list_single_line(out, call.params());
            out.push(')');
        }
        CjsonValue::Fragment(fragment) => {
            out.push_str("<fragment ");
            out.push_str(&quote(fragment.as_str()));
            out.push('>');
        }
        CjsonValue::Foreign(foreign) => {
            out.push('<');
            out.push_str(foreign.type_name());
            out.push(' ');
            out.push_str(&quote(&foreign.to_string()));
            out.push('>');
        }
        CjsonValue::Map(_) | CjsonValue::List(_) => dump_value_single_line(out, value),
    }
}
