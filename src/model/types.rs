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

//! CJSON type names used in diagnostics

use super::value::CjsonValue;

/// Returns the name of the type of a value according to the CJSON language.
///
/// These are the names used in error messages such as
/// `The key must be a String, but it is a(n) list.`
pub fn cjson_type_name(value: &CjsonValue) -> &str {
    match value {
        CjsonValue::Null => "null",
        CjsonValue::Boolean(_) => "boolean",
        CjsonValue::Integer(_) => "int",
        CjsonValue::Long(_) => "long",
        CjsonValue::Decimal(_) | CjsonValue::BigDecimal(_) => "big-decimal",
        CjsonValue::String(_) => "string",
        CjsonValue::List(_) => "list",
        CjsonValue::Map(_) => "map",
        CjsonValue::FunctionCall(_) => "function call",
        CjsonValue::Fragment(_) => "fragment",
        CjsonValue::Foreign(foreign) => foreign.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CjsonMap, FunctionCall, OpaqueValue};
    use bigdecimal::BigDecimal;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    #[test]
    fn test_type_names() {
        assert_eq!(cjson_type_name(&CjsonValue::Null), "null");
        assert_eq!(cjson_type_name(&CjsonValue::Integer(1)), "int");
        assert_eq!(cjson_type_name(&CjsonValue::Long(1)), "long");
        assert_eq!(
            cjson_type_name(&CjsonValue::Decimal(Decimal::new(15, 1))),
            "big-decimal"
        );
        assert_eq!(
            cjson_type_name(&CjsonValue::BigDecimal(BigDecimal::from(7))),
            "big-decimal"
        );
        assert_eq!(cjson_type_name(&CjsonValue::Map(CjsonMap::new())), "map");
        assert_eq!(
            cjson_type_name(&CjsonValue::FunctionCall(FunctionCall::new("f", vec![]))),
            "function call"
        );
        assert_eq!(
            cjson_type_name(&CjsonValue::Foreign(Arc::new(OpaqueValue::new("Path", "/")))),
            "Path"
        );
    }
}
