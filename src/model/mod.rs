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

//! Data model and value types for CJSON expressions
//!
//! This module provides the dynamically typed result domain of the
//! interpreter, the CJSON type names used in diagnostics, and the value dump.

#![warn(missing_docs)]

pub mod dump;
pub mod types;
pub mod value;

pub use dump::{dump, dump_single_line};
pub use types::cjson_type_name;
pub use value::{CjsonMap, CjsonValue, ForeignValue, Fragment, FunctionCall, OpaqueValue};
