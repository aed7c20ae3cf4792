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

//! CJSON interpreter in Rust
//!
//! CJSON is a JSON superset for configuration files: it allows comments,
//! unquoted strings and keys, line breaks instead of commas, raw strings,
//! bare keys meaning `true`, map merging, and function calls resolved by a
//! host-supplied [`EvaluationEnvironment`].
//!
//! ```
//! use octofhir_cjson::{CjsonValue, SimpleEnvironment, eval_as_map};
//!
//! let map = eval_as_map("name: demo, ports: [80, 443]", &mut SimpleEnvironment, false, None)?;
//! assert_eq!(map["name"], CjsonValue::string("demo"));
//! # Ok::<(), octofhir_cjson::EvaluationError>(())
//! ```

pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod model;
mod parser;

// Re-export main types
pub use diagnostics::{Position, SnippetFormatter, SourceLocation};
pub use engine::{CjsonEngine, EvalOptions, eval, eval_as_list, eval_as_map, eval_fragment};
pub use error::{
    CjsonError, EnvironmentError, EnvironmentResult, ErrorKind, EvaluationError, EvaluationResult,
    LoadError, Result,
};
pub use evaluator::{
    CjsonFunction, ControlSignal, EvaluationContext, EvaluationEnvironment, EvaluationEvent,
    EventTarget, FunctionContext, FunctionRegistry, SimpleEnvironment,
};
pub use loader::{extract_charset_comment, load_cjson_bytes, load_cjson_file};
pub use model::{
    CjsonMap, CjsonValue, ForeignValue, Fragment, FunctionCall, OpaqueValue, cjson_type_name,
    dump, dump_single_line,
};
