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

//! CJSON interpreter
//!
//! This module evaluates CJSON text in a single pass, without building a
//! syntax tree first. The grammar is a superset of JSON: comments, unquoted
//! strings and keys, line breaks as separators, raw strings, extra string
//! escapes, bare keys meaning `true`, map merging, and function calls that
//! are resolved by the evaluation environment.

mod interpreter;
mod literals;
mod scanner;
mod skip;

pub(crate) use interpreter::Interpreter;
