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

//! Evaluation environment: the host side of CJSON evaluation
//!
//! This module provides the callback protocol the interpreter drives while
//! evaluating, plus two ready-made environments: [`SimpleEnvironment`],
//! which resolves nothing, and [`FunctionRegistry`], which resolves calls
//! from named closures.

#![warn(missing_docs)]

mod environment;
mod registry;

pub use environment::{
    ControlSignal, EvaluationContext, EvaluationEnvironment, EvaluationEvent, EventTarget,
    SimpleEnvironment,
};
pub use registry::{CjsonFunction, FunctionContext, FunctionRegistry};
