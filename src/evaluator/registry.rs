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

//! Name-based function resolution for CJSON documents

use super::environment::{EvaluationContext, EvaluationEnvironment};
use crate::error::{EnvironmentError, EnvironmentResult};
use crate::model::{CjsonValue, FunctionCall, cjson_type_name};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Arguments handed to a registered function besides its parameters
pub struct FunctionContext<'a> {
    /// Name the function was called with
    pub name: &'a str,
    /// Variables set on the registry
    pub variables: &'a IndexMap<String, CjsonValue>,
    /// The evaluation session the call occurred in
    pub evaluation: &'a EvaluationContext<'a>,
}

/// Signature of a registered CJSON function
pub type CjsonFunction =
    dyn Fn(&[CjsonValue], &FunctionContext<'_>) -> EnvironmentResult<CjsonValue> + Send + Sync;

/// An [`EvaluationEnvironment`] that resolves calls from a table of named
/// closures
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, Arc<CjsonFunction>>,
    variables: IndexMap<String, CjsonValue>,
    allow_unresolved: bool,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("variables", &self.variables)
            .field("allow_unresolved", &self.allow_unresolved)
            .finish()
    }
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with `concat` and `getCustomVariable`
    pub fn with_standard_functions() -> Self {
        let mut registry = Self::new();
        registry.register("concat", concat);
        registry.register("getCustomVariable", get_custom_variable);
        registry
    }

    /// Register a closure-based function, replacing any previous function
    /// with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&[CjsonValue], &FunctionContext<'_>) -> EnvironmentResult<CjsonValue>
            + Send
            + Sync
            + 'static,
    {
        self.functions.insert(name.into(), Arc::new(func));
        self
    }

    /// Set a variable readable through `getCustomVariable`
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<CjsonValue>) -> &mut Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Look up a variable
    pub fn variable(&self, name: &str) -> Option<&CjsonValue> {
        self.variables.get(name)
    }

    /// Whether calls to unknown functions stay in the result tree instead
    /// of failing
    pub fn allow_unresolved(&mut self, allow: bool) -> &mut Self {
        self.allow_unresolved = allow;
        self
    }

    /// Check if a function is registered
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Names of the registered functions, in registration order
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    fn unknown_function(&self, name: &str) -> EnvironmentError {
        let mut names: Vec<&str> = self.function_names().collect();
        names.sort_unstable();
        EnvironmentError::msg(format!(
            "Unknown CJSON function: {name}\nSupported functions are: {}",
            names.join(", ")
        ))
    }
}

impl EvaluationEnvironment for FunctionRegistry {
    fn eval_function_call(
        &mut self,
        call: FunctionCall,
        ctx: &EvaluationContext<'_>,
    ) -> EnvironmentResult<CjsonValue> {
        let Some(func) = self.functions.get(call.name()) else {
            if self.allow_unresolved {
                log::debug!("Leaving call to unknown function {} unresolved", call.name());
                return Ok(CjsonValue::FunctionCall(call));
            }
            return Err(self.unknown_function(call.name()));
        };
        let fctx = FunctionContext {
            name: call.name(),
            variables: &self.variables,
            evaluation: ctx,
        };
        func(call.params(), &fctx)
    }
}

fn concat(params: &[CjsonValue], _ctx: &FunctionContext<'_>) -> EnvironmentResult<CjsonValue> {
    let mut out = String::new();
    for param in params {
        if !param.is_null() {
            out.push_str(&param.to_display_string());
        }
    }
    Ok(CjsonValue::String(out))
}

fn get_custom_variable(
    params: &[CjsonValue],
    ctx: &FunctionContext<'_>,
) -> EnvironmentResult<CjsonValue> {
    if params.len() != 1 {
        return Err(EnvironmentError::msg(format!(
            "CJSON function {}(name) should have 1 arguments, but had {}.",
            ctx.name,
            params.len()
        )));
    }
    let Some(var_name) = params[0].as_str() else {
        return Err(EnvironmentError::msg(format!(
            "CJSON function {}(name) argument should be a string, but was a(n) {}.",
            ctx.name,
            cjson_type_name(&params[0])
        )));
    };
    match ctx.variables.get(var_name) {
        Some(value) if !value.is_null() => Ok(value.clone()),
        _ => Err(EnvironmentError::msg(format!(
            "The custom variable \"{var_name}\" is not set (or was set to null)."
        ))),
    }
}
