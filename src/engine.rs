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

//! CJSON engine - the main entry point for CJSON evaluation

use crate::diagnostics::{DEFAULT_MAX_QUOTE_LENGTH, SnippetFormatter};
use crate::error::{EvaluationError, EvaluationResult, Result};
use crate::evaluator::{EvaluationEnvironment, SimpleEnvironment};
use crate::loader::{load_cjson_bytes, load_cjson_file};
use crate::model::{CjsonMap, CjsonValue, Fragment};
use crate::parser::Interpreter;
use std::path::Path;
use std::sync::Arc;

/// Evaluate `text` as a single CJSON expression.
///
/// Whitespace and comments may surround the expression; anything else
/// after it is an error, and so is an empty text. With
/// `force_string_values`, unquoted `true`, `null`, `123` and alike are
/// strings. `file_name` only appears in error messages.
pub fn eval(
    text: &str,
    env: &mut dyn EvaluationEnvironment,
    force_string_values: bool,
    file_name: Option<&str>,
) -> EvaluationResult<CjsonValue> {
    Interpreter::new(Arc::from(text), file_name.map(Arc::from), env).eval_single(force_string_values)
}

/// Evaluate `text` as the entries of a map, without the enclosing braces.
///
/// An empty text gives an empty map. Entries keep their source order.
pub fn eval_as_map(
    text: &str,
    env: &mut dyn EvaluationEnvironment,
    force_string_values: bool,
    file_name: Option<&str>,
) -> EvaluationResult<CjsonMap> {
    Interpreter::new(Arc::from(text), file_name.map(Arc::from), env).eval_as_map(force_string_values)
}

/// Evaluate `text` as the items of a list, without the enclosing brackets.
///
/// An empty text gives an empty list.
pub fn eval_as_list(
    text: &str,
    env: &mut dyn EvaluationEnvironment,
    force_string_values: bool,
    file_name: Option<&str>,
) -> EvaluationResult<Vec<CjsonValue>> {
    Interpreter::new(Arc::from(text), file_name.map(Arc::from), env)
        .eval_as_list(force_string_values)
}

/// Evaluate a fragment captured earlier as a single expression. Error
/// positions refer to the full text the fragment was taken from.
pub fn eval_fragment(
    fragment: &Fragment,
    env: &mut dyn EvaluationEnvironment,
    force_string_values: bool,
) -> EvaluationResult<CjsonValue> {
    Interpreter::for_fragment(fragment, env).eval_single(force_string_values)
}

/// Options of a [`CjsonEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalOptions {
    /// Treat unquoted `true`, `false`, `null` and numbers as strings
    pub force_string_values: bool,

    /// Name shown in error messages; file-based methods default to the path
    pub file_name: Option<String>,

    /// Width budget of the source line quoted by [`CjsonEngine::render_error`]
    pub max_quote_length: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            force_string_values: false,
            file_name: None,
            max_quote_length: DEFAULT_MAX_QUOTE_LENGTH,
        }
    }
}

impl EvalOptions {
    /// Set whether unquoted values are forced to be strings
    pub fn with_force_string_values(mut self, force: bool) -> Self {
        self.force_string_values = force;
        self
    }

    /// Set the name shown in error messages
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the width budget of quoted source lines
    pub fn with_max_quote_length(mut self, max_quote_length: usize) -> Self {
        self.max_quote_length = max_quote_length;
        self
    }
}

/// Main CJSON engine: evaluation options plus the environment that
/// resolves function calls
pub struct CjsonEngine {
    options: EvalOptions,
    env: Box<dyn EvaluationEnvironment>,
}

impl Default for CjsonEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CjsonEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CjsonEngine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CjsonEngine {
    /// Create an engine that leaves function calls unresolved
    pub fn new() -> Self {
        Self {
            options: EvalOptions::default(),
            env: Box::new(SimpleEnvironment),
        }
    }

    /// Use `env` for function calls and notifications
    pub fn with_environment(mut self, env: impl EvaluationEnvironment + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Replace the options
    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options
    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// Mutable access to the options
    pub fn options_mut(&mut self) -> &mut EvalOptions {
        &mut self.options
    }

    /// The environment, e.g. to inspect what it collected
    pub fn environment_mut(&mut self) -> &mut dyn EvaluationEnvironment {
        self.env.as_mut()
    }

    /// Evaluate a single expression
    pub fn eval(&mut self, text: &str) -> EvaluationResult<CjsonValue> {
        let file_name = self.options.file_name.as_deref();
        eval(text, self.env.as_mut(), self.options.force_string_values, file_name)
    }

    /// Evaluate map entries without enclosing braces
    pub fn eval_as_map(&mut self, text: &str) -> EvaluationResult<CjsonMap> {
        let file_name = self.options.file_name.as_deref();
        eval_as_map(text, self.env.as_mut(), self.options.force_string_values, file_name)
    }

    /// Evaluate list items without enclosing brackets
    pub fn eval_as_list(&mut self, text: &str) -> EvaluationResult<Vec<CjsonValue>> {
        let file_name = self.options.file_name.as_deref();
        eval_as_list(text, self.env.as_mut(), self.options.force_string_values, file_name)
    }

    /// Evaluate a fragment captured earlier
    pub fn eval_fragment(&mut self, fragment: &Fragment) -> EvaluationResult<CjsonValue> {
        eval_fragment(fragment, self.env.as_mut(), self.options.force_string_values)
    }

    /// Decode bytes with the charset header logic and evaluate them as map
    /// entries
    pub fn eval_as_map_bytes(&mut self, bytes: &[u8], source: Option<&str>) -> Result<CjsonMap> {
        let text = load_cjson_bytes(bytes, source)?;
        let file_name = self.options.file_name.as_deref().or(source);
        Ok(eval_as_map(
            &text,
            self.env.as_mut(),
            self.options.force_string_values,
            file_name,
        )?)
    }

    /// Load a file and evaluate it as map entries
    pub fn eval_as_map_file(&mut self, path: impl AsRef<Path>) -> Result<CjsonMap> {
        let path = path.as_ref();
        let text = load_cjson_file(path)?;
        let file_name = self.file_name_for(path);
        Ok(eval_as_map(
            &text,
            self.env.as_mut(),
            self.options.force_string_values,
            Some(&file_name),
        )?)
    }

    /// Load a file and evaluate it as list items
    pub fn eval_as_list_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<CjsonValue>> {
        let path = path.as_ref();
        let text = load_cjson_file(path)?;
        let file_name = self.file_name_for(path);
        Ok(eval_as_list(
            &text,
            self.env.as_mut(),
            self.options.force_string_values,
            Some(&file_name),
        )?)
    }

    /// Load a file and evaluate it as a single expression
    pub fn eval_file(&mut self, path: impl AsRef<Path>) -> Result<CjsonValue> {
        let path = path.as_ref();
        let text = load_cjson_file(path)?;
        let file_name = self.file_name_for(path);
        Ok(eval(
            &text,
            self.env.as_mut(),
            self.options.force_string_values,
            Some(&file_name),
        )?)
    }

    /// Render an error with this engine's quoting width
    pub fn render_error(&self, error: &EvaluationError) -> String {
        let formatter = SnippetFormatter::new().with_max_quote_length(self.options.max_quote_length);
        error.render_with(&formatter)
    }

    fn file_name_for(&self, path: &Path) -> String {
        self.options
            .file_name
            .clone()
            .unwrap_or_else(|| path.display().to_string())
    }
}
