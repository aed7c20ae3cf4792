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

//! Recursive-descent evaluation of CJSON text
//!
//! One [`Interpreter`] runs one evaluation session: it owns a cursor into an
//! immutable source text and calls back into the evaluation environment as
//! it goes. Nested evaluation of fragments always uses a fresh session.

use super::literals::unquoted_literal;
use super::scanner::Separator;
use crate::diagnostics::{SourceLocation, quote, quote_or_name};
use crate::error::{EnvironmentError, ErrorKind, EvaluationError, EvaluationResult};
use crate::evaluator::{
    ControlSignal, EvaluationContext, EvaluationEnvironment, EvaluationEvent, EventTarget,
};
use crate::model::{CjsonMap, CjsonValue, Fragment, FunctionCall, cjson_type_name};
use std::sync::Arc;

const FUNCTION_NOT_EVALUABLE: &str =
    "You can't use the function here, because it can't be evaluated in this context.";

/// A single evaluation session over `text[pos..end]`
pub(crate) struct Interpreter<'e> {
    pub(super) text: Arc<str>,
    pub(super) pos: usize,
    pub(super) end: usize,
    pub(super) file_name: Option<Arc<str>>,
    pub(super) found_newline: bool,
    env: &'e mut dyn EvaluationEnvironment,
}

impl<'e> Interpreter<'e> {
    /// Create a session over the whole `text`
    pub(crate) fn new(
        text: Arc<str>,
        file_name: Option<Arc<str>>,
        env: &'e mut dyn EvaluationEnvironment,
    ) -> Self {
        let end = text.len();
        Self {
            text,
            pos: 0,
            end,
            file_name,
            found_newline: false,
            env,
        }
    }

    /// Create a session over the span of a fragment
    pub(crate) fn for_fragment(fragment: &Fragment, env: &'e mut dyn EvaluationEnvironment) -> Self {
        Self {
            text: Arc::clone(fragment.shared_text()),
            pos: fragment.start(),
            end: fragment.end(),
            file_name: fragment.file_name().map(Arc::from),
            found_newline: false,
            env,
        }
    }

    /// Evaluate exactly one expression, surrounded by optional whitespace
    /// and comments.
    pub(crate) fn eval_single(mut self, force_string_values: bool) -> EvaluationResult<CjsonValue> {
        log::debug!(
            "Evaluating CJSON expression{} ({} bytes)",
            self.describe_source(),
            self.end - self.pos
        );
        if self.skip_ws()?.is_none() {
            return Err(self.syntax_error("The text is empty."));
        }
        let value = self.fetch_expression(force_string_values, false)?;
        if self.skip_ws()?.is_some() {
            return Err(self.syntax_error("Extra character(s) after the expression."));
        }
        Ok(value)
    }

    /// Evaluate the text as the inside of a map without the braces.
    pub(crate) fn eval_as_map(mut self, force_string_values: bool) -> EvaluationResult<CjsonMap> {
        log::debug!(
            "Evaluating CJSON map{} ({} bytes)",
            self.describe_source(),
            self.end - self.pos
        );
        let mut map = CjsonMap::new();
        self.notify(EvaluationEvent::EnterMap, None, EventTarget::Map(&mut map), self.pos)?;
        let body = self.fetch_map_inner(&mut map, None, force_string_values);
        self.finish_scope(body, EvaluationEvent::LeaveMap, None, EventTarget::Map(&mut map))?;
        log::debug!("Evaluated CJSON map with {} entries", map.len());
        Ok(map)
    }

    /// Evaluate the text as the inside of a list without the brackets.
    pub(crate) fn eval_as_list(
        mut self,
        force_string_values: bool,
    ) -> EvaluationResult<Vec<CjsonValue>> {
        log::debug!(
            "Evaluating CJSON list{} ({} bytes)",
            self.describe_source(),
            self.end - self.pos
        );
        let mut list = Vec::new();
        self.notify(EvaluationEvent::EnterList, None, EventTarget::List(&mut list), self.pos)?;
        let body = self.fetch_list_inner(&mut list, None, force_string_values);
        self.finish_scope(body, EvaluationEvent::LeaveList, None, EventTarget::List(&mut list))?;
        log::debug!("Evaluated CJSON list with {} items", list.len());
        Ok(list)
    }

    /// Evaluate the expression at the cursor; no whitespace is allowed
    /// before it. The cursor ends up right after the expression.
    fn fetch_expression(&mut self, force_str: bool, map_key: bool) -> EvaluationResult<CjsonValue> {
        let Some(c) = self.peek() else {
            return Err(EvaluationError::internal(
                "fetch_expression called at the end of the text",
            ));
        };

        match c {
            '{' => return self.fetch_map(force_str),
            '[' => return self.fetch_list(force_str),
            '"' | '\'' => return self.fetch_quoted_string(c).map(CjsonValue::String),
            'r' => {
                if let Some(q @ ('"' | '\'')) = self.char_at(self.pos + 1) {
                    return self.fetch_raw_string(q).map(CjsonValue::String);
                }
            }
            _ => {}
        }

        let (start, token_end) = self.scan_unquoted_token()?;
        if self.skip_ws()? == Some('(') {
            let name = self.text[start..token_end].to_string();
            let call = self.fetch_function_call(name, start, force_str)?;
            if map_key {
                return Ok(CjsonValue::FunctionCall(call));
            }
            return self.eval_function_call(call, start);
        }

        self.pos = token_end;
        let token = &self.text[start..token_end];
        if force_str || map_key {
            Ok(CjsonValue::string(token))
        } else {
            Ok(unquoted_literal(token))
        }
    }

    /// `{ ... }`, or a fragment of it if the environment asks so
    fn fetch_map(&mut self, force_str: bool) -> EvaluationResult<CjsonValue> {
        let open = self.pos;
        self.pos += 1;
        let mut map = CjsonMap::new();
        let signal =
            self.notify(EvaluationEvent::EnterMap, None, EventTarget::Map(&mut map), self.pos)?;

        let body = if signal == ControlSignal::Proceed {
            self.fetch_map_inner(&mut map, Some('}'), force_str).map(|()| None)
        } else {
            self.pos = open;
            match self.skip_expression() {
                Ok(()) => {
                    let fragment = self.fragment(open, self.pos);
                    log::debug!("Map at byte {open} kept as fragment ({} bytes)", self.pos - open);
                    self.pos -= 1;
                    Ok(Some(fragment))
                }
                Err(err) => Err(err),
            }
        };
        let fragment =
            self.finish_scope(body, EvaluationEvent::LeaveMap, None, EventTarget::Map(&mut map))?;
        self.pos += 1;

        Ok(match fragment {
            Some(fragment) => CjsonValue::Fragment(fragment),
            None => CjsonValue::Map(map),
        })
    }

    /// `[ ... ]`
    fn fetch_list(&mut self, force_str: bool) -> EvaluationResult<CjsonValue> {
        self.pos += 1;
        let mut list = Vec::new();
        self.notify(EvaluationEvent::EnterList, None, EventTarget::List(&mut list), self.pos)?;
        let body = self.fetch_list_inner(&mut list, Some(']'), force_str);
        self.finish_scope(body, EvaluationEvent::LeaveList, None, EventTarget::List(&mut list))?;
        self.pos += 1;
        Ok(CjsonValue::List(list))
    }

    /// Parameter list of a call; the cursor is on `(`.
    fn fetch_function_call(
        &mut self,
        name: String,
        start: usize,
        force_str: bool,
    ) -> EvaluationResult<FunctionCall> {
        self.pos += 1;
        self.notify(EvaluationEvent::EnterFunctionParams, Some(&name), EventTarget::None, start)?;
        let mut params = Vec::new();
        let body = self.fetch_list_inner(&mut params, Some(')'), force_str);
        self.finish_scope(
            body,
            EvaluationEvent::LeaveFunctionParams,
            Some(&name),
            EventTarget::None,
        )?;
        self.pos += 1;
        Ok(FunctionCall::new(name, params))
    }

    /// Comma or line-break separated expressions up to `terminator`, or up
    /// to the end of the text when it is `None`. The cursor ends up on the
    /// terminator.
    fn fetch_list_inner(
        &mut self,
        list: &mut Vec<CjsonValue>,
        terminator: Option<char>,
        force_str: bool,
    ) -> EvaluationResult<()> {
        let mut list_start = self.pos.saturating_sub(1);
        self.skip_ws()?;
        if terminator.is_none() {
            list_start = self.pos;
        }

        loop {
            match (self.peek(), terminator) {
                (None, None) => return Ok(()),
                (None, Some(t)) => {
                    return Err(self.syntax_error_at(
                        format!(
                            "Reached the end of the text, but the list was not closed with {}.",
                            quote_or_name(t)
                        ),
                        list_start,
                    ));
                }
                (Some(c), _) if Some(c) == terminator => return Ok(()),
                (Some(','), _) => {
                    return Err(self.syntax_error("List item is missing before the comma."));
                }
                _ => {}
            }

            list.push(self.fetch_expression(force_str, false)?);
            let separator =
                self.skip_separator(terminator, None, Some("This is a list, and not a map."))?;
            if separator == Separator::Terminator {
                return Ok(());
            }
        }
    }

    /// Map entries up to `terminator`, or up to the end of the text when it
    /// is `None`. The cursor ends up on the terminator.
    fn fetch_map_inner(
        &mut self,
        map: &mut CjsonMap,
        terminator: Option<char>,
        force_str: bool,
    ) -> EvaluationResult<()> {
        let mut map_start = self.pos.saturating_sub(1);
        self.skip_ws()?;
        if terminator.is_none() {
            map_start = self.pos;
        }

        loop {
            match (self.peek(), terminator) {
                (None, None) => return Ok(()),
                (None, Some(t)) => {
                    return Err(self.syntax_error_at(
                        format!(
                            "Reached the end of the text, but the map was not closed with {}.",
                            quote_or_name(t)
                        ),
                        map_start,
                    ));
                }
                (Some(c), _) if Some(c) == terminator => return Ok(()),
                (Some(','), _) => {
                    return Err(self.syntax_error("Key-value pair is missing before the comma."));
                }
                _ => {}
            }

            let key_pos = self.pos;
            let (key, from_function) = match self.fetch_expression(false, true)? {
                CjsonValue::FunctionCall(call) => (self.eval_function_call(call, key_pos)?, true),
                key => (key, false),
            };

            let separator = self.skip_separator(terminator, None, None)?;
            if separator == Separator::Colon {
                let key = match key {
                    CjsonValue::String(key) => key,
                    CjsonValue::FunctionCall(_) if from_function => {
                        return Err(self.semantic_error_at(FUNCTION_NOT_EVALUABLE, key_pos));
                    }
                    other => {
                        return Err(self.semantic_error_at(
                            format!(
                                "The key must be a String, but it is a(n) {}.",
                                cjson_type_name(&other)
                            ),
                            key_pos,
                        ));
                    }
                };
                if self.at_end() {
                    return Err(self.syntax_error_at(
                        "The key must be followed by a value because colon was used.",
                        key_pos,
                    ));
                }
                self.fetch_map_value(map, key, key_pos, force_str)?;

                let separator = self.skip_separator(
                    terminator,
                    None,
                    Some(
                        "Colon is for separating the key from the value, and the value was \
                         already given previously.",
                    ),
                )?;
                if separator == Separator::Terminator {
                    return Ok(());
                }
                continue;
            }

            match key {
                CjsonValue::String(key) if !from_function => {
                    self.insert_implicit_true(map, key, key_pos)?;
                }
                CjsonValue::Map(merged) => map.extend(merged),
                CjsonValue::FunctionCall(_) if from_function => {
                    return Err(self.semantic_error_at(FUNCTION_NOT_EVALUABLE, key_pos));
                }
                other if from_function => {
                    return Err(self.semantic_error_at(
                        format!(
                            "Function doesn't evaluate to a map, but to {}, so it can't be \
                             merged into the map.",
                            cjson_type_name(&other)
                        ),
                        key_pos,
                    ));
                }
                other => {
                    return Err(self.semantic_error_at(
                        format!(
                            "This expression should be either a string or a map, but it is \
                             a(n) {}.",
                            cjson_type_name(&other)
                        ),
                        key_pos,
                    ));
                }
            }
            if separator == Separator::Terminator {
                return Ok(());
            }
        }
    }

    /// The value after `key:`; the cursor is on its first character.
    fn fetch_map_value(
        &mut self,
        map: &mut CjsonMap,
        key: String,
        key_pos: usize,
        force_str: bool,
    ) -> EvaluationResult<()> {
        let signal =
            self.notify(EvaluationEvent::EnterMapKey, Some(&key), EventTarget::None, key_pos)?;
        let body = match signal {
            ControlSignal::Proceed => self.fetch_expression(force_str, false).map(Some),
            ControlSignal::Skip | ControlSignal::ReturnFragment => {
                let start = self.pos;
                self.skip_expression().map(|()| {
                    (signal == ControlSignal::ReturnFragment)
                        .then(|| CjsonValue::Fragment(self.fragment(start, self.pos)))
                })
            }
        };
        let value = self.finish_scope(
            body,
            EvaluationEvent::LeaveMapKey,
            Some(&key),
            EventTarget::None,
        )?;
        match value {
            Some(value) => {
                map.insert(key, value);
            }
            None => log::trace!("Skipped value of map key {key}"),
        }
        Ok(())
    }

    /// A bare key without value means `key: true`.
    fn insert_implicit_true(
        &mut self,
        map: &mut CjsonMap,
        key: String,
        key_pos: usize,
    ) -> EvaluationResult<()> {
        let signal =
            self.notify(EvaluationEvent::EnterMapKey, Some(&key), EventTarget::None, key_pos)?;
        let keep = signal != ControlSignal::Skip;
        self.finish_scope(Ok(()), EvaluationEvent::LeaveMapKey, Some(&key), EventTarget::None)?;
        if keep {
            map.insert(key, CjsonValue::Boolean(true));
        }
        Ok(())
    }

    fn eval_function_call(&mut self, call: FunctionCall, start: usize) -> EvaluationResult<CjsonValue> {
        let name = call.name().to_string();
        log::trace!("Evaluating function call {name}() at byte {start}");
        let ctx = EvaluationContext::new(&self.text, self.pos, self.file_name.as_ref());
        match self.env.eval_function_call(call, &ctx) {
            Ok(value) => Ok(value),
            Err(EnvironmentError::Evaluation(err)) => Err(err),
            Err(err) => Err(EvaluationError::located(
                ErrorKind::Semantic,
                format!("Failed to evaluate function {}: {err}", quote(&name)),
                self.location(start),
                Some(err),
            )),
        }
    }

    /// Send a notification; failures are reported at `error_pos`.
    fn notify(
        &mut self,
        event: EvaluationEvent,
        name: Option<&str>,
        target: EventTarget<'_>,
        error_pos: usize,
    ) -> EvaluationResult<ControlSignal> {
        log::trace!("{event} {} at byte {}", name.unwrap_or(""), self.pos);
        let ctx = EvaluationContext::new(&self.text, self.pos, self.file_name.as_ref());
        let result = self.env.notify(event, &ctx, name, target);
        result.map_err(|err| self.wrap_environment_error(err, error_pos))
    }

    /// Send the `Leave*` event of a scope whose body produced `body`. The
    /// body's failure wins over a failure of the notification.
    fn finish_scope<T>(
        &mut self,
        body: EvaluationResult<T>,
        event: EvaluationEvent,
        name: Option<&str>,
        target: EventTarget<'_>,
    ) -> EvaluationResult<T> {
        let leave = self.notify(event, name, target, self.pos);
        let value = body?;
        leave?;
        Ok(value)
    }

    fn wrap_environment_error(&self, err: EnvironmentError, pos: usize) -> EvaluationError {
        match err {
            EnvironmentError::Evaluation(err) => err,
            err => EvaluationError::located(
                ErrorKind::Environment,
                err.to_string(),
                self.location(pos),
                Some(err),
            ),
        }
    }

    pub(super) fn fragment(&self, start: usize, end: usize) -> Fragment {
        Fragment::new(Arc::clone(&self.text), start, end, self.file_name.clone())
    }

    pub(super) fn location(&self, pos: usize) -> SourceLocation {
        SourceLocation::new(Arc::clone(&self.text), pos, self.file_name.clone())
    }

    pub(super) fn syntax_error(&self, message: impl Into<String>) -> EvaluationError {
        self.syntax_error_at(message, self.pos)
    }

    pub(super) fn syntax_error_at(&self, message: impl Into<String>, pos: usize) -> EvaluationError {
        EvaluationError::syntax(message, self.location(pos))
    }

    fn semantic_error_at(&self, message: impl Into<String>, pos: usize) -> EvaluationError {
        EvaluationError::semantic(message, self.location(pos))
    }

    fn describe_source(&self) -> String {
        match &self.file_name {
            Some(name) => format!(" from {name}"),
            None => String::new(),
        }
    }

    #[inline]
    pub(super) fn peek(&self) -> Option<char> {
        self.text.get(self.pos..self.end)?.chars().next()
    }

    #[inline]
    pub(super) fn char_at(&self, pos: usize) -> Option<char> {
        self.text.get(pos..self.end)?.chars().next()
    }

    #[inline]
    pub(super) fn at_end(&self) -> bool {
        self.pos >= self.end
    }
}
