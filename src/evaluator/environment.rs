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

//! Evaluation environment protocol
//!
//! The interpreter calls back into an [`EvaluationEnvironment`] to resolve
//! function calls and to report structural entry and exit points. The host
//! can veto the evaluation of map values or whole maps by answering a
//! notification with a [`ControlSignal`].

use crate::diagnostics::SourceLocation;
use crate::error::EnvironmentResult;
use crate::model::{CjsonMap, CjsonValue, Fragment, FunctionCall};
use std::fmt;
use std::sync::Arc;

/// Structural points the environment is notified about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluationEvent {
    /// Before the value of a map entry is evaluated; the name is the key
    EnterMapKey,
    /// After the value of a map entry was evaluated or skipped
    LeaveMapKey,
    /// Before the parameters of a function call are evaluated; the name is
    /// the function name
    EnterFunctionParams,
    /// After the parameters of a function call were evaluated
    LeaveFunctionParams,
    /// After `[`; the target is the list being built
    EnterList,
    /// At `]` or at the end of a top-level list
    LeaveList,
    /// After `{`; the target is the map being built
    EnterMap,
    /// At `}` or at the end of a top-level map
    LeaveMap,
}

impl EvaluationEvent {
    /// Whether this event opens a scope
    pub fn is_enter(self) -> bool {
        matches!(
            self,
            EvaluationEvent::EnterMapKey
                | EvaluationEvent::EnterFunctionParams
                | EvaluationEvent::EnterList
                | EvaluationEvent::EnterMap
        )
    }
}

impl fmt::Display for EvaluationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvaluationEvent::EnterMapKey => "ENTER_MAP_KEY",
            EvaluationEvent::LeaveMapKey => "LEAVE_MAP_KEY",
            EvaluationEvent::EnterFunctionParams => "ENTER_FUNCTION_PARAMS",
            EvaluationEvent::LeaveFunctionParams => "LEAVE_FUNCTION_PARAMS",
            EvaluationEvent::EnterList => "ENTER_LIST",
            EvaluationEvent::LeaveList => "LEAVE_LIST",
            EvaluationEvent::EnterMap => "ENTER_MAP",
            EvaluationEvent::LeaveMap => "LEAVE_MAP",
        };
        f.write_str(name)
    }
}

/// Answer of the environment to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlSignal {
    /// Continue with normal evaluation
    #[default]
    Proceed,
    /// Drop the current map entry without evaluating its value; only
    /// meaningful at [`EvaluationEvent::EnterMapKey`]
    Skip,
    /// Store the un-evaluated source of the value as a [`Fragment`]; only
    /// meaningful at [`EvaluationEvent::EnterMapKey`] and
    /// [`EvaluationEvent::EnterMap`]
    ReturnFragment,
}

/// The live container a notification refers to
#[derive(Debug)]
pub enum EventTarget<'a> {
    /// The event has no container
    None,
    /// The map being built; can be inspected or modified in place
    Map(&'a mut CjsonMap),
    /// The list being built; can be inspected or modified in place
    List(&'a mut Vec<CjsonValue>),
}

/// Read-only view of the evaluation session passed to environment callbacks
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    text: &'a Arc<str>,
    position: usize,
    file_name: Option<&'a Arc<str>>,
}

impl<'a> EvaluationContext<'a> {
    pub(crate) fn new(text: &'a Arc<str>, position: usize, file_name: Option<&'a Arc<str>>) -> Self {
        Self {
            text,
            position,
            file_name,
        }
    }

    /// Byte offset of the interpreter cursor
    pub fn position(&self) -> usize {
        self.position
    }

    /// The whole source text of the session
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// File name used in error messages
    pub fn file_name(&self) -> Option<&'a str> {
        self.file_name.map(|name| &**name)
    }

    /// Location of the cursor, for building located errors
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(Arc::clone(self.text), self.position, self.file_name.cloned())
    }

    /// Capture the `[start, end)` byte range of the source text
    pub fn fragment(&self, start: usize, end: usize) -> Fragment {
        Fragment::new(Arc::clone(self.text), start, end, self.file_name.cloned())
    }
}

/// Callbacks the interpreter uses to resolve function calls and to report
/// its progress
///
/// Both methods have defaults, so an environment only implements what it
/// needs. Any error returned is reported at the current source position.
pub trait EvaluationEnvironment {
    /// Resolve a function call found in value position (or a call used as
    /// a map key). Returning the call unchanged leaves it unresolved in the
    /// result tree.
    fn eval_function_call(
        &mut self,
        call: FunctionCall,
        ctx: &EvaluationContext<'_>,
    ) -> EnvironmentResult<CjsonValue> {
        let _ = ctx;
        Ok(CjsonValue::FunctionCall(call))
    }

    /// Called at each [`EvaluationEvent`]. Every `Enter*` event is matched
    /// by a `Leave*` event unless the `Enter*` callback failed.
    fn notify(
        &mut self,
        event: EvaluationEvent,
        ctx: &EvaluationContext<'_>,
        name: Option<&str>,
        target: EventTarget<'_>,
    ) -> EnvironmentResult<ControlSignal> {
        let _ = (event, ctx, name, target);
        Ok(ControlSignal::Proceed)
    }
}

impl<T: EvaluationEnvironment + ?Sized> EvaluationEnvironment for &mut T {
    fn eval_function_call(
        &mut self,
        call: FunctionCall,
        ctx: &EvaluationContext<'_>,
    ) -> EnvironmentResult<CjsonValue> {
        (**self).eval_function_call(call, ctx)
    }

    fn notify(
        &mut self,
        event: EvaluationEvent,
        ctx: &EvaluationContext<'_>,
        name: Option<&str>,
        target: EventTarget<'_>,
    ) -> EnvironmentResult<ControlSignal> {
        (**self).notify(event, ctx, name, target)
    }
}

impl<T: EvaluationEnvironment + ?Sized> EvaluationEnvironment for Box<T> {
    fn eval_function_call(
        &mut self,
        call: FunctionCall,
        ctx: &EvaluationContext<'_>,
    ) -> EnvironmentResult<CjsonValue> {
        (**self).eval_function_call(call, ctx)
    }

    fn notify(
        &mut self,
        event: EvaluationEvent,
        ctx: &EvaluationContext<'_>,
        name: Option<&str>,
        target: EventTarget<'_>,
    ) -> EnvironmentResult<ControlSignal> {
        (**self).notify(event, ctx, name, target)
    }
}

/// Environment that leaves every function call unresolved and never
/// interferes with evaluation
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleEnvironment;

impl EvaluationEnvironment for SimpleEnvironment {}
