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

//! Error types for CJSON evaluation
//!
//! This module defines the error types used throughout the interpreter, the
//! evaluation environment protocol and the file loader.

use crate::diagnostics::{Position, SnippetFormatter, SourceLocation};
use std::sync::Arc;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = std::result::Result<T, EvaluationError>;

/// Result type for evaluation environment callbacks
pub type EnvironmentResult<T> = std::result::Result<T, EnvironmentError>;

/// Result type for operations that load and evaluate files
pub type Result<T> = std::result::Result<T, CjsonError>;

/// Category of a located evaluation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed token, bracket, quote, escape or separator structure
    Syntax,
    /// Well-formed text that can't be evaluated, e.g. a list used as map key
    Semantic,
    /// Failure reported by the evaluation environment
    Environment,
}

impl ErrorKind {
    /// Prefix of rendered messages of this kind
    pub fn prefix(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "CJSON syntax error: ",
            ErrorKind::Semantic => "CJSON error: ",
            ErrorKind::Environment => "Error while evaluating CJSON: ",
        }
    }
}

/// Errors that can occur during CJSON evaluation
#[derive(Error, Debug, Clone)]
pub enum EvaluationError {
    /// An error that points into the source text
    #[error("{}", render_located(*.kind, .message, .location, &SnippetFormatter::new()))]
    Located {
        /// Error category
        kind: ErrorKind,
        /// Message without the category prefix and location
        message: String,
        /// Where the error occurred
        location: SourceLocation,
        /// Environment failure that caused this error
        #[source]
        cause: Option<Arc<EnvironmentError>>,
    },

    /// Invariant violation inside the interpreter; never expected in
    /// normal operation
    #[error("CJSON interpreter bug: {message}")]
    Internal {
        /// Description of the violated invariant
        message: String,
    },
}

impl EvaluationError {
    /// Create a syntax error
    pub fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::located(ErrorKind::Syntax, message, location, None)
    }

    /// Create a semantic error
    pub fn semantic(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::located(ErrorKind::Semantic, message, location, None)
    }

    /// Create a located error of any kind
    pub fn located(
        kind: ErrorKind,
        message: impl Into<String>,
        location: SourceLocation,
        cause: Option<EnvironmentError>,
    ) -> Self {
        EvaluationError::Located {
            kind,
            message: message.into(),
            location,
            cause: cause.map(Arc::new),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        EvaluationError::Internal {
            message: message.into(),
        }
    }

    /// Error category; `None` for internal errors
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            EvaluationError::Located { kind, .. } => Some(*kind),
            EvaluationError::Internal { .. } => None,
        }
    }

    /// Message without prefix and location
    pub fn message(&self) -> &str {
        match self {
            EvaluationError::Located { message, .. } => message,
            EvaluationError::Internal { message } => message,
        }
    }

    /// Source location, unless this is an internal error
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            EvaluationError::Located { location, .. } => Some(location),
            EvaluationError::Internal { .. } => None,
        }
    }

    /// Byte offset of the error in the source text
    pub fn position(&self) -> Option<usize> {
        self.location().map(SourceLocation::offset)
    }

    /// File name the source text came from
    pub fn file_name(&self) -> Option<&str> {
        self.location().and_then(SourceLocation::file_name)
    }

    /// 1-based line and column; `None` at the end of the text
    pub fn line_column(&self) -> Option<Position> {
        self.location().and_then(SourceLocation::position)
    }

    /// Check if this is a syntax error
    pub fn is_syntax(&self) -> bool {
        self.kind() == Some(ErrorKind::Syntax)
    }

    /// Render the full message with a custom snippet formatter
    pub fn render_with(&self, formatter: &SnippetFormatter) -> String {
        match self {
            EvaluationError::Located {
                kind,
                message,
                location,
                ..
            } => render_located(*kind, message, location, formatter),
            EvaluationError::Internal { .. } => self.to_string(),
        }
    }
}

fn render_located(
    kind: ErrorKind,
    message: &str,
    location: &SourceLocation,
    formatter: &SnippetFormatter,
) -> String {
    formatter.format(&format!("{}{}", kind.prefix(), message), location)
}

/// Failure reported by an evaluation environment callback
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// A located evaluation error, e.g. from evaluating a fragment; it is
    /// passed through without further wrapping
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Plain failure message
    #[error("{0}")]
    Message(String),

    /// Any other failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EnvironmentError {
    /// Create a plain message failure
    pub fn msg(message: impl Into<String>) -> Self {
        EnvironmentError::Message(message.into())
    }
}

/// Errors that can occur while loading CJSON files
#[derive(Error, Debug)]
pub enum LoadError {
    /// Reading the file failed
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The encoding header names an unknown character encoding
    #[error("Unsupported character encoding, \"{charset}\" was specifed in {}", describe_source(.source_name.as_deref()))]
    UnsupportedEncoding {
        /// The charset named in the header
        charset: String,
        /// Description of the file, usually its path
        source_name: Option<String>,
    },
}

fn describe_source(source_name: Option<&str>) -> String {
    match source_name {
        Some(name) => format!("this CJSON file: {name}"),
        None => "the CJSON file.".to_string(),
    }
}

/// Combined error for operations that load and evaluate files
#[derive(Error, Debug)]
pub enum CjsonError {
    /// Loading failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Evaluation failed
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
