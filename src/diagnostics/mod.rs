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

//! Diagnostic support for CJSON evaluation errors
//!
//! Converts byte offsets into line/column positions and renders a located
//! message with the offending source line and a caret marker.

#![warn(missing_docs)]

pub mod formatter;
pub mod location;
pub mod quote;

pub use formatter::{
    DEFAULT_MAX_QUOTE_LENGTH, DEFAULT_TAB_WIDTH, SnippetFormatter, format_source_error,
};
pub use location::{Position, SourceLocation};
pub use quote::{expand_tabs, quote, quote_or_name};
