// Copyright 2025 Johann Kempter
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
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # evalscope
//!
//! Debug-time symbol resolution for .NET expression evaluators.
//!
//! When a debugger halts a .NET process it reports the current frame as two raw facts: the
//! module version id (MVID) of the module being executed and a 32-bit metadata token. An
//! expression evaluator needs the type or method *symbol* behind them, and it needs the
//! method the user actually wrote. For iterator and `async` methods those differ: the
//! compiler moved the body into the `MoveNext` method of a generated state-machine type.
//!
//! `evalscope` reconstructs symbols from these facts and maps state-machine step methods back
//! to their user methods, trusting compiler-emitted `AsyncStateMachineAttribute` /
//! `IteratorStateMachineAttribute` provenance rather than name patterns alone.
//!
//! ## Quick Start
//!
//! ```rust
//! use evalscope::prelude::*;
//!
//! let mvid = ModuleId::from_bytes([1; 16]);
//! let mut builder = MetadataImageBuilder::new("Demo.dll", mvid);
//! builder.assembly("Demo");
//! builder.add_type("Demo", "Program", TypeAttributes::PUBLIC);
//! let main = builder.add_method("Main", 0x0096)?;
//!
//! let context = EvaluationContext::from_blocks(&[builder.build().into()])?;
//!
//! let method = context.get_source_method(mvid, main)?;
//! assert_eq!(method.to_string(), "Demo.Program::Main");
//!
//! // A module that was unloaded in the meantime is an ordinary outcome
//! let unloaded = ModuleId::from_bytes([2; 16]);
//! assert!(context.find_module(unloaded).is_none());
//! # Ok::<(), evalscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata::reader::MetadataReader`] - The boundary to whatever decodes the metadata
//!   tables; [`metadata::image::MetadataImage`] is an in-memory implementation
//! - [`metadata::module::LoadedModule`] - Per-module token decoder with symbol caches
//! - [`evaluation::statemachine`] - Recovery of user methods from state machines
//! - [`evaluation::EvaluationContext`] - Module registry and entry points for one debugger stop
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events: `debug` for resolution
//! fallbacks and assembler decisions, `warn` for dropped netmodules and ambiguous origins,
//! `trace` for cache hits. It never installs a subscriber.
//!
//! ## Standards Compliance
//!
//! Token layout, metadata tables and custom attribute blobs follow **ECMA-335** (6th edition).

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

pub mod evaluation;
pub mod metadata;
pub mod prelude;

#[cfg(test)]
pub(crate) mod test;

/// `evalscope` Result type.
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

pub use error::{Error, SymbolKind};
pub use file::{io::CilIO, parser::Parser};
