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
#![allow(clippy::too_many_arguments)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a listing into memory

//! # ilweave
//!
//! Call-site logging for compiled .NET modules, woven into the text listing produced by an IL
//! disassembler and assembled back afterwards.
//!
//! The weaver reads the module's own attributes to decide what to record: a class or method
//! attribute with a `LoggingType` named argument selects one of the
//! [`model::LoggingMode`]s, and a marker attribute designates a sink method with the signature
//! `void (string method, string parameters, int64 elapsedMilliseconds)`. Every selected
//! method then gets
//!
//! - an entry block rendering its arguments as `name=value; name=value`, with arrays and
//!   collections rendered as `[a, b, ...]` by a helper emitted into the class,
//! - a stopwatch started on entry,
//! - an exit block that stops the stopwatch and reports to the sink before returning.
//!
//! ## Features
//!
//! - **Single pass parsing** - One scan over the listing builds a model with typed placeholders
//! - **Attribute decoding** - ECMA-335 custom attribute blobs are decoded from their hex dump
//! - **Collision-free generation** - Generated labels and locals never clash with existing ones
//! - **Strict or lenient** - Structural anomalies either abort the weave or are logged
//! - **Parallel batches** - Independent listings are woven concurrently
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ilweave::prelude::*;
//!
//! let listing = ilweave::file::read_listing("Demo.il")?;
//! let woven = Weaver::new(WeaveConfig::default()).weave(&listing)?;
//! std::fs::write("Demo.woven.il", woven)?;
//! # Ok::<(), ilweave::Error>(())
//! ```
//!
//! ### Full round trip
//!
//! ```rust,no_run
//! use ilweave::{toolchain::{weave_module, IlToolchain}, Error, Result, Weaver};
//! use std::{path::Path, process::Command};
//!
//! struct Ildasm;
//!
//! impl IlToolchain for Ildasm {
//!     fn disassemble(&self, module: &Path) -> Result<String> {
//!         let listing = module.with_extension("il");
//!         Command::new("ildasm")
//!             .arg(module)
//!             .arg(format!("/output:{}", listing.display()))
//!             .status()
//!             .map_err(|error| Error::Toolchain(error.to_string()))?;
//!         ilweave::file::read_listing(listing)
//!     }
//!
//!     fn assemble(&self, listing: &str, output: &Path) -> Result<bool> {
//!         let source = output.with_extension("woven.il");
//!         std::fs::write(&source, listing)?;
//!         let status = Command::new("ilasm")
//!             .arg(&source)
//!             .arg("/dll")
//!             .arg(format!("/output:{}", output.display()))
//!             .status()
//!             .map_err(|error| Error::Toolchain(error.to_string()))?;
//!         Ok(status.success() && output.exists())
//!     }
//! }
//!
//! let assembled = weave_module(
//!     &Ildasm,
//!     &Weaver::default(),
//!     Path::new("Demo.dll"),
//!     Path::new("out/Demo.dll"),
//! )?;
//! assert!(assembled);
//! # Ok::<(), ilweave::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`listing`] - Line predicates and the state machine building the model
//! - [`model`] - Assembly, class, method and parameter model with placeholders
//! - [`metadata`] - Custom attribute blob decoding
//! - [`weaver`] - Generators and the substitution assembler
//! - [`toolchain`] - Disassembler/assembler seam
//! - [`file`] - Listing loading and byte-level parsing
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], with [`Error`] covering malformed input,
//! strict-mode rejections, internal consistency failures and toolchain failures.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use ilweave::prelude::*;
///
/// let weaver = Weaver::new(WeaveConfig::default().with_strictness(Strictness::Lenient));
/// assert_eq!(weaver.config().max_sequence_items, 10);
/// ```
pub mod prelude;

/// Weave configuration: limits, strictness, attribute names and runtime scopes.
pub mod config;

/// Listing loading and the byte cursor used for attribute blobs.
pub mod file;

/// Listing grammar predicates and the listing parser.
///
/// # Examples
///
/// ```rust
/// use ilweave::listing::markers::{leading_label, max_stack_value};
///
/// assert_eq!(leading_label("    IL_001f:  ret"), Some("IL_001f"));
/// assert_eq!(max_stack_value("    .maxstack  3"), Some(3));
/// ```
pub mod listing;

/// Custom attribute decoding.
pub mod metadata;

/// The parsed model of a listing.
pub mod model;

/// Instrumentation generators and the weaver entry point.
pub mod weaver;

/// External disassembler and assembler integration.
pub mod toolchain;

/// `ilweave` Result type
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;

pub use config::{AttributeNames, RuntimeReferences, Strictness, WeaveConfig};

pub use file::parser::Parser;

pub use model::LoggingMode;

pub use weaver::{SequenceFormat, Weaver};
