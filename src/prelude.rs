//! # ilweave Prelude
//!
//! The types needed to configure and run a weave, for glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all ilweave operations
pub use crate::Error;

/// The result type used throughout ilweave
pub use crate::Result;

// ================================================================================================
// Configuration
// ================================================================================================

/// Weave configuration and its parts
pub use crate::config::{AttributeNames, RuntimeReferences, Strictness, WeaveConfig};

/// Logging modes selected by attributes
pub use crate::model::LoggingMode;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The weaver and the host-side sequence rendering rules
pub use crate::weaver::{SequenceFormat, Weaver};

/// Listing loading
pub use crate::file::read_listing;

/// Disassembler/assembler seam
pub use crate::toolchain::{weave_module, IlToolchain};

// ================================================================================================
// Model
// ================================================================================================

/// The parsed model
pub use crate::model::{Assembly, Class, Method, Parameter};
