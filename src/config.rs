//! Configuration for the weaving engine.
//!
//! [`WeaveConfig`] gathers every tunable the parser and the generators consult: the rendering
//! limits baked into the emitted sequence helper, the strictness policy applied to anomalies in
//! the listing, the attribute names that carry the logging configuration, and the assembly
//! scopes used when the generated code references framework types.
//!
//! # Examples
//!
//! ```rust
//! use ilweave::{Strictness, WeaveConfig};
//!
//! let config = WeaveConfig::default()
//!     .with_max_sequence_items(5)
//!     .with_max_item_length(40)
//!     .with_strictness(Strictness::Lenient);
//!
//! assert_eq!(config.max_sequence_items, 5);
//! assert_eq!(config.attributes.logging_mode_property, "LoggingType");
//! ```

/// How the weaver reacts to listing anomalies it can work around.
///
/// The listing grammar is defined by an external disassembler and only partially understood by
/// the parser, so lines that do not match a known marker are always passed through unchanged.
/// The strictness only decides whether recoverable structural problems abort the weave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Fail closed: unterminated scopes, unknown logging modes and duplicate sinks are errors.
    #[default]
    Strict,
    /// Log a warning and keep going with a best-effort result.
    Lenient,
}

/// Names of the custom attributes that configure the weave from inside the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNames {
    /// Substring identifying the attribute that marks the sink method (default:
    /// `LoggingMethodOverrideAttribute`).
    pub sink: String,

    /// Name of the named argument that carries the logging mode (default: `LoggingType`).
    pub logging_mode_property: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            sink: "LoggingMethodOverrideAttribute".to_string(),
            logging_mode_property: "LoggingType".to_string(),
        }
    }
}

/// Assembly scopes used for framework types referenced by generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeReferences {
    /// Scope of `System.String`, `System.Convert`, `System.Text.StringBuilder` and the
    /// collection interfaces (default: `System.Runtime`).
    pub core: String,

    /// Scope of `System.Diagnostics.Stopwatch` (default: `System.Runtime.Extensions`).
    pub diagnostics: String,
}

impl Default for RuntimeReferences {
    fn default() -> Self {
        Self {
            core: "System.Runtime".to_string(),
            diagnostics: "System.Runtime.Extensions".to_string(),
        }
    }
}

impl RuntimeReferences {
    /// Qualifies `System.<name>` with the core scope, e.g. `[System.Runtime]System.String`.
    #[must_use]
    pub fn core_type(&self, name: &str) -> String {
        format!("[{}]System.{}", self.core, name)
    }

    /// The fully qualified stopwatch type used as the timer slot.
    #[must_use]
    pub fn stopwatch(&self) -> String {
        format!("[{}]System.Diagnostics.Stopwatch", self.diagnostics)
    }
}

/// Configuration for a weave.
///
/// Controls the limits embedded into the sequence-to-string helper, the strictness of the
/// parser, and the names the weaver looks for in attribute metadata.
#[derive(Debug, Clone)]
pub struct WeaveConfig {
    /// Maximum number of sequence items rendered before `", ..."` is appended (default: 10).
    pub max_sequence_items: u32,

    /// Maximum characters of a rendered non-numeric item before it is truncated (default: 100).
    pub max_item_length: u32,

    /// Reaction to recoverable listing anomalies (default: [`Strictness::Strict`]).
    pub strictness: Strictness,

    /// Attribute names carrying the logging configuration.
    pub attributes: AttributeNames,

    /// Assembly scopes of framework types referenced by generated code.
    pub runtime: RuntimeReferences,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self {
            max_sequence_items: 10,
            max_item_length: 100,
            strictness: Strictness::Strict,
            attributes: AttributeNames::default(),
            runtime: RuntimeReferences::default(),
        }
    }
}

impl WeaveConfig {
    /// Sets the maximum number of rendered sequence items.
    #[must_use]
    pub fn with_max_sequence_items(mut self, items: u32) -> Self {
        self.max_sequence_items = items;
        self
    }

    /// Sets the maximum rendered length of a non-numeric sequence item.
    #[must_use]
    pub fn with_max_item_length(mut self, length: u32) -> Self {
        self.max_item_length = length;
        self
    }

    /// Sets the strictness policy.
    #[must_use]
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Replaces the attribute names.
    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeNames) -> Self {
        self.attributes = attributes;
        self
    }

    /// Replaces the runtime assembly scopes.
    #[must_use]
    pub fn with_runtime(mut self, runtime: RuntimeReferences) -> Self {
        self.runtime = runtime;
        self
    }

    /// Returns `true` when anomalies must abort the weave.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }
}
