//! Instrumentation generators and the [`Weaver`] entry point.
//!
//! The generators are pure functions of a parsed method or class, its resolved
//! [`crate::model::LoggingMode`], the sink and the [`WeaveConfig`]. [`assemble`] drives them while
//! resolving the placeholders the listing parser left behind.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ilweave::{Weaver, WeaveConfig};
//!
//! let weaver = Weaver::new(WeaveConfig::default().with_max_sequence_items(5));
//! let listing = std::fs::read_to_string("Demo.il")?;
//! let woven = weaver.weave(&listing)?;
//! std::fs::write("Demo.woven.il", woven)?;
//! # Ok::<(), ilweave::Error>(())
//! ```

pub mod assemble;
pub mod elapsed;
pub mod emit;
pub mod labels;
pub mod locals;
pub mod params;
pub mod sequence;
pub mod typemap;

use log::debug;
use rayon::prelude::*;

use crate::{config::WeaveConfig, listing::parse_listing, model::Assembly, Result};

pub use assemble::{assemble, Assembler};
pub use sequence::SequenceFormat;

/// Weaves call-site logging into disassembler listings.
///
/// A `Weaver` only holds its configuration, so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Weaver {
    config: WeaveConfig,
}

impl Weaver {
    /// Creates a weaver with `config`.
    #[must_use]
    pub fn new(config: WeaveConfig) -> Self {
        Weaver { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &WeaveConfig {
        &self.config
    }

    /// Parses `listing` into its model without generating anything.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty listing, and in strict mode the structural
    /// errors described on [`crate::config::Strictness`].
    pub fn parse(&self, listing: &str) -> Result<Assembly> {
        parse_listing(listing, &self.config)
    }

    /// Renders a parsed model with instrumentation applied.
    ///
    /// # Errors
    /// See [`assemble`].
    pub fn render(&self, assembly: &Assembly) -> Result<String> {
        assemble(assembly, &self.config)
    }

    /// Weaves one listing.
    ///
    /// # Errors
    /// Returns any parse or substitution error; no partial listing is produced.
    pub fn weave(&self, listing: &str) -> Result<String> {
        let assembly = self.parse(listing)?;
        debug!(
            "Parsed {} with {} classes",
            assembly.name.as_deref().unwrap_or("<unnamed>"),
            assembly.classes.len()
        );
        self.render(&assembly)
    }

    /// Weaves independent listings in parallel, keeping the input order.
    pub fn weave_many<S>(&self, listings: &[S]) -> Vec<Result<String>>
    where
        S: AsRef<str> + Sync,
    {
        listings
            .par_iter()
            .map(|listing| self.weave(listing.as_ref()))
            .collect()
    }
}
