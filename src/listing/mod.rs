//! Listing parser.
//!
//! [`markers`] holds the line predicates describing the disassembler's grammar, and
//! [`parser`] the state machine that uses them to build the [`crate::model`].

pub mod markers;
pub mod parser;

pub use parser::{parse_listing, ListingParser};
