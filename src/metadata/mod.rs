//! Attribute metadata recovered from `.custom` directives.
//!
//! Exposes the blob decoder that reads the logging configuration and the sink marker out of the
//! module's own custom attributes.

pub mod customattributes;
