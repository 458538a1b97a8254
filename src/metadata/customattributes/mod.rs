//! Custom attribute decoding for `.custom` directives in a listing.
//!
//! The weave is configured by attributes applied inside the module itself: a class or method
//! attribute with a `LoggingType` named argument selects the [`crate::model::LoggingMode`], and
//! a marker attribute designates the sink method. The disassembler prints each attribute as a
//! `.custom` directive whose blob is dumped as hex bytes, possibly across several lines:
//!
//! ```text
//! .custom instance void [Profiler]Profiler.ProfilerClassAttribute::.ctor() = ( 01 00 01 00 54 55 // ....TU
//!                                                                            ... 00 00 00 00 )
//! ```
//!
//! [`CustomAttributeCollector`] gathers those bytes line by line and [`decode_attribute`]
//! turns them into an [`AttributeEvent`]. The blob is decoded structurally
//! ([`parse_custom_attribute_blob`]); when that fails, for constructor argument types the
//! decoder cannot size, the named argument is located by scanning for its name instead.
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.3 - Custom Attributes

mod parser;
mod types;

pub use parser::{parse_custom_attribute_blob, scan_named_value};
pub use types::*;

use log::debug;

use crate::{config::AttributeNames, model::LoggingMode};

/// Accumulates the hex blob of one `.custom` directive.
#[derive(Debug, Clone)]
pub struct CustomAttributeCollector {
    header: String,
    bytes: Vec<u8>,
    opened: bool,
    complete: bool,
    corrupt: bool,
}

impl CustomAttributeCollector {
    /// Starts collecting if `line` is a `.custom` directive.
    #[must_use]
    pub fn begin(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if !trimmed.starts_with(".custom ") {
            return None;
        }

        let mut collector = CustomAttributeCollector {
            header: trimmed.to_string(),
            bytes: Vec::new(),
            opened: false,
            complete: false,
            corrupt: false,
        };
        collector.consume(trimmed);
        Some(collector)
    }

    /// Feeds a continuation line. Returns `false` if the line is not part of the blob, in
    /// which case the collector is complete and the line must be handled by the caller.
    pub fn feed(&mut self, line: &str) -> bool {
        if self.complete {
            return false;
        }

        let trimmed = line.trim();
        if !self.opened && !trimmed.starts_with('=') {
            self.complete = true;
            return false;
        }

        self.consume(trimmed);
        true
    }

    /// Returns `true` once the closing parenthesis of the blob was seen.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The blob bytes collected so far.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes the collected attribute.
    #[must_use]
    pub fn finish(self, names: &AttributeNames) -> AttributeEvent {
        if self.corrupt {
            debug!("Ignoring attribute with unreadable blob - {}", self.header);
            return AttributeEvent::Unrelated;
        }
        decode_attribute(&self.header, &self.bytes, names)
    }

    fn consume(&mut self, text: &str) {
        let mut text = match text.find("//") {
            Some(comment) => &text[..comment],
            None => text,
        };

        if !self.opened {
            let Some(assign) = text.find('=') else {
                return;
            };
            let value = text[assign + 1..].trim_start();
            if let Some(blob) = value.strip_prefix('(') {
                self.opened = true;
                text = blob;
            } else if value.is_empty() {
                // `= (` continues on the next line
                return;
            } else {
                // Verbal attribute form, no blob to decode
                self.opened = true;
                self.complete = true;
                return;
            }
        }

        for token in text.split_whitespace() {
            let (hex, closes) = match token.strip_suffix(')') {
                Some(hex) => (hex, true),
                None => (token, false),
            };

            if !hex.is_empty() {
                match u8::from_str_radix(hex, 16) {
                    Ok(byte) => self.bytes.push(byte),
                    Err(_) => self.corrupt = true,
                }
            }

            if closes {
                self.complete = true;
                return;
            }
        }
    }
}

/// Decodes the meaning of a `.custom` directive.
///
/// # Arguments
/// * `header` - The `.custom` line, used for the attribute type and constructor signature
/// * `blob` - The blob bytes
/// * `names` - The attribute and property names configuring the weave
#[must_use]
pub fn decode_attribute(header: &str, blob: &[u8], names: &AttributeNames) -> AttributeEvent {
    let ctor_type = header.split("::.ctor").next().unwrap_or(header);
    if ctor_type.contains(names.sink.as_str()) {
        return AttributeEvent::Sink;
    }

    let ctor_params = constructor_parameters(header);
    let discriminant = match parse_custom_attribute_blob(blob, &ctor_params) {
        Ok(value) => value
            .named_args
            .iter()
            .find(|named| named.name == names.logging_mode_property)
            .map(|named| named.value.as_discriminant()),
        Err(error) => {
            debug!("Falling back to a name scan for '{header}' - {error}");
            scan_named_value(blob, &names.logging_mode_property).map(Some)
        }
    };

    match discriminant {
        None => AttributeEvent::Unrelated,
        Some(Some(value)) => match LoggingMode::from_repr(value) {
            Some(mode) => AttributeEvent::LoggingMode(mode),
            None => AttributeEvent::Unrecognized(value),
        },
        // The property exists but holds a non-integer value
        Some(None) => AttributeEvent::Unrecognized(u32::MAX),
    }
}

fn constructor_parameters(header: &str) -> Vec<&str> {
    let Some(start) = header.find("::.ctor(") else {
        return Vec::new();
    };
    let rest = &header[start + "::.ctor(".len()..];
    let Some(end) = rest.find(')') else {
        return Vec::new();
    };

    rest[..end]
        .split(',')
        .map(str::trim)
        .filter(|param| !param.is_empty())
        .collect()
}
