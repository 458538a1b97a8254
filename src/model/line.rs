//! Line sequences with embedded placeholders.

use std::fmt;

/// Prefix of every placeholder marker.
pub const MARKER_PREFIX: &str = "***";

/// An instrumentation insertion point recorded by the parser.
///
/// Class and method placeholders carry the index of the entity in its owner, so two entities
/// sharing a name can never be confused during substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// The class at this index of [`crate::model::Assembly::classes`]
    Class(usize),
    /// The method at this index of [`crate::model::Class::methods`]
    Method(usize),
    /// The `.maxstack` directive of the enclosing method
    MaxStack,
    /// The declared-locals block of the enclosing method
    Locals,
    /// Entry of the enclosing method, after its first instruction or before it
    Start,
    /// The first return instruction of the enclosing method
    End,
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Class(index) => write!(f, "{MARKER_PREFIX}CLASS_{index}{MARKER_PREFIX}"),
            Placeholder::Method(index) => {
                write!(f, "{MARKER_PREFIX}METHOD_{index}{MARKER_PREFIX}")
            }
            Placeholder::MaxStack => write!(f, "{MARKER_PREFIX}MAXSTACK{MARKER_PREFIX}"),
            Placeholder::Locals => write!(f, "{MARKER_PREFIX}LOCALS{MARKER_PREFIX}"),
            Placeholder::Start => write!(f, "{MARKER_PREFIX}START{MARKER_PREFIX}"),
            Placeholder::End => write!(f, "{MARKER_PREFIX}END{MARKER_PREFIX}"),
        }
    }
}

/// One entry of a scope's line sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A listing line kept verbatim
    Text(String),
    /// An insertion point resolved by the assembler
    Placeholder(Placeholder),
}

impl Line {
    /// Creates a text line.
    pub fn text(text: impl Into<String>) -> Line {
        Line::Text(text.into())
    }

    /// Returns the text of a text line.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Line::Text(text) => Some(text),
            Line::Placeholder(_) => None,
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Text(text) => f.write_str(text),
            Line::Placeholder(placeholder) => write!(f, "{placeholder}"),
        }
    }
}
