use crate::weaver::typemap::is_sequence_type;

/// A declared method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name as written in the listing, possibly single-quoted
    pub name: String,
    /// Raw type descriptor, e.g. `int32` or `class [System.Runtime]System.Object`
    pub type_name: String,
    /// Set for the final parameter of the signature
    pub is_last: bool,
}

impl Parameter {
    /// Creates a parameter that is not (yet) known to be the last one.
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Parameter {
        Parameter {
            name: name.into(),
            type_name: type_name.into(),
            is_last: false,
        }
    }

    /// Returns `true` if the parameter holds an iterable collection.
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        is_sequence_type(&self.type_name)
    }

    /// The parameter name without the quotes the disassembler adds around keywords.
    #[must_use]
    pub fn display_name(&self) -> &str {
        unquote(&self.name)
    }
}

/// Strips one pair of surrounding single quotes.
pub(crate) fn unquote(name: &str) -> &str {
    name.strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
        .unwrap_or(name)
}
