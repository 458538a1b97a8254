//! Decoded custom attribute values.
//!
//! Only the part of ECMA-335 II.23.3 that configuration attributes use is represented:
//! scalar and string arguments, plus enum values with an `int32` underlying type.

use crate::model::LoggingMode;

/// A decoded argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomAttributeArgument {
    /// Boolean value
    Bool(bool),
    /// Character value (UTF-16 code unit)
    Char(u16),
    /// Any integer type, widened
    Integer(i64),
    /// Any floating point type, widened
    Real(f64),
    /// String value, `None` for a null string
    String(Option<String>),
    /// Enum value: declared enum type name and underlying `int32`
    Enum(String, i32),
}

impl CustomAttributeArgument {
    /// The value as a logging-mode discriminant, for integer and enum values.
    #[must_use]
    pub fn as_discriminant(&self) -> Option<u32> {
        match self {
            CustomAttributeArgument::Integer(value) => u32::try_from(*value).ok(),
            CustomAttributeArgument::Enum(_, value) => u32::try_from(*value).ok(),
            _ => None,
        }
    }
}

/// A named argument (field or property) of a custom attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttributeNamedArgument {
    /// Whether this is a field (true) or property (false)
    pub is_field: bool,
    /// Name of the field or property
    pub name: String,
    /// Value of the argument
    pub value: CustomAttributeArgument,
}

/// A decoded custom attribute blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomAttributeValue {
    /// Constructor arguments in declaration order
    pub fixed_args: Vec<CustomAttributeArgument>,
    /// Field and property assignments
    pub named_args: Vec<CustomAttributeNamedArgument>,
}

/// What a `.custom` line means for the weave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeEvent {
    /// The attribute sets the logging mode of its scope
    LoggingMode(LoggingMode),
    /// The attribute marks the sink method
    Sink,
    /// The attribute carries the logging-mode argument with an unknown value
    Unrecognized(u32),
    /// The attribute does not configure the weave
    Unrelated,
}

/// .NET `CorSerializationType` constants as defined in corhdr.h
#[allow(non_snake_case, missing_docs)]
pub mod SERIALIZATION_TYPE {
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0A;
    pub const U8: u8 = 0x0B;
    pub const R4: u8 = 0x0C;
    pub const R8: u8 = 0x0D;
    pub const STRING: u8 = 0x0E;
    pub const ENUM: u8 = 0x55;
}

/// Named argument kind markers
#[allow(non_snake_case, missing_docs)]
pub mod NAMED_ARG_KIND {
    pub const FIELD: u8 = 0x53;
    pub const PROPERTY: u8 = 0x54;
}
