//! Custom attribute blob decoding (ECMA-335 II.23.3).
//!
//! A blob starts with the prolog `0x0001`, continues with the constructor arguments encoded by
//! the constructor's parameter types, and ends with a `u16` count of named arguments. Each named
//! argument is a field/property marker, a serialization type tag (followed by the enum type name
//! for enums), the member name as a `SerString`, and the value.

use crate::{
    file::{io::read_le, parser::Parser},
    metadata::customattributes::types::{
        CustomAttributeArgument, CustomAttributeNamedArgument, CustomAttributeValue,
        NAMED_ARG_KIND, SERIALIZATION_TYPE,
    },
    Result,
};

/// Decodes a custom attribute blob.
///
/// # Arguments
/// * `blob` - The raw blob bytes, prolog included
/// * `ctor_params` - Type descriptors of the constructor parameters, as written in the listing
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for an invalid prolog, an unsupported argument type or
/// an invalid named argument, and [`crate::Error::OutOfBounds`] for a truncated blob.
pub fn parse_custom_attribute_blob(
    blob: &[u8],
    ctor_params: &[&str],
) -> Result<CustomAttributeValue> {
    let mut parser = CustomAttributeParser {
        parser: Parser::new(blob),
    };
    parser.parse(ctor_params)
}

/// Finds the `int32` value stored right after the `SerString` `name`, without decoding the
/// blob structure.
///
/// Used when the structured decode fails, e.g. for constructor argument types the decoder
/// cannot size.
#[must_use]
pub fn scan_named_value(blob: &[u8], name: &str) -> Option<u32> {
    let needle = name.as_bytes();
    if needle.is_empty() || needle.len() > 0x7F {
        return None;
    }

    let mut found = None;
    for start in 1..blob.len() {
        let end = start + needle.len();
        if end + 4 > blob.len() {
            break;
        }
        if blob[start - 1] as usize == needle.len() && &blob[start..end] == needle {
            found = read_le::<u32>(&blob[end..end + 4]).ok();
        }
    }
    found
}

struct CustomAttributeParser<'a> {
    parser: Parser<'a>,
}

impl CustomAttributeParser<'_> {
    fn parse(&mut self, ctor_params: &[&str]) -> Result<CustomAttributeValue> {
        let prolog = self.parser.read_le::<u16>()?;
        if prolog != 0x0001 {
            return Err(malformed_error!(
                "Invalid custom attribute prolog - expected 0x0001, found 0x{:04X}",
                prolog
            ));
        }

        let mut value = CustomAttributeValue::default();
        for param in ctor_params {
            value.fixed_args.push(self.parse_fixed_argument(param)?);
        }

        // Some compilers drop the named argument count when it is zero
        if !self.parser.has_more_data() {
            return Ok(value);
        }

        let num_named = self.parser.read_le::<u16>()?;
        for _ in 0..num_named {
            value.named_args.push(self.parse_named_argument()?);
        }

        Ok(value)
    }

    fn parse_fixed_argument(&mut self, type_name: &str) -> Result<CustomAttributeArgument> {
        let type_name = type_name.trim();
        let tag = match type_name {
            "bool" => SERIALIZATION_TYPE::BOOLEAN,
            "char" => SERIALIZATION_TYPE::CHAR,
            "int8" => SERIALIZATION_TYPE::I1,
            "uint8" | "unsigned int8" => SERIALIZATION_TYPE::U1,
            "int16" => SERIALIZATION_TYPE::I2,
            "uint16" | "unsigned int16" => SERIALIZATION_TYPE::U2,
            "int32" => SERIALIZATION_TYPE::I4,
            "uint32" | "unsigned int32" => SERIALIZATION_TYPE::U4,
            "int64" => SERIALIZATION_TYPE::I8,
            "uint64" | "unsigned int64" => SERIALIZATION_TYPE::U8,
            "float32" => SERIALIZATION_TYPE::R4,
            "float64" => SERIALIZATION_TYPE::R8,
            "string" => SERIALIZATION_TYPE::STRING,
            // Enums are assumed to have the default int32 underlying type
            _ if type_name.starts_with("valuetype ") => {
                let enum_name = type_name.trim_start_matches("valuetype ").to_string();
                return Ok(CustomAttributeArgument::Enum(
                    enum_name,
                    self.parser.read_le::<i32>()?,
                ));
            }
            _ if type_name.ends_with("System.Type") => SERIALIZATION_TYPE::STRING,
            _ => {
                return Err(malformed_error!(
                    "Unsupported constructor parameter type - {}",
                    type_name
                ))
            }
        };

        self.parse_argument_by_type_tag(tag)
    }

    fn parse_named_argument(&mut self) -> Result<CustomAttributeNamedArgument> {
        let is_field = match self.parser.read_le::<u8>()? {
            NAMED_ARG_KIND::FIELD => true,
            NAMED_ARG_KIND::PROPERTY => false,
            other => {
                return Err(malformed_error!(
                    "Invalid field/property indicator: 0x{:02X}",
                    other
                ))
            }
        };

        let type_info = self.parser.read_le::<u8>()?;
        let enum_name = if type_info == SERIALIZATION_TYPE::ENUM {
            Some(self.parser.read_ser_string()?.unwrap_or_default())
        } else {
            None
        };

        let name = self.parser.read_ser_string()?.unwrap_or_default();
        let value = match enum_name {
            Some(enum_name) => CustomAttributeArgument::Enum(enum_name, self.parser.read_le()?),
            None => self.parse_argument_by_type_tag(type_info)?,
        };

        Ok(CustomAttributeNamedArgument {
            is_field,
            name,
            value,
        })
    }

    fn parse_argument_by_type_tag(&mut self, tag: u8) -> Result<CustomAttributeArgument> {
        let value = match tag {
            SERIALIZATION_TYPE::BOOLEAN => {
                CustomAttributeArgument::Bool(self.parser.read_le::<u8>()? != 0)
            }
            SERIALIZATION_TYPE::CHAR => CustomAttributeArgument::Char(self.parser.read_le()?),
            SERIALIZATION_TYPE::I1 => {
                CustomAttributeArgument::Integer(i64::from(self.parser.read_le::<i8>()?))
            }
            SERIALIZATION_TYPE::U1 => {
                CustomAttributeArgument::Integer(i64::from(self.parser.read_le::<u8>()?))
            }
            SERIALIZATION_TYPE::I2 => {
                CustomAttributeArgument::Integer(i64::from(self.parser.read_le::<i16>()?))
            }
            SERIALIZATION_TYPE::U2 => {
                CustomAttributeArgument::Integer(i64::from(self.parser.read_le::<u16>()?))
            }
            SERIALIZATION_TYPE::I4 => {
                CustomAttributeArgument::Integer(i64::from(self.parser.read_le::<i32>()?))
            }
            SERIALIZATION_TYPE::U4 => {
                CustomAttributeArgument::Integer(i64::from(self.parser.read_le::<u32>()?))
            }
            SERIALIZATION_TYPE::I8 => CustomAttributeArgument::Integer(self.parser.read_le()?),
            #[allow(clippy::cast_possible_wrap)]
            SERIALIZATION_TYPE::U8 => {
                CustomAttributeArgument::Integer(self.parser.read_le::<u64>()? as i64)
            }
            SERIALIZATION_TYPE::R4 => {
                let bits = self.parser.read_le::<u32>()?;
                CustomAttributeArgument::Real(f64::from(f32::from_bits(bits)))
            }
            SERIALIZATION_TYPE::R8 => {
                CustomAttributeArgument::Real(f64::from_bits(self.parser.read_le::<u64>()?))
            }
            SERIALIZATION_TYPE::STRING => {
                CustomAttributeArgument::String(self.parser.read_ser_string()?)
            }
            _ => {
                return Err(malformed_error!(
                    "Unsupported named argument type: 0x{:02X}",
                    tag
                ))
            }
        };

        Ok(value)
    }
}
