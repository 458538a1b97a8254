//! Mapping of parameter type descriptors to the way their values are turned into strings.

use crate::config::RuntimeReferences;

/// Primitive type keywords and the `System` type implementing `ToString` for them.
const PRIMITIVES: &[(&str, &str)] = &[
    ("bool", "Boolean"),
    ("boolean", "Boolean"),
    ("char", "Char"),
    ("int8", "SByte"),
    ("sbyte", "SByte"),
    ("uint8", "Byte"),
    ("unsigned int8", "Byte"),
    ("byte", "Byte"),
    ("int16", "Int16"),
    ("short", "Int16"),
    ("uint16", "UInt16"),
    ("unsigned int16", "UInt16"),
    ("ushort", "UInt16"),
    ("int32", "Int32"),
    ("int", "Int32"),
    ("uint32", "UInt32"),
    ("unsigned int32", "UInt32"),
    ("uint", "UInt32"),
    ("int64", "Int64"),
    ("long", "Int64"),
    ("uint64", "UInt64"),
    ("unsigned int64", "UInt64"),
    ("ulong", "UInt64"),
    ("float32", "Single"),
    ("float", "Single"),
    ("float64", "Double"),
    ("double", "Double"),
    ("native int", "IntPtr"),
    ("native uint", "UIntPtr"),
    ("native unsigned int", "UIntPtr"),
    ("decimal", "Decimal"),
];

/// Core value types that declare their own `ToString`.
const OWN_TO_STRING: &[&str] = &[
    "Boolean",
    "Char",
    "SByte",
    "Byte",
    "Int16",
    "UInt16",
    "Int32",
    "UInt32",
    "Int64",
    "UInt64",
    "Int128",
    "UInt128",
    "Half",
    "Single",
    "Double",
    "IntPtr",
    "UIntPtr",
    "Decimal",
    "DateTime",
    "DateTimeOffset",
    "DateOnly",
    "TimeOnly",
    "TimeSpan",
    "Guid",
];

/// How a parameter value becomes a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringifyTarget {
    /// Value type with its own `ToString`, called on the argument's address
    Value(String),
    /// Reference type, passed to `Convert::ToString(object)`
    Reference,
    /// Value type or generic parameter, boxed then passed to `Convert::ToString(object)`
    Boxed(String),
    /// Iterable, rendered by the sequence helper; value types are boxed with the given type
    Sequence(Option<String>),
    /// By-ref, pointer or typed reference, rendered as a fixed literal
    Opaque(&'static str),
}

/// Returns `true` if the type descriptor names an array or a collection.
#[must_use]
pub fn is_sequence_type(type_name: &str) -> bool {
    let type_name = type_name.trim();
    if type_name.ends_with('&') || type_name.ends_with('*') {
        return false;
    }
    type_name.contains("[]") || type_name.contains("Collections") || type_name.contains("IEnumerable")
}

/// Maps a raw type descriptor to its stringify target.
///
/// Core value types that declare `ToString` themselves are called directly. Every other value
/// type, enums included, and generic parameters are boxed, since their `ToString` is inherited
/// from `System.ValueType` or `System.Enum`.
#[must_use]
pub fn map_type(type_name: &str, runtime: &RuntimeReferences) -> StringifyTarget {
    let type_name = type_name.trim();

    if type_name.ends_with('&') {
        return StringifyTarget::Opaque("<by-ref>");
    }
    if type_name.ends_with('*') {
        return StringifyTarget::Opaque("<pointer>");
    }
    if type_name == "typedref" {
        return StringifyTarget::Opaque("<typedref>");
    }

    if is_sequence_type(type_name) {
        let boxed = type_name
            .starts_with("valuetype ")
            .then(|| type_name.to_string());
        return StringifyTarget::Sequence(boxed);
    }

    if let Some((_, system)) = PRIMITIVES.iter().find(|(keyword, _)| *keyword == type_name) {
        return StringifyTarget::Value(runtime.core_type(system));
    }

    if type_name == "string" || type_name == "object" {
        return StringifyTarget::Reference;
    }

    if type_name.starts_with('!') {
        return StringifyTarget::Boxed(type_name.to_string());
    }

    if let Some(inner) = type_name.strip_prefix("valuetype ") {
        let inner = inner.trim();
        if declares_to_string(inner, runtime) {
            return StringifyTarget::Value(inner.to_string());
        }
        return StringifyTarget::Boxed(type_name.to_string());
    }

    if type_name.starts_with('[') {
        if declares_to_string(type_name, runtime) {
            return StringifyTarget::Value(type_name.to_string());
        }
        // `box` leaves reference types unchanged
        return StringifyTarget::Boxed(type_name.to_string());
    }

    StringifyTarget::Reference
}

fn declares_to_string(qualified: &str, runtime: &RuntimeReferences) -> bool {
    let core = format!("[{}]System.", runtime.core);
    qualified
        .strip_prefix(&core)
        .is_some_and(|name| OWN_TO_STRING.contains(&name))
}
