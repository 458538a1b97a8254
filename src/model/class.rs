use bitflags::bitflags;

use crate::model::{Line, LoggingMode, Method};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    /// Which variants of the sequence-to-string helper a class needs
    pub struct SequenceVariants: u8 {
        /// Called from static methods
        const STATIC = 0b01;
        /// Called from instance methods
        const INSTANCE = 0b10;
    }
}

impl SequenceVariants {
    /// The variant matching a method's staticness.
    #[must_use]
    pub fn for_method(method: &Method) -> Self {
        if method.is_static {
            SequenceVariants::STATIC
        } else {
            SequenceVariants::INSTANCE
        }
    }
}

/// A top-level class recovered from the listing.
#[derive(Debug, Clone, Default)]
pub struct Class {
    /// Trailing segment of the dotted name, e.g. `Program`
    pub name: String,
    /// Full name as declared, e.g. `Demo.Program` or ``Demo.Box`1<T>``
    pub full_name: String,
    /// Set when the class derives from `System.ValueType` or `System.Enum`
    pub is_value_type: bool,
    /// Class-level logging mode, first attribute wins
    pub logging_mode: Option<LoggingMode>,
    /// Methods in declaration order
    pub methods: Vec<Method>,
    /// Lines of the class with method placeholders
    pub lines: Vec<Line>,
    /// Nested classes that ask for logging; they are left untouched
    pub nested_with_logging: Vec<String>,
}

impl Class {
    /// Creates an empty class from its declared full name.
    pub fn new(full_name: impl Into<String>) -> Class {
        let full_name = full_name.into();
        let base = full_name.split('<').next().unwrap_or(&full_name);
        let name = base.rsplit('.').next().unwrap_or(base).to_string();

        Class {
            name,
            full_name,
            ..Default::default()
        }
    }

    /// Returns `true` for generic type definitions.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.full_name.contains('<')
    }

    /// The type reference generated code uses to call members of this class.
    ///
    /// Generic definitions are referenced through their own instantiation, e.g.
    /// ``class Demo.Box`1<!0>``.
    #[must_use]
    pub fn call_target(&self) -> String {
        let Some(open) = self.full_name.find('<') else {
            return self.full_name.clone();
        };

        let inner = self.full_name[open + 1..].trim_end_matches('>');
        let mut arity = 1;
        let mut depth = 0_i32;
        for ch in inner.chars() {
            match ch {
                '<' | '(' => depth += 1,
                '>' | ')' => depth -= 1,
                ',' if depth == 0 => arity += 1,
                _ => {}
            }
        }

        let arguments = (0..arity)
            .map(|index| format!("!{index}"))
            .collect::<Vec<_>>()
            .join(",");
        let keyword = if self.is_value_type {
            "valuetype"
        } else {
            "class"
        };
        format!("{keyword} {}<{arguments}>", &self.full_name[..open])
    }

    /// Which staticness subsets of the methods have a sequence-typed parameter.
    #[must_use]
    pub fn sequence_variants(&self) -> SequenceVariants {
        self.methods
            .iter()
            .filter(|method| method.has_sequence_parameters())
            .fold(SequenceVariants::empty(), |variants, method| {
                variants | SequenceVariants::for_method(method)
            })
    }

    /// Returns `true` if a method of this class already uses `name`.
    #[must_use]
    pub fn has_method_named(&self, name: &str) -> bool {
        self.methods.iter().any(|method| method.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Parameter;

    #[test]
    fn names() {
        let class = Class::new("Demo.Inner.Program");
        assert_eq!(class.name, "Program");
        assert_eq!(class.call_target(), "Demo.Inner.Program");
        assert!(!class.is_generic());
    }

    #[test]
    fn generic_call_target() {
        let class = Class::new("Demo.Map`2<TKey,([System.Runtime]System.IComparable) TValue>");
        assert_eq!(class.name, "Map`2");
        assert!(class.is_generic());
        assert_eq!(class.call_target(), "class Demo.Map`2<!0,!1>");
    }

    #[test]
    fn variants() {
        let mut class = Class::new("Demo.Program");
        assert!(class.sequence_variants().is_empty());

        let mut method = Method::new("Run", true);
        method.parameters.push(Parameter::new("string[]", "items"));
        class.methods.push(method);
        assert_eq!(class.sequence_variants(), SequenceVariants::STATIC);

        let mut method = Method::new("Walk", false);
        method
            .parameters
            .push(Parameter::new("class [System.Runtime]System.Collections.IEnumerable", "e"));
        class.methods.push(method);
        assert_eq!(class.sequence_variants(), SequenceVariants::all());
    }
}
