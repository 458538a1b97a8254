use std::collections::BTreeSet;

use log::warn;

use crate::{
    config::WeaveConfig,
    model::{Class, Line, Method},
    Error, Result,
};

/// The parameter types a sink must declare, in order.
pub const SINK_SIGNATURE: [&str; 3] = ["string", "string", "int64"];

/// A resolved reference to the sink method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkRef {
    /// Index of the declaring class in [`Assembly::classes`]
    pub class_index: usize,
    /// Type reference used in the call instruction
    pub class_target: String,
    /// Method name as written in the listing
    pub method_name: String,
    /// Set for static sinks
    pub is_static: bool,
}

impl SinkRef {
    /// Returns `true` if a method of class `class_index` can call the sink.
    ///
    /// Instance sinks need a `this` of the declaring class, so only instance methods of that
    /// class qualify.
    #[must_use]
    pub fn is_callable_from(&self, class_index: usize, method: &Method) -> bool {
        self.is_static || (class_index == self.class_index && !method.is_static)
    }

    /// The call instruction operand, e.g. `void Demo.Log::Write(string, string, int64)`.
    #[must_use]
    pub fn call_operand(&self) -> String {
        let instance = if self.is_static { "" } else { "instance " };
        format!(
            "{instance}void {}::{}({})",
            self.class_target,
            self.method_name,
            SINK_SIGNATURE.join(", ")
        )
    }
}

/// The module listing as a whole.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    /// Name of the module's own assembly
    pub name: Option<String>,
    /// Top-level classes in declaration order
    pub classes: Vec<Class>,
    /// Lines outside of classes with class placeholders
    pub lines: Vec<Line>,
    /// Names of referenced assemblies (`.assembly extern`)
    pub externs: BTreeSet<String>,
    /// Index in [`Assembly::lines`] of the module's own `.assembly` declaration
    pub declaration_line: Option<usize>,
    /// Set when the listing ended with a newline
    pub trailing_newline: bool,
    /// Set when the listing terminates its lines with `\r\n`
    pub crlf: bool,
}

impl Assembly {
    /// The line terminator of the listing the model was parsed from.
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        if self.crlf {
            "\r\n"
        } else {
            "\n"
        }
    }

    /// Locates the sink method.
    ///
    /// A sink that cannot receive the logged values (wrong signature, non-void return,
    /// generic declaring class) is ignored with a warning.
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateSink`] in strict mode when more than one method carries
    /// the sink attribute.
    pub fn sink(&self, config: &WeaveConfig) -> Result<Option<SinkRef>> {
        let mut candidates = self.classes.iter().enumerate().flat_map(|(index, class)| {
            class
                .methods
                .iter()
                .filter(|method| method.is_sink)
                .map(move |method| (index, class, method))
        });

        let Some((class_index, class, method)) = candidates.next() else {
            return Ok(None);
        };

        if let Some((_, other_class, other)) = candidates.next() {
            let first = format!("{}::{}", class.full_name, method.name);
            let second = format!("{}::{}", other_class.full_name, other.name);
            if config.is_strict() {
                return Err(Error::DuplicateSink { first, second });
            }
            warn!("Multiple sink methods declared, using {first} and ignoring {second}");
        }

        let declared = method
            .parameters
            .iter()
            .map(|parameter| parameter.type_name.as_str())
            .collect::<Vec<_>>();
        if declared != SINK_SIGNATURE || method.returns_value {
            warn!(
                "Sink {}::{} must be declared as void (string, string, int64), ignoring it",
                class.full_name, method.name
            );
            return Ok(None);
        }

        if class.is_generic() {
            warn!(
                "Sink {}::{} is declared in a generic class, ignoring it",
                class.full_name, method.name
            );
            return Ok(None);
        }

        Ok(Some(SinkRef {
            class_index,
            class_target: class.call_target(),
            method_name: method.name.clone(),
            is_static: method.is_static,
        }))
    }
}
