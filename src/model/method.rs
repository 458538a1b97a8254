use std::collections::BTreeSet;

use crate::model::{parameter::unquote, Line, LoggingMode, Parameter};

/// A declared local variable slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Local {
    /// Type descriptor of the slot
    pub type_name: String,
    /// Name of the slot, absent for `[n] type` declarations
    pub name: Option<String>,
}

/// A method recovered from the listing.
#[derive(Debug, Clone, Default)]
pub struct Method {
    /// Name as written in the listing
    pub name: String,
    /// Set for `static` methods
    pub is_static: bool,
    /// Set unless the declared return type is `void`
    pub returns_value: bool,
    /// Value of the original `.maxstack` directive
    pub max_stack: Option<u32>,
    /// The original `.maxstack` line
    pub max_stack_line: Option<String>,
    /// Set when the method carries the sink attribute
    pub is_sink: bool,
    /// Method-level logging mode, first attribute wins
    pub logging_mode: Option<LoggingMode>,
    /// Parameters in declaration order
    pub parameters: Vec<Parameter>,
    /// Declared locals in slot order
    pub locals: Vec<Local>,
    /// The original declared-locals block, line by line
    pub locals_lines: Vec<String>,
    /// Labels defined in the body
    pub labels: BTreeSet<String>,
    /// Labels referenced by branch instructions
    pub branch_targets: BTreeSet<String>,
    /// The return instruction replaced by the END placeholder
    pub return_line: Option<String>,
    /// Lines of the method, header included
    pub lines: Vec<Line>,
}

impl Method {
    /// Creates an empty method.
    pub fn new(name: impl Into<String>, is_static: bool) -> Method {
        Method {
            name: name.into(),
            is_static,
            ..Default::default()
        }
    }

    /// The method name without surrounding quotes or generic parameters.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if !self.name.starts_with('\'') {
            if let Some(open) = self.name.find('<') {
                return &self.name[..open];
            }
        }
        unquote(&self.name)
    }

    /// Returns `true` if at least one parameter is sequence-typed.
    #[must_use]
    pub fn has_sequence_parameters(&self) -> bool {
        self.parameters.iter().any(Parameter::is_sequence)
    }

    /// Argument slot of the parameter at `position`; instance methods reserve slot 0.
    #[must_use]
    pub fn argument_index(&self, position: usize) -> usize {
        if self.is_static {
            position
        } else {
            position + 1
        }
    }

    /// Every label that generated code must avoid.
    #[must_use]
    pub fn known_labels(&self) -> BTreeSet<String> {
        self.labels.union(&self.branch_targets).cloned().collect()
    }

    /// Returns `true` if the parser recorded an insertion point for the method entry.
    #[must_use]
    pub fn has_start(&self) -> bool {
        self.lines
            .iter()
            .any(|line| matches!(line, Line::Placeholder(crate::model::Placeholder::Start)))
    }
}
