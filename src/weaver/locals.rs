//! Declared-locals rewriting for instrumented methods.
//!
//! Instrumentation prepends a string slot for the parameter summary and a stopwatch slot for
//! the timer, so every original local moves up by the number of prepended slots. Compiler
//! generated names of the form `V_k` follow their slot; any other name is kept.

use crate::{
    config::RuntimeReferences,
    listing::markers::instruction,
    model::{Local, LoggingMode, Method},
    weaver::emit::{format_instruction, indexed_form, BODY_INDENT},
};

/// Slot assignment of an instrumented method.
#[derive(Debug, Clone, Default)]
pub struct LocalsLayout {
    /// Slot of the parameter summary string
    pub summary: Option<usize>,
    /// Slot of the stopwatch
    pub timer: Option<usize>,
    /// Number of slots prepended before the original locals
    pub shift: usize,
    /// Final slots, prepended ones first
    pub locals: Vec<Local>,
    original_names: Vec<Option<String>>,
}

impl LocalsLayout {
    /// Computes the layout for `method` woven under `mode`.
    #[must_use]
    pub fn new(method: &Method, mode: LoggingMode, runtime: &RuntimeReferences) -> Self {
        let mut prepended = Vec::new();
        if mode.logs_parameters() {
            prepended.push("string".to_string());
        }
        if mode.logs_elapsed() {
            prepended.push(format!("class {}", runtime.stopwatch()));
        }
        let shift = prepended.len();

        let shifted = method
            .locals
            .iter()
            .enumerate()
            .map(|(index, local)| Local {
                type_name: local.type_name.clone(),
                name: local.name.as_ref().map(|name| {
                    if *name == format!("V_{index}") {
                        format!("V_{}", index + shift)
                    } else {
                        name.clone()
                    }
                }),
            })
            .collect::<Vec<_>>();

        let mut locals = Vec::with_capacity(shift + shifted.len());
        for (index, type_name) in prepended.into_iter().enumerate() {
            let preferred = format!("V_{index}");
            let taken = shifted
                .iter()
                .any(|local| local.name.as_deref() == Some(preferred.as_str()));
            let name = if taken {
                format!("weave_{index}")
            } else {
                preferred
            };
            locals.push(Local {
                type_name,
                name: Some(name),
            });
        }
        locals.extend(shifted);

        let summary = mode.logs_parameters().then_some(0);
        let timer = mode.logs_elapsed().then_some(usize::from(mode.logs_parameters()));

        LocalsLayout {
            summary,
            timer,
            shift,
            locals,
            original_names: method.locals.iter().map(|local| local.name.clone()).collect(),
        }
    }

    /// Original slot and final name of the local declared as `name`.
    fn resolve_name(&self, name: &str) -> Option<(usize, &str)> {
        let original = self
            .original_names
            .iter()
            .position(|candidate| candidate.as_deref() == Some(name))?;
        let renamed = self.locals.get(original + self.shift)?.name.as_deref()?;
        Some((original, renamed))
    }
}

/// Renders the declared-locals block of `method` under `layout`.
///
/// When nothing is prepended the original block is reproduced unchanged.
#[must_use]
pub fn rebuild_locals(method: &Method, layout: &LocalsLayout) -> Vec<String> {
    if layout.shift == 0 {
        return method.locals_lines.clone();
    }

    let indent = method
        .locals_lines
        .first()
        .map_or(BODY_INDENT, |line| &line[..line.len() - line.trim_start().len()]);
    let continuation = format!("{indent}{}", " ".repeat(9));

    let count = layout.locals.len();
    layout
        .locals
        .iter()
        .enumerate()
        .map(|(index, local)| {
            let prefix = if index == 0 {
                format!("{indent}.locals init (")
            } else {
                continuation.clone()
            };
            let name = local
                .name
                .as_ref()
                .map(|name| format!(" {name}"))
                .unwrap_or_default();
            let terminator = if index + 1 == count { ")" } else { "," };
            format!("{prefix}[{index}] {}{name}{terminator}", local.type_name)
        })
        .collect()
}

/// Rewrites a local load or store to address the shifted slot.
///
/// Returns `None` when the line does not touch a local, or when no slots were prepended.
#[must_use]
pub fn shift_local_reference(line: &str, layout: &LocalsLayout) -> Option<String> {
    if layout.shift == 0 {
        return None;
    }

    let instr = instruction(line)?;
    let (base, inline) = local_opcode(instr.opcode)?;
    let indent = &line[..line.len() - line.trim_start().len()];

    let index = match inline {
        Some(index) => Some(index),
        None => instr.operand.parse::<usize>().ok(),
    };

    let (opcode, operand) = match index {
        Some(index) => indexed_form(base, index + layout.shift, base != "ldloca"),
        None => {
            let (original, renamed) = layout.resolve_name(instr.operand)?;
            let opcode = if original + layout.shift <= 255 {
                format!("{base}.s")
            } else {
                base.to_string()
            };
            (opcode, renamed.to_string())
        }
    };

    Some(format_instruction(indent, instr.label, &opcode, &operand))
}

/// Splits a local access opcode into its family and inline slot.
fn local_opcode(opcode: &str) -> Option<(&'static str, Option<usize>)> {
    for base in ["ldloca", "ldloc", "stloc"] {
        if opcode == base {
            return Some((base, None));
        }
        let Some(suffix) = opcode.strip_prefix(base).and_then(|rest| rest.strip_prefix('.')) else {
            continue;
        };
        if suffix == "s" {
            return Some((base, None));
        }
        if base == "ldloca" {
            return None;
        }
        return suffix
            .parse::<usize>()
            .ok()
            .filter(|index| *index <= 3)
            .map(|index| (base, Some(index)));
    }
    None
}
