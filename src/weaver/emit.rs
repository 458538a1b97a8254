//! Instruction formatting shared by the generators.

use crate::{listing::markers::instruction, weaver::labels::LabelAllocator};

/// Indentation of instructions inside a method body.
pub const BODY_INDENT: &str = "    ";

/// Short branch opcodes and their long forms.
const SHORT_BRANCHES: &[(&str, &str)] = &[
    ("br.s", "br"),
    ("brfalse.s", "brfalse"),
    ("brnull.s", "brnull"),
    ("brzero.s", "brzero"),
    ("brtrue.s", "brtrue"),
    ("brinst.s", "brinst"),
    ("beq.s", "beq"),
    ("bge.s", "bge"),
    ("bgt.s", "bgt"),
    ("ble.s", "ble"),
    ("blt.s", "blt"),
    ("bne.un.s", "bne.un"),
    ("bge.un.s", "bge.un"),
    ("bgt.un.s", "bgt.un"),
    ("ble.un.s", "ble.un"),
    ("blt.un.s", "blt.un"),
    ("leave.s", "leave"),
];

/// Formats a labelled instruction the way the disassembler lays it out.
#[must_use]
pub fn format_instruction(indent: &str, label: &str, opcode: &str, operand: &str) -> String {
    if operand.is_empty() {
        format!("{indent}{label}:  {opcode}")
    } else {
        format!("{indent}{label}:  {opcode:<10} {operand}")
    }
}

/// Escapes text for a `ldstr` literal.
#[must_use]
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Rewrites a short-form branch to its long form, keeping label, operand and indentation.
///
/// Generated code grows method bodies, so short branches may no longer reach their targets.
#[must_use]
pub fn widen_short_branch(line: &str) -> Option<String> {
    let instr = instruction(line)?;
    let (_, long) = SHORT_BRANCHES
        .iter()
        .find(|(short, _)| *short == instr.opcode)?;
    let indent = &line[..line.len() - line.trim_start().len()];
    Some(format_instruction(indent, instr.label, long, instr.operand))
}

/// Opcode and operand addressing `index` in a family with `.0`-`.3`, `.s` and long forms.
pub(crate) fn indexed_form(base: &str, index: usize, has_inline: bool) -> (String, String) {
    match index {
        0..=3 if has_inline => (format!("{base}.{index}"), String::new()),
        0..=255 => (format!("{base}.s"), index.to_string()),
        _ => (base.to_string(), index.to_string()),
    }
}

/// Writes a block of labelled instructions.
///
/// Each instruction takes a fresh label from the allocator unless a label was placed with
/// [`BlockWriter::place`], in which case the next instruction takes that one.
pub struct BlockWriter<'a> {
    labels: &'a mut LabelAllocator,
    indent: String,
    pending: Option<String>,
    lines: Vec<String>,
}

impl<'a> BlockWriter<'a> {
    /// Creates a writer indenting instructions with [`BODY_INDENT`].
    pub fn new(labels: &'a mut LabelAllocator) -> Self {
        BlockWriter {
            labels,
            indent: BODY_INDENT.to_string(),
            pending: None,
            lines: Vec::new(),
        }
    }

    /// Reserves a label for a later [`BlockWriter::place`].
    pub fn reserve(&mut self) -> String {
        self.labels.next_label()
    }

    /// Makes `label` the label of the next instruction.
    pub fn place(&mut self, label: impl Into<String>) {
        self.pending = Some(label.into());
    }

    /// Emits `opcode operand`.
    pub fn emit(&mut self, opcode: &str, operand: &str) {
        let label = match self.pending.take() {
            Some(label) => label,
            None => self.labels.next_label(),
        };
        self.lines
            .push(format_instruction(&self.indent, &label, opcode, operand));
    }

    /// Emits an instruction without operand.
    pub fn op(&mut self, opcode: &str) {
        self.emit(opcode, "");
    }

    /// Pushes a 32-bit constant using the shortest form.
    pub fn ldc_i4(&mut self, value: i32) {
        match value {
            -1 => self.op("ldc.i4.m1"),
            0..=8 => self.op(&format!("ldc.i4.{value}")),
            -128..=127 => self.emit("ldc.i4.s", &value.to_string()),
            _ => self.emit("ldc.i4", &value.to_string()),
        }
    }

    /// Pushes a string literal.
    pub fn ldstr(&mut self, text: &str) {
        self.emit("ldstr", &format!("\"{}\"", escape_literal(text)));
    }

    /// Loads the argument in slot `index`.
    pub fn ldarg(&mut self, index: usize) {
        self.indexed("ldarg", index, true);
    }

    /// Loads the address of the argument in slot `index`.
    pub fn ldarga(&mut self, index: usize) {
        self.indexed("ldarga", index, false);
    }

    /// Loads the local in slot `index`.
    pub fn ldloc(&mut self, index: usize) {
        self.indexed("ldloc", index, true);
    }

    /// Stores into the local in slot `index`.
    pub fn stloc(&mut self, index: usize) {
        self.indexed("stloc", index, true);
    }

    fn indexed(&mut self, base: &str, index: usize, has_inline: bool) {
        let (opcode, operand) = indexed_form(base, index, has_inline);
        self.emit(&opcode, &operand);
    }

    /// Consumes the writer, returning the emitted lines.
    #[must_use]
    pub fn finish(self) -> Vec<String> {
        self.lines
    }
}
