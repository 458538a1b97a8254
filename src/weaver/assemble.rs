//! Substitution of placeholders with original or generated lines.
//!
//! Resolution runs bottom-up: methods resolve their body placeholders, classes resolve their
//! method placeholders and receive sequence helpers, and the assembly resolves its class
//! placeholders. Every placeholder must be resolved exactly once; anything else is an internal
//! consistency failure and the partially substituted listing is discarded.

use std::collections::HashSet;

use log::{debug, warn};

use crate::{
    config::WeaveConfig,
    listing::markers::{is_close_brace, is_end_of_class},
    model::{
        Assembly, Class, Line, LoggingMode, Method, Placeholder, SequenceVariants, SinkRef,
    },
    weaver::{
        elapsed::{elapsed_block_depth, emit_elapsed_block},
        emit::{widen_short_branch, BlockWriter, BODY_INDENT},
        labels::LabelAllocator,
        locals::{rebuild_locals, shift_local_reference, LocalsLayout},
        params::{emit_parameter_block, emit_timer_start, parameter_block_depth, EntryContext},
        sequence::HelperNames,
    },
    Error, Result,
};

/// `.maxstack` assumed by the runtime when the directive is absent.
pub const DEFAULT_MAX_STACK: u32 = 8;

/// Public key tokens of framework reference assemblies.
const KNOWN_PUBLIC_KEY_TOKENS: &[(&str, &str)] = &[
    ("mscorlib", "B7 7A 5C 56 19 34 E0 89"),
    ("System.Private.CoreLib", "7C EC 85 D7 BE A7 79 8E"),
];
const FRAMEWORK_PUBLIC_KEY_TOKEN: &str = "B0 3F 5F 7F 11 D5 0A 3A";

/// Renders `assembly` with instrumentation applied.
///
/// # Errors
/// Returns [`Error::DuplicateSink`] for multiple sinks in strict mode, and
/// [`Error::UnresolvedPlaceholder`] or [`Error::DuplicatePlaceholder`] when the model is
/// inconsistent.
pub fn assemble(assembly: &Assembly, config: &WeaveConfig) -> Result<String> {
    Assembler::new(assembly, config)?.render()
}

/// Placeholder resolution over one assembly.
pub struct Assembler<'a> {
    assembly: &'a Assembly,
    config: &'a WeaveConfig,
    sink: Option<SinkRef>,
    instrumented: usize,
    uses_timer: bool,
    unserved: usize,
}

impl<'a> Assembler<'a> {
    /// Prepares the assembler, resolving the sink.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateSink`] for multiple sinks in strict mode.
    pub fn new(assembly: &'a Assembly, config: &'a WeaveConfig) -> Result<Self> {
        let sink = assembly.sink(config)?;
        if let Some(sink) = &sink {
            debug!("Using sink {}", sink.call_operand());
        }

        Ok(Assembler {
            assembly,
            config,
            sink,
            instrumented: 0,
            uses_timer: false,
            unserved: 0,
        })
    }

    /// The resolved sink, if the assembly declares a usable one.
    #[must_use]
    pub fn sink(&self) -> Option<&SinkRef> {
        self.sink.as_ref()
    }

    /// The mode `method` is actually woven with.
    ///
    /// A method is left untouched when it is the sink, when there is no sink it can call, or
    /// when its body has no entry point to instrument.
    #[must_use]
    pub fn effective_mode(&self, class_index: usize, class: &Class, method: &Method) -> LoggingMode {
        let mode = LoggingMode::resolve(method.logging_mode, class.logging_mode, method.is_sink);
        if !mode.is_active() {
            return LoggingMode::None;
        }

        let Some(sink) = &self.sink else {
            return LoggingMode::None;
        };
        if !method.has_start() {
            debug!("{}::{} has no body to instrument", class.full_name, method.name);
            return LoggingMode::None;
        }
        if !sink.is_callable_from(class_index, method) {
            debug!(
                "{}::{} cannot reach the instance sink, leaving it untouched",
                class.full_name, method.name
            );
            return LoggingMode::None;
        }

        mode
    }

    /// Resolves every placeholder and joins the result.
    ///
    /// # Errors
    /// Returns [`Error::UnresolvedPlaceholder`] or [`Error::DuplicatePlaceholder`] when a
    /// placeholder cannot be matched to exactly one entity.
    pub fn render(mut self) -> Result<String> {
        let assembly = self.assembly;

        let mut classes = Vec::with_capacity(assembly.classes.len());
        for (index, class) in assembly.classes.iter().enumerate() {
            classes.push(Some(self.render_class(index, class)?));
        }

        let externs = self.missing_externs();
        let mut out = Vec::new();
        if assembly.declaration_line.is_none() {
            out.extend(externs.iter().cloned());
        }

        for (position, line) in assembly.lines.iter().enumerate() {
            if Some(position) == assembly.declaration_line {
                out.extend(externs.iter().cloned());
            }

            match line {
                Line::Text(text) => out.push(text.clone()),
                Line::Placeholder(Placeholder::Class(index)) => {
                    let slot = classes
                        .get_mut(*index)
                        .ok_or_else(|| Error::UnresolvedPlaceholder(line.to_string()))?;
                    let lines = slot.take().ok_or_else(|| {
                        Error::DuplicatePlaceholder(assembly.classes[*index].full_name.clone())
                    })?;
                    out.extend(lines);
                }
                Line::Placeholder(other) => {
                    return Err(Error::UnresolvedPlaceholder(format!(
                        "{other} at assembly level"
                    )));
                }
            }
        }

        if let Some(index) = classes.iter().position(Option::is_some) {
            return Err(Error::UnresolvedPlaceholder(
                assembly.classes[index].full_name.clone(),
            ));
        }

        if self.unserved > 0 {
            warn!(
                "{} methods request logging but the assembly has no usable sink",
                self.unserved
            );
        }
        debug!("Instrumented {} methods", self.instrumented);

        let line_ending = assembly.line_ending();
        let mut text = out.join(line_ending);
        if assembly.trailing_newline {
            text.push_str(line_ending);
        }
        Ok(text)
    }

    fn render_class(&mut self, class_index: usize, class: &Class) -> Result<Vec<String>> {
        let modes = class
            .methods
            .iter()
            .map(|method| self.effective_mode(class_index, class, method))
            .collect::<Vec<_>>();

        if self.sink.is_none() {
            self.unserved += class
                .methods
                .iter()
                .filter(|method| {
                    LoggingMode::resolve(method.logging_mode, class.logging_mode, method.is_sink)
                        .is_active()
                })
                .count();
        }

        let variants = class
            .methods
            .iter()
            .zip(&modes)
            .filter(|(method, mode)| mode.logs_parameters() && method.has_sequence_parameters())
            .fold(SequenceVariants::empty(), |variants, (method, _)| {
                variants | SequenceVariants::for_method(method)
            });
        let helpers = HelperNames::allocate(class, variants);

        let closing = class
            .lines
            .iter()
            .rposition(|line| line.as_text().is_some_and(is_end_of_class))
            .or_else(|| {
                class
                    .lines
                    .iter()
                    .rposition(|line| line.as_text().is_some_and(is_close_brace))
            });

        let mut rendered = vec![false; class.methods.len()];
        let mut out = Vec::new();
        for (position, line) in class.lines.iter().enumerate() {
            if Some(position) == closing {
                out.extend(helpers.emit(class, self.config));
            }

            match line {
                Line::Text(text) => out.push(text.clone()),
                Line::Placeholder(Placeholder::Method(index)) => {
                    let (Some(method), Some(done)) =
                        (class.methods.get(*index), rendered.get_mut(*index))
                    else {
                        return Err(Error::UnresolvedPlaceholder(format!(
                            "{line} in class {}",
                            class.full_name
                        )));
                    };
                    if std::mem::replace(done, true) {
                        return Err(Error::DuplicatePlaceholder(format!(
                            "{}::{}",
                            class.full_name, method.name
                        )));
                    }
                    out.extend(self.render_method(class, method, modes[*index], &helpers)?);
                }
                Line::Placeholder(other) => {
                    return Err(Error::UnresolvedPlaceholder(format!(
                        "{other} in class {}",
                        class.full_name
                    )));
                }
            }
        }

        if closing.is_none() {
            out.extend(helpers.emit(class, self.config));
        }

        if let Some(index) = rendered.iter().position(|done| !done) {
            return Err(Error::UnresolvedPlaceholder(format!(
                "{}::{}",
                class.full_name, class.methods[index].name
            )));
        }

        Ok(out)
    }

    fn render_method(
        &mut self,
        class: &Class,
        method: &Method,
        mode: LoggingMode,
        helpers: &HelperNames,
    ) -> Result<Vec<String>> {
        let qualified = || format!("{}::{}", class.full_name, method.name);
        let sink = match &self.sink {
            Some(sink) if mode.is_active() => Some(sink.clone()),
            _ => None,
        };

        let config = self.config;
        let runtime = &config.runtime;
        let helper = helpers.for_method(method);
        let layout = match sink {
            Some(_) => LocalsLayout::new(method, mode, runtime),
            None => LocalsLayout::default(),
        };
        let required = sink
            .as_ref()
            .map(|sink| required_stack(method, mode, sink, helper.is_some(), config));
        let mut labels = LabelAllocator::new(method.known_labels());

        if sink.is_some() {
            debug!("Weaving {} ({mode})", qualified());
            self.instrumented += 1;
            self.uses_timer |= mode.logs_elapsed();
        }

        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(method.lines.len());
        for line in &method.lines {
            let placeholder = match line {
                Line::Text(text) if sink.is_some() => {
                    let text = shift_local_reference(text, &layout).unwrap_or_else(|| text.clone());
                    out.push(widen_short_branch(&text).unwrap_or(text));
                    continue;
                }
                Line::Text(text) => {
                    out.push(text.clone());
                    continue;
                }
                Line::Placeholder(placeholder) => *placeholder,
            };

            if !seen.insert(placeholder) {
                return Err(Error::DuplicatePlaceholder(format!(
                    "{placeholder} in {}",
                    qualified()
                )));
            }

            match (placeholder, &sink, required) {
                (Placeholder::MaxStack, Some(_), Some(required)) => {
                    let original = method.max_stack.unwrap_or(DEFAULT_MAX_STACK);
                    let indent = method
                        .max_stack_line
                        .as_deref()
                        .map_or(BODY_INDENT, |line| &line[..line.len() - line.trim_start().len()]);
                    out.push(format!("{indent}.maxstack  {}", original.max(required)));
                }
                (Placeholder::MaxStack, ..) => out.extend(method.max_stack_line.iter().cloned()),
                (Placeholder::Locals, Some(_), Some(required)) => {
                    if method.max_stack_line.is_none() && required > DEFAULT_MAX_STACK {
                        out.push(format!("{BODY_INDENT}.maxstack  {required}"));
                    }
                    out.extend(rebuild_locals(method, &layout));
                }
                (Placeholder::Locals, ..) => out.extend(method.locals_lines.iter().cloned()),
                (Placeholder::Start, Some(_), _) => {
                    let class_target = class.call_target();
                    let context = EntryContext {
                        runtime,
                        class_target: &class_target,
                        helper,
                    };
                    let mut w = BlockWriter::new(&mut labels);
                    emit_parameter_block(&mut w, method, &layout, &context);
                    emit_timer_start(&mut w, &layout, runtime);
                    out.extend(w.finish());
                }
                (Placeholder::Start, ..) => {}
                (Placeholder::End, sink, _) => {
                    let return_line = method.return_line.as_deref().ok_or_else(|| {
                        Error::UnresolvedPlaceholder(format!("{placeholder} in {}", qualified()))
                    })?;
                    match sink {
                        Some(sink) => {
                            let mut w = BlockWriter::new(&mut labels);
                            emit_elapsed_block(&mut w, method, &layout, sink, return_line, runtime);
                            out.extend(w.finish());
                        }
                        None => out.push(return_line.to_string()),
                    }
                }
                (Placeholder::Class(_) | Placeholder::Method(_), ..) => {
                    return Err(Error::UnresolvedPlaceholder(format!(
                        "{placeholder} in {}",
                        qualified()
                    )));
                }
            }
        }

        Ok(out)
    }

    /// `.assembly extern` declarations generated code needs and the listing lacks.
    fn missing_externs(&self) -> Vec<String> {
        let runtime = &self.config.runtime;
        let mut needed = Vec::new();
        if self.instrumented > 0 {
            needed.push(runtime.core.as_str());
        }
        if self.uses_timer && !needed.contains(&runtime.diagnostics.as_str()) {
            needed.push(runtime.diagnostics.as_str());
        }

        needed
            .into_iter()
            .filter(|name| {
                !self.assembly.externs.contains(*name) && self.assembly.name.as_deref() != Some(*name)
            })
            .flat_map(|name| {
                debug!("Adding reference to {name}");
                extern_declaration(name)
            })
            .collect()
    }
}

/// Deepest evaluation stack the generated code of `method` needs.
fn required_stack(
    method: &Method,
    mode: LoggingMode,
    sink: &SinkRef,
    has_helper: bool,
    config: &WeaveConfig,
) -> u32 {
    let mut required = 1;
    if mode.logs_parameters() {
        required = required.max(parameter_block_depth(method, has_helper, &config.runtime));
    }
    if method.return_line.is_some() {
        required = required.max(elapsed_block_depth(method, sink));
    }
    required
}

fn extern_declaration(name: &str) -> Vec<String> {
    let token = KNOWN_PUBLIC_KEY_TOKENS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, token)| *token)
        .or_else(|| name.starts_with("System.").then_some(FRAMEWORK_PUBLIC_KEY_TOKEN));

    let mut lines = vec![format!(".assembly extern {name}"), "{".to_string()];
    if let Some(token) = token {
        lines.push(format!("  .publickeytoken = ({token} )"));
    }
    lines.push("}".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        listing::parse_listing,
        test::{fixtures, lines_containing, method_text},
    };

    fn weave(listing: &str) -> String {
        let config = WeaveConfig::default();
        let assembly = parse_listing(listing, &config).unwrap();
        assemble(&assembly, &config).unwrap()
    }

    #[test]
    fn instruments_process() {
        let woven = weave(fixtures::PROGRAM);
        let process = method_text(&woven, "Program", "Process");

        assert!(process.contains("    .maxstack  5"));
        assert!(process.contains("    .locals init ([0] string V_0,"));
        assert!(process.contains("             [3] bool V_3)"));
        assert!(process.contains("    IL_0000:  nop"));
        assert!(process.contains("ldstr      \"count=\""));
        assert!(process.contains("ldstr      \"; items=\""));
        assert!(process.contains("call       string Demo.Program::WeaveSequenceToStringStatic(object, bool)"));
        assert!(process.contains("    IL_0002:  stloc.2"));
        assert!(process.contains("    IL_0009:  brfalse    IL_0011"));
        assert!(process.contains("    IL_0011:  ldloc.1"));
        assert!(process.contains("ldstr      \"Process\""));
        assert!(process.contains("call       void Demo.Program::LogIt(string, string, int64)"));
        assert!(!process.contains("IL_0011:  ret"));
    }

    #[test]
    fn method_override_and_value_return() {
        let woven = weave(fixtures::PROGRAM);
        let add = method_text(&woven, "Program", "Add");

        assert!(add.contains("    .maxstack  4"));
        assert!(add.contains("    .locals init ([0] class [System.Runtime.Extensions]System.Diagnostics.Stopwatch V_0,"));
        assert!(add.contains("             [1] int32 V_1)"));
        assert!(add.contains("    IL_0004:  stloc.1"));
        assert!(add.contains("    IL_0005:  br         IL_0007"));
        assert!(add.contains("    IL_0007:  ldloc.1"));
        assert!(add.contains("    IL_0008:  ldloc.0"));
        assert!(!add.contains("count="));
        assert!(!add.contains("newarr"));
    }

    #[test]
    fn sink_and_special_methods_untouched() {
        let woven = weave(fixtures::PROGRAM);
        let sink = method_text(&woven, "Program", "LogIt");
        let original = method_text(fixtures::PROGRAM, "Program", "LogIt");
        assert_eq!(sink, original);
        assert_eq!(
            method_text(&woven, "Cache", "Clear"),
            method_text(fixtures::PROGRAM, "Cache", "Clear")
        );
        assert_eq!(
            method_text(&woven, "Helper", ".ctor"),
            method_text(fixtures::PROGRAM, "Helper", ".ctor")
        );
    }

    #[test]
    fn helper_and_references() {
        let woven = weave(fixtures::PROGRAM);

        assert_eq!(lines_containing(&woven, "string  WeaveSequenceToStringStatic(").len(), 1);
        assert!(lines_containing(&woven, "string  WeaveSequenceToString(").is_empty());
        let helper = woven.find("WeaveSequenceToStringStatic(object items").unwrap();
        let closing = woven.find("} // end of class Demo.Program").unwrap();
        assert!(helper < closing);

        let reference = woven.find(".assembly extern System.Runtime.Extensions").unwrap();
        let declaration = woven.find(".assembly Demo").unwrap();
        assert!(reference < declaration);
        assert_eq!(lines_containing(&woven, ".assembly extern System.Runtime").len(), 2);
        for marker in ["CLASS_", "METHOD_", "MAXSTACK", "LOCALS", "START", "END"] {
            assert!(!woven.contains(&format!("***{marker}")));
        }
        assert!(woven.ends_with('\n'));
    }

    #[test]
    fn without_sink_the_listing_is_unchanged() {
        let woven = weave(fixtures::WRAPPED_HEADERS);
        assert_eq!(woven, fixtures::WRAPPED_HEADERS);
    }

    #[test]
    fn instance_sink_scope() {
        let woven = weave(fixtures::INSTANCE_SINK);

        let bump = method_text(&woven, "Counter", "Bump");
        assert!(bump.contains("call       instance string Demo.Counter::WeaveSequenceToString(object, bool)"));
        assert!(bump.contains("call       instance void Demo.Counter::Record(string, string, int64)"));
        assert!(bump.contains("    .maxstack  8"));

        assert_eq!(
            method_text(&woven, "Counter", "Reset"),
            method_text(fixtures::INSTANCE_SINK, "Counter", "Reset")
        );
        assert_eq!(
            method_text(&woven, "Counter", "Record"),
            method_text(fixtures::INSTANCE_SINK, "Counter", "Record")
        );
    }

    #[test]
    fn placeholder_consistency() {
        let config = WeaveConfig::default();
        let mut assembly = parse_listing(fixtures::PROGRAM, &config).unwrap();
        assembly.lines.push(Line::Placeholder(Placeholder::Class(0)));
        assert!(matches!(
            assemble(&assembly, &config),
            Err(Error::DuplicatePlaceholder(_))
        ));

        let mut assembly = parse_listing(fixtures::PROGRAM, &config).unwrap();
        assembly.lines.push(Line::Placeholder(Placeholder::Class(9)));
        assert!(matches!(
            assemble(&assembly, &config),
            Err(Error::UnresolvedPlaceholder(_))
        ));

        let mut assembly = parse_listing(fixtures::PROGRAM, &config).unwrap();
        assembly.classes[0].methods[0].lines.push(Line::Placeholder(Placeholder::Start));
        assert!(matches!(
            assemble(&assembly, &config),
            Err(Error::DuplicatePlaceholder(_))
        ));
    }

    #[test]
    fn extern_tokens() {
        assert_eq!(
            extern_declaration("System.Runtime.Extensions")[2],
            "  .publickeytoken = (B0 3F 5F 7F 11 D5 0A 3A )"
        );
        assert_eq!(extern_declaration("Profiler").len(), 3);
    }
}
