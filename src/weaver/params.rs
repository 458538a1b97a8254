//! The method entry block: parameter summary and timer start.

use crate::{
    config::RuntimeReferences,
    model::Method,
    weaver::{
        emit::BlockWriter,
        locals::LocalsLayout,
        typemap::{map_type, StringifyTarget},
    },
};

/// Entry points the parameter block calls into.
pub struct EntryContext<'a> {
    /// Framework scopes of generated references
    pub runtime: &'a RuntimeReferences,
    /// Call target of the declaring class
    pub class_target: &'a str,
    /// Sequence helper callable from the method, if any
    pub helper: Option<&'a str>,
}

/// Emits code building `"name=value; name=value"` into the summary slot.
///
/// Values are loaded by argument slot, so unnamed or duplicate parameter names are harmless.
pub fn emit_parameter_block(
    w: &mut BlockWriter<'_>,
    method: &Method,
    layout: &LocalsLayout,
    context: &EntryContext<'_>,
) {
    let Some(summary) = layout.summary else {
        return;
    };
    let runtime = context.runtime;

    if method.parameters.is_empty() {
        w.ldstr("");
        w.stloc(summary);
        return;
    }

    let convert = format!("string {}::ToString(object)", runtime.core_type("Convert"));
    let count = method.parameters.len();
    w.ldc_i4(i32::try_from(count * 2).unwrap_or(i32::MAX));
    w.emit("newarr", &runtime.core_type("String"));

    for (position, parameter) in method.parameters.iter().enumerate() {
        let slot = i32::try_from(position * 2).unwrap_or(i32::MAX);
        let argument = method.argument_index(position);
        let separator = if position == 0 { "" } else { "; " };

        w.op("dup");
        w.ldc_i4(slot);
        w.ldstr(&format!("{separator}{}=", parameter.display_name()));
        w.op("stelem.ref");

        w.op("dup");
        w.ldc_i4(slot.saturating_add(1));
        match map_type(&parameter.type_name, runtime) {
            StringifyTarget::Value(type_name) => {
                w.ldarga(argument);
                w.emit("call", &format!("instance string {type_name}::ToString()"));
            }
            StringifyTarget::Reference => {
                w.ldarg(argument);
                w.emit("call", &convert);
            }
            StringifyTarget::Boxed(type_name) => {
                w.ldarg(argument);
                w.emit("box", &type_name);
                w.emit("call", &convert);
            }
            StringifyTarget::Sequence(boxed) => match context.helper {
                Some(helper) => {
                    if !method.is_static {
                        w.ldarg(0);
                    }
                    w.ldarg(argument);
                    if let Some(type_name) = boxed {
                        w.emit("box", &type_name);
                    }
                    w.ldc_i4(0);
                    let instance = if method.is_static { "" } else { "instance " };
                    w.emit(
                        "call",
                        &format!(
                            "{instance}string {}::{helper}(object, bool)",
                            context.class_target
                        ),
                    );
                }
                None => {
                    w.ldarg(argument);
                    if let Some(type_name) = boxed {
                        w.emit("box", &type_name);
                    }
                    w.emit("call", &convert);
                }
            },
            StringifyTarget::Opaque(literal) => w.ldstr(literal),
        }
        w.op("stelem.ref");
    }

    w.emit(
        "call",
        &format!("string {}::Concat(string[])", runtime.core_type("String")),
    );
    w.stloc(summary);
}

/// Emits code starting the stopwatch into the timer slot.
pub fn emit_timer_start(w: &mut BlockWriter<'_>, layout: &LocalsLayout, runtime: &RuntimeReferences) {
    let Some(timer) = layout.timer else {
        return;
    };
    let stopwatch = runtime.stopwatch();
    w.emit("call", &format!("class {stopwatch} {stopwatch}::StartNew()"));
    w.stloc(timer);
}

/// Evaluation stack depth the parameter block needs.
#[must_use]
pub fn parameter_block_depth(method: &Method, has_helper: bool, runtime: &RuntimeReferences) -> u32 {
    method
        .parameters
        .iter()
        .map(|parameter| match map_type(&parameter.type_name, runtime) {
            StringifyTarget::Sequence(_) if has_helper && method.is_static => 5,
            StringifyTarget::Sequence(_) if has_helper => 6,
            _ => 4,
        })
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{LoggingMode, Parameter},
        weaver::labels::LabelAllocator,
    };

    fn render(method: &Method, helper: Option<&str>) -> Vec<String> {
        let runtime = RuntimeReferences::default();
        let layout = LocalsLayout::new(method, LoggingMode::All, &runtime);
        let context = EntryContext {
            runtime: &runtime,
            class_target: "Demo.Program",
            helper,
        };
        let mut labels = LabelAllocator::default();
        let mut w = BlockWriter::new(&mut labels);
        emit_parameter_block(&mut w, method, &layout, &context);
        emit_timer_start(&mut w, &layout, &runtime);
        w.finish()
    }

    #[test]
    fn summary_of_mixed_parameters() {
        let mut method = Method::new("Process", true);
        method.parameters = vec![
            Parameter::new("int32", "count"),
            Parameter::new("string[]", "items"),
            Parameter::new("valuetype Demo.Point", "at"),
        ];
        let lines = render(&method, Some("Render"));

        assert!(lines[0].ends_with("ldc.i4.6"));
        assert!(lines[1].ends_with("newarr     [System.Runtime]System.String"));
        assert!(lines.iter().any(|line| line.ends_with("ldstr      \"count=\"")));
        assert!(lines.iter().any(|line| line.ends_with("ldstr      \"; items=\"")));
        assert!(lines.iter().any(|line| line.ends_with("ldarga.s   0")));
        assert!(lines
            .iter()
            .any(|line| line.ends_with("call       instance string [System.Runtime]System.Int32::ToString()")));
        assert!(lines
            .iter()
            .any(|line| line.ends_with("call       string Demo.Program::Render(object, bool)")));
        assert!(lines.iter().any(|line| line.ends_with("box        valuetype Demo.Point")));
        assert!(lines.iter().any(|line| line.ends_with("stloc.0")));
        assert!(lines
            .last()
            .is_some_and(|line| line.ends_with("stloc.1")));
        assert_eq!(parameter_block_depth(&method, true, &RuntimeReferences::default()), 5);
    }

    #[test]
    fn instance_sequence_uses_this() {
        let mut method = Method::new("Walk", false);
        method.parameters = vec![Parameter::new("int32[]", "values")];
        let lines = render(&method, Some("Render"));

        let call = lines
            .iter()
            .position(|line| line.contains("::Render(object, bool)"))
            .unwrap();
        assert!(lines[call].contains("call       instance string"));
        assert!(lines[call - 3].ends_with("ldarg.0"));
        assert!(lines[call - 2].ends_with("ldarg.1"));
        assert_eq!(parameter_block_depth(&method, true, &RuntimeReferences::default()), 6);
    }

    #[test]
    fn enum_parameter_is_boxed() {
        let mut method = Method::new("Show", true);
        method.parameters = vec![Parameter::new(
            "valuetype [System.Runtime]System.DayOfWeek",
            "day",
        )];
        let lines = render(&method, None);

        assert!(lines
            .iter()
            .any(|line| line.ends_with("box        valuetype [System.Runtime]System.DayOfWeek")));
        assert!(lines
            .iter()
            .any(|line| line.ends_with("call       string [System.Runtime]System.Convert::ToString(object)")));
        assert!(!lines.iter().any(|line| line.contains("ldarga")));
        assert!(!lines.iter().any(|line| line.contains("DayOfWeek::ToString()")));
    }

    #[test]
    fn no_parameters() {
        let method = Method::new("Tick", true);
        let lines = render(&method, None);
        assert!(lines[0].ends_with("ldstr      \"\""));
        assert!(lines[1].ends_with("stloc.0"));
        assert_eq!(parameter_block_depth(&method, false, &RuntimeReferences::default()), 1);
    }
}
