//! Line predicates and extractors for the disassembler's listing grammar.
//!
//! Every structural heuristic the parser relies on lives here as a small named function over a
//! single line, so the state machine in [`crate::listing::parser`] only decides transitions.

use std::ops::Range;

use crate::model::{Local, Parameter};

/// Class declaration flags that precede the class name.
const CLASS_FLAGS: &[&str] = &[
    "public",
    "private",
    "nested",
    "assembly",
    "family",
    "famandassem",
    "famorassem",
    "auto",
    "ansi",
    "unicode",
    "autochar",
    "sequential",
    "explicit",
    "sealed",
    "abstract",
    "beforefieldinit",
    "interface",
    "serializable",
    "specialname",
    "rtspecialname",
    "import",
    "windowsruntime",
    "value",
    "enum",
];

/// Parameter attributes that may precede a parameter type.
const PARAMETER_FLAGS: &[&str] = &["[in]", "[out]", "[opt]"];

/// A decoded instruction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// The leading label, e.g. `IL_0004`
    pub label: &'a str,
    /// The opcode, e.g. `ldloc.s`
    pub opcode: &'a str,
    /// Everything after the opcode, comments excluded
    pub operand: &'a str,
}

/// Returns `true` for a `.class` declaration.
#[must_use]
pub fn is_class_declaration(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with(".class ") && !trimmed.starts_with(".class extern ")
}

/// Returns `true` for a nested class declaration.
#[must_use]
pub fn is_nested_class_declaration(line: &str) -> bool {
    is_class_declaration(line) && line.split_whitespace().any(|token| token == "nested")
}

/// Extracts the declared full name of a class, generic parameters included.
#[must_use]
pub fn class_full_name(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix(".class ")?;
    let rest = rest.split(" extends ").next().unwrap_or(rest);
    let rest = rest.split(" implements ").next().unwrap_or(rest);

    let mut remaining = rest.trim_start();
    while let Some(token) = remaining.split_whitespace().next() {
        if !CLASS_FLAGS.contains(&token) {
            break;
        }
        remaining = remaining[token.len()..].trim_start();
    }

    let name = remaining.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Returns `true` if a class header line derives from `System.ValueType` or `System.Enum`.
#[must_use]
pub fn is_value_type_base(line: &str) -> bool {
    line.contains("extends")
        && (line.contains("System.ValueType") || line.trim_end().ends_with("System.Enum"))
}

/// Returns `true` for the closing line of a class.
#[must_use]
pub fn is_end_of_class(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('}') && trimmed.contains("// end of class")
}

/// Returns `true` for a `.method` declaration.
#[must_use]
pub fn is_method_declaration(line: &str) -> bool {
    line.trim_start().starts_with(".method ")
}

/// Returns `true` for constructors and type initializers.
#[must_use]
pub fn is_special_method(line: &str) -> bool {
    line.split_whitespace().any(|token| token == "rtspecialname")
}

/// Returns `true` if the declaration line marks the method `static`.
#[must_use]
pub fn is_static_method(line: &str) -> bool {
    let signature = match find_top_level(line, '(') {
        Some(open) => &line[..open],
        None => line,
    };
    signature.split_whitespace().any(|token| token == "static")
}

/// Returns `true` if the declared return type, the token before the name, is `void`.
///
/// For a wrapped declaration the return type is the last token of the `.method` line.
#[must_use]
pub fn returns_void(line: &str) -> bool {
    let signature = match method_name_span(line) {
        Some(span) => &line[..span.start],
        None => line,
    };
    signature.split_whitespace().last() == Some("void")
}

/// Locates the method name: between the double space after the return type and the opening
/// parenthesis of the parameter list.
///
/// Returns `None` when the line has no parameter list, e.g. when the disassembler wrapped the
/// declaration and the name continues on the next line.
#[must_use]
pub fn method_name_span(line: &str) -> Option<Range<usize>> {
    let marker = line.trim_start();
    let offset = line.len() - marker.len();
    let gap = marker.find("  ")?;
    let start = offset + gap + marker[gap..].len() - marker[gap..].trim_start().len();
    let open = start + find_top_level(&line[start..], '(')?;

    let name = line[start..open].trim_end();
    if name.is_empty() {
        return None;
    }
    Some(start..start + name.len())
}

/// Locates the method name on the continuation line of a wrapped declaration.
#[must_use]
pub fn wrapped_method_name_span(line: &str) -> Option<Range<usize>> {
    let start = line.len() - line.trim_start().len();
    let open = start + find_top_level(&line[start..], '(')?;
    let name = line[start..open].trim_end();
    if name.is_empty() {
        return None;
    }
    Some(start..start + name.len())
}

/// Splits the parameter text of one header line into parameters.
///
/// `text` starts inside the parameter list. Returns the parameters found and whether the list
/// closed on this line.
#[must_use]
pub fn header_parameters(text: &str) -> (Vec<Parameter>, bool) {
    let mut parameters = Vec::new();
    let mut depth = 0_i32;
    let mut segment_start = 0;

    for (index, ch) in text.char_indices() {
        match ch {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' => depth -= 1,
            ')' if depth > 0 => depth -= 1,
            ')' => {
                parameters.extend(extract_parameter(&text[segment_start..index]));
                if let Some(last) = parameters.last_mut() {
                    last.is_last = true;
                }
                return (parameters, true);
            }
            ',' if depth == 0 => {
                parameters.extend(extract_parameter(&text[segment_start..index]));
                segment_start = index + 1;
            }
            _ => {}
        }
    }

    parameters.extend(extract_parameter(&text[segment_start..]));
    (parameters, false)
}

/// Extracts one parameter from its declaration text, e.g. `int32 count` or
/// `[opt] class [System.Runtime]System.String name`.
#[must_use]
pub fn extract_parameter(text: &str) -> Option<Parameter> {
    let text = match text.find(" marshal(") {
        Some(marshal) => &text[..marshal],
        None => text,
    };

    let mut tokens = text
        .split_whitespace()
        .skip_while(|token| PARAMETER_FLAGS.contains(token))
        .collect::<Vec<_>>();

    match tokens.len() {
        0 => None,
        1 => Some(Parameter::new(tokens[0], "")),
        _ => {
            let name = tokens.pop()?;
            Some(Parameter::new(tokens.join(" "), name))
        }
    }
}

/// Returns `true` for the closing line of a method.
#[must_use]
pub fn is_end_of_method(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('}') && trimmed.contains("// end of method")
}

/// Returns `true` for a line holding only an opening brace.
#[must_use]
pub fn is_open_brace(line: &str) -> bool {
    line.trim() == "{"
}

/// Returns `true` for a line starting with a closing brace.
#[must_use]
pub fn is_close_brace(line: &str) -> bool {
    line.trim_start().starts_with('}')
}

/// Returns `true` for a `.param` directive, whose following `.custom` lines belong to a
/// parameter.
#[must_use]
pub fn is_param_directive(line: &str) -> bool {
    line.trim_start().starts_with(".param ")
}

/// Returns `true` for a `.locals` declaration.
#[must_use]
pub fn is_locals_declaration(line: &str) -> bool {
    line.trim_start().starts_with(".locals")
}

/// Returns `true` for the line closing a declared-locals group.
#[must_use]
pub fn ends_locals_group(line: &str) -> bool {
    strip_comment(line).trim_end().ends_with(')')
}

/// Extracts the local declared on a line of a `.locals` group.
///
/// Accepts `int32 V_0,`, `[1] string name)` and the opening `.locals init (...` line.
#[must_use]
pub fn local_declaration(line: &str) -> Option<Local> {
    let mut text = strip_comment(line).trim();
    if is_locals_declaration(text) {
        text = text[text.find('(')? + 1..].trim_start();
    }

    let text = text
        .strip_suffix(')')
        .or_else(|| text.strip_suffix(','))
        .unwrap_or(text)
        .trim();

    let text = match text.strip_prefix('[') {
        Some(rest) => rest[rest.find(']')? + 1..].trim_start(),
        None => text,
    };

    let tokens = text.split_whitespace().collect::<Vec<_>>();
    match tokens.as_slice() {
        [] => None,
        [single] => Some(Local {
            type_name: (*single).to_string(),
            name: None,
        }),
        [.., keyword, _] if *keyword == "class" || *keyword == "valuetype" => Some(Local {
            type_name: tokens.join(" "),
            name: None,
        }),
        [type_tokens @ .., name] => Some(Local {
            type_name: type_tokens.join(" "),
            name: Some((*name).to_string()),
        }),
    }
}

/// Returns the label a line starts with, e.g. `IL_001f`.
#[must_use]
pub fn leading_label(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let colon = trimmed.find(':')?;
    let label = &trimmed[..colon];
    if trimmed[colon..].starts_with("::") || !is_label(label) {
        return None;
    }
    Some(label)
}

/// Returns the labels a line references, e.g. branch targets, `switch` tables and their
/// continuation lines. The leading label itself is not included.
#[must_use]
pub fn referenced_labels(line: &str) -> Vec<&str> {
    let operand = match instruction(line) {
        Some(instruction) if instruction.opcode == "ldstr" => return Vec::new(),
        Some(instruction) => instruction.operand,
        None => strip_comment(line),
    };

    operand
        .split(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
        .filter(|token| is_label(token))
        .collect()
}

/// Splits a labelled instruction line into label, opcode and operand.
#[must_use]
pub fn instruction(line: &str) -> Option<Instruction<'_>> {
    let label = leading_label(line)?;
    let trimmed = line.trim_start();
    let body = trimmed[label.len() + 1..].trim_start();
    let body = if body.starts_with("ldstr") {
        body.trim_end()
    } else {
        strip_comment(body).trim_end()
    };

    let (opcode, operand) = match body.find(char::is_whitespace) {
        Some(split) => (&body[..split], body[split..].trim_start()),
        None => (body, ""),
    };
    if opcode.is_empty() {
        return None;
    }

    Some(Instruction {
        label,
        opcode,
        operand,
    })
}

/// Returns `true` for a labelled `ret` instruction.
#[must_use]
pub fn is_return(line: &str) -> bool {
    instruction(line).is_some_and(|instruction| instruction.opcode == "ret")
}

/// Returns `true` for a labelled `nop` instruction.
#[must_use]
pub fn is_nop(line: &str) -> bool {
    instruction(line).is_some_and(|instruction| instruction.opcode == "nop")
}

/// Extracts N from a `.maxstack N` directive.
#[must_use]
pub fn max_stack_value(line: &str) -> Option<u32> {
    let rest = line.trim().strip_prefix(".maxstack")?;
    rest.split_whitespace().next()?.parse().ok()
}

/// Extracts the name of the module's own assembly from an `.assembly` declaration.
///
/// Returns `None` for `.assembly extern` references.
#[must_use]
pub fn assembly_name(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix(".assembly ")?;
    if rest.trim_start().starts_with("extern ") {
        return None;
    }
    last_name_token(rest)
}

/// Extracts the referenced name from an `.assembly extern` declaration.
#[must_use]
pub fn extern_assembly_name(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix(".assembly ")?;
    let rest = rest.trim_start().strip_prefix("extern ")?;
    last_name_token(rest)
}

fn last_name_token(text: &str) -> Option<String> {
    let text = strip_comment(text).trim();
    if let Some(quoted) = text.strip_suffix('\'') {
        let open = quoted.rfind('\'')?;
        return Some(quoted[open + 1..].to_string());
    }
    text.split_whitespace().last().map(str::to_string)
}

fn is_label(token: &str) -> bool {
    token
        .strip_prefix("IL_")
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_hexdigit()))
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(comment) => &line[..comment],
        None => line,
    }
}

/// Finds `needle` outside of generic argument lists.
fn find_top_level(text: &str, needle: char) -> Option<usize> {
    let mut depth = 0_i32;
    for (index, ch) in text.char_indices() {
        if ch == needle && depth == 0 {
            return Some(index);
        }
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_lines() {
        let line = ".class public auto ansi beforefieldinit Demo.Program";
        assert!(is_class_declaration(line));
        assert!(!is_nested_class_declaration(line));
        assert_eq!(class_full_name(line).as_deref(), Some("Demo.Program"));

        let generic = ".class private auto ansi beforefieldinit Demo.Box`1<([System.Runtime]System.IComparable) T>";
        assert_eq!(
            class_full_name(generic).as_deref(),
            Some("Demo.Box`1<([System.Runtime]System.IComparable) T>")
        );

        assert!(is_nested_class_declaration(
            "  .class auto ansi sealed nested private beforefieldinit '<>c'"
        ));
        assert!(is_value_type_base("       extends [System.Runtime]System.ValueType"));
        assert!(is_end_of_class("} // end of class Demo.Program"));
        assert!(!is_class_declaration(".class extern forwarder System.Lazy`1"));
        assert!(!is_end_of_class("  } // end of method Program::Main"));
    }

    #[test]
    fn method_lines() {
        let line = "  .method public hidebysig static void  Main(string[] args) cil managed";
        assert!(is_method_declaration(line));
        assert!(is_static_method(line));
        assert!(returns_void(line));
        assert_eq!(&line[method_name_span(line).unwrap()], "Main");

        let ctor = "  .method public hidebysig specialname rtspecialname ";
        assert!(is_special_method(ctor));

        let generic = "  .method public hidebysig instance !!T  Pick<(class [System.Runtime]System.Object) T>(!!T a,";
        assert_eq!(
            &generic[method_name_span(generic).unwrap()],
            "Pick<(class [System.Runtime]System.Object) T>"
        );
        assert!(!is_static_method(generic));
        assert!(!returns_void(generic));

        let wrapped = "  .method private hidebysig static class [System.Runtime]System.Collections.Generic.IEnumerable`1<string> ";
        assert_eq!(method_name_span(wrapped), None);
        assert!(!returns_void(wrapped));
        let next = "          Filter(int32 count) cil managed";
        assert_eq!(&next[wrapped_method_name_span(next).unwrap()], "Filter");
    }

    #[test]
    fn parameters() {
        let (params, closed) = header_parameters("int32 count,");
        assert!(!closed);
        assert_eq!(params, vec![Parameter::new("int32", "count")]);

        let (params, closed) = header_parameters(
            "          class [System.Runtime]System.Collections.Generic.Dictionary`2<string,int32> map) cil managed",
        );
        assert!(closed);
        assert_eq!(params.len(), 1);
        assert!(params[0].is_last);
        assert_eq!(
            params[0].type_name,
            "class [System.Runtime]System.Collections.Generic.Dictionary`2<string,int32>"
        );

        let (params, closed) = header_parameters(") cil managed");
        assert!(closed);
        assert!(params.is_empty());

        let param = extract_parameter(" [out] int32& 'value'").unwrap();
        assert_eq!(param.type_name, "int32&");
        assert_eq!(param.name, "'value'");
    }

    #[test]
    fn locals() {
        let opening = "    .locals init ([0] int32 V_0,";
        assert!(is_locals_declaration(opening));
        assert!(!ends_locals_group(opening));
        assert_eq!(
            local_declaration(opening),
            Some(Local {
                type_name: "int32".to_string(),
                name: Some("V_0".to_string()),
            })
        );

        let closing = "             [1] class [System.Runtime]System.Collections.Generic.List`1<string> names)";
        assert!(ends_locals_group(closing));
        let local = local_declaration(closing).unwrap();
        assert_eq!(local.name.as_deref(), Some("names"));

        let unnamed = local_declaration("             [2] valuetype Demo.Point)").unwrap();
        assert_eq!(unnamed.type_name, "valuetype Demo.Point");
        assert_eq!(unnamed.name, None);
    }

    #[test]
    fn instructions() {
        let line = "    IL_000b:  br.s       IL_0010 // loop";
        assert_eq!(leading_label(line), Some("IL_000b"));
        assert_eq!(referenced_labels(line), vec!["IL_0010"]);

        let switch = "    IL_0001:  switch     ( \n";
        assert!(referenced_labels(switch).is_empty());
        let table = "    IL_0001:  switch     (IL_0010, IL_0020)";
        assert_eq!(referenced_labels(table), vec!["IL_0010", "IL_0020"]);

        assert_eq!(referenced_labels("                        IL_0030)"), vec!["IL_0030"]);

        let literal = "    IL_0002:  ldstr      \"IL_0004 // not a label\"";
        assert!(referenced_labels(literal).is_empty());
        assert_eq!(
            instruction(literal).unwrap().operand,
            "\"IL_0004 // not a label\""
        );

        assert!(is_return("    IL_0024:  ret"));
        assert!(is_nop("    IL_0000:  nop"));
        assert!(!is_nop("    nop"));
        assert_eq!(leading_label("    call void Demo.X::Y()"), None);
        assert_eq!(max_stack_value("    .maxstack  8"), Some(8));
    }

    #[test]
    fn assembly_lines() {
        assert_eq!(assembly_name(".assembly Demo").as_deref(), Some("Demo"));
        assert_eq!(assembly_name(".assembly 'My App'").as_deref(), Some("My App"));
        assert_eq!(assembly_name(".assembly extern System.Runtime"), None);
        assert_eq!(
            extern_assembly_name(".assembly extern System.Runtime").as_deref(),
            Some("System.Runtime")
        );
    }
}
