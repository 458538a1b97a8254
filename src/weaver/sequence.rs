//! The sequence-to-string helper emitted into classes with iterable parameters.
//!
//! The helper renders `null` for a null argument, the plain `Convert::ToString` text for
//! anything that is not enumerable, and `[a, b, ...]` otherwise. [`SequenceFormat`] applies the
//! same rules on the host and documents what the emitted code prints at runtime.

use std::fmt::Display;

use log::debug;

use crate::{
    config::WeaveConfig,
    model::{Class, Method, SequenceVariants},
    weaver::{emit::BlockWriter, labels::LabelAllocator},
};

/// Stack depth of the emitted helper.
pub const HELPER_MAX_STACK: u32 = 4;

const STATIC_HELPER: &str = "WeaveSequenceToStringStatic";
const INSTANCE_HELPER: &str = "WeaveSequenceToString";

/// Names of the helpers emitted into one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelperNames {
    /// Name of the static helper, if one is emitted
    pub static_name: Option<String>,
    /// Name of the instance helper, if one is emitted
    pub instance_name: Option<String>,
}

impl HelperNames {
    /// Picks helper names for `variants` that no method of `class` already uses.
    #[must_use]
    pub fn allocate(class: &Class, variants: SequenceVariants) -> Self {
        let unique = |base: &str| {
            let mut name = base.to_string();
            let mut suffix = 1;
            while class.has_method_named(&name) {
                name = format!("{base}{suffix}");
                suffix += 1;
            }
            name
        };

        HelperNames {
            static_name: variants
                .contains(SequenceVariants::STATIC)
                .then(|| unique(STATIC_HELPER)),
            instance_name: variants
                .contains(SequenceVariants::INSTANCE)
                .then(|| unique(INSTANCE_HELPER)),
        }
    }

    /// The helper callable from `method`.
    #[must_use]
    pub fn for_method(&self, method: &Method) -> Option<&str> {
        if method.is_static {
            self.static_name.as_deref()
        } else {
            self.instance_name.as_deref()
        }
    }

    /// Emits every allocated helper.
    #[must_use]
    pub fn emit(&self, class: &Class, config: &WeaveConfig) -> Vec<String> {
        let mut lines = Vec::new();
        for (variant, name) in [
            (SequenceVariants::STATIC, &self.static_name),
            (SequenceVariants::INSTANCE, &self.instance_name),
        ] {
            if let Some(name) = name {
                debug!("Emitting sequence helper {}::{name}", class.full_name);
                lines.extend(emit_helper(variant, name, config));
            }
        }
        lines
    }
}

/// Emits the helper method `name` with signature `string (object items, bool isNumeric)`.
#[must_use]
pub fn emit_helper(variant: SequenceVariants, name: &str, config: &WeaveConfig) -> Vec<String> {
    let runtime = &config.runtime;
    let is_static = variant.contains(SequenceVariants::STATIC);
    let (items, numeric) = if is_static { (0, 1) } else { (1, 2) };
    let kind = if is_static { "static " } else { "" };

    let string = runtime.core_type("String");
    let builder = runtime.core_type("Text.StringBuilder");
    let enumerable = runtime.core_type("Collections.IEnumerable");
    let enumerator = runtime.core_type("Collections.IEnumerator");
    let convert = format!(
        "string {}::ToString(object)",
        runtime.core_type("Convert")
    );
    let append = format!("instance class {builder} {builder}::Append(string)");

    let mut lines = vec![
        String::new(),
        format!("  .method private hidebysig {kind}string  {name}(object items, bool isNumeric) cil managed"),
        "  {".to_string(),
        format!(
            "    .custom instance void {}::.ctor() = ( 01 00 00 00 ) ",
            runtime.core_type("Runtime.CompilerServices.CompilerGeneratedAttribute")
        ),
        format!("    .maxstack  {HELPER_MAX_STACK}"),
        format!("    .locals init ([0] class {builder} V_0,"),
        format!("             [1] class {enumerator} V_1,"),
        "             [2] int32 V_2,".to_string(),
        "             [3] string V_3)".to_string(),
    ];

    let max_items = i32::try_from(config.max_sequence_items).unwrap_or(i32::MAX);
    let max_length = i32::try_from(config.max_item_length).unwrap_or(i32::MAX);

    let mut labels = LabelAllocator::default();
    let mut w = BlockWriter::new(&mut labels);
    let not_null = w.reserve();
    let enumerate = w.reserve();
    let next = w.reserve();
    let take_item = w.reserve();
    let no_separator = w.reserve();
    let quote = w.reserve();
    let append_item = w.reserve();
    let close = w.reserve();
    let loop_head = w.reserve();

    w.ldarg(items);
    w.emit("brtrue", &not_null);
    w.ldstr("null");
    w.op("ret");

    w.place(not_null);
    w.ldarg(items);
    w.emit("isinst", &enumerable);
    w.emit("brtrue", &enumerate);
    w.ldarg(items);
    w.emit("call", &convert);
    w.op("ret");

    w.place(enumerate);
    w.emit("newobj", &format!("instance void {builder}::.ctor()"));
    w.stloc(0);
    w.ldloc(0);
    w.ldstr("[");
    w.emit("callvirt", &append);
    w.op("pop");
    w.ldarg(items);
    w.emit("castclass", &enumerable);
    w.emit(
        "callvirt",
        &format!("instance class {enumerator} {enumerable}::GetEnumerator()"),
    );
    w.stloc(1);
    w.ldc_i4(0);
    w.stloc(2);
    w.emit("br", &next);

    w.place(loop_head.clone());
    w.ldloc(2);
    w.ldc_i4(max_items);
    w.emit("blt", &take_item);
    w.ldloc(0);
    w.ldstr(", ...");
    w.emit("callvirt", &append);
    w.op("pop");
    w.emit("br", &close);

    w.place(take_item);
    w.ldloc(2);
    w.emit("brfalse", &no_separator);
    w.ldloc(0);
    w.ldstr(", ");
    w.emit("callvirt", &append);
    w.op("pop");

    w.place(no_separator);
    w.ldloc(1);
    w.emit("callvirt", &format!("instance object {enumerator}::get_Current()"));
    w.emit("call", &convert);
    w.stloc(3);
    w.ldarg(numeric);
    w.emit("brtrue", &append_item);
    w.ldloc(3);
    w.emit("callvirt", &format!("instance int32 {string}::get_Length()"));
    w.ldc_i4(max_length);
    w.emit("ble", &quote);
    w.ldloc(3);
    w.ldc_i4(0);
    w.ldc_i4(max_length);
    w.emit(
        "callvirt",
        &format!("instance string {string}::Substring(int32, int32)"),
    );
    w.ldstr(" ... ");
    w.emit("call", &format!("string {string}::Concat(string, string)"));
    w.stloc(3);

    w.place(quote);
    w.ldstr("\"");
    w.ldloc(3);
    w.ldstr("\"");
    w.emit(
        "call",
        &format!("string {string}::Concat(string, string, string)"),
    );
    w.stloc(3);

    w.place(append_item);
    w.ldloc(0);
    w.ldloc(3);
    w.emit("callvirt", &append);
    w.op("pop");
    w.ldloc(2);
    w.ldc_i4(1);
    w.op("add");
    w.stloc(2);

    w.place(next);
    w.ldloc(1);
    w.emit("callvirt", &format!("instance bool {enumerator}::MoveNext()"));
    w.emit("brtrue", &loop_head);

    w.place(close);
    w.ldloc(0);
    w.ldstr("]");
    w.emit("callvirt", &append);
    w.op("pop");
    w.ldloc(0);
    w.emit(
        "callvirt",
        &format!("instance string {}::ToString()", runtime.core_type("Object")),
    );
    w.op("ret");

    lines.extend(w.finish());
    lines.push(format!("  }} // end of method {name}"));
    lines
}

/// Host-side rendering rules of the sequence helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceFormat {
    /// Items rendered before `", ..."` is appended
    pub max_items: usize,
    /// Characters kept of a non-numeric item before `" ... "` is appended
    pub max_item_length: usize,
}

impl SequenceFormat {
    /// The rendering limits of `config`.
    #[must_use]
    pub fn from_config(config: &WeaveConfig) -> Self {
        SequenceFormat {
            max_items: config.max_sequence_items as usize,
            max_item_length: config.max_item_length as usize,
        }
    }

    /// Renders `items` the way the emitted helper does; `None` stands for a null reference.
    pub fn render<I>(&self, items: Option<I>, is_numeric: bool) -> String
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let Some(items) = items else {
            return "null".to_string();
        };

        let mut out = String::from("[");
        for (count, item) in items.into_iter().enumerate() {
            if count >= self.max_items {
                out.push_str(", ...");
                break;
            }
            if count > 0 {
                out.push_str(", ");
            }

            let mut text = item.to_string();
            if !is_numeric {
                if text.chars().count() > self.max_item_length {
                    text = text.chars().take(self.max_item_length).collect::<String>() + " ... ";
                }
                text = format!("\"{text}\"");
            }
            out.push_str(&text);
        }
        out.push(']');
        out
    }
}
