//! The method exit block: stops the timer and calls the sink.

use crate::{
    config::RuntimeReferences,
    listing::markers::leading_label,
    model::{Method, SinkRef},
    weaver::{emit::BlockWriter, locals::LocalsLayout},
};

/// Emits the exit block replacing `return_line`.
///
/// The first instruction takes over the label of the original return, so branches to the
/// return still run the block. The block ends with a `ret` under a fresh label. A value the
/// method returns stays on the stack below the sink arguments.
pub fn emit_elapsed_block(
    w: &mut BlockWriter<'_>,
    method: &Method,
    layout: &LocalsLayout,
    sink: &SinkRef,
    return_line: &str,
    runtime: &RuntimeReferences,
) {
    if let Some(label) = leading_label(return_line) {
        w.place(label);
    }

    let stopwatch = runtime.stopwatch();
    if let Some(timer) = layout.timer {
        w.ldloc(timer);
        w.emit("callvirt", &format!("instance void {stopwatch}::Stop()"));
    }

    if !sink.is_static {
        w.ldarg(0);
    }
    w.ldstr(method.display_name());
    match layout.summary {
        Some(summary) => w.ldloc(summary),
        None => w.ldstr(""),
    }
    match layout.timer {
        Some(timer) => {
            w.ldloc(timer);
            w.emit(
                "callvirt",
                &format!("instance int64 {stopwatch}::get_ElapsedMilliseconds()"),
            );
        }
        None => w.emit("ldc.i8", "-1"),
    }
    w.emit("call", &sink.call_operand());
    w.op("ret");
}

/// Evaluation stack depth the exit block needs, including a returned value.
#[must_use]
pub fn elapsed_block_depth(method: &Method, sink: &SinkRef) -> u32 {
    3 + u32::from(!sink.is_static) + u32::from(method.returns_value)
}
