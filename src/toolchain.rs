//! The external disassembler/assembler seam.
//!
//! Weaving operates on text, so a compiled module makes a round trip through an IL
//! disassembler and assembler. Running those tools is left to the caller behind
//! [`IlToolchain`]; [`weave_module`] ties the round trip together.

use std::{fs, path::Path};

use log::{debug, warn};

use crate::{model::MARKER_PREFIX, weaver::Weaver, Result};

/// Disassembles modules to listings and assembles listings back into modules.
pub trait IlToolchain {
    /// Produces the listing of the module at `module`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Toolchain`] if the disassembler cannot be run.
    fn disassemble(&self, module: &Path) -> Result<String>;

    /// Assembles `listing` into `output`, returning whether the module was produced.
    ///
    /// # Errors
    /// Returns [`crate::Error::Toolchain`] if the assembler cannot be run at all. A listing the
    /// assembler rejects is reported as `Ok(false)`.
    fn assemble(&self, listing: &str, output: &Path) -> Result<bool>;
}

/// Neutralises residual marker lines by turning them into comments.
#[must_use]
pub fn prepare_for_assembly(listing: &str) -> String {
    listing
        .split_inclusive('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            match trimmed.strip_prefix(MARKER_PREFIX) {
                Some(rest) => {
                    warn!("Residual marker in woven listing: {}", trimmed.trim_end());
                    format!("{}//{rest}", &line[..line.len() - trimmed.len()])
                }
                None => line.to_string(),
            }
        })
        .collect()
}

/// Disassembles `module`, weaves it and assembles the result into `output`.
///
/// Any existing `output` is removed first, so `Ok(true)` always refers to a freshly assembled
/// module.
///
/// # Errors
/// Returns toolchain, parse and substitution errors; an assembler rejection is `Ok(false)`.
pub fn weave_module(
    toolchain: &dyn IlToolchain,
    weaver: &Weaver,
    module: &Path,
    output: &Path,
) -> Result<bool> {
    let listing = toolchain.disassemble(module)?;
    let woven = weaver.weave(&listing)?;
    let prepared = prepare_for_assembly(&woven);

    if output.exists() {
        fs::remove_file(output)?;
    }

    let assembled = toolchain.assemble(&prepared, output)?;
    debug!(
        "Woven {} into {} ({})",
        module.display(),
        output.display(),
        if assembled { "assembled" } else { "rejected" }
    );
    Ok(assembled)
}
