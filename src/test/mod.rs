//! Shared listings and helpers for unit tests.

pub mod fixtures;

use crate::{config::WeaveConfig, model::Method, weaver::Weaver, Result};

/// Weaves a listing with the default configuration.
pub fn weave_default(listing: &str) -> Result<String> {
    Weaver::new(WeaveConfig::default()).weave(listing)
}

/// Returns the lines of `text` containing `needle`.
pub fn lines_containing<'a>(text: &'a str, needle: &str) -> Vec<&'a str> {
    text.lines().filter(|line| line.contains(needle)).collect()
}

/// Returns the woven text of the method declared as `name`, from its `.method` line to its
/// closing line.
pub fn method_text<'a>(woven: &'a str, class: &str, name: &str) -> &'a str {
    let closing = format!("// end of method {class}::{name}");
    let end = woven
        .find(&closing)
        .unwrap_or_else(|| panic!("method {class}::{name} not found"));
    let start = woven[..end].rfind(".method").unwrap_or(0);
    &woven[start..end + closing.len()]
}

/// Builds a static method with the given parameters.
pub fn static_method(name: &str, parameters: &[(&str, &str)]) -> Method {
    let mut method = Method::new(name, true);
    method.parameters = parameters
        .iter()
        .map(|(ty, name)| crate::model::Parameter::new(*ty, *name))
        .collect();
    if let Some(last) = method.parameters.last_mut() {
        last.is_last = true;
    }
    method
}
