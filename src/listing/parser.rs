//! Single-pass state machine turning a listing into an [`Assembly`].
//!
//! The scan walks the listing line by line and keeps every line, in order, in the line
//! sequence of the innermost open scope. Classes and methods are replaced in their owner's
//! sequence by index-keyed placeholders, and the insertion points inside method bodies
//! (`.maxstack`, the locals block, method entry and the first return) become placeholders the
//! assembler resolves later.
//!
//! Lines the parser does not understand fall through unchanged. Structural anomalies that
//! can be worked around, such as scopes left open at the end of the listing or logging-mode
//! values outside the known range, abort the parse in [`Strictness::Strict`] mode and are
//! logged and repaired in [`Strictness::Lenient`] mode.
//!
//! [`Strictness::Strict`]: crate::config::Strictness::Strict
//! [`Strictness::Lenient`]: crate::config::Strictness::Lenient

use log::{debug, warn};

use crate::{
    config::WeaveConfig,
    listing::markers::{
        assembly_name, class_full_name, ends_locals_group, extern_assembly_name,
        header_parameters, is_class_declaration, is_close_brace, is_end_of_method,
        is_locals_declaration, is_method_declaration, is_nop, is_open_brace, is_param_directive,
        is_nested_class_declaration, is_return, is_special_method, is_static_method,
        is_value_type_base, leading_label, local_declaration, max_stack_value, method_name_span,
        referenced_labels, returns_void, wrapped_method_name_span,
    },
    metadata::customattributes::{AttributeEvent, CustomAttributeCollector},
    model::{Assembly, Class, Line, Method, Placeholder},
    Error, Result,
};

/// Parses a complete listing.
///
/// # Errors
/// Returns [`crate::Error::Empty`] for a blank listing, and in strict mode
/// [`crate::Error::UnterminatedScope`] or [`crate::Error::UnknownLoggingMode`].
pub fn parse_listing(text: &str, config: &WeaveConfig) -> Result<Assembly> {
    ListingParser::new(config).parse(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InClass,
    MethodHeader,
    MethodBody,
    /// Constructors and methods whose declaration could not be read
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeScope {
    Class,
    Method,
    /// Class-level attributes of the innermost nested class
    Nested,
    /// Attributes of parameters, properties and events
    Ignored,
}

/// The listing parser.
pub struct ListingParser<'a> {
    config: &'a WeaveConfig,
    assembly: Assembly,
    state: State,
    class: Option<Class>,
    /// Brace depth inside the current class; members live at depth 1
    class_depth: usize,
    /// Innermost nested class and the depth of its members
    nested: Option<(String, usize)>,
    method: Option<Method>,
    passthrough_name: Option<String>,
    name_pending: bool,
    parameters_closed: bool,
    in_locals: bool,
    locals_emitted: bool,
    started: bool,
    end_emitted: bool,
    param_scope: bool,
    attribute: Option<(CustomAttributeCollector, AttributeScope)>,
}

impl<'a> ListingParser<'a> {
    /// Creates a parser with the given configuration.
    #[must_use]
    pub fn new(config: &'a WeaveConfig) -> Self {
        ListingParser {
            config,
            assembly: Assembly::default(),
            state: State::Outside,
            class: None,
            class_depth: 0,
            nested: None,
            method: None,
            passthrough_name: None,
            name_pending: false,
            parameters_closed: false,
            in_locals: false,
            locals_emitted: false,
            started: false,
            end_emitted: false,
            param_scope: false,
            attribute: None,
        }
    }

    /// Consumes the parser and the listing, producing the model.
    ///
    /// # Errors
    /// See [`parse_listing`].
    pub fn parse(mut self, text: &str) -> Result<Assembly> {
        if text.trim().is_empty() {
            return Err(Error::Empty);
        }

        self.assembly.trailing_newline = text.ends_with('\n');
        self.assembly.crlf = text
            .find('\n')
            .is_some_and(|end| text[..end].ends_with('\r'));
        for line in text.lines() {
            self.feed(line)?;
        }
        self.finish()
    }

    fn feed(&mut self, line: &str) -> Result<()> {
        if let Some((collector, _)) = &mut self.attribute {
            let consumed = collector.feed(line);
            let complete = collector.is_complete();
            if consumed {
                self.push(line);
                if complete {
                    self.apply_attribute()?;
                }
                return Ok(());
            }
            self.apply_attribute()?;
        }

        match self.state {
            State::Outside => {
                self.outside(line);
                Ok(())
            }
            State::InClass => self.in_class(line),
            State::MethodHeader => {
                self.method_header(line);
                Ok(())
            }
            State::MethodBody => self.method_body(line),
            State::Passthrough => {
                self.push(line);
                if is_end_of_method(line) {
                    self.passthrough_name = None;
                    self.state = State::InClass;
                }
                Ok(())
            }
        }
    }

    fn outside(&mut self, line: &str) {
        if let Some(name) = extern_assembly_name(line) {
            self.assembly.externs.insert(name);
        } else if let Some(name) = assembly_name(line) {
            if self.assembly.name.is_none() {
                debug!("Weaving assembly {name}");
                self.assembly.name = Some(name);
                self.assembly.declaration_line = Some(self.assembly.lines.len());
            }
        }

        if is_class_declaration(line) {
            if let Some(full_name) = class_full_name(line) {
                let index = self.assembly.classes.len();
                self.assembly
                    .lines
                    .push(Line::Placeholder(Placeholder::Class(index)));

                let mut class = Class::new(full_name);
                class.lines.push(Line::text(line));
                self.class = Some(class);
                self.class_depth = 0;
                self.state = State::InClass;
                return;
            }
        }

        self.push(line);
    }

    fn in_class(&mut self, line: &str) -> Result<()> {
        if self.class_depth == 0 {
            if is_open_brace(line) {
                self.class_depth = 1;
            } else if is_value_type_base(line) {
                if let Some(class) = &mut self.class {
                    class.is_value_type = true;
                }
            }
            self.push(line);
            return Ok(());
        }

        if is_open_brace(line) {
            self.class_depth += 1;
            self.push(line);
            return Ok(());
        }

        if is_close_brace(line) {
            self.class_depth -= 1;
            self.push(line);
            if self.class_depth == 0 {
                self.close_class();
            }
            return Ok(());
        }

        if is_nested_class_declaration(line) {
            if let Some(name) = class_full_name(line) {
                self.nested = Some((name, self.class_depth + 1));
            }
            self.push(line);
            return Ok(());
        }

        if self.class_depth > 1 {
            self.push(line);
            let nested_member = self
                .nested
                .as_ref()
                .is_some_and(|(_, depth)| *depth == self.class_depth);
            if nested_member {
                if let Some(collector) = CustomAttributeCollector::begin(line) {
                    return self.start_attribute(collector, AttributeScope::Nested);
                }
            }
            return Ok(());
        }

        if is_method_declaration(line) {
            self.begin_method(line);
            return Ok(());
        }

        if let Some(collector) = CustomAttributeCollector::begin(line) {
            self.push(line);
            return self.start_attribute(collector, AttributeScope::Class);
        }

        self.push(line);
        Ok(())
    }

    fn begin_method(&mut self, line: &str) {
        if is_special_method(line) {
            self.begin_passthrough(line, method_name_span(line).map(|span| &line[span]));
            return;
        }

        let mut method = Method::new("", is_static_method(line));
        method.returns_value = !returns_void(line);
        method.lines.push(Line::text(line));

        self.name_pending = false;
        self.parameters_closed = false;
        self.in_locals = false;
        self.locals_emitted = false;
        self.started = false;
        self.end_emitted = false;
        self.param_scope = false;

        match method_name_span(line) {
            Some(span) => {
                method.name = line[span.clone()].to_string();
                let rest = &line[span.end..];
                if let Some(open) = rest.find('(') {
                    self.method = Some(method);
                    self.header_parameters(&rest[open + 1..]);
                } else {
                    self.method = Some(method);
                }
            }
            None if line.contains('(') => {
                debug!("Passing through method with unreadable declaration - {}", line.trim());
                self.begin_passthrough(line, None);
                return;
            }
            None => {
                self.name_pending = true;
                self.method = Some(method);
            }
        }

        if let Some(class) = &mut self.class {
            let index = class.methods.len();
            class.lines.push(Line::Placeholder(Placeholder::Method(index)));
        }
        self.state = State::MethodHeader;
    }

    fn begin_passthrough(&mut self, line: &str, name: Option<&str>) {
        self.passthrough_name = name.map(str::to_string);
        self.push(line);
        self.state = State::Passthrough;
    }

    fn header_parameters(&mut self, text: &str) {
        if self.parameters_closed {
            return;
        }

        let (parameters, closed) = header_parameters(text);
        if let Some(method) = &mut self.method {
            for mut parameter in parameters {
                if parameter.name.is_empty() {
                    parameter.name = format!("A_{}", method.argument_index(method.parameters.len()));
                }
                method.parameters.push(parameter);
            }
        }
        self.parameters_closed = closed;
    }

    fn method_header(&mut self, line: &str) {
        if is_open_brace(line) {
            if self.name_pending {
                self.demote_method();
                self.push(line);
                return;
            }
            self.push(line);
            self.state = State::MethodBody;
            return;
        }

        self.push(line);
        if self.name_pending {
            if let Some(span) = wrapped_method_name_span(line) {
                if let Some(method) = &mut self.method {
                    method.name = line[span.clone()].to_string();
                }
                self.name_pending = false;
                let rest = &line[span.end..];
                if let Some(open) = rest.find('(') {
                    self.header_parameters(&rest[open + 1..]);
                }
            }
            return;
        }

        self.header_parameters(line);
    }

    /// Turns a method whose name never showed up back into plain class lines.
    fn demote_method(&mut self) {
        warn!("Could not find the name of a method, passing it through");
        let Some(method) = self.method.take() else {
            return;
        };
        if let Some(class) = &mut self.class {
            if matches!(class.lines.last(), Some(Line::Placeholder(Placeholder::Method(_)))) {
                class.lines.pop();
            }
            class.lines.extend(method.lines);
        }
        self.passthrough_name = None;
        self.state = State::Passthrough;
    }

    fn method_body(&mut self, line: &str) -> Result<()> {
        let Some(method) = &mut self.method else {
            self.push(line);
            return Ok(());
        };

        if self.in_locals {
            method.locals_lines.push(line.to_string());
            method.locals.extend(local_declaration(line));
            if ends_locals_group(line) {
                self.in_locals = false;
            }
            return Ok(());
        }

        if is_end_of_method(line) {
            method.lines.push(Line::text(line));
            self.close_method();
            return Ok(());
        }

        if is_param_directive(line) {
            self.param_scope = true;
            method.lines.push(Line::text(line));
            return Ok(());
        }

        if let Some(collector) = CustomAttributeCollector::begin(line) {
            method.lines.push(Line::text(line));
            let scope = if self.param_scope {
                AttributeScope::Ignored
            } else {
                AttributeScope::Method
            };
            return self.start_attribute(collector, scope);
        }
        self.param_scope = false;

        if let Some(value) = max_stack_value(line) {
            method.max_stack = Some(value);
            method.max_stack_line = Some(line.to_string());
            method.lines.push(Line::Placeholder(Placeholder::MaxStack));
            return Ok(());
        }

        if is_locals_declaration(line) {
            if !self.locals_emitted {
                method.lines.push(Line::Placeholder(Placeholder::Locals));
                self.locals_emitted = true;
            }
            method.locals_lines.push(line.to_string());
            method.locals.extend(local_declaration(line));
            self.in_locals = !ends_locals_group(line);
            return Ok(());
        }

        for target in referenced_labels(line) {
            method.branch_targets.insert(target.to_string());
        }

        let Some(label) = leading_label(line) else {
            method.lines.push(Line::text(line));
            return Ok(());
        };
        method.labels.insert(label.to_string());

        if !self.started {
            self.started = true;
            if !self.locals_emitted {
                method.lines.push(Line::Placeholder(Placeholder::Locals));
                self.locals_emitted = true;
            }
            if is_nop(line) {
                method.lines.push(Line::text(line));
                method.lines.push(Line::Placeholder(Placeholder::Start));
                return Ok(());
            }
            method.lines.push(Line::Placeholder(Placeholder::Start));
        }

        if is_return(line) && !self.end_emitted {
            self.end_emitted = true;
            method.return_line = Some(line.to_string());
            method.lines.push(Line::Placeholder(Placeholder::End));
            return Ok(());
        }

        method.lines.push(Line::text(line));
        Ok(())
    }

    fn start_attribute(
        &mut self,
        collector: CustomAttributeCollector,
        scope: AttributeScope,
    ) -> Result<()> {
        let complete = collector.is_complete();
        self.attribute = Some((collector, scope));
        if complete {
            self.apply_attribute()?;
        }
        Ok(())
    }

    fn apply_attribute(&mut self) -> Result<()> {
        let Some((collector, scope)) = self.attribute.take() else {
            return Ok(());
        };
        if scope == AttributeScope::Ignored {
            return Ok(());
        }

        if scope == AttributeScope::Nested {
            let event = collector.finish(&self.config.attributes);
            let requests_logging = match event {
                AttributeEvent::LoggingMode(mode) => mode.is_active(),
                AttributeEvent::Unrecognized(_) => true,
                AttributeEvent::Sink | AttributeEvent::Unrelated => false,
            };
            if let (true, Some((name, _)), Some(class)) =
                (requests_logging, &self.nested, &mut self.class)
            {
                warn!(
                    "Nested class {}/{name} carries a logging mode, nested classes are not instrumented",
                    class.full_name
                );
                if !class.nested_with_logging.contains(name) {
                    class.nested_with_logging.push(name.clone());
                }
            }
            return Ok(());
        }

        match collector.finish(&self.config.attributes) {
            AttributeEvent::Sink => match (scope, &mut self.method) {
                (AttributeScope::Method, Some(method)) => {
                    debug!("Method {} is the logging sink", method.name);
                    method.is_sink = true;
                }
                _ => debug!("Ignoring sink attribute outside of a method"),
            },
            AttributeEvent::LoggingMode(mode) => match scope {
                AttributeScope::Method => {
                    if let Some(method) = &mut self.method {
                        method.logging_mode.get_or_insert(mode);
                    }
                }
                _ => {
                    if let Some(class) = &mut self.class {
                        class.logging_mode.get_or_insert(mode);
                    }
                }
            },
            AttributeEvent::Unrecognized(value) => {
                if self.config.is_strict() {
                    return Err(Error::UnknownLoggingMode(value));
                }
                warn!("Ignoring unknown logging mode {value}");
            }
            AttributeEvent::Unrelated => {}
        }
        Ok(())
    }

    fn close_method(&mut self) {
        if let Some(method) = self.method.take() {
            if let Some(class) = &mut self.class {
                debug!(
                    "Parsed method {}::{} ({} parameters)",
                    class.name,
                    method.name,
                    method.parameters.len()
                );
                class.methods.push(method);
            }
        }
        self.state = State::InClass;
    }

    fn close_class(&mut self) {
        if let Some(class) = self.class.take() {
            debug!(
                "Parsed class {} ({} methods)",
                class.full_name,
                class.methods.len()
            );
            self.assembly.classes.push(class);
        }
        self.class_depth = 0;
        self.nested = None;
        self.state = State::Outside;
    }

    fn finish(mut self) -> Result<Assembly> {
        self.apply_attribute()?;

        let open_scope = match (&self.method, self.state, &self.class) {
            (Some(method), _, _) => Some(("method", method.name.clone())),
            (None, State::Passthrough, _) => Some((
                "method",
                self.passthrough_name.clone().unwrap_or_default(),
            )),
            (None, _, Some(class)) => Some(("class", class.full_name.clone())),
            _ => None,
        };

        if let Some((kind, name)) = open_scope {
            if self.config.is_strict() {
                return Err(Error::UnterminatedScope { kind, name });
            }
            warn!("Unterminated {kind} '{name}' at end of listing, closing it");
            if self.method.is_some() {
                self.close_method();
            }
            self.close_class();
        }

        Ok(self.assembly)
    }

    fn push(&mut self, line: &str) {
        self.scope_lines().push(Line::text(line));
    }

    fn scope_lines(&mut self) -> &mut Vec<Line> {
        if let Some(method) = &mut self.method {
            return &mut method.lines;
        }
        if let Some(class) = &mut self.class {
            return &mut class.lines;
        }
        &mut self.assembly.lines
    }
}
