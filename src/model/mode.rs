use strum::{Display, EnumIter, FromRepr};

/// What a woven method reports to the sink.
///
/// The discriminants match the values encoded in the `LoggingType` named argument of the
/// configuration attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display, EnumIter)]
#[repr(u32)]
pub enum LoggingMode {
    /// Parameter values and elapsed time
    All = 0,
    /// Elapsed time only
    ExecutionTimeOnly = 1,
    /// Parameter values only
    ParameterValuesOnly = 2,
    /// No instrumentation
    None = 3,
}

impl LoggingMode {
    /// Returns `true` if the mode captures parameter values into a summary string.
    #[must_use]
    pub fn logs_parameters(self) -> bool {
        matches!(self, LoggingMode::All | LoggingMode::ParameterValuesOnly)
    }

    /// Returns `true` if the mode measures elapsed time with a stopwatch.
    #[must_use]
    pub fn logs_elapsed(self) -> bool {
        matches!(self, LoggingMode::All | LoggingMode::ExecutionTimeOnly)
    }

    /// Returns `true` unless the mode is [`LoggingMode::None`].
    #[must_use]
    pub fn is_active(self) -> bool {
        self != LoggingMode::None
    }

    /// Resolves the mode of a method: method value, else class value, else `None`.
    ///
    /// A sink method always resolves to `None`, whatever its attributes say.
    #[must_use]
    pub fn resolve(
        method: Option<LoggingMode>,
        class: Option<LoggingMode>,
        is_sink: bool,
    ) -> LoggingMode {
        if is_sink {
            return LoggingMode::None;
        }

        method.or(class).unwrap_or(LoggingMode::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn discriminants() {
        for (index, mode) in LoggingMode::iter().enumerate() {
            assert_eq!(LoggingMode::from_repr(index as u32), Some(mode));
        }
        assert_eq!(LoggingMode::from_repr(4), None);
    }

    #[test]
    fn resolution_order() {
        let all = Some(LoggingMode::All);
        let timed = Some(LoggingMode::ExecutionTimeOnly);

        assert_eq!(
            LoggingMode::resolve(timed, all, false),
            LoggingMode::ExecutionTimeOnly
        );
        assert_eq!(LoggingMode::resolve(None, all, false), LoggingMode::All);
        assert_eq!(LoggingMode::resolve(None, None, false), LoggingMode::None);
        assert_eq!(LoggingMode::resolve(all, all, true), LoggingMode::None);
    }

    #[test]
    fn capabilities() {
        assert!(LoggingMode::All.logs_parameters() && LoggingMode::All.logs_elapsed());
        assert!(!LoggingMode::ExecutionTimeOnly.logs_parameters());
        assert!(!LoggingMode::ParameterValuesOnly.logs_elapsed());
        assert!(!LoggingMode::None.is_active());
        assert_eq!(LoggingMode::ParameterValuesOnly.to_string(), "ParameterValuesOnly");
    }
}
