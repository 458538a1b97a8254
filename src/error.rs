use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The weaver is deliberately permissive while scanning a listing (see
/// [`crate::config::Strictness`]), so most variants describe either an input that a strict
/// weave refuses, or an internal consistency failure that must never reach the assembler.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - Corrupted attribute blob or listing structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond an attribute blob
/// - [`Error::Empty`] - Empty listing provided
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Strict-mode Rejections
/// - [`Error::UnterminatedScope`] - A class or method was still open at the end of the listing
/// - [`Error::DuplicateSink`] - More than one method carries the sink attribute
/// - [`Error::UnknownLoggingMode`] - A logging-mode attribute holds an unknown discriminant
///
/// ## Substitution Errors
/// - [`Error::UnresolvedPlaceholder`] - A placeholder has no matching entity
/// - [`Error::DuplicatePlaceholder`] - An entity was referenced by two placeholders
///
/// ## External Errors
/// - [`Error::Toolchain`] - The external disassembler/assembler failed to run
///
/// # Examples
///
/// ```rust
/// use ilweave::{Error, Weaver};
///
/// let truncated = ".class private auto ansi beforefieldinit Demo.Program\n{\n";
/// match Weaver::default().weave(truncated) {
///     Err(Error::UnterminatedScope { kind, name }) => {
///         assert_eq!(kind, "class");
///         assert_eq!(name, "Demo.Program");
///     }
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding an attribute blob.
    #[error("Out of Bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while loading a listing from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// A class or method was still open when the listing ended.
    ///
    /// Only returned in [`crate::config::Strictness::Strict`] mode; lenient weaves close the
    /// scope implicitly.
    #[error("Unterminated {kind} '{name}' at end of listing")]
    UnterminatedScope {
        /// Either `"class"` or `"method"`
        kind: &'static str,
        /// Name of the scope that was left open
        name: String,
    },

    /// More than one method was marked as the logging sink.
    #[error("Multiple sink methods declared - {first} and {second}")]
    DuplicateSink {
        /// The sink that was found first, as `Class::Method`
        first: String,
        /// The conflicting sink, as `Class::Method`
        second: String,
    },

    /// A logging-mode attribute carried a discriminant outside the known modes.
    #[error("Unknown logging mode discriminant - {0}")]
    UnknownLoggingMode(u32),

    /// A placeholder could not be matched to the entity it stands for.
    ///
    /// This is an internal consistency failure: the partially substituted listing is never
    /// returned.
    #[error("Unresolved placeholder - {0}")]
    UnresolvedPlaceholder(String),

    /// An entity was referenced by more than one placeholder.
    #[error("Placeholder resolved more than once - {0}")]
    DuplicatePlaceholder(String),

    /// The external disassembler or assembler could not be run.
    #[error("Toolchain failure - {0}")]
    Toolchain(String),
}
