//! Typed failure conditions for parsing and parameter extraction.

/// Failure conditions raised by the parser core.
///
/// These are the hard, control-flow errors: the dispatcher returns them
/// when a line cannot be parsed further, and the parameter extractors
/// return them when a handler's expectations are not met. The queued SCPI
/// error (code + info text, surfaced via `SYSTem:ERRor?`) is pushed
/// separately before the variant is returned.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    // -- Line-level --
    /// The bytes at `pos` do not form a valid program header.
    #[error("invalid command header at byte {pos}")]
    InvalidHeader {
        /// Byte offset into the line where header lexing gave up.
        pos: usize,
    },

    /// No registered command pattern matches the received header.
    #[error("undefined header: {header}")]
    UndefinedHeader {
        /// The effective header (after path inheritance) that missed.
        header: String,
    },

    /// The line buffer filled up before a terminator arrived. The buffer
    /// has been reset; the partial line is lost.
    #[error("input buffer overflow ({capacity} bytes)")]
    BufferOverflow {
        /// Configured line-buffer capacity.
        capacity: usize,
    },

    // -- Parameter-level --
    /// A mandatory parameter was absent.
    #[error("missing mandatory parameter")]
    MissingParameter,

    /// A second or later parameter was not introduced by a comma.
    #[error("invalid parameter separator")]
    InvalidSeparator,

    /// The parameter token cannot be converted to the requested type.
    #[error("data type error: expected {expected}")]
    DataType {
        /// What the extractor was asked for (e.g. `"decimal numeric"`).
        expected: &'static str,
    },

    /// The parameter token is well-formed but its value is not accepted
    /// (unknown mnemonic for a boolean or choice, bad channel-list entry).
    #[error("invalid parameter value: {value}")]
    InvalidValue {
        /// The offending value text.
        value: String,
    },

    /// A numeric literal overflowed or failed to parse in its base.
    #[error("numeric conversion failed: {literal}")]
    NumericConversion {
        /// The literal as received.
        literal: String,
    },

    // -- Handler-level --
    /// Generic handler failure. Returned by handlers that have nothing
    /// more specific to report; the dispatcher queues `-200` for it.
    #[error("execution error")]
    Execution,
}
