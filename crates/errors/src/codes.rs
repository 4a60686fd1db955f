//! SCPI-99 error-code constants.
//!
//! Use these instead of raw integer literals to get compile-time typo
//! detection and IDE autocomplete. Only the subset raised by the parser
//! core is defined here; instrument firmware is free to queue additional
//! device-specific codes (positive values per SCPI-99).

/// Generic syntax error in the command header (`-100`).
pub const COMMAND_ERROR: i16 = -100;

/// Parameter has the wrong token type or a malformed separator (`-104`).
pub const DATA_TYPE_ERROR: i16 = -104;

/// Parameter token is well-formed but its value is not acceptable (`-108`).
pub const INVALID_PARAMETER_VALUE: i16 = -108;

/// A mandatory parameter was absent (`-109`).
pub const MISSING_PARAMETER: i16 = -109;

/// The command header matched no registered pattern (`-113`).
pub const UNDEFINED_HEADER: i16 = -113;

/// The handler reported failure without queueing a more specific error (`-200`).
pub const EXECUTION_ERROR: i16 = -200;

/// The input line buffer filled up before a terminator arrived (`-350`).
pub const INPUT_BUFFER_OVERFLOW: i16 = -350;

/// Returns the SCPI-99 standard name for a code raised by the parser core.
///
/// Returns `None` for device-specific or unrecognized codes.
pub fn standard_message(code: i16) -> Option<&'static str> {
    match code {
        COMMAND_ERROR => Some("Command error"),
        DATA_TYPE_ERROR => Some("Data type error"),
        INVALID_PARAMETER_VALUE => Some("Parameter not allowed"),
        MISSING_PARAMETER => Some("Missing parameter"),
        UNDEFINED_HEADER => Some("Undefined header"),
        EXECUTION_ERROR => Some("Execution error"),
        INPUT_BUFFER_OVERFLOW => Some("Queue overflow"),
        _ => None,
    }
}
