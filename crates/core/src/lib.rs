//! scpi-toolkit core library.
//!
//! An instrument-side SCPI (IEEE 488.2 / SCPI-1999) command parser for
//! embedding in measurement-instrument firmware. The main entry points are
//! [`Context::input`] for byte-at-a-time transport feeds and
//! [`Context::parse`] for complete lines; registered [`Command`] handlers
//! pull typed parameters from the context and append typed results to the
//! output sink.
//!
//! The parser is single-threaded cooperative: one context serves one
//! controller session, and handlers run synchronously inside `input`.

#![warn(missing_docs)]

/// The per-session parser context, command table, and I/O callbacks.
pub mod context;
/// Line parser and input framer.
pub mod dispatch;
/// Typed failure conditions for parsing and parameter extraction.
pub mod error;
/// SCPI language primitives: lexer and pattern matching.
pub mod language;
/// Parameter extraction API consumed by command handlers.
pub mod params;
/// Response formatter writing to the output sink.
pub mod response;

// ── Convenience re-exports ──────────────────────────────────────────────
// Flat imports for the common entry points. The full module paths remain
// available for less common types.

// Context and command table
pub use context::{Command, CommandResult, Context, Handler, Interface};

// Errors
pub use error::ParseError;
pub use scpi_toolkit_errors::{ErrorQueue, ScpiError, codes};

// Lexer
pub use language::lexer::{Cursor, TokKind, Token};

// Pattern matching
pub use language::pattern::{match_header, match_mnemonic};

// Parameters
pub use params::{ChannelListEntry, Choice, Parameter};
