//! The per-session parser context: command table, I/O callbacks, line
//! buffer, error queue, and the state a handler sees while it runs.

use std::any::Any;
use std::rc::Rc;

use crate::error::ParseError;
use crate::language::pattern::{PatternAlts, match_header};
use scpi_toolkit_errors::{DEFAULT_QUEUE_CAPACITY, ErrorQueue, ScpiError};

/// Outcome of a command handler.
pub type CommandResult = Result<(), ParseError>;

/// A command handler: invoked with the context positioned on the command's
/// parameter span. Captured state belongs in the user-data handle.
pub type Handler = Rc<dyn Fn(&mut Context) -> CommandResult>;

/// A registered SCPI command: a pattern in SCPI keyword notation, the
/// handler to invoke on a match, and an optional numeric tag.
///
/// The pattern's bracket alternatives are compiled once at construction so
/// the dispatcher's lookup loop never rewrites pattern strings.
pub struct Command {
    pattern: String,
    handler: Handler,
    tag: i32,
    alts: PatternAlts,
}

impl Command {
    /// Register a pattern with its handler.
    pub fn new(
        pattern: impl Into<String>,
        handler: impl Fn(&mut Context) -> CommandResult + 'static,
    ) -> Self {
        let pattern = pattern.into();
        let alts = PatternAlts::compile(&pattern);
        Self {
            pattern,
            handler: Rc::new(handler),
            tag: 0,
            alts,
        }
    }

    /// Attach a numeric tag (retrievable from the handler via
    /// [`Context::current_tag`]).
    pub fn with_tag(mut self, tag: i32) -> Self {
        self.tag = tag;
        self
    }

    /// The pattern this command was registered with.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The command's numeric tag (0 unless set).
    pub fn tag(&self) -> i32 {
        self.tag
    }

    pub(crate) fn matches(&self, header: &str) -> bool {
        self.alts.matches(header)
    }

    pub(crate) fn handler(&self) -> Handler {
        Rc::clone(&self.handler)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("pattern", &self.pattern)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// I/O callbacks supplied by the transport layer. Any slot may be absent;
/// the parser then skips that side effect.
#[derive(Default)]
pub struct Interface {
    pub(crate) write: Option<Box<dyn FnMut(&[u8])>>,
    pub(crate) flush: Option<Box<dyn FnMut()>>,
    pub(crate) reset: Option<Box<dyn FnMut()>>,
    pub(crate) on_error: Option<Box<dyn FnMut(&ScpiError)>>,
}

impl Interface {
    /// An interface with no callbacks (output is discarded).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output sink. Called eagerly for every response fragment.
    pub fn with_write(mut self, f: impl FnMut(&[u8]) + 'static) -> Self {
        self.write = Some(Box::new(f));
        self
    }

    /// Set the flush callback, called once per terminated response line.
    pub fn with_flush(mut self, f: impl FnMut() + 'static) -> Self {
        self.flush = Some(Box::new(f));
        self
    }

    /// Set the device-reset callback (wired to `*RST` by the firmware's
    /// command table).
    pub fn with_reset(mut self, f: impl FnMut() + 'static) -> Self {
        self.reset = Some(Box::new(f));
        self
    }

    /// Set the error-notification callback, called for every queued error.
    pub fn with_on_error(mut self, f: impl FnMut(&ScpiError) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interface")
            .field("write", &self.write.is_some())
            .field("flush", &self.flush.is_some())
            .field("reset", &self.reset.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// The SCPI parser context for one controller session.
///
/// Single-threaded cooperative: handlers run synchronously on the caller's
/// thread inside [`Context::input`] / [`Context::parse`]. Callers needing
/// multi-threaded service instantiate one context per session.
pub struct Context {
    pub(crate) commands: Vec<Command>,
    pub(crate) iface: Interface,

    // Line framing.
    pub(crate) line_buffer: Vec<u8>,
    pub(crate) line_capacity: usize,

    // Error queue.
    pub(crate) errors: ErrorQueue,

    // Response framing state, reset per line.
    pub(crate) output_count: usize,
    pub(crate) first_output: bool,

    // Execution state, valid while a handler runs.
    pub(crate) current_cmd: Option<usize>,
    pub(crate) current_header: String,
    pub(crate) cmd_error: bool,
    pub(crate) input_count: usize,
    pub(crate) params: Vec<u8>,
    pub(crate) params_pos: usize,

    user_data: Option<Box<dyn Any>>,
    idn: [String; 4],
}

impl Context {
    /// Create a context from a command table, an interface, and the
    /// line-buffer capacity in bytes.
    pub fn new(commands: Vec<Command>, iface: Interface, buffer_capacity: usize) -> Self {
        Self {
            commands,
            iface,
            line_buffer: Vec::with_capacity(buffer_capacity),
            line_capacity: buffer_capacity,
            errors: ErrorQueue::new(DEFAULT_QUEUE_CAPACITY),
            output_count: 0,
            first_output: true,
            current_cmd: None,
            current_header: String::new(),
            cmd_error: false,
            input_count: 0,
            params: Vec::new(),
            params_pos: 0,
            user_data: None,
            idn: Default::default(),
        }
    }

    // ── Identification ──────────────────────────────────────────────────

    /// Set the four `*IDN?` fields: manufacturer, model, serial number,
    /// firmware version.
    pub fn set_idn(
        &mut self,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        serial: impl Into<String>,
        firmware: impl Into<String>,
    ) {
        self.idn = [
            manufacturer.into(),
            model.into(),
            serial.into(),
            firmware.into(),
        ];
    }

    /// The four `*IDN?` fields in order.
    pub fn idn(&self) -> [&str; 4] {
        [&self.idn[0], &self.idn[1], &self.idn[2], &self.idn[3]]
    }

    // ── User data ───────────────────────────────────────────────────────

    /// Attach opaque user state. Handlers retrieve it with
    /// [`Context::user_data`] / [`Context::user_data_mut`].
    pub fn set_user_data(&mut self, data: Box<dyn Any>) {
        self.user_data = Some(data);
    }

    /// Borrow the user state, downcast to `T`.
    pub fn user_data<T: 'static>(&self) -> Option<&T> {
        self.user_data.as_deref().and_then(|d| d.downcast_ref())
    }

    /// Mutably borrow the user state, downcast to `T`.
    pub fn user_data_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.user_data.as_deref_mut().and_then(|d| d.downcast_mut())
    }

    /// Detach and return the user state.
    pub fn take_user_data(&mut self) -> Option<Box<dyn Any>> {
        self.user_data.take()
    }

    // ── Error queue ─────────────────────────────────────────────────────

    /// Queue an error, mark the current command as failed, and fire the
    /// error-notification callback. Queue overflow evicts the oldest entry.
    pub fn error_push(&mut self, error: ScpiError) {
        self.errors.push(error.clone());
        self.cmd_error = true;
        if let Some(cb) = self.iface.on_error.as_mut() {
            cb(&error);
        }
    }

    /// Remove and return the oldest queued error (`SYSTem:ERRor?`), or
    /// `None` when the queue is empty.
    pub fn error_pop(&mut self) -> Option<ScpiError> {
        self.errors.pop()
    }

    /// The error queue, for inspection.
    pub fn error_queue(&self) -> &ErrorQueue {
        &self.errors
    }

    pub(crate) fn push_code(&mut self, code: i16, info: &str) {
        self.error_push(ScpiError::new(code, info));
    }

    // ── Device control ──────────────────────────────────────────────────

    /// Invoke the device-reset callback, if one was supplied. Intended to
    /// be called from the firmware's `*RST` handler.
    pub fn request_reset(&mut self) {
        if let Some(cb) = self.iface.reset.as_mut() {
            cb();
        }
    }

    // ── Command introspection ───────────────────────────────────────────

    pub(crate) fn find_command(&self, header: &str) -> Option<usize> {
        self.commands.iter().position(|cmd| cmd.matches(header))
    }

    /// Test whether the currently executing command was registered under
    /// a pattern matching `pattern`.
    pub fn is_current(&self, pattern: &str) -> bool {
        self.current_cmd
            .is_some_and(|idx| match_header(pattern, self.commands[idx].pattern()))
    }

    /// The pattern of the currently executing command.
    pub fn current_pattern(&self) -> Option<&str> {
        self.current_cmd.map(|idx| self.commands[idx].pattern())
    }

    /// The tag of the currently executing command.
    pub fn current_tag(&self) -> Option<i32> {
        self.current_cmd.map(|idx| self.commands[idx].tag())
    }

    /// Extract the numeric suffixes of the current command header.
    ///
    /// For every pattern segment carrying a `#` marker, the trailing digit
    /// run of the corresponding header segment is read as a base-10 value;
    /// `default` fills positions where no suffix was spelled. The returned
    /// vector always has length `count`.
    ///
    /// Header `TEST1:NUMBERS2` against pattern `TEST#:NUMbers#` yields
    /// `[1, 2]`; header `TEST:NUMBERS` yields `[default, default]`.
    pub fn command_numbers(&self, count: usize, default: i32) -> Vec<i32> {
        let mut result = vec![default; count];

        let Some(idx) = self.current_cmd else {
            return result;
        };
        if self.current_header.is_empty() {
            return result;
        }

        let pattern = self.commands[idx].pattern();
        let pattern = pattern.strip_suffix('?').unwrap_or(pattern);
        let pattern: String = pattern.chars().filter(|c| *c != '[' && *c != ']').collect();

        let header = self
            .current_header
            .strip_suffix('?')
            .unwrap_or(&self.current_header);

        let mut slot = 0usize;
        for (pat_seg, hdr_seg) in pattern.split(':').zip(header.split(':')) {
            if slot >= count {
                break;
            }
            if !pat_seg.contains('#') {
                continue;
            }
            let stem_len = hdr_seg
                .trim_end_matches(|c: char| c.is_ascii_digit())
                .len();
            let digits = &hdr_seg[stem_len..];
            if !digits.is_empty()
                && let Ok(value) = digits.parse::<i32>()
            {
                result[slot] = value;
            }
            slot += 1;
        }

        result
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("commands", &self.commands.len())
            .field("line_capacity", &self.line_capacity)
            .field("errors", &self.errors.len())
            .field("current_header", &self.current_header)
            .finish_non_exhaustive()
    }
}
