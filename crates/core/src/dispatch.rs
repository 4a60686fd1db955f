//! Line parser and input framer.
//!
//! [`Context::parse`] walks a complete line: it lexes each command header,
//! applies IEEE 488.2 compound-command path inheritance, looks the header
//! up in the command table, hands the parameter span to the handler, and
//! terminates the response line. [`Context::input`] accumulates bytes
//! until a newline and feeds complete lines to the parser.

use crate::context::Context;
use crate::error::ParseError;
use crate::language::lexer::Cursor;
use scpi_toolkit_errors::codes;

/// IEEE 488.2 §7.2 compound-command path inheritance: after a semicolon,
/// the next header inherits the subsystem path of the previous one unless
/// it is absolute (leading `:`) or a common command (`*`), or the previous
/// header was a common command.
fn compose_path(prev: &str, current: &str) -> String {
    if current.is_empty() || prev.is_empty() {
        return current.to_string();
    }
    if current.starts_with('*') || current.starts_with(':') {
        return current.to_string();
    }
    if prev.starts_with('*') {
        return current.to_string();
    }
    match prev.rfind(':') {
        Some(last) => format!("{}{}", &prev[..=last], current),
        None => current.to_string(),
    }
}

impl Context {
    /// Parse one complete SCPI line (terminated by `\n`, `\r`, or end of
    /// buffer) and invoke the matching handlers in textual order.
    ///
    /// A lexically invalid or unregistered header queues `-100` / `-113`
    /// and aborts the rest of the line; handler failures queue `-200`
    /// (unless the handler queued something itself) and parsing continues
    /// with the next command. The parser stays usable after any failure.
    pub fn parse(&mut self, data: &[u8]) -> Result<(), ParseError> {
        self.output_count = 0;
        self.first_output = true;

        let mut cur = Cursor::new(data);
        let mut prev_header = String::new();

        while !cur.is_eos() {
            cur.whitespace();
            if cur.is_eos() {
                break;
            }

            // Bare terminators are empty messages; they also end any
            // inherited path.
            if cur.peek() == b'\n' || cur.peek() == b'\r' {
                cur.newline();
                prev_header.clear();
                continue;
            }

            let (header, consumed) = cur.program_header();
            if consumed == 0 {
                self.push_code(codes::COMMAND_ERROR, "Invalid command");
                return Err(ParseError::InvalidHeader { pos: cur.pos() });
            }
            let header_text = String::from_utf8_lossy(header.bytes).into_owned();

            let effective = compose_path(&prev_header, &header_text);

            let Some(idx) = self.find_command(&effective) else {
                self.push_code(codes::UNDEFINED_HEADER, "Undefined header");
                return Err(ParseError::UndefinedHeader { header: effective });
            };

            self.current_cmd = Some(idx);
            self.current_header.clear();
            self.current_header.push_str(&effective);
            self.cmd_error = false;
            self.input_count = 0;

            // The parameter span runs from here to the next `;` or line
            // terminator. It is copied into the context so the handler can
            // pull from it while mutating the rest of the context.
            cur.whitespace();
            let param_start = cur.pos();
            while !cur.is_eos() {
                let b = cur.peek();
                if b == b';' || b == b'\n' || b == b'\r' {
                    break;
                }
                cur.advance(1);
            }
            self.params.clear();
            self.params.extend_from_slice(&data[param_start..cur.pos()]);
            self.params_pos = 0;

            let handler = self.commands[idx].handler();
            if handler(self).is_err() && !self.cmd_error {
                self.push_code(codes::EXECUTION_ERROR, "Execution error");
            }

            // Terminator: a semicolon seeds the inherited path for the
            // next command; a newline (or end of buffer) clears it.
            if cur.is_eos() {
                prev_header.clear();
            } else {
                let (_, semi) = cur.semicolon();
                if semi > 0 {
                    prev_header = effective;
                } else {
                    cur.newline();
                    prev_header.clear();
                }
            }

        }

        // One combined response line per parsed line: results from all
        // commands share the comma framing, and the newline + flush happen
        // once, after the last handler.
        if !self.first_output {
            self.finish_response_line();
        }

        Ok(())
    }

    /// Feed bytes from the transport.
    ///
    /// Bytes accumulate in the line buffer until `\n`, at which point the
    /// complete line is parsed. An empty `data` slice forces a parse of
    /// whatever is buffered (explicit flush, e.g. on EOF). Overflowing the
    /// buffer queues `-350`, discards the partial line, and fails hard.
    pub fn input(&mut self, data: &[u8]) -> Result<(), ParseError> {
        if data.is_empty() {
            if !self.line_buffer.is_empty() {
                return self.parse_buffered_line();
            }
            return Ok(());
        }

        for &byte in data {
            if self.line_buffer.len() >= self.line_capacity {
                self.push_code(codes::INPUT_BUFFER_OVERFLOW, "Input buffer overflow");
                self.line_buffer.clear();
                return Err(ParseError::BufferOverflow {
                    capacity: self.line_capacity,
                });
            }

            self.line_buffer.push(byte);

            if byte == b'\n' {
                self.parse_buffered_line()?;
            }
        }

        Ok(())
    }

    /// Parse the buffered line and reset the buffer, detaching the buffer
    /// from the context for the duration of the parse.
    fn parse_buffered_line(&mut self) -> Result<(), ParseError> {
        let line = std::mem::take(&mut self.line_buffer);
        let result = self.parse(&line);
        self.line_buffer = line;
        self.line_buffer.clear();
        result
    }
}
