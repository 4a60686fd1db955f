//! Response formatter — appends typed values to the output sink with
//! comma/newline framing per IEEE 488.2.
//!
//! All results produced while parsing one line are comma-separated into a
//! single response line, whichever commands of the line emitted them; the
//! dispatcher terminates the line (newline + flush) once, after the last
//! handler, if at least one result was produced.

use crate::context::Context;

impl Context {
    fn write(&mut self, data: &[u8]) {
        if let Some(sink) = self.iface.write.as_mut() {
            sink(data);
        }
    }

    /// Write a comma before every result but the first of a response.
    fn write_delimiter(&mut self) {
        if self.output_count > 0 {
            self.write(b",");
        }
    }

    fn mark_output(&mut self) {
        self.output_count += 1;
        self.first_output = false;
    }

    /// Terminate the current response line: newline, flush, and reset of
    /// the per-line framing state. Called by the dispatcher at most once
    /// per parsed line, after the last handler has run.
    pub(crate) fn finish_response_line(&mut self) {
        self.write(b"\n");
        if let Some(flush) = self.iface.flush.as_mut() {
            flush();
        }
        self.first_output = true;
        self.output_count = 0;
    }

    // ── Typed results ───────────────────────────────────────────────────

    /// Append a text result, wrapped in `"…"` with embedded `"` doubled.
    pub fn result_text(&mut self, text: &str) {
        self.write_delimiter();
        self.write(b"\"");
        let escaped = text.replace('"', "\"\"");
        self.write(escaped.as_bytes());
        self.write(b"\"");
        self.mark_output();
    }

    /// Append a 32-bit integer result in decimal.
    pub fn result_i32(&mut self, value: i32) {
        self.write_delimiter();
        let text = value.to_string();
        self.write(text.as_bytes());
        self.mark_output();
    }

    /// Append a 64-bit integer result in decimal.
    pub fn result_i64(&mut self, value: i64) {
        self.write_delimiter();
        let text = value.to_string();
        self.write(text.as_bytes());
        self.mark_output();
    }

    /// Append a single-precision float result in general format.
    pub fn result_f32(&mut self, value: f32) {
        self.write_delimiter();
        let text = format_f32(value);
        self.write(text.as_bytes());
        self.mark_output();
    }

    /// Append a double-precision float result in general format.
    pub fn result_f64(&mut self, value: f64) {
        self.write_delimiter();
        let text = format_f64(value);
        self.write(text.as_bytes());
        self.mark_output();
    }

    /// Append a boolean result as `1` or `0`.
    pub fn result_bool(&mut self, value: bool) {
        self.result_i32(if value { 1 } else { 0 });
    }

    /// Append character data verbatim (no quoting).
    pub fn result_mnemonic(&mut self, data: &str) {
        self.write_delimiter();
        self.write(data.as_bytes());
        self.mark_output();
    }

    /// Append an IEEE 488.2 definite-length arbitrary block:
    /// `#<n><length><data>` where `n` is the digit count of `<length>`.
    pub fn result_block(&mut self, data: &[u8]) {
        self.write_delimiter();
        let length = data.len().to_string();
        let header = format!("#{}{}", length.len(), length);
        self.write(header.as_bytes());
        self.write(data);
        self.mark_output();
    }
}

// ── Float formatting ────────────────────────────────────────────────────

/// General ("%g"-style) float formatting: shortest round-trip decimal for
/// moderate magnitudes, exponent notation outside them.
fn format_f64(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if (1e-4..1e21).contains(&magnitude) {
        value.to_string()
    } else {
        format!("{value:e}")
    }
}

fn format_f32(value: f32) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if (1e-4..1e21).contains(&magnitude) {
        value.to_string()
    } else {
        format!("{value:e}")
    }
}
