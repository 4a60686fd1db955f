//! Parameter extraction API, consumed by command handlers.
//!
//! All extractors share one primitive, [`Context::parameter`], which lazily
//! advances over the current command's parameter span: whitespace is
//! skipped, a comma separator is required between parameters, and the
//! program-data alternatives are tried in a fixed order. Typed wrappers
//! convert the resulting token and queue the appropriate SCPI error when a
//! handler's expectations are not met.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::ParseError;
use crate::language::lexer::{Cursor, TokKind};
use crate::language::pattern::match_mnemonic;
use scpi_toolkit_errors::codes;

/// A parameter pulled from the current command's parameter span.
///
/// Carries the token classification plus the byte span into the context's
/// parameter buffer; the raw bytes are available through
/// [`Context::parameter_bytes`]. A `kind` of [`TokKind::Unknown`] is the
/// "no parameter" sentinel returned by optional extraction at end of span.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Token classification; `Unknown` when nothing was extracted.
    pub kind: TokKind,
    span: Range<usize>,
}

impl Parameter {
    /// True when this is the end-of-span sentinel (or unrecognized data).
    pub fn is_absent(&self) -> bool {
        self.kind == TokKind::Unknown
    }
}

/// One option for [`Context::param_choice`]: a keyword pattern in SCPI
/// short/long notation and the tag returned when it matches.
#[derive(Debug, Clone, Copy)]
pub struct Choice {
    /// Keyword pattern (e.g. `"MAXimum"`).
    pub name: &'static str,
    /// Tag returned on a match.
    pub tag: i32,
}

/// One entry of a SCPI channel list expression `(@…)`.
///
/// Dimensions within a coordinate are separated by `!`, ranges by `:`,
/// entries by `,` (SCPI-99 Vol. 1 §8.3.2). `(@1!1:3!2)` is a 2-D range
/// from `1!1` to `3!2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelListEntry {
    /// True when the entry is a `from:to` range.
    pub is_range: bool,
    /// Dimension values of the entry (or of the range start).
    pub from: Vec<i32>,
    /// Dimension values of the range end; empty for single entries.
    pub to: Vec<i32>,
    /// Number of dimensions: `max(from.len(), to.len())`.
    pub dimensions: usize,
}

/// Outcome of scanning the parameter span, gathered before any context
/// mutation so token borrows never overlap error-queue writes.
enum Scan {
    Exhausted,
    MissingComma,
    Data {
        kind: TokKind,
        span: Range<usize>,
        end: usize,
    },
}

/// Try the program-data alternatives in the canonical order:
/// non-decimal numeric, mnemonic, decimal numeric (with optional unit
/// suffix), string, arbitrary block, program expression.
fn scan_program_data(cur: &mut Cursor<'_>) -> (TokKind, Range<usize>) {
    let (tok, n) = cur.nondecimal_numeric();
    if n > 0 {
        return (tok.kind, tok.start..tok.start + n);
    }

    let (tok, n) = cur.character_program_data();
    if n > 0 {
        return (tok.kind, tok.start..tok.start + n);
    }

    let (tok, n) = cur.decimal_numeric();
    if n > 0 {
        let number_end = cur.pos();
        cur.whitespace();
        let (_, suffix_len) = cur.suffix_program_data();
        if suffix_len > 0 {
            return (TokKind::DecimalNumericWithSuffix, tok.start..cur.pos());
        }
        cur.seek(number_end);
        return (tok.kind, tok.start..number_end);
    }

    let (tok, n) = cur.string_program_data();
    if n > 0 {
        return (tok.kind, tok.start..tok.start + n);
    }

    let (tok, n) = cur.arbitrary_block();
    if n > 0 {
        return (tok.kind, tok.start..tok.start + n);
    }

    let (tok, n) = cur.program_expression();
    if n > 0 {
        return (tok.kind, tok.start..tok.start + n);
    }

    (TokKind::Unknown, cur.pos()..cur.pos())
}

impl Context {
    /// Extract the next parameter from the current command's span.
    ///
    /// At end of span: queues `-109` and fails when `mandatory`, otherwise
    /// returns the `Unknown` sentinel. From the second parameter on, a
    /// comma separator is required (`-104` otherwise).
    pub fn parameter(&mut self, mandatory: bool) -> Result<Parameter, ParseError> {
        let scan = {
            let mut cur = Cursor::new(&self.params);
            cur.seek(self.params_pos);
            cur.whitespace();

            if cur.is_eos() {
                Scan::Exhausted
            } else {
                let mut separated = true;
                if self.input_count > 0 {
                    let (_, n) = cur.comma();
                    separated = n > 0;
                    if separated {
                        cur.whitespace();
                    }
                }
                if separated {
                    let (kind, span) = scan_program_data(&mut cur);
                    Scan::Data {
                        kind,
                        span,
                        end: cur.pos(),
                    }
                } else {
                    Scan::MissingComma
                }
            }
        };

        match scan {
            Scan::Exhausted => {
                if mandatory {
                    self.push_code(codes::MISSING_PARAMETER, "Missing parameter");
                    return Err(ParseError::MissingParameter);
                }
                Ok(Parameter {
                    kind: TokKind::Unknown,
                    span: 0..0,
                })
            }
            Scan::MissingComma => {
                self.push_code(codes::DATA_TYPE_ERROR, "Invalid separator");
                Err(ParseError::InvalidSeparator)
            }
            Scan::Data { kind, span, end } => {
                self.input_count += 1;
                self.params_pos = end;
                Ok(Parameter { kind, span })
            }
        }
    }

    /// The raw bytes of an extracted parameter.
    pub fn parameter_bytes(&self, param: &Parameter) -> &[u8] {
        &self.params[param.span.clone()]
    }

    // ── Typed extractors ────────────────────────────────────────────────

    /// Extract an `i32` parameter; 0 when optional and absent.
    pub fn param_i32(&mut self, mandatory: bool) -> Result<i32, ParseError> {
        let param = self.parameter(mandatory)?;
        if param.is_absent() {
            return Ok(0);
        }
        self.param_to_i32(&param)
    }

    /// Extract an `i64` parameter; 0 when optional and absent.
    pub fn param_i64(&mut self, mandatory: bool) -> Result<i64, ParseError> {
        let param = self.parameter(mandatory)?;
        if param.is_absent() {
            return Ok(0);
        }
        self.param_to_i64(&param)
    }

    /// Extract an `f32` parameter; 0.0 when optional and absent.
    pub fn param_f32(&mut self, mandatory: bool) -> Result<f32, ParseError> {
        self.param_f64(mandatory).map(|v| v as f32)
    }

    /// Extract an `f64` parameter; 0.0 when optional and absent.
    pub fn param_f64(&mut self, mandatory: bool) -> Result<f64, ParseError> {
        let param = self.parameter(mandatory)?;
        if param.is_absent() {
            return Ok(0.0);
        }
        self.param_to_f64(&param)
    }

    /// Extract a string parameter; empty when optional and absent.
    ///
    /// Quoted data is returned with the outer delimiters stripped and
    /// doubled delimiters collapsed; other token kinds yield their raw
    /// text.
    pub fn param_string(&mut self, mandatory: bool) -> Result<String, ParseError> {
        let param = self.parameter(mandatory)?;
        if param.is_absent() {
            return Ok(String::new());
        }
        Ok(self.param_to_string(&param))
    }

    /// Extract a boolean parameter: decimal 0/nonzero or the mnemonics
    /// `ON`/`OFF` (case-insensitive). `false` when optional and absent.
    pub fn param_bool(&mut self, mandatory: bool) -> Result<bool, ParseError> {
        let param = self.parameter(mandatory)?;
        if param.is_absent() {
            return Ok(false);
        }

        match param.kind {
            TokKind::DecimalNumeric => self.param_to_i32(&param).map(|v| v != 0),
            TokKind::ProgramMnemonic => {
                let text =
                    String::from_utf8_lossy(self.parameter_bytes(&param)).to_ascii_uppercase();
                match text.as_str() {
                    "ON" => Ok(true),
                    "OFF" => Ok(false),
                    _ => {
                        self.push_code(codes::INVALID_PARAMETER_VALUE, "Invalid parameter value");
                        Err(ParseError::InvalidValue { value: text })
                    }
                }
            }
            _ => {
                self.push_code(codes::DATA_TYPE_ERROR, "Data type error");
                Err(ParseError::DataType {
                    expected: "boolean",
                })
            }
        }
    }

    /// Extract a choice parameter: a mnemonic matched against each
    /// option's pattern; the first hit's tag is returned. 0 when optional
    /// and absent.
    pub fn param_choice(&mut self, choices: &[Choice], mandatory: bool) -> Result<i32, ParseError> {
        let param = self.parameter(mandatory)?;
        if param.is_absent() {
            return Ok(0);
        }

        if param.kind != TokKind::ProgramMnemonic {
            self.push_code(codes::DATA_TYPE_ERROR, "Data type error");
            return Err(ParseError::DataType {
                expected: "mnemonic",
            });
        }

        let value = String::from_utf8_lossy(self.parameter_bytes(&param)).into_owned();
        for choice in choices {
            if match_mnemonic(choice.name, &value) {
                return Ok(choice.tag);
            }
        }

        self.push_code(codes::INVALID_PARAMETER_VALUE, "Invalid parameter value");
        Err(ParseError::InvalidValue { value })
    }

    /// Extract an IEEE 488.2 arbitrary-block parameter and return its
    /// payload bytes. `None` when optional and absent.
    pub fn param_block(&mut self, mandatory: bool) -> Result<Option<Vec<u8>>, ParseError> {
        let param = self.parameter(mandatory)?;
        if param.is_absent() {
            return Ok(None);
        }

        if param.kind != TokKind::ArbitraryBlock {
            self.push_code(codes::DATA_TYPE_ERROR, "Data type error");
            return Err(ParseError::DataType {
                expected: "arbitrary block",
            });
        }

        let bytes = self.parameter_bytes(&param).to_vec();
        if bytes.len() < 2 || bytes[0] != b'#' {
            self.push_code(codes::DATA_TYPE_ERROR, "Invalid arbitrary block");
            return Err(ParseError::DataType {
                expected: "arbitrary block",
            });
        }

        let digits = (bytes[1] - b'0') as usize;
        if digits == 0 {
            // Indefinite form: the payload is everything after `#0`.
            return Ok(Some(bytes[2..].to_vec()));
        }

        let header_len = 2 + digits;
        if bytes.len() < header_len {
            self.push_code(codes::DATA_TYPE_ERROR, "Invalid arbitrary block");
            return Err(ParseError::DataType {
                expected: "arbitrary block",
            });
        }
        Ok(Some(bytes[header_len..].to_vec()))
    }

    /// Extract a channel-list parameter `(@…)`. Empty when optional and
    /// absent (or when the list itself is empty).
    pub fn param_channel_list(
        &mut self,
        mandatory: bool,
    ) -> Result<Vec<ChannelListEntry>, ParseError> {
        let param = self.parameter(mandatory)?;
        if param.is_absent() {
            return Ok(Vec::new());
        }

        if param.kind != TokKind::ProgramExpression {
            self.push_code(codes::DATA_TYPE_ERROR, "Data type error");
            return Err(ParseError::DataType {
                expected: "channel list",
            });
        }

        let text = String::from_utf8_lossy(self.parameter_bytes(&param)).into_owned();
        let raw = text.as_bytes();
        if raw.len() < 3 || raw[0] != b'(' || raw[1] != b'@' || raw[raw.len() - 1] != b')' {
            self.push_code(codes::DATA_TYPE_ERROR, "Invalid channel list");
            return Err(ParseError::InvalidValue { value: text });
        }

        let inner = text[2..text.len() - 1].trim();
        if inner.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for part in inner.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match parse_channel_entry(part) {
                Ok(entry) => entries.push(entry),
                Err(bad) => {
                    self.push_code(codes::DATA_TYPE_ERROR, "Invalid channel list entry");
                    return Err(ParseError::InvalidValue { value: bad });
                }
            }
        }
        Ok(entries)
    }

    // ── Per-token conversions ───────────────────────────────────────────

    /// Convert an extracted parameter to `i32`.
    ///
    /// Hex/octal/binary tokens parse in their base (skipping the two-byte
    /// prefix). Decimal tokens with no `.`/`e`/`E` take the integer parse
    /// path directly — going through a float would round values near the
    /// `i32` extrema; anything else parses as a float and truncates.
    pub fn param_to_i32(&mut self, param: &Parameter) -> Result<i32, ParseError> {
        match param.kind {
            TokKind::HexNum => self.radix_literal(param, 16),
            TokKind::OctNum => self.radix_literal(param, 8),
            TokKind::BinNum => self.radix_literal(param, 2),
            TokKind::DecimalNumeric | TokKind::DecimalNumericWithSuffix => {
                let literal = self.decimal_literal(param);
                if !literal.contains(['.', 'e', 'E']) {
                    literal
                        .parse::<i32>()
                        .map_err(|_| ParseError::NumericConversion { literal })
                } else {
                    literal
                        .parse::<f64>()
                        .map(|v| v as i32)
                        .map_err(|_| ParseError::NumericConversion { literal })
                }
            }
            _ => {
                self.push_code(codes::DATA_TYPE_ERROR, "Data type error");
                Err(ParseError::DataType {
                    expected: "decimal numeric",
                })
            }
        }
    }

    /// Convert an extracted parameter to `i64` (same rules as
    /// [`Context::param_to_i32`]).
    pub fn param_to_i64(&mut self, param: &Parameter) -> Result<i64, ParseError> {
        match param.kind {
            TokKind::HexNum => self.radix_literal(param, 16),
            TokKind::OctNum => self.radix_literal(param, 8),
            TokKind::BinNum => self.radix_literal(param, 2),
            TokKind::DecimalNumeric | TokKind::DecimalNumericWithSuffix => {
                let literal = self.decimal_literal(param);
                if !literal.contains(['.', 'e', 'E']) {
                    literal
                        .parse::<i64>()
                        .map_err(|_| ParseError::NumericConversion { literal })
                } else {
                    literal
                        .parse::<f64>()
                        .map(|v| v as i64)
                        .map_err(|_| ParseError::NumericConversion { literal })
                }
            }
            _ => {
                self.push_code(codes::DATA_TYPE_ERROR, "Data type error");
                Err(ParseError::DataType {
                    expected: "decimal numeric",
                })
            }
        }
    }

    /// Convert an extracted parameter to `f64`. Non-decimal numerics go
    /// through their integer value.
    pub fn param_to_f64(&mut self, param: &Parameter) -> Result<f64, ParseError> {
        match param.kind {
            TokKind::HexNum | TokKind::OctNum | TokKind::BinNum => {
                let value: i64 = match param.kind {
                    TokKind::HexNum => self.radix_literal(param, 16)?,
                    TokKind::OctNum => self.radix_literal(param, 8)?,
                    _ => self.radix_literal(param, 2)?,
                };
                Ok(value as f64)
            }
            TokKind::DecimalNumeric | TokKind::DecimalNumericWithSuffix => {
                let literal = self.decimal_literal(param);
                literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::NumericConversion { literal })
            }
            _ => {
                self.push_code(codes::DATA_TYPE_ERROR, "Data type error");
                Err(ParseError::DataType {
                    expected: "decimal numeric",
                })
            }
        }
    }

    /// Convert an extracted parameter to a string: quoted data is
    /// unescaped, anything else yields its raw text.
    pub fn param_to_string(&self, param: &Parameter) -> String {
        let bytes = self.parameter_bytes(param);
        match param.kind {
            TokKind::SingleQuoteData | TokKind::DoubleQuoteData => {
                let quote = bytes[0] as char;
                let inner = String::from_utf8_lossy(&bytes[1..bytes.len() - 1]).into_owned();
                inner.replace(&format!("{quote}{quote}"), &quote.to_string())
            }
            _ => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    // ── Conversion helpers ──────────────────────────────────────────────

    /// Parse a `#H`/`#Q`/`#B` token in its base, skipping the prefix.
    fn radix_literal<T: RadixInt>(&self, param: &Parameter, radix: u32) -> Result<T, ParseError> {
        let text = String::from_utf8_lossy(&self.parameter_bytes(param)[2..]).into_owned();
        T::from_str_radix(&text, radix).map_err(|_| ParseError::NumericConversion { literal: text })
    }

    /// The numeric part of a decimal token: the unit suffix (a trailing
    /// alphabetic run) is cut off and surrounding whitespace trimmed.
    fn decimal_literal(&self, param: &Parameter) -> String {
        let bytes = self.parameter_bytes(param);
        let mut end = bytes.len();
        if param.kind == TokKind::DecimalNumericWithSuffix {
            while end > 0 && bytes[end - 1].is_ascii_alphabetic() {
                end -= 1;
            }
        }
        String::from_utf8_lossy(&bytes[..end]).trim().to_string()
    }
}

/// Integer types parseable from a radix literal.
trait RadixInt: Sized {
    fn from_str_radix(src: &str, radix: u32) -> Result<Self, std::num::ParseIntError>;
}

impl RadixInt for i32 {
    fn from_str_radix(src: &str, radix: u32) -> Result<Self, std::num::ParseIntError> {
        i32::from_str_radix(src, radix)
    }
}

impl RadixInt for i64 {
    fn from_str_radix(src: &str, radix: u32) -> Result<Self, std::num::ParseIntError> {
        i64::from_str_radix(src, radix)
    }
}

// ── Channel-list parsing ────────────────────────────────────────────────

/// Parse one channel-list entry: either `coord` or `coord:coord`, with
/// `!`-separated dimension values. On failure, the offending value text is
/// returned.
fn parse_channel_entry(s: &str) -> Result<ChannelListEntry, String> {
    if let Some((from_text, to_text)) = s.split_once(':') {
        let from = parse_dimension_values(from_text)?;
        let to = parse_dimension_values(to_text)?;
        let dimensions = from.len().max(to.len());
        return Ok(ChannelListEntry {
            is_range: true,
            from,
            to,
            dimensions,
        });
    }

    let from = parse_dimension_values(s)?;
    let dimensions = from.len();
    Ok(ChannelListEntry {
        is_range: false,
        from,
        to: Vec::new(),
        dimensions,
    })
}

fn parse_dimension_values(s: &str) -> Result<Vec<i32>, String> {
    s.split('!')
        .map(|part| {
            let part = part.trim();
            part.parse::<i32>().map_err(|_| part.to_string())
        })
        .collect()
}
