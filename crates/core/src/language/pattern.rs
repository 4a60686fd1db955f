//! SCPI keyword and header pattern matching.
//!
//! Patterns use SCPI notation: the uppercase prefix of a keyword is its
//! short form, the full spelling its long form (`MEASure` accepts `MEAS`
//! and `MEASURE`, nothing in between). Nodes are joined by `:`, `[…]`
//! marks an optional subtree, a trailing `?` marks a query, and `#` marks
//! a numeric-suffix position.

/// Check whether a received mnemonic matches a pattern keyword.
///
/// Only the exact short form (uppercase portion of the pattern) or the
/// exact long form (full keyword) are accepted, per IEEE 488.2. Matching
/// is case-insensitive on the received value and allocation-free.
pub fn match_mnemonic(pattern: &str, value: &str) -> bool {
    let short_len = pattern
        .bytes()
        .position(|b| b.is_ascii_lowercase())
        .unwrap_or(pattern.len());

    if value.len() == short_len {
        return value.eq_ignore_ascii_case(&pattern[..short_len]);
    }
    if value.len() == pattern.len() {
        return value.eq_ignore_ascii_case(pattern);
    }
    false
}

/// Check whether a received command header matches a command pattern.
///
/// Both sides are compared with any trailing `?` stripped. A pattern with
/// an optional `[…]` subtree is tried with the bracket contents elided
/// first, then with the brackets removed and the contents kept.
pub fn match_header(pattern: &str, header: &str) -> bool {
    let pattern = pattern.strip_suffix('?').unwrap_or(pattern);
    let header = header.strip_suffix('?').unwrap_or(header);

    match split_optional(pattern) {
        Some((elided, expanded)) => {
            match_header_parts(&elided, header) || match_header_parts(&expanded, header)
        }
        None => match_header_parts(pattern, header),
    }
}

/// Produce the two bracket alternatives of a pattern, if it has an
/// optional `[…]` subtree: (contents elided, contents kept).
fn split_optional(pattern: &str) -> Option<(String, String)> {
    let open = pattern.find('[')?;
    let close = pattern.find(']')?;
    let elided = format!("{}{}", &pattern[..open], &pattern[close + 1..]);
    let expanded: String = pattern.chars().filter(|c| *c != '[' && *c != ']').collect();
    Some((elided, expanded))
}

/// Match a bracket-free pattern against a header, segment by segment.
fn match_header_parts(pattern: &str, header: &str) -> bool {
    // A leading ':' produces an empty first segment on either side; drop it
    // so absolute and relative spellings compare equal.
    let pattern = pattern.strip_prefix(':').unwrap_or(pattern);
    let header = header.strip_prefix(':').unwrap_or(header);

    let mut pat_segs = pattern.split(':');
    let mut hdr_segs = header.split(':');

    loop {
        match (pat_segs.next(), hdr_segs.next()) {
            (Some(pat), Some(hdr)) => {
                if !match_segment(pat, hdr) {
                    return false;
                }
            }
            (None, None) => return true,
            // Segment counts differ.
            _ => return false,
        }
    }
}

/// Match one pattern segment against one header segment, handling the `#`
/// numeric-suffix marker: when present, the marker is stripped from the
/// pattern and any trailing digit run is stripped from the header.
fn match_segment(pattern: &str, header: &str) -> bool {
    if pattern.contains('#') {
        let pattern = pattern.trim_end_matches('#');
        let header = header.trim_end_matches(|c: char| c.is_ascii_digit());
        return match_mnemonic(pattern, header);
    }
    match_mnemonic(pattern, header)
}

/// Bracket alternatives of a command pattern, precomputed at registration
/// so the dispatcher's lookup loop never rewrites pattern strings.
#[derive(Debug, Clone)]
pub(crate) struct PatternAlts {
    /// Pattern with the optional subtree elided (or the pattern verbatim
    /// when it has no brackets), trailing `?` stripped.
    primary: String,
    /// Pattern with the brackets removed and contents kept; only present
    /// when the pattern has an optional subtree.
    expanded: Option<String>,
}

impl PatternAlts {
    pub(crate) fn compile(pattern: &str) -> Self {
        let pattern = pattern.strip_suffix('?').unwrap_or(pattern);
        match split_optional(pattern) {
            Some((elided, expanded)) => Self {
                primary: elided,
                expanded: Some(expanded),
            },
            None => Self {
                primary: pattern.to_string(),
                expanded: None,
            },
        }
    }

    /// Match a received header (trailing `?` allowed) against the
    /// precomputed alternatives.
    pub(crate) fn matches(&self, header: &str) -> bool {
        let header = header.strip_suffix('?').unwrap_or(header);
        if match_header_parts(&self.primary, header) {
            return true;
        }
        self.expanded
            .as_deref()
            .is_some_and(|p| match_header_parts(p, header))
    }
}
