//! Tests for SCPI keyword and command-header pattern matching.

use scpi_toolkit_core::{match_header, match_mnemonic};

// ─── 1. Keyword matching (short / long form) ─────────────────────────────────

#[test]
fn mnemonic_short_and_long_forms() {
    let cases = [
        ("MEASure", "MEAS", true),
        ("MEASure", "MEASURE", true),
        ("MEASure", "MEA", false),
        ("MEASure", "MEASU", false),
        ("MEASure", "MEASUR", false),
        ("MEASure", "MEASUREMENT", false),
        ("VOLTage", "VOLT", true),
        ("VOLTage", "VOLTAGE", true),
        ("CURRent", "CURR", true),
        ("CURRent", "CURRENT", true),
    ];
    for (pattern, value, want) in cases {
        assert_eq!(
            match_mnemonic(pattern, value),
            want,
            "match_mnemonic({pattern:?}, {value:?})"
        );
    }
}

#[test]
fn mnemonic_matching_is_case_insensitive_on_value() {
    assert!(match_mnemonic("MEASure", "meas"));
    assert!(match_mnemonic("MEASure", "Measure"));
    assert!(match_mnemonic("MEASure", "mEaSuRe"));
}

#[test]
fn mnemonic_all_uppercase_pattern_is_exact() {
    // No lowercase tail: short and long form coincide.
    assert!(match_mnemonic("ON", "ON"));
    assert!(match_mnemonic("ON", "on"));
    assert!(!match_mnemonic("ON", "O"));
    assert!(!match_mnemonic("ON", "ONN"));
}

#[test]
fn mnemonic_wrong_text_same_length_rejected() {
    assert!(!match_mnemonic("MEASure", "MEAX"));
    assert!(!match_mnemonic("MEASure", "XEASURE"));
}

// ─── 2. Command-header matching ──────────────────────────────────────────────

#[test]
fn header_basic_forms() {
    let cases = [
        ("MEASure:VOLTage?", "MEAS:VOLT?", true),
        ("MEASure:VOLTage?", "MEASURE:VOLTAGE?", true),
        ("MEASure:VOLTage?", "MEAS:VOLT", true),
        ("SOURce:VOLTage", "SOUR:VOLT", true),
        ("SOURce:CURRent", "SOUR:CURR", true),
        ("*IDN?", "*IDN?", true),
        ("*RST", "*RST", true),
        ("OUTPut", "OUTP", true),
        ("OUTPut", "OUTPUT", true),
        ("MEASure:VOLTage?", "MEAS:CURR?", false),
        ("MEASure:VOLTage?", "MEASU:VOLT?", false),
    ];
    for (pattern, header, want) in cases {
        assert_eq!(
            match_header(pattern, header),
            want,
            "match_header({pattern:?}, {header:?})"
        );
    }
}

#[test]
fn header_segment_count_must_match() {
    assert!(!match_header("MEASure:VOLTage", "MEAS"));
    assert!(!match_header("MEASure", "MEAS:VOLT"));
    assert!(!match_header("MEASure:VOLTage:DC", "MEAS:VOLT"));
}

#[test]
fn header_leading_colon_is_ignored() {
    assert!(match_header("SYSTem:ERRor?", ":SYST:ERR?"));
    assert!(match_header(":SYSTem:ERRor?", "SYST:ERR?"));
    assert!(match_header(":SYSTem:ERRor?", ":SYST:ERR?"));
}

#[test]
fn header_optional_subtree() {
    // Bracket contents elided or spelled out, nothing in between.
    let pattern = "MEASure:VOLTage[:DC]?";
    assert!(match_header(pattern, "MEAS:VOLT?"));
    assert!(match_header(pattern, "MEAS:VOLT:DC?"));
    assert!(match_header(pattern, "MEASURE:VOLTAGE:DC?"));
    assert!(!match_header(pattern, "MEAS:VOLT:AC?"));
    assert!(!match_header(pattern, "MEAS:VOLT:DC:EXTRA?"));
}

#[test]
fn header_optional_subtree_mid_pattern() {
    let pattern = "SOURce[:CHANnel]:LEVel";
    assert!(match_header(pattern, "SOUR:LEV"));
    assert!(match_header(pattern, "SOUR:CHAN:LEV"));
    assert!(match_header(pattern, "SOURCE:CHANNEL:LEVEL"));
    assert!(!match_header(pattern, "SOUR:CHAN"));
}

#[test]
fn header_numeric_suffix_positions() {
    assert!(match_header("OUTPut#", "OUTP"));
    assert!(match_header("OUTPut#", "OUTP2"));
    assert!(match_header("OUTPut#", "OUTPUT31"));
    assert!(match_header("TEST#:NUMbers#", "TEST1:NUMBERS2"));
    assert!(match_header("TEST#:NUMbers#", "TEST:NUMBERS"));
    assert!(!match_header("OUTPut", "OUTP2"));
}

#[test]
fn header_query_marker_is_stripped_from_both_sides() {
    assert!(match_header("STATus?", "STAT"));
    assert!(match_header("STATus", "STAT?"));
}
