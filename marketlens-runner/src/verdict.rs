//! Extract a structured verdict from free-form reasoning text.
//!
//! Two independent scans over the text:
//! - action: the earliest standalone BUY / SELL / HOLD word, any case
//! - confidence: a number labelled `confidence` or `probability`, else the
//!   first standalone decimal literal, accepted only inside [0, 1]
//!
//! Parsing is total. Missing or out-of-range values fall back to HOLD / 0.5.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const LABELS: [&str; 2] = ["confidence", "probability"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    fn from_word(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("buy") {
            Some(Action::Buy)
        } else if word.eq_ignore_ascii_case("sell") {
            Some(Action::Sell)
        } else if word.eq_ignore_ascii_case("hold") {
            Some(Action::Hold)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub action: Action,
    pub confidence: f64,
    pub raw_reasoning: String,
}

/// Parse `text` into a verdict. Never fails.
pub fn parse(text: &str) -> Verdict {
    let chars: Vec<char> = text.chars().collect();
    Verdict {
        action: scan_action(&chars).unwrap_or(Action::Hold),
        confidence: scan_confidence(&chars).unwrap_or(DEFAULT_CONFIDENCE),
        raw_reasoning: text.trim().to_string(),
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Maximal runs of word characters as `(start, end)` char offsets.
fn words(chars: &[char]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if is_word(chars[i]) {
            let start = i;
            while i < chars.len() && is_word(chars[i]) {
                i += 1;
            }
            out.push((start, i));
        } else {
            i += 1;
        }
    }
    out
}

fn scan_action(chars: &[char]) -> Option<Action> {
    words(chars).into_iter().find_map(|(s, e)| {
        let word: String = chars[s..e].iter().collect();
        Action::from_word(&word)
    })
}

fn scan_confidence(chars: &[char]) -> Option<f64> {
    labelled_confidence(chars).or_else(|| first_unit_decimal(chars))
}

/// Separators allowed between a label and its number.
fn is_label_gap(c: char) -> bool {
    c.is_whitespace() || matches!(c, ':' | '=' | '*' | '_' | '`' | '#' | '"' | '\'' | '[' | '(')
}

fn labelled_confidence(chars: &[char]) -> Option<f64> {
    words(chars).into_iter().find_map(|(s, e)| {
        let word: String = chars[s..e].iter().collect::<String>().to_lowercase();
        if !LABELS.contains(&word.as_str()) {
            return None;
        }
        let mut i = e;
        while i < chars.len() && is_label_gap(chars[i]) {
            i += 1;
        }
        let literal = literal_at(chars, i)?;
        (0.0..=1.0).contains(&literal.value).then_some(literal.value)
    })
}

fn first_unit_decimal(chars: &[char]) -> Option<f64> {
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        match literal_at(chars, i) {
            Some(lit) if lit.has_point && (0.0..=1.0).contains(&lit.value) => {
                return Some(lit.value)
            }
            Some(lit) => i = lit.end,
            None => i = skip_run(chars, i),
        }
    }
    None
}

struct Literal {
    value: f64,
    end: usize,
    has_point: bool,
}

/// A standalone numeric literal (`d+` or `d+.d+`) starting at `start`.
///
/// Rejects literals glued to letters, signs or further dotted groups, so
/// `v2.1`, `-0.4`, `10.0.0.1` and `0.9x` are not numbers. One trailing `.`
/// (end of sentence) is allowed.
fn literal_at(chars: &[char], start: usize) -> Option<Literal> {
    if start >= chars.len() || !chars[start].is_ascii_digit() {
        return None;
    }
    if start > 0 {
        let prev = chars[start - 1];
        if is_word(prev) || prev == '.' || prev == '-' {
            return None;
        }
    }

    let digit_at = |i: usize| chars.get(i).is_some_and(|c| c.is_ascii_digit());

    let mut end = start;
    while digit_at(end) {
        end += 1;
    }
    let mut has_point = false;
    if chars.get(end) == Some(&'.') && digit_at(end + 1) {
        has_point = true;
        end += 1;
        while digit_at(end) {
            end += 1;
        }
    }

    match chars.get(end) {
        Some(&c) if is_word(c) => return None,
        Some(&'.') if digit_at(end + 1) => return None,
        _ => {}
    }

    let text: String = chars[start..end].iter().collect();
    let value = text.parse::<f64>().ok()?;
    Some(Literal {
        value,
        end,
        has_point,
    })
}

/// Skip a run of word characters and dots, e.g. an IP address or version.
fn skip_run(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() && (is_word(chars[i]) || chars[i] == '.') {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sell_with_labelled_confidence() {
        let v = parse("After review I recommend SELL given weak breadth. confidence: 0.82");
        assert_eq!(v.action, Action::Sell);
        assert_eq!(v.confidence, 0.82);
    }

    #[test]
    fn empty_text_defaults() {
        let v = parse("   ");
        assert_eq!(v.action, Action::Hold);
        assert_eq!(v.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(v.raw_reasoning, "");
    }

    #[test]
    fn action_is_case_insensitive_and_earliest() {
        assert_eq!(parse("we would buy here, not sell").action, Action::Buy);
        assert_eq!(parse("Sell now. BUY later.").action, Action::Sell);
        assert_eq!(parse("Hold").action, Action::Hold);
    }

    #[test]
    fn action_needs_word_boundaries() {
        assert_eq!(parse("buyback programme and a holdco").action, Action::Hold);
        assert_eq!(parse("BUYERS everywhere; SELL").action, Action::Sell);
        assert_eq!(parse("BUY_ZONE").action, Action::Hold);
    }

    #[test]
    fn structured_block() {
        let text = "• VERDICT: BUY\n• CONFIDENCE: 0.9\n• RISK FACTORS: crude prices\n• REASONING: trend intact";
        let v = parse(text);
        assert_eq!(v.action, Action::Buy);
        assert_eq!(v.confidence, 0.9);
        assert_eq!(v.raw_reasoning, text);
    }

    #[test]
    fn markdown_label() {
        let v = parse("**Verdict:** HOLD\n**Confidence:** 0.64.");
        assert_eq!(v.confidence, 0.64);
        assert_eq!(parse("Probability = [0.7]").confidence, 0.7);
    }

    #[test]
    fn labelled_integer_accepted() {
        assert_eq!(parse("VERDICT: BUY CONFIDENCE: 1").confidence, 1.0);
    }

    #[test]
    fn out_of_range_label_falls_through_to_decimal() {
        let v = parse("Confidence: 85% (roughly 0.85 on a unit scale)");
        assert_eq!(v.confidence, 0.85);
        assert_eq!(parse("confidence 7 out of 10").confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn label_wins_over_earlier_decimal() {
        let v = parse("Beta is 0.95 versus the index. Confidence: 0.6");
        assert_eq!(v.confidence, 0.6);
    }

    #[test]
    fn unlabelled_decimal_used() {
        assert_eq!(parse("SELL with conviction around 0.72").confidence, 0.72);
        assert_eq!(parse("I'd say 0.3.").confidence, 0.3);
    }

    #[test]
    fn dotted_runs_and_versions_ignored() {
        assert_eq!(parse("served from 10.0.0.1 by llama3.2").confidence, DEFAULT_CONFIDENCE);
        assert_eq!(parse("model v0.5 says HOLD").confidence, DEFAULT_CONFIDENCE);
        assert_eq!(parse("drawdown of -0.4 expected").confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn unlabelled_integers_ignored() {
        assert_eq!(parse("1 catalyst, 0 concerns").confidence, DEFAULT_CONFIDENCE);
        assert_eq!(parse("RSI near 1.5 sigma, later 0.4").confidence, 0.4);
    }

    #[test]
    fn diagnostic_text_parses_to_defaults() {
        let text = "AI Reasoning Unavailable. Error: transport error: connection refused. \
                    Please ensure the reasoning engine is running with llama3.2:3b.";
        let v = parse(text);
        assert_eq!(v.action, Action::Hold);
        assert_eq!(v.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn action_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Action::Sell).unwrap(), "\"SELL\"");
        assert_eq!(Action::Buy.to_string(), "BUY");
    }

    proptest! {
        #[test]
        fn parse_is_total_and_bounded(text in ".{0,200}") {
            let v = parse(&text);
            prop_assert!((0.0..=1.0).contains(&v.confidence));
            prop_assert_eq!(v.raw_reasoning, text.trim().to_string());
        }
    }
}
