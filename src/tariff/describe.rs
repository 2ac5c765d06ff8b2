//! Description normalisation: split a raw description into Thai and English.
//!
//! Descriptions in a converted tariff come out as one run of mixed script
//! with table pipes, rule dashes and broken line wraps still in it:
//!
//! ```text
//!  | - - ข้าวหอมมะลิ Hom Mali
//!  rice | Description
//! ```
//!
//! The rules below turn that into `("ข้าวหอมมะลิ", "Hom Mali rice")`.
//!
//! ## Rule Order
//!
//! Whitespace is collapsed before the noise strip so `-{2,}` sees runs that
//! were split across lines; the script split runs on cleaned text so a pipe
//! cannot be mistaken for the start of either run; and the English cleanup
//! re-applies the noise strip because removing Thai characters can bring two
//! hyphen groups together.

use once_cell::sync::Lazy;
use regex::Regex;

/// A description split into its Thai and English runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Description {
    pub thai: String,
    pub english: String,
}

/// Normalise a raw description.
///
/// Deterministic and infallible. Applying it to the joined output of a
/// previous call returns the same pair.
///
/// Rules (applied in order):
/// 1. Collapse line breaks and whitespace runs into single spaces
/// 2. Strip Markdown table pipes and rule dashes
/// 3. Split at the first Latin letter into Thai and English candidates
/// 4. English: drop stray Thai runs, strip noise again, drop a trailing
///    `Description` header word
/// 5. Thai: rejoin `SARA AM` split by the converter (`ก า` → `กำ`)
pub fn normalize_description(raw: &str) -> Description {
    if raw.is_empty() {
        return Description::default();
    }

    let text = collapse_whitespace(raw);
    let text = strip_markdown_noise(&text);
    let (thai, english) = split_scripts(&text);

    let english = remove_thai_runs(english);
    let english = strip_markdown_noise(&english);
    let english = remove_description_suffix(&english);

    Description {
        thai: fix_sara_am(thai),
        english,
    }
}

/// Characters trimmed from either end of each script run.
const RUN_EDGE: [char; 3] = ['-', ' ', ':'];

fn trim_run(s: &str) -> &str {
    s.trim_matches(RUN_EDGE).trim()
}

// ── Rule 1: Collapse whitespace ──────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(input: &str) -> String {
    let joined = input.replace('\n', " ").replace('\r', "");
    RE_WHITESPACE.replace_all(&joined, " ").into_owned()
}

// ── Rule 2: Strip Markdown noise ─────────────────────────────────────────────

static RE_RULE_DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());

fn strip_markdown_noise(input: &str) -> String {
    let without_pipes = input.replace('|', "");
    let without_rules = RE_RULE_DASHES.replace_all(&without_pipes, "");
    // removed pipes and rules leave their surrounding spaces behind
    RE_WHITESPACE
        .replace_all(&without_rules, " ")
        .trim()
        .to_string()
}

// ── Rule 3: Split Thai / English ─────────────────────────────────────────────

fn split_scripts(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.find(|c: char| c.is_ascii_alphabetic()) {
        Some(idx) => (trim_run(&text[..idx]), trim_run(&text[idx..])),
        None => (text, ""),
    }
}

// ── Rule 4: English cleanup ──────────────────────────────────────────────────

static RE_THAI_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{0E01}-\u{0E59}]+").unwrap());

static RE_DESCRIPTION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:\s*Description)+\s*$").unwrap());

fn remove_thai_runs(input: &str) -> String {
    let without_thai = RE_THAI_RUN.replace_all(input, "");
    let collapsed = RE_WHITESPACE.replace_all(&without_thai, " ");
    trim_run(&collapsed).to_string()
}

/// `Description` is the English column header; on the first row of a page it
/// is glued onto the end of the row text, once per merged header cell.
fn remove_description_suffix(input: &str) -> String {
    RE_DESCRIPTION_SUFFIX
        .replace(input, "")
        .trim()
        .to_string()
}

// ── Rule 5: Thai SARA AM repair ──────────────────────────────────────────────

static RE_SPLIT_SARA_AM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\u{0E01}-\u{0E59}])\sา").unwrap());

fn fix_sara_am(input: &str) -> String {
    RE_SPLIT_SARA_AM.replace_all(input, "${1}ำ").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────
