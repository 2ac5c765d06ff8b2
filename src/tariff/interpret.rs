//! Token interpretation: rebuild tariff rows from the token stream.
//!
//! One forward pass. The only state is the current heading code, carried in
//! [`ScanState`] through a fold, so every call starts from scratch.
//!
//! - A **code** token becomes the current heading unless it is shorter than
//!   the heading already in force. Tariff schedules list codes from general
//!   to specific, so a shorter code after a longer one is a cross-reference
//!   quoted in a description. A heading whose next non-blank token is a
//!   statistical code gets no row of its own; otherwise the next token is
//!   its description.
//! - A **stat** token (`006/KGM`) becomes a row under the current heading,
//!   described by the token right after it.
//! - **Text** tokens are consumed by the branches above or dropped.

use crate::output::{TariffEntry, UNKNOWN_BASE};
use crate::tariff::describe::normalize_description;
use crate::tariff::tokenize::Token;
use tracing::{debug, warn};

/// Statistical suffix meaning "no further breakdown".
const NO_BREAKDOWN_SUFFIX: &str = "000";

/// Heading shape (`NN.NN`) whose dot is dropped in the output code.
const SHORT_HEADING_LEN: usize = 5;

/// Scan state threaded through [`interpret`].
#[derive(Debug, Default)]
struct ScanState<'a> {
    current_code: Option<&'a str>,
    entries: Vec<TariffEntry>,
}

/// What follows a heading code.
enum Lookahead<'a> {
    /// The heading is immediately refined by a statistical code.
    StatChild,
    /// The heading's own description (empty at end of input).
    Description(&'a str),
}

/// Interpret tokens into rows in document order.
pub fn interpret(tokens: &[Token<'_>]) -> Vec<TariffEntry> {
    tokens
        .iter()
        .enumerate()
        .fold(ScanState::default(), |state, (idx, token)| {
            state.step(tokens, idx, *token)
        })
        .entries
}

impl<'a> ScanState<'a> {
    fn step(mut self, tokens: &[Token<'a>], idx: usize, token: Token<'a>) -> Self {
        if token.is_blank() {
            return self;
        }
        match token {
            Token::Code(raw) => self.on_code(tokens, idx, raw.trim()),
            Token::Stat(raw) => self.on_stat(tokens, idx, raw.trim()),
            Token::Text(_) => {}
        }
        self
    }

    fn on_code(&mut self, tokens: &[Token<'a>], idx: usize, code: &'a str) {
        if let Some(current) = self.current_code {
            if code.chars().count() < current.chars().count() {
                debug!(code, current, "ignoring back-reference to shallower code");
                return;
            }
        }
        self.current_code = Some(code);

        match lookahead(&tokens[idx + 1..]) {
            Lookahead::StatChild => {}
            Lookahead::Description(raw) => {
                let desc = normalize_description(raw);
                self.entries.push(TariffEntry {
                    hscode: heading_code(code),
                    uncode: None,
                    thdescription: desc.thai,
                    endescription: desc.english,
                });
            }
        }
    }

    fn on_stat(&mut self, tokens: &[Token<'a>], idx: usize, stat: &str) {
        let (suffix, unit) = match stat.split_once('/') {
            Some((suffix, unit)) => (suffix.trim(), Some(unit.trim())),
            None => (stat, None),
        };

        let base = match self.current_code {
            Some(code) => code,
            None => {
                warn!(stat, "statistical code before any heading; using {UNKNOWN_BASE} base");
                UNKNOWN_BASE
            }
        };
        let hscode = if suffix.is_empty() || suffix == NO_BREAKDOWN_SUFFIX {
            base.to_string()
        } else {
            format!("{base}.{suffix}")
        };

        let raw = tokens.get(idx + 1).map_or("", Token::as_str);
        let desc = normalize_description(raw);
        self.entries.push(TariffEntry {
            hscode,
            uncode: unit.filter(|u| !u.is_empty()).map(str::to_string),
            thdescription: desc.thai,
            endescription: desc.english,
        });
    }
}

fn lookahead<'a>(rest: &[Token<'a>]) -> Lookahead<'a> {
    match rest.iter().find(|t| !t.is_blank()) {
        Some(Token::Stat(_)) => Lookahead::StatChild,
        Some(other) => Lookahead::Description(other.as_str().trim()),
        None => Lookahead::Description(""),
    }
}

/// `10.06` becomes `1006`; every other shape keeps its dots.
fn heading_code(code: &str) -> String {
    if code.chars().count() == SHORT_HEADING_LEN {
        code.replace('.', "")
    } else {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::tokenize::tokenize;

    fn codes(entries: &[TariffEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.hscode.as_str()).collect()
    }

    #[test]
    fn shorter_code_does_not_replace_current_heading() {
        let tokens = [
            Token::Code("1006.20.10"),
            Token::Text("desc"),
            Token::Code("07.13"),
            Token::Text("description mentioning 07.13"),
            Token::Stat("011/KGM"),
            Token::Text("ข้าว Rice"),
        ];
        let entries = interpret(&tokens);
        assert_eq!(codes(&entries), vec!["1006.20.10", "1006.20.10.011"]);
    }

    #[test]
    fn zero_suffix_is_not_appended() {
        let entries = interpret(&tokenize("1006.20.10 000/KGM ข้าวกล้อง Husked"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hscode, "1006.20.10");
        assert_eq!(entries[0].uncode.as_deref(), Some("KGM"));
        assert_eq!(entries[0].thdescription, "ข้าวกล้อง");
        assert_eq!(entries[0].endescription, "Husked");
    }

    #[test]
    fn suffix_is_appended() {
        let entries = interpret(&tokenize("1006.20.10 011/KGM Hom Mali"));
        assert_eq!(codes(&entries), vec!["1006.20.10.011"]);
        assert_eq!(entries[0].uncode.as_deref(), Some("KGM"));
    }

    #[test]
    fn five_character_heading_loses_its_dot() {
        let entries = interpret(&tokenize("10.06 ข้าว Rice"));
        assert_eq!(codes(&entries), vec!["1006"]);
        assert_eq!(entries[0].uncode, None);
    }

    #[test]
    fn longer_heading_keeps_its_dot() {
        let entries = interpret(&tokenize("1006.20 ข้าวกล้อง Husked rice"));
        assert_eq!(codes(&entries), vec!["1006.20"]);
    }

    #[test]
    fn heading_with_stat_child_emits_no_row_of_its_own() {
        let entries = interpret(&tokenize("0101.21 \n\n 010/NMB พันธุ์แท้ Pure-bred"));
        assert_eq!(codes(&entries), vec!["0101.21.010"]);
    }

    #[test]
    fn stat_before_any_heading_uses_unknown_base() {
        let entries = interpret(&tokenize("006/KGM ข้าว Rice 000/TNE Other"));
        assert_eq!(codes(&entries), vec!["UNKNOWN.006", "UNKNOWN"]);
        assert_eq!(entries[1].uncode.as_deref(), Some("TNE"));
    }

    #[test]
    fn heading_at_end_of_document_has_empty_description() {
        let entries = interpret(&tokenize("ข้าว Rice 1006.30   \n"));
        assert_eq!(codes(&entries), vec!["1006.30"]);
        assert_eq!(entries[0].thdescription, "");
        assert_eq!(entries[0].endescription, "");
    }

    #[test]
    fn stat_at_end_of_tokens_has_empty_description() {
        let entries = interpret(&[Token::Code("1006.20.10"), Token::Stat("006/KGM")]);
        assert_eq!(codes(&entries), vec!["1006.20.10.006"]);
        assert_eq!(entries[0].endescription, "");
    }

    #[test]
    fn stat_description_is_the_single_next_token() {
        // The blank token after the stat code is its description; the
        // following text is stray and dropped.
        let tokens = [
            Token::Code("1006.20.10"),
            Token::Stat("006/KGM"),
            Token::Text("  "),
            Token::Text("ข้าว Rice"),
        ];
        let entries = interpret(&tokens);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].thdescription, "");
        assert_eq!(entries[0].endescription, "");
    }

    #[test]
    fn heading_followed_by_heading_takes_it_as_description() {
        let entries = interpret(&[Token::Code("10.06"), Token::Code("1006.10")]);
        assert_eq!(codes(&entries), vec!["1006", "1006.10"]);
        assert_eq!(entries[0].thdescription, "1006.10");
    }

    #[test]
    fn equal_length_code_replaces_heading() {
        let entries = interpret(&tokenize("1006.10 011/KGM a 1006.20 011/KGM b"));
        assert_eq!(codes(&entries), vec!["1006.10.011", "1006.20.011"]);
    }

    #[test]
    fn stat_rows_start_with_active_heading() {
        let md = "01.01 ม้า Horses 0101.21 010/NMB a 090/NMB b 0101.29 010/NMB c 01.02 x 020/KGM d";
        for e in interpret(&tokenize(md)) {
            if e.uncode.is_some() {
                assert!(e.hscode.starts_with("0101.2"), "{}", e.hscode);
            }
        }
    }
}
