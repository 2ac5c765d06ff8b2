//! Tokenizer: split tariff Markdown on code boundaries.
//!
//! Two structural patterns carry all the hierarchy in a converted tariff:
//!
//! - **tariff codes** — `10.06`, `1006.20`, `1006.20.10`
//! - **statistical codes** — `006/KGM` (three-digit suffix + unit)
//!
//! Everything between two matches is description text. The text segments are
//! always emitted, even when empty, so a statistical code is always followed
//! by exactly the text that belongs to it.
//!
//! A tariff-shaped number right after the word `heading` (or `ประเภท`) is a
//! cross-reference in running text, not a boundary. The `regex` crate has no
//! lookbehind, so matches are filtered after the fact and the scan resumes
//! one character later, which is what a lookbehind-capable engine would do.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<code>\d{2,4}\.\d{2}(?:\.\d{2})?)|(?P<stat>\d{3}/[A-Za-z]+)").unwrap()
});

/// Words that mark the following number as a reference.
const REFERENCE_WORDS: [&str; 2] = ["heading", "ประเภท"];

/// How many whitespace characters may separate a reference word from its number.
const MAX_REFERENCE_GAP: usize = 2;

/// One lexical unit of tariff Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A tariff code such as `1006.20.10`.
    Code(&'a str),
    /// A statistical code with unit such as `006/KGM`.
    Stat(&'a str),
    /// Free text between codes (possibly empty).
    Text(&'a str),
}

impl<'a> Token<'a> {
    /// The raw text of the token.
    pub fn as_str(&self) -> &'a str {
        match *self {
            Token::Code(s) | Token::Stat(s) | Token::Text(s) => s,
        }
    }

    /// Blank tokens keep their position but carry no information.
    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

/// Split `text` into interleaved text and code tokens.
///
/// The result always starts and ends with a [`Token::Text`], and every code
/// token is followed by a text token.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut segment_start = 0;
    let mut search_from = 0;

    while let Some(caps) = RE_TOKEN.captures_at(text, search_from) {
        let Some(whole) = caps.get(0) else { break };

        if caps.name("code").is_some() && follows_reference_word(&text[..whole.start()]) {
            debug!(code = whole.as_str(), "skipping referenced tariff code");
            search_from = next_char_boundary(text, whole.start());
            continue;
        }

        tokens.push(Token::Text(&text[segment_start..whole.start()]));
        tokens.push(if caps.name("code").is_some() {
            Token::Code(whole.as_str())
        } else {
            Token::Stat(whole.as_str())
        });
        segment_start = whole.end();
        search_from = whole.end();
    }

    tokens.push(Token::Text(&text[segment_start..]));
    tokens
}

/// Whether `before` ends with a reference word plus one or two whitespace characters.
fn follows_reference_word(before: &str) -> bool {
    let mut rest = before;
    for _ in 0..MAX_REFERENCE_GAP {
        let Some(c) = rest.chars().next_back() else {
            return false;
        };
        if !c.is_whitespace() {
            return false;
        }
        rest = &rest[..rest.len() - c.len_utf8()];
        if REFERENCE_WORDS.iter().any(|w| rest.ends_with(w)) {
            return true;
        }
    }
    false
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map_or(text.len(), |c| from + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Code(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn interleaves_text_and_delimiters() {
        let tokens = tokenize("10.06 Rice 1006.20.10 Husked 006/KGM Hom Mali");
        assert_eq!(
            tokens,
            vec![
                Token::Text(""),
                Token::Code("10.06"),
                Token::Text(" Rice "),
                Token::Code("1006.20.10"),
                Token::Text(" Husked "),
                Token::Stat("006/KGM"),
                Token::Text(" Hom Mali"),
            ]
        );
    }

    #[test]
    fn adjacent_matches_get_empty_text_between() {
        let tokens = tokenize("1006.20.10 006/KGM");
        assert_eq!(
            tokens,
            vec![
                Token::Text(""),
                Token::Code("1006.20.10"),
                Token::Text(" "),
                Token::Stat("006/KGM"),
                Token::Text(""),
            ]
        );
    }

    #[test]
    fn text_only_input_is_one_token() {
        assert_eq!(tokenize("ข้าว Rice"), vec![Token::Text("ข้าว Rice")]);
        assert_eq!(tokenize(""), vec![Token::Text("")]);
    }

    #[test]
    fn code_shapes() {
        let tokens = tokenize("10.06 1006.20 1006.20.10 1.06 12345.67");
        // "1.06" has a single leading digit; "12345.67" matches from its second digit
        assert_eq!(codes(&tokens), vec!["10.06", "1006.20", "1006.20.10", "2345.67"]);
    }

    #[test]
    fn english_reference_word_blocks_two_digit_heading() {
        let tokens = tokenize("see heading 07.13 for pulses");
        assert!(codes(&tokens).is_empty());
    }

    #[test]
    fn thai_reference_word_with_double_space() {
        let tokens = tokenize("ตามประเภท  07.13 ถั่ว");
        assert!(codes(&tokens).is_empty());
    }

    #[test]
    fn reference_word_is_case_sensitive() {
        let tokens = tokenize("Heading 07.13");
        assert_eq!(codes(&tokens), vec!["07.13"]);
    }

    #[test]
    fn three_spaces_are_not_a_reference() {
        let tokens = tokenize("heading   07.13");
        assert_eq!(codes(&tokens), vec!["07.13"]);
    }

    #[test]
    fn rejected_reference_resumes_one_character_later() {
        // The scan restarts inside the rejected number, so a four-digit
        // reference still yields its trailing three-digit code.
        let tokens = tokenize("heading 1006.20");
        assert_eq!(codes(&tokens), vec!["006.20"]);
    }

    #[test]
    fn stat_pattern_requires_three_digits_and_letters() {
        let tokens = tokenize("06/KGM 006/ 006/KGM 006/kgm");
        let stats: Vec<&str> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Stat(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(stats, vec!["006/KGM", "006/kgm"]);
    }

    #[test]
    fn blank_detection() {
        assert!(Token::Text(" \n ").is_blank());
        assert!(!Token::Text(" x ").is_blank());
    }
}
