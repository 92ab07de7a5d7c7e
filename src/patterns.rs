//! Character-class patterns shared by the transition engine and the
//! feature extractor

use regex::Regex;
use std::sync::OnceLock;

/// One or more Unicode punctuation characters.
pub fn ispunct() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\p{P}+$").expect("invalid punctuation pattern"))
}

/// A single opening quotation mark.
pub fn is_open_quote() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\p{Pi}$").expect("invalid open-quote pattern"))
}

/// A single closing quotation mark.
pub fn is_close_quote() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\p{Pf}$").expect("invalid close-quote pattern"))
}

/// Non-word characters in the ASCII sense.
///
/// The class contains an `_-z` range rather than a literal underscore and
/// hyphen. Existing models were trained with this class, so it is kept
/// as is.
pub fn non_word_ascii() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^$0-9_-zA-Z]+$").expect("invalid non-word pattern"))
}
