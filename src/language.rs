//! Language-specific predicates consumed by the oracle and the feature
//! extractor
//!
//! The parser core is language-agnostic: everything it needs to know about
//! a language is behind the [`Language`] trait. [`GenericLanguage`] is a
//! configurable implementation suitable for tests and for corpora whose
//! tag set can be described by prefix lists.

use crate::token::Token;

/// Language-specific lookups.
///
/// Implementations must be thread-safe: a language handle is shared
/// read-only across every sentence of a corpus.
pub trait Language: Send + Sync {
    /// True when tokens with this part of speech carry their morphology on
    /// the left of the phrase (agreement with the following token is then
    /// not informative).
    fn morpho_left(&self, pos: &str) -> bool;

    /// True when tokens with this part of speech carry their morphology on
    /// the right of the phrase.
    fn morpho_right(&self, pos: &str) -> bool;

    /// Number agreement between two tokens. A missing value counts as
    /// compatible.
    fn numb_agree(&self, a: Option<char>, b: Option<char>) -> bool {
        match (a, b) {
            (Some(x), Some(y)) => x == y,
            _ => true,
        }
    }

    /// Gender agreement between two tokens. A missing value counts as
    /// compatible.
    fn gend_agree(&self, a: Option<char>, b: Option<char>) -> bool {
        match (a, b) {
            (Some(x), Some(y)) => x == y,
            _ => true,
        }
    }

    /// True when the token is a verb.
    fn is_verb(&self, token: &Token) -> bool;

    /// True when the token is a noun.
    fn is_noun(&self, token: &Token) -> bool;

    /// True when a token with this part of speech may head the sentence.
    fn root_pos(&self, pos: &str) -> bool;

    /// The dependency label used for attachment to the root.
    fn root_label(&self) -> &str;
}

/// Prefix-list based [`Language`] implementation.
#[derive(Debug, Clone)]
pub struct GenericLanguage {
    verb_prefixes: Vec<String>,
    noun_prefixes: Vec<String>,
    root_pos: Vec<String>,
    morpho_left: Vec<String>,
    morpho_right: Vec<String>,
    root_label: String,
}

impl GenericLanguage {
    /// Creates a language from part-of-speech prefix lists.
    pub fn new(
        verb_prefixes: Vec<String>,
        noun_prefixes: Vec<String>,
        root_pos: Vec<String>,
        root_label: impl Into<String>,
    ) -> Self {
        Self {
            verb_prefixes,
            noun_prefixes,
            root_pos,
            morpho_left: Vec::new(),
            morpho_right: Vec::new(),
            root_label: root_label.into(),
        }
    }

    /// English-style tag set (Penn-like verb/noun prefixes, verbal roots).
    pub fn english() -> Self {
        Self::new(
            vec!["V".into(), "MD".into()],
            vec!["N".into(), "PRP".into()],
            vec!["V".into(), "MD".into()],
            "ROOT",
        )
    }

    /// Sets the parts of speech whose morphology sits on the left.
    pub fn with_morpho_left(mut self, pos: Vec<String>) -> Self {
        self.morpho_left = pos;
        self
    }

    /// Sets the parts of speech whose morphology sits on the right.
    pub fn with_morpho_right(mut self, pos: Vec<String>) -> Self {
        self.morpho_right = pos;
        self
    }

    fn has_prefix(list: &[String], pos: &str) -> bool {
        !pos.is_empty() && list.iter().any(|p| pos.starts_with(p.as_str()))
    }
}

impl Language for GenericLanguage {
    fn morpho_left(&self, pos: &str) -> bool {
        Self::has_prefix(&self.morpho_left, pos)
    }

    fn morpho_right(&self, pos: &str) -> bool {
        Self::has_prefix(&self.morpho_right, pos)
    }

    fn is_verb(&self, token: &Token) -> bool {
        token
            .pos
            .as_deref()
            .is_some_and(|pos| Self::has_prefix(&self.verb_prefixes, pos))
    }

    fn is_noun(&self, token: &Token) -> bool {
        token
            .pos
            .as_deref()
            .is_some_and(|pos| Self::has_prefix(&self.noun_prefixes, pos))
    }

    fn root_pos(&self, pos: &str) -> bool {
        Self::has_prefix(&self.root_pos, pos)
    }

    fn root_label(&self) -> &str {
        &self.root_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_prefixes_classify_tokens() {
        let lang = GenericLanguage::english();
        assert!(lang.is_verb(&Token::new("barks").with_pos("VBZ")));
        assert!(lang.is_noun(&Token::new("dog").with_pos("NN")));
        assert!(!lang.is_verb(&Token::new("dog").with_pos("NN")));
        assert!(!lang.is_verb(&Token::new("dog")));
        assert!(lang.root_pos("VBD"));
        assert_eq!(lang.root_label(), "ROOT");
    }

    #[test]
    fn agreement_treats_missing_values_as_compatible() {
        let lang = GenericLanguage::english();
        assert!(lang.numb_agree(Some('s'), Some('s')));
        assert!(!lang.numb_agree(Some('s'), Some('p')));
        assert!(lang.numb_agree(Some('s'), None));
        assert!(lang.gend_agree(None, Some('f')));
    }
}
