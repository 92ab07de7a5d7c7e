//! Tokens and dependency tree nodes
//!
//! A [`Token`] is the immutable surface payload read from the corpus; a
//! [`TokenGraph`] is the mutable node the transition engine builds the
//! dependency tree on. Several states may share the same `TokenGraph`
//! through reference counting; mutation always goes through the owning
//! state, which unshares the node first.

use crate::language::Language;
use crate::types::{ChildVec, TokenId};
use std::sync::Arc;

/// Morphological features carried by a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Morpho {
    /// Grammatical gender code (e.g. `m`, `f`, `n`), if annotated.
    pub gender: Option<char>,
    /// Grammatical number code (e.g. `s`, `p`), if annotated.
    pub number: Option<char>,
}

/// Immutable surface token: form, predicted annotations, morphology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    /// Surface form.
    pub form: String,
    /// Lemma, if provided by the analyzer.
    pub lemma: Option<String>,
    /// Predicted fine-grained part of speech.
    pub pos: Option<String>,
    /// Predicted coarse part of speech.
    pub cpos: Option<String>,
    /// Gender/number morphology.
    pub morpho: Morpho,
    /// Further named attributes (entity type, morphological features, ...)
    /// in corpus column order.
    pub attributes: Vec<(String, String)>,
}

impl Token {
    /// Creates a token with only a surface form.
    pub fn new(form: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            ..Self::default()
        }
    }

    /// Sets the part of speech.
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    /// Sets the lemma.
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// Sets the coarse part of speech.
    pub fn with_cpos(mut self, cpos: impl Into<String>) -> Self {
        self.cpos = Some(cpos.into());
        self
    }

    /// Sets gender/number morphology.
    pub fn with_morpho(mut self, gender: Option<char>, number: Option<char>) -> Self {
        self.morpho = Morpho { gender, number };
        self
    }

    /// Appends a named attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Looks up a named attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Position of `name` in this token's attribute ordering, used by the
    /// legacy feature-type letters.
    pub fn attr_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|(n, _)| n == name)
    }

    /// True when the language classifies this token as a verb.
    pub fn is_verb(&self, language: &dyn Language) -> bool {
        language.is_verb(self)
    }

    /// True when the language classifies this token as a noun.
    pub fn is_noun(&self, language: &dyn Language) -> bool {
        language.is_noun(self)
    }
}

/// Mutable dependency tree node owned (possibly shared) by a parser state.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGraph {
    /// 1-based position in the sentence; 0 is the synthetic root.
    pub id: TokenId,
    /// Shared surface payload.
    pub token: Arc<Token>,
    /// Ids of left dependents, in attachment order.
    pub left: ChildVec,
    /// Ids of right dependents, in attachment order.
    pub right: ChildVec,
    /// Assigned head id; 0 while unassigned (or attached to the root).
    pub head: TokenId,
    /// Assigned dependency label; empty while unassigned.
    pub label: String,
}

impl TokenGraph {
    /// Creates an unattached node for `token` at position `id`.
    pub fn new(id: TokenId, token: Token) -> Self {
        Self {
            id,
            token: Arc::new(token),
            left: ChildVec::new(),
            right: ChildVec::new(),
            head: 0,
            label: String::new(),
        }
    }

    /// The synthetic root node (id 0, form `#NULL`).
    pub fn root() -> Self {
        Self::new(0, Token::new("#NULL"))
    }

    /// Resolves a predicted attribute by name.
    ///
    /// `FORM`, `LEMMA`, `CPOS` and `POS` come from the surface payload;
    /// `DEPREL` is the label assigned so far by the parser (empty while
    /// unassigned); anything else is looked up among the token's named
    /// attributes.
    pub fn predicted(&self, name: &str) -> Option<&str> {
        match name {
            "FORM" => Some(self.token.form.as_str()),
            "LEMMA" => self.token.lemma.as_deref(),
            "CPOS" => self.token.cpos.as_deref(),
            "POS" => self.token.pos.as_deref(),
            "DEPREL" => Some(self.label.as_str()),
            _ => self.token.attribute(name),
        }
    }

    /// Sets the head id.
    pub fn link_head(&mut self, head: TokenId) {
        self.head = head;
    }

    /// Sets the dependency label.
    pub fn link_label(&mut self, label: &str) {
        self.label.clear();
        self.label.push_str(label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicted_resolves_payload_and_label() {
        let mut node = TokenGraph::new(
            1,
            Token::new("cane")
                .with_pos("SS")
                .with_lemma("cane")
                .with_attribute("ENTITY", "LOC"),
        );
        assert_eq!(node.predicted("FORM"), Some("cane"));
        assert_eq!(node.predicted("POS"), Some("SS"));
        assert_eq!(node.predicted("ENTITY"), Some("LOC"));
        assert_eq!(node.predicted("CPOS"), None);
        // DEPREL reflects the parser-assigned label, not the corpus.
        assert_eq!(node.predicted("DEPREL"), Some(""));
        node.link_label("subj");
        assert_eq!(node.predicted("DEPREL"), Some("subj"));
    }

    #[test]
    fn attr_index_follows_column_order() {
        let token = Token::new("x")
            .with_attribute("FEATS", "num=s")
            .with_attribute("ENTITY", "TIM");
        assert_eq!(token.attr_index("FEATS"), Some(0));
        assert_eq!(token.attr_index("ENTITY"), Some(1));
        assert_eq!(token.attr_index("MISSING"), None);
    }
}
