//! Sentences and per-sentence precomputed context
//!
//! A [`Sentence`] is an ordered sequence of reference-counted tree nodes
//! plus a language handle. Cloning a sentence is shallow: the nodes are
//! shared until a state mutates one of them, which is the substrate of the
//! copy-on-write scheme used by beam search.

use crate::language::Language;
use crate::patterns;
use crate::token::{Token, TokenGraph};
use crate::types::TokenId;
use std::rc::Rc;
use std::sync::Arc;

/// Ordered sequence of dependency tree nodes with a language handle.
#[derive(Clone)]
pub struct Sentence {
    /// Nodes at index `id - 1`.
    pub nodes: Vec<Rc<TokenGraph>>,
    /// Language predicates for this sentence.
    pub language: Arc<dyn Language>,
}

impl Sentence {
    /// Builds a sentence from surface tokens, assigning ids 1..=n.
    pub fn from_tokens(tokens: Vec<Token>, language: Arc<dyn Language>) -> Self {
        let nodes = tokens
            .into_iter()
            .enumerate()
            .map(|(i, tok)| Rc::new(TokenGraph::new(i + 1, tok)))
            .collect();
        Self { nodes, language }
    }

    /// Number of tokens (the synthetic root is not counted).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the sentence has no tokens.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node with the given id (1-based).
    pub fn get(&self, id: TokenId) -> Option<&Rc<TokenGraph>> {
        id.checked_sub(1).and_then(|i| self.nodes.get(i))
    }

    /// Records a dependency arc `id -> head` with `label`. Used by corpus
    /// loaders to install gold annotation and by tests.
    pub fn set_arc(&mut self, id: TokenId, head: TokenId, label: &str) {
        if let Some(node) = id.checked_sub(1).and_then(|i| self.nodes.get_mut(i)) {
            let node = Rc::make_mut(node);
            node.link_head(head);
            node.link_label(label);
        }
    }

    /// Reverses the sentence in place, renumbering ids and remapping
    /// non-zero head ids so the annotation keeps pointing at the same
    /// surface tokens.
    pub fn reverse(&mut self) {
        let len = self.nodes.len();
        self.nodes.reverse();
        for (i, slot) in self.nodes.iter_mut().enumerate() {
            let node = Rc::make_mut(slot);
            node.id = i + 1;
            if node.head != 0 {
                node.head = len + 1 - node.head;
            }
        }
    }
}

impl std::fmt::Debug for Sentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sentence").field("nodes", &self.nodes).finish()
    }
}

/// Per-sentence precomputed punctuation and quotation context.
#[derive(Debug, Clone, Default)]
pub struct SentenceInfo {
    /// Cumulative punctuation-token count up to and including each index.
    pub punct_count: Vec<u32>,
    /// Whether each token index sits inside a quotation.
    pub in_quotes: Vec<bool>,
}

impl SentenceInfo {
    /// Scans the sentence once, accumulating punctuation counts and
    /// quotation state.
    pub fn new(sentence: &Sentence) -> Self {
        let mut info = Self::default();
        let mut inquote = false;
        for (i, node) in sentence.nodes.iter().enumerate() {
            let form = node.token.form.as_str();
            let punct = u32::from(patterns::ispunct().is_match(form));
            if i == 0 {
                info.punct_count.push(punct);
            } else {
                info.punct_count.push(info.punct_count[i - 1] + punct);
            }
            if patterns::is_open_quote().is_match(form) || (!inquote && form == "\"") {
                info.in_quotes.push(inquote);
                inquote = true;
            } else if patterns::is_close_quote().is_match(form) || (inquote && form == "\"") {
                inquote = false;
                info.in_quotes.push(inquote);
            } else {
                info.in_quotes.push(inquote);
            }
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::GenericLanguage;

    fn sentence(forms: &[&str]) -> Sentence {
        Sentence::from_tokens(
            forms.iter().map(|f| Token::new(*f)).collect(),
            Arc::new(GenericLanguage::english()),
        )
    }

    #[test]
    fn punct_counts_accumulate() {
        let info = SentenceInfo::new(&sentence(&["a", ",", "b", ",", "."]));
        assert_eq!(info.punct_count, vec![0, 1, 1, 2, 3]);
    }

    #[test]
    fn straight_quotes_toggle() {
        let info = SentenceInfo::new(&sentence(&["\"", "x", "\"", "y"]));
        // The opening mark itself is outside, the closing mark inside.
        assert_eq!(info.in_quotes, vec![false, true, false, false]);
    }

    #[test]
    fn directional_quotes_use_unicode_classes() {
        let info = SentenceInfo::new(&sentence(&["«", "x", "»"]));
        assert_eq!(info.in_quotes, vec![false, true, false]);
    }

    #[test]
    fn reverse_renumbers_ids_and_heads() {
        let mut s = sentence(&["a", "b", "c"]);
        s.set_arc(1, 2, "det");
        s.set_arc(2, 3, "subj");
        s.set_arc(3, 0, "root");
        s.reverse();
        let heads: Vec<_> = s.nodes.iter().map(|n| n.head).collect();
        let forms: Vec<_> = s.nodes.iter().map(|n| n.token.form.clone()).collect();
        assert_eq!(forms, vec!["c", "b", "a"]);
        // c (now id 1) is still the root; b still heads a.
        assert_eq!(heads, vec![0, 1, 2]);
        assert_eq!(s.nodes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
