//! Corpus-wide shared state
//!
//! [`GlobalInfo`] bundles the active configuration, the action interner
//! and the corpus statistics used by the entity-type features. Counters
//! are written while scanning training sentences and read-only afterwards.

use crate::action::ActionTable;
use crate::config::FeatureConfig;
use crate::sentence::Sentence;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Ratio by which one entity category must dominate the other before a
/// lemma is considered time- or location-denoting.
pub const FREQ_RATIO: f64 = 1.5;

#[derive(Debug, Default)]
struct LemmaCounts {
    time: HashMap<String, usize>,
    loc: HashMap<String, usize>,
}

/// Configuration handle, action interner and corpus statistics shared by
/// every state of a training or parsing run.
#[derive(Debug)]
pub struct GlobalInfo {
    /// Active configuration.
    pub config: Arc<FeatureConfig>,
    /// Process-wide action interner.
    pub actions: ActionTable,
    counts: RwLock<LemmaCounts>,
}

impl GlobalInfo {
    /// Creates shared state around a configuration.
    pub fn new(config: Arc<FeatureConfig>) -> Self {
        Self {
            config,
            actions: ActionTable::new(),
            counts: RwLock::new(LemmaCounts::default()),
        }
    }

    /// Accumulates time/location lemma counts from a training sentence.
    ///
    /// Nouns whose `ENTITY` attribute starts with `TIM` or `LOC`
    /// contribute their lemma to the respective counter.
    pub fn extract(&self, sentence: &Sentence) {
        let mut counts = self.counts.write().expect("lemma counters poisoned");
        for node in &sentence.nodes {
            if !node.token.is_noun(&*sentence.language) {
                continue;
            }
            let Some(lemma) = node.token.lemma.as_deref().filter(|l| !l.is_empty()) else {
                continue;
            };
            match node.token.attribute("ENTITY") {
                Some(e) if e.starts_with("TIM") => {
                    *counts.time.entry(lemma.to_string()).or_insert(0) += 1;
                }
                Some(e) if e.starts_with("LOC") => {
                    *counts.loc.entry(lemma.to_string()).or_insert(0) += 1;
                }
                _ => {}
            }
        }
    }

    /// How often `lemma` was seen with a time entity.
    pub fn time_count(&self, lemma: &str) -> usize {
        self.counts
            .read()
            .expect("lemma counters poisoned")
            .time
            .get(lemma)
            .copied()
            .unwrap_or(0)
    }

    /// How often `lemma` was seen with a location entity.
    pub fn loc_count(&self, lemma: &str) -> usize {
        self.counts
            .read()
            .expect("lemma counters poisoned")
            .loc
            .get(lemma)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::GenericLanguage;
    use crate::token::Token;

    #[test]
    fn extract_counts_entity_lemmas() {
        let info = GlobalInfo::new(Arc::new(FeatureConfig::default()));
        let sentence = Sentence::from_tokens(
            vec![
                Token::new("mattina")
                    .with_pos("NN")
                    .with_lemma("mattina")
                    .with_attribute("ENTITY", "TIM"),
                Token::new("Pisa")
                    .with_pos("NNP")
                    .with_lemma("Pisa")
                    .with_attribute("ENTITY", "LOC"),
                Token::new("corre").with_pos("VBZ").with_lemma("correre"),
            ],
            Arc::new(GenericLanguage::english()),
        );
        info.extract(&sentence);
        info.extract(&sentence);
        assert_eq!(info.time_count("mattina"), 2);
        assert_eq!(info.loc_count("Pisa"), 2);
        assert_eq!(info.loc_count("mattina"), 0);
        assert_eq!(info.time_count("correre"), 0);
    }
}
