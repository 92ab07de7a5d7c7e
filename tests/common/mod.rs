//! Shared helpers for the integration suites.
#![allow(dead_code)]

use ramo::{
    FeatureConfig, GenericLanguage, GlobalInfo, Sentence, State, Token, TrainState,
};
use std::sync::Arc;

/// English-style language handle.
pub fn language() -> Arc<GenericLanguage> {
    Arc::new(GenericLanguage::english())
}

/// Builds a sentence from `(form, pos)` pairs and gold `(id, head, label)`
/// arcs.
pub fn sentence(tokens: &[(&str, &str)], arcs: &[(usize, usize, &str)]) -> Sentence {
    let tokens = tokens
        .iter()
        .map(|(form, pos)| {
            Token::new(*form)
                .with_pos(*pos)
                .with_lemma(form.to_lowercase())
        })
        .collect();
    let mut sentence = Sentence::from_tokens(tokens, language());
    for &(id, head, label) in arcs {
        sentence.set_arc(id, head, label);
    }
    sentence
}

/// Wraps a configuration in shared global state.
pub fn global(config: FeatureConfig) -> Arc<GlobalInfo> {
    Arc::new(GlobalInfo::new(Arc::new(config)))
}

/// Drives the oracle to exhaustion, returning the emitted action names.
pub fn run_oracle(train: &mut TrainState) -> Vec<String> {
    let mut stream = Vec::new();
    while train.has_next() {
        let Some(event) = train.next() else {
            break;
        };
        let name = train
            .state()
            .global()
            .actions
            .name(event.action)
            .to_string();
        assert!(train.transition(event.action), "oracle action {name} must apply");
        stream.push(name);
    }
    stream
}

/// Final heads of the working sentence, by token id.
pub fn heads(state: &State) -> Vec<usize> {
    (1..=state.sentence().len())
        .map(|id| state.node(id).head)
        .collect()
}

/// Final labels of the working sentence, by token id.
pub fn labels(state: &State) -> Vec<String> {
    (1..=state.sentence().len())
        .map(|id| state.node(id).label.clone())
        .collect()
}
