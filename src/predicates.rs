//! Feature extraction
//!
//! Turns a parser configuration into an unordered bag of predicate
//! strings, family by family, each gated by its configuration flag. A
//! template chain that walks off the edge of the partial tree, or reaches
//! an empty attribute, aborts silently and contributes nothing.

use crate::global::FREQ_RATIO;
use crate::patterns;
use crate::state::State;
use crate::template::{feature_index, PathStep, TokenPath};
use crate::token::Token;
use crate::types::{Features, TokenId};
use std::collections::HashSet;
use std::sync::Arc;

/// Output of the feature extractor: the predicate bag plus the value of
/// the split feature, when one is configured and resolvable.
#[derive(Debug, Clone, Default)]
pub struct Predicates {
    /// Emitted predicate strings.
    pub features: Features,
    /// Value routing the configuration to one of several classifiers.
    pub split: Option<String>,
}

impl State {
    /// Extracts the predicate bag for the current configuration.
    pub fn predicates(&self) -> Predicates {
        let config = &self.global.config;
        let mut preds = Predicates::default();

        // Happens only transiently after a left action to the root; it
        // helps learning to do a shift here.
        if self.stack.is_empty() {
            preds.features.push("(".to_string());
            if config.composite_actions {
                return preds;
            }
        }
        if self.input.is_empty() {
            preds.features.push(")".to_string());
            return preds;
        }

        self.token_features(&mut preds);

        // Features from the extracted stack.
        if let Some(&extracted) = self.extracted.last() {
            let tok = &self.node(extracted).token;
            match tok.lemma.as_deref().filter(|l| !l.is_empty()) {
                Some(lemma) => preds.features.push(format!("EL{lemma}")),
                None => preds.features.push(format!("EW{}", tok.form)),
            }
            if let Some(pos) = tok.pos.as_deref().filter(|p| !p.is_empty()) {
                preds.features.push(format!("EP{pos}"));
            }
        }

        let next_id = *self.input.last().unwrap_or(&0);

        if config.morpho_agreement && self.stack.len() > 1 {
            self.morpho_agreement(next_id, &mut preds.features);
        }

        // Sentence context.
        if config.stack_size && self.stack.len() > 2 {
            preds.features.push("((".to_string());
        }
        if config.input_size && self.input.len() > 1 {
            preds.features.push("))".to_string());
        }
        if config.verb_count {
            let verbs = self
                .stack
                .iter()
                .skip(1) // skip the synthetic root
                .filter(|&&id| self.node(id).token.is_verb(&*self.sentence.language))
                .count();
            if verbs > 0 {
                preds.features.push(format!("VC{verbs}"));
            }
        }

        // Punctuation context before the next token.
        if next_id > 1 {
            let count = self.info.punct_count[next_id - 2];
            if config.in_punct && count % 2 == 1 {
                preds.features.push(".".to_string());
            }
            if config.punct_count && count > 0 {
                preds.features.push(format!(".{count}"));
            }
        }
        if config.in_quotes && next_id >= 1 && self.info.in_quotes[next_id - 1] {
            preds.features.push("0\"".to_string());
        }

        if config.use_child_punct {
            self.child_punct_context(next_id, &mut preds.features);
        }

        // History.
        let legacy = config.legacy_version();
        let chain = std::iter::once(self.action).chain(self.past.iter().copied().map(Some));
        for (i, slot) in chain.take(config.past_actions as usize).enumerate() {
            if let Some(past) = slot {
                let name = self.global.actions.name(past);
                if legacy {
                    preds.features.push(format!("A{i}{name}"));
                } else {
                    preds.features.push(format!("a{i}{name}"));
                }
            }
        }

        // Focus word distance.
        if config.word_distance {
            if let Some(&top) = self.stack.last() {
                let d = (next_id as i64 - top as i64).abs() - 1;
                preds.features.push(format!("{}", d.min(4)));
            }
        }

        if config.prep_child_entity_type {
            self.prep_child_entities(next_id, &mut preds.features);
        }

        if config.second_order {
            let count = preds.features.len();
            for i in 0..count {
                for j in i + 1..count {
                    let (a, b) = (&preds.features[i], &preds.features[j]);
                    let combo = if a < b {
                        format!("{a}#{b}")
                    } else {
                        format!("{b}#{a}")
                    };
                    preds.features.push(combo);
                }
            }
        }

        // Context for predicting the label of the arc just created.
        if !config.composite_actions {
            if let Some(action) = self.action {
                let name = self.global.actions.name(action);
                let next = self.node(next_id);
                match name.as_bytes()[0] {
                    b'R' | b'r' => {
                        if let (Some(npos), Some(&child)) =
                            (next.token.pos.as_deref(), next.left.last())
                        {
                            if let Some(cpos) = self.node(child).token.pos.as_deref() {
                                preds.features.push(format!("d{cpos}{npos}"));
                            }
                        }
                    }
                    b'L' | b'l' => {
                        if let (Some(npos), Some(&child)) =
                            (next.token.pos.as_deref(), next.right.last())
                        {
                            if let Some(cpos) = self.node(child).token.pos.as_deref() {
                                preds.features.push(format!("D{cpos}{npos}"));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        preds
    }

    /// Templated token features, the child-punctuation annotation for
    /// bare anchors, and the split feature.
    fn token_features(&self, preds: &mut Predicates) {
        let config = &self.global.config;
        let legacy = config.legacy_version();
        let next_token = self
            .input
            .last()
            .map(|&id| self.node(id).token.clone());
        let mut annotated: HashSet<TokenId> = HashSet::new();

        for chain in &config.templates {
            let mut compound = String::new();
            let mut broken = false;
            for spec in chain {
                let attr_index = if legacy {
                    next_token
                        .as_ref()
                        .and_then(|t| t.attr_index(&spec.attribute))
                        .or_else(|| feature_index(&spec.attribute))
                        .unwrap_or(0)
                } else {
                    feature_index(&spec.attribute).unwrap_or(0)
                };
                let type_letter = (b'A' + attr_index as u8) as char;
                let Some(target) = self
                    .anchor(spec.path.root)
                    .and_then(|a| self.follow(a, &spec.path))
                else {
                    broken = true;
                    break;
                };
                let Some(value) = self
                    .node(target)
                    .predicted(&spec.attribute)
                    .filter(|v| !v.is_empty())
                else {
                    // Skip chains with empty attributes.
                    broken = true;
                    break;
                };
                let code = spec.path.code();
                let root = spec.path.root;
                if config.unambiguous {
                    // The path goes in front so the id prefix is parseable.
                    if root < 0 {
                        compound.push_str(&format!("{code}{}{type_letter}{value}", -root));
                    } else {
                        compound.push_str(&format!("{code}{type_letter}{root}{value}"));
                    }
                } else if root < 0 {
                    compound.push_str(&format!("{}{type_letter}{code}{value}", -root));
                } else {
                    compound.push_str(&format!("{type_letter}{root}{code}{value}"));
                }
            }
            if !broken {
                if let Some(first) = chain.first() {
                    preds.features.push(compound);
                    if chain.len() == 1 && first.path.is_empty() && config.lex_child_non_word {
                        if let Some(target) = self.anchor(first.path.root) {
                            self.child_punct_annotation(
                                target,
                                first.path.root,
                                &mut annotated,
                                config.unambiguous,
                                &mut preds.features,
                            );
                        }
                    }
                }
            }
        }

        // The split feature routes the configuration among classifiers.
        if let Some(split) = &config.split_feature {
            if let Some(value) = self
                .anchor(split.path.root)
                .and_then(|a| self.follow(a, &split.path))
                .and_then(|t| self.node(t).predicted(&split.attribute))
            {
                preds.split = Some(value.to_string());
            }
        }
    }

    /// Resolves a template anchor: negative offsets index the stack from
    /// the top (the synthetic root is not addressable), non-negative
    /// offsets index the input from the next token.
    pub(crate) fn anchor(&self, root: i32) -> Option<TokenId> {
        if root < 0 {
            let depth = (-root) as usize;
            if depth > self.stack.len().saturating_sub(1) {
                return None;
            }
            Some(self.stack[self.stack.len() - depth])
        } else {
            let depth = root as usize;
            if depth >= self.input.len() {
                return None;
            }
            Some(self.input[self.input.len() - 1 - depth])
        }
    }

    /// Walks a path over the partial tree; `None` when any step falls off
    /// the edge.
    pub(crate) fn follow(&self, start: TokenId, path: &TokenPath) -> Option<TokenId> {
        let closest = self.global.config.closest_children;
        let mut id = start;
        for step in &path.steps {
            id = match step {
                PathStep::Head => {
                    let head = self.node(id).head;
                    if head == 0 {
                        return None;
                    }
                    head
                }
                PathStep::LeftChild => {
                    let node = self.node(id);
                    *(if closest { node.left.last() } else { node.left.first() })?
                }
                PathStep::RightChild => {
                    let node = self.node(id);
                    *(if closest { node.right.first() } else { node.right.last() })?
                }
                PathStep::Prev => {
                    if id <= 1 {
                        return None;
                    }
                    id - 1
                }
                PathStep::Next => {
                    if id == 0 || id >= self.sentence.len() {
                        return None;
                    }
                    id + 1
                }
            };
        }
        Some(id)
    }

    /// Notes non-word children of a bare-anchor token, once per token.
    fn child_punct_annotation(
        &self,
        token: TokenId,
        root: i32,
        annotated: &mut HashSet<TokenId>,
        unambiguous: bool,
        features: &mut Features,
    ) {
        if !annotated.insert(token) {
            return;
        }
        let node = self.node(token);
        for &child in &node.left {
            if patterns::non_word_ascii().is_match(&self.node(child).token.form) {
                features.push(if unambiguous {
                    format!("/.{root}")
                } else {
                    format!(".{root}/")
                });
                break;
            }
        }
        for &child in node.right.iter().rev() {
            if patterns::non_word_ascii().is_match(&self.node(child).token.form) {
                features.push(if unambiguous {
                    format!("\\.{root}")
                } else {
                    format!(".{root}\\")
                });
                break;
            }
        }
    }

    /// Number/gender (dis)agreement between the focus pair, with a look
    /// ahead of up to two tokens when the pair itself agrees.
    fn morpho_agreement(&self, next_id: TokenId, features: &mut Features) {
        let lang = &*self.sentence.language;
        let Some(&top_id) = self.stack.last() else {
            return;
        };
        let top = &self.node(top_id).token;
        let next = &self.node(next_id).token;
        if lang.morpho_left(top.pos.as_deref().unwrap_or(""))
            || lang.morpho_right(next.pos.as_deref().unwrap_or(""))
        {
            return;
        }
        if top.morpho.number.is_some() && !lang.numb_agree(top.morpho.number, next.morpho.number) {
            features.push("!=N".to_string());
        }
        if top.morpho.gender.is_some() && !lang.gend_agree(top.morpho.gender, next.morpho.gender) {
            features.push("!=G".to_string());
        }
        // Known gap: agreement further ahead may pick the wrong attachment
        // for postposed modifiers.
        if next.morpho.number.is_some()
            && next.morpho.gender.is_some()
            && lang.numb_agree(top.morpho.number, next.morpho.number)
            && lang.gend_agree(top.morpho.gender, next.morpho.gender)
        {
            for (look, pred) in [(2usize, "=NG!1"), (3usize, "=NG!2")] {
                if self.input.len() < look {
                    break;
                }
                let ahead = &self.node(self.input[self.input.len() - look]).token;
                if ahead.morpho.number.is_some()
                    && ahead.morpho.gender.is_some()
                    && !lang.morpho_right(ahead.pos.as_deref().unwrap_or(""))
                    && (!lang.numb_agree(next.morpho.number, ahead.morpho.number)
                        || !lang.gend_agree(next.morpho.gender, ahead.morpho.gender))
                {
                    features.push(pred.to_string());
                }
            }
        }
    }

    /// Punctuation among the children of the focus pair, useful for
    /// phrases like `fabricante de " software "`.
    fn child_punct_context(&self, next_id: TokenId, features: &mut Features) {
        if self.stack.len() > 1 {
            if let Some(&top_id) = self.stack.last() {
                let top = self.node(top_id);
                for &child in &top.left {
                    let form = &self.node(child).token.form;
                    if patterns::ispunct().is_match(form) {
                        features.push(format!("1.<{form}"));
                        break;
                    }
                }
                for &child in top.right.iter().rev() {
                    let form = &self.node(child).token.form;
                    if patterns::ispunct().is_match(form) {
                        features.push(format!("1.>{form}"));
                        break;
                    }
                }
            }
        }
        let next = self.node(next_id);
        for &child in &next.left {
            let form = &self.node(child).token.form;
            if patterns::ispunct().is_match(form) {
                features.push(format!(".<0{form}"));
                break;
            }
        }
        for &child in next.right.iter().rev() {
            let form = &self.node(child).token.form;
            if patterns::ispunct().is_match(form) {
                features.push(format!(".>0{form}"));
                break;
            }
        }
    }

    /// Entity type (time/location) of the focus pair, from corpus-wide
    /// lemma statistics.
    fn prep_child_entities(&self, next_id: TokenId, features: &mut Features) {
        if self.stack.len() > 1 {
            if let Some(&top_id) = self.stack.last() {
                self.complement_feature(&self.node(top_id).token, "1TIME", "1LOC", features);
            }
        }
        self.complement_feature(&self.node(next_id).token, "TIME0", "LOC0", features);
    }

    fn complement_feature(
        &self,
        token: &Arc<Token>,
        time_pred: &str,
        loc_pred: &str,
        features: &mut Features,
    ) {
        if !token.is_noun(&*self.sentence.language) {
            return;
        }
        let Some(noun) = token.lemma.as_deref().filter(|l| !l.is_empty()) else {
            return;
        };
        let time = self.global.time_count(noun) as f64;
        let loc = self.global.loc_count(noun) as f64;
        if time > FREQ_RATIO * loc {
            features.push(time_pred.to_string());
        }
        if loc > FREQ_RATIO * time {
            features.push(loc_pred.to_string());
        }
    }
}
