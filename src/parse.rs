//! Copy-on-write parse states for beam search
//!
//! A [`ParseState`] never mutates in place across `transition`: applying
//! an action clones the configuration (sharing the sentence nodes) and
//! returns a fresh successor holding a reference-counted link to its
//! predecessor. Dropping a leaf releases its exclusive chain.

use crate::action::Action;
use crate::classifier::PredicateIndex;
use crate::global::GlobalInfo;
use crate::patterns;
use crate::sentence::Sentence;
use crate::state::State;
use crate::template::DIR_CODES;
use crate::types::TokenId;
use std::rc::Rc;
use std::sync::Arc;

/// Sparse classifier context for one configuration.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Feature ids, unknown predicates dropped.
    pub features: Vec<u32>,
    /// Split feature value, when configured and resolvable.
    pub split: Option<String>,
}

/// Beam-search parser state.
pub struct ParseState {
    state: State,
    previous: Option<Rc<ParseState>>,
    pred_index: Rc<PredicateIndex>,
    /// Accumulated log-probability of the derivation, maintained by the
    /// beam driver.
    pub lprob: f64,
}

impl ParseState {
    /// Creates the initial parse state. Any dependencies carried by the
    /// sentence (e.g. gold annotation during evaluation) are cleared.
    pub fn new(
        sentence: &Sentence,
        global: Arc<GlobalInfo>,
        pred_index: Rc<PredicateIndex>,
    ) -> Self {
        let mut state = State::new(sentence.clone(), global);
        for id in 1..=state.sentence().len() {
            let node = state.node_mut(id);
            node.link_head(0);
            node.link_label("");
        }
        Self {
            state,
            previous: None,
            pred_index,
            lprob: 0.0,
        }
    }

    /// The underlying configuration.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The predecessor state, `None` at the initial state.
    pub fn previous(&self) -> Option<&Rc<ParseState>> {
        self.previous.as_ref()
    }

    /// True while there are input tokens left.
    ///
    /// When the input drains with several unattached tokens still on the
    /// stack, the remaining tops are connected before `false` is
    /// returned: the unattached node with a root-eligible part of speech
    /// and the largest subtree becomes the root; the others are linked to
    /// it (`SingleRoot`) or merely labeled with the root label.
    pub fn has_next(&mut self) -> bool {
        if self.state.has_next() {
            return true;
        }
        if self.state.stack.len() > 2 {
            self.attach_stray_roots();
        }
        false
    }

    fn attach_stray_roots(&mut self) {
        let language = self.state.sentence.language.clone();
        let mut root = 0;
        let mut root_size = 0;
        for &id in self.state.stack.iter().skip(1) {
            let node = self.state.node(id);
            if node.head != 0 {
                continue;
            }
            let size = self.state.subtree_size(id);
            if size > root_size
                && node
                    .token
                    .pos
                    .as_deref()
                    .is_some_and(|pos| language.root_pos(pos))
            {
                root = id;
                root_size = size;
            }
        }
        if root == 0 {
            return;
        }
        let root_label = language.root_label().to_string();
        if self.state.node(root).label.is_empty() {
            self.state.node_mut(root).link_label(&root_label);
        }
        let single_root = self.state.global.config.single_root;
        let stack: Vec<TokenId> = self.state.stack.iter().skip(1).copied().collect();
        for id in stack {
            let node = self.state.node(id);
            if node.head != 0 || id == root {
                continue;
            }
            if single_root {
                let needs_label = node.label.is_empty();
                let node = self.state.node_mut(id);
                node.link_head(root);
                if needs_label {
                    node.link_label(&root_label);
                }
            } else {
                // Stanford-dependencies style: label only.
                self.state.node_mut(id).link_label(&root_label);
            }
        }
    }

    /// Builds the classifier context for the current configuration.
    ///
    /// Predicates missing from the index are retried with their lexical
    /// tail replaced by `#UNKNOWN`; predicates that still miss are
    /// dropped.
    pub fn next(&self) -> Context {
        let preds = self.state.predicates();
        let mut context = Context {
            features: Vec::with_capacity(preds.features.len()),
            split: preds.split,
        };
        for pred in &preds.features {
            if let Some(id) = self.pred_index.get(pred) {
                context.features.push(id);
                continue;
            }
            let path_len = pred
                .bytes()
                .take_while(|b| DIR_CODES.as_bytes().contains(b))
                .count();
            if path_len + 2 < pred.len() {
                if let Some(prefix) = pred.get(..path_len + 2) {
                    let unknown = format!("{prefix}#UNKNOWN");
                    if let Some(id) = self.pred_index.get(&unknown) {
                        context.features.push(id);
                    }
                }
            }
        }
        context
    }

    /// Applies `action` to a clone of `this` state, returning the
    /// successor or `None` when the action is impossible. The receiver is
    /// never mutated. Associated function because the successor keeps a
    /// counted link to its predecessor.
    ///
    /// An extracted token is not allowed to survive beyond punctuation:
    /// when the extracted stack is non-empty and the next token is
    /// punctuation, a shift or left action is rewritten to an insert.
    pub fn transition(this: &Rc<Self>, action: Action) -> Option<Rc<ParseState>> {
        let actions = &this.state.global.actions;
        let mut action = action;
        if !this.state.extracted.is_empty() && !this.state.input.is_empty() {
            let kind = actions.name(action).as_bytes()[0];
            if (kind == b'S' || kind == b'L')
                && this
                    .state
                    .input
                    .last()
                    .is_some_and(|&id| patterns::ispunct().is_match(&this.state.node(id).token.form))
            {
                action = actions.insert();
            }
        }
        let mut successor = ParseState {
            state: this.state.clone(),
            previous: Some(Rc::clone(this)),
            pred_index: Rc::clone(&this.pred_index),
            lprob: this.lprob,
        };
        // Record the predecessor action in the bounded history window.
        let window = this.state.global.config.past_actions as usize;
        if let Some(previous_action) = successor.state.action {
            successor.state.past.insert(0, previous_action);
            successor.state.past.truncate(window);
        }
        if successor.state.transition(action) {
            Some(Rc::new(successor))
        } else {
            None
        }
    }
}

impl Clone for ParseState {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            previous: self.previous.clone(),
            pred_index: Rc::clone(&self.pred_index),
            lprob: self.lprob,
        }
    }
}

impl Drop for ParseState {
    fn drop(&mut self) {
        // Unwind exclusively-owned predecessors iteratively so a long
        // derivation cannot overflow the stack on release.
        let mut previous = self.previous.take();
        while let Some(rc) = previous {
            match Rc::try_unwrap(rc) {
                Ok(mut state) => previous = state.previous.take(),
                Err(_) => break,
            }
        }
    }
}

impl std::fmt::Debug for ParseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseState")
            .field("state", &self.state)
            .field("lprob", &self.lprob)
            .finish()
    }
}
