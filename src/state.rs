//! Parser configurations and the transition engine
//!
//! A [`State`] is the configuration tuple `(stack, input, extracted)`
//! over token ids, together with the node slots the ids resolve through.
//! Transitions mutate the state in place and report impossibility by
//! returning `false`, leaving the state untouched. Node slots are
//! reference counted, so cloning a state is shallow and mutation unshares
//! the affected node first; predecessors of a cloned state never observe
//! a mutation.

use crate::action::Action;
use crate::global::GlobalInfo;
use crate::sentence::{Sentence, SentenceInfo};
use crate::token::TokenGraph;
use crate::types::{PastVec, TokenId, WorkVec};
use std::rc::Rc;
use std::sync::Arc;

/// Parser configuration and transition engine.
#[derive(Clone)]
pub struct State {
    pub(crate) sentence: Sentence,
    pub(crate) root: Rc<TokenGraph>,
    pub(crate) info: Rc<SentenceInfo>,
    pub(crate) global: Arc<GlobalInfo>,
    pub(crate) stack: WorkVec,
    pub(crate) input: WorkVec,
    pub(crate) extracted: WorkVec,
    pub(crate) action: Option<Action>,
    pub(crate) past: PastVec,
    pub(crate) after_unshift: bool,
}

impl State {
    /// Creates the initial configuration for `sentence`: the stack seeded
    /// with the synthetic root, the input with the sentence reversed so
    /// the first token is consumed first.
    pub fn new(mut sentence: Sentence, global: Arc<GlobalInfo>) -> Self {
        if global.config.right_to_left {
            sentence.reverse();
        }
        let info = Rc::new(SentenceInfo::new(&sentence));
        let input: WorkVec = (1..=sentence.len()).rev().collect();
        let mut stack = WorkVec::new();
        stack.push(0);
        Self {
            sentence,
            root: Rc::new(TokenGraph::root()),
            info,
            global,
            stack,
            input,
            extracted: WorkVec::new(),
            action: None,
            past: PastVec::new(),
            after_unshift: false,
        }
    }

    /// True while the input is non-empty.
    pub fn has_next(&self) -> bool {
        !self.input.is_empty()
    }

    /// The working sentence (reversed when `RightToLeft` is set).
    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    /// The stack, bottom first (the synthetic root at index 0).
    pub fn stack(&self) -> &[TokenId] {
        &self.stack
    }

    /// The input, next token last.
    pub fn input(&self) -> &[TokenId] {
        &self.input
    }

    /// The auxiliary extracted stack.
    pub fn extracted(&self) -> &[TokenId] {
        &self.extracted
    }

    /// The action that produced this configuration, `None` at the initial
    /// state.
    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// True right after an unshift, until the next shift. Beam drivers use
    /// this to avoid oscillating between shift and unshift.
    pub fn after_unshift(&self) -> bool {
        self.after_unshift
    }

    /// Shared configuration/statistics handle.
    pub fn global(&self) -> &Arc<GlobalInfo> {
        &self.global
    }

    /// Resolves a token id through this state's node slots. Id 0 is the
    /// synthetic root.
    pub fn node(&self, id: TokenId) -> &TokenGraph {
        if id == 0 {
            &self.root
        } else {
            &self.sentence.nodes[id - 1]
        }
    }

    /// Mutable access to a node, unsharing it from sibling states first.
    pub(crate) fn node_mut(&mut self, id: TokenId) -> &mut TokenGraph {
        if id == 0 {
            Rc::make_mut(&mut self.root)
        } else {
            Rc::make_mut(&mut self.sentence.nodes[id - 1])
        }
    }

    /// Number of nodes in the subtree rooted at `id`, including itself.
    pub fn subtree_size(&self, id: TokenId) -> usize {
        let node = self.node(id);
        1 + node
            .left
            .iter()
            .chain(node.right.iter())
            .map(|&c| self.subtree_size(c))
            .sum::<usize>()
    }

    /// Applies `action` in place.
    ///
    /// Returns `true` when the action applied (including the tolerated
    /// shift on an empty input, which leaves the state unchanged) and
    /// `false` when a precondition failed; a failed action leaves the
    /// state untouched.
    pub fn transition(&mut self, action: Action) -> bool {
        let name = self.global.actions.name(action);
        let bytes = name.as_bytes();
        match bytes[0] {
            b'S' => {
                if self.input.is_empty() {
                    // Extra shift at end of sequence: tolerated no-op.
                    return true;
                }
                self.shift()
            }
            b'R' => {
                if self.stack.len() == 1 {
                    // Never reduce the synthetic root; force a shift.
                    return self.shift();
                }
                self.right(action, &name[1..])
            }
            b'L' => self.left(action, &name[1..]),
            b'r' => match depth(bytes) {
                Some(n) => self.right_n(action, n, &name[2..]),
                None => false,
            },
            b'l' => match depth(bytes) {
                Some(n) => self.left_n(action, n, &name[2..]),
                None => false,
            },
            b'D' => self.dep_link(action, &name[1..]),
            b'E' => self.do_extract(),
            b'I' => self.do_insert(),
            b'P' => self.do_pop(),
            b'U' => self.unshift(),
            _ => false,
        }
    }

    fn shift(&mut self) -> bool {
        let Some(next) = self.input.pop() else {
            return false;
        };
        self.stack.push(next);
        self.action = Some(self.global.actions.shift());
        self.after_unshift = false;
        true
    }

    fn unshift(&mut self) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        let Some(top) = self.stack.pop() else {
            return false;
        };
        self.input.push(top);
        self.action = Some(self.global.actions.unshift());
        self.after_unshift = true;
        true
    }

    /// `R`: pop top and attach it as left child of the next token.
    fn right(&mut self, action: Action, label: &str) -> bool {
        let Some(&next) = self.input.last() else {
            return false;
        };
        if self.stack.len() == 1 {
            return false;
        }
        let Some(top) = self.stack.pop() else {
            return false;
        };
        self.node_mut(next).left.push(top);
        let composite = self.global.config.composite_actions;
        let node = self.node_mut(top);
        node.link_head(next);
        if composite {
            node.link_label(label);
        }
        self.action = Some(action);
        true
    }

    /// `L`: attach the next token as right child of the stack top.
    fn left(&mut self, action: Action, label: &str) -> bool {
        let (Some(&top), Some(&next)) = (self.stack.last(), self.input.last()) else {
            return false;
        };
        self.node_mut(top).right.push(next);
        let arc_eager = self.global.config.arc_eager;
        let composite = self.global.config.composite_actions;
        if arc_eager {
            // Eager variant: link then shift.
            self.stack.push(next);
            self.input.pop();
        } else if composite {
            if self.stack.len() > 1 {
                self.stack.pop();
                if let Some(slot) = self.input.last_mut() {
                    *slot = top;
                }
            } else {
                // Left to the root: anticipate the implied shift.
                if let Some(slot) = self.stack.last_mut() {
                    *slot = top;
                }
                self.input.pop();
            }
        } else {
            self.stack.pop();
            if let Some(slot) = self.input.last_mut() {
                *slot = top;
            }
        }
        let node = self.node_mut(next);
        node.link_head(top);
        if composite {
            node.link_label(label);
        }
        self.action = Some(action);
        true
    }

    /// `r<n>`: attach the n-th stack element as left child of the next
    /// token.
    fn right_n(&mut self, action: Action, n: usize, label: &str) -> bool {
        let Some(&next) = self.input.last() else {
            return false;
        };
        if self.stack.len() <= n {
            return false;
        }
        let idx = self.stack.len() - n;
        let nth = self.stack.remove(idx);
        self.node_mut(next).left.push(nth);
        let composite = self.global.config.composite_actions;
        {
            let node = self.node_mut(nth);
            node.link_head(next);
            if composite {
                node.link_label(label);
            }
        }
        if composite {
            // Anticipate later reductions: re-examine the current top.
            if let Some(top) = self.stack.pop() {
                self.input.push(top);
            }
        }
        self.action = Some(action);
        true
    }

    /// `l<n>`: attach the next token as right child of the n-th stack
    /// element, moving the intervening tokens back onto the input.
    fn left_n(&mut self, action: Action, n: usize, label: &str) -> bool {
        let Some(&next) = self.input.last() else {
            return false;
        };
        if self.stack.len() < n {
            return false;
        }
        let nth = self.stack[self.stack.len() - n];
        self.node_mut(nth).right.push(next);
        let composite = self.global.config.composite_actions;
        {
            let node = self.node_mut(next);
            node.link_head(nth);
            if composite {
                node.link_label(label);
            }
        }
        // The top replaces the consumed token on the input.
        if let (Some(top), Some(slot)) = (self.stack.pop(), self.input.last_mut()) {
            *slot = top;
        }
        // Intervening tokens go back to the input in stack order.
        for _ in 0..n.saturating_sub(2) {
            if let Some(t) = self.stack.pop() {
                self.input.push(t);
            }
        }
        if self.stack.len() > 1 {
            // The target itself goes back as well.
            self.input.push(nth);
            self.stack.pop();
        } else if let Some(slot) = self.stack.last_mut() {
            // Would leave only the root: anticipate the implied shift.
            *slot = nth;
        }
        self.action = Some(action);
        true
    }

    /// `D<label>`: label the arc created by the preceding reduce action.
    fn dep_link(&mut self, action: Action, label: &str) -> bool {
        let Some(&next) = self.input.last() else {
            return false;
        };
        let previous = match self.action {
            Some(a) => self.global.actions.name(a),
            None => return true,
        };
        match previous.as_bytes()[0] {
            kind @ (b'R' | b'r') => {
                let Some(&child) = self.node(next).left.last() else {
                    return false;
                };
                self.node_mut(child).link_label(label);
                if kind == b'r' {
                    // Complete the deep reduce: re-examine the current top.
                    if let Some(top) = self.stack.pop() {
                        self.input.push(top);
                    }
                }
                self.action = Some(action);
            }
            b'L' | b'l' => {
                let Some(&child) = self.node(next).right.last() else {
                    return false;
                };
                self.node_mut(child).link_label(label);
                if self.stack.is_empty() {
                    // The arc went to the root: restore it on the stack.
                    self.input.pop();
                    self.stack.push(next);
                }
                self.action = Some(action);
            }
            _ => {}
        }
        true
    }

    /// `E`: move the second stack token aside and shift.
    fn do_extract(&mut self) -> bool {
        if self.stack.len() < 3 {
            return false;
        }
        let Some(next) = self.input.pop() else {
            return false;
        };
        let idx = self.stack.len() - 2;
        let second = self.stack.remove(idx);
        self.extracted.push(second);
        self.stack.push(next);
        self.action = Some(self.global.actions.extract());
        true
    }

    /// `I`: bring the last extracted token back onto the input.
    fn do_insert(&mut self) -> bool {
        let Some(token) = self.extracted.pop() else {
            return false;
        };
        self.input.push(token);
        self.action = Some(self.global.actions.insert());
        true
    }

    /// `P`: discard the stack top.
    fn do_pop(&mut self) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        self.stack.pop();
        self.action = Some(self.global.actions.pop());
        true
    }
}

fn depth(bytes: &[u8]) -> Option<usize> {
    match bytes.get(1).copied() {
        Some(d @ b'2'..=b'4') => Some((d - b'0') as usize),
        _ => None,
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("stack", &self.stack)
            .field("input", &self.input)
            .field("extracted", &self.extracted)
            .field("action", &self.action)
            .finish()
    }
}
