//! Interned parser actions
//!
//! Actions are short strings (`"S"`, `"Rnsubj"`, `"l2obj"`, ...) interned
//! in an append-only table so that states and history features can compare
//! them by handle identity instead of by content. The table is written
//! during training setup and read-only afterwards; inserts are
//! publication-safe behind an `RwLock`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Stable handle to an interned action string.
///
/// Handles from the same [`ActionTable`] compare equal exactly when the
/// underlying strings are equal. Comparing handles from different tables
/// is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action(u32);

#[derive(Default)]
struct TableInner {
    by_name: HashMap<Arc<str>, Action>,
    names: Vec<Arc<str>>,
}

/// Append-only action interner.
pub struct ActionTable {
    inner: RwLock<TableInner>,
    shift: Action,
    unshift: Action,
    extract: Action,
    insert: Action,
    pop: Action,
}

impl ActionTable {
    /// Creates a table with the fixed single-letter actions pre-interned.
    pub fn new() -> Self {
        let mut inner = TableInner::default();
        let mut pre = |name: &str| {
            let id = Action(inner.names.len() as u32);
            let name: Arc<str> = Arc::from(name);
            inner.names.push(Arc::clone(&name));
            inner.by_name.insert(name, id);
            id
        };
        let shift = pre("S");
        let unshift = pre("U");
        let extract = pre("E");
        let insert = pre("I");
        let pop = pre("P");
        Self {
            inner: RwLock::new(inner),
            shift,
            unshift,
            extract,
            insert,
            pop,
        }
    }

    /// Interns `name`, returning the stable handle for it.
    pub fn intern(&self, name: &str) -> Action {
        if let Some(&id) = self
            .inner
            .read()
            .expect("action table poisoned")
            .by_name
            .get(name)
        {
            return id;
        }
        let mut inner = self.inner.write().expect("action table poisoned");
        if let Some(&id) = inner.by_name.get(name) {
            return id;
        }
        let id = Action(inner.names.len() as u32);
        let name: Arc<str> = Arc::from(name);
        inner.names.push(Arc::clone(&name));
        inner.by_name.insert(name, id);
        id
    }

    /// Builds a reduce action, folding the dependency label into the name
    /// when composite actions are enabled. The label-assignment action
    /// `D` always carries its label.
    pub fn reduce(&self, base: &str, label: &str, composite: bool) -> Action {
        if composite || base == "D" {
            self.intern(&format!("{base}{label}"))
        } else {
            self.intern(base)
        }
    }

    /// Returns the interned string for `action`.
    pub fn name(&self, action: Action) -> Arc<str> {
        let inner = self.inner.read().expect("action table poisoned");
        Arc::clone(&inner.names[action.0 as usize])
    }

    /// Number of interned actions.
    pub fn len(&self) -> usize {
        self.inner.read().expect("action table poisoned").names.len()
    }

    /// True when no action has been interned (never the case: the fixed
    /// actions are pre-interned).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The shift action `S`.
    pub fn shift(&self) -> Action {
        self.shift
    }

    /// The unshift action `U`.
    pub fn unshift(&self) -> Action {
        self.unshift
    }

    /// The extract action `E`.
    pub fn extract(&self) -> Action {
        self.extract
    }

    /// The insert action `I`.
    pub fn insert(&self) -> Action {
        self.insert
    }

    /// The pop action `P`.
    pub fn pop(&self) -> Action {
        self.pop
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionTable").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_identity_preserving() {
        let table = ActionTable::new();
        let a = table.intern("Rnsubj");
        let b = table.intern("Rnsubj");
        let c = table.intern("Robj");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(&*table.name(a), "Rnsubj");
    }

    #[test]
    fn fixed_actions_are_preinterned() {
        let table = ActionTable::new();
        assert_eq!(table.intern("S"), table.shift());
        assert_eq!(table.intern("U"), table.unshift());
        assert_eq!(table.intern("P"), table.pop());
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn reduce_folds_label_only_when_composite() {
        let table = ActionTable::new();
        let composite = table.reduce("R", "nsubj", true);
        assert_eq!(&*table.name(composite), "Rnsubj");
        let plain = table.reduce("R", "nsubj", false);
        assert_eq!(&*table.name(plain), "R");
        // D always carries its label.
        let dep = table.reduce("D", "nsubj", false);
        assert_eq!(&*table.name(dep), "Dnsubj");
    }
}
