//! Per-call execution context.
//!
//! A fresh `Context` is created for every top-level cast; casters only ever
//! see it through `&mut`, so the tree itself stays read-only and shareable.
use indexmap::IndexSet;

use crate::error_tree::PathKey;

#[derive(Debug, Default, Clone)]
pub struct Context {
    path: Vec<PathKey>,
    checked: IndexSet<Vec<PathKey>>,
    exhaustive: IndexSet<Vec<PathKey>>,
}

impl Context {
    pub fn new() -> Self { Self::default() }

    /// Location of the value currently being cast.
    pub fn path(&self) -> &[PathKey] { &self.path }

    /// The container at the current path promises to validate every child.
    pub fn will_check(&mut self) {
        self.exhaustive.insert(self.path.clone());
    }

    /// Runs `body` one level deeper, under `key`, recording the key as expected.
    pub fn checked_key<T>(&mut self, key: impl Into<PathKey>, body: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(key.into());
        self.checked.insert(self.path.clone());
        let out = body(self);
        self.path.pop();
        out
    }

    /// Records `key` below the current path as expected, without descending.
    pub fn mark_checked(&mut self, key: impl Into<PathKey>) {
        let mut path = self.path.clone();
        path.push(key.into());
        self.checked.insert(path);
    }

    pub fn is_checked(&self, path: &[PathKey]) -> bool {
        self.checked.contains(path)
    }

    pub fn will_check_all(&self, path: &[PathKey]) -> bool {
        self.exhaustive.contains(path)
    }

    /// Paths declared as expected, in the order they were first seen.
    pub fn checked_paths(&self) -> impl Iterator<Item = &[PathKey]> {
        self.checked.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_key_is_scoped() {
        let mut ctx = Context::new();
        let depth = ctx.checked_key("a", |ctx| {
            ctx.checked_key(0usize, |ctx| ctx.path().len())
        });
        assert_eq!(depth, 2);
        assert!(ctx.path().is_empty());
        assert!(ctx.is_checked(&["a".into()]));
        assert!(ctx.is_checked(&["a".into(), PathKey::Index(0)]));
    }

    #[test]
    fn mark_and_will_check() {
        let mut ctx = Context::new();
        ctx.will_check();
        ctx.mark_checked("kind");
        assert!(ctx.will_check_all(&[]));
        assert!(ctx.is_checked(&["kind".into()]));
        assert_eq!(ctx.checked_paths().count(), 1);
    }
}
