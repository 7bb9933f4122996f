//! Lexically scoped symbol tables.
//!
//! A stack of name-to-type frames. Entering a block pushes a frame,
//! leaving pops it; lookups search from the innermost frame outward. The
//! global frame is created at construction and never popped.

use rustc_hash::FxHashMap;

use crate::ty::SemanticType;

/// The scope stack. Index 0 is the global scope.
pub struct ScopeStack {
    scopes: Vec<FxHashMap<String, SemanticType>>,
}

impl ScopeStack {
    /// Create a stack holding one empty global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Push a new empty scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pop the innermost scope.
    ///
    /// # Panics
    ///
    /// Panics if only the global scope remains.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    /// Bind a name in the innermost scope. Shadowing of outer scopes is
    /// allowed; duplicate checks are the caller's business via
    /// [`ScopeStack::lookup_local`].
    pub fn insert(&mut self, name: String, ty: SemanticType) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name, ty);
    }

    /// Look up a name, walking from the innermost scope outward.
    pub fn lookup(&self, name: &str) -> Option<&SemanticType> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Look up a name in the innermost scope only.
    pub fn lookup_local(&self, name: &str) -> Option<&SemanticType> {
        self.scopes
            .last()
            .expect("scope stack is never empty")
            .get(name)
    }

    /// Number of scopes on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
