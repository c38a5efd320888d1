//! Symbol table shared by the lexer, the device model and the drivers.
//!
//! Every identifier, keyword and number literal in a definition file is
//! interned once and referred to by its [`NameId`] afterwards. The table also
//! hands out blocks of unique error codes for collaborators that want to
//! number their own diagnostics.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// Stable identifier of an interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameId(pub usize);

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// String interning table.
#[derive(Debug, Default, Clone)]
pub struct Names {
    strings: Vec<String>,
    index: HashMap<String, NameId>,
    error_code_count: usize,
}

impl Names {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning its existing id or allocating the next one.
    pub fn intern(&mut self, name: &str) -> NameId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = NameId(self.strings.len());
        self.strings.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    /// Intern every string in `names`, preserving order.
    pub fn intern_all<S: AsRef<str>>(
        &mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Vec<NameId> {
        names
            .into_iter()
            .map(|name| self.intern(name.as_ref()))
            .collect()
    }

    /// Look up the id of `name` without interning it.
    pub fn lookup(&self, name: &str) -> Option<NameId> {
        self.index.get(name).copied()
    }

    /// Resolve an id back to its string.
    pub fn resolve(&self, id: NameId) -> Option<&str> {
        self.strings.get(id.0).map(String::as_str)
    }

    /// Allocate a block of `count` error codes that never overlaps any
    /// previously allocated block.
    pub fn unique_error_codes(&mut self, count: usize) -> Range<usize> {
        let start = self.error_code_count;
        self.error_code_count += count;
        start..self.error_code_count
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let mut names = Names::new();
        let ids = names.intern_all(&["Alice", "Bob", "Eve"]);
        assert_eq!(ids, vec![NameId(0), NameId(1), NameId(2)]);
        assert_eq!(names.intern("Bob"), NameId(1));
        assert_eq!(names.intern("steve"), NameId(3));
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let mut names = Names::new();
        names.intern("Alice");
        assert_eq!(names.lookup("Alice"), Some(NameId(0)));
        assert_eq!(names.lookup("Bob"), None);
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_resolve() {
        let mut names = Names::new();
        let id = names.intern("Alice");
        assert_eq!(names.resolve(id), Some("Alice"));
        assert_eq!(names.resolve(NameId(42)), None);
    }

    #[test]
    fn test_unique_error_codes_do_not_overlap() {
        let mut names = Names::new();
        let first = names.unique_error_codes(13);
        let second = names.unique_error_codes(5);
        assert_eq!(first, 0..13);
        assert_eq!(second, 13..18);
        assert!(names.unique_error_codes(0).is_empty());
    }
}
