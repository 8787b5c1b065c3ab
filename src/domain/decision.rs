//! Decision flags produced by the evaluator

use std::collections::HashMap;

/// A named set of boolean capability flags, scoped to one request.
///
/// Flags that were never evaluated read as `false`, matching the fail-closed
/// behavior of unresolved permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionFlags {
    flags: HashMap<String, bool>,
}

impl DecisionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, allowed: bool) {
        self.flags.insert(name.to_string(), allowed);
    }

    pub fn allows(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.allows(name))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, bool)> for DecisionFlags {
    fn from_iter<T: IntoIterator<Item = (&'a str, bool)>>(iter: T) -> Self {
        let mut flags = Self::new();
        for (name, allowed) in iter {
            flags.set(name, allowed);
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_flag_reads_false() {
        let flags = DecisionFlags::new();
        assert!(!flags.allows("VIEW_ANY_CASE"));
    }

    #[test]
    fn test_set_and_any() {
        let mut flags = DecisionFlags::new();
        flags.set("VIEW_CASE", false);
        flags.set("VIEW_ANY_CASE", true);
        assert!(!flags.allows("VIEW_CASE"));
        assert!(flags.allows("VIEW_ANY_CASE"));
        assert!(flags.any(&["VIEW_CASE", "VIEW_ANY_CASE"]));
        assert!(!flags.any(&["EDIT_CASE"]));
        assert_eq!(flags.len(), 2);
    }

    #[test]
    fn test_from_iter() {
        let flags: DecisionFlags = [("A", true), ("B", false)].into_iter().collect();
        assert!(flags.allows("A"));
        assert!(!flags.allows("B"));
    }
}
