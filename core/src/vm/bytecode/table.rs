use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::Value;

/// String-keyed value table. Backs the VM globals and map values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    entries: HashMap<Rc<str>, Value>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or overwrite. Returns `true` when `key` was not present.
    pub fn set(&mut self, key: Rc<str>, value: Value) -> bool {
        self.entries.insert(key, value).is_none()
    }

    /// Overwrite an existing entry. Returns `false`, leaving the table
    /// untouched, when `key` is absent.
    pub fn assign(&mut self, key: &str, value: Value) -> bool {
        match self.entries.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Value)> {
        self.entries.iter()
    }
}

/// Canonical string storage: equal text interned twice yields the same
/// allocation.
#[derive(Debug, Default)]
pub struct Interner {
    strings: HashSet<Rc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> Rc<str> {
        if let Some(existing) = self.strings.get(text) {
            return Rc::clone(existing);
        }
        let interned: Rc<str> = Rc::from(text);
        self.strings.insert(Rc::clone(&interned));
        interned
    }

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
    fn set_overwrites_without_duplicating_keys() {
        let mut table = Table::new();
        assert!(table.set(Rc::from("x"), Value::Number(1.0)));
        assert!(!table.set(Rc::from("x"), Value::Number(2.0)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("x"), Some(&Value::Number(2.0)));
        assert_eq!(table.get("y"), None);
    }

    #[test]
    fn assign_only_updates_existing_entries() {
        let mut table = Table::new();
        assert!(!table.assign("missing", Value::Null));
        assert!(table.is_empty());

        table.set(Rc::from("flag"), Value::Boolean(false));
        assert!(table.assign("flag", Value::Boolean(true)));
        assert_eq!(table.get("flag"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn delete_removes_and_returns_the_value() {
        let mut table = Table::new();
        table.set(Rc::from("a"), Value::Number(1.0));
        table.set(Rc::from("b"), Value::Number(2.0));

        assert_eq!(table.delete("a"), Some(Value::Number(1.0)));
        assert_eq!(table.delete("a"), None);
        assert!(!table.contains("a"));
        assert!(table.contains("b"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn many_entries_survive_growth() {
        let mut table = Table::new();
        for i in 0..1_000 {
            table.set(Rc::from(format!("k{i}")), Value::Number(f64::from(i)));
        }
        assert_eq!(table.len(), 1_000);
        assert!((0..1_000).all(|i| table.get(&format!("k{i}")) == Some(&Value::Number(f64::from(i)))));
    }

    #[test]
    fn interned_text_shares_one_allocation() {
        let mut strings = Interner::new();
        let a = strings.intern("hello");
        let b = strings.intern("hello");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(strings.len(), 1);
    }
}
