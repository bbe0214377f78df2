//! String interning.
//!
//! Class names, field names, method names and identifiers are
//! interned once and compared by id for the rest of the pipeline
//! instead of carrying owned `String`s through every AST node.
//! The compiler is single-threaded and single-file, so the interner
//! is a plain thread-local `RefCell`, not a concurrent map.

use std::cell::RefCell;
use std::fmt;

struct Interner {
    strings: Vec<&'static str>,
    lookup: std::collections::HashMap<&'static str, u32>,
}

impl Interner {
    fn new() -> Self {
        Self { strings: Vec::new(), lookup: std::collections::HashMap::new() }
    }

    fn intern(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.lookup.get(s) {
            return id;
        }
        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        let id = self.strings.len() as u32;
        self.strings.push(leaked);
        self.lookup.insert(leaked, id);
        id
    }

    fn resolve(&self, id: u32) -> &'static str {
        self.strings[id as usize]
    }
}

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(Interner::new());
}

/// An interned string. Cheap to copy and compare.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    pub fn intern(s: &str) -> Symbol {
        INTERNER.with(|i| Symbol(i.borrow_mut().intern(s)))
    }

    pub fn as_str(self) -> &'static str {
        INTERNER.with(|i| i.borrow().resolve(self.0))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedups() {
        let a = Symbol::intern("Object");
        let b = Symbol::intern("Object");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Object");
    }

    #[test]
    fn distinct_strings_distinct_symbols() {
        let a = Symbol::intern("Main");
        let b = Symbol::intern("Object");
        assert_ne!(a, b);
    }
}
