//! The process-wide string table backing [`super::Symbol`].
//!
//! Lock-free concurrent interning via `DashMap`, keyed by string hash rather
//! than the string itself so that a hit is a single hash + map lookup. The
//! driver may analyze several modules in parallel (§5); each one interns
//! into this same table, so identical names always collapse to the same
//! `Symbol` no matter which module discovered them first.

use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::LazyLock;

use super::{InternerStats, Symbol, KNOWN_SYMBOLS, RESERVED_SYMBOLS_END};

pub static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    table.initialize_known_symbols();
    table
});

pub struct StringTable {
    map: DashMap<u64, (&'static str, u32)>,
    next_index: AtomicU32,
    collisions: AtomicUsize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity(256),
            next_index: AtomicU32::new(RESERVED_SYMBOLS_END),
            collisions: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    fn initialize_known_symbols(&self) {
        for (idx, text) in KNOWN_SYMBOLS.iter().enumerate() {
            let interned: &'static str = Box::leak(text.to_string().into_boxed_str());
            let hash = Self::hash_str(text);
            self.map.insert(hash, (interned, idx as u32));
        }
    }

    pub fn intern(&self, s: &str) -> Symbol {
        let hash = Self::hash_str(s);

        if let Some(entry) = self.map.get(&hash) {
            if entry.value().0 == s {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Symbol::from_u32_unchecked(entry.value().1);
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        match self.map.entry(hash) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                if entry.get().0 == s {
                    Symbol::from_u32_unchecked(entry.get().1)
                } else {
                    self.intern_with_probing(s, hash)
                }
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
                let interned: &'static str = Box::leak(s.to_string().into_boxed_str());
                entry.insert((interned, idx));
                Symbol::from_u32_unchecked(idx)
            }
        }
    }

    /// Resolve a hash collision by linear probing with a golden-ratio offset.
    fn intern_with_probing(&self, s: &str, original_hash: u64) -> Symbol {
        const MAX_PROBES: u64 = 32;
        const PROBE_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

        for i in 1..=MAX_PROBES {
            let probe = original_hash.wrapping_add(i.wrapping_mul(PROBE_STRIDE));
            match self.map.entry(probe) {
                dashmap::mapref::entry::Entry::Occupied(entry) if entry.get().0 == s => {
                    return Symbol::from_u32_unchecked(entry.get().1);
                }
                dashmap::mapref::entry::Entry::Occupied(_) => continue,
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    self.collisions.fetch_add(1, Ordering::Relaxed);
                    let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
                    let interned: &'static str = Box::leak(s.to_string().into_boxed_str());
                    entry.insert((interned, idx));
                    return Symbol::from_u32_unchecked(idx);
                }
            }
        }

        // All probes occupied by other strings: fall back to a fresh table
        // slot keyed by the original hash, accepting the rare collision.
        self.collisions.fetch_add(1, Ordering::Relaxed);
        let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
        let interned: &'static str = Box::leak(s.to_string().into_boxed_str());
        self.map.insert(original_hash, (interned, idx));
        Symbol::from_u32_unchecked(idx)
    }

    /// Linear scan by index; interning is hot, retrieval of the backing
    /// string for an arbitrary symbol is rare (diagnostics, mangling).
    pub fn get(&self, symbol: Symbol) -> Option<&'static str> {
        self.map
            .iter()
            .find(|entry| entry.value().1 == symbol.as_u32())
            .map(|entry| entry.value().0)
    }

    fn hash_str(s: &str) -> u64 {
        let mut hasher = ahash::AHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }

    pub fn stats(&self) -> InternerStats {
        InternerStats {
            count: self.map.len(),
            capacity: self.map.capacity(),
            collisions: self.collisions.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn intern_same_string_twice_yields_equal_symbols() {
        let a = STRING_TABLE.intern("roundtrip_a");
        let b = STRING_TABLE.intern("roundtrip_a");
        assert_eq!(a, b);
    }

    #[test]
    fn get_returns_the_original_string() {
        let s = STRING_TABLE.intern("roundtrip_b");
        assert_eq!(STRING_TABLE.get(s), Some("roundtrip_b"));
    }

    #[test]
    fn concurrent_interning_of_distinct_strings_stays_distinct() {
        let handles: Vec<_> = (0..16)
            .map(|i| thread::spawn(move || STRING_TABLE.intern(&format!("concurrent_{i}"))))
            .collect();
        let symbols: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for i in 0..symbols.len() {
            for j in (i + 1)..symbols.len() {
                assert_ne!(symbols[i], symbols[j]);
            }
        }
    }

    #[test]
    fn concurrent_interning_of_same_string_converges() {
        let handles: Vec<_> = (0..16)
            .map(|_| thread::spawn(|| STRING_TABLE.intern("concurrent_same")))
            .collect();
        let symbols: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(symbols.iter().all(|s| *s == symbols[0]));
    }

    #[test]
    fn known_symbols_are_preinterned_below_reserved_boundary() {
        let sym = STRING_TABLE.intern("Int");
        assert!(sym.as_u32() < RESERVED_SYMBOLS_END);
    }
}
