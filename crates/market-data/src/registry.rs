//! Instrument registry
//!
//! Bidirectional symbol ⇄ handle map shared by the feed path and the
//! engine. Handles are assigned atomically and monotonically; registering a
//! symbol twice returns the handle it already has.

use dashmap::DashMap;
use log::debug;
use sentinel_core::{InstrumentHandle, Symbol};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct InstrumentRegistry {
    by_symbol: DashMap<Symbol, InstrumentHandle>,
    by_handle: DashMap<InstrumentHandle, Symbol>,
    next_handle: AtomicU64,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start numbering at `first` (handles below it are never issued)
    pub fn starting_at(first: u64) -> Self {
        Self {
            by_symbol: DashMap::new(),
            by_handle: DashMap::new(),
            next_handle: AtomicU64::new(first),
        }
    }

    /// Register a symbol, returning its handle
    pub fn register(&self, symbol: &str) -> InstrumentHandle {
        if let Some(handle) = self.by_symbol.get(symbol) {
            return *handle;
        }

        // The entry lock makes assignment race-free for the same symbol
        let handle = *self
            .by_symbol
            .entry(symbol.to_string())
            .or_insert_with(|| {
                InstrumentHandle(self.next_handle.fetch_add(1, Ordering::SeqCst))
            });
        self.by_handle.entry(handle).or_insert_with(|| {
            debug!("[REGISTRY] {} -> {}", symbol, handle);
            symbol.to_string()
        });
        handle
    }

    pub fn handle_of(&self, symbol: &str) -> Option<InstrumentHandle> {
        self.by_symbol.get(symbol).map(|h| *h)
    }

    pub fn symbol_of(&self, handle: InstrumentHandle) -> Option<Symbol> {
        self.by_handle.get(&handle).map(|s| s.clone())
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }

    /// All registered handles, ascending
    pub fn handles(&self) -> Vec<InstrumentHandle> {
        let mut handles: Vec<_> = self.by_handle.iter().map(|e| *e.key()).collect();
        handles.sort();
        handles
    }
}

impl Default for InstrumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_register_is_idempotent() {
        let registry = InstrumentRegistry::new();
        let aapl = registry.register("AAPL");
        let msft = registry.register("MSFT");

        assert_eq!(registry.register("AAPL"), aapl);
        assert_ne!(aapl, msft);
        assert!(msft > aapl);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.symbol_of(msft).as_deref(), Some("MSFT"));
        assert_eq!(registry.handle_of("AAPL"), Some(aapl));
        assert_eq!(registry.handle_of("TSLA"), None);
    }

    #[test]
    fn test_concurrent_registration_assigns_unique_handles() {
        let registry = Arc::new(InstrumentRegistry::new());
        let symbols: Vec<String> = (0..50).map(|i| format!("SYM{}", i)).collect();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let symbols = symbols.clone();
                thread::spawn(move || {
                    for s in &symbols {
                        registry.register(s);
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        assert_eq!(registry.len(), 50);
        let handles = registry.handles();
        assert_eq!(handles.len(), 50);
        for s in &symbols {
            let h = registry.handle_of(s).unwrap();
            assert_eq!(registry.symbol_of(h).as_deref(), Some(s.as_str()));
        }
    }
}
