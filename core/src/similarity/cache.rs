use crate::normalize::NORMALIZER_VERSION;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    normalizer_version: u32,
    lo: [u8; 16],
    hi: [u8; 16],
}

impl CacheKey {
    /// Order-independent: scoring is symmetric, so (a, b) and (b, a) share
    /// an entry.
    pub fn for_pair(a: &[String], b: &[String]) -> Self {
        let da = token_digest(a);
        let db = token_digest(b);
        let (lo, hi) = if da <= db { (da, db) } else { (db, da) };
        Self {
            normalizer_version: NORMALIZER_VERSION,
            lo,
            hi,
        }
    }
}

pub fn token_digest(tokens: &[String]) -> [u8; 16] {
    let mut h = Sha256::new();
    for t in tokens {
        h.update(t.as_bytes());
        h.update([0x1f]);
    }
    let full = h.finalize();
    let mut out = [0u8; 16];
    out.copy_from_slice(&full[..16]);
    out
}

/// Bounded memo for pairwise scores, evicting the oldest insertion first.
/// Lives for one analysis run.
#[derive(Debug)]
pub struct ScoreCache {
    capacity: usize,
    entries: HashMap<CacheKey, f64>,
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

impl ScoreCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.min(1024)),
            order: VecDeque::with_capacity(capacity.min(1024)),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<f64> {
        match self.entries.get(key) {
            Some(v) => {
                self.hits += 1;
                Some(*v)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, value: f64) {
        if self.entries.contains_key(&key) {
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.entries.insert(key, value);
        self.order.push_back(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
