//! Ready-made key-value slot and hashing ops, so the engine is usable
//! with ordinary `Hash + Eq` keys out of the box.

use core::hash::{BuildHasher, Hash};

use hashbrown::DefaultHashBuilder;

use crate::ops::SlotOps;
use crate::table::LpCuckooMap;

/// A slot holding a key and its payload; empty when no pair is present.
///
/// The payload is reachable through [`LpCuckooMap::slot`] /
/// [`LpCuckooMap::slot_mut`] on the reference returned by `insert` or
/// `find`.
#[derive(Debug, Clone)]
pub struct KvSlot<K, V> {
    pair: Option<(K, V)>,
}

impl<K, V> Default for KvSlot<K, V> {
    fn default() -> Self {
        Self { pair: None }
    }
}

impl<K, V> KvSlot<K, V> {
    pub fn key(&self) -> Option<&K> {
        self.pair.as_ref().map(|(k, _)| k)
    }

    pub fn value(&self) -> Option<&V> {
        self.pair.as_ref().map(|(_, v)| v)
    }

    /// Mutable payload access. The key is deliberately not exposed
    /// mutably: rewriting it would break the slot's residence.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.pair.as_mut().map(|(_, v)| v)
    }
}

/// [`SlotOps`] over [`KvSlot`] for any build-hasher.
///
/// The per-index hash functions are derived from one build-hasher by
/// folding the function index into the hashed tuple, so the two functions
/// are independent streams of the same hasher.
#[derive(Debug, Clone, Default)]
pub struct KvOps<S = DefaultHashBuilder> {
    hasher: S,
}

impl KvOps {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: BuildHasher> KvOps<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }
}

impl<K, V, S> SlotOps<K, KvSlot<K, V>> for KvOps<S>
where
    K: Hash + Eq,
    V: Default,
    S: BuildHasher,
{
    const NUM_HASHES: usize = 2;
    const BUCKET_WIDTH: usize = 4;

    fn alloc(&self, n: usize) -> Vec<KvSlot<K, V>> {
        let mut slots = Vec::with_capacity(n);
        slots.resize_with(n, KvSlot::default);
        slots
    }

    fn free(&self, slots: Vec<KvSlot<K, V>>) {
        drop(slots);
    }

    fn hash_key(&self, i: usize, key: &K) -> u64 {
        self.hasher.hash_one((i as u64, key))
    }

    fn hash_slot(&self, i: usize, slot: &KvSlot<K, V>) -> u64 {
        // Only called on occupied slots.
        match &slot.pair {
            Some((key, _)) => self.hasher.hash_one((i as u64, key)),
            None => 0,
        }
    }

    fn equals(&self, _hash: u64, key: &K, slot: &KvSlot<K, V>) -> bool {
        slot.pair.as_ref().is_some_and(|(k, _)| k == key)
    }

    fn is_empty(&self, slot: &KvSlot<K, V>) -> bool {
        slot.pair.is_none()
    }

    fn init(&self, _i: usize, _hash: u64, key: K, slot: &mut KvSlot<K, V>) {
        slot.pair = Some((key, V::default()));
    }

    fn clear(&self, slot: &mut KvSlot<K, V>) {
        slot.pair = None;
    }
}

/// Cuckoo table over [`KvSlot`] entries with the default hashing ops.
pub type LpCuckooHashMap<K, V, S = DefaultHashBuilder> = LpCuckooMap<K, KvSlot<K, V>, KvOps<S>>;
