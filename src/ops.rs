//! The capability bundle the table engine is parameterized over.
//!
//! The engine never inspects a slot directly: storage, hashing, equality
//! and the empty/occupied distinction all go through a [`SlotOps`]
//! implementation. This keeps the engine usable with inline slots of any
//! shape (a key plus payload, a packed record that can rehash itself, an
//! instrumented test slot) without imposing trait bounds on the slot type
//! itself.

/// Operations on keys and slots consumed by
/// [`LpCuckooMap`](crate::LpCuckooMap).
///
/// A slot is either *empty* or *occupied*. Occupied slots store enough to
/// recover their key's hashes: for any occupied slot `s` holding key `k`,
/// `hash_slot(i, s) == hash_key(i, k)` must hold for every function index
/// `i`. Freshly allocated slots must all be empty.
pub trait SlotOps<K, V> {
    /// Number of hash functions, and therefore of parallel slot arrays.
    /// Must be at least 2.
    const NUM_HASHES: usize;

    /// Number of contiguous slots probed at each hash position. Must be at
    /// least 1; 2 to 4 is typical.
    const BUCKET_WIDTH: usize;

    /// Produce a slot array of length `n` with every element empty.
    ///
    /// The engine calls this once per table at construction and returns
    /// every array through [`free`](Self::free) on drop, so instrumented
    /// implementations can balance the two.
    fn alloc(&self, n: usize) -> Vec<V>;

    /// Release an array previously produced by [`alloc`](Self::alloc).
    fn free(&self, slots: Vec<V>);

    /// Hash `key` under function index `i` (`0 <= i < NUM_HASHES`).
    ///
    /// The functions must be deterministic and of good quality; probe
    /// distribution, and with it the achievable load factor, is only as
    /// good as the hashes.
    fn hash_key(&self, i: usize, key: &K) -> u64;

    /// Hash the key stored in an occupied `slot` under function index `i`.
    ///
    /// Only called on occupied slots. Must agree with
    /// [`hash_key`](Self::hash_key) on the stored key.
    fn hash_slot(&self, i: usize, slot: &V) -> u64;

    /// True iff `slot` is occupied and stores `key`. `hash` is the
    /// precomputed `hash_key` value for the slot's table, passed as a
    /// shortcut; implementations may ignore it.
    fn equals(&self, hash: u64, key: &K, slot: &V) -> bool;

    /// True iff `slot` is in the empty state.
    fn is_empty(&self, slot: &V) -> bool;

    /// Write `key` into `slot`, which the engine guarantees is empty.
    /// `i` is the table the slot lives in and `hash` its precomputed
    /// `hash_key(i, key)`. Post-condition: `!is_empty(slot)`.
    fn init(&self, i: usize, hash: u64, key: K, slot: &mut V);

    /// Return `slot` to the empty state. Post-condition: `is_empty(slot)`.
    fn clear(&self, slot: &mut V);
}
