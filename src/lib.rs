//! lp-cuckoo-hashmap: a Lehman-Panigrahy cuckoo hash table.
//!
//! Two hash functions with short linear-probing runs ("buckets") at each
//! hash position reach load factors close to those of 3.5-way cuckoo
//! hashing at roughly the storage cost of 2-way (Lehman & Panigrahy,
//! "3.5-Way Cuckoo Hashing for the Price of 2-and-a-Bit", ESA 2009).
//! Insertion resolves collisions with the breadth-first relocation search
//! of Li et al., "Algorithmic Improvements for Fast Concurrent Cuckoo
//! Hashing" (EuroSys 2014), bounded so a saturated table reports a
//! structured failure instead of searching forever.
//!
//! The engine is generic over a [`SlotOps`] capability bundle that owns
//! slot layout, hashing, equality and allocation; [`KvOps`]/[`KvSlot`]
//! provide a ready-made instantiation for ordinary `Hash + Eq` keys, tied
//! together by the [`LpCuckooHashMap`] alias. Entries are addressed by
//! [`SlotRef`] coordinates, which carry no stability guarantee across
//! inserts that relocate entries.
//!
//! Single-writer: no internal synchronization; concurrent use requires
//! external synchronization.

mod kv;
mod ops;
mod scratch;
mod table;
mod table_proptest;

pub use kv::{KvOps, KvSlot, LpCuckooHashMap};
pub use ops::SlotOps;
pub use table::{InsertError, LpCuckooMap, SlotRef};
