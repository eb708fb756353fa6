//! The table engine: slot storage, lookup, insertion with BFS-driven
//! eviction, and deletion.

use core::fmt;
use core::marker::PhantomData;
use core::mem;

use crate::ops::SlotOps;
use crate::scratch::{BfsNode, EvictScratch, ReentryFlag, NO_PARENT};

/// Target ratio of live entries to allocated slots.
const LOAD_FACTOR: f64 = 0.9;

/// Default cap on BFS frontier expansions before an insert reports
/// [`InsertError::TableFull`].
const MAX_BFS_ROUNDS: usize = 100;

/// A reference to one slot, identified by `(table, index)`.
///
/// References are plain coordinates: copying them is free, and two
/// references are equal iff they name the same slot. They carry no
/// stability guarantee — an `insert` that triggers eviction may relocate
/// the entry a reference points to. Dereference through
/// [`LpCuckooMap::slot`] / [`LpCuckooMap::slot_mut`], which return `None`
/// for empty slots and for the end reference.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SlotRef {
    table: usize,
    index: usize,
}

impl SlotRef {
    /// Which of the parallel tables the slot lives in.
    pub fn table(&self) -> usize {
        self.table
    }

    /// Index of the slot within its table.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Failure reported by [`LpCuckooMap::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// The eviction search exhausted its round budget without finding a
    /// relocation chain. The table is unchanged; callers can rehash into
    /// a larger table.
    TableFull,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::TableFull => f.write_str("table full: eviction search exhausted"),
        }
    }
}

impl std::error::Error for InsertError {}

/// Lehman-Panigrahy cuckoo hash table.
///
/// `O::NUM_HASHES` parallel slot arrays; a key may live in any of its
/// `NUM_HASHES` home buckets, each a run of `O::BUCKET_WIDTH` contiguous
/// slots starting at the key's hash position in that table. Collisions are
/// resolved by relocating resident entries along a shortest eviction chain
/// found by breadth-first search.
///
/// Single-writer: the map performs no internal synchronization and relies
/// on external synchronization for any concurrent use.
pub struct LpCuckooMap<K, V, O: SlotOps<K, V>> {
    ops: O,
    /// One array per hash function, each `buckets_per_table +
    /// BUCKET_WIDTH` slots long so buckets never wrap (overflow-tail
    /// probing: bucket bases range over `[0, buckets_per_table)`).
    tables: Vec<Vec<V>>,
    buckets_per_table: usize,
    capacity: usize,
    len: usize,
    max_bfs_rounds: usize,
    scratch: EvictScratch,
    guard: ReentryFlag,
    _key: PhantomData<fn(K)>,
}

impl<K, V, O: SlotOps<K, V>> LpCuckooMap<K, V, O> {
    /// Create a table sized for at most `capacity` entries.
    ///
    /// Behavior when more than `capacity` entries are stored is not
    /// specified beyond the bounded-failure contract of
    /// [`insert`](Self::insert).
    pub fn new(capacity: usize, ops: O) -> Self {
        Self::with_search_budget(capacity, ops, MAX_BFS_ROUNDS)
    }

    /// Like [`new`](Self::new), with an explicit cap on BFS rounds per
    /// insert. Larger budgets tolerate higher loads at the cost of a
    /// longer worst-case insert.
    pub fn with_search_budget(capacity: usize, ops: O, max_bfs_rounds: usize) -> Self {
        assert!(O::NUM_HASHES >= 2, "SlotOps::NUM_HASHES must be at least 2");
        assert!(
            O::BUCKET_WIDTH >= 1,
            "SlotOps::BUCKET_WIDTH must be at least 1"
        );
        assert!(max_bfs_rounds >= 1, "search budget must be at least 1");

        let slots_needed = (capacity as f64 / LOAD_FACTOR).ceil() as usize;
        let buckets_per_table = slots_needed.div_ceil(O::NUM_HASHES).max(1);
        let tables = (0..O::NUM_HASHES)
            .map(|_| {
                let table = ops.alloc(buckets_per_table + O::BUCKET_WIDTH);
                debug_assert_eq!(table.len(), buckets_per_table + O::BUCKET_WIDTH);
                table
            })
            .collect();

        Self {
            ops,
            tables,
            buckets_per_table,
            capacity,
            len: 0,
            max_bfs_rounds,
            scratch: EvictScratch::new(),
            guard: ReentryFlag::new(),
            _key: PhantomData,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The entry count this table was sized for.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bucket base positions per table.
    pub fn buckets_per_table(&self) -> usize {
        self.buckets_per_table
    }

    /// Reference to the first slot coordinate. Not necessarily occupied;
    /// use [`iter`](Self::iter) to visit entries.
    pub fn begin(&self) -> SlotRef {
        SlotRef { table: 0, index: 0 }
    }

    /// The one-past-the-last reference; returned by
    /// [`find`](Self::find) when the key is absent.
    pub fn end(&self) -> SlotRef {
        SlotRef {
            table: O::NUM_HASHES,
            index: 0,
        }
    }

    /// Look up `key`, returning a reference to its slot or
    /// [`end`](Self::end) when absent.
    ///
    /// Scans the full `BUCKET_WIDTH`-wide bucket at every hash position;
    /// empty slots inside a bucket do not terminate the scan, since an
    /// earlier eviction may have placed the key further along.
    pub fn find(&self, key: &K) -> SlotRef {
        let _g = self.guard.enter();
        for table in 0..O::NUM_HASHES {
            let hash = self.ops.hash_key(table, key);
            let base = self.bucket_base(hash);
            for index in base..base + O::BUCKET_WIDTH {
                if self.ops.equals(hash, key, &self.tables[table][index]) {
                    return SlotRef { table, index };
                }
            }
        }
        self.end()
    }

    /// Insert `key`, returning its slot reference and whether a new entry
    /// was placed. `(r, false)` means the key was already present at `r`.
    ///
    /// When both home buckets are full, a breadth-first search over
    /// candidate evictions finds a shortest chain of relocations ending in
    /// an empty slot; the chain is applied with pairwise swaps and the key
    /// is placed in the vacated home-bucket slot. The search is bounded:
    /// after the configured round budget the insert fails with
    /// [`InsertError::TableFull`], leaving the table unchanged.
    pub fn insert(&mut self, key: K) -> Result<(SlotRef, bool), InsertError> {
        let _g = self.guard.enter();
        let Self {
            ops,
            tables,
            buckets_per_table,
            len,
            max_bfs_rounds,
            scratch,
            ..
        } = self;
        let buckets = *buckets_per_table;

        // Phase 1: scan every slot of every home bucket. The duplicate
        // check must complete before any placement, and the first empty
        // slot encountered is remembered as the fast-path candidate.
        scratch.hashes.clear();
        let mut candidate: Option<SlotRef> = None;
        for table in 0..O::NUM_HASHES {
            let hash = ops.hash_key(table, &key);
            scratch.hashes.push(hash);
            let base = (hash % buckets as u64) as usize;
            for index in base..base + O::BUCKET_WIDTH {
                let slot = &tables[table][index];
                if ops.equals(hash, &key, slot) {
                    return Ok((SlotRef { table, index }, false));
                }
                if candidate.is_none() && ops.is_empty(slot) {
                    candidate = Some(SlotRef { table, index });
                }
            }
        }

        if let Some(at) = candidate {
            ops.init(
                at.table,
                scratch.hashes[at.table],
                key,
                &mut tables[at.table][at.index],
            );
            *len += 1;
            return Ok((at, true));
        }

        // Phase 2: both home buckets are full. BFS over prospective
        // evictions, seeded with every home-bucket slot; the first empty
        // slot reached yields a shortest relocation chain.
        scratch.queue.clear();
        for table in 0..O::NUM_HASHES {
            let base = (scratch.hashes[table] % buckets as u64) as usize;
            for index in base..base + O::BUCKET_WIDTH {
                scratch.queue.push(BfsNode {
                    parent: NO_PARENT,
                    table,
                    index,
                });
            }
        }

        let mut qi = 0;
        for _ in 0..*max_bfs_rounds {
            // Prospective entry to evict. Always occupied: seeds were
            // scanned in phase 1 and later nodes are enqueued only when
            // their slot is non-empty.
            let node = scratch.queue[qi];
            for alt in 0..O::NUM_HASHES {
                if alt == node.table {
                    continue;
                }
                let hash = ops.hash_slot(alt, &tables[node.table][node.index]);
                let base = (hash % buckets as u64) as usize;
                for index in base..base + O::BUCKET_WIDTH {
                    let next = BfsNode {
                        parent: qi,
                        table: alt,
                        index,
                    };
                    if ops.is_empty(&tables[alt][index]) {
                        let vacated = evict_chain(tables, scratch, ops, next);
                        let at = SlotRef {
                            table: vacated.table,
                            index: vacated.index,
                        };
                        ops.init(
                            at.table,
                            scratch.hashes[at.table],
                            key,
                            &mut tables[at.table][at.index],
                        );
                        *len += 1;
                        return Ok((at, true));
                    }
                    scratch.queue.push(next);
                }
            }
            qi += 1;
        }

        Err(InsertError::TableFull)
    }

    /// Clear the slot `at` points to. A no-op for the end reference and
    /// for slots that are already empty, so `erase(find(k))` is total.
    pub fn erase(&mut self, at: SlotRef) {
        let _g = self.guard.enter();
        if at.table >= O::NUM_HASHES {
            return;
        }
        let slot = &mut self.tables[at.table][at.index];
        if !self.ops.is_empty(slot) {
            self.ops.clear(slot);
            self.len -= 1;
        }
    }

    /// Borrow the occupied slot `at` points to, or `None` for the end
    /// reference and empty slots.
    pub fn slot(&self, at: SlotRef) -> Option<&V> {
        let _g = self.guard.enter();
        if at.table >= O::NUM_HASHES {
            return None;
        }
        let slot = &self.tables[at.table][at.index];
        (!self.ops.is_empty(slot)).then_some(slot)
    }

    /// Mutably borrow the occupied slot `at` points to.
    ///
    /// The borrow is of the slot value itself; mutations must preserve the
    /// `SlotOps` contract (in particular the stored key and its hashes).
    pub fn slot_mut(&mut self, at: SlotRef) -> Option<&mut V> {
        let _g = self.guard.enter();
        if at.table >= O::NUM_HASHES {
            return None;
        }
        let slot = &mut self.tables[at.table][at.index];
        if self.ops.is_empty(slot) {
            return None;
        }
        Some(slot)
    }

    /// Iterate over every occupied slot, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotRef, &V)> + '_ {
        self.tables.iter().enumerate().flat_map(move |(table, slots)| {
            slots.iter().enumerate().filter_map(move |(index, slot)| {
                (!self.ops.is_empty(slot)).then_some((SlotRef { table, index }, slot))
            })
        })
    }

    /// Shared access to the ops bundle, e.g. for rehashing slot contents
    /// in invariant checks.
    pub fn ops(&self) -> &O {
        &self.ops
    }

    fn bucket_base(&self, hash: u64) -> usize {
        (hash % self.buckets_per_table as u64) as usize
    }
}

impl<K, V, O: SlotOps<K, V>> Drop for LpCuckooMap<K, V, O> {
    fn drop(&mut self) {
        for table in self.tables.drain(..) {
            self.ops.free(table);
        }
    }
}

/// Apply the relocation chain ending at `tail`, whose slot is empty.
///
/// The chain is rebuilt from `tail` back to its root seed via parent
/// links, then the empty slot is bubbled root-ward with pairwise swaps.
/// Returns the vacated root coordinate, a slot inside one of the inserted
/// key's home buckets. Every relocated entry lands in an alternate home
/// bucket of its own (that is how its node was discovered), preserving
/// residence.
///
/// The asserts here are engine invariants, not input validation; a failure
/// means the search produced an inconsistent chain.
fn evict_chain<K, V, O: SlotOps<K, V>>(
    tables: &mut [Vec<V>],
    scratch: &mut EvictScratch,
    ops: &O,
    tail: BfsNode,
) -> BfsNode {
    scratch.chain.clear();
    scratch.chain.push(tail);
    let mut node = tail;
    while node.parent != NO_PARENT {
        assert!(
            node.parent < scratch.queue.len(),
            "eviction parent link out of queue range"
        );
        node = scratch.queue[node.parent];
        scratch.chain.push(node);
    }
    assert!(
        scratch.chain.len() >= 2,
        "eviction chain must span at least two slots"
    );

    for i in 0..scratch.chain.len() - 1 {
        let a = scratch.chain[i];
        let b = scratch.chain[i + 1];
        swap_slots(tables, (a.table, a.index), (b.table, b.index));
    }

    let vacated = scratch.chain[scratch.chain.len() - 1];
    assert!(
        ops.is_empty(&tables[vacated.table][vacated.index]),
        "vacated slot still occupied after eviction"
    );
    vacated
}

fn swap_slots<V>(tables: &mut [Vec<V>], a: (usize, usize), b: (usize, usize)) {
    if a.0 == b.0 {
        tables[a.0].swap(a.1, b.1);
    } else {
        let (lo, hi) = if a.0 < b.0 { (a, b) } else { (b, a) };
        let (head, tail) = tables.split_at_mut(hi.0);
        mem::swap(&mut head[lo.0][lo.1], &mut tail[0][hi.1]);
    }
}
