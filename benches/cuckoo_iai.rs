#[cfg(target_os = "linux")]
mod bench {
    use iai::black_box;
    use lp_cuckoo_hashmap::{KvOps, LpCuckooHashMap};
    use std::cell::RefCell;
    use std::thread_local;

    const OPS: usize = 1_000;
    const CAPACITY: usize = 2_000;

    fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
        std::iter::from_fn(move || {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            Some(s)
        })
    }

    // Thread-local single-run setup to avoid measuring initialization.
    thread_local! {
        static HIT_MAP: RefCell<Option<LpCuckooHashMap<u64, u64>>> = RefCell::new(None);
        static HIT_KEYS: RefCell<Option<Vec<u64>>> = RefCell::new(None);

        static MISS_MAP: RefCell<Option<LpCuckooHashMap<u64, u64>>> = RefCell::new(None);
    }

    fn ensure_hit_setup() {
        HIT_MAP.with(|m_cell| {
            HIT_KEYS.with(|k_cell| {
                if m_cell.borrow().is_some() {
                    return;
                }
                let mut m = LpCuckooHashMap::new(CAPACITY, KvOps::new());
                let keys: Vec<u64> = lcg(7).take(OPS).collect();
                for &k in &keys {
                    let _ = m.insert(k).unwrap();
                }
                *m_cell.borrow_mut() = Some(m);
                *k_cell.borrow_mut() = Some(keys);
            })
        });
    }

    fn ensure_miss_setup() {
        MISS_MAP.with(|c| {
            if c.borrow().is_some() {
                return;
            }
            let mut m = LpCuckooHashMap::new(CAPACITY, KvOps::new());
            for k in lcg(11).take(OPS) {
                let _ = m.insert(k).unwrap();
            }
            *c.borrow_mut() = Some(m);
        });
    }

    pub fn cuckoo_insert_1000_ops() {
        let mut m = LpCuckooHashMap::<u64, u64>::new(CAPACITY, KvOps::new());
        for k in lcg(1).take(OPS) {
            let _ = m.insert(k).unwrap();
        }
        black_box(m.len());
    }

    pub fn cuckoo_find_hit_1000_ops() {
        ensure_hit_setup();
        HIT_MAP.with(|m_cell| {
            HIT_KEYS.with(|k_cell| {
                let m_b = m_cell.borrow();
                let m = m_b.as_ref().unwrap();
                let k_b = k_cell.borrow();
                for k in k_b.as_ref().unwrap() {
                    black_box(m.find(k));
                }
            })
        });
    }

    pub fn cuckoo_find_miss_1000_ops() {
        ensure_miss_setup();
        MISS_MAP.with(|m_cell| {
            let m_b = m_cell.borrow();
            let m = m_b.as_ref().unwrap();
            for k in lcg(0xdead_beef).take(OPS) {
                black_box(m.find(&k));
            }
        });
    }

    pub fn cuckoo_erase_reinsert_1000_ops() {
        let mut m = LpCuckooHashMap::<u64, u64>::new(CAPACITY, KvOps::new());
        let keys: Vec<u64> = lcg(3).take(OPS).collect();
        for &k in &keys {
            let _ = m.insert(k).unwrap();
        }
        for &k in &keys {
            m.erase(m.find(&k));
            let _ = m.insert(k.wrapping_add(1)).unwrap();
        }
        black_box(m.len());
    }
}

#[cfg(target_os = "linux")]
use bench::{
    cuckoo_erase_reinsert_1000_ops, cuckoo_find_hit_1000_ops, cuckoo_find_miss_1000_ops,
    cuckoo_insert_1000_ops,
};

#[cfg(target_os = "linux")]
iai::main!(
    cuckoo_insert_1000_ops,
    cuckoo_find_hit_1000_ops,
    cuckoo_find_miss_1000_ops,
    cuckoo_erase_reinsert_1000_ops
);

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("Skipping: iai benches require Linux/valgrind.");
}
