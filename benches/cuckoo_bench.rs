use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use lp_cuckoo_hashmap::{KvOps, LpCuckooHashMap};
use rand_core::{RngCore, SeedableRng};
use rand_pcg::Lcg128Xsl64 as Pcg;

const LOAD_KEYS: usize = 100_000;
const CAPACITY: usize = 120_000;

fn keys(seed: u64, n: usize) -> Vec<u64> {
    let mut rng = Pcg::seed_from_u64(seed);
    (0..n).map(|_| rng.next_u64()).collect()
}

fn populated(seed: u64) -> (LpCuckooHashMap<u64, u64>, Vec<u64>) {
    let mut m = LpCuckooHashMap::new(CAPACITY, KvOps::new());
    let keys = keys(seed, LOAD_KEYS);
    for (i, &k) in keys.iter().enumerate() {
        let (at, _) = m.insert(k).unwrap();
        *m.slot_mut(at).unwrap().value_mut().unwrap() = i as u64;
    }
    (m, keys)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("cuckoo::insert");
    group.throughput(Throughput::Elements(LOAD_KEYS as u64));
    group.bench_function("fresh_100k", |b| {
        b.iter_batched(
            || keys(1, LOAD_KEYS),
            |keys| {
                let mut m = LpCuckooHashMap::<u64, u64>::new(CAPACITY, KvOps::new());
                for k in keys {
                    let _ = m.insert(k).unwrap();
                }
                black_box(m.len())
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("cuckoo::query");
    group.throughput(Throughput::Elements(10_000));
    // hit
    group.bench_function("hit_10k_on_100k", |b| {
        let (m, keys) = populated(7);
        let mut sel = Pcg::seed_from_u64(0x9e37_79b9_7f4a_7c15);
        let queries: Vec<u64> = (0..10_000)
            .map(|_| keys[(sel.next_u64() as usize) % keys.len()])
            .collect();
        b.iter(|| {
            for k in &queries {
                black_box(m.find(k));
            }
        })
    });
    // miss
    group.bench_function("miss_10k_on_100k", |b| {
        let (m, _keys) = populated(11);
        b.iter(|| {
            let mut miss = Pcg::seed_from_u64(0xdead_beef);
            for _ in 0..10_000 {
                let k = miss.next_u64();
                black_box(m.find(&k));
            }
        })
    });
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("cuckoo::churn");
    group.throughput(Throughput::Elements(10_000));
    // Erase 10k random entries, then insert 10k fresh keys into the gaps.
    group.bench_function("erase_reinsert_10k_of_100k", |b| {
        b.iter_batched(
            || {
                let (m, keys) = populated(5);
                let mut sel = Pcg::seed_from_u64(0x5eed);
                let victims: Vec<u64> = (0..10_000)
                    .map(|_| keys[(sel.next_u64() as usize) % keys.len()])
                    .collect();
                let fresh = keys(99, 10_000);
                (m, victims, fresh)
            },
            |(mut m, victims, fresh)| {
                for k in &victims {
                    m.erase(m.find(k));
                }
                for k in fresh {
                    let _ = m.insert(k).unwrap();
                }
                black_box(m.len())
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = bench_insert, bench_query, bench_churn
}
criterion_main!(benches);
