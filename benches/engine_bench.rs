use criterion::async_executor::FuturesExecutor;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use kvs_redis::{Bincode, KvStore, MemoryKvsEngine};
use rand::prelude::*;

fn set_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_bench");
    group.bench_function("json", |b| {
        b.to_async(FuturesExecutor).iter_batched(
            || KvStore::new(MemoryKvsEngine::new()),
            |store| async move {
                for i in 1..(1 << 12) {
                    store.set(&format!("key{}", i), "value").await.unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("bincode", |b| {
        b.to_async(FuturesExecutor).iter_batched(
            || KvStore::with_codec(MemoryKvsEngine::new(), Bincode),
            |store| async move {
                for i in 1..(1 << 12) {
                    store.set(&format!("key{}", i), "value").await.unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn get_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_bench");
    for i in &vec![8, 12, 16] {
        group.bench_with_input(format!("json_{}", i), i, |b, i| {
            let store = KvStore::new(MemoryKvsEngine::new());
            futures::executor::block_on(async {
                for key_i in 1..(1 << i) {
                    store
                        .set(&format!("key{}", key_i), "value")
                        .await
                        .unwrap();
                }
            });
            let mut rng = SmallRng::from_seed([0; 32]);
            b.to_async(FuturesExecutor).iter(|| {
                let key = format!("key{}", rng.gen_range(1..(1 << i)));
                let store = &store;
                async move {
                    store.get::<String>(&key).await.unwrap();
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, set_bench, get_bench);
criterion_main!(benches);
