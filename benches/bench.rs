use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use decay_pool::Builder;

const OBJECT_SIZE: usize = 64 * 1024;

fn allocate() -> Vec<u8> {
    Vec::with_capacity(OBJECT_SIZE)
}

fn take_give(c: &mut Criterion) {
    // Worker threads reap the superseded trim tasks.
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("decay_pool", |b| {
        let pool = Builder::<Vec<u8>>::new()
            .generator(allocate)
            .runtime(rt.handle().clone())
            .build()
            .unwrap();
        b.iter(|| {
            let obj = black_box(pool.take().unwrap());
            black_box(obj.capacity());
            pool.give(obj).unwrap();
        })
    });

    c.bench_function("decay_pool_recycled", |b| {
        let pool = Builder::<Vec<u8>>::new()
            .generator(allocate)
            .recycler(Vec::clear)
            .runtime(rt.handle().clone())
            .build()
            .unwrap();
        b.iter(|| {
            let obj = black_box(pool.take().unwrap());
            black_box(obj.capacity());
            pool.give(obj).unwrap();
        })
    });

    c.bench_function("decay_pool_rent", |b| {
        let pool = Builder::<Vec<u8>>::new()
            .generator(allocate)
            .runtime(rt.handle().clone())
            .build()
            .unwrap();
        b.iter(|| pool.rent(|obj| black_box(obj.capacity())).unwrap())
    });

    c.bench_function("system", |b| {
        b.iter(|| {
            let obj = black_box(allocate());
            black_box(obj.capacity())
        })
    });
}

criterion_group!(benches, take_give);
criterion_main!(benches);
