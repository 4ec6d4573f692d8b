use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use decay_pool::{Builder, Dispose, Pool, PoolError};
use parking_lot::Mutex;

#[derive(Debug)]
struct Tracked {
    id: usize,
    disposed: Arc<Mutex<Vec<usize>>>,
}

impl Dispose for Tracked {
    fn dispose(self) {
        self.disposed.lock().push(self.id);
    }
}

async fn settle(duration: Duration) {
    tokio::time::advance(duration).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn dispose_releases_everything() {
    let disposed = Arc::new(Mutex::new(Vec::new()));
    let recycled = Arc::new(AtomicUsize::new(0));
    let counter = recycled.clone();
    let pool = Builder::<Tracked>::new()
        .recycler(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();
    for id in 0..3 {
        pool.give(Tracked {
            id,
            disposed: disposed.clone(),
        })
        .unwrap();
    }
    assert!(pool.has_pending_trim());

    pool.dispose();
    assert!(pool.is_disposed());
    assert_eq!(pool.count(), 0);
    assert_eq!(disposed.lock().len(), 3);
    assert_eq!(recycled.load(Ordering::SeqCst), 3);
    assert!(!pool.has_pending_trim());
}

#[tokio::test(start_paused = true)]
async fn disposed_pool_rejects_operations() {
    let pool = Builder::<u32>::new().generator(|| 1).build().unwrap();
    pool.give(0).unwrap();
    pool.dispose();

    assert_eq!(pool.give(2), Err(PoolError::Disposed));
    assert_eq!(pool.give_optional(None), Err(PoolError::Disposed));
    assert_eq!(pool.take(), Err(PoolError::Disposed));
    assert_eq!(pool.take_with(|| 3), Err(PoolError::Disposed));
    assert_eq!(pool.try_take(), Err(PoolError::Disposed));
    assert_eq!(pool.drain(), Err(PoolError::Disposed));
    assert_eq!(pool.rent(|_| ()), Err(PoolError::Disposed));
    assert!(pool.lease().is_err());
    assert_eq!(pool.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn dispose_is_idempotent() {
    let disposed = Arc::new(Mutex::new(Vec::new()));
    let pool = Pool::new(10).unwrap();
    pool.give(Tracked {
        id: 0,
        disposed: disposed.clone(),
    })
    .unwrap();

    pool.dispose();
    pool.dispose();
    assert!(pool.is_disposed());
    assert_eq!(*disposed.lock(), vec![0]);
}

#[tokio::test(start_paused = true)]
async fn pending_trim_never_fires_after_dispose() {
    let pool = Pool::<u32>::new(10).unwrap();
    for i in 0..10 {
        pool.give(i).unwrap();
    }
    pool.auto_trim(Duration::from_millis(100), Some(5));
    pool.dispose();

    settle(Duration::from_secs(10)).await;
    assert_eq!(pool.count(), 0);
    assert!(!pool.has_pending_trim());
}

#[tokio::test(start_paused = true)]
async fn auto_trim_on_disposed_pool_does_not_schedule() {
    let pool = Pool::<u32>::new(10).unwrap();
    pool.dispose();
    pool.auto_trim(Duration::from_secs(1), Some(5));
    assert!(!pool.has_pending_trim());
    pool.trim(Some(5));
    pool.clear();
    assert_eq!(pool.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn dispose_releases_generator_and_recycler() {
    let captured = Arc::new(());
    let in_generator = captured.clone();
    let in_recycler = captured.clone();
    let pool = Builder::<u32>::new()
        .generator(move || {
            let _ = &in_generator;
            0
        })
        .recycler(move |_| {
            let _ = &in_recycler;
        })
        .build()
        .unwrap();
    assert_eq!(Arc::strong_count(&captured), 3);

    pool.dispose();
    assert_eq!(Arc::strong_count(&captured), 1);
}

#[tokio::test(start_paused = true)]
async fn lease_outliving_dispose_is_dropped() {
    let disposed = Arc::new(Mutex::new(Vec::new()));
    let generated = disposed.clone();
    let pool = Builder::<Tracked>::new()
        .generator(move || Tracked {
            id: 7,
            disposed: generated.clone(),
        })
        .build()
        .unwrap();

    let entry = pool.lease().unwrap();
    pool.dispose();
    drop(entry);
    assert_eq!(pool.count(), 0);
    assert!(disposed.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_last_handle_disposes_items() {
    let disposed = Arc::new(Mutex::new(Vec::new()));
    let pool = Pool::new(10).unwrap();
    let other = pool.clone();
    for id in 0..2 {
        pool.give(Tracked {
            id,
            disposed: disposed.clone(),
        })
        .unwrap();
    }

    drop(pool);
    assert!(disposed.lock().is_empty());
    drop(other);
    assert_eq!(disposed.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_last_handle_skips_recycler() {
    let disposed = Arc::new(Mutex::new(Vec::new()));
    let recycled = Arc::new(AtomicUsize::new(0));
    let counter = recycled.clone();
    let pool = Builder::<Tracked>::new()
        .recycler(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();
    for id in 0..3 {
        pool.give(Tracked {
            id,
            disposed: disposed.clone(),
        })
        .unwrap();
    }
    assert_eq!(pool.recycle_len(), 3);

    drop(pool);
    assert_eq!(recycled.load(Ordering::SeqCst), 0);
    let mut ids = disposed.lock().clone();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2]);
}
