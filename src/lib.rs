//! An object pool that trims itself back toward a soft ceiling.
//!
//! # Features
//!
//! - Optional generator to construct items when the pool is empty, and
//!   optional recycler to reset returned items before they are reused.
//! - Most recently returned items are reused first.
//! - Automatic, debounced trimming: every return schedules a trim, and each
//!   trim schedules the next, so a burst of returned items decays away
//!   instead of pinning memory.
//! - Hard ceiling of [`ABSOLUTE_MAX_SIZE`] items: entries beyond it are
//!   discarded on return.
//! - Items leaving the pool are released through the [`Dispose`] trait.
//!
//! # Decay
//!
//! A trim without an explicit target keeps `min(max_size, len / 2 - 1)`
//! items. Idle items therefore shrink geometrically, one trim per
//! [`DEFAULT_TRIM_DELAY`], until the pool is empty.
//!
//! # Runtime
//!
//! Deferred trims run as tasks on a tokio runtime. The pool captures the
//! current runtime when it is built, or the one given to
//! [`Builder::runtime`].
//!
//! # Examples
//!
//! ```rust
//! use decay_pool::{Builder, PoolError};
//! use std::time::Duration;
//!
//! let rt = tokio::runtime::Builder::new_current_thread()
//!     .enable_time()
//!     .start_paused(true)
//!     .build()
//!     .unwrap();
//!
//! rt.block_on(async {
//!     let pool = Builder::<Vec<u8>>::new()
//!         .max_size(4)
//!         .generator(|| Vec::with_capacity(1024))
//!         .build()
//!         .unwrap();
//!
//!     for _ in 0..8 {
//!         pool.give(Vec::with_capacity(1024)).unwrap();
//!     }
//!     assert_eq!(pool.count(), 8);
//!
//!     pool.trim(Some(4));
//!     assert_eq!(pool.count(), 4);
//!
//!     // Later trims decay the rest.
//!     tokio::time::sleep(Duration::from_secs(10)).await;
//!     assert_eq!(pool.count(), 0);
//!
//!     pool.dispose();
//!     assert_eq!(pool.take(), Err(PoolError::Disposed));
//! });
//! ```

mod builder;
mod dispose;
mod entry;
mod error;
mod pool;
mod trim;

pub use builder::Builder;
pub use dispose::Dispose;
pub use entry::Entry;
pub use error::{PoolError, Result};
pub use pool::{
    ABSOLUTE_MAX_SIZE, Config, DEFAULT_MAX_SIZE, DEFAULT_TRIM_DELAY, Generator, Pool, Recycler,
};
