use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::dispose::dispose_all;
use crate::trim::TrimTimer;
use crate::{Dispose, Entry, PoolError, Result};

/// Hard upper bound for `max_size`, and for the length of either internal
/// sequence. Entries given past it are discarded.
pub const ABSOLUTE_MAX_SIZE: usize = 65536;

/// Soft ceiling used when none is configured.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Delay of the automatic trims scheduled by [`Pool::give`] and by [`Pool::trim`].
pub const DEFAULT_TRIM_DELAY: Duration = Duration::from_millis(1000);

/// Produces a fresh item when the pool has none to hand out.
pub type Generator<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Resets an item in place before it is handed out again.
pub type Recycler<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// An object pool that trims itself back toward a soft ceiling.
///
/// Items handed back with [`give`](Self::give) land in the ready pool, or in
/// the recycle queue when a recycler is configured. [`take`](Self::take)
/// prefers the most recently returned ready item, then recycles one queued
/// item, then constructs a new one.
///
/// Every `give` schedules a deferred trim. Each trim that does not empty the
/// pool schedules the next one, and without an explicit target each trim
/// roughly halves what is left, so idle items decay away after a burst.
///
/// `Pool` is a cheap handle: clones share the same items. Deferred trims run
/// as tasks on the tokio runtime captured when the pool was built.
///
/// The recycler runs while the pool is locked and must not call back into
/// the same pool. A panic in the recycler or generator propagates to the
/// caller; the pool stays usable, minus the item being recycled.
///
/// [`dispose`](Self::dispose) recycles queued items before disposing them.
/// Dropping the last handle without disposing does not: leftover items,
/// queued or ready, are disposed as they are, and the recycler never runs
/// during drop.
///
/// # Examples
///
/// ```rust
/// use decay_pool::Builder;
///
/// let rt = tokio::runtime::Builder::new_current_thread()
///     .enable_time()
///     .build()
///     .unwrap();
///
/// let pool = Builder::<String>::new()
///     .max_size(10)
///     .generator(String::new)
///     .recycler(String::clear)
///     .runtime(rt.handle().clone())
///     .build()
///     .unwrap();
///
/// let mut s = pool.take().unwrap();
/// s.push_str("Hello, World!");
/// pool.give(s).unwrap();
/// assert_eq!(pool.count(), 1);
///
/// let s = pool.take().unwrap();
/// assert_eq!(s, "");
/// assert_eq!(pool.count(), 0);
/// ```
pub struct Pool<T: Dispose> {
    inner: Arc<Shared<T>>,
}

struct Shared<T: Dispose> {
    max_size: usize,
    trim_delay: Duration,
    runtime: Handle,
    state: Mutex<State<T>>,
}

struct State<T> {
    /// Items ready for reuse. The most recently returned one is last.
    ready: Vec<T>,
    /// Items waiting for the recycler. `None` when no recycler is configured.
    recycle: Option<VecDeque<T>>,
    generator: Option<Generator<T>>,
    recycler: Option<Recycler<T>>,
    timer: TrimTimer,
    disposed: bool,
}

impl<T: Dispose> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Dispose> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Pool")
            .field("max_size", &self.inner.max_size)
            .field("ready", &state.ready.len())
            .field("recycle", &state.recycle.as_ref().map(VecDeque::len))
            .field("pending_trim", &state.timer.is_pending())
            .field("disposed", &state.disposed)
            .finish()
    }
}

impl<T: Dispose> Drop for Shared<T> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.timer.cancel();
        let mut items = mem::take(&mut state.ready);
        if let Some(queue) = state.recycle.take() {
            items.extend(queue);
        }
        dispose_all(items);
    }
}

impl<T: Dispose + Send + 'static> Pool<T> {
    /// Create a pool with the given soft ceiling and no generator or recycler.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Example
    ///
    /// ```rust
    /// use decay_pool::{Pool, PoolError};
    ///
    /// let rt = tokio::runtime::Builder::new_current_thread()
    ///     .enable_time()
    ///     .build()
    ///     .unwrap();
    /// let _guard = rt.enter();
    ///
    /// let pool: Pool<Vec<u8>> = Pool::new(5).unwrap();
    /// assert_eq!(pool.max_size(), 5);
    /// assert!(matches!(
    ///     Pool::<Vec<u8>>::new(0),
    ///     Err(PoolError::InvalidConfiguration { max_size: 0 })
    /// ));
    /// ```
    pub fn new(max_size: usize) -> Result<Self> {
        Self::with_config(Config {
            max_size,
            ..Default::default()
        })
    }

    /// Create a pool with the given configuration.
    ///
    /// Fails with [`PoolError::InvalidConfiguration`] when `max_size` is out of
    /// range, and with [`PoolError::NoRuntime`] when no runtime is configured
    /// and none is current.
    pub fn with_config(config: Config<T>) -> Result<Self> {
        config.validate()?;
        let runtime = match config.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| PoolError::NoRuntime)?,
        };
        let recycle = config.recycler.as_ref().map(|_| VecDeque::new());
        Ok(Self {
            inner: Arc::new(Shared {
                max_size: config.max_size,
                trim_delay: config.trim_delay,
                runtime,
                state: Mutex::new(State {
                    ready: Vec::new(),
                    recycle,
                    generator: config.generator,
                    recycler: config.recycler,
                    timer: TrimTimer::default(),
                    disposed: false,
                }),
            }),
        })
    }

    /// Get the soft ceiling the pool trims toward.
    pub fn max_size(&self) -> usize {
        self.inner.max_size
    }

    /// Get the number of items held, ready or waiting for recycling.
    pub fn count(&self) -> usize {
        self.inner.state.lock().count()
    }

    /// Check if the pool holds no items.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Get the number of items ready for reuse without recycling.
    pub fn ready_len(&self) -> usize {
        self.inner.state.lock().ready.len()
    }

    /// Get the number of items waiting for the recycler.
    pub fn recycle_len(&self) -> usize {
        self.inner.state.lock().recycle_len()
    }

    /// Check if a deferred trim is scheduled.
    pub fn has_pending_trim(&self) -> bool {
        self.inner.state.lock().timer.is_pending()
    }

    /// Check if the pool has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }

    /// Hand an item back to the pool.
    ///
    /// The item is queued for recycling when a recycler is configured,
    /// otherwise it is ready for reuse right away. If the destination already
    /// holds [`ABSOLUTE_MAX_SIZE`] items the entry is recycled (if possible)
    /// and then disposed instead of stored.
    ///
    /// Afterwards a trim is scheduled: immediately if items are waiting for
    /// recycling, otherwise after the configured trim delay.
    pub fn give(&self, entry: T) -> Result<()> {
        let shared = &self.inner;
        let mut state = shared.state.lock();
        state.ensure_active()?;
        let discarded = state.store(entry);
        let (delay, max) = if state.recycle_len() > 0 {
            (Duration::ZERO, Some(shared.max_size))
        } else {
            (shared.trim_delay, None)
        };
        shared.schedule_locked(&mut state, delay, max);
        drop(state);

        if let Some(entry) = discarded {
            tracing::warn!(
                limit = ABSOLUTE_MAX_SIZE,
                "pool is at its absolute ceiling, entry discarded"
            );
            entry.dispose();
        }
        Ok(())
    }

    /// Hand back an item that may be missing.
    ///
    /// `None` is not an error: it is logged and otherwise ignored.
    pub fn give_optional(&self, entry: Option<T>) -> Result<()> {
        match entry {
            Some(entry) => self.give(entry),
            None => {
                self.inner.state.lock().ensure_active()?;
                tracing::warn!("no entry given back to the pool");
                Ok(())
            }
        }
    }

    /// Take an item if one is held. Return `None` if the pool is empty.
    ///
    /// A ready item is preferred. Otherwise one item waiting for recycling is
    /// recycled and returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use decay_pool::Pool;
    ///
    /// let rt = tokio::runtime::Builder::new_current_thread()
    ///     .enable_time()
    ///     .build()
    ///     .unwrap();
    /// let _guard = rt.enter();
    ///
    /// let pool: Pool<u32> = Pool::new(4).unwrap();
    /// assert_eq!(pool.try_take().unwrap(), None);
    /// pool.give(0).unwrap();
    /// assert_eq!(pool.try_take().unwrap(), Some(0));
    /// ```
    pub fn try_take(&self) -> Result<Option<T>> {
        let mut state = self.inner.state.lock();
        state.ensure_active()?;
        Ok(state.pop())
    }

    /// Take an item, falling back to the configured generator when the pool
    /// is empty.
    ///
    /// Fails with [`PoolError::NoFactoryAvailable`] if the pool is empty and
    /// no generator is configured.
    pub fn take(&self) -> Result<T> {
        let generator = {
            let mut state = self.inner.state.lock();
            state.ensure_active()?;
            if let Some(item) = state.pop() {
                return Ok(item);
            }
            state.generator.clone()
        };
        generator
            .map(|generator| generator())
            .ok_or(PoolError::NoFactoryAvailable)
    }

    /// Take an item, falling back to `factory` when the pool is empty.
    ///
    /// The configured generator is not consulted.
    pub fn take_with<F>(&self, factory: F) -> Result<T>
    where
        F: FnOnce() -> T,
    {
        match self.try_take()? {
            Some(item) => Ok(item),
            None => Ok(factory()),
        }
    }

    /// Take an item wrapped in an [`Entry`] that gives it back when dropped.
    pub fn lease(&self) -> Result<Entry<'_, T>> {
        self.take().map(|item| Entry::new(item, self))
    }

    /// Run `func` with a taken item and give the item back afterwards, also
    /// when `func` panics.
    ///
    /// # Example
    ///
    /// ```rust
    /// use decay_pool::Builder;
    ///
    /// let rt = tokio::runtime::Builder::new_current_thread()
    ///     .enable_time()
    ///     .build()
    ///     .unwrap();
    /// let _guard = rt.enter();
    ///
    /// let pool = Builder::<Vec<u8>>::new().generator(Vec::new).build().unwrap();
    /// let len = pool.rent(|buf| {
    ///     buf.extend_from_slice(b"abc");
    ///     buf.len()
    /// }).unwrap();
    /// assert_eq!(len, 3);
    /// assert_eq!(pool.count(), 1);
    /// ```
    pub fn rent<F, R>(&self, func: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut entry = self.lease()?;
        Ok(func(&mut *entry))
    }

    /// Shrink the pool right away.
    ///
    /// Cancels any scheduled trim and recycles every queued item first. With
    /// `max` of `None` the target is `min(max_size, len / 2 - 1)`. A target of
    /// zero disposes everything. Otherwise the most recently returned items
    /// are disposed until at most `max` remain, and another trim is scheduled.
    pub fn trim(&self, max: Option<usize>) {
        let evicted = {
            let mut state = self.inner.state.lock();
            self.inner.trim_locked(&mut state, max)
        };
        dispose_all(evicted);
    }

    /// Schedule a trim to `max` after `delay`, replacing any scheduled one.
    ///
    /// On a disposed pool this clears right away instead.
    pub fn auto_trim(&self, delay: Duration, max: Option<usize>) {
        let mut state = self.inner.state.lock();
        if state.disposed {
            let evicted = self.inner.trim_locked(&mut state, Some(0));
            drop(state);
            dispose_all(evicted);
            return;
        }
        self.inner.schedule_locked(&mut state, delay, max);
    }

    /// Dispose every item held.
    pub fn clear(&self) {
        self.trim(Some(0));
    }

    /// Remove and return every item held, recycling queued items first.
    ///
    /// The items are not disposed: they now belong to the caller. The oldest
    /// item comes first.
    pub fn drain(&self) -> Result<Vec<T>> {
        let mut state = self.inner.state.lock();
        state.ensure_active()?;
        state.timer.cancel();
        state.fold_recycled();
        let items = mem::take(&mut state.ready);
        tracing::debug!(count = items.len(), "pool drained");
        Ok(items)
    }

    /// Alias of [`drain`](Self::drain).
    pub fn dump(&self) -> Result<Vec<T>> {
        self.drain()
    }

    /// Dispose every item, release the generator and recycler, and cancel
    /// any scheduled trim. Every later operation other than status queries
    /// and `dispose` fails with [`PoolError::Disposed`].
    ///
    /// Calling it again does nothing.
    pub fn dispose(&self) {
        let evicted = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return;
            }
            let evicted = self.inner.trim_locked(&mut state, Some(0));
            state.generator = None;
            state.recycler = None;
            state.recycle = None;
            state.disposed = true;
            evicted
        };
        tracing::debug!(disposed = evicted.len(), "pool disposed");
        dispose_all(evicted);
    }
}

impl<T: Dispose + Send + 'static> Shared<T> {
    /// Arm a one-shot trim after `delay`, cancelling the current one.
    fn schedule_locked(
        self: &Arc<Self>,
        state: &mut State<T>,
        delay: Duration,
        max: Option<usize>,
    ) {
        let ticket = state.timer.reserve();
        // `sleep` clamps delays too large to add to the current instant.
        let deadline = Instant::now().checked_add(delay);
        let shared = Arc::downgrade(self);
        let task = self.runtime.spawn(async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => tokio::time::sleep(delay).await,
            }
            if let Some(shared) = shared.upgrade() {
                shared.fire(ticket, max);
            }
        });
        state.timer.arm(ticket, task.abort_handle());
    }

    fn fire(self: &Arc<Self>, ticket: u64, max: Option<usize>) {
        let evicted = {
            let mut state = self.state.lock();
            if !state.timer.fire(ticket) {
                return;
            }
            self.trim_locked(&mut state, max)
        };
        dispose_all(evicted);
    }

    /// Returns the evicted items. The caller disposes them after unlocking.
    fn trim_locked(self: &Arc<Self>, state: &mut State<T>, max: Option<usize>) -> Vec<T> {
        state.timer.cancel();
        state.fold_recycled();
        let len = state.ready.len();
        if len == 0 {
            return Vec::new();
        }

        let max = if state.disposed {
            0
        } else {
            max.unwrap_or_else(|| self.max_size.min((len / 2).saturating_sub(1)))
        };
        if max == 0 {
            tracing::debug!(evicted = len, "pool cleared");
            return mem::take(&mut state.ready);
        }

        let evicted = if len > max {
            state.ready.split_off(max)
        } else {
            Vec::new()
        };
        tracing::debug!(
            evicted = evicted.len(),
            remaining = state.ready.len(),
            "pool trimmed"
        );
        self.schedule_locked(state, self.trim_delay, None);
        evicted
    }
}

impl<T> State<T> {
    fn count(&self) -> usize {
        self.ready.len() + self.recycle_len()
    }

    fn recycle_len(&self) -> usize {
        self.recycle.as_ref().map_or(0, VecDeque::len)
    }

    fn ensure_active(&self) -> Result<()> {
        if self.disposed {
            Err(PoolError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Store a returned entry. Returns it back if the destination is full.
    fn store(&mut self, mut entry: T) -> Option<T> {
        match self.recycle.as_mut() {
            Some(queue) if queue.len() < ABSOLUTE_MAX_SIZE => queue.push_back(entry),
            Some(_) => {
                if let Some(recycler) = &self.recycler {
                    recycler(&mut entry);
                }
                return Some(entry);
            }
            None if self.ready.len() < ABSOLUTE_MAX_SIZE => self.ready.push(entry),
            None => return Some(entry),
        }
        None
    }

    fn pop(&mut self) -> Option<T> {
        if let Some(item) = self.ready.pop() {
            return Some(item);
        }
        let mut item = self.recycle.as_mut()?.pop_back()?;
        if let Some(recycler) = &self.recycler {
            recycler(&mut item);
        }
        Some(item)
    }

    /// Recycle every queued item into the ready pool, oldest first.
    ///
    /// Items are moved one at a time, so a panicking recycler loses only the
    /// item it was handed and leaves the rest queued.
    fn fold_recycled(&mut self) {
        let Some(queue) = self.recycle.as_mut() else {
            return;
        };
        while let Some(mut item) = queue.pop_front() {
            if let Some(recycler) = &self.recycler {
                recycler(&mut item);
            }
            self.ready.push(item);
        }
    }
}

/// Configuration for the pool.
pub struct Config<T> {
    /// Soft ceiling the pool trims toward. Must be in `1..=ABSOLUTE_MAX_SIZE`.
    pub max_size: usize,
    /// Delay of automatic trims.
    pub trim_delay: Duration,
    /// Optional function producing a new item when the pool is empty.
    pub generator: Option<Generator<T>>,
    /// Optional function to reset an item before it is reused.
    pub recycler: Option<Recycler<T>>,
    /// Runtime that runs deferred trims. The current runtime when `None`.
    pub runtime: Option<Handle>,
}

impl<T> Default for Config<T> {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            trim_delay: DEFAULT_TRIM_DELAY,
            generator: None,
            recycler: None,
            runtime: None,
        }
    }
}

impl<T> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("max_size", &self.max_size)
            .field("trim_delay", &self.trim_delay)
            .field("generator", &self.generator.is_some())
            .field("recycler", &self.recycler.is_some())
            .field("runtime", &self.runtime.is_some())
            .finish()
    }
}

impl<T> Config<T> {
    /// Check that `max_size` is within `1..=ABSOLUTE_MAX_SIZE`.
    pub fn validate(&self) -> Result<()> {
        if (1..=ABSOLUTE_MAX_SIZE).contains(&self.max_size) {
            Ok(())
        } else {
            Err(PoolError::InvalidConfiguration {
                max_size: self.max_size,
            })
        }
    }
}
