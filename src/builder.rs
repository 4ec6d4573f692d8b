use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::{Config, Dispose, Pool, Result};

/// A builder for creating a [`Pool`] with custom configuration.
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
///
/// let mut builder = Builder::<usize>::new();
/// let pool = builder
///     .max_size(10)
///     .generator(|| 7)
///     .runtime(rt.handle().clone())
///     .build()
///     .unwrap();
/// assert_eq!(pool.max_size(), 10);
/// assert_eq!(pool.take().unwrap(), 7);
/// ```
pub struct Builder<T> {
    /// Configuration of the pool.
    config: Config<T>,
}

impl<T> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Builder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Builder<T> {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the soft ceiling the pool trims toward.
    pub fn max_size(&mut self, max_size: usize) -> &mut Self {
        self.config.max_size = max_size;
        self
    }

    /// Set the delay of automatic trims.
    pub fn trim_delay(&mut self, delay: Duration) -> &mut Self {
        self.config.trim_delay = delay;
        self
    }

    /// Set the function producing a new item when the pool is empty.
    pub fn generator<F>(&mut self, func: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.config.generator = Some(Arc::new(func));
        self
    }

    /// Set the function to reset an item before it is reused.
    ///
    /// Returned items are then queued for recycling instead of being ready
    /// right away.
    pub fn recycler<F>(&mut self, func: F) -> &mut Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.config.recycler = Some(Arc::new(func));
        self
    }

    /// Set the runtime that runs deferred trims.
    ///
    /// Defaults to the runtime current when [`build`](Self::build) is called.
    pub fn runtime(&mut self, runtime: Handle) -> &mut Self {
        self.config.runtime = Some(runtime);
        self
    }
}

impl<T: Dispose + Send + 'static> Builder<T> {
    /// Build the pool with the current configuration.
    pub fn build(&mut self) -> Result<Pool<T>> {
        let config = std::mem::take(&mut self.config);
        Pool::with_config(config)
    }
}
