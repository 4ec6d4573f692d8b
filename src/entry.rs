use std::fmt::{self, Debug, Display};
use std::ops::{Deref, DerefMut};

use crate::{Dispose, Pool};

/// An item leased from a [`Pool`].
///
/// `Entry` holds the item and a reference to the [`Pool`] it came from.
/// When the entry is dropped, including during a panic, the item is given
/// back to the pool.
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
/// let pool = Builder::<String>::new().generator(String::new).build().unwrap();
/// {
///     let mut entry = pool.lease().unwrap();
///     entry.push_str("leased");
///     assert_eq!(pool.count(), 0);
/// }
/// assert_eq!(pool.count(), 1);
///
/// let kept = pool.lease().unwrap().into_inner();
/// assert_eq!(kept, "leased");
/// assert_eq!(pool.count(), 0);
/// ```
pub struct Entry<'a, T: Dispose + Send + 'static> {
    // `item` is always `Some` until the entry is dropped or detached.
    item: Option<T>,
    pool: &'a Pool<T>,
}

impl<'a, T: Dispose + Send + 'static> Entry<'a, T> {
    pub(crate) fn new(item: T, pool: &'a Pool<T>) -> Self {
        Self {
            item: Some(item),
            pool,
        }
    }

    /// Get reference to the inner item.
    pub fn get(&self) -> &T {
        self
    }

    /// Get mutable reference to the inner item.
    pub fn get_mut(&mut self) -> &mut T {
        self
    }

    /// Get the pool the item will be given back to.
    pub fn pool(&self) -> &'a Pool<T> {
        self.pool
    }

    /// Consume the entry and return the item without giving it back.
    pub fn into_inner(mut self) -> T {
        self.item.take().unwrap()
    }
}

impl<T: Dispose + Send + 'static> Drop for Entry<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            if let Err(err) = self.pool.give(item) {
                tracing::debug!(%err, "leased item not given back");
            }
        }
    }
}

impl<T: Dispose + Send + 'static> Deref for Entry<'_, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        self.item.as_ref().unwrap()
    }
}

impl<T: Dispose + Send + 'static> DerefMut for Entry<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.item.as_mut().unwrap()
    }
}

impl<T: Dispose + Send + 'static + Debug> Debug for Entry<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&**self, f)
    }
}

impl<T: Dispose + Send + 'static + Display> Display for Entry<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&**self, f)
    }
}

impl<T: Dispose + Send + 'static + PartialEq> PartialEq for Entry<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.item.eq(&other.item)
    }
}

impl<T: Dispose + Send + 'static> AsRef<T> for Entry<'_, T> {
    fn as_ref(&self) -> &T {
        self
    }
}

#[cfg(feature = "serde")]
impl<T: Dispose + Send + 'static + serde::Serialize> serde::Serialize for Entry<'_, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.get().serialize(serializer)
    }
}
