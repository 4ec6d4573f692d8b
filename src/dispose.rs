use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

/// Release hook for items leaving the pool.
///
/// Every item the pool gets rid of without handing it to a caller is passed
/// to [`Dispose::dispose`]: trimmed items, cleared items, items discarded
/// past the absolute ceiling and whatever is left when the pool is disposed
/// or dropped.
///
/// The default implementation simply drops the value, so most types only
/// need an empty `impl`.
///
/// # Example
///
/// ```rust
/// use decay_pool::Dispose;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct Connection {
///     closed: Arc<AtomicUsize>,
/// }
///
/// impl Dispose for Connection {
///     fn dispose(self) {
///         self.closed.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let closed = Arc::new(AtomicUsize::new(0));
/// Connection { closed: closed.clone() }.dispose();
/// assert_eq!(closed.load(Ordering::SeqCst), 1);
/// ```
pub trait Dispose: Sized {
    /// Release the item. Consumes it.
    fn dispose(self) {}
}

macro_rules! impl_dispose {
    ($($ty:ty),* $(,)?) => {
        $(impl Dispose for $ty {})*
    };
}

impl_dispose!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
);

impl<T> Dispose for Vec<T> {}
impl<T> Dispose for VecDeque<T> {}
impl<T: ?Sized> Dispose for Box<T> {}
impl<T: ?Sized> Dispose for Arc<T> {}
impl<T: ?Sized> Dispose for Rc<T> {}

impl<T: Dispose> Dispose for Option<T> {
    fn dispose(self) {
        if let Some(item) = self {
            item.dispose();
        }
    }
}

/// Dispose a batch of evicted items, most recently added first.
pub(crate) fn dispose_all<T: Dispose>(items: Vec<T>) {
    for item in items.into_iter().rev() {
        item.dispose();
    }
}
