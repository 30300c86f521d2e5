use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type CompareFn = dyn Fn(&str, &str) -> Ordering + Send + Sync;

/// A total order over property keys.
///
/// Cloning is cheap and shares the underlying function, so two maps built
/// from clones of the same comparator observe the same ordering.
#[derive(Clone)]
pub struct KeyComparator {
    compare: Arc<CompareFn>,
}

impl KeyComparator {
    /// Wrap an ordering function.
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&str, &str) -> Ordering + Send + Sync + 'static,
    {
        Self {
            compare: Arc::new(compare),
        }
    }

    /// Lexicographic order on the UTF-8 bytes of the keys.
    pub fn natural() -> Self {
        Self::new(|a, b| a.cmp(b))
    }

    /// The reverse of [`KeyComparator::natural`].
    pub fn reverse_natural() -> Self {
        Self::new(|a, b| b.cmp(a))
    }

    /// Case-insensitive order. Keys differing only in ASCII case collide.
    pub fn ascii_case_insensitive() -> Self {
        Self::new(|a, b| {
            a.bytes()
                .map(|c| c.to_ascii_lowercase())
                .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
        })
    }

    /// Compare two keys.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        (self.compare)(a, b)
    }

    /// Returns `true` if both comparators share the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.compare, &other.compare)
    }
}

impl fmt::Debug for KeyComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyComparator")
            .field("ptr", &Arc::as_ptr(&self.compare).cast::<()>())
            .finish()
    }
}
