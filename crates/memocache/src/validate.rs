//! Key validation

use crate::error::Error;

type Validator<K> = Box<dyn Fn(&K) -> bool + Send + Sync>;

/// Optional predicate every key must satisfy before a lookup
pub(crate) struct KeyCheck<K> {
    validator: Option<Validator<K>>,
}

impl<K> KeyCheck<K> {
    /// Accept every key
    pub(crate) fn any() -> Self {
        Self { validator: None }
    }

    pub(crate) fn with<F>(validator: F) -> Self
    where
        F: Fn(&K) -> bool + Send + Sync + 'static,
    {
        Self {
            validator: Some(Box::new(validator)),
        }
    }

    pub(crate) fn check<E>(&self, key: &K) -> Result<(), Error<E>> {
        match &self.validator {
            Some(validator) if !validator(key) => {
                Err(Error::InvalidArgument("key rejected by validator"))
            }
            _ => Ok(()),
        }
    }
}

/// Reject empty string keys
///
/// ```
/// use memocache::{validate, MemoCache, Memoize};
///
/// let cache = MemoCache::<String, usize>::with_key_validator(validate::non_empty);
/// let err = cache
///     .get_or_compute(String::new(), |k| Ok::<_, ()>(k.len()))
///     .unwrap_err();
/// assert!(err.is_invalid_argument());
/// ```
pub fn non_empty<K: AsRef<str>>(key: &K) -> bool {
    !key.as_ref().is_empty()
}
