#![forbid(unsafe_code)]

//! The owner-held prop map a model cell mirrors.
//!
//! [`Props`] is a shared key/value map with one [`Dep`] per key. Reading via
//! [`Props::get`] tracks the key; [`Props::set`] re-runs the key's readers
//! synchronously before returning, so owner mutation and observer re-sync
//! happen as one unit.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use vmodel_reactive::Dep;

use crate::value::{Value, has_changed};

#[derive(Default)]
struct PropsInner {
    values: RefCell<HashMap<String, Value>>,
    deps: RefCell<HashMap<String, Rc<Dep>>>,
}

/// Shared, per-key tracked prop map.
///
/// Cloning shares the same map.
#[derive(Clone, Default)]
pub struct Props {
    inner: Rc<PropsInner>,
}

impl Props {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn dep(&self, key: &str) -> Rc<Dep> {
        let mut deps = self.inner.deps.borrow_mut();
        if let Some(dep) = deps.get(key) {
            return Rc::clone(dep);
        }
        let dep = Rc::new(Dep::new());
        deps.insert(key.to_owned(), Rc::clone(&dep));
        dep
    }

    /// Read `key`, registering the running reader. Missing keys read as
    /// [`Value::Undefined`] and are still tracked.
    pub fn get(&self, key: &str) -> Value {
        self.dep(key).track();
        self.peek(key)
    }

    /// Read `key` without tracking.
    #[must_use]
    pub fn peek(&self, key: &str) -> Value {
        self.inner
            .values
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `key` holds a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.values.borrow().contains_key(key)
    }

    /// Store `value` under `key`.
    ///
    /// When the value changed, every reader of `key` re-runs before this
    /// returns. Returns whether a change happened.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        {
            let mut values = self.inner.values.borrow_mut();
            let old = values.get(key).cloned().unwrap_or_default();
            if !has_changed(&old, &value) && values.contains_key(key) {
                return false;
            }
            values.insert(key.to_owned(), value);
        }
        let dep = self.inner.deps.borrow().get(key).cloned();
        if let Some(dep) = dep {
            dep.trigger();
        }
        true
    }

    /// Keys currently present, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.values.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.values.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.values.borrow().is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let props = Self::new();
        props.inner.values.borrow_mut().extend(
            iter.into_iter().map(|(k, v)| (k.into(), v.into())),
        );
        props
    }
}

impl std::fmt::Debug for Props {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.inner.values.borrow().iter())
            .finish()
    }
}
