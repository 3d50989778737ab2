#![forbid(unsafe_code)]

//! Per-value observer set.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::effect::{EffectInner, current_reader};

/// Observer set for a single reactive value.
///
/// `track()` registers whichever [`Effect`](crate::Effect) is currently
/// running; `trigger()` re-runs every registered reader that is still alive.
///
/// # Failure Modes
///
/// - Reader panic: propagates to the caller of `trigger()`. Readers after the
///   panicking one are not run for that trigger.
#[derive(Default)]
pub struct Dep {
    set: Rc<ReaderSet>,
}

/// Shared reader list. Effects keep a `Weak` to every set they joined so they
/// can leave it before their next run.
#[derive(Default)]
pub(crate) struct ReaderSet {
    readers: RefCell<Vec<Weak<EffectInner>>>,
}

impl ReaderSet {
    pub(crate) fn remove(&self, reader: &EffectInner) {
        self.readers
            .borrow_mut()
            .retain(|w| !std::ptr::eq(w.as_ptr(), reader));
    }

    fn live(&self) -> Vec<Rc<EffectInner>> {
        let mut readers = self.readers.borrow_mut();
        readers.retain(|w| w.upgrade().is_some_and(|r| r.is_active()));
        readers.iter().filter_map(Weak::upgrade).collect()
    }
}

impl Dep {
    /// Create an empty observer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the currently running reader, if any.
    ///
    /// Called outside an effect run (or inside [`untracked`](crate::untracked))
    /// this is a no-op. The registration lasts until the reader's next run.
    pub fn track(&self) {
        let Some(reader) = current_reader() else {
            return;
        };
        let added = {
            let mut readers = self.set.readers.borrow_mut();
            readers.retain(|w| w.upgrade().is_some_and(|r| r.is_active()));
            let weak = Rc::downgrade(&reader);
            if readers.iter().any(|w| Weak::ptr_eq(w, &weak)) {
                false
            } else {
                readers.push(weak);
                true
            }
        };
        if added {
            reader.joined(Rc::downgrade(&self.set));
        }
    }

    /// Synchronously re-run every live reader.
    pub fn trigger(&self) {
        // Snapshot first: readers may track() this dep again while running.
        let live = self.set.live();

        #[cfg(feature = "tracing")]
        tracing::trace!(readers = live.len(), "dep trigger");

        for reader in live {
            reader.run();
        }
    }

    /// Number of live readers currently registered.
    #[must_use]
    pub fn reader_count(&self) -> usize {
        self.set
            .readers
            .borrow()
            .iter()
            .filter(|w| w.upgrade().is_some_and(|r| r.is_active()))
            .count()
    }
}

impl std::fmt::Debug for Dep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep")
            .field("reader_count", &self.reader_count())
            .finish()
    }
}
