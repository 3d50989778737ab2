#![forbid(unsafe_code)]

//! Eager, synchronous readers.
//!
//! An [`Effect`] runs its closure once on creation and again every time a
//! [`Dep`](crate::Dep) it tracked during a previous run is triggered. Runs are
//! never deferred: the re-run completes before `trigger()` returns.
//!
//! # Invariants
//!
//! 1. While a closure runs, its effect is the top of the thread-local reader
//!    stack; the stack is restored on exit, including on panic.
//! 2. A running effect is not re-entered by a trigger it causes itself.
//! 3. [`Effect::stop`] is permanent.
//! 4. Each run starts with no registrations: a dependency the latest run did
//!    not read never re-runs the effect.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::dep::ReaderSet;

thread_local! {
    /// Readers currently executing, innermost last. `None` marks an
    /// [`untracked`] section.
    static READERS: RefCell<Vec<Option<Rc<EffectInner>>>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn current_reader() -> Option<Rc<EffectInner>> {
    READERS.with(|stack| stack.borrow().last().cloned().flatten())
}

/// Run `f` with no active reader, so nothing it reads is tracked.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    READERS.with(|stack| stack.borrow_mut().push(None));
    let _pop = StackGuard;
    f()
}

struct StackGuard;

impl Drop for StackGuard {
    fn drop(&mut self) {
        READERS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub(crate) struct EffectInner {
    body: RefCell<Box<dyn FnMut()>>,
    running: Cell<bool>,
    active: Cell<bool>,
    runs: Cell<u64>,
    sources: RefCell<Vec<Weak<ReaderSet>>>,
}

impl EffectInner {
    pub(crate) fn is_active(&self) -> bool {
        self.active.get()
    }

    pub(crate) fn joined(&self, set: Weak<ReaderSet>) {
        self.sources.borrow_mut().push(set);
    }

    /// Leave every reader set joined so far; the next run re-tracks.
    fn leave_all(&self) {
        let sources = std::mem::take(&mut *self.sources.borrow_mut());
        for set in sources.iter().filter_map(Weak::upgrade) {
            set.remove(self);
        }
    }

    pub(crate) fn run(self: &Rc<Self>) {
        if !self.active.get() || self.running.get() {
            return;
        }
        self.running.set(true);
        self.leave_all();
        READERS.with(|stack| stack.borrow_mut().push(Some(Rc::clone(self))));
        let _guard = RunGuard { inner: self };

        #[cfg(feature = "tracing")]
        tracing::trace!(run = self.runs.get() + 1, "effect run");

        let mut body = self.body.borrow_mut();
        (&mut **body)();
    }
}

struct RunGuard<'a> {
    inner: &'a EffectInner,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        READERS.with(|stack| {
            stack.borrow_mut().pop();
        });
        self.inner.running.set(false);
        self.inner.runs.set(self.inner.runs.get() + 1);
    }
}

/// A reader that re-runs whenever a dependency it tracked is triggered.
///
/// Cloning shares the same underlying effect. The effect stays registered
/// with its dependencies as long as at least one clone is alive and it has
/// not been stopped.
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Create an effect and run it immediately.
    pub fn new(f: impl FnMut() + 'static) -> Self {
        let inner = Rc::new(EffectInner {
            body: RefCell::new(Box::new(f)),
            running: Cell::new(false),
            active: Cell::new(true),
            runs: Cell::new(0),
            sources: RefCell::new(Vec::new()),
        });
        inner.run();
        Self { inner }
    }

    /// Re-run the effect manually. No-op if stopped or already running.
    pub fn run(&self) {
        self.inner.run();
    }

    /// Permanently deactivate the effect.
    pub fn stop(&self) {
        self.inner.active.set(false);
        self.inner.leave_all();
    }

    /// Whether the effect will still respond to triggers.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// How many times the closure has run (including the initial run).
    #[must_use]
    pub fn run_count(&self) -> u64 {
        self.inner.runs.get()
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("active", &self.inner.active.get())
            .field("runs", &self.inner.runs.get())
            .finish()
    }
}
