#![forbid(unsafe_code)]

//! Dependency cells for synchronous, single-threaded reactivity.
//!
//! This crate provides the leaf capability the binding cell is built on:
//!
//! - [`Dep`]: a per-value observer set with `track()` / `trigger()`.
//! - [`Effect`]: a reader that runs eagerly and re-runs synchronously every
//!   time a [`Dep`] it tracked is triggered.
//! - [`EffectScope`]: RAII owner that stops a group of effects together.
//!
//! # Architecture
//!
//! There is no global dependency registry. Each [`Dep`] owns its own list of
//! readers, stored as `Weak` references and pruned lazily during
//! [`Dep::trigger`]. The only thread-local state is the stack of currently
//! running readers, which is what [`Dep::track`] consults to know *who* is
//! reading.
//!
//! # Invariants
//!
//! 1. A reader that never called `track()` on a `Dep` is never woken by it.
//! 2. `trigger()` re-runs readers synchronously, in registration order,
//!    before returning. There is no batching or deferred flush.
//! 3. A reader is never re-entered while it is already running.
//! 4. A stopped or dropped reader never runs again.

pub mod dep;
pub mod effect;
pub mod scope;

pub use dep::Dep;
pub use effect::{Effect, untracked};
pub use scope::EffectScope;
