#![forbid(unsafe_code)]

//! Lifecycle ownership for groups of effects.

use crate::effect::Effect;

/// Collects effects for a logical scope (e.g., a component instance).
///
/// When the scope is stopped or dropped, every held effect is stopped, so no
/// reader created in this scope fires afterwards.
///
/// # Invariants
///
/// 1. After `stop()` or drop, no held effect runs again.
/// 2. `stop()` leaves the scope empty but reusable.
/// 3. Effect count is always accurate.
#[derive(Default)]
pub struct EffectScope {
    effects: Vec<Effect>,
}

impl EffectScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an effect until the scope ends.
    pub fn hold(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Create an effect owned by this scope.
    ///
    /// Returns a reference to the scope for chaining.
    pub fn run(&mut self, f: impl FnMut() + 'static) -> &mut Self {
        self.effects.push(Effect::new(f));
        self
    }

    /// Number of effects held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether the scope holds no effects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Stop and release every held effect, newest first.
    pub fn stop(&mut self) {
        while let Some(effect) = self.effects.pop() {
            effect.stop();
        }
    }
}

impl Drop for EffectScope {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for EffectScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectScope")
            .field("effect_count", &self.effects.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dep;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter_on(scope: &mut EffectScope, dep: &Rc<Dep>) -> Rc<Cell<u32>> {
        let runs = Rc::new(Cell::new(0));
        let r = Rc::clone(&runs);
        let d = Rc::clone(dep);
        scope.run(move || {
            d.track();
            r.set(r.get() + 1);
        });
        runs
    }

    #[test]
    fn scope_keeps_effects_alive() {
        let dep = Rc::new(Dep::new());
        let mut scope = EffectScope::new();
        let runs = counter_on(&mut scope, &dep);
        assert_eq!(scope.len(), 1);

        dep.trigger();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn stop_releases_effects() {
        let dep = Rc::new(Dep::new());
        let mut scope = EffectScope::new();
        let runs = counter_on(&mut scope, &dep);

        scope.stop();
        assert!(scope.is_empty());
        dep.trigger();
        assert_eq!(runs.get(), 1, "stopped effect must not run");
    }

    #[test]
    fn drop_releases_effects() {
        let dep = Rc::new(Dep::new());
        let runs = {
            let mut scope = EffectScope::new();
            counter_on(&mut scope, &dep)
        };
        dep.trigger();
        assert_eq!(runs.get(), 1);
        assert_eq!(dep.reader_count(), 0);
    }

    #[test]
    fn held_clone_is_stopped_with_scope() {
        let dep = Rc::new(Dep::new());
        let d = Rc::clone(&dep);
        let effect = Effect::new(move || d.track());
        let mut scope = EffectScope::new();
        scope.hold(effect.clone());

        drop(scope);
        assert!(!effect.is_active());
        dep.trigger();
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn scope_reusable_after_stop() {
        let dep = Rc::new(Dep::new());
        let mut scope = EffectScope::new();
        let first = counter_on(&mut scope, &dep);
        scope.stop();
        let second = counter_on(&mut scope, &dep);

        dep.trigger();
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);
    }

    #[test]
    fn scope_debug_format() {
        let mut scope = EffectScope::new();
        scope.run(|| {}).run(|| {});
        assert!(format!("{scope:?}").contains("effect_count: 2"));
    }
}
