#![forbid(unsafe_code)]

//! Hosting context for model cells.
//!
//! An [`Instance`] is the minimal component surface a model cell needs:
//!
//! - the declared prop names ([`ComponentDecl`]),
//! - the raw payload the owner passed ([`RawProps`]), used for wiring checks
//!   and listener lookup,
//! - the resolved prop map ([`Props`]) the cell mirrors,
//! - an [`EffectScope`] that owns every owner observer created during setup.
//!
//! # Lifecycle
//!
//! ```text
//! mount(decl, raw) ─▶ setup(|props| use_model(..)) ─▶ update_raw(..)* ─▶ unmount()
//! ```
//!
//! `update_raw` is the owner's update cycle: it re-resolves every declared
//! prop, and each observer whose prop changed re-syncs before it returns.
//! After `unmount`, observers are stopped and `emit` is a no-op.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use vmodel_reactive::{Effect, EffectScope};

use crate::modifiers::{get_model_modifiers, modifiers_key};
use crate::naming::{KeyVariants, camelize, hyphenate};
use crate::props::Props;
use crate::value::Value;

/// Owner-side event listener.
pub type Listener = Rc<dyn Fn(&Value)>;

/// Exactly what the owner passed: values by spelling, listeners by event
/// name (`update:<spelling>`).
#[derive(Clone, Default)]
pub struct RawProps {
    values: HashMap<String, Value>,
    listeners: HashMap<String, Listener>,
}

impl RawProps {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert_value(key, value);
        self
    }

    #[must_use]
    pub fn with_listener(
        mut self,
        event: impl Into<String>,
        listener: impl Fn(&Value) + 'static,
    ) -> Self {
        self.insert_listener(event, Rc::new(listener));
        self
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn insert_listener(&mut self, event: impl Into<String>, listener: Listener) {
        self.listeners.insert(event.into(), listener);
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn has_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn has_listener(&self, event: &str) -> bool {
        self.listeners.contains_key(event)
    }

    #[must_use]
    pub fn listener(&self, event: &str) -> Option<Listener> {
        self.listeners.get(event).cloned()
    }
}

impl std::fmt::Debug for RawProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut listeners: Vec<&str> = self.listeners.keys().map(String::as_str).collect();
        listeners.sort_unstable();
        f.debug_struct("RawProps")
            .field("values", &self.values)
            .field("listeners", &listeners)
            .finish()
    }
}

#[derive(Clone, Debug)]
struct PropDecl {
    name: String,
    default: Option<Value>,
}

/// A component's declared props.
///
/// Names are normalized to camel case on declaration.
#[derive(Clone, Debug, Default)]
pub struct ComponentDecl {
    name: String,
    props: Vec<PropDecl>,
}

impl ComponentDecl {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: Vec::new(),
        }
    }

    /// Declare a prop with no default.
    #[must_use]
    pub fn prop(self, name: &str) -> Self {
        self.declare(name, None)
    }

    /// Declare a prop resolved to `default` when the owner omits it.
    #[must_use]
    pub fn prop_with_default(self, name: &str, default: impl Into<Value>) -> Self {
        self.declare(name, Some(default.into()))
    }

    /// Declare a model prop together with its modifiers sibling.
    #[must_use]
    pub fn model(self, name: &str) -> Self {
        let modifiers = modifiers_key(&camelize(name));
        self.prop(name).prop(&modifiers)
    }

    fn declare(mut self, name: &str, default: Option<Value>) -> Self {
        let name = camelize(name);
        self.props.retain(|p| p.name != name);
        self.props.push(PropDecl { name, default });
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `name` is declared, compared against the normalized names.
    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.props.iter().any(|p| p.name == name)
    }

    /// Declared prop names in declaration order.
    pub fn prop_names(&self) -> impl Iterator<Item = &str> {
        self.props.iter().map(|p| p.name.as_str())
    }

    fn resolve(&self, raw: &RawProps) -> Vec<(String, Value)> {
        self.props
            .iter()
            .map(|decl| {
                let variants = KeyVariants::new(&decl.name);
                let value = variants
                    .spellings()
                    .iter()
                    .find_map(|s| raw.value(s).cloned())
                    .or_else(|| decl.default.clone())
                    .unwrap_or_default();
                (decl.name.clone(), value)
            })
            .collect()
    }
}

thread_local! {
    static CURRENT: RefCell<Vec<Weak<InstanceInner>>> = const { RefCell::new(Vec::new()) };
}

/// The instance whose setup is currently running on this thread.
#[must_use]
pub fn current_instance() -> Option<Instance> {
    CURRENT.with(|stack| {
        stack
            .borrow()
            .last()
            .and_then(Weak::upgrade)
            .map(|inner| Instance { inner })
    })
}

struct SetupGuard;

impl Drop for SetupGuard {
    fn drop(&mut self) {
        CURRENT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

struct InstanceInner {
    decl: ComponentDecl,
    props: Props,
    raw: RefCell<RawProps>,
    scope: RefCell<EffectScope>,
    mounted: Cell<bool>,
}

/// A mounted component instance. Cloning shares the instance.
#[derive(Clone)]
pub struct Instance {
    inner: Rc<InstanceInner>,
}

impl Instance {
    /// Resolve `raw` against `decl` and mount the instance.
    #[must_use]
    pub fn mount(decl: ComponentDecl, raw: RawProps) -> Self {
        let props = Props::new();
        for (key, value) in decl.resolve(&raw) {
            props.set(&key, value);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(component = decl.name(), props = props.len(), "mount");

        Self {
            inner: Rc::new(InstanceInner {
                decl,
                props,
                raw: RefCell::new(raw),
                scope: RefCell::new(EffectScope::new()),
                mounted: Cell::new(true),
            }),
        }
    }

    /// Run `f` with this instance as the current hosting context.
    ///
    /// Nested setups restore the outer instance on return, including on panic.
    pub fn setup<R>(&self, f: impl FnOnce(&Props) -> R) -> R {
        CURRENT.with(|stack| stack.borrow_mut().push(Rc::downgrade(&self.inner)));
        let _guard = SetupGuard;
        f(&self.inner.props)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.decl.name()
    }

    #[must_use]
    pub fn decl(&self) -> &ComponentDecl {
        &self.inner.decl
    }

    /// The resolved prop map.
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.inner.props
    }

    /// Inspect the raw owner payload.
    pub fn with_raw<R>(&self, f: impl FnOnce(&RawProps) -> R) -> R {
        f(&self.inner.raw.borrow())
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    /// Owner update cycle: replace the raw payload and re-resolve props.
    ///
    /// Observers of changed props run before this returns.
    pub fn update_raw(&self, raw: RawProps) {
        let resolved = self.inner.decl.resolve(&raw);
        *self.inner.raw.borrow_mut() = raw;
        for (key, value) in resolved {
            self.inner.props.set(&key, value);
        }
    }

    /// Deliver `event` to the owner's listener.
    ///
    /// The listener is looked up under the event name, then its camelized and
    /// hyphenated spellings. For `update:<name>` events the `trim` and
    /// `number` modifiers of `<name>` are applied to the payload first.
    pub fn emit(&self, event: &str, payload: Value) {
        if !self.is_mounted() {
            #[cfg(feature = "tracing")]
            tracing::trace!(component = self.name(), event, "emit after unmount dropped");
            return;
        }

        let payload = match event.strip_prefix("update:") {
            Some(model) => self.apply_modifiers(model, payload),
            None => payload,
        };

        // Release the borrow before calling out: the listener may update_raw.
        let listener = {
            let raw = self.inner.raw.borrow();
            raw.listener(event)
                .or_else(|| raw.listener(&camelize(event)))
                .or_else(|| raw.listener(&hyphenate(event)))
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            component = self.name(),
            event,
            payload = ?payload,
            delivered = listener.is_some(),
            "emit"
        );

        if let Some(listener) = listener {
            listener(&payload);
        }
    }

    fn apply_modifiers(&self, model: &str, mut payload: Value) -> Value {
        let Some(modifiers) = get_model_modifiers(&self.inner.props, model) else {
            return payload;
        };
        if modifiers.contains("trim") {
            if let Value::Str(s) = &payload {
                payload = Value::from(s.trim());
            }
        }
        if modifiers.contains("number") {
            payload = payload.loose_to_number();
        }
        payload
    }

    /// Stop every observer created during setup. Idempotent.
    pub fn unmount(&self) {
        self.inner.mounted.set(false);
        self.inner.scope.borrow_mut().stop();

        #[cfg(feature = "tracing")]
        tracing::trace!(component = self.name(), "unmount");
    }

    pub(crate) fn is_wired(&self, variants: &KeyVariants) -> bool {
        variants.is_wired(&self.inner.raw.borrow())
    }

    pub(crate) fn hold(&self, effect: Effect) {
        if !self.is_mounted() {
            effect.stop();
            return;
        }
        self.inner.scope.borrow_mut().hold(effect);
    }

    /// Number of live owner observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.scope.borrow().len()
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name())
            .field("mounted", &self.is_mounted())
            .field("props", &self.inner.props)
            .finish()
    }
}
