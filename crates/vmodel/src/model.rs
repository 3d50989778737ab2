#![forbid(unsafe_code)]

//! Two-way model cells.
//!
//! A [`ModelRef`] mirrors one prop of its hosting [`Instance`] and lets the
//! component write to it:
//!
//! ```text
//!   owner ──update_raw──▶ Props ──sync observer──▶ local ──get()──▶ readers
//!     ▲                                              │
//!     └──────────── emit("update:<name>") ◀── set() ─┘ (local write if unwired)
//! ```
//!
//! # Invariants
//!
//! 1. `get()` reflects whichever happened last: the latest owner value seen by
//!    the sync observer, or the latest accepted local write.
//! 2. The sync observer runs inside the owner's mutation; there is no window
//!    in which `get()` returns the previous owner value.
//! 3. When the owner is wired (value and `update:` listener both passed),
//!    `set()` never writes the local value; only the owner's echo does.
//! 4. A lossy `set` transform that maps a new input onto the previously
//!    emitted value still re-runs readers once.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | No hosting context | `use_model` outside `Instance::setup` | Warn, disconnected cell |
//! | Undeclared prop | Name missing from `ComponentDecl` | Warn, disconnected cell |
//! | Transform panic | User `get`/`set` closure | Propagates to caller |
//! | Owner unmounted | Instance gone | Observer stopped, emits dropped |

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use vmodel_reactive::{Dep, Effect};

use crate::diagnostics::{self, ModelError};
use crate::instance::{Instance, current_instance};
use crate::modifiers::{Modifiers, get_model_modifiers};
use crate::naming::KeyVariants;
use crate::props::Props;
use crate::value::{Value, has_changed};

type Transform = Rc<dyn Fn(&Value) -> Value>;

/// Optional value transforms. Both default to identity.
#[derive(Clone, Default)]
pub struct ModelOptions {
    get: Option<Transform>,
    set: Option<Transform>,
}

impl ModelOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform applied to the local value on every read.
    #[must_use]
    pub fn get(mut self, f: impl Fn(&Value) -> Value + 'static) -> Self {
        self.get = Some(Rc::new(f));
        self
    }

    /// Transform applied to written values before they are emitted.
    #[must_use]
    pub fn set(mut self, f: impl Fn(&Value) -> Value + 'static) -> Self {
        self.set = Some(Rc::new(f));
        self
    }

    fn read(&self, local: Value) -> Value {
        match &self.get {
            Some(f) => f(&local),
            None => local,
        }
    }

    fn write(&self, value: &Value) -> Value {
        match &self.set {
            Some(f) => f(value),
            None => value.clone(),
        }
    }
}

impl std::fmt::Debug for ModelOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelOptions")
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .finish()
    }
}

#[derive(Default)]
struct ModelState {
    local: Value,
    prev_set: Value,
    prev_emitted: Value,
}

struct OwnerLink {
    instance: Instance,
    variants: KeyVariants,
    update_event: String,
    options: ModelOptions,
    modifiers: Option<Modifiers>,
}

struct ModelInner {
    name: String,
    dep: Dep,
    state: RefCell<ModelState>,
    link: Option<OwnerLink>,
}

impl ModelInner {
    /// Replace the local value if it changed. Returns whether it did.
    fn replace_local(&self, value: &Value) -> bool {
        let mut state = self.state.borrow_mut();
        if has_changed(&state.local, value) {
            state.local = value.clone();
            true
        } else {
            false
        }
    }

    fn sync_from_owner(&self, incoming: &Value) {
        if self.replace_local(incoming) {
            #[cfg(feature = "tracing")]
            tracing::trace!(prop = %self.name, value = ?incoming, "model sync from owner");
            self.dep.trigger();
        }
    }
}

/// A prop-mirroring cell with local override and owner write-back.
///
/// Cloning shares the same cell.
#[derive(Clone)]
pub struct ModelRef {
    inner: Rc<ModelInner>,
}

impl ModelRef {
    /// A cell with no owner: writes stay local, nothing is emitted, and
    /// transforms are not applied.
    #[must_use]
    pub fn disconnected(name: &str) -> Self {
        Self {
            inner: Rc::new(ModelInner {
                name: name.to_owned(),
                dep: Dep::new(),
                state: RefCell::new(ModelState::default()),
                link: None,
            }),
        }
    }

    fn connect(instance: Instance, props: &Props, name: &str, options: ModelOptions) -> Self {
        let variants = KeyVariants::new(name);
        let modifiers = get_model_modifiers(props, name);
        let inner = Rc::new(ModelInner {
            name: name.to_owned(),
            dep: Dep::new(),
            state: RefCell::new(ModelState::default()),
            link: Some(OwnerLink {
                instance: instance.clone(),
                variants,
                update_event: format!("update:{name}"),
                options,
                modifiers,
            }),
        });

        let weak: Weak<ModelInner> = Rc::downgrade(&inner);
        let source = props.clone();
        let key = name.to_owned();
        instance.hold(Effect::new(move || {
            let incoming = source.get(&key);
            if let Some(inner) = weak.upgrade() {
                inner.sync_from_owner(&incoming);
            }
        }));

        Self { inner }
    }

    /// The bound prop name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether the cell is linked to an owner.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.link.is_some()
    }

    /// Read the exposed value, registering the running reader.
    pub fn get(&self) -> Value {
        self.inner.dep.track();
        self.peek()
    }

    /// Read the exposed value without tracking.
    #[must_use]
    pub fn peek(&self) -> Value {
        let local = self.inner.state.borrow().local.clone();
        match &self.inner.link {
            Some(link) => link.options.read(local),
            None => local,
        }
    }

    /// Write a value.
    ///
    /// Unwired: the local value is replaced (readers re-run if it changed).
    /// Wired: the local value is left to the owner's echo. In both cases the
    /// `set` transform's output is emitted as `update:<name>`.
    pub fn set(&self, value: impl Into<Value>) {
        let value = value.into();
        let inner = &self.inner;
        let Some(link) = &inner.link else {
            if inner.replace_local(&value) {
                inner.dep.trigger();
            }
            return;
        };

        if !link.instance.is_wired(&link.variants) && inner.replace_local(&value) {
            inner.dep.trigger();
        }

        let emitted = link.options.write(&value);
        link.instance.emit(&link.update_event, emitted.clone());

        // The owner never echoes an unchanged emission, so a new input that
        // collapses onto the last emitted value needs a forced re-read.
        let force = {
            let state = inner.state.borrow();
            !value.strict_eq(&emitted)
                && !value.strict_eq(&state.prev_set)
                && emitted.strict_eq(&state.prev_emitted)
        };
        if force {
            #[cfg(feature = "tracing")]
            tracing::trace!(prop = %inner.name, value = ?value, emitted = ?emitted, "model forced trigger");
            inner.dep.trigger();
        }

        let mut state = inner.state.borrow_mut();
        state.prev_set = value;
        state.prev_emitted = emitted;
    }

    /// Modifier flags captured at construction, empty when absent.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.inner
            .link
            .as_ref()
            .and_then(|link| link.modifiers.clone())
            .unwrap_or_default()
    }

    /// Split into the cell and its modifier flags.
    #[must_use]
    pub fn split(self) -> ModelPair {
        let modifiers = self.modifiers();
        ModelPair {
            model: self,
            modifiers,
        }
    }
}

impl std::fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRef")
            .field("name", &self.inner.name)
            .field("connected", &self.is_connected())
            .field("local", &self.inner.state.borrow().local)
            .finish()
    }
}

/// A model cell together with its modifier flags.
#[derive(Clone, Debug)]
pub struct ModelPair {
    pub model: ModelRef,
    pub modifiers: Modifiers,
}

/// Bind prop `name` of the current instance.
///
/// Outside [`Instance::setup`], or for an undeclared prop, a warning is
/// reported and a [disconnected](ModelRef::disconnected) cell is returned.
pub fn use_model(props: &Props, name: &str, options: ModelOptions) -> ModelRef {
    match try_use_model(props, name, options) {
        Ok(model) => model,
        Err(err) => {
            diagnostics::report(&err);
            ModelRef::disconnected(name)
        }
    }
}

/// Like [`use_model`], but returns the misuse instead of degrading.
///
/// # Errors
///
/// - [`ModelError::NoActiveInstance`] outside [`Instance::setup`].
/// - [`ModelError::UndeclaredProp`] if the instance does not declare `name`.
pub fn try_use_model(
    props: &Props,
    name: &str,
    options: ModelOptions,
) -> Result<ModelRef, ModelError> {
    let instance = current_instance().ok_or_else(|| ModelError::NoActiveInstance {
        prop: name.to_owned(),
    })?;
    if !instance.decl().is_declared(name) {
        return Err(ModelError::UndeclaredProp {
            component: instance.name().to_owned(),
            prop: name.to_owned(),
        });
    }
    Ok(ModelRef::connect(instance, props, name, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{ComponentDecl, RawProps};
    use std::cell::Cell;

    fn unwired(value: impl Into<Value>) -> Instance {
        Instance::mount(
            ComponentDecl::new("Input").model("modelValue"),
            RawProps::new().with_value("modelValue", value),
        )
    }

    fn reader(model: &ModelRef) -> (Effect, Rc<Cell<u32>>) {
        let runs = Rc::new(Cell::new(0));
        let r = Rc::clone(&runs);
        let m = model.clone();
        let effect = Effect::new(move || {
            let _ = m.get();
            r.set(r.get() + 1);
        });
        (effect, runs)
    }

    #[test]
    fn initial_value_mirrors_owner() {
        let inst = unwired("hello");
        let model = inst.setup(|p| use_model(p, "modelValue", ModelOptions::new()));
        assert!(model.is_connected());
        assert_eq!(model.get(), Value::from("hello"));
        assert_eq!(model.name(), "modelValue");
    }

    #[test]
    fn get_transform_applies_on_read() {
        let inst = unwired(2);
        let model = inst.setup(|p| {
            use_model(
                p,
                "modelValue",
                ModelOptions::new().get(|v| Value::from(v.as_number().unwrap_or(0.0) * 10.0)),
            )
        });
        assert_eq!(model.get(), Value::from(20));
        model.set(3);
        assert_eq!(model.get(), Value::from(30));
    }

    #[test]
    fn unwired_set_updates_locally_and_emits_nowhere() {
        let inst = unwired(1);
        let model = inst.setup(|p| use_model(p, "modelValue", ModelOptions::new()));
        let (_effect, runs) = reader(&model);

        model.set(2);
        assert_eq!(model.get(), Value::from(2));
        assert_eq!(runs.get(), 2);
        assert_eq!(inst.props().peek("modelValue"), Value::from(1));
    }

    #[test]
    fn identical_unwired_writes_trigger_once() {
        let inst = unwired(1);
        let model = inst.setup(|p| use_model(p, "modelValue", ModelOptions::new()));
        let (_effect, runs) = reader(&model);

        model.set(5);
        model.set(5);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn nan_write_over_nan_is_unchanged() {
        let inst = unwired(f64::NAN);
        let model = inst.setup(|p| use_model(p, "modelValue", ModelOptions::new()));
        let (_effect, runs) = reader(&model);

        model.set(f64::NAN);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn owner_change_overrides_local_write() {
        let inst = unwired(1);
        let model = inst.setup(|p| use_model(p, "modelValue", ModelOptions::new()));
        model.set(9);
        inst.update_raw(RawProps::new().with_value("modelValue", 3));
        assert_eq!(model.get(), Value::from(3));
    }

    #[test]
    fn modifiers_captured_once() {
        let inst = Instance::mount(
            ComponentDecl::new("Input").model("title"),
            RawProps::new().with_value("titleModifiers", Value::object([("trim", true)])),
        );
        let pair = inst
            .setup(|p| use_model(p, "title", ModelOptions::new()))
            .split();
        assert!(pair.modifiers.contains("trim"));
        assert_eq!(pair.model.name(), "title");

        inst.update_raw(RawProps::new());
        assert!(pair.model.modifiers().contains("trim"));
    }

    #[test]
    fn missing_modifiers_fall_back_to_empty() {
        let inst = unwired(0);
        let pair = inst
            .setup(|p| use_model(p, "modelValue", ModelOptions::new()))
            .split();
        assert!(pair.modifiers.is_empty());
    }

    #[test]
    fn disconnected_cell_behaves_as_plain_ref() {
        let model = ModelRef::disconnected("x");
        assert!(!model.is_connected());
        assert_eq!(model.get(), Value::Undefined);
        let (_effect, runs) = reader(&model);

        model.set("a");
        assert_eq!(model.get(), Value::from("a"));
        model.set("a");
        assert_eq!(runs.get(), 2);
        assert!(model.split().modifiers.is_empty());
    }

    #[test]
    fn try_use_model_reports_errors() {
        let props = Props::new();
        let err = try_use_model(&props, "modelValue", ModelOptions::new()).unwrap_err();
        assert_eq!(
            err,
            ModelError::NoActiveInstance {
                prop: "modelValue".into()
            }
        );

        let inst = unwired(0);
        let err = inst
            .setup(|p| try_use_model(p, "title", ModelOptions::new()))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::UndeclaredProp {
                component: "Input".into(),
                prop: "title".into()
            }
        );
    }

    #[test]
    fn dropped_model_leaves_observer_harmless() {
        let inst = unwired(1);
        let model = inst.setup(|p| use_model(p, "modelValue", ModelOptions::new()));
        drop(model);
        inst.update_raw(RawProps::new().with_value("modelValue", 2));
        assert_eq!(inst.observer_count(), 1);
    }

    #[test]
    fn options_debug() {
        let opts = ModelOptions::new().set(Value::clone);
        assert_eq!(
            format!("{opts:?}"),
            "ModelOptions { get: false, set: true }"
        );
    }
}
