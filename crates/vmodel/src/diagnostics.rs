#![forbid(unsafe_code)]

//! Misuse diagnostics for model construction.
//!
//! Constructing a model outside a hosting context, or for a prop the
//! component never declared, is reported here and never aborts the caller.
//! Every report is a `tracing::warn!` event; a scoped [`WarnHandler`] can
//! additionally observe reports (tests, dev overlays).

use std::cell::RefCell;
use std::rc::Rc;

/// Invalid model construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// No component instance was in setup when the model was requested.
    NoActiveInstance {
        /// The requested prop.
        prop: String,
    },
    /// The component does not declare the requested prop.
    UndeclaredProp {
        /// Name of the component whose setup made the request.
        component: String,
        /// The requested prop.
        prop: String,
    },
}

impl ModelError {
    /// The prop the failed request named.
    #[must_use]
    pub fn prop(&self) -> &str {
        match self {
            Self::NoActiveInstance { prop } | Self::UndeclaredProp { prop, .. } => prop,
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveInstance { .. } => {
                write!(f, "use_model() called without active instance")
            }
            Self::UndeclaredProp { prop, .. } => {
                write!(f, "use_model() called with prop \"{prop}\" which is not declared")
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// Callback observing misuse reports.
pub type WarnHandler = Rc<dyn Fn(&ModelError)>;

thread_local! {
    static HANDLERS: RefCell<Vec<WarnHandler>> = const { RefCell::new(Vec::new()) };
}

/// Install a warn handler for the current thread. Dropping the guard restores
/// the previously installed handler.
#[must_use = "dropping this guard removes the warn handler"]
pub fn set_warn_handler(handler: impl Fn(&ModelError) + 'static) -> WarnHandlerGuard {
    HANDLERS.with(|h| h.borrow_mut().push(Rc::new(handler)));
    WarnHandlerGuard { _private: () }
}

/// RAII guard for a scoped warn handler.
#[must_use = "dropping this guard removes the warn handler"]
pub struct WarnHandlerGuard {
    _private: (),
}

impl Drop for WarnHandlerGuard {
    fn drop(&mut self) {
        HANDLERS.with(|h| {
            h.borrow_mut().pop();
        });
    }
}

impl std::fmt::Debug for WarnHandlerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarnHandlerGuard").finish()
    }
}

pub(crate) fn report(err: &ModelError) {
    match err {
        ModelError::NoActiveInstance { prop } => {
            tracing::warn!(prop = %prop, "{err}");
        }
        ModelError::UndeclaredProp { component, prop } => {
            tracing::warn!(component = %component, prop = %prop, "{err}");
        }
    }
    let handler = HANDLERS.with(|h| h.borrow().last().cloned());
    if let Some(handler) = handler {
        handler(err);
    }
}
