#![forbid(unsafe_code)]

//! Two-way bound model cells.
//!
//! A [`ModelRef`] mirrors a prop owned by a component's owner, accepts local
//! writes, and reports writes back to the owner as `update:<name>` events.
//!
//! # Quick start
//!
//! ```
//! use vmodel::{ComponentDecl, Instance, ModelOptions, RawProps, Value, use_model};
//!
//! let raw = RawProps::new().with_value("title", "draft");
//! let child = Instance::mount(ComponentDecl::new("Editor").model("title"), raw);
//!
//! let title = child.setup(|props| use_model(props, "title", ModelOptions::new()));
//! assert_eq!(title.get(), Value::from("draft"));
//!
//! // No `update:title` listener was passed, so the write stays local.
//! title.set("final");
//! assert_eq!(title.get(), Value::from("final"));
//! ```
//!
//! # Modules
//!
//! - [`value`]: dynamic prop values and change detection.
//! - [`naming`]: key spelling variants (`modelValue` / `model-value`).
//! - [`props`]: the tracked, owner-held prop map.
//! - [`instance`]: hosting context, raw owner payload, event emission.
//! - [`model`]: the binding cell and its constructors.
//! - [`modifiers`]: modifier flag lookup.
//! - [`diagnostics`]: misuse reports and the scoped warn handler.

pub mod diagnostics;
pub mod instance;
pub mod model;
pub mod modifiers;
pub mod naming;
pub mod props;
pub mod value;

pub use diagnostics::{ModelError, WarnHandlerGuard, set_warn_handler};
pub use instance::{ComponentDecl, Instance, Listener, RawProps, current_instance};
pub use model::{ModelOptions, ModelPair, ModelRef, try_use_model, use_model};
pub use modifiers::{DEFAULT_MODEL_KEY, Modifiers, get_model_modifiers, modifiers_key};
pub use naming::{KeyVariants, camelize, hyphenate};
pub use props::Props;
pub use value::{Value, has_changed};

pub use vmodel_reactive as reactive;
