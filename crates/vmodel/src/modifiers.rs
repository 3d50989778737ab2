#![forbid(unsafe_code)]

//! Model modifier flags.
//!
//! Modifiers live next to the bound prop in the owner's prop map, under
//! `<name>Modifiers`. The default model key `modelValue` is the one
//! exception: its modifiers live under `modelModifiers`.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::props::Props;
use crate::value::Value;

/// The unqualified model key.
pub const DEFAULT_MODEL_KEY: &str = "modelValue";

/// Sibling key holding the modifiers of `name`.
#[must_use]
pub fn modifiers_key(name: &str) -> String {
    if name == DEFAULT_MODEL_KEY {
        "modelModifiers".to_owned()
    } else {
        format!("{name}Modifiers")
    }
}

/// Read the modifiers of `name` from `props` without tracking.
///
/// Returns `None` when the sibling is absent or is not an object.
#[must_use]
pub fn get_model_modifiers(props: &Props, name: &str) -> Option<Modifiers> {
    Modifiers::from_value(&props.peek(&modifiers_key(name)))
}

/// Immutable set of modifier flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    flags: Rc<BTreeMap<String, bool>>,
}

impl Modifiers {
    /// Interpret an object value as flags; entries are coerced by truthiness.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            flags: Rc::new(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.is_truthy()))
                    .collect(),
            ),
        })
    }

    /// Whether flag `name` is present and set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Raw flag lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Modifiers {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self {
            flags: Rc::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_key_maps_to_model_modifiers() {
        assert_eq!(modifiers_key("modelValue"), "modelModifiers");
        assert_eq!(modifiers_key("title"), "titleModifiers");
        assert_eq!(modifiers_key("model"), "modelModifiers");
    }

    #[test]
    fn lookup_reads_sibling() {
        let props: Props = [
            ("modelModifiers", Value::object([("trim", true)])),
            ("titleModifiers", Value::object([("capitalize", true)])),
        ]
        .into_iter()
        .collect();

        let model = get_model_modifiers(&props, "modelValue").unwrap();
        assert!(model.contains("trim"));
        assert!(!model.contains("capitalize"));

        let title = get_model_modifiers(&props, "title").unwrap();
        assert!(title.contains("capitalize"));
    }

    #[test]
    fn absent_or_non_object_is_none() {
        let props: Props = [("countModifiers", Value::from(1))].into_iter().collect();
        assert_eq!(get_model_modifiers(&props, "count"), None);
        assert_eq!(get_model_modifiers(&props, "missing"), None);
    }

    #[test]
    fn flags_coerce_truthiness() {
        let m = Modifiers::from_value(&Value::object([
            ("lazy", Value::from(false)),
            ("number", Value::from(1)),
        ]))
        .unwrap();
        assert_eq!(m.get("lazy"), Some(false));
        assert!(!m.contains("lazy"));
        assert!(m.contains("number"));
        assert_eq!(m.iter().collect::<Vec<_>>(), [("lazy", false), ("number", true)]);
    }

    #[test]
    fn collect_from_pairs() {
        let m: Modifiers = [("trim", true)].into_iter().collect();
        assert_eq!(m.len(), 1);
        assert!(!Modifiers::default().contains("trim"));
        assert!(Modifiers::default().is_empty());
    }
}
