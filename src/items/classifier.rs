//! Shape-based entry classification.
//!
//! An entry has no explicit type tag. Its type is the first shape, in
//! declaration order, whose constraints it satisfies exactly: every
//! mandatory key present and truthy with the right kind, every optional key
//! either absent, falsy, or of the right kind, and no keys beyond the shape's own.

use crate::types::{Entry, Field, ItemType, ListenerScope};

/// Primitive kind a key must hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Object,
    String,
    Function,
}

#[derive(Debug)]
struct Constraint {
    key: &'static str,
    kind: Kind,
    optional: bool,
    values: Option<&'static [&'static str]>,
}

impl Constraint {
    const fn required(key: &'static str, kind: Kind) -> Self {
        Self {
            key,
            kind,
            optional: false,
            values: None,
        }
    }

    const fn optional(key: &'static str, kind: Kind) -> Self {
        Self {
            key,
            kind,
            optional: true,
            values: None,
        }
    }

    const fn one_of(self, values: &'static [&'static str]) -> Self {
        Self {
            values: Some(values),
            ..self
        }
    }
}

#[derive(Debug)]
struct Shape {
    item_type: ItemType,
    constraints: &'static [Constraint],
}

static SHAPES: [Shape; 4] = [
    Shape {
        item_type: ItemType::Data,
        constraints: &[Constraint::required("data", Kind::Object)],
    },
    Shape {
        item_type: ItemType::Event,
        constraints: &[
            Constraint::required("event", Kind::String),
            Constraint::optional("info", Kind::Object),
            Constraint::optional("data", Kind::Object),
        ],
    },
    Shape {
        item_type: ItemType::ListenerOn,
        constraints: &[
            Constraint::required("on", Kind::String),
            Constraint::required("handler", Kind::Function),
            Constraint::optional("scope", Kind::String).one_of(&ListenerScope::VALUES),
            Constraint::optional("path", Kind::String),
        ],
    },
    Shape {
        item_type: ItemType::ListenerOff,
        constraints: &[
            Constraint::required("off", Kind::String),
            Constraint::optional("handler", Kind::Function),
            Constraint::optional("scope", Kind::String).one_of(&ListenerScope::VALUES),
            Constraint::optional("path", Kind::String),
        ],
    },
];

fn kind_of(field: &Field) -> Option<Kind> {
    match field {
        Field::Handler(_) => Some(Kind::Function),
        Field::Value(serde_json::Value::Object(_)) => Some(Kind::Object),
        Field::Value(serde_json::Value::String(_)) => Some(Kind::String),
        Field::Value(_) => None,
    }
}

fn satisfies(field: &Field, constraint: &Constraint) -> bool {
    if kind_of(field) != Some(constraint.kind) {
        return false;
    }
    match (constraint.values, field.as_value().and_then(|v| v.as_str())) {
        (Some(values), Some(s)) => values.contains(&s),
        (Some(_), None) => false,
        (None, _) => true,
    }
}

fn has_custom_keys(entry: &Entry, shape: &Shape) -> bool {
    if entry.len() > shape.constraints.len() {
        return true;
    }
    entry
        .keys()
        .any(|key| !shape.constraints.iter().any(|c| c.key == key))
}

fn matches_shape(entry: &Entry, shape: &Shape) -> bool {
    for constraint in shape.constraints {
        let field = entry.get(constraint.key);
        let ok = match field {
            Some(f) if f.is_truthy() => satisfies(f, constraint),
            _ => constraint.optional,
        };
        if !ok {
            return false;
        }
    }
    !has_custom_keys(entry, shape)
}

/// Determine the type of an entry, or `None` if it matches no shape.
pub fn classify(entry: &Entry) -> Option<ItemType> {
    SHAPES
        .iter()
        .find(|shape| matches_shape(entry, shape))
        .map(|shape| shape.item_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Handler;
    use serde_json::json;

    fn handler() -> Handler {
        Handler::new(|_| Ok(()))
    }

    #[test]
    fn test_data_entry() {
        assert_eq!(classify(&Entry::data(json!({"a": 1}))), Some(ItemType::Data));
        assert_eq!(classify(&Entry::data(json!({}))), Some(ItemType::Data));
    }

    #[test]
    fn test_data_must_be_object() {
        assert_eq!(classify(&Entry::data(json!("text"))), None);
        assert_eq!(classify(&Entry::data(json!([1, 2]))), None);
        assert_eq!(classify(&Entry::data(json!(null))), None);
    }

    #[test]
    fn test_event_entry() {
        assert_eq!(classify(&Entry::event("click")), Some(ItemType::Event));
        let with_all = Entry::from_json(json!({
            "event": "click",
            "info": {"x": 1},
            "data": {"a": 1}
        }));
        assert_eq!(classify(&with_all), Some(ItemType::Event));
    }

    #[test]
    fn test_event_name_must_be_non_empty() {
        assert_eq!(classify(&Entry::event("")), None);
    }

    #[test]
    fn test_falsy_optional_is_ignored() {
        let entry = Entry::from_json(json!({"event": "click", "info": null}));
        assert_eq!(classify(&entry), Some(ItemType::Event));
    }

    #[test]
    fn test_wrong_optional_kind_rejects() {
        let entry = Entry::from_json(json!({"event": "click", "info": "nope"}));
        assert_eq!(classify(&entry), None);
    }

    #[test]
    fn test_listener_on() {
        let entry = Entry::on("click", handler());
        assert_eq!(classify(&entry), Some(ItemType::ListenerOn));

        let scoped = Entry::on("click", handler())
            .scope(ListenerScope::Past)
            .path("page.title");
        assert_eq!(classify(&scoped), Some(ItemType::ListenerOn));
    }

    #[test]
    fn test_listener_on_requires_handler() {
        let entry = Entry::from_json(json!({"on": "click"}));
        assert_eq!(classify(&entry), None);
    }

    #[test]
    fn test_handler_must_be_function() {
        let entry = Entry::from_json(json!({"on": "click", "handler": "fn"}));
        assert_eq!(classify(&entry), None);
    }

    #[test]
    fn test_unknown_scope_rejects() {
        let entry = Entry::on("click", handler()).with("scope", json!("sometimes"));
        assert_eq!(classify(&entry), None);
    }

    #[test]
    fn test_listener_off() {
        assert_eq!(classify(&Entry::off("click")), Some(ItemType::ListenerOff));
        let with_handler = Entry::off("click").handler(handler()).path("a");
        assert_eq!(classify(&with_handler), Some(ItemType::ListenerOff));
    }

    #[test]
    fn test_extra_keys_reject() {
        let entry = Entry::data(json!({"a": 1})).with("extra", json!(true));
        assert_eq!(classify(&entry), None);

        let entry = Entry::on("click", handler()).with("once", json!(true));
        assert_eq!(classify(&entry), None);
    }

    #[test]
    fn test_unrelated_entries_are_invalid() {
        assert_eq!(classify(&Entry::from_json(json!({"foo": 1}))), None);
        assert_eq!(classify(&Entry::from_json(json!(42))), None);
        assert_eq!(classify(&Entry::new()), None);
    }

    #[test]
    fn test_mixed_shapes_are_invalid() {
        let entry = Entry::event("click").with("on", json!("click"));
        assert_eq!(classify(&entry), None);
    }
}
