//! Listener scope and deregistration tests.

use datalayer::{events, DataLayer, DataLayerConfig, Entry, Handler, ListenerScope};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

fn recorder() -> (Handler, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler = Handler::new(move |n| {
        sink.lock().push(n.item.entry().to_json());
        Ok(())
    });
    (handler, seen)
}

fn layer_with_history() -> DataLayer {
    let mut layer = DataLayer::new(DataLayerConfig::default());
    layer.push([
        Entry::data(json!({"a": 1})),
        Entry::event("click"),
        Entry::data(json!({"b": 2})),
    ]);
    layer
}

// --- Scopes ---

#[test]
fn test_past_scope_gets_history_only() {
    let mut layer = layer_with_history();
    let (h, seen) = recorder();

    layer.push([Entry::on(events::CHANGE, h).scope(ListenerScope::Past)]);
    layer.push([Entry::data(json!({"c": 3}))]);

    assert_eq!(
        *seen.lock(),
        vec![json!({"data": {"a": 1}}), json!({"data": {"b": 2}})]
    );
    assert_eq!(layer.listener_count(), 0);
}

#[test]
fn test_future_scope_gets_new_entries_only() {
    let mut layer = layer_with_history();
    let (h, seen) = recorder();

    layer.push([Entry::on(events::CHANGE, h).scope(ListenerScope::Future)]);
    layer.push([Entry::data(json!({"c": 3})), Entry::data(json!({"d": 4}))]);

    assert_eq!(
        *seen.lock(),
        vec![json!({"data": {"c": 3}}), json!({"data": {"d": 4}})]
    );
    assert_eq!(layer.listener_count(), 1);
}

#[test]
fn test_all_scope_gets_history_then_new_entries() {
    let mut layer = layer_with_history();
    let (h, seen) = recorder();

    layer.push([Entry::on("click", h).scope(ListenerScope::All)]);
    assert_eq!(seen.lock().len(), 1);

    layer.push([Entry::event("click").with("info", json!({"n": 2}))]);
    assert_eq!(
        *seen.lock(),
        vec![
            json!({"event": "click"}),
            json!({"event": "click", "info": {"n": 2}}),
        ]
    );
}

#[test]
fn test_past_scope_at_replay_sees_only_earlier_entries() {
    let (h, seen) = recorder();
    let layer = DataLayer::new(DataLayerConfig::with_entries(vec![
        Entry::data(json!({"a": 1})),
        Entry::from_json(json!({"bogus": true})),
        Entry::data(json!({"b": 2})),
        Entry::on(events::CHANGE, h).scope(ListenerScope::Past),
        Entry::data(json!({"c": 3})),
    ]));

    assert_eq!(
        *seen.lock(),
        vec![json!({"data": {"a": 1}}), json!({"data": {"b": 2}})]
    );
    assert_eq!(layer.len(), 3);
}

#[test]
fn test_past_scope_with_path_filter() {
    let mut layer = DataLayer::new(DataLayerConfig::default());
    layer.push([
        Entry::data(json!({"page": {"title": "Home"}})),
        Entry::data(json!({"user": {"id": 1}})),
        Entry::data(json!({"page": null})),
    ]);

    let values = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&values);
    let handler = Handler::new(move |n| {
        sink.lock().push((n.value.cloned(), n.change.is_some()));
        Ok(())
    });
    layer.push([Entry::on(events::CHANGE, handler)
        .scope(ListenerScope::Past)
        .path("page.title")]);

    assert_eq!(
        *values.lock(),
        vec![(Some(json!("Home")), false), (None, false)]
    );
}

#[test]
fn test_listener_in_same_push_does_not_see_siblings_as_history() {
    let mut layer = DataLayer::new(DataLayerConfig::default());
    let (h, seen) = recorder();

    layer.push([
        Entry::data(json!({"a": 1})),
        Entry::on(events::CHANGE, h).scope(ListenerScope::Past),
    ]);

    assert!(seen.lock().is_empty());
}

// --- Deregistration ---

#[test]
fn test_off_by_event_removes_all() {
    let mut layer = DataLayer::new(DataLayerConfig::default());
    let (h1, seen1) = recorder();
    let (h2, seen2) = recorder();

    layer.push([
        Entry::on("click", h1),
        Entry::on("click", h2).path("a"),
        Entry::off("click"),
    ]);
    layer.push([Entry::event("click")]);

    assert_eq!(layer.listener_count(), 0);
    assert!(seen1.lock().is_empty());
    assert!(seen2.lock().is_empty());
}

#[test]
fn test_off_by_event_and_handler_removes_pair() {
    let mut layer = DataLayer::new(DataLayerConfig::default());
    let (h1, seen1) = recorder();
    let (h2, seen2) = recorder();

    layer.push([
        Entry::on("click", h1.clone()),
        Entry::on("submit", h1.clone()),
        Entry::on("click", h2),
    ]);
    layer.push([Entry::off("click").handler(h1)]);
    layer.push([Entry::event("click"), Entry::event("submit")]);

    assert_eq!(layer.listener_count(), 2);
    assert_eq!(*seen1.lock(), vec![json!({"event": "submit"})]);
    assert_eq!(*seen2.lock(), vec![json!({"event": "click"})]);
}

#[test]
fn test_off_by_path() {
    let mut layer = DataLayer::new(DataLayerConfig::default());
    let (h, _) = recorder();

    layer.push([
        Entry::on(events::CHANGE, h.clone()).path("page"),
        Entry::on(events::CHANGE, h).path("user"),
    ]);
    layer.push([Entry::off(events::CHANGE).path("page")]);

    assert_eq!(layer.listener_count(), 1);
}

#[test]
fn test_off_without_match_is_noop() {
    let mut layer = DataLayer::new(DataLayerConfig::default());
    let (h, _) = recorder();
    layer.push([Entry::on("click", h)]);

    assert_eq!(layer.push([Entry::off("submit")]), None);
    assert_eq!(layer.listener_count(), 1);
}

#[test]
fn test_duplicate_registrations_fire_twice() {
    let mut layer = DataLayer::new(DataLayerConfig::default());
    let (h, seen) = recorder();
    layer.push([Entry::on("click", h.clone()), Entry::on("click", h)]);
    layer.push([Entry::event("click")]);

    assert_eq!(seen.lock().len(), 2);
}
