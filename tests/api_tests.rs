//! Integrationstests für die Draw-Fassade:
//! - add/get Round-Trip und ID-Vergabe
//! - set (Idempotenz, Löschen fehlender Features, Fehlerfälle)
//! - Modus-Guards und Rückfall aus direct_select
//! - Render-Batching über die öffentliche API

use geo_draw_core::app::{Collaborators, DefaultModeHandler};
use geo_draw_core::{
    Draw, DrawError, DrawEvent, DrawOptions, EventSink, Mode, ModeName, RenderFrame, RenderSink,
    VertexHitTester,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct Recorder {
    frames: Rc<RefCell<Vec<RenderFrame>>>,
    events: Rc<RefCell<Vec<DrawEvent>>>,
}

impl RenderSink for Recorder {
    fn render(&mut self, frame: &RenderFrame) {
        self.frames.borrow_mut().push(frame.clone());
    }
}

impl EventSink for Recorder {
    fn emit(&mut self, event: &DrawEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

fn draw_with(options: DrawOptions) -> (Draw, Recorder) {
    let recorder = Recorder::default();
    let collaborators = Collaborators {
        render_sink: Box::new(recorder.clone()),
        event_sink: Box::new(recorder.clone()),
        mode_handler: Box::new(DefaultModeHandler),
        hit_tester: Box::new(VertexHitTester::new(options.click_buffer)),
    };
    (Draw::with_collaborators(options, collaborators), recorder)
}

fn draw() -> (Draw, Recorder) {
    draw_with(DrawOptions::default())
}

fn collection() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "punkt",
                "properties": { "name": "A" },
                "geometry": { "type": "Point", "coordinates": [1, 2] }
            },
            {
                "type": "Feature",
                "id": "flaeche",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]]
                }
            },
            {
                "type": "Feature",
                "id": "linie",
                "properties": { "breite": 2.5 },
                "geometry": { "type": "LineString", "coordinates": [[0, 0], [1.5, 1], [3, 0]] }
            }
        ]
    })
}

// ─── add / get ───────────────────────────────────────────────────────────────

#[test]
fn test_add_point_without_id_round_trips() {
    let (mut draw, _) = draw();
    let ids = draw
        .add(&json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [1, 2] },
                "properties": {}
            }]
        }))
        .expect("gültiges GeoJSON");

    assert_eq!(ids.len(), 1);
    let feature = draw.get(&ids[0]).expect("Feature muss existieren");
    assert_eq!(
        feature,
        json!({
            "type": "Feature",
            "id": ids[0],
            "geometry": { "type": "Point", "coordinates": [1, 2] },
            "properties": {}
        })
    );
}

#[test]
fn test_add_round_trips_every_feature() {
    let (mut draw, _) = draw();
    let input = collection();
    let ids = draw.add(&input).expect("gültiges GeoJSON");

    assert_eq!(ids, vec!["punkt", "flaeche", "linie"]);
    for (id, original) in ids.iter().zip(input["features"].as_array().into_iter().flatten()) {
        assert_eq!(draw.get(id).as_ref(), Some(original));
    }
    assert_eq!(draw.get_all(), input);
}

#[test]
fn test_add_uses_configured_id_prefix() {
    let (mut draw, _) = draw_with(DrawOptions {
        id_prefix: "skizze-".into(),
        ..DrawOptions::default()
    });
    let ids = draw
        .add(&json!({ "type": "MultiPoint", "coordinates": [[0, 0], [1, 1]] }))
        .expect("nackte Geometrie ist erlaubt");

    assert!(ids[0].starts_with("skizze-"));
}

#[test]
fn test_add_errors_leave_store_unchanged() {
    let (mut draw, recorder) = draw();
    draw.add(&collection()).expect("gültiges GeoJSON");
    let before = draw.get_all();
    recorder.frames.borrow_mut().clear();

    let malformed = draw.add(&json!({
        "type": "Feature",
        "properties": {},
        "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 1], [0, 0]]] }
    }));
    assert!(matches!(malformed, Err(DrawError::Validation { .. })));

    let null_geometry = draw.add(&json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "id": "neu", "properties": {},
              "geometry": { "type": "Point", "coordinates": [5, 5] } },
            { "type": "Feature", "id": "leer", "properties": {}, "geometry": null }
        ]
    }));
    assert_eq!(
        null_geometry,
        Err(DrawError::InvalidGeometry { id: "leer".into() })
    );

    assert_eq!(draw.get_all(), before);
    assert!(recorder.frames.borrow().is_empty());
}

#[test]
fn test_add_renders_exactly_once() {
    let (mut draw, recorder) = draw();
    draw.add(&collection()).expect("gültiges GeoJSON");
    assert_eq!(recorder.frames.borrow().len(), 1);
    assert_eq!(
        recorder.frames.borrow()[0].changed_ids,
        vec!["punkt", "flaeche", "linie"]
    );
}

// ─── set ─────────────────────────────────────────────────────────────────────

#[test]
fn test_set_is_idempotent() {
    let (mut draw, _) = draw();
    let input = collection();

    let first_ids = draw.set(&input).expect("set");
    let first_state = draw.get_all();
    let second_ids = draw.set(&input).expect("set");

    assert_eq!(first_ids, second_ids);
    assert_eq!(draw.get_all(), first_state);
}

#[test]
fn test_set_deletes_features_missing_from_collection() {
    let (mut draw, _) = draw();
    draw.set(&collection()).expect("set");

    let ids = draw
        .set(&json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "linie",
                "properties": {},
                "geometry": { "type": "LineString", "coordinates": [[0, 0], [3, 3]] }
            }]
        }))
        .expect("set");

    assert_eq!(ids, vec!["linie"]);
    assert_eq!(draw.store().get_all_ids(), vec!["linie"]);
    assert_eq!(
        draw.get("linie").map(|f| f["geometry"]["coordinates"].clone()),
        Some(json!([[0, 0], [3, 3]]))
    );
}

#[test]
fn test_set_changes_geometry_type_for_existing_id() {
    let (mut draw, _) = draw();
    draw.set(&collection()).expect("set");

    draw.set(&json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "id": "punkt",
            "properties": {},
            "geometry": { "type": "LineString", "coordinates": [[1, 2], [3, 4]] }
        }]
    }))
    .expect("set");

    assert_eq!(draw.get("punkt").map(|f| f["geometry"]["type"].clone()), Some(json!("LineString")));
}

#[test]
fn test_set_rejects_non_collections() {
    let (mut draw, _) = draw();
    draw.set(&collection()).expect("set");

    for input in [
        json!({ "type": "Point", "coordinates": [0, 0] }),
        json!({ "type": "FeatureCollection", "features": "keine" }),
        json!({ "features": [] }),
    ] {
        assert!(matches!(
            draw.set(&input),
            Err(DrawError::InvalidCollection { .. })
        ));
    }
    assert_eq!(draw.store().len(), 3);
}

#[test]
fn test_set_with_empty_collection_deletes_everything() {
    let (mut draw, recorder) = draw();
    draw.set(&collection()).expect("set");
    recorder.frames.borrow_mut().clear();

    let ids = draw
        .set(&json!({ "type": "FeatureCollection", "features": [] }))
        .expect("set");

    assert!(ids.is_empty());
    assert!(draw.store().is_empty());
    assert_eq!(recorder.frames.borrow().len(), 1);
}

// ─── Selektion und Modi ──────────────────────────────────────────────────────

#[test]
fn test_selection_stays_subset_of_store() {
    let (mut draw, _) = draw();
    draw.add(&collection()).expect("add");
    draw.change_mode(Mode::SimpleSelect {
        feature_ids: vec!["punkt".into(), "linie".into(), "gibt_es_nicht".into()],
    })
    .expect("simple_select");

    let all = draw.store().get_all_ids();
    assert!(draw.get_selected_ids().iter().all(|id| all.contains(id)));
    assert_eq!(draw.get_selected_ids().len(), 2);

    draw.delete(&["punkt"]);
    let all = draw.store().get_all_ids();
    assert!(draw.get_selected_ids().iter().all(|id| all.contains(id)));
    assert_eq!(draw.get_selected_ids(), vec!["linie"]);
}

#[test]
fn test_delete_direct_select_target_escapes_to_simple_select() {
    let (mut draw, recorder) = draw();
    draw.add(&collection()).expect("add");
    draw.change_mode(Mode::direct_select("flaeche"))
        .expect("direct_select");
    assert_eq!(draw.get_mode(), ModeName::DirectSelect);
    recorder.events.borrow_mut().clear();

    draw.delete(&["flaeche"]);

    assert_eq!(draw.get_mode(), ModeName::SimpleSelect);
    assert!(draw.get_selected_ids().is_empty());
    assert!(recorder
        .events
        .borrow()
        .iter()
        .any(|e| *e == DrawEvent::ModeChange { mode: ModeName::SimpleSelect }));
}

#[test]
fn test_delete_all_in_direct_select_escapes_to_simple_select() {
    let (mut draw, _) = draw();
    draw.add(&collection()).expect("add");
    draw.change_mode(Mode::direct_select("linie"))
        .expect("direct_select");

    draw.delete_all();

    assert!(draw.store().is_empty());
    assert_eq!(draw.get_mode(), ModeName::SimpleSelect);
}

#[test]
fn test_simple_select_guard_updates_selection_without_mode_change() {
    let (mut draw, recorder) = draw();
    draw.add(&collection()).expect("add");
    recorder.events.borrow_mut().clear();
    recorder.frames.borrow_mut().clear();

    draw.change_mode(Mode::SimpleSelect {
        feature_ids: vec!["punkt".into()],
    })
    .expect("simple_select")
    .change_mode(Mode::SimpleSelect {
        feature_ids: vec!["punkt".into()],
    })
    .expect("simple_select");

    assert_eq!(draw.get_selected_ids(), vec!["punkt"]);
    assert!(recorder.events.borrow().is_empty());
    assert_eq!(recorder.frames.borrow().len(), 1);
}

#[test]
fn test_direct_select_requires_live_target() {
    let (mut draw, _) = draw();
    assert!(matches!(
        draw.change_mode(Mode::direct_select("fehlt")),
        Err(DrawError::InvalidModeOptions { .. })
    ));
    assert_eq!(draw.get_mode(), ModeName::SimpleSelect);
}

#[test]
fn test_default_mode_from_options() {
    let (draw, _) = draw_with(DrawOptions {
        default_mode: ModeName::Static,
        ..DrawOptions::default()
    });
    assert_eq!(draw.get_mode(), ModeName::Static);
}

#[test]
fn test_selected_points_follow_coord_path() {
    let (mut draw, _) = draw();
    draw.add(&collection()).expect("add");
    draw.change_mode(Mode::DirectSelect {
        feature_id: "linie".into(),
        coord_path: Some("1".into()),
    })
    .expect("direct_select");

    let points = draw.get_selected_points();
    assert_eq!(points["type"], "FeatureCollection");
    assert_eq!(points["features"][0]["geometry"]["coordinates"], json!([1.5, 1]));
}

// ─── trash ───────────────────────────────────────────────────────────────────

#[test]
fn test_trash_in_simple_select_deletes_selection() {
    let (mut draw, recorder) = draw();
    draw.add(&collection()).expect("add");
    draw.change_mode(Mode::SimpleSelect {
        feature_ids: vec!["punkt".into(), "flaeche".into()],
    })
    .expect("simple_select");
    recorder.events.borrow_mut().clear();

    draw.trash();

    assert_eq!(draw.store().get_all_ids(), vec!["linie"]);
    let events = recorder.events.borrow();
    let deleted = events
        .iter()
        .find_map(|e| match e {
            DrawEvent::Delete { features } => Some(features.len()),
            _ => None,
        })
        .expect("draw.delete erwartet");
    assert_eq!(deleted, 2);
}

#[test]
fn test_trash_in_static_mode_changes_nothing() {
    let (mut draw, _) = draw();
    draw.add(&collection()).expect("add");
    draw.change_mode(Mode::Static).expect("static");

    draw.trash();

    assert_eq!(draw.store().len(), 3);
}
