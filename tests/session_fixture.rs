//! End-to-end sessions against the in-memory fixture backend.

use knotview::fixture::{FixtureBackend, FixtureData};
use knotview::fs::RealFs;
use knotview::model::ListMode;
use knotview::render::{Hit, TerminalSurface};
use knotview::state::{NOTHING_SELECTED, NOTHING_SELECTED_YET, Page, PanelSubject, Severity};
use knotview::{GraphViewController, Session, ViewOptions};
use std::io::Sink;
use std::path::Path;

type FixtureSession = Session<FixtureBackend, TerminalSurface<Sink>>;

fn sample() -> FixtureBackend {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/sample.json");
    FixtureBackend::load(&path, &RealFs).unwrap()
}

async fn started(backend: FixtureBackend) -> FixtureSession {
    let controller =
        GraphViewController::new(TerminalSurface::new(std::io::sink()), ViewOptions::default());
    let mut session = Session::new(backend, controller);
    session.start();
    session.settle().await;
    session
}

fn minimal() -> FixtureBackend {
    let data: FixtureData = serde_json::from_str(
        r#"{
            "projectName": "tiny",
            "nodes": [
                {"id": "n1", "group": "class", "level": 0},
                {"id": "n2", "group": "jar", "level": 1}
            ],
            "edges": [{"id": "e1", "from": "n1", "to": "n2"}]
        }"#,
    )
    .unwrap();
    FixtureBackend::from_data(data).unwrap()
}

#[tokio::test]
async fn test_startup_fills_every_region() {
    let session = started(sample()).await;
    let state = session.controller().state();

    assert_eq!(state.project_name.as_deref(), Some("petclinic"));
    assert_eq!(state.snapshot.nodes.len(), 6);
    assert_eq!(state.snapshot.edges.len(), 5);
    assert_eq!(state.classpath.len(), 3);
    assert!(state.reports.unreferenced.is_some());
    assert!(state.reports.missing.is_some());
    assert!(state.reports.metrics.is_some());
    assert!(state.active_filters.is_empty());
    assert!(state.notifications().is_empty());

    assert!(state.selected_node().is_none());
    assert_eq!(state.panel.markup, NOTHING_SELECTED_YET);
    // the terminal surface settles immediately
    assert!(!state.zoom_locked);
    assert!(!session.controller().surface().physics());
}

#[tokio::test]
async fn test_click_node_then_arc() {
    let mut session = started(minimal()).await;

    session.gesture(|c| c.on_click(Hit::Node("n1".into())));
    assert_eq!(session.in_flight(), 1);
    session.settle().await;

    let state = session.controller().state();
    assert_eq!(state.selected_node(), Some("n1"));
    assert_eq!(state.panel.subject, PanelSubject::Node("n1".into()));
    assert!(state.panel.markup.contains("n1"));

    session.gesture(|c| c.on_click(Hit::Edge("e1".into())));
    session.settle().await;

    let state = session.controller().state();
    assert!(state.selected_node().is_none());
    assert_eq!(state.panel.subject, PanelSubject::Arc("e1".into()));
    assert!(state.panel.markup.contains("n1 depends on n2"));
    assert!(state.panel.markup.contains("| dependent | | dependency |"));
}

#[tokio::test]
async fn test_click_on_empty_space_clears_detail() {
    let mut session = started(sample()).await;
    session.gesture(|c| c.select_node("n3"));
    session.settle().await;

    session.gesture(|c| c.on_click(Hit::None));
    assert_eq!(session.in_flight(), 0);
    assert_eq!(session.controller().state().panel.markup, NOTHING_SELECTED);
}

#[tokio::test]
async fn test_list_mode_reloads_and_reselects() {
    let mut session = started(sample()).await;
    session.gesture(|c| c.select_node("n3"));
    session.settle().await;

    session.gesture(|c| c.change_list_mode(ListMode::Expanded));
    session.settle().await;

    let state = session.controller().state();
    assert_eq!(state.selected_node(), Some("n3"));
    assert_eq!(state.panel.subject, PanelSubject::Node("n3".into()));
    let inspected = state.list_mode.as_ref().unwrap();
    assert_eq!(inspected.node_id, "n3");
    assert_eq!(inspected.mode, ListMode::Expanded);
    assert_eq!(
        session.controller().surface().selected(),
        &["n3".to_string()]
    );
}

#[tokio::test]
async fn test_gestures_without_selection_send_nothing() {
    let mut session = started(sample()).await;

    session.gesture(|c| c.change_list_mode(ListMode::Collapsed));
    session.gesture(|c| c.implied_only(true));
    session.gesture(|c| c.set_filter("   "));

    assert_eq!(session.in_flight(), 0);
}

#[tokio::test]
async fn test_group_filter_round_trip() {
    let mut session = started(sample()).await;

    session.gesture(|c| c.set_filter("jar"));
    session.settle().await;

    let state = session.controller().state();
    assert_eq!(state.snapshot.nodes.len(), 4);
    let mut arcs: Vec<&str> = state.snapshot.edges.iter().map(|e| e.id.as_str()).collect();
    arcs.sort();
    assert_eq!(arcs, vec!["e3", "e5"]);
    assert_eq!(state.active_filters, vec!["jar".to_string()]);
    assert_eq!(state.panel.markup, NOTHING_SELECTED_YET);

    session.gesture(|c| c.set_filter("jar"));
    session.settle().await;
    assert_eq!(session.controller().state().snapshot.nodes.len(), 6);
    assert!(session.controller().state().active_filters.is_empty());
}

#[tokio::test]
async fn test_implied_by_selected_node() {
    let mut session = started(sample()).await;
    session.gesture(|c| c.select_node("n3"));
    session.settle().await;

    session.gesture(|c| c.implied_only(true));
    session.settle().await;

    let state = session.controller().state();
    let mut ids: Vec<&str> = state.snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["n3", "n4", "n5"]);
    assert_eq!(
        state.active_filters,
        vec!["required by org.petclinic.owner".to_string()]
    );
}

#[tokio::test]
async fn test_search_outcomes() {
    let mut session = started(sample()).await;

    session.controller_mut().state_mut().page = Page::Classpath;
    session.gesture(|c| c.search_by_name("ownercontroller"));
    session.settle().await;
    let state = session.controller().state();
    assert_eq!(state.page, Page::Graph);
    assert_eq!(state.selected_node(), Some("n4"));
    assert_eq!(state.panel.subject, PanelSubject::Node("n4".into()));

    session.gesture(|c| c.search_by_name(".jar"));
    session.settle().await;
    let state = session.controller().state();
    assert!(state.selected_node().is_none());
    assert!(state.panel.markup.starts_with("2 nodes match"));

    session.gesture(|c| c.search_by_name("nothing-like-this"));
    session.settle().await;
    assert!(
        session
            .controller()
            .state()
            .panel
            .markup
            .contains("No node matches")
    );
}

#[tokio::test]
async fn test_arc_without_reasons_renders_header_only() {
    let mut session = started(sample()).await;

    session.gesture(|c| c.show_arc_detail("e4"));
    session.settle().await;

    let state = session.controller().state();
    assert_eq!(state.panel.subject, PanelSubject::Arc("e4".into()));
    assert!(state.panel.markup.contains("commons-io.jar depends on spring-web.jar"));
    assert_eq!(
        state
            .panel
            .markup
            .lines()
            .filter(|l| l.contains("| depends on |"))
            .count(),
        0
    );
    assert!(state.notifications().is_empty());
}

#[tokio::test]
async fn test_invalid_selection_sends_nothing() {
    let mut session = started(sample()).await;

    session.gesture(|c| c.select_node("missing"));
    assert_eq!(session.in_flight(), 0);

    let state = session.controller().state();
    assert!(state.selected_node().is_none());
    assert_eq!(state.panel.markup, NOTHING_SELECTED);
    assert!(
        state
            .notifications()
            .iter()
            .all(|n| n.severity != Severity::Error)
    );
}

#[tokio::test]
async fn test_cycles_only_filter() {
    let mut session = started(sample()).await;

    session.gesture(|c| c.set_filter("cycles only"));
    session.settle().await;

    let state = session.controller().state();
    let mut ids: Vec<&str> = state.snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["n3", "n4"]);
    let mut arcs: Vec<&str> = state.snapshot.edges.iter().map(|e| e.id.as_str()).collect();
    arcs.sort();
    assert_eq!(arcs, vec!["e3", "e5"]);
    assert_eq!(state.active_filters, vec!["cycles only".to_string()]);
}

#[tokio::test]
async fn test_unknown_filter_is_reported_not_listed() {
    let mut session = started(sample()).await;

    session.gesture(|c| c.set_filter("no such filter"));
    session.settle().await;

    let state = session.controller_mut().state_mut();
    assert_eq!(state.snapshot.nodes.len(), 6);
    assert!(state.active_filters.is_empty());
    let notes = state.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Error);
    assert!(notes[0].message.contains("filter 'no such filter'"));
}
