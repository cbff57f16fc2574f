//! End-to-end tests for activity recording: credit, propagation and decay
//! observed through the query interface.

use std::path::Path;

use doi_graph::view::{self, Band, BandFilter};
use doi_graph::{DoiConfig, DoiGraph, GraphStore, NodePath};
use pretty_assertions::assert_eq;

const EPS: f64 = 1e-9;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Chain a.ts → b.ts → c.ts, plus an unrelated d.ts.
async fn setup_chain(config: DoiConfig) -> (tempfile::TempDir, DoiGraph) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "a.ts", "import { b } from './b';");
    write(root, "b.ts", "import { c } from './c';");
    write(root, "c.ts", "");
    write(root, "d.ts", "");
    let graph = DoiGraph::initialize(root, config).await.unwrap();
    (dir, graph)
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < EPS
}

// ============================================================================
// 1. Single events
// ============================================================================

#[tokio::test]
async fn test_navigation_credits_direct_neighbors() {
    let (_dir, mut graph) = setup_chain(DoiConfig::default()).await;

    let credited = graph.record_navigation("b.ts");

    assert_eq!(credited, 3);
    assert!(close(graph.query_weight("b.ts"), 9.95));
    assert!(close(graph.query_weight("a.ts"), 1.95));
    assert!(close(graph.query_weight("c.ts"), 1.95));
    assert_eq!(graph.query_weight("d.ts"), 0.0);
}

#[tokio::test]
async fn test_edit_is_weaker_than_navigation() {
    let (_dir, mut graph) = setup_chain(DoiConfig::default()).await;

    graph.record_edit("a.ts");

    assert!(close(graph.query_weight("a.ts"), 4.95));
    assert!(close(graph.query_weight("b.ts"), 0.95));
    // c is two hops from a
    assert_eq!(graph.query_weight("c.ts"), 0.0);
}

#[tokio::test]
async fn test_extension_elided_activity_hits_same_node() {
    let (_dir, mut graph) = setup_chain(DoiConfig::default()).await;

    graph.record_navigation("b");
    assert!(close(graph.query_weight("b.ts"), 9.95));
}

#[tokio::test]
async fn test_untracked_file_still_ticks_decay() {
    let (_dir, mut graph) = setup_chain(DoiConfig::default()).await;
    graph.record_navigation("d.ts");

    let credited = graph.record_navigation("nowhere.ts");

    assert_eq!(credited, 0);
    assert!(close(graph.query_weight("d.ts"), 9.90));
    assert!(!graph.store().contains(&graph.normalize("nowhere.ts")));
}

#[tokio::test]
async fn test_wider_hop_bound_reaches_further() {
    let mut config = DoiConfig::default();
    config.weights.hop_bound = 2;
    let (_dir, mut graph) = setup_chain(config).await;

    graph.record_navigation("a.ts");

    assert!(close(graph.query_weight("b.ts"), 2.0 - 0.05));
    assert!(close(graph.query_weight("c.ts"), 0.4 - 0.05));
}

// ============================================================================
// 2. Sequences
// ============================================================================

#[tokio::test]
async fn test_weights_decay_to_zero_and_stay_there() {
    let (_dir, mut graph) = setup_chain(DoiConfig::default()).await;
    graph.record_edit("a.ts");

    // 100 events elsewhere decay b's 0.95 past zero
    for _ in 0..100 {
        graph.record_edit("d.ts");
    }

    assert_eq!(graph.query_weight("b.ts"), 0.0);
    for row in graph.query_sorted_by_weight() {
        assert!(row.weight >= 0.0, "{} went negative", row.path);
    }
}

#[tokio::test]
async fn test_ranking_follows_activity() {
    let (_dir, mut graph) = setup_chain(DoiConfig::default()).await;

    graph.record_navigation("c.ts");
    graph.record_navigation("c.ts");
    graph.record_edit("a.ts");

    let order: Vec<NodePath> = graph.query_sorted_by_weight().into_iter().map(|r| r.path).collect();
    let expected: Vec<NodePath> = ["c.ts", "a.ts", "b.ts", "d.ts"].iter().map(|p| graph.normalize(p)).collect();
    assert_eq!(order, expected);
}

#[tokio::test]
async fn test_sorted_neighbors_of_hub() {
    let (_dir, mut graph) = setup_chain(DoiConfig::default()).await;
    graph.record_navigation("c.ts");

    let rows = graph.query_sorted_neighbors("b.ts");
    let order: Vec<NodePath> = rows.iter().map(|r| r.path.clone()).collect();
    assert_eq!(order, vec![graph.normalize("c.ts"), graph.normalize("a.ts")]);
}

// ============================================================================
// 3. Presentation
// ============================================================================

#[tokio::test]
async fn test_bands_over_a_busy_session() {
    let (_dir, mut graph) = setup_chain(DoiConfig::default()).await;
    for _ in 0..12 {
        graph.record_navigation("a.ts");
    }

    let bands = graph.config().bands;
    let ranked = graph.query_sorted_by_weight();

    assert_eq!(bands.classify(graph.query_weight("a.ts")), Band::High);
    assert_eq!(bands.classify(graph.query_weight("b.ts")), Band::Cold);

    let hot = view::filter_ranked(&ranked, BandFilter::High, &bands);
    assert_eq!(hot.len(), 1);
    assert_eq!(view::directory_weight(&ranked, graph.root()), graph.query_weight("a.ts"));
}
