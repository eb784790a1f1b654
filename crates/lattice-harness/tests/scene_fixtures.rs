//! Scene fixtures under `tests/scenes`, laid out end to end.

use std::path::PathBuf;

use lattice_harness::{
    HarnessConfig, Placement, load_scene, placements_checksum, run_scene, to_jsonl,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("scenes")
        .join(name)
}

fn placed(run: &[Placement]) -> Vec<(&str, i32, i32, i32, i32)> {
    run.iter()
        .map(|p| (p.id.as_str(), p.x, p.y, p.width, p.height))
        .collect()
}

#[test]
fn flow_wrap_scene() {
    let scene = load_scene(&fixture("flow_wrap.json")).unwrap();
    let run = run_scene(&scene, &HarnessConfig::default()).unwrap();
    assert_eq!(
        placed(&run.placements),
        vec![
            ("first", 5, 5, 95, 20),
            ("second", 105, 5, 95, 20),
            ("third", 5, 30, 50, 20),
        ]
    );
}

#[test]
fn dashboard_scene() {
    let scene = load_scene(&fixture("dashboard.json")).unwrap();
    let config = HarnessConfig {
        revalidate_twice: true,
        ..HarnessConfig::default()
    };
    let run = run_scene(&scene, &config).unwrap();
    assert_eq!(
        placed(&run.placements),
        vec![
            ("open", 5, 5, 40, 20),
            ("save", 50, 5, 40, 20),
            // Packed: 5 + (40 + 5) * 2 + 5 wide, 5 + 20 + 5 tall.
            ("toolbar", 0, 0, 100, 30),
            ("tile", 35, 20, 30, 30),
            // Wider than its 100x70 cell: clamped and pinned to the cell origin.
            ("banner", 200, 70, 100, 10),
            ("board", 0, 60, 300, 140),
        ]
    );
    assert_eq!(run.checksum, placements_checksum(&run.placements));
}

#[test]
fn jsonl_output_parses_back() {
    let scene = load_scene(&fixture("dashboard.json")).unwrap();
    let run = run_scene(&scene, &HarnessConfig::default()).unwrap();
    let jsonl = to_jsonl(&run).unwrap();

    let records: Vec<serde_json::Value> = jsonl
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), run.placements.len() + 1);
    let (footer, placements) = records.split_last().unwrap();
    assert!(placements.iter().all(|r| r["event"] == "placement"));
    assert_eq!(footer["event"], "complete");
    assert_eq!(footer["elements"], 6);
}

#[test]
fn missing_fixture_is_an_io_error() {
    let err = load_scene(&fixture("does_not_exist.json")).unwrap_err();
    assert!(err.to_string().starts_with("i/o error"));
}
