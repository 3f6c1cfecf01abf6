mod common;

use town_gen::flush::{SECTIONS, flush_to_jsonl, read_jsonl};
use town_gen::model::Event;
use town_gen::model::snapshot::{
    BeliefRecord, BlockRecord, BusinessRecord, DwellingRecord, LotRecord, ResidentRecord, StreetRecord,
};
use town_gen::sim::generate_world;

#[test]
fn flush_produces_valid_jsonl_files() {
    let sim = generate_world(common::config_for_years(2), 5).expect("generation succeeds");
    let snapshot = sim.world.snapshot();
    let dir = tempfile::tempdir().unwrap();

    flush_to_jsonl(&snapshot, dir.path()).unwrap();

    for section in SECTIONS {
        let path = dir.path().join(format!("{section}.jsonl"));
        assert!(path.exists(), "{section}.jsonl missing");
        for line in common::read_lines(&path) {
            let v: serde_json::Value = serde_json::from_str(&line).unwrap();
            assert!(v.is_object(), "{section} line is not an object");
        }
    }

    let residents = common::read_lines(&dir.path().join("residents.jsonl"));
    assert_eq!(residents.len(), snapshot.residents.len());
    for line in &residents {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v.get("id").is_some());
        assert!(v.get("first_name").is_some());
        // Mental models and relationships stay out of the resident dump
        assert!(v.get("mind").is_none());
        assert!(v.get("relationships").is_none());
    }

    for line in common::read_lines(&dir.path().join("events.jsonl")) {
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(v["kind"].get("type").is_some());
        assert!(v["timestamp"].get("year").is_some());
    }
}

#[test]
fn snapshot_survives_the_round_trip() {
    let sim = generate_world(common::config_for_years(2), 6).expect("generation succeeds");
    let snapshot = sim.world.snapshot();
    let dir = tempfile::tempdir().unwrap();
    flush_to_jsonl(&snapshot, dir.path()).unwrap();
    let path = |stem: &str| dir.path().join(format!("{stem}.jsonl"));

    let streets: Vec<StreetRecord> = read_jsonl(&path("streets")).unwrap();
    let blocks: Vec<BlockRecord> = read_jsonl(&path("blocks")).unwrap();
    let lots: Vec<LotRecord> = read_jsonl(&path("lots")).unwrap();
    let dwellings: Vec<DwellingRecord> = read_jsonl(&path("dwellings")).unwrap();
    let businesses: Vec<BusinessRecord> = read_jsonl(&path("businesses")).unwrap();
    let residents: Vec<ResidentRecord> = read_jsonl(&path("residents")).unwrap();
    let events: Vec<Event> = read_jsonl(&path("events")).unwrap();
    let beliefs: Vec<BeliefRecord> = read_jsonl(&path("beliefs")).unwrap();

    assert_eq!(streets, snapshot.streets);
    assert_eq!(blocks, snapshot.blocks);
    assert_eq!(lots, snapshot.lots);
    assert_eq!(dwellings, snapshot.dwellings);
    assert_eq!(businesses, snapshot.businesses);
    assert_eq!(residents, snapshot.residents);
    assert_eq!(events, snapshot.events);
    assert_eq!(beliefs.len(), snapshot.beliefs.len());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result: std::io::Result<Vec<StreetRecord>> = read_jsonl(&dir.path().join("streets.jsonl"));
    assert!(result.is_err());
}
