use fr_config::Condition;
use fr_regime::{SatSide, Saturation};
use fr_results::{
    collect_features, BatchManifest, Failure, FbaRegimeRecord, FvaRecord, NutrientSat,
    PartitionStore,
};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn fva_records(cid: &str, objective: f64) -> Vec<FvaRecord> {
    vec![
        FvaRecord {
            condition_id: cid.to_string(),
            objective_value: objective,
            reaction_id: "R1".to_string(),
            fva_min: -1.0,
            fva_max: 3.0,
        },
        FvaRecord {
            condition_id: cid.to_string(),
            objective_value: objective,
            reaction_id: "R2".to_string(),
            fva_min: 0.5,
            fva_max: 0.5,
        },
    ]
}

#[test]
fn fva_partition_roundtrip() {
    let store = PartitionStore::new(unique_temp_dir("fr_results_fva")).unwrap();
    store.write_fva_partition("C1", &fva_records("C1", 0.8)).unwrap();

    let files = store.list_partitions().unwrap();
    assert_eq!(files.len(), 1);

    let loaded = PartitionStore::load_fva_partition(&files[0]).unwrap();
    assert_eq!(loaded, fva_records("C1", 0.8));
}

#[test]
fn condition_ids_are_sanitized_for_paths() {
    let store = PartitionStore::new(unique_temp_dir("fr_results_sanitize")).unwrap();
    let path = store.partition_path("set/one\\A");
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .contains("condition_id=set_one_A.csv"));
}

#[test]
fn rerun_overwrites_only_its_own_partition() {
    let store = PartitionStore::new(unique_temp_dir("fr_results_rerun")).unwrap();
    store.write_fva_partition("C1", &fva_records("C1", 0.8)).unwrap();
    store.write_fva_partition("C2", &fva_records("C2", 0.9)).unwrap();

    let c1_before = fs::read_to_string(store.partition_path("C1")).unwrap();
    let c2_before = fs::read_to_string(store.partition_path("C2")).unwrap();

    // re-run C2 with different results
    store.write_fva_partition("C2", &fva_records("C2", 0.1)).unwrap();

    assert_eq!(fs::read_to_string(store.partition_path("C1")).unwrap(), c1_before);
    assert_ne!(fs::read_to_string(store.partition_path("C2")).unwrap(), c2_before);
}

#[test]
fn failure_report_and_manifest_written_once() {
    let store = PartitionStore::new(unique_temp_dir("fr_results_failures")).unwrap();
    let failures = vec![Failure {
        condition_id: "C9".to_string(),
        error_type: "SolveError".to_string(),
        error_message: "solve finished with status: infeasible".to_string(),
    }];
    let report = store.write_failure_report(&failures).unwrap();
    let content = fs::read_to_string(report).unwrap();
    assert!(content.starts_with("condition_id,error_type,error_message"));
    assert!(content.contains("C9,SolveError"));

    let manifest = BatchManifest::new("fva", 10, 1);
    store.write_manifest(&manifest).unwrap();
    let loaded: BatchManifest = serde_json::from_str(
        &fs::read_to_string(store.root_dir().join("manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(loaded.n_succeeded, 9);
    assert_eq!(loaded.run_kind, "fva");
}

#[test]
fn fba_partition_keeps_objectives_loadable() {
    let store = PartitionStore::new(unique_temp_dir("fr_results_fba")).unwrap();
    let record = FbaRegimeRecord {
        condition_id: "C1".to_string(),
        objective_value: 0.73,
        nutrients: vec![NutrientSat {
            nutrient: "acetate",
            rid: "EX_ac_e".to_string(),
            flux: -0.5,
            lb: -0.5,
            ub: 0.0,
            is_constrained: true,
            saturated: Saturation::Saturated,
            sat_side: SatSide::Lower,
        }],
    };
    store.write_fba_partition(&record).unwrap();

    let objectives = store.load_fba_objectives().unwrap();
    assert_eq!(objectives.get("C1"), Some(&0.73));

    let content = fs::read_to_string(store.partition_path("C1")).unwrap();
    assert!(content.contains("acetate_sat_side"));
    assert!(content.contains("lb"));
}

#[test]
fn collect_builds_wide_features_with_hand_checked_values() {
    let dir = unique_temp_dir("fr_results_collect");
    let store = PartitionStore::new(dir.clone()).unwrap();
    store.write_fva_partition("C1", &fva_records("C1", 0.8)).unwrap();

    let conditions = vec![
        Condition {
            condition_id: "C1".to_string(),
            set_name: Some("acetate_gradient".to_string()),
            measured_od: Some(0.42),
            ..Condition::default()
        },
        // no partition for C2: dropped by the inner join
        Condition {
            condition_id: "C2".to_string(),
            ..Condition::default()
        },
    ];

    let table = collect_features(&dir, &conditions).unwrap();
    assert_eq!(
        table.feature_columns(),
        &[
            "width__R1".to_string(),
            "width__R2".to_string(),
            "mid__R1".to_string(),
            "mid__R2".to_string(),
            "signchange__R1".to_string(),
            "signchange__R2".to_string(),
        ]
    );
    assert_eq!(table.rows.len(), 1);
    let row = &table.rows[0];
    // R1: [-1, 3] -> width 4, mid 1, signchange
    assert_eq!(table.value(row, "width__R1"), Some(4.0));
    assert_eq!(table.value(row, "mid__R1"), Some(1.0));
    assert_eq!(table.value(row, "signchange__R1"), Some(1.0));
    // R2: [0.5, 0.5] -> width 0, mid 0.5, no sign change
    assert_eq!(table.value(row, "width__R2"), Some(0.0));
    assert_eq!(table.value(row, "signchange__R2"), Some(0.0));
}

#[test]
fn collect_rejects_duplicate_pairs() {
    let dir = unique_temp_dir("fr_results_collect_dup");
    let store = PartitionStore::new(dir.clone()).unwrap();
    let mut records = fva_records("C1", 0.8);
    records.push(records[0].clone());
    store.write_fva_partition("C1", &records).unwrap();

    let conditions = vec![Condition {
        condition_id: "C1".to_string(),
        ..Condition::default()
    }];
    let err = collect_features(&dir, &conditions).unwrap_err();
    assert!(matches!(err, fr_results::ResultsError::DuplicatePair { .. }));
}
