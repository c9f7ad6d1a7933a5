//! SQLite integration tests.
//!
//! These tests run the store against an in-memory (or temporary file)
//! SQLite database with a real container table.

mod common;

use std::sync::Arc;

use spectral_sampledata::SampleDataConfig;
use spectral_sampledata::backends::sqlite::SqliteExecutor;
use spectral_sampledata::core::{
    ContainerStore, SampleDataStorage, SqlExecutor, SqlParam, StoreOptions,
};
use spectral_sampledata::error::StorageError;
use spectral_sampledata::query::{FieldRange, OutputColumn, SampleDataConditions};
use spectral_sampledata::store::SampleDataStore;
use spectral_sampledata::types::{
    ContainerRef, DUMMY_REPORT, DataType, FORMAT, Field, INSERT_TIMESTAMP, INSTRUMENT,
    SAMPLE_TYPE, SampleData, SampleValue,
};

use common::{FailingExecutor, FakeExecutor, RecordingContainerStore, at, inserted_at};

async fn create_store() -> SampleDataStore {
    let executor = Arc::new(SqliteExecutor::in_memory().expect("Failed to create executor"));
    let store = SampleDataStore::new(executor, SampleDataConfig::default())
        .expect("Failed to create store");
    store.init_schema().await.expect("Failed to initialize schema");
    store
        .init_container_schema()
        .await
        .expect("Failed to initialize container schema");
    store
}

/// Adds a container and stores its sample data.
async fn add_sample(
    store: &SampleDataStore,
    sample_id: &str,
    format: &str,
    mut sd: SampleData,
) -> ContainerRef {
    let container = store
        .container_table()
        .add(sample_id, format)
        .await
        .expect("Failed to add container");
    assert!(store.store(sample_id, &mut sd).await);
    container
}

async fn count_rows(store: &SampleDataStore, id: &str, name: &str) -> i64 {
    let rows = store
        .executor()
        .query(
            "SELECT COUNT(*) FROM \"sampledata\" WHERE ID = ?1 AND NAME = ?2",
            &[SqlParam::string(id), SqlParam::string(name)],
        )
        .await
        .unwrap();
    rows[0][0].as_i64().unwrap()
}

// ============================================================================
// Store / Load Tests
// ============================================================================

#[tokio::test]
async fn test_store_then_load_returns_superset() {
    let store = create_store().await;

    let mut sd = SampleData::new()
        .with(INSTRUMENT, "FOSS-1")
        .with("Protein", 11.8)
        .with(DUMMY_REPORT, false);
    assert!(!store.exists("S-001").await);
    assert!(store.store("S-001", &mut sd).await);
    assert!(sd.contains(INSERT_TIMESTAMP));
    assert!(store.exists("S-001").await);
    assert!(!store.exists("S-002").await);

    let loaded = store.load("S-001").await.unwrap();
    for field in sd.fields() {
        assert!(loaded.contains(field.name()), "missing {}", field);
    }
    assert_eq!(loaded.get("Protein").unwrap().as_f64(), Some(11.8));
    assert_eq!(loaded.get(DUMMY_REPORT).unwrap().as_bool(), Some(false));
    assert_eq!(loaded.instrument().as_deref(), Some("FOSS-1"));
    assert!(loaded.insert_timestamp().is_some());
}

#[tokio::test]
async fn test_load_unknown_container_is_empty() {
    let store = create_store().await;
    let loaded = store.load("S-404").await.unwrap();
    assert!(loaded.is_empty());
    assert!(!store.exists("S-404").await);
}

#[tokio::test]
async fn test_store_twice_is_idempotent() {
    let store = create_store().await;

    let mut sd = SampleData::new().with("Protein", 11.8).with(INSTRUMENT, "IR");
    assert!(store.store("S-001", &mut sd).await);
    let first = store.load("S-001").await.unwrap();

    assert!(store.store("S-001", &mut sd).await);
    let second = store.load("S-001").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(count_rows(&store, "S-001", "Protein").await, 1);
    assert_eq!(count_rows(&store, "S-001", INSERT_TIMESTAMP).await, 1);
}

#[tokio::test]
async fn test_existing_timestamp_is_kept() {
    let store = create_store().await;

    let mut sd = inserted_at(at(1, 9)).with("Protein", 1.0);
    assert!(store.store("S-001", &mut sd).await);

    let loaded = store.load("S-001").await.unwrap();
    assert_eq!(loaded.insert_timestamp(), Some(at(1, 9)));
}

#[tokio::test]
async fn test_undecodable_row_is_skipped() {
    let store = create_store().await;

    let mut sd = SampleData::new().with(INSTRUMENT, "IR");
    store.store("S-001", &mut sd).await;
    store
        .executor()
        .execute(
            "INSERT INTO \"sampledata\" (ID, NAME, TYPE, VALUE) VALUES (?1, ?2, ?3, ?4)",
            &[
                SqlParam::string("S-001"),
                SqlParam::string("Protein"),
                SqlParam::string("N"),
                SqlParam::string("not a number"),
            ],
        )
        .await
        .unwrap();

    let loaded = store.load("S-001").await.unwrap();
    assert!(!loaded.contains("Protein"));
    assert_eq!(loaded.instrument().as_deref(), Some("IR"));
}

#[tokio::test]
async fn test_try_store_reports_written_rows() {
    let store = create_store().await;

    let mut sd = SampleData::new().with("Protein", 1.0).with(FORMAT, "NIR");
    // Protein and the synthesized timestamp; Format is never written
    assert_eq!(store.try_store("S-001", &mut sd).await.unwrap(), 2);

    let err = store.try_store("", &mut sd).await.unwrap_err();
    assert!(matches!(err, StorageError::EmptyContainerId));
}

// ============================================================================
// Field and Value Listing Tests
// ============================================================================

#[tokio::test]
async fn test_list_fields_by_type() {
    let store = create_store().await;

    let mut sd = SampleData::new()
        .with("Protein", 11.8)
        .with(INSTRUMENT, "IR")
        .with(DUMMY_REPORT, false);
    store.store("S-001", &mut sd).await;

    let numeric = store.list_fields(Some(DataType::Numeric)).await;
    assert_eq!(numeric, vec![Field::numeric("Protein")]);
    assert!(numeric.iter().all(|f| f.data_type() == DataType::Numeric));

    let all = store.list_fields(None).await;
    let names: Vec<&str> = all.iter().map(Field::name).collect();
    assert!(names.contains(&"Protein"));
    assert!(names.contains(&INSTRUMENT));
    assert!(names.contains(&DUMMY_REPORT));
    assert!(names.contains(&INSERT_TIMESTAMP));
}

#[tokio::test]
async fn test_list_fields_follows_latest_type() {
    let store = create_store().await;

    let mut sd = SampleData::new().with("Moisture", "n/a");
    store.store("S-001", &mut sd).await;
    let mut sd = SampleData::new().with("Moisture", 12.5);
    store.store("S-001", &mut sd).await;

    let numeric = store.list_fields(Some(DataType::Numeric)).await;
    assert!(numeric.iter().any(|f| f.name() == "Moisture"));
    let strings = store.list_fields(Some(DataType::String)).await;
    assert!(!strings.iter().any(|f| f.name() == "Moisture"));
}

#[tokio::test]
async fn test_instruments_sorted_and_distinct() {
    let store = create_store().await;

    for (id, instrument) in [("A", "NIR"), ("B", "FOSS"), ("C", "IR"), ("D", "FOSS")] {
        let mut sd = SampleData::new().with(INSTRUMENT, instrument);
        store.store(id, &mut sd).await;
    }

    assert_eq!(store.get_instruments().await, vec!["FOSS", "IR", "NIR"]);
    assert_eq!(
        store.list_distinct_values(SAMPLE_TYPE).await,
        Vec::<String>::new()
    );
}

// ============================================================================
// Condition Query Tests
// ============================================================================

#[tokio::test]
async fn test_all_disabled_returns_every_container_ascending() {
    let store = create_store().await;

    add_sample(&store, "C", "NIR", inserted_at(at(3, 8))).await;
    add_sample(&store, "A", "NIR", inserted_at(at(1, 8))).await;
    add_sample(&store, "B", "NIR", inserted_at(at(2, 8))).await;
    // a container without sample data is never returned
    store.container_table().add("Z", "NIR").await.unwrap();

    let ids = store.get_ids(&SampleDataConditions::single()).await;
    assert_eq!(ids, vec!["A", "B", "C"]);

    let ids = store.get_ids(&SampleDataConditions::multi()).await;
    assert_eq!(ids, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_latest_with_limit() {
    let store = create_store().await;

    for day in 1..=7 {
        add_sample(&store, &format!("S-{day}"), "NIR", inserted_at(at(day, 8))).await;
    }

    let ids = store
        .get_ids(&SampleDataConditions::single().with_latest(true).with_limit(5))
        .await;
    assert_eq!(ids, vec!["S-7", "S-6", "S-5", "S-4", "S-3"]);
}

#[tokio::test]
async fn test_instrument_and_range_filter() {
    let store = create_store().await;

    add_sample(
        &store,
        "A",
        "IR",
        inserted_at(at(1, 8)).with(INSTRUMENT, "IR").with("X", 5.0),
    )
    .await;
    add_sample(
        &store,
        "B",
        "NIR",
        inserted_at(at(2, 8)).with(INSTRUMENT, "NIR").with("X", 15.0),
    )
    .await;

    for regexp in ["IR", "^IR$"] {
        let conditions = SampleDataConditions::multi()
            .with_instrument(regexp)
            .with_field_range(FieldRange::between(Field::numeric("X"), 0.0, 10.0));
        assert_eq!(store.get_ids(&conditions).await, vec!["A"]);
    }

    let conditions = SampleDataConditions::single().with_instrument("^IR$");
    assert_eq!(store.get_ids(&conditions).await, vec!["A"]);

    let conditions = SampleDataConditions::single().with_instrument("IR");
    assert_eq!(store.get_ids(&conditions).await, vec!["A", "B"]);
}

#[tokio::test]
async fn test_range_compares_numerically() {
    let store = create_store().await;

    add_sample(&store, "A", "NIR", inserted_at(at(1, 8)).with("X", 9.0)).await;
    add_sample(&store, "B", "NIR", inserted_at(at(2, 8)).with("X", 100.0)).await;

    let conditions = SampleDataConditions::multi()
        .with_field_range(FieldRange::new(Field::numeric("X")).with_min(10.0));
    assert_eq!(store.get_ids(&conditions).await, vec!["B"]);

    let conditions = SampleDataConditions::multi()
        .with_field_range(FieldRange::from_bounds(Field::numeric("X"), -1.0, 50.0));
    assert_eq!(store.get_ids(&conditions).await, vec!["A"]);
}

#[tokio::test]
async fn test_range_skips_non_numeric_values() {
    let store = create_store().await;

    add_sample(&store, "A", "NIR", inserted_at(at(1, 8)).with("X", 5.0)).await;
    add_sample(&store, "B", "NIR", inserted_at(at(2, 8)).with("X", "n/a")).await;

    let conditions = SampleDataConditions::multi()
        .with_field_range(FieldRange::between(Field::numeric("X"), 0.0, 10.0));
    assert_eq!(store.get_ids(&conditions).await, vec!["A"]);

    let conditions = SampleDataConditions::multi()
        .with_field_range(FieldRange::new(Field::numeric("X")).with_max(10.0));
    assert_eq!(store.get_ids(&conditions).await, vec!["A"]);
}

#[tokio::test]
async fn test_sample_id_and_format_regexp() {
    let store = create_store().await;

    add_sample(&store, "LAB-1", "NIR", inserted_at(at(1, 8))).await;
    add_sample(&store, "LAB-2", "IR", inserted_at(at(2, 8))).await;
    add_sample(&store, "QC-1", "NIR", inserted_at(at(3, 8))).await;

    let conditions = SampleDataConditions::single().with_sample_id("^LAB-");
    assert_eq!(store.get_ids(&conditions).await, vec!["LAB-1", "LAB-2"]);

    let conditions = SampleDataConditions::single().with_format("^NIR$");
    assert_eq!(store.get_ids(&conditions).await, vec!["LAB-1", "QC-1"]);
}

#[tokio::test]
async fn test_sample_type_filter() {
    let store = create_store().await;

    add_sample(&store, "A", "NIR", inserted_at(at(1, 8)).with(SAMPLE_TYPE, "Wheat")).await;
    add_sample(&store, "B", "NIR", inserted_at(at(2, 8)).with(SAMPLE_TYPE, "Barley")).await;

    let conditions = SampleDataConditions::single().with_sample_type("^Whe");
    assert_eq!(store.get_ids(&conditions).await, vec!["A"]);
}

#[tokio::test]
async fn test_dummy_filters() {
    let store = create_store().await;

    add_sample(&store, "A", "NIR", inserted_at(at(1, 8)).with(DUMMY_REPORT, false)).await;
    add_sample(&store, "B", "NIR", inserted_at(at(2, 8)).with(DUMMY_REPORT, true)).await;
    add_sample(&store, "C", "NIR", inserted_at(at(3, 8))).await;

    let conditions = SampleDataConditions::single().with_exclude_dummies(true);
    assert_eq!(store.get_ids(&conditions).await, vec!["A"]);

    let conditions = SampleDataConditions::single().with_only_dummies(true);
    assert_eq!(store.get_ids(&conditions).await, vec!["B"]);

    let ids = store.get_ids(&SampleDataConditions::single()).await;
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_required_fields() {
    let store = create_store().await;

    add_sample(
        &store,
        "A",
        "NIR",
        inserted_at(at(1, 8)).with("Moisture", 12.0).with("Operator", "jd"),
    )
    .await;
    add_sample(&store, "B", "NIR", inserted_at(at(2, 8)).with("Moisture", 11.0)).await;
    add_sample(&store, "C", "NIR", inserted_at(at(3, 8))).await;

    let conditions = SampleDataConditions::single().with_required_field(Field::numeric("Moisture"));
    assert_eq!(store.get_ids(&conditions).await, vec!["A", "B"]);

    let conditions = SampleDataConditions::multi()
        .with_required_field(Field::numeric("Moisture"))
        .with_required_field(Field::string("Operator"));
    assert_eq!(store.get_ids(&conditions).await, vec!["A"]);
}

#[tokio::test]
async fn test_date_range_is_inclusive() {
    let store = create_store().await;

    add_sample(&store, "A", "NIR", inserted_at(at(1, 8))).await;
    add_sample(&store, "B", "NIR", inserted_at(at(2, 8))).await;
    add_sample(&store, "C", "NIR", inserted_at(at(3, 8))).await;

    let conditions = SampleDataConditions::single().with_start_date(at(2, 8));
    assert_eq!(store.get_ids(&conditions).await, vec!["B", "C"]);

    let conditions = SampleDataConditions::single()
        .with_start_date(at(2, 8))
        .with_end_date(at(2, 8));
    assert_eq!(store.get_ids(&conditions).await, vec!["B"]);

    let conditions = SampleDataConditions::single().with_end_date(at(1, 23));
    assert_eq!(store.get_ids(&conditions).await, vec!["A"]);
}

#[tokio::test]
async fn test_database_ids_and_columns() {
    let store = create_store().await;

    let a = add_sample(&store, "A", "NIR", inserted_at(at(1, 8))).await;
    let b = add_sample(&store, "B", "IR", inserted_at(at(2, 8))).await;

    let ids = store
        .get_database_ids(&SampleDataConditions::single())
        .await;
    assert_eq!(ids, vec![a.auto_id, b.auto_id]);

    let rows = store
        .get_ids_with_columns(
            &[
                OutputColumn::DatabaseId,
                OutputColumn::SampleId,
                OutputColumn::Format,
            ],
            &SampleDataConditions::single(),
        )
        .await;
    assert_eq!(
        rows,
        vec![
            format!("{}\tA\tNIR", a.auto_id),
            format!("{}\tB\tIR", b.auto_id)
        ]
    );

    let rows = store
        .get_ids_with_columns(&[OutputColumn::InsertTimestamp], &SampleDataConditions::single())
        .await;
    assert_eq!(rows, vec!["2024-03-01 08:00:00", "2024-03-02 08:00:00"]);
}

#[tokio::test]
async fn test_invalid_regexp_degrades_to_empty() {
    let store = create_store().await;
    add_sample(&store, "A", "NIR", inserted_at(at(1, 8))).await;

    let conditions = SampleDataConditions::single().with_sample_id("(");
    assert!(store.get_ids(&conditions).await.is_empty());
}

// ============================================================================
// Bulk Update Tests
// ============================================================================

#[tokio::test]
async fn test_update_field_over_results() {
    let store = create_store().await;

    add_sample(&store, "A", "NIR", inserted_at(at(1, 8)).with(INSTRUMENT, "IR")).await;
    add_sample(&store, "B", "NIR", inserted_at(at(2, 8)).with(INSTRUMENT, "IR")).await;

    let ids = store
        .get_ids(&SampleDataConditions::single().with_instrument("^IR$"))
        .await;
    let failed = store
        .update_field(&ids, &Field::string(SAMPLE_TYPE), &SampleValue::from("Wheat"))
        .await;
    assert!(failed.is_empty());

    for id in ["A", "B"] {
        let loaded = store.load(id).await.unwrap();
        assert_eq!(
            loaded.get(SAMPLE_TYPE).and_then(SampleValue::as_str),
            Some("Wheat")
        );
        assert_eq!(loaded.instrument().as_deref(), Some("IR"));
    }

    let failed = store
        .update_field(
            &["".to_string()],
            &Field::string(SAMPLE_TYPE),
            &SampleValue::from("Wheat"),
        )
        .await;
    assert_eq!(failed, vec![String::new()]);
}

// ============================================================================
// Cache Invalidation Tests
// ============================================================================

#[tokio::test]
async fn test_store_evicts_container() {
    let containers = Arc::new(RecordingContainerStore::new());
    containers.register(42, "S-001", "NIR");
    let store = create_store().await.with_container_store(containers.clone());

    let mut sd = SampleData::new().with(FORMAT, "NIR").with("Protein", 1.0);
    assert!(store.store("S-001", &mut sd).await);

    assert_eq!(
        containers.loads(),
        vec![("S-001".to_string(), Some("NIR".to_string()))]
    );
    assert_eq!(containers.evictions(), vec![42]);
}

#[tokio::test]
async fn test_no_eviction_without_writes() {
    let containers = Arc::new(RecordingContainerStore::new());
    containers.register(42, "S-001", "NIR");
    let store = create_store().await.with_container_store(containers.clone());

    let mut sd = SampleData::new().with("Protein", 1.0);
    store.store("S-001", &mut sd).await;
    assert_eq!(containers.evictions().len(), 1);

    let written = store
        .try_store_with("S-001", &mut sd, &StoreOptions::keep_existing())
        .await
        .unwrap();
    assert_eq!(written, 0);
    assert_eq!(containers.evictions().len(), 1);
}

#[tokio::test]
async fn test_failed_write_keeps_earlier_rows_and_evicts() {
    let sqlite: Arc<dyn SqlExecutor> =
        Arc::new(SqliteExecutor::in_memory().expect("Failed to create executor"));
    let setup = SampleDataStore::new(sqlite.clone(), SampleDataConfig::default()).unwrap();
    setup.init_schema().await.unwrap();

    let containers = Arc::new(RecordingContainerStore::new());
    containers.register(7, "S-001", "NIR");
    // Fields are written in name order: Alpha, Beta, Insert timestamp
    let store = SampleDataStore::new(
        Arc::new(FailingExecutor::new(sqlite, 2)),
        SampleDataConfig::default(),
    )
    .unwrap()
    .with_container_store(containers.clone());

    let mut sd = SampleData::new()
        .with(FORMAT, "NIR")
        .with("Alpha", 1.0)
        .with("Beta", 2.0);
    assert!(!store.store("S-001", &mut sd).await);

    let loaded = setup.load("S-001").await.unwrap();
    assert_eq!(loaded.get("Alpha").unwrap().as_f64(), Some(1.0));
    assert!(!loaded.contains("Beta"));
    assert!(!loaded.contains(INSERT_TIMESTAMP));
    assert_eq!(containers.evictions(), vec![7]);
}

#[tokio::test]
async fn test_eviction_failure_does_not_fail_store() {
    let containers = Arc::new(RecordingContainerStore::failing());
    let store = create_store().await.with_container_store(containers.clone());

    let mut sd = SampleData::new().with("Protein", 1.0);
    assert!(store.store("S-001", &mut sd).await);
    assert_eq!(containers.loads().len(), 1);
    assert!(containers.evictions().is_empty());
}

#[tokio::test]
async fn test_container_table_as_cache_owner() {
    let store = create_store().await;
    let table = Arc::new(store.container_table());
    let container = table.add("S-001", "NIR").await.unwrap();
    table.load("S-001", Some("NIR")).await.unwrap();
    assert!(table.cached(container.auto_id).is_some());

    let store = store.with_container_store(table.clone());
    let mut sd = SampleData::new().with(FORMAT, "NIR").with("Protein", 1.0);
    assert!(store.store("S-001", &mut sd).await);
    assert!(table.cached(container.auto_id).is_none());
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stores_leave_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(SqliteExecutor::open(dir.path().join("sd.db")).unwrap());
    let store = Arc::new(SampleDataStore::new(executor, SampleDataConfig::default()).unwrap());
    store.init_schema().await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let mut sd = SampleData::new().with("Protein", i as f64);
            store
                .try_store_with("S-001", &mut sd, &StoreOptions::default())
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) => assert!(e.is_unique_violation(), "unexpected error: {e}"),
        }
    }
    assert!(succeeded >= 1);
    assert_eq!(count_rows(&store, "S-001", "Protein").await, 1);
    assert_eq!(count_rows(&store, "S-001", INSERT_TIMESTAMP).await, 1);
}

// ============================================================================
// Dialect Selection Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_product_rejected() {
    let result = SampleDataStore::new(
        Arc::new(FakeExecutor::new("Oracle")),
        SampleDataConfig::default(),
    );
    assert!(matches!(result, Err(StorageError::Dialect(_))));
}

#[tokio::test]
async fn test_reads_degrade_on_backend_failure() {
    let store = SampleDataStore::new(
        Arc::new(FakeExecutor::new("MySQL")),
        SampleDataConfig::default(),
    )
    .unwrap();

    assert!(store.get_ids(&SampleDataConditions::single()).await.is_empty());
    assert!(store.list_fields(None).await.is_empty());
    assert!(store.get_instruments().await.is_empty());
    assert!(!store.exists("S-001").await);
    assert!(store.load("S-001").await.is_err());

    let mut sd = SampleData::new().with("Protein", 1.0);
    assert!(!store.store("S-001", &mut sd).await);
}

#[tokio::test]
async fn test_custom_table_names() {
    let executor = Arc::new(SqliteExecutor::in_memory().unwrap());
    let config = SampleDataConfig::default()
        .with_table_name("sd_custom")
        .with_container_table("spectra_custom");
    let store = SampleDataStore::new(executor, config).unwrap();
    store.init_schema().await.unwrap();
    store.init_container_schema().await.unwrap();

    add_sample(&store, "A", "NIR", inserted_at(at(1, 8))).await;
    assert_eq!(
        store.get_ids(&SampleDataConditions::single()).await,
        vec!["A"]
    );
}
