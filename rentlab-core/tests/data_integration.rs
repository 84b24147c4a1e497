//! Integration tests for the data pipeline: synthetic CSV on disk through
//! the cache, the filter and the dashboard pass.

use chrono::NaiveDate;
use rentlab_core::data::{
    generate, load_csv, write_synthetic, DataFormatError, FilterParams, LoadError, StoreCache,
    SyntheticSpec,
};
use rentlab_core::domain::Category;
use rentlab_core::{AnalyticsConfig, Dashboard, TotalMeanPolicy};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

const HEADER: &str = "id_contrato,id_loja,categoria_veiculo,data_inicio_locacao,diaria_media,valor_total_locacao,duracao_locacao,dias_antecedencia";

fn write_fixture(dir: &tempfile::TempDir, name: &str, spec: &SyntheticSpec) -> PathBuf {
    let path = dir.path().join(name);
    write_synthetic(&path, spec).unwrap();
    path
}

#[test]
fn synthetic_csv_round_trips_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let spec = SyntheticSpec {
        days: 45,
        ..SyntheticSpec::default()
    };
    let path = write_fixture(&dir, "contracts.csv", &spec);

    let report = load_csv(&path).unwrap();
    assert!(report.rejected.is_empty());
    assert_eq!(report.store.records(), generate(&spec).as_slice());
    assert_eq!(report.store.stores().len(), 5);
}

#[test]
fn bad_rows_are_dropped_with_row_numbers() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    writeln!(file, "a,1,SUV,2023-01-01,100,300,3,1").unwrap();
    writeln!(file, "b,1,SUV,2023-13-45,100,300,3,1").unwrap();
    writeln!(file, "c,2,SUV,2023-01-02,100,300,-3,1").unwrap();
    writeln!(file, "a,2,SUV,2023-01-03,100,300,3,1").unwrap();
    file.flush().unwrap();

    let report = load_csv(file.path()).unwrap();
    assert_eq!(report.accepted(), 1);
    assert!(matches!(report.rejected[0], DataFormatError::InvalidDate { row: 2, .. }));
    assert!(matches!(report.rejected[1], DataFormatError::Negative { row: 3, .. }));
    assert!(matches!(
        report.rejected[2],
        DataFormatError::DuplicateContractId { row: 4, .. }
    ));
}

#[test]
fn header_only_file_has_no_valid_rows() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    file.flush().unwrap();
    assert!(matches!(
        load_csv(file.path()).unwrap_err(),
        LoadError::NoValidRows { rejected: 0 }
    ));
}

#[test]
fn cache_is_shared_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let spec = SyntheticSpec {
        days: 20,
        ..SyntheticSpec::default()
    };
    let path = write_fixture(&dir, "shared.csv", &spec);
    let cache = Arc::new(StoreCache::new());
    let first = cache.get_or_load(&path).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let path = path.clone();
            std::thread::spawn(move || cache.get_or_load(&path).unwrap())
        })
        .collect();
    for h in handles {
        assert!(Arc::ptr_eq(&first, &h.join().unwrap()));
    }
}

#[test]
fn filtered_dashboard_only_sees_selected_store() {
    let dir = tempfile::tempdir().unwrap();
    let spec = SyntheticSpec {
        days: 90,
        ..SyntheticSpec::default()
    };
    let path = write_fixture(&dir, "dash.csv", &spec);
    let cache = StoreCache::new();
    let loaded = cache.get_or_load(&path).unwrap();

    let filter = FilterParams::all()
        .with_stores([Category::Int(2)])
        .with_range(
            NaiveDate::from_ymd_opt(2022, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 2, 28).unwrap(),
        );
    let report = Dashboard::compute(&loaded.store, &filter, &AnalyticsConfig::default());

    assert!(!report.no_data);
    assert_eq!(report.by_store.groups().len(), 1);
    assert_eq!(
        report.by_store.total().unwrap().contract_count,
        report.record_count
    );
    assert!(report.contracts.daily.len() <= 28);
    assert!(report.store_scatter.is_none());
    assert!(report.contracts.decomposition.is_skipped());
}

#[test]
fn weighted_total_changes_only_means() {
    let dir = tempfile::tempdir().unwrap();
    let spec = SyntheticSpec {
        days: 30,
        ..SyntheticSpec::default()
    };
    let path = write_fixture(&dir, "weights.csv", &spec);
    let loaded = load_csv(&path).unwrap();

    let unweighted = Dashboard::compute(&loaded.store, &FilterParams::all(), &AnalyticsConfig::default());
    let weighted_cfg = AnalyticsConfig {
        total_mean: TotalMeanPolicy::RecordWeighted,
        ..AnalyticsConfig::default()
    };
    let weighted = Dashboard::compute(&loaded.store, &FilterParams::all(), &weighted_cfg);

    let a = unweighted.by_store.total().unwrap();
    let b = weighted.by_store.total().unwrap();
    assert_eq!(a.contract_count, b.contract_count);
    assert_eq!(a.total_value_sum, b.total_value_sum);
    assert_eq!(a.total_value_min, b.total_value_min);
    assert_eq!(a.duration_max, b.duration_max);
    assert_eq!(unweighted.by_store.groups(), weighted.by_store.groups());
}
