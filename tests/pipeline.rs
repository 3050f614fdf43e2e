use evdensity::{pipeline, BoundaryLayer, CsvSource, LayerKind, PipelineConfig};
use geo::{polygon, MultiPolygon};
use polars::prelude::*;
use pretty_assertions::assert_eq;

fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x0, y: y0), (x: x0 + size, y: y0), (x: x0 + size, y: y0 + size), (x: x0, y: y0 + size),
    ]])
}

/// Denver metro inside the PSCO control area; one gas station, one duplicate
/// listing and one charger outside both layers.
fn inputs() -> pipeline::Inputs {
    let metro = BoundaryLayer::new(
        LayerKind::Metro,
        df!("NAME" => ["Denver", "Empty"], "CSAFP" => ["216", "999"], "ALAND" => [2.0e10, 1.0e9]).unwrap(),
        vec![square(-106.0, 39.0, 2.0), square(0.0, 0.0, 1.0)],
        Some(4326),
    ).unwrap();
    let balancing_authorities = BoundaryLayer::new(
        LayerKind::BalancingAuthority,
        df!("NAME" => ["PSCO"], "ID" => [1.0]).unwrap(),
        vec![square(-110.0, 35.0, 10.0)],
        Some(4326),
    ).unwrap();

    let chargers = df!(
        "ID" => [1i64, 2, 1, 4],
        "Fuel Type Code" => ["ELEC", "GAS", "ELEC", "ELEC"],
        "EV Connector Types" => [Some("J1772 J1772COMBO"), None, Some("J1772 J1772COMBO"), Some("TESLA")],
        "City" => ["Denver", "Lakewood", "Denver", "Miami"],
        "Longitude" => [-105.0, -105.1, -105.0, -80.2],
        "Latitude" => [39.7, 39.7, 39.7, 25.8],
        "EV Level1 EVSE Num" => [None::<f64>, None, None, None],
        "EV Level2 EVSE Num" => [Some(2.0), Some(10.0), Some(2.0), Some(4.0)],
        "EV DC Fast Count" => [Some(1.0), Some(10.0), Some(1.0), None],
    ).unwrap();

    let populations = df!(
        "CSA" => ["216", "999"],
        "NAME" => ["Denver", "Empty"],
        "LSAD" => ["Combined Statistical Area", "Combined Statistical Area"],
        "ESTIMATESBASE2020" => [20_000i64, 500],
        "POPESTIMATE2022" => [21_000i64, 450],
    ).unwrap();

    let acs = vec![
        df!("NAME" => ["Denver"], " Median Age " => [36.5]).unwrap(),
        df!("NAME" => ["Denver"], "2020 or later" => [100i64], "55 and Older" => [5i64]).unwrap(),
    ];

    pipeline::Inputs { metro, balancing_authorities, chargers, populations, acs }
}

fn strs(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name).unwrap().str().unwrap()
        .into_no_null_iter().map(str::to_string).collect()
}

fn f64s(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name).unwrap().cast(&DataType::Float64).unwrap()
        .f64().unwrap().into_no_null_iter().collect()
}

#[test]
fn gas_station_in_same_metro_is_not_counted() {
    let outputs = pipeline::process(&inputs()).unwrap();

    assert_eq!(strs(&outputs.metro, "metro_name"), vec!["Denver"]);
    assert_eq!(f64s(&outputs.metro, "count"), vec![1.0]);
    assert_eq!(f64s(&outputs.metro, "ev_level2_evse_num"), vec![2.0]);
    assert_eq!(f64s(&outputs.metro, "ev_dc_fast_count"), vec![1.0]);
    assert_eq!(f64s(&outputs.metro, "total_num"), vec![3.0]);
    assert_eq!(f64s(&outputs.metro, "tesla_count"), vec![0.0]);
}

#[test]
fn metro_table_is_enriched() {
    let outputs = pipeline::process(&inputs()).unwrap();
    let metro = &outputs.metro;

    assert_eq!(f64s(metro, "pertenthousandcapita"), vec![0.5]);
    assert_eq!(f64s(metro, "squarekm"), vec![20_000.0]);
    assert!((f64s(metro, "perthousandsqkm")[0] - 0.05).abs() < 1e-12);
    assert_eq!(f64s(metro, "median_age"), vec![36.5]);
    assert_eq!(f64s(metro, "year_2020_or_later"), vec![100.0]);
    assert_eq!(f64s(metro, "count_55_and_older"), vec![5.0]);
    assert_eq!(strs(metro, "csafp"), vec!["216"]);
    assert!(metro.column("NAME").is_err());
    assert!(metro.column("name").is_err());
}

#[test]
fn metro_table_carries_wkt_geometry() {
    let outputs = pipeline::process(&inputs()).unwrap();
    let geometry = strs(&outputs.metro, "geometry");
    assert_eq!(geometry.len(), 1);
    assert!(geometry[0].starts_with("MULTIPOLYGON"), "{}", geometry[0]);
}

#[test]
fn acs_labels_equal_after_stripping_are_kept_apart() {
    let mut inputs = inputs();
    inputs.acs = vec![
        df!("NAME" => ["Denver"], "Total" => [7i64]).unwrap(),
        df!("NAME" => ["Denver"], " Total" => [8i64]).unwrap(),
    ];

    let outputs = pipeline::process(&inputs).unwrap();
    assert_eq!(f64s(&outputs.metro, "total"), vec![7.0]);
    assert_eq!(f64s(&outputs.metro, "total_right"), vec![8.0]);
}

#[test]
fn labels_equal_after_normalizing_are_kept_apart() {
    let mut inputs = inputs();
    inputs.acs = vec![df!("NAME" => ["Denver"], "Median Age" => [36.5], "Median-Age" => [37.0]).unwrap()];

    let outputs = pipeline::process(&inputs).unwrap();
    assert_eq!(f64s(&outputs.metro, "median_age"), vec![36.5]);
    assert_eq!(f64s(&outputs.metro, "median_age_1"), vec![37.0]);
}

#[test]
fn balancing_authority_and_city_tables() {
    let outputs = pipeline::process(&inputs()).unwrap();

    assert_eq!(strs(&outputs.balancing_authorities, "ba_name"), vec!["PSCO"]);
    assert_eq!(f64s(&outputs.balancing_authorities, "count"), vec![1.0]);

    // Miami lies outside both layers but still counts by city
    assert_eq!(strs(&outputs.cities, "city"), vec!["Denver", "Miami"]);
    assert_eq!(f64s(&outputs.cities, "count"), vec![1.0, 1.0]);
    assert_eq!(f64s(&outputs.cities, "tesla_count"), vec![0.0, 1.0]);
    assert_eq!(f64s(&outputs.cities, "total_num"), vec![3.0, 4.0]);
}

#[test]
fn outputs_are_written_as_csv() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        output_dir: Some(dir.path().join("out")),
        ..Default::default()
    };

    let mut outputs = pipeline::process(&inputs()).unwrap();
    pipeline::write_outputs(&config, &mut outputs).unwrap();

    for name in [pipeline::METRO_OUTPUT, pipeline::BALANCING_AUTHORITY_OUTPUT, pipeline::CITY_OUTPUT] {
        assert!(dir.path().join("out").join(name).is_file(), "{name} missing");
    }
    assert!(!dir.path().join("out").join(pipeline::METRO_OVERTIME_OUTPUT).exists());

    let source = CsvSource::Path(dir.path().join("out").join(pipeline::METRO_OUTPUT));
    let metro = evdensity::read_csv_with_encodings(&source, &["utf-8"]).unwrap();
    assert_eq!(strs(&metro, "metro_name"), vec!["Denver"]);
    assert_eq!(f64s(&metro, "count"), vec![1.0]);
}
