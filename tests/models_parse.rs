use turizem::loader::{parse_dataset, parse_translations, parse_universe};
use turizem::models::{AreaKind, MonthKey, MonthRecord};
use turizem::{DataError, MonthKeyError};

#[test]
fn month_keys_parse_and_order() {
    let a: MonthKey = "2019M12".parse().unwrap();
    let b: MonthKey = "2020M01".parse().unwrap();
    assert!(a < b);
    assert_eq!(b.year, 2020);
    assert_eq!(b.month, 1);
    assert_eq!(b.to_string(), "2020M01");
    assert_eq!(b.first_day().to_string(), "2020-01-01");
    assert_eq!(MonthKey::new(2021, 7).unwrap().to_string(), "2021M07");
}

#[test]
fn malformed_month_keys_are_rejected() {
    for bad in ["2020-01", "2020M13", "2020M00", "2020M1", "20M01", "2020m01", "", "M01"] {
        assert_eq!(
            bad.parse::<MonthKey>(),
            Err(MonthKeyError(bad.to_string())),
            "{bad:?} should not parse"
        );
    }
    assert!(MonthKey::new(2020, 13).is_err());
}

#[test]
fn record_parses_counts_in_every_shape() {
    let json = r#"{
        "month": "2024M03",
        "regions": {
            "pomurska": {
                "name": "Pomurska",
                "countries": [
                    {"name": "Skupaj", "countryNameEnglish": "Total", "data": {"data": 1234}},
                    {"name": "Italija", "countryNameEnglish": "Italy", "data": {"data": "56"}},
                    {"name": "Avstrija", "countryNameEnglish": "Austria", "data": {"data": "-"}},
                    {"name": "Malta", "countryNameEnglish": "Malta", "data": {"data": "z"}},
                    {"name": "Ciper", "countryNameEnglish": "Cyprus", "data": {"data": null}},
                    {"name": "Nemčija", "countryNameEnglish": "Germany", "data": {"data": 12.5}},
                    {"name": "Češka"}
                ]
            }
        }
    }"#;
    let rec: MonthRecord = serde_json::from_str(json).unwrap();
    assert_eq!(rec.month.to_string(), "2024M03");
    assert!(rec.areas(AreaKind::Municipality).is_empty());

    let area = &rec.areas(AreaKind::Region)["pomurska"];
    assert_eq!(area.display_name, "Pomurska");
    let counts: Vec<f64> = area.countries.iter().map(|c| c.count()).collect();
    assert_eq!(counts, [1234.0, 56.0, 0.0, 0.0, 0.0, 12.5, 0.0]);
    assert_eq!(area.total(), Some(1234.0));
    assert_eq!(area.countries[6].country_name_english, "");
}

#[test]
fn negative_or_garbage_counts_fail() {
    for bad in [
        r#"{"name": "x", "data": {"data": -3}}"#,
        r#"{"name": "x", "data": {"data": "many"}}"#,
    ] {
        assert!(serde_json::from_str::<turizem::models::CountryCount>(bad).is_err(), "{bad}");
    }
}

#[test]
fn dataset_sorts_months_and_reports_misses() {
    let ds = parse_dataset(
        r#"[
            {"month": "2024M02", "municipalities": {"ljubljana": {"name": "Ljubljana", "countries": []}}},
            {"month": "2024M01", "municipalities": {"ljubljana": {"name": "Ljubljana", "countries": []}}}
        ]"#,
    )
    .unwrap();
    let months: Vec<String> = ds.months().iter().map(|m| m.to_string()).collect();
    assert_eq!(months, ["2024M01", "2024M02"]);

    let jan: MonthKey = "2024M01".parse().unwrap();
    assert!(ds.area(AreaKind::Municipality, &jan, "ljubljana").is_ok());
    assert_eq!(
        ds.area(AreaKind::Region, &jan, "ljubljana").unwrap_err(),
        DataError::MissingArea {
            area: "ljubljana".into(),
            month: "2024M01".into()
        }
    );
    let dec: MonthKey = "2023M12".parse().unwrap();
    assert!(matches!(
        ds.month(&dec),
        Err(DataError::MissingMonth { .. })
    ));
    let e = ds.area(AreaKind::Municipality, &jan, "ljubljana").unwrap();
    assert_eq!(e.total(), None);
}

#[test]
fn bad_month_in_dataset_is_a_parse_error() {
    assert!(parse_dataset(r#"[{"month": "January 2024"}]"#).is_err());
}

#[test]
fn translation_and_universe_files() {
    let t = parse_translations(r#"{"Združene države Amerike": "United States"}"#).unwrap();
    assert_eq!(t.english_name("zdruzene drzave amerike"), Some("United States"));
    assert_eq!(t.len(), 1);

    let u = parse_universe(r#"["Total", "Italy", "Domestic", "Foreign"]"#).unwrap();
    assert_eq!(u, ["Domestic", "Italy"]);
}

#[test]
fn deserialized_dataset_is_ordered_by_month() {
    let ds: turizem::Dataset = serde_json::from_str(
        r#"[
            {"month": "2024M03", "regions": {}},
            {"month": "2024M01", "regions": {}},
            {"month": "2024M02", "regions": {}}
        ]"#,
    )
    .unwrap();
    let months: Vec<String> = ds.months().iter().map(|m| m.to_string()).collect();
    assert_eq!(months, ["2024M01", "2024M02", "2024M03"]);
    for m in ["2024M01", "2024M02", "2024M03"] {
        assert!(ds.month(&m.parse().unwrap()).is_ok(), "{m}");
    }
}
