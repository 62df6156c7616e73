use turizem::models::{AreaEntry, AreaKind, CountryCount, Dataset, MonthRecord};
use turizem::normalize::{
    Resolved, TranslationTable, collect_universe, normalize, normalize_area_name, resolve,
    sort_universe,
};

#[test]
fn normalization_is_idempotent() {
    let samples = [
        "Škofja Loka",
        "  ŽIROVNICA ",
        "Šmarje pri Jelšah",
        "Nemčija",
        "Združene države Amerike",
        "İstanbul",
        "Ångström",
        "crème brûlée",
        "\u{0065}\u{0301}",
        "",
        "   ",
        "已经",
    ];
    for s in samples {
        let once = normalize(s);
        assert_eq!(normalize(&once), once, "input {s:?}");
        assert!(!once.chars().any(|c| ('\u{0300}'..='\u{036f}').contains(&c)));
    }
}

#[test]
fn area_names_match_dataset_keys() {
    assert_eq!(normalize_area_name("Škofja Loka"), "skofja loka");
    assert_eq!(normalize_area_name("Šmarje pri Jelšah"), "smarje pri jelsah");
    assert_eq!(normalize_area_name("ČRNOMELJ"), "crnomelj");
    // precomposed and decomposed forms agree
    assert_eq!(normalize("\u{00e9}"), normalize("e\u{0301}"));
}

#[test]
fn universe_order_domestic_then_alpha_then_other_buckets() {
    let got = sort_universe([
        "Italy",
        "Other European countries",
        "Total",
        "Austria",
        "Foreign",
        "Domestic",
        "Other Asian countries",
        "Germany",
        "Italy",
        " ",
    ]);
    assert_eq!(
        got,
        [
            "Domestic",
            "Austria",
            "Germany",
            "Italy",
            "Other Asian countries",
            "Other European countries"
        ]
    );
}

#[test]
fn universe_without_domestic() {
    assert_eq!(sort_universe(["Italy", "Austria"]), ["Austria", "Italy"]);
    assert!(sort_universe(Vec::<String>::new()).is_empty());
}

#[test]
fn universe_derived_from_dataset_labels() {
    let entry = AreaEntry {
        display_name: "Piran".into(),
        countries: vec![
            CountryCount::new("Skupaj", "Total", 9.0),
            CountryCount::new("Avstrija", "Austria", 4.0),
            CountryCount::new("Domači", "Domestic", 5.0),
        ],
    };
    let rec = MonthRecord::new(
        "2023M07".parse().unwrap(),
        AreaKind::Region,
        [("piran".to_string(), entry)].into_iter().collect(),
    );
    let ds = Dataset::new(vec![rec]);
    assert_eq!(collect_universe(&ds, AreaKind::Region), ["Domestic", "Austria"]);
    assert!(collect_universe(&ds, AreaKind::Municipality).is_empty());
}

#[test]
fn resolve_prefers_translation_table() {
    let table: TranslationTable = [("Nemčija", "Germany")].into_iter().collect();

    let c = CountryCount::new("NEMCIJA", "", 1.0);
    assert_eq!(resolve(&c, &table), Resolved::Known("Germany"));

    let c = CountryCount::new("Nemčija", "German Federal Republic", 1.0);
    assert_eq!(resolve(&c, &table), Resolved::Known("Germany"));

    let c = CountryCount::new("Italija", "Italy", 1.0);
    assert_eq!(resolve(&c, &table), Resolved::Known("Italy"));

    let c = CountryCount::new("Neznana", "  ", 1.0);
    assert_eq!(resolve(&c, &table), Resolved::Unmapped("Neznana"));
}
