//! Two-month fixture shared by the loader, context and CLI tests.
//!
//! Municipalities: Ljubljana, Škofja Loka and the national row "slovenija".
//! Regions: Osrednjeslovenska and "slovenija". Every breakdown carries
//! Total, Foreign, Domestic, Italy and Germany.
#![allow(dead_code)]

use serde_json::{Value, json};
use std::fs;
use std::path::Path;

pub const MUN_FULL: &str = "tourist_data_grouped_ENG.json";
pub const SR_FULL: &str = "sr_data_grouped.json";
pub const MUN_TOTALS: &str = "tourist_data_grouped_total.json";
pub const SR_TOTALS: &str = "sr_data_grouped_total.json";
pub const TRANSLATIONS: &str = "nationality_translations.json";
pub const MUN_LIST: &str = "nationalities_mun.json";
pub const SR_LIST: &str = "nationalities_sr.json";

/// (display name, key, [italy, germany, domestic]) per month.
const MUN_JAN: [(&str, &str, [u64; 3]); 3] = [
    ("Ljubljana", "ljubljana", [50, 30, 20]),
    ("Škofja Loka", "skofja loka", [0, 5, 15]),
    ("Slovenija", "slovenija", [50, 35, 35]),
];
const MUN_FEB: [(&str, &str, [u64; 3]); 3] = [
    ("Ljubljana", "ljubljana", [60, 10, 30]),
    ("Škofja Loka", "skofja loka", [0, 0, 0]),
    ("Slovenija", "slovenija", [60, 10, 30]),
];
const SR_JAN: [(&str, &str, [u64; 3]); 2] = [
    ("Osrednjeslovenska", "osrednjeslovenska", [50, 35, 35]),
    ("Slovenija", "slovenija", [50, 35, 35]),
];
const SR_FEB: [(&str, &str, [u64; 3]); 2] = [
    ("Osrednjeslovenska", "osrednjeslovenska", [60, 10, 30]),
    ("Slovenija", "slovenija", [60, 10, 30]),
];

fn breakdown(name: &str, [it, de, dom]: [u64; 3]) -> Value {
    json!({
        "name": name,
        "countries": [
            {"name": "Skupaj", "countryNameEnglish": "Total", "data": {"data": it + de + dom}},
            {"name": "Tuji", "countryNameEnglish": "Foreign", "data": {"data": it + de}},
            {"name": "Domači", "countryNameEnglish": "Domestic", "data": {"data": dom}},
            {"name": "Italija", "countryNameEnglish": "Italy", "data": {"data": it}},
            {"name": "Nemčija", "countryNameEnglish": "Germany", "data": {"data": de}},
        ]
    })
}

fn total_only(name: &str, [it, de, dom]: [u64; 3]) -> Value {
    json!({
        "name": name,
        "countries": [
            {"name": "Skupaj", "countryNameEnglish": "Total", "data": {"data": it + de + dom}},
        ]
    })
}

fn dataset<F>(container: &str, months: &[(&str, &[(&str, &str, [u64; 3])])], entry: F) -> Value
where
    F: Fn(&str, [u64; 3]) -> Value,
{
    let records: Vec<Value> = months
        .iter()
        .map(|(month, areas)| {
            let map: serde_json::Map<String, Value> = areas
                .iter()
                .map(|(name, key, counts)| (key.to_string(), entry(*name, *counts)))
                .collect();
            let mut rec = serde_json::Map::new();
            rec.insert("month".into(), json!(month));
            rec.insert(container.into(), Value::Object(map));
            Value::Object(rec)
        })
        .collect();
    Value::Array(records)
}

fn write(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Write the five required resources; the nationality lists are left out.
pub fn write_required(dir: &Path) {
    let mun = [("2024M01", &MUN_JAN[..]), ("2024M02", &MUN_FEB[..])];
    let sr = [("2024M01", &SR_JAN[..]), ("2024M02", &SR_FEB[..])];
    write(dir, MUN_FULL, &dataset("municipalities", &mun, breakdown));
    write(dir, SR_FULL, &dataset("regions", &sr, breakdown));
    write(dir, MUN_TOTALS, &dataset("municipalities", &mun, total_only));
    write(dir, SR_TOTALS, &dataset("regions", &sr, total_only));
    write(
        dir,
        TRANSLATIONS,
        &json!({
            "Skupaj": "Total",
            "Tuji": "Foreign",
            "Domači": "Domestic",
            "Italija": "Italy",
            "Nemčija": "Germany",
        }),
    );
}

/// Write all seven resources.
pub fn write_fixture(dir: &Path) {
    write_required(dir);
    let list = json!(["Italy", "Total", "Germany", "Foreign", "Domestic"]);
    write(dir, MUN_LIST, &list);
    write(dir, SR_LIST, &list);
}
