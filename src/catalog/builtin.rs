//! Built-in table definitions embedded in the binary
//!
//! Allows `--table bronze_db.nyc_taxi_data_yellow` without shipping a
//! catalog directory.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Built-in table YAML definitions, keyed by `<db>.<table>`
pub static BUILTIN_TABLES: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = BTreeMap::new();

    // Bronze
    m.insert(
        "bronze_db.nyc_taxi_data_yellow",
        include_str!("../../tables/bronze_yellow.yaml"),
    );
    m.insert(
        "bronze_db.nyc_taxi_data_green",
        include_str!("../../tables/bronze_green.yaml"),
    );
    m.insert(
        "bronze_db.nyc_taxi_data_forhire",
        include_str!("../../tables/bronze_forhire.yaml"),
    );
    m.insert(
        "bronze_db.nyc_taxi_data_highvolumeforhire",
        include_str!("../../tables/bronze_highvolumeforhire.yaml"),
    );

    // Silver
    m.insert(
        "silver_db.tb_corrida_taxi_ny",
        include_str!("../../tables/silver_trips.yaml"),
    );

    m
});

/// Get a built-in table YAML by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_TABLES.get(name).copied()
}

/// List all built-in table names, sorted
pub fn list_builtin() -> Vec<&'static str> {
    BUILTIN_TABLES.keys().copied().collect()
}
