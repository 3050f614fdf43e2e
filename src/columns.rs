//! Column label cleanup for the published tables.

use std::{collections::HashSet, sync::LazyLock};

use anyhow::Result;
use polars::frame::DataFrame;
use regex::Regex;

/// Runs of non-word characters and underscores.
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\W_]+").expect("valid separator pattern"));

/// Census vehicle-age ranges that read as years rather than counts.
const YEAR_RANGES: [&str; 7] = [
    "2020_or_later",
    "2010_to_2019",
    "2000_to_2009",
    "1980_to_1999",
    "1960_to_1979",
    "1940_to_1959",
    "1939_or_earlier",
];

/// Normalize a raw column label into a lowercase identifier.
///
/// Non-word runs collapse to one `_`. A label starting with a digit gets a
/// `year_` prefix if it is one of the vehicle-age ranges, `count_` otherwise.
pub fn normalize_column_name(label: &str) -> String {
    let name = SEPARATORS.replace_all(&label.to_lowercase(), "_").into_owned();

    match name.chars().next() {
        Some(c) if c.is_ascii_digit() && YEAR_RANGES.contains(&name.as_str()) => format!("year_{name}"),
        Some(c) if c.is_ascii_digit() => format!("count_{name}"),
        _ => name,
    }
}

/// Make repeated labels unique: later copies of a name get the first free
/// `_1`, `_2`, ... suffix. First occurrences keep their label.
fn unique_names(names: Vec<String>) -> Vec<String> {
    let mut taken = names.iter().cloned().collect::<HashSet<_>>();
    let mut seen = HashSet::new();

    names.into_iter()
        .map(|name| {
            if seen.insert(name.clone()) { return name; }
            let mut n = 1;
            let mut renamed = format!("{name}_{n}");
            while taken.contains(&renamed) {
                n += 1;
                renamed = format!("{name}_{n}");
            }
            taken.insert(renamed.clone());
            renamed
        })
        .collect()
}

/// Relabel every column of `df` with `rename`, keeping labels unique.
fn relabel(df: &mut DataFrame, rename: impl Fn(&str) -> String) -> Result<()> {
    let names = df.get_column_names().iter()
        .map(|name| rename(name.as_str()))
        .collect::<Vec<_>>();
    df.set_column_names(unique_names(names))?;
    Ok(())
}

/// Strip surrounding whitespace from every column label.
pub(crate) fn strip_columns(df: &mut DataFrame) -> Result<()> {
    relabel(df, |name| name.trim().to_string())
}

/// Apply [`normalize_column_name`] to every column of `df`.
/// Labels that normalize to the same name get a numeric suffix.
pub fn normalize_columns(df: &mut DataFrame) -> Result<()> {
    relabel(df, normalize_column_name)
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn year_ranges_get_year_prefix() {
        assert_eq!(normalize_column_name("2020 or later"), "year_2020_or_later");
        assert_eq!(normalize_column_name("1939 or earlier"), "year_1939_or_earlier");
        assert_eq!(normalize_column_name("1980 to 1999"), "year_1980_to_1999");
    }

    #[test]
    fn other_digit_labels_get_count_prefix() {
        assert_eq!(normalize_column_name("55 and Older"), "count_55_and_older");
        assert_eq!(normalize_column_name("1 vehicle available"), "count_1_vehicle_available");
    }

    #[test]
    fn separators_collapse() {
        assert_eq!(normalize_column_name("Median Age"), "median_age");
        assert_eq!(normalize_column_name("Owner-occupied:  No vehicle"), "owner_occupied_no_vehicle");
        assert_eq!(normalize_column_name("EV Level2 EVSE Num"), "ev_level2_evse_num");
        assert_eq!(normalize_column_name("total__num"), "total_num");
        assert_eq!(normalize_column_name("Total!!Estimate"), "total_estimate");
    }

    #[test]
    fn empty_label_stays_empty() {
        assert_eq!(normalize_column_name(""), "");
    }

    fn names(df: &DataFrame) -> Vec<&str> {
        df.get_column_names().into_iter().map(|name| name.as_str()).collect()
    }

    #[test]
    fn normalizes_and_strips_frames() {
        let mut df = df!(
            " Median Age " => [34.5],
            "2010 to 2019" => [12i64],
        ).unwrap();

        strip_columns(&mut df).unwrap();
        assert_eq!(names(&df), vec!["Median Age", "2010 to 2019"]);

        normalize_columns(&mut df).unwrap();
        assert_eq!(names(&df), vec!["median_age", "year_2010_to_2019"]);
    }

    #[test]
    fn colliding_labels_get_numeric_suffixes() {
        let mut df = df!(
            "Median Age" => [34.5],
            "Median-Age" => [35.0],
            "median_age_1" => [1.0],
            "Total" => [1i64],
            " Total" => [2i64],
        ).unwrap();

        strip_columns(&mut df).unwrap();
        assert_eq!(names(&df), vec!["Median Age", "Median-Age", "median_age_1", "Total", "Total_1"]);

        normalize_columns(&mut df).unwrap();
        assert_eq!(names(&df), vec!["median_age", "median_age_2", "median_age_1", "total", "total_1"]);
    }
}
