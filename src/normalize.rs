//! Cleaning rules that turn the raw table into a typed [`Dataset`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::{debug, info};
use std::collections::HashMap;

use crate::loader::RawTable;
use crate::record::{Column, Dataset, DurationUnit, ParsedDuration, Record, Schema, UNKNOWN};

/// Cell contents treated as "no value".
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A", "#N/A N/A", "#NA",
];

const DATE_LAYOUTS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%y"];

// --- Field rules ---

pub fn is_missing(cell: &str) -> bool {
    NA_TOKENS.contains(&cell)
}

fn present(cell: Option<&str>) -> Option<&str> {
    cell.filter(|c| !is_missing(c))
}

fn or_unknown(cell: Option<&str>) -> String {
    present(cell).unwrap_or(UNKNOWN).to_string()
}

/// Parses a `date_added` value. Anything unrecognized is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if is_missing(s) {
        return None;
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
            return Some(date);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|ts| ts.date())
}

/// "90 min" is 90 minutes, "2 Seasons" is 2 seasons. The leading token must
/// be a whole number.
pub fn parse_duration(raw: &str) -> Option<ParsedDuration> {
    let s = raw.trim();
    let amount = s.split_whitespace().next()?.parse::<u32>().ok()?;
    let unit = if s.contains("min") {
        DurationUnit::Minutes
    } else {
        DurationUnit::Seasons
    };
    Some(ParsedDuration { amount, unit })
}

/// Comma-separated genre text to trimmed, non-empty tokens.
pub fn split_genres(listed_in: &str) -> Vec<String> {
    listed_in
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn primary_country(country: &str) -> String {
    if country == UNKNOWN {
        return UNKNOWN.to_string();
    }
    match country.split(',').next().map(str::trim) {
        Some(first) if !first.is_empty() => first.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

// --- Table ---

struct Columns {
    index: HashMap<Column, usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> Self {
        let trimmed: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let mut index = HashMap::new();
        for column in Column::ALL {
            if let Some(pos) = trimmed.iter().position(|h| *h == column.name()) {
                index.insert(column, pos);
            }
        }
        Columns { index }
    }

    fn cell<'a>(&self, table: &'a RawTable, row: usize, column: Column) -> Option<&'a str> {
        self.index.get(&column).map(|&i| table.cell(row, i))
    }

    fn schema(&self) -> Schema {
        Schema::new(Column::ALL.into_iter().filter(|c| self.index.contains_key(c)))
    }
}

/// Builds the dataset; every input row becomes exactly one record, in order.
pub fn normalize(table: &RawTable) -> Dataset {
    let columns = Columns::resolve(&table.headers);
    let schema = columns.schema();
    for column in Column::ALL {
        if !schema.has(column) {
            info!("Column '{}' not present in input", column.name());
        }
    }

    let records: Vec<Record> = (0..table.rows.len())
        .map(|row| {
            let cell = |column| columns.cell(table, row, column);

            let date_added = present(cell(Column::DateAdded)).and_then(parse_date);
            let country = or_unknown(cell(Column::Country));
            let genres = if schema.has(Column::ListedIn) {
                split_genres(present(cell(Column::ListedIn)).unwrap_or(UNKNOWN))
            } else {
                Vec::new()
            };

            Record {
                kind: present(cell(Column::Type)).map(|t| t.trim().to_string()),
                director: or_unknown(cell(Column::Director)),
                cast: or_unknown(cell(Column::Cast)),
                primary_country: primary_country(&country),
                country,
                rating: or_unknown(cell(Column::Rating)),
                year_added: date_added.map(|d| d.year()),
                date_added,
                genres,
                duration_parsed: present(cell(Column::Duration)).and_then(parse_duration),
            }
        })
        .collect();

    debug!(
        "Normalized {} records ({} with year_added, {} with duration)",
        records.len(),
        records.iter().filter(|r| r.year_added.is_some()).count(),
        records.iter().filter(|r| r.duration_parsed.is_some()).count()
    );
    Dataset { schema, records }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn duration_minutes_and_seasons() {
        assert_eq!(
            parse_duration("90 min"),
            Some(ParsedDuration { amount: 90, unit: DurationUnit::Minutes })
        );
        assert_eq!(
            parse_duration("2 Seasons"),
            Some(ParsedDuration { amount: 2, unit: DurationUnit::Seasons })
        );
        assert_eq!(
            parse_duration("1 Season"),
            Some(ParsedDuration { amount: 1, unit: DurationUnit::Seasons })
        );
    }

    #[test]
    fn duration_failures_are_none() {
        assert_eq!(parse_duration("Season"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("   "), None);
        assert_eq!(parse_duration("ninety min"), None);
    }

    #[test]
    fn dates_in_several_layouts() {
        let expected = NaiveDate::from_ymd_opt(2021, 9, 25);
        assert_eq!(parse_date("September 25, 2021"), expected);
        assert_eq!(parse_date(" September 25, 2021 "), expected);
        assert_eq!(parse_date("2021-09-25"), expected);
        assert_eq!(parse_date("09/25/2021"), expected);
        assert_eq!(parse_date("2021-09-25T10:00:00Z"), expected);
        assert_eq!(parse_date("August 4, 2017"), NaiveDate::from_ymd_opt(2017, 8, 4));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn country_takes_first_entry() {
        assert_eq!(primary_country("Canada, United States"), "Canada");
        assert_eq!(primary_country("India"), "India");
        assert_eq!(primary_country(UNKNOWN), UNKNOWN);
        assert_eq!(primary_country(", France"), UNKNOWN);
    }

    #[test]
    fn genres_are_split_and_trimmed() {
        assert_eq!(
            split_genres("Dramas, International Movies"),
            vec!["Dramas", "International Movies"]
        );
        assert_eq!(split_genres("Comedies,,  "), vec!["Comedies"]);
    }

    #[test]
    fn every_field_is_populated() {
        let t = table(
            &[" type ", "director", "cast", "country", "rating", "listed_in", "date_added", "duration"],
            &[
                &["Movie", "Jane Doe", "A, B", "Canada, United States", "PG", "Dramas, Comedies", "2020-01-15", "90 min"],
                &[" TV Show ", "", "", "", "", "", "garbage", "Season"],
                &["", "NaN"],
            ],
        );
        let ds = normalize(&t);
        assert_eq!(ds.len(), 3);

        let first = &ds.records[0];
        assert_eq!(first.kind.as_deref(), Some("Movie"));
        assert_eq!(first.primary_country, "Canada");
        assert_eq!(first.year_added, Some(2020));
        assert_eq!(first.genres, vec!["Dramas", "Comedies"]);

        let second = &ds.records[1];
        assert_eq!(second.kind.as_deref(), Some("TV Show"));
        assert_eq!(second.director, UNKNOWN);
        assert_eq!(second.cast, UNKNOWN);
        assert_eq!(second.country, UNKNOWN);
        assert_eq!(second.rating, UNKNOWN);
        assert_eq!(second.primary_country, UNKNOWN);
        assert_eq!(second.genres, vec![UNKNOWN]);
        assert_eq!(second.date_added, None);
        assert_eq!(second.year_added, None);
        assert_eq!(second.duration_parsed, None);

        let third = &ds.records[2];
        assert_eq!(third.kind, None);
        assert_eq!(third.director, UNKNOWN);
        assert_eq!(third.genres, vec![UNKNOWN]);
    }

    #[test]
    fn absent_listed_in_column_gives_empty_genres() {
        let t = table(&["type", "title"], &[&["Movie", "x"], &["TV Show", "y"]]);
        let ds = normalize(&t);
        assert!(!ds.has(Column::ListedIn));
        assert!(ds.records.iter().all(|r| r.genres.is_empty()));
        assert!(ds.records.iter().all(|r| r.primary_country == UNKNOWN));
    }

    #[test]
    fn header_names_are_trimmed_and_bom_stripped() {
        let t = table(&["\u{feff}type", " rating "], &[&["Movie", "R"]]);
        let ds = normalize(&t);
        assert!(ds.has(Column::Type));
        assert!(ds.has(Column::Rating));
        assert_eq!(ds.records[0].rating, "R");
    }
}
