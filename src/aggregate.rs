//! Descriptive aggregates over a normalized [`Dataset`].
//!
//! Every function here is pure. Ranked tables order by count descending and
//! keep first-encountered order among equal counts.

use log::debug;
use std::collections::{BTreeMap, HashMap};

use crate::record::{Column, Dataset, DurationUnit, Record, UNKNOWN};

/// Number of cast members per record counted toward actor appearances.
/// Keeps a few very large ensemble casts from dominating the tally.
pub const DEFAULT_CAST_CAP: usize = 5;

// --- Frequency tables ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, c)| *c)
    }

    /// Most frequent key.
    pub fn top_key(&self) -> Option<&str> {
        self.entries.first().map(|(k, _)| k.as_str())
    }

    pub fn truncated(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }
}

/// Counting accumulator that remembers first-seen order.
#[derive(Debug, Default)]
pub struct Tally {
    counts: Vec<(String, usize)>,
    slots: HashMap<String, usize>,
}

impl Tally {
    pub fn add(&mut self, key: &str) {
        match self.slots.get(key) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.slots.insert(key.to_string(), self.counts.len());
                self.counts.push((key.to_string(), 1));
            }
        }
    }

    pub fn into_table(self) -> FrequencyTable {
        let mut entries = self.counts;
        // sort_by is stable, so ties stay in insertion order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        FrequencyTable { entries }
    }
}

impl<'a> FromIterator<&'a str> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

// --- Aggregators ---

/// `None` when the input had no `type` column.
pub fn type_counts(ds: &Dataset) -> Option<FrequencyTable> {
    if !ds.has(Column::Type) {
        return None;
    }
    let tally: Tally = ds.records.iter().filter_map(|r| r.kind.as_deref()).collect();
    Some(tally.into_table())
}

pub fn genre_frequency(ds: &Dataset, top_n: usize) -> FrequencyTable {
    let tally: Tally = ds
        .records
        .iter()
        .flat_map(|r| r.genres.iter().map(String::as_str))
        .collect();
    tally.into_table().truncated(top_n)
}

pub fn yearly_trend(ds: &Dataset) -> BTreeMap<i32, usize> {
    let mut trend = BTreeMap::new();
    for year in ds.records.iter().filter_map(|r| r.year_added) {
        *trend.entry(year).or_insert(0) += 1;
    }
    trend
}

/// Full ranking of primary countries.
pub fn country_counts(ds: &Dataset) -> FrequencyTable {
    let tally: Tally = ds.records.iter().map(|r| r.primary_country.as_str()).collect();
    tally.into_table()
}

pub fn country_frequency(ds: &Dataset, top_n: usize) -> FrequencyTable {
    country_counts(ds).truncated(top_n)
}

/// `None` when the input had no `rating` column.
pub fn rating_frequency(ds: &Dataset, top_n: usize) -> Option<FrequencyTable> {
    if !ds.has(Column::Rating) {
        return None;
    }
    let tally: Tally = ds.records.iter().map(|r| r.rating.as_str()).collect();
    Some(tally.into_table().truncated(top_n))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationDistribution {
    /// Parsed minutes of every movie, input order.
    pub movie_minutes: Vec<u32>,
    /// Season count → number of shows.
    pub show_seasons: BTreeMap<u32, usize>,
}

/// Splits records into movies and TV shows by their `type`.
///
/// Without a `type` column every record is treated as a movie.
pub fn duration_distribution(ds: &Dataset) -> DurationDistribution {
    let typed = ds.has(Column::Type);
    let is_movie = |r: &Record| !typed || r.is_kind("movie");

    let mut dist = DurationDistribution::default();
    for record in &ds.records {
        let Some(duration) = record.duration_parsed else {
            continue;
        };
        if is_movie(record) {
            dist.movie_minutes.push(duration.amount);
        } else if typed && record.is_kind("tv show") {
            *dist.show_seasons.entry(duration.amount).or_insert(0) += 1;
        }
    }

    let mismatched = ds
        .records
        .iter()
        .filter(|r| is_movie(r))
        .filter(|r| matches!(r.duration_parsed, Some(d) if d.unit != DurationUnit::Minutes))
        .count();
    if mismatched > 0 {
        debug!("{} movie durations were not expressed in minutes", mismatched);
    }
    dist
}

/// `None` when the input had no `director` column.
pub fn director_frequency(ds: &Dataset, top_n: usize) -> Option<FrequencyTable> {
    if !ds.has(Column::Director) {
        return None;
    }
    let tally: Tally = ds
        .records
        .iter()
        .map(|r| r.director.as_str())
        .filter(|d| *d != UNKNOWN)
        .collect();
    Some(tally.into_table().truncated(top_n))
}

/// Counts appearances among the first `cast_cap` listed slots of each cast.
/// Blank slots use up the cap without being counted.
/// `None` when the input had no `cast` column.
pub fn actor_frequency(ds: &Dataset, top_n: usize, cast_cap: usize) -> Option<FrequencyTable> {
    if !ds.has(Column::Cast) {
        return None;
    }
    let tally: Tally = ds
        .records
        .iter()
        .filter(|r| r.cast != UNKNOWN)
        .flat_map(|r| {
            r.cast
                .split(',')
                .map(str::trim)
                .take(cast_cap)
                .filter(|name| !name.is_empty())
        })
        .collect();
    Some(tally.into_table().truncated(top_n))
}

// --- Histogram ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins spanning min..=max. The last bin includes its upper edge.
pub fn histogram(values: &[u32], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    let (lo, hi) = (min as f64, max as f64);
    if min == max {
        return vec![HistogramBin {
            lower: lo - 0.5,
            upper: hi + 0.5,
            count: values.len(),
        }];
    }

    let width = (hi - lo) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for &v in values {
        let slot = (((v as f64 - lo) / width) as usize).min(bins - 1);
        out[slot].count += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ParsedDuration, Schema};

    fn record(kind: Option<&str>) -> Record {
        Record {
            kind: kind.map(str::to_string),
            director: UNKNOWN.to_string(),
            cast: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            rating: UNKNOWN.to_string(),
            date_added: None,
            year_added: None,
            genres: Vec::new(),
            duration_parsed: None,
            primary_country: UNKNOWN.to_string(),
        }
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        Dataset {
            schema: Schema::new(Column::ALL),
            records,
        }
    }

    #[test]
    fn tally_breaks_ties_by_first_seen() {
        let tally: Tally = ["b", "a", "c", "a", "b", "d"].into_iter().collect();
        let table = tally.into_table();
        let keys: Vec<&str> = table.entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c", "d"]);
        assert_eq!(table.get("a"), Some(2));
        assert_eq!(table.top_key(), Some("b"));
    }

    #[test]
    fn type_counts_skip_missing_types() {
        let ds = dataset(vec![
            record(Some("Movie")),
            record(Some("TV Show")),
            record(Some("Movie")),
            record(None),
        ]);
        let counts = type_counts(&ds).unwrap();
        assert_eq!(counts.entries(), &[("Movie".to_string(), 2), ("TV Show".to_string(), 1)]);

        let no_type = Dataset {
            schema: Schema::new([Column::Rating]),
            records: vec![record(None)],
        };
        assert_eq!(type_counts(&no_type), None);
    }

    #[test]
    fn genres_flatten_and_truncate() {
        let mut a = record(Some("Movie"));
        a.genres = vec!["Dramas".into(), "Comedies".into()];
        let mut b = record(Some("Movie"));
        b.genres = vec!["Comedies".into(), "Thrillers".into()];
        let ds = dataset(vec![a, b]);

        let top = genre_frequency(&ds, 2);
        assert_eq!(top.entries(), &[("Comedies".to_string(), 2), ("Dramas".to_string(), 1)]);
    }

    #[test]
    fn yearly_trend_is_ascending() {
        let years = [Some(2021), None, Some(2020), Some(2021)];
        let ds = dataset(
            years
                .iter()
                .map(|y| {
                    let mut r = record(Some("Movie"));
                    r.year_added = *y;
                    r
                })
                .collect(),
        );
        let trend: Vec<(i32, usize)> = yearly_trend(&ds).into_iter().collect();
        assert_eq!(trend, vec![(2020, 1), (2021, 2)]);
    }

    #[test]
    fn rating_needs_its_column() {
        let ds = Dataset {
            schema: Schema::new([Column::Type]),
            records: vec![record(Some("Movie"))],
        };
        assert_eq!(rating_frequency(&ds, 20), None);

        let ds = dataset(vec![record(Some("Movie"))]);
        let ratings = rating_frequency(&ds, 20).unwrap();
        assert_eq!(ratings.get(UNKNOWN), Some(1));
    }

    #[test]
    fn durations_split_by_type() {
        let mut m1 = record(Some("Movie"));
        m1.duration_parsed = Some(ParsedDuration { amount: 90, unit: DurationUnit::Minutes });
        let mut m2 = record(Some("movie"));
        m2.duration_parsed = None;
        let mut s1 = record(Some("TV Show"));
        s1.duration_parsed = Some(ParsedDuration { amount: 2, unit: DurationUnit::Seasons });
        let mut s2 = record(Some("tv show"));
        s2.duration_parsed = Some(ParsedDuration { amount: 2, unit: DurationUnit::Seasons });
        let mut other = record(Some("Special"));
        other.duration_parsed = Some(ParsedDuration { amount: 45, unit: DurationUnit::Minutes });

        let dist = duration_distribution(&dataset(vec![m1, m2, s1, s2, other]));
        assert_eq!(dist.movie_minutes, vec![90]);
        assert_eq!(dist.show_seasons.into_iter().collect::<Vec<_>>(), vec![(2, 2)]);
    }

    #[test]
    fn untyped_records_count_as_movies() {
        let mut r = record(None);
        r.duration_parsed = Some(ParsedDuration { amount: 100, unit: DurationUnit::Minutes });
        let ds = Dataset {
            schema: Schema::new([Column::Duration]),
            records: vec![r],
        };
        let dist = duration_distribution(&ds);
        assert_eq!(dist.movie_minutes, vec![100]);
        assert!(dist.show_seasons.is_empty());
    }

    #[test]
    fn directors_exclude_unknown() {
        let mut a = record(Some("Movie"));
        a.director = "Ava".into();
        let mut b = record(Some("Movie"));
        b.director = "Ava".into();
        let c = record(Some("Movie"));
        let directors = director_frequency(&dataset(vec![a, b, c]), 10).unwrap();
        assert_eq!(directors.entries(), &[("Ava".to_string(), 2)]);
    }

    #[test]
    fn actors_are_capped_per_record() {
        let mut r = record(Some("Movie"));
        r.cast = "A1, A2, A3, A4, A5, A6, A7, A8".into();
        let actors = actor_frequency(&dataset(vec![r, record(Some("Movie"))]), 10, DEFAULT_CAST_CAP).unwrap();
        assert_eq!(actors.len(), 5);
        assert_eq!(actors.get("A5"), Some(1));
        assert_eq!(actors.get("A6"), None);
        assert_eq!(actors.get(UNKNOWN), None);
    }

    #[test]
    fn blank_cast_slots_count_toward_the_cap() {
        let mut r = record(Some("Movie"));
        r.cast = "A, , B, C, D, E, F".into();
        let actors = actor_frequency(&dataset(vec![r]), 10, DEFAULT_CAST_CAP).unwrap();
        let names: Vec<&str> = actors.entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert_eq!(actors.get("E"), None);
        assert_eq!(actors.get(""), None);
    }

    #[test]
    fn histogram_covers_range() {
        let bins = histogram(&[60, 90, 90, 120], 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![1, 2, 1]);
        assert_eq!(bins[0].lower, 60.0);
        assert_eq!(bins[2].upper, 120.0);

        let single = histogram(&[42, 42], 30);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 2);

        assert!(histogram(&[], 30).is_empty());
    }
}
