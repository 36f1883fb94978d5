use chrono::NaiveDate;

/// Placeholder for missing categorical values. Counted as its own category.
pub const UNKNOWN: &str = "Unknown";

// --- Schema ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Type,
    Director,
    Cast,
    Country,
    Rating,
    ListedIn,
    DateAdded,
    Duration,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Type,
        Column::Director,
        Column::Cast,
        Column::Country,
        Column::Rating,
        Column::ListedIn,
        Column::DateAdded,
        Column::Duration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Type => "type",
            Column::Director => "director",
            Column::Cast => "cast",
            Column::Country => "country",
            Column::Rating => "rating",
            Column::ListedIn => "listed_in",
            Column::DateAdded => "date_added",
            Column::Duration => "duration",
        }
    }
}

/// Which of the known columns appeared in the input header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    present: Vec<Column>,
}

impl Schema {
    pub fn new(present: impl IntoIterator<Item = Column>) -> Self {
        let mut schema = Schema::default();
        for column in present {
            if !schema.present.contains(&column) {
                schema.present.push(column);
            }
        }
        schema
    }

    pub fn has(&self, column: Column) -> bool {
        self.present.contains(&column)
    }
}

// --- Records ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Minutes,
    Seasons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDuration {
    pub amount: u32,
    pub unit: DurationUnit,
}

/// One catalog entry after normalization.
///
/// Categorical text fields hold [`UNKNOWN`] when the input had no value;
/// numeric and date fields use `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Trimmed `type` value ("Movie", "TV Show", ...). Case is preserved.
    pub kind: Option<String>,
    pub director: String,
    pub cast: String,
    pub country: String,
    pub rating: String,
    pub date_added: Option<NaiveDate>,
    pub year_added: Option<i32>,
    pub genres: Vec<String>,
    pub duration_parsed: Option<ParsedDuration>,
    pub primary_country: String,
}

impl Record {
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|k| k.eq_ignore_ascii_case(kind))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub schema: Schema,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has(&self, column: Column) -> bool {
        self.schema.has(column)
    }
}
