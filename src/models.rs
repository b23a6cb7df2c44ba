//! Domain models for jornada records. These types travel through every layer
//! (store, view projection, CSV mapping and the TUI), so they stay plain data
//! holders plus the small amount of field metadata the other layers need to
//! address a column generically.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One jornada entry. Serde field order is the on-disk key order, so
/// `serde_json::to_string_pretty` produces the canonical file layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "proyecto", default, deserialize_with = "lenient_string")]
    pub project: String,
    /// Free-form date text; the file format does not constrain it.
    #[serde(rename = "fecha", default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "ubicacion", default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(rename = "arbitro", default, deserialize_with = "lenient_string")]
    pub referee: String,
    #[serde(rename = "estado", default, deserialize_with = "lenient_string")]
    pub status: String,
    /// The only optional field. An empty string means "no result yet".
    #[serde(rename = "resultado", default, deserialize_with = "lenient_string")]
    pub result: String,
    #[serde(rename = "descripcion", default, deserialize_with = "lenient_string")]
    pub description: String,
}

impl Record {
    /// Borrow the value of a field by its enum tag.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Project => &self.project,
            Field::Date => &self.date,
            Field::Location => &self.location,
            Field::Referee => &self.referee,
            Field::Status => &self.status,
            Field::Result => &self.result,
            Field::Description => &self.description,
        }
    }

    /// Mutable access used by forms and the CSV reader.
    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Project => &mut self.project,
            Field::Date => &mut self.date,
            Field::Location => &mut self.location,
            Field::Referee => &mut self.referee,
            Field::Status => &mut self.status,
            Field::Result => &mut self.result,
            Field::Description => &mut self.description,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// Required fields that are blank after trimming, in column order.
    pub fn missing_required(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| field.is_required() && self.get(*field).trim().is_empty())
            .collect()
    }

    /// Copy of the record with surrounding whitespace stripped from the text
    /// fields a user types by hand.
    pub fn trimmed(&self) -> Record {
        let mut out = self.clone();
        for field in Field::ALL {
            let value = out.get(field).trim().to_string();
            out.set(field, value);
        }
        out
    }
}

/// The part of a record that may change after creation. Converting a full
/// `Record` into a `RecordEdit` drops the identity fields, which is how
/// `RecordStore::update_at` guarantees they cannot be overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEdit {
    pub status: String,
    pub result: String,
    pub description: String,
}

impl From<Record> for RecordEdit {
    fn from(record: Record) -> Self {
        Self {
            status: record.status,
            result: record.result,
            description: record.description,
        }
    }
}

impl From<&Record> for RecordEdit {
    fn from(record: &Record) -> Self {
        Self {
            status: record.status.clone(),
            result: record.result.clone(),
            description: record.description.clone(),
        }
    }
}

/// Column tags for the seven record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "proyecto")]
    Project,
    #[serde(rename = "fecha")]
    Date,
    #[serde(rename = "ubicacion")]
    Location,
    #[serde(rename = "arbitro")]
    Referee,
    #[serde(rename = "estado")]
    Status,
    #[serde(rename = "resultado")]
    Result,
    #[serde(rename = "descripcion")]
    Description,
}

impl Field {
    /// Every field in file/column order.
    pub const ALL: [Field; 7] = [
        Field::Project,
        Field::Date,
        Field::Location,
        Field::Referee,
        Field::Status,
        Field::Result,
        Field::Description,
    ];

    /// Fields that stay editable once a record exists.
    pub const EDITABLE: [Field; 3] = [Field::Status, Field::Result, Field::Description];

    /// Key used in the JSON file and the CSV header.
    pub fn key(self) -> &'static str {
        match self {
            Field::Project => "proyecto",
            Field::Date => "fecha",
            Field::Location => "ubicacion",
            Field::Referee => "arbitro",
            Field::Status => "estado",
            Field::Result => "resultado",
            Field::Description => "descripcion",
        }
    }

    /// Human-facing column title.
    pub fn label(self) -> &'static str {
        match self {
            Field::Project => "Project",
            Field::Date => "Date",
            Field::Location => "Location",
            Field::Referee => "Referee",
            Field::Status => "Status",
            Field::Result => "Result",
            Field::Description => "Description",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.key() == key)
    }

    pub fn is_required(self) -> bool {
        self != Field::Result
    }

    pub fn is_editable(self) -> bool {
        Field::EDITABLE.contains(&self)
    }

    /// Next field in column order, wrapping around.
    pub fn next(self) -> Field {
        let idx = Field::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Field::ALL[(idx + 1) % Field::ALL.len()]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Field {
    type Err = String;

    /// Accepts either the wire key (`proyecto`) or the English label
    /// (`project`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.key() == wanted || field.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

/// Scope of a text search: one column or every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    All,
    Only(Field),
}

impl SearchField {
    /// Cycle All → each field → All. Drives the search dialog's Tab key.
    pub fn next(self) -> SearchField {
        match self {
            SearchField::All => SearchField::Only(Field::Project),
            SearchField::Only(Field::Description) => SearchField::All,
            SearchField::Only(field) => SearchField::Only(field.next()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchField::All => "All fields",
            SearchField::Only(field) => field.label(),
        }
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(SearchField::All)
        } else {
            s.parse::<Field>().map(SearchField::Only)
        }
    }
}

/// Direction for the table ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "ascending")]
    Asc,
    #[default]
    #[serde(alias = "descending")]
    Desc,
}

impl SortOrder {
    pub fn reversed(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Arrow shown next to the sort column in the table header.
    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Asc => "▲",
            SortOrder::Desc => "▼",
        }
    }
}

/// Accept strings, other scalars (stored as their text form) and `null` or a
/// missing key (stored as the empty string). Only the first record of a file
/// is key-checked, so later records may be ragged.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}
