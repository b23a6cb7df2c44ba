use log::debug;
use serde_json::Value;

use crate::error::{Result, SchemaError, StoreError};
use crate::models::{Field, Record, RecordEdit, SearchField};

/// Outcome of an exact-match lookup. Callers must branch on cardinality:
/// only `One` identifies a record unambiguously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matches {
    None,
    One(usize),
    Many(Vec<usize>),
}

impl Matches {
    /// Collapse the lookup into the single index, or the error the user needs
    /// to see when there is no match or more than one.
    pub fn into_unique(self, field: Field, value: &str) -> Result<usize> {
        match self {
            Matches::One(index) => Ok(index),
            Matches::None => Err(StoreError::NotFound {
                field,
                value: value.to_string(),
            }),
            Matches::Many(indices) => Err(StoreError::AmbiguousMatch {
                field,
                value: value.to_string(),
                count: indices.len(),
            }),
        }
    }
}

/// In-memory record list plus the unsaved-changes flag. Every mutating call
/// either commits completely or leaves the store untouched.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
    dirty: bool,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing records, e.g. in tests or after an import.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records,
            dirty: false,
        }
    }

    /// Parse `raw` and replace every record with its contents. Returns the
    /// number of loaded records and clears the dirty flag.
    pub fn load(&mut self, raw: &str) -> Result<usize> {
        let records = parse_records(raw)?;
        let count = records.len();
        self.records = records;
        self.dirty = false;
        debug!("loaded {count} records into the store");
        Ok(count)
    }

    /// Pretty-printed JSON array with two-space indentation.
    pub fn serialize(&self) -> String {
        // Serializing plain strings into a Vec cannot fail.
        serde_json::to_string_pretty(&self.records).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn add(&mut self, record: Record) -> Result<()> {
        let missing = record.missing_required();
        if !missing.is_empty() {
            return Err(StoreError::Validation { fields: missing });
        }
        debug!("adding record for project {:?}", record.project);
        self.records.push(record);
        self.dirty = true;
        Ok(())
    }

    /// Exact string equality against one field.
    pub fn find_by_field(&self, field: Field, value: &str) -> Matches {
        let indices: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.get(field) == value)
            .map(|(idx, _)| idx)
            .collect();

        match indices.len() {
            0 => Matches::None,
            1 => Matches::One(indices[0]),
            _ => Matches::Many(indices),
        }
    }

    /// Replace the editable fields of the record at `index`. Identity fields
    /// (project, date, location, referee) never change here.
    pub fn update_at(&mut self, index: usize, edit: impl Into<RecordEdit>) -> Result<()> {
        let edit = edit.into();
        if index >= self.records.len() {
            return Err(StoreError::IndexOutOfRange(index));
        }

        let mut fields = Vec::new();
        if edit.status.trim().is_empty() {
            fields.push(Field::Status);
        }
        if edit.description.trim().is_empty() {
            fields.push(Field::Description);
        }
        if !fields.is_empty() {
            return Err(StoreError::Validation { fields });
        }

        let record = &mut self.records[index];
        record.status = edit.status;
        record.result = edit.result;
        record.description = edit.description;
        self.dirty = true;
        debug!("updated record {index} ({:?})", record.project);
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Record> {
        if index >= self.records.len() {
            return Err(StoreError::IndexOutOfRange(index));
        }
        let removed = self.records.remove(index);
        self.dirty = true;
        debug!("removed record {index} ({:?})", removed.project);
        Ok(removed)
    }

    /// Case-insensitive substring search. A blank term returns every record.
    pub fn filter(&self, field: SearchField, term: &str) -> Vec<Record> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.records.clone();
        }

        self.records
            .iter()
            .filter(|record| match field {
                SearchField::All => Field::ALL
                    .into_iter()
                    .any(|f| contains_folded(record.get(f), &needle)),
                SearchField::Only(f) => contains_folded(record.get(f), &needle),
            })
            .cloned()
            .collect()
    }

    /// Wholesale replacement from another source (CSV import). The result is
    /// unsaved until the next JSON save.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
        self.dirty = true;
    }

    /// Empty the store for a freshly created file.
    pub fn clear(&mut self) {
        self.records.clear();
        self.dirty = false;
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    !haystack.is_empty() && haystack.to_lowercase().contains(needle_lower)
}

/// Validate and decode a JSON document into records without touching any
/// store. Only the first element is checked for the full key set.
pub fn parse_records(raw: &str) -> Result<Vec<Record>> {
    // Editors on Windows like to prefix UTF-8 files with a byte-order mark.
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    if raw.trim().is_empty() {
        return Err(StoreError::Parse("the file is empty".to_string()));
    }

    let value: Value =
        serde_json::from_str(raw).map_err(|err| StoreError::Parse(err.to_string()))?;
    let Value::Array(items) = value else {
        return Err(SchemaError::NotAnArray.into());
    };

    if let Some(first) = items.first() {
        let object = first
            .as_object()
            .ok_or(SchemaError::NotAnObject { index: 0 })?;
        let missing: Vec<&'static str> = Field::ALL
            .into_iter()
            .map(Field::key)
            .filter(|key| !object.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingFields(missing).into());
        }
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| -> Result<Record> {
            if !item.is_object() {
                return Err(SchemaError::NotAnObject { index }.into());
            }
            serde_json::from_value::<Record>(item)
                .map_err(|err| StoreError::Parse(format!("record {index}: {err}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(project: &str, status: &str) -> Record {
        Record {
            project: project.into(),
            date: "2024-03-01".into(),
            location: "Sevilla".into(),
            referee: "Ruiz".into(),
            status: status.into(),
            result: String::new(),
            description: "Liga".into(),
        }
    }

    #[test]
    fn find_by_field_reports_cardinality() {
        let store = RecordStore::with_records(vec![
            record("J1", "Pendiente"),
            record("J2", "Completado"),
            record("J3", "Pendiente"),
        ]);

        assert_eq!(store.find_by_field(Field::Status, "Completado"), Matches::One(1));
        assert_eq!(
            store.find_by_field(Field::Status, "Pendiente"),
            Matches::Many(vec![0, 2])
        );
        assert_eq!(store.find_by_field(Field::Project, "J9"), Matches::None);
        // Exact equality, not case-folded.
        assert_eq!(store.find_by_field(Field::Project, "j1"), Matches::None);
    }

    #[test]
    fn into_unique_maps_to_lookup_errors() {
        let err = Matches::Many(vec![0, 2])
            .into_unique(Field::Status, "Pendiente")
            .unwrap_err();
        assert!(matches!(err, StoreError::AmbiguousMatch { count: 2, .. }));

        let err = Matches::None.into_unique(Field::Project, "J9").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { field: Field::Project, .. }));
    }

    #[test]
    fn update_rejects_blank_status_without_mutating() {
        let mut store = RecordStore::with_records(vec![record("J1", "Pendiente")]);
        let edit = RecordEdit {
            status: "  ".into(),
            result: "2-1".into(),
            description: "x".into(),
        };
        let err = store.update_at(0, edit).unwrap_err();
        assert!(matches!(err, StoreError::Validation { ref fields } if fields == &[Field::Status]));
        assert_eq!(store.get(0).unwrap().result, "");
        assert!(!store.is_dirty());
    }

    #[test]
    fn remove_out_of_range_is_an_error() {
        let mut store = RecordStore::with_records(vec![record("J1", "Pendiente")]);
        assert!(matches!(store.remove_at(3), Err(StoreError::IndexOutOfRange(3))));
        assert_eq!(store.len(), 1);
        let removed = store.remove_at(0).unwrap();
        assert_eq!(removed.project, "J1");
        assert!(store.is_dirty());
    }

    #[test]
    fn filter_on_single_field_ignores_other_columns() {
        let store = RecordStore::with_records(vec![record("Sevilla Cup", "Pendiente"), record("J2", "Pendiente")]);
        let hits = store.filter(SearchField::Only(Field::Project), "sevilla");
        assert_eq!(hits.len(), 1);
        assert_eq!(store.filter(SearchField::All, "SEVILLA").len(), 2);
        assert_eq!(store.filter(SearchField::All, "   ").len(), 2);
    }
}
