use anyhow::Result;
use jornada_manager::{Field, Matches, Record, RecordStore, SchemaError, SearchField, StoreError};

fn jornada(project: &str, location: &str, status: &str) -> Record {
    Record {
        project: project.into(),
        date: "2024-05-11".into(),
        location: location.into(),
        referee: "Ruiz".into(),
        status: status.into(),
        result: String::new(),
        description: "Liga regional".into(),
    }
}

fn sample_json() -> String {
    let records = vec![
        jornada("J1", "Madrid", "Pendiente"),
        jornada("J2", "Sevilla", "Completado"),
        jornada("J3", "Madrid Norte", "Pendiente"),
    ];
    serde_json::to_string(&records).unwrap()
}

#[test]
fn load_replaces_records_and_starts_clean() -> Result<()> {
    let mut store = RecordStore::with_records(vec![jornada("old", "x", "Pendiente")]);
    store.add(jornada("J9", "Bilbao", "Pendiente"))?;
    assert!(store.is_dirty());

    let count = store.load(&sample_json())?;
    assert_eq!(count, 3);
    assert_eq!(store.len(), 3);
    assert!(!store.is_dirty());
    assert_eq!(store.get(0).map(|r| r.project.as_str()), Some("J1"));
    Ok(())
}

#[test]
fn load_rejects_malformed_input_and_keeps_state() -> Result<()> {
    let mut store = RecordStore::new();
    store.load(&sample_json())?;

    assert!(matches!(store.load("not json"), Err(StoreError::Parse(_))));
    assert!(matches!(store.load(""), Err(StoreError::Parse(_))));
    assert!(matches!(
        store.load("{}"),
        Err(StoreError::Schema(SchemaError::NotAnArray))
    ));
    assert!(matches!(
        store.load("[1, 2]"),
        Err(StoreError::Schema(SchemaError::NotAnObject { index: 0 }))
    ));

    assert_eq!(store.len(), 3);
    assert!(!store.is_dirty());
    Ok(())
}

#[test]
fn first_record_must_carry_every_key() {
    let mut store = RecordStore::new();
    match store.load("[{}]") {
        Err(StoreError::Schema(SchemaError::MissingFields(missing))) => {
            assert_eq!(
                missing,
                vec![
                    "proyecto",
                    "fecha",
                    "ubicacion",
                    "arbitro",
                    "estado",
                    "resultado",
                    "descripcion"
                ]
            );
        }
        other => panic!("expected missing fields, got {other:?}"),
    }
}

#[test]
fn later_records_tolerate_gaps_and_non_strings() -> Result<()> {
    let raw = r#"[
        {"proyecto": "J1", "fecha": "2024-01-01", "ubicacion": "Madrid", "arbitro": "Ruiz",
         "estado": "Pendiente", "resultado": "", "descripcion": "Liga"},
        {"proyecto": "J2", "estado": null, "resultado": 3, "extra": true}
    ]"#;
    let mut store = RecordStore::new();
    store.load(raw)?;

    let second = store.get(1).unwrap();
    assert_eq!(second.project, "J2");
    assert_eq!(second.status, "");
    assert_eq!(second.result, "3");
    assert!(!store.serialize().contains("extra"));

    let pending = store.filter(SearchField::Only(Field::Status), "p");
    let projects: Vec<&str> = pending.iter().map(|r| r.project.as_str()).collect();
    assert_eq!(projects, vec!["J1"]);
    assert_eq!(store.filter(SearchField::Only(Field::Location), "madrid").len(), 1);
    assert_eq!(store.filter(SearchField::All, "liga").len(), 1);
    assert_eq!(store.filter(SearchField::All, "3").len(), 1);
    Ok(())
}

#[test]
fn leading_byte_order_mark_is_ignored() -> Result<()> {
    let mut store = RecordStore::new();
    let count = store.load(&format!("\u{feff}{}", sample_json()))?;
    assert_eq!(count, 3);
    assert_eq!(store.get(2).map(|r| r.project.as_str()), Some("J3"));

    assert!(matches!(store.load("\u{feff}"), Err(StoreError::Parse(_))));
    assert_eq!(store.len(), 3);
    Ok(())
}

#[test]
fn add_requires_every_field_but_result() -> Result<()> {
    let mut store = RecordStore::new();
    let mut incomplete = jornada("J1", "Madrid", "Pendiente");
    incomplete.referee = "  ".into();
    incomplete.description.clear();

    match store.add(incomplete) {
        Err(StoreError::Validation { fields }) => {
            assert_eq!(fields, vec![Field::Referee, Field::Description]);
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert!(store.is_empty());
    assert!(!store.is_dirty());

    store.add(jornada("J1", "Madrid", "Pendiente"))?;
    assert_eq!(store.len(), 1);
    assert!(store.is_dirty());
    Ok(())
}

#[test]
fn modify_through_status_lookup_keeps_identity_fields() -> Result<()> {
    let mut store = RecordStore::new();
    store.load(&sample_json())?;

    let index = store
        .find_by_field(Field::Status, "Completado")
        .into_unique(Field::Status, "Completado")?;
    let mut edited = store.get(index).cloned().unwrap();
    edited.project = "renamed".into();
    edited.status = "Aplazado".into();
    edited.result = "1-1".into();
    store.update_at(index, edited)?;

    let record = store.get(index).unwrap();
    assert_eq!(record.project, "J2");
    assert_eq!(record.location, "Sevilla");
    assert_eq!(record.status, "Aplazado");
    assert_eq!(record.result, "1-1");
    assert!(store.is_dirty());
    Ok(())
}

#[test]
fn lookups_report_cardinality() -> Result<()> {
    let mut store = RecordStore::new();
    store.load(&sample_json())?;

    assert_eq!(store.find_by_field(Field::Project, "J3"), Matches::One(2));
    assert_eq!(store.find_by_field(Field::Project, "j3"), Matches::None);
    assert_eq!(
        store.find_by_field(Field::Status, "Pendiente"),
        Matches::Many(vec![0, 2])
    );
    assert!(matches!(
        store
            .find_by_field(Field::Status, "Pendiente")
            .into_unique(Field::Status, "Pendiente"),
        Err(StoreError::AmbiguousMatch { count: 2, .. })
    ));
    Ok(())
}

#[test]
fn delete_removes_exactly_one_record() -> Result<()> {
    let mut store = RecordStore::new();
    store.load(&sample_json())?;

    let removed = store.remove_at(1)?;
    assert_eq!(removed.project, "J2");
    assert_eq!(store.len(), 2);
    assert!(matches!(
        store.remove_at(5),
        Err(StoreError::IndexOutOfRange(5))
    ));
    assert_eq!(store.len(), 2);
    Ok(())
}

#[test]
fn filter_is_case_insensitive_substring() -> Result<()> {
    let mut store = RecordStore::new();
    store.load(&sample_json())?;

    let hits = store.filter(SearchField::All, "madrid");
    let projects: Vec<&str> = hits.iter().map(|r| r.project.as_str()).collect();
    assert_eq!(projects, vec!["J1", "J3"]);

    assert_eq!(store.filter(SearchField::Only(Field::Referee), "RUIZ").len(), 3);
    assert_eq!(store.filter(SearchField::Only(Field::Project), "madrid").len(), 0);
    assert_eq!(store.filter(SearchField::All, "   ").len(), 3);
    Ok(())
}

#[test]
fn serialize_then_load_round_trips() -> Result<()> {
    let mut store = RecordStore::new();
    store.load(&sample_json())?;
    let text = store.serialize();
    assert!(text.starts_with("[\n  {"));

    let mut reloaded = RecordStore::new();
    reloaded.load(&text)?;
    assert_eq!(reloaded.records(), store.records());
    Ok(())
}
