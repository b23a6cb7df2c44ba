use jornada_manager::view::{page, sort};
use jornada_manager::{Field, Record, RecordStore, SearchField, SortOrder, ViewState};

fn numbered(count: usize) -> Vec<Record> {
    (1..=count)
        .map(|i| Record {
            project: format!("J{i:02}"),
            date: format!("2024-03-{:02}", (i % 28) + 1),
            location: if i % 2 == 0 { "Madrid" } else { "Valencia" }.into(),
            referee: "Ruiz".into(),
            status: "Pendiente".into(),
            result: String::new(),
            description: format!("Jornada {i}"),
        })
        .collect()
}

#[test]
fn twenty_five_records_make_three_pages() {
    let records = numbered(25);
    let sizes: Vec<usize> = (1..=4).map(|n| page(&records, n, 10).items.len()).collect();
    assert_eq!(sizes, vec![10, 10, 5, 0]);
    assert_eq!(page(&records, 3, 10).total_pages, 3);
    assert_eq!(page(&records, 4, 10).total_pages, 3);

    let first = page(&records, 1, 10);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.total_records, 25);
    assert_eq!(first.items[0].project, "J01");
    assert_eq!(page(&records, 3, 10).items[4].project, "J25");
}

#[test]
fn descending_is_ascending_reversed_for_distinct_keys() {
    let mut asc = numbered(12);
    let mut desc = asc.clone();
    sort(&mut asc, Field::Project, SortOrder::Asc);
    sort(&mut desc, Field::Project, SortOrder::Desc);

    desc.reverse();
    assert_eq!(asc, desc);
}

#[test]
fn sorting_is_stable_for_equal_keys() {
    let records = numbered(6);
    for order in [SortOrder::Asc, SortOrder::Desc] {
        let mut sorted = records.clone();
        sort(&mut sorted, Field::Location, order);
        let madrid: Vec<&str> = sorted
            .iter()
            .filter(|r| r.location == "Madrid")
            .map(|r| r.project.as_str())
            .collect();
        assert_eq!(madrid, vec!["J02", "J04", "J06"]);
    }
}

#[test]
fn sort_is_lexical_not_numeric() {
    let mut records: Vec<Record> = ["10", "9", "100"]
        .iter()
        .map(|p| Record {
            project: p.to_string(),
            ..Record::default()
        })
        .collect();
    sort(&mut records, Field::Project, SortOrder::Asc);
    let order: Vec<&str> = records.iter().map(|r| r.project.as_str()).collect();
    assert_eq!(order, vec!["10", "100", "9"]);
}

#[test]
fn projection_filters_then_sorts_then_pages() {
    let store = RecordStore::with_records(numbered(25));
    let state = ViewState::new(Field::Project, SortOrder::Desc)
        .apply_filter(SearchField::Only(Field::Location), "MADRID");

    let first = state.project(&store, 10);
    assert_eq!(first.total_records, 12);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items[0].project, "J24");

    let second = state.change_page(1, first.total_pages).project(&store, 10);
    assert_eq!(second.number, 2);
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.items[1].project, "J02");
}

#[test]
fn clearing_the_filter_returns_to_the_full_set() {
    let store = RecordStore::with_records(numbered(25));
    let state = ViewState::default()
        .apply_filter(SearchField::All, "valencia")
        .change_page(1, 2)
        .clear_filter();

    assert!(!state.has_active_search());
    assert_eq!(state.page, 1);
    assert_eq!(state.project(&store, 10).total_records, 25);
}
