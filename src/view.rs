//! Sorted, paginated projections of the record set. Nothing here holds
//! state between calls: the UI keeps a `ViewState` value and asks for a new
//! one whenever the user filters, pages or re-sorts.

use std::cmp::Ordering;

use crate::models::{Field, Record, SearchField, SortOrder};
use crate::store::RecordStore;

/// Rows per page when the configuration does not say otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of records plus the metadata the pagination bar needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Record>,
    /// 1-based page number this slice was cut for.
    pub number: usize,
    pub total_records: usize,
    pub total_pages: usize,
}

/// Stable sort by lexical comparison of one field. Records that compare
/// equal keep their relative input order in both directions.
pub fn sort(records: &mut [Record], field: Field, order: SortOrder) {
    records.sort_by(|a, b| compare(a, b, field, order));
}

fn compare(a: &Record, b: &Record, field: Field, order: SortOrder) -> Ordering {
    let ord = a.get(field).cmp(b.get(field));
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

/// Cut page `number` (1-based) out of `records`. Out-of-range pages yield no
/// items but still report the real page count; callers clamp if they care.
pub fn page(records: &[Record], number: usize, page_size: usize) -> Page {
    let page_size = page_size.max(1);
    let total_records = records.len();
    let total_pages = total_records.div_ceil(page_size);

    let items = if number == 0 {
        Vec::new()
    } else {
        let start = (number - 1).saturating_mul(page_size);
        records.iter().skip(start).take(page_size).cloned().collect()
    };

    Page {
        items,
        number,
        total_records,
        total_pages,
    }
}

/// Everything that decides what the table shows. Commands consume a
/// reference and hand back the next state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_field: SearchField,
    pub search_term: String,
    pub sort_field: Field,
    pub sort_order: SortOrder,
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Field::Project, SortOrder::Desc)
    }
}

impl ViewState {
    pub fn new(sort_field: Field, sort_order: SortOrder) -> Self {
        Self {
            search_field: SearchField::All,
            search_term: String::new(),
            sort_field,
            sort_order,
            page: 1,
        }
    }

    /// True when the table shows a filtered subset rather than everything.
    pub fn has_active_search(&self) -> bool {
        !self.search_term.trim().is_empty()
    }

    pub fn apply_filter(&self, field: SearchField, term: &str) -> Self {
        Self {
            search_field: field,
            search_term: term.to_string(),
            page: 1,
            ..self.clone()
        }
    }

    pub fn clear_filter(&self) -> Self {
        self.apply_filter(SearchField::All, "")
    }

    /// Move by `delta` pages, staying within `1..=total_pages`.
    pub fn change_page(&self, delta: isize, total_pages: usize) -> Self {
        let last = total_pages.max(1) as isize;
        let next = (self.page as isize + delta).clamp(1, last);
        Self {
            page: next as usize,
            ..self.clone()
        }
    }

    pub fn change_sort(&self, field: Field) -> Self {
        Self {
            sort_field: field,
            page: 1,
            ..self.clone()
        }
    }

    pub fn toggle_order(&self) -> Self {
        Self {
            sort_order: self.sort_order.reversed(),
            ..self.clone()
        }
    }

    /// Pull the page back into range after the record set shrank.
    pub fn clamp_page(&self, total_pages: usize) -> Self {
        Self {
            page: self.page.clamp(1, total_pages.max(1)),
            ..self.clone()
        }
    }

    /// Filter, sort and page the store in one step.
    pub fn project(&self, store: &RecordStore, page_size: usize) -> Page {
        let mut rows = store.filter(self.search_field, &self.search_term);
        sort(&mut rows, self.sort_field, self.sort_order);
        page(&rows, self.page, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(project: &str) -> Record {
        Record {
            project: project.into(),
            ..Record::default()
        }
    }

    #[test]
    fn page_zero_is_empty() {
        let records: Vec<Record> = (0..3).map(|i| named(&i.to_string())).collect();
        let p = page(&records, 0, 10);
        assert!(p.items.is_empty());
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn empty_set_has_zero_pages() {
        let p = page(&[], 1, 10);
        assert_eq!(p.total_records, 0);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn change_page_is_clamped() {
        let state = ViewState::default();
        assert_eq!(state.change_page(-1, 3).page, 1);
        assert_eq!(state.change_page(5, 3).page, 3);
        assert_eq!(state.change_page(1, 0).page, 1);
    }

    #[test]
    fn filter_and_sort_commands_reset_the_page() {
        let state = ViewState {
            page: 4,
            ..ViewState::default()
        };
        assert_eq!(state.apply_filter(SearchField::All, "x").page, 1);
        assert_eq!(state.change_sort(Field::Date).page, 1);
        assert_eq!(state.toggle_order().page, 4);
        assert_eq!(state.toggle_order().sort_order, SortOrder::Asc);
        assert_eq!(state.clamp_page(2).page, 2);
    }
}
