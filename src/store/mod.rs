//! Record persistence split across logical submodules: the in-memory store,
//! the file-backed document around it, and the CSV mapping.

mod csv;
mod document;
mod records;

pub use csv::{from_csv, to_csv};
pub use document::{
    check_file, read_checked, with_json_extension, Document, OpenOutcome, SaveOutcome,
    MAX_FILE_SIZE,
};
pub use records::{parse_records, Matches, RecordStore};
