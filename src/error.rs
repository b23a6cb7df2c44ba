//! Error kinds surfaced by the record store and the file layer. Every variant
//! is recoverable at the UI boundary, and its `Display` text is the message
//! shown to the user.

use thiserror::Error;

use crate::models::Field;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("The file does not contain valid JSON: {0}")]
    Parse(String),

    #[error("The file does not have the expected structure: {0}")]
    Schema(#[from] SchemaError),

    #[error("Required fields are empty: {}", join_labels(.fields))]
    Validation { fields: Vec<Field> },

    #[error("No record has {field} \"{value}\".")]
    NotFound { field: Field, value: String },

    #[error("{count} records have {field} \"{value}\". Use the search to narrow it down to one.")]
    AmbiguousMatch {
        field: Field,
        value: String,
        count: usize,
    },

    #[error("No record at position {0}.")]
    IndexOutOfRange(usize),

    #[error("The file is too large ({size} bytes). The maximum is {limit} bytes.")]
    SizeLimit { size: u64, limit: u64 },

    #[error("Please choose a .{expected} file.")]
    UnsupportedFileType { expected: &'static str },

    #[error("There is no file to save to. Use \"Save as\" first.")]
    NoFileSelected,

    #[error("There are no records to save.")]
    EmptyDataset,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural problems found while loading a JSON or CSV document.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("the document must contain an array of records")]
    NotAnArray,

    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("record {index} is not an object")]
    NotAnObject { index: usize },
}

pub type Result<T> = std::result::Result<T, StoreError>;

fn join_labels(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}
