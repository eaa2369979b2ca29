use std::path::PathBuf;

/// Dictionary lookup and loading errors.
#[derive(thiserror::Error, Debug)]
pub enum DictionaryError {
    #[error("unknown dictionary {name:?}; valid names: {valid}")]
    UnknownName { name: String, valid: String },
    #[error("dictionary {name} is not embedded; pass its code table with --dictionary-file")]
    NotEmbedded { name: String },
    #[error("marker_size {0} is out of range (1..=8)")]
    MarkerSizeOutOfRange(usize),
    #[error("dictionary has no codes")]
    Empty,
    #[error("code for id {id} has bits outside the {marker_size}x{marker_size} marker area")]
    CodeOutOfRange { id: usize, marker_size: usize },
    #[error("{path}: marker_size {found} does not match {name} ({expected})")]
    MarkerSizeMismatch {
        path: PathBuf,
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("{path}: {name} needs {needed} codes, file has {available}")]
    NotEnoughCodes {
        path: PathBuf,
        name: String,
        needed: usize,
        available: usize,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
