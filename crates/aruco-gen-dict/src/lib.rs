//! ArUco marker dictionaries for printable target generation.
//!
//! This crate provides:
//! - embedded built-in dictionaries (compiled into the binary),
//! - the OpenCV predefined dictionary names and their lookup,
//! - loading dictionaries from JSON code tables,
//! - matching codes against a dictionary, used to check rendered markers.

pub mod builtins;
mod dictionary;
mod error;
mod matcher;
mod predefined;

pub use dictionary::Dictionary;
pub use error::DictionaryError;
pub use matcher::{rotate_code_u64, Match, Matcher};
pub use predefined::{resolve_dictionary, PredefinedDictionary};
