//! OpenCV predefined dictionary names.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{builtins, Dictionary, DictionaryError};

/// Predefined ArUco dictionaries, named as in OpenCV.
///
/// The `NxN_K` tiers of one marker size share a single code table: `K` is
/// how many leading markers of the 1000-marker table the tier uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredefinedDictionary {
    #[serde(rename = "DICT_4X4_50")]
    Dict4x4_50,
    #[serde(rename = "DICT_4X4_100")]
    Dict4x4_100,
    #[serde(rename = "DICT_4X4_250")]
    Dict4x4_250,
    #[serde(rename = "DICT_4X4_1000")]
    Dict4x4_1000,
    #[serde(rename = "DICT_5X5_50")]
    Dict5x5_50,
    #[serde(rename = "DICT_5X5_100")]
    Dict5x5_100,
    #[serde(rename = "DICT_5X5_250")]
    Dict5x5_250,
    #[serde(rename = "DICT_5X5_1000")]
    Dict5x5_1000,
    #[serde(rename = "DICT_6X6_50")]
    Dict6x6_50,
    #[serde(rename = "DICT_6X6_100")]
    Dict6x6_100,
    #[serde(rename = "DICT_6X6_250")]
    Dict6x6_250,
    #[serde(rename = "DICT_6X6_1000")]
    Dict6x6_1000,
    #[serde(rename = "DICT_7X7_50")]
    Dict7x7_50,
    #[serde(rename = "DICT_7X7_100")]
    Dict7x7_100,
    #[serde(rename = "DICT_7X7_250")]
    Dict7x7_250,
    #[serde(rename = "DICT_7X7_1000")]
    Dict7x7_1000,
    #[serde(rename = "DICT_ARUCO_ORIGINAL")]
    ArucoOriginal,
}

impl PredefinedDictionary {
    pub const ALL: [PredefinedDictionary; 17] = [
        Self::Dict4x4_50,
        Self::Dict4x4_100,
        Self::Dict4x4_250,
        Self::Dict4x4_1000,
        Self::Dict5x5_50,
        Self::Dict5x5_100,
        Self::Dict5x5_250,
        Self::Dict5x5_1000,
        Self::Dict6x6_50,
        Self::Dict6x6_100,
        Self::Dict6x6_250,
        Self::Dict6x6_1000,
        Self::Dict7x7_50,
        Self::Dict7x7_100,
        Self::Dict7x7_250,
        Self::Dict7x7_1000,
        Self::ArucoOriginal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Dict4x4_50 => "DICT_4X4_50",
            Self::Dict4x4_100 => "DICT_4X4_100",
            Self::Dict4x4_250 => "DICT_4X4_250",
            Self::Dict4x4_1000 => "DICT_4X4_1000",
            Self::Dict5x5_50 => "DICT_5X5_50",
            Self::Dict5x5_100 => "DICT_5X5_100",
            Self::Dict5x5_250 => "DICT_5X5_250",
            Self::Dict5x5_1000 => "DICT_5X5_1000",
            Self::Dict6x6_50 => "DICT_6X6_50",
            Self::Dict6x6_100 => "DICT_6X6_100",
            Self::Dict6x6_250 => "DICT_6X6_250",
            Self::Dict6x6_1000 => "DICT_6X6_1000",
            Self::Dict7x7_50 => "DICT_7X7_50",
            Self::Dict7x7_100 => "DICT_7X7_100",
            Self::Dict7x7_250 => "DICT_7X7_250",
            Self::Dict7x7_1000 => "DICT_7X7_1000",
            Self::ArucoOriginal => "DICT_ARUCO_ORIGINAL",
        }
    }

    /// Inner bits per marker side.
    pub fn marker_size(self) -> usize {
        match self {
            Self::Dict4x4_50 | Self::Dict4x4_100 | Self::Dict4x4_250 | Self::Dict4x4_1000 => 4,
            Self::Dict5x5_50
            | Self::Dict5x5_100
            | Self::Dict5x5_250
            | Self::Dict5x5_1000
            | Self::ArucoOriginal => 5,
            Self::Dict6x6_50 | Self::Dict6x6_100 | Self::Dict6x6_250 | Self::Dict6x6_1000 => 6,
            Self::Dict7x7_50 | Self::Dict7x7_100 | Self::Dict7x7_250 | Self::Dict7x7_1000 => 7,
        }
    }

    /// Number of markers in the dictionary.
    pub fn marker_count(self) -> usize {
        match self {
            Self::Dict4x4_50 | Self::Dict5x5_50 | Self::Dict6x6_50 | Self::Dict7x7_50 => 50,
            Self::Dict4x4_100 | Self::Dict5x5_100 | Self::Dict6x6_100 | Self::Dict7x7_100 => 100,
            Self::Dict4x4_250 | Self::Dict5x5_250 | Self::Dict6x6_250 | Self::Dict7x7_250 => 250,
            Self::Dict4x4_1000 | Self::Dict5x5_1000 | Self::Dict6x6_1000 | Self::Dict7x7_1000 => {
                1000
            }
            Self::ArucoOriginal => 1024,
        }
    }

    /// Error-correction capacity OpenCV assigns to the dictionary.
    pub fn max_correction_bits(self) -> u8 {
        match self {
            Self::Dict4x4_50 | Self::Dict4x4_100 | Self::Dict4x4_250 => 1,
            Self::Dict4x4_1000 | Self::ArucoOriginal => 0,
            Self::Dict5x5_50 | Self::Dict5x5_100 => 3,
            Self::Dict5x5_250 | Self::Dict5x5_1000 => 2,
            Self::Dict6x6_50 => 6,
            Self::Dict6x6_100 | Self::Dict6x6_250 => 5,
            Self::Dict6x6_1000 => 4,
            Self::Dict7x7_50 => 9,
            Self::Dict7x7_100 | Self::Dict7x7_250 => 8,
            Self::Dict7x7_1000 => 6,
        }
    }

    /// `DICT_NxN_K` tiers share one code table per marker size;
    /// `DICT_ARUCO_ORIGINAL` stands alone.
    fn is_tiered(self) -> bool {
        self != Self::ArucoOriginal
    }

    /// Table serving this dictionary: its own, or else the smallest larger
    /// tier of the same marker size that `lookup` knows.
    fn table_from(self, lookup: impl Fn(&str) -> Option<Dictionary>) -> Option<Dictionary> {
        if let Some(own) = lookup(self.name()) {
            return Some(own);
        }
        if !self.is_tiered() {
            return None;
        }
        Self::ALL
            .into_iter()
            .filter(|d| d.is_tiered() && d.marker_size() == self.marker_size())
            .filter(|d| d.marker_count() > self.marker_count())
            .filter_map(|d| lookup(d.name()))
            .filter(|table| table.len() >= self.marker_count())
            .min_by_key(Dictionary::len)
    }

    /// Cut a table down to this tier and take over its name and correction bits.
    fn tier_of(self, table: Dictionary) -> Dictionary {
        let mut dict = table.truncated(self.marker_count()).with_name(self.name());
        dict.max_correction_bits = self.max_correction_bits();
        dict
    }

    /// Whether a compiled-in table can serve this dictionary.
    pub fn is_embedded(self) -> bool {
        self.table_from(builtins::builtin_dictionary).is_some()
    }

    /// The embedded dictionary, or [`DictionaryError::NotEmbedded`].
    ///
    /// A tier without its own table is cut from a larger embedded tier of the
    /// same marker size, e.g. `DICT_6X6_250` from `DICT_6X6_1000`.
    pub fn dictionary(self) -> Result<Dictionary, DictionaryError> {
        let table = self
            .table_from(builtins::builtin_dictionary)
            .ok_or_else(|| DictionaryError::NotEmbedded {
                name: self.name().to_string(),
            })?;
        log::trace!("{} served by the {} table", self.name(), table.name);
        Ok(self.tier_of(table))
    }

    /// Load the dictionary from a JSON code table.
    ///
    /// The file may hold a larger table of the same marker size (for example
    /// the 1000-marker table for a 50-marker tier); only the leading
    /// [`marker_count`](Self::marker_count) codes are kept.
    pub fn from_json_file(self, path: &Path) -> Result<Dictionary, DictionaryError> {
        let loaded = Dictionary::load_json(path)?;
        if loaded.marker_size != self.marker_size() {
            return Err(DictionaryError::MarkerSizeMismatch {
                path: path.to_path_buf(),
                name: self.name().to_string(),
                expected: self.marker_size(),
                found: loaded.marker_size,
            });
        }
        let needed = self.marker_count();
        if loaded.len() < needed {
            return Err(DictionaryError::NotEnoughCodes {
                path: path.to_path_buf(),
                name: self.name().to_string(),
                needed,
                available: loaded.len(),
            });
        }
        log::debug!(
            "loaded {} codes for {} from {}",
            loaded.len(),
            self.name(),
            path.display()
        );
        Ok(self.tier_of(loaded))
    }
}

impl fmt::Display for PredefinedDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PredefinedDictionary {
    type Err = DictionaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| DictionaryError::UnknownName {
                name: s.to_string(),
                valid: Self::ALL.map(Self::name).join(", "),
            })
    }
}

/// Resolve a dictionary by name, optionally from a JSON code table.
pub fn resolve_dictionary(name: &str, file: Option<&Path>) -> Result<Dictionary, DictionaryError> {
    let predefined: PredefinedDictionary = name.parse()?;
    match file {
        Some(path) => predefined.from_json_file(path),
        None => predefined.dictionary(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for d in PredefinedDictionary::ALL {
            assert_eq!(d.name().parse::<PredefinedDictionary>().expect("parse"), d);
        }
    }

    #[test]
    fn unknown_name_lists_valid_names() {
        let err = "DICT_3X3_9".parse::<PredefinedDictionary>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("DICT_3X3_9"));
        assert!(msg.contains("DICT_ARUCO_ORIGINAL"));
        assert!("dict_4x4_50".parse::<PredefinedDictionary>().is_err());
    }

    #[test]
    fn embedded_dictionaries_match_their_metadata() {
        for d in PredefinedDictionary::ALL.into_iter().filter(|d| d.is_embedded()) {
            let dict = d.dictionary().expect("embedded");
            assert_eq!(dict.name, d.name());
            assert_eq!(dict.marker_size, d.marker_size());
            assert_eq!(dict.len(), d.marker_count());
            assert_eq!(dict.max_correction_bits, d.max_correction_bits());
        }
    }

    #[test]
    fn smaller_tier_is_cut_from_a_larger_table() {
        let only_100 = |name: &str| (name == "DICT_4X4_100").then_some(builtins::DICT_4X4_100);
        let dict = PredefinedDictionary::Dict4x4_50
            .table_from(only_100)
            .map(|t| PredefinedDictionary::Dict4x4_50.tier_of(t))
            .expect("served by the 100 table");
        assert_eq!(dict, builtins::DICT_4X4_50.with_name("DICT_4X4_50"));

        assert!(PredefinedDictionary::Dict4x4_250.table_from(only_100).is_none());
        assert!(PredefinedDictionary::Dict5x5_50.table_from(only_100).is_none());
    }

    #[test]
    fn original_table_does_not_serve_five_bit_tiers() {
        let only_original = |name: &str| {
            (name == "DICT_ARUCO_ORIGINAL").then_some(builtins::DICT_ARUCO_ORIGINAL)
        };
        for d in [
            PredefinedDictionary::Dict5x5_50,
            PredefinedDictionary::Dict5x5_1000,
        ] {
            assert!(d.table_from(only_original).is_none(), "{d}");
        }
    }

    #[test]
    fn missing_table_reports_not_embedded() {
        let err = resolve_dictionary("DICT_6X6_250", None).unwrap_err();
        assert!(matches!(err, DictionaryError::NotEmbedded { ref name } if name == "DICT_6X6_250"));
    }

    #[test]
    fn json_file_supplies_a_missing_tier() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("DICT_4X4_1000_CODES.json");
        let codes: Vec<u64> = (0..300u64).collect();
        Dictionary::new("DICT_4X4_1000", 4, 0, codes)
            .expect("dict")
            .write_json(&path)
            .expect("write");

        let dict = resolve_dictionary("DICT_4X4_250", Some(&path)).expect("resolve");
        assert_eq!(dict.name, "DICT_4X4_250");
        assert_eq!(dict.len(), 250);
        assert_eq!(dict.max_correction_bits, 1);

        let err = resolve_dictionary("DICT_4X4_1000", Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            DictionaryError::NotEnoughCodes {
                needed: 1000,
                available: 300,
                ..
            }
        ));

        let err = resolve_dictionary("DICT_5X5_50", Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            DictionaryError::MarkerSizeMismatch {
                expected: 5,
                found: 4,
                ..
            }
        ));
    }
}
