//! Board description file (`<name>.yml`).
//!
//! Five `key: value` lines in a fixed order. Values are written bare, without
//! YAML quoting, so the file stays readable by simple line-based tools.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::GridBoardSpec;

const KEYS: [&str; 5] = [
    "dictionary",
    "marker_x",
    "marker_y",
    "marker_length",
    "marker_separation",
];

#[derive(thiserror::Error, Debug)]
pub enum ConfigFileError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected `key: value`")]
    Malformed { line: usize },
    #[error("line {line}: unknown key {key:?}")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: duplicate key {key:?}")]
    DuplicateKey { line: usize, key: String },
    #[error("missing key {0:?}")]
    MissingKey(&'static str),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Board parameters recorded alongside a generated board.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardConfigFile {
    pub dictionary: String,
    pub marker_x: u32,
    pub marker_y: u32,
    pub marker_length: f32,
    pub marker_separation: f32,
}

impl BoardConfigFile {
    pub fn from_spec(dictionary: impl Into<String>, spec: &GridBoardSpec) -> Self {
        Self {
            dictionary: dictionary.into(),
            marker_x: spec.markers_x,
            marker_y: spec.markers_y,
            marker_length: spec.marker_length,
            marker_separation: spec.marker_separation,
        }
    }

    /// Parse the five-key format; keys may appear in any order.
    pub fn parse(text: &str) -> Result<Self, ConfigFileError> {
        let mut values: [Option<&str>; 5] = [None; 5];
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (key, value) = trimmed
                .split_once(':')
                .ok_or(ConfigFileError::Malformed { line })?;
            let key = key.trim();
            let slot = KEYS
                .iter()
                .position(|k| *k == key)
                .ok_or_else(|| ConfigFileError::UnknownKey {
                    line,
                    key: key.to_string(),
                })?;
            if values[slot].replace(value.trim()).is_some() {
                return Err(ConfigFileError::DuplicateKey {
                    line,
                    key: key.to_string(),
                });
            }
        }

        let get = |slot: usize| values[slot].ok_or(ConfigFileError::MissingKey(KEYS[slot]));
        fn num<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigFileError> {
            value.parse().map_err(|_| ConfigFileError::InvalidValue {
                key,
                value: value.to_string(),
            })
        }

        Ok(Self {
            dictionary: get(0)?.to_string(),
            marker_x: num(KEYS[1], get(1)?)?,
            marker_y: num(KEYS[2], get(2)?)?,
            marker_length: num(KEYS[3], get(3)?)?,
            marker_separation: num(KEYS[4], get(4)?)?,
        })
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ConfigFileError> {
        fs::write(path, self.to_string())?;
        Ok(())
    }
}

impl fmt::Display for BoardConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", KEYS[0], self.dictionary)?;
        writeln!(f, "{}: {}", KEYS[1], self.marker_x)?;
        writeln!(f, "{}: {}", KEYS[2], self.marker_y)?;
        writeln!(f, "{}: {}", KEYS[3], self.marker_length)?;
        writeln!(f, "{}: {}", KEYS[4], self.marker_separation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BoardConfigFile {
        BoardConfigFile {
            dictionary: "DICT_4X4_50".to_string(),
            marker_x: 4,
            marker_y: 3,
            marker_length: 1.0,
            marker_separation: 0.5,
        }
    }

    #[test]
    fn writes_five_keys_in_order() {
        let text = sample().to_string();
        let keys: Vec<&str> = text
            .lines()
            .map(|l| l.split_once(':').expect("key").0)
            .collect();
        assert_eq!(keys, KEYS);
        assert_eq!(
            text,
            "dictionary: DICT_4X4_50\nmarker_x: 4\nmarker_y: 3\nmarker_length: 1\nmarker_separation: 0.5\n"
        );
    }

    #[test]
    fn parse_accepts_any_key_order() {
        let text = "marker_y: 3\nmarker_x: 4\n# comment\ndictionary: DICT_4X4_50\n\nmarker_separation: 0.5\nmarker_length: 1\n";
        assert_eq!(BoardConfigFile::parse(text).expect("parse"), sample());
    }

    #[test]
    fn parse_rejects_bad_files() {
        assert!(matches!(
            BoardConfigFile::parse("dictionary: D\nmarker_x: 1\n"),
            Err(ConfigFileError::MissingKey("marker_y"))
        ));
        assert!(matches!(
            BoardConfigFile::parse("colour: red\n"),
            Err(ConfigFileError::UnknownKey { line: 1, .. })
        ));
        assert!(matches!(
            BoardConfigFile::parse("marker_x: 1\nmarker_x: 2\n"),
            Err(ConfigFileError::DuplicateKey { line: 2, .. })
        ));
        assert!(matches!(
            BoardConfigFile::parse("no separator\n"),
            Err(ConfigFileError::Malformed { line: 1 })
        ));
        let text = sample().to_string().replace("marker_x: 4", "marker_x: four");
        assert!(matches!(
            BoardConfigFile::parse(&text),
            Err(ConfigFileError::InvalidValue {
                key: "marker_x",
                ..
            })
        ));
    }

    #[test]
    fn file_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("board.yml");
        sample().write(&path).expect("write");
        assert_eq!(BoardConfigFile::read(&path).expect("read"), sample());
    }
}
