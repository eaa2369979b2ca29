//! Dictionary metadata and packed marker codes.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::DictionaryError;

/// Largest marker side whose inner bits still fit in a `u64`.
const MAX_MARKER_SIZE: usize = 8;

/// An ArUco-style dictionary.
///
/// Built-in dictionaries borrow `'static` tables; dictionaries loaded from a
/// JSON file own their codes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    /// Dictionary name, e.g. `DICT_4X4_50`.
    pub name: Cow<'static, str>,
    /// Marker side length (number of inner bits per side).
    pub marker_size: usize,
    /// Maximum error-correcting Hamming distance supported by the dictionary.
    pub max_correction_bits: u8,
    /// One `u64` per marker id, encoding the inner `marker_size × marker_size` bits.
    ///
    /// Bit `y * marker_size + x` is the cell at column `x`, row `y`, and a set
    /// bit is a **white** cell.
    pub codes: Cow<'static, [u64]>,
}

impl Dictionary {
    /// Wrap a static code table. Used by the generated built-ins.
    pub const fn from_static(
        name: &'static str,
        marker_size: usize,
        max_correction_bits: u8,
        codes: &'static [u64],
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            marker_size,
            max_correction_bits,
            codes: Cow::Borrowed(codes),
        }
    }

    /// Build and validate a dictionary from owned codes.
    pub fn new(
        name: impl Into<String>,
        marker_size: usize,
        max_correction_bits: u8,
        codes: Vec<u64>,
    ) -> Result<Self, DictionaryError> {
        let dict = Self {
            name: Cow::Owned(name.into()),
            marker_size,
            max_correction_bits,
            codes: Cow::Owned(codes),
        };
        dict.validate()?;
        Ok(dict)
    }

    /// Check marker size, emptiness and that every code fits the marker area.
    pub fn validate(&self) -> Result<(), DictionaryError> {
        if self.marker_size == 0 || self.marker_size > MAX_MARKER_SIZE {
            return Err(DictionaryError::MarkerSizeOutOfRange(self.marker_size));
        }
        if self.codes.is_empty() {
            return Err(DictionaryError::Empty);
        }
        let bits = self.bit_count();
        if bits < 64 {
            if let Some(id) = self.codes.iter().position(|&c| c >> bits != 0) {
                return Err(DictionaryError::CodeOutOfRange {
                    id,
                    marker_size: self.marker_size,
                });
            }
        }
        Ok(())
    }

    /// Total number of inner bits per marker.
    #[inline]
    pub fn bit_count(&self) -> usize {
        self.marker_size * self.marker_size
    }

    /// Number of markers in the dictionary.
    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Packed code for `id`.
    #[inline]
    pub fn code(&self, id: u32) -> Option<u64> {
        self.codes.get(id as usize).copied()
    }

    /// Whether inner cell `(x, y)` of marker `id` is white.
    pub fn is_white(&self, id: u32, x: usize, y: usize) -> Option<bool> {
        if x >= self.marker_size || y >= self.marker_size {
            return None;
        }
        let code = self.code(id)?;
        Some((code >> (y * self.marker_size + x)) & 1 == 1)
    }

    /// Keep only the first `count` codes.
    ///
    /// Predefined dictionaries of the same marker size share one table, so the
    /// smaller tiers are prefixes of the largest one.
    pub fn truncated(mut self, count: usize) -> Self {
        if count < self.codes.len() {
            self.codes = match self.codes {
                Cow::Borrowed(codes) => Cow::Borrowed(&codes[..count]),
                Cow::Owned(mut codes) => {
                    codes.truncate(count);
                    Cow::Owned(codes)
                }
            };
        }
        self
    }

    /// Rename the dictionary, e.g. after truncating a larger table.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Cow::Owned(name.into());
        self
    }

    /// Load and validate a dictionary from a JSON code table.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let raw = fs::read_to_string(path)?;
        let dict: Self = serde_json::from_str(&raw)?;
        dict.validate()?;
        Ok(dict)
    }

    /// Write this dictionary to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DictionaryError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
