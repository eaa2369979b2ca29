//! Embedded built-in dictionaries.
//!
//! The OpenCV tables live in `aruco-gen-dict/data/*_CODES.json`;
//! `DICT_ARUCO_ORIGINAL` is generated from its row words at build time.

#![allow(clippy::unreadable_literal, non_upper_case_globals)]

use crate::Dictionary;

include!(concat!(env!("OUT_DIR"), "/builtins.rs"));
