use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Deserialize)]
struct DictFile {
    name: String,
    marker_size: usize,
    max_correction_bits: u8,
    codes: Vec<u64>,
}

/// Row words of the original ArUco library: a 5-bit Hamming-coded row per
/// two id bits, most significant bit in column 0, set bit = white.
const ARUCO_ORIGINAL_ROW_WORDS: [u64; 4] = [0x10, 0x17, 0x09, 0x0e];

fn aruco_original_codes() -> Vec<u64> {
    (0..1024u64)
        .map(|id| {
            let mut code = 0u64;
            for y in 0..5 {
                let word = ARUCO_ORIGINAL_ROW_WORDS[((id >> (2 * (4 - y))) & 3) as usize];
                for x in 0..5 {
                    if (word >> (4 - x)) & 1 == 1 {
                        code |= 1 << (y * 5 + x);
                    }
                }
            }
            code
        })
        .collect()
}

fn emit_dictionary(out: &mut String, dict: &DictFile) {
    let ident = dict.name.to_uppercase();
    let _ = writeln!(
        out,
        "pub const {ident}_CODES: [u64; {}] = [",
        dict.codes.len()
    );
    for chunk in dict.codes.chunks(8) {
        let row: Vec<String> = chunk.iter().map(|c| format!("0x{c:016x}")).collect();
        let _ = writeln!(out, "    {},", row.join(", "));
    }
    let _ = writeln!(out, "];");
    let _ = writeln!(
        out,
        "pub const {ident}: Dictionary = Dictionary::from_static({:?}, {}, {}, &{ident}_CODES);\n",
        dict.name, dict.marker_size, dict.max_correction_bits
    );
}

fn load_data_dir(dir: &Path) -> Vec<DictFile> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("read {}: {e}", dir.display()))
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with("_CODES.json"))
        })
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let raw = fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
            let dict: DictFile = serde_json::from_str(&raw)
                .unwrap_or_else(|e| panic!("parse {}: {e}", path.display()));
            let bits = dict.marker_size * dict.marker_size;
            assert!(
                (1..=64).contains(&bits),
                "{}: marker_size {} does not fit in u64",
                path.display(),
                dict.marker_size
            );
            if bits < 64 {
                assert!(
                    dict.codes.iter().all(|&c| c >> bits == 0),
                    "{}: code has bits outside the marker area",
                    path.display()
                );
            }
            dict
        })
        .collect()
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let data_dir = manifest_dir.join("data");
    println!("cargo:rerun-if-changed={}", data_dir.display());
    println!("cargo:rerun-if-changed=build.rs");

    let mut dicts = load_data_dir(&data_dir);
    dicts.push(DictFile {
        name: "DICT_ARUCO_ORIGINAL".to_string(),
        marker_size: 5,
        max_correction_bits: 0,
        codes: aruco_original_codes(),
    });

    let mut out = String::new();
    for dict in &dicts {
        emit_dictionary(&mut out, dict);
    }

    let _ = writeln!(out, "/// Names of every dictionary compiled into this crate.");
    let _ = writeln!(out, "pub const BUILTIN_DICTIONARY_NAMES: &[&str] = &[");
    for dict in &dicts {
        let _ = writeln!(out, "    {:?},", dict.name);
    }
    let _ = writeln!(out, "];\n");

    let _ = writeln!(out, "/// Look up an embedded dictionary by its exact name.");
    let _ = writeln!(
        out,
        "pub fn builtin_dictionary(name: &str) -> Option<Dictionary> {{"
    );
    let _ = writeln!(out, "    match name {{");
    for dict in &dicts {
        let _ = writeln!(
            out,
            "        {:?} => Some({}),",
            dict.name,
            dict.name.to_uppercase()
        );
    }
    let _ = writeln!(out, "        _ => None,");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");

    let out_path = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR")).join("builtins.rs");
    fs::write(&out_path, out).unwrap_or_else(|e| panic!("write {}: {e}", out_path.display()));
}
