use std::path::PathBuf;

use aruco_gen_print::{GridBoardSpec, PrintIoError};
use clap::{ArgAction, Parser};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "aruco-gen")]
#[command(about = "Generate ArUco markers and marker grid boards as PNG images")]
#[command(after_help = "Enjoy the program! :)")]
#[command(version)]
pub struct Cli {
    /// Dictionary name, e.g. DICT_4X4_50 (see --printdict).
    #[arg(short, long, default_value = "DICT_4X4_50")]
    pub dictionary: String,

    /// JSON code table for the chosen dictionary when it is not embedded.
    #[arg(long)]
    pub dictionary_file: Option<PathBuf>,

    /// Marker side in pixels (modes 1 and 2).
    #[arg(short, long, default_value_t = 200)]
    pub size: usize,

    /// Number of markers along x.
    #[arg(short = 'x', long = "x", default_value_t = 4)]
    pub x: u32,

    /// Number of markers along y.
    #[arg(short = 'y', long = "y", default_value_t = 3)]
    pub y: u32,

    /// Marker length in board units (centimetres when printing).
    #[arg(short, long, default_value_t = 1.0)]
    pub length: f32,

    /// Separation between markers in board units.
    #[arg(long, visible_alias = "sep", default_value_t = 1.0)]
    pub separation: f32,

    /// Board margins in board units.
    #[arg(long, visible_alias = "ma", default_value_t = 1.0)]
    pub margins: f32,

    /// Width of the black marker border, in cells.
    #[arg(long, visible_alias = "bits", default_value_t = 1)]
    pub borderbits: u32,

    /// Marker id for single-marker mode.
    #[arg(short, long, default_value_t = 0)]
    pub id: u32,

    /// Number of markers for bulk mode (ids 0..count).
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: usize,

    /// 1 = single marker, 2 = bulk markers, 3 = grid board + .yml, 4 = .yml only.
    #[arg(short, long, default_value_t = 3, allow_negative_numbers = true)]
    pub mode: i64,

    /// Print the dictionary names and exit.
    #[arg(short, long)]
    pub printdict: bool,

    /// Board pixels per board unit.
    #[arg(long, default_value_t = 100.0)]
    pub px_per_unit: f32,

    /// Base name of the board description file (<name>.yml).
    #[arg(long, default_value = "board")]
    pub name: String,

    /// Board spec JSON; replaces the board flags.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory receiving the generated files.
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON lines.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    pub log_json: bool,
}

/// Operation selected by `--mode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Single,
    Bulk,
    Board,
    ConfigFile,
}

impl Mode {
    pub fn from_flag(flag: i64) -> Option<Self> {
        match flag {
            1 => Some(Self::Single),
            2 => Some(Self::Bulk),
            3 => Some(Self::Board),
            4 => Some(Self::ConfigFile),
            _ => None,
        }
    }
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Board spec from `--config`, or from the individual board flags.
    pub fn board_spec(&self) -> Result<GridBoardSpec, PrintIoError> {
        if let Some(path) = &self.config {
            log::info!("loading board spec from {}", path.display());
            return GridBoardSpec::load_json(path);
        }
        Ok(GridBoardSpec {
            markers_x: self.x,
            markers_y: self.y,
            marker_length: self.length,
            marker_separation: self.separation,
            margins: self.margins,
            border_bits: self.borderbits,
            first_id: 0,
            px_per_unit: self.px_per_unit,
        })
    }
}
