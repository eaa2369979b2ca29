//! File-level generation: render, write, then read back and check.

use std::path::{Path, PathBuf};

use aruco_gen_dict::{Dictionary, Matcher};

use crate::marker::{read_marker_code, render_marker, MarkerError};
use crate::{read_png, write_png, BoardConfigFile, ConfigFileError, GridBoard, GridBoardError};
use crate::{ImageInfo, PrintIoError};

/// File name used for rendered grid boards.
pub const BOARD_FILE_NAME: &str = "GridBoard.png";

#[derive(thiserror::Error, Debug)]
pub enum PrintError {
    #[error(transparent)]
    Marker(#[from] MarkerError),
    #[error(transparent)]
    Board(#[from] GridBoardError),
    #[error(transparent)]
    Io(#[from] PrintIoError),
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),
    #[error("requested {requested} markers, {dictionary} has {available}")]
    TooManyMarkers {
        requested: usize,
        dictionary: String,
        available: usize,
    },
    #[error("{path}: written marker does not read back as id {id}")]
    ReadBackMismatch { path: PathBuf, id: u32 },
}

/// A written image and its shape as read back from disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedImage {
    pub path: PathBuf,
    pub info: ImageInfo,
}

/// `<dir>/marker_<id>.png`
pub fn marker_file_path(dir: &Path, id: u32) -> PathBuf {
    dir.join(format!("marker_{id}.png"))
}

/// `<dir>/GridBoard.png`
pub fn board_file_path(dir: &Path) -> PathBuf {
    dir.join(BOARD_FILE_NAME)
}

/// Writes single markers of one dictionary at a fixed size.
///
/// Every written file is decoded again and checked to carry the requested
/// id before it is reported.
#[derive(Clone, Debug)]
pub struct MarkerWriter {
    dictionary: Dictionary,
    matcher: Matcher,
    side: usize,
    border_bits: usize,
    out_dir: PathBuf,
}

impl MarkerWriter {
    pub fn new(
        dictionary: Dictionary,
        side: usize,
        border_bits: usize,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        let matcher = Matcher::new(&dictionary, 0);
        Self {
            dictionary,
            matcher,
            side,
            border_bits,
            out_dir: out_dir.into(),
        }
    }

    /// Render marker `id`, write `marker_<id>.png` and read it back.
    pub fn write(&self, id: u32) -> Result<GeneratedImage, PrintError> {
        let img = render_marker(&self.dictionary, id, self.side, self.border_bits)?;
        let path = marker_file_path(&self.out_dir, id);
        write_png(&path, &img)?;
        log::debug!("wrote {}", path.display());

        let (back, info) = read_png(&path)?;
        let matched = read_marker_code(&back, self.dictionary.marker_size, self.border_bits)
            .and_then(|code| self.matcher.match_code(code));
        match matched {
            Some(m) if m.id == id && m.rotation == 0 => Ok(GeneratedImage { path, info }),
            _ => Err(PrintError::ReadBackMismatch { path, id }),
        }
    }

    /// Write markers `0..count`.
    pub fn write_first(&self, count: usize) -> Result<Vec<GeneratedImage>, PrintError> {
        if count > self.dictionary.len() {
            return Err(PrintError::TooManyMarkers {
                requested: count,
                dictionary: self.dictionary.name.to_string(),
                available: self.dictionary.len(),
            });
        }
        (0..count as u32).map(|id| self.write(id)).collect()
    }
}

/// Render a board, write `GridBoard.png` into `out_dir` and read it back.
pub fn write_board(board: &GridBoard, out_dir: &Path) -> Result<GeneratedImage, PrintError> {
    let spec = board.spec();
    let (w, h) = spec.print_size();
    log::info!(
        "board {}x{} markers of {}, print size {} x {} units",
        spec.markers_x,
        spec.markers_y,
        board.dictionary().name,
        w,
        h
    );
    let img = board.render()?;
    let path = board_file_path(out_dir);
    write_png(&path, &img)?;
    let (_, info) = read_png(&path)?;
    log::debug!("wrote {} {}", path.display(), info);
    Ok(GeneratedImage { path, info })
}

/// Write `<out_dir>/<name>.yml` and read it back.
pub fn write_board_config(
    config: &BoardConfigFile,
    out_dir: &Path,
    name: &str,
) -> Result<(PathBuf, BoardConfigFile), PrintError> {
    let path = out_dir.join(format!("{name}.yml"));
    config.write(&path)?;
    let back = BoardConfigFile::read(&path)?;
    Ok((path, back))
}
