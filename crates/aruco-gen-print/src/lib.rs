//! Printable ArUco targets: single markers, grid boards and their
//! description files.
//!
//! Rendering follows OpenCV's conventions so the output is interchangeable
//! with `cv::aruco::generateImageMarker` and `GridBoard::generateImage`:
//! black border of `border_bits` cells, white = set code bit, nearest-neighbour
//! upscaling, and boards fitted into the area inside the margins.

mod board;
mod config_file;
mod generate;
mod io;
mod marker;

pub use board::{GridBoard, GridBoardError, GridBoardSpec};
pub use config_file::{BoardConfigFile, ConfigFileError};
pub use generate::{
    board_file_path, marker_file_path, write_board, write_board_config, GeneratedImage,
    MarkerWriter, PrintError, BOARD_FILE_NAME,
};
pub use io::{read_png, write_png, ImageInfo, PrintIoError};
pub use marker::{read_marker_code, render_marker, tiny_marker, MarkerError};

pub use aruco_gen_core::GrayImage;
