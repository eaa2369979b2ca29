//! Grid board specification, layout and rendering.

use std::fs;
use std::path::Path;

use aruco_gen_core::{GrayImage, ImageError};
use aruco_gen_dict::Dictionary;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::marker::{render_marker, MarkerError};
use crate::PrintIoError;

fn default_px_per_unit() -> f32 {
    100.0
}

fn default_border_bits() -> u32 {
    1
}

/// Static grid board specification.
///
/// Lengths are in board units (centimetres in typical use); `px_per_unit`
/// converts them to pixels when rendering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridBoardSpec {
    /// Number of markers along x (columns).
    pub markers_x: u32,
    /// Number of markers along y (rows).
    pub markers_y: u32,
    pub marker_length: f32,
    pub marker_separation: f32,
    #[serde(default)]
    pub margins: f32,
    #[serde(default = "default_border_bits")]
    pub border_bits: u32,
    /// Id of the top-left marker; the rest follow in row-major order.
    #[serde(default)]
    pub first_id: u32,
    #[serde(default = "default_px_per_unit")]
    pub px_per_unit: f32,
}

impl Default for GridBoardSpec {
    fn default() -> Self {
        Self {
            markers_x: 4,
            markers_y: 3,
            marker_length: 1.0,
            marker_separation: 1.0,
            margins: 1.0,
            border_bits: default_border_bits(),
            first_id: 0,
            px_per_unit: default_px_per_unit(),
        }
    }
}

impl GridBoardSpec {
    /// Printed board size in board units, margins included.
    pub fn print_size(&self) -> (f32, f32) {
        let pitch = self.marker_length + self.marker_separation;
        let span = |n: u32| n as f32 * pitch - self.marker_separation + 2.0 * self.margins;
        (span(self.markers_x), span(self.markers_y))
    }

    /// Rendered image size `(width, height)` in pixels.
    pub fn image_size(&self) -> (usize, usize) {
        let (w, h) = self.print_size();
        (
            (w * self.px_per_unit).round().max(0.0) as usize,
            (h * self.px_per_unit).round().max(0.0) as usize,
        )
    }

    /// Margin width in pixels.
    pub fn margin_px(&self) -> usize {
        (self.margins * self.px_per_unit).round().max(0.0) as usize
    }

    /// Total number of markers on the board.
    pub fn marker_count(&self) -> usize {
        self.markers_x as usize * self.markers_y as usize
    }

    /// Load a JSON spec from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PrintIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this spec to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PrintIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Board specification and rendering errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridBoardError {
    #[error("markers_x and markers_y must be >= 1")]
    InvalidSize,
    #[error("marker_length must be > 0")]
    InvalidMarkerLength,
    #[error("marker_separation must be >= 0")]
    InvalidSeparation,
    #[error("margins must be >= 0")]
    InvalidMargins,
    #[error("border_bits must be >= 1")]
    InvalidBorderBits,
    #[error("px_per_unit must be > 0")]
    InvalidPxPerUnit,
    #[error("board needs marker ids up to {needed}, dictionary has {available}")]
    NotEnoughDictionaryCodes { needed: usize, available: usize },
    #[error("image {width}x{height} leaves no room inside a {margin}px margin")]
    ImageTooSmall {
        width: usize,
        height: usize,
        margin: usize,
    },
    #[error(transparent)]
    Marker(#[from] MarkerError),
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Validated board bound to a dictionary.
#[derive(Clone, Debug)]
pub struct GridBoard {
    spec: GridBoardSpec,
    dictionary: Dictionary,
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

impl GridBoard {
    /// Validate and create a board from a spec.
    pub fn new(spec: GridBoardSpec, dictionary: Dictionary) -> Result<Self, GridBoardError> {
        if spec.markers_x == 0 || spec.markers_y == 0 {
            return Err(GridBoardError::InvalidSize);
        }
        if !positive(spec.marker_length) {
            return Err(GridBoardError::InvalidMarkerLength);
        }
        if !non_negative(spec.marker_separation) {
            return Err(GridBoardError::InvalidSeparation);
        }
        if !non_negative(spec.margins) {
            return Err(GridBoardError::InvalidMargins);
        }
        if spec.border_bits == 0 {
            return Err(GridBoardError::InvalidBorderBits);
        }
        if !positive(spec.px_per_unit) {
            return Err(GridBoardError::InvalidPxPerUnit);
        }

        let needed = spec.first_id as usize + spec.marker_count();
        let available = dictionary.len();
        if available < needed {
            return Err(GridBoardError::NotEnoughDictionaryCodes { needed, available });
        }

        let (width, height) = spec.image_size();
        GrayImage::pixel_count(width, height)?;

        Ok(Self { spec, dictionary })
    }

    #[inline]
    pub fn spec(&self) -> GridBoardSpec {
        self.spec
    }

    #[inline]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    #[inline]
    pub fn marker_count(&self) -> usize {
        self.spec.marker_count()
    }

    /// Marker ids in row-major order.
    pub fn marker_ids(&self) -> impl Iterator<Item = u32> + '_ {
        let first = self.spec.first_id;
        (0..self.marker_count() as u32).map(move |i| first + i)
    }

    /// Grid cell `[x, y]` of a marker id.
    pub fn marker_position(&self, id: u32) -> Option<[u32; 2]> {
        let idx = id.checked_sub(self.spec.first_id)?;
        if idx as usize >= self.marker_count() {
            return None;
        }
        Some([idx % self.spec.markers_x, idx / self.spec.markers_x])
    }

    /// Marker corners on the board plane (TL, TR, BR, BL), origin at the
    /// top-left marker corner, y pointing down.
    pub fn marker_corners(&self, id: u32) -> Option<[Point2<f32>; 4]> {
        let [x, y] = self.marker_position(id)?;
        let pitch = self.spec.marker_length + self.spec.marker_separation;
        let l = self.spec.marker_length;
        let x0 = x as f32 * pitch;
        let y0 = y as f32 * pitch;
        Some([
            Point2::new(x0, y0),
            Point2::new(x0 + l, y0),
            Point2::new(x0 + l, y0 + l),
            Point2::new(x0, y0 + l),
        ])
    }

    /// Render at the size implied by the spec (`px_per_unit`).
    pub fn render(&self) -> Result<GrayImage, GridBoardError> {
        let (width, height) = self.spec.image_size();
        self.render_with_size(width, height, self.spec.margin_px())
    }

    /// Render into a `width × height` canvas keeping `margin` white pixels
    /// on every side.
    ///
    /// The marker area is scaled to fit inside the margins preserving its
    /// aspect ratio and centred along the axis with slack.
    pub fn render_with_size(
        &self,
        width: usize,
        height: usize,
        margin: usize,
    ) -> Result<GrayImage, GridBoardError> {
        let too_small = GridBoardError::ImageTooSmall {
            width,
            height,
            margin,
        };
        let both_margins = margin.saturating_mul(2);
        if width <= both_margins || height <= both_margins {
            return Err(too_small);
        }
        let mut img = GrayImage::filled(width, height, 255)?;

        let mut inner_x = margin;
        let mut inner_y = margin;
        let mut inner_w = width - both_margins;
        let mut inner_h = height - both_margins;

        let pitch = self.spec.marker_length + self.spec.marker_separation;
        let size_x = self.spec.markers_x as f32 * pitch - self.spec.marker_separation;
        let size_y = self.spec.markers_y as f32 * pitch - self.spec.marker_separation;

        let x_reduction = size_x / inner_w as f32;
        let y_reduction = size_y / inner_h as f32;
        if x_reduction > y_reduction {
            let rows = (size_y / x_reduction) as usize;
            let slack = inner_h.saturating_sub(rows) / 2;
            inner_y += slack;
            inner_h -= 2 * slack;
        } else {
            let cols = (size_x / y_reduction) as usize;
            let slack = inner_w.saturating_sub(cols) / 2;
            inner_x += slack;
            inner_w -= 2 * slack;
        }

        let scale_x = inner_w as f32 / size_x;
        let scale_y = inner_h as f32 / size_y;
        let side = (self.spec.marker_length * scale_x.min(scale_y)).round() as usize;
        log::debug!(
            "board {}x{} px, marker area {}x{} at ({}, {}), marker side {} px",
            width,
            height,
            inner_w,
            inner_h,
            inner_x,
            inner_y,
            side
        );

        let border_bits = self.spec.border_bits as usize;
        for id in self.marker_ids() {
            let Some([tl, ..]) = self.marker_corners(id) else {
                continue;
            };
            let marker = render_marker(&self.dictionary, id, side, border_bits)?;
            let px = inner_x + (tl.x * scale_x).round() as usize;
            let py = inner_y + (tl.y * scale_y).round() as usize;
            img.blit(&marker.view(), px, py);
        }
        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::read_marker_code;
    use approx::assert_relative_eq;
    use aruco_gen_dict::builtins;

    fn spec() -> GridBoardSpec {
        GridBoardSpec {
            markers_x: 4,
            markers_y: 3,
            marker_length: 1.0,
            marker_separation: 1.0,
            margins: 1.0,
            border_bits: 1,
            first_id: 0,
            px_per_unit: 60.0,
        }
    }

    fn board(spec: GridBoardSpec) -> GridBoard {
        GridBoard::new(spec, builtins::DICT_4X4_50).expect("board")
    }

    #[test]
    fn print_size_follows_marker_pitch() {
        let (w, h) = spec().print_size();
        assert_relative_eq!(w, 9.0);
        assert_relative_eq!(h, 7.0);
        assert_eq!(spec().image_size(), (540, 420));
        assert_eq!(spec().margin_px(), 60);
    }

    #[test]
    fn ids_are_row_major() {
        let b = board(GridBoardSpec {
            first_id: 10,
            ..spec()
        });
        assert_eq!(b.marker_ids().collect::<Vec<_>>(), (10..22).collect::<Vec<_>>());
        assert_eq!(b.marker_position(10), Some([0, 0]));
        assert_eq!(b.marker_position(15), Some([1, 1]));
        assert_eq!(b.marker_position(9), None);
        assert_eq!(b.marker_position(22), None);

        let corners = b.marker_corners(15).expect("corners");
        assert_relative_eq!(corners[0].x, 2.0);
        assert_relative_eq!(corners[0].y, 2.0);
        assert_relative_eq!(corners[2].x, 3.0);
        assert_relative_eq!(corners[2].y, 3.0);
    }

    #[test]
    fn rejects_invalid_specs() {
        let dict = builtins::DICT_4X4_50;
        let cases = [
            (
                GridBoardSpec {
                    markers_x: 0,
                    ..spec()
                },
                GridBoardError::InvalidSize,
            ),
            (
                GridBoardSpec {
                    marker_length: 0.0,
                    ..spec()
                },
                GridBoardError::InvalidMarkerLength,
            ),
            (
                GridBoardSpec {
                    marker_separation: -1.0,
                    ..spec()
                },
                GridBoardError::InvalidSeparation,
            ),
            (
                GridBoardSpec {
                    margins: f32::NAN,
                    ..spec()
                },
                GridBoardError::InvalidMargins,
            ),
            (
                GridBoardSpec {
                    border_bits: 0,
                    ..spec()
                },
                GridBoardError::InvalidBorderBits,
            ),
            (
                GridBoardSpec {
                    px_per_unit: 0.0,
                    ..spec()
                },
                GridBoardError::InvalidPxPerUnit,
            ),
            (
                GridBoardSpec {
                    markers_x: 10,
                    markers_y: 6,
                    ..spec()
                },
                GridBoardError::NotEnoughDictionaryCodes {
                    needed: 60,
                    available: 50,
                },
            ),
        ];
        for (spec, expected) in cases {
            assert_eq!(GridBoard::new(spec, dict.clone()).unwrap_err(), expected);
        }
    }

    #[test]
    fn render_places_every_marker_inside_margins() {
        let b = board(spec());
        let img = b.render().expect("render");
        assert_eq!((img.width, img.height), (540, 420));

        // Margins stay white.
        for x in 0..img.width {
            assert_eq!(img.get(x, 0), Some(255));
            assert_eq!(img.get(x, img.height - 1), Some(255));
        }

        // Each marker occupies a 60px square at (60 + 120 * x, 60 + 120 * y).
        for id in b.marker_ids() {
            let [x, y] = b.marker_position(id).expect("position");
            let x0 = 60 + 120 * x as usize;
            let y0 = 60 + 120 * y as usize;
            let mut crop = GrayImage::filled(60, 60, 0).expect("crop");
            for cy in 0..60 {
                for cx in 0..60 {
                    crop.put(cx, cy, img.get(x0 + cx, y0 + cy).expect("px"));
                }
            }
            assert_eq!(
                read_marker_code(&crop, 4, 1),
                builtins::DICT_4X4_50.code(id),
                "id {id}"
            );
        }
    }

    #[test]
    fn render_centres_along_slack_axis() {
        let b = board(GridBoardSpec {
            markers_x: 1,
            markers_y: 1,
            marker_separation: 0.0,
            margins: 0.0,
            ..spec()
        });
        let img = b.render_with_size(300, 100, 0).expect("render");
        // 100px marker centred horizontally: columns 100..200.
        assert_eq!(img.get(99, 50), Some(255));
        assert_eq!(img.get(100, 0), Some(0));
        assert_eq!(img.get(199, 99), Some(0));
        assert_eq!(img.get(200, 50), Some(255));
    }

    #[test]
    fn render_rejects_margin_larger_than_image() {
        let b = board(spec());
        assert_eq!(
            b.render_with_size(100, 100, 50).unwrap_err(),
            GridBoardError::ImageTooSmall {
                width: 100,
                height: 100,
                margin: 50
            }
        );
    }

    #[test]
    fn oversized_boards_are_rejected_up_front() {
        let huge = GridBoardSpec {
            px_per_unit: 1e12,
            ..GridBoardSpec::default()
        };
        assert!(matches!(
            GridBoard::new(huge, builtins::DICT_4X4_50),
            Err(GridBoardError::Image(ImageError::TooLarge { .. }))
        ));

        let b = board(spec());
        assert!(matches!(
            b.render_with_size(usize::MAX, usize::MAX, 0),
            Err(GridBoardError::Image(ImageError::TooLarge { .. }))
        ));
        assert!(matches!(
            b.render_with_size(100, 100, usize::MAX),
            Err(GridBoardError::ImageTooSmall { .. })
        ));
    }

    #[test]
    fn spec_json_applies_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("board.json");
        std::fs::write(
            &path,
            r#"{ "markers_x": 5, "markers_y": 7, "marker_length": 4.0, "marker_separation": 1.0 }"#,
        )
        .expect("write");
        let loaded = GridBoardSpec::load_json(&path).expect("load");
        assert_eq!(loaded.border_bits, 1);
        assert_eq!(loaded.first_id, 0);
        assert_relative_eq!(loaded.margins, 0.0);
        assert_relative_eq!(loaded.px_per_unit, 100.0);

        loaded.write_json(&path).expect("write back");
        assert_eq!(GridBoardSpec::load_json(&path).expect("reload"), loaded);
    }
}
