//! Single-marker rasterization.

use aruco_gen_core::{GrayImage, ImageError};
use aruco_gen_dict::Dictionary;

const BLACK: u8 = 0;
const WHITE: u8 = 255;

/// Marker rendering errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("marker id {id} is out of range for {dictionary} ({len} markers)")]
    IdOutOfRange {
        id: u32,
        dictionary: String,
        len: usize,
    },
    #[error("border_bits must be >= 1")]
    InvalidBorderBits,
    #[error("marker side {side}px is smaller than its {min} cells")]
    SideTooSmall { side: usize, min: usize },
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// One pixel per cell: `(n + 2 * border_bits)²` with a black border.
pub fn tiny_marker(
    dict: &Dictionary,
    id: u32,
    border_bits: usize,
) -> Result<GrayImage, MarkerError> {
    if border_bits == 0 {
        return Err(MarkerError::InvalidBorderBits);
    }
    if dict.code(id).is_none() {
        return Err(MarkerError::IdOutOfRange {
            id,
            dictionary: dict.name.to_string(),
            len: dict.len(),
        });
    }

    let n = dict.marker_size;
    let cells = border_bits
        .checked_mul(2)
        .and_then(|b| b.checked_add(n))
        .ok_or(ImageError::TooLarge {
            width: usize::MAX,
            height: usize::MAX,
        })?;
    let mut tiny = GrayImage::filled(cells, cells, BLACK)?;
    for y in 0..n {
        for x in 0..n {
            if dict.is_white(id, x, y) == Some(true) {
                tiny.put(x + border_bits, y + border_bits, WHITE);
            }
        }
    }
    Ok(tiny)
}

/// Render marker `id` as a `side × side` image.
pub fn render_marker(
    dict: &Dictionary,
    id: u32,
    side: usize,
    border_bits: usize,
) -> Result<GrayImage, MarkerError> {
    let tiny = tiny_marker(dict, id, border_bits)?;
    if side < tiny.width {
        return Err(MarkerError::SideTooSmall {
            side,
            min: tiny.width,
        });
    }
    Ok(tiny.resize_nearest(side, side)?)
}

/// Recover the packed code from a rendered, axis-aligned marker image.
///
/// Each cell is sampled at the first pixel the nearest-neighbour upscale
/// assigns to it, `ceil(c * side / cells)`, so any side `>= cells` decodes.
///
/// Returns `None` when the image is not square or a border cell is not dark.
pub fn read_marker_code(img: &GrayImage, marker_size: usize, border_bits: usize) -> Option<u64> {
    if img.width != img.height || marker_size == 0 || marker_size > 8 {
        return None;
    }
    let cells = marker_size + 2 * border_bits;
    if img.width < cells {
        return None;
    }
    let side = img.width;
    let first_px = |c: usize| (c * side).div_ceil(cells);
    let dark = |cx: usize, cy: usize| img.get(first_px(cx), first_px(cy)).map(|v| v < 128);

    for cy in 0..cells {
        for cx in 0..cells {
            let on_border = cx < border_bits
                || cy < border_bits
                || cx >= cells - border_bits
                || cy >= cells - border_bits;
            if on_border && !dark(cx, cy)? {
                return None;
            }
        }
    }

    let mut code = 0u64;
    for y in 0..marker_size {
        for x in 0..marker_size {
            if !dark(x + border_bits, y + border_bits)? {
                code |= 1 << (y * marker_size + x);
            }
        }
    }
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aruco_gen_dict::builtins;

    #[test]
    fn tiny_marker_has_black_border_and_code_cells() {
        let dict = builtins::DICT_4X4_50;
        let tiny = tiny_marker(&dict, 0, 1).expect("tiny");
        assert_eq!((tiny.width, tiny.height), (6, 6));
        for i in 0..6 {
            assert_eq!(tiny.get(i, 0), Some(BLACK));
            assert_eq!(tiny.get(i, 5), Some(BLACK));
            assert_eq!(tiny.get(0, i), Some(BLACK));
            assert_eq!(tiny.get(5, i), Some(BLACK));
        }
        // First inner row of id 0 is 1011 (white = 1).
        let row: Vec<u8> = (1..5).map(|x| tiny.get(x, 1).expect("px")).collect();
        assert_eq!(row, vec![WHITE, BLACK, WHITE, WHITE]);
    }

    #[test]
    fn render_is_deterministic_and_sized() {
        let dict = builtins::DICT_4X4_50;
        let a = render_marker(&dict, 3, 200, 1).expect("render");
        let b = render_marker(&dict, 3, 200, 1).expect("render");
        assert_eq!((a.width, a.height), (200, 200));
        assert_eq!(a, b);
    }

    #[test]
    fn wider_border_grows_cell_grid() {
        let dict = builtins::DICT_4X4_50;
        let tiny = tiny_marker(&dict, 0, 2).expect("tiny");
        assert_eq!(tiny.width, 8);
        assert_eq!(tiny.get(1, 1), Some(BLACK));
        assert_eq!(tiny.get(2, 2), Some(WHITE));
    }

    #[test]
    fn rejects_bad_inputs() {
        let dict = builtins::DICT_4X4_50;
        assert!(matches!(
            render_marker(&dict, 50, 200, 1),
            Err(MarkerError::IdOutOfRange { id: 50, len: 50, .. })
        ));
        assert_eq!(
            render_marker(&dict, 0, 5, 1),
            Err(MarkerError::SideTooSmall { side: 5, min: 6 })
        );
        assert_eq!(
            render_marker(&dict, 0, 100, 0),
            Err(MarkerError::InvalidBorderBits)
        );
    }

    #[test]
    fn rendered_code_reads_back() {
        let dict = builtins::DICT_ARUCO_ORIGINAL;
        for (id, side) in [(0u32, 7usize), (513, 100), (1023, 333)] {
            let img = render_marker(&dict, id, side, 1).expect("render");
            assert_eq!(read_marker_code(&img, 5, 1), dict.code(id), "id {id}");
        }
    }

    #[test]
    fn all_white_image_has_no_code() {
        let img = GrayImage::filled(60, 60, WHITE).expect("image");
        assert_eq!(read_marker_code(&img, 4, 1), None);
    }

    #[test]
    fn every_side_from_the_cell_count_up_reads_back() {
        let dict = builtins::DICT_4X4_50;
        for border_bits in 1..=3 {
            let cells = dict.marker_size + 2 * border_bits;
            for side in cells..=64 {
                for id in 0..dict.len() as u32 {
                    let img = render_marker(&dict, id, side, border_bits).expect("render");
                    assert_eq!(
                        read_marker_code(&img, 4, border_bits),
                        dict.code(id),
                        "id {id}, side {side}, border {border_bits}"
                    );
                }
            }
        }
    }

    #[test]
    fn small_five_bit_markers_read_back() {
        let dict = builtins::DICT_ARUCO_ORIGINAL;
        for border_bits in 1..=3 {
            let cells = 5 + 2 * border_bits;
            for side in cells..=64 {
                for id in (0..1024u32).step_by(37) {
                    let img = render_marker(&dict, id, side, border_bits).expect("render");
                    assert_eq!(
                        read_marker_code(&img, 5, border_bits),
                        dict.code(id),
                        "id {id}, side {side}, border {border_bits}"
                    );
                }
            }
        }
    }

    #[test]
    fn huge_sizes_are_errors() {
        let dict = builtins::DICT_4X4_50;
        assert!(matches!(
            render_marker(&dict, 0, 1 << 20, 1),
            Err(MarkerError::Image(ImageError::TooLarge { .. }))
        ));
        assert!(matches!(
            tiny_marker(&dict, 0, usize::MAX / 2),
            Err(MarkerError::Image(ImageError::TooLarge { .. }))
        ));
    }
}
