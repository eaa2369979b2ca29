/// Largest raster, in pixels, this crate will allocate (256 MiB of luma).
pub const MAX_PIXELS: usize = 1 << 28;

/// Errors raised when constructing a raster.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("buffer length {len} does not match {width}x{height}")]
    BufferSize {
        width: usize,
        height: usize,
        len: usize,
    },
    #[error("image {width}x{height} exceeds the limit of {MAX_PIXELS} pixels")]
    TooLarge { width: usize, height: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl GrayImageView<'_> {
    /// Pixel at `(x, y)`, or `None` outside the image.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }
}

/// Owned 8-bit grayscale raster, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Pixel count of a `width × height` raster, bounded by [`MAX_PIXELS`].
    pub fn pixel_count(width: usize, height: usize) -> Result<usize, ImageError> {
        width
            .checked_mul(height)
            .filter(|&n| n <= MAX_PIXELS)
            .ok_or(ImageError::TooLarge { width, height })
    }

    /// Image of the given size with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Result<Self, ImageError> {
        let len = Self::pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Wrap an existing row-major buffer.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(ImageError::BufferSize {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.view().get(x, y)
    }

    /// Set a pixel; writes outside the image are ignored.
    #[inline]
    pub fn put(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Copy `src` with its top-left corner at `(x0, y0)`, clipped to the image.
    pub fn blit(&mut self, src: &GrayImageView<'_>, x0: usize, y0: usize) {
        if x0 >= self.width || y0 >= self.height {
            return;
        }
        let w = src.width.min(self.width - x0);
        let h = src.height.min(self.height - y0);
        for y in 0..h {
            let s = y * src.width;
            let d = (y0 + y) * self.width + x0;
            self.data[d..d + w].copy_from_slice(&src.data[s..s + w]);
        }
    }

    /// Nearest-neighbour resize: destination pixel `d` samples source pixel
    /// `floor(d * src / dst)` on each axis.
    pub fn resize_nearest(&self, width: usize, height: usize) -> Result<GrayImage, ImageError> {
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        let mut out = GrayImage::filled(width, height, 0)?;
        if self.width == 0 || self.height == 0 {
            return Ok(out);
        }
        let xs: Vec<usize> = (0..width).map(|x| x * self.width / width).collect();
        for y in 0..height {
            let sy = y * self.height / height;
            let src_row = &self.data[sy * self.width..(sy + 1) * self.width];
            let dst_row = &mut out.data[y * width..(y + 1) * width];
            for (d, &sx) in dst_row.iter_mut().zip(&xs) {
                *d = src_row[sx];
            }
        }
        Ok(out)
    }
}
