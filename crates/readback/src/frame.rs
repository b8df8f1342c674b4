use settings::constants::readback::{BYTES_PER_PIXEL, MAX_DIMENSION};
use thiserror::Error;

/// Channel order of a presented frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    #[default]
    Bgra,
    Rgba,
}

/// A frame as the renderer produced it. Rows are `stride` bytes apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("frame {width}x{height} exceeds the {max} pixel limit")]
    TooLarge { width: u32, height: u32, max: u32 },
    #[error("stride {stride} is shorter than a row of {row} bytes")]
    ShortStride { stride: usize, row: usize },
    #[error("frame data holds {actual} bytes, needs {needed}")]
    Truncated { actual: usize, needed: usize },
}

impl Frame {
    /// A tightly packed frame.
    pub fn packed(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            stride: width as usize * BYTES_PER_PIXEL as usize,
            format,
            data,
        }
    }

    fn row_len(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL as usize
    }

    pub fn validate(&self) -> Result<(), FrameError> {
        let (width, height) = (self.width, self.height);
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(FrameError::TooLarge {
                width,
                height,
                max: MAX_DIMENSION,
            });
        }
        let row = self.row_len();
        if self.stride < row {
            return Err(FrameError::ShortStride {
                stride: self.stride,
                row,
            });
        }
        // The last row need not be padded out to the stride.
        let needed = self.stride * (height as usize - 1) + row;
        if self.data.len() < needed {
            return Err(FrameError::Truncated {
                actual: self.data.len(),
                needed,
            });
        }
        Ok(())
    }

    /// Copy into a packed BGRA buffer.
    pub fn to_buffer(&self) -> Result<FrameBuffer, FrameError> {
        self.validate()?;
        let row = self.row_len();
        let pitch = FrameBuffer::pitch_for(self.width);
        let mut pixels = vec![0u8; pitch as usize * self.height as usize].into_boxed_slice();

        for y in 0..self.height as usize {
            let src = &self.data[y * self.stride..y * self.stride + row];
            let dst = &mut pixels[y * pitch as usize..y * pitch as usize + row];
            match self.format {
                PixelFormat::Bgra => dst.copy_from_slice(src),
                PixelFormat::Rgba => {
                    for (out, px) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                        out.copy_from_slice(&[px[2], px[1], px[0], px[3]]);
                    }
                }
            }
        }

        Ok(FrameBuffer {
            pixels: Some(pixels),
            width: self.width,
            height: self.height,
            pitch,
        })
    }
}

/// An owned, packed BGRA copy of a frame.
///
/// `pixels` is `None` exactly when width, height and pitch are all zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameBuffer {
    pixels: Option<Box<[u8]>>,
    width: u32,
    height: u32,
    pitch: u32,
}

impl FrameBuffer {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Row length for `width` pixels, rounded up to a multiple of 4. Zero
    /// when it would not fit in a `u32`.
    pub fn pitch_for(width: u32) -> u32 {
        width
            .checked_mul(BYTES_PER_PIXEL)
            .and_then(|row| row.checked_next_multiple_of(4))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_none()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    pub fn pixels(&self) -> Option<&[u8]> {
        self.pixels.as_deref()
    }

    /// BGRA bytes of the pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.pitch as usize + x as usize * 4;
        let px = self.pixels.as_ref()?.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Split into pixels and geometry, for callers that manage the
    /// allocation themselves.
    pub fn into_raw_parts(self) -> (Option<Box<[u8]>>, u32, u32, u32) {
        (self.pixels, self.width, self.height, self.pitch)
    }

    /// Reassemble a buffer from [`Self::into_raw_parts`].
    pub fn from_raw_parts(pixels: Option<Box<[u8]>>, width: u32, height: u32, pitch: u32) -> Self {
        match pixels {
            Some(pixels) => Self {
                pixels: Some(pixels),
                width,
                height,
                pitch,
            },
            None => Self::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn solid(width: u32, height: u32, stride: usize, format: PixelFormat, px: [u8; 4]) -> Frame {
        let mut data = vec![0u8; stride * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize {
                data[y * stride + x * 4..y * stride + x * 4 + 4].copy_from_slice(&px);
            }
        }
        Frame {
            width,
            height,
            stride,
            format,
            data,
        }
    }

    #[test]
    fn empty_buffer_is_all_zero() {
        let buffer = FrameBuffer::empty();
        assert!(buffer.is_empty());
        assert_eq!(buffer.into_raw_parts(), (None, 0, 0, 0));
    }

    #[test]
    fn bgra_copies_verbatim() {
        let frame = solid(3, 2, 12, PixelFormat::Bgra, [1, 2, 3, 4]);
        let buffer = frame.to_buffer().unwrap();
        assert_eq!(buffer.pitch(), 12);
        assert_eq!(buffer.pixel(2, 1), Some([1, 2, 3, 4]));
    }

    #[test]
    fn rgba_is_swizzled() {
        let frame = solid(2, 2, 8, PixelFormat::Rgba, [10, 20, 30, 255]);
        let buffer = frame.to_buffer().unwrap();
        assert_eq!(buffer.pixel(0, 0), Some([30, 20, 10, 255]));
    }

    #[test]
    fn padded_stride_is_repacked() {
        let frame = solid(2, 3, 64, PixelFormat::Bgra, [9, 9, 9, 9]);
        let buffer = frame.to_buffer().unwrap();
        assert_eq!(buffer.pitch(), 8);
        assert_eq!(buffer.pixels().map(<[u8]>::len), Some(24));
        assert_eq!(buffer.pixel(1, 2), Some([9, 9, 9, 9]));
        assert_eq!(buffer.pixel(2, 0), None);
    }

    #[test]
    fn last_row_may_be_unpadded() {
        let mut frame = solid(1, 2, 16, PixelFormat::Bgra, [1, 1, 1, 1]);
        frame.data.truncate(16 + 4);
        assert!(frame.to_buffer().is_ok());
    }

    #[test_case(0, 4, 0, 0 ; "zero width")]
    #[test_case(4, 0, 16, 0 ; "zero height")]
    #[test_case(4, 4, 8, 64 ; "short stride")]
    #[test_case(4, 4, 16, 10 ; "truncated data")]
    #[test_case(MAX_DIMENSION + 1, 1, (MAX_DIMENSION as usize + 1) * 4, 0 ; "too wide")]
    fn invalid_frames(width: u32, height: u32, stride: usize, len: usize) {
        let frame = Frame {
            width,
            height,
            stride,
            format: PixelFormat::Bgra,
            data: vec![0; len],
        };
        assert!(frame.to_buffer().is_err());
    }

    proptest! {
        #[test]
        fn prop_pitch_is_aligned_and_covers_row(
            width in 1u32..256,
            height in 1u32..16,
            pad in 0usize..16,
            rgba in any::<bool>(),
        ) {
            let format = if rgba { PixelFormat::Rgba } else { PixelFormat::Bgra };
            let stride = width as usize * 4 + pad;
            let buffer = solid(width, height, stride, format, [1, 2, 3, 4]).to_buffer().unwrap();
            prop_assert_eq!(buffer.pitch() % 4, 0);
            prop_assert!(buffer.pitch() >= width * 4);
            prop_assert_eq!(
                buffer.pixels().map(<[u8]>::len),
                Some(buffer.pitch() as usize * height as usize)
            );
        }
    }
}
