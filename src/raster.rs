use crate::{DecodeError, DecodeResult};

/// A packed ARGB pixel with full opacity and the given colour channels.
#[inline]
pub const fn argb(alpha: u8, red: u8, green: u8, blue: u8) -> u32 {
    (alpha as u32) << 24 | (red as u32) << 16 | (green as u32) << 8 | blue as u32
}

/// Split a packed ARGB pixel into `[alpha, red, green, blue]`.
#[inline]
pub const fn channels(pixel: u32) -> [u8; 4] {
    pixel.to_be_bytes()
}

/// The destination of a decode: `width * height` packed ARGB pixels in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Raster {
    /// A fully transparent black raster.
    pub fn new(width: u32, height: u32) -> Raster {
        Raster {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap existing pixels. Returns `None` if `pixels` does not hold exactly
    /// `width * height` values.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Option<Raster> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Raster {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Write one pixel, refusing coordinates outside of the raster.
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: u32) -> DecodeResult<()> {
        if x >= self.width || y >= self.height {
            return Err(DecodeError::BoundsViolation {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let index = self.index(x, y);
        self.pixels[index] = pixel;
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        // chunks_exact panics on a zero chunk size.
        self.pixels.chunks_exact(self.width.max(1) as usize)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.pixels
    }

    pub fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_writes() {
        let mut raster = Raster::new(2, 3);
        raster.put_pixel(1, 2, 0xFF00FF00).unwrap();
        assert_eq!(raster.pixel(1, 2), Some(0xFF00FF00));
        assert_eq!(raster.as_slice()[5], 0xFF00FF00);

        assert!(matches!(
            raster.put_pixel(2, 0, 0),
            Err(DecodeError::BoundsViolation { x: 2, y: 0, .. })
        ));
        assert!(raster.put_pixel(0, 3, 0).is_err());
        assert_eq!(raster.pixel(0, 3), None);
    }

    #[test]
    fn packing() {
        assert_eq!(argb(0xFF, 0x12, 0x34, 0x56), 0xFF123456);
        assert_eq!(channels(0x80FF0001), [0x80, 0xFF, 0x00, 0x01]);
        assert!(Raster::from_pixels(2, 2, vec![0; 3]).is_none());
        assert_eq!(Raster::new(3, 2).rows().count(), 2);
    }
}
