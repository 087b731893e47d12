//! Frame type and pixel-format conversion — YUYV/GREY/Y16 to RGB24, downscaling.

/// A captured RGB24 camera frame.
///
/// Frames are ephemeral: each loop iteration owns exactly one and
/// replaces it on the next capture.
#[derive(Clone)]
pub struct Frame {
    /// Packed RGB pixel data (width * height * 3 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

impl Frame {
    /// Downscale by `factor` in (0, 1] using bilinear interpolation.
    ///
    /// A factor of 1.0 or above returns the frame unchanged.
    pub fn downscale(&self, factor: f32) -> Frame {
        if factor >= 1.0 {
            return self.clone();
        }
        let factor = factor.max(0.01);

        let src_w = self.width as usize;
        let src_h = self.height as usize;
        let new_w = ((src_w as f32 * factor).round() as usize).max(1);
        let new_h = ((src_h as f32 * factor).round() as usize).max(1);

        let inv_x = src_w as f32 / new_w as f32;
        let inv_y = src_h as f32 / new_h as f32;

        let mut data = vec![0u8; new_w * new_h * 3];
        for y in 0..new_h {
            let src_y = (y as f32 + 0.5) * inv_y - 0.5;
            let y0 = (src_y.floor() as i32).clamp(0, src_h as i32 - 1) as usize;
            let y1 = (y0 + 1).min(src_h - 1);
            let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

            for x in 0..new_w {
                let src_x = (x as f32 + 0.5) * inv_x - 0.5;
                let x0 = (src_x.floor() as i32).clamp(0, src_w as i32 - 1) as usize;
                let x1 = (x0 + 1).min(src_w - 1);
                let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

                for c in 0..3 {
                    let tl = self.data[(y0 * src_w + x0) * 3 + c] as f32;
                    let tr = self.data[(y0 * src_w + x1) * 3 + c] as f32;
                    let bl = self.data[(y1 * src_w + x0) * 3 + c] as f32;
                    let br = self.data[(y1 * src_w + x1) * 3 + c] as f32;

                    let val = tl * (1.0 - fx) * (1.0 - fy)
                        + tr * fx * (1.0 - fy)
                        + bl * (1.0 - fx) * fy
                        + br * fx * fy;

                    data[(y * new_w + x) * 3 + c] = val.round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        Frame {
            data,
            width: new_w as u32,
            height: new_h as u32,
            timestamp: self.timestamp,
            sequence: self.sequence,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid buffer length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Convert packed YUYV (4:2:2) to RGB24 using BT.601 coefficients.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]. Both pixels share
/// the chroma pair.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for chunk in yuyv[..expected].chunks_exact(4) {
        let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        rgb.extend_from_slice(&yuv_to_rgb_pixel(y0, u, v));
        rgb.extend_from_slice(&yuv_to_rgb_pixel(y1, u, v));
    }
    Ok(rgb)
}

/// Convert 8-bit grayscale to RGB24 by replicating the luma channel.
pub fn grey_to_rgb(grey: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height) as usize;
    if grey.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: grey.len(),
        });
    }

    let mut rgb = Vec::with_capacity(expected * 3);
    for &p in &grey[..expected] {
        rgb.extend_from_slice(&[p, p, p]);
    }
    Ok(rgb)
}

/// Convert 16-bit little-endian grayscale to RGB24, keeping the high byte.
pub fn y16_to_rgb(y16: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let pixels = (width * height) as usize;
    let expected = pixels * 2;
    if y16.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: y16.len(),
        });
    }

    let mut rgb = Vec::with_capacity(pixels * 3);
    for idx in 0..pixels {
        let low = y16[idx * 2] as u16;
        let high = y16[idx * 2 + 1] as u16;
        let p = ((high << 8 | low) >> 8) as u8;
        rgb.extend_from_slice(&[p, p, p]);
    }
    Ok(rgb)
}

/// BT.601 limited-range YUV to RGB for a single pixel.
fn yuv_to_rgb_pixel(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;

    let r = (298 * c + 409 * e + 128) >> 8;
    let g = (298 * c - 100 * d - 208 * e + 128) >> 8;
    let b = (298 * c + 516 * d + 128) >> 8;

    [
        r.clamp(0, 255) as u8,
        g.clamp(0, 255) as u8,
        b.clamp(0, 255) as u8,
    ]
}
