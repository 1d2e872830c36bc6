// SPDX-License-Identifier: Apache-2.0

//! Freehand signature capture and PNG rendering.

use flate2::write::ZlibEncoder;
use flate2::{Compression, Crc};
use std::io::Write;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
const INK: u8 = 0;
const PAPER: u8 = 255;
const PEN_WIDTH: i64 = 2;

/// Largest canvas side in pixels; larger pads are clamped to it.
pub const MAX_PAD_SIDE: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Strokes recorded from pointer drags on a fixed-size canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SignaturePad {
    width: u32,
    height: u32,
    strokes: Vec<Vec<Point>>,
}

/// 8-bit grayscale raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl SignaturePad {
    /// Sides are clamped to `1..=MAX_PAD_SIDE`.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.clamp(1, MAX_PAD_SIDE),
            height: height.clamp(1, MAX_PAD_SIDE),
            strokes: Vec::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pointer down. Non-finite coordinates are ignored here and in `line_to`.
    pub fn begin_stroke(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.strokes.push(vec![Point { x, y }]);
        }
    }

    /// Pointer move while pressed. Starts a stroke if none is open.
    pub fn line_to(&mut self, x: f32, y: f32) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        match self.strokes.last_mut() {
            Some(stroke) => stroke.push(Point { x, y }),
            None => self.begin_stroke(x, y),
        }
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    #[must_use]
    pub fn strokes(&self) -> &[Vec<Point>] {
        &self.strokes
    }

    #[must_use]
    pub fn rasterize(&self) -> GrayImage {
        let mut image = GrayImage {
            width: self.width,
            height: self.height,
            pixels: vec![PAPER; self.width as usize * self.height as usize],
        };
        for stroke in &self.strokes {
            match stroke.as_slice() {
                [] => {}
                [only] => image.stamp(*only),
                points => {
                    for pair in points.windows(2) {
                        image.segment(pair[0], pair[1]);
                    }
                }
            }
        }
        image
    }

    /// PNG bytes of the rendered pad; empty when nothing was drawn.
    pub fn to_png(&self) -> std::io::Result<Vec<u8>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        encode_png(&self.rasterize())
    }
}

impl GrayImage {
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    #[must_use]
    pub fn ink_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| **p == INK).count()
    }

    /// Stamps along the part of the segment that can touch the canvas.
    fn segment(&mut self, from: Point, to: Point) {
        let margin = PEN_WIDTH as f64;
        let bounds = (
            -margin,
            -margin,
            f64::from(self.width) + margin,
            f64::from(self.height) + margin,
        );
        let Some(((x0, y0), (x1, y1))) = clip_segment(from, to, bounds) else {
            return;
        };
        let (dx, dy) = (x1 - x0, y1 - y0);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = f64::from(i) / f64::from(steps);
            self.stamp(Point {
                x: (x0 + dx * t) as f32,
                y: (y0 + dy * t) as f32,
            });
        }
    }

    fn stamp(&mut self, at: Point) {
        let cx = at.x.round() as i64;
        let cy = at.y.round() as i64;
        for oy in 0..PEN_WIDTH {
            for ox in 0..PEN_WIDTH {
                let (x, y) = (cx + ox, cy + oy);
                if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
                    continue;
                }
                let idx = y as usize * self.width as usize + x as usize;
                self.pixels[idx] = INK;
            }
        }
    }
}

type Endpoints = ((f64, f64), (f64, f64));

/// Liang-Barsky clipping of `from..to` against `(min_x, min_y, max_x, max_y)`.
fn clip_segment(from: Point, to: Point, bounds: (f64, f64, f64, f64)) -> Option<Endpoints> {
    let (min_x, min_y, max_x, max_y) = bounds;
    let (x0, y0) = (f64::from(from.x), f64::from(from.y));
    let (dx, dy) = (f64::from(to.x) - x0, f64::from(to.y) - y0);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, x0 - min_x),
        (dx, max_x - x0),
        (-dy, y0 - min_y),
        (dy, max_y - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((
        (x0 + t0 * dx, y0 + t0 * dy),
        (x0 + t1 * dx, y0 + t1 * dy),
    ))
}

fn encode_png(image: &GrayImage) -> std::io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(13);
    header.extend_from_slice(&image.width.to_be_bytes());
    header.extend_from_slice(&image.height.to_be_bytes());
    // bit depth 8, grayscale, deflate, adaptive filtering, no interlace
    header.extend_from_slice(&[8, 0, 0, 0, 0]);

    let row_len = image.width as usize;
    let mut raw = Vec::with_capacity((row_len + 1) * image.height as usize);
    for row in image.pixels.chunks(row_len.max(1)) {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    let data = encoder.finish()?;

    let mut out = Vec::with_capacity(PNG_MAGIC.len() + data.len() + 64);
    out.extend_from_slice(&PNG_MAGIC);
    write_chunk(&mut out, b"IHDR", &header);
    write_chunk(&mut out, b"IDAT", &data);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    let mut crc = Crc::new();
    crc.update(kind);
    crc.update(data);
    out.extend_from_slice(&crc.sum().to_be_bytes());
}
