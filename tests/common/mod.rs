#![allow(dead_code)]

/// Hand-assembled 8-bit BMP with an arbitrary palette. `rows` are the
/// stored rows, padding included, in file order.
pub struct RawBmp {
    pub width: i32,
    pub height: i32,
    pub bit_count: u16,
    pub compression: u32,
    pub palette: Vec<[u8; 4]>,
    pub rows: Vec<u8>,
    pub file_size: u32,
    pub image_size: u32,
}

impl RawBmp {
    /// `pixels` is tightly packed; padding bytes are filled with `pad`.
    pub fn new(width: usize, height: usize, pixels: &[u8], pad: u8) -> Self {
        let stride = (width + 3) & !3;
        let mut rows = Vec::with_capacity(stride * height);
        for row in pixels.chunks_exact(width) {
            rows.extend_from_slice(row);
            rows.extend(std::iter::repeat_n(pad, stride - width));
        }
        // Reversed blue ramp, so a decoded palette is easy to tell apart
        // from the grayscale one written on output.
        let palette = (0..256).map(|i| [255 - i as u8, 0, i as u8, 7]).collect();
        Self {
            width: width as i32,
            height: height as i32,
            bit_count: 8,
            compression: 0,
            palette,
            rows,
            file_size: 0xDEAD,
            image_size: 0xBEEF,
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&self.file_size.to_le_bytes());
        out.extend_from_slice(&0x1111u16.to_le_bytes()); // reserved1
        out.extend_from_slice(&0x2222u16.to_le_bytes()); // reserved2
        out.extend_from_slice(&1078u32.to_le_bytes());

        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&self.bit_count.to_le_bytes());
        out.extend_from_slice(&self.compression.to_le_bytes());
        out.extend_from_slice(&self.image_size.to_le_bytes());
        out.extend_from_slice(&3780i32.to_le_bytes());
        out.extend_from_slice(&3780i32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // colors used
        out.extend_from_slice(&0u32.to_le_bytes()); // colors important

        for quad in &self.palette {
            out.extend_from_slice(quad);
        }
        out.extend_from_slice(&self.rows);
        out
    }
}

pub fn checkerboard(w: usize, h: usize, dark: u8, light: u8) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            pixels[y * w + x] = if (x + y) % 2 == 0 { light } else { dark };
        }
    }
    pixels
}

pub fn noise_pattern(w: usize, h: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in pixels.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8;
    }
    pixels
}

/// Fresh path under the system temp dir; the file does not exist yet.
pub fn temp_path(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("zenmono-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}
