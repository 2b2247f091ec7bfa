#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn bmp8(width: i32, height: i32, fill: u8) -> Vec<u8> {
    let stride = (width as usize + 3) & !3;
    let rows = stride * height.unsigned_abs() as usize;
    let mut bmp = vec![0u8; 1078 + rows];
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&((1078 + rows) as u32).to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&1078u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&width.to_le_bytes());
    bmp[22..26].copy_from_slice(&height.to_le_bytes());
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&8u16.to_le_bytes()); // bpp
    for i in 0..256 {
        let at = 54 + i * 4;
        bmp[at..at + 3].fill(i as u8);
    }
    bmp[1078..].fill(fill);
    bmp
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_roundtrip";
    fs::create_dir_all(dir).unwrap();

    // Leading threshold and window bytes, then the bitmap
    let with_params = |t: u8, w: u8, bmp: Vec<u8>| [vec![t, w], bmp].concat();

    fs::write(format!("{dir}/4x4_100.bin"), with_params(99, 3, bmp8(4, 4, 100))).unwrap();
    fs::write(format!("{dir}/3x5_pad.bin"), with_params(128, 1, bmp8(3, 5, 200))).unwrap();
    fs::write(format!("{dir}/topdown.bin"), with_params(10, 5, bmp8(7, -6, 11))).unwrap();

    // Truncated/malformed seeds for edge coverage
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();
    let full = bmp8(5, 2, 42);
    fs::write(format!("{dir}/5x2.bmp"), &full).unwrap();
    fs::write(format!("{dir}/truncated_header.bmp"), &full[..30]).unwrap();
    fs::write(format!("{dir}/truncated_palette.bmp"), &full[..600]).unwrap();
    fs::write(format!("{dir}/truncated_rows.bmp"), &full[..full.len() - 3]).unwrap();
    let mut bpp24 = full.clone();
    bpp24[28..30].copy_from_slice(&24u16.to_le_bytes());
    fs::write(format!("{dir}/bpp24.bmp"), bpp24).unwrap();

    println!("Seeds written");
}
