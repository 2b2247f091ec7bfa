#![no_main]
use libfuzzer_sys::fuzz_target;
use zenmono::*;

fuzz_target!(|data: &[u8]| {
    // Leading two bytes pick the parameters, the rest is the bitmap
    let [threshold, window, bmp @ ..] = data else {
        return;
    };
    let Ok(mut image) = decode_bmp8(bmp, enough::Unstoppable) else {
        return;
    };
    let max_window = image.width().min(image.height()).min(255);
    let window = (usize::from(*window) % max_window) | 1;
    let config = ThresholdConfig::new(i64::from(*threshold), window as i64)
        .expect("parameters derived in range");

    binarize(&mut image.pixels, &config, enough::Unstoppable).expect("window fits image");
    let encoded = encode_bmp8(&mut image, enough::Unstoppable).expect("decoded image encodes");
    let again = decode_bmp8(&encoded, enough::Unstoppable).expect("encoded image decodes");

    assert!(again.palette.is_grayscale());
    assert_eq!(again.pixels, image.pixels);
    for y in 0..again.height() {
        let row = again.pixels.padded_row(y);
        assert!(row[..again.width()].iter().all(|&p| p == 0 || p == 255));
        assert!(row[again.width()..].iter().all(|&p| p == 0));
    }
});
