#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must never panic, whatever the bytes
    let _ = zenmono::read_bmp8_headers(data);
    let _ = zenmono::decode_bmp8(data, enough::Unstoppable);
});
