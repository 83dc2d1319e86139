#![no_main]

use libfuzzer_sys::fuzz_target;
use webterm_core::normalize_newlines;

fuzz_target!(|data: &[u8]| {
    let out = normalize_newlines(data);

    let lf_in = data.iter().filter(|&&b| b == b'\n').count();
    assert_eq!(out.len(), data.len() + lf_in);

    // Every LF is preceded by the CR that was inserted for it.
    for (i, &b) in out.iter().enumerate() {
        if b == b'\n' {
            assert!(i > 0 && out[i - 1] == b'\r');
        }
    }

    // Dropping one CR before each LF restores the input.
    let mut restored = Vec::with_capacity(data.len());
    for (i, &b) in out.iter().enumerate() {
        if b == b'\r' && out.get(i + 1) == Some(&b'\n') {
            continue;
        }
        restored.push(b);
    }
    assert_eq!(restored, data);
});
