#![no_main]

use libfuzzer_sys::fuzz_target;
use webterm_core::ShellInfo;

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = std::str::from_utf8(data) else {
        return;
    };
    if payload.len() > 8192 {
        return;
    }

    // Decoding must never panic; accepted payloads are usable as-is.
    if let Ok(info) = ShellInfo::from_json(payload) {
        assert!(!info.shell.is_empty());
        assert_eq!(info.shell, info.shell.trim());
        assert!(!info.command_line().trim().is_empty());
    }
});
