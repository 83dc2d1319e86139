#![no_main]

use libfuzzer_sys::fuzz_target;
use webterm_core::ServerOrigin;

fuzz_target!(|data: &[u8]| {
    let Ok(url) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(origin) = ServerOrigin::parse(url) else {
        return;
    };
    assert!(!origin.authority.is_empty());
    assert!(!origin.authority.contains(char::is_whitespace));

    let ws = origin.terminal_url();
    assert!(ws.starts_with("ws://") || ws.starts_with("wss://"));
    assert!(ws.ends_with("/ws"));

    // Display output parses back to the same origin.
    let reparsed = ServerOrigin::parse(&origin.to_string()).expect("display output parses");
    assert_eq!(reparsed, origin);
});
