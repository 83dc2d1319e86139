//! Output chunk rewriting between the socket and the display.
//!
//! The remote stream uses bare `\n` line endings; the display needs `\r\n` to
//! return the cursor to column zero. The rewrite is stateless and strictly
//! one-directional: each `\n` gains a preceding `\r`, nothing else changes.
//! A `\r\n` already present in the stream therefore becomes `\r\r\n`, which
//! renders identically.

use std::borrow::Cow;

/// Expand every `\n` in `chunk` to `\r\n`.
///
/// Borrows when the chunk contains no line feed.
#[must_use]
pub fn normalize_newlines(chunk: &[u8]) -> Cow<'_, [u8]> {
    let line_feeds = chunk.iter().filter(|&&byte| byte == b'\n').count();
    if line_feeds == 0 {
        return Cow::Borrowed(chunk);
    }

    let mut out = Vec::with_capacity(chunk.len() + line_feeds);
    for &byte in chunk {
        if byte == b'\n' {
            out.push(b'\r');
        }
        out.push(byte);
    }
    Cow::Owned(out)
}
