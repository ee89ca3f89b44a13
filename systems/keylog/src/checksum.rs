//! Fletcher-16 integrity check over keystroke log bodies.

const NEWLINE: u16 = b'\n' as u16;

/// Computes the Fletcher-16 checksum of `body`.
///
/// The body is walked line by line as UTF-16 code units, and a newline is
/// folded in after every line including the last, so `"1\n2"` and
/// `"1\n2\n"` differ. An empty body contributes no lines and yields zero.
#[must_use]
pub fn fletcher16(body: &str) -> u16 {
    if body.is_empty() {
        return 0;
    }

    let mut sum1: u16 = 0;
    let mut sum2: u16 = 0;
    for line in body.split('\n') {
        for unit in line.encode_utf16().chain(std::iter::once(NEWLINE)) {
            sum1 = ((u32::from(sum1) + u32::from(unit)) % 255) as u16;
            sum2 = (sum2 + sum1) % 255;
        }
    }
    (sum2 << 8) | sum1
}
