#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Keystroke log codec used to validate and store student submissions.
//!
//! A log body holds one byte value per line, read as a two's-complement
//! integer, followed by a `Checksum: <digits>` trailer carrying the
//! [`fletcher16`] of the body. [`decode_log`] verifies the trailer and maps
//! each byte to a [`Key`]; [`rle_compress`] and [`rle_decompress`] convert the
//! body to and from its stored run-length form.

mod checksum;
mod rle;

use keyplay_core::{Key, NamedKey};
use thiserror::Error;
use tracing::debug;

pub use checksum::fletcher16;
pub use rle::{rle_compress, rle_decompress};

/// Bodies of this many characters or more are rejected.
pub const MAX_BODY_LENGTH: usize = 100_000;

const CHECKSUM_PREFIX: &str = "Checksum:";

/// Validation failures raised while decoding or expanding a log.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KeylogError {
    /// The trailer was missing or disagreed with the recomputed checksum.
    #[error("key file failed checksum (declared {}, computed {computed})", display_declared(.declared))]
    ChecksumMismatch {
        /// Checksum carried by the trailer, if one was readable.
        declared: Option<u64>,
        /// Checksum recomputed over the body.
        computed: u16,
    },
    /// The body reached the size limit.
    #[error("file size ({length}) exceeds {max} character max", max = MAX_BODY_LENGTH)]
    LogTooLarge {
        /// Measured length of the body.
        length: usize,
    },
    /// A run-length token was not an integer or integer pair.
    #[error("malformed token {token:?}")]
    MalformedToken {
        /// Offending token text.
        token: String,
    },
}

fn display_declared(declared: &Option<u64>) -> String {
    declared.map_or_else(|| "nothing".to_owned(), |value| value.to_string())
}

/// Log that passed verification and is ready for replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedLog {
    keys: Vec<Key>,
    body: String,
    checksum: u16,
}

impl DecodedLog {
    /// Keys in recorded order.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Body text without the checksum trailer.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Verified checksum of the body.
    #[must_use]
    pub const fn checksum(&self) -> u16 {
        self.checksum
    }

    /// Consumes the log, yielding its keys.
    #[must_use]
    pub fn into_keys(self) -> Vec<Key> {
        self.keys
    }
}

/// Verifies a raw log and decodes its body into keys.
pub fn decode_log(text: &str) -> Result<DecodedLog, KeylogError> {
    let text = text.trim();
    let (body, declared) = split_trailer(text);
    let computed = fletcher16(body);

    let Some(declared) = declared else {
        return Err(KeylogError::ChecksumMismatch {
            declared: None,
            computed,
        });
    };
    if declared != Some(u64::from(computed)) {
        return Err(KeylogError::ChecksumMismatch { declared, computed });
    }

    let length = body.encode_utf16().count();
    if length >= MAX_BODY_LENGTH {
        return Err(KeylogError::LogTooLarge { length });
    }

    let keys = if body.is_empty() {
        Vec::new()
    } else {
        body.split('\n').map(key_for_line).collect()
    };
    debug!(keys = keys.len(), checksum = computed, "decoded keystroke log");

    Ok(DecodedLog {
        keys,
        body: body.to_owned(),
        checksum: computed,
    })
}

/// Appends the checksum trailer to `body`, producing a log that decodes.
#[must_use]
pub fn sign_log(body: &str) -> String {
    let body = body.trim();
    let checksum = fletcher16(body);
    if body.is_empty() {
        format!("{CHECKSUM_PREFIX} {checksum}")
    } else {
        format!("{body}\n{CHECKSUM_PREFIX} {checksum}")
    }
}

/// Renders keys as a log body, one byte value per line.
///
/// Keys without a byte representation are skipped.
#[must_use]
pub fn encode_keys(keys: &[Key]) -> String {
    keys.iter()
        .filter_map(|key| byte_for_key(*key))
        .map(|byte| byte.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Maps a normalized byte value to the key it records.
#[must_use]
pub fn key_for_code(code: i64) -> Key {
    let named = match code {
        9 => NamedKey::Tab,
        10 => NamedKey::Enter,
        27 => NamedKey::Escape,
        32 => NamedKey::Space,
        127 => NamedKey::Backspace,
        128 => NamedKey::Unidentified,
        129 => NamedKey::ArrowUp,
        130 => NamedKey::ArrowDown,
        131 => NamedKey::ArrowRight,
        132 => NamedKey::ArrowLeft,
        133 => NamedKey::Home,
        134 => NamedKey::End,
        137 => NamedKey::Delete,
        other => return Key::Code(other),
    };
    Key::Named(named)
}

/// Byte value a recorder writes for `key`, if it has one.
#[must_use]
pub fn byte_for_key(key: Key) -> Option<u8> {
    match key {
        Key::Named(named) => Some(match named {
            NamedKey::Tab => 9,
            NamedKey::Enter => 10,
            NamedKey::Escape => 27,
            NamedKey::Space => 32,
            NamedKey::Backspace => 127,
            NamedKey::Unidentified => 128,
            NamedKey::ArrowUp => 129,
            NamedKey::ArrowDown => 130,
            NamedKey::ArrowRight => 131,
            NamedKey::ArrowLeft => 132,
            NamedKey::Home => 133,
            NamedKey::End => 134,
            NamedKey::Delete => 137,
        }),
        Key::Char(character) if character.is_ascii() => Some(character as u8),
        Key::Char(_) => None,
        Key::Code(code) => u8::try_from(code).ok(),
    }
}

/// Splits off a `Checksum:` trailer, returning the body and declared value.
///
/// The outer option is `None` when no trailer exists; the inner one is
/// `None` when the digits overflow.
fn split_trailer(text: &str) -> (&str, Option<Option<u64>>) {
    let (body, last_line) = match text.rfind('\n') {
        Some(index) => (&text[..index], &text[index + 1..]),
        None => ("", text),
    };

    let Some(rest) = last_line.strip_prefix(CHECKSUM_PREFIX) else {
        return (text, None);
    };
    let digits = rest.trim_start();
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return (text, None);
    }
    (body, Some(digits.parse::<u64>().ok()))
}

/// Maps one payload line to its key.
///
/// The leading integer of the line is read, so `5.0` is 5 and `12ab` is 12.
/// Lines without one become [`NamedKey::Unidentified`], which every game
/// treats as a plain tick.
fn key_for_line(line: &str) -> Key {
    match leading_integer(line) {
        Some(value) if value < 0 => key_for_code(value + 256),
        Some(value) => key_for_code(value),
        None => Key::Named(NamedKey::Unidentified),
    }
}

fn leading_integer(line: &str) -> Option<i64> {
    let line = line.trim();
    let (sign, digits) = match line.as_bytes().first() {
        Some(b'-') => (-1, &line[1..]),
        Some(b'+') => (1, &line[1..]),
        _ => (1, line),
    };
    let end = digits
        .bytes()
        .position(|byte| !byte.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}
