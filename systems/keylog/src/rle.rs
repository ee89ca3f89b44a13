//! Run-length storage format for keystroke log bodies.
//!
//! Each token is either a bare decimal value or `value,count`. Recorded logs
//! are dominated by long runs of the same key, so the compact form is what
//! gets stored alongside a submission.

use tracing::debug;

use crate::{KeylogError, MAX_BODY_LENGTH};

const RUN_DELIMITER: char = ',';

/// Collapses runs of equal consecutive values in a newline-separated list.
pub fn rle_compress(text: &str) -> Result<String, KeylogError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let mut tokens: Vec<String> = Vec::new();
    let mut run: Option<(i64, usize)> = None;
    for line in trimmed.split('\n') {
        let value = parse_value(line)?;
        run = match run {
            Some((previous, count)) if previous == value => Some((previous, count + 1)),
            Some((previous, count)) => {
                tokens.push(format_run(previous, count));
                Some((value, 1))
            }
            None => Some((value, 1)),
        };
    }
    if let Some((value, count)) = run {
        tokens.push(format_run(value, count));
    }

    let compressed = tokens.join("\n");
    debug!(
        original = text.len(),
        compressed = compressed.len(),
        savings = compressed.len() as f64 / text.len() as f64,
        "compressed keystroke log"
    );
    Ok(compressed)
}

/// Expands `value,count` tokens back into a newline-separated list.
pub fn rle_decompress(text: &str) -> Result<String, KeylogError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let mut values: Vec<i64> = Vec::new();
    for token in trimmed.split('\n') {
        match token.split_once(RUN_DELIMITER) {
            Some((value, count)) => {
                let value = parse_value(value)?;
                let count = count
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| malformed(token))?;
                let expanded = values.len().saturating_add(count);
                if expanded > MAX_BODY_LENGTH {
                    return Err(KeylogError::LogTooLarge { length: expanded });
                }
                values.extend(std::iter::repeat(value).take(count));
            }
            None => values.push(parse_value(token)?),
        }
    }

    Ok(values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn format_run(value: i64, count: usize) -> String {
    if count == 1 {
        value.to_string()
    } else {
        format!("{value}{RUN_DELIMITER}{count}")
    }
}

fn parse_value(token: &str) -> Result<i64, KeylogError> {
    token.trim().parse::<i64>().map_err(|_| malformed(token))
}

fn malformed(token: &str) -> KeylogError {
    KeylogError::MalformedToken {
        token: token.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compresses_runs_into_pairs() {
        assert_eq!(rle_compress("5\n5\n5\n3").expect("compress"), "5,3\n3");
    }

    #[test]
    fn decompresses_pairs_into_runs() {
        assert_eq!(rle_decompress("5,3\n3").expect("decompress"), "5\n5\n5\n3");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(rle_compress("").expect("compress"), "");
        assert_eq!(rle_decompress("").expect("decompress"), "");
    }

    #[test]
    fn single_values_stay_bare() {
        assert_eq!(rle_compress("131").expect("compress"), "131");
        assert_eq!(rle_compress("1\n2\n1").expect("compress"), "1\n2\n1");
    }

    #[test]
    fn negative_values_keep_their_sign() {
        assert_eq!(rle_compress("-127\n-127").expect("compress"), "-127,2");
        assert_eq!(rle_decompress("-127,2").expect("decompress"), "-127\n-127");
    }

    #[test]
    fn zero_count_expands_to_nothing() {
        assert_eq!(rle_decompress("4,0\n9").expect("decompress"), "9");
    }

    #[test]
    fn rejects_tokens_that_are_not_integers() {
        let error = rle_decompress("5,x").expect_err("count must parse");
        assert_eq!(
            error,
            KeylogError::MalformedToken {
                token: "5,x".to_owned()
            }
        );
        assert!(matches!(
            rle_decompress("a"),
            Err(KeylogError::MalformedToken { .. })
        ));
        assert!(matches!(
            rle_compress("1\nArrowUp"),
            Err(KeylogError::MalformedToken { .. })
        ));
    }

    #[test]
    fn rejects_runs_larger_than_a_log_body() {
        let error = rle_decompress("129,1000000").expect_err("run is too long");
        assert!(matches!(error, KeylogError::LogTooLarge { .. }));
    }
}
