use crate::consts::TIMESTAMP_REGEX;
use crate::violation::Rule;

/// Normalize a start-time value to whole seconds.
///
/// Accepts plain seconds (`90`, `30s`) and unit-suffixed forms (`1m30s`,
/// `1h2m30s`, `0m10s`, `2h`). Values that overflow are rejected along with
/// anything else that doesn't match.
///
/// ```
/// use tubesync_identity::parse_timestamp;
/// assert_eq!(parse_timestamp("1h2m30s"), Ok(3750));
/// assert_eq!(parse_timestamp("90"), Ok(90));
/// assert!(parse_timestamp("soon").is_err());
/// ```
pub fn parse_timestamp(value: &str) -> Result<u64, Rule> {
    let invalid = || Rule::Timestamp(value.to_string());
    let trimmed = value.trim();
    let captures = TIMESTAMP_REGEX.captures(trimmed).ok_or_else(invalid)?;
    let mut matched = false;
    let mut total: u64 = 0;
    for (group, multiplier) in [(1, 3600u64), (2, 60), (3, 1)] {
        if let Some(m) = captures.get(group) {
            matched = true;
            let amount = m.as_str().parse::<u64>().map_err(|_| invalid())?;
            total = amount
                .checked_mul(multiplier)
                .and_then(|seconds| total.checked_add(seconds))
                .ok_or_else(invalid)?;
        }
    }
    match matched {
        true => Ok(total),
        false => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("90", 90)]
    #[case("30s", 30)]
    #[case("1m30s", 90)]
    #[case("1m30", 90)]
    #[case("1h2m30s", 3750)]
    #[case("0m10s", 10)]
    #[case("2h", 7200)]
    #[case("5m", 300)]
    #[case("0", 0)]
    fn test_valid_timestamps(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(parse_timestamp(input), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("s")]
    #[case("1:30")]
    #[case("abc")]
    #[case("1m1h")]
    #[case("-5")]
    #[case("99999999999999999999")]
    fn test_invalid_timestamps(#[case] input: &str) {
        assert_eq!(parse_timestamp(input), Err(Rule::Timestamp(input.to_string())));
    }
}
