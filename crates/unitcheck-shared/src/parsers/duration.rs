//! Parser for systemd time spans.
//!
//! systemd prints durations in several shapes depending on the tool:
//! `systemd-analyze` uses compact tokens (`1min 2.154s`), while
//! `systemctl list-timers` uses long words (`2 months 8 days ago`).
//! Both are reduced to a single seconds value.

use super::atoms::round_millis;

/// Unit suffix to seconds factor.
const UNIT_FACTORS: &[(&str, f64)] = &[
    ("y", 31_536_000.0),
    ("month", 2_592_000.0),
    ("w", 604_800.0),
    ("d", 86_400.0),
    ("h", 3_600.0),
    ("min", 60.0),
    ("s", 1.0),
    ("ms", 0.001),
    ("us", 0.000_001),
    ("µs", 0.000_001),
];

/// Long-form words rewritten to their compact suffix. Plurals come first so
/// `" months"` is not consumed by `" month"`.
const LONG_FORMS: &[(&str, &str)] = &[
    (" years", "y"),
    (" months", "month"),
    (" weeks", "w"),
    (" days", "d"),
    (" year", "y"),
    (" month", "month"),
    (" week", "w"),
    (" day", "d"),
];

/// Split a whitespace-free token into `(number, unit)` pairs, so that both
/// `34min` and `2month8d` are understood. Malformed pairs are dropped.
fn split_pairs(token: &str) -> Vec<(f64, &str)> {
    let mut pairs = Vec::new();
    let mut rest = token;

    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (num_str, after_num) = rest.split_at(num_len);
        let unit_len = after_num
            .find(|c: char| !c.is_alphabetic())
            .unwrap_or(after_num.len());
        let (unit, after_unit) = after_num.split_at(unit_len);

        if num_len == 0 && unit_len == 0 {
            // Skip a character that is neither digit nor letter (e.g. '-' or '/')
            let skip = rest.chars().next().map(char::len_utf8).unwrap_or(1);
            rest = &rest[skip..];
            continue;
        }

        if let Ok(number) = num_str.parse::<f64>() {
            if !unit.is_empty() {
                pairs.push((number, unit));
            }
        }
        rest = after_unit;
    }

    pairs
}

fn factor_for(suffix: &str) -> Option<f64> {
    UNIT_FACTORS
        .iter()
        .find(|(unit, _)| *unit == suffix)
        .map(|(_, factor)| *factor)
}

/// Convert a systemd time span into seconds, rounded to milliseconds.
///
/// Parsing is lenient: tokens that are not `<number><unit>` (such as `ago`
/// or `left`) and unknown units are skipped. Text without any recognised
/// token yields `0.0`.
///
/// ```
/// use unitcheck_shared::parsers::parse_timespan;
/// assert_eq!(parse_timespan("1min 1.123s"), 61.123);
/// assert_eq!(parse_timespan("2 months 8 days"), 5875200.0);
/// ```
pub fn parse_timespan(text: &str) -> f64 {
    let mut normalized = text.to_string();
    for (word, suffix) in LONG_FORMS {
        normalized = normalized.replace(word, suffix);
    }

    let mut seconds = 0.0;
    for token in normalized.split_whitespace() {
        for (number, unit) in split_pairs(token) {
            if let Some(factor) = factor_for(unit) {
                seconds += number * factor;
            }
        }
    }

    round_millis(seconds).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_tokens() {
        assert_eq!(parse_timespan("1s"), 1.0);
        assert_eq!(parse_timespan("11s"), 11.0);
        assert_eq!(parse_timespan("1min 1s"), 61.0);
        assert_eq!(parse_timespan("1min 1.123s"), 61.123);
        assert_eq!(parse_timespan("1min 2.15s"), 62.15);
        assert_eq!(parse_timespan("34min 46.292s"), 2086.292);
        assert_eq!(parse_timespan("1min 2.154s"), 62.154);
    }

    #[test]
    fn test_trailing_words_are_ignored() {
        assert_eq!(parse_timespan("1s ago"), 1.0);
        assert_eq!(parse_timespan("5h left"), 18_000.0);
    }

    #[test]
    fn test_long_forms() {
        assert_eq!(parse_timespan("2 months 8 days"), 5_875_200.0);
        assert_eq!(parse_timespan("2month8d"), 5_875_200.0);
        assert_eq!(parse_timespan("2month 8d"), 5_875_200.0);
        assert_eq!(parse_timespan("1 year 1 month ago"), 34_128_000.0);
        assert_eq!(parse_timespan("3 weeks 2 days ago"), 1_987_200.0);
        assert_eq!(parse_timespan("1 day 2h ago"), 93_600.0);
    }

    #[test]
    fn test_sub_second_units() {
        assert_eq!(parse_timespan("345ms"), 0.345);
        assert_eq!(parse_timespan("2s 500ms"), 2.5);
        assert_eq!(parse_timespan("2000us"), 0.002);
    }

    #[test]
    fn test_nothing_recognised() {
        assert_eq!(parse_timespan(""), 0.0);
        assert_eq!(parse_timespan("n/a"), 0.0);
        assert_eq!(parse_timespan("12parsecs"), 0.0);
    }

    #[test]
    fn test_sign_is_not_a_number() {
        assert_eq!(parse_timespan("-5s"), 5.0);
        assert!(parse_timespan("-1min -1s") >= 0.0);
    }

    #[test]
    fn test_split_pairs() {
        assert_eq!(split_pairs("34min"), vec![(34.0, "min")]);
        assert_eq!(split_pairs("2month8d"), vec![(2.0, "month"), (8.0, "d")]);
        assert!(split_pairs("ago").is_empty());
        assert!(split_pairs("n/a").is_empty());
    }
}
