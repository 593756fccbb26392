use chrono::{DateTime, NaiveDate, Utc};

use crate::COMMAND_PREFIX;

/// A prefixed command split into its name and optional argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandInvocation<'a> {
    pub name: &'a str,
    pub argument: Option<&'a str>,
}

/// Split text like `/weather New York` into its command name and argument.
///
/// Only the first line is considered. The name runs up to the first
/// whitespace, and a blank argument is reported as `None`.
pub fn split_command(raw: &str) -> Option<CommandInvocation<'_>> {
    let first_line = raw.trim_start().lines().next()?;
    let body = first_line.strip_prefix(COMMAND_PREFIX)?;

    let name_end = body.find(char::is_whitespace).unwrap_or(body.len());
    let name = &body[..name_end];
    if name.is_empty() {
        return None;
    }

    let argument = body[name_end..].trim();
    Some(CommandInvocation {
        name,
        argument: (!argument.is_empty()).then_some(argument),
    })
}

/// Parse a strictly positive base-10 integer, ignoring surrounding whitespace.
pub fn parse_positive_int(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|value| *value > 0)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date_bound(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{CommandInvocation, parse_date_bound, parse_positive_int, split_command};

    #[test]
    fn splits_command_and_argument() {
        assert_eq!(
            split_command("/weather New York"),
            Some(CommandInvocation {
                name: "weather",
                argument: Some("New York"),
            })
        );
        assert_eq!(
            split_command("  /start  "),
            Some(CommandInvocation {
                name: "start",
                argument: None,
            })
        );
        assert_eq!(
            split_command("/setcity   Paris  \nsecond line"),
            Some(CommandInvocation {
                name: "setcity",
                argument: Some("Paris"),
            })
        );
    }

    #[test]
    fn rejects_text_without_prefix() {
        assert_eq!(split_command("weather Paris"), None);
        assert_eq!(split_command("/"), None);
        assert_eq!(split_command("/ weather"), None);
        assert_eq!(split_command(""), None);
    }

    #[test]
    fn keeps_glued_suffix_in_name() {
        let invocation = split_command("/weatherly Paris").expect("prefixed text");
        assert_eq!(invocation.name, "weatherly");
    }

    #[test]
    fn parses_positive_ints() {
        assert_eq!(parse_positive_int("5"), Some(5));
        assert_eq!(parse_positive_int(" 12 "), Some(12));
        assert_eq!(parse_positive_int("0"), None);
        assert_eq!(parse_positive_int("-3"), None);
        assert_eq!(parse_positive_int("abc"), None);
        assert_eq!(parse_positive_int(""), None);
    }

    #[test]
    fn parses_dates_and_timestamps() {
        assert_eq!(
            parse_date_bound("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_date_bound("2024-03-01T10:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap())
        );
        assert_eq!(parse_date_bound("yesterday"), None);
        assert_eq!(parse_date_bound("2024-13-01"), None);
        assert_eq!(parse_date_bound(" "), None);
    }
}
