use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

pub const INVALID_TIME_LABEL: &str = "--:--";

/// Parses a message timestamp. RFC 3339 values keep their offset; values
/// without an offset are read as wall-clock time in `local_offset`.
pub fn parse_message_timestamp(value: &str, local_offset: UtcOffset) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }

    PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            value,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(value, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    })
    .ok()
    .map(|naive| naive.assume_offset(local_offset))
}

/// The `HH:MM` written right after the `T` separator, read as text. The calendar
/// date and any offset are ignored.
pub fn wall_clock_of(value: &str) -> Option<Time> {
    let (_, rest) = value.split_once('T')?;
    let rest = rest.split('T').next().unwrap_or(rest);
    let head: String = rest.chars().take(5).collect();
    let (hours, minutes) = head.split_once(':')?;
    let hours = hours.parse::<u8>().ok()?;
    let minutes = minutes.parse::<u8>().ok()?;
    Time::from_hms(hours, minutes, 0).ok()
}

/// `09:05 PM` style clock in `local_offset`.
pub fn format_clock_12h(value: &str, local_offset: UtcOffset) -> String {
    let Some(parsed) = parse_message_timestamp(value, local_offset) else {
        return INVALID_TIME_LABEL.to_string();
    };
    parsed
        .to_offset(local_offset)
        .format(format_description!("[hour repr:12]:[minute] [period]"))
        .unwrap_or_else(|_| INVALID_TIME_LABEL.to_string())
}
