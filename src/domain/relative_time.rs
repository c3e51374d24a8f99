use super::clock::{parse_message_timestamp, wall_clock_of};
use super::types::Message;
use time::OffsetDateTime;

pub const NO_MESSAGES_LABEL: &str = "No messages";
pub const NO_TIMESTAMP_LABEL: &str = "No timestamp";

/// Age label of the most recent message, e.g. `7m Ago` or `3h Ago`.
///
/// Only the `HH:MM` of the newest timestamp is used: it is placed on `now`'s
/// calendar date, so the result never exceeds `23h Ago` and does not tell past
/// from future.
pub fn latest_message_age(messages: &[Message], now: OffsetDateTime) -> String {
    let Some(latest) = latest_message(messages, now) else {
        return NO_MESSAGES_LABEL.to_string();
    };
    let Some(clock) = wall_clock_of(&latest.timestamp) else {
        return NO_TIMESTAMP_LABEL.to_string();
    };

    let message_time = now.replace_time(clock);
    let minutes = (now - message_time).whole_minutes().unsigned_abs();
    format_age_minutes(minutes)
}

/// First message with the greatest timestamp. An unparsable timestamp never
/// wins a comparison, in either position.
pub fn latest_message(messages: &[Message], now: OffsetDateTime) -> Option<&Message> {
    let offset = now.offset();
    let mut iter = messages.iter();
    let mut latest = iter.next()?;
    let mut latest_at = parse_message_timestamp(&latest.timestamp, offset);

    for message in iter {
        let candidate_at = parse_message_timestamp(&message.timestamp, offset);
        if let (Some(candidate), Some(current)) = (candidate_at, latest_at) {
            if candidate > current {
                latest = message;
                latest_at = Some(candidate);
            }
        }
    }

    Some(latest)
}

fn format_age_minutes(minutes: u64) -> String {
    if minutes < 60 {
        format!("{minutes}m Ago")
    } else {
        format!("{}h Ago", minutes / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageAction;
    use time::macros::datetime;

    fn message(id: i64, timestamp: &str) -> Message {
        Message {
            id,
            action: MessageAction::User,
            content: String::new(),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn empty_list_has_no_messages_label() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        assert_eq!(latest_message_age(&[], now), "No messages");
    }

    #[test]
    fn minutes_below_an_hour() {
        let now = datetime!(2024-06-01 10:42:30 UTC);
        let messages = [message(1, "2024-01-01T10:00:00Z")];
        assert_eq!(latest_message_age(&messages, now), "42m Ago");
    }

    #[test]
    fn hours_are_floored() {
        let now = datetime!(2024-06-01 13:59:00 UTC);
        let messages = [message(1, "2024-01-01T10:00:00Z")];
        assert_eq!(latest_message_age(&messages, now), "3h Ago");
    }

    #[test]
    fn calendar_date_is_ignored() {
        let now = datetime!(2024-06-01 10:05:00 UTC);
        let messages = [message(1, "1999-12-31T10:00:00Z")];
        assert_eq!(latest_message_age(&messages, now), "5m Ago");
    }

    #[test]
    fn future_clock_times_are_symmetric() {
        let now = datetime!(2024-06-01 08:00:00 UTC);
        let messages = [message(1, "2024-06-01T10:30:00Z")];
        assert_eq!(latest_message_age(&messages, now), "2h Ago");
    }

    #[test]
    fn picks_latest_timestamp_not_last_position() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        let messages = [
            message(1, "2024-01-01T11:50:00Z"),
            message(2, "2024-01-02T09:00:00Z"),
            message(3, "2024-01-01T11:55:00Z"),
        ];
        let latest = latest_message(&messages, now).expect("latest");
        assert_eq!(latest.id, 2);
        assert_eq!(latest_message_age(&messages, now), "3h Ago");
    }

    #[test]
    fn ties_keep_the_first_maximum() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        let messages = [
            message(1, "2024-01-01T11:00:00Z"),
            message(2, "2024-01-01T11:00:00Z"),
        ];
        assert_eq!(latest_message(&messages, now).map(|m| m.id), Some(1));
    }

    #[test]
    fn unparsable_first_timestamp_is_never_replaced() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        let messages = [message(1, "not a date"), message(2, "2024-01-01T11:00:00Z")];
        assert_eq!(latest_message(&messages, now).map(|m| m.id), Some(1));
        assert_eq!(latest_message_age(&messages, now), NO_TIMESTAMP_LABEL);
    }

    #[test]
    fn age_grows_as_clock_moves_away_from_now() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        let mut previous = 0u64;
        for minutes_back in [0u64, 1, 30, 59, 60, 61, 119, 120, 600, 719] {
            let clock = now - time::Duration::minutes(minutes_back as i64);
            let stamp = format!("2024-01-01T{:02}:{:02}:00Z", clock.hour(), clock.minute());
            let label = latest_message_age(&[message(1, &stamp)], now);
            let magnitude = if let Some(m) = label.strip_suffix("m Ago") {
                m.parse::<u64>().expect("minutes")
            } else {
                label
                    .strip_suffix("h Ago")
                    .expect("hours")
                    .parse::<u64>()
                    .expect("hours")
                    * 60
            };
            assert!(magnitude >= previous, "{label} after {previous}");
            previous = magnitude;
        }
    }
}
