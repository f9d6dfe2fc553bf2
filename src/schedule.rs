//! Publish-time parsing for scheduled posts

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Local date-time layouts accepted, including the browser `datetime-local` one
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const SUPPORTED_FORMATS_HINT: &str = "Supported formats:\n  \
     - Relative: 'in 5m', 'in 2h', 'in 1d', 'in 30 minutes'\n  \
     - Time today: '15:00', '3pm', '15:30'\n  \
     - Date+time: 'YYYY-MM-DD 15:00'\n  \
     - RFC 3339: 'YYYY-MM-DDT15:00:00Z'";

/// Parse when a post should go out; the result must lie in the future
pub fn parse_schedule_time(input: &str) -> Result<DateTime<Utc>> {
    parse_schedule_time_at(input, Local::now())
}

/// Like `parse_schedule_time`, relative to an explicit "now"
pub fn parse_schedule_time_at(input: &str, now: DateTime<Local>) -> Result<DateTime<Utc>> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        bail!("Schedule time is empty\n{}", SUPPORTED_FORMATS_HINT);
    }

    let at = parse_any(&input, now)
        .ok_or_else(|| anyhow!("Could not parse schedule time: '{}'\n{}", input, SUPPORTED_FORMATS_HINT))??;

    if at <= now.with_timezone(&Utc) {
        bail!(
            "Schedule time {} is in the past",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }
    Ok(at)
}

/// `None` when no format matched, `Some(Err)` when one matched but was invalid
fn parse_any(input: &str, now: DateTime<Local>) -> Option<Result<DateTime<Utc>>> {
    if let Some(rest) = input.strip_prefix("in ") {
        return Some(
            parse_relative(rest)
                .map(|offset| now.with_timezone(&Utc) + offset)
                .ok_or_else(|| {
                    anyhow!(
                        "Could not parse relative time: '{}'\n\
                         Examples: '5m', '2h', '1d', '30 minutes', '2 hours'",
                        rest
                    )
                }),
        );
    }

    // RFC 3339 needs the upper-case 'T'/'Z' separators chrono expects
    if let Ok(dt) = DateTime::parse_from_rfc3339(&input.to_uppercase()) {
        return Some(Ok(dt.with_timezone(&Utc)));
    }

    // Same for the 'T' of the `datetime-local` layout
    let upper = input.to_uppercase();
    if let Some(naive) = LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&upper, fmt).ok())
    {
        return Some(local_to_utc(naive));
    }

    let time = parse_clock_time(input)?;
    let today = now.date_naive();
    let candidate = local_to_utc(today.and_time(time));
    // A clock time that already passed today means tomorrow
    Some(match candidate {
        Ok(at) if at <= now.with_timezone(&Utc) => local_to_utc((today + Duration::days(1)).and_time(time)),
        other => other,
    })
}

/// Offsets like "5m", "2h", "30 minutes", "1 week"
fn parse_relative(input: &str) -> Option<Duration> {
    let input = input.trim();
    let split = input.find(|c: char| !c.is_ascii_digit())?;
    let (amount, unit) = input.split_at(split);
    let amount: i64 = amount.parse().ok()?;

    match unit.trim().trim_end_matches('s') {
        "" => Some(Duration::seconds(amount)),
        "m" | "min" | "minute" => Some(Duration::minutes(amount)),
        "h" | "hr" | "hour" => Some(Duration::hours(amount)),
        "d" | "day" => Some(Duration::days(amount)),
        "w" | "week" => Some(Duration::weeks(amount)),
        "sec" | "second" => Some(Duration::seconds(amount)),
        _ => None,
    }
}

/// Clock times like "15:00", "15:00:30", "3pm", "3:30 pm"
fn parse_clock_time(input: &str) -> Option<NaiveTime> {
    if let Some(time) = ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(input, fmt).ok())
    {
        return Some(time);
    }

    let compact = input.replace(' ', "");
    let (clock, is_pm) = if let Some(clock) = compact.strip_suffix("pm") {
        (clock, true)
    } else {
        (compact.strip_suffix("am")?, false)
    };

    let (hour, minute) = match clock.split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        None => (clock.parse::<u32>().ok()?, 0),
    };
    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("Ambiguous or invalid local time"))
}
