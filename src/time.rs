use chrono::NaiveTime;

/// Parse a reminder time in HH:MM format or a named time (morning, noon, etc.)
/// Accepts flexible formats:
/// - Named times: "morning", "noon", "evening", etc.
/// - HH:MM format: "08:00", "8:00", "8:5" (with or without leading zeros)
/// - 12-hour format: "8:00 AM", "9:30pm"
/// - Hour only: "8", "08" (defaults to :00)
pub fn parse_time(time_str: &str) -> Option<NaiveTime> {
    let trimmed = time_str.trim();
    let lower = trimmed.to_lowercase();

    let named_time = match lower.as_str() {
        "morning" | "breakfast" => Some((8, 0)),
        "midmorning" | "mid-morning" => Some((10, 0)),
        "noon" | "midday" | "lunch" => Some((12, 0)),
        "afternoon" => Some((15, 0)),
        "evening" | "dinner" => Some((18, 0)),
        "night" | "bedtime" => Some((21, 0)),
        "midnight" => Some((0, 0)),
        _ => None,
    };

    if let Some((hour, minute)) = named_time {
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    // "8:00 AM" / "9:30pm"
    let (clock, meridiem) = if let Some(rest) = lower.strip_suffix("am") {
        (rest.trim(), Some(false))
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest.trim(), Some(true))
    } else {
        (lower.as_str(), None)
    };

    let (hour, minute) = parse_clock(clock)?;

    let hour = match meridiem {
        None => hour,
        Some(_) if hour == 0 || hour > 12 => return None,
        Some(false) => hour % 12,
        Some(true) => hour % 12 + 12,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn parse_clock(clock: &str) -> Option<(u32, u32)> {
    if clock.contains(':') {
        let parts: Vec<&str> = clock.split(':').collect();
        if parts.len() != 2 {
            return None;
        }

        let hour = parts[0].trim().parse::<u32>().ok()?;
        let minute = parts[1].trim().parse::<u32>().ok()?;

        if hour >= 24 || minute >= 60 {
            return None;
        }

        return Some((hour, minute));
    }

    // Just an hour (e.g., "8" means "08:00")
    let hour = clock.parse::<u32>().ok()?;
    if hour >= 24 {
        return None;
    }
    Some((hour, 0))
}

/// "8:00 AM" style, as shown on the medication lists.
pub fn display_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}
