//! Human-readable renderings for terminal output.

use chrono::NaiveDateTime;

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Render how long ago `then` was, relative to `now`, at the coarsest
/// unit that applies.
pub fn time_ago(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let elapsed = now - then;
    let days = elapsed.num_days();
    if days > 0 {
        return format!("{} ago", plural(days, "day"));
    }
    let secs = elapsed.num_seconds();
    if secs > 3_600 {
        format!("{} ago", plural(secs / 3_600, "hour"))
    } else if secs > 60 {
        format!("{} ago", plural(secs / 60, "minute"))
    } else {
        "less than a minute ago".to_string()
    }
}

/// e.g. `Friday, 03/05/2024 at 09:00`.
pub fn occurrence(at: NaiveDateTime) -> String {
    at.format("%A, %d/%m/%Y at %H:%M").to_string()
}
