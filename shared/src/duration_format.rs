use std::fmt::Write;

pub const SHORT_STAY_LIMIT_MINUTES: f64 = 60.0;
pub const MEDIUM_STAY_LIMIT_MINUTES: f64 = 240.0;

/// Approximate stay duration for circle labels, e.g. `~1h 30min`.
pub fn format_stay(minutes: f64) -> String {
    let mut out = String::with_capacity(12);
    write_stay(&mut out, minutes);
    out
}

pub fn write_stay(buf: &mut String, minutes: f64) {
    buf.clear();
    let total = if minutes.is_finite() {
        minutes.max(0.0).round() as u64
    } else {
        0
    };
    let hours = total / 60;
    let mins = total % 60;
    let _ = match (hours, mins) {
        (0, m) => write!(buf, "~{m}min"),
        (h, 0) => write!(buf, "~{h}h"),
        (h, m) => write!(buf, "~{h}h {m}min"),
    };
}

/// Second label line under the duration.
pub fn stay_category(minutes: f64) -> &'static str {
    if minutes < SHORT_STAY_LIMIT_MINUTES {
        "Short stay"
    } else if minutes < MEDIUM_STAY_LIMIT_MINUTES {
        "Medium stay"
    } else {
        "Long stay"
    }
}
