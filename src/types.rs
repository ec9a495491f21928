//! Timestamp helpers shared by the stores and handlers

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// PostgreSQL keeps microseconds; every timestamp we hand out is cut to the
/// same precision so memory and database stores render identically.
pub fn truncate_to_storage(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Current instant, at storage precision
pub fn now() -> DateTime<Utc> {
    truncate_to_storage(Utc::now())
}

/// Next `updated_at` for a row last modified at `previous`.
///
/// Always strictly later than `previous`, even when two writes land inside
/// the same microsecond.
pub fn next_modified(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
