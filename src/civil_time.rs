//! Civil time: a settable UTC clock plus a fixed two-rule daylight-saving
//! policy.
//!
//! The clock is anchored to device uptime.  At boot it reads UTC epoch 0;
//! a client sets it by sending its *local* wall-clock time, which is
//! converted to UTC through the active rule before being stored.  Local
//! time is never stored, only derived.
//!
//! Rules follow the usual "nth weekday of month at hour" shape.  The
//! default zone is Central European:
//!
//! ```text
//!   CEST  UTC+2  from last Sunday of March,   02:00 local (standard time)
//!   CET   UTC+1  from last Sunday of October, 03:00 local (summer time)
//! ```

use core::fmt::Write as _;

use chrono::{DateTime, Datelike, Days, NaiveDate, Timelike, Weekday};

use crate::error::RequestError;

/// Latest local epoch accepted from a client (9999-12-31 23:59:59).
pub const MAX_LOCAL_EPOCH: i64 = 253_402_300_799;

/// Canonical rendering, e.g. `31.03.2024 03:00:00 CEST`.
pub type TimestampString = heapless::String<32>;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Which occurrence of the weekday within the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Week {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

/// One offset period and the local instant at which it begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeChangeRule {
    pub abbrev: &'static str,
    pub week: Week,
    pub weekday: Weekday,
    /// 1..=12
    pub month: u32,
    /// Local hour the rule takes effect, measured in the *other* rule's time.
    pub hour: u32,
    /// Offset from UTC in minutes.
    pub offset_minutes: i32,
}

impl TimeChangeRule {
    fn offset_secs(&self) -> i64 {
        i64::from(self.offset_minutes) * 60
    }

    /// Local epoch at which the rule takes effect in `year`.
    fn local_transition(&self, year: i32) -> Option<i64> {
        // "Last" is computed as the first occurrence in the following month,
        // minus one week.
        let (y, m) = match (self.week, self.month) {
            (Week::Last, 12) => (year + 1, 1),
            (Week::Last, m) => (year, m + 1),
            (_, m) => (year, m),
        };
        let nth: u64 = match self.week {
            Week::First | Week::Last => 0,
            Week::Second => 1,
            Week::Third => 2,
            Week::Fourth => 3,
        };

        let first = NaiveDate::from_ymd_opt(y, m, 1)?;
        let to_weekday = (7 + self.weekday.num_days_from_sunday()
            - first.weekday().num_days_from_sunday())
            % 7;
        let mut date = first.checked_add_days(Days::new(7 * nth + u64::from(to_weekday)))?;
        if self.week == Week::Last {
            date = date.checked_sub_days(Days::new(7))?;
        }
        Some(date.and_hms_opt(self.hour, 0, 0)?.and_utc().timestamp())
    }
}

/// A zone defined by a summer rule and a standard rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone {
    dst: TimeChangeRule,
    std: TimeChangeRule,
}

/// Central European Time / Central European Summer Time.
pub const CENTRAL_EUROPEAN: Timezone = Timezone {
    dst: TimeChangeRule {
        abbrev: "CEST",
        week: Week::Last,
        weekday: Weekday::Sun,
        month: 3,
        hour: 2,
        offset_minutes: 120,
    },
    std: TimeChangeRule {
        abbrev: "CET",
        week: Week::Last,
        weekday: Weekday::Sun,
        month: 10,
        hour: 3,
        offset_minutes: 60,
    },
};

/// Transition instants for one calendar year.
#[derive(Debug, Clone, Copy)]
struct Transitions {
    dst_local: i64,
    std_local: i64,
    dst_utc: i64,
    std_utc: i64,
}

fn year_of(epoch: i64) -> Option<i32> {
    DateTime::from_timestamp(epoch, 0).map(|dt| dt.year())
}

impl Timezone {
    pub const fn new(dst: TimeChangeRule, std: TimeChangeRule) -> Self {
        Self { dst, std }
    }

    fn transitions(&self, year: i32) -> Option<Transitions> {
        let dst_local = self.dst.local_transition(year)?;
        let std_local = self.std.local_transition(year)?;
        Some(Transitions {
            dst_local,
            std_local,
            // Summer time starts at a standard-time wall clock and ends at a
            // summer-time wall clock.
            dst_utc: dst_local - self.std.offset_secs(),
            std_utc: std_local - self.dst.offset_secs(),
        })
    }

    /// Whether summer time is in effect at UTC instant `utc`.
    pub fn utc_is_dst(&self, utc: i64) -> bool {
        let Some(t) = year_of(utc).and_then(|y| self.transitions(y)) else {
            return false;
        };
        if t.std_utc > t.dst_utc {
            utc >= t.dst_utc && utc < t.std_utc
        } else {
            !(utc >= t.std_utc && utc < t.dst_utc)
        }
    }

    /// Whether summer time is in effect at local wall-clock `local`.
    pub fn local_is_dst(&self, local: i64) -> bool {
        let Some(t) = year_of(local).and_then(|y| self.transitions(y)) else {
            return false;
        };
        if t.std_local > t.dst_local {
            local >= t.dst_local && local < t.std_local
        } else {
            !(local >= t.std_local && local < t.dst_local)
        }
    }

    /// UTC → (local epoch, summer time flag).
    pub fn to_local(&self, utc: i64) -> (i64, bool) {
        let is_dst = self.utc_is_dst(utc);
        let rule = if is_dst { &self.dst } else { &self.std };
        (utc + rule.offset_secs(), is_dst)
    }

    /// Local wall clock → UTC.  Summer time is assumed from the spring
    /// change up to the autumn change, both in local wall-clock terms.  A
    /// value in the repeated autumn hour takes the summer reading.  A value
    /// in the skipped spring hour also takes the summer offset, so 02:30
    /// on that day becomes 01:30 CET.
    pub fn to_utc(&self, local: i64) -> i64 {
        let rule = if self.local_is_dst(local) { &self.dst } else { &self.std };
        local - rule.offset_secs()
    }

    pub fn abbreviation(&self, is_dst: bool) -> &'static str {
        if is_dst { self.dst.abbrev } else { self.std.abbrev }
    }

    /// Render `DD.MM.YYYY HH:MM:SS ZZZ`.
    pub fn format(&self, local: i64, is_dst: bool) -> TimestampString {
        let mut out = TimestampString::new();
        let zone = self.abbreviation(is_dst);
        // 24 bytes at most for four-digit years; the buffer holds 32.
        let _ = match DateTime::from_timestamp(local, 0) {
            Some(dt) => write!(
                out,
                "{:02}.{:02}.{:04} {:02}:{:02}:{:02} {}",
                dt.day(),
                dt.month(),
                dt.year(),
                dt.hour(),
                dt.minute(),
                dt.second(),
                zone
            ),
            None => write!(out, "--.--.---- --:--:-- {}", zone),
        };
        out
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// UTC clock advanced by device uptime, settable by a client.
#[derive(Debug, Clone)]
pub struct CivilClock {
    tz: Timezone,
    base_utc: i64,
    base_uptime_ms: u64,
}

impl CivilClock {
    /// Clock reading UTC epoch 0 at uptime 0.
    pub const fn new(tz: Timezone) -> Self {
        Self {
            tz,
            base_utc: 0,
            base_uptime_ms: 0,
        }
    }

    pub fn timezone(&self) -> &Timezone {
        &self.tz
    }

    /// Current UTC epoch seconds.  Whole seconds elapsed since the last set
    /// are added to the set value.
    pub fn now_utc(&self, uptime_ms: u64) -> i64 {
        let elapsed = uptime_ms.saturating_sub(self.base_uptime_ms) / 1000;
        self.base_utc.saturating_add(elapsed as i64)
    }

    /// Re-anchor the clock from a client's *local* epoch seconds.
    /// Returns the stored UTC value.
    pub fn set_from_local(&mut self, local: i64, uptime_ms: u64) -> Result<i64, RequestError> {
        if !(0..=MAX_LOCAL_EPOCH).contains(&local) {
            return Err(RequestError::TimestampOutOfRange);
        }
        let utc = self.tz.to_utc(local);
        self.base_utc = utc;
        self.base_uptime_ms = uptime_ms;
        Ok(utc)
    }

    /// Current (local epoch, summer time flag).
    pub fn now_local(&self, uptime_ms: u64) -> (i64, bool) {
        self.tz.to_local(self.now_utc(uptime_ms))
    }

    /// Canonical timestamp string for "now".
    pub fn timestamp(&self, uptime_ms: u64) -> TimestampString {
        let (local, is_dst) = self.now_local(uptime_ms);
        self.tz.format(local, is_dst)
    }
}
