use crate::config::{ConfigError, WorkCalendar};
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};

/// Where a timestamp sits relative to the working calendar. One slot is
/// resolved per loop iteration; every non-working slot has a single
/// forward transition, which keeps the termination argument visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalendarSlot {
    OffDay,
    BeforeShift,
    Lunch,
    AfterShift,
    Morning,
    Afternoon,
}

/// Advances timestamps forward by working hours over an injected
/// [`WorkCalendar`], skipping off days, pre-shift hours, the lunch break,
/// and post-shift hours.
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    calendar: WorkCalendar,
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self {
            calendar: WorkCalendar::default(),
        }
    }
}

// Residue below this is treated as fully consumed.
const EPSILON: f64 = 1e-9;

impl BusinessCalendar {
    /// Build an engine over a validated calendar. An unvalidated calendar
    /// (empty work week, inverted shifts) could make `advance` loop forever,
    /// so bad configurations are rejected here.
    pub fn new(calendar: WorkCalendar) -> Result<Self, ConfigError> {
        calendar.validate()?;
        Ok(Self { calendar })
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    /// Working hours in one business day under this calendar.
    pub fn hours_per_day(&self) -> f64 {
        self.calendar.hours_per_day()
    }

    /// Advance `start` forward by `hours` working hours.
    ///
    /// Non-positive `hours` still normalizes `start` onto the calendar:
    /// the result is the first working instant at or after `start`.
    /// Snapping out of a non-working slot preserves the seconds field;
    /// landing exactly on a shift boundary rolls to the next shift start.
    pub fn advance(&self, start: NaiveDateTime, hours: f64) -> NaiveDateTime {
        let cal = &self.calendar;
        let mut current = start;
        let mut hours_left = hours.max(0.0);

        loop {
            match self.slot(current) {
                CalendarSlot::OffDay => {
                    current += Duration::days(1);
                    continue;
                }
                CalendarSlot::BeforeShift => {
                    current = snap_to(current, cal.morning_start);
                }
                CalendarSlot::Lunch => {
                    current = snap_to(current, cal.afternoon_start);
                }
                CalendarSlot::AfterShift => {
                    current = snap_to(current + Duration::days(1), cal.morning_start);
                    continue;
                }
                CalendarSlot::Morning | CalendarSlot::Afternoon => {}
            }

            if hours_left <= EPSILON {
                return current;
            }

            let shift_end = match self.slot(current) {
                CalendarSlot::Morning => cal.morning_end,
                _ => cal.afternoon_end,
            };
            let available = (shift_end - current.time()).num_seconds() as f64 / 3600.0;
            let to_add = available.min(hours_left);

            current = add_fractional_hours(current, to_add);
            hours_left -= to_add;

            // Landing exactly on a boundary rolls straight into the next
            // shift so the result never sits on 12:00:00 or 17:30:00.
            if current.time() == cal.morning_end {
                current = NaiveDateTime::new(current.date(), cal.afternoon_start);
            } else if current.time() == cal.afternoon_end {
                current = NaiveDateTime::new(
                    current.date() + Duration::days(1),
                    cal.morning_start,
                );
            }
        }
    }

    fn slot(&self, t: NaiveDateTime) -> CalendarSlot {
        let cal = &self.calendar;
        if !cal.is_workday(t.weekday()) {
            return CalendarSlot::OffDay;
        }
        let time = t.time();
        if time < cal.morning_start {
            CalendarSlot::BeforeShift
        } else if time < cal.morning_end {
            CalendarSlot::Morning
        } else if time < cal.afternoon_start {
            CalendarSlot::Lunch
        } else if time < cal.afternoon_end {
            CalendarSlot::Afternoon
        } else {
            CalendarSlot::AfterShift
        }
    }
}

/// Move `t` to `target`'s hour and minute, keeping the seconds field.
fn snap_to(t: NaiveDateTime, target: NaiveTime) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(target.hour(), target.minute(), t.time().second())
        .unwrap_or(target);
    NaiveDateTime::new(t.date(), time)
}

/// Add a fractional hour count decomposed into whole hours, whole minutes,
/// then rounded seconds. Applying the parts sequentially reproduces the
/// deadline engine's second-level rounding.
fn add_fractional_hours(t: NaiveDateTime, hours: f64) -> NaiveDateTime {
    let whole_hours = hours.trunc();
    let frac_minutes = (hours - whole_hours) * 60.0;
    let whole_minutes = frac_minutes.trunc();
    let seconds = ((frac_minutes - whole_minutes) * 60.0).round();

    t + Duration::hours(whole_hours as i64)
        + Duration::minutes(whole_minutes as i64)
        + Duration::seconds(seconds as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    // 2024-01-08 is a Monday.

    #[test]
    fn test_zero_hours_in_shift_is_identity() {
        let calendar = BusinessCalendar::default();
        let t = dt(2024, 1, 8, 10, 15, 42);
        assert_eq!(calendar.advance(t, 0.0), t);
    }

    #[test]
    fn test_zero_hours_normalizes_before_shift() {
        let calendar = BusinessCalendar::default();
        // Seconds field survives the snap
        assert_eq!(
            calendar.advance(dt(2024, 1, 8, 7, 45, 20), 0.0),
            dt(2024, 1, 8, 8, 30, 20)
        );
    }

    #[test]
    fn test_zero_hours_normalizes_lunch() {
        let calendar = BusinessCalendar::default();
        assert_eq!(
            calendar.advance(dt(2024, 1, 8, 12, 30, 0), 0.0),
            dt(2024, 1, 8, 13, 0, 0)
        );
    }

    #[test]
    fn test_zero_hours_after_shift_rolls_to_next_morning() {
        let calendar = BusinessCalendar::default();
        assert_eq!(
            calendar.advance(dt(2024, 1, 8, 18, 0, 5), 0.0),
            dt(2024, 1, 9, 8, 30, 5)
        );
    }

    #[test]
    fn test_zero_hours_on_saturday_rolls_to_monday() {
        let calendar = BusinessCalendar::default();
        // Time-of-day is kept while skipping the weekend
        assert_eq!(
            calendar.advance(dt(2024, 1, 13, 10, 15, 0), 0.0),
            dt(2024, 1, 15, 10, 15, 0)
        );
    }

    #[test]
    fn test_fractional_advance_within_shift() {
        let calendar = BusinessCalendar::default();
        assert_eq!(
            calendar.advance(dt(2024, 1, 8, 8, 30, 0), 0.25),
            dt(2024, 1, 8, 8, 45, 0)
        );
    }

    #[test]
    fn test_advance_across_lunch() {
        let calendar = BusinessCalendar::default();
        // 1h reaches noon exactly, the remaining 0.5h resumes at 13:00
        assert_eq!(
            calendar.advance(dt(2024, 1, 8, 11, 0, 0), 1.5),
            dt(2024, 1, 8, 13, 30, 0)
        );
    }

    #[test]
    fn test_landing_on_shift_close_rolls_forward() {
        let calendar = BusinessCalendar::default();
        // Exactly 4.5h from 13:00 lands on 17:30, which is not a working instant
        assert_eq!(
            calendar.advance(dt(2024, 1, 8, 13, 0, 0), 4.5),
            dt(2024, 1, 9, 8, 30, 0)
        );
    }

    #[test]
    fn test_rejects_unvalidated_calendar() {
        let calendar = WorkCalendar {
            workdays: vec![],
            ..WorkCalendar::default()
        };
        assert!(BusinessCalendar::new(calendar).is_err());
    }
}
