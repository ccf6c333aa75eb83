use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Working-calendar policy: which weekdays count and where the two daily
/// shifts start and end. The lunch break is the gap between `morning_end`
/// and `afternoon_start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkCalendar {
    pub workdays: Vec<String>, // "Monday", "Tuesday", etc.
    pub morning_start: NaiveTime,
    pub morning_end: NaiveTime,
    pub afternoon_start: NaiveTime,
    pub afternoon_end: NaiveTime,
}

impl Default for WorkCalendar {
    /// Company-wide policy: Monday-Friday, 08:30-12:00 and 13:00-17:30.
    fn default() -> Self {
        Self {
            workdays: vec![
                "Monday".to_string(),
                "Tuesday".to_string(),
                "Wednesday".to_string(),
                "Thursday".to_string(),
                "Friday".to_string(),
            ],
            morning_start: NaiveTime::from_hms_opt(8, 30, 0).unwrap_or_default(),
            morning_end: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            afternoon_start: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or_default(),
            afternoon_end: NaiveTime::from_hms_opt(17, 30, 0).unwrap_or_default(),
        }
    }
}

impl WorkCalendar {
    /// Parse a calendar from its JSON representation.
    pub fn parse(json_str: &str) -> Result<WorkCalendar, ConfigError> {
        let calendar: WorkCalendar = serde_json::from_str(json_str)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        calendar.validate()?;
        Ok(calendar)
    }

    /// Validate that the calendar can drive the deadline engine: at least
    /// one work day, known day names, and strictly ordered shift boundaries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workdays.is_empty() {
            return Err(ConfigError::EmptyWorkWeek);
        }
        for day in &self.workdays {
            if !KNOWN_DAYS.contains(&day.as_str()) {
                return Err(ConfigError::UnknownWorkday(day.clone()));
            }
        }
        if self.morning_start >= self.morning_end
            || self.morning_end > self.afternoon_start
            || self.afternoon_start >= self.afternoon_end
        {
            return Err(ConfigError::MisorderedShifts);
        }
        Ok(())
    }

    pub fn is_workday(&self, weekday: Weekday) -> bool {
        let day_name = day_name(weekday);
        self.workdays.iter().any(|d| d == day_name)
    }

    /// Length of one business day in working hours (morning + afternoon).
    pub fn hours_per_day(&self) -> f64 {
        let morning = (self.morning_end - self.morning_start).num_seconds();
        let afternoon = (self.afternoon_end - self.afternoon_start).num_seconds();
        (morning + afternoon) as f64 / 3600.0
    }
}

const KNOWN_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Work week must contain at least one day")]
    EmptyWorkWeek,

    #[error("Unknown work day: {0}")]
    UnknownWorkday(String),

    #[error("Shift boundaries must be ordered: morning start < morning end <= afternoon start < afternoon end")]
    MisorderedShifts,

    #[error("Invalid work calendar format: {0}")]
    InvalidFormat(String),
}
