use crate::{
    config::ConfigError,
    models::{parse_limit_days, SlaPolicy, SlaRequest, SlaResult, UrgencyStage},
    services::business_calendar::BusinessCalendar,
};
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SlaError {
    #[error("Limit must be a positive number of business days, got {0}")]
    NonPositiveLimit(i64),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid limit format: {0}")]
    InvalidLimitFormat(String),
}

/// Computes SLA deadlines over a business calendar and classifies requests
/// into urgency stages.
#[derive(Debug, Clone, Default)]
pub struct SlaService {
    calendar: BusinessCalendar,
}

impl SlaService {
    pub fn new(calendar: BusinessCalendar) -> Self {
        Self { calendar }
    }

    pub fn with_calendar(calendar: crate::config::WorkCalendar) -> Result<Self, ConfigError> {
        Ok(Self {
            calendar: BusinessCalendar::new(calendar)?,
        })
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    /// Deadline for a clock that started at `reference_time` and runs for
    /// `limit_business_days` business days.
    pub fn deadline(
        &self,
        reference_time: NaiveDateTime,
        limit_business_days: i64,
    ) -> Result<NaiveDateTime, SlaError> {
        if limit_business_days <= 0 {
            return Err(SlaError::NonPositiveLimit(limit_business_days));
        }
        let sla_hours = limit_business_days as f64 * self.calendar.hours_per_day();
        Ok(self.calendar.advance(reference_time, sla_hours))
    }

    /// Classify a request against the clock reading `now`.
    ///
    /// Finished requests are always `Finished`. Otherwise the stage compares
    /// `now` with the deadline and with a one-business-day window on either
    /// side. The overdue grace window is measured from the original
    /// reference time, not from the deadline; callers that change this
    /// change every displayed urgency in the console.
    pub fn classify(&self, request: &SlaRequest, now: NaiveDateTime) -> Result<SlaResult, SlaError> {
        let expires_at = self.deadline(request.reference_time, request.limit_business_days)?;
        let day = self.calendar.hours_per_day();

        let stage = if request.finished {
            UrgencyStage::Finished
        } else if now > expires_at {
            let grace_end = self.calendar.advance(request.reference_time, day);
            if now < grace_end {
                UrgencyStage::AtRisk
            } else {
                UrgencyStage::Overdue
            }
        } else {
            let lookahead = self.calendar.advance(now, day);
            if lookahead < expires_at {
                UrgencyStage::OnTrack
            } else {
                UrgencyStage::AtRisk
            }
        };

        debug!(
            request_id = %request.id,
            %expires_at,
            %stage,
            "Classified SLA request"
        );

        Ok(SlaResult { expires_at, stage })
    }

    /// Classify against the host's local clock, read once per call.
    pub fn classify_now(&self, request: &SlaRequest) -> Result<SlaResult, SlaError> {
        self.classify(request, chrono::Local::now().naive_local())
    }

    /// Build a request from a policy, validating its limit string.
    pub fn apply_policy(
        &self,
        policy: &SlaPolicy,
        reference_time: NaiveDateTime,
    ) -> Result<SlaRequest, SlaError> {
        let limit_days =
            parse_limit_days(&policy.resolution_limit).map_err(SlaError::InvalidLimitFormat)?;

        let request = SlaRequest::new(reference_time, limit_days);
        debug!(
            policy = %policy.name,
            request_id = %request.id,
            limit_days,
            "Applied SLA policy"
        );
        Ok(request)
    }
}

/// Parse an upstream RFC 3339 timestamp into the local wall-clock value the
/// calendar arithmetic works in. Unparseable input is rejected here rather
/// than fed to the advance loop.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, SlaError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.naive_local())
        .map_err(|e| SlaError::InvalidTimestamp(format!("{}: {}", s, e)))
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

    #[test]
    fn test_deadline_rejects_non_positive_limit() {
        let service = SlaService::default();
        let reference = dt(2024, 1, 8, 9, 0, 0);
        assert!(matches!(
            service.deadline(reference, 0),
            Err(SlaError::NonPositiveLimit(0))
        ));
        assert!(matches!(
            service.deadline(reference, -3),
            Err(SlaError::NonPositiveLimit(-3))
        ));
    }

    #[test]
    fn test_apply_policy_parses_limit() {
        let service = SlaService::default();
        let policy = SlaPolicy::new("purchase-request".to_string(), None, "3d".to_string());
        let request = service
            .apply_policy(&policy, dt(2024, 1, 8, 9, 0, 0))
            .unwrap();
        assert_eq!(request.limit_business_days, 3);
        assert!(!request.finished);
    }

    #[test]
    fn test_apply_policy_rejects_bad_limit() {
        let service = SlaService::default();
        let policy = SlaPolicy::new("stock-request".to_string(), None, "4h".to_string());
        assert!(matches!(
            service.apply_policy(&policy, dt(2024, 1, 8, 9, 0, 0)),
            Err(SlaError::InvalidLimitFormat(_))
        ));
    }

    #[test]
    fn test_parse_timestamp_accepts_rfc3339() {
        let parsed = parse_timestamp("2024-01-08T09:00:00+01:00").unwrap();
        assert_eq!(parsed, dt(2024, 1, 8, 9, 0, 0));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("last tuesday"),
            Err(SlaError::InvalidTimestamp(_))
        ));
    }
}
