use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ===== SLA Request =====

/// One entity's SLA clock: when it started and how many business days it
/// is allowed to run. `reference_time` is the upstream entity's
/// closed/finalized timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaRequest {
    pub id: String,
    pub reference_time: NaiveDateTime,
    pub limit_business_days: i64,
    pub finished: bool,
}

impl SlaRequest {
    pub fn new(reference_time: NaiveDateTime, limit_business_days: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            reference_time,
            limit_business_days,
            finished: false,
        }
    }

    pub fn finished(reference_time: NaiveDateTime, limit_business_days: i64) -> Self {
        Self {
            finished: true,
            ..Self::new(reference_time, limit_business_days)
        }
    }
}

// ===== SLA Result =====

/// Derived deadline and urgency stage. Recomputed on demand from the
/// request and the current clock; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaResult {
    pub expires_at: NaiveDateTime,
    pub stage: UrgencyStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyStage {
    OnTrack,
    AtRisk,
    Finished,
    Overdue,
}

impl std::fmt::Display for UrgencyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrgencyStage::OnTrack => write!(f, "on_track"),
            UrgencyStage::AtRisk => write!(f, "at_risk"),
            UrgencyStage::Finished => write!(f, "finished"),
            UrgencyStage::Overdue => write!(f, "overdue"),
        }
    }
}

impl std::str::FromStr for UrgencyStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on_track" => Ok(UrgencyStage::OnTrack),
            "at_risk" => Ok(UrgencyStage::AtRisk),
            "finished" => Ok(UrgencyStage::Finished),
            "overdue" => Ok(UrgencyStage::Overdue),
            _ => Err(format!("Invalid urgency stage: {}", s)),
        }
    }
}

// ===== SLA Policy =====

/// Per-entity-type deadline policy. The limit is a duration string in
/// business days, e.g. "3d".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaPolicy {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub resolution_limit: String, // Format: "1d", "3d"
}

impl SlaPolicy {
    pub fn new(name: String, description: Option<String>, resolution_limit: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            resolution_limit,
        }
    }
}

// ===== Duration Parsing Utility =====

use regex::Regex;
use std::sync::OnceLock;

/// Parse a business-day limit string like "1d" or "3d" into a day count.
pub fn parse_limit_days(limit_str: &str) -> Result<i64, String> {
    static LIMIT_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = LIMIT_REGEX.get_or_init(|| Regex::new(r"^(\d+)d$").expect("Invalid limit regex"));

    let caps = re.captures(limit_str).ok_or_else(|| {
        format!(
            "Invalid limit format: {}. Expected format: <number>d",
            limit_str
        )
    })?;

    let days: i64 = caps[1]
        .parse()
        .map_err(|_| format!("Invalid number in limit: {}", &caps[1]))?;

    if days <= 0 {
        return Err("Limit must be greater than 0 business days".to_string());
    }

    Ok(days)
}
