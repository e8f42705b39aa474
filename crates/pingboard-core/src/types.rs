use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A directory profile as served by the profile endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRecord {
    /// Employment start date components. Zero in any of them means unknown.
    #[serde(default)]
    pub start_year: i32,
    #[serde(default)]
    pub start_month: u32,
    #[serde(default)]
    pub start_day: u32,

    #[serde(default)]
    pub job_title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Chat username of the manager.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,

    #[serde(default)]
    pub phone: String,

    /// Link to the profile page in the directory.
    #[serde(default)]
    pub url: String,
}

/// Employment start date, with "unknown" as its own case rather than a zero date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDate {
    Known(NaiveDate),
    Unknown,
}

impl ProfileRecord {
    pub fn start_date(&self) -> StartDate {
        if self.start_year == 0 || self.start_month == 0 || self.start_day == 0 {
            return StartDate::Unknown;
        }
        NaiveDate::from_ymd_opt(self.start_year, self.start_month, self.start_day)
            .map(StartDate::Known)
            .unwrap_or(StartDate::Unknown)
    }

    pub fn with_start_date(mut self, start: StartDate) -> Self {
        use chrono::Datelike;
        match start {
            StartDate::Known(date) => {
                self.start_year = date.year();
                self.start_month = date.month();
                self.start_day = date.day();
            }
            StartDate::Unknown => {
                self.start_year = 0;
                self.start_month = 0;
                self.start_day = 0;
            }
        }
        self
    }
}

/// Outcome of a completed fetch. `profile: None` is a confirmed absence, not
/// a pending request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchResult {
    pub profile: Option<ProfileRecord>,
}

impl FetchResult {
    pub fn found(profile: ProfileRecord) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    pub fn absent() -> Self {
        Self { profile: None }
    }
}

/// Which chat user attribute identifies a profile.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    #[default]
    Username,
    Email,
}

impl IdentifierKind {
    /// Query parameter name used by the profile endpoint.
    pub fn as_param(&self) -> &'static str {
        match self {
            IdentifierKind::Username => "username",
            IdentifierKind::Email => "email",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for IdentifierKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "username" => Ok(IdentifierKind::Username),
            "email" => Ok(IdentifierKind::Email),
            other => Err(format!(
                "Invalid identifier kind '{}': expected 'username' or 'email'",
                other
            )),
        }
    }
}
