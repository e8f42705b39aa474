use crate::error::Result;
use crate::fetch::{fetch_and_store, ProfileFetcher};
use crate::store::ProfileStore;
use crate::tenure::describe_tenure;
use crate::types::{ProfileRecord, StartDate};
use chrono::NaiveDate;

/// Popover attributes for one chat user.
///
/// Fetching is an explicit effect (`on_display`) separate from rendering, so
/// the view can be rendered any number of times without side effects.
#[derive(Debug, Clone)]
pub struct ProfileAttributeView {
    identifier: String,
    fetched: bool,
}

impl ProfileAttributeView {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fetched: false,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Fetch the profile the first time the view is shown.
    ///
    /// Returns `Ok(true)` if a fetch was issued. A failed fetch is returned to
    /// the caller and the next display tries again.
    pub async fn on_display<F>(&mut self, fetcher: &F, store: &ProfileStore) -> Result<bool>
    where
        F: ProfileFetcher + ?Sized,
    {
        if self.fetched {
            return Ok(false);
        }
        fetch_and_store(fetcher, store, &self.identifier).await?;
        self.fetched = true;
        Ok(true)
    }

    /// Rendered lines, or `None` while nothing is known about the user or the
    /// directory has no record of them.
    pub fn render(&self, store: &ProfileStore, today: NaiveDate) -> Option<Vec<String>> {
        let cache = store.snapshot();
        cache
            .profile(&self.identifier)
            .map(|profile| render_profile(profile, today))
    }
}

/// Format a profile as popover lines, with tenure measured up to `today`.
pub fn render_profile(profile: &ProfileRecord, today: NaiveDate) -> Vec<String> {
    let description = match profile.department.as_deref() {
        Some(department) if !department.is_empty() => {
            format!("{} ({})", profile.job_title, department)
        }
        _ => profile.job_title.clone(),
    };

    let manager = match profile.manager.as_deref() {
        Some(manager) if !manager.is_empty() => format!("@{}", manager),
        _ => "(unknown manager)".to_string(),
    };

    let tenure = match profile.start_date() {
        StartDate::Known(start) => describe_tenure(start, today),
        StartDate::Unknown => "(unknown)".to_string(),
    };

    vec![
        format!("👤 {}", description),
        format!("⬆️ {}", manager),
        format!("🗓 {}", tenure),
        format!("📞 {}", profile.phone),
        format!(
            "↪ <a href={} target=\"_blank\">Pingboard profile</a>",
            profile.url
        ),
    ]
}
