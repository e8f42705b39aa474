pub mod pingboard;
mod refresh;

pub use pingboard::{Company, DirectoryUser};
pub use refresh::DirectoryRefresher;

use chrono::{DateTime, NaiveDate, Utc};
use pingboard_core::{IdentifierKind, ProfileRecord, StartDate};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// One complete pull of the company directory, indexed for lookup.
#[derive(Debug, Clone)]
pub struct Directory {
    pub company: Company,
    pub refreshed_at: DateTime<Utc>,
    by_email: HashMap<String, ProfileRecord>,
    by_username: HashMap<String, ProfileRecord>,
}

/// Chat username for a directory email: the lowercase local part.
pub fn username_for_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some(local.to_string())
}

fn parse_start_date(raw: &str) -> StartDate {
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(StartDate::Known)
        .unwrap_or(StartDate::Unknown)
}

impl Directory {
    pub fn build(company: Company, users: Vec<DirectoryUser>) -> Self {
        let usernames: HashMap<&str, String> = users
            .iter()
            .filter_map(|u| username_for_email(&u.email).map(|name| (u.id.as_str(), name)))
            .collect();

        let mut by_email = HashMap::new();
        let mut by_username = HashMap::new();

        for user in &users {
            let email = user.email.trim().to_lowercase();
            if email.is_empty() {
                warn!("Skipping Pingboard user {} without email", user.id);
                continue;
            }

            let start = parse_start_date(&user.start_date);
            if start == StartDate::Unknown {
                warn!(
                    "Failed to parse start date '{}' for {}",
                    user.start_date, email
                );
            }

            let manager = user
                .reports_to_id
                .as_deref()
                .and_then(|id| usernames.get(id))
                .cloned();

            let profile = ProfileRecord {
                job_title: user.job_title.clone(),
                department: user.department.clone().filter(|d| !d.is_empty()),
                manager,
                phone: user.phone.clone(),
                url: format!("https://{}.pingboard.com/users/{}", company.domain, user.id),
                ..Default::default()
            }
            .with_start_date(start);

            if let Some(username) = usernames.get(user.id.as_str()) {
                by_username.insert(username.clone(), profile.clone());
            }
            by_email.insert(email, profile);
        }

        Self {
            company,
            refreshed_at: Utc::now(),
            by_email,
            by_username,
        }
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, kind: IdentifierKind, identifier: &str) -> Option<&ProfileRecord> {
        let key = identifier.trim().to_lowercase();
        match kind {
            IdentifierKind::Email => self.by_email.get(&key),
            IdentifierKind::Username => self.by_username.get(&key),
        }
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

/// The current directory snapshot, shared between the refresher and handlers.
#[derive(Clone, Default)]
pub struct SharedDirectory {
    inner: Arc<RwLock<Option<Arc<Directory>>>>,
}

impl SharedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first successful refresh.
    pub async fn current(&self) -> Option<Arc<Directory>> {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, directory: Directory) {
        *self.inner.write().await = Some(Arc::new(directory));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, email: &str, start: &str, manager: Option<&str>) -> DirectoryUser {
        DirectoryUser {
            id: id.into(),
            start_date: start.into(),
            email: email.into(),
            phone: "555".into(),
            job_title: format!("Title {}", id),
            reports_to_id: manager.map(String::from),
            department: None,
        }
    }

    fn acme() -> Company {
        Company {
            name: "Acme".into(),
            domain: "acme".into(),
        }
    }

    #[test]
    fn test_username_for_email() {
        assert_eq!(username_for_email("J.Smith@Acme.test").as_deref(), Some("j.smith"));
        assert_eq!(username_for_email("no-at-sign"), None);
        assert_eq!(username_for_email("@acme.test"), None);
    }

    #[test]
    fn test_build_indexes_and_resolves() {
        let directory = Directory::build(
            acme(),
            vec![
                user("1", "Boss@Acme.test", "2005-01-15", None),
                user("2", "trader@acme.test", "2010-07-10T00:00:00Z", Some("1")),
                user("3", "orphan@acme.test", "", Some("99")),
            ],
        );

        assert_eq!(directory.len(), 3);

        let trader = directory.lookup(IdentifierKind::Username, "Trader").unwrap();
        assert_eq!(trader.manager.as_deref(), Some("boss"));
        assert_eq!(trader.url, "https://acme.pingboard.com/users/2");
        assert_eq!(
            trader.start_date(),
            StartDate::Known(NaiveDate::from_ymd_opt(2010, 7, 10).unwrap())
        );

        let boss = directory.lookup(IdentifierKind::Email, "BOSS@acme.test").unwrap();
        assert!(boss.manager.is_none());

        let orphan = directory.lookup(IdentifierKind::Email, "orphan@acme.test").unwrap();
        assert!(orphan.manager.is_none());
        assert_eq!(orphan.start_date(), StartDate::Unknown);
    }

    #[test]
    fn test_lookup_misses() {
        let directory = Directory::build(acme(), vec![user("1", "a@acme.test", "2020-01-01", None)]);
        assert!(directory.lookup(IdentifierKind::Username, "b").is_none());
        assert!(directory.lookup(IdentifierKind::Email, "a").is_none());
    }

    #[tokio::test]
    async fn test_shared_directory_swap() {
        let shared = SharedDirectory::new();
        assert!(shared.current().await.is_none());

        shared.replace(Directory::build(acme(), vec![])).await;
        let current = shared.current().await.unwrap();
        assert!(current.is_empty());
        assert_eq!(current.company.name, "Acme");
    }
}
