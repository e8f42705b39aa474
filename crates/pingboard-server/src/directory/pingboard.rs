use crate::config::Credentials;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PingboardApiError {
    #[error("Failed to obtain {what}: {source}")]
    Request {
        what: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to obtain {what}: status {status}, body {body}")]
    Status {
        what: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response for {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to extract valid fields for {what}")]
    Invalid { what: String },
}

pub type ApiResult<T> = std::result::Result<T, PingboardApiError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(rename = "subdomain")]
    pub domain: String,
}

/// A Pingboard user with its first department resolved to a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub id: String,
    /// As sent by Pingboard, normally `YYYY-MM-DD`.
    pub start_date: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub reports_to_id: Option<String>,
    pub department: Option<String>,
}

// Wire types

/// Pingboard ids arrive as strings or numbers depending on the endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    /// `None` for empty or zero ids, which Pingboard uses for "no value".
    fn into_id(self) -> Option<String> {
        match self {
            WireId::Text(s) if s.is_empty() || s == "0" => None,
            WireId::Text(s) => Some(s),
            WireId::Number(0) => None,
            WireId::Number(n) => Some(n.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct CredentialsResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Deserialize)]
struct CompaniesResponse {
    #[serde(default)]
    companies: Vec<Company>,
}

#[derive(Deserialize)]
struct GroupResponse {
    id: WireId,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct GroupsResponse {
    #[serde(default)]
    groups: Vec<GroupResponse>,
}

#[derive(Deserialize, Default)]
struct UsersMeta {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    page_count: u32,
}

#[derive(Deserialize, Default)]
struct Meta {
    #[serde(default)]
    users: UsersMeta,
}

#[derive(Deserialize, Default)]
struct UserLinks {
    #[serde(default)]
    departments: Vec<WireId>,
}

#[derive(Deserialize)]
struct UserResponse {
    id: WireId,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    office_phone: Option<String>,
    #[serde(default)]
    job_title: Option<String>,
    #[serde(default)]
    reports_to_id: Option<WireId>,
    #[serde(default)]
    links: UserLinks,
}

#[derive(Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<UserResponse>,
    #[serde(default)]
    meta: Meta,
}

/// Authenticated client for the Pingboard REST API.
pub struct PingboardClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl PingboardClient {
    /// Exchange client credentials for an access token.
    pub async fn authenticate(
        http: reqwest::Client,
        base_url: &str,
        credentials: &Credentials,
    ) -> ApiResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let resp = http
            .post(format!("{}/oauth/token", base_url))
            .query(&[("grant_type", "client_credentials")])
            .json(&serde_json::json!({
                "client_id": credentials.client_id,
                "client_secret": credentials.client_secret,
            }))
            .send()
            .await;

        let token: CredentialsResponse = decode("token", resp).await?;
        if token.access_token.is_empty() || token.expires_in == 0 {
            return Err(PingboardApiError::Invalid {
                what: "token".into(),
            });
        }
        info!("Got Pingboard token (expires in {}s)", token.expires_in);

        Ok(Self {
            http,
            base_url,
            token: token.access_token,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        what: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await;
        decode(what, resp).await
    }

    /// The company the API credentials belong to.
    pub async fn fetch_company(&self) -> ApiResult<Company> {
        let resp: CompaniesResponse = self
            .get("companies", "/api/v2/companies/my_company", &[])
            .await?;
        let mut companies = resp.companies;
        if companies.len() != 1 {
            return Err(PingboardApiError::Invalid {
                what: "companies".into(),
            });
        }
        let company = companies.remove(0);
        info!("Got company {} with sub-domain {}", company.name, company.domain);
        Ok(company)
    }

    /// All users, page by page. Any bad page aborts the whole fetch.
    pub async fn fetch_users(&self, page_size: u32) -> ApiResult<Vec<DirectoryUser>> {
        let mut users = Vec::new();
        let mut departments: HashMap<String, Option<String>> = HashMap::new();

        let mut page = 1;
        let mut page_count = 0;
        while page_count == 0 || page <= page_count {
            let resp: UsersResponse = self
                .get(
                    "users",
                    "/api/v2/users",
                    &[
                        ("page_size", page_size.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            if resp.meta.users.page != page || resp.users.is_empty() {
                return Err(PingboardApiError::Invalid {
                    what: format!("users (page {})", page),
                });
            }
            info!("Got {} users on page {}", resp.users.len(), page);
            page_count = resp.meta.users.page_count;

            for user in resp.users {
                let Some(id) = user.id.into_id() else {
                    warn!("Skipping Pingboard user without id");
                    continue;
                };
                let department = self.resolve_department(&user.links, &mut departments).await;
                let user = DirectoryUser {
                    id,
                    start_date: user.start_date.unwrap_or_default(),
                    email: user.email.unwrap_or_default(),
                    phone: user.office_phone.unwrap_or_default(),
                    job_title: user.job_title.unwrap_or_default(),
                    reports_to_id: user.reports_to_id.and_then(WireId::into_id),
                    department,
                };
                debug!(
                    "Found Pingboard user with email {}, id {}, started {}, title {}, manager id {:?}, department {:?}",
                    user.email, user.id, user.start_date, user.job_title, user.reports_to_id, user.department
                );
                users.push(user);
            }
            page += 1;
        }

        info!("Found {} Pingboard users", users.len());
        Ok(users)
    }

    /// Name of the user's first department, if `groups/<id>` returns exactly
    /// that group. Lookups are memoized per fetch, failures included.
    async fn resolve_department(
        &self,
        links: &UserLinks,
        known: &mut HashMap<String, Option<String>>,
    ) -> Option<String> {
        let department_id = links.departments.first().cloned()?.into_id()?;
        if let Some(name) = known.get(&department_id) {
            return name.clone();
        }

        let what = format!("department {}", department_id);
        let path = format!("/api/v2/groups/{}", department_id);
        let resp = self.get::<GroupsResponse>(&what, &path, &[]).await;
        let name = match resp {
            Ok(resp) => {
                let mut groups = resp.groups;
                let matches = groups.len() == 1
                    && groups[0].id.clone().into_id().as_deref() == Some(department_id.as_str());
                if matches {
                    let name = groups.remove(0).name;
                    debug!("Found department with id {}, name {}", department_id, name);
                    Some(name)
                } else {
                    warn!("{}", PingboardApiError::Invalid { what });
                    None
                }
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        };

        known.insert(department_id, name.clone());
        name
    }
}

async fn decode<T: DeserializeOwned>(
    what: &str,
    resp: std::result::Result<reqwest::Response, reqwest::Error>,
) -> ApiResult<T> {
    let resp = resp.map_err(|source| PingboardApiError::Request {
        what: what.to_string(),
        source,
    })?;

    let status = resp.status();
    if status != reqwest::StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        return Err(PingboardApiError::Status {
            what: what.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let bytes = resp.bytes().await.map_err(|source| PingboardApiError::Request {
        what: what.to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| PingboardApiError::Decode {
        what: what.to_string(),
        source,
    })
}
