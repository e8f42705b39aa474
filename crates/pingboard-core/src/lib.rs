//! Directory profile attributes for chat user popovers.
//!
//! Pure tenure arithmetic, a per-session profile cache with a single reducer,
//! and the fetch-and-store flow that fills it. Network access lives behind
//! [`ProfileFetcher`]; see the `pingboard-client` crate for the HTTP version.
pub mod error;
pub mod fetch;
pub mod store;
pub mod tenure;
pub mod types;
pub mod view;

pub use error::{FetchError, Result};
pub use fetch::{fetch_and_store, ProfileFetcher};
pub use store::{CacheEntry, ProfileAction, ProfileCache, ProfileStore};
pub use tenure::{describe_tenure, Tenure};
pub use types::{FetchResult, IdentifierKind, ProfileRecord, StartDate};
pub use view::{render_profile, ProfileAttributeView};
