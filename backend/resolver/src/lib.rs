//! # Content Resolution
//!
//! Resolves site content from the API with graceful degradation to the fallback catalog.
//!
//! ## Flow
//!
//! 1. Caller asks the [`Resolver`] for a content kind
//! 2. The kind's cache slot answers immediately if a previous fetch succeeded
//! 3. Otherwise one request goes to the API, shared by every concurrent caller
//! 4. The payload is merged over the catalog by slug (see [`reconcile`]) and stored
//! 5. Transport errors, non-2xx responses, the insights timeout and malformed payloads are
//!    logged and answered with the catalog slice instead; nothing is stored
//!
//! Contact submissions never fail on the network either: an undelivered form reports success
//! after a short delay, so only validation problems reach the submitter.
//!
//! ## Known Gaps
//!
//! Catalog items the API omits are always shown. The API has no way to say an item was
//! deleted rather than never entered.
use std::{fmt, str::FromStr, sync::Arc};

use catalog::{
    Catalog,
    models::{ContactSubmission, Employee, Insight, Partner, Photo, Pillar, SystemStatus},
    slug::slug,
};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub mod cache;
pub mod config;
pub mod contact;
pub mod error;
pub mod fetcher;
pub mod reconcile;

use cache::{ContentCache, Resolved, Slot};
use config::Config;
use contact::{ContactOutcome, validate};
use error::{ContactError, FetchError, UnknownKind};
use fetcher::ContentClient;
use reconcile::{Reconcile, merge};

pub const STATUS_ENDPOINT: &str = "/api/status";
pub const CONTACT_ENDPOINT: &str = "/api/contact";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Pillars,
    Insights,
    Partners,
    Photos,
    Employees,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Pillars,
        ContentKind::Insights,
        ContentKind::Partners,
        ContentKind::Photos,
        ContentKind::Employees,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Pillars => "pillars",
            ContentKind::Insights => "insights",
            ContentKind::Partners => "partners",
            ContentKind::Photos => "photos",
            ContentKind::Employees => "employees",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            ContentKind::Pillars => "/api/pillars",
            ContentKind::Insights => "/api/insights",
            ContentKind::Partners => "/api/partners",
            ContentKind::Photos => "/api/photos",
            ContentKind::Employees => "/api/admin/employees",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = slug(s);

        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// A content type the resolver can fetch, merge and cache.
pub trait Content: Reconcile + DeserializeOwned + Send + Sync + 'static {
    const KIND: ContentKind;

    fn fallback(catalog: &Catalog) -> &[Self];

    fn slot(cache: &ContentCache) -> &Slot<Self>;
}

impl Content for Pillar {
    const KIND: ContentKind = ContentKind::Pillars;

    fn fallback(catalog: &Catalog) -> &[Self] {
        &catalog.pillars
    }

    fn slot(cache: &ContentCache) -> &Slot<Self> {
        &cache.pillars
    }
}

impl Content for Insight {
    const KIND: ContentKind = ContentKind::Insights;

    fn fallback(catalog: &Catalog) -> &[Self] {
        &catalog.insights
    }

    fn slot(cache: &ContentCache) -> &Slot<Self> {
        &cache.insights
    }
}

impl Content for Partner {
    const KIND: ContentKind = ContentKind::Partners;

    fn fallback(catalog: &Catalog) -> &[Self] {
        &catalog.partners
    }

    fn slot(cache: &ContentCache) -> &Slot<Self> {
        &cache.partners
    }
}

impl Content for Photo {
    const KIND: ContentKind = ContentKind::Photos;

    fn fallback(catalog: &Catalog) -> &[Self] {
        &catalog.photos
    }

    fn slot(cache: &ContentCache) -> &Slot<Self> {
        &cache.photos
    }
}

impl Content for Employee {
    const KIND: ContentKind = ContentKind::Employees;

    fn fallback(catalog: &Catalog) -> &[Self] {
        &catalog.employees
    }

    fn slot(cache: &ContentCache) -> &Slot<Self> {
        &cache.employees
    }
}

struct Inner {
    config: Config,
    client: ContentClient,
    catalog: Catalog,
    cache: ContentCache,
}

impl Inner {
    async fn fetch_merged<T: Content>(&self) -> Result<Vec<T>, FetchError> {
        let kind = T::KIND;
        let remote: Vec<T> = self
            .client
            .fetch_list(kind.endpoint(), self.config.timeout_for(kind))
            .await?;

        debug!("Fetched {} remote {kind}", remote.len());

        Ok(merge(T::fallback(&self.catalog), &remote))
    }
}

/// Content resolution context. Cheap to clone; clones share one cache.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<Inner>,
}

impl Resolver {
    pub fn new(config: Config) -> Self {
        Self::with_catalog(config, Catalog::embedded().clone())
    }

    pub fn with_catalog(config: Config, catalog: Catalog) -> Self {
        info!(
            "Resolving content from {} with catalog v{}",
            config.api_base, catalog.version
        );

        Self {
            inner: Arc::new(Inner {
                client: ContentClient::new(&config.api_base),
                config,
                catalog,
                cache: ContentCache::new(),
            }),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub async fn resolve<T: Content>(&self) -> Resolved<T> {
        let inner = self.inner.clone();

        let fetched = T::slot(&self.inner.cache)
            .get_or_fetch(move || async move { inner.fetch_merged::<T>().await }.boxed())
            .await;

        fetched.unwrap_or_else(|e| {
            warn!("Serving catalog {}: {e}", T::KIND);
            Arc::new(T::fallback(&self.inner.catalog).to_vec())
        })
    }

    pub async fn pillars(&self) -> Resolved<Pillar> {
        self.resolve().await
    }

    pub async fn insights(&self) -> Resolved<Insight> {
        self.resolve().await
    }

    pub async fn partners(&self) -> Resolved<Partner> {
        self.resolve().await
    }

    pub async fn photos(&self) -> Resolved<Photo> {
        self.resolve().await
    }

    pub async fn employees(&self) -> Resolved<Employee> {
        self.resolve().await
    }

    /// Live status laid over the catalog default. Never cached.
    pub async fn status(&self) -> SystemStatus {
        let fallback = &self.inner.catalog.status;

        match self
            .inner
            .client
            .fetch_one::<SystemStatus>(STATUS_ENDPOINT, None)
            .await
        {
            Ok(remote) => fallback.overlay(&remote),
            Err(e) => {
                warn!("Serving catalog status: {e}");
                fallback.clone()
            }
        }
    }

    pub async fn submit_contact(
        &self,
        form: &ContactSubmission,
    ) -> Result<ContactOutcome, ContactError> {
        validate(form)?;

        match self.inner.client.post_json(CONTACT_ENDPOINT, form).await {
            Ok(()) => {
                info!("Contact submission delivered");
                Ok(ContactOutcome::Delivered)
            }
            Err(e) => {
                warn!("Contact submission not delivered, simulating success: {e}");
                sleep(self.inner.config.contact_fallback_delay).await;
                Ok(ContactOutcome::Simulated)
            }
        }
    }

    pub fn is_cached(&self, kind: ContentKind) -> bool {
        self.inner.cache.is_cached(kind)
    }

    /// Drops the stored result for `kind` so the next read goes back to the API.
    pub fn invalidate(&self, kind: ContentKind) {
        info!("Invalidating cached {kind}");
        self.inner.cache.invalidate(kind);
    }

    pub fn invalidate_all(&self) {
        info!("Invalidating all cached content");
        self.inner.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::ContentKind;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.as_str().parse::<ContentKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_kind_parsing_is_lenient() {
        assert_eq!("Pillars".parse::<ContentKind>(), Ok(ContentKind::Pillars));
        assert_eq!(" insights ".parse::<ContentKind>(), Ok(ContentKind::Insights));
        assert!("services".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_employee_endpoint_is_admin_scoped() {
        assert_eq!(ContentKind::Employees.endpoint(), "/api/admin/employees");
    }
}
