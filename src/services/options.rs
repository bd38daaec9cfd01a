//! Filter Option Provider
//!
//! Fetches the entity lists (districts, themes, practices, ...) that back
//! the filter fields, and keeps one cancel-and-replace catalog per API URL.
//!
//! ## Fetch lifecycle
//!
//! ```text
//! request(api) ─▶ debounce ─▶ valid & changed? ─▶ abort old tasks
//!                                                 generation += 1
//!                                                 spawn one fetch per resource
//! fetch done ─▶ OptionsUpdate { generation } ─▶ apply (stale generations dropped)
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{FilterOption, FilterResource, IdSet, OptionPage, is_valid_api_url};
use crate::error::Result;
use crate::helpers::Debouncer;

// ==================== Source ====================

/// External collaborator returning the entities of one resource
pub trait OptionSource: Send + Sync + 'static {
    fn fetch(
        &self,
        api: &str,
        resource: FilterResource,
    ) -> impl Future<Output = Result<Vec<FilterOption>>> + Send;
}

/// HTTP client for the Geotrek API
#[derive(Debug, Clone)]
pub struct GeotrekClient {
    http: reqwest::Client,
}

impl GeotrekClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// `{api}/{resource path}`, adding the separator when missing
    pub fn resource_url(api: &str, resource: FilterResource) -> String {
        let api = api.trim();
        if api.ends_with('/') {
            format!("{api}{}", resource.path())
        } else {
            format!("{api}/{}", resource.path())
        }
    }
}

impl OptionSource for GeotrekClient {
    async fn fetch(&self, api: &str, resource: FilterResource) -> Result<Vec<FilterOption>> {
        let url = Self::resource_url(api, resource);
        debug!(url = %url, "Fetching filter options");
        let page: OptionPage = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(page.results)
    }
}

// ==================== Catalog ====================

/// Load state of one resource list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OptionState {
    /// Not loaded yet, or a fetch is in flight
    #[default]
    Pending,
    Loaded(Vec<FilterOption>),
    /// Fetch failed; behaves as an empty list
    Failed,
}

impl OptionState {
    pub fn options(&self) -> &[FilterOption] {
        match self {
            OptionState::Loaded(options) => options,
            OptionState::Pending | OptionState::Failed => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, OptionState::Pending)
    }
}

/// Completion of one fetch task
#[derive(Debug)]
pub struct OptionsUpdate {
    pub generation: u64,
    pub resource: FilterResource,
    pub result: Result<Vec<FilterOption>>,
}

/// Option lists for the current API URL
pub struct OptionCatalog<S: OptionSource> {
    source: Arc<S>,
    api: Option<String>,
    pending_api: Option<String>,
    generation: u64,
    states: AHashMap<FilterResource, OptionState>,
    tasks: Vec<JoinHandle<()>>,
    debouncer: Debouncer,
    tx: mpsc::UnboundedSender<OptionsUpdate>,
    rx: mpsc::UnboundedReceiver<OptionsUpdate>,
}

impl<S: OptionSource> OptionCatalog<S> {
    pub fn new(source: S, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source: Arc::new(source),
            api: None,
            pending_api: None,
            generation: 0,
            states: AHashMap::new(),
            tasks: Vec::new(),
            debouncer: Debouncer::new(debounce),
            tx,
            rx,
        }
    }

    /// API URL whose lists are loaded or loading
    pub fn api(&self) -> Option<&str> {
        self.api.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The API URL changed; a fetch follows once it settles
    pub fn request(&mut self, api: &str, now: Instant) {
        self.pending_api = Some(api.trim().to_string());
        self.debouncer.trigger(now);
    }

    /// Start fetches if the debounce elapsed. Returns true when a new
    /// generation was started.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.debouncer.fire(now) {
            return false;
        }
        let Some(api) = self.pending_api.take() else {
            return false;
        };
        if !is_valid_api_url(&api) {
            debug!(api = %api, "Skipping option fetch for invalid API URL");
            return false;
        }
        if self.api.as_deref() == Some(api.as_str()) {
            return false;
        }
        self.start(api);
        true
    }

    fn start(&mut self, api: String) {
        self.abort_tasks();
        self.generation += 1;
        info!(api = %api, generation = self.generation, "Loading filter options");

        for resource in FilterResource::ALL {
            self.states.insert(resource, OptionState::Pending);
            let source = Arc::clone(&self.source);
            let tx = self.tx.clone();
            let api = api.clone();
            let generation = self.generation;
            self.tasks.push(tokio::spawn(async move {
                let result = source.fetch(&api, resource).await;
                // Receiver lives as long as the catalog
                let _ = tx.send(OptionsUpdate {
                    generation,
                    resource,
                    result,
                });
            }));
        }
        self.api = Some(api);
    }

    /// Wait for the next fetch completion
    pub async fn next_update(&mut self) -> Option<OptionsUpdate> {
        self.rx.recv().await
    }

    /// Record a fetch completion; returns false for superseded generations
    pub fn apply(&mut self, update: OptionsUpdate) -> bool {
        if update.generation != self.generation {
            debug!(
                resource = %update.resource,
                generation = update.generation,
                "Dropping stale option list"
            );
            return false;
        }
        let state = match update.result {
            Ok(options) => OptionState::Loaded(options),
            Err(e) => {
                warn!(resource = %update.resource, error = %e, "Failed to fetch filter options");
                OptionState::Failed
            }
        };
        self.states.insert(update.resource, state);
        true
    }

    pub fn state(&self, resource: FilterResource) -> &OptionState {
        static PENDING: OptionState = OptionState::Pending;
        self.states.get(&resource).unwrap_or(&PENDING)
    }

    pub fn options(&self, resource: FilterResource) -> &[FilterOption] {
        self.state(resource).options()
    }

    /// Display name of an entity, when its list is loaded
    pub fn display_name(&self, resource: FilterResource, id: u32, language: &str) -> Option<String> {
        self.options(resource)
            .iter()
            .find(|option| option.id == id)
            .map(|option| option.display_name(language))
    }

    /// Selected identifiers missing from a loaded list
    pub fn unknown_ids(&self, resource: FilterResource, selected: &IdSet) -> Vec<u32> {
        match self.state(resource) {
            OptionState::Loaded(options) => selected
                .iter()
                .filter(|id| !options.iter().any(|option| option.id == *id))
                .collect(),
            OptionState::Pending | OptionState::Failed => Vec::new(),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Cancel the pending debounce and every in-flight fetch
    pub fn shutdown(&mut self) {
        self.debouncer.cancel();
        self.pending_api = None;
        self.abort_tasks();
    }

    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl<S: OptionSource> Drop for OptionCatalog<S> {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LocalizedName;
    use crate::error::Error;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source answering from a fixed table, failing for labels
    #[derive(Default)]
    struct StaticSource {
        calls: AtomicUsize,
    }

    impl OptionSource for StaticSource {
        async fn fetch(&self, api: &str, resource: FilterResource) -> Result<Vec<FilterOption>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if resource == FilterResource::Label {
                return Err(Error::Invalid {
                    message: "labels unavailable".into(),
                });
            }
            let name = format!("{api}{}", resource.path());
            Ok(vec![
                FilterOption {
                    id: 1,
                    name: LocalizedName::Plain(name),
                },
                FilterOption {
                    id: 2,
                    name: LocalizedName::Localized(BTreeMap::from([
                        ("fr".to_string(), "Randonnée".to_string()),
                        ("en".to_string(), "Hiking".to_string()),
                    ])),
                },
            ])
        }
    }

    const API: &str = "https://a.example/api/v2/";

    async fn drain(catalog: &mut OptionCatalog<StaticSource>) {
        for _ in FilterResource::ALL {
            let update = catalog.next_update().await.expect("update");
            catalog.apply(update);
        }
    }

    #[test]
    fn resource_url_adds_separator() {
        assert_eq!(
            GeotrekClient::resource_url("https://x/api/v2", FilterResource::Practice),
            "https://x/api/v2/trek_practice"
        );
        assert_eq!(
            GeotrekClient::resource_url("https://x/api/v2/", FilterResource::Route),
            "https://x/api/v2/trek_route"
        );
    }

    #[tokio::test]
    async fn loads_every_resource_and_degrades_failures() {
        let start = Instant::now();
        let mut catalog = OptionCatalog::new(StaticSource::default(), Duration::from_millis(300));
        catalog.request(API, start);
        assert!(!catalog.poll(start));
        assert!(catalog.poll(start + Duration::from_millis(300)));
        assert!(catalog.state(FilterResource::District).is_loading());

        drain(&mut catalog).await;

        assert_eq!(catalog.options(FilterResource::District).len(), 2);
        assert_eq!(catalog.state(FilterResource::Label), &OptionState::Failed);
        assert!(catalog.options(FilterResource::Label).is_empty());
        assert_eq!(
            catalog.display_name(FilterResource::Practice, 2, "en").as_deref(),
            Some("Hiking")
        );
        assert_eq!(catalog.display_name(FilterResource::Practice, 9, "en"), None);
        assert_eq!(
            catalog.unknown_ids(FilterResource::City, &IdSet::from([1, 7])),
            vec![7]
        );
        assert!(catalog.unknown_ids(FilterResource::Label, &IdSet::from([5])).is_empty());
    }

    #[tokio::test]
    async fn invalid_or_unchanged_api_is_not_fetched() {
        let start = Instant::now();
        let mut catalog = OptionCatalog::new(StaticSource::default(), Duration::ZERO);

        catalog.request("https://a.example/api/v1/", start);
        assert!(!catalog.poll(start));

        catalog.request(API, start);
        assert!(catalog.poll(start));
        catalog.request(&format!(" {API} "), start);
        assert!(!catalog.poll(start));
        assert_eq!(catalog.generation(), 1);
    }

    #[tokio::test]
    async fn newer_api_supersedes_older_results() {
        let start = Instant::now();
        let mut catalog = OptionCatalog::new(StaticSource::default(), Duration::ZERO);
        catalog.request(API, start);
        catalog.poll(start);

        let stale = OptionsUpdate {
            generation: catalog.generation(),
            resource: FilterResource::District,
            result: Ok(Vec::new()),
        };

        catalog.request("https://b.example/api/v2/", start);
        assert!(catalog.poll(start));
        assert!(!catalog.apply(stale));

        drain(&mut catalog).await;
        let name = catalog
            .display_name(FilterResource::District, 1, "fr")
            .expect("loaded");
        assert!(name.starts_with("https://b.example/"));
    }

    #[tokio::test]
    async fn burst_of_requests_fetches_last_value_once() {
        let start = Instant::now();
        let mut catalog = OptionCatalog::new(StaticSource::default(), Duration::from_millis(300));
        catalog.request("https://a.example/api/", start);
        catalog.request("https://a.example/api/v2", start + Duration::from_millis(100));
        catalog.request(API, start + Duration::from_millis(200));

        assert!(!catalog.poll(start + Duration::from_millis(300)));
        assert!(catalog.poll(start + Duration::from_millis(500)));
        assert_eq!(catalog.api(), Some(API));
        assert_eq!(catalog.generation(), 1);
    }

    #[tokio::test]
    async fn shutdown_cancels_pending_request() {
        let start = Instant::now();
        let mut catalog = OptionCatalog::new(StaticSource::default(), Duration::from_millis(300));
        catalog.request(API, start);
        catalog.shutdown();
        assert_eq!(catalog.next_deadline(), None);
        assert!(!catalog.poll(start + Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn geotrek_client_parses_results() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/district")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"count":1,"next":null,"results":[{"id":3,"name":"Vercors"}]}"#)
            .create_async()
            .await;

        let client = GeotrekClient::new(Duration::from_secs(5)).expect("client");
        let api = format!("{}/api/v2/", server.url());
        let options = client
            .fetch(&api, FilterResource::District)
            .await
            .expect("options");

        mock.assert_async().await;
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].display_name("fr"), "Vercors");
    }

    #[tokio::test]
    async fn geotrek_client_reports_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/label")
            .with_status(500)
            .create_async()
            .await;

        let client = GeotrekClient::new(Duration::from_secs(5)).expect("client");
        let api = format!("{}/api/v2/", server.url());
        let err = client
            .fetch(&api, FilterResource::Label)
            .await
            .expect_err("server error");
        assert!(matches!(err, Error::Http { .. }));
    }
}
