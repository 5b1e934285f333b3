//! Shared catalog client.
//!
//! Fetches the catalog document once per session and hands every caller the
//! same `Arc<Catalog>`. Callers arriving while a fetch is in flight join it
//! instead of issuing another request. A failed fetch is not cached: the
//! state drops back to idle so the next call retries.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::ACCEPT;
use tracing::{debug, info, warn};

use crate::document;
use crate::error::CatalogError;
use crate::types::Catalog;

/// Timeout for the catalog request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Boxed future returned by [`CatalogSource`].
pub type SourceFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<u8>, CatalogError>> + Send + 'a>>;

/// Where catalog documents come from.
///
/// [`HttpSource`] is the production implementation; tests substitute
/// in-memory sources.
pub trait CatalogSource: Send + Sync {
    /// Returns the raw document bytes stored at `url`.
    fn fetch_document<'a>(&'a self, url: &'a str) -> SourceFuture<'a>;
}

/// Fetches catalog documents over HTTP(S) with a plain GET.
pub struct HttpSource {
    http: reqwest::Client,
}

impl HttpSource {
    /// Creates a source with its own HTTP client.
    pub fn new() -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self { http })
    }

    /// Creates a source on top of an existing HTTP client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl CatalogSource for HttpSource {
    fn fetch_document<'a>(&'a self, url: &'a str) -> SourceFuture<'a> {
        Box::pin(async move {
            let resp = self
                .http
                .get(url)
                .header(ACCEPT, "application/json")
                .send()
                .await?;
            let status = resp.status();

            if !status.is_success() {
                return Err(CatalogError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            Ok(resp.bytes().await?.to_vec())
        })
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Catalog>, Arc<CatalogError>>>>;

enum CacheState {
    Idle,
    Pending { generation: u64, fetch: SharedFetch },
    Ready(Arc<Catalog>),
}

struct Inner {
    state: CacheState,
    /// Bumped for every fetch started, so a stale completion never
    /// overwrites a newer state.
    generation: u64,
}

/// Session-scoped catalog cache over a [`CatalogSource`].
pub struct CatalogClient {
    source: Arc<dyn CatalogSource>,
    url: String,
    inner: Mutex<Inner>,
}

impl CatalogClient {
    /// Creates a client for the document at `url`.
    pub fn new(source: Arc<dyn CatalogSource>, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
            inner: Mutex::new(Inner {
                state: CacheState::Idle,
                generation: 0,
            }),
        }
    }

    /// Creates a client fetching `url` over HTTP.
    pub fn http(url: impl Into<String>) -> Result<Self, CatalogError> {
        Ok(Self::new(Arc::new(HttpSource::new()?), url))
    }

    /// Returns the configured catalog URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the catalog, or an empty one if it cannot be loaded.
    ///
    /// The failure is logged and forgotten; the next call retries.
    pub async fn fetch(&self) -> Arc<Catalog> {
        match self.try_fetch().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(url = %self.url, error = %e, "catalog unavailable, using empty catalog");
                Arc::new(Catalog::empty())
            }
        }
    }

    /// Returns the catalog, sharing any fetch already in flight.
    pub async fn try_fetch(&self) -> Result<Arc<Catalog>, Arc<CatalogError>> {
        let (generation, fetch) = {
            let mut inner = self.lock();

            let joined = match &inner.state {
                CacheState::Ready(catalog) => {
                    debug!(url = %self.url, "catalog served from cache");
                    return Ok(Arc::clone(catalog));
                }
                CacheState::Pending { generation, fetch } => {
                    debug!(url = %self.url, "joining in-flight catalog fetch");
                    Some((*generation, fetch.clone()))
                }
                CacheState::Idle => None,
            };

            match joined {
                Some(pending) => pending,
                None => {
                    inner.generation += 1;
                    let generation = inner.generation;
                    let fetch = self.start_fetch();
                    inner.state = CacheState::Pending {
                        generation,
                        fetch: fetch.clone(),
                    };
                    (generation, fetch)
                }
            }
        };

        let result = fetch.await;

        let mut inner = self.lock();
        if matches!(&inner.state, CacheState::Pending { generation: g, .. } if *g == generation) {
            inner.state = match &result {
                Ok(catalog) => CacheState::Ready(Arc::clone(catalog)),
                Err(_) => CacheState::Idle,
            };
        }

        result
    }

    /// Returns the memoized catalog without fetching.
    pub fn cached(&self) -> Option<Arc<Catalog>> {
        match &self.lock().state {
            CacheState::Ready(catalog) => Some(Arc::clone(catalog)),
            _ => None,
        }
    }

    /// Drops a memoized catalog so the next call fetches again.
    ///
    /// A fetch in flight is left alone.
    pub fn invalidate(&self) {
        let mut inner = self.lock();
        if matches!(inner.state, CacheState::Ready(_)) {
            inner.state = CacheState::Idle;
        }
    }

    fn start_fetch(&self) -> SharedFetch {
        load(Arc::clone(&self.source), self.url.clone())
            .map(|result| result.map_err(Arc::new))
            .boxed()
            .shared()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn load(source: Arc<dyn CatalogSource>, url: String) -> Result<Arc<Catalog>, CatalogError> {
    debug!(url = %url, "fetching catalog");
    let bytes = source.fetch_document(&url).await?;
    let catalog = document::decode(&bytes)?;
    info!(
        url = %url,
        entries = catalog.len(),
        metadata = catalog.metadata.is_some(),
        "catalog loaded"
    );
    Ok(Arc::new(catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Notify;

    const TWO_GAMES: &str = r#"[
        {"info2": ["action"]},
        {"id": 1, "name": "Alpha", "category": "action", "img": "alpha.jpg"},
        {"id": 2, "name": "Beta", "category": "puzzle", "img": "beta.jpg"}
    ]"#;

    /// In-memory source that counts calls and replays canned responses.
    struct MockSource {
        calls: AtomicUsize,
        responses: std::sync::Mutex<Vec<Result<Vec<u8>, CatalogError>>>,
        gate: Option<Notify>,
    }

    impl MockSource {
        fn new(responses: Vec<Result<Vec<u8>, CatalogError>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                responses: std::sync::Mutex::new(responses),
                gate: None,
            }
        }

        fn gated(responses: Vec<Result<Vec<u8>, CatalogError>>) -> Self {
            Self {
                gate: Some(Notify::new()),
                ..Self::new(responses)
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CatalogSource for MockSource {
        fn fetch_document<'a>(&'a self, _url: &'a str) -> SourceFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
                let mut responses = self.responses.lock().unwrap();
                if responses.is_empty() {
                    Ok(b"[]".to_vec())
                } else {
                    responses.remove(0)
                }
            })
        }
    }

    fn ok(body: &str) -> Result<Vec<u8>, CatalogError> {
        Ok(body.as_bytes().to_vec())
    }

    /// Starts a mock HTTP server that answers one request with `status` and `body`.
    async fn mock_server(status: u16, body: &str) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}/games.json");
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let _ = stream.read(&mut buf).await;

                let resp = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, handle)
    }

    #[tokio::test]
    async fn http_fetch_decodes_catalog() {
        let (url, handle) = mock_server(200, TWO_GAMES).await;

        let client = CatalogClient::http(url).unwrap();
        let catalog = client.fetch().await;

        assert_eq!(catalog.len(), 2);
        assert!(catalog.metadata.is_some());
        assert_eq!(catalog.entries[0].name, "Alpha");

        handle.abort();
    }

    #[tokio::test]
    async fn http_error_status_degrades_to_empty() {
        let (url, handle) = mock_server(500, "oops").await;

        let client = CatalogClient::http(url).unwrap();
        let catalog = client.fetch().await;
        assert!(catalog.is_empty());
        assert!(client.cached().is_none());

        handle.abort();
    }

    #[tokio::test]
    async fn http_error_status_is_reported_by_try_fetch() {
        let (url, handle) = mock_server(404, "missing").await;

        let client = CatalogClient::http(url).unwrap();
        let err = client.try_fetch().await.unwrap_err();
        let err_msg = err.to_string();
        assert!(err_msg.contains("404"), "error should mention 404: {err_msg}");

        handle.abort();
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_request() {
        let source = Arc::new(MockSource::gated(vec![ok(TWO_GAMES)]));
        let client = CatalogClient::new(source.clone(), "mock://catalog");

        let (a, b, ()) = tokio::join!(client.fetch(), client.fetch(), async {
            tokio::task::yield_now().await;
            source.gate.as_ref().unwrap().notify_one();
        });

        assert_eq!(source.call_count(), 1);
        assert_eq!(a.len(), 2);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn successful_fetch_is_memoized() {
        let source = Arc::new(MockSource::new(vec![ok(TWO_GAMES)]));
        let client = CatalogClient::new(source.clone(), "mock://catalog");

        let first = client.fetch().await;
        let second = client.fetch().await;

        assert_eq!(source.call_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(client.cached().is_some());
    }

    #[tokio::test]
    async fn failed_fetch_is_retried() {
        let source = Arc::new(MockSource::new(vec![
            Err(CatalogError::Format("boom".into())),
            ok(TWO_GAMES),
        ]));
        let client = CatalogClient::new(source.clone(), "mock://catalog");

        let first = client.fetch().await;
        assert!(first.is_empty());

        let second = client.fetch().await;
        assert_eq!(second.len(), 2);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn malformed_document_degrades_to_empty() {
        let source = Arc::new(MockSource::new(vec![ok("{not json")]));
        let client = CatalogClient::new(source.clone(), "mock://catalog");

        assert!(client.fetch().await.is_empty());
        assert!(client.cached().is_none());
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let source = Arc::new(MockSource::new(vec![ok(TWO_GAMES), ok("[]")]));
        let client = CatalogClient::new(source.clone(), "mock://catalog");

        assert_eq!(client.fetch().await.len(), 2);
        client.invalidate();
        assert!(client.cached().is_none());
        assert!(client.fetch().await.is_empty());
        assert_eq!(source.call_count(), 2);
    }

    #[test]
    fn client_url_is_kept() {
        let client = CatalogClient::http("https://cdn.example.com/games.json").unwrap();
        assert_eq!(client.url(), "https://cdn.example.com/games.json");
    }
}
