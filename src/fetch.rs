//! Remote source access and the fetch-all step.
//!
//! [`RemoteSource`] is the seam between the pipeline and the network:
//! [`HttpSource`] issues one blocking `GET <base_url><resource>` per call,
//! and tests substitute an in-memory source. [`fetch_all`] walks the
//! configured resources one at a time, saving each body under its
//! resource name and recording failures instead of stopping.

use std::time::Duration;

use serde_json::Value;

use crate::config::SourceConfig;
use crate::error::{Result, SnapshotError};
use crate::models::Resource;
use crate::progress::{FetchProgressEvent, FetchProgressReporter};
use crate::store::CollectionStore;

/// Something that can produce the JSON body for a resource.
pub trait RemoteSource {
    fn fetch(&self, resource: Resource) -> Result<Value>;

    /// Human-readable location, for status lines.
    fn describe(&self) -> String;
}

/// Blocking HTTP client against a fixed base URL.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| SnapshotError::Request {
                resource: String::new(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn url_for(&self, resource: Resource) -> String {
        format!("{}{}", self.base_url, resource.as_str())
    }
}

impl RemoteSource for HttpSource {
    fn fetch(&self, resource: Resource) -> Result<Value> {
        let url = self.url_for(resource);
        tracing::debug!(%url, "GET");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().unwrap_or_default();
            return Err(SnapshotError::Request {
                resource: resource.to_string(),
                reason: format!("HTTP {}: {}", status, body_text.trim()),
            });
        }

        let text = response.text()?;
        serde_json::from_str(&text).map_err(|source| SnapshotError::Parse {
            name: resource.to_string(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Result of [`fetch_all`].
#[derive(Debug, Clone, Default)]
pub struct FetchSummary {
    /// `(resource, top-level record count)` for each saved resource.
    pub saved: Vec<(Resource, usize)>,
    /// `(resource, error message)` for each resource that failed.
    pub failed: Vec<(Resource, String)>,
}

impl FetchSummary {
    pub fn is_saved(&self, resource: Resource) -> bool {
        self.saved.iter().any(|(r, _)| *r == resource)
    }

    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetch every resource in order and save each under its own name.
///
/// Requests are issued sequentially. A failed request or save is reported
/// and recorded in the summary; the remaining resources are still fetched.
pub fn fetch_all<R, S>(
    source: &R,
    store: &S,
    resources: &[Resource],
    reporter: &dyn FetchProgressReporter,
) -> FetchSummary
where
    R: RemoteSource + ?Sized,
    S: CollectionStore,
{
    let mut summary = FetchSummary::default();
    let total = resources.len() as u64;

    for (i, &resource) in resources.iter().enumerate() {
        reporter.report(FetchProgressEvent::Fetching {
            resource: resource.to_string(),
            n: i as u64 + 1,
            total,
        });

        let outcome = source
            .fetch(resource)
            .and_then(|value| store.write_value(resource.as_str(), &value).map(|_| value));

        match outcome {
            Ok(value) => {
                let records = value.as_array().map(|a| a.len()).unwrap_or(0);
                reporter.report(FetchProgressEvent::Saved {
                    resource: resource.to_string(),
                    records: records as u64,
                });
                summary.saved.push((resource, records));
            }
            Err(e) => {
                tracing::warn!(%resource, error = %e, "fetch failed");
                reporter.report(FetchProgressEvent::Failed {
                    resource: resource.to_string(),
                    reason: e.to_string(),
                });
                summary.failed.push((resource, e.to_string()));
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::cell::RefCell;

    struct FakeSource {
        calls: RefCell<Vec<Resource>>,
    }

    impl RemoteSource for FakeSource {
        fn fetch(&self, resource: Resource) -> Result<Value> {
            self.calls.borrow_mut().push(resource);
            match resource {
                Resource::Photos => Err(SnapshotError::Request {
                    resource: "photos".to_string(),
                    reason: "HTTP 503".to_string(),
                }),
                _ => Ok(json!([{"id": 1}, {"id": 2}])),
            }
        }

        fn describe(&self) -> String {
            "fake://".to_string()
        }
    }

    #[test]
    fn test_fetch_all_sequential_and_best_effort() {
        let source = FakeSource {
            calls: RefCell::new(Vec::new()),
        };
        let store = MemoryStore::new();
        let summary = fetch_all(&source, &store, &Resource::ALL, &NoProgress);

        assert_eq!(source.calls.borrow().as_slice(), &Resource::ALL);
        assert_eq!(summary.saved.len(), 5);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, Resource::Photos);
        assert!(!summary.all_ok());
        assert!(summary.is_saved(Resource::Users));
        assert!(!store.contains("photos"));
        assert_eq!(store.load("users").unwrap().len(), 2);
    }

    #[test]
    fn test_url_for() {
        let source = HttpSource::new(&SourceConfig::default()).unwrap();
        assert_eq!(
            source.url_for(Resource::Todos),
            "https://jsonplaceholder.typicode.com/todos"
        );
    }
}
