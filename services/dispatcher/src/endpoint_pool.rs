use alloy::network::Ethereum;
use alloy::providers::RootProvider;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

use shared::errors::ConfigError;

pub type HttpProvider = RootProvider<Ethereum>;

/// One RPC endpoint: its URL plus a live HTTP provider handle.
pub struct Endpoint {
    url: String,
    provider: HttpProvider,
}

impl Endpoint {
    fn connect(url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            url: url.to_string(),
            provider: RootProvider::new_http(parsed),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }
}

/// Rotating pool of RPC endpoints shared by every executor in a run.
///
/// The current index is the run's only shared mutable state. Rotation is a
/// coarse failover signal: once any caller rotates, every subsequent
/// `current()` call sees the new endpoint, including operations already in
/// flight that have not failed yet. Concurrent rotations race on the index;
/// the order is unspecified and tolerated.
pub struct EndpointPool {
    endpoints: Vec<Arc<Endpoint>>,
    current: RwLock<usize>,
}

impl EndpointPool {
    pub fn new(urls: &[String]) -> Result<Self, ConfigError> {
        if urls.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }

        let endpoints = urls
            .iter()
            .map(|url| Endpoint::connect(url).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            endpoints,
            current: RwLock::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoint at the current index. No side effect.
    pub async fn current(&self) -> Arc<Endpoint> {
        let index = self.current.read().await;
        self.endpoints[*index].clone()
    }

    /// Advance to the next endpoint and return it.
    pub async fn rotate(&self) -> Arc<Endpoint> {
        let mut index = self.current.write().await;
        *index = (*index + 1) % self.endpoints.len();
        let endpoint = self.endpoints[*index].clone();

        tracing::debug!(endpoint = %endpoint.url(), "Rotated to next RPC endpoint");
        metrics::counter!("endpoint_rotations_total").increment(1);

        endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn empty_endpoint_list_is_rejected() {
        let result = EndpointPool::new(&[]);
        assert!(matches!(result, Err(ConfigError::NoEndpoints)));
    }

    #[test]
    fn unparsable_url_is_rejected() {
        let result = EndpointPool::new(&urls(&["not a url"]));
        assert!(matches!(result, Err(ConfigError::InvalidEndpoint { .. })));
    }

    #[tokio::test]
    async fn current_has_no_side_effect() {
        let pool = EndpointPool::new(&urls(&["http://one.test", "http://two.test"])).unwrap();
        assert_eq!(pool.current().await.url(), "http://one.test");
        assert_eq!(pool.current().await.url(), "http://one.test");
    }

    #[tokio::test]
    async fn rotation_is_circular() {
        let pool = EndpointPool::new(&urls(&[
            "http://one.test",
            "http://two.test",
            "http://three.test",
        ]))
        .unwrap();

        assert_eq!(pool.rotate().await.url(), "http://two.test");
        assert_eq!(pool.rotate().await.url(), "http://three.test");
        assert_eq!(pool.rotate().await.url(), "http://one.test");
        assert_eq!(pool.current().await.url(), "http://one.test");
    }
}
