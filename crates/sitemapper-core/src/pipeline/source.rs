//! Named route collections and how their routes are produced.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::BoxError;
use crate::{Error, Result, Route};

/// Collection whose output is named `sitemap.xml`.
pub const DEFAULT_COLLECTION: &str = "default";

/// Zero-argument async producer of a route list.
pub type RouteFactory =
    Arc<dyn Fn() -> BoxFuture<'static, std::result::Result<Vec<Route>, BoxError>> + Send + Sync>;

/// Where a collection's routes come from.
#[derive(Clone)]
pub enum RouteSource {
    /// An already materialized list.
    Value(Vec<Route>),
    /// A factory, awaited when the collection is generated.
    Factory(RouteFactory),
}

impl RouteSource {
    /// Wrap an async closure as a factory source.
    pub fn factory<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<Route>, BoxError>> + Send + 'static,
    {
        Self::Factory(Arc::new(move || factory().boxed()))
    }

    /// Produce the concrete route list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RouteSource`] when the factory fails.
    pub async fn resolve(self, collection: &str) -> Result<Vec<Route>> {
        match self {
            Self::Value(routes) => Ok(routes),
            Self::Factory(factory) => factory().await.map_err(|source| Error::RouteSource {
                collection: collection.to_string(),
                source,
            }),
        }
    }
}

impl std::fmt::Debug for RouteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(routes) => f.debug_tuple("Value").field(&routes.len()).finish(),
            Self::Factory(_) => f.write_str("Factory"),
        }
    }
}

impl From<Vec<Route>> for RouteSource {
    fn from(routes: Vec<Route>) -> Self {
        Self::Value(routes)
    }
}

/// File base name for a collection: `sitemap` or `sitemap-<name>`.
#[must_use]
pub fn base_name(collection: &str) -> String {
    if collection == DEFAULT_COLLECTION {
        "sitemap".to_string()
    } else {
        format!("sitemap-{collection}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_value_source_resolves_as_is() {
        let source = RouteSource::from(vec![Route::new("https://example.com/")]);

        let routes = source.resolve("pages").await.unwrap();

        assert_eq!(routes, vec![Route::new("https://example.com/")]);
    }

    #[tokio::test]
    async fn test_factory_source_is_awaited() {
        let source = RouteSource::factory(|| async {
            Ok::<_, BoxError>(vec![
                Route::new("https://example.com/a"),
                Route::new("https://example.com/b"),
            ])
        });

        let routes = source.resolve("pages").await.unwrap();

        assert_eq!(routes.len(), 2);
    }

    #[tokio::test]
    async fn test_factory_failure_names_collection() {
        let source = RouteSource::factory(|| async {
            Err::<Vec<Route>, BoxError>("database unavailable".into())
        });

        let err = source.resolve("products").await.unwrap_err();

        assert!(matches!(err, Error::RouteSource { ref collection, .. } if collection == "products"));
        assert!(err.to_string().contains("database unavailable"));
    }

    #[test]
    fn test_base_names() {
        assert_eq!(base_name(DEFAULT_COLLECTION), "sitemap");
        assert_eq!(base_name("blog"), "sitemap-blog");
    }
}
