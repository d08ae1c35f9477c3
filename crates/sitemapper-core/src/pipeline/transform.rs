//! Per-route transform callbacks.

use std::future::Future;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::debug;

use crate::error::BoxError;
use crate::{Error, Result, Route};

/// User hook run on every route that survived exclusion.
///
/// Returning `Ok(None)` drops the route. Returning an error aborts
/// generation of the whole collection.
///
/// ```rust
/// use sitemapper_core::{Route, error::BoxError, pipeline::transform_fn};
///
/// let strip_drafts = transform_fn(|route: Route| async move {
///     if route.url.contains("/draft") {
///         Ok::<_, BoxError>(None)
///     } else {
///         Ok(Some(route))
///     }
/// });
/// # let _ = strip_drafts;
/// ```
#[async_trait]
pub trait RouteTransform: Send + Sync {
    /// Transform one route.
    async fn transform(&self, route: Route) -> std::result::Result<Option<Route>, BoxError>;
}

/// [`RouteTransform`] backed by an async closure. Built by [`transform_fn`].
pub struct FnTransform<F>(F);

impl<F> std::fmt::Debug for FnTransform<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnTransform")
    }
}

/// Wrap an async closure as a [`RouteTransform`].
pub const fn transform_fn<F, Fut>(f: F) -> FnTransform<F>
where
    F: Fn(Route) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Option<Route>, BoxError>> + Send + 'static,
{
    FnTransform(f)
}

#[async_trait]
impl<F, Fut> RouteTransform for FnTransform<F>
where
    F: Fn(Route) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Option<Route>, BoxError>> + Send + 'static,
{
    async fn transform(&self, route: Route) -> std::result::Result<Option<Route>, BoxError> {
        (self.0)(route).await
    }
}

/// Routes kept by [`apply_transform`] and how many were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    pub routes: Vec<Route>,
    pub dropped: usize,
}

/// Run `transform` over every route concurrently.
///
/// Results are reassembled in input order and dropped routes removed.
///
/// # Errors
///
/// Returns [`Error::Transform`] for the first failing route in input order.
pub async fn apply_transform(
    routes: Vec<Route>,
    transform: &dyn RouteTransform,
) -> Result<TransformOutcome> {
    let pending = routes.into_iter().map(|route| {
        let url = route.url.clone();
        async move { (url, transform.transform(route).await) }
    });
    let results = join_all(pending).await;

    let mut kept = Vec::with_capacity(results.len());
    let mut dropped = 0;
    for (url, result) in results {
        match result.map_err(|source| Error::Transform { url, source })? {
            Some(route) => kept.push(route),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, kept = kept.len(), "transform dropped routes");
    }

    Ok(TransformOutcome {
        routes: kept,
        dropped,
    })
}
