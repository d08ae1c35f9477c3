//! Synchronous pipeline stages.
//!
//! Each stage takes the route list by value and returns the next one, so
//! no stage can observe another's intermediate state.

use std::collections::HashSet;

use crate::exclude::ExclusionMatcher;
use crate::{ChangeFrequency, Route};

/// Values filled into routes that leave the corresponding field unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDefaults {
    pub changefreq: Option<ChangeFrequency>,
    pub priority: Option<f64>,
    pub lastmod: Option<String>,
}

impl RouteDefaults {
    /// `true` when no default is configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.changefreq.is_none() && self.priority.is_none() && self.lastmod.is_none()
    }
}

/// Drop routes matched by `matcher`.
#[must_use]
pub fn filter_excluded(routes: Vec<Route>, matcher: &ExclusionMatcher) -> Vec<Route> {
    if matcher.is_empty() {
        return routes;
    }
    routes
        .into_iter()
        .filter(|route| !matcher.matches(&route.url))
        .collect()
}

/// Fill unset fields from `defaults`. Values set on a route always win.
#[must_use]
pub fn apply_defaults(routes: Vec<Route>, defaults: &RouteDefaults) -> Vec<Route> {
    if defaults.is_empty() {
        return routes;
    }
    routes
        .into_iter()
        .map(|mut route| {
            if route.changefreq.is_none() {
                route.changefreq = defaults.changefreq;
            }
            if route.priority.is_none() {
                route.priority = defaults.priority;
            }
            if route.lastmod.is_none() {
                route.lastmod.clone_from(&defaults.lastmod);
            }
            route
        })
        .collect()
}

/// Make a route URL absolute against `hostname`.
///
/// URLs already starting with `http://` or `https://` are returned as-is.
#[must_use]
pub fn resolve_hostname(mut route: Route, hostname: &str) -> Route {
    if route.url.starts_with("http://") || route.url.starts_with("https://") {
        return route;
    }
    let host = hostname.trim_end_matches('/');
    route.url = if route.url.starts_with('/') {
        format!("{host}{}", route.url)
    } else {
        format!("{host}/{}", route.url)
    };
    route
}

/// Apply [`resolve_hostname`] to every route; no-op without a hostname.
#[must_use]
pub fn resolve_hostnames(routes: Vec<Route>, hostname: Option<&str>) -> Vec<Route> {
    match hostname {
        Some(host) => routes
            .into_iter()
            .map(|route| resolve_hostname(route, host))
            .collect(),
        None => routes,
    }
}

/// Keep the first route for each URL, preserving order.
#[must_use]
pub fn dedupe(routes: Vec<Route>) -> Vec<Route> {
    let mut seen = HashSet::with_capacity(routes.len());
    routes
        .into_iter()
        .filter(|route| seen.insert(route.url.clone()))
        .collect()
}
