//! Request classification.
//!
//! Maps each intercepted request to at most one `RequestClass`. The class
//! fixes both the strategy and the logical partition.

use reqwest::Method;
use url::Url;

use super::request::{Destination, InterceptedRequest, RequestMode};

const CATEGORIES_PATH: &str = "/api/categories";
const API_PREFIX: &str = "/api/";

/// Caching strategy bound to a request class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve cached data immediately, refresh in the background.
    StaleWhileRevalidate,
    /// Prefer live data; degrade to cache, then to a static substitute.
    NetworkFirst,
}

/// The four intercepted request classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    Navigation,
    Image,
    CategoryListing,
    OtherApi,
}

impl RequestClass {
    pub fn strategy(self) -> Strategy {
        match self {
            RequestClass::Navigation | RequestClass::OtherApi => Strategy::NetworkFirst,
            RequestClass::Image | RequestClass::CategoryListing => Strategy::StaleWhileRevalidate,
        }
    }

    /// Logical partition name, before the generation tag is appended.
    pub fn partition(self) -> &'static str {
        match self {
            RequestClass::Navigation => "pages",
            RequestClass::Image => "images",
            RequestClass::CategoryListing => "api-categories",
            RequestClass::OtherApi => "api-other",
        }
    }
}

/// Classifies requests relative to the application origin.
#[derive(Debug, Clone)]
pub struct Classifier {
    origin: Url,
}

impl Classifier {
    pub fn new(origin: Url) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    /// Classify a request; `None` means pass through untouched.
    ///
    /// Only GET is intercepted. Images are cached from any origin since
    /// thumbnails are served by the upstream CDN; navigation and API classes
    /// require the application origin.
    pub fn classify(&self, request: &InterceptedRequest) -> Option<RequestClass> {
        if request.method != Method::GET {
            return None;
        }

        if request.mode == RequestMode::Navigate {
            return self.is_same_origin(&request.url).then_some(RequestClass::Navigation);
        }

        if request.destination == Destination::Image {
            return Some(RequestClass::Image);
        }

        if !self.is_same_origin(&request.url) {
            return None;
        }

        let path = request.url.path();
        if path == CATEGORIES_PATH {
            Some(RequestClass::CategoryListing)
        } else if path.starts_with(API_PREFIX) {
            Some(RequestClass::OtherApi)
        } else {
            None
        }
    }
}
