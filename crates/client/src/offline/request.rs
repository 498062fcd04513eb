//! Intercepted request model.

use radar_core::RequestIdentity;
use reqwest::Method;
use url::Url;

/// How the request was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Full-page load.
    Navigate,
    SameOrigin,
    Cors,
    NoCors,
}

/// What the response will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Font,
    /// Programmatic fetch (API calls).
    Empty,
}

/// An outbound request captured at the interception point.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
    pub destination: Destination,
}

impl InterceptedRequest {
    pub fn new(method: Method, url: Url, mode: RequestMode, destination: Destination) -> Self {
        Self { method, url, mode, destination }
    }

    /// Full-page navigation.
    pub fn navigate(url: Url) -> Self {
        Self::new(Method::GET, url, RequestMode::Navigate, Destination::Document)
    }

    /// Image load, e.g. a recipe thumbnail.
    pub fn image(url: Url) -> Self {
        Self::new(Method::GET, url, RequestMode::NoCors, Destination::Image)
    }

    /// Programmatic GET, as issued for API calls.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url, RequestMode::Cors, Destination::Empty)
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Cache identity: method plus absolute URL without its fragment.
    pub fn identity(&self) -> RequestIdentity {
        let mut url = self.url.clone();
        url.set_fragment(None);
        RequestIdentity::new(self.method.as_str(), url.as_str())
    }
}
