//! Intercepted request model.
//!
//! Mirrors the fields a fetch trigger carries: method, URL, headers, mode and
//! destination. A request lives only for one fetch-intercept call.

use bytes::Bytes;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

/// How the request was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level page navigation.
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

/// What the response will be used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Style,
    Script,
    Image,
    Font,
    Manifest,
    /// `fetch()`/XHR calls and anything without a destination.
    #[default]
    Empty,
}

impl Destination {
    /// Destinations served stale-while-revalidate.
    pub fn is_static_asset(self) -> bool {
        matches!(self, Destination::Style | Destination::Script | Destination::Image | Destination::Font)
    }
}

/// A request awaiting classification.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub mode: RequestMode,
    pub destination: Destination,
    pub body: Option<Bytes>,
}

impl FetchRequest {
    /// A plain GET with no headers.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: Vec::new(),
            mode: RequestMode::default(),
            destination: Destination::default(),
            body: None,
        }
    }

    /// A page navigation, as a browser issues it.
    pub fn navigate(url: Url) -> Self {
        Self::get(url)
            .with_mode(RequestMode::Navigate)
            .with_destination(Destination::Document)
            .with_header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
    }

    /// A same-origin JSON POST.
    pub fn post_json(url: Url, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            body: Some(Bytes::from(body)),
            mode: RequestMode::SameOrigin,
            ..Self::get(url)
        }
        .with_header("Content-Type", "application/json")
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Whether the `Accept` header asks for HTML. A missing header does not.
    pub fn accepts_html(&self) -> bool {
        self.header("accept").is_some_and(|accept| accept.contains("text/html"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://cuidadoresvip.cl").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_get_defaults() {
        let req = FetchRequest::get(url("/assets/js/main.js"));
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.mode, RequestMode::NoCors);
        assert_eq!(req.destination, Destination::Empty);
        assert!(!req.accepts_html());
    }

    #[test]
    fn test_navigate_accepts_html() {
        let req = FetchRequest::navigate(url("/"));
        assert!(req.is_navigation());
        assert!(req.accepts_html());
        assert_eq!(req.destination, Destination::Document);
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let req = FetchRequest::get(url("/")).with_header("ACCEPT", "text/html");
        assert_eq!(req.header("accept"), Some("text/html"));
    }

    #[test]
    fn test_post_json() {
        let req = FetchRequest::post_json(url("/api/contact"), b"{}".to_vec());
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_static_asset_destinations() {
        assert!(Destination::Image.is_static_asset());
        assert!(Destination::Font.is_static_asset());
        assert!(!Destination::Document.is_static_asset());
        assert!(!Destination::Manifest.is_static_asset());
    }

    #[test]
    fn test_mode_serde_names() {
        let mode: RequestMode = serde_json::from_str(r#""same-origin""#).unwrap();
        assert_eq!(mode, RequestMode::SameOrigin);
        let dest: Destination = serde_json::from_str(r#""style""#).unwrap();
        assert_eq!(dest, Destination::Style);
    }
}
