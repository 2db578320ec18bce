//! Stateless HTTP request builder and response parser for the news API.
//!
//! # Design
//! `NewsClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The round-trip itself happens in `transport`, keeping this module
//! deterministic and free of I/O.

use serde::Deserialize;
use url::form_urlencoded;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{SearchQuery, SearchResult};

const SEARCH_PATH: &str = "/api/v1/news/search";
const HEALTH_PATH: &str = "/actuator/health";

/// Synchronous, stateless client for the news search API.
#[derive(Debug, Clone)]
pub struct NewsClient {
    base_url: String,
}

impl NewsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/v1/news/search` with the query encoded in the URL.
    pub fn build_search_get(&self, query: &SearchQuery) -> HttpRequest {
        let mut params = form_urlencoded::Serializer::new(String::new());
        params
            .append_pair("keyword", &query.keyword)
            .append_pair("page", &query.page.to_string())
            .append_pair("pageSize", &query.page_size.to_string());
        if let Some(city) = &query.city {
            params.append_pair("city", city);
        }
        params.append_pair("offlineMode", if query.offline_mode { "true" } else { "false" });

        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}{SEARCH_PATH}?{}", self.base_url, params.finish()),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    /// `POST /api/v1/news/search` with the query as a JSON body.
    pub fn build_search_post(&self, query: &SearchQuery) -> Result<HttpRequest, TransportError> {
        let body = serde_json::to_string(query).map_err(|e| TransportError::Encode(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{SEARCH_PATH}", self.base_url),
            headers: vec![
                ("accept".to_string(), "application/json".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
                ("x-requested-with".to_string(), "XMLHttpRequest".to_string()),
            ],
            body: Some(body),
        })
    }

    pub fn build_health(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}{HEALTH_PATH}", self.base_url),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    pub fn parse_search(&self, response: HttpResponse) -> Result<SearchResult, TransportError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<serde_json::Value, TransportError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Map a non-2xx response to `ServerError`, preferring the body's `message`
/// field and falling back to a status-only message.
fn check_status(response: &HttpResponse) -> Result<(), TransportError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", response.status));
    Err(TransportError::ServerError {
        message,
        status: response.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> NewsClient {
        NewsClient::new("http://localhost:8080")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_search_get_encodes_all_parameters() {
        let query = SearchQuery::new("climate change")
            .with_page(2)
            .with_page_size(20)
            .with_city("New York")
            .with_offline_mode(true);
        let req = client().build_search_get(&query);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.path,
            "http://localhost:8080/api/v1/news/search?keyword=climate+change&page=2&pageSize=20&city=New+York&offlineMode=true"
        );
        assert_eq!(
            req.headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn build_search_get_omits_missing_city() {
        let req = client().build_search_get(&SearchQuery::new("apple"));
        assert_eq!(
            req.path,
            "http://localhost:8080/api/v1/news/search?keyword=apple&page=1&pageSize=10&offlineMode=false"
        );
    }

    #[test]
    fn build_search_post_produces_json_body() {
        let query = SearchQuery::new("apple").with_city("Paris");
        let req = client().build_search_post(&query).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/api/v1/news/search");
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["keyword"], "apple");
        assert_eq!(body["page"], 1);
        assert_eq!(body["pageSize"], 10);
        assert_eq!(body["city"], "Paris");
        assert_eq!(body["offlineMode"], false);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = NewsClient::new("http://localhost:8080/").build_health();
        assert_eq!(req.path, "http://localhost:8080/actuator/health");
    }

    #[test]
    fn parse_search_success() {
        let body = r#"{"articles":[],"searchKeyword":"apple","currentPage":1,"totalPages":0,"totalResults":0}"#;
        let result = client().parse_search(response(200, body)).unwrap();
        assert_eq!(result.search_keyword, "apple");
        assert!(result.is_empty());
    }

    #[test]
    fn parse_search_uses_server_message() {
        let err = client()
            .parse_search(response(400, r#"{"message":"Search keyword is required"}"#))
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::ServerError {
                message: "Search keyword is required".to_string(),
                status: 400,
            }
        );
    }

    #[test]
    fn parse_search_falls_back_to_status_for_unparseable_body() {
        let err = client()
            .parse_search(response(502, "<html>Bad Gateway</html>"))
            .unwrap_err();
        match err {
            TransportError::ServerError { message, status } => {
                assert_eq!(status, 502);
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_search_falls_back_when_message_missing() {
        let err = client()
            .parse_search(response(500, r#"{"error":"boom"}"#))
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::ServerError {
                message: "HTTP error! status: 500".to_string(),
                status: 500,
            }
        );
    }

    #[test]
    fn parse_search_bad_json_is_decode_error() {
        let err = client().parse_search(response(200, "not json")).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn parse_health_returns_raw_json() {
        let value = client()
            .parse_health(response(200, r#"{"status":"UP"}"#))
            .unwrap();
        assert_eq!(value["status"], "UP");
    }
}
