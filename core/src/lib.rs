//! Client core for the news search service.
//!
//! # Overview
//! `NewsClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. `HttpTransport` executes them over reqwest
//! with cooperative cancellation, and `SearchController` turns a stream of
//! search submissions into a single observable `SearchOutcome`.
//!
//! # Design
//! - `NewsClient` is stateless; it holds only `base_url`.
//! - The transport sits behind the `SearchTransport` trait and is handed to
//!   the controller at construction, so tests swap in scripted transports.
//! - A later submit always wins: superseded results are dropped by id, and
//!   cancellation is never reported as a failure.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod http;
pub mod transport;
pub mod types;

pub use client::NewsClient;
pub use config::{load_settings, ClientSettings, SearchMethod};
pub use controller::{SearchController, SearchOutcome, SearchTicket, Settlement};
pub use error::{TransportError, ValidationError};
pub use form::{FormErrors, SearchForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{http_transport, HttpTransport, SearchTransport};
pub use types::{Article, SearchQuery, SearchResult};
pub use tokio_util::sync::CancellationToken;
