//! Domain DTOs for the news search API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any schema drift between the two crates. JSON
//! field names are camelCase to match the backend contract.
//!
//! `SearchQuery` is a value object: the `with_*` helpers consume `self` and
//! return a new query, so a query handed to the controller is never mutated
//! afterwards.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Parameters of a single search submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub keyword: String,
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub offline_mode: bool,
}

impl SearchQuery {
    /// A first-page query with the default page size.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            city: None,
            offline_mode: false,
        }
    }

    pub fn with_page(self, page: u32) -> Self {
        Self { page, ..self }
    }

    pub fn with_page_size(self, page_size: u32) -> Self {
        Self { page_size, ..self }
    }

    pub fn with_city(self, city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..self
        }
    }

    pub fn with_offline_mode(self, offline_mode: bool) -> Self {
        Self {
            offline_mode,
            ..self
        }
    }

    /// Check the constraints every query must satisfy before it may reach
    /// the network.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.keyword.trim().is_empty() {
            return Err(ValidationError::EmptyKeyword);
        }
        if self.page == 0 {
            return Err(ValidationError::InvalidPage(self.page));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ValidationError::PageSizeOutOfRange(self.page_size));
        }
        Ok(())
    }
}

/// A single article as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub source: String,
    pub author: Option<String>,
    pub section: Option<String>,
    pub image_url: Option<String>,
    pub published_at: NaiveDateTime,
    pub url: String,
}

/// One page of search results. Fields the backend omits take their
/// defaults, so a minimal `{articles, totalResults, currentPage, totalPages}`
/// body is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResult {
    pub articles: Vec<Article>,
    pub search_keyword: String,
    pub city: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub page_size: u32,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
    pub execution_time_ms: u64,
    pub from_cache: bool,
    pub offline_mode: bool,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
