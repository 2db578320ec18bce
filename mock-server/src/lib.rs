use std::{collections::HashMap, sync::Arc, time::Instant};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub city: Option<String>,
    #[serde(default)]
    pub offline_mode: bool,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
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

type CacheKey = (String, u32, u32);

pub struct Catalog {
    articles: Vec<Article>,
    cache: RwLock<HashMap<CacheKey, SearchResponse>>,
}

pub type Db = Arc<Catalog>;

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn app() -> Router {
    app_with_articles(sample_articles())
}

/// Router serving `articles`, newest first.
pub fn app_with_articles(mut articles: Vec<Article>) -> Router {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    let db: Db = Arc::new(Catalog {
        articles,
        cache: RwLock::new(HashMap::new()),
    });
    Router::new()
        .route("/api/v1/news/search", get(search_get).post(search_post))
        .route("/actuator/health", get(health))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn search_get(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    search(&db, params).await.map(Json)
}

async fn search_post(
    State(db): State<Db>,
    Json(params): Json<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    search(&db, params).await.map(Json)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP" }))
}

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message })))
}

async fn search(db: &Catalog, params: SearchParams) -> Result<SearchResponse, ApiError> {
    let started = Instant::now();
    let keyword = params.keyword.trim().to_string();
    if keyword.is_empty() {
        return Err(bad_request("Search keyword is required"));
    }
    let page = u32::try_from(params.page)
        .ok()
        .filter(|p| *p >= 1)
        .ok_or_else(|| bad_request("Page number must be greater than 0"))?;
    let page_size = u32::try_from(params.page_size)
        .ok()
        .filter(|s| *s >= 1)
        .ok_or_else(|| bad_request("Page size must be greater than 0"))?;

    debug!(%keyword, page, page_size, "search request");
    let key = (keyword.to_lowercase(), page, page_size);
    if let Some(cached) = db.cache.read().await.get(&key) {
        return Ok(SearchResponse {
            search_keyword: keyword,
            city: params.city,
            offline_mode: params.offline_mode,
            from_cache: true,
            execution_time_ms: started.elapsed().as_millis() as u64,
            ..cached.clone()
        });
    }

    let needle = keyword.to_lowercase();
    let matches: Vec<&Article> = db
        .articles
        .iter()
        .filter(|a| {
            a.title.to_lowercase().contains(&needle)
                || a.description.to_lowercase().contains(&needle)
        })
        .collect();

    let total_results = matches.len() as u64;
    let total_pages = matches.len().div_ceil(page_size as usize) as u32;
    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let articles = matches
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .cloned()
        .collect();

    let response = SearchResponse {
        articles,
        search_keyword: keyword,
        city: params.city,
        current_page: page,
        total_pages,
        total_results,
        page_size,
        previous_page: (page > 1).then(|| page - 1),
        next_page: (page < total_pages).then(|| page + 1),
        execution_time_ms: started.elapsed().as_millis() as u64,
        from_cache: false,
        offline_mode: params.offline_mode,
    };
    db.cache.write().await.insert(key, response.clone());
    Ok(response)
}

fn published(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("fixture timestamp is a valid date")
}

fn article(
    id: &str,
    title: &str,
    description: &str,
    source: &str,
    published_at: NaiveDateTime,
) -> Article {
    Article {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        url: format!("https://news.example.com/{id}"),
        source: source.to_string(),
        published_at,
        image_url: None,
        author: None,
        section: None,
    }
}

/// Fixed corpus served by `app()`.
pub fn sample_articles() -> Vec<Article> {
    vec![
        article(
            "guardian-1",
            "Apple unveils new headset",
            "The company showed its latest device to developers.",
            "The Guardian",
            published(15, 10, 30),
        ),
        article(
            "nyt-1",
            "Apple orchards face early frost",
            "Growers in the valley brace for a difficult season.",
            "The New York Times",
            published(14, 8, 0),
        ),
        article(
            "guardian-2",
            "Markets rally on tech earnings",
            "Apple and other large firms beat expectations.",
            "The Guardian",
            published(13, 16, 45),
        ),
        article(
            "nyt-2",
            "City council approves new bike lanes",
            "The plan adds forty kilometres of protected lanes.",
            "The New York Times",
            published(12, 12, 0),
        ),
        article(
            "guardian-3",
            "Climate summit ends with pledge",
            "Delegates agree on a framework for emissions cuts.",
            "The Guardian",
            published(11, 19, 20),
        ),
    ]
}
