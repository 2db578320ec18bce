//! Search form state and the validation rules applied before a query is
//! handed to the controller.

use crate::types::{SearchQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

const MIN_KEYWORD_CHARS: usize = 2;

/// Raw field values as collected from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub keyword: String,
    pub city: String,
    pub page_size: u32,
    pub offline_mode: bool,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            city: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            offline_mode: false,
        }
    }
}

/// Per-field messages for a form that failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub keyword: Option<String>,
    pub page_size: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.keyword.is_none() && self.page_size.is_none()
    }
}

impl SearchForm {
    /// Turn the form into a first-page query, or report every invalid field.
    pub fn validate(&self) -> Result<SearchQuery, FormErrors> {
        let mut errors = FormErrors::default();
        let keyword = self.keyword.trim();

        if keyword.is_empty() {
            errors.keyword = Some("Search keyword is required".to_string());
        } else if keyword.chars().count() < MIN_KEYWORD_CHARS {
            errors.keyword = Some(format!(
                "Search keyword must be at least {MIN_KEYWORD_CHARS} characters"
            ));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            errors.page_size = Some(format!("Page size must be between 1 and {MAX_PAGE_SIZE}"));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut query = SearchQuery::new(keyword)
            .with_page_size(self.page_size)
            .with_offline_mode(self.offline_mode);
        let city = self.city.trim();
        if !city.is_empty() {
            query = query.with_city(city);
        }
        Ok(query)
    }
}
