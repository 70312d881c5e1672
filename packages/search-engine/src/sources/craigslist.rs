//! Craigslist classifieds adapter, the general-purpose catch-all.
//!
//! Craigslist is split into regional subdomains. The region is derived from
//! the city part of the location (`"Los Angeles, CA"` -> `losangeles`).

use async_trait::async_trait;
use scraper::Html;
use tracing::debug;

use super::http::{fetch_text, select_attr, select_text, selector};
use super::SourceAdapter;
use crate::error::SourceResult;
use crate::types::query::{QueryType, SourceId};
use crate::types::record::{CraigslistPosting, RawRecord};

/// Region used when the location yields nothing usable.
pub const DEFAULT_REGION: &str = "sfbay";

const SITE: &str = "craigslist.org";

/// Searches one Craigslist category in the region nearest the location.
pub struct CraigslistAdapter {
    client: reqwest::Client,
    category: String,
}

impl CraigslistAdapter {
    /// Search the jobs category (`jjj`).
    pub fn new(client: reqwest::Client) -> Self {
        Self::for_query_type(client, QueryType::Jobs)
    }

    /// Search the category that matches what the caller is looking for.
    pub fn for_query_type(client: reqwest::Client, query_type: QueryType) -> Self {
        Self::with_category(client, category_for(query_type))
    }

    pub fn with_category(client: reqwest::Client, category: impl Into<String>) -> Self {
        Self {
            client,
            category: category.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Static search page for this category in `region`.
    pub fn search_url(&self, region: &str) -> String {
        format!("https://{}.craigslist.org/search/{}", region, self.category)
    }
}

/// Craigslist category code for a query type.
///
/// General searches stay on the jobs board.
pub fn category_for(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::Housing => "hhh",
        QueryType::Services => "bbb",
        QueryType::Jobs | QueryType::General => "jjj",
    }
}

#[async_trait]
impl SourceAdapter for CraigslistAdapter {
    fn id(&self) -> SourceId {
        SourceId::Craigslist
    }

    fn site(&self) -> &str {
        SITE
    }

    async fn fetch(&self, keywords: &str, location: &str) -> SourceResult<Vec<RawRecord>> {
        let region = region_for(location);
        let request = self
            .client
            .get(self.search_url(&region))
            .query(&[("query", keywords)]);

        let html = fetch_text(SourceId::Craigslist, request).await?;
        let postings = parse_listings(&html, &region)?;
        debug!(region = %region, count = postings.len(), "Parsed Craigslist postings");

        Ok(postings.into_iter().map(RawRecord::Craigslist).collect())
    }
}

/// Craigslist subdomain for a free-form location.
pub fn region_for(location: &str) -> String {
    let city = location.split(',').next().unwrap_or_default();
    let region: String = city
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if region.is_empty() {
        DEFAULT_REGION.to_string()
    } else {
        region
    }
}

/// Parse postings out of a Craigslist static search page.
pub fn parse_listings(html: &str, region: &str) -> SourceResult<Vec<CraigslistPosting>> {
    let id = SourceId::Craigslist;
    let row = selector("li.cl-static-search-result", id)?;
    let link = selector("a", id)?;
    let title = selector("div.title", id)?;
    let price = selector("div.price", id)?;
    let neighborhood = selector("div.location", id)?;

    let document = Html::parse_document(html);

    let postings = document
        .select(&row)
        .map(|el| {
            let url = select_attr(&el, &link, "href");
            CraigslistPosting {
                post_id: url.as_deref().and_then(post_id_from_url),
                title: el
                    .value()
                    .attr("title")
                    .and_then(super::http::clean)
                    .or_else(|| select_text(&el, &title)),
                price: select_text(&el, &price),
                neighborhood: select_text(&el, &neighborhood),
                url,
                region: region.to_string(),
            }
        })
        .filter(|posting| posting.title.is_some())
        .collect();

    Ok(postings)
}

/// Numeric id from a posting URL such as `.../d/line-cook/7712345678.html`.
fn post_id_from_url(url: &str) -> Option<String> {
    let tail = url.rsplit('/').next()?;
    let id = tail.strip_suffix(".html").unwrap_or(tail);
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Some(id.to_string())
    } else {
        None
    }
}
