//! SimplyHired job board adapter.

use async_trait::async_trait;
use scraper::Html;
use tracing::debug;

use super::http::{absolute_url, fetch_text, select_attr, select_text, selector};
use super::SourceAdapter;
use crate::error::SourceResult;
use crate::types::query::SourceId;
use crate::types::record::{RawRecord, SimplyHiredListing};

const BASE_URL: &str = "https://www.simplyhired.com";
const SITE: &str = "www.simplyhired.com";

pub struct SimplyHiredAdapter {
    client: reqwest::Client,
}

impl SimplyHiredAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for SimplyHiredAdapter {
    fn id(&self) -> SourceId {
        SourceId::SimplyHired
    }

    fn site(&self) -> &str {
        SITE
    }

    async fn fetch(&self, keywords: &str, location: &str) -> SourceResult<Vec<RawRecord>> {
        let request = self
            .client
            .get(format!("{}/search", BASE_URL))
            .query(&[("q", keywords), ("l", location)]);

        let html = fetch_text(SourceId::SimplyHired, request).await?;
        let listings = parse_listings(&html)?;
        debug!(count = listings.len(), "Parsed SimplyHired listings");

        Ok(listings.into_iter().map(RawRecord::SimplyHired).collect())
    }
}

/// Parse job cards out of a SimplyHired results page.
pub fn parse_listings(html: &str) -> SourceResult<Vec<SimplyHiredListing>> {
    let id = SourceId::SimplyHired;
    let card = selector("[data-testid=\"searchSerpJob\"]", id)?;
    let title_link = selector("[data-testid=\"searchSerpJobTitle\"] a", id)?;
    let company = selector("[data-testid=\"companyName\"]", id)?;
    let location = selector("[data-testid=\"searchSerpJobLocation\"]", id)?;
    let salary = selector("[data-testid=\"searchSerpJobSalaryEst\"]", id)?;
    let snippet = selector("[data-testid=\"searchSerpJobSnippet\"]", id)?;

    let document = Html::parse_document(html);

    let listings = document
        .select(&card)
        .map(|el| SimplyHiredListing {
            job_key: el.value().attr("data-jobkey").map(str::to_string),
            title: select_text(&el, &title_link),
            company: select_text(&el, &company),
            location: select_text(&el, &location),
            salary_estimate: select_text(&el, &salary),
            snippet: select_text(&el, &snippet),
            url: select_attr(&el, &title_link, "href").and_then(|href| absolute_url(BASE_URL, &href)),
        })
        .filter(|listing| listing.title.is_some())
        .collect();

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listings() {
        let html = r#"
            <ul>
            <li data-testid="searchSerpJob" data-jobkey="k-1">
                <h2 data-testid="searchSerpJobTitle"><a href="/job/k-1">Forklift Operator</a></h2>
                <span data-testid="companyName">Pacific Freight</span>
                <span data-testid="searchSerpJobLocation">Commerce, CA</span>
                <p data-testid="searchSerpJobSalaryEst">Estimated: $20 - $24 an hour</p>
                <p data-testid="searchSerpJobSnippet">Second chance employer. Will train.</p>
            </li>
            <li data-testid="searchSerpJob" data-jobkey="k-2">
                <h2 data-testid="searchSerpJobTitle"><a href="https://www.simplyhired.com/job/k-2">Dishwasher</a></h2>
            </li>
            </ul>
        "#;

        let listings = parse_listings(html).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].job_key.as_deref(), Some("k-1"));
        assert_eq!(listings[0].title.as_deref(), Some("Forklift Operator"));
        assert_eq!(listings[0].company.as_deref(), Some("Pacific Freight"));
        assert_eq!(listings[0].url.as_deref(), Some("https://www.simplyhired.com/job/k-1"));
        assert_eq!(
            listings[0].salary_estimate.as_deref(),
            Some("Estimated: $20 - $24 an hour")
        );
        assert_eq!(listings[1].company, None);
        assert_eq!(listings[1].url.as_deref(), Some("https://www.simplyhired.com/job/k-2"));
    }
}
