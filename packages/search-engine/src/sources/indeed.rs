//! Indeed job board adapter.

use async_trait::async_trait;
use scraper::Html;
use tracing::debug;

use super::http::{absolute_url, fetch_text, select_attr, select_text, selector};
use super::SourceAdapter;
use crate::error::SourceResult;
use crate::types::query::SourceId;
use crate::types::record::{IndeedListing, RawRecord};

const BASE_URL: &str = "https://www.indeed.com";
const SITE: &str = "www.indeed.com";

/// Scrapes the first page of Indeed search results.
pub struct IndeedAdapter {
    client: reqwest::Client,
}

impl IndeedAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for IndeedAdapter {
    fn id(&self) -> SourceId {
        SourceId::Indeed
    }

    fn site(&self) -> &str {
        SITE
    }

    async fn fetch(&self, keywords: &str, location: &str) -> SourceResult<Vec<RawRecord>> {
        let request = self
            .client
            .get(format!("{}/jobs", BASE_URL))
            .query(&[("q", keywords), ("l", location), ("sort", "date")]);

        let html = fetch_text(SourceId::Indeed, request).await?;
        let listings = parse_listings(&html)?;
        debug!(count = listings.len(), "Parsed Indeed listings");

        Ok(listings.into_iter().map(RawRecord::Indeed).collect())
    }
}

/// Parse job cards out of an Indeed results page.
pub fn parse_listings(html: &str) -> SourceResult<Vec<IndeedListing>> {
    let id = SourceId::Indeed;
    let card = selector("div.job_seen_beacon", id)?;
    let title = selector("h2.jobTitle span", id)?;
    let link = selector("h2.jobTitle a", id)?;
    let company = selector("[data-testid=\"company-name\"]", id)?;
    let location = selector("[data-testid=\"text-location\"]", id)?;
    let salary = selector(
        "div.salary-snippet-container, [data-testid=\"attribute_snippet_testid\"]",
        id,
    )?;
    let snippet = selector("div.job-snippet", id)?;

    let document = Html::parse_document(html);

    let listings = document
        .select(&card)
        .map(|el| {
            let href = select_attr(&el, &link, "href");
            IndeedListing {
                job_key: select_attr(&el, &link, "data-jk"),
                title: select_text(&el, &title),
                company: select_text(&el, &company),
                location: select_text(&el, &location),
                salary: select_text(&el, &salary),
                snippet: select_text(&el, &snippet),
                url: href.and_then(|h| absolute_url(BASE_URL, &h)),
            }
        })
        .filter(|listing| listing.title.is_some())
        .collect();

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
        <div class="job_seen_beacon">
            <h2 class="jobTitle"><a data-jk="abc123" href="/rc/clk?jk=abc123"><span title="Warehouse Associate">Warehouse Associate</span></a></h2>
            <span data-testid="company-name">Acme Logistics</span>
            <div data-testid="text-location">Los Angeles, CA 90021</div>
            <div class="salary-snippet-container">$18 - $21 an hour</div>
            <div class="job-snippet"><ul><li>No experience required.</li><li>Paid training.</li></ul></div>
        </div>
        <div class="job_seen_beacon">
            <h2 class="jobTitle"><a data-jk="def456" href="https://www.indeed.com/viewjob?jk=def456"><span>Line Cook</span></a></h2>
            <span data-testid="company-name">Cafe X</span>
        </div>
        <div class="job_seen_beacon"><p>sponsored block without a title</p></div>
        </body></html>
    "#;

    #[test]
    fn test_parse_listings() {
        let listings = parse_listings(FIXTURE).unwrap();
        assert_eq!(listings.len(), 2);

        let first = &listings[0];
        assert_eq!(first.job_key.as_deref(), Some("abc123"));
        assert_eq!(first.title.as_deref(), Some("Warehouse Associate"));
        assert_eq!(first.company.as_deref(), Some("Acme Logistics"));
        assert_eq!(first.location.as_deref(), Some("Los Angeles, CA 90021"));
        assert_eq!(first.salary.as_deref(), Some("$18 - $21 an hour"));
        assert_eq!(first.snippet.as_deref(), Some("No experience required. Paid training."));
        assert_eq!(first.url.as_deref(), Some("https://www.indeed.com/rc/clk?jk=abc123"));

        let second = &listings[1];
        assert_eq!(second.url.as_deref(), Some("https://www.indeed.com/viewjob?jk=def456"));
        assert_eq!(second.salary, None);
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(parse_listings("<html><body>No jobs</body></html>").unwrap().is_empty());
    }
}
