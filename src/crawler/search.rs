//! Search crawl controller
//!
//! Per search term: discover up to the configured page cap of paginated
//! result URLs, fan out bounded-concurrency fetches of each page into the
//! term's single pipeline, then close the pipeline. A page whose retries
//! are exhausted is logged and does not stop its siblings; a discovery
//! failure degrades the term to its first page only.

use crate::config::Config;
use crate::crawler::fetch::{fetch_with_retry, FetchOutcome};
use crate::extract::{Extractor, RawSearchCard};
use crate::gateway::{FetchOptions, Gateway};
use crate::output::{sanitize_name, DelimitedSink};
use crate::pipeline::Pipeline;
use crate::records::SearchRecord;
use crate::Result;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Crawls paginated search results for one term at a time
pub struct SearchCrawler<'a, G: Gateway, E: Extractor> {
    gateway: &'a G,
    extractor: &'a E,
    config: &'a Config,
    options: FetchOptions,
}

impl<'a, G: Gateway, E: Extractor> SearchCrawler<'a, G, E> {
    pub fn new(gateway: &'a G, extractor: &'a E, config: &'a Config) -> Self {
        let options = FetchOptions {
            render_wait: Duration::from_millis(config.gateway.render_wait_ms),
            country_code: config.gateway.country_code.clone(),
        };
        Self {
            gateway,
            extractor,
            config,
            options,
        }
    }

    /// Runs the full search crawl for one term
    ///
    /// # Returns
    ///
    /// The path of the term's batch file. The file may be absent when no
    /// page yielded any records.
    pub async fn run(&self, term: &str) -> Result<PathBuf> {
        let urls = self.discover_pages(term).await;
        tracing::info!("Term '{}': fetching {} result page(s)", term, urls.len());

        let destination = PathBuf::from(&self.config.output.directory)
            .join(format!("{}.csv", sanitize_name(term)));
        let pipeline = Pipeline::new(
            DelimitedSink::new(&destination),
            self.config.crawler.batch_threshold,
        );

        let semaphore = Arc::new(Semaphore::new(self.config.crawler.search_concurrency));
        let tasks = urls.iter().map(|url| {
            let semaphore = Arc::clone(&semaphore);
            let pipeline = &pipeline;
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                match self.fetch_page(url).await {
                    Ok(records) => {
                        for record in records {
                            if let Err(e) = pipeline.add(record) {
                                tracing::error!(
                                    "Failed to persist record from {}: {}",
                                    url,
                                    e
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Giving up on search page {}: {}", url, e);
                    }
                }
            }
        });
        join_all(tasks).await;

        pipeline.close()?;
        Ok(destination)
    }

    /// Builds the first-page URL and collects pagination links from it
    ///
    /// The returned list always starts with the first page's own URL.
    /// On discovery failure the term degrades to just the first page.
    async fn discover_pages(&self, term: &str) -> Vec<String> {
        let first = self.search_url(term);
        let mut urls = vec![first.clone()];

        let extra_cap = self.config.crawler.page_cap - 1;
        if extra_cap == 0 {
            return urls;
        }

        match self.gateway.fetch(&first, &self.options).await {
            Ok(html) => {
                let base = match Url::parse(&first) {
                    Ok(base) => base,
                    Err(e) => {
                        tracing::warn!("Search URL {} does not parse: {}", first, e);
                        return urls;
                    }
                };
                for href in self.extractor.pagination_links(&html, extra_cap) {
                    match base.join(&href) {
                        Ok(resolved) => {
                            let resolved = resolved.to_string();
                            if !urls.contains(&resolved) {
                                urls.push(resolved);
                            }
                        }
                        Err(e) => {
                            tracing::debug!("Skipping pagination link {}: {}", href, e);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Pagination discovery for '{}' failed: {}; crawling first page only",
                    term,
                    e
                );
            }
        }

        urls
    }

    /// Fetches and extracts one search results page with retries
    async fn fetch_page(&self, url: &str) -> Result<Vec<SearchRecord>> {
        fetch_with_retry(url, self.config.crawler.search_retries, || async move {
            match self.gateway.fetch(url, &self.options).await {
                Ok(html) => {
                    let cards = self.extractor.search_cards(&html);
                    if cards.is_empty() {
                        FetchOutcome::Retryable("no listing cards extracted".to_string())
                    } else {
                        let base = Url::parse(url).ok();
                        FetchOutcome::Success(
                            cards
                                .into_iter()
                                .map(|card| build_record(card, base.as_ref()))
                                .collect(),
                        )
                    }
                }
                Err(e) => FetchOutcome::Retryable(e.to_string()),
            }
        })
        .await
    }

    /// Substitutes the URL-encoded term into the search URL template
    fn search_url(&self, term: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
        self.config.site.search_url.replace("{term}", &encoded)
    }
}

/// Normalizes a raw card into a record, resolving its URL against the
/// page it came from
fn build_record(card: RawSearchCard, base: Option<&Url>) -> SearchRecord {
    let resolved = card.url.as_deref().and_then(|href| {
        base.and_then(|base| base.join(href).ok())
            .map(|u| u.to_string())
            .or_else(|| Some(href.to_string()))
    });
    SearchRecord::new(
        card.name.as_deref(),
        card.description.as_deref(),
        card.dates.as_deref(),
        card.price.as_deref(),
        resolved.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CrawlerConfig, GatewayConfig, OutputConfig, SearchConfig, SiteConfig,
    };
    use crate::crawler::testing::MockGateway;
    use crate::extract::HtmlExtractor;
    use crate::output::read_batch_file;
    use tempfile::TempDir;

    fn test_config(output_dir: &str) -> Config {
        Config {
            gateway: GatewayConfig {
                api_key: "k".to_string(),
                endpoint: "https://api.proxy.test/".to_string(),
                country_code: "us".to_string(),
                render_wait_ms: 10,
            },
            site: SiteConfig {
                search_url: "https://site.test/s/{term}".to_string(),
            },
            crawler: CrawlerConfig {
                page_cap: 4,
                search_concurrency: 2,
                search_retries: 2,
                detail_concurrency: 5,
                detail_retries: 2,
                batch_threshold: 50,
            },
            output: OutputConfig {
                directory: output_dir.to_string(),
            },
            search: SearchConfig {
                terms: vec!["Lisbon".to_string()],
            },
        }
    }

    fn results_page(cards: &[(&str, &str)], pagination: &[&str]) -> String {
        let cards_html: String = cards
            .iter()
            .map(|(name, href)| {
                format!(
                    r#"<div data-testid="card-container">
                        <a href="{href}"></a>
                        <div data-testid="listing-card-title">{name}</div>
                    </div>"#
                )
            })
            .collect();
        let links_html: String = pagination
            .iter()
            .map(|href| format!(r#"<a href="{href}">next</a>"#))
            .collect();
        format!(
            r#"<html><body>{cards_html}
            <nav aria-label="Search results pagination">{links_html}</nav>
            </body></html>"#
        )
    }

    #[tokio::test]
    async fn test_crawls_first_and_paginated_pages_deduplicated() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path().to_str().unwrap());
        let gateway = MockGateway::new();
        let extractor = HtmlExtractor::new();

        let page1 = results_page(
            &[("Ocean View", "/rooms/1"), ("Loft", "/rooms/2")],
            &["/s/Lisbon?page=2"],
        );
        // Page 2 repeats one listing; dedup must keep the first copy only
        let page2 = results_page(&[("Loft", "/rooms/2"), ("Casa", "/rooms/3")], &[]);
        gateway.script("https://site.test/s/Lisbon", vec![Ok(&page1)]);
        gateway.script("https://site.test/s/Lisbon?page=2", vec![Ok(&page2)]);

        let crawler = SearchCrawler::new(&gateway, &extractor, &config);
        let path = crawler.run("Lisbon").await.unwrap();

        let rows = read_batch_file(&path).unwrap();
        let mut names: Vec<&str> = rows.iter().filter_map(|r| r.get("name")).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Casa", "Loft", "Ocean View"]);
    }

    #[tokio::test]
    async fn test_card_urls_resolved_against_page() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path().to_str().unwrap());
        let gateway = MockGateway::new();
        let extractor = HtmlExtractor::new();

        let page = results_page(&[("Loft", "/rooms/2")], &[]);
        gateway.script("https://site.test/s/Lisbon", vec![Ok(&page)]);

        let crawler = SearchCrawler::new(&gateway, &extractor, &config);
        let path = crawler.run("Lisbon").await.unwrap();

        let rows = read_batch_file(&path).unwrap();
        assert_eq!(rows[0].get("url"), Some("https://site.test/rooms/2"));
    }

    #[tokio::test]
    async fn test_discovery_failure_degrades_to_first_page() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path().to_str().unwrap());
        let gateway = MockGateway::new();
        let extractor = HtmlExtractor::new();

        // First fetch (discovery) fails, later fetches succeed
        let page = results_page(&[("Loft", "/rooms/2")], &["/s/Lisbon?page=2"]);
        gateway.script("https://site.test/s/Lisbon", vec![Err(500), Ok(&page)]);

        let crawler = SearchCrawler::new(&gateway, &extractor, &config);
        let path = crawler.run("Lisbon").await.unwrap();

        let rows = read_batch_file(&path).unwrap();
        assert_eq!(rows.len(), 1);
        // The paginated page was never discovered, so never fetched
        assert_eq!(gateway.calls("https://site.test/s/Lisbon?page=2"), 0);
    }

    #[tokio::test]
    async fn test_failing_page_does_not_stop_siblings() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path().to_str().unwrap());
        let gateway = MockGateway::new();
        let extractor = HtmlExtractor::new();

        let page1 = results_page(&[("Ocean View", "/rooms/1")], &["/s/Lisbon?page=2"]);
        gateway.script("https://site.test/s/Lisbon", vec![Ok(&page1)]);
        gateway.script("https://site.test/s/Lisbon?page=2", vec![Err(500)]);

        let crawler = SearchCrawler::new(&gateway, &extractor, &config);
        let path = crawler.run("Lisbon").await.unwrap();

        let rows = read_batch_file(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some("Ocean View"));
        // search-retries = 2, so the failing page was attempted 3 times
        // (plus nothing extra from discovery, which hit page 1 only)
        assert_eq!(gateway.calls("https://site.test/s/Lisbon?page=2"), 3);
    }

    #[tokio::test]
    async fn test_term_encoded_into_search_url() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path().to_str().unwrap());
        let gateway = MockGateway::new();
        let extractor = HtmlExtractor::new();

        let page = results_page(&[("Loft", "/rooms/2")], &[]);
        gateway.script("https://site.test/s/New+York", vec![Ok(&page)]);

        let crawler = SearchCrawler::new(&gateway, &extractor, &config);
        crawler.run("New York").await.unwrap();

        assert!(gateway.calls("https://site.test/s/New+York") > 0);
    }
}
