//! Detail crawl controller
//!
//! Reads a term's batch file back and, for each listing row, crawls the
//! listing's detail page for reviews. Every row gets its own pipeline
//! whose destination is derived from the sanitized listing name, so the
//! output is one review file per listing. Rows run concurrently under a
//! semaphore; a row whose retries are exhausted is logged and skipped,
//! and its pipeline is closed with whatever it holds on every exit path.

use crate::config::Config;
use crate::crawler::fetch::{fetch_with_retry, FetchOutcome};
use crate::extract::Extractor;
use crate::gateway::{FetchOptions, Gateway};
use crate::output::{read_batch_file, sanitize_name, DelimitedSink, Row};
use crate::pipeline::Pipeline;
use crate::records::ReviewRecord;
use crate::{HarvestError, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Crawls per-listing detail pages from one batch file at a time
pub struct DetailCrawler<'a, G: Gateway, E: Extractor> {
    gateway: &'a G,
    extractor: &'a E,
    config: &'a Config,
    options: FetchOptions,
}

impl<'a, G: Gateway, E: Extractor> DetailCrawler<'a, G, E> {
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

    /// Crawls reviews for every listing row in a batch file
    pub async fn run(&self, batch_path: &Path) -> Result<()> {
        let rows = read_batch_file(batch_path)?;
        if rows.is_empty() {
            tracing::info!("Batch file {} has no rows", batch_path.display());
            return Ok(());
        }

        for column in ["name", "url"] {
            if rows[0].get(column).is_none() {
                return Err(HarvestError::MissingColumn {
                    path: batch_path.display().to_string(),
                    column: column.to_string(),
                });
            }
        }

        tracing::info!(
            "Crawling detail pages for {} listing(s) from {}",
            rows.len(),
            batch_path.display()
        );

        let semaphore = Arc::new(Semaphore::new(self.config.crawler.detail_concurrency));
        let tasks = rows.iter().map(|row| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                self.crawl_row(row).await;
            }
        });
        join_all(tasks).await;

        Ok(())
    }

    /// Crawls one listing row into its own review pipeline
    async fn crawl_row(&self, row: &Row) {
        // Columns were checked against the header up front
        let name = row.get("name").unwrap_or("No name");
        let url = match row.get("url") {
            Some(url) => url,
            None => {
                tracing::warn!("Row '{}' has no url, skipping", name);
                return;
            }
        };

        let pipeline = Pipeline::new(
            DelimitedSink::new(self.review_destination(name)),
            self.config.crawler.batch_threshold,
        );

        match self.fetch_reviews(url).await {
            Ok(records) => {
                for record in records {
                    if let Err(e) = pipeline.add(record) {
                        tracing::error!("Failed to persist review from {}: {}", url, e);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Skipping listing '{}': {}", name, e);
            }
        }

        if let Err(e) = pipeline.close() {
            tracing::error!("Failed to close review pipeline for '{}': {}", name, e);
        }
    }

    /// Fetches and extracts one detail page with retries
    async fn fetch_reviews(&self, url: &str) -> Result<Vec<ReviewRecord>> {
        fetch_with_retry(url, self.config.crawler.detail_retries, || async move {
            match self.gateway.fetch(url, &self.options).await {
                Ok(html) => {
                    let cards = self.extractor.review_cards(&html);
                    if cards.is_empty() {
                        FetchOutcome::Retryable("no review cards extracted".to_string())
                    } else {
                        FetchOutcome::Success(
                            cards
                                .into_iter()
                                .map(|card| {
                                    ReviewRecord::new(
                                        card.name.as_deref(),
                                        card.stars,
                                        card.review.as_deref(),
                                    )
                                })
                                .collect(),
                        )
                    }
                }
                Err(e) => FetchOutcome::Retryable(e.to_string()),
            }
        })
        .await
    }

    /// One review file per listing, named after the sanitized row name
    ///
    /// Review files live in their own subdirectory so a listing whose
    /// name matches a search term can never collide with that term's
    /// batch file.
    fn review_destination(&self, name: &str) -> PathBuf {
        PathBuf::from(&self.config.output.directory)
            .join("reviews")
            .join(format!("{}.csv", sanitize_name(name)))
    }
}
