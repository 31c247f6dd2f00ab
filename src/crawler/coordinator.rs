//! Top-level crawl orchestration
//!
//! Sequences the two stages: every search term runs through the search
//! controller first, then every batch file produced runs through the
//! detail controller. Failures at term or file level are logged and do
//! not stop the remaining work; the process has a single success exit
//! path.

use crate::config::Config;
use crate::crawler::detail::DetailCrawler;
use crate::crawler::search::SearchCrawler;
use crate::extract::{Extractor, HtmlExtractor};
use crate::gateway::{Gateway, ProxyGateway};
use crate::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Outcome counts for one full run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub terms_attempted: usize,
    pub terms_succeeded: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub elapsed: Duration,
}

/// Drives the full two-stage crawl
pub struct Coordinator<G: Gateway, E: Extractor> {
    config: Config,
    gateway: G,
    extractor: E,
}

impl Coordinator<ProxyGateway, HtmlExtractor> {
    /// Creates a coordinator with the production gateway and extractor
    pub fn new(config: Config) -> Result<Self> {
        let gateway = ProxyGateway::new(&config.gateway)?;
        Ok(Self {
            config,
            gateway,
            extractor: HtmlExtractor::new(),
        })
    }
}

impl<G: Gateway, E: Extractor> Coordinator<G, E> {
    /// Creates a coordinator with explicit collaborators
    pub fn with_collaborators(config: Config, gateway: G, extractor: E) -> Self {
        Self {
            config,
            gateway,
            extractor,
        }
    }

    /// Runs every term through the search stage, then every produced
    /// batch file through the detail stage
    ///
    /// # Arguments
    ///
    /// * `search_only` - Skip the detail stage entirely
    pub async fn run(&self, search_only: bool) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::default();

        let batch_files = self.run_search_stage(&mut summary).await;

        if search_only {
            tracing::info!("Skipping detail stage (--search-only)");
        } else {
            self.run_detail_stage(&batch_files, &mut summary).await;
        }

        summary.elapsed = started.elapsed();
        tracing::info!(
            "Run complete: {}/{} terms, {} detail file(s) processed, {} failed, in {:?}",
            summary.terms_succeeded,
            summary.terms_attempted,
            summary.files_processed,
            summary.files_failed,
            summary.elapsed
        );
        summary
    }

    async fn run_search_stage(&self, summary: &mut RunSummary) -> Vec<PathBuf> {
        let search = SearchCrawler::new(&self.gateway, &self.extractor, &self.config);
        let mut batch_files = Vec::new();

        for term in &self.config.search.terms {
            summary.terms_attempted += 1;
            tracing::info!("Crawling search results for '{}'", term);
            match search.run(term).await {
                Ok(path) => {
                    summary.terms_succeeded += 1;
                    batch_files.push(path);
                }
                Err(e) => {
                    tracing::error!("Search crawl for '{}' failed: {}", term, e);
                }
            }
        }

        batch_files
    }

    async fn run_detail_stage(&self, batch_files: &[PathBuf], summary: &mut RunSummary) {
        let detail = DetailCrawler::new(&self.gateway, &self.extractor, &self.config);

        for path in batch_files {
            if !path.exists() {
                tracing::info!(
                    "Batch file {} was never written (no records), skipping",
                    path.display()
                );
                continue;
            }
            match detail.run(path).await {
                Ok(()) => summary.files_processed += 1,
                Err(e) => {
                    summary.files_failed += 1;
                    tracing::error!("Detail crawl for {} failed: {}", path.display(), e);
                }
            }
        }
    }
}
