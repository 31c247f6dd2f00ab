//! Crawl orchestration
//!
//! The crawl runs in two stages. The search stage discovers paginated
//! result pages per term and fans out bounded-concurrency fetches into
//! one pipeline per term. The detail stage reads each term's batch file
//! back and fans out per-listing crawls, each with its own review
//! pipeline. The coordinator sequences the stages.

pub mod coordinator;
pub mod detail;
pub mod fetch;
pub mod search;

pub use coordinator::{Coordinator, RunSummary};
pub use detail::DetailCrawler;
pub use fetch::{fetch_with_retry, FetchOutcome};
pub use search::SearchCrawler;
