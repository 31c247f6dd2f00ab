//! Configuration loading and validation
//!
//! Configuration is loaded from a TOML file with kebab-case keys. The
//! gateway credential lives here too, so the whole crawl is driven by a
//! single local file.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, CrawlerConfig, GatewayConfig, OutputConfig, SearchConfig, SiteConfig};
pub use validation::validate;
