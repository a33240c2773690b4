pub mod args;
pub mod collector;
pub mod config;
pub mod domain;
pub mod feed;
pub mod fetch;
pub mod pipeline;
pub mod scoring;
pub mod sources;
pub mod stats;
pub mod utils;

pub use args::{Args, Command};
pub use config::{init_default_config, load_config, Config};
pub use feed::{Feed, ScoredDomain};
pub use pipeline::{collect_domains, generate_feeds};
pub use scoring::{detect_niche, score_domain, Niche};
pub use stats::{CollectionReport, FeedReport};
