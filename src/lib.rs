pub mod browser;
pub mod detail;
pub mod error;
pub mod expand;
pub mod listing;
pub mod output;
pub mod pipeline;
pub mod record;

pub use error::ScrapeError;
pub use pipeline::{ProblemScraper, ProblemScraperBuilder, ScrapeReport};
pub use record::ProblemRecord;
