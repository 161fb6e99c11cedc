pub mod analyzer;
pub mod config;
pub mod geocode;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod scraper;
pub mod storage;
pub mod utils;
