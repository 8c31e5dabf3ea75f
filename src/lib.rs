pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod feed;
pub mod scraper;
