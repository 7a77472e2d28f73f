//! # serpkeep
//!
//! Web-form search scraper that keeps what it finds.
//!
//! A query submitted through the web form is scraped from Google (with
//! Bing as a fallback) by [`serpkeep_scrape`], written as a plain-text
//! artifact to object storage, and recorded in a SQLite history. Past
//! artifacts can be listed, downloaded and deleted; a JSON endpoint serves
//! live suggestions from the same pipeline.
//!
//! - [`artifact`]: document format, key naming, the writer
//! - [`storage`]: `object_store` adapter (S3, local directory, memory)
//! - [`records`]: SQLite search history
//! - [`service`]: the operations, with user-facing banners
//! - [`web`]: axum router and server-rendered pages

pub mod artifact;
pub mod config;
pub mod error;
pub mod records;
pub mod service;
pub mod storage;
mod text;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use service::{Banner, BannerLevel, SearchOutcome, SearchService};
