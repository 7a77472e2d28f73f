//! Search engine implementations.
//!
//! Each module provides a struct implementing [`crate::engine::Engine`] that
//! scrapes a specific search engine's HTML results page.

pub mod bing;
pub mod google;

pub use bing::BingEngine;
pub use google::GoogleEngine;
