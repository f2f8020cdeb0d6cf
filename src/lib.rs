//! BandaWeb3 episode catalog.
//!
//! The [`catalog`] module loads the episodes dataset once and answers
//! read-only queries over it. [`render`], [`export`] and [`server`] turn those
//! answers into pages.

pub mod catalog;
pub mod config;
pub mod export;
pub mod render;
pub mod server;
