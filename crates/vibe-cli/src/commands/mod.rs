pub mod challenge;
pub mod config;
pub mod feed;
pub mod profile;
