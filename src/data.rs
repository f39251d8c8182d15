pub mod config;
pub mod domain;
pub mod features;
pub mod loader;
pub mod series;
