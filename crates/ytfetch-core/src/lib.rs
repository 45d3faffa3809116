pub mod config;
pub mod logging;

pub mod batch;
pub mod control;
pub mod error;
pub mod extractor;
pub mod job;
pub mod locator;
pub mod options;
pub mod retry;
