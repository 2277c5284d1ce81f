pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use config::{Config, LoadTarget};
pub use error::{PipelineError, PipelineResult};
