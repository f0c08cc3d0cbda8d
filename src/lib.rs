pub mod classification;
pub mod config;
pub mod errors;
pub mod export;
pub mod filtering;
pub mod ingestor;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod utils;
