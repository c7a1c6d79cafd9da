//! # Data Loader Crate
//!
//! This crate loads and indexes the creative success dataset.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (SuccessEvent, Creative, CreativeStats, DataIndex)
//! - **parser**: Parse the CSV files and ingestion bodies into Rust structs
//! - **index**: Load a dataset directory and compute per-creative aggregates
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("datasets"))?;
//!
//! let creative = index.get_creative(12).unwrap();
//! let stats = index.get_creative_stats(12).unwrap();
//! println!("{} has {} success events", creative.name, stats.nbr_success_count);
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{CREATIVES_FILE, SUCCESS_EVENTS_FILE};
pub use types::{Creative, CreativeId, CreativeStats, DataIndex, SuccessEvent, UserId};
