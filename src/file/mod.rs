//! File management and path utilities
//!
//! This module handles output-directory preparation, file-name
//! sanitization, and collision-free path allocation for downloaded and
//! extracted artifacts.

pub mod paths;

// Re-export commonly used helpers
pub use paths::{prepare_output_dir, sanitize_file_name, unique_path};
