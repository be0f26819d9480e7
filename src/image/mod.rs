//! Decoded output of the image service
//!
//! Response bodies are only handed to callers after they decode as a real
//! image, so a `GeneratedImage` always carries a known format and size.

pub mod generated;

pub use generated::GeneratedImage;
