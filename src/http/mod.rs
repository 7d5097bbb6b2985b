//! HTTP protocol layer module
//!
//! Response builders, content types and cache validators shared by the
//! static file path and the render path.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_413_response, build_500_response, build_html_response,
};
