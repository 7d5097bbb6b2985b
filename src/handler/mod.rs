//! Request handler module
//!
//! Responsible for request routing dispatch: static assets first, then the
//! render step for everything else.

pub mod render;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
