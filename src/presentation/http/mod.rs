//! HTTP Layer
//!
//! Routes, page handlers and templates.

pub mod handlers;
pub mod routes;
pub mod templates;

pub use routes::create_router;
pub use templates::{Pages, Template, TemplateError};
