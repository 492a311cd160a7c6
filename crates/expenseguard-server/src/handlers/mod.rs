//! HTTP request handlers organized by endpoint

pub mod forecast;
pub mod upload;

pub use forecast::*;
pub use upload::*;

/// GET / - Liveness text
pub async fn home() -> &'static str {
    "ExpenseGuard-AI API is running!"
}
