// src/api/mod.rs

pub mod admin;    // Admin-only endpoints
pub mod handlers; // Authentication endpoints
pub mod response; // Uniform JSON envelope
pub mod routes;   // Route table and middleware stack

pub use response::ApiResponse;
pub use routes::build_router;
