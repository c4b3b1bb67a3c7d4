//! # Chirp Shared
//!
//! Wire types of the Chirp HTTP API, usable from both the server and clients.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
