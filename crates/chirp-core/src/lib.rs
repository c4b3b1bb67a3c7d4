//! # Chirp Core
//!
//! The domain layer of the Chirp micro-post feed.
//! Posts, replies, likes and the notifications they trigger, expressed as pure
//! business logic over the ports in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use service::FeedStore;
