//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod notifier;
mod pubsub;
mod repository;

pub use notifier::Notifier;
pub use pubsub::{PubSub, PubSubError, PubSubMessage};
pub use repository::{BaseRepository, PostRepository};
