//! Domain layer for the `GitLab` `AuthN` plugin.

pub mod error;
mod fields;
pub mod group_info;
pub mod local_client;
pub mod service;
pub mod user_details;

pub use error::DomainError;
pub use local_client::GitLabAuthNLocalClient;
pub use service::Service;
