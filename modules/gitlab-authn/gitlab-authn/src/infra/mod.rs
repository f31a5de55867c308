//! Infrastructure adapters: configuration storage and the `GitLab` HTTP client.

pub mod config_store;
pub mod gitlab_api;
