//! Conversion of `GitLab` group payloads.

use gitlab_authn_sdk::{GitLabGroupInfo, MalformedUserDataError};
use serde_json::Value;

use super::fields;

/// # Errors
///
/// `MalformedUserDataError` when `id`, `name` or `path` is missing or has the
/// wrong type.
pub fn from_json(json: &Value) -> Result<GitLabGroupInfo, MalformedUserDataError> {
    let obj = fields::object(json)?;
    Ok(GitLabGroupInfo {
        id: fields::required_i64(obj, "id")?,
        name: fields::required_str(obj, "name")?.to_owned(),
        path: fields::required_str(obj, "path")?.to_owned(),
    })
}
