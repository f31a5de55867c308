//! Conversion of `GitLab` user payloads into principals.
//!
//! Pure functions: no I/O, no logging. The same payload always yields an
//! equal principal.

use gitlab_authn_sdk::{GitLabUserDetails, MalformedUserDataError};
use serde_json::Value;

use super::fields;

/// Build a principal from a `GitLab` user or session object.
///
/// `id` (integer) and `username` (non-empty string) are required. `email`
/// and `private_token` are optional and read as `""` when absent or `null`.
/// Any other field is ignored.
///
/// # Errors
///
/// `MalformedUserDataError` when the payload is not an object, a required
/// field is missing or empty, or a known field has the wrong JSON type.
pub fn from_json(json: &Value) -> Result<GitLabUserDetails, MalformedUserDataError> {
    let obj = fields::object(json)?;
    let id = fields::required_i64(obj, "id")?;
    let username = fields::required_str(obj, "username")?;
    let email = fields::optional_str(obj, "email")?;
    let private_token = fields::optional_str(obj, "private_token")?;

    GitLabUserDetails::builder()
        .id(id)
        .username(username)
        .email(email)
        .private_token(private_token.to_owned())
        .build()
}
