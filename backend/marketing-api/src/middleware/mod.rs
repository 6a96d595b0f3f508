pub mod auth;

pub use auth::{issue_token, require_auth, Claims, CurrentUser};
