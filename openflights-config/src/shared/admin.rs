use secrecy::SecretString;
use serde::Deserialize;

/// Credentials of the administrative account provisioned at process start.
///
/// Both fields are optional so that deployments without an admin account can omit the section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Login name of the administrator.
    pub username: Option<String>,
    /// Password of the administrator. Redacted in debug output.
    pub password: Option<SecretString>,
}
