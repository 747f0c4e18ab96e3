//! Connection settings.

use serde::{Deserialize, Serialize};

/// Settings handed to the driver when a connection opens.
///
/// Constructed explicitly and passed by reference; there is no process-wide
/// settings object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: Option<u16>,
    /// Connection character set, applied by the driver after connecting.
    pub charset: String,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            password: String::new(),
            database: String::new(),
            host: "localhost".to_string(),
            port: None,
            charset: "utf8".to_string(),
        }
    }
}

impl ConnectConfig {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }
}
