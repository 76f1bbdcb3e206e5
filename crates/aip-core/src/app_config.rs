use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// bcrypt cost for newly hashed admin passwords.
    pub password_cost: u32,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// `cloudinary://<api_key>:<api_secret>@<cloud_name>`; uploads are
    /// disabled when unset.
    pub media_url: Option<String>,
    pub media_api_base: String,
    pub media_timeout_secs: u64,
    pub session_ttl_hours: u32,
    pub allow_sign_up: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("password_cost", &self.password_cost)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("media_url", &self.media_url.as_ref().map(|_| "[redacted]"))
            .field("media_api_base", &self.media_api_base)
            .field("media_timeout_secs", &self.media_timeout_secs)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("allow_sign_up", &self.allow_sign_up)
            .finish()
    }
}
