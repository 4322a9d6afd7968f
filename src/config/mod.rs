use anyhow::Result;
use std::env;

/// Runtime configuration for the file storage service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Maximum request body size in bytes (default: 100 MB)
    pub max_file_size: usize,

    /// Validity window of presigned download URLs in seconds (default: 3600)
    pub download_url_ttl_secs: u64,

    /// Role claim value that grants delete rights (default: "admin")
    pub admin_role: String,

    /// HS256 secret used to verify bearer tokens. Empty means no HS256 tokens
    /// are accepted.
    pub jwt_secret: String,

    /// Optional RS256 public key (PEM); takes precedence over `jwt_secret`
    pub jwt_public_key: Option<String>,

    /// Seconds between reconciliation sweeps (default: 3600)
    pub reconcile_interval_secs: u64,

    /// Objects younger than this are never reported as orphans (default: 900)
    pub reconcile_grace_secs: i64,

    /// Whether the sweep deletes what it finds or only reports it
    pub reconcile_repair: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024,
            download_url_ttl_secs: 3600,
            admin_role: "admin".to_string(),
            jwt_secret: String::new(),
            jwt_public_key: None,
            reconcile_interval_secs: 3600,
            reconcile_grace_secs: 900,
            reconcile_repair: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Fails when neither `JWT_SECRET` nor `JWT_PUBLIC_KEY` is set.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let jwt_secret = var("JWT_SECRET").filter(|v| !v.is_empty());
        let jwt_public_key = var("JWT_PUBLIC_KEY").filter(|v| !v.is_empty());
        if jwt_secret.is_none() && jwt_public_key.is_none() {
            anyhow::bail!("JWT_SECRET or JWT_PUBLIC_KEY must be set");
        }

        Ok(Self {
            max_file_size: var("MAX_FILE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            download_url_ttl_secs: var("DOWNLOAD_URL_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.download_url_ttl_secs),

            admin_role: var("ADMIN_ROLE").unwrap_or(default.admin_role),

            jwt_secret: jwt_secret.unwrap_or_default(),

            jwt_public_key,

            reconcile_interval_secs: var("RECONCILE_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.reconcile_interval_secs),

            reconcile_grace_secs: var("RECONCILE_GRACE_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.reconcile_grace_secs),

            reconcile_repair: var("RECONCILE_REPAIR")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.reconcile_repair),
        })
    }

    /// Config for tests and local runs: short sweep interval, repairs enabled
    pub fn development() -> Self {
        Self {
            jwt_secret: "dev-secret".to_string(),
            reconcile_interval_secs: 60,
            reconcile_grace_secs: 0,
            reconcile_repair: true,
            ..Self::default()
        }
    }
}
