use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub connector: ConnectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: u64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Uploads with more data rows than this are rejected outright.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { max_rows: default_max_rows() }
    }
}

/// Knobs for the simulated platform login.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_failure_markers")]
    pub failure_markers: Vec<String>,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            failure_markers: default_failure_markers(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_backend() -> StorageBackend {
    StorageBackend::Postgres
}

fn default_max_connections() -> u32 {
    10
}

fn default_expiry_hours() -> u64 {
    24
}

fn default_max_rows() -> usize {
    100
}

fn default_min_delay_ms() -> u64 {
    1500
}

fn default_max_delay_ms() -> u64 {
    3000
}

fn default_failure_markers() -> Vec<String> {
    vec!["fail".to_string(), "invalid".to_string(), "blocked".to_string()]
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("connector.failure_markers")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.backend", "postgres")?
            .set_default("database.url", "postgres://localhost/reachflow")?
            .set_default("database.max_connections", 10)?
            .set_default("jwt.secret", "development-secret-change-in-production")?
            .set_default("jwt.expiry_hours", 24)?
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration suitable for tests and local runs without PostgreSQL.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: String::new(),
                max_connections: default_max_connections(),
            },
            jwt: JwtConfig {
                secret: jwt_secret.to_string(),
                expiry_hours: default_expiry_hours(),
            },
            logging: LoggingConfig::default(),
            import: ImportConfig::default(),
            connector: ConnectorConfig {
                min_delay_ms: 0,
                max_delay_ms: 0,
                failure_markers: default_failure_markers(),
            },
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.connector.min_delay_ms > self.connector.max_delay_ms {
            anyhow::bail!(
                "connector.min_delay_ms ({}) exceeds connector.max_delay_ms ({})",
                self.connector.min_delay_ms,
                self.connector.max_delay_ms
            );
        }
        if self.import.max_rows == 0 {
            anyhow::bail!("import.max_rows must be at least 1");
        }
        if self.jwt.secret.is_empty() {
            anyhow::bail!("jwt.secret must not be empty");
        }
        Ok(())
    }
}
