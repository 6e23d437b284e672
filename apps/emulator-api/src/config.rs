//! Configuration for the emulator API

use core_config::{app_info, server::ServerConfig, AppInfo, ConfigError, FromEnv};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration.
///
/// Composes shared config components from `core_config`/`database` with the
/// settings specific to running a cloud emulator: where object bytes live on
/// disk, how to reach the container engine, and the naming/timing knobs the
/// specification calls out.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub emulator: EmulatorConfig,
}

/// Settings unique to the emulator, with no counterpart in a typical API
/// service: object-store location, container-engine naming, and sweep timing.
#[derive(Clone, Debug)]
pub struct EmulatorConfig {
    /// Where object bytes are written on local disk.
    pub object_store_base_dir: String,
    /// Prefix used when naming bridge networks and containers the emulator
    /// creates on the host engine, e.g. `{vendor_prefix}-{project}-{network}`.
    pub vendor_prefix: String,
    /// Optional override for the Docker (or Docker-compatible) engine socket.
    /// When unset, `bollard` resolves the platform default the same way the
    /// Docker CLI does.
    pub docker_host: Option<String>,
    /// Base URL prefixed to signed-URL tokens, e.g. `http://localhost:8080`.
    pub signed_url_base: String,
    /// Single image every instance is created from; the emulator does not
    /// model an image catalog.
    pub instance_image: String,
    /// Interval between opportunistic sweeps of orphaned blob files and
    /// expired signed-URL sessions.
    pub sweep_interval_secs: u64,
    /// Per-request deadline enforced by `tower_http::timeout::TimeoutLayer`.
    pub request_deadline_secs: u64,
    /// Largest object body accepted by the upload/multipart handlers.
    pub max_upload_bytes: u64,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let emulator = EmulatorConfig::from_env(&server)?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            emulator,
        })
    }
}

impl EmulatorConfig {
    fn from_env(server: &ServerConfig) -> eyre::Result<Self> {
        let object_store_base_dir =
            core_config::env_or_default("OBJECT_STORE_BASE_DIR", "./data/objects");
        let vendor_prefix = core_config::env_or_default("VENDOR_PREFIX", "emu");
        let docker_host = std::env::var("DOCKER_HOST").ok();
        let signed_url_base = core_config::env_or_default(
            "SIGNED_URL_BASE",
            &format!("http://{}", server.address()),
        );
        let instance_image = core_config::env_or_default("INSTANCE_IMAGE", "alpine:latest");
        let sweep_interval_secs = core_config::env_or_default("ORPHAN_SWEEP_INTERVAL_SECS", "300")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "ORPHAN_SWEEP_INTERVAL_SECS".to_string(),
                details: format!("{e}"),
            })?;
        let request_deadline_secs = core_config::env_or_default("REQUEST_DEADLINE_SECS", "30")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "REQUEST_DEADLINE_SECS".to_string(),
                details: format!("{e}"),
            })?;
        let max_upload_bytes = core_config::env_or_default("MAX_UPLOAD_BYTES", &(5 * 1024 * 1024 * 1024u64).to_string())
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "MAX_UPLOAD_BYTES".to_string(),
                details: format!("{e}"),
            })?;

        Ok(Self {
            object_store_base_dir,
            vendor_prefix,
            docker_host,
            signed_url_base,
            instance_image,
            sweep_interval_secs,
            request_deadline_secs,
            max_upload_bytes,
        })
    }
}
