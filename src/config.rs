use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Backend the widget talks to unless configured otherwise.
pub const DEFAULT_BASE_URL: &str = "https://flaskbackenddogapp-production.up.railway.app";

/// Config file picked up from the working directory when no path is given.
const CWD_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Backend base URL (realtime channel and HTTP endpoints)
    #[arg(long, env = "CHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Directory downloaded transcripts are saved into
    #[arg(long, env = "DOWNLOAD_DIR")]
    pub download_dir: Option<String>,

    /// Log filter directive (e.g. "debug" or "krypto_chat=trace")
    #[arg(long, env = "LOG_FILTER")]
    pub log_filter: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub download: DownloadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownloadConfig {
    pub directory: PathBuf,
    pub extension: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        // Priority: CLI flag / CLI env var > KRYPTO_* env > config file > defaults.
        let mut builder = Config::builder()
            .set_default("server.base_url", DEFAULT_BASE_URL)?
            .set_default("download.directory", ".")?
            .set_default("download.extension", "pdf")?
            .set_default("logging.filter", "info")?
            .set_default("logging.json", false)?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::new(path, FileFormat::Yaml).required(true));
        } else if Path::new(CWD_CONFIG_FILE).exists() {
            builder = builder.add_source(File::new(CWD_CONFIG_FILE, FileFormat::Yaml));
        }

        // E.g. KRYPTO_SERVER__BASE_URL=http://localhost:5000
        builder = builder.add_source(
            Environment::with_prefix("KRYPTO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = cli.base_url {
            builder = builder.set_override("server.base_url", url)?;
        }
        if let Some(dir) = cli.download_dir {
            builder = builder.set_override("download.directory", dir)?;
        }
        if let Some(filter) = cli.log_filter {
            builder = builder.set_override("logging.filter", filter)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("logging.json", json)?;
        }

        builder.build()?.try_deserialize()
    }
}
