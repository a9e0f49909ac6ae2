use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "PINHOLE_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "PINHOLE_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "PINHOLE_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "PINHOLE_MYSQL_DSN";
pub const CODE_LENGTH_ENV: &str = "PINHOLE_CODE_LENGTH";
pub const MAX_ATTEMPTS_ENV: &str = "PINHOLE_MAX_ATTEMPTS";
pub const LOG_FORMAT_ENV: &str = "PINHOLE_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "pinhole", about = "Pinhole URL shortener gateway")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public origin used to build short URLs (`{base_url}/r/{code}`).
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Length of generated short codes.
    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value_t = pinhole_generator::DEFAULT_CODE_LENGTH
    )]
    pub code_length: usize,

    /// Generated codes to try before giving up on a request.
    #[arg(
        long,
        env = MAX_ATTEMPTS_ENV,
        default_value_t = pinhole_shortener::DEFAULT_MAX_ATTEMPTS
    )]
    pub max_attempts: u32,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,
}
