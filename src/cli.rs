//! Command-line interface for code-tunnel.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone)]
pub struct Args {
    /// Host address to bind to. `None` when the flag was not given so
    /// that environment and config-file values are not shadowed.
    pub host: Option<IpAddr>,
    /// Port to listen on. `None` when the flag was not given.
    pub port: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Origins permitted by the CORS layer (repeatable).
    pub allow_origins: Vec<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            config: None,
            allow_origins: Vec::new(),
            log_level: None,
            version: false,
            help: false,
        }
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("host", value))?,
                );
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('o') | Long("allow-origin") => {
                result.allow_origins.push(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"code-tunnel {version}
Lightweight session-scoped code execution backend for interactive editors

USAGE:
    code-tunnel [OPTIONS]

OPTIONS:
    -H, --host <ADDR>         Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>         Port to listen on [default: 8000]
    -c, --config <FILE>       Path to configuration file (JSON)
    -o, --allow-origin <URL>  Permitted CORS origin (repeatable)
    -l, --log-level <LVL>     Log level (error, warn, info, debug, trace)
    -h, --help                Print help
    -V, --version             Print version

ENVIRONMENT VARIABLES:
    CODE_TUNNEL_HOST          Host address (overrides config)
    CODE_TUNNEL_PORT          Port number (overrides config)
    ALLOWED_ORIGINS           Comma-separated CORS origins (overrides config)
    CODE_TUNNEL_LOG_LEVEL     Log level (overrides config)
    RUST_LOG                  Alternative log level setting

EXAMPLES:
    # Start with defaults (localhost:8000, local dev origins)
    code-tunnel

    # Start on all interfaces for a deployed frontend
    code-tunnel -H 0.0.0.0 -p 8000 -o https://ide.example.com

    # Start with config file
    code-tunnel -c /etc/code-tunnel/config.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("code-tunnel {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
