//! Process configuration
//!
//! Every setting is a command-line flag with an environment fallback. The
//! database variables keep the names the deployment already uses
//! (`PGSQL_*`, `DEVELOPMENT`).

use crate::error::{DashboardError, DashboardResult};
use crate::session::{DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pna_store::PgSettings;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Development or production behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Pretty logs, permissive CORS, in-memory store allowed
    Development,
    /// JSON logs, database required
    #[default]
    Production,
}

impl RunMode {
    /// Mode for a `DEVELOPMENT` value; only `1` selects development
    #[must_use]
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim() == "1" {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// Whether this is development mode
    #[inline]
    #[must_use]
    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    /// Log filter used when none is configured
    #[must_use]
    pub fn default_log_level(self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Production => "info",
        }
    }
}

/// What the process was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Run the HTTP server
    Serve,
    /// Block until the database accepts connections
    WaitForDb,
    /// Validate the callback graph, print the evaluation order and exit
    Check,
}

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Run mode
    pub mode: RunMode,
    /// HTTP listen address
    pub listen_addr: SocketAddr,
    /// Directory holding the corpus artifacts
    pub data_dir: PathBuf,
    /// Directory served under `/pna/pna/static`
    pub static_dir: Option<PathBuf>,
    /// Explicit log filter; `None` uses the mode's default
    pub log_level: Option<String>,
    /// Database settings, if configured
    pub database: Option<PgSettings>,
    /// Idle time after which a session is evicted
    pub session_idle: Duration,
    /// Live sessions kept at most
    pub max_sessions: u64,
}

impl DashboardConfig {
    /// Production defaults, no database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With run mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// With listen address
    #[inline]
    #[must_use]
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// With corpus directory
    #[inline]
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// With static asset directory
    #[inline]
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// With database settings
    #[inline]
    #[must_use]
    pub fn with_database(mut self, settings: PgSettings) -> Self {
        self.database = Some(settings);
        self
    }

    /// Effective log filter
    #[must_use]
    pub fn log_filter(&self) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| self.mode.default_log_level().to_string())
    }

    /// Database settings, or an error naming what is missing
    ///
    /// # Errors
    /// [`DashboardError::Config`] when `PGSQL_HOST` is not set.
    pub fn require_database(&self) -> DashboardResult<&PgSettings> {
        self.database
            .as_ref()
            .ok_or_else(|| DashboardError::Config("PGSQL_HOST is not set".into()))
    }

    /// Read the configuration from parsed arguments
    ///
    /// # Errors
    /// [`DashboardError::Config`] when `PGSQL_HOST` is set but another
    /// database setting is missing.
    pub fn from_matches(matches: &ArgMatches) -> DashboardResult<Self> {
        let string = |id: &str| matches.get_one::<String>(id).cloned();
        let mode = RunMode::from_flag(&string("development").unwrap_or_default());

        let database = match string("pg-host") {
            None => None,
            Some(host) => {
                let require = |id: &str, var: &str| {
                    string(id).ok_or_else(|| {
                        DashboardError::Config(format!("PGSQL_HOST is set but {var} is not"))
                    })
                };
                Some(PgSettings {
                    host,
                    port: matches.get_one::<u16>("pg-port").copied().unwrap_or(5432),
                    username: require("pg-username", "PGSQL_USERNAME")?,
                    password: require("pg-password", "PGSQL_PASSWORD")?,
                    database: require("pg-db", "PGSQL_DB")?,
                })
            }
        };

        Ok(Self {
            mode,
            listen_addr: matches
                .get_one::<SocketAddr>("listen")
                .copied()
                .unwrap_or_else(default_listen_addr),
            data_dir: matches
                .get_one::<PathBuf>("data-dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("data")),
            static_dir: matches.get_one::<PathBuf>("static-dir").cloned(),
            log_level: string("log-level"),
            database,
            session_idle: matches
                .get_one::<u64>("session-idle-secs")
                .map_or(DEFAULT_IDLE_TIMEOUT, |s| Duration::from_secs(*s)),
            max_sessions: matches
                .get_one::<u64>("max-sessions")
                .copied()
                .unwrap_or(DEFAULT_MAX_SESSIONS),
        })
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            listen_addr: default_listen_addr(),
            data_dir: PathBuf::from("data"),
            static_dir: None,
            log_level: None,
            database: None,
            session_idle: DEFAULT_IDLE_TIMEOUT,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8050))
}

/// Command-line interface
#[must_use]
pub fn cli() -> Command {
    Command::new("pna-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Propaganda narrative analysis dashboard")
        .arg(
            Arg::new("listen")
                .long("listen")
                .env("PNA_LISTEN_ADDR")
                .default_value("0.0.0.0:8050")
                .value_parser(value_parser!(SocketAddr))
                .global(true)
                .help("HTTP listen address"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .env("PNA_DATA_DIR")
                .default_value("data")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Directory holding the corpus artifacts"),
        )
        .arg(
            Arg::new("static-dir")
                .long("static-dir")
                .env("PNA_STATIC_DIR")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Directory served under /pna/pna/static"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .env("PNA_LOG_LEVEL")
                .global(true)
                .help("Log filter (defaults to debug in development, info otherwise)"),
        )
        .arg(
            Arg::new("session-idle-secs")
                .long("session-idle-secs")
                .env("PNA_SESSION_IDLE_SECS")
                .default_value("1800")
                .value_parser(value_parser!(u64).range(1..))
                .global(true)
                .help("Seconds of inactivity after which a session is dropped"),
        )
        .arg(
            Arg::new("max-sessions")
                .long("max-sessions")
                .env("PNA_MAX_SESSIONS")
                .default_value("10000")
                .value_parser(value_parser!(u64).range(1..))
                .global(true)
                .help("Live sessions kept at most"),
        )
        .arg(
            Arg::new("development")
                .long("development")
                .env("DEVELOPMENT")
                .default_value("0")
                .global(true)
                .help("1 for development mode"),
        )
        .arg(
            Arg::new("pg-host")
                .long("pg-host")
                .env("PGSQL_HOST")
                .global(true)
                .help("PostgreSQL host"),
        )
        .arg(
            Arg::new("pg-port")
                .long("pg-port")
                .env("PGSQL_PORT")
                .default_value("5432")
                .value_parser(value_parser!(u16))
                .global(true)
                .help("PostgreSQL port"),
        )
        .arg(
            Arg::new("pg-username")
                .long("pg-username")
                .env("PGSQL_USERNAME")
                .global(true)
                .help("PostgreSQL user"),
        )
        .arg(
            Arg::new("pg-password")
                .long("pg-password")
                .env("PGSQL_PASSWORD")
                .hide_env_values(true)
                .global(true)
                .help("PostgreSQL password"),
        )
        .arg(
            Arg::new("pg-db")
                .long("pg-db")
                .env("PGSQL_DB")
                .global(true)
                .help("PostgreSQL database"),
        )
        .subcommand(Command::new("serve").about("Run the dashboard server (default)"))
        .subcommand(
            Command::new("wait-for-db")
                .about("Wait until the database accepts connections")
                .arg(
                    Arg::new("interval-ms")
                        .long("interval-ms")
                        .default_value("100")
                        .value_parser(value_parser!(u64))
                        .help("Delay between connection attempts"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate the callback graph and print the evaluation order")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the callback descriptors as JSON"),
                ),
        )
}

/// Action selected by the subcommand; no subcommand means [`Action::Serve`]
#[must_use]
pub fn action(matches: &ArgMatches) -> Action {
    match matches.subcommand_name() {
        Some("wait-for-db") => Action::WaitForDb,
        Some("check") => Action::Check,
        _ => Action::Serve,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> (Action, DashboardConfig) {
        let matches = cli()
            .try_get_matches_from(std::iter::once("pna-server").chain(args.iter().copied()))
            .unwrap();
        (action(&matches), DashboardConfig::from_matches(&matches).unwrap())
    }

    #[test]
    fn mode_flag() {
        assert_eq!(RunMode::from_flag("1"), RunMode::Development);
        assert_eq!(RunMode::from_flag("0"), RunMode::Production);
        assert_eq!(RunMode::from_flag(""), RunMode::Production);
        assert_eq!(RunMode::Development.default_log_level(), "debug");
    }

    #[test]
    fn flags_build_config() {
        let (action, config) = parse(&[
            "--development",
            "1",
            "--data-dir",
            "/srv/pna",
            "--pg-host",
            "db",
            "--pg-username",
            "pna",
            "--pg-password",
            "secret",
            "--pg-db",
            "narratives",
            "check",
        ]);
        assert_eq!(action, Action::Check);
        assert!(config.mode.is_development());
        assert_eq!(config.data_dir, PathBuf::from("/srv/pna"));
        assert_eq!(config.session_idle, DEFAULT_IDLE_TIMEOUT);
        let db = config.require_database().unwrap();
        assert_eq!(db.host, "db");
        assert_eq!(db.database, "narratives");
    }

    #[test]
    fn partial_database_settings_are_rejected() {
        let matches = cli()
            .try_get_matches_from(["pna-server", "--pg-host", "db", "--pg-username", "pna"])
            .unwrap();
        if std::env::var_os("PGSQL_PASSWORD").is_none() {
            assert!(matches!(
                DashboardConfig::from_matches(&matches),
                Err(DashboardError::Config(_))
            ));
        }
    }

    #[test]
    fn session_limits_from_flags() {
        let (_, config) = parse(&["--session-idle-secs", "60", "--max-sessions", "25"]);
        assert_eq!(config.session_idle, Duration::from_secs(60));
        assert_eq!(config.max_sessions, 25);
        assert!(cli()
            .try_get_matches_from(["pna-server", "--session-idle-secs", "0"])
            .is_err());
    }

    #[test]
    fn builder_defaults() {
        let config = DashboardConfig::new()
            .with_mode(RunMode::Development)
            .with_static_dir("static");
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.listen_addr.port(), 8050);
        assert!(config.require_database().is_err());
    }
}
