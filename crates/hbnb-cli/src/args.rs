//! Command-line and environment configuration
//!
//! Every flag can also come from the environment (or a `.env` file), so
//! `HBNB_TYPE_STORAGE=db hbnb` and `hbnb --storage db` are equivalent.

use std::path::PathBuf;

use clap::Parser;
use hbnb_core::logging_facility::Profile;
use hbnb_core::Backend;
use hbnb_store::StorageConfig;

#[derive(Debug, Parser)]
#[command(name = "hbnb")]
#[command(about = "hbnb - command interpreter for the hbnb data model", long_about = None)]
pub struct Cli {
    /// Storage backend: file or db
    #[arg(long, env = "HBNB_TYPE_STORAGE", default_value = "file")]
    pub storage: Backend,

    /// JSON document used by the file backend
    #[arg(long = "file", env = "HBNB_FILE_PATH", default_value = "file.json")]
    pub file_path: PathBuf,

    /// SQLite database used by the db backend
    #[arg(long = "db", env = "HBNB_DB_PATH", default_value = "hbnb.db")]
    pub db_path: PathBuf,

    /// Environment name; `test` recreates the database schema on startup
    #[arg(long = "env", env = "HBNB_ENV")]
    pub environment: Option<String>,

    /// Log output on stderr: pretty or json
    #[arg(long, env = "HBNB_LOG_FORMAT", default_value = "pretty")]
    pub log_format: Profile,

    /// Raise the log level to debug
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            backend: self.storage,
            file_path: self.file_path.clone(),
            db_path: self.db_path.clone(),
            reset: self.environment.as_deref() == Some("test"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["hbnb"]).unwrap();
        let config = cli.storage_config();

        if std::env::var_os("HBNB_TYPE_STORAGE").is_none() {
            assert_eq!(config.backend, Backend::File);
        }
        if std::env::var_os("HBNB_FILE_PATH").is_none() {
            assert_eq!(config.file_path, PathBuf::from("file.json"));
        }
    }

    #[test]
    fn test_flags_override() {
        let cli = Cli::try_parse_from([
            "hbnb",
            "--storage",
            "db",
            "--db",
            "/tmp/x.db",
            "--env",
            "test",
            "--log-format",
            "json",
            "-v",
        ])
        .unwrap();
        let config = cli.storage_config();

        assert_eq!(config.backend, Backend::Db);
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert!(config.reset);
        assert_eq!(cli.log_format, Profile::Production);
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["hbnb", "--storage", "mysql"]).is_err());
    }
}
