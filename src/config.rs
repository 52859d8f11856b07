/// Configuration management for the skill swap server.
/// Handles command-line argument parsing and config structure.
use clap::Parser;
use std::path::PathBuf;

use crate::services::AuthSettings;

/// One year
pub const MAX_SESSION_TTL_MINUTES: i64 = 525_600;
/// Ten years
pub const MAX_REFRESH_TTL_DAYS: i64 = 3650;

#[derive(Parser, Debug)]
#[command(name = "Skill Swap Server")]
#[command(about = "Peer-to-peer skill exchange REST API", long_about = None)]
pub struct Config {
    /// Server port (default: 4000)
    #[arg(long, default_value = "4000")]
    pub port: u16,

    /// Address to bind (default: 127.0.0.1)
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// SQLite database file path (default: skillswap.db)
    #[arg(long, default_value = "skillswap.db")]
    pub database: PathBuf,

    /// PID file path (optional) - write server PID to this file on startup
    #[arg(long)]
    pub pidfile: Option<PathBuf>,

    /// Access token lifetime in minutes
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(i64).range(1..=MAX_SESSION_TTL_MINUTES))]
    pub session_ttl_minutes: i64,

    /// Refresh token lifetime in days
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(i64).range(1..=MAX_REFRESH_TTL_DAYS))]
    pub refresh_ttl_days: i64,

    /// Email of an admin account to create or promote on startup
    #[arg(long, requires_all = ["admin_password", "admin_phone"])]
    pub admin_email: Option<String>,

    /// Password for a newly created admin account
    #[arg(long, requires = "admin_email")]
    pub admin_password: Option<String>,

    /// Phone number for a newly created admin account
    #[arg(long, requires = "admin_email")]
    pub admin_phone: Option<String>,

    /// Display name for a newly created admin account
    #[arg(long, default_value = "Administrator")]
    pub admin_name: String,
}

/// Admin account to ensure at startup
#[derive(Debug, Clone, PartialEq)]
pub struct AdminBootstrap<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub phone: &'a str,
    pub name: &'a str,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            session_ttl: chrono::Duration::minutes(self.session_ttl_minutes),
            refresh_ttl: chrono::Duration::days(self.refresh_ttl_days),
        }
    }

    pub fn admin_bootstrap(&self) -> Option<AdminBootstrap<'_>> {
        Some(AdminBootstrap {
            email: self.admin_email.as_deref()?,
            password: self.admin_password.as_deref()?,
            phone: self.admin_phone.as_deref()?,
            name: &self.admin_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("skill-swap-server").chain(args.iter().copied()))
    }

    #[test]
    fn test_default_config() {
        let config = parse(&[]).expect("Defaults should parse");
        assert_eq!(config.port, 4000);
        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
        assert_eq!(config.database, PathBuf::from("skillswap.db"));
        assert!(config.pidfile.is_none());
        assert!(config.admin_bootstrap().is_none());

        let settings = config.auth_settings();
        assert_eq!(settings.session_ttl.num_minutes(), 60);
        assert_eq!(settings.refresh_ttl.num_days(), 30);
    }

    #[test]
    fn test_custom_values() {
        let config = parse(&[
            "--port",
            "8080",
            "--bind",
            "0.0.0.0",
            "--database",
            "/tmp/custom.db",
            "--session-ttl-minutes",
            "5",
        ])
        .expect("Arguments should parse");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.database, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.auth_settings().session_ttl.num_minutes(), 5);
    }

    #[test]
    fn test_admin_flags() {
        let config = parse(&[
            "--admin-email",
            "root@example.com",
            "--admin-password",
            "rootpass1",
            "--admin-phone",
            "5550009999",
        ])
        .expect("Arguments should parse");
        let admin = config.admin_bootstrap().expect("Admin bootstrap expected");
        assert_eq!(admin.email, "root@example.com");
        assert_eq!(admin.name, "Administrator");

        assert!(parse(&["--admin-email", "root@example.com"]).is_err());
        assert!(parse(&["--admin-password", "rootpass1"]).is_err());
    }

    #[test]
    fn test_rejects_zero_ttl() {
        assert!(parse(&["--refresh-ttl-days", "0"]).is_err());
    }

    #[test]
    fn test_ttl_upper_bounds() {
        assert!(parse(&["--session-ttl-minutes", "525600"]).is_ok());
        assert!(parse(&["--session-ttl-minutes", "525601"]).is_err());
        assert!(parse(&["--refresh-ttl-days", "3650"]).is_ok());
        assert!(parse(&["--refresh-ttl-days", "3651"]).is_err());
        assert!(parse(&["--refresh-ttl-days", "9223372036854775807"]).is_err());
    }
}
