//! Command line and environment configuration for the server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use time::Duration;

/// The REST API server for FinTrack.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct ServerConfig {
    /// File path to the application SQLite database.
    #[arg(long)]
    pub db_path: String,

    /// The address to listen on.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    /// The secret used to sign bearer tokens. Must be at least 32 bytes.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// How long bearer tokens stay valid, in minutes.
    #[arg(long, default_value_t = 60 * 24)]
    pub token_duration_minutes: u32,
}

impl ServerConfig {
    /// The socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The lifetime of newly issued bearer tokens.
    pub fn token_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.token_duration_minutes))
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr};

    use clap::Parser;
    use time::Duration;

    use super::ServerConfig;

    #[test]
    fn defaults_to_localhost_and_one_day_tokens() {
        let config = ServerConfig::try_parse_from([
            "server",
            "--db-path",
            "test.db",
            "--jwt-secret",
            "a-sufficiently-long-secret-for-hs256",
        ])
        .unwrap();

        assert_eq!(
            config.socket_addr(),
            SocketAddr::from((Ipv4Addr::LOCALHOST, 3000))
        );
        assert_eq!(config.token_duration(), Duration::days(1));
    }

    #[test]
    fn reads_flags() {
        let config = ServerConfig::try_parse_from([
            "server",
            "--db-path",
            "test.db",
            "--jwt-secret",
            "a-sufficiently-long-secret-for-hs256",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--token-duration-minutes",
            "15",
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.token_duration(), Duration::minutes(15));
    }

    #[test]
    fn db_path_is_required() {
        let result = ServerConfig::try_parse_from([
            "server",
            "--jwt-secret",
            "a-sufficiently-long-secret-for-hs256",
        ]);

        assert!(result.is_err());
    }
}
