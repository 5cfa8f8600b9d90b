//! HTTP server command
//!
//! Runs the waypoint API against Postgres, or against an in-memory store
//! with `--memory`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum_extra::extract::cookie::SameSite;
use clap::{Parser, ValueEnum};

use waypoint_server::db::DEFAULT_MAX_CONNECTIONS;
use waypoint_server::{
    run_server, AppState, AuthConfig, MemoryStore, PgStore, ServerConfig, Store,
};

/// Secrets shorter than this get a warning
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 4500)]
    pub port: u16,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Use an in-memory store instead of Postgres (data is lost on exit)
    #[arg(long)]
    pub memory: bool,

    /// Maximum Postgres connections
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Secret used to sign session tokens
    #[arg(long, env = "SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// How long a login stays valid, in hours
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..))]
    pub token_ttl_hours: u32,

    /// Only send the session cookie over HTTPS
    #[arg(long)]
    pub cookie_secure: bool,

    /// SameSite attribute of the session cookie
    #[arg(long, value_enum, default_value_t = SameSiteArg::Lax)]
    pub same_site: SameSiteArg,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSiteArg {
    Strict,
    Lax,
    None,
}

impl From<SameSiteArg> for SameSite {
    fn from(arg: SameSiteArg) -> Self {
        match arg {
            SameSiteArg::Strict => SameSite::Strict,
            SameSiteArg::Lax => SameSite::Lax,
            SameSiteArg::None => SameSite::None,
        }
    }
}

impl ServeArgs {
    /// Resolve the token secret. `--memory` may run without one.
    fn resolve_secret(&self) -> Result<Vec<u8>> {
        match self.secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => {
                if secret.len() < RECOMMENDED_SECRET_LEN {
                    tracing::warn!(
                        "SECRET is shorter than {} bytes; use a longer random value",
                        RECOMMENDED_SECRET_LEN
                    );
                }
                Ok(secret.as_bytes().to_vec())
            }
            None if self.memory => {
                tracing::warn!("SECRET not set; generated a random one, sessions end on restart");
                Ok(rand::random::<[u8; 32]>().to_vec())
            }
            None => bail!("SECRET not set. Set via --secret, SECRET env, or ./.env"),
        }
    }

    fn auth_config(&self) -> Result<AuthConfig> {
        if self.same_site == SameSiteArg::None && !self.cookie_secure {
            bail!("--same-site none requires --cookie-secure");
        }

        Ok(AuthConfig {
            secret: self.resolve_secret()?,
            token_ttl: chrono::Duration::hours(self.token_ttl_hours.into()),
            cookie_secure: self.cookie_secure,
            same_site: self.same_site.into(),
        })
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
            cors_permissive: self.cors_permissive,
            request_timeout: Duration::from_secs(self.timeout),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let auth = args.auth_config()?;
    let config = args.server_config();

    let store: Arc<dyn Store> = if args.memory {
        tracing::warn!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let database_url = args
            .database_url
            .as_deref()
            .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, ./.env, or use --memory")?;

        Arc::new(
            PgStore::connect(database_url, args.max_connections)
                .await
                .context("Failed to connect to database")?,
        )
    };

    let state = AppState::new(store, &auth).context("Invalid auth configuration")?;

    tracing::info!("Starting waypoint server on {}", config.bind_addr);

    // Blocks until shutdown
    run_server(state, config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServeArgs {
        let mut argv = vec!["serve"];
        argv.extend_from_slice(args);
        ServeArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn memory_mode_generates_secret() {
        let args = ServeArgs {
            secret: None,
            ..parse(&["--memory"])
        };
        let secret = args.resolve_secret().unwrap();
        assert_eq!(secret.len(), 32);
    }

    #[test]
    fn postgres_mode_requires_secret() {
        let args = ServeArgs {
            secret: None,
            memory: false,
            ..parse(&[])
        };
        let err = args.resolve_secret().unwrap_err();
        assert!(err.to_string().contains("SECRET not set"));
    }

    #[test]
    fn explicit_secret_is_used() {
        let args = parse(&["--secret", "a-sufficiently-long-secret-value!!"]);
        assert_eq!(
            args.resolve_secret().unwrap(),
            b"a-sufficiently-long-secret-value!!".to_vec()
        );
    }

    #[test]
    fn same_site_none_needs_secure() {
        let args = parse(&["--memory", "--same-site", "none"]);
        assert!(args.auth_config().is_err());

        let args = parse(&["--memory", "--same-site", "none", "--cookie-secure"]);
        let auth = args.auth_config().unwrap();
        assert_eq!(auth.same_site, SameSite::None);
        assert!(auth.cookie_secure);
    }

    #[test]
    fn server_config_from_args() {
        let args = parse(&["--host", "0.0.0.0", "--port", "8080", "--timeout", "5"]);
        let config = args.server_config();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn ttl_must_be_positive() {
        assert!(ServeArgs::try_parse_from(["serve", "--token-ttl-hours", "0"]).is_err());
    }
}
