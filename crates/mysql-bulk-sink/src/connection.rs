//! Connection provider
//!
//! Turns declarative connection settings into a [`mysql_async::Conn`].
//! Connections are not pooled: the writer opens one connection per flush
//! and disconnects when done, so nothing here has to survive host restarts
//! or config reloads.
//!
//! Only explicitly configured fields are applied to the driver options;
//! everything else is left at the driver's defaults. A MySQL option file
//! (`default_file`) may seed values underneath the explicit settings, the
//! way libmysqlclient-based clients read `my.cnf`.

use std::path::PathBuf;

use mysql_async::{Conn, Opts, OptsBuilder, SslOpts};
use tracing::warn;

use crate::error::{Error, Result};

/// Declarative connection parameters.
///
/// Immutable once configured; owned by the sink instance.
#[derive(Clone, Default)]
pub struct ConnectionSettings {
    /// Database host
    pub host: Option<String>,
    /// Database port
    pub port: Option<u16>,
    /// Database name
    pub database: Option<String>,
    /// Database user
    pub username: Option<String>,
    /// Database password
    pub password: Option<String>,
    /// MySQL option file read for client defaults
    pub default_file: Option<String>,
    /// Option file group; `client` when unset
    pub default_group: Option<String>,
    /// Trusted SSL CA certificate file
    pub sslca: Option<String>,
    /// Directory of trusted SSL CA certificates
    pub sslcapath: Option<String>,
    /// Verify the server certificate
    pub sslverify: Option<bool>,
    /// Permitted cipher list (driver-negotiated, accepted for parity)
    pub sslcipher: Option<String>,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("default_file", &self.default_file)
            .field("default_group", &self.default_group)
            .field("sslca", &self.sslca)
            .field("sslcapath", &self.sslcapath)
            .field("sslverify", &self.sslverify)
            .field("sslcipher", &self.sslcipher)
            .finish()
    }
}

/// Values read from a MySQL option file group.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ClientDefaults {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub ssl_ca: Option<String>,
}

impl ClientDefaults {
    /// Parse `[group] key = value` lines from option-file text. The
    /// `[client]` group is always read; `group` overlays it when different.
    pub(crate) fn parse(text: &str, group: &str) -> Self {
        let mut client = Self::default();
        let mut named = Self::default();
        let mut section: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = Some(name.trim().to_ascii_lowercase());
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"').to_string();

            let target = match section.as_deref() {
                Some("client") => &mut client,
                Some(s) if s == group => &mut named,
                _ => continue,
            };
            match key.as_str() {
                "host" => target.host = Some(value),
                "port" => target.port = value.parse().ok(),
                "user" => target.user = Some(value),
                "password" => target.password = Some(value),
                "database" => target.database = Some(value),
                "ssl-ca" | "ssl_ca" => target.ssl_ca = Some(value),
                _ => {}
            }
        }

        Self {
            host: named.host.or(client.host),
            port: named.port.or(client.port),
            user: named.user.or(client.user),
            password: named.password.or(client.password),
            database: named.database.or(client.database),
            ssl_ca: named.ssl_ca.or(client.ssl_ca),
        }
    }
}

/// Builds driver options once and opens one connection per write cycle.
#[derive(Debug)]
pub struct MysqlConnector {
    opts: Opts,
}

impl MysqlConnector {
    /// Build a connector from declarative settings.
    ///
    /// Reads the option file (if any) and freezes the driver options;
    /// failures here are configuration errors and abort startup.
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let defaults = match &settings.default_file {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    Error::config(format!("cannot read default_file {path}: {e}"))
                })?;
                let group = settings.default_group.as_deref().unwrap_or("client");
                ClientDefaults::parse(&text, group)
            }
            None => ClientDefaults::default(),
        };

        if settings.sslcipher.is_some() {
            warn!("sslcipher is set but the TLS backend negotiates its own cipher list");
        }

        let mut builder = OptsBuilder::default();

        if let Some(host) = settings.host.clone().or(defaults.host) {
            builder = builder.ip_or_hostname(host);
        }
        if let Some(port) = settings.port.or(defaults.port) {
            builder = builder.tcp_port(port);
        }
        if let Some(user) = settings.username.clone().or(defaults.user) {
            builder = builder.user(Some(user));
        }
        if let Some(pass) = settings.password.clone().or(defaults.password) {
            builder = builder.pass(Some(pass));
        }
        if let Some(db) = settings.database.clone().or(defaults.database) {
            builder = builder.db_name(Some(db));
        }
        if let Some(ssl) = Self::ssl_opts(settings, defaults.ssl_ca)? {
            builder = builder.ssl_opts(ssl);
        }

        Ok(Self {
            opts: Opts::from(builder),
        })
    }

    fn ssl_opts(
        settings: &ConnectionSettings,
        default_ca: Option<String>,
    ) -> Result<Option<SslOpts>> {
        let mut roots: Vec<PathBuf> = Vec::new();
        if let Some(ca) = settings.sslca.clone().or(default_ca) {
            roots.push(PathBuf::from(ca));
        }
        if let Some(dir) = &settings.sslcapath {
            let entries = std::fs::read_dir(dir)
                .map_err(|e| Error::config(format!("cannot read sslcapath {dir}: {e}")))?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    roots.push(path);
                }
            }
        }

        if roots.is_empty() && settings.sslverify.is_none() {
            return Ok(None);
        }

        let mut ssl = SslOpts::default();
        if !roots.is_empty() {
            ssl = ssl.with_root_certs(roots.into_iter().map(Into::into).collect());
        }
        if settings.sslverify == Some(false) {
            ssl = ssl
                .with_danger_accept_invalid_certs(true)
                .with_danger_skip_domain_validation(true);
        }
        Ok(Some(ssl))
    }

    /// Open a fresh connection for one write cycle
    pub async fn connect(&self) -> Result<Conn> {
        Conn::new(self.opts.clone())
            .await
            .map_err(|e| Error::connection_with_source("failed to connect to MySQL", e))
    }
}
