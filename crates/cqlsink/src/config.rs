//! Destination configuration.

use crate::error::{SinkError, SinkResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::OnceLock;
use std::time::Duration;

/// Default CQL native protocol port.
pub const DEFAULT_PORT: u16 = 9042;

/// Authentication mechanism used by the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMechanism {
    #[default]
    None,
    Basic,
}

impl std::str::FromStr for AuthMechanism {
    type Err = SinkError;

    fn from_str(s: &str) -> SinkResult<Self> {
        match s {
            "none" => Ok(Self::None),
            "basic" => Ok(Self::Basic),
            other => Err(SinkError::config(format!(
                "auth.mechanism must be one of none|basic, got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mechanism: AuthMechanism,
    /// Username, only if basic auth is used.
    #[serde(default)]
    pub username: Option<String>,
    /// Password, only if basic auth is used.
    #[serde(default)]
    pub password: Option<String>,
}

/// Configuration for a CQL destination.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationConfig {
    /// Contact points, `host` or `host:port`.
    pub nodes: Vec<String>,
    /// Keyspace holding the table.
    pub keyspace: String,
    /// Table used when a record carries no collection metadata.
    pub table: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Per-statement timeout. `None` waits for the driver.
    #[serde(default)]
    pub query_timeout_ms: Option<u64>,
    /// Append `IF NOT EXISTS` / `IF EXISTS` guards.
    #[serde(default = "default_true")]
    pub existence_guards: bool,
    /// Prepared statement cache capacity.
    #[serde(default = "default_statement_cache_size")]
    pub statement_cache_size: usize,
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

fn default_statement_cache_size() -> usize {
    128
}

impl DestinationConfig {
    pub fn new(nodes: &[&str], keyspace: &str, table: &str) -> Self {
        Self {
            nodes: nodes.iter().map(|s| s.to_string()).collect(),
            keyspace: keyspace.to_string(),
            table: table.to_string(),
            auth: AuthConfig::default(),
            connect_timeout_ms: default_connect_timeout_ms(),
            query_timeout_ms: None,
            existence_guards: true,
            statement_cache_size: default_statement_cache_size(),
        }
    }

    /// Use plain-text credentials.
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.auth = AuthConfig {
            mechanism: AuthMechanism::Basic,
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        };
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_existence_guards(mut self, enabled: bool) -> Self {
        self.existence_guards = enabled;
        self
    }

    /// Parse the flat key/value form used by connector runtimes.
    ///
    /// Recognized keys: `nodes` (comma separated), `keyspace`, `table`,
    /// `auth.mechanism`, `auth.basic.username`, `auth.basic.password`,
    /// `connect_timeout_ms`, `query_timeout_ms`, `existence_guards`,
    /// `statement_cache_size`. The result is validated.
    pub fn from_map(cfg: &BTreeMap<String, String>) -> SinkResult<Self> {
        let required = |key: &str| {
            cfg.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SinkError::config(format!("{key} is required")))
        };

        let nodes = required("nodes")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let mut config = Self {
            nodes,
            keyspace: required("keyspace")?,
            table: required("table")?,
            auth: AuthConfig::default(),
            connect_timeout_ms: default_connect_timeout_ms(),
            query_timeout_ms: None,
            existence_guards: true,
            statement_cache_size: default_statement_cache_size(),
        };

        for (key, value) in cfg {
            match key.as_str() {
                "nodes" | "keyspace" | "table" => {}
                "auth.mechanism" => config.auth.mechanism = value.parse()?,
                "auth.basic.username" => config.auth.username = Some(value.clone()),
                "auth.basic.password" => config.auth.password = Some(value.clone()),
                "connect_timeout_ms" => config.connect_timeout_ms = parse_number(key, value)?,
                "query_timeout_ms" => config.query_timeout_ms = Some(parse_number(key, value)?),
                "statement_cache_size" => {
                    config.statement_cache_size = parse_number(key, value)?;
                }
                "existence_guards" => {
                    config.existence_guards = value.parse().map_err(|_| {
                        SinkError::config(format!("existence_guards must be true or false, got {value:?}"))
                    })?;
                }
                other => return Err(SinkError::config(format!("unknown config key: {other}"))),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Extra validation beyond required fields.
    pub fn validate(&self) -> SinkResult<()> {
        if self.keyspace.is_empty() {
            return Err(SinkError::config("keyspace is required"));
        }
        if self.table.is_empty() {
            return Err(SinkError::config("table is required"));
        }
        if self.nodes.is_empty() {
            return Err(SinkError::config("nodes must list at least one host"));
        }
        for node in &self.nodes {
            parse_node(node)?;
        }
        if self.auth.mechanism == AuthMechanism::Basic {
            let missing = |v: &Option<String>| v.as_deref().is_none_or(str::is_empty);
            if missing(&self.auth.username) || missing(&self.auth.password) {
                return Err(SinkError::config(
                    "auth.basic.username and auth.basic.password should be provided for basic authentication mechanism",
                ));
            }
        }
        Ok(())
    }

    /// Nodes as `host:port`, with the default port filled in.
    pub fn contact_points(&self) -> SinkResult<Vec<String>> {
        self.nodes
            .iter()
            .map(|node| {
                let (host, port) = parse_node(node)?;
                Ok(if host.contains(':') {
                    format!("[{host}]:{port}")
                } else {
                    format!("{host}:{port}")
                })
            })
            .collect()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> SinkResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SinkError::config(format!("{key} must be a non-negative integer, got {value:?}")))
}

/// Split a node into host and port.
///
/// Accepts `host`, `host:port`, `ip`, `ip:port` and `[ipv6]:port`.
fn parse_node(node: &str) -> SinkResult<(String, u16)> {
    let invalid = |why: &str| SinkError::config(format!("invalid node {node:?}: {why}"));

    let (host, port) = if let Some(rest) = node.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(|| invalid("unclosed '['"))?;
        match tail {
            "" => (host, None),
            _ => (
                host,
                Some(tail.strip_prefix(':').ok_or_else(|| invalid("expected ':' after ']'"))?),
            ),
        }
    } else if node.parse::<IpAddr>().is_ok() {
        (node, None)
    } else {
        match node.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (node, None),
        }
    };

    let port = match port {
        None => DEFAULT_PORT,
        Some(p) => match p.parse::<u16>() {
            Ok(0) | Err(_) => return Err(invalid("port must be an integer between 1 and 65535")),
            Ok(p) => p,
        },
    };

    if host.parse::<IpAddr>().is_err() && !is_hostname(host) {
        return Err(invalid("host is not a valid IP address or hostname"));
    }

    Ok((host.to_string(), port))
}

/// RFC 1123 hostname check; rejects empty labels, so trailing dots fail.
fn is_hostname(host: &str) -> bool {
    static HOSTNAME_RE: OnceLock<regex::Regex> = OnceLock::new();
    host.len() <= 253
        && HOSTNAME_RE
            .get_or_init(|| {
                regex::Regex::new(
                    r"^(?i)[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)*$",
                )
                .expect("invalid built-in hostname regex")
            })
            .is_match(host)
}
