use cqlsink::DestinationConfig;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!("invalid config file {}: {e:#}", config_path.display())
        })?;

        Ok(Self { config_path, file })
    }
}

/// On-disk layout:
///
/// ```toml
/// version = "1"
///
/// [destination]
/// nodes = ["127.0.0.1:9042"]
/// keyspace = "app"
/// table = "users"
///
/// [destination.auth]
/// mechanism = "basic"
/// username = "${CQLSINK_USER}"
/// password = "${CQLSINK_PASSWORD}"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub destination: DestinationConfig,
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        self.expand_with(|name| std::env::var(name).ok())
    }

    fn expand_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        let expand = |field: &str, value: &mut String| -> anyhow::Result<()> {
            *value = expand_env_vars(value, &lookup)
                .map_err(|e| anyhow::anyhow!("destination.{field}: {e}"))?;
            Ok(())
        };

        let dest = &mut self.destination;
        for node in &mut dest.nodes {
            expand("nodes", node)?;
        }
        expand("keyspace", &mut dest.keyspace)?;
        expand("table", &mut dest.table)?;
        if let Some(username) = dest.auth.username.as_mut() {
            expand("auth.username", username)?;
        }
        if let Some(password) = dest.auth.password.as_mut() {
            expand("auth.password", password)?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        self.destination.validate()?;
        Ok(())
    }
}

/// Expand `${NAME}` and `${NAME:-fallback}` references. `$$` is a literal `$`.
///
/// The fallback applies when the variable is unset or empty. Errors never
/// echo the input, which may hold a secret.
fn expand_env_vars(
    input: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(at) = rest.find('$') {
        out.push_str(&rest[..at]);
        let tail = &rest[at + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            out.push('$');
            rest = after;
            continue;
        }
        let Some(body) = tail.strip_prefix('{') else {
            out.push('$');
            rest = tail;
            continue;
        };

        let end = body
            .find('}')
            .ok_or_else(|| anyhow::anyhow!("unterminated environment reference"))?;
        let (name, fallback) = match body[..end].split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (&body[..end], None),
        };
        if name.is_empty() {
            anyhow::bail!("empty environment variable name");
        }

        match (lookup(name).filter(|v| !v.is_empty()), fallback) {
            (Some(value), _) => out.push_str(&value),
            (None, Some(fallback)) => out.push_str(fallback),
            (None, None) => anyhow::bail!("environment variable {name} is not set"),
        }
        rest = &body[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqlsink::AuthMechanism;

    #[test]
    fn parse_minimal_config() {
        let file = ConfigFile::parse(
            r#"
version = "1"

[destination]
nodes = ["127.0.0.1:9042", "localhost"]
keyspace = "app"
table = "users"
query_timeout_ms = 2000
"#,
        )
        .unwrap();

        let dest = &file.destination;
        assert_eq!(dest.contact_points().unwrap(), ["127.0.0.1:9042", "localhost:9042"]);
        assert_eq!(dest.auth.mechanism, AuthMechanism::None);
        assert_eq!(dest.query_timeout_ms, Some(2000));
        assert!(dest.existence_guards);
    }

    #[test]
    fn parse_rejects_bad_version_and_auth() {
        let err = ConfigFile::parse(
            r#"
version = "2"
[destination]
nodes = ["localhost"]
keyspace = "app"
table = "users"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));

        let err = ConfigFile::parse(
            r#"
version = "1"
[destination]
nodes = ["localhost"]
keyspace = "app"
table = "users"
[destination.auth]
mechanism = "basic"
username = "cassandra"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("auth.basic.password"));
    }

    fn env(name: &str) -> Option<String> {
        match name {
            "CQLSINK_USER" => Some("sink".into()),
            "CQLSINK_PASSWORD" => Some("p$ss".into()),
            "CQLSINK_EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn expand_env_vars_references() {
        assert_eq!(expand_env_vars("plain", env).unwrap(), "plain");
        assert_eq!(expand_env_vars("${CQLSINK_USER}", env).unwrap(), "sink");
        assert_eq!(expand_env_vars("pre-${CQLSINK_USER}-post", env).unwrap(), "pre-sink-post");
        assert_eq!(expand_env_vars("${CQLSINK_PASSWORD}", env).unwrap(), "p$ss");
        assert_eq!(expand_env_vars("cost $5 and $$", env).unwrap(), "cost $5 and $");
        assert_eq!(expand_env_vars("$${CQLSINK_USER}", env).unwrap(), "${CQLSINK_USER}");
    }

    #[test]
    fn expand_env_vars_fallbacks() {
        assert_eq!(expand_env_vars("${CQLSINK_UNSET:-app}", env).unwrap(), "app");
        assert_eq!(expand_env_vars("${CQLSINK_EMPTY:-app}", env).unwrap(), "app");
        assert_eq!(expand_env_vars("${CQLSINK_USER:-app}", env).unwrap(), "sink");
        assert_eq!(expand_env_vars("${CQLSINK_UNSET:-}", env).unwrap(), "");
    }

    #[test]
    fn expand_env_vars_errors() {
        assert!(expand_env_vars("${", env).is_err());
        assert!(expand_env_vars("${}", env).is_err());
        assert!(expand_env_vars("${:-x}", env).is_err());
        let err = expand_env_vars("${CQLSINK_UNSET}", env).unwrap_err();
        assert_eq!(err.to_string(), "environment variable CQLSINK_UNSET is not set");
    }

    #[test]
    fn expansion_errors_name_the_field() {
        let mut file: ConfigFile = toml::from_str(
            r#"
version = "1"
[destination]
nodes = ["${CQLSINK_HOST:-localhost}"]
keyspace = "app"
table = "users"
[destination.auth]
mechanism = "basic"
username = "${CQLSINK_USER}"
password = "${CQLSINK_MISSING}"
"#,
        )
        .unwrap();

        let err = file.expand_with(env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "destination.auth.password: environment variable CQLSINK_MISSING is not set"
        );
        assert_eq!(file.destination.nodes, ["localhost"]);
        assert_eq!(file.destination.auth.username.as_deref(), Some("sink"));
    }
}
