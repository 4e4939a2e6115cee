use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use expertise_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct ConfigRow {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl ConfigRow {
    fn new(key: &'static str, value: impl Into<String>, env_keys: &'static [&'static str]) -> Self {
        Self { key, value: value.into(), env_keys }
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(rows(&config).into_iter().map(|row| {
        let source =
            field_source(&row, config_file_doc.as_ref(), config_file_path.as_deref());
        format!("- {} = {} (source: {source})", row.key, row.value)
    }));

    lines.join("\n")
}

fn rows(config: &AppConfig) -> Vec<ConfigRow> {
    vec![
        ConfigRow::new("database.url", &config.database.url, &["EXPERTISE_DATABASE_URL"]),
        ConfigRow::new(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["EXPERTISE_DATABASE_MAX_CONNECTIONS"],
        ),
        ConfigRow::new(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["EXPERTISE_DATABASE_TIMEOUT_SECS"],
        ),
        ConfigRow::new(
            "slack.verification_token",
            redact_token(config.slack.verification_token.expose_secret()),
            &["EXPERTISE_SLACK_VERIFICATION_TOKEN"],
        ),
        ConfigRow::new(
            "slack.mrkdwn",
            config.slack.mrkdwn.to_string(),
            &["EXPERTISE_SLACK_MRKDWN"],
        ),
        ConfigRow::new(
            "server.bind_address",
            &config.server.bind_address,
            &["EXPERTISE_SERVER_BIND_ADDRESS"],
        ),
        ConfigRow::new(
            "server.port",
            config.server.port.to_string(),
            &["EXPERTISE_SERVER_PORT", "PORT"],
        ),
        ConfigRow::new(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["EXPERTISE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        ConfigRow::new(
            "deployment.mode",
            format!("{:?}", config.deployment.mode),
            &["EXPERTISE_DEPLOYMENT_MODE"],
        ),
        ConfigRow::new(
            "logging.level",
            &config.logging.level,
            &["EXPERTISE_LOGGING_LEVEL", "EXPERTISE_LOG_LEVEL"],
        ),
        ConfigRow::new(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["EXPERTISE_LOGGING_FORMAT", "EXPERTISE_LOG_FORMAT"],
        ),
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    row: &ConfigRow,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let env_key = row.env_keys.iter().find(|key| {
        env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
    });
    if let Some(env_key) = env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, row.key) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Keeps just enough of the token to tell two configurations apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.char_indices().nth(4) {
        Some((cut, _)) if trimmed.chars().count() > 8 => format!("{}***", &trimmed[..cut]),
        _ => "<redacted>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{contains_path, redact_token};

    #[test]
    fn long_tokens_keep_a_short_prefix() {
        assert_eq!(redact_token("abcd1234efgh5678"), "abcd***");
    }

    #[test]
    fn short_or_empty_tokens_are_fully_hidden() {
        assert_eq!(redact_token("short"), "<redacted>");
        assert_eq!(redact_token("   "), "<empty>");
    }

    #[test]
    fn nested_keys_are_found_in_toml_documents() {
        let doc: toml::Value = "[server]\nport = 9000\n".parse().expect("toml");
        assert!(contains_path(&doc, "server.port"));
        assert!(!contains_path(&doc, "server.bind_address"));
        assert!(!contains_path(&doc, "slack.mrkdwn"));
    }
}
