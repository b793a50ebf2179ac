use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::{Uncased, UncasedStr},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_PREFIX: &str = "!";
/// Discord rejects messages longer than 2000 characters.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 2000;
pub const DEFAULT_HEALTH_PORT: u16 = 3000;
pub const DEFAULT_HEALTH_BIND: &str = "0.0.0.0";
pub const DEFAULT_SHAPES_BASE_URL: &str = "https://api.shapes.inc/v1";
pub const DEFAULT_CONFIG_PATH: &str = "shapebot.toml";
/// Free hosts idle a service after 15 minutes without traffic.
pub const KEEP_ALIVE_INTERVAL_SECS: u64 = 14 * 60;
pub const KEEP_ALIVE_TIMEOUT_SECS: u64 = 10;

/// Deployment variables taken verbatim as strings. Tokens and shape names can
/// be all digits, so these must not go through figment's value parsing.
const DEPLOY_TEXT_ENV: &[(&str, &str)] = &[
    ("DISCORD_TOKEN", "discord.bot_token"),
    ("SHAPESINC_API_KEY", "shapes.api_key"),
    ("SHAPESINC_SHAPE_USERNAME", "shapes.shape_username"),
    ("SHAPESINC_BASE_URL", "shapes.base_url"),
    ("RENDER_EXTERNAL_URL", "keep_alive.public_url"),
    ("NODE_ENV", "environment"),
];

/// Deployment variables parsed into typed values.
const DEPLOY_TYPED_ENV: &[(&str, &str)] = &[("PORT", "health.port")];

/// Keep-alive switch; only the exact value `true` enables it.
const KEEP_ALIVE_ENV: &str = "KEEP_ALIVE";

/// Top-level config (shapebot.toml + deployment env + SHAPEBOT_* overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub shapes: ShapesConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub keep_alive: KeepAliveConfig,
    /// Deployment environment name, e.g. "production".
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// When true, guild chat is only forwarded when the bot is @mentioned.
    /// Commands are always recognised.
    #[serde(default = "bool_true")]
    pub require_mention: bool,
    /// When true, direct messages (DMs) are accepted.
    #[serde(default = "bool_true")]
    pub dm_allowed: bool,
    #[serde(default)]
    pub help_mode: HelpMode,
    #[serde(default = "default_activity_name")]
    pub activity_name: Option<String>,
    /// One of playing, listening, watching, competing, custom.
    #[serde(default)]
    pub activity_type: Option<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            prefix: default_prefix(),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            require_mention: true,
            dm_allowed: true,
            help_mode: HelpMode::default(),
            activity_name: default_activity_name(),
            activity_type: None,
        }
    }
}

/// Where `!help` is answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelpMode {
    /// Forward `!help` to the backend, which owns the command semantics.
    #[default]
    Backend,
    /// Render the built-in command list locally.
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapesConfig {
    #[serde(default)]
    pub api_key: String,
    /// Shape (persona) username on Shapes.inc.
    #[serde(default)]
    pub shape_username: String,
    /// Base URL without trailing slash.
    #[serde(default = "default_shapes_base_url")]
    pub base_url: String,
}

impl Default for ShapesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            shape_username: String::new(),
            base_url: default_shapes_base_url(),
        }
    }
}

impl ShapesConfig {
    /// Model identifier sent in every chat-completion request.
    pub fn model(&self) -> String {
        format!("shapesinc/{}", self.shape_username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: DEFAULT_HEALTH_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepAliveConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Public base URL of this service, pinged at `<public_url>/health`.
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            public_url: None,
            interval_secs: KEEP_ALIVE_INTERVAL_SECS,
            timeout_secs: KEEP_ALIVE_TIMEOUT_SECS,
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}
fn default_max_message_length() -> usize {
    DEFAULT_MAX_MESSAGE_LENGTH
}
fn default_activity_name() -> Option<String> {
    Some("Roleplay with Shapes.inc".to_string())
}
fn default_shapes_base_url() -> String {
    DEFAULT_SHAPES_BASE_URL.to_string()
}
fn default_bind() -> String {
    DEFAULT_HEALTH_BIND.to_string()
}
fn default_port() -> u16 {
    DEFAULT_HEALTH_PORT
}
fn default_interval_secs() -> u64 {
    KEEP_ALIVE_INTERVAL_SECS
}
fn default_timeout_secs() -> u64 {
    KEEP_ALIVE_TIMEOUT_SECS
}

impl BotConfig {
    /// Load config, later layers overriding earlier ones:
    ///   1. serde defaults
    ///   2. TOML file (explicit path, else ./shapebot.toml when present)
    ///   3. deployment env vars (DISCORD_TOKEN, SHAPESINC_API_KEY, PORT, ...)
    ///   4. SHAPEBOT_* env vars, nested with `__` (e.g. SHAPEBOT_DISCORD__PREFIX)
    ///
    /// The result is validated; a missing credential is an error.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config = Self::load_unvalidated(config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load without checking credentials, for commands that never talk to
    /// Discord or the backend (e.g. `shapebot ping`).
    pub fn load_unvalidated(config_path: Option<&str>) -> Result<Self> {
        Self::figment(config_path)?
            .extract::<BotConfig>()
            .map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// An explicit config path must exist; the default one is optional.
    fn figment(config_path: Option<&str>) -> Result<Figment> {
        if let Some(path) = config_path {
            if !Path::new(path).is_file() {
                return Err(ConfigError::Load(format!("config file not found: {path}")));
            }
        }
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        Ok(deployment_text(Figment::new().merge(Toml::file(path)))
            .merge(deployment_env())
            .merge(Env::prefixed("SHAPEBOT_").split("__")))
    }

    /// Check that every mandatory credential is present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("DISCORD_TOKEN", &self.discord.bot_token),
            ("SHAPESINC_API_KEY", &self.shapes.api_key),
            ("SHAPESINC_SHAPE_USERNAME", &self.shapes.shape_username),
        ];
        for (var, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { var });
            }
        }
        if self.discord.prefix.is_empty() {
            return Err(ConfigError::Invalid("discord.prefix must not be empty".into()));
        }
        if self.discord.max_message_length == 0 {
            return Err(ConfigError::Invalid(
                "discord.max_message_length must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Keep-alive runs when explicitly enabled or when deployed to production.
    pub fn keep_alive_enabled(&self) -> bool {
        self.keep_alive.enabled
            || self
                .environment
                .as_deref()
                .is_some_and(|env| env.eq_ignore_ascii_case("production"))
    }
}

/// Merge the string-valued deployment variables and the keep-alive switch
/// exactly as set, without type inference.
fn deployment_text(mut figment: Figment) -> Figment {
    for (var, key) in DEPLOY_TEXT_ENV {
        if let Ok(value) = std::env::var(*var) {
            figment = figment.merge(Serialized::default(*key, value));
        }
    }
    if let Ok(value) = std::env::var(KEEP_ALIVE_ENV) {
        figment = figment.merge(Serialized::default("keep_alive.enabled", value == "true"));
    }
    figment
}

/// Env provider for the typed unprefixed variables hosting platforms set.
fn deployment_env() -> Env {
    Env::raw()
        .filter(|key| lookup_deploy_key(key).is_some())
        .map(|key| match lookup_deploy_key(key) {
            Some(mapped) => Uncased::from(mapped),
            None => key.into(),
        })
}

fn lookup_deploy_key(key: &UncasedStr) -> Option<&'static str> {
    DEPLOY_TYPED_ENV
        .iter()
        .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
        .map(|(_, mapped)| *mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn set_credentials(jail: &mut Jail) {
        jail.set_env("DISCORD_TOKEN", "discord-token");
        jail.set_env("SHAPESINC_API_KEY", "shapes-key");
        jail.set_env("SHAPESINC_SHAPE_USERNAME", "tenshi");
    }

    #[test]
    fn deployment_env_populates_config() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            set_credentials(jail);
            jail.set_env("PORT", "8080");
            jail.set_env("KEEP_ALIVE", "true");
            jail.set_env("RENDER_EXTERNAL_URL", "https://bot.onrender.com");

            let config = BotConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.discord.bot_token, "discord-token");
            assert_eq!(config.shapes.api_key, "shapes-key");
            assert_eq!(config.shapes.model(), "shapesinc/tenshi");
            assert_eq!(config.shapes.base_url, DEFAULT_SHAPES_BASE_URL);
            assert_eq!(config.health.port, 8080);
            assert!(config.keep_alive_enabled());
            assert_eq!(
                config.keep_alive.public_url.as_deref(),
                Some("https://bot.onrender.com")
            );
            Ok(())
        });
    }

    #[test]
    fn defaults_apply_when_only_credentials_set() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            set_credentials(jail);

            let config = BotConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.discord.prefix, "!");
            assert_eq!(config.discord.max_message_length, 2000);
            assert!(config.discord.require_mention);
            assert_eq!(config.discord.help_mode, HelpMode::Backend);
            assert_eq!(config.health.port, DEFAULT_HEALTH_PORT);
            assert_eq!(config.keep_alive.interval_secs, 840);
            assert_eq!(config.keep_alive.timeout_secs, 10);
            assert!(!config.keep_alive_enabled());
            Ok(())
        });
    }

    #[test]
    fn missing_credential_names_the_variable() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("DISCORD_TOKEN", "discord-token");
            jail.set_env("SHAPESINC_SHAPE_USERNAME", "tenshi");

            match BotConfig::load(None) {
                Err(ConfigError::Missing { var }) => assert_eq!(var, "SHAPESINC_API_KEY"),
                other => panic!("expected missing api key, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn production_environment_enables_keep_alive() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            set_credentials(jail);
            jail.set_env("NODE_ENV", "production");

            let config = BotConfig::load(None).map_err(|e| e.to_string())?;
            assert!(config.keep_alive_enabled());
            Ok(())
        });
    }

    #[test]
    fn keep_alive_only_enabled_by_exact_true() {
        for value in ["1", "yes", "TRUE", "on", ""] {
            Jail::expect_with(|jail| {
                jail.clear_env();
                set_credentials(jail);
                jail.set_env("KEEP_ALIVE", value);

                let config = BotConfig::load(None).map_err(|e| e.to_string())?;
                assert!(!config.keep_alive.enabled, "KEEP_ALIVE={value:?}");
                assert!(!config.keep_alive_enabled());
                Ok(())
            });
        }
    }

    #[test]
    fn numeric_credentials_stay_strings() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("DISCORD_TOKEN", "0042");
            jail.set_env("SHAPESINC_API_KEY", "123456789");
            jail.set_env("SHAPESINC_SHAPE_USERNAME", "12345");

            let config = BotConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.discord.bot_token, "0042");
            assert_eq!(config.shapes.api_key, "123456789");
            assert_eq!(config.shapes.shape_username, "12345");
            assert_eq!(config.shapes.model(), "shapesinc/12345");
            Ok(())
        });
    }

    #[test]
    fn explicit_config_path_must_exist() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            set_credentials(jail);

            match BotConfig::load(Some("shapbot.toml")) {
                Err(ConfigError::Load(msg)) => assert!(msg.contains("shapbot.toml"), "{msg}"),
                other => panic!("expected load error, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn explicit_config_path_is_read() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            set_credentials(jail);
            jail.create_file("bot.toml", "[discord]\nprefix = \"$\"\n")?;

            let config = BotConfig::load(Some("bot.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.discord.prefix, "$");
            Ok(())
        });
    }

    #[test]
    fn toml_file_and_prefixed_env_layer() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            set_credentials(jail);
            jail.create_file(
                "shapebot.toml",
                r#"
                [discord]
                prefix = "?"
                help_mode = "local"

                [health]
                port = 9000
                "#,
            )?;
            jail.set_env("SHAPEBOT_HEALTH__PORT", "9100");

            let config = BotConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.discord.prefix, "?");
            assert_eq!(config.discord.help_mode, HelpMode::Local);
            assert_eq!(config.health.port, 9100);
            Ok(())
        });
    }
}
