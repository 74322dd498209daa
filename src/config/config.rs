use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Inbound access keys. An empty list leaves the proxies open.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub api_keys: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    pub api_base: String,
    pub api_key: String,
    pub default_model: String,
    pub referer: String,
    pub title: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: "https://openrouter.ai/api/v1".to_string(),
            api_key: "${OPENROUTER_API_KEY}".to_string(),
            default_model: "anthropic/claude-3.5-sonnet".to_string(),
            referer: "https://gra1-utility.com".to_string(),
            title: "gra-1 Utility".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ImageConfig {
    pub api_base: String,
    pub api_key: String,
    /// Model that answers the enhanced prompt.
    pub vision_model: String,
    /// Model name echoed back when the caller does not pick one.
    pub default_model: String,
    pub placeholder_base: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            vision_model: "gemini-1.5-flash".to_string(),
            default_model: "gemini-pro-vision".to_string(),
            placeholder_base: "https://images.unsplash.com/photo-1518709268805-4e9042af2176"
                .to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub api_base: String,
    pub api_key: String,
    pub engine: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_base: "https://serpapi.com".to_string(),
            api_key: "${SERPAPI_KEY}".to_string(),
            engine: "google".to_string(),
        }
    }
}

/// Where the terminal front end finds the proxies and the hosted auth service.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub anon_key: String,
    pub auth_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            anon_key: "${AIDESK_ANON_KEY}".to_string(),
            auth_url: "${AIDESK_AUTH_URL}".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub chat: ChatConfig,
    pub image: ImageConfig,
    pub search: SearchConfig,
    pub client: ClientConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("AIDESK")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.api_keys"),
            )
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;
        app_config.expand();

        Ok(app_config)
    }

    /// Resolves `${VAR}` placeholders against the process environment.
    pub fn expand(&mut self) {
        self.server.host = expand_env(&self.server.host);
        self.auth.api_keys = self.auth.api_keys.iter().map(|k| expand_env(k)).collect();
        self.chat.api_key = expand_env(&self.chat.api_key);
        self.image.api_key = expand_env(&self.image.api_key);
        self.search.api_key = expand_env(&self.search.api_key);
        self.client.anon_key = expand_env(&self.client.anon_key);
        self.client.auth_url = expand_env(&self.client.auth_url);
        self.auth.api_keys.retain(|k| !k.is_empty());
    }
}

fn expand_env(val: &str) -> String {
    if val.starts_with("${") && val.ends_with('}') {
        let var_name = &val[2..val.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else {
        val.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_placeholders_expand_to_empty() {
        assert_eq!(expand_env("${AIDESK_TEST_SURELY_UNSET_VAR}"), "");
        assert_eq!(expand_env("plain-value"), "plain-value");
    }

    #[test]
    fn defaults_point_at_hosted_providers() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.chat.default_model, "anthropic/claude-3.5-sonnet");
        assert_eq!(cfg.image.default_model, "gemini-pro-vision");
        assert_eq!(cfg.search.engine, "google");
        assert!(cfg.auth.api_keys.is_empty());
    }

    #[test]
    fn inbound_keys_load_from_env_list() {
        std::env::set_var("AIDESK__AUTH__API_KEYS", "k1,k2");
        let loaded = AppConfig::load("/nonexistent/aidesk-config");
        std::env::remove_var("AIDESK__AUTH__API_KEYS");

        let cfg = loaded.unwrap();
        assert_eq!(cfg.auth.api_keys, vec!["k1".to_string(), "k2".to_string()]);
    }

    #[test]
    fn expand_drops_empty_inbound_keys() {
        let mut cfg = AppConfig::default();
        cfg.auth.api_keys = vec!["${AIDESK_TEST_SURELY_UNSET_VAR}".into(), "k1".into()];
        cfg.expand();
        assert_eq!(cfg.auth.api_keys, vec!["k1".to_string()]);
    }
}
