use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Dropbox accepts at most 150 MiB in a single `files/upload` request.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 150 * 1024 * 1024;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub dropbox: DropboxSettings,
    pub tokens: TokenSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

/// OAuth client registration plus the provider endpoints. Empty credential
/// strings mean "not configured".
#[derive(Debug, Deserialize, Clone)]
pub struct DropboxSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub api_url: String,
    pub content_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokenSettings {
    pub path: String,
}

impl DropboxSettings {
    pub fn has_client_id(&self) -> bool {
        !self.client_id.trim().is_empty()
    }

    pub fn has_client_secret(&self) -> bool {
        !self.client_secret.trim().is_empty()
    }

    pub fn has_redirect_uri(&self) -> bool {
        !self.redirect_uri.trim().is_empty()
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("BOXGATE")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("app.cors_origins"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("app.max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as u64)?
            .set_default("dropbox.client_id", "")?
            .set_default("dropbox.client_secret", "")?
            .set_default("dropbox.redirect_uri", "")?
            .set_default("dropbox.authorize_url", "https://www.dropbox.com/oauth2/authorize")?
            .set_default("dropbox.token_url", "https://api.dropboxapi.com/oauth2/token")?
            .set_default("dropbox.api_url", "https://api.dropboxapi.com/2")?
            .set_default("dropbox.content_url", "https://content.dropboxapi.com/2")?
            .set_default("tokens.path", "tokens.json")?
            // Plain variable names used by existing deployments.
            .set_override_option("dropbox.client_id", std::env::var("DROPBOX_CLIENT_ID").ok())?
            .set_override_option(
                "dropbox.client_secret",
                std::env::var("DROPBOX_CLIENT_SECRET").ok(),
            )?
            .set_override_option(
                "dropbox.redirect_uri",
                std::env::var("DROPBOX_REDIRECT_URI").ok(),
            )?
            .set_override_option("app.port", std::env::var("PORT").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_origins: Vec::new(),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            dropbox: DropboxSettings {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                authorize_url: "https://www.dropbox.com/oauth2/authorize".to_string(),
                token_url: "https://api.dropboxapi.com/oauth2/token".to_string(),
                api_url: "https://api.dropboxapi.com/2".to_string(),
                content_url: "https://content.dropboxapi.com/2".to_string(),
            },
            tokens: TokenSettings {
                path: "tokens.json".to_string(),
            },
        }
    }
}
