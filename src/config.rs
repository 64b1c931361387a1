use serde::Deserialize;

/// SMTP relay settings for operator notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address; defaults to `username`.
    pub from: String,
}

/// Unsigned-upload settings for the external image host.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUploadSettings {
    pub url: String,
    pub preset: String,
}

/// Service configuration, loaded once at startup and injected into `AppState`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub admin_token: String,
    /// Operator address that receives new-lead notifications.
    pub notify_email: String,
    pub smtp: Option<SmtpSettings>, // None => notifications are only logged
    pub pdf_service_url: Option<String>,
    pub image_upload: Option<ImageUploadSettings>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database host: {}",
            database_host(&config.database_url).unwrap_or_else(|| "<unparsed>".to_string())
        );
        tracing::debug!("Server Port: {}", config.port);
        match config.smtp {
            Some(ref smtp) => tracing::info!("SMTP relay configured: {}:{}", smtp.host, smtp.port),
            None => tracing::warn!("SMTP not configured; lead notifications will only be logged"),
        }
        match config.pdf_service_url {
            Some(ref url) => tracing::info!("PDF service configured: {}", url),
            None => tracing::warn!("PDF_SERVICE_URL not set; documents will not be generated"),
        }
        if config.image_upload.is_none() {
            tracing::warn!("Image host not configured; admin uploads are disabled");
        }

        Ok(config)
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `from_env` passes `std::env::var`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = lookup("DB_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .ok_or_else(|| anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required"))
            .and_then(|url| {
                if url.trim().is_empty() {
                    anyhow::bail!("DB_URL cannot be empty");
                }
                if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                    anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                }
                Ok(url)
            })?;

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let admin_token = lookup("ADMIN_TOKEN")
            .ok_or_else(|| anyhow::anyhow!("ADMIN_TOKEN environment variable required"))
            .and_then(|token| {
                if token.trim().is_empty() {
                    anyhow::bail!("ADMIN_TOKEN cannot be empty");
                }
                Ok(token)
            })?;

        let notify_email = lookup("NOTIFY_EMAIL")
            .ok_or_else(|| anyhow::anyhow!("NOTIFY_EMAIL environment variable required"))
            .and_then(|email| {
                if !email.contains('@') {
                    anyhow::bail!("NOTIFY_EMAIL must be an email address");
                }
                Ok(email.trim().to_string())
            })?;

        let smtp = match (
            optional("SMTP_HOST"),
            optional("SMTP_USER"),
            optional("SMTP_PASS"),
        ) {
            (Some(host), Some(username), Some(password)) => {
                let port = optional("SMTP_PORT")
                    .unwrap_or_else(|| "587".to_string())
                    .parse()
                    .map_err(|_| anyhow::anyhow!("SMTP_PORT must be a valid port number"))?;
                let from = optional("SMTP_FROM").unwrap_or_else(|| username.clone());
                Some(SmtpSettings {
                    host,
                    port,
                    username,
                    password,
                    from,
                })
            }
            (None, None, None) => None,
            _ => anyhow::bail!("SMTP_HOST, SMTP_USER and SMTP_PASS must be set together"),
        };

        let pdf_service_url = optional("PDF_SERVICE_URL")
            .map(|url| {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("PDF_SERVICE_URL must start with http:// or https://");
                }
                Ok(url)
            })
            .transpose()?;

        let image_upload = match (optional("IMAGE_UPLOAD_URL"), optional("IMAGE_UPLOAD_PRESET")) {
            (Some(url), Some(preset)) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("IMAGE_UPLOAD_URL must start with http:// or https://");
                }
                Some(ImageUploadSettings { url, preset })
            }
            (None, None) => None,
            _ => anyhow::bail!("IMAGE_UPLOAD_URL and IMAGE_UPLOAD_PRESET must be set together"),
        };

        Ok(Self {
            database_url,
            port,
            admin_token,
            notify_email,
            smtp,
            pdf_service_url,
            image_upload,
        })
    }
}

/// Host and port of a database URL, never the credentials.
fn database_host(database_url: &str) -> Option<String> {
    let url = url::Url::parse(database_url).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
