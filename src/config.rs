use std::env;

/// Settings used by the credential utilities and the one-time token flow.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub token_ttl_minutes: i64,
    /// bcrypt work factor.
    pub bcrypt_cost: u32,
}

/// Outbound SMTP relay. Present only when `SMTP_HOST` is set.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SmtpSettings {
    pub fn from_env() -> Option<Self> {
        let host = env::var("SMTP_HOST").ok().filter(|host| !host.is_empty())?;
        Some(Self {
            host,
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .expect("SMTP_PORT must be a number"),
            username: env::var("SMTP_USER").ok(),
            password: env::var("SMTP_PASS").ok(),
        })
    }
}

pub struct Config {
    /// PostgreSQL connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub auth: AuthSettings,
    /// Allowed CORS origin. Any origin is allowed when unset.
    pub frontend_url: Option<String>,
    pub mail_from: String,
    /// Mail relay. Emails are only logged when unset.
    pub smtp: Option<SmtpSettings>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            auth: AuthSettings {
                jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
                jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .expect("JWT_EXPIRATION_HOURS must be a number"),
                token_ttl_minutes: env::var("TOKEN_TTL_MINUTES")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("TOKEN_TTL_MINUTES must be a number"),
                bcrypt_cost: env::var("BCRYPT_COST")
                    .map(|cost| cost.parse().expect("BCRYPT_COST must be a number"))
                    .unwrap_or(bcrypt::DEFAULT_COST),
            },
            frontend_url: env::var("FRONTEND_URL").ok().filter(|url| !url.is_empty()),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "UpTask <admin@uptask.com>".to_string()),
            smtp: SmtpSettings::from_env(),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
