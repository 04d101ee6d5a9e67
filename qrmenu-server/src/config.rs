//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Pool size
    pub db_max_connections: u32,
    /// HTTP listen port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 signing secret for staff and customer tokens
    pub jwt_secret: String,
    /// Staff token lifetime
    pub jwt_expiry_hours: i64,
    /// CORS allow-list (env: FRONTEND_ORIGIN, comma-separated)
    pub frontend_origins: Vec<String>,
    /// Sender address for marketing mail
    pub mail_from: String,
    /// SES region override (defaults to the AWS config region)
    pub ses_region: Option<String>,
    /// Platform operator account created at startup when missing
    /// (env: SUPER_ADMIN_EMAIL + SUPER_ADMIN_PASSWORD)
    pub operator: Option<OperatorSeed>,
}

/// Bootstrap credentials for the first `super_admin`
#[derive(Clone)]
pub struct OperatorSeed {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for OperatorSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorSeed")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(10),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .filter(|h| *h > 0)
                .unwrap_or(24),
            frontend_origins: parse_origins(&std::env::var("FRONTEND_ORIGIN").unwrap_or_default()),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@qrmenu.app".into()),
            ses_region: std::env::var("SES_REGION").ok().filter(|s| !s.is_empty()),
            operator: match (
                std::env::var("SUPER_ADMIN_EMAIL"),
                std::env::var("SUPER_ADMIN_PASSWORD"),
            ) {
                (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                    Some(OperatorSeed { email, password })
                }
                _ => None,
            },
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
