use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. It is read once at startup,
/// never mutated afterwards, and pulled into handlers via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the log format and local conveniences.
    pub env: Env,
    // Accept the `x-user-email` header as a session. Only when APP_ENV=local is set
    // explicitly; an unset or unknown APP_ENV runs as Local without it.
    pub local_session_bypass: bool,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Display name used by the rendered pages.
    pub site_name: String,
    // Coordinates and credential of the remote query endpoint.
    pub query: QueryServiceConfig,
    // Email addresses allowed into the back-office and the admin API.
    pub admin_emails: AdminAllowlist,
    // Session token verification material and the hosted sign-in URL.
    pub identity: IdentityConfig,
    // S3-compatible media bucket.
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_key: String,
    pub s3_secret: String,
    pub s3_bucket: String,
    // Public base URL under which uploaded objects are served.
    pub media_public_url: String,
}

/// Env
///
/// Defines the runtime context: `Local` enables development conveniences (header
/// session bypass, MinIO bucket provisioning), `Production` requires every secret.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// QueryServiceConfig
///
/// The account and database identifiers are embedded in the endpoint path; the token
/// is sent as a bearer credential.
#[derive(Clone, Debug)]
pub struct QueryServiceConfig {
    pub api_base: String,
    pub account_id: String,
    pub database_id: String,
    pub api_token: String,
}

impl QueryServiceConfig {
    /// Full URL of the query endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/accounts/{}/d1/database/{}/query",
            self.api_base.trim_end_matches('/'),
            self.account_id,
            self.database_id
        )
    }
}

/// IdentityConfig
///
/// Session tokens are verified with the RS256 public key when one is configured,
/// otherwise with the shared HS256 secret.
#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub jwt_public_key_pem: Option<String>,
    pub jwt_secret: String,
    pub sign_in_url: String,
}

/// AdminAllowlist
///
/// The set of principals allowed to manage the site. Emails are compared verbatim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdminAllowlist(Vec<String>);

impl AdminAllowlist {
    /// Parses a comma separated list, ignoring blanks and surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn permits(&self, email: Option<&str>) -> bool {
        match email {
            Some(email) => self.0.iter().any(|admin| admin == email),
            None => false,
        }
    }

    pub fn emails(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

const DEFAULT_QUERY_API_BASE: &str = "https://api.cloudflare.com/client/v4";
const LOCAL_JWT_SECRET: &str = "local-session-secret-not-for-production";

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for tests: local environment, a loopback query
    /// endpoint and a single admin address.
    fn default() -> Self {
        Self {
            env: Env::Local,
            local_session_bypass: true,
            bind_addr: "127.0.0.1:3000".to_string(),
            site_name: "WebCraft Pro".to_string(),
            query: QueryServiceConfig {
                api_base: "http://127.0.0.1:8787/client/v4".to_string(),
                account_id: "test-account".to_string(),
                database_id: "test-database".to_string(),
                api_token: "test-token".to_string(),
            },
            admin_emails: AdminAllowlist::parse("admin@example.com"),
            identity: IdentityConfig {
                jwt_public_key_pem: None,
                jwt_secret: LOCAL_JWT_SECRET.to_string(),
                sign_in_url: "http://localhost:3001/sign-in".to_string(),
            },
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_key: "admin".to_string(),
            s3_secret: "password".to_string(),
            s3_bucket: "storefront-test".to_string(),
            media_public_url: "http://localhost:9000/storefront-test".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from the environment.
    ///
    /// # Panics
    /// Panics when a variable required by the current environment is missing, so a
    /// misconfigured production instance never starts serving.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").ok();
        let env = match env_str.as_deref() {
            Some("production") => Env::Production,
            _ => Env::Local,
        };
        let local_session_bypass = env_str.as_deref() == Some("local");

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let site_name = env::var("SITE_NAME").unwrap_or_else(|_| "WebCraft Pro".to_string());
        let api_base =
            env::var("QUERY_API_BASE").unwrap_or_else(|_| DEFAULT_QUERY_API_BASE.to_string());
        let jwt_public_key_pem = env::var("SESSION_JWT_PUBLIC_KEY").ok();

        match env {
            Env::Local => Self {
                env: Env::Local,
                local_session_bypass,
                bind_addr,
                site_name,
                query: QueryServiceConfig {
                    api_base,
                    account_id: env::var("CLOUDFLARE_ACCOUNT_ID").unwrap_or_default(),
                    database_id: env::var("CLOUDFLARE_DATABASE_ID").unwrap_or_default(),
                    api_token: env::var("CLOUDFLARE_API_TOKEN").unwrap_or_default(),
                },
                admin_emails: AdminAllowlist::parse(
                    &env::var("ADMIN_EMAILS").unwrap_or_else(|_| "admin@localhost".to_string()),
                ),
                identity: IdentityConfig {
                    jwt_public_key_pem,
                    jwt_secret: env::var("SESSION_JWT_SECRET")
                        .unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                    sign_in_url: env::var("SIGN_IN_URL")
                        .unwrap_or_else(|_| "http://localhost:3001/sign-in".to_string()),
                },
                // Local storage (MinIO) uses known default credentials.
                s3_endpoint: "http://localhost:9000".to_string(),
                s3_region: "us-east-1".to_string(),
                s3_key: "admin".to_string(),
                s3_secret: "password".to_string(),
                s3_bucket: "storefront-media".to_string(),
                media_public_url: "http://localhost:9000/storefront-media".to_string(),
            },
            Env::Production => {
                let admin_emails = AdminAllowlist::parse(
                    &env::var("ADMIN_EMAILS").expect("FATAL: ADMIN_EMAILS required in prod"),
                );
                if admin_emails.is_empty() {
                    panic!("FATAL: ADMIN_EMAILS must name at least one address");
                }

                // Either verification key is acceptable, but one of them must exist.
                let jwt_secret = match (&jwt_public_key_pem, env::var("SESSION_JWT_SECRET")) {
                    (_, Ok(secret)) => secret,
                    (Some(_), Err(_)) => String::new(),
                    (None, Err(_)) => panic!(
                        "FATAL: SESSION_JWT_PUBLIC_KEY or SESSION_JWT_SECRET must be set in production."
                    ),
                };

                Self {
                    env: Env::Production,
                    local_session_bypass: false,
                    bind_addr,
                    site_name,
                    query: QueryServiceConfig {
                        api_base,
                        account_id: env::var("CLOUDFLARE_ACCOUNT_ID")
                            .expect("FATAL: CLOUDFLARE_ACCOUNT_ID required in prod"),
                        database_id: env::var("CLOUDFLARE_DATABASE_ID")
                            .expect("FATAL: CLOUDFLARE_DATABASE_ID required in prod"),
                        api_token: env::var("CLOUDFLARE_API_TOKEN")
                            .expect("FATAL: CLOUDFLARE_API_TOKEN required in prod"),
                    },
                    admin_emails,
                    identity: IdentityConfig {
                        jwt_public_key_pem,
                        jwt_secret,
                        sign_in_url: env::var("SIGN_IN_URL")
                            .expect("FATAL: SIGN_IN_URL required in prod"),
                    },
                    s3_endpoint: env::var("S3_ENDPOINT")
                        .expect("FATAL: S3_ENDPOINT required in prod"),
                    s3_region: env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
                    s3_key: env::var("S3_ACCESS_KEY")
                        .expect("FATAL: S3_ACCESS_KEY required in prod"),
                    s3_secret: env::var("S3_SECRET_KEY")
                        .expect("FATAL: S3_SECRET_KEY required in prod"),
                    s3_bucket: env::var("S3_BUCKET_NAME")
                        .unwrap_or_else(|_| "storefront-media".to_string()),
                    media_public_url: env::var("MEDIA_PUBLIC_URL")
                        .expect("FATAL: MEDIA_PUBLIC_URL required in prod"),
                }
            }
        }
    }
}
