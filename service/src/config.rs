use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Path the authentication handler is mounted under when not configured.
pub const DEFAULT_AUTH_PATH: &str = "/api/auth";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

/// Client credentials registered with an OAuth provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// The public origin of this site, used to build provider callback URLs.
    #[arg(long, env, default_value = "http://localhost:4000")]
    site_url: String,

    /// The path the authentication handler is mounted under.
    #[arg(long, env, default_value = DEFAULT_AUTH_PATH)]
    auth_path: String,

    /// Name of the cookie carrying the session id.
    #[arg(long, env, default_value = "__session")]
    pub session_cookie_name: String,

    /// Session key the authenticated user is stored under.
    #[arg(long, env, default_value = "user")]
    pub session_key: String,

    /// Session key a failed login's message is flashed under.
    #[arg(long, env, default_value = "auth:error")]
    pub session_error_key: String,

    /// Session key the name of the authenticating strategy is stored under.
    #[arg(long, env, default_value = "strategy")]
    pub session_strategy_key: String,

    /// Return authorization failures as errors instead of redirecting to the failure redirect.
    #[arg(long, env)]
    pub throw_on_error: bool,

    /// Where the provider callback redirects after a successful login.
    #[arg(long, env, default_value = "/")]
    pub callback_success_redirect: String,

    /// Where the provider callback redirects after a failed login.
    #[arg(long, env)]
    pub callback_failure_redirect: Option<String>,

    #[arg(long, env)]
    discord_client_id: Option<String>,
    #[arg(long, env)]
    discord_client_secret: Option<String>,

    #[arg(long, env)]
    github_client_id: Option<String>,
    #[arg(long, env)]
    github_client_secret: Option<String>,

    #[arg(long, env)]
    google_client_id: Option<String>,
    #[arg(long, env)]
    google_client_secret: Option<String>,

    #[arg(long, env)]
    facebook_client_id: Option<String>,
    #[arg(long, env)]
    facebook_client_secret: Option<String>,

    #[arg(long, env)]
    microsoft_client_id: Option<String>,
    #[arg(long, env)]
    microsoft_client_secret: Option<String>,

    /// The Microsoft identity platform tenant (`common`, `organizations`, `consumers` or a tenant id).
    #[arg(long, env, default_value = "common")]
    pub microsoft_tenant: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// The site origin, without a trailing slash.
    pub fn site_url(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }

    pub fn set_site_url(mut self, site_url: String) -> Self {
        self.site_url = site_url;
        self
    }

    /// The handler mount path, with a leading and without a trailing slash.
    pub fn auth_path(&self) -> String {
        format!("/{}", self.auth_path.trim_matches('/'))
    }

    /// The URL a provider redirects back to after authorization.
    pub fn callback_url(&self, provider: &str) -> String {
        format!("{}{}/{}/callback", self.site_url(), self.auth_path(), provider)
    }

    pub fn discord_credentials(&self) -> Option<ProviderCredentials> {
        credentials(&self.discord_client_id, &self.discord_client_secret)
    }

    pub fn github_credentials(&self) -> Option<ProviderCredentials> {
        credentials(&self.github_client_id, &self.github_client_secret)
    }

    pub fn google_credentials(&self) -> Option<ProviderCredentials> {
        credentials(&self.google_client_id, &self.google_client_secret)
    }

    pub fn facebook_credentials(&self) -> Option<ProviderCredentials> {
        credentials(&self.facebook_client_id, &self.facebook_client_secret)
    }

    pub fn microsoft_credentials(&self) -> Option<ProviderCredentials> {
        credentials(&self.microsoft_client_id, &self.microsoft_client_secret)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

fn credentials(
    client_id: &Option<String>,
    client_secret: &Option<String>,
) -> Option<ProviderCredentials> {
    match (client_id, client_secret) {
        (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
            Some(ProviderCredentials {
                client_id: id.clone(),
                client_secret: secret.clone(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["solid-auth"];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn test_rust_env_parses_case_insensitively() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }

    #[test]
    fn test_callback_url_joins_site_auth_path_and_provider() {
        let config = parse(&["--site-url", "https://example.com/", "--auth-path", "auth/"]);
        assert_eq!(
            config.callback_url("discord"),
            "https://example.com/auth/discord/callback"
        );
    }

    #[test]
    fn test_credentials_require_both_halves() {
        let config = parse(&[
            "--github-client-id",
            "gh-id",
            "--discord-client-id",
            "dc-id",
            "--discord-client-secret",
            "dc-secret",
        ]);

        assert_eq!(config.github_credentials(), None);
        assert_eq!(
            config.discord_credentials(),
            Some(ProviderCredentials {
                client_id: "dc-id".to_string(),
                client_secret: "dc-secret".to_string(),
            })
        );
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = ProviderCredentials {
            client_id: "id".to_string(),
            client_secret: "hunter2".to_string(),
        };
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }
}
