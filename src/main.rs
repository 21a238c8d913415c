use log::*;
use serde::{Deserialize, Serialize};
use service::{
    config::{Config, ProviderCredentials},
    logging::Logger,
};
use solid_auth::oauth::providers::{discord, facebook, github, google, microsoft};
use solid_auth::oauth::{OAuth2Options, OAuth2Strategy, Profile, VerifyParams};
use solid_auth::{Authenticator, AuthenticatorOptions, MemorySessionStorage};
use std::sync::Arc;

/// The identity kept in the session after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    provider: String,
    id: String,
    display_name: String,
    email: Option<String>,
    avatar: Option<String>,
}

impl From<&Profile> for User {
    fn from(profile: &Profile) -> Self {
        Self {
            provider: profile.provider.clone(),
            id: profile.id.clone(),
            display_name: profile.display_name.clone(),
            email: profile.email().map(str::to_string),
            avatar: profile.photo().map(str::to_string),
        }
    }
}

async fn verify(params: VerifyParams) -> Result<User, solid_auth::Error> {
    info!(
        "Verified {} user {}",
        params.profile.provider, params.profile.id
    );
    Ok(User::from(&params.profile))
}

fn oauth2_options(config: &Config, provider: &str, credentials: ProviderCredentials) -> OAuth2Options {
    OAuth2Options::new(
        credentials.client_id,
        credentials.client_secret,
        config.callback_url(provider),
    )
}

/// Register a strategy for every provider with credentials in the configuration.
fn build_authenticator(config: &Config) -> Result<Authenticator<User>, solid_auth::Error> {
    let storage = Arc::new(MemorySessionStorage::with_cookie_name(
        config.session_cookie_name.clone(),
    ));
    let mut authenticator = Authenticator::with_options(
        storage,
        AuthenticatorOptions {
            session_key: config.session_key.clone(),
            session_error_key: config.session_error_key.clone(),
            session_strategy_key: config.session_strategy_key.clone(),
            throw_on_error: config.throw_on_error,
        },
    );

    if let Some(credentials) = config.discord_credentials() {
        authenticator.use_strategy(
            OAuth2Strategy::new(
                oauth2_options(config, "discord", credentials),
                discord::Provider::new(),
                verify,
            )?,
            None,
        );
    }
    if let Some(credentials) = config.github_credentials() {
        authenticator.use_strategy(
            OAuth2Strategy::new(
                oauth2_options(config, "github", credentials),
                github::Provider::new(),
                verify,
            )?,
            None,
        );
    }
    if let Some(credentials) = config.google_credentials() {
        authenticator.use_strategy(
            OAuth2Strategy::new(
                oauth2_options(config, "google", credentials),
                google::Provider::new(),
                verify,
            )?,
            None,
        );
    }
    if let Some(credentials) = config.facebook_credentials() {
        authenticator.use_strategy(
            OAuth2Strategy::new(
                oauth2_options(config, "facebook", credentials),
                facebook::Provider::new(),
                verify,
            )?,
            None,
        );
    }
    if let Some(credentials) = config.microsoft_credentials() {
        authenticator.use_strategy(
            OAuth2Strategy::new(
                oauth2_options(config, "microsoft", credentials),
                microsoft::Provider::for_tenant(config.microsoft_tenant.clone()),
                verify,
            )?,
            None,
        );
    }

    Ok(authenticator)
}

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting up solid-auth server [{}]...", config.runtime_env());

    let authenticator = match build_authenticator(&config) {
        Ok(authenticator) => authenticator,
        Err(e) => {
            error!("Failed to configure authentication strategies: {e}");
            std::process::exit(1);
        }
    };

    let strategies = authenticator.strategy_names();
    if strategies.is_empty() {
        warn!("No provider credentials configured, every login will fail");
    } else {
        info!("Registered strategies: {}", strategies.join(", "));
    }

    if let Err(e) = web::init_server(&config, Arc::new(authenticator)).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
