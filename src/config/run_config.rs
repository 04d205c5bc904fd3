use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::app::{LoginRequest, TokenSource};
use crate::args::{
    DEFAULT_BASE_URL, DEFAULT_TOKEN_PATH, OutputFormat, RunArgs, default_stages, default_thresholds,
};
use crate::error::{AppError, AppResult, ConfigError, HttpError};
use crate::http::{ClientOptions, DEFAULT_USER_AGENT};
use crate::scheduler::StageProfile;
use crate::thresholds::Threshold;

/// Fully validated settings for one run. Built before any load is generated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub base_url: String,
    pub profile: StageProfile,
    pub thresholds: Vec<Threshold>,
    pub pause: Duration,
    pub tick_interval: Duration,
    pub graceful_stop: Duration,
    pub graceful_ramp_down: Duration,
    pub client: ClientOptions,
    pub headers: Vec<(String, String)>,
    pub token: TokenSource,
    pub output_format: OutputFormat,
    pub summary_export: Option<PathBuf>,
}

impl RunConfig {
    /// Validates merged CLI/config values. Missing stages and thresholds fall
    /// back to the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable base URL, invalid header, or login
    /// settings without credentials.
    pub fn from_args(args: &RunArgs) -> AppResult<Self> {
        let base_url = resolve_base_url(args.base_url.as_deref())?;

        let stages = if args.stages.is_empty() {
            default_stages()
        } else {
            args.stages.clone()
        };
        let thresholds = if args.thresholds.is_empty() {
            default_thresholds()?
        } else {
            args.thresholds.clone()
        };

        for (name, value) in &args.headers {
            validate_header(name, value)?;
        }

        Ok(Self {
            token: resolve_token(args, &base_url)?,
            base_url,
            profile: StageProfile::new(args.start_vus, stages),
            thresholds,
            pause: args.pause,
            tick_interval: args.tick_interval,
            graceful_stop: args.graceful_stop,
            graceful_ramp_down: args.graceful_ramp_down,
            client: ClientOptions {
                timeout: args.request_timeout,
                connect_timeout: args.connect_timeout,
                user_agent: DEFAULT_USER_AGENT.to_owned(),
            },
            headers: args.headers.clone(),
            output_format: args.output_format,
            summary_export: args.summary_export.as_deref().map(PathBuf::from),
        })
    }
}

fn resolve_base_url(value: Option<&str>) -> AppResult<String> {
    let raw = value.unwrap_or(DEFAULT_BASE_URL).trim();
    if raw.is_empty() {
        return Err(AppError::config(ConfigError::MissingBaseUrl));
    }
    let parsed = Url::parse(raw).map_err(|err| {
        AppError::config(ConfigError::InvalidBaseUrl {
            value: raw.to_owned(),
            source: err,
        })
    })?;
    if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::config(ConfigError::InvalidBaseUrl {
            value: raw.to_owned(),
            source: url::ParseError::RelativeUrlWithoutBase,
        }));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

fn validate_header(name: &str, value: &str) -> AppResult<()> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
        AppError::http(HttpError::InvalidHeaderName {
            name: name.to_owned(),
            source: err,
        })
    })?;
    HeaderValue::from_str(value).map_err(|err| {
        AppError::http(HttpError::InvalidHeaderValue {
            name: name.to_owned(),
            source: err,
        })
    })?;
    Ok(())
}

fn resolve_token(args: &RunArgs, base_url: &str) -> AppResult<TokenSource> {
    if let Some(token) = args.token.as_deref()
        && !token.trim().is_empty()
    {
        return Ok(TokenSource::Static(token.trim().to_owned()));
    }
    let Some(login_path) = args.login_path.as_deref() else {
        return Ok(TokenSource::None);
    };
    let (Some(email), Some(password)) = (args.login_email.as_ref(), args.login_password.as_ref())
    else {
        return Err(AppError::config(ConfigError::LoginMissingCredentials));
    };
    let url = if login_path.starts_with("http://") || login_path.starts_with("https://") {
        login_path.to_owned()
    } else {
        format!("{}/{}", base_url, login_path.trim_start_matches('/'))
    };
    Ok(TokenSource::Login(LoginRequest {
        url,
        email: email.clone(),
        password: password.clone(),
        token_path: args
            .token_path
            .clone()
            .unwrap_or_else(|| DEFAULT_TOKEN_PATH.to_owned()),
    }))
}
