use clap::Parser;
use std::time::Duration;

use crate::scheduler::Stage;
use crate::thresholds::Threshold;

use super::defaults::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_GRACEFUL_RAMP_DOWN, DEFAULT_GRACEFUL_STOP, DEFAULT_PAUSE,
    DEFAULT_TICK_INTERVAL, DEFAULT_TIMEOUT,
};
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_duration_or_zero_arg, parse_header, parse_stage,
    parse_threshold_arg,
};
use super::types::OutputFormat;

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "rampart",
    version,
    about = "Staged virtual-user load tests for the role management API, with checks and pass/fail thresholds."
)]
pub struct RunArgs {
    /// Path to config file (TOML or JSON); defaults to ./rampart.toml or ./rampart.json
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Base URL of the API under test [default: http://localhost:8090]
    #[arg(long = "base-url", short = 'u', env = "RAMPART_BASE_URL")]
    pub base_url: Option<String>,

    /// Load stage as DURATION:TARGET or DURATION:TARGET:hold (repeatable, e.g. -s 30s:20)
    #[arg(long = "stage", short = 's', value_parser = parse_stage)]
    pub stages: Vec<Stage>,

    /// Virtual users alive before the first stage starts
    #[arg(long = "start-vus", default_value_t = 0)]
    pub start_vus: u64,

    /// Threshold as METRIC=EXPRESSION (repeatable, e.g. -t "http_req_duration=p(95)<2000")
    #[arg(long = "threshold", short = 't', value_parser = parse_threshold_arg)]
    pub thresholds: Vec<Threshold>,

    /// Think time after every workflow step (supports ms/s/m/h)
    #[arg(long = "pause", default_value = DEFAULT_PAUSE, value_parser = parse_duration_or_zero_arg)]
    pub pause: Duration,

    /// How often the scheduler adjusts the number of virtual users
    #[arg(long = "tick-interval", default_value = DEFAULT_TICK_INTERVAL, value_parser = parse_duration_arg)]
    pub tick_interval: Duration,

    /// Budget for in-flight iterations to finish when the test ends
    #[arg(long = "graceful-stop", default_value = DEFAULT_GRACEFUL_STOP, value_parser = parse_duration_or_zero_arg)]
    pub graceful_stop: Duration,

    /// Budget for retired virtual users to finish their iteration during ramp-down
    #[arg(long = "graceful-ramp-down", default_value = DEFAULT_GRACEFUL_RAMP_DOWN, value_parser = parse_duration_or_zero_arg)]
    pub graceful_ramp_down: Duration,

    /// Request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = DEFAULT_TIMEOUT, value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Connect timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = DEFAULT_CONNECT_TIMEOUT, value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Bearer token sent with every request
    #[arg(long = "token", env = "RAMPART_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Acquire the token by POSTing credentials to this path before the run
    #[arg(long = "login-path")]
    pub login_path: Option<String>,

    /// Email for --login-path
    #[arg(long = "login-email", env = "RAMPART_LOGIN_EMAIL")]
    pub login_email: Option<String>,

    /// Password for --login-path
    #[arg(long = "login-password", env = "RAMPART_LOGIN_PASSWORD", hide_env_values = true)]
    pub login_password: Option<String>,

    /// Dotted path of the token in the login response [default: data.token]
    #[arg(long = "token-path")]
    pub token_path: Option<String>,

    /// Extra HTTP header (repeatable, e.g. -H "X-Trace: on")
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Report format printed at the end of the run
    #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Write the JSON report to this path
    #[arg(long = "summary-export")]
    pub summary_export: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
