use crate::endpoints::{EndpointSettings, RateLimit};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Process configuration. Every flag can also be set from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "addsvc", version, about = "Sum integers and concatenate strings over JSON/HTTP")]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "ADDSVC_HTTP_ADDR", default_value = "0.0.0.0:8080")]
    pub http_addr: SocketAddr,

    /// Base URL of a stringsvc instance used to uppercase concat results
    #[arg(long, env = "ADDSVC_POSTPROCESS_URL")]
    pub postprocess_url: Option<String>,

    /// Sum requests allowed per second
    #[arg(long, env = "ADDSVC_SUM_RATE", default_value_t = 1.0)]
    pub sum_rate: f64,

    /// Sum requests allowed in a burst
    #[arg(long, env = "ADDSVC_SUM_BURST", default_value_t = 1)]
    pub sum_burst: usize,

    /// Concat requests allowed per second
    #[arg(long, env = "ADDSVC_CONCAT_RATE", default_value_t = 100.0)]
    pub concat_rate: f64,

    /// Concat requests allowed in a burst
    #[arg(long, env = "ADDSVC_CONCAT_BURST", default_value_t = 100)]
    pub concat_burst: usize,

    /// Longest a request waits for a rate limit token, in milliseconds (0 rejects at once)
    #[arg(long, env = "ADDSVC_RATE_MAX_WAIT_MS", default_value_t = 0)]
    pub rate_max_wait_ms: u64,

    /// Consecutive server faults that open an endpoint's circuit breaker
    #[arg(long, env = "ADDSVC_BREAKER_THRESHOLD", default_value_t = 5)]
    pub breaker_threshold: usize,

    /// Seconds a circuit breaker stays open before a trial call
    #[arg(long, env = "ADDSVC_BREAKER_COOLDOWN_SECS", default_value_t = 60)]
    pub breaker_cooldown_secs: u64,

    /// Longest concat result in characters; unlimited if unset
    #[arg(long, env = "ADDSVC_MAX_CONCAT_LEN")]
    pub max_concat_len: Option<usize>,
}

impl Config {
    /// Endpoint middleware settings, without recorder or tracer.
    pub fn endpoint_settings(&self) -> EndpointSettings {
        EndpointSettings {
            sum_limit: RateLimit {
                capacity: self.sum_burst,
                per_second: self.sum_rate,
            },
            concat_limit: RateLimit {
                capacity: self.concat_burst,
                per_second: self.concat_rate,
            },
            max_wait: Duration::from_millis(self.rate_max_wait_ms),
            failure_threshold: self.breaker_threshold,
            cooldown: Duration::from_secs(self.breaker_cooldown_secs),
            recorder: None,
            tracer: None,
        }
    }
}
