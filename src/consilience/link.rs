use crate::error::Result;
use crate::scan::patterns::PatternSet;
use crate::types::config::LinkConfig;
use crate::types::consilience::{CheckDetail, CheckResult, CheckStatus};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use lru::LruCache;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Reserved top-level domains that never resolve to a real site.
const RESERVED_TLDS: &[&str] = &["example", "test", "local", "invalid", "localhost"];

/// Raw result of probing one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Status(u16),
    TimedOut,
    TransportError(String),
}

/// Reachability probe for a single URL.
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// `reqwest` prober: HEAD first, GET when HEAD is refused or fails in transport.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(config: &LinkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.client.head(url).send().await {
            Ok(response) if response.status() != StatusCode::METHOD_NOT_ALLOWED => {
                return ProbeOutcome::Status(response.status().as_u16());
            }
            Ok(_) => debug!(url, "HEAD not allowed; retrying with GET"),
            Err(error) => debug!(url, %error, "HEAD failed; retrying with GET"),
        }
        match self.client.get(url).send().await {
            Ok(response) => ProbeOutcome::Status(response.status().as_u16()),
            Err(error) if error.is_timeout() => ProbeOutcome::TimedOut,
            Err(error) => ProbeOutcome::TransportError(error.to_string()),
        }
    }
}

type CacheKey = (String, u64);

/// Bounded, cached, concurrent reachability check over external links.
pub struct LinkChecker {
    probe: Arc<dyn LinkProbe>,
    patterns: Arc<PatternSet>,
    config: LinkConfig,
    cache: Mutex<LruCache<CacheKey, (CheckStatus, String)>>,
}

enum Plan {
    Skip(CheckDetail),
    Probe(String),
}

impl LinkChecker {
    pub fn new(probe: Arc<dyn LinkProbe>, patterns: Arc<PatternSet>, config: LinkConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            probe,
            patterns,
            config,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Checker backed by a real HTTP client.
    pub fn http(patterns: Arc<PatternSet>, config: LinkConfig) -> Result<Self> {
        let probe = HttpProbe::new(&config)?;
        Ok(Self::new(Arc::new(probe), patterns, config))
    }

    pub async fn check(&self, owner: &str, repo: &str, urls: &[String]) -> CheckResult {
        if urls.is_empty() {
            return CheckResult::default();
        }

        let mut eligible = 0usize;
        let plans: Vec<Plan> = urls
            .iter()
            .map(|url| match self.skip_reason(url) {
                Some(reason) => Plan::Skip(CheckDetail::new(url.as_str(), CheckStatus::Unchecked, reason)),
                None => {
                    eligible += 1;
                    if eligible > self.config.max_checks {
                        Plan::Skip(CheckDetail::new(url.as_str(), CheckStatus::Unchecked, "over_limit"))
                    } else {
                        Plan::Probe(url.clone())
                    }
                }
            })
            .collect();

        let mut pending: Vec<String> = Vec::new();
        let mut queued = HashSet::new();
        for plan in &plans {
            if let Plan::Probe(url) = plan {
                if queued.insert(url.as_str()) {
                    pending.push(url.clone());
                }
            }
        }

        let concurrency = self.config.concurrency.max(1);
        let probed: Vec<(String, (CheckStatus, String))> = stream::iter(pending)
            .map(|url| async move {
                let outcome = self.resolve(&url).await;
                (url, outcome)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let details = plans
            .into_iter()
            .map(|plan| match plan {
                Plan::Skip(detail) => detail,
                Plan::Probe(url) => {
                    let (status, reason) = probed
                        .iter()
                        .find(|(probed_url, _)| *probed_url == url)
                        .map(|(_, outcome)| outcome.clone())
                        .unwrap_or((CheckStatus::Unchecked, "incomplete".to_string()));
                    CheckDetail::new(url, status, reason)
                }
            })
            .collect();

        let result = CheckResult::from_details(details);
        info!(
            owner,
            repo,
            valid = result.valid,
            broken = result.broken,
            unchecked = result.unchecked,
            "link consilience checked"
        );
        result
    }

    async fn resolve(&self, url: &str) -> (CheckStatus, String) {
        let key = (url.to_string(), self.config.timeout_ms);
        if let Some(cached) = self.cache.lock().ok().and_then(|mut cache| cache.get(&key).cloned()) {
            debug!(url, "link result served from cache");
            return cached;
        }

        let limit = Duration::from_millis(self.config.timeout_ms);
        let outcome = match tokio::time::timeout(limit, self.probe.probe(url)).await {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::TimedOut,
        };
        let classified = classify(url, &outcome);

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, classified.clone());
        }
        classified
    }

    fn skip_reason(&self, url: &str) -> Option<&'static str> {
        let lowered = url.trim().to_lowercase();
        let Some(rest) = lowered
            .strip_prefix("https://")
            .or_else(|| lowered.strip_prefix("http://"))
        else {
            return Some("unsupported_scheme");
        };

        let host = host_of(rest);
        if host.is_empty() {
            return Some("invalid_url");
        }
        let skipped = self
            .patterns
            .skip_link_hosts
            .iter()
            .any(|skip| host == skip || host.ends_with(&format!(".{skip}")));
        let reserved = host
            .rsplit('.')
            .next()
            .is_some_and(|tld| RESERVED_TLDS.contains(&tld));
        if skipped || reserved {
            return Some("skipped_host");
        }

        if lowered.contains('{')
            || lowered.contains('}')
            || self
                .patterns
                .placeholders
                .iter()
                .any(|placeholder| lowered.contains(placeholder.as_str()))
        {
            return Some("placeholder");
        }
        None
    }
}

/// Host portion of a URL with its scheme already removed; brackets kept for IPv6.
fn host_of(rest: &str) -> &str {
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let authority = authority.rsplit('@').next().unwrap_or(authority);
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        };
    }
    authority.split(':').next().unwrap_or(authority)
}

fn classify(url: &str, outcome: &ProbeOutcome) -> (CheckStatus, String) {
    match outcome {
        ProbeOutcome::Status(code) if (200..300).contains(code) => {
            (CheckStatus::Valid, format!("http_{code}"))
        }
        ProbeOutcome::Status(429) => (CheckStatus::Unchecked, "rate_limited".to_string()),
        ProbeOutcome::Status(code) => {
            debug!(url, status = code, "link returned non-success status");
            (CheckStatus::Broken, format!("http_{code}"))
        }
        ProbeOutcome::TimedOut => {
            debug!(url, "link probe timed out");
            (CheckStatus::Unchecked, "timeout".to_string())
        }
        ProbeOutcome::TransportError(error) => {
            debug!(url, %error, "link probe failed");
            (CheckStatus::Broken, "transport_error".to_string())
        }
    }
}
