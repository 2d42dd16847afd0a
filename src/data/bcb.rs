//! Banco Central SGS API integration.
//!
//! The client only ever receives windows that already went through
//! [`WindowValidator`](crate::window::WindowValidator); it does not second-guess
//! them. An empty response is a valid result, not an error.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::SeriesId;
use crate::error::AppError;
use crate::window::{DateWindow, WINDOW_DATE_FORMAT};

const DEFAULT_BASE_URL: &str = "https://api.bcb.gov.br/dados/serie/bcdata.sgs";
const USER_AGENT: &str = "sgs-repair/0.1";
const MAX_ABS_VALUE: f64 = 1_000_000.0;
/// More points than this all sharing one value usually means placeholder data.
const CONSTANT_SERIES_MIN_POINTS: usize = 10;
const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// One observation of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A fetched series together with the window it was fetched for.
#[derive(Debug, Clone)]
pub struct FetchedSeries {
    pub window: DateWindow,
    pub points: Vec<SeriesPoint>,
}

/// Outcome of a multi-series fetch: failures do not abort the batch.
#[derive(Debug, Default)]
pub struct BatchFetch {
    pub fetched: Vec<FetchedSeries>,
    pub failed: Vec<(SeriesId, AppError)>,
}

#[derive(Debug, Clone)]
pub struct BcbConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for BcbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl BcbConfig {
    /// Read overrides from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let base_url = std::env::var("BCB_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.base_url);

        let timeout = env_u64("BCB_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let max_retries = match env_u64("BCB_MAX_RETRIES")? {
            Some(n) => u32::try_from(n)
                .map_err(|_| AppError::new(2, "BCB_MAX_RETRIES is out of range."))?,
            None => defaults.max_retries,
        };
        let retry_delay = env_u64("BCB_RETRY_DELAY_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.retry_delay);

        Ok(Self {
            base_url,
            timeout,
            max_retries,
            retry_delay,
        })
    }
}

fn env_u64(key: &str) -> Result<Option<u64>, AppError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| AppError::new(2, format!("{key} must be a non-negative integer (got '{raw}')."))),
        _ => Ok(None),
    }
}

pub struct BcbClient {
    client: Client,
    config: BcbConfig,
}

enum Attempt {
    /// 4xx: the request itself is wrong, retrying will not help.
    Fatal(AppError),
    Retryable(String),
}

impl BcbClient {
    pub fn new(config: BcbConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            max_retries = config.max_retries,
            "bcb client initialized"
        );
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::new(BcbConfig::from_env()?)
    }

    /// Fetch one series over a validated window, retrying transient failures
    /// with exponential backoff.
    pub fn fetch_series(&self, window: &DateWindow, today: NaiveDate) -> Result<Vec<SeriesPoint>, AppError> {
        let url = series_url(&self.config.base_url, window.series);
        let start = window.start_str();
        let end = window.end_str();
        info!(series = %window.series, start = %start, end = %end, "fetching sgs series");

        let attempts = self.config.max_retries.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.try_fetch(&url, &start, &end) {
                Ok(raw) => {
                    if raw.is_empty() {
                        warn!(series = %window.series, start = %start, end = %end, "sgs returned no points for window");
                        return Ok(Vec::new());
                    }
                    let points = process_points(&raw, today);
                    warn_if_constant(window.series, &points);
                    info!(series = %window.series, points = points.len(), attempt, "sgs series fetched");
                    return Ok(points);
                }
                Err(Attempt::Fatal(err)) => return Err(err),
                Err(Attempt::Retryable(msg)) => {
                    last_error = msg;
                    if attempt < attempts {
                        let delay = backoff_delay(self.config.retry_delay, attempt);
                        warn!(
                            series = %window.series,
                            attempt,
                            max_retries = attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %last_error,
                            "sgs request failed; retrying"
                        );
                        thread::sleep(delay);
                    }
                }
            }
        }

        Err(AppError::new(
            4,
            format!(
                "SGS request for series {} failed after {attempts} attempt(s): {last_error}",
                window.series
            ),
        ))
    }

    /// Fetch several series one after another, pausing between requests.
    pub fn fetch_many(&self, windows: &[DateWindow], today: NaiveDate) -> BatchFetch {
        let mut batch = BatchFetch::default();
        for (idx, window) in windows.iter().enumerate() {
            debug!(series = %window.series, progress = %format!("{}/{}", idx + 1, windows.len()), "batch fetch");
            match self.fetch_series(window, today) {
                Ok(points) => batch.fetched.push(FetchedSeries {
                    window: window.clone(),
                    points,
                }),
                Err(err) => {
                    warn!(series = %window.series, error = %err, "series fetch failed");
                    batch.failed.push((window.series, err));
                }
            }
            if idx + 1 < windows.len() {
                thread::sleep(BATCH_PAUSE);
            }
        }
        info!(
            fetched = batch.fetched.len(),
            failed = batch.failed.len(),
            "batch fetch completed"
        );
        batch
    }

    fn try_fetch(&self, url: &str, start: &str, end: &str) -> Result<Vec<RawPoint>, Attempt> {
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(&[("formato", "json"), ("dataInicial", start), ("dataFinal", end)])
            .send()
            .map_err(|e| Attempt::Retryable(format!("SGS request failed: {e}")))?;

        let status = resp.status();
        if status.is_client_error() {
            return Err(Attempt::Fatal(AppError::new(
                4,
                format!("SGS request rejected with status {status}."),
            )));
        }
        if !status.is_success() {
            return Err(Attempt::Retryable(format!("SGS request failed with status {status}.")));
        }

        // SGS answers 204 with an empty body for some windows.
        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        resp.json::<Vec<RawPoint>>()
            .map_err(|e| Attempt::Fatal(AppError::new(4, format!("Failed to parse SGS response: {e}"))))
    }
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    data: String,
    valor: String,
}

fn series_url(base_url: &str, id: SeriesId) -> String {
    format!("{base_url}.{id}/dados")
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Turn raw SGS rows into points, dropping what cannot be trusted:
/// future dates, zeros, extreme outliers and malformed rows.
fn process_points(raw: &[RawPoint], today: NaiveDate) -> Vec<SeriesPoint> {
    let mut out = Vec::with_capacity(raw.len());
    for item in raw {
        let Ok(date) = NaiveDate::parse_from_str(item.data.trim(), WINDOW_DATE_FORMAT) else {
            warn!(date = %item.data, "malformed sgs date; point skipped");
            continue;
        };
        if date > today {
            warn!(date = %date, today = %today, "future sgs point ignored");
            continue;
        }
        let Some(value) = parse_value(&item.valor) else {
            warn!(date = %date, value = %item.valor, "malformed sgs value; point skipped");
            continue;
        };
        if value == 0.0 || value.abs() > MAX_ABS_VALUE {
            warn!(date = %date, value, "zero or extreme sgs value ignored");
            continue;
        }
        out.push(SeriesPoint { date, value });
    }
    out
}

fn parse_value(raw: &str) -> Option<f64> {
    let v = raw.trim().replace(',', ".").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn warn_if_constant(series: SeriesId, points: &[SeriesPoint]) {
    if points.len() <= CONSTANT_SERIES_MIN_POINTS {
        return;
    }
    let distinct: HashSet<u64> = points.iter().map(|p| p.value.to_bits()).collect();
    if distinct.len() == 1 {
        warn!(
            series = %series,
            value = points[0].value,
            points = points.len(),
            "every point has the same value; possible placeholder data"
        );
    }
}

/// Descriptive label for the SGS series the dashboards use.
pub fn series_name(id: SeriesId) -> Option<&'static str> {
    let name = match id.0 {
        1 => "Taxa de Câmbio - USD/BRL (R$/US$)",
        11 => "Taxa de Câmbio - USD/BRL Ptax venda",
        189 => "IGP-M - Inflação (% m/m)",
        226 => "Taxa Referencial - TR (% a.m.)",
        432 => "Taxa Selic (% a.a.)",
        433 => "IPCA - Inflação (% m/m)",
        1207 => "Produção da Indústria da Construção (índice)",
        4189 => "INPC - Inflação (% m/m)",
        4390 => "Crédito Pessoa Física (R$ milhões)",
        7478 => "Rendimento da Poupança (% a.m.)",
        10813 => "Taxa de Câmbio - EUR/BRL",
        10814 => "Taxa de Câmbio - GBP/BRL",
        21864 => "PAIC - Receita real da construção civil",
        24364 => "Estoque de Crédito Habitacional (R$ bilhões)",
        28561 => "Crédito - Construção Civil (saldo)",
        _ => return None,
    };
    Some(name)
}
