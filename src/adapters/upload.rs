//! Weather Underground PWS upload adapter.
//!
//! One GET per snapshot against the `updateweatherstation.php` endpoint,
//! authenticated by station ID and password in the query string. The
//! service answers 200 with a literal `success` body when it accepts an
//! observation and an error text (or a 401) when it does not, so
//! classification looks at both the status and the body.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::debug;

use crate::app::Observation;
use crate::app::ports::UploadPort;
use crate::error::UploadError;
use crate::units;

const UPDATE_URL: &str =
    "https://weatherstation.wunderground.com/weatherstation/updateweatherstation.php";
const RAPIDFIRE_URL: &str =
    "https://rtupdate.wunderground.com/weatherstation/updateweatherstation.php";

/// Bound on one upload round trip, well under the remote interval.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WundergroundClient {
    station_id: String,
    password: String,
    endpoint: &'static str,
    http: Client,
}

impl WundergroundClient {
    /// Build the client for the regular or rapid-fire endpoint.
    ///
    /// Must run before any async runtime exists on the calling thread;
    /// the blocking reqwest client refuses construction inside one.
    pub fn new(station_id: &str, password: &str, rapidfire: bool) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            station_id: station_id.to_owned(),
            password: password.to_owned(),
            endpoint: if rapidfire { RAPIDFIRE_URL } else { UPDATE_URL },
            http,
        })
    }

    /// Query parameters in the order the service documents them, already
    /// converted to the imperial units the wire wants.
    fn params(&self, obs: &Observation) -> Result<Vec<(&'static str, String)>, UploadError> {
        let tempf = units::celsius_to_fahrenheit(checked(obs.temperature_c, "tempf")?);
        let humidity = checked(obs.humidity_pct, "humidity")?;
        let baromin = units::kpa_to_inches_hg(checked(obs.pressure_kpa, "baromin")?);
        let uv = checked(obs.uv_index, "UV")?;

        Ok(vec![
            ("action", "updateraw".to_owned()),
            ("ID", self.station_id.clone()),
            ("PASSWORD", self.password.clone()),
            ("dateutc", "now".to_owned()),
            ("tempf", format!("{tempf:.2}")),
            ("humidity", format!("{humidity:.2}")),
            ("baromin", format!("{baromin:.2}")),
            ("UV", format!("{uv:.2}")),
        ])
    }
}

impl UploadPort for WundergroundClient {
    fn upload(&mut self, obs: &Observation) -> Result<(), UploadError> {
        let params = self.params(obs)?;
        debug!(endpoint = self.endpoint, "uploading snapshot");

        let response = self
            .http
            .get(self.endpoint)
            .query(&params)
            .send()
            .map_err(|err| UploadError::RequestFailed(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| UploadError::RequestFailed(err.to_string()))?;
        classify(status, &body)
    }
}

/// NaN or infinity would otherwise be serialized straight into the query
/// string; reject it before anything leaves the station.
fn checked(value: f64, field: &'static str) -> Result<f64, UploadError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(UploadError::Parameter(field))
    }
}

/// The service reports most failures as 200 plus an explanatory body, so
/// the body text drives classification. Whitespace varies by endpoint;
/// trim before comparing.
fn classify(status: StatusCode, body: &str) -> Result<(), UploadError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(UploadError::Auth);
    }
    let trimmed = body.trim();
    if trimmed == "success" {
        return Ok(());
    }
    if trimmed.contains("INVALIDPASSWORDID") || trimmed.to_ascii_lowercase().contains("password") {
        return Err(UploadError::Auth);
    }
    Err(UploadError::RequestFailed(trimmed.to_owned()))
}
