//! Fiat and in-game currency converters.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::network::RestClient;

#[derive(Debug, Deserialize)]
struct RatesResponse {
    result: String,
    #[serde(default)]
    base_code: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
}

/// Exchange rates relative to `base` (`rates[base] == 1.0`).
#[derive(Debug, Clone, PartialEq)]
pub struct Rates {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl Rates {
    pub fn new(base: &str, mut rates: HashMap<String, f64>) -> Self {
        let base = base.to_uppercase();
        rates.insert(base.clone(), 1.0);
        Self {
            base,
            rates,
            fetched_at: Utc::now(),
        }
    }

    /// Units of `code` per one unit of the base currency.
    pub fn rate(&self, code: &str) -> Result<f64> {
        let code = code.to_uppercase();
        match self.rates.get(&code) {
            Some(rate) if *rate > 0.0 => Ok(*rate),
            Some(_) => Err(Error::MalformedResponse(format!("non-positive rate for {}", code))),
            None => Err(Error::InvalidInput(format!("unknown currency: {}", code))),
        }
    }
}

/// Fetch `GET <base_url>/latest/<BASE>`.
pub fn fetch_rates(client: &RestClient, base: &str) -> Result<Rates> {
    let base = base.trim().to_uppercase();
    if base.is_empty() {
        return Err(Error::InvalidInput("empty currency code".to_string()));
    }

    let response: RatesResponse = client.get_json(&format!("latest/{}", base))?;
    if response.result != "success" {
        let reason = response.error_type.unwrap_or(response.result);
        warn!("Rate lookup for {} failed: {}", base, reason);
        return Err(match reason.as_str() {
            "unsupported-code" => Error::InvalidInput(format!("unknown currency: {}", base)),
            _ => Error::MalformedResponse(format!("rates API error: {}", reason)),
        });
    }

    debug!("Fetched {} rates for {}", response.rates.len(), response.base_code);
    Ok(Rates::new(&base, response.rates))
}

/// Convert `amount` between two currencies listed in `rates`.
pub fn convert(amount: f64, from: &str, to: &str, rates: &Rates) -> Result<f64> {
    let from_rate = rates.rate(from)?;
    let to_rate = rates.rate(to)?;
    Ok(amount / from_rate * to_rate)
}

/// In-game points priced at a fixed number of points per fiat unit.
#[derive(Debug, Clone, PartialEq)]
pub struct GameCurrency {
    pub points_per_unit: f64,
    /// Currency the points are priced in.
    pub currency: String,
}

impl GameCurrency {
    pub fn new(points_per_unit: f64, currency: &str) -> Result<Self> {
        if !(points_per_unit.is_finite() && points_per_unit > 0.0) {
            return Err(Error::InvalidInput(format!(
                "points per unit must be positive, got {}",
                points_per_unit
            )));
        }
        Ok(Self {
            points_per_unit,
            currency: currency.to_uppercase(),
        })
    }

    /// Value of `points` in `target`.
    pub fn to_fiat(&self, points: f64, target: &str, rates: &Rates) -> Result<f64> {
        let priced = points / self.points_per_unit;
        convert(priced, &self.currency, target, rates)
    }

    /// Points bought by `amount` of `source`.
    pub fn from_fiat(&self, amount: f64, source: &str, rates: &Rates) -> Result<f64> {
        let priced = convert(amount, source, &self.currency, rates)?;
        Ok(priced * self.points_per_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::testing::{Route, TestServer};
    use serde_json::json;
    use std::time::Duration;

    fn rates() -> Rates {
        let mut map = HashMap::new();
        map.insert("EUR".to_string(), 0.5);
        map.insert("JPY".to_string(), 150.0);
        Rates::new("usd", map)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_convert() {
        let rates = rates();
        assert!(approx(convert(10.0, "USD", "EUR", &rates).unwrap(), 5.0));
        assert!(approx(convert(5.0, "eur", "jpy", &rates).unwrap(), 1500.0));
        assert!(approx(convert(3.0, "USD", "USD", &rates).unwrap(), 3.0));
    }

    #[test]
    fn test_unknown_currency() {
        let err = convert(1.0, "USD", "XYZ", &rates()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_game_currency() {
        let rates = rates();
        let rp = GameCurrency::new(130.0, "usd").unwrap();
        assert!(approx(rp.to_fiat(1300.0, "USD", &rates).unwrap(), 10.0));
        assert!(approx(rp.to_fiat(1300.0, "EUR", &rates).unwrap(), 5.0));
        assert!(approx(rp.from_fiat(5.0, "EUR", &rates).unwrap(), 1300.0));
        assert!(GameCurrency::new(0.0, "USD").is_err());
    }

    #[test]
    fn test_fetch_rates() {
        let server = TestServer::start(vec![
            Route::json(
                "GET",
                "/latest/USD",
                json!({"result": "success", "base_code": "USD", "rates": {"USD": 1, "EUR": 0.92}}),
            ),
            Route::json(
                "GET",
                "/latest/XYZ",
                json!({"result": "error", "error-type": "unsupported-code"}),
            ),
        ]);
        let client = RestClient::new(&server.url(), Duration::from_secs(5));

        let rates = fetch_rates(&client, "usd").unwrap();
        assert_eq!(rates.base, "USD");
        assert!(approx(rates.rate("eur").unwrap(), 0.92));

        let err = fetch_rates(&client, "xyz").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
