//! Flight search through the Google Flights engine.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::lenient_count;
use super::serpapi::SerpApiClient;
use crate::error::{Result, TripError};
use crate::tool::Tool;

pub const FLIGHTS_FINDER: &str = "flights_finder";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightsInput {
    /// Departure airport code (IATA).
    pub departure_airport: String,
    /// Arrival airport code (IATA).
    pub arrival_airport: String,
    pub outbound_date: NaiveDate,
    pub return_date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_count")]
    pub adults: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub children: Option<u32>,
}

impl FlightsInput {
    pub fn from_value(input: Value) -> Result<Self> {
        let parsed: Self = serde_json::from_value(input)
            .map_err(|err| TripError::invalid(FLIGHTS_FINDER, err.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, code) in [
            ("departure_airport", &self.departure_airport),
            ("arrival_airport", &self.arrival_airport),
        ] {
            let code = code.trim();
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(TripError::invalid(
                    FLIGHTS_FINDER,
                    format!("`{field}` must be a 3-letter IATA code, got `{code}`"),
                ));
            }
        }
        if self.return_date < self.outbound_date {
            return Err(TripError::invalid(
                FLIGHTS_FINDER,
                format!(
                    "return {} is before outbound {}",
                    self.return_date, self.outbound_date
                ),
            ));
        }
        if self.adults == Some(0) {
            return Err(TripError::invalid(FLIGHTS_FINDER, "at least one adult must travel"));
        }
        Ok(())
    }

    fn query_params(&self, stops: &str) -> Vec<(&'static str, String)> {
        vec![
            ("departure_id", self.departure_airport.trim().to_ascii_uppercase()),
            ("arrival_id", self.arrival_airport.trim().to_ascii_uppercase()),
            ("outbound_date", self.outbound_date.to_string()),
            ("return_date", self.return_date.to_string()),
            ("adults", self.adults.unwrap_or(1).to_string()),
            ("children", self.children.unwrap_or(0).to_string()),
            ("stops", stops.to_string()),
        ]
    }
}

pub struct FlightsFinder {
    client: SerpApiClient,
}

impl FlightsFinder {
    pub fn new(client: SerpApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for FlightsFinder {
    fn name(&self) -> &str {
        FLIGHTS_FINDER
    }

    fn description(&self) -> &str {
        "Find flights using the Google Flights engine. Returns the best round-trip options."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "departure_airport": {"type": "string", "description": "Departure airport code (IATA)"},
                "arrival_airport": {"type": "string", "description": "Arrival airport code (IATA)"},
                "outbound_date": {"type": "string", "description": "Outbound date, YYYY-MM-DD. e.g. 2024-06-22"},
                "return_date": {"type": "string", "description": "Return date, YYYY-MM-DD. e.g. 2024-06-28"},
                "adults": {"type": "integer", "description": "Number of adults. Default to 1."},
                "children": {"type": "integer", "description": "Number of children. Default to 0."}
            },
            "required": ["departure_airport", "arrival_airport", "outbound_date", "return_date"]
        }))
    }

    async fn call(&self, input: Value) -> Result<Value> {
        let params = FlightsInput::from_value(input)?;
        let query = params.query_params(&self.client.config().stops);
        self.client
            .top_results(FLIGHTS_FINDER, "google_flights", &query, "best_flights")
            .await
    }
}
