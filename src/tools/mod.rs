//! Travel search tools.
//!
//! Both tools talk to SerpApi and return a bounded slice of its results:
//! - Hotels: Google Hotels `properties`
//! - Flights: Google Flights `best_flights`

pub mod flights;
pub mod hotels;
pub mod serpapi;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

pub use flights::{FlightsFinder, FlightsInput};
pub use hotels::{HotelsFinder, HotelsInput};
pub use serpapi::{SearchConfig, SerpApiClient};

use crate::error::Result;
use crate::tool::ToolRegistry;

/// Create a registry with the hotel and flight finders.
pub fn travel_toolkit(config: SearchConfig) -> Result<ToolRegistry> {
    let client = SerpApiClient::new(config)?;
    let mut registry = ToolRegistry::new();
    registry.register(HotelsFinder::new(client.clone()));
    registry.register(FlightsFinder::new(client));
    Ok(registry)
}

// Models are loose with scalar types: `"sort_by": 8` and `"adults": "2"` both show up.

pub(crate) fn lenient_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

pub(crate) fn lenient_count<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected a non-negative count, got {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a count, got `{s}`"))),
        Some(other) => Err(de::Error::custom(format!("expected a count, got {other}"))),
    }
}
