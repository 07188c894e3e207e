//! Hotel search through the Google Hotels engine.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::serpapi::SerpApiClient;
use super::{lenient_count, lenient_string};
use crate::error::{Result, TripError};
use crate::tool::Tool;

pub const HOTELS_FINDER: &str = "hotels_finder";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelsInput {
    /// Location or hotel name to search for.
    pub q: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_count")]
    pub adults: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub children: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub rooms: Option<u32>,
    /// Comma separated star classes, e.g. `"3,4"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub hotel_class: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sort_by: Option<String>,
}

impl HotelsInput {
    pub fn from_value(input: Value) -> Result<Self> {
        let parsed: Self = serde_json::from_value(input)
            .map_err(|err| TripError::invalid(HOTELS_FINDER, err.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.q.trim().is_empty() {
            return Err(TripError::invalid(HOTELS_FINDER, "`q` must not be empty"));
        }
        if self.check_out_date < self.check_in_date {
            return Err(TripError::invalid(
                HOTELS_FINDER,
                format!(
                    "check-out {} is before check-in {}",
                    self.check_out_date, self.check_in_date
                ),
            ));
        }
        if let Some(class) = &self.hotel_class {
            let valid = class
                .split(',')
                .all(|c| matches!(c.trim().parse::<u8>(), Ok(1..=5)));
            if !valid {
                return Err(TripError::invalid(
                    HOTELS_FINDER,
                    format!("`hotel_class` must list classes 1-5, got `{class}`"),
                ));
            }
        }
        Ok(())
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.q.trim().to_string()),
            ("check_in_date", self.check_in_date.to_string()),
            ("check_out_date", self.check_out_date.to_string()),
            ("adults", self.adults.unwrap_or(1).to_string()),
            ("children", self.children.unwrap_or(0).to_string()),
            ("rooms", self.rooms.unwrap_or(1).to_string()),
        ];
        if let Some(class) = &self.hotel_class {
            params.push(("hotel_class", class.replace(' ', "")));
        }
        if let Some(sort) = &self.sort_by {
            params.push(("sort_by", sort.clone()));
        }
        params
    }
}

pub struct HotelsFinder {
    client: SerpApiClient,
}

impl HotelsFinder {
    pub fn new(client: SerpApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for HotelsFinder {
    fn name(&self) -> &str {
        HOTELS_FINDER
    }

    fn description(&self) -> &str {
        "Find hotels using the Google Hotels engine. Returns the top matching properties."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "q": {"type": "string", "description": "Location of the hotel"},
                "check_in_date": {"type": "string", "description": "Check-in date, YYYY-MM-DD. e.g. 2024-06-22"},
                "check_out_date": {"type": "string", "description": "Check-out date, YYYY-MM-DD. e.g. 2024-06-28"},
                "adults": {"type": "integer", "description": "Number of adults. Default to 1."},
                "children": {"type": "integer", "description": "Number of children. Default to 0."},
                "rooms": {"type": "integer", "description": "Number of rooms. Default to 1."},
                "hotel_class": {"type": "string", "description": "Hotel classes, comma separated. e.g. 2,3,4"},
                "sort_by": {"type": "string", "description": "3 for lowest price, 8 for highest rating"}
            },
            "required": ["q", "check_in_date", "check_out_date"]
        }))
    }

    async fn call(&self, input: Value) -> Result<Value> {
        let params = HotelsInput::from_value(input)?;
        self.client
            .top_results(HOTELS_FINDER, "google_hotels", &params.query_params(), "properties")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::SearchConfig;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn input() -> Value {
        json!({
            "q": "Paris",
            "check_in_date": "2024-07-01",
            "check_out_date": "2024-07-05",
            "adults": 2,
            "children": 1,
            "rooms": 1,
            "hotel_class": "3,4",
            "sort_by": 8
        })
    }

    #[test]
    fn parses_model_style_arguments() {
        let parsed = HotelsInput::from_value(input()).unwrap();
        assert_eq!(parsed.sort_by.as_deref(), Some("8"));
        assert_eq!(parsed.adults, Some(2));
    }

    #[test]
    fn rejects_inverted_stay() {
        let mut args = input();
        args["check_out_date"] = json!("2024-06-01");
        let err = HotelsInput::from_value(args).unwrap_err();
        assert!(matches!(err, TripError::InvalidArguments { .. }));
    }

    #[test]
    fn rejects_non_iso_dates() {
        let mut args = input();
        args["check_in_date"] = json!("01/07/2024");
        assert!(HotelsInput::from_value(args).is_err());
    }

    #[test]
    fn rejects_unknown_hotel_class() {
        let mut args = input();
        args["hotel_class"] = json!("6");
        assert!(HotelsInput::from_value(args).is_err());
    }

    #[tokio::test]
    async fn forwards_filters_to_google_hotels() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("engine", "google_hotels"))
            .and(query_param("q", "Paris"))
            .and(query_param("hotel_class", "3,4"))
            .and(query_param("sort_by", "8"))
            .and(query_param("adults", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": [{"name": "Hotel Lutetia"}, {"name": "Le Meurice"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SerpApiClient::new(
            SearchConfig::default()
                .with_api_key("k")
                .with_endpoint(server.uri()),
        )
        .unwrap();
        let out = HotelsFinder::new(client).call(input()).await.unwrap();
        assert_eq!(out[1]["name"], "Le Meurice");
    }
}
