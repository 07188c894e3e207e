//! The structured trip plan and its extraction from model output.

use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A field models emit either as a number or as text (`4.5` vs `"4.5/5"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrNumber {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for TextOrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextOrNumber::Number(n) => write!(f, "{n}"),
            TextOrNumber::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price_per_night: Option<TextOrNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<TextOrNumber>,
    #[serde(default)]
    pub rating: Option<TextOrNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Hotel {
    /// The hotel's own link, or a booking search for its name.
    pub fn booking_link(&self) -> Option<String> {
        if let Some(link) = self.link.as_deref().filter(|l| !l.trim().is_empty()) {
            return Some(link.to_string());
        }
        let name = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        Some(format!(
            "https://www.google.com/search?q={}+booking",
            urlencoding::encode(name).replace("%20", "+")
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightSegment {
    #[serde(default)]
    pub airline: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub departure_airport: Option<String>,
    #[serde(default)]
    pub arrival_airport: Option<String>,
    #[serde(default)]
    pub price: Option<TextOrNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound: Option<FlightSegment>,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_flight: Option<FlightSegment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    pub fn icon(&self) -> &'static str {
        let kind = self.kind.as_deref().unwrap_or_default().trim().to_lowercase();
        match kind.as_str() {
            "visit" => "🏛️",
            "explore" => "🧭",
            "lunch" => "🍽️",
            "dinner" => "🍷",
            "check-in" => "🏨",
            "check-out" => "🧳",
            "arrival" => "🛬",
            "departure" => "🛫",
            "transfer" => "🚗",
            "nightlife" => "🍸",
            "shopping" => "🛍️",
            "breakfast" => "🥐",
            _ => "📍",
        }
    }
}

/// Day label (`"day1"`) to that day's activities, in emitted order.
pub type DayPlan = IndexMap<String, Vec<Activity>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(default)]
    pub general: Option<String>,
    #[serde(default)]
    pub hotel: Hotel,
    #[serde(default)]
    pub flight: Flights,
    #[serde(default)]
    pub plan: Vec<DayPlan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Itinerary {
    /// Every planned day in order, across all plan entries.
    pub fn days(&self) -> impl Iterator<Item = (&str, &[Activity])> + '_ {
        self.plan
            .iter()
            .flat_map(|entry| entry.iter())
            .map(|(day, activities)| (day.as_str(), activities.as_slice()))
    }
}

/// `"day3"` becomes `"Day 3"`; other labels are capitalized.
pub fn day_label(raw: &str) -> String {
    let raw = raw.trim();
    if raw.get(..3).is_some_and(|prefix| prefix.eq_ignore_ascii_case("day")) {
        let rest = raw[3..].trim_start_matches(['_', '-', ' ']);
        return format!("Day {rest}").trim_end().to_string();
    }
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn fenced_json() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```")
            .expect("fenced JSON pattern is valid")
    })
}

/// Body of the first fenced JSON block, if any.
pub fn fenced_block(text: &str) -> Option<&str> {
    fenced_json()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse the itinerary out of the model's final answer.
///
/// A missing block or malformed JSON is logged and yields `None`.
pub fn extract_itinerary(text: &str) -> Option<Itinerary> {
    let Some(block) = fenced_block(text) else {
        tracing::warn!("no fenced JSON block in model response");
        return None;
    };
    match serde_json::from_str::<Itinerary>(block) {
        Ok(itinerary) => {
            tracing::debug!(days = itinerary.days().count(), "parsed itinerary");
            Some(itinerary)
        }
        Err(err) => {
            tracing::warn!(error = %err, "fenced JSON block is not a valid itinerary");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "general": "Four days of food and art in Paris",
            "hotel": {
                "name": "Hotel Le Marais",
                "price_per_night": "€84",
                "total_cost": "€337",
                "rating": 4.3,
                "link": "https://lemarais.example"
            },
            "flight": {
                "outbound": {
                    "airline": "Iberia",
                    "departure_time": "07:10",
                    "arrival_time": "09:15",
                    "departure_airport": "MAD",
                    "arrival_airport": "CDG",
                    "price": "$120",
                    "link": "https://iberia.example"
                },
                "return": {
                    "airline": "Iberia",
                    "departure_time": "19:40",
                    "arrival_time": "21:50",
                    "departure_airport": "CDG",
                    "arrival_airport": "MAD",
                    "price": 110,
                    "link": "https://iberia.example"
                }
            },
            "plan": [
                {
                    "day1": [
                        {"time": "10:30", "type": "Check-in", "description": "Drop bags at the hotel"},
                        {"time": "13:00", "type": "Lunch", "description": "Breizh Café"}
                    ],
                    "day10": [
                        {"time": "09:00", "type": "Visit", "description": "Musée d'Orsay"}
                    ],
                    "day2": [
                        {"time": "16:00", "type": "Departure", "description": "Head to CDG"}
                    ]
                }
            ]
        })
    }

    fn fenced(value: &Value) -> String {
        format!(
            "Here is your plan!\n```json\n{}\n```\nEnjoy.",
            serde_json::to_string_pretty(value).unwrap()
        )
    }

    #[test]
    fn round_trips_without_field_loss() {
        let expected = sample();
        let itinerary = extract_itinerary(&fenced(&expected)).unwrap();
        assert_eq!(serde_json::to_value(&itinerary).unwrap(), expected);
    }

    #[test]
    fn keeps_unknown_fields() {
        let mut expected = sample();
        expected["weather"] = json!("sunny");
        expected["hotel"]["address"] = json!("12 Rue de Rivoli");
        let itinerary = extract_itinerary(&fenced(&expected)).unwrap();
        assert_eq!(itinerary.extra["weather"], "sunny");
        assert_eq!(serde_json::to_value(&itinerary).unwrap(), expected);
    }

    #[test]
    fn days_keep_emitted_order() {
        let itinerary = extract_itinerary(&fenced(&sample())).unwrap();
        let labels: Vec<&str> = itinerary.days().map(|(day, _)| day).collect();
        assert_eq!(labels, vec!["day1", "day10", "day2"]);
    }

    #[test]
    fn missing_block_yields_none() {
        assert!(extract_itinerary("I could not find any flights, sorry.").is_none());
        assert!(extract_itinerary("").is_none());
    }

    #[test]
    fn malformed_block_yields_none() {
        assert!(extract_itinerary("```json\n{\"general\": \n```").is_none());
        assert!(extract_itinerary("```json\n{\"plan\": \"tomorrow\"}\n```").is_none());
    }

    #[test]
    fn takes_the_first_block() {
        let text = "```json\n{\"general\": \"first\"}\n```\n```json\n{\"general\": \"second\"}\n```";
        let itinerary = extract_itinerary(text).unwrap();
        assert_eq!(itinerary.general.as_deref(), Some("first"));
    }

    #[test]
    fn nulls_are_accepted() {
        let text = "```json\n{\"general\": null, \"hotel\": {\"name\": null, \"rating\": \"n/a\"}, \"flight\": {}, \"plan\": []}\n```";
        let itinerary = extract_itinerary(text).unwrap();
        assert!(itinerary.general.is_none());
        assert_eq!(itinerary.hotel.rating, Some(TextOrNumber::Text("n/a".into())));
        assert!(itinerary.hotel.booking_link().is_none());
    }

    #[test]
    fn labels_and_icons() {
        assert_eq!(day_label("day3"), "Day 3");
        assert_eq!(day_label("Day_12"), "Day 12");
        assert_eq!(day_label("arrival"), "Arrival");

        let lunch = Activity {
            kind: Some("LUNCH".into()),
            ..Activity::default()
        };
        assert_eq!(lunch.icon(), "🍽️");
        assert_eq!(Activity::default().icon(), "📍");
    }

    #[test]
    fn booking_link_falls_back_to_search() {
        let hotel = Hotel {
            name: Some("Tokyo Stay Shinjuku".into()),
            ..Hotel::default()
        };
        assert_eq!(
            hotel.booking_link().as_deref(),
            Some("https://www.google.com/search?q=Tokyo+Stay+Shinjuku+booking")
        );
    }
}
