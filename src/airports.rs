//! City name to IATA airport code lookup.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, TripError};

const BUILTIN_CITIES: &str = include_str!("../data/cities_iata.json");

#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    codes: HashMap<String, String>,
}

impl AirportDirectory {
    /// The mapping shipped with the crate.
    pub fn builtin() -> Self {
        // The embedded table is checked by `builtin_table_parses`.
        Self::from_json(BUILTIN_CITIES).unwrap_or_default()
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self::from_pairs(parsed))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
            TripError::Config(format!("cannot read airport table {}: {err}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let codes = pairs
            .into_iter()
            .map(|(city, code)| {
                (
                    normalize(city.as_ref()),
                    code.as_ref().trim().to_ascii_uppercase(),
                )
            })
            .collect();
        Self { codes }
    }

    pub fn lookup(&self, city: &str) -> Option<&str> {
        self.codes.get(&normalize(city)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn normalize(city: &str) -> String {
    city.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_parses() {
        let parsed = AirportDirectory::from_json(BUILTIN_CITIES).unwrap();
        assert!(!parsed.is_empty());
        assert_eq!(parsed.len(), AirportDirectory::builtin().len());
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        let airports = AirportDirectory::builtin();
        assert_eq!(airports.lookup("Paris"), Some("CDG"));
        assert_eq!(airports.lookup("  MADRID "), Some("MAD"));
        assert_eq!(airports.lookup("Atlantis"), None);
    }

    #[tokio::test]
    async fn loads_custom_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.json");
        std::fs::write(&path, r#"{"Porto Alegre": "poa"}"#).unwrap();

        let airports = AirportDirectory::load(&path).await.unwrap();
        assert_eq!(airports.lookup("porto alegre"), Some("POA"));
    }

    #[tokio::test]
    async fn missing_file_is_a_config_error() {
        let err = AirportDirectory::load("/nonexistent/cities.json").await.unwrap_err();
        assert!(matches!(err, TripError::Config(_)));
    }
}
