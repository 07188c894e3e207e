//! Trip preferences: the inbound request and the context derived from it.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TripError;
use crate::message::Message;

/// Coarse budget classification mapped onto provider filter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BudgetTier {
    Low,
    #[default]
    Medium,
    High,
}

impl BudgetTier {
    /// Google Hotels `hotel_class` filter (star ratings).
    pub fn hotel_class(self) -> &'static str {
        match self {
            BudgetTier::Low => "1,2",
            BudgetTier::Medium => "3,4",
            BudgetTier::High => "5",
        }
    }

    /// Google Hotels `sort_by` code: 3 is lowest price, 8 is highest rating.
    pub fn sort_by(self) -> &'static str {
        match self {
            BudgetTier::Low => "3",
            BudgetTier::Medium | BudgetTier::High => "8",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BudgetTier::Low => "Low",
            BudgetTier::Medium => "Medium",
            BudgetTier::High => "High",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetTier {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(BudgetTier::Low),
            "medium" => Ok(BudgetTier::Medium),
            "high" => Ok(BudgetTier::High),
            other => Err(TripError::Protocol(format!("unknown budget tier `{other}`"))),
        }
    }
}

impl TryFrom<String> for BudgetTier {
    type Error = TripError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BudgetTier> for String {
    fn from(tier: BudgetTier) -> Self {
        tier.as_str().to_string()
    }
}

/// Values the dispatcher may use to fill arguments the model left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripContext {
    pub origin: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub budget: BudgetTier,
}

/// Trip preferences as collected from the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub budget: BudgetTier,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub avoid: String,
}

fn default_adults() -> u32 {
    1
}

impl TripRequest {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            start_date,
            end_date,
            adults: default_adults(),
            children: 0,
            budget: BudgetTier::default(),
            interests: String::new(),
            avoid: String::new(),
        }
    }

    pub fn with_party(mut self, adults: u32, children: u32) -> Self {
        self.adults = adults;
        self.children = children;
        self
    }

    pub fn with_budget(mut self, budget: BudgetTier) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_interests(mut self, interests: impl Into<String>) -> Self {
        self.interests = interests.into();
        self
    }

    pub fn with_avoid(mut self, avoid: impl Into<String>) -> Self {
        self.avoid = avoid.into();
        self
    }

    /// The single human message that opens a planning run.
    pub fn to_user_message(&self) -> Message {
        Message::user(format!(
            "Create a personalized itinerary.\n\
             origin: {}\n\
             Destination: {}\n\
             Start Date: {}\n\
             End Date: {}\n\
             Budget: {}\n\
             Interests: {}\n\
             Avoid: {}\n\
             children: {}\n\
             adult: {}\n",
            self.origin,
            self.destination,
            self.start_date,
            self.end_date,
            self.budget,
            self.interests,
            self.avoid,
            self.children,
            self.adults,
        ))
    }

    pub fn context(&self) -> TripContext {
        TripContext {
            origin: self.origin.trim().to_string(),
            destination: self.destination.trim().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            adults: self.adults,
            children: self.children,
            budget: self.budget,
        }
    }
}
