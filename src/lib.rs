//! A travel-planning agent.
//!
//! The crate provides:
//! - A language model abstraction (`LanguageModel`) with Gemini, OpenAI and scripted clients.
//! - Hotel and flight search tools backed by SerpApi (`tools`).
//! - An `Agent` that loops between the model and the tools, filling tool
//!   arguments from the trip being planned.
//! - Extraction of the structured `Itinerary` from the model's final answer.
//! - A `TripPlanner` with per-session history, and an optional HTTP surface.

mod agent;
mod airports;
pub mod config;
mod context;
mod dispatch;
mod error;
mod itinerary;
mod llm;
mod memory;
mod message;
mod planner;
mod prompt;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
mod tool;
pub mod tools;

pub use agent::{Agent, AgentRun};
pub use airports::AirportDirectory;
pub use config::AppConfig;
pub use context::{BudgetTier, TripContext, TripRequest};
pub use dispatch::{ToolDispatcher, ToolKind, INVALID_TOOL};
pub use error::{Result, TripError};
pub use itinerary::{
    day_label, extract_itinerary, fenced_block, Activity, DayPlan, FlightSegment, Flights, Hotel,
    Itinerary, TextOrNumber,
};
pub use llm::{build_model, GeminiClient, LanguageModel, ModelCompletion, OpenAIClient, StubModel};
pub use memory::ConversationMemory;
pub use message::{Message, Role, ToolCall, ToolResult};
pub use planner::{PlanOutcome, SessionStore, TripPlanner};
pub use prompt::{current_year, system_prompt};
pub use tool::{Tool, ToolDescription, ToolRegistry};
pub use tools::travel_toolkit;
