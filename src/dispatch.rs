//! Tool-call dispatch: resolve, backfill, invoke, and report.
//!
//! Every outcome, including failures, becomes a tool message so the agent loop
//! can keep going.

use serde_json::{json, Map, Value};

use crate::airports::AirportDirectory;
use crate::context::TripContext;
use crate::message::{Message, ToolCall};
use crate::tool::{ToolDescription, ToolRegistry};
use crate::tools::flights::FLIGHTS_FINDER;
use crate::tools::hotels::HOTELS_FINDER;

/// Content of the tool message for a call naming an unregistered tool.
pub const INVALID_TOOL: &str = "Invalid tool";

/// Tools whose arguments can be filled in from the trip context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    HotelsFinder,
    FlightsFinder,
}

impl ToolKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            HOTELS_FINDER => Some(ToolKind::HotelsFinder),
            FLIGHTS_FINDER => Some(ToolKind::FlightsFinder),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::HotelsFinder => HOTELS_FINDER,
            ToolKind::FlightsFinder => FLIGHTS_FINDER,
        }
    }

    /// Fill keys the model left out. Keys already present are never touched.
    pub fn backfill(
        self,
        args: &mut Map<String, Value>,
        ctx: &TripContext,
        airports: &AirportDirectory,
    ) {
        match self {
            ToolKind::HotelsFinder => {
                fill(args, "q", json!(ctx.destination));
                fill(args, "check_in_date", json!(ctx.start_date.to_string()));
                fill(args, "check_out_date", json!(ctx.end_date.to_string()));
                fill(args, "adults", json!(2));
                fill(args, "hotel_class", json!(ctx.budget.hotel_class()));
                fill(args, "sort_by", json!(ctx.budget.sort_by()));
            }
            ToolKind::FlightsFinder => {
                if let Some(code) = airports.lookup(&ctx.origin) {
                    fill(args, "departure_airport", json!(code));
                }
                if let Some(code) = airports.lookup(&ctx.destination) {
                    fill(args, "arrival_airport", json!(code));
                }
                fill(args, "outbound_date", json!(ctx.start_date.to_string()));
                fill(args, "return_date", json!(ctx.end_date.to_string()));
                fill(args, "adults", json!(ctx.adults));
                fill(args, "children", json!(ctx.children));
            }
        }
    }
}

fn fill(args: &mut Map<String, Value>, key: &str, value: Value) {
    args.entry(key.to_string()).or_insert(value);
}

/// Model arguments as a flat object. Non-object arguments count as empty and a
/// lone `params` wrapper is unwrapped.
fn normalize_arguments(arguments: &Value) -> Map<String, Value> {
    match arguments {
        Value::Object(map) => match map.get("params") {
            Some(Value::Object(inner)) if map.len() == 1 => inner.clone(),
            _ => map.clone(),
        },
        _ => Map::new(),
    }
}

#[derive(Clone, Default)]
pub struct ToolDispatcher {
    registry: ToolRegistry,
    airports: AirportDirectory,
}

impl ToolDispatcher {
    pub fn new(registry: ToolRegistry, airports: AirportDirectory) -> Self {
        Self { registry, airports }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn describe(&self) -> Vec<ToolDescription> {
        self.registry.describe()
    }

    /// The arguments a call would be invoked with after backfilling.
    pub fn prepare_arguments(&self, call: &ToolCall, ctx: &TripContext) -> Value {
        let mut args = normalize_arguments(&call.arguments);
        if let Some(kind) = ToolKind::from_name(&call.name) {
            kind.backfill(&mut args, ctx, &self.airports);
        }
        Value::Object(args)
    }

    /// Run one call and wrap whatever happens into a tool message.
    pub async fn dispatch(&self, call: &ToolCall, ctx: &TripContext) -> Message {
        let name = call.name.trim();
        let output = if !self.registry.contains(name) {
            tracing::warn!(tool = %call.name, "model requested an unknown tool");
            Value::String(INVALID_TOOL.to_string())
        } else {
            let args = self.prepare_arguments(call, ctx);
            tracing::debug!(tool = name, arguments = %args, "dispatching tool call");
            match self.registry.call(name, args).await {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(tool = name, error = %err, "tool call failed");
                    Value::String(format!("Tool call failed: {err}"))
                }
            }
        };
        Message::tool_with_call(call.name.clone(), output, call.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use crate::context::BudgetTier;
    use crate::error::{Result, TripError};
    use crate::message::Role;
    use crate::tool::Tool;

    struct Recording {
        name: &'static str,
        seen: Arc<Mutex<Vec<Value>>>,
    }

    #[async_trait]
    impl Tool for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "records its input"
        }

        async fn call(&self, input: Value) -> Result<Value> {
            self.seen.lock().unwrap().push(input);
            Ok(json!({"ok": true}))
        }
    }

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            HOTELS_FINDER
        }

        fn description(&self) -> &str {
            "always fails"
        }

        async fn call(&self, _input: Value) -> Result<Value> {
            Err(TripError::Protocol("provider exploded".into()))
        }
    }

    fn ctx(budget: BudgetTier) -> TripContext {
        TripContext {
            origin: "Madrid".into(),
            destination: "Paris".into(),
            start_date: "2025-07-01".parse().unwrap(),
            end_date: "2025-07-05".parse().unwrap(),
            adults: 3,
            children: 1,
            budget,
        }
    }

    fn recording(name: &'static str) -> (ToolDispatcher, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ToolRegistry::new();
        registry.register(Recording {
            name,
            seen: seen.clone(),
        });
        (
            ToolDispatcher::new(registry, AirportDirectory::builtin()),
            seen,
        )
    }

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: Some("call-1".into()),
            name: name.into(),
            arguments,
        }
    }

    #[test]
    fn kinds_resolve_by_name() {
        assert_eq!(
            ToolKind::from_name(" hotels_finder ").map(ToolKind::name),
            Some(HOTELS_FINDER)
        );
        assert_eq!(ToolKind::from_name("flights_finder"), Some(ToolKind::FlightsFinder));
        assert!(ToolKind::from_name("weather").is_none());
    }

    #[tokio::test]
    async fn unknown_tool_yields_sentinel() {
        let (dispatcher, seen) = recording(HOTELS_FINDER);
        let msg = dispatcher
            .dispatch(&call("car_rental", json!({})), &ctx(BudgetTier::Low))
            .await;
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.content, INVALID_TOOL);
        assert_eq!(msg.tool_result.unwrap().tool_call_id.as_deref(), Some("call-1"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hotels_backfill_uses_budget_codes() {
        let (dispatcher, seen) = recording(HOTELS_FINDER);
        dispatcher
            .dispatch(&call(HOTELS_FINDER, json!({})), &ctx(BudgetTier::Low))
            .await;
        let args = seen.lock().unwrap()[0].clone();
        assert_eq!(
            args,
            json!({
                "q": "Paris",
                "check_in_date": "2025-07-01",
                "check_out_date": "2025-07-05",
                "adults": 2,
                "hotel_class": "1,2",
                "sort_by": "3"
            })
        );
    }

    #[tokio::test]
    async fn explicit_arguments_are_never_overwritten() {
        let (dispatcher, seen) = recording(HOTELS_FINDER);
        dispatcher
            .dispatch(
                &call(HOTELS_FINDER, json!({"q": "Lyon", "hotel_class": "5", "adults": 1})),
                &ctx(BudgetTier::Low),
            )
            .await;
        let args = seen.lock().unwrap()[0].clone();
        assert_eq!(args["q"], "Lyon");
        assert_eq!(args["hotel_class"], "5");
        assert_eq!(args["adults"], 1);
        assert_eq!(args["sort_by"], "3");
    }

    #[tokio::test]
    async fn flights_backfill_resolves_airports_and_party() {
        let (dispatcher, seen) = recording(FLIGHTS_FINDER);
        dispatcher
            .dispatch(
                &call(FLIGHTS_FINDER, json!({"params": {"return_date": "2025-07-06"}})),
                &ctx(BudgetTier::Medium),
            )
            .await;
        let args = seen.lock().unwrap()[0].clone();
        assert_eq!(args["departure_airport"], "MAD");
        assert_eq!(args["arrival_airport"], "CDG");
        assert_eq!(args["outbound_date"], "2025-07-01");
        assert_eq!(args["return_date"], "2025-07-06");
        assert_eq!(args["adults"], 3);
        assert_eq!(args["children"], 1);
    }

    #[tokio::test]
    async fn unmapped_city_leaves_airport_unset() {
        let (dispatcher, _) = recording(FLIGHTS_FINDER);
        let mut trip = ctx(BudgetTier::High);
        trip.destination = "Atlantis".into();
        let args = dispatcher.prepare_arguments(&call(FLIGHTS_FINDER, json!("junk")), &trip);
        assert!(args.get("arrival_airport").is_none());
        assert_eq!(args["departure_airport"], "MAD");
    }

    #[tokio::test]
    async fn failures_become_tool_messages() {
        let mut registry = ToolRegistry::new();
        registry.register(Failing);
        let dispatcher = ToolDispatcher::new(registry, AirportDirectory::builtin());

        let msg = dispatcher
            .dispatch(&call(HOTELS_FINDER, json!({})), &ctx(BudgetTier::Medium))
            .await;
        assert_eq!(msg.content, "Tool call failed: protocol error: provider exploded");
        assert_eq!(msg.tool_result.unwrap().name, HOTELS_FINDER);
    }

    #[tokio::test]
    async fn tools_without_a_kind_get_raw_arguments() {
        let (dispatcher, seen) = recording("weather");
        dispatcher
            .dispatch(&call("weather", json!({"city": "Paris"})), &ctx(BudgetTier::Medium))
            .await;
        assert_eq!(seen.lock().unwrap()[0], json!({"city": "Paris"}));
    }
}
