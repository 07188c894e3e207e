use serde_json::{json, Value};
use trip_genie::tools::SearchConfig;
use trip_genie::{
    travel_toolkit, Agent, AirportDirectory, BudgetTier, ConversationMemory, Role, StubModel,
    ToolDispatcher, TripPlanner, TripRequest, INVALID_TOOL,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FINAL_ANSWER: &str = r#"Your trip is ready.
```json
{
  "general": "Four days in Paris",
  "hotel": {"name": "Le Grand Paris", "price_per_night": "€410", "total_cost": "€1640", "rating": 4.8},
  "flight": {
    "outbound": {"airline": "Iberia", "departure_airport": "MAD", "arrival_airport": "CDG", "price": "$210"},
    "return": {"airline": "Iberia", "departure_airport": "CDG", "arrival_airport": "MAD", "price": "$190"}
  },
  "plan": [{"day1": [{"time": "15:00", "type": "Check-in", "description": "Le Grand Paris"}]}]
}
```"#;

async fn serpapi() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_hotels"))
        .and(query_param("q", "Paris"))
        .and(query_param("hotel_class", "5"))
        .and(query_param("sort_by", "8"))
        .and(query_param("adults", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": [{"name": "Le Grand Paris", "overall_rating": 4.8}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_flights"))
        .and(query_param("departure_id", "MAD"))
        .and(query_param("arrival_id", "CDG"))
        .and(query_param("outbound_date", "2025-07-01"))
        .and(query_param("return_date", "2025-07-05"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "best_flights": [{"price": 210, "flights": [{"airline": "Iberia"}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn request() -> TripRequest {
    TripRequest::new(
        "Madrid",
        "Paris",
        "2025-07-01".parse().unwrap(),
        "2025-07-05".parse().unwrap(),
    )
    .with_budget(BudgetTier::High)
    .with_party(2, 0)
    .with_interests("museums")
}

#[tokio::test]
async fn plans_a_trip_end_to_end() {
    let search = serpapi().await;
    let registry = travel_toolkit(
        SearchConfig::default()
            .with_api_key("test-key")
            .with_endpoint(search.uri()),
    )
    .unwrap();
    let model = StubModel::new(vec![
        r#"{"action":"call_tools","calls":[{"name":"hotels_finder","arguments":{}},{"name":"flights_finder","arguments":{}}]}"#.into(),
        FINAL_ANSWER.into(),
    ]);
    let agent = Agent::new(
        model.clone(),
        ToolDispatcher::new(registry, AirportDirectory::builtin()),
    );
    let planner = TripPlanner::new(agent);

    let outcome = planner.plan("", &request()).await.unwrap();

    let itinerary = outcome.itinerary.expect("itinerary parsed");
    assert_eq!(itinerary.hotel.name.as_deref(), Some("Le Grand Paris"));
    assert_eq!(
        itinerary.flight.outbound.as_ref().unwrap().arrival_airport.as_deref(),
        Some("CDG")
    );
    assert_eq!(itinerary.days().count(), 1);

    let roles: Vec<Role> = outcome.transcript.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::Tool, Role::Tool, Role::Assistant]
    );
    let hotels: &Value = &outcome.transcript[2].tool_result.as_ref().unwrap().output;
    assert_eq!(hotels[0]["name"], "Le Grand Paris");
    assert!(ConversationMemory::with_messages(outcome.transcript.clone()).is_causally_ordered());

    // The tool results reach the model on its second turn.
    let second_turn = &model.requests()[1];
    assert_eq!(second_turn[0].role, Role::System);
    assert_eq!(second_turn.len(), 5);
}

#[tokio::test]
async fn search_failures_are_reported_to_the_model() {
    let registry = travel_toolkit(SearchConfig::default()).unwrap();
    let model = StubModel::new(vec![
        r#"{"action":"call_tools","calls":[{"name":"hotels_finder","arguments":{}},{"name":"car_rental","arguments":{}}]}"#.into(),
        "I could not find anything for those dates.".into(),
    ]);
    let planner = TripPlanner::new(Agent::new(
        model,
        ToolDispatcher::new(registry, AirportDirectory::builtin()),
    ));

    let outcome = planner.plan("no-key", &request()).await.unwrap();

    assert!(outcome.itinerary.is_none());
    assert!(outcome.transcript[2]
        .content
        .starts_with("Tool call failed: configuration error: missing SerpApi API key"));
    assert_eq!(outcome.transcript[3].content, INVALID_TOOL);
    assert_eq!(outcome.reply, "I could not find anything for those dates.");
}
