//! Planning requests on top of the agent loop, with per-session history.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::agent::Agent;
use crate::airports::AirportDirectory;
use crate::config::{default_session_id, AppConfig};
use crate::context::TripRequest;
use crate::dispatch::ToolDispatcher;
use crate::error::Result;
use crate::itinerary::{extract_itinerary, Itinerary};
use crate::llm::build_model;
use crate::memory::ConversationMemory;
use crate::message::Message;
use crate::tools::travel_toolkit;

/// Conversation logs keyed by session id.
///
/// Runs against the same session are serialized by that session's lock;
/// different sessions proceed independently.
#[derive(Default, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<ConversationMemory>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session's log, created empty on first use.
    pub async fn session(&self, id: &str) -> Arc<Mutex<ConversationMemory>> {
        if let Some(existing) = self.sessions.read().await.get(id) {
            return existing.clone();
        }
        self.sessions
            .write()
            .await
            .entry(id.to_string())
            .or_default()
            .clone()
    }

    pub async fn snapshot(&self, id: &str) -> Option<Vec<Message>> {
        let session = self.sessions.read().await.get(id).cloned()?;
        let log = session.lock().await;
        Some(log.messages().to_vec())
    }

    /// Remove an entry that has no history and that no other caller is
    /// waiting on.
    async fn discard_if_idle(&self, id: &str, session: &Arc<Mutex<ConversationMemory>>) {
        let mut sessions = self.sessions.write().await;
        // One reference lives in the map, the other is the caller's.
        let idle = sessions
            .get(id)
            .is_some_and(|entry| Arc::ptr_eq(entry, session))
            && Arc::strong_count(session) == 2;
        if idle && session.try_lock().is_ok_and(|log| log.is_empty()) {
            sessions.remove(id);
        }
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    /// `None` when the final answer held no usable itinerary.
    pub itinerary: Option<Itinerary>,
    pub reply: String,
    pub transcript: Vec<Message>,
}

pub struct TripPlanner {
    agent: Agent,
    sessions: SessionStore,
    default_session: String,
}

impl TripPlanner {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            sessions: SessionStore::new(),
            default_session: default_session_id(),
        }
    }

    /// Wire model, tools and airport table from configuration.
    pub async fn from_config(cfg: &AppConfig) -> Result<Self> {
        let airports = match &cfg.airports.path {
            Some(path) => AirportDirectory::load(path).await?,
            None => AirportDirectory::builtin(),
        };
        let registry = travel_toolkit(cfg.search.clone())?;
        let model = build_model(&cfg.model)?;
        tracing::info!(
            provider = %cfg.model.provider,
            model = %cfg.model.model,
            airports = airports.len(),
            "trip planner ready"
        );
        let agent = Agent::new(model, ToolDispatcher::new(registry, airports))
            .with_config(&cfg.agent)
            .with_streaming(cfg.model.stream);
        Ok(Self::new(agent).with_default_session(cfg.agent.session_id.clone()))
    }

    pub fn with_default_session(mut self, id: impl Into<String>) -> Self {
        self.default_session = id.into();
        self
    }

    pub fn default_session(&self) -> &str {
        &self.default_session
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn resolve<'a>(&'a self, session_id: &'a str) -> &'a str {
        let trimmed = session_id.trim();
        if trimmed.is_empty() {
            &self.default_session
        } else {
            trimmed
        }
    }

    /// Add the request to the session, run the agent, and extract the plan.
    ///
    /// The session log only changes when the run succeeds, and a session
    /// first seen by a failed run is not kept.
    pub async fn plan(&self, session_id: &str, request: &TripRequest) -> Result<PlanOutcome> {
        let id = self.resolve(session_id);
        let session = self.sessions.session(id).await;
        let mut log = session.lock().await;

        let mut conversation = log.messages().to_vec();
        conversation.push(request.to_user_message());

        tracing::info!(
            session = id,
            origin = %request.origin,
            destination = %request.destination,
            budget = %request.budget,
            "planning trip"
        );
        let run = match self.agent.run(&conversation, &request.context()).await {
            Ok(run) => run,
            Err(err) => {
                drop(log);
                self.sessions.discard_if_idle(id, &session).await;
                return Err(err);
            }
        };
        *log = ConversationMemory::with_messages(run.messages.clone());

        let itinerary = extract_itinerary(&run.reply.content);
        tracing::info!(
            session = id,
            steps = run.steps,
            parsed = itinerary.is_some(),
            "planning finished"
        );
        Ok(PlanOutcome {
            itinerary,
            reply: run.reply.content,
            transcript: run.messages,
        })
    }

    /// Forget a session's history. Returns whether there was any.
    pub async fn reset(&self, session_id: &str) -> bool {
        self.sessions.remove(self.resolve(session_id)).await
    }
}
