use std::sync::Arc;
use std::time::Duration;

use crate::config::AgentConfig;
use crate::context::TripContext;
use crate::dispatch::ToolDispatcher;
use crate::error::{Result, TripError};
use crate::llm::LanguageModel;
use crate::memory::ConversationMemory;
use crate::message::{Message, ToolCall};
use crate::prompt::{current_year, system_prompt};

/// Where the loop is between model turns.
#[derive(Debug)]
enum LoopState {
    ConsultModel,
    ExecuteTools(Vec<ToolCall>),
    Done(Message),
}

/// Outcome of one agent run.
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// Conversation after the run, without the system instruction.
    pub messages: Vec<Message>,
    /// The assistant message that ended the run.
    pub reply: Message,
    /// Number of model consultations.
    pub steps: usize,
}

/// Alternates between the model and the travel tools until the model answers
/// without requesting any tool.
pub struct Agent {
    model: Arc<dyn LanguageModel>,
    dispatcher: ToolDispatcher,
    system_prompt: String,
    max_steps: usize,
    deadline: Option<Duration>,
    stream: bool,
}

impl Agent {
    pub fn new(model: Arc<dyn LanguageModel>, dispatcher: ToolDispatcher) -> Self {
        Self {
            model,
            dispatcher,
            system_prompt: system_prompt(current_year()),
            max_steps: 10,
            deadline: None,
            stream: false,
        }
    }

    pub fn with_config(self, cfg: &AgentConfig) -> Self {
        let agent = self.with_max_steps(cfg.max_steps);
        match cfg.deadline() {
            Some(deadline) => agent.with_deadline(deadline),
            None => agent,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Run the loop over `conversation`. Empty input messages are dropped
    /// before the first model call.
    pub async fn run(&self, conversation: &[Message], ctx: &TripContext) -> Result<AgentRun> {
        let input: Vec<Message> = conversation
            .iter()
            .filter(|message| message.is_usable())
            .cloned()
            .collect();
        if input.is_empty() {
            tracing::warn!("agent invoked without a usable input message");
            return Err(TripError::Protocol("no usable input message".into()));
        }

        match self.deadline {
            Some(limit) => tokio::time::timeout(limit, self.drive(input, ctx))
                .await
                .map_err(|_| {
                    tracing::warn!(?limit, "agent run timed out");
                    TripError::Deadline(limit)
                })?,
            None => self.drive(input, ctx).await,
        }
    }

    async fn drive(&self, input: Vec<Message>, ctx: &TripContext) -> Result<AgentRun> {
        let tools = self.dispatcher.describe();
        let mut log = ConversationMemory::with_messages(input);
        let mut state = LoopState::ConsultModel;
        let mut steps = 0;
        let mut generated_ids = highest_generated_id(log.iter().flat_map(|m| &m.tool_calls));

        loop {
            state = match state {
                LoopState::ConsultModel => {
                    if steps == self.max_steps {
                        tracing::warn!(max_steps = self.max_steps, "agent hit the step limit");
                        return Err(TripError::StepLimit(self.max_steps));
                    }
                    steps += 1;

                    let mut prompt = Vec::with_capacity(log.len() + 1);
                    prompt.push(Message::system(self.system_prompt.clone()));
                    prompt.extend(log.iter().cloned());

                    let completion = self
                        .model
                        .complete_chat(&prompt, &tools, self.stream)
                        .await?;
                    let content = completion.content.unwrap_or_default();

                    if completion.tool_calls.is_empty() {
                        tracing::debug!(step = steps, "model answered without tool calls");
                        let reply = Message::assistant(content);
                        log.push(reply.clone());
                        LoopState::Done(reply)
                    } else {
                        generated_ids =
                            generated_ids.max(highest_generated_id(&completion.tool_calls));
                        let calls: Vec<ToolCall> = completion
                            .tool_calls
                            .into_iter()
                            .map(|mut call| {
                                if call.id.as_deref().map_or(true, str::is_empty) {
                                    generated_ids += 1;
                                    call.id = Some(format!("call-{generated_ids}"));
                                }
                                call
                            })
                            .collect();
                        tracing::debug!(
                            step = steps,
                            calls = calls.len(),
                            "model requested tool calls"
                        );
                        log.push(Message::assistant_with_calls(content, calls.clone()));
                        LoopState::ExecuteTools(calls)
                    }
                }
                LoopState::ExecuteTools(calls) => {
                    for call in &calls {
                        let result = self.dispatcher.dispatch(call, ctx).await;
                        log.push(result);
                    }
                    LoopState::ConsultModel
                }
                LoopState::Done(reply) => {
                    return Ok(AgentRun {
                        messages: log.into_messages(),
                        reply,
                        steps,
                    });
                }
            };
        }
    }
}

/// Largest `n` among `call-<n>` ids, so new ids never repeat earlier ones.
fn highest_generated_id<'a>(calls: impl IntoIterator<Item = &'a ToolCall>) -> usize {
    calls
        .into_iter()
        .filter_map(|call| call.id.as_deref()?.strip_prefix("call-")?.parse().ok())
        .max()
        .unwrap_or(0)
}
