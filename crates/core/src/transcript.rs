//! The transcript store.
//!
//! A [`Transcript`] is an append-only, role-tagged log of [`Message`]s.
//! Its order is literally the model's context window, so messages are
//! validated before they are appended and never rewritten afterwards.

use toolloop_model::{ModelMessage, ParseRoleError, Role, ToolCall};

/// An error returned when a message cannot be appended to a transcript.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The role name is not one of the known roles.
    #[error(transparent)]
    InvalidRole(#[from] ParseRoleError),
    /// A tool message has no `tool_call_id`.
    #[error("tool message is missing `tool_call_id`")]
    MissingCorrelation,
    /// A non-tool message has a `tool_call_id`.
    #[error("`tool_call_id` is only allowed on tool messages, got {0}")]
    UnexpectedCorrelation(Role),
    /// A non-assistant message has tool calls.
    #[error("`tool_calls` is only allowed on assistant messages, got {0}")]
    UnexpectedToolCalls(Role),
}

/// A message in the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    role: Role,
    content: String,
    tool_calls: Option<Vec<ToolCall>>,
    tool_call_id: Option<String>,
}

impl Message {
    /// Creates a message with the given role and content.
    ///
    /// Messages are only validated when appended to a [`Transcript`].
    #[inline]
    pub fn new<S: Into<String>>(role: Role, content: S) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates a system message.
    #[inline]
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message. An empty `tool_calls` is the same as
    /// having no tool calls.
    #[inline]
    pub fn assistant<S: Into<String>>(
        content: S,
        tool_calls: Vec<ToolCall>,
    ) -> Self {
        Self::new(Role::Assistant, content).with_tool_calls(tool_calls)
    }

    /// Creates a tool result message answering `tool_call_id`.
    #[inline]
    pub fn tool<S: Into<String>, I: Into<String>>(
        content: S,
        tool_call_id: I,
    ) -> Self {
        Self::new(Role::Tool, content).with_tool_call_id(tool_call_id)
    }

    /// Attaches tool calls to the message.
    #[inline]
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = (!tool_calls.is_empty()).then_some(tool_calls);
        self
    }

    /// Attaches the id of the tool call this message answers.
    #[inline]
    pub fn with_tool_call_id<S: Into<String>>(mut self, id: S) -> Self {
        self.tool_call_id = Some(id.into());
        self
    }

    /// Returns the author of the message.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the text payload.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the tool calls of an assistant message.
    #[inline]
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }

    /// Returns the id of the tool call this message answers.
    #[inline]
    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }

    /// Checks the correlation invariants of the message.
    pub fn validate(&self) -> Result<(), Error> {
        match self.role {
            Role::Tool if self.tool_call_id.is_none() => {
                return Err(Error::MissingCorrelation);
            }
            Role::Tool => {}
            role if self.tool_call_id.is_some() => {
                return Err(Error::UnexpectedCorrelation(role));
            }
            _ => {}
        }
        if self.role != Role::Assistant && self.tool_calls.is_some() {
            return Err(Error::UnexpectedToolCalls(self.role));
        }
        Ok(())
    }

    /// Projects the message into the shape a model call needs.
    pub fn to_model_message(&self) -> ModelMessage {
        ModelMessage {
            role: self.role,
            content: self.content.clone(),
            tool_calls: self
                .tool_calls
                .clone()
                .filter(|calls| !calls.is_empty()),
            tool_call_id: self.tool_call_id.clone(),
        }
    }
}

impl TryFrom<ModelMessage> for Message {
    type Error = Error;

    fn try_from(msg: ModelMessage) -> Result<Self, Self::Error> {
        let message = Message {
            role: msg.role,
            content: msg.content,
            tool_calls: msg.tool_calls.filter(|calls| !calls.is_empty()),
            tool_call_id: msg.tool_call_id,
        };
        message.validate()?;
        Ok(message)
    }
}

/// An ordered, append-only log of messages for one conversation.
#[derive(Clone, Default, Debug)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Validates and appends a message.
    ///
    /// The transcript is left unchanged if the message is invalid.
    pub fn append(&mut self, message: Message) -> Result<(), Error> {
        message.validate()?;
        self.push(message);
        Ok(())
    }

    /// Appends a message built by one of the role constructors, which
    /// always satisfy the correlation invariants.
    pub(crate) fn push(&mut self, message: Message) {
        debug_assert_eq!(message.validate(), Ok(()));
        trace!(
            "append {} message #{}",
            message.role,
            self.messages.len()
        );
        self.messages.push(message);
    }

    /// Appends a message whose role is given by name.
    pub fn append_raw(
        &mut self,
        role: &str,
        content: impl Into<String>,
        tool_calls: Option<Vec<ToolCall>>,
        tool_call_id: Option<String>,
    ) -> Result<(), Error> {
        let role: Role = role.parse()?;
        let mut message = Message::new(role, content);
        if let Some(tool_calls) = tool_calls {
            message = message.with_tool_calls(tool_calls);
        }
        message.tool_call_id = tool_call_id;
        self.append(message)
    }

    /// Returns a copy of all messages in insertion order.
    #[inline]
    pub fn all(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Iterates over the messages without copying them.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.messages.iter()
    }

    /// Returns the most recent message, if any.
    #[inline]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Removes every message. This cannot be undone.
    #[inline]
    pub fn reset(&mut self) {
        self.messages.clear();
    }

    /// Starts the log over with a single system message.
    pub(crate) fn restart(&mut self, system_prompt: &str) {
        self.messages.clear();
        self.messages.push(Message::system(system_prompt));
    }

    /// Projects the transcript into the shape a model call needs.
    pub fn to_model_messages(&self) -> Vec<ModelMessage> {
        self.messages.iter().map(Message::to_model_message).collect()
    }
}
