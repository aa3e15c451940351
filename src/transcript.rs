use crate::error::{ChatError, ChatResult};
use crate::types::{ChatMessage, Sender};

/// Ordered message history for one (thread, character) pair.
///
/// Append-only, except that while a reply is streaming the trailing agent
/// placeholder has its text replaced in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    streaming: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            streaming: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Index of the placeholder receiving live text, if a reply is streaming.
    pub fn streaming_index(&self) -> Option<usize> {
        if self.streaming {
            self.messages.len().checked_sub(1)
        } else {
            None
        }
    }

    pub fn push(&mut self, message: ChatMessage) -> ChatResult<()> {
        if self.streaming {
            return Err(ChatError::InvalidState(
                "cannot append while a reply is streaming",
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn append_placeholder(&mut self) -> ChatResult<()> {
        self.push(ChatMessage::agent(String::new()))?;
        self.streaming = true;
        Ok(())
    }

    /// Replace the text of the in-flight placeholder.
    pub fn replace_last_message(&mut self, text: &str) -> ChatResult<()> {
        let slot = self.placeholder_mut()?;
        slot.text.clear();
        slot.text.push_str(text);
        Ok(())
    }

    /// Append to the text of the in-flight placeholder.
    pub fn extend_last_message(&mut self, fragment: &str) -> ChatResult<()> {
        self.placeholder_mut()?.text.push_str(fragment);
        Ok(())
    }

    /// Freeze the placeholder; its text is immutable from here on.
    pub fn seal_placeholder(&mut self) {
        self.streaming = false;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.streaming = false;
    }

    fn placeholder_mut(&mut self) -> ChatResult<&mut ChatMessage> {
        if !self.streaming {
            return Err(ChatError::InvalidState("no reply is streaming"));
        }
        match self.messages.last_mut() {
            Some(last) if last.sender == Sender::Agent => Ok(last),
            _ => Err(ChatError::InvalidState(
                "last message is not an agent placeholder",
            )),
        }
    }
}

impl From<Vec<ChatMessage>> for Transcript {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self::from_messages(messages)
    }
}
