use super::message::ChatMessage;

/// Append-only, in-memory chat log.
///
/// Entries keep their append order. The only way to remove anything is
/// [`MessageStore::clear`], which drops everything.
#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    /// Index of the most recently appended link entry, if any.
    pub fn last_link(&self) -> Option<usize> {
        self.previous_link(None)
    }

    /// Closest link entry older than `before`; `None` searches from the end.
    pub fn previous_link(&self, before: Option<usize>) -> Option<usize> {
        let end = before.unwrap_or(self.messages.len()).min(self.messages.len());
        self.messages[..end].iter().rposition(is_link)
    }

    /// Closest link entry newer than `after`.
    pub fn next_link(&self, after: usize) -> Option<usize> {
        let start = after + 1;
        self.messages
            .get(start..)?
            .iter()
            .position(is_link)
            .map(|offset| start + offset)
    }
}

fn is_link(message: &ChatMessage) -> bool {
    matches!(message, ChatMessage::Link { .. })
}
