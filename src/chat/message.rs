/// Kind tag of a [`ChatMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Link,
    Image,
}

impl MessageKind {
    pub fn label(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Link => "link",
            MessageKind::Image => "image",
        }
    }
}

/// A single entry in the chat log.
///
/// Messages are immutable once built: there are no setters, and the store
/// only hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    Text { body: String, timestamp: String },
    /// `url` holds the whole submitted text, not just the matched URL.
    Link { url: String, timestamp: String },
    /// `data_uri` is a self-contained `data:<type>;base64,...` string.
    Image { data_uri: String, timestamp: String },
}

impl ChatMessage {
    pub fn text(body: impl Into<String>, timestamp: impl Into<String>) -> Self {
        ChatMessage::Text {
            body: body.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn link(url: impl Into<String>, timestamp: impl Into<String>) -> Self {
        ChatMessage::Link {
            url: url.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn image(data_uri: impl Into<String>, timestamp: impl Into<String>) -> Self {
        ChatMessage::Image {
            data_uri: data_uri.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            ChatMessage::Text { .. } => MessageKind::Text,
            ChatMessage::Link { .. } => MessageKind::Link,
            ChatMessage::Image { .. } => MessageKind::Image,
        }
    }

    /// The displayable payload: body, link text or data URI.
    pub fn content(&self) -> &str {
        match self {
            ChatMessage::Text { body, .. } => body,
            ChatMessage::Link { url, .. } => url,
            ChatMessage::Image { data_uri, .. } => data_uri,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            ChatMessage::Text { timestamp, .. }
            | ChatMessage::Link { timestamp, .. }
            | ChatMessage::Image { timestamp, .. } => timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let msg = ChatMessage::link("see https://example.com", "1:02:03 PM");
        assert_eq!(msg.kind(), MessageKind::Link);
        assert_eq!(msg.content(), "see https://example.com");
        assert_eq!(msg.timestamp(), "1:02:03 PM");

        let img = ChatMessage::image("data:image/png;base64,AAAA", "9:00:00 AM");
        assert_eq!(img.kind(), MessageKind::Image);
        assert_eq!(img.content(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(MessageKind::Text.label(), "text");
        assert_eq!(MessageKind::Link.label(), "link");
        assert_eq!(MessageKind::Image.label(), "image");
    }
}
