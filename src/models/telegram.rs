use serde::Deserialize;

/// Inbound webhook payload from the Telegram Bot API. Only the fields the
/// relay consumes are modeled; everything else in the update is ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub first_name: String,
}

impl Update {
    /// The chat id and text of an inbound text message, or `None` for any
    /// update that carries no text payload (photos, stickers, joins, ...).
    /// Empty or whitespace-only text counts as no payload.
    pub fn text_message(&self) -> Option<(i64, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref().filter(|t| !t.trim().is_empty())?;
        Some((message.chat.id, text))
    }

    pub fn sender_name(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.from.as_ref())
            .map(|u| u.first_name.as_str())
    }
}
