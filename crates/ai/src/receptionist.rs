//! Chat receptionist for the public site widget.

use std::sync::LazyLock;

use homestead_core::error::CoreError;
use homestead_core::sanitize::{normalize_email, normalize_phone, sanitize_text};
use homestead_core::types::Cents;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::client::{ChatMessage, TextGenerator};

/// Longest conversation accepted; older turns are dropped first.
pub const MAX_TURNS: usize = 20;

/// Longest single message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2_000;

/// Sent when the provider fails.
pub const FALLBACK_REPLY: &str = "Thanks for reaching out! I can't answer right now. \
Leave your phone number or email and someone from our team will get back to you shortly.";

const SYSTEM_PROMPT: &str = "You are the friendly receptionist of a rental agency. \
Answer questions about listed properties and viewings in at most three sentences. \
Never invent prices, addresses or availability you were not given. \
If the visitor wants a viewing, ask for their name and a phone number or email.";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("valid regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s().-]{5,}\d").expect("valid regex"));

#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Property the visitor is looking at, if any.
#[derive(Debug, Clone)]
pub struct PropertyContext<'a> {
    pub title: &'a str,
    pub city: &'a str,
    pub property_type: &'a str,
    pub monthly_rent_cents: Cents,
    pub bedrooms: i32,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactDetails {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactDetails {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceptionistReply {
    pub reply: String,
    pub fallback: bool,
    /// Contact details found in the latest visitor message.
    pub contact: Option<ContactDetails>,
}

/// Sanitize and check a conversation. Keeps the newest [`MAX_TURNS`] turns.
pub fn prepare_turns(turns: &[ChatTurn]) -> Result<Vec<ChatMessage>, CoreError> {
    let Some(last) = turns.last() else {
        return Err(CoreError::Validation(
            "At least one message is required".to_string(),
        ));
    };
    if last.role != "user" {
        return Err(CoreError::Validation(
            "The last message must come from the user".to_string(),
        ));
    }

    let start = turns.len().saturating_sub(MAX_TURNS);
    let mut out = Vec::with_capacity(turns.len() - start);
    for turn in &turns[start..] {
        let content = sanitize_text(&turn.content);
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Messages are limited to {MAX_MESSAGE_LENGTH} characters"
            )));
        }
        match turn.role.as_str() {
            "user" => out.push(ChatMessage::user(content)),
            "assistant" => out.push(ChatMessage::assistant(content)),
            other => {
                return Err(CoreError::Validation(format!(
                    "Unknown message role '{other}'"
                )))
            }
        }
    }

    if out.last().is_some_and(|m| m.content.is_empty()) {
        return Err(CoreError::Validation(
            "The last message must not be empty".to_string(),
        ));
    }
    Ok(out)
}

/// Pull an email address and phone number out of free text.
pub fn extract_contact(text: &str) -> ContactDetails {
    let email = EMAIL_RE
        .find(text)
        .and_then(|m| normalize_email(m.as_str()).ok());
    let phone = PHONE_RE
        .find_iter(text)
        .find_map(|m| normalize_phone(m.as_str()).ok());
    ContactDetails { email, phone }
}

fn system_prompt(property: Option<&PropertyContext<'_>>) -> String {
    let Some(p) = property else {
        return SYSTEM_PROMPT.to_string();
    };
    let mut prompt = format!(
        "{SYSTEM_PROMPT}\n\nThe visitor is viewing: {} ({} in {}), {} bedrooms, monthly rent {:.2}.",
        p.title,
        p.property_type,
        p.city,
        p.bedrooms,
        p.monthly_rent_cents as f64 / 100.0
    );
    if let Some(description) = p.description {
        prompt.push_str("\nDescription: ");
        prompt.push_str(description);
    }
    prompt
}

/// Answer the latest visitor message.
///
/// `turns` must already have passed [`prepare_turns`].
pub async fn reply(
    generator: &dyn TextGenerator,
    turns: &[ChatMessage],
    property: Option<&PropertyContext<'_>>,
) -> ReceptionistReply {
    let contact = turns
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| extract_contact(&m.content))
        .filter(|c| !c.is_empty());

    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatMessage::system(system_prompt(property)));
    messages.extend_from_slice(turns);

    match generator.complete(&messages, false).await {
        Ok(text) => ReceptionistReply {
            reply: sanitize_text(&text),
            fallback: false,
            contact,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Receptionist model failed, sending fallback reply");
            ReceptionistReply {
                reply: FALLBACK_REPLY.to_string(),
                fallback: true,
                contact,
            }
        }
    }
}
