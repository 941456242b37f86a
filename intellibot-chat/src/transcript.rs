use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// One message in the transcript. Fields are private so a turn cannot
/// change after it is appended.
#[derive(Debug, Clone)]
pub struct Turn {
    role: Role,
    text: String,
    images: Vec<String>,
    at: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, text: String, images: Vec<String>) -> Self {
        Self {
            role,
            text,
            images,
            at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

/// Append-only log of turns for one session.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Turns appended at or after `index`.
    pub fn since(&self, index: usize) -> &[Turn] {
        self.turns.get(index..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Text of every user turn, oldest first.
    pub fn user_queries(&self) -> Vec<&str> {
        self.turns
            .iter()
            .filter(|t| t.role == Role::User)
            .map(Turn::text)
            .collect()
    }

    pub(crate) fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::new(Role::User, text.into(), Vec::new()));
    }

    pub(crate) fn push_bot(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::new(Role::Bot, text.into(), Vec::new()));
    }

    pub(crate) fn push_images(&mut self, marker: &str, images: Vec<String>) {
        self.turns.push(Turn::new(Role::Bot, marker.to_string(), images));
    }
}
