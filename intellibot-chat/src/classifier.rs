//! Canned replies for small talk.
//!
//! Rules are evaluated in order and the first match wins. The input is
//! expected to be lower-cased already; matching is plain substring
//! containment, so `"hi"` also fires inside words such as `"this"`.

pub const GREETING: &str = "Hello! 👋 How can I assist you today?";
pub const IDENTITY: &str = "I'm **IntelliBot – Smart Search Assistant** 🤖";
pub const FAREWELL: &str = "Goodbye! 👋 Have a great day.";

pub enum Predicate {
    /// Any of the needles occurs in the input.
    ContainsAny(&'static [&'static str]),
    Custom(fn(&str) -> bool),
}

impl Predicate {
    pub fn matches(&self, input: &str) -> bool {
        match self {
            Predicate::ContainsAny(needles) => needles.iter().any(|n| input.contains(n)),
            Predicate::Custom(f) => f(input),
        }
    }
}

pub struct Rule {
    pub name: &'static str,
    pub predicate: Predicate,
    pub reply: fn(&str) -> String,
}

impl Rule {
    pub fn canned(name: &'static str, needles: &'static [&'static str], reply: fn(&str) -> String) -> Self {
        Self {
            name,
            predicate: Predicate::ContainsAny(needles),
            reply,
        }
    }
}

pub struct Classifier {
    rules: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(vec![
            Rule::canned("greeting", &["hello", "hi"], |_| GREETING.to_string()),
            Rule::canned("identity", &["your name"], |_| IDENTITY.to_string()),
            Rule::canned("farewell", &["bye"], |_| FAREWELL.to_string()),
        ])
    }
}

impl Classifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Appends a rule after the existing ones, so it has the lowest precedence.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn classify(&self, normalized: &str) -> Option<String> {
        let rule = self.rules.iter().find(|r| r.predicate.matches(normalized))?;
        tracing::debug!(target: "chat.classifier", rule = rule.name, "chat.classifier.match");
        Some((rule.reply)(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_beats_farewell() {
        let c = Classifier::default();
        assert_eq!(c.classify("hello and bye").as_deref(), Some(GREETING));
        assert_eq!(c.classify("goodbye, what is your name").as_deref(), Some(IDENTITY));
        assert_eq!(c.classify("bye").as_deref(), Some(FAREWELL));
    }

    #[test]
    fn matches_inside_words() {
        let c = Classifier::default();
        assert_eq!(c.classify("history of rome").as_deref(), Some(GREETING));
    }

    #[test]
    fn declines_unrelated_input() {
        assert!(Classifier::default().classify("rust programming").is_none());
        assert!(Classifier::new(Vec::new()).classify("hello").is_none());
    }

    #[test]
    fn custom_rules_run_after_builtins() {
        let c = Classifier::default().with_rule(Rule {
            name: "thanks",
            predicate: Predicate::Custom(|s| s.starts_with("thank")),
            reply: |_| "You're welcome!".to_string(),
        });
        assert_eq!(c.classify("thanks a lot").as_deref(), Some("You're welcome!"));
        // "this" contains "hi", which the greeting rule claims first
        assert_eq!(c.classify("thank you for this").as_deref(), Some(GREETING));
    }
}
