#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    History,               // /history
    Replay(Option<usize>), // /replay <n>, 1-based as listed by /history
    Help,                  // /help
    Quit,                  // /quit or /exit
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Command::Unknown(trimmed.to_string());
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match verb {
        "/history" => Command::History,
        "/replay" => Command::Replay(rest.and_then(|n| n.parse::<usize>().ok()).filter(|n| *n > 0)),
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_verbs() {
        assert_eq!(parse_command("/history"), Command::History);
        assert_eq!(parse_command("  /replay 2 "), Command::Replay(Some(2)));
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/exit"), Command::Quit);
    }

    #[test]
    fn replay_needs_a_positive_number() {
        assert_eq!(parse_command("/replay"), Command::Replay(None));
        assert_eq!(parse_command("/replay 0"), Command::Replay(None));
        assert_eq!(parse_command("/replay two"), Command::Replay(None));
    }

    #[test]
    fn everything_else_is_unknown() {
        assert_eq!(parse_command("/frobnicate"), Command::Unknown("/frobnicate".into()));
        assert_eq!(parse_command("rust"), Command::Unknown("rust".into()));
    }
}
