use crossterm::style::{Attribute, Color, ContentStyle};

fn fg(color: Color) -> ContentStyle {
    ContentStyle {
        foreground_color: Some(color),
        ..ContentStyle::default()
    }
}

fn bold(mut style: ContentStyle) -> ContentStyle {
    style.attributes.set(Attribute::Bold);
    style
}

pub fn user_header() -> ContentStyle {
    bold(fg(Color::Cyan))
}

pub fn user_text() -> ContentStyle {
    fg(Color::Cyan)
}

pub fn bot_header() -> ContentStyle {
    bold(fg(Color::Green))
}

pub fn bot_text() -> ContentStyle {
    fg(Color::Green)
}

pub fn label() -> ContentStyle {
    bold(fg(Color::Yellow))
}

pub fn value() -> ContentStyle {
    fg(Color::White)
}

pub fn dim() -> ContentStyle {
    fg(Color::DarkGrey)
}

pub fn warning() -> ContentStyle {
    fg(Color::Yellow)
}

pub fn error() -> ContentStyle {
    bold(fg(Color::Red))
}
