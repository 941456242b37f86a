use crate::command::{Command, parse_command};
use crate::styles;
use anyhow::Result;
use crossterm::queue;
use crossterm::style::{ContentStyle, Print, PrintStyledContent};
use intellibot_chat::{Role, Session, Turn};
use intellibot_web::ImageFetcher;
use std::io::{Stdout, Write, stdout};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};

const BANNER: &str = "IntelliBot – Smart Search Assistant";

/// Line-oriented chat shell: one query per line, slash commands for the
/// history sidebar.
pub struct Shell {
    session: Session,
    images: ImageFetcher,
    out: Stdout,
}

enum Flow {
    Continue,
    Quit,
}

impl Shell {
    pub fn new(session: Session, images: ImageFetcher) -> Self {
        Self {
            session,
            images,
            out: stdout(),
        }
    }

    pub async fn run(mut self) -> Result<()> {
        self.push_styled(BANNER, styles::label())?;
        self.push_styled("Ask anything. `/help` lists commands.", styles::dim())?;
        self.push_blank()?;

        let mut lines = BufReader::new(stdin()).lines();
        loop {
            self.prompt()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let flow = if line.trim_start().starts_with('/') {
                self.handle_command(parse_command(&line)).await?
            } else {
                self.handle_typed(&line).await?
            };
            if let Flow::Quit = flow {
                break;
            }
        }

        tracing::info!(target: "app", turns = self.session.transcript().len(), "app.shell.exit");
        Ok(())
    }

    async fn handle_typed(&mut self, line: &str) -> Result<Flow> {
        if let Some(input) = self.session.next_input(Some(line)) {
            self.ask(&input).await?;
        }
        Ok(Flow::Continue)
    }

    async fn handle_command(&mut self, cmd: Command) -> Result<Flow> {
        match cmd {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                self.push_styled("Commands:", styles::label())?;
                self.push_styled("  /history        list previous questions", styles::value())?;
                self.push_styled("  /replay <n>     ask question n again", styles::value())?;
                self.push_styled("  /quit           exit", styles::value())?;
                self.push_blank()?;
            }
            Command::History => {
                let queries: Vec<String> = self
                    .session
                    .transcript()
                    .user_queries()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                if queries.is_empty() {
                    self.push_styled("No previous questions yet.", styles::dim())?;
                } else {
                    self.push_styled("History:", styles::label())?;
                    for (i, q) in queries.iter().enumerate() {
                        self.push_styled(format!("  {:>3}. {q}", i + 1), styles::value())?;
                    }
                }
                self.push_blank()?;
            }
            Command::Replay(Some(n)) => match self.session.select_query(n - 1) {
                Ok(()) => {
                    if let Some(input) = self.session.next_input(None) {
                        self.ask(&input).await?;
                    }
                }
                Err(_) => {
                    self.push_styled(format!("× No question #{n}. See `/history`."), styles::error())?;
                    self.push_blank()?;
                }
            },
            Command::Replay(None) => {
                self.push_styled("× Usage: /replay <n>", styles::error())?;
                self.push_blank()?;
            }
            Command::Unknown(s) => {
                self.push_styled(format!("× Unknown command: {s}"), styles::error())?;
                self.push_styled("Try `/help`.", styles::dim())?;
                self.push_blank()?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn ask(&mut self, input: &str) -> Result<()> {
        let start = self.session.transcript().len();
        // A failed web search leaves its partial reply in the transcript and
        // shows nothing extra; the session already logged it.
        let _ = self.session.submit(input).await;

        let fresh: Vec<Turn> = self.session.transcript().since(start).to_vec();
        for turn in &fresh {
            self.render_turn(turn).await?;
        }
        Ok(())
    }

    async fn render_turn(&mut self, turn: &Turn) -> Result<()> {
        let (header, text_style) = match turn.role() {
            Role::User => ("→ [You]", styles::user_text()),
            Role::Bot => ("← [IntelliBot]", styles::bot_text()),
        };
        let header_style = match turn.role() {
            Role::User => styles::user_header(),
            Role::Bot => styles::bot_header(),
        };
        self.push_styled(header, header_style)?;
        for line in turn.text().lines() {
            self.push_styled(format!("  {line}"), text_style)?;
        }

        for url in turn.images() {
            match self.images.fetch(url).await {
                Ok(img) => {
                    let format = img.format.as_deref().unwrap_or("image");
                    self.push_styled(format!("    • {url}"), styles::value())?;
                    self.push_styled(
                        format!("      {}×{} {format}, {} bytes", img.width, img.height, img.byte_len),
                        styles::dim(),
                    )?;
                }
                Err(e) => {
                    self.push_styled(format!("  ⚠️ Could not load image: {e}"), styles::warning())?;
                }
            }
        }
        self.push_blank()
    }

    fn prompt(&mut self) -> Result<()> {
        queue!(self.out, PrintStyledContent(styles::user_header().apply("› ")))?;
        self.out.flush()?;
        Ok(())
    }

    fn push_styled<S: Into<String>>(&mut self, s: S, style: ContentStyle) -> Result<()> {
        queue!(self.out, PrintStyledContent(style.apply(s.into())), Print("\n"))?;
        self.out.flush()?;
        Ok(())
    }

    fn push_blank(&mut self) -> Result<()> {
        self.push_styled(String::new(), ContentStyle::default())
    }
}
