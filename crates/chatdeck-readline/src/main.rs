mod commands;
mod logging;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;

use chatdeck_application::{ChatInputController, SignalBus, SignalSubscription};
use chatdeck_core::paste::{ClipboardPayload, PasteOutcome};
use chatdeck_core::prompt::{PendingPrompt, PromptGroup, ReservedCommand, VariableValues};
use chatdeck_core::session::{Notification, NotificationLevel, SessionContext, TemplateNavigator};
use chatdeck_core::signal::AppSignal;
use chatdeck_core::view::ViewEffect;
use chatdeck_infrastructure::file_loader::{load_attachment, load_text};
use chatdeck_infrastructure::{ConfigService, HttpSession, SessionEvent};

use commands::{COMMAND_NAMES, Command, HELP};

#[derive(Parser)]
#[command(name = "chatdeck")]
#[command(about = "ChatDeck - terminal chat input for a session backend", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to ~/.config/chatdeck/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session to attach to on start
    #[arg(long)]
    session: Option<String>,

    /// Id of a configured prompt to start the draft with
    #[arg(long)]
    prompt: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// CLI helper for rustyline: completes `/prompts` and `:commands`.
#[derive(Clone)]
struct CliHelper {
    prompts: Vec<String>,
    commands: Vec<String>,
}

impl CliHelper {
    fn new(prompts: &[PromptGroup]) -> Self {
        let mut names: Vec<String> = prompts.iter().map(|p| format!("/{}", p.name)).collect();
        names.extend(ReservedCommand::ALL.iter().map(|c| format!("/{}", c.name())));
        Self {
            prompts: names,
            commands: COMMAND_NAMES.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Byte offset where the word under the cursor starts.
    fn word_start(line: &str) -> usize {
        line.char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8())
    }

    fn candidates<'a>(&'a self, line: &str) -> (usize, Vec<&'a String>) {
        if line.starts_with(':') && !line.contains(' ') {
            let matches = self.commands.iter().filter(|c| c.starts_with(line)).collect();
            return (0, matches);
        }
        let start = Self::word_start(line);
        let word = &line[start..];
        if word.starts_with('/') {
            (start, self.prompts.iter().filter(|p| p.starts_with(word)).collect())
        } else {
            (start, Vec::new())
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(&line[..pos]);
        let candidates = matches
            .into_iter()
            .map(|m| Pair {
                display: m.clone(),
                replacement: m.clone(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with(':') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let (start, matches) = self.candidates(line);
        let typed = &line[start..];
        if typed.len() < 2 {
            return None;
        }
        matches
            .into_iter()
            .find(|m| m.len() > typed.len())
            .map(|m| m[typed.len()..].to_string())
    }
}

impl Validator for CliHelper {}

/// Prints the template-authoring instruction instead of navigating.
struct TerminalNavigator;

impl TemplateNavigator for TerminalNavigator {
    fn open_template_authoring(&self, instruction: String) {
        println!("{}", "Template authoring requested:".bright_magenta());
        for line in instruction.lines() {
            println!("  {}", line.bright_black());
        }
    }
}

struct Repl {
    controller: ChatInputController,
    session: Arc<HttpSession>,
    bus: SignalBus,
    signals: SignalSubscription,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    prompts: Vec<PromptGroup>,
    transcript: Vec<String>,
}

impl Repl {
    /// Handles everything that arrived since the last prompt, then runs view effects.
    async fn pump(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        self.controller.drain_signals(&mut self.signals).await;
        // Effects raised by the signals above may have produced more events
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }

        for effect in self.controller.drain_view_effects() {
            match effect {
                ViewEffect::ScrollToBottom => println!(),
                // The next readline call takes focus
                ViewEffect::FocusInput => {}
            }
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Notification(notification) => print_notification(&notification),
            SessionEvent::RespondingChanged(responding) => {
                self.controller.on_responding_changed(responding);
            }
            SessionEvent::ArtifactsChanged => {
                println!("{}", "Artifacts updated".bright_black());
            }
            SessionEvent::SessionAssigned(id) => {
                self.controller.on_session_changed(Some(&id));
                println!("{}", format!("Session {}", id).bright_black());
            }
            SessionEvent::Reply(reply) => {
                for line in reply.lines() {
                    println!("{}", line.bright_blue());
                }
                self.transcript.push(format!("assistant: {}", reply));
            }
        }
    }

    fn prompt(&self) -> String {
        let mut badges = Vec::new();
        let files = self.controller.files().len();
        if files > 0 {
            badges.push(format!("{} file(s)", files));
        }
        let artifacts = self.controller.pasted_artifacts().len();
        if artifacts > 0 {
            badges.push(format!("{} artifact(s)", artifacts));
        }
        if self.controller.pending_paste().is_some() {
            badges.push("paste pending".to_string());
        }
        if self.controller.draft().context().is_some() {
            badges.push("context".to_string());
        }

        if badges.is_empty() {
            ">> ".to_string()
        } else {
            format!("[{}] >> ", badges.join(", "))
        }
    }

    /// Returns `false` when the REPL should exit.
    async fn handle_line(&mut self, initial: &str, line: String) -> Result<bool> {
        // A command typed after the pre-filled draft leaves the draft alone
        let command = line
            .strip_prefix(initial)
            .map(str::trim_start)
            .filter(|rest| rest.starts_with(':'))
            .or_else(|| Some(line.trim()).filter(|l| l.starts_with(':')));
        if let Some(command) = command {
            return self.handle_command(Command::parse(command)?).await;
        }

        // Replay the `/` keystroke of a trailing `/word` so the popover opens
        let word_start = CliHelper::word_start(&line);
        if line[word_start..].starts_with('/') {
            let typed = &line[..word_start + 1];
            self.controller.on_text_change(typed, typed.chars().count());
        }
        let cursor = line.chars().count();
        self.controller.on_text_change(line, cursor);

        if self.controller.is_slash_popover_open() && self.select_from_popover() {
            return Ok(true);
        }
        if self.controller.draft().is_blank() && self.controller.files().is_empty() {
            return Ok(true);
        }

        let message = self.controller.draft().compose_message();
        if self.controller.submit().await {
            self.transcript.push(format!("user: {}", message));
        } else if self.session.is_responding() {
            println!("{}", "A response is still in progress (:cancel to stop it)".yellow());
        }
        Ok(true)
    }

    /// Resolves the open popover against the typed `/query`.
    ///
    /// Returns `false` when the query names nothing, so the line is sent as typed.
    fn select_from_popover(&mut self) -> bool {
        let Some(query) = self.controller.slash_query().map(str::to_string) else {
            return false;
        };

        if query.is_empty() {
            println!("{}", "Prompts:".bright_magenta());
            for group in &self.prompts {
                let description = group.description.as_deref().unwrap_or("");
                println!("  /{:<20} {}", group.name, description.bright_black());
            }
            for command in ReservedCommand::ALL {
                println!("  /{:<20} {}", command.name(), command.description().bright_black());
            }
            return true;
        }

        if let Some(command) = ReservedCommand::parse(&query) {
            let transcript = self.transcript.join("\n");
            let transcript = (!transcript.is_empty()).then_some(transcript.as_str());
            self.controller.on_reserved_command(command, transcript);
            return true;
        }

        let group = self
            .prompts
            .iter()
            .find(|group| group.name == query || group.id == query)
            .cloned();
        match group {
            Some(group) => {
                if !self.controller.select_prompt_group(group) {
                    println!("{}", "Finish the open form first (:save or :discard)".yellow());
                }
                true
            }
            None => {
                self.controller.close_slash_popover();
                false
            }
        }
    }

    async fn handle_command(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Attach(paths) => {
                let requested = paths.len();
                let mut files = Vec::with_capacity(requested);
                for path in paths {
                    let file = load_attachment(&path)
                        .await
                        .with_context(|| format!("failed to attach {}", path.display()))?;
                    files.push(file);
                }
                let added = self.controller.on_files_picked(files);
                println!("{}", format!("Attached {} file(s)", added).green());
                if added < requested {
                    println!("{}", "Duplicates were skipped".bright_black());
                }
            }
            Command::Paste(path) => {
                let text = load_text(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                self.paste_text(text);
            }
            Command::Save { title, mime } => {
                if self.controller.pending_paste().is_none() {
                    bail!("no pasted content is waiting to be saved");
                }
                if let Some(item) = self.controller.save_pasted_artifact(&title, mime, None).await {
                    println!(
                        "{}",
                        format!("Saved {} ({})", item.display_name, item.artifact.uri).green()
                    );
                }
            }
            Command::Discard => match self.controller.discard_pending_paste() {
                Some(_) => println!("{}", "Pasted content discarded".bright_black()),
                None => bail!("no pasted content is pending"),
            },
            Command::Files => self.print_files(),
            Command::Remove(index) => match self.controller.remove_file(index) {
                Some(file) => println!("{}", format!("Removed {}", file.name).bright_black()),
                None => bail!("no attached file #{}", index + 1),
            },
            Command::Unlink(index) => {
                let Some(id) = self.controller.pasted_artifacts().get(index).map(|a| a.id.clone())
                else {
                    bail!("no saved artifact #{}", index + 1);
                };
                self.controller.remove_pasted_artifact(&id);
            }
            Command::Session(id) => {
                self.session.set_session_id(id.clone());
                let transition = self.controller.on_session_changed(id.as_deref());
                if transition.requires_reset() {
                    println!("{}", "Session changed, input cleared".bright_black());
                }
            }
            Command::FollowUp { selection, question } => {
                let auto_submit = question.is_some();
                self.bus.publish(AppSignal::FollowUpQuestion {
                    selected_text: selection,
                    prompt: question,
                    auto_submit,
                });
            }
            Command::Context(Some(context)) => self.controller.set_context(Some(context)),
            Command::Context(None) => self.controller.clear_context(),
            Command::Say(text) => self.controller.on_transcription(&text),
            Command::Cancel => {
                if !self.session.is_responding() {
                    println!("{}", "No response in progress".bright_black());
                }
                self.controller.cancel_response().await;
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn paste_text(&mut self, text: String) {
        let chars = text.chars().count();
        let lines = text.lines().count();
        match self.controller.on_paste(ClipboardPayload::Text(text.clone())) {
            PasteOutcome::InsertDefault => {
                let mut draft = self.controller.draft().text().to_string();
                draft.push_str(&text);
                let cursor = draft.chars().count();
                self.controller.on_text_change(draft, cursor);
            }
            PasteOutcome::ArtifactPending => {
                println!(
                    "{}",
                    format!(
                        "Large paste ({} chars, {} lines) held back. \
                         :save <title> [mime] or :discard",
                        chars, lines
                    )
                    .yellow()
                );
            }
            PasteOutcome::FilesAttached { added } => {
                println!("{}", format!("Attached {} file(s)", added).green());
            }
            PasteOutcome::Ignored if self.session.is_responding() => {
                println!("{}", "Paste ignored while a response is in progress".yellow());
            }
            PasteOutcome::Ignored => {
                println!("{}", "Paste ignored: save or discard the pending paste first".yellow());
            }
        }
    }

    fn print_files(&self) {
        if self.controller.files().is_empty() && self.controller.pasted_artifacts().is_empty() {
            println!("{}", "Nothing attached".bright_black());
            return;
        }
        for (i, file) in self.controller.files().iter().enumerate() {
            println!("  {}. {} ({}, {} bytes)", i + 1, file.name, file.mime_type, file.size);
        }
        for (i, item) in self.controller.pasted_artifacts().iter().enumerate() {
            println!(
                "  @{}. {} {}",
                i + 1,
                item.display_name,
                item.artifact.uri.bright_black()
            );
        }
    }
}

fn print_notification(notification: &Notification) {
    let text = if notification.message.is_empty() {
        notification.title.clone()
    } else {
        format!("{}: {}", notification.title, notification.message)
    };
    match notification.level {
        NotificationLevel::Error => eprintln!("{}", text.red()),
        NotificationLevel::Success => println!("{}", text.green()),
        NotificationLevel::Info => println!("{}", text.bright_black()),
    }
}

/// Asks for each template variable in turn.
fn read_variables(
    rl: &mut Editor<CliHelper, DefaultHistory>,
    variables: &[String],
) -> rustyline::Result<VariableValues> {
    let mut values = VariableValues::new();
    for name in variables {
        let value = rl.readline(&format!("  {{{{{}}}}}: ", name))?;
        values.insert(name.clone(), value.trim().to_string());
    }
    Ok(values)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = config_service
        .get_config()
        .context("failed to load configuration")?;
    logging::setup_logging(cli.verbose, &config.log.filter);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let session = Arc::new(HttpSession::new(&config.api, event_tx)?);
    session.set_session_id(cli.session.clone());

    let prompts = config.prompt_groups();
    let mut controller = ChatInputController::with_classifier(
        session.clone(),
        Arc::new(TerminalNavigator),
        config.paste,
    );

    let mut router_state = cli.prompt.as_deref().and_then(|id| {
        let group = prompts.iter().find(|p| p.id == id);
        if group.is_none() {
            tracing::warn!("[Readline] No configured prompt with id '{}'", id);
        }
        group.map(|group| PendingPrompt {
            prompt_text: group.prompt_text.clone(),
            group_id: Some(group.id.clone()),
            group_name: Some(group.name.clone()),
        })
    });
    controller.apply_router_state(&mut router_state);

    let bus = SignalBus::new();
    let signals = bus.subscribe();
    let mut repl = Repl {
        controller,
        session,
        bus,
        signals,
        events: event_rx,
        prompts,
        transcript: Vec::new(),
    };

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new(&repl.prompts)));

    println!("{}", "=== ChatDeck ===".bright_magenta().bold());
    println!("{}", format!("Backend: {}", repl.session.base_url()).bright_black());
    match repl.session.session_id() {
        Some(id) => println!("{}", format!("Session: {}", id).bright_black()),
        None => println!("{}", "No session yet (:session <id>)".bright_black()),
    }
    println!("{}", "Type a message, '/' for prompts, ':help' for commands.".bright_black());
    println!();

    // ===== Main REPL Loop =====
    loop {
        repl.pump().await;

        if let Some(dialog) = repl.controller.overlay().variable_dialog().cloned() {
            println!(
                "{}",
                format!("Fill in the variables for '{}':", dialog.group.name).bright_magenta()
            );
            match read_variables(&mut rl, &dialog.variables) {
                Ok(values) => {
                    if let Err(e) = repl.controller.submit_variables(&values) {
                        eprintln!("{}", e.user_message().red());
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    repl.controller.cancel_variables();
                    println!("{}", "Prompt cancelled".bright_black());
                }
                Err(err) => return Err(err.into()),
            }
            continue;
        }

        let initial = repl.controller.draft().text().to_string();
        match rl.readline_with_initial(&repl.prompt(), (&initial, "")) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                match repl.handle_line(&initial, line).await {
                    Ok(true) => {}
                    Ok(false) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Err(e) => eprintln!("{}", format!("Error: {:#}", e).red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                repl.controller.on_text_change(String::new(), 0);
                println!("{}", "Draft cleared. Type ':quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> CliHelper {
        CliHelper::new(&[PromptGroup::new("1", "summarize", "Summarize {{text}}")])
    }

    #[test]
    fn test_completes_prompt_after_whitespace() {
        let helper = helper();
        let (start, matches) = helper.candidates("please /sum");
        assert_eq!(start, 7);
        assert_eq!(matches, vec![&"/summarize".to_string()]);
    }

    #[test]
    fn test_completes_reserved_commands() {
        let helper = helper();
        let (_, matches) = helper.candidates("/create");
        assert_eq!(matches, vec![&"/create-template".to_string()]);
    }

    #[test]
    fn test_completes_colon_commands_only_at_start() {
        let helper = helper();
        let (start, matches) = helper.candidates(":at");
        assert_eq!(start, 0);
        assert_eq!(matches, vec![&":attach".to_string()]);

        let (_, matches) = helper.candidates("hello :at");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_word_start_handles_multibyte() {
        assert_eq!(CliHelper::word_start("日本\u{3000}/x"), "日本\u{3000}".len());
        assert_eq!(CliHelper::word_start("/x"), 0);
    }
}
