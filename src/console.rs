//! Line-oriented terminal front end.
//!
//! Reads commands from stdin and forwards them to the `SessionManager`, each
//! on its own task. A separate render task prints whatever changed between
//! published snapshots.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::plugins::session::{Message, UploadedFile};
use crate::services::config::ClientConfig;
use crate::services::paths;
use crate::services::preferences::{PreferenceStore, Theme};
use crate::services::session::{SessionManager, SessionSnapshot};

const HELP: &str = "\
Commands:
  /new                 start a new conversation
  /list                refresh and show conversations
  /load <id>           open a conversation
  /delete <id>         delete a conversation
  /upload <path>...    upload files to the current conversation
  /remove <n>          unstage file number n (see /files)
  /files               show staged files
  /jobs                show running dashboard jobs
  /theme [light|dark]  show or set the theme
  /health              check the backend
  /help                show this help
  /quit                exit
Anything else is sent as a chat message.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    New,
    List,
    Load(String),
    Delete(String),
    Upload(Vec<PathBuf>),
    Remove(usize),
    Files,
    Jobs,
    Theme(Option<String>),
    Health,
    Help,
    Quit,
    Chat(String),
    Invalid(String),
}

/// Blank lines yield `None`.
fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('/') {
        return Some(Command::Chat(line.to_string()));
    }

    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();
    let single = |usage: &str| match args.as_slice() {
        [arg] => Ok(arg.to_string()),
        _ => Err(Command::Invalid(format!("Usage: {usage}"))),
    };

    let command = match name {
        "/new" => Command::New,
        "/list" => Command::List,
        "/load" => single("/load <id>").map_or_else(|e| e, Command::Load),
        "/delete" => single("/delete <id>").map_or_else(|e| e, Command::Delete),
        "/upload" if args.is_empty() => Command::Invalid("Usage: /upload <path>...".into()),
        "/upload" => Command::Upload(args.iter().map(PathBuf::from).collect()),
        "/remove" => match args.as_slice() {
            [n] => match n.parse::<usize>() {
                Ok(n) if n >= 1 => Command::Remove(n - 1),
                _ => Command::Invalid(format!("Not a file number: {n}")),
            },
            _ => Command::Invalid("Usage: /remove <n>".into()),
        },
        "/files" => Command::Files,
        "/jobs" => Command::Jobs,
        "/theme" => Command::Theme(args.first().map(|s| s.to_string())),
        "/health" => Command::Health,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Invalid(format!("Unknown command {other}; try /help")),
    };
    Some(command)
}

fn format_message(message: &Message) -> Vec<String> {
    let mut lines = match message {
        Message::User { content, .. } => vec![format!("you> {content}")],
        Message::Assistant {
            content, completed, ..
        } if *completed => vec![format!("assistant [done]> {content}")],
        Message::Assistant { content, .. } => vec![format!("assistant> {content}")],
        Message::Error { content, .. } => vec![format!("error> {content}")],
    };
    if let Some(links) = message.links() {
        if let Some(url) = &links.dashboard_url {
            lines.push(format!("    dashboard: {url}"));
        }
        if let Some(url) = &links.download_link {
            lines.push(format!("    download:  {url}"));
        }
    }
    lines
}

fn format_files(files: &[UploadedFile]) -> Vec<String> {
    if files.is_empty() {
        return vec!["No staged files.".to_string()];
    }
    files
        .iter()
        .enumerate()
        .map(|(i, f)| format!("  {}. {} ({})", i + 1, f.name, f.file_type))
        .collect()
}

/// What the terminal has already shown.
#[derive(Default)]
struct RenderState {
    conversation_id: Option<String>,
    messages: Vec<Message>,
    jobs: BTreeMap<String, (u8, Option<String>)>,
    sending: bool,
}

impl RenderState {
    /// Lines to print for the step from the last rendered snapshot to `snapshot`.
    fn apply(&mut self, snapshot: &SessionSnapshot) -> Vec<String> {
        let mut out = Vec::new();

        let appended = snapshot.conversation_id == self.conversation_id
            && snapshot.messages.len() >= self.messages.len()
            && snapshot.messages[..self.messages.len()] == self.messages[..];
        if appended {
            for message in &snapshot.messages[self.messages.len()..] {
                out.extend(format_message(message));
            }
        } else {
            match &snapshot.conversation_id {
                Some(id) => out.push(format!("--- conversation {id} ---")),
                None => out.push("--- new conversation ---".to_string()),
            }
            for message in &snapshot.messages {
                out.extend(format_message(message));
            }
        }

        if snapshot.is_sending && !self.sending {
            out.push("(waiting for reply...)".to_string());
        }

        let mut jobs = BTreeMap::new();
        for (id, job) in &snapshot.jobs {
            let view = (job.progress, job.stage.clone());
            if self.jobs.get(id) != Some(&view) {
                let stage = job.stage.as_deref().unwrap_or("processing");
                out.push(format!("[job {id}] {stage} {}%", job.progress));
            }
            jobs.insert(id.clone(), view);
        }

        self.conversation_id = snapshot.conversation_id.clone();
        self.messages = snapshot.messages.clone();
        self.jobs = jobs;
        self.sending = snapshot.is_sending;
        out
    }
}

async fn render_loop(mut rx: watch::Receiver<SessionSnapshot>) {
    let mut view = RenderState::default();
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        for line in view.apply(&snapshot) {
            println!("{line}");
        }
    }
}

async fn execute(command: Command, manager: &SessionManager, preferences: &PreferenceStore) {
    match command {
        Command::New => manager.start_new_conversation(),
        Command::List => {
            manager.list_conversations().await;
            let conversations = manager.snapshot().conversations;
            if conversations.is_empty() {
                println!("No conversations.");
            }
            for c in conversations {
                println!(
                    "  {}  {} ({} messages)",
                    c.id, c.title, c.message_count
                );
            }
        }
        Command::Load(id) => {
            if !manager.load_conversation(&id).await {
                println!("Another conversation is still loading.");
            }
        }
        Command::Delete(id) => {
            if manager.delete_conversation(&id).await {
                println!("Deleted {id}.");
            } else {
                println!("Could not delete {id}.");
            }
        }
        Command::Upload(paths) => {
            if manager.upload_files(&paths).await {
                for line in format_files(&manager.snapshot().files) {
                    println!("{line}");
                }
            }
        }
        Command::Remove(index) => match manager.remove_staged_file(index) {
            Some(file) => println!("Removed {}.", file.name),
            None => println!("No staged file number {}.", index + 1),
        },
        Command::Files => {
            for line in format_files(&manager.snapshot().files) {
                println!("{line}");
            }
        }
        Command::Jobs => {
            let jobs = manager.snapshot().jobs;
            if jobs.is_empty() {
                println!("No running jobs.");
            }
            for (id, job) in jobs {
                let stage = job.stage.as_deref().unwrap_or("processing");
                println!("  {id}: {stage} {}%", job.progress);
            }
        }
        Command::Theme(None) => println!("Theme: {}", preferences.theme().as_str()),
        Command::Theme(Some(value)) => match Theme::parse(&value) {
            Some(theme) => match preferences.set_theme(theme) {
                Ok(()) => println!("Theme set to {}.", theme.as_str()),
                Err(err) => log::error!("{}", err),
            },
            None => println!("Unknown theme {value}; use light or dark."),
        },
        Command::Health => match manager.api().health().await {
            Ok(health) => {
                println!(
                    "Backend {} (version {})",
                    health.status,
                    health.version.as_deref().unwrap_or("unknown")
                );
                for (service, status) in &health.services {
                    println!("  {service}: {status}");
                }
                if let Ok(config) = manager.api().server_config().await {
                    println!(
                        "  Power BI configured: {}, max upload: {} bytes",
                        config.powerbi_configured,
                        config
                            .max_file_size
                            .map_or_else(|| "?".to_string(), |n| n.to_string())
                    );
                }
            }
            Err(err) => println!("Backend unreachable: {err}"),
        },
        Command::Help => println!("{HELP}"),
        Command::Invalid(reason) => println!("{reason}"),
        Command::Chat(text) => {
            if !manager.send_message(&text).await {
                println!("Still waiting for the previous reply.");
            }
        }
        // Handled by the input loop.
        Command::Quit => {}
    }
}

pub(crate) async fn run_console(config: ClientConfig) -> Result<(), String> {
    let data_dir = paths::data_dir(&config)?;
    let preferences = Arc::new(PreferenceStore::new(&data_dir));
    let manager = Arc::new(
        SessionManager::from_config(&config)
            .map_err(|e| format!("Failed to create API client: {e}"))?,
    );
    log::info!(
        "Using dashboard API at {} (poll every {:?})",
        config.api_base_url,
        config.poll_interval
    );

    let render = tokio::spawn(render_loop(manager.subscribe()));
    println!("Theme: {}. Type /help for commands.", preferences.theme().as_str());
    manager.list_conversations().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                log::error!("Failed to read stdin: {}", err);
                break;
            }
        };
        match parse_command(&line) {
            None => {}
            Some(Command::Quit) => break,
            Some(command) => {
                let manager = manager.clone();
                let preferences = preferences.clone();
                tokio::spawn(async move { execute(command, &manager, &preferences).await });
            }
        }
    }

    manager.shutdown();
    render.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::session::{DashboardLinks, Job};

    #[test]
    fn parses_commands_and_chat() {
        assert_eq!(parse_command("   "), None);
        assert_eq!(
            parse_command("make a chart"),
            Some(Command::Chat("make a chart".into()))
        );
        assert_eq!(parse_command("/load c1"), Some(Command::Load("c1".into())));
        assert_eq!(
            parse_command("/upload a.csv b.xlsx"),
            Some(Command::Upload(vec!["a.csv".into(), "b.xlsx".into()]))
        );
        assert_eq!(parse_command("/remove 2"), Some(Command::Remove(1)));
        assert_eq!(parse_command("/theme"), Some(Command::Theme(None)));
        assert_eq!(parse_command("/quit"), Some(Command::Quit));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(parse_command("/load"), Some(Command::Invalid(_))));
        assert!(matches!(parse_command("/remove 0"), Some(Command::Invalid(_))));
        assert!(matches!(parse_command("/upload"), Some(Command::Invalid(_))));
        assert!(matches!(parse_command("/bogus"), Some(Command::Invalid(_))));
    }

    #[test]
    fn render_prints_only_new_messages() {
        let mut view = RenderState::default();
        let mut snapshot = SessionSnapshot {
            conversation_id: Some("c1".into()),
            messages: vec![Message::user("hi")],
            ..Default::default()
        };
        let first = view.apply(&snapshot);
        assert_eq!(first, vec!["--- conversation c1 ---", "you> hi"]);

        snapshot.messages.push(Message::completed(
            "Done",
            DashboardLinks::new(Some("http://d".into()), None),
        ));
        let second = view.apply(&snapshot);
        assert_eq!(
            second,
            vec!["assistant [done]> Done", "    dashboard: http://d"]
        );
        assert!(view.apply(&snapshot).is_empty());
    }

    #[test]
    fn render_reprints_replaced_log_and_job_progress() {
        let mut view = RenderState::default();
        let mut snapshot = SessionSnapshot {
            conversation_id: Some("c1".into()),
            messages: vec![Message::user("a"), Message::user("b")],
            ..Default::default()
        };
        view.apply(&snapshot);

        snapshot.messages = vec![Message::user("a")];
        let mut job = Job::processing();
        job.progress = 30;
        job.stage = Some("creating_dashboard".into());
        snapshot.jobs.insert("j1".into(), job);
        let lines = view.apply(&snapshot);
        assert_eq!(
            lines,
            vec![
                "--- conversation c1 ---",
                "you> a",
                "[job j1] creating_dashboard 30%"
            ]
        );
        assert!(view.apply(&snapshot).is_empty());
    }
}
