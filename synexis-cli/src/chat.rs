use anyhow::{Context, Result};
use log::{info, warn};
use std::io::{self, BufRead, Write};

use synexis_core::{ChatSession, ClientHints, Role};

use crate::api::ChatApi;
use crate::config::Config;
use crate::state::SessionStore;

/// Where replies come from.
pub enum Backend {
    Remote(ChatApi),
    /// Replies are built from the local hints only.
    Offline,
}

impl Backend {
    pub fn from_config(cfg: &Config, offline: bool, endpoint: Option<String>) -> Result<Self> {
        if offline {
            return Ok(Backend::Offline);
        }
        match endpoint.or_else(|| cfg.chat.endpoint.clone()) {
            Some(url) if !url.trim().is_empty() => {
                let api = ChatApi::new(url.trim(), cfg.chat.timeout_secs)?;
                info!("using chat endpoint {}", api.endpoint());
                Ok(Backend::Remote(api))
            }
            _ => {
                info!("no chat endpoint configured; answering offline");
                Ok(Backend::Offline)
            }
        }
    }
}

/// Run one turn through the session. Returns the appended reply, or `None`
/// for blank input.
pub async fn take_turn(backend: &Backend, session: &mut ChatSession, input: &str) -> Option<String> {
    let request = session.begin_turn(input)?;
    match backend {
        Backend::Offline => {
            let reply = offline_reply(&request.message, &request.client_cache);
            session.record_reply(&reply);
            Some(reply)
        }
        Backend::Remote(api) => match api.send(&request).await {
            Ok(text) => {
                session.record_reply(&text);
                Some(text)
            }
            Err(e) => {
                warn!("chat turn failed: {e}");
                Some(session.record_failure(&e.to_string()))
            }
        },
    }
}

/// Offline reply: the first local hint, or the canned capability text.
pub fn offline_reply(message: &str, hints: &ClientHints) -> String {
    match hints.local_reply() {
        Some(reply) => reply.to_string(),
        None => capability_reply(message),
    }
}

fn capability_reply(message: &str) -> String {
    let m = message.trim().to_lowercase();
    if m.contains("what can you do") || m.contains("what do you do") || m == "help" {
        return "I can help with Synexis ML tasks like: explaining models, datasets, and \
predictions; guiding training or evaluation; troubleshooting errors; and \
suggesting next steps for your project. Ask anything specific and I'll help."
            .to_string();
    }
    "I can help with Synexis ML models, datasets, predictions, and troubleshooting. \
Tell me what you're trying to do and I'll guide you."
        .to_string()
}

pub fn print_history(session: &ChatSession) {
    for m in session.history().messages() {
        println!(
            "[{}] {}: {}",
            m.timestamp.format("%Y-%m-%d %H:%M:%S"),
            speaker(m.role),
            m.content
        );
    }
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Model => "gojo",
    }
}

enum Slash {
    Reply(String),
    Cleared,
    History,
    Quit,
}

fn handle_slash(input: &str) -> Option<Slash> {
    let s = input.trim();
    if !s.starts_with('/') {
        return None;
    }
    match s {
        "/help" => Some(Slash::Reply(
            "Commands:\n\
- /help\n\
- /clear (start a new conversation)\n\
- /history (print the transcript)\n\
- /quit"
                .to_string(),
        )),
        "/clear" => Some(Slash::Cleared),
        "/history" => Some(Slash::History),
        "/quit" | "/exit" => Some(Slash::Quit),
        _ => Some(Slash::Reply("Unknown command. Try /help".to_string())),
    }
}

/// Interactive loop; the session is saved after every turn.
pub async fn run_chat(backend: &Backend, store: &SessionStore, session: &mut ChatSession) -> Result<()> {
    if let Some(last) = session.history().messages().last() {
        println!("{}: {}", speaker(last.role), last.content);
    }
    if matches!(backend, Backend::Offline) {
        println!("(offline: replies come from local heuristics)");
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("you> ");
        io::stdout().flush().context("flush stdout")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("read stdin")?;

        if let Some(cmd) = handle_slash(&line) {
            match cmd {
                Slash::Reply(text) => println!("{text}"),
                Slash::Cleared => {
                    session.clear();
                    store.save(session.history())?;
                    if let Some(greeting) = session.history().messages().first() {
                        println!("gojo> {}", greeting.content);
                    }
                }
                Slash::History => print_history(session),
                Slash::Quit => break,
            }
            continue;
        }

        if let Some(reply) = take_turn(backend, session, &line).await {
            println!("gojo> {reply}");
            store.save(session.history())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_turns_use_local_hints() {
        let mut session = ChatSession::default();
        let backend = Backend::Offline;

        assert_eq!(take_turn(&backend, &mut session, "5 + 7").await.as_deref(), Some("12"));
        assert_eq!(take_turn(&backend, &mut session, "add 3").await.as_deref(), Some("15"));
        assert_eq!(take_turn(&backend, &mut session, "   ").await, None);
        assert_eq!(session.last_result(), Some(15.0));
        assert_eq!(session.history().len(), 5);
    }

    #[tokio::test]
    async fn test_offline_falls_back_to_capability_text() {
        let mut session = ChatSession::default();
        let reply = take_turn(&Backend::Offline, &mut session, "help").await.unwrap();
        assert!(reply.starts_with("I can help with Synexis ML tasks like"));

        let reply = take_turn(&Backend::Offline, &mut session, "train my model").await.unwrap();
        assert!(reply.starts_with("I can help with Synexis ML models"));
    }

    #[test]
    fn test_backend_selection() {
        let mut cfg = Config::default();
        assert!(matches!(Backend::from_config(&cfg, false, None).unwrap(), Backend::Offline));

        cfg.chat.endpoint = Some("http://127.0.0.1:8000/api/chat/".to_string());
        assert!(matches!(Backend::from_config(&cfg, false, None).unwrap(), Backend::Remote(_)));
        assert!(matches!(Backend::from_config(&cfg, true, None).unwrap(), Backend::Offline));
    }

    #[test]
    fn test_slash_commands() {
        assert!(handle_slash("hello").is_none());
        assert!(matches!(handle_slash("/clear"), Some(Slash::Cleared)));
        assert!(matches!(handle_slash(" /quit "), Some(Slash::Quit)));
        assert!(matches!(handle_slash("/nope"), Some(Slash::Reply(_))));
    }
}
