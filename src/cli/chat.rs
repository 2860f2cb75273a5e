use anyhow::Result;
use chrono::Local;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{ChatController, RelayClient, SendOutcome};
use crate::core::{AppConfig, db::async_db};
use crate::jobs::{KeepAlivePing, spawn_periodic_job};
use crate::session::Role;
use crate::session::SessionStore;

fn new_label() -> String {
    format!("Chat {}", Local::now().format("%d/%m/%Y %H:%M:%S"))
}

fn print_transcript(controller: &ChatController) {
    let Some(session) = controller.store().active() else {
        return;
    };
    println!("--- {} ---", session.meta.display_label);
    for msg in &session.messages {
        let who = match msg.role {
            Role::User => ">",
            Role::Assistant => "<",
        };
        println!("{} {} [{}]", who, msg.content, msg.timestamp);
    }
}

fn nth_session_id(controller: &ChatController, arg: Option<&str>) -> Option<String> {
    let n: usize = arg?.parse().ok()?;
    controller
        .store()
        .list()
        .get(n.checked_sub(1)?)
        .map(|meta| meta.id.clone())
}

/// Handle a `:command` line. Returns false when the loop should end.
async fn handle_command(controller: &mut ChatController, cmd: &str) -> Result<bool> {
    let mut parts = cmd.split_whitespace();
    match parts.next() {
        Some("new") => {
            controller.store_mut().create(&new_label()).await?;
            print_transcript(controller);
        }
        Some("list") => {
            let active_id = controller.store().active_id().map(str::to_string);
            for (n, meta) in controller.store().list().iter().enumerate() {
                let marker = if active_id.as_deref() == Some(meta.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{} {} {}", marker, n + 1, meta.display_label);
            }
        }
        Some("switch") => {
            if let Some(id) = nth_session_id(controller, parts.next()) {
                if controller.store_mut().activate(&id).is_ok() {
                    print_transcript(controller);
                }
            } else {
                println!("Chat desconocido");
            }
        }
        Some("delete") => {
            if let Some(id) = nth_session_id(controller, parts.next()) {
                controller.store_mut().delete(&id).await?;
                print_transcript(controller);
            } else {
                println!("Chat desconocido");
            }
        }
        Some("quit") => return Ok(false),
        _ => println!("Comandos: :new :list :switch <n> :delete <n> :quit"),
    }
    Ok(true)
}

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let config = AppConfig::default();

    let db = async_db(&config.storage_path).await?;
    let store = SessionStore::open(db).await?;
    let relay = RelayClient::new(&config.relay_api_url);
    let mut controller = ChatController::new(store, relay);

    // Ping the relay on a schedule so an idle deployment doesn't cold
    // start on the next real message. Stopped when the client exits.
    let keep_alive = spawn_periodic_job(config.clone(), KeepAlivePing);

    if controller.store().active().is_none() {
        controller.store_mut().create(&new_label()).await?;
    }

    print_transcript(&controller);

    let mut rl = DefaultEditor::new().expect("Editor failed");
    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if let Some(cmd) = line.strip_prefix(':') {
                    if !handle_command(&mut controller, cmd).await? {
                        break;
                    }
                    continue;
                }

                // Capture the originating session before the call so
                // the reply lands in the right log even if the active
                // session changes
                let Some(session_id) = controller.store().active_id().map(str::to_string) else {
                    println!("No hay ningún chat activo. Usa :new para crear uno.");
                    continue;
                };

                println!("Escribiendo...");
                match controller.send(&session_id, &line).await? {
                    SendOutcome::Delivered(msg) | SendOutcome::Failed(msg) => {
                        println!("< {} [{}]", msg.content, msg.timestamp);
                    }
                    SendOutcome::Ignored => {}
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    keep_alive.abort();

    Ok(())
}
