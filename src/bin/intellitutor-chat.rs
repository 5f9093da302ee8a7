//! Interactive chat application for talking with the IntelliTutor service.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the hosted tutor
//! intellitutor-chat
//!
//! # Point at a local deployment
//! intellitutor-chat --origin http://localhost:8000
//!
//! # Disable colors (useful for piping output)
//! intellitutor-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/like [n]`, `/dislike [n]` - Rate a tutor reply
//! - `/copy [n]` - Copy a message to the clipboard
//! - `/quick [n]` - List or send a quick reply
//! - `/health` - Probe the service
//! - `/help` - Show available commands
//! - `/quit` - Exit the application

use arboard::Clipboard;
use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

use intellitutor::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, QUICK_REPLIES, Refusal,
    Renderer, SubmitOutcome, help_text, parse_command,
};
use intellitutor::{MessageId, Transport, TransportClient};

/// Main entry point for the intellitutor-chat application.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("intellitutor-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    // The local offset can only be read while the process is single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(config, offset))
}

async fn run(config: ChatConfig, offset: UtcOffset) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("intellitutor=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = TransportClient::with_options(
        Some(&config.origin),
        config.user_id.clone(),
        config.timeout,
    )?;
    let mut session = ChatSession::new(client);
    let mut renderer = PlainTextRenderer::with_color(config.use_color).with_offset(offset);
    let mut clipboard = None;
    let mut rl = DefaultEditor::new()?;

    println!("IntelliTutor ({})", session.transport().origin());
    println!("Type /help for commands, /quit to exit\n");

    if config.health_check {
        let status = session.check_health().await;
        renderer.print_status(status);
    }
    for (idx, message) in session.messages().iter().enumerate() {
        renderer.print_message(idx + 1, message);
    }

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line.as_str());

                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Like(position) => {
                            rate(&mut session, &mut renderer, position, true);
                        }
                        ChatCommand::Dislike(position) => {
                            rate(&mut session, &mut renderer, position, false);
                        }
                        ChatCommand::Copy(position) => {
                            copy(&mut session, &mut renderer, &mut clipboard, position);
                        }
                        ChatCommand::Quick(None) => {
                            for (idx, reply) in QUICK_REPLIES.iter().enumerate() {
                                renderer.print_info(&format!("    {}. {}", idx + 1, reply));
                            }
                        }
                        ChatCommand::Quick(Some(n)) => {
                            if session.apply_quick_reply(n - 1).is_some() {
                                send(&mut session, &mut renderer).await;
                            } else {
                                renderer.print_error(&format!(
                                    "There are only {} quick replies.",
                                    QUICK_REPLIES.len()
                                ));
                            }
                        }
                        ChatCommand::Health => {
                            let status = session.check_health().await;
                            renderer.print_status(status);
                        }
                        ChatCommand::Status => {
                            renderer.print_status(session.connection_status());
                        }
                        ChatCommand::History => {
                            for (idx, message) in session.messages().iter().enumerate() {
                                renderer.print_message(idx + 1, message);
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session, &mut renderer);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                renderer.print_info(&format!("    {}", line));
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                session.set_input(line);
                send(&mut session, &mut renderer).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Sends the composer input and prints the reply along with any toast.
async fn send<T: Transport>(session: &mut ChatSession<T>, renderer: &mut PlainTextRenderer) {
    let pending = match session.begin_submit() {
        Ok(pending) => pending,
        Err(Refusal::EmptyInput) => return,
        Err(Refusal::Busy | Refusal::ForeignSend) => {
            renderer.print_error("Still waiting for the previous reply.");
            return;
        }
    };

    renderer.start_typing();
    let result = session.transport().send_message(pending.text()).await;
    let outcome = session.complete(pending, result);
    renderer.finish_typing();

    if let Some(reply) = outcome.reply() {
        print_by_id(session, renderer, reply);
    }
    if let Some(toast) = session.take_toast() {
        renderer.print_toast(&toast);
    }
    if let SubmitOutcome::Failed { .. } = outcome {
        renderer.print_status(session.connection_status());
    }
}

/// Applies feedback to message `position`, or to the latest reply.
fn rate<T: Transport>(
    session: &mut ChatSession<T>,
    renderer: &mut PlainTextRenderer,
    position: Option<usize>,
    value: bool,
) {
    let Some(id) = target(session, position) else {
        renderer.print_error("No such message.");
        return;
    };
    if !session.set_liked(id, value) {
        renderer.print_error("Only tutor replies can be rated.");
        return;
    }
    print_by_id(session, renderer, id);
    renderer.print_info(if value {
        "Marked as helpful."
    } else {
        "Marked as unhelpful."
    });
}

/// Copies message `position`, or the latest reply, to the system clipboard.
fn copy<T: Transport>(
    session: &mut ChatSession<T>,
    renderer: &mut PlainTextRenderer,
    clipboard: &mut Option<Clipboard>,
    position: Option<usize>,
) {
    let Some(id) = target(session, position) else {
        renderer.print_error("No such message.");
        return;
    };
    let Some(text) = session.copy_message(id).map(str::to_owned) else {
        renderer.print_error("No such message.");
        return;
    };
    let toast = session.take_toast();

    if clipboard.is_none() {
        match Clipboard::new() {
            Ok(opened) => *clipboard = Some(opened),
            Err(err) => {
                renderer.print_error(&format!("Clipboard unavailable: {}", err));
                return;
            }
        }
    }
    let Some(clipboard) = clipboard.as_mut() else {
        return;
    };
    match clipboard.set_text(text) {
        Ok(()) => {
            if let Some(toast) = toast {
                renderer.print_toast(&toast);
            }
        }
        Err(err) => renderer.print_error(&format!("Failed to copy: {}", err)),
    }
}

/// Resolves a 1-based position, or the latest tutor reply when none is given.
fn target<T: Transport>(
    session: &ChatSession<T>,
    position: Option<usize>,
) -> Option<MessageId> {
    let message = match position {
        Some(n) => session.store().by_position(n),
        None => session.store().last_assistant(),
    };
    message.map(|message| message.id)
}

fn print_by_id<T: Transport>(
    session: &ChatSession<T>,
    renderer: &mut PlainTextRenderer,
    id: MessageId,
) {
    if let Some(position) = session.messages().iter().position(|m| m.id == id) {
        renderer.print_message(position + 1, &session.messages()[position]);
    }
}

fn print_stats<T: Transport>(session: &ChatSession<T>, renderer: &mut PlainTextRenderer) {
    let stats = session.stats();
    renderer.print_info("    Session Statistics:");
    renderer.print_info(&format!(
        "      Messages: {} ({} from you, {} from the tutor)",
        stats.message_count, stats.user_messages, stats.assistant_messages
    ));
    renderer.print_info(&format!("      Failed replies: {}", stats.error_messages));
    renderer.print_info(&format!(
        "      Feedback: {} helpful / {} unhelpful",
        stats.liked, stats.disliked
    ));
    renderer.print_info(&format!("      Requests: {}", stats.total_requests));
    renderer.print_info(&format!("      Connection: {}", stats.connection_status));
}
