//! Interactive chat application for conversing with a local Ollama model.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! nexus-chat
//!
//! # Specify a model and server
//! nexus-chat --model llama3.2 --host http://gpu-box:11434
//!
//! # Wait for whole replies, no colors (useful for piping output)
//! nexus-chat --no-stream --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/attach <file>` - Attach a text file to the next message
//! - `/export [file]` - Save the conversation as JSON
//! - `/import <file>` - Load a saved conversation
//! - `/setup` - Show how to install and start Ollama
//! - `/quit` - Exit the application

use std::path::Path;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use time::OffsetDateTime;

use nexus::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command, setup_text,
};
use nexus::notify::{
    notify_attachment_failures, notify_send_error, notify_server_unreachable,
};
use nexus::{NoticeKind, Notifier};

/// Main entry point for the nexus-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("nexus-chat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;
    let use_color = config.use_color;

    let mut session = ChatSession::new(config)?;
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    println!(
        "Nexus Chat (model: {}, server: {})",
        session.model(),
        session.client().base_url()
    );
    println!("Type /help for commands, /setup for install help, /quit to exit\n");

    if let Err(err) = session.client().health_check().await {
        notify_server_unreachable(&mut renderer, session.model(), &err);
    }

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() && session.pending_attachments().is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Setup => {
                            for line in setup_text(session.model()).lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Model(model_name) => {
                            renderer.print_info(&format!("Model changed to: {}", model_name));
                            session.set_model(model_name);
                        }
                        ChatCommand::Temperature(value) => {
                            session.set_temperature(Some(value));
                            renderer.print_info(&format!("temperature set to {:.2}", value));
                        }
                        ChatCommand::ClearTemperature => {
                            session.set_temperature(None);
                            renderer.print_info("temperature reset to model default");
                        }
                        ChatCommand::TopP(value) => {
                            session.set_top_p(Some(value));
                            renderer.print_info(&format!("top_p set to {:.2}", value));
                        }
                        ChatCommand::ClearTopP => {
                            session.set_top_p(None);
                            renderer.print_info("top_p reset to model default");
                        }
                        ChatCommand::NumCtx(value) => {
                            session.set_num_ctx(Some(value));
                            renderer.print_info(&format!("num_ctx set to {value}"));
                        }
                        ChatCommand::Stream(on) => {
                            session.set_streaming(on);
                            if on {
                                renderer.print_info("Streaming enabled.");
                            } else {
                                renderer.print_info("Streaming disabled.");
                            }
                        }
                        ChatCommand::Attach(path) => {
                            if !Path::new(&path).is_file() {
                                renderer.notify(
                                    NoticeKind::Warning,
                                    "Attachment not found",
                                    &format!("{path} is not a readable file; attaching anyway"),
                                );
                            }
                            let name = session.attach(path).name().to_string();
                            renderer.print_info(&format!(
                                "Attached {name} ({} pending)",
                                session.pending_attachments().len()
                            ));
                        }
                        ChatCommand::Detach(number) => match session.detach(number - 1) {
                            Ok(attachment) => {
                                renderer.print_info(&format!("Detached {}", attachment.name()))
                            }
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::ListAttachments => {
                            print_attachments(&session);
                        }
                        ChatCommand::Export(path) => {
                            let written = match path {
                                Some(path) => session.export_to(&path).map(|_| path),
                                None => session
                                    .export_to_dir(".", OffsetDateTime::now_utc())
                                    .map(|path| path.display().to_string()),
                            };
                            match written {
                                Ok(path) => renderer.notify(
                                    NoticeKind::Success,
                                    "Conversation exported",
                                    &path,
                                ),
                                Err(err) => renderer.notify(
                                    NoticeKind::Error,
                                    "Export failed",
                                    &err.to_string(),
                                ),
                            }
                        }
                        ChatCommand::Import(path) => match session.import_from(&path) {
                            Ok(count) => renderer.notify(
                                NoticeKind::Success,
                                "Conversation imported",
                                &format!("{count} messages loaded from {path}"),
                            ),
                            Err(err) => renderer.notify(
                                NoticeKind::Error,
                                "Import failed",
                                &err.to_string(),
                            ),
                        },
                        ChatCommand::History => {
                            let messages = session.messages();
                            if messages.is_empty() {
                                renderer.print_info("No messages yet.");
                            }
                            for message in messages.iter() {
                                renderer.print_message(message);
                            }
                        }
                        ChatCommand::Models => match session.client().list_models().await {
                            Ok(models) if models.is_empty() => renderer.print_info(
                                "No models installed. Try: ollama pull deepseek-r1:8b",
                            ),
                            Ok(models) => {
                                println!("    Installed models:");
                                for model in models {
                                    println!("      - {}", model);
                                }
                            }
                            Err(err) => notify_send_error(&mut renderer, &err),
                        },
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the model
                println!("Assistant:");
                match session.send(line, &mut renderer).await {
                    Ok(outcome) => {
                        notify_attachment_failures(&mut renderer, &outcome.attachment_failures)
                    }
                    Err(err) => notify_send_error(&mut renderer, &err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
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

fn print_attachments(session: &ChatSession) {
    let pending = session.pending_attachments();
    if pending.is_empty() {
        println!("    No pending attachments.");
        return;
    }
    println!("    Pending attachments:");
    for (index, attachment) in pending.iter().enumerate() {
        println!("      {}. {}", index + 1, attachment.name());
    }
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Messages: {}", stats.message_count);
    println!("      Pending attachments: {}", stats.pending_attachments);
    println!(
        "      Total tokens: {} in / {} out ({} requests)",
        stats.total_prompt_tokens, stats.total_completion_tokens, stats.total_requests
    );
    if let Some(input) = stats.last_turn_prompt_tokens {
        let output = stats.last_turn_completion_tokens.unwrap_or(0);
        println!("      Last turn tokens: {input} in / {output} out");
    }
}

fn print_config(session: &ChatSession) {
    let stats = session.stats();
    println!("    Current Configuration:");
    println!("      Model: {}", stats.model);
    println!("      Server: {}", session.client().base_url());
    println!("      Timeout: {}s", session.client().timeout().as_secs());
    println!("      Temperature: {}", describe_float(stats.temperature));
    println!("      Top-p: {}", describe_float(stats.top_p));
    println!(
        "      Context window: {}",
        stats
            .num_ctx
            .map(|n| n.to_string())
            .unwrap_or_else(|| "default".to_string())
    );
    println!(
        "      Streaming: {}",
        if stats.stream { "on" } else { "off" }
    );
}

fn describe_float(value: Option<f32>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "default".to_string())
}
