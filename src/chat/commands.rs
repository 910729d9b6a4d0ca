//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the model.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation history.
    Clear,

    /// Change the model.
    Model(String),

    /// Set the sampling temperature.
    Temperature(f32),

    /// Clear the sampling temperature (use model default).
    ClearTemperature,

    /// Set the top-p value.
    TopP(f32),

    /// Clear the top-p value.
    ClearTopP,

    /// Set the context window size.
    NumCtx(u32),

    /// Turn streaming on or off.
    Stream(bool),

    /// Attach a file to the next message.
    Attach(String),

    /// Remove a pending attachment by its 1-based position.
    Detach(usize),

    /// List pending attachments.
    ListAttachments,

    /// Export the conversation.  `None` writes a timestamped file in the
    /// current directory.
    Export(Option<String>),

    /// Replace the conversation with a transcript file.
    Import(String),

    /// Print the conversation so far.
    History,

    /// List the models installed on the server.
    Models,

    /// Show how to install and start the server.
    Setup,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics (message count, current model, etc.).
    Stats,

    /// Show the current configuration.
    ShowConfig,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use nexus::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/model llama3.2").is_some());
/// assert!(parse_command("Hello there!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        "config" => ChatCommand::ShowConfig,
        "temperature" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearTemperature,
            Some(arg) => match parse_f32_in_range(arg, 0.0, 2.0) {
                Ok(value) => ChatCommand::Temperature(value),
                Err(err) => ChatCommand::Invalid(format!("/temperature {err}")),
            },
            None => ChatCommand::Invalid("/temperature requires a value".to_string()),
        },
        "top_p" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearTopP,
            Some(arg) => match parse_f32_in_range(arg, 0.0, 1.0) {
                Ok(value) => ChatCommand::TopP(value),
                Err(err) => ChatCommand::Invalid(format!("/top_p {err}")),
            },
            None => ChatCommand::Invalid("/top_p requires a value".to_string()),
        },
        "num_ctx" => match argument {
            Some(arg) => match arg.parse::<u32>() {
                Ok(value) if value > 0 => ChatCommand::NumCtx(value),
                _ => ChatCommand::Invalid("/num_ctx expects a positive integer".to_string()),
            },
            None => ChatCommand::Invalid("/num_ctx requires a value".to_string()),
        },
        "stream" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::Stream(value),
            None => ChatCommand::Invalid("/stream expects 'on' or 'off'".to_string()),
        },
        "attach" => match argument {
            Some(path) => ChatCommand::Attach(path.to_string()),
            None => ChatCommand::Invalid("/attach requires a file path".to_string()),
        },
        "detach" => match argument {
            Some(arg) => match arg.parse::<usize>() {
                Ok(index) if index > 0 => ChatCommand::Detach(index),
                _ => ChatCommand::Invalid(
                    "/detach expects an attachment number from /attachments".to_string(),
                ),
            },
            None => ChatCommand::Invalid("/detach requires an attachment number".to_string()),
        },
        "attachments" => ChatCommand::ListAttachments,
        "export" | "save" => ChatCommand::Export(argument.map(|s| s.to_string())),
        "import" | "load" => match argument {
            Some(path) => ChatCommand::Import(path.to_string()),
            None => ChatCommand::Invalid("/import requires a file path".to_string()),
        },
        "history" => ChatCommand::History,
        "models" => ChatCommand::Models,
        "setup" => ChatCommand::Setup,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

pub(crate) fn parse_f32_in_range(value: &str, min: f32, max: f32) -> Result<f32, String> {
    let parsed: f32 = value
        .parse()
        .map_err(|_| format!("expects a value between {min} and {max}"))?;
    if parsed.is_finite() && parsed >= min && parsed <= max {
        Ok(parsed)
    } else {
        Err(format!("expects a value between {min} and {max}"))
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear conversation history
  /model <name>          Change the model (e.g., /model llama3.2)
  /temperature <v>       Set temperature 0.0-2.0 (use 'clear' to reset)
  /top_p <v>             Set top-p 0.0-1.0 (use 'clear' to reset)
  /num_ctx <n>           Set the context window in tokens
  /stream on|off         Stream replies as they are generated
  /attach <file>         Attach a text file to the next message
  /detach <n>            Remove pending attachment number n
  /attachments           List pending attachments
  /export [file]         Export the conversation as JSON
  /import <file>         Replace the conversation with an exported one
  /history               Show the conversation so far
  /models                List models installed on the server
  /setup                 Show how to install and start Ollama
  /stats                 Show session statistics
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}

/// Returns onboarding instructions for running a local Ollama server with
/// `model`.
pub fn setup_text(model: &str) -> String {
    format!(
        r#"Running a model locally takes three steps:

  1. Install Ollama
       curl -fsSL https://ollama.ai/install.sh | sh
     (macOS and Windows installers: https://ollama.ai/download)

  2. Pull and try the model
       ollama run {model}

  3. Start the server
       ollama serve

Then restart nexus-chat, or just send a message; the server listens on
http://localhost:11434 by default.  Point elsewhere with --host or OLLAMA_HOST."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_clear() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::Clear));
    }

    #[test]
    fn parse_model() {
        assert_eq!(
            parse_command("/model deepseek-r1:8b"),
            Some(ChatCommand::Model("deepseek-r1:8b".to_string()))
        );
        assert_eq!(
            parse_command("/model   llama3.2  "),
            Some(ChatCommand::Model("llama3.2".to_string()))
        );
        assert_eq!(
            parse_command("/model"),
            Some(ChatCommand::Invalid(
                "/model requires a model name".to_string()
            ))
        );
    }

    #[test]
    fn parse_temperature() {
        assert_eq!(
            parse_command("/temperature 0.5"),
            Some(ChatCommand::Temperature(0.5))
        );
        assert_eq!(
            parse_command("/temperature 1.5"),
            Some(ChatCommand::Temperature(1.5))
        );
        assert_eq!(
            parse_command("/temperature clear"),
            Some(ChatCommand::ClearTemperature)
        );
        assert!(matches!(
            parse_command("/temperature"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("requires")
        ));
        assert!(matches!(
            parse_command("/temperature hot"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("between")
        ));
    }

    #[test]
    fn parse_top_p_and_num_ctx() {
        assert_eq!(parse_command("/top_p 0.9"), Some(ChatCommand::TopP(0.9)));
        assert_eq!(parse_command("/top_p clear"), Some(ChatCommand::ClearTopP));
        assert!(matches!(
            parse_command("/top_p 1.5"),
            Some(ChatCommand::Invalid(_))
        ));
        assert_eq!(
            parse_command("/num_ctx 4096"),
            Some(ChatCommand::NumCtx(4096))
        );
        assert!(matches!(
            parse_command("/num_ctx 0"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_stream_toggle() {
        assert_eq!(parse_command("/stream on"), Some(ChatCommand::Stream(true)));
        assert_eq!(
            parse_command("/stream off"),
            Some(ChatCommand::Stream(false))
        );
        assert!(matches!(
            parse_command("/stream maybe"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("expects")
        ));
    }

    #[test]
    fn parse_attachment_commands() {
        assert_eq!(
            parse_command("/attach notes/todo list.txt"),
            Some(ChatCommand::Attach("notes/todo list.txt".to_string()))
        );
        assert_eq!(parse_command("/detach 2"), Some(ChatCommand::Detach(2)));
        assert!(matches!(
            parse_command("/detach 0"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/attach"),
            Some(ChatCommand::Invalid(_))
        ));
        assert_eq!(
            parse_command("/attachments"),
            Some(ChatCommand::ListAttachments)
        );
    }

    #[test]
    fn parse_transcript_commands() {
        assert_eq!(parse_command("/export"), Some(ChatCommand::Export(None)));
        assert_eq!(
            parse_command("/export chat.json"),
            Some(ChatCommand::Export(Some("chat.json".to_string())))
        );
        assert_eq!(
            parse_command("/import chat.json"),
            Some(ChatCommand::Import("chat.json".to_string()))
        );
        assert!(matches!(
            parse_command("/import"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_informational_commands() {
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/config"), Some(ChatCommand::ShowConfig));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/models"), Some(ChatCommand::Models));
        assert_eq!(parse_command("/setup"), Some(ChatCommand::Setup));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid("Unknown command: /frobnicate".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello there!"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/attach"));
        assert!(help.contains("/export"));
        assert!(help.contains("/import"));
    }

    #[test]
    fn setup_text_names_the_model() {
        let setup = setup_text("deepseek-r1:8b");
        assert!(setup.contains("ollama run deepseek-r1:8b"));
        assert!(setup.contains("ollama serve"));
        assert!(setup.contains("install.sh"));
    }
}
