//! Terminal front end for the Kizazi AI assistant.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! GEMINI_API_KEY=... kizazi-chat
//!
//! # Specify a model and a config file
//! kizazi-chat --model gemini-2.5-pro --config kizazi.yaml
//!
//! # Disable colors (useful for piping output)
//! kizazi-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/history` - Show the conversation so far
//! - `/reset` - Start a fresh assistant session
//! - `/open`, `/close` - Show or hide the chat panel
//! - `/stats` - Show session statistics
//! - `/config` - Show current configuration
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use time::format_description::well_known::Rfc3339;

use kizazi::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatWidget, PlainTextRenderer, Renderer, SessionHolder,
    help_text, parse_command,
};
use kizazi::GeminiProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let (args, _) = ChatArgs::from_command_line_relaxed("kizazi-chat [OPTIONS]");
    let config = ChatConfig::resolve(args)?;

    let provider = GeminiProvider::from_env()
        .with_base_url(config.base_url.clone())
        .with_timeout(config.timeout)
        .with_generation_config(config.generation_config());
    let mut holder = SessionHolder::new(provider, &config);
    let mut widget = match &config.greeting {
        Some(greeting) => ChatWidget::with_greeting(greeting.clone()),
        None => ChatWidget::new(),
    };
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    println!("Kizazi AI (model: {})", holder.model());
    println!("Type /help for commands, /quit to exit\n");

    widget.open();
    renderer.print_status(&widget);
    for message in widget.messages() {
        renderer.print_message(message);
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
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::History => {
                            for message in widget.messages() {
                                renderer.print_message(message);
                            }
                        }
                        ChatCommand::Reset => {
                            holder.reset();
                            renderer
                                .print_info("Session reset. The next message starts a new one.");
                        }
                        ChatCommand::Open => {
                            widget.open();
                            renderer.print_status(&widget);
                        }
                        ChatCommand::Close => {
                            widget.close();
                            renderer.print_info("Chat panel closed. Type /open to continue.");
                        }
                        ChatCommand::Stats => {
                            print_stats(&holder, &widget);
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&config);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                if !widget.is_open() {
                    renderer.print_info("Chat panel is closed. Type /open to continue.");
                    continue;
                }

                widget.set_input(line);
                if let Some(reply) = widget.send(&mut holder).await {
                    renderer.print_message(reply);
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Readline error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_stats(holder: &SessionHolder<GeminiProvider>, widget: &ChatWidget) {
    let stats = holder.stats();
    println!("Session statistics:");
    println!("  Messages shown: {}", widget.messages().len());
    println!("  Exchanges: {}", stats.exchanges);
    println!("  Fallback replies: {}", stats.fallbacks);
    println!("  Sessions created: {}", stats.sessions_created);
    println!("  Session creation failures: {}", stats.creation_failures);
    println!("  Resets: {}", stats.resets);
    println!(
        "  Active session: {}",
        if holder.has_session() { "yes" } else { "no" }
    );
    if let Some(started) = stats.session_started_at {
        match started.format(&Rfc3339) {
            Ok(started) => println!("  Session started: {}", started),
            Err(err) => log::debug!("cannot format session start: {err}"),
        }
    }
    println!(
        "  Tokens: {} prompt, {} reply, {} total",
        stats.usage.prompt_token_count,
        stats.usage.candidates_token_count,
        stats.usage.total_token_count
    );
}

fn print_config(config: &ChatConfig) {
    println!("Current configuration:");
    println!("  Model: {}", config.model);
    println!(
        "  Base URL: {}",
        config.base_url.as_deref().unwrap_or("(default)")
    );
    match config.timeout {
        Some(timeout) => println!("  Timeout: {}s", timeout.as_secs()),
        None => println!("  Timeout: (default)"),
    }
    match config.temperature {
        Some(temperature) => println!("  Temperature: {temperature:.2}"),
        None => println!("  Temperature: (model default)"),
    }
    match config.max_output_tokens {
        Some(tokens) => println!("  Max output tokens: {tokens}"),
        None => println!("  Max output tokens: (model default)"),
    }
    println!("  Color: {}", if config.use_color { "on" } else { "off" });
    let preview: String = config.system_instruction.chars().take(72).collect();
    println!("  System instruction: {preview}...");
}
