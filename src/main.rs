//! kbqa - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use kbqa::{
    bootstrap::Bootstrap,
    chat::{ChatInput, InputHandler, HELP_TEXT},
    cli::{config::EncoderBackend, Args, Commands, Config, Verbosity},
    embedding::Encoder,
    responder::{Reply, Responder},
};

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);
    let bootstrap = Bootstrap::new(config)?;

    match &args.command {
        Commands::Ask { json, .. } => {
            let question = args.command.question().unwrap_or_default();
            run_ask(&bootstrap, verbosity, &question, *json)?;
        }
        Commands::Chat => {
            run_chat(&bootstrap, verbosity)?;
        }
        Commands::Inspect => {
            run_inspect(&bootstrap)?;
        }
        Commands::Config { save } => {
            print!("{}", bootstrap.config().to_toml()?);
            if *save {
                let path = args
                    .config_path()
                    .context("No home directory; pass --config to choose where to save")?;
                bootstrap.config().save(&path)?;
                eprintln!("{} {}", "Saved".green(), path.display());
            }
        }
    }

    Ok(())
}

/// Load the knowledge base and build the responder, prebuilding the cache if configured
fn start(bootstrap: &Bootstrap, verbosity: Verbosity) -> Result<Responder<Box<dyn Encoder>>> {
    let path = bootstrap.config().knowledge_path();
    let report = bootstrap
        .load_knowledge()
        .with_context(|| format!("Failed to load knowledge base {}", path.display()))?;

    if !report.skipped_lines.is_empty() {
        eprintln!(
            "{}: skipped {} malformed line(s): {:?}",
            "Warning".yellow(),
            report.skipped_lines.len(),
            report.skipped_lines
        );
    }

    let responder = bootstrap.build_responder(report)?;

    if bootstrap.config().retrieval.eager {
        let pb = if verbosity.show_progress() {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!(
                "Encoding {} stored questions...",
                responder.engine().knowledge_base().len()
            ));
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        let warmed = responder.engine().warm();
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        warmed?;
    }

    Ok(responder)
}

fn run_ask(bootstrap: &Bootstrap, verbosity: Verbosity, question: &str, json: bool) -> Result<()> {
    let responder = start(bootstrap, verbosity)?;
    let reply = responder.reply(question)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        print_reply(&reply, verbosity);
    }
    Ok(())
}

fn run_chat(bootstrap: &Bootstrap, verbosity: Verbosity) -> Result<()> {
    let responder = start(bootstrap, verbosity)?;
    let mut input = match InputHandler::default_history_path() {
        Some(path) => InputHandler::with_history(path)?,
        None => InputHandler::new()?,
    };

    println!(
        "{} {} questions loaded. {}",
        "kbqa".cyan().bold(),
        responder.engine().knowledge_base().len(),
        HELP_TEXT.dimmed()
    );

    loop {
        match input.read()? {
            ChatInput::Exit => break,
            ChatInput::Empty => continue,
            ChatInput::Help => println!("{}", HELP_TEXT),
            ChatInput::Question(question) => match responder.reply(&question) {
                Ok(reply) => print_reply(&reply, verbosity),
                Err(e) if e.is_retryable() => {
                    eprintln!("{}: {} (try again)", "Error".red(), e)
                }
                Err(e) => eprintln!("{}: {}", "Error".red(), e),
            },
        }
    }

    match input.save_history() {
        Ok(()) => tracing::debug!(entries = input.history_len(), "Saved chat history"),
        Err(e) => tracing::warn!("Failed to save history: {}", e),
    }
    Ok(())
}

fn run_inspect(bootstrap: &Bootstrap) -> Result<()> {
    let path = bootstrap.config().knowledge_path();
    let report = bootstrap
        .load_knowledge()
        .with_context(|| format!("Failed to load knowledge base {}", path.display()))?;
    let kb = &report.knowledge_base;

    println!("{}", "Knowledge base".bold());
    println!("  Path:            {}", path.display());
    println!("  Pairs:           {}", kb.len());
    println!("  Skipped lines:   {}", report.skipped_lines.len());
    println!("  Malformed lines: {:?}", bootstrap.config().knowledge.on_malformed);

    if !kb.is_empty() {
        let avg_q = kb.iter().map(|p| p.question.chars().count()).sum::<usize>() / kb.len();
        let avg_a = kb.iter().map(|p| p.answer.chars().count()).sum::<usize>() / kb.len();
        println!("  Avg question:    {} chars", avg_q);
        println!("  Avg answer:      {} chars", avg_a);
    }

    let encoder = &bootstrap.config().encoder;
    println!("{}", "Encoder".bold());
    println!("  Backend:         {:?}", encoder.backend);
    match encoder.backend {
        EncoderBackend::Bert => {
            println!("  Model:           {}@{}", encoder.model_id, encoder.revision)
        }
        EncoderBackend::Hashing => {
            println!("  Dimension:       {}", encoder.hashing_dimension)
        }
    }
    Ok(())
}

fn print_reply(reply: &Reply, verbosity: Verbosity) {
    if reply.matched {
        println!("{}", reply.answer);
    } else {
        println!("{}", reply.answer.yellow());
    }

    if verbosity.show_details() {
        println!(
            "{}",
            format!("  score {:.3} · matched \"{}\"", reply.score, reply.question).dimmed()
        );
    }
}
