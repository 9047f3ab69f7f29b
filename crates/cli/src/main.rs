use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use guide_agents::{GuideAgent, QueryPipeline};
use guide_core::{KnowledgeDoc, RawQuery};
use guide_knowledge::{KnowledgeSource, KnowledgeSummary};
use guide_observability::{init_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "guide")]
#[command(about = "Bengaluru local guide CLI")]
struct Cli {
    #[arg(long, env = "GUIDE_KNOWLEDGE_PATH", default_value = "kb/bangalore.md")]
    knowledge: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer a single question.
    Ask {
        text: String,
        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run the query pipeline only and print the processing result.
    Classify { text: String },
    /// Interactive session; `reload` refreshes the guide, `exit` quits.
    Chat,
    /// Inspect the knowledge document.
    Kb {
        #[command(subcommand)]
        command: KbCommand,
    },
}

#[derive(Debug, Subcommand)]
enum KbCommand {
    /// Print title, sections and size of the loaded document.
    Summary,
}

fn main() -> Result<()> {
    init_tracing("guide_cli");
    let cli = Cli::parse();
    let source = KnowledgeSource::new(&cli.knowledge);

    match cli.command {
        Command::Ask { text, json } => {
            let knowledge = load(&source)?;
            let agent = GuideAgent::new(AppMetrics::shared());
            let response = agent.handle(&RawQuery::new(text), Some(knowledge.as_ref()));

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.reply_text);
            }
        }
        Command::Classify { text } => {
            let result = QueryPipeline::new().process(&text);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Chat => run_chat(&source)?,
        Command::Kb { command } => match command {
            KbCommand::Summary => {
                let knowledge = load(&source)?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&KnowledgeSummary::of(&knowledge))?
                );
            }
        },
    }

    Ok(())
}

fn run_chat(source: &KnowledgeSource) -> Result<()> {
    let metrics = AppMetrics::shared();
    let agent = GuideAgent::new(metrics.clone());
    let mut knowledge = load(source)?;
    let session_id = RawQuery::new_session_id();

    println!("Namma Bengaluru guide. type 'reload' to refresh the guide, 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        if message.eq_ignore_ascii_case("reload") {
            match source.reload_if_changed(&knowledge) {
                Ok(Some(fresh)) => {
                    knowledge = fresh;
                    println!("\nGuide reloaded ({} sections).\n", knowledge.sections.len());
                }
                Ok(None) => println!("\nGuide is already up to date.\n"),
                Err(err) => println!("\nReload failed, keeping the current guide: {err}\n"),
            }
            continue;
        }

        let response = agent.handle(
            &RawQuery::with_session(message, session_id.clone()),
            Some(knowledge.as_ref()),
        );
        println!("\n{}\n", response.reply_text);
    }

    println!("{}", serde_json::to_string_pretty(&metrics.snapshot())?);
    Ok(())
}

fn load(source: &KnowledgeSource) -> Result<Arc<KnowledgeDoc>> {
    source.load().with_context(|| {
        format!(
            "failed loading knowledge document from {}",
            source.path().display()
        )
    })
}
