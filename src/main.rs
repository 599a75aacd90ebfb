use anyhow::Result;
use brand_assistant::app::{App, Command, ExtractInput};
use brand_assistant::models::Language;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "brand-assistant")]
#[command(about = "Extract brand kits, generate design prompts and audit designs")]
struct CliArgs {
    /// Response language code (en, es, fr, de, pt, it, ja, ko, zh).
    #[arg(long, global = true, default_value = "en")]
    language: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Extract a brand profile from text, a URL or a screenshot.
    Extract(ExtractArgs),
    /// Discover design trends for a topic.
    Trends {
        #[arg(long)]
        topic: String,
    },
    /// Generate on-brand design prompts for a topic.
    Prompts {
        #[arg(long)]
        topic: String,
        /// Brand profile JSON produced by `extract`.
        #[arg(long)]
        brand: PathBuf,
    },
    /// Score a design image against a brand profile.
    Audit {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        brand: PathBuf,
        /// Screenshot of the brand's own material to compare against.
        #[arg(long)]
        reference: Option<PathBuf>,
    },
    /// Store the Groq API key in the settings file.
    SetKey { key: String },
    /// Render a brand board and print the inserted document nodes.
    Board {
        #[arg(long)]
        brand: PathBuf,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct ExtractArgs {
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    image: Option<PathBuf>,
}

impl From<ExtractArgs> for ExtractInput {
    fn from(args: ExtractArgs) -> Self {
        match (args.text, args.url, args.image) {
            (Some(text), _, _) => ExtractInput::Text(text),
            (_, Some(url), _) => ExtractInput::Url(url),
            (_, _, Some(image)) => ExtractInput::Image(image),
            // clap's argument group guarantees exactly one input.
            (None, None, None) => ExtractInput::Text(String::new()),
        }
    }
}

impl From<CliCommand> for Command {
    fn from(command: CliCommand) -> Self {
        match command {
            CliCommand::Extract(args) => Command::Extract(args.into()),
            CliCommand::Trends { topic } => Command::Trends { topic },
            CliCommand::Prompts { topic, brand } => Command::Prompts { topic, brand },
            CliCommand::Audit {
                image,
                brand,
                reference,
            } => Command::Audit {
                image,
                brand,
                reference,
            },
            CliCommand::SetKey { key } => Command::SetKey { key },
            CliCommand::Board { brand } => Command::Board { brand },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brand_assistant=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let language = Language::from_code(&args.language);
    info!("Starting brand-assistant ({})", language.name());

    let app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match app.run(args.command.into(), language).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_requires_exactly_one_input() {
        assert!(CliArgs::try_parse_from(["brand-assistant", "extract"]).is_err());
        assert!(CliArgs::try_parse_from([
            "brand-assistant",
            "extract",
            "--text",
            "a",
            "--url",
            "b.com"
        ])
        .is_err());
    }

    #[test]
    fn test_parse_audit_with_global_language() {
        let args = CliArgs::try_parse_from([
            "brand-assistant",
            "audit",
            "--image",
            "design.png",
            "--brand",
            "brand.json",
            "--language",
            "fr",
        ])
        .unwrap();

        assert_eq!(args.language, "fr");
        assert!(matches!(
            Command::from(args.command),
            Command::Audit { reference: None, .. }
        ));
    }
}
