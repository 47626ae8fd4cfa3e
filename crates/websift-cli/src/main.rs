use anyhow::Result;
use clap::{Parser, Subcommand};
use websift_core::ProviderChoice;
use websift_local::{default_http_client, Browser, Config};

#[derive(Parser, Debug)]
#[command(name = "websift")]
#[command(about = "Answer a question using web search, fetch, and summarization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the web for a question and print a summarized, cited answer.
    Ask(AskCmd),
    /// Diagnose configuration issues (json; no secret values).
    Doctor,
}

#[derive(clap::Args, Debug)]
struct AskCmd {
    /// The question to answer.
    question: String,
    /// Number of search results to read (capped upstream at 10).
    #[arg(long, default_value_t = 3)]
    top_k: usize,
    /// Search backend. Allowed: auto, google, bing
    #[arg(long, default_value = "auto")]
    provider: String,
    /// Skip the final cross-result synthesis pass.
    #[arg(long)]
    no_synthesize: bool,
    /// Print the full answer bundle as JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Keep per-result output readable; full summaries are available via --json.
const DISPLAY_SUMMARY_CHARS: usize = 1_000;

fn truncate_for_display(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

async fn run_ask(cmd: AskCmd) -> Result<()> {
    let cfg = Config::from_env();
    let client = default_http_client()?;
    let choice: ProviderChoice = cmd.provider.parse()?;
    let browser = Browser::from_config(&cfg, &client, choice)?;

    let bundle = browser
        .answer(&cmd.question, cmd.top_k, !cmd.no_synthesize)
        .await?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
        return Ok(());
    }

    match &bundle.final_answer {
        Some(answer) => println!("FINAL ANSWER:\n{answer}"),
        None => println!("FINAL ANSWER: (none)"),
    }
    for r in &bundle.results {
        let title = r.title.as_deref().unwrap_or("(untitled)");
        println!(
            "\n== {title} ==\n{}\nSummary:\n{}",
            r.url,
            truncate_for_display(&r.summary, DISPLAY_SUMMARY_CHARS)
        );
    }
    Ok(())
}

fn run_doctor() -> Result<()> {
    let cfg = Config::from_env();
    let report = serde_json::json!({
        "search": {
            "google_configured": cfg.google_configured(),
            "bing_configured": cfg.bing_configured(),
        },
        "generation": {
            "openai_configured": cfg.openai_api_key.is_some(),
            "anthropic_configured": cfg.anthropic_api_key.is_some(),
        },
        "budgets": {
            "page_max_chars": cfg.page_max_chars,
            "chunk_max_chars": cfg.chunk_max_chars,
            "fetch_timeout_ms": cfg.fetch_timeout_ms,
            "summary_max_tokens": cfg.summary_max_tokens,
        },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Ask(cmd) => run_ask(cmd).await,
        Commands::Doctor => run_doctor(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_truncation_appends_an_ellipsis_only_when_clipped() {
        assert_eq!(truncate_for_display("short", 10), "short");
        assert_eq!(truncate_for_display("abcdef", 3), "abc…");
    }
}
