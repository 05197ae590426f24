use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use takedown_letters::api::CaseSubmission;
use takedown_letters::case::CaseSession;
use takedown_letters::config::Config;
use takedown_letters::llm::AnthropicClient;
use takedown_letters::pipeline::{CancelToken, GenerationPipeline};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "takedown",
    about = "Generate a takedown request letter from collected case facts",
    version
)]
struct Args {
    /// Path to the case file (JSON, same shape the wizard submits)
    case: PathBuf,

    /// Generate follow-up questions and exit (answer them, merge the answers
    /// into the case file, then run again without this flag)
    #[arg(short, long)]
    questions: bool,

    /// Path to a JSON map of follow-up answers keyed by question id
    #[arg(short, long)]
    answers: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load();
    if !config.has_api_key() {
        anyhow::bail!(
            "No API key configured. Set {} or add it to {}.",
            takedown_letters::config::API_KEY_ENV,
            Config::config_location()
        );
    }

    let content = std::fs::read_to_string(&args.case)
        .with_context(|| format!("reading case file {}", args.case.display()))?;
    let submission: CaseSubmission =
        serde_json::from_str(&content).context("case file is not a valid case submission")?;

    let gateway = AnthropicClient::from_config(&config)?;
    let mut session = CaseSession::new(submission.into_case_facts());

    if let Some(path) = &args.answers {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading answers file {}", path.display()))?;
        let answers: BTreeMap<String, String> =
            serde_json::from_str(&raw).context("answers file is not a map of id -> answer")?;
        session.merge_follow_up_answers(answers);
    }

    let mut pipeline = GenerationPipeline::new(&gateway, config.limits);

    if args.questions {
        eprintln!("  Generating follow-up questions...");
        let questions = fetch_questions_with_retries(&mut pipeline, &session, &config).await?;
        match questions {
            Some(batch) => println!("{}", serde_json::to_string_pretty(&batch)?),
            None => eprintln!("  Could not generate questions; continue with the facts you have."),
        }
        return Ok(());
    }

    eprintln!("  Drafting letter...");
    eprintln!("  Running quality check...");
    let facts = session.current();
    let outcome = pipeline
        .generate_letter(&facts, &CancelToken::new())
        .await
        .context("letter generation failed")?;

    if outcome.revised {
        eprintln!(
            "  Quality check flagged {} issue(s); the reviewer's rewrite was used.",
            outcome.report.issues.len()
        );
    } else if !outcome.report.passes_quality_check {
        eprintln!(
            "  Quality check flagged {} issue(s); review the letter before sending.",
            outcome.report.issues.len()
        );
    }

    println!("Subject: {}\n", outcome.letter.subject);
    println!("{}", outcome.letter.body);
    if !outcome.letter.next_steps.is_empty() {
        println!("\nNext steps:");
        for step in &outcome.letter.next_steps {
            println!("  - {}", step);
        }
    }
    Ok(())
}

/// Follow-up questions are optional: retry transient failures up to the
/// configured cap, then let the user proceed with the facts already
/// collected instead of blocking the workflow.
async fn fetch_questions_with_retries(
    pipeline: &mut GenerationPipeline<&AnthropicClient>,
    session: &CaseSession,
    config: &Config,
) -> Result<Option<Vec<takedown_letters::letter::FollowUpQuestion>>> {
    let facts = session.current();
    let mut attempts = 0;
    loop {
        attempts += 1;
        match pipeline
            .follow_up_questions(&facts, &CancelToken::new())
            .await
        {
            Ok(questions) => return Ok(Some(questions)),
            Err(err) if err.is_retryable() && attempts <= config.limits.max_follow_up_retries => {
                eprintln!(
                    "  {} (retry {}/{})",
                    err,
                    attempts,
                    config.limits.max_follow_up_retries
                );
            }
            Err(err) => {
                eprintln!("  Follow-up generation failed: {}", err);
                return Ok(None);
            }
        }
    }
}
