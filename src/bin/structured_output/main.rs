//! Pattern: Typed extraction from a chat model, with validation and retries
//!
//! Each section asks the model for a JSON object, deserializes it into a
//! `ResponseModel`, runs its validators, and feeds failures back until the
//! retry policy gives up. Without `OPENAI_API_KEY` (or with `--offline`) every
//! section runs against scripted replies.
//!
//! Run with: cargo run --bin structured_output -- [--config settings.toml] [--offline]

mod backend;
mod client;
mod config;
mod models;
mod retry;
mod schemas;

use anyhow::{Context, Result};
use backend::{CompletionBackend, Message, OpenAiBackend, ScriptedBackend};
use clap::Parser;
use client::{ClientError, StructuredClient};
use colored::Colorize;
use config::{EnvOverrides, Settings};
use models::{
    AdminUser, RejectingUser, ResponseModel, SearchQuery, UppercaseUser, User, UserDetail,
    UserResponse,
};
use retry::{RetryPolicy, Wait};
use schemas::{ComparisonOutput, KeyMetric, SummaryOutput};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "structured_output", about = "Typed LLM extraction with validation and retries")]
struct Cli {
    /// TOML settings file (model, base_url, retry policy).
    #[arg(long, env = "STRUCTURED_OUTPUT_CONFIG")]
    config: Option<PathBuf>,

    /// Use scripted replies even when an API key is set.
    #[arg(long)]
    offline: bool,
}

/// Hands out the live backend, or a fresh script per section when offline.
struct Backends {
    live: Option<Arc<dyn CompletionBackend>>,
}

impl Backends {
    fn client(&self, script: &[&str]) -> StructuredClient {
        match &self.live {
            Some(live) => StructuredClient::new(live.clone()),
            None => StructuredClient::new(Arc::new(ScriptedBackend::new(script.iter().copied()))),
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn section(title: &str) {
    println!("\n{}", format!("=== {} ===", title).bold().cyan());
}

fn show<T: ResponseModel>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize response")?;
    println!("{} {}", format!("{}:", T::name()).green(), json);
    Ok(())
}

fn report(err: &ClientError) {
    println!("{} {}", "Extraction failed:".red(), err);
    if let ClientError::Retry(retry) = err {
        println!("  attempts: {}", retry.attempts);
        if let Some(last) = retry.messages.last() {
            println!("  last message: {}", last.content);
        }
        if let Some(completion) = &retry.last_completion {
            println!("  last completion: {}", completion);
        }
    }
}

// =============================================================================
// Milestone 1: Models with behaviour
// =============================================================================

async fn models_with_behaviour(backends: &Backends, settings: &Settings) -> Result<()> {
    section("Models with behaviour");

    let client = backends.client(&[
        r#"{"name": "John Doe", "age": 30, "email": "john.doe@example.com", "active": true}"#,
    ]);
    let messages = vec![Message::user(
        "Create a user named John Doe, age 30, email john.doe@example.com, currently active.",
    )];
    match client
        .create::<AdminUser>(&settings.model, messages, &settings.retry)
        .await
    {
        Ok(mut admin) => {
            show(&admin)?;
            println!("  promoted: {}", admin.promote_to_admin());
            println!("  active after deactivate: {}", admin.deactivate());
        }
        Err(err) => report(&err),
    }

    let client = backends.client(&[r#"{"query": "cute puppies", "query_type": "image"}"#]);
    let messages = vec![Message::user("Find me images of cute puppies.")];
    match client
        .create::<SearchQuery>(&settings.model, messages, &settings.retry)
        .await
    {
        Ok(query) => {
            show(&query)?;
            for result in query.execute() {
                println!("  - {}", result);
            }
        }
        Err(err) => report(&err),
    }
    Ok(())
}

// =============================================================================
// Milestone 2: Validators and simple retries
// =============================================================================

async fn validators(backends: &Backends, settings: &Settings) -> Result<()> {
    section("Validators");

    match UserDetail::new("jason", 12) {
        Ok(detail) => show(&detail)?,
        Err(err) => println!("{}\n{}", "Rejected locally:".yellow(), err),
    }

    let client = backends.client(&[r#"{"name": "Jason", "age": 25}"#]);
    let user: Result<UserResponse, _> = client
        .create(
            &settings.model,
            vec![Message::user("Extract `Jason is 25 years old`")],
            &RetryPolicy::max_retries(3),
        )
        .await;
    match user {
        Ok(user) => show(&user)?,
        Err(err) => report(&err),
    }

    section("Simple retries");
    let client = backends.client(&[
        r#"{"name": "jason", "age": 12}"#,
        r#"{"name": "JASON", "age": 12}"#,
    ]);
    let detail: Result<UserDetail, _> = client
        .create(
            &settings.model,
            vec![Message::user("Extract `jason is 12`")],
            &RetryPolicy::max_retries(3),
        )
        .await;
    match detail {
        Ok(detail) => show(&detail)?,
        Err(err) => report(&err),
    }
    Ok(())
}

// =============================================================================
// Milestone 3: Wait strategies and giving up
// =============================================================================

async fn wait_strategies(backends: &Backends, settings: &Settings) -> Result<()> {
    section("Fixed wait, then give up");
    let client = backends.client(&[
        r#"{"name": "Jason", "age": 25}"#,
        r#"{"name": "Jason", "age": 25}"#,
    ]);
    let policy = RetryPolicy::stop_after_attempt(2).with_wait(Wait::Fixed { seconds: 1.0 });
    let rejected: Result<RejectingUser, _> = client
        .create(
            &settings.model,
            vec![Message::user("Extract `Jason is 25 years old`")],
            &policy,
        )
        .await;
    match rejected {
        Ok(user) => show(&user)?,
        Err(err) => report(&err),
    }

    section("Random wait with attempt logging");
    let client = backends.client(&[
        r#"{"name": "John", "age": 18}"#,
        r#"{"name": "JOHN", "age": 18}"#,
    ]);
    let policy = RetryPolicy::stop_after_attempt(3).with_wait(Wait::Random { min: 0.2, max: 1.0 });
    let loud: Result<UppercaseUser, _> = client
        .create(
            &settings.model,
            vec![Message::user("Extract `John is 18 years old`")],
            &policy,
        )
        .await;
    match loud {
        Ok(user) => show(&user)?,
        Err(err) => report(&err),
    }

    section("Exponential backoff");
    let client = backends.client(&[r#"{"name": "Ada", "age": 36, "active": true}"#]);
    let policy = RetryPolicy::stop_after_attempt(4).with_wait(Wait::Exponential {
        multiplier: 1.0,
        min: 2.0,
        max: 10.0,
    });
    let user: Result<User, _> = client
        .create(
            &settings.model,
            vec![Message::user("Extract `Ada is 36 and active`")],
            &policy,
        )
        .await;
    match user {
        Ok(user) => show(&user)?,
        Err(err) => report(&err),
    }
    Ok(())
}

// =============================================================================
// Milestone 4: Concurrent extractions
// =============================================================================

async fn concurrent(backends: &Backends, settings: &Settings) -> Result<()> {
    section("Concurrent extractions");
    let inputs = [
        ("Jason is 25 years old", r#"{"name": "Jason", "age": 25}"#),
        ("Sarah is 31 years old", r#"{"name": "Sarah", "age": 31}"#),
        ("Omar is 47 years old", r#"{"name": "Omar", "age": 47}"#),
    ];

    let requests = inputs.iter().map(|(text, reply)| {
        let client = backends.client(&[*reply]);
        let messages = vec![Message::user(format!("Extract `{}`", text))];
        async move {
            client
                .create::<UserResponse>(&settings.model, messages, &settings.retry)
                .await
        }
    });

    for outcome in futures::future::join_all(requests).await {
        match outcome {
            Ok(user) => show(&user)?,
            Err(err) => report(&err),
        }
    }
    Ok(())
}

// =============================================================================
// Milestone 5: Report schemas
// =============================================================================

async fn report_schemas(backends: &Backends, settings: &Settings) -> Result<()> {
    section("Dataset summary");
    let canonical: Vec<String> = KeyMetric::ordered_metrics().into_iter().map(|m| m.name).collect();
    println!("  canonical order: {}", canonical.join(", "));
    let client = backends.client(&[r#"{
        "dataset_summary": "Traffic held steady with a small lift in conversions.",
        "key_metrics": [
            {"name": "Bounce Rate", "value": 0.42},
            {"name": "Average Users", "value": 812.0},
            {"name": "Average Sessions", "value": 1040.0},
            {"name": "Conversion Rate", "value": 0.031}
        ]
    }"#]);
    let summary: Result<SummaryOutput, _> = client
        .create(
            &settings.model,
            vec![Message::user("Summarise this week's analytics export.")],
            &settings.retry,
        )
        .await;
    match summary {
        Ok(mut summary) => {
            summary.enforce_ordered_metrics()?;
            println!("  {}", summary.dataset_summary);
            for metric in &summary.key_metrics {
                println!("  {:<26} {}", metric.name, metric.value);
            }
        }
        Err(err) => report(&err),
    }

    section("Week-over-week comparison");
    let client = backends.client(&[r#"{
        "comparison_summary": "Users grew while bounce rate fell.",
        "key_metrics_comparison": [
            {
                "name": "Average Users",
                "value1": 780.0,
                "value2": 812.0,
                "description": "Up about 4%."
            },
            {
                "name": "Bounce Rate",
                "value1": 0.47,
                "value2": 0.42,
                "description": "Fewer single-page visits."
            }
        ]
    }"#]);
    let comparison: Result<ComparisonOutput, _> = client
        .create(
            &settings.model,
            vec![Message::user("Compare this week with last week.")],
            &settings.retry,
        )
        .await;
    match comparison {
        Ok(comparison) => {
            println!("  {}", comparison.comparison_summary);
            for metric in &comparison.key_metrics_comparison {
                println!(
                    "  {:<26} {:>8} -> {:<8} ({:+.3}) {}",
                    metric.name,
                    metric.value1,
                    metric.value2,
                    metric.change(),
                    metric.description
                );
            }
        }
        Err(err) => report(&err),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref(), EnvOverrides::from_env())?;

    let live: Option<Arc<dyn CompletionBackend>> = match (&settings.api_key, cli.offline) {
        (Some(key), false) => {
            let backend = OpenAiBackend::new(&settings.base_url, key.clone())
                .context("configure OpenAI backend")?;
            Some(Arc::new(backend) as Arc<dyn CompletionBackend>)
        }
        _ => None,
    };
    let mode = if live.is_some() { "live".green() } else { "offline (scripted replies)".yellow() };
    println!("{} {} using model {}", "Structured output demo:".bold(), mode, settings.model);

    let backends = Backends { live };
    models_with_behaviour(&backends, &settings).await?;
    validators(&backends, &settings).await?;
    wait_strategies(&backends, &settings).await?;
    concurrent(&backends, &settings).await?;
    report_schemas(&backends, &settings).await?;

    println!("\n=== Key Points ===");
    println!("1. serde turns the reply into a typed value; validators run after parsing");
    println!("2. Rejected replies go back to the model with the error text");
    println!("3. RetryPolicy decides how many attempts and how long to wait");
    println!("4. Transport errors are returned immediately, not retried");
    Ok(())
}
