//! Run command implementation.

use crate::alert::{self, Alerter};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::filing::Filer;
use crate::mail::{DirectoryMailSource, MailSource};
use crate::output::Formatter;
use crate::pipeline::{Pipeline, RunReport};
use crate::state::StateStore;
use crate::text::{CommandTextExtractor, TextExtractor};
use chrono::{Local, NaiveDate};
use sorter_llm::{AnthropicClient, LlmProvider};
use tracing::{info, warn};

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    config.validate()?;
    config.validate_anthropic()?;

    let provider = AnthropicClient::new(config.anthropic.clone())?;
    let filer = Filer::new(&config.filing.root_dir, config.filing.folder_prefix.clone())
        .dry_run(args.dry_run);
    let pipeline = Pipeline::new(
        provider,
        DirectoryMailSource::new(&config.mail.inbox_dir),
        CommandTextExtractor::from_settings(&config.pdf),
        alert::from_settings(&config.alert),
        filer,
    )
    .with_extractor_config(config.extractor.clone());

    let store = StateStore::new(&config.state.path);
    let today = Local::now().date_naive();
    let report = run_once(&pipeline, &store, args.since, today, args.dry_run).await?;

    println!("{}", formatter.format_report(&report, args.dry_run)?);
    if args.dry_run {
        eprintln!("{}", formatter.info("Dry run: nothing was written"));
    }
    if !report.is_clean() {
        eprintln!(
            "{}",
            formatter.warning("Last-run date not updated; failed invoices will be retried next run")
        );
    }

    Ok(())
}

/// One scheduled run: pick the start date, run the pipeline, advance the state.
///
/// Without an explicit `since`, the last recorded run date is used, or
/// `today` before the first run. The state only advances to `today` after a
/// non-dry run with no failures. When the run as a whole fails, the
/// pipeline's alerter is told before the error is returned. A failed state
/// save after a clean run reports how many invoices were already filed.
pub async fn run_once<P, M, X, A>(
    pipeline: &Pipeline<P, M, X, A>,
    store: &StateStore,
    since: Option<NaiveDate>,
    today: NaiveDate,
    dry_run: bool,
) -> Result<RunReport>
where
    P: LlmProvider,
    M: MailSource,
    X: TextExtractor,
    A: Alerter,
{
    let result = advance(pipeline, store, since, today, dry_run).await;

    if let Err(e) = &result {
        pipeline.notify(&format!("invoice-sorter run failed: {}", e)).await;
    }

    result
}

async fn advance<P, M, X, A>(
    pipeline: &Pipeline<P, M, X, A>,
    store: &StateStore,
    since: Option<NaiveDate>,
    today: NaiveDate,
    dry_run: bool,
) -> Result<RunReport>
where
    P: LlmProvider,
    M: MailSource,
    X: TextExtractor,
    A: Alerter,
{
    let since = match since {
        Some(date) => date,
        None => store.load()?.map(|state| state.last_run).unwrap_or(today),
    };

    let report = pipeline.run(since).await?;

    info!(
        filed = report.filed.len(),
        failed = report.failures.len(),
        skipped = report.skipped,
        "Pipeline run finished"
    );

    if report.is_clean() && !dry_run {
        store.save(today).map_err(|e| {
            CliError::State(format!(
                "{} invoice(s) filed but run state not saved: {}",
                report.filed.len(),
                e
            ))
        })?;
        info!(last_run = %today, "Saved run state");
    } else if !report.is_clean() {
        warn!(failed = report.failures.len(), "Keeping previous run state");
    }

    Ok(report)
}
