mod cli;
mod ui;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use coldmail::format::to_plain_text;
use coldmail::{Chain, ChainConfig, ChainError, DraftOptions, EmailStyle, Portfolio};
use ui::StageSpinner;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<ChainError>() {
            Some(chain_err) => ui::print_failure(chain_err),
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "coldmail=debug" } else { "coldmail=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) if !path.exists() => bail!("config file not found: {}", path.display()),
        Some(path) => ChainConfig::load_from(path)?,
        None => ChainConfig::load()?,
    };
    if cli.plain {
        config.style = EmailStyle::Plain;
    }
    if let Some(n) = cli.max_retries {
        config.retry.max_retries = n;
    }

    let chain = Chain::new(&config)?;

    match cli.command {
        Command::Check => {
            check(&chain);
            Ok(())
        }
        Command::Extract { file } => {
            let text = read_input(file.as_deref())?;
            let spinner = StageSpinner::start("Extracting job details…");
            let jobs = chain.extract_jobs(&text).await.inspect_err(|_| spinner.fail())?;
            spinner.done(&format!("Found {} job posting(s)", jobs.len()));
            println!("{}", serde_json::to_string_pretty(&jobs)?);
            Ok(())
        }
        Command::Draft {
            file,
            tone,
            cta,
            portfolio,
            out_dir,
        } => {
            let text = read_input(file.as_deref())?;
            let portfolio = portfolio
                .as_deref()
                .map(|p| Portfolio::load(p).with_context(|| format!("loading portfolio {}", p.display())))
                .transpose()?;
            match &portfolio {
                Some(p) if p.is_empty() => warn!("Portfolio has no entries; emails will cite no links"),
                Some(p) => debug!("Loaded {} portfolio entries", p.len()),
                None => {}
            }
            let options = DraftOptions {
                tone: Some(tone),
                cta: Some(cta),
            };
            draft(&chain, &text, portfolio.as_ref(), &options, out_dir.as_deref()).await
        }
    }
}

async fn draft(
    chain: &Chain,
    text: &str,
    portfolio: Option<&Portfolio>,
    options: &DraftOptions,
    out_dir: Option<&Path>,
) -> Result<()> {
    let spinner = StageSpinner::start("Extracting job details…");
    let jobs = chain.extract_jobs(text).await.inspect_err(|_| spinner.fail())?;
    if jobs.is_empty() {
        spinner.fail();
        eprintln!("No jobs detected. Try the text of a specific job detail page.");
        return Ok(());
    }
    spinner.done(&format!("Found {} job posting(s)", jobs.len()));

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let started = Local::now();
    let tone = options.tone.as_deref().unwrap_or_default();
    let cta = options.cta.as_deref().unwrap_or_default();

    for (i, job) in jobs.iter().enumerate() {
        let index = i + 1;
        ui::print_job(index, job, tone, cta);

        let spinner = StageSpinner::start("Writing tailored email…");
        let email = match portfolio {
            Some(p) => chain.draft_for_job(job, p, options).await,
            None => chain.write_mail_with(job, &[], options).await,
        }
        .inspect_err(|_| spinner.fail())?;
        let email = to_plain_text(&email);
        spinner.done("Email ready");
        ui::print_email(&email);

        if let Some(dir) = out_dir {
            let path: PathBuf = dir.join(ui::email_file_name(started, index));
            std::fs::write(&path, &email).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("  saved {}", path.display());
        }
    }
    Ok(())
}

fn check(chain: &Chain) {
    println!("Extraction chain:");
    for c in chain.extraction_candidates() {
        println!("  {}", c.label());
    }
    println!("Drafting chain:");
    for c in chain.drafting_candidates() {
        println!("  {}", c.label());
    }
}

/// Reads the cleaned page text from `path`, or stdin when absent.
fn read_input(path: Option<&Path>) -> Result<String> {
    let text = match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    if text.trim().is_empty() {
        bail!("input text is empty");
    }
    Ok(text)
}
