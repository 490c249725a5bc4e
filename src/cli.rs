use crate::{
    config::{Config, Credentials},
    error::Error,
    extract,
    interactive::Prompter,
    llm::{OpenAiCompleter, Retrying},
    output::{self, OutputFormat},
    pipeline::{Pipeline, SessionOutput},
    report::{OutputArtifact, RunReport},
    util::{ensure_dir, hash_file, now_rfc3339},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "proofread")]
#[command(about = "Ask an LLM to proofread a PDF page by page, then optionally apply its edits")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Option<Command>,

    /// Path to config TOML. If omitted, uses ./proofread.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print effective settings and whether the credential is present.
    Doctor {},
    /// Print the extracted page texts as JSON.
    Extract {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the error report without offering edits.
    Check {
        #[arg(long)]
        input: PathBuf,
    },
    /// Full run; prompts for anything not given as a flag.
    Run(RunArgs),
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Apply edits without asking.
    #[arg(long, conflicts_with = "no_apply")]
    pub apply: bool,
    /// Print the report and stop without asking.
    #[arg(long)]
    pub no_apply: bool,
    /// Output directory (default from config: ./corrected_pdfs).
    #[arg(long)]
    pub output: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl RunArgs {
    fn decision(&self) -> Option<bool> {
        match (self.apply, self.no_apply) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = Config::resolve(args.config.as_deref())?;

    match &args.cmd {
        Some(Command::Doctor {}) => {
            let _guard = init_logging(&args, &cfg, None)?;
            doctor(&args, &cfg)
        }
        Some(Command::Extract { input }) => {
            let _guard = init_logging(&args, &cfg, None)?;
            extract_cmd(&cfg, input)
        }
        Some(Command::Check { input }) => {
            let _guard = init_logging(&args, &cfg, None)?;
            check(&cfg, input)
        }
        Some(Command::Run(run_args)) => run(&args, &cfg, run_args),
        None => run(&args, &cfg, &RunArgs::default()),
    }
}

static LOGGING: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber once; later calls are no-ops.
pub fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    if LOGGING.get().is_some() {
        return Ok(None);
    }

    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;
    let _ = LOGGING.set(());

    Ok(guard)
}

fn doctor(args: &Args, cfg: &Config) -> Result<()> {
    let credential_present = Credentials::from_env(&cfg.llm).is_ok();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "config": args.config,
            "api_key_env": cfg.llm.api_key_env,
            "credential_present": credential_present,
            "base_url": cfg.llm.base_url,
            "model": cfg.llm.model,
            "retry_max_attempts": cfg.retry.max_attempts,
            "max_parallel_pages": cfg.concurrency.max_parallel_pages,
            "output_format": cfg.output.format,
            "output_dir": cfg.output.dir,
        }))?
    );
    Ok(())
}

fn extract_cmd(cfg: &Config, input: &Path) -> Result<()> {
    validate_input(input)?;
    let doc = extract::extract_document(cfg, input)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": input,
            "page_count": doc.pages.len(),
            "pages": doc.pages,
            "unreadable": doc.unreadable,
        }))?
    );
    Ok(())
}

fn check(cfg: &Config, input: &Path) -> Result<()> {
    let creds = Credentials::from_env(&cfg.llm)?;
    validate_input(input)?;
    let doc = extract::extract_document(cfg, input)?;
    let completer = Retrying::new(OpenAiCompleter::new(&cfg.llm, &creds)?, &cfg.retry);
    let report = Pipeline::new(cfg, completer).scrutinize_document(&doc)?;
    println!("Errors Found:");
    println!("{}", report.render());
    Ok(())
}

fn run(args: &Args, cfg: &Config, run_args: &RunArgs) -> Result<()> {
    let out_dir = run_args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.output.dir));
    let format = run_args.format.unwrap_or(cfg.output.format);

    let log_path = resolve_log_path(cfg, &out_dir);
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    let creds = Credentials::from_env(&cfg.llm)?;

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let input = match &run_args.input {
        Some(p) => p.clone(),
        None => prompter.ask_path()?,
    };
    validate_input(&input)?;

    let started = now_rfc3339();
    let input_sha256 = hash_file(&input)?;
    let doc = extract::extract_document(cfg, &input)?;
    info!(
        "input={} sha256={} pages={} format={format} out={}",
        input.display(),
        input_sha256,
        doc.pages.len(),
        out_dir.display()
    );

    let completer = Retrying::new(OpenAiCompleter::new(&cfg.llm, &creds)?, &cfg.retry);
    let pipeline = Pipeline::new(cfg, completer);
    let session = pipeline.run_session(&doc, run_args.decision(), &mut prompter)?;

    let mut summary = RunReport::new(
        input.display().to_string(),
        input_sha256,
        doc.pages.len(),
        &session.report,
        started,
    );
    finish_run(cfg, &out_dir, format, &session, &mut summary, &mut prompter)?;

    if cfg.global.print_summary {
        prompter.say(&serde_json::to_string_pretty(&summary)?)?;
    }

    Ok(())
}

/// Writes the artifact (when edits were applied) and the optional JSON report.
pub fn finish_run<R: BufRead, W: Write>(
    cfg: &Config,
    out_dir: &Path,
    format: OutputFormat,
    session: &SessionOutput,
    summary: &mut RunReport,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    if let Some(correction) = &session.correction {
        summary.record_correction(correction);
        let writer = output::writer_for(format, &cfg.output);
        let path = writer.write(&correction.pages, out_dir)?;
        prompter.say(&format!("Corrected output saved to {}", path.display()))?;
        summary.output = Some(OutputArtifact {
            path: path.display().to_string(),
            format,
        });
    }
    summary.finished = now_rfc3339();

    if cfg.output.write_report_json && summary.applied {
        let path = out_dir.join(&cfg.output.report_filename);
        std::fs::write(&path, serde_json::to_string_pretty(&*summary)?)
            .with_context(|| format!("writing report: {}", path.display()))?;
        debug!("report written to {}", path.display());
    }
    Ok(())
}

pub fn validate_input(input: &Path) -> std::result::Result<(), Error> {
    let input_str = input.display().to_string();

    if looks_like_url(&input_str) {
        return Err(Error::file_access(input, "URL inputs are not supported"));
    }

    if !input.exists() {
        return Err(Error::file_access(input, "does not exist"));
    }

    if let Some(ext) = input.extension().and_then(|s| s.to_str()) {
        if !ext.eq_ignore_ascii_case("pdf") {
            return Err(Error::unsupported(input, "expected a .pdf file"));
        }
    } else {
        warn!("input has no extension; assuming PDF: {}", input.display());
    }

    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}

fn resolve_log_path(cfg: &Config, out_dir: &Path) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(out_dir.join("proofread.log"))
}
