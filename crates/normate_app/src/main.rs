mod app;
mod cli;
mod config;
mod effects;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use normate_core::{validate_files, AnalysisContext, ChatSession, FileRole, StatusReport};
use normate_engine::{
    ApiClient, ChatRunner, DocumentExporter, RegionCapture, ReqwestApiClient, SnapshotCapture,
    SubmissionUpload, UploadFile,
};
use normate_logging::{normate_error, normate_info};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::ResultsApp;
use crate::cli::{ChatArgs, Cli, Command, HistoryCommand, SubmitArgs, ViewArgs};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            normate_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(destination) = &cli.log {
        config.log_destination = destination.clone();
    }
    config.validate()?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    normate_logging::initialize(config.log_destination(), level, None);

    let client: Arc<dyn ApiClient> = Arc::new(
        ReqwestApiClient::new(&config.api_settings()).context("creating API client")?,
    );

    match cli.command {
        Command::Submit(args) => submit(&config, client, args).await,
        Command::Report(args) => report(&config, client, &args.job_id, args.view, false).await,
        Command::Export(args) => report(&config, client, &args.job_id, args.view, true).await,
        Command::Chat(args) => chat(client, args).await,
        Command::History(command) => history(client.as_ref(), command).await,
        Command::Health => {
            if client.health_check().await {
                println!("backend at {} is healthy", config.base_url);
                Ok(())
            } else {
                bail!("backend at {} is not reachable", config.base_url)
            }
        }
    }
}

async fn submit(config: &AppConfig, client: Arc<dyn ApiClient>, args: SubmitArgs) -> Result<()> {
    validate_files(&args.quant_files, FileRole::Quantitative)?;
    validate_files(&args.qual_files, FileRole::Qualitative)?;
    let context = AnalysisContext {
        research_question: args.question,
        product_description: args.product,
        time_period: args.period,
        arpu: args.arpu,
    };
    context.validate()?;

    let upload = SubmissionUpload {
        quant_files: read_uploads(&args.quant_files).await?,
        qual_files: read_uploads(&args.qual_files).await?,
        context,
    };
    let job = client.submit(&upload).await.context("submitting analysis")?;
    normate_info!("Submitted job {}", job.job_id);
    println!("{}", job.job_id);

    if args.watch {
        report(config, client, &job.job_id, args.view, false).await?;
    }
    Ok(())
}

async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        files.push(UploadFile {
            file_name: upload_name(path),
            bytes,
        });
    }
    Ok(files)
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

async fn report(
    config: &AppConfig,
    client: Arc<dyn ApiClient>,
    job_id: &str,
    view: ViewArgs,
    export: bool,
) -> Result<()> {
    if export && view.snapshots.is_empty() {
        bail!("export needs at least one --snapshot of the rendered report");
    }

    let mut export_settings = config.export_settings();
    if let Some(dir) = view.output_dir {
        export_settings.output_dir = dir;
    }
    let capture: Option<Arc<dyn RegionCapture>> = if view.snapshots.is_empty() {
        None
    } else {
        Some(Arc::new(SnapshotCapture::from_paths(&view.snapshots)))
    };
    let perspective = view.perspective.unwrap_or(config.default_perspective);

    let mut app = ResultsApp::new(
        job_id,
        perspective,
        client,
        config.poll_policy(),
        DocumentExporter::new(export_settings),
        capture,
    );

    let outcome = async {
        app.wait_for_results().await?;
        if export {
            app.export().await?;
        }
        if view.interactive {
            app.run_interactive().await?;
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;
    app.close();
    outcome
}

async fn chat(client: Arc<dyn ApiClient>, args: ChatArgs) -> Result<()> {
    let result = match client.get_status(&args.job_id).await {
        Ok(StatusReport::Completed(result)) => result,
        Ok(StatusReport::NotReady { status }) => {
            bail!("job {} is still {status}; chat opens once it completes", args.job_id)
        }
        Ok(StatusReport::Failed { reason }) => bail!("analysis failed: {reason}"),
        Err(err) => return Err(err).context("loading report"),
    };

    let suggested = match args.suggested {
        Some(n) => Some(
            n.checked_sub(1)
                .and_then(|i| result.suggested_questions().get(i))
                .cloned()
                .with_context(|| format!("the report has no suggested question {n}"))?,
        ),
        None => None,
    };

    let mut runner = ChatRunner::new(
        client,
        args.job_id.clone(),
        ChatSession::for_result(&result),
    );
    for message in runner.transcript() {
        println!("{}", render::render_chat_message(message));
    }
    let mut printed = runner.transcript().len();

    if suggested.is_some() {
        runner.open_with(suggested.as_deref()).await;
        printed = print_new(&runner, printed);
    }

    if args.questions.is_empty() && suggested.is_none() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if matches!(line.trim(), "quit" | "q" | "exit") {
                break;
            }
            if runner.send(&line).await.is_ok() {
                printed = print_new(&runner, printed);
            }
        }
    } else {
        for question in &args.questions {
            runner.send(question).await?;
            printed = print_new(&runner, printed);
        }
    }
    Ok(())
}

fn print_new(runner: &ChatRunner, from: usize) -> usize {
    let transcript = runner.transcript();
    for message in transcript.iter().skip(from) {
        println!("{}", render::render_chat_message(message));
    }
    transcript.len()
}

async fn history(client: &dyn ApiClient, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List => {
            let entries = client.list_history().await.context("listing history")?;
            for line in render::render_history(&entries) {
                println!("{line}");
            }
        }
        HistoryCommand::Delete { job_id } => {
            client
                .delete_history_item(&job_id)
                .await
                .with_context(|| format!("deleting {job_id}"))?;
            println!("deleted {job_id}");
        }
        HistoryCommand::Wipe { yes } => {
            if !yes {
                bail!("refusing to wipe history without --yes");
            }
            client.wipe_history().await.context("wiping history")?;
            println!("history wiped");
        }
    }
    Ok(())
}
