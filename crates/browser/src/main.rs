//! Oxide Shell - runs the embedding shell against the simulated runtime.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use browser::{
    Application, InstanceState, LaunchFailureReport, NativeSignal, ShellConfig, ShellController,
    ShellPresenter, ShellServices, SimulatedRuntime,
};
use common::{EmbedResult, ProcessState};
use ui::{FixedPreferences, Notice, RenderPreferenceProvider, Tab};

/// Oxide Shell - embedding shell for a native browser runtime
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to open. Overrides the saved address.
    url: Option<String>,

    /// Address used when nothing else is available
    #[arg(long)]
    default_url: Option<String>,

    /// File holding saved instance state
    #[arg(long)]
    state: Option<PathBuf>,

    /// Make the browser process report a startup failure
    #[arg(long)]
    fail_startup: bool,

    /// Process name to bootstrap as
    #[arg(long, default_value = "org.oxide.shell")]
    process_name: String,

    /// Prefer night mode
    #[arg(long)]
    night_mode: bool,

    /// Allow auto-darkening of web content
    #[arg(long)]
    force_dark: bool,

    /// Viewport width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Viewport height
    #[arg(long, default_value = "720")]
    height: u32,

    /// Delay before the browser process reports, in milliseconds
    #[arg(long, default_value = "0")]
    startup_delay_ms: u64,

    /// Directory holding the command-line file
    #[arg(long)]
    command_line_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Presenter that writes everything to the log.
struct LogPresenter;

impl ShellPresenter for LogPresenter {
    fn attach_tab(&mut self, tab: &Arc<Tab>) {
        info!(
            tab = %tab.id(),
            night_mode = tab.is_night_mode_enabled(),
            force_dark = tab.is_force_dark_web_content_enabled(),
            "tab attached"
        );
    }

    fn show_notice(&mut self, notice: Notice) {
        info!(?notice, "{}", notice.message());
    }

    fn report_diagnostic(&mut self, report: &LaunchFailureReport) {
        tracing::error!(stage = %report.stage, detail = %report.detail, "launch failure report");
    }

    fn finish(&mut self) {
        info!("shell finished");
    }
}

fn build_config(args: &Args) -> ShellConfig {
    let mut config = ShellConfig::new()
        .with_viewport(args.width, args.height)
        .with_dark_mode(args.night_mode, args.force_dark);
    if let Some(url) = &args.url {
        config = config.with_startup_url(url.clone());
    }
    if let Some(url) = &args.default_url {
        config = config.with_default_url(url.clone());
    }
    config
}

/// Pass fatal errors up so the process exits, log and drop the rest.
fn recover<T>(result: EmbedResult<T>, context: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_fatal() => Err(err.into()),
        Err(err) => {
            tracing::warn!(error = %err, "{context}");
            Ok(None)
        }
    }
}

fn build_runtime(args: &Args) -> SimulatedRuntime {
    let mut runtime = SimulatedRuntime::new();
    if args.fail_startup {
        runtime = runtime.with_outcome(NativeSignal::Failure);
    }
    if args.startup_delay_ms > 0 {
        runtime = runtime.with_delay(Duration::from_millis(args.startup_delay_ms));
    }
    if let Some(dir) = &args.command_line_dir {
        runtime = runtime.with_command_line_dir(dir);
    }
    runtime
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Oxide Shell v{}", browser::VERSION);

    let config = build_config(&args);
    let runtime = Arc::new(build_runtime(&args));
    let process = Arc::new(ProcessState::new());

    let attached = Application::attach(&args.process_name, &config, runtime.as_ref(), process);
    let Some(app) = recover(attached, "bootstrap failed")? else {
        return Ok(());
    };
    if !app.role().is_browser() {
        info!(role = %app.role(), "not the browser process, nothing to do");
        return Ok(());
    }

    let saved_state = match &args.state {
        Some(path) => recover(InstanceState::load(path), "saved state ignored")?,
        None => None,
    };

    let preferences = (config.prefer_dark_mode || config.force_dark_web_content).then(|| {
        Arc::new(FixedPreferences::new(
            config.prefer_dark_mode,
            config.force_dark_web_content,
        )) as Arc<dyn RenderPreferenceProvider>
    });
    let mut services =
        ShellServices::new(runtime.clone(), runtime.clone(), app.process_state().clone());
    if let Some(provider) = preferences {
        services = services.with_preferences(provider);
    }

    let mut shell = ShellController::new(
        config,
        saved_state.as_ref(),
        services,
        Box::new(LogPresenter),
    );
    if let Err(err) = shell.start() {
        tracing::error!(error = %err, "shell failed to start");
        return Ok(());
    }

    let outcome = shell.run_until_settled().await;
    info!(?outcome, phase = ?shell.phase(), url = ?shell.resolved_url(), "startup settled");

    if let Some(path) = &args.state {
        if recover(shell.save_instance_state().save(path), "instance state not saved")?.is_some() {
            info!(path = %path.display(), "instance state saved");
        }
    }

    shell.teardown();
    info!("Shell shutdown complete");

    Ok(())
}
