use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use tui_capture::config::{self as cfg, ActionDef, Config};
use tui_capture::demo::{DEMO_CLASS, DEMO_MODULE};
use tui_capture::error::RunError;
use tui_capture::executor::{Plan, Runtime};
use tui_capture::session::AppRegistry;

/// tui-capture CLI
#[derive(Debug, Parser)]
#[command(
    name = tui_capture::PKG_NAME,
    version = tui_capture::PKG_VERSION,
    about = "Drive a terminal UI application through a scripted sequence and capture screenshots",
    after_help = "Quick single-shot mode (no config file):\n  \
                  tui-capture --keys tab,enter --click \"Run Selected\" --output demo\n\n\
                  Sequence file mode:\n  \
                  tui-capture sequence.toml [--dry-run]"
)]
struct Args {
    /// Path to the TOML sequence file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Path to the TOML sequence file (older spelling of CONFIG)
    #[arg(long = "input", value_name = "CONFIG", conflicts_with = "config")]
    input: Option<PathBuf>,

    /// Print the resolved plan without launching the application or writing files
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Comma-separated keys to press (single-shot mode)
    #[arg(long = "keys", value_name = "K,K,...", conflicts_with_all = ["config", "input"])]
    keys: Option<String>,

    /// Label of a button to click (single-shot mode)
    #[arg(long = "click", value_name = "LABEL", conflicts_with_all = ["config", "input"])]
    click: Option<String>,

    /// Seconds to wait before capturing (single-shot mode)
    #[arg(
        long = "delay",
        value_name = "SECONDS",
        default_value_t = 2.0,
        conflicts_with_all = ["config", "input"]
    )]
    delay: f64,

    /// Base name of the capture files (single-shot mode)
    #[arg(
        long = "output",
        value_name = "BASENAME",
        default_value = "demo-snapshot",
        conflicts_with_all = ["config", "input"]
    )]
    output: String,

    /// Set log level (e.g., trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Print the JSON Schema for the configuration and exit
    #[arg(long = "print-schema")]
    print_schema: bool,
}

impl Args {
    fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref().or(self.input.as_ref())
    }

    /// Build the single-shot sequence: press keys, click, wait, capture.
    fn legacy_config(&self) -> Config {
        let mut config = Config::new(DEMO_MODULE, DEMO_CLASS);
        if let Some(keys) = &self.keys {
            let keys: Vec<String> = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
            if !keys.is_empty() {
                config.steps.push(ActionDef::Press { key: None, keys });
            }
        }
        if let Some(label) = &self.click {
            config.steps.push(ActionDef::Click {
                label: label.clone(),
            });
        }
        config.steps.push(ActionDef::Delay {
            seconds: self.delay,
        });
        let base = self.output.replace(".svg", "").replace(".txt", "");
        config.steps.push(ActionDef::Capture { output: Some(base) });
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match &args.log_level {
        Some(level) => tui_capture::init_tracing_with_level(Some(level)),
        None => tui_capture::init_tracing(),
    }
    debug!(
        version = tui_capture::PKG_VERSION,
        config = ?args.config_path(),
        dry_run = args.dry_run,
        "Starting tui-capture"
    );

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.downcast_ref::<RunError>().map_or(1, RunError::exit_code);
            eprintln!("error: {err:#}");
            ExitCode::from(code)
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    if args.print_schema {
        let schema = cfg::generate_schema();
        let json = serde_json::to_string_pretty(&schema)?;
        println!("{json}");
        return Ok(());
    }

    let (config, source) = match args.config_path() {
        Some(path) => {
            let config = cfg::load_from_path_async(path)
                .await
                .map_err(RunError::from)?;
            (config, Some(path.as_path()))
        }
        None => {
            let config = args.legacy_config();
            cfg::validate_config(&config).map_err(RunError::from)?;
            (config, None)
        }
    };

    if args.dry_run {
        print!("{}", Plan::from_config(&config, source));
        return Ok(());
    }

    let registry = AppRegistry::with_builtin_apps();
    let mut runtime = Runtime::new(config, &registry);
    let report = runtime
        .run()
        .await
        .context("capture sequence aborted")?;

    for capture in &report.captures {
        println!(
            "Captured → {} | {} | {}",
            capture.svg.display(),
            capture.text.display(),
            capture.tooltips.display()
        );
    }
    info!(
        steps = report.steps_executed,
        captures = report.captures.len(),
        skipped = report.skipped.len(),
        "tui-capture finished"
    );
    Ok(())
}
