use std::collections::BTreeSet;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use serde::Deserialize;
use taskdeck_core::memory::{ManualTimers, MemoryPage, RecordingTransport};
use taskdeck_core::{Command, Config, Dispatcher, OverlayId, Outcome, ToggleRequest};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "taskdeck-replay",
    about = "Replays task page scenarios through the page coordinator"
)]
struct Args {
    #[arg(long, default_value = "crates/taskdeck-replay/scenarios/basic_flow.json")]
    scenario: Vec<PathBuf>,

    /// TOML config; falls back to TASKDECK_CONFIG, then defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Config override, e.g. `--set toast.duration_ms=2000`.
    #[arg(long = "set", value_parser = parse_override)]
    overrides: Vec<(String, String)>,

    /// Print every outcome as a JSON line.
    #[arg(long)]
    json: bool,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    #[serde(default = "MemoryPage::complete")]
    page: MemoryPage,
    steps: Vec<Step>,
    #[serde(default)]
    expect: Expect,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Advance { advance_ms: u64 },
    Command(Command),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Expect {
    navigations: Option<Vec<String>>,
    requests: Option<Vec<ToggleRequest>>,
    visible: Option<BTreeSet<OverlayId>>,
    form_action: Option<String>,
    errors: Option<usize>,
}

#[derive(Debug)]
struct ScenarioRun {
    outcomes: Vec<Outcome>,
    page: MemoryPage,
    requests: Vec<ToggleRequest>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let mut config = Config::load(args.config.as_deref())?;
    config
        .apply_overrides(args.overrides.clone())
        .context("invalid --set override")?;

    let scenarios = load_scenarios(&args.scenario)?;
    if scenarios.is_empty() {
        return Err(anyhow!("no scenarios loaded"));
    }

    let mut failed = 0_usize;
    for scenario in &scenarios {
        info!(scenario = %scenario.name, "running scenario");
        let run = run_scenario(scenario, &config);

        if args.json {
            for outcome in &run.outcomes {
                println!("{}", serde_json::to_string(outcome)?);
            }
        }

        let mismatches = check(&scenario.expect, &run);
        if mismatches.is_empty() {
            println!("PASS {} ({} steps)", scenario.name, scenario.steps.len());
        } else {
            failed += 1;
            println!("FAIL {}", scenario.name);
            for line in mismatches {
                println!("  {line}");
            }
        }
    }

    println!(
        "\n{} of {} scenarios passed",
        scenarios.len() - failed,
        scenarios.len()
    );
    if failed > 0 {
        bail!("{failed} scenario(s) failed");
    }
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("warn"))
        .map_err(|e| anyhow!("invalid log level: {e}"))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    Ok(())
}

fn parse_override(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

fn load_scenarios(paths: &[PathBuf]) -> anyhow::Result<Vec<Scenario>> {
    let mut out = Vec::new();

    for path in paths {
        out.push(load_scenario(path)?);
    }

    Ok(out)
}

fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse scenario {}", path.display()))
}

fn run_scenario(scenario: &Scenario, config: &Config) -> ScenarioRun {
    let mut dispatcher = Dispatcher::new(
        scenario.page.clone(),
        RecordingTransport::default(),
        config.clone(),
    );
    let mut timers = ManualTimers::default();
    let mut outcomes = Vec::new();

    if let Some(deferred) = dispatcher.boot() {
        debug!(after_ms = deferred.after_ms, "scheduled deferred command");
        timers.schedule(deferred);
    }

    for step in &scenario.steps {
        match step {
            Step::Command(command) => {
                outcomes.push(dispatcher.dispatch(command.clone()));
            }
            Step::Advance { advance_ms } => {
                for command in timers.advance(*advance_ms) {
                    outcomes.push(dispatcher.dispatch(command));
                }
            }
        }
    }

    if timers.pending() > 0 {
        debug!(
            pending = timers.pending(),
            now_ms = timers.now_ms(),
            "deferred commands left unfired"
        );
    }

    ScenarioRun {
        outcomes,
        page: dispatcher.page().clone(),
        requests: dispatcher.transport().sent(),
    }
}

fn check(expect: &Expect, run: &ScenarioRun) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(want) = &expect.navigations
        && want != &run.page.navigations
    {
        out.push(format!(
            "navigations: expected {want:?}, got {:?}",
            run.page.navigations
        ));
    }

    if let Some(want) = &expect.requests
        && want != &run.requests
    {
        out.push(format!(
            "requests: expected {want:?}, got {:?}",
            run.requests
        ));
    }

    if let Some(want) = &expect.visible
        && want != &run.page.active
    {
        out.push(format!(
            "visible overlays: expected {want:?}, got {:?}",
            run.page.active
        ));
    }

    if let Some(want) = &expect.form_action {
        let got = run.page.form.as_ref().map(|form| form.action.as_str());
        if got != Some(want.as_str()) {
            out.push(format!("form action: expected {want}, got {got:?}"));
        }
    }

    if let Some(want) = expect.errors
        && want != run.page.errors.len()
    {
        warn!(errors = ?run.page.errors, "inline errors differ");
        out.push(format!(
            "inline errors: expected {want}, got {}",
            run.page.errors.len()
        ));
    }

    out
}
