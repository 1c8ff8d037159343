//! confmgrd entry point.
//!
//! Reconciles templates against the local switch, compares FRR
//! configurations offline, and dumps the device configuration the
//! reconciliation reads.

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use sonic_cfgmgr_common::{FileTemplating, LocalAgent, RemoteAgent};
use sonic_confmgrd::paths::DEFAULT_CONFIG_PATH;
use sonic_confmgrd::{bgp_neighbors, readers, ApplyRequest, ConfmgrConfig, Coordinator, Outcome};

/// SONiC declarative configuration manager
#[derive(Parser, Debug)]
#[command(name = "confmgrd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Daemon configuration file
    #[arg(short = 'c', long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short = 'l', long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render templates and reconcile the switch with them
    Apply(ApplyArgs),

    /// Report routing-policy objects a candidate FRR config would change
    Diff {
        /// Reference configuration (usually the running one)
        reference: PathBuf,
        /// Candidate configuration
        candidate: PathBuf,
    },

    /// Print device configuration as JSON
    #[command(subcommand)]
    Show(ShowTarget),
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Domain and template, e.g. `bgp=salt://sonic/frr.conf`; repeatable
    #[arg(short = 't', long = "template", value_parser = parse_template, required = true)]
    templates: Vec<(String, String)>,

    /// JSON file holding the rendering context
    #[arg(long)]
    context: Option<PathBuf>,

    /// Template environment; defaults to the configured one
    #[arg(long)]
    env: Option<String>,

    /// Name reported in the aggregate result
    #[arg(long, default_value = "confmgrd")]
    name: String,

    /// Validate and report without changing the switch
    #[arg(long)]
    dry_run: bool,

    /// Reload every service after a CONFIG_DB change
    #[arg(long)]
    reload: bool,

    /// Push BGP configuration only when a routing-policy object changes
    #[arg(long)]
    push_only_if_changes: bool,
}

#[derive(Subcommand, Debug)]
enum ShowTarget {
    /// /etc/sonic/snmp.yml
    Snmp,
    /// /etc/sonic/config_db.json
    ConfigDb,
    /// Running CONFIG_DB
    RunningConfigDb,
    /// FRR running configuration
    BgpRunning,
    /// FRR startup configuration
    BgpStartup,
    /// Configured route-map names
    RouteMaps,
    /// BGP sessions
    BgpNeighbors {
        /// Restrict to one neighbor
        neighbor: Option<IpAddr>,
        /// Print FRR's JSON untouched
        #[arg(long)]
        raw: bool,
    },
}

fn parse_template(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((domain, template)) if !domain.is_empty() && !template.is_empty() => {
            Ok((domain.to_string(), template.to_string()))
        }
        _ => Err(format!("expected DOMAIN=TEMPLATE, got '{s}'")),
    }
}

/// Initialize tracing/logging on stderr; stdout carries results.
fn init_logging(log_level: &str, json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_context(path: Option<&Path>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Object(Default::default()));
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse context file {}", path.display()))
}

async fn apply(args: ApplyArgs, config: &ConfmgrConfig) -> Result<ExitCode> {
    let context = read_context(args.context.as_deref())?;
    let env = args
        .env
        .unwrap_or_else(|| config.templates.default_env.clone());

    let mut request = ApplyRequest::new(env, context)
        .dry_run(args.dry_run)
        .reload_on_config_db_change(args.reload || config.config_db.reload_on_change)
        .push_only_if_changes(args.push_only_if_changes || config.bgp.push_only_if_changes);
    request.templates = args.templates;

    let agent: Arc<dyn RemoteAgent> = Arc::new(LocalAgent::new());
    let templating = Arc::new(FileTemplating::new(
        config.templates.root.clone(),
        config.templates.strict,
    ));
    let coordinator = Coordinator::new(agent, templating);

    let aggregate = coordinator.apply(&args.name, &request).await?;
    print_json(&aggregate)?;

    Ok(match aggregate.result {
        Outcome::Failure => ExitCode::FAILURE,
        Outcome::Success | Outcome::Unknown => ExitCode::SUCCESS,
    })
}

fn diff(reference: &Path, candidate: &Path) -> Result<ExitCode> {
    let reference_config = fs::read_to_string(reference)
        .with_context(|| format!("Failed to read {}", reference.display()))?;
    let candidate_config = fs::read_to_string(candidate)
        .with_context(|| format!("Failed to read {}", candidate.display()))?;

    let report = sonic_frr_diff::list_changed_objects(&reference_config, &candidate_config);
    print_json(&report)?;

    Ok(if report.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

async fn show(target: ShowTarget) -> Result<ExitCode> {
    let agent = LocalAgent::new();

    match target {
        ShowTarget::Snmp => print_json(&readers::snmp_config(&agent).await?)?,
        ShowTarget::ConfigDb => print_json(&readers::configdb(&agent).await?)?,
        ShowTarget::RunningConfigDb => print_json(&readers::running_configdb(&agent).await?)?,
        ShowTarget::BgpRunning => print!("{}", readers::bgp_running_config(&agent).await?),
        ShowTarget::BgpStartup => print!("{}", readers::bgp_startup_config(&agent).await?),
        ShowTarget::RouteMaps => print_json(&readers::route_maps(&agent).await?)?,
        ShowTarget::BgpNeighbors { neighbor, raw } if raw => {
            print_json(&bgp_neighbors::bgp_neighbors_raw(&agent, neighbor).await?)?
        }
        ShowTarget::BgpNeighbors { neighbor, .. } => {
            print_json(&bgp_neighbors::bgp_neighbors(&agent, neighbor).await?)?
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run(cli: Cli, config: ConfmgrConfig) -> Result<ExitCode> {
    match cli.command {
        Command::Apply(args) => apply(args, &config).await,
        Command::Diff {
            reference,
            candidate,
        } => diff(&reference, &candidate),
        Command::Show(target) => show(target).await,
    }
}

fn load_config(path: &Path) -> Result<ConfmgrConfig> {
    let config = ConfmgrConfig::load_or_default(path)?;
    if let Err(e) = config.validate() {
        bail!("{}: {}", path.display(), e);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("confmgrd: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&log_level, config.logging.json);

    info!(config = %cli.config.display(), "Starting confmgrd");

    match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            error!("confmgrd error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template() {
        assert_eq!(
            parse_template("bgp=salt://sonic/frr.conf"),
            Ok(("bgp".to_string(), "salt://sonic/frr.conf".to_string()))
        );
        assert!(parse_template("bgp").is_err());
        assert!(parse_template("=frr.conf").is_err());
    }

    #[test]
    fn test_cli_apply() {
        let cli = Cli::try_parse_from([
            "confmgrd",
            "apply",
            "-t",
            "bgp=frr.conf",
            "--template",
            "snmp=snmp.yml",
            "--dry-run",
        ])
        .unwrap();

        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(args.templates.len(), 2);
        assert_eq!(args.templates[1].0, "snmp");
        assert!(args.dry_run);
        assert!(!args.reload);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_cli_apply_requires_template() {
        assert!(Cli::try_parse_from(["confmgrd", "apply"]).is_err());
    }

    #[test]
    fn test_cli_show_neighbor() {
        let cli = Cli::try_parse_from([
            "confmgrd",
            "show",
            "bgp-neighbors",
            "192.0.2.1",
            "--raw",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(
            cli.command,
            Command::Show(ShowTarget::BgpNeighbors { neighbor: Some(_), raw: true })
        ));
    }

    #[test]
    fn test_read_context_defaults_to_empty() {
        assert_eq!(read_context(None).unwrap(), serde_json::json!({}));
    }
}
