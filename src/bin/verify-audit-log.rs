use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Arg, ArgAction, Command};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use audit_verifier::audit::{
    exit_code, verify_log_file, GenesisPolicy, RunOptions, VerificationReportBuilder,
    EXIT_COULD_NOT_RUN,
};
use audit_verifier::config::VerifierConfig;

struct CliOptions {
    log_path: String,
    anchored_at: Option<String>,
    genesis_policy: GenesisPolicy,
    run: RunOptions,
    stamp: bool,
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let matches = Command::new("verify-audit-log")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Verify audit log hash chain integrity and compute its Merkle root")
        .arg(
            Arg::new("log-path")
                .short('l')
                .long("log-path")
                .value_name("PATH")
                .help("Path to audit log file (JSON array or JSON Lines)"),
        )
        .arg(
            Arg::new("merkle-root")
                .short('m')
                .long("merkle-root")
                .value_name("HASH")
                .help("Expected Merkle root hash"),
        )
        .arg(
            Arg::new("anchored-at")
                .long("anchored-at")
                .value_name("TIMESTAMP")
                .help("Anchoring timestamp to carry into the report"),
        )
        .arg(
            Arg::new("strict-genesis")
                .long("strict-genesis")
                .action(ArgAction::SetTrue)
                .help("Flag a non-empty prevHash on the first entry"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .action(ArgAction::SetTrue)
                .help("Hash entries on parallel tasks"),
        )
        .arg(
            Arg::new("stamp")
                .long("stamp")
                .action(ArgAction::SetTrue)
                .help("Include a report generation timestamp in the output"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose output"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppress output except errors"),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let quiet = matches.get_flag("quiet");

    let default_filter = if quiet {
        "audit_verifier=error"
    } else if verbose {
        "audit_verifier=debug"
    } else {
        "audit_verifier=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = match resolve_options(&matches, quiet) {
        Ok(options) => options,
        Err(e) => {
            error!("Audit log verification could not run: {:#}", e);
            std::process::exit(EXIT_COULD_NOT_RUN);
        }
    };

    let builder = VerificationReportBuilder::new()
        .anchored_at(options.anchored_at.clone())
        .genesis_policy(options.genesis_policy);

    let run_options = RunOptions {
        generated_at: options.stamp.then(Utc::now),
        ..options.run.clone()
    };

    let outcome = verify_log_file(&options.log_path, &builder, &run_options).await;
    let mut code = exit_code(&outcome);

    if let Ok(export) = &outcome {
        if !options.quiet {
            match export.to_json_pretty() {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    error!("Failed to render report: {}", e);
                    code = EXIT_COULD_NOT_RUN;
                }
            }
        }
    }

    std::process::exit(code);
}

fn resolve_options(matches: &clap::ArgMatches, quiet: bool) -> Result<CliOptions> {
    let config = VerifierConfig::load().context("Failed to load configuration")?;

    let log_path = matches
        .get_one::<String>("log-path")
        .cloned()
        .or(config.log_path)
        .ok_or_else(|| anyhow!("No audit log given: pass --log-path or set AUDIT_LOG_PATH"))?;

    let genesis_policy = if matches.get_flag("strict-genesis") {
        GenesisPolicy::Strict
    } else {
        config.genesis_policy
    };

    Ok(CliOptions {
        log_path,
        anchored_at: matches
            .get_one::<String>("anchored-at")
            .cloned()
            .or(config.anchored_at),
        genesis_policy,
        run: RunOptions {
            expected_merkle_root: matches
                .get_one::<String>("merkle-root")
                .cloned()
                .or(config.expected_merkle_root),
            parallel: matches.get_flag("parallel") || config.parallel_hashing,
            generated_at: None,
        },
        stamp: matches.get_flag("stamp"),
        quiet,
    })
}
