use std::env;
use std::io;
use std::process::ExitCode;

use split_ledger::csv::{read_operations, write_balances};
use split_ledger::{Amount, Engine, EngineConfig, SelfSharePolicy};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

const USAGE: &str = "usage: split-ledger <operations.csv> [--post-self-share] [--exact-tolerance <amount>]";

#[derive(Debug, PartialEq)]
struct Args {
    path: String,
    config: EngineConfig,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut path = None;
    let mut config = EngineConfig::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--post-self-share" => config = config.with_self_share(SelfSharePolicy::Post),
            "--exact-tolerance" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--exact-tolerance needs a value".to_string())?;
                let tolerance = value
                    .parse::<f64>()
                    .ok()
                    .and_then(Amount::from_float)
                    .ok_or_else(|| format!("invalid tolerance '{value}'"))?;
                config = config.with_exact_tolerance(tolerance);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag '{flag}'")),
            _ if path.is_none() => path = Some(arg.clone()),
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
    }

    Ok(Args {
        path: path.ok_or_else(|| USAGE.to_string())?,
        config,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    if !args.path.ends_with(".csv") {
        warn!(path = %args.path, "input file seems to not be a csv file");
    }

    let operations = match read_operations(args.path.clone()) {
        Ok(operations) => operations,
        Err(e) => {
            error!(path = %args.path, "{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut engine = Engine::new(args.config);
    let (op_sender, op_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in operations {
            match result {
                Ok(op) => {
                    if op_sender.send(op).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    engine.run(ReceiverStream::new(op_receiver)).await;

    if let Err(e) = write_balances(&engine, io::stdout().lock()) {
        error!("failed to write balances: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
