mod arg_parser;
mod client_cli;

use anyhow::{Context, Result};
use arg_parser::{ArgParser, SubCommand};
use clap::Parser;
use client_cli::ClientCli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ArgParser::parse();
    let mut client = ClientCli::connect(&args.server)
        .await
        .with_context(|| format!("connecting to {}", args.server))?;

    match args.sub_command {
        SubCommand::Create { job_id } => {
            client.create_job(job_id).await?;
        }
        SubCommand::Transition { job_id, target } => {
            client.transition(job_id, target.into()).await?;
        }
        SubCommand::Get { job_id } => {
            client.get_job(job_id).await?;
        }
        SubCommand::List { state } => {
            client.list_jobs(state.map(Into::into)).await?;
        }
        SubCommand::Remove { job_id } => {
            client.remove_job(job_id).await?;
        }
        SubCommand::Describe { state, locale } => {
            client.describe(state.into(), locale).await?;
        }
        SubCommand::Watch => {
            client.watch().await?;
        }
    }

    Ok(())
}
