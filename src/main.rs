#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Restriction lints
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::deref_by_slicing,
    clippy::if_then_some_else_none,
    clippy::undocumented_unsafe_blocks,
    clippy::unnecessary_cast,
    clippy::unnecessary_safety_comment
)]
// False positives
#![allow(clippy::needless_pass_by_value)] // for dptree handlers
// Style
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::redundant_closure_for_method_calls)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use argh::FromArgs;
use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
use teloxide::requests::Requester;
use teloxide::types::{CallbackQuery, Update};
use teloxide::Bot;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::metrics::Metrics;
use crate::utils::{AddressApi, SqsQueue};

mod common;
mod config;
mod db;
mod metrics;
mod models;
mod modules;
mod schema;
mod utils;
mod web_srv;

/// outage-bot
#[derive(FromArgs, PartialEq, Debug)]
struct Args {
    #[argh(option, hidden_help = true, long = "-set-revision")]
    set_revision: Option<String>,

    #[argh(subcommand)]
    subcommand: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Run(SubCommandRun),
}

/// run the bot and the queue poller
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "run")]
struct SubCommandRun {
    /// config file; the environment is read when omitted
    #[argh(option)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();
    let args: Args = argh::from_env();
    let revision = args.set_revision.unwrap_or_else(|| {
        git_version::git_version!(fallback = "unknown").to_string()
    });
    log::info!("Version {revision}");
    match args.subcommand {
        SubCommand::Run(c) => run_bot(c.config.as_deref(), &revision).await?,
    }
    Ok(())
}

async fn run_bot(config_file: Option<&Path>, revision: &str) -> Result<()> {
    let config = match config_file {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::from_env()?,
    };

    let metrics = Arc::new(Metrics::new(revision));
    let pool = db::create_pool(&config.db.url, config.db.pool_size);

    let bot_env = Arc::new(common::BotEnv {
        pool: pool.clone(),
        address_api: AddressApi::new(
            reqwest::Client::new(),
            &config.services.address_api.url,
        )?,
        metrics: Arc::clone(&metrics),
    });

    let bot = Bot::new(&config.telegram.token);
    bot.set_my_commands(modules::basic::menu())
        .await
        .context("Failed to set bot commands")?;

    let listener = web_srv::bind(config.server_addr).await?;
    let queue = SqsQueue::connect(&config.queue).await;

    let mut dispatcher = Dispatcher::builder(
        bot.clone(),
        dptree::entry()
            .branch(
                Update::filter_message()
                    .branch(modules::basic::command_handler())
                    .endpoint(drop_endpoint),
            )
            .branch(
                Update::filter_callback_query()
                    .branch(modules::subscriptions::callback_handler())
                    .endpoint(drop_callback_query),
            )
            .endpoint(drop_endpoint),
    )
    .dependencies(dptree::deps![Arc::clone(&bot_env)])
    // One update at a time, in arrival order.
    .distribution_function(|_| Some(()))
    .build();
    let bot_shutdown_token = dispatcher.shutdown_token().clone();
    let mut join_handles = Vec::new();
    join_handles.push(tokio::spawn(async move { dispatcher.dispatch().await }));

    let cancel = CancellationToken::new();

    let poller = modules::outages::Poller {
        queue,
        subscribers: pool,
        notifier: bot,
        metrics: Arc::clone(&metrics),
        retry_delay: Duration::from_secs(config.queue.retry_delay_seconds),
    };
    let poller_cancel = cancel.clone();
    join_handles
        .push(tokio::spawn(async move { poller.run(poller_cancel).await }));

    join_handles.push(tokio::spawn(web_srv::run(
        listener,
        metrics,
        cancel.clone(),
    )));

    run_signal_handler(bot_shutdown_token, cancel);

    futures::future::join_all(join_handles).await;

    Ok(())
}

async fn drop_callback_query(callback_query: CallbackQuery) -> Result<()> {
    log::warn!(
        "Unexpected callback data {:?} from {}",
        callback_query.data,
        callback_query.from.id.0
    );
    Ok(())
}

async fn drop_endpoint() -> Result<()> {
    Ok(())
}

fn run_signal_handler(
    bot_shutdown_token: teloxide::dispatching::ShutdownToken,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for SIGINT: {e}");
                return;
            }
            cancel.cancel();
            match bot_shutdown_token.shutdown() {
                #[allow(
                    clippy::redundant_pub_crate,
                    // reason = "https://github.com/rust-lang/rust-clippy/issues/10636"
                )]
                Ok(f) => {
                    log::info!(
                        "^C received, trying to shutdown the dispatcher..."
                    );
                    tokio::select! {
                        () = f => {
                            log::info!("dispatcher is shutdown...");
                        }
                        _ = tokio::signal::ctrl_c() => {
                            log::info!("Got another ^C, exiting immediately");
                            std::process::exit(0);
                        }
                    }
                }
                Err(_) => {
                    log::info!("^C received, the dispatcher isn't running, ignoring the signal");
                }
            }
        }
    });
}
