mod cli;
mod commands;
mod console;

use std::io;
use std::process::ExitCode;
use std::rc::Rc;

use ba_admin_core::{AdminSession, SessionDeps};
use ba_admin_core::clock::SystemClock;
use ba_http_client::ReqwestTransport;
use ba_storage::RocksDbSlotStore;
use clap::Parser;
use tracing::info;

use crate::cli::Cli;
use crate::console::{ConsoleNotifier, ConsoleView};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let slots = RocksDbSlotStore::open_default(&cli.state_dir)?;
    let transport = ReqwestTransport::new(cli.base_url.clone());
    info!(base_url = transport.base_url(), state_dir = %cli.state_dir, "starting");

    let session = AdminSession::new(SessionDeps {
        slots: Rc::new(slots),
        transport: Rc::new(transport),
        view: Rc::new(ConsoleView::new(io::stdout(), cli.command.server_filter())),
        notifier: Rc::new(ConsoleNotifier::new(io::stdout())),
        clock: Rc::new(SystemClock),
    });

    let ok = commands::run(&session, cli.command).await?;
    session.teardown();
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
