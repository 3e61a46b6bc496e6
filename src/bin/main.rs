// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result, bail};
use bank_ledger::api::{AppState, create_router, with_static_dir};
use bank_ledger::statement::write_statement;
use bank_ledger::{JsonFileGateway, LedgerService, ServiceConfig};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bank Ledger - account, ledger and transfer service
///
/// Keeps every account and ledger in a single JSON snapshot file, seeded with
/// demo data on first start.
#[derive(Parser, Debug)]
#[command(name = "bank-ledger")]
#[command(about = "A retail-banking ledger service", long_about = None)]
struct Args {
    /// Path to the JSON snapshot file
    #[arg(long, global = true, env = "BANK_DATA_FILE", default_value = "database.json")]
    data_file: PathBuf,

    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,

    /// Print an account's CSV statement to stdout
    Statement {
        /// Account number
        account: String,
    },

    /// Check the running-balance invariant of every ledger
    Verify,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, global = true, env = "BANK_BIND", default_value = "127.0.0.1:3001")]
    bind: SocketAddr,

    /// Directory of static front-end files to serve at `/`
    #[arg(long, global = true, env = "BANK_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Reject transfers to accounts that do not exist
    #[arg(long, global = true, env = "BANK_STRICT_TRANSFERS")]
    strict_transfers: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bank_ledger=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let gateway = JsonFileGateway::new(&args.data_file);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(gateway, args.serve).await,
        Command::Statement { account } => {
            let service = LedgerService::open(gateway);
            let entries = service.transactions(&account);
            write_statement(&entries, std::io::stdout().lock())
                .context("failed to write statement")?;
            Ok(())
        }
        Command::Verify => {
            let service = LedgerService::open(gateway);
            if let Err(e) = service.verify() {
                error!(error = %e, "ledger verification failed");
                bail!(e);
            }
            info!(accounts = service.list_accounts().len(), "all ledgers consistent");
            Ok(())
        }
    }
}

async fn serve(gateway: JsonFileGateway, args: ServeArgs) -> Result<()> {
    let config = ServiceConfig {
        strict_transfers: args.strict_transfers,
    };
    let service = Arc::new(LedgerService::with_config(gateway, config));

    let mut app = create_router(AppState::new(Arc::clone(&service)));
    if let Some(dir) = args.static_dir {
        info!(dir = %dir.display(), "serving static files");
        app = with_static_dir(app, dir);
    }

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!("Bank ledger API running on http://{}", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    service.flush().context("failed to flush snapshot on shutdown")?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
