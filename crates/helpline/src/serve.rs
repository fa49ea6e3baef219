// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` subcommand: wire components and run the gateway until a
//! shutdown signal arrives.

use tokio_util::sync::CancellationToken;
use tracing::info;

use helpline_config::HelplineConfig;
use helpline_core::HelplineError;
use helpline_gateway::{start_server, GatewayState, ServerConfig};

use crate::app::App;

pub async fn run(config: HelplineConfig) -> Result<(), HelplineError> {
    let app = App::build(&config).await?;

    let state = GatewayState {
        orchestrator: app.orchestrator.clone(),
        quality: app.quality.clone(),
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    start_server(&server_config, state, cancel).await?;

    app.shutdown().await?;
    info!("helpline stopped");
    Ok(())
}
