//! Serve command - run the HTTP service

use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::error::JlinkResult;
use crate::server;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: &Config) -> JlinkResult<()> {
    let mut config = config.clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    server::serve(&config).await
}
