mod gateway;

pub use gateway::StaticGateway;

use std::sync::Arc;

use anyhow::Result;
use pingora::prelude::*;
use pingora::server::configuration::ServerConf;
use pingora::server::Server;

use crate::config::ServeConfig;
use crate::pipeline::Pipeline;

/// Run the HTTP server with the given configuration. Blocks forever.
pub fn run(config: ServeConfig) -> Result<()> {
    let server = build_server(config)?;
    server.run_forever();
}

/// Build the Pingora server hosting the static gateway.
pub fn build_server(config: ServeConfig) -> Result<Server> {
    let mut server = if let Some(threads) = config.threads {
        let mut conf = ServerConf::new().expect("Could not construct pingora server configuration");
        conf.threads = threads;
        Server::new_with_opt_and_conf(None, conf)
    } else {
        // "None" is required here to truly tell Pingora to use its
        // default settings.
        Server::new(None)?
    };

    server.bootstrap();

    let listen = config.listen.clone();
    let pipeline = Arc::new(Pipeline::new(config)?);
    let gateway = StaticGateway { pipeline };

    let mut svc = http_proxy_service(&server.configuration, gateway);
    svc.add_tcp(&listen);
    server.add_service(svc);

    Ok(server)
}
