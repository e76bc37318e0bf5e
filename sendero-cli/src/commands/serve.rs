//! Implementation of the `sendero serve` command.

use crate::colors;
use colored::Colorize;
use sendero::api;
use sendero::config::{ServerConfig, load_dotenv};
use sendero::introspection::ROUTES_PATH;
use sendero::observability::TracingConfig;

/// Command line overrides for the server configuration.
#[derive(Default)]
pub struct ServeConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub json_logs: bool,
    pub no_introspection: bool,
}

/// Execute the `serve` command.
pub fn execute(config: ServeConfig) -> Result<(), String> {
    load_dotenv();

    let env = ServerConfig::from_env().map_err(|e| e.to_string())?;
    let server = resolve(env, config);
    TracingConfig::new().json(server.log_json).init();

    print_startup(&server);

    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| format!("Failed to start runtime: {}", e))?;
    let addr = server.addr();

    runtime
        .block_on(
            api::app()
                .with_introspection(server.introspection)
                .listen(&addr),
        )
        .map_err(|e| format!("Server on {} failed: {}", addr, e))
}

/// Flags on top of the configuration read from the environment.
fn resolve(mut server: ServerConfig, config: ServeConfig) -> ServerConfig {
    if let Some(host) = config.host {
        server.host = host;
    }
    if let Some(port) = config.port {
        server.port = port;
    }
    if config.json_logs {
        server.log_json = true;
    }
    if config.no_introspection {
        server.introspection = false;
    }

    server
}

fn print_startup(server: &ServerConfig) {
    let url = format!("http://{}", server.addr());

    println!();
    println!(
        "  {} {}",
        "Sendero".custom_color(colors::mauve()).bold(),
        env!("CARGO_PKG_VERSION").custom_color(colors::subtext())
    );
    println!();
    println!(
        "  {} {}",
        "Serving at".custom_color(colors::subtext()),
        url.custom_color(colors::sky())
    );
    if server.introspection {
        println!(
            "  {} {}{}",
            "Routes at ".custom_color(colors::subtext()),
            url.custom_color(colors::sky()),
            ROUTES_PATH.custom_color(colors::sky())
        );
    }
    println!();
}
