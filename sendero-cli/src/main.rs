//! Sendero CLI: serves the tutorial API and lists its routes.

mod colors;
mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "sendero")]
#[command(author, version, about = "Serve the Sendero tutorial API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display version information
    Version,
    /// Start the HTTP server
    Serve {
        /// Port to listen on [env: SENDERO_PORT, default: 8000]
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to [env: SENDERO_HOST, default: 127.0.0.1]
        #[arg(long)]
        host: Option<String>,
        /// Emit logs as JSON lines
        #[arg(long)]
        json_logs: bool,
        /// Do not serve the route table at /__sendero/routes
        #[arg(long)]
        no_introspection: bool,
    },
    /// List the routes in the order they are tried
    Routes,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        Some(Commands::Serve {
            port,
            host,
            json_logs,
            no_introspection,
        }) => commands::serve::execute(commands::serve::ServeConfig {
            host,
            port,
            json_logs,
            no_introspection,
        }),
        Some(Commands::Routes) => commands::routes::execute(),
        None => {
            print_banner();
            println!();
            println!("Run {} for usage information.", "sendero --help".cyan());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!();
    println!("{}", "  ╭─────────────────────────────────────╮".bright_magenta());
    println!("{}", "  │                                     │".bright_magenta());
    println!(
        "{}{}{}",
        "  │".bright_magenta(),
        "             Sendero CLI             ".bold(),
        "│".bright_magenta()
    );
    println!("{}", "  │                                     │".bright_magenta());
    println!("{}", "  ╰─────────────────────────────────────╯".bright_magenta());
}

fn print_version() {
    println!("sendero-cli {}", env!("CARGO_PKG_VERSION"));
}
