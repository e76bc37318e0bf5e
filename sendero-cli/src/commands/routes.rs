//! Implementation of the `sendero routes` command.

use crate::colors;
use colored::Colorize;
use sendero::api;
use sendero::introspection::RouteInfo;

/// Execute the `routes` command.
pub fn execute() -> Result<(), String> {
    let routes = api::router().routes();
    if routes.is_empty() {
        return Err("No routes are registered".to_string());
    }

    println!();
    println!(
        "  {}",
        "Routes, in the order they are tried"
            .custom_color(colors::mauve())
            .bold()
    );
    println!();

    let width = path_width(&routes);
    for (position, route) in routes.iter().enumerate() {
        println!(
            "  {:>2}  {}  {}  {}",
            (position + 1).to_string().custom_color(colors::subtext()),
            format!("{:<6}", route.method).custom_color(colors::method(&route.method)),
            format!("{:<width$}", route.path),
            route.handler_name.custom_color(colors::subtext())
        );
    }
    println!();

    Ok(())
}

fn path_width(routes: &[RouteInfo]) -> usize {
    routes.iter().map(|r| r.path.len()).max().unwrap_or(0)
}
