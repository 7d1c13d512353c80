//! Server startup example
//!
//! Initializes logging from the environment the way the MCP server does at
//! startup, quiets third-party libraries and logs from a few subsystems.
//!
//! Run with: LOG_FILE=/tmp/mcp/server.log cargo run --example server_startup

use mcp_server_logging::prelude::*;
use mcp_server_logging::{error, info, warning};

fn connect(pool: &Logger, host: &str, port: u16) -> std::result::Result<(), String> {
    info!(pool, { "host" => host, "port" => u32::from(port) }, "Opening connection pool");
    if port == 0 {
        return Err("invalid port".to_string());
    }
    Ok(())
}

fn main() -> Result<()> {
    println!("=== MCP Server Logging - Startup Example ===\n");

    // LOG_LEVEL, LOG_FILE, LOG_MAX_BYTES, ... are honored; bad values fall
    // back to defaults and are reported as WARNING records
    let root = mcp_server_logging::init_from_env()?;

    // Extra libraries on top of the default set
    mcp_server_logging::suppress_third_party(LogLevel::Error, ["sqlalchemy.engine"]);

    let pool = mcp_server_logging::get_logger(Some("db.pool"));
    let tools = mcp_server_logging::get_logger(Some("tools"));

    if let Err(e) = connect(&pool, "localhost", 3306) {
        error!(pool, "Connection failed: {}", e);
    }

    tools.info_with(
        "Tool registered",
        LogContext::new()
            .with_field("tool", "list_databases")
            .with_field("read_only", true),
    );
    warning!(tools, { "query_ms" => 1520 }, "Slow query on {}", "information_schema.tables");

    // Records from external libraries are filtered by their own floors
    let global = mcp_server_logging::global();
    global.external("uvicorn.access").info("GET /sse 200");
    global.external("uvicorn.error").warning("Shutting down");
    global.external("sqlalchemy.engine").warning("hidden below ERROR");

    root.info("Server ready");

    let metrics = global.metrics();
    println!(
        "\nlogged={} filtered={} dropped={}",
        metrics.total_logged(),
        metrics.filtered_count(),
        metrics.dropped_count()
    );

    mcp_server_logging::shutdown();
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
