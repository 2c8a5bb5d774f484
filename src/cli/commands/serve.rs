//! Server commands.

use console::style;

use crate::config::Settings;

/// Start the catalog API server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind, 8000)?;

    println!("{} Preparing database...", style("→").cyan());
    let ctx = settings.create_db_context();
    match ctx.init_schema().await {
        Ok(()) => println!("  {} Database ready", style("✓").green()),
        Err(e) => {
            eprintln!("  {} Schema setup failed: {}", style("✗").red(), e);
            return Err(anyhow::anyhow!("Database setup failed: {}", e));
        }
    }

    println!(
        "{} Starting catalog API at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Public API: /api, admin API: /admin (X-API-Key required)");
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Serve the generated static site.
pub async fn cmd_serve_static(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind, 8001)?;
    serve_static_dir(settings, &host, port).await
}

pub(super) async fn serve_static_dir(
    settings: &Settings,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    println!(
        "{} Serving {} at http://{}:{}",
        style("→").cyan(),
        settings.static_dir.display(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve_static(&settings.static_dir, host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "8000" -> 127.0.0.1:8000
/// - Just a host: "0.0.0.0" -> 0.0.0.0:{default_port}
/// - Host and port: "0.0.0.0:8000" -> 0.0.0.0:8000
pub(super) fn parse_bind_address(bind: &str, default_port: u16) -> anyhow::Result<(String, u16)> {
    if bind.is_empty() {
        anyhow::bail!("Bind address is empty");
    }

    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    Ok((bind.to_string(), default_port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(
            parse_bind_address("9000", 8000).unwrap(),
            ("127.0.0.1".to_string(), 9000)
        );
        assert_eq!(
            parse_bind_address("0.0.0.0", 8000).unwrap(),
            ("0.0.0.0".to_string(), 8000)
        );
        assert_eq!(
            parse_bind_address("localhost:8001", 8000).unwrap(),
            ("localhost".to_string(), 8001)
        );
        assert!(parse_bind_address("", 8000).is_err());
    }
}
