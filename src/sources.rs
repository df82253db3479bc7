use anyhow::Result;

use crate::config::Config;

pub fn list_sources(config: &Config) -> Result<()> {
    println!("{:<12} {:<40} HEALTHY", "CONNECTOR", "STATUS");

    match &config.connectors.json {
        Some(json) => {
            let healthy = json.path.exists();
            let status = if healthy {
                format!("OK ({})", json.path.display())
            } else {
                "NOT CONFIGURED (export file does not exist)".to_string()
            };
            println!("{:<12} {:<40} {}", "json", status, healthy);
        }
        None => println!("{:<12} {:<40} {}", "json", "NOT CONFIGURED", false),
    }

    match &config.connectors.html {
        Some(html) => {
            let healthy = html.path.exists();
            let status = if healthy {
                format!("OK ({})", html.path.display())
            } else {
                "NOT CONFIGURED (page does not exist)".to_string()
            };
            println!("{:<12} {:<40} {}", "html", status, healthy);
        }
        None => println!("{:<12} {:<40} {}", "html", "NOT CONFIGURED", false),
    }

    Ok(())
}
