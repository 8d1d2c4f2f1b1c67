use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::handlers::tenant_networks::NetworkView;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output networks as a table or as a JSON array
pub fn output_networks(output_format: &OutputFormat, networks: &[NetworkView]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "networks": networks }))?);
        }
        OutputFormat::Text => {
            println!("{:<38} {:<20} {}", "ID", "CIDR", "LABEL");
            println!("{}", "-".repeat(80));
            for network in networks {
                println!(
                    "{:<38} {:<20} {}",
                    network.id.as_deref().unwrap_or("-"),
                    network.cidr,
                    network.label.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}
