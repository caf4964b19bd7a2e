//! Output formatting for the CLI.

use auth_session::ApiError;
use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "status": "success", "message": message })
            );
        }
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => {
            eprintln!(
                "{}",
                serde_json::json!({ "status": "error", "message": message })
            );
        }
    }
}

/// Human-readable message for a failed command, preferring the backend's own
/// wording when it sent one.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Unauthorized { .. }) => {
            "Not authorized. Run 'storefront login' and try again".to_string()
        }
        Some(api_err) => match api_err.server_message() {
            Some(message) => format!("{} ({})", message, api_err),
            None => api_err.to_string(),
        },
        None => format!("{:#}", err),
    }
}

/// Print a table row.
pub fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", label), value);
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(50));
}

/// Print a heading.
pub fn print_heading(text: &str) {
    println!("\n{}", text);
    print_divider();
}

pub fn format_price(amount: f64, currency: Option<&str>) -> String {
    match currency {
        Some(currency) => format!("{:.2} {}", amount, currency),
        None => format!("{:.2}", amount),
    }
}

/// RFC 3339 timestamps in local time; anything else is shown as-is.
pub fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(12.5, Some("EUR")), "12.50 EUR");
        assert_eq!(format_price(3.0, None), "3.00");
    }

    #[test]
    fn test_format_timestamp_passthrough() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        let formatted = format_timestamp("2026-03-01T10:00:00Z");
        assert!(formatted.starts_with("2026-03-0"));
    }

    #[test]
    fn test_describe_error_prefers_server_message() {
        let err = anyhow::Error::new(ApiError::Status {
            status: 409,
            path: "/api/orders/o1".to_string(),
            body: json!({"message": "Order already shipped"}),
        });
        assert!(describe_error(&err).starts_with("Order already shipped"));

        let err = anyhow::Error::new(ApiError::Unauthorized {
            path: "/api/cart".to_string(),
            body: json!(null),
        });
        assert!(describe_error(&err).contains("storefront login"));

        let err = anyhow::anyhow!("Email is required");
        assert_eq!(describe_error(&err), "Email is required");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("x")), "x");
    }
}
