use logsink_core::query::{QueryResponse, StatusResponse};
use owo_colors::OwoColorize;

pub fn print_query_human(v: &QueryResponse) {
    for row in &v.logs {
        println!(
            "#{} {} {} {} | {} (received {})",
            row.id,
            row.timestamp,
            row.service.cyan(),
            severity_label(&row.severity),
            row.message,
            row.received_at.bright_black()
        );
    }
    println!("-- {} matches --", v.count);
}

pub fn print_status_human(v: &StatusResponse) {
    println!("db_path={}", v.db_path);
    println!("db_size_bytes={}", v.db_size_bytes);
    println!("logs={}", v.logs_count);
    if let Some(oldest) = &v.oldest_received_at {
        println!("oldest_received_at={oldest}");
    }
    if let Some(newest) = &v.newest_received_at {
        println!("newest_received_at={newest}");
    }
}

// Only the common labels get a color.
fn severity_label(severity: &str) -> String {
    match severity.to_ascii_uppercase().as_str() {
        "DEBUG" | "TRACE" => severity.bright_black().to_string(),
        "INFO" => severity.green().to_string(),
        "WARN" | "WARNING" => severity.yellow().to_string(),
        "ERROR" => severity.red().to_string(),
        "CRITICAL" | "FATAL" => severity.magenta().to_string(),
        _ => severity.to_string(),
    }
}
