use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding the log level or filter spec.
pub const LOG_ENV: &str = "SURFACE_LOG";

const CRATES: [&str; 3] = ["surface_openapi", "surface_model", "surface_protoc"];

/// Install a stderr subscriber. stdout is reserved for plugin responses.
pub fn init_tracing() {
    // SURFACE_LOG controls log level: "trace", "debug", "info", "warn", "error"
    // or a full tracing filter spec like "surface_model=debug"
    let filter = filter_spec(std::env::var(LOG_ENV).ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn filter_spec(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(level) if is_plain_level(level) => CRATES
            .iter()
            .map(|krate| format!("{krate}={level}"))
            .collect::<Vec<_>>()
            .join(","),
        Some(spec) if !spec.is_empty() => spec.to_string(),
        _ => "warn".to_string(),
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
