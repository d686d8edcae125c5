use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// JSON logs on stderr so stdout carries only check results.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ai_healthcheck=info,az_ai_healthcheck=info")),
        )
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();
}
