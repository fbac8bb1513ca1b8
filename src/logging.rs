/// Initializes structured logging for binaries and integration harnesses.
///
/// Filtering is controlled through the `RUST_LOG` environment variable:
/// - `RUST_LOG=info` - info, warn, and error messages
/// - `RUST_LOG=debug` - debug and above
/// - `RUST_LOG=drive_thru_core=debug` - debug only for this crate
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("menu loaded");
/// ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
