use tracing_subscriber::EnvFilter;

mod console;
pub mod plugins;
pub mod services;

pub use plugins::session::{
    Conversation, DashboardLinks, Job, JobStatus, Message, SessionState, UploadedFile,
};
pub use services::api::{ApiError, DashboardApi, HttpDashboardApi};
pub use services::config::{load_client_config, ClientConfig};
pub use services::session::{SessionManager, SessionSnapshot};

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() {
    init_logging();
    let config = load_client_config();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Failed to start async runtime: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(console::run_console(config)) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
