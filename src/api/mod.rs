pub mod handlers;
pub mod server;

pub use handlers::{normalize_flight_code, AppState};
pub use server::{build_router, run_server};
