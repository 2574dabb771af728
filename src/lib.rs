pub mod app;
pub mod calendar;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod rollover;
pub mod state;
pub mod storage;
pub mod timer;
pub mod ui;

pub use app::router;
pub use state::AppState;
pub use storage::{resolve_data_path, Store};
