//! Process bootstrap shared by warmpool binaries
//!
//! Loads `.env` files and installs the tracing subscriber. Both are global,
//! once-per-process concerns.

pub mod init;
pub mod logging;

pub use init::initialize_environment;
pub use logging::{build_env_filter, init_tracing};
