// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod reporter;
pub mod runtime;
pub mod ui;
pub mod util;
pub mod vocabulary;

pub use error::{Error, Result};
