//! qb-browser: browser collaborator for quizbench
//!
//! Provides the managed Chrome session and the [`TabSnapshot`]
//! implementation of the core's `PageSnapshot` interface. The core never
//! touches the browser directly; connect/launch and tab selection live
//! entirely in this crate.

pub mod error;
pub mod session;
pub mod snapshot;

pub use error::{BrowserError, Result};
pub use session::{BrowserConfig, BrowserConfigBuilder, BrowserSession};
pub use snapshot::TabSnapshot;
