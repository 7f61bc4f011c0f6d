//! Platform-independent core of the balance admin page.
//!
//! Everything that touches the outside world goes through a seam:
//! [`ba_storage::SlotStore`] for persistence, [`transport::ApiTransport`] for
//! HTTP, [`view::AdminView`] and [`view::Notifier`] for presentation and
//! [`clock::Clock`] for time. [`session::AdminSession`] ties them together.

pub mod api;
pub mod clock;
pub mod config_store;
pub mod controllers;
pub mod error;
pub mod gateway_cache;
pub mod generation;
pub mod messages;
pub mod resolver;
pub mod server_options;
pub mod session;
pub mod transport;
pub mod validation;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{AdminError, Result};
pub use session::{AdminSession, SessionDeps};
