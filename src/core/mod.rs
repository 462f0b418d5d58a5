//! Runtime core: orchestration and lifecycle.
//!
//! The public API of this module is [`ProactiveManager`] and its [`ManagerBuilder`].
//!
//! Internal modules:
//! - [`manager`]: run/stop state machine, consumer loop, teardown with grace;
//! - [`pump`]: drains one source into the merge queue;
//! - [`dispatch`]: gate, decision, composition and delivery of one event;
//! - [`builder`]: policy selection and observer wiring;
//! - [`shutdown`]: cross-platform termination signal handling.

mod builder;
mod dispatch;
mod manager;
mod pump;
mod shutdown;


pub use builder::ManagerBuilder;
pub use manager::ProactiveManager;
pub use shutdown::wait_for_shutdown_signal;
