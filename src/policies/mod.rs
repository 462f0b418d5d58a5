//! Decision policies.
//!
//! A policy answers one question for a non-tick event: notify or suppress.
//!
//! ## Contents
//! - [`Decide`] the capability trait
//! - [`RuleStrategy`] keyword rule, used when no oracle is configured
//! - [`OracleStrategy`] binary YES/NO judgment delegated to an [`Oracle`](crate::Oracle)
//!
//! ## Quick wiring
//! ```text
//! ManagerBuilder ─► with_oracle(o)?  ─► OracleStrategy::new(o, cfg.oracle_timeout())
//!                 └► otherwise        ─► RuleStrategy::new(cfg.keywords)
//!                 └► with_policy(p)   ─► custom Decide, overrides both
//! ```
//!
//! ## Rules
//! - Ticks never reach a policy; the manager accepts them unconditionally.
//! - Any `Err` from [`Decide::decide`] means "do not notify" (fail closed).

mod oracle;
mod rule;

use async_trait::async_trait;

use crate::error::DecisionError;
use crate::event::Event;

pub use oracle::{OracleStrategy, SYSTEM_PROMPT};
pub use rule::{DEFAULT_KEYWORDS, RuleStrategy};

/// Notify/suppress judgment for one event.
#[async_trait]
pub trait Decide: Send + Sync + 'static {
    /// Returns `Ok(true)` when `event` deserves a notification.
    async fn decide(&self, event: &Event) -> Result<bool, DecisionError>;

    /// Returns the policy name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
