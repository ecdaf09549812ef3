//! Delivery channels
//!
//! Two ways of getting a message to a recipient: the WhatsApp Business API
//! (primary) and a scheduled WhatsApp Web send driven through the browser
//! (fallback). The configuration picks exactly one per run.

pub mod api;
pub mod browser;

use crate::config::Config;
use crate::error::Result;
use std::time::Duration;

pub use api::ApiChannel;
pub use browser::{AutomationTrigger, BrowserChannel, SendPlan, SendSchedule, SystemTrigger};

/// Send one message to one recipient.
///
/// With `dry_run` set, implementations only log what they would do and must
/// return `Ok(())` without any network or automation side effect.
pub trait DeliveryChannel {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    fn send(&self, recipient: &str, message: &str, dry_run: bool) -> Result<()>;
}

/// Build the channel selected by `use_api`
pub fn from_config(config: &Config) -> Result<Box<dyn DeliveryChannel>> {
    if config.use_api {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        Ok(Box::new(ApiChannel::new(timeout)?))
    } else {
        Ok(Box::new(BrowserChannel::new(
            SendSchedule::from_config(config),
            SystemTrigger::from_config(config),
        )))
    }
}
