//! WhatsApp Dispatch - send one message to a list of contacts
//!
//! Delivers through the WhatsApp Business API, or, when the API is disabled,
//! through a scheduled WhatsApp Web send in the local browser. Each recipient
//! is handled independently: a failure is logged and alerted, and the run
//! continues with the next contact.

pub mod alert;
pub mod channel;
pub mod config;
pub mod contacts;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod message;

pub use error::{Error, Result};
