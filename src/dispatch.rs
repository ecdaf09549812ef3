//! Delivery orchestration - one run over the whole contact list

use crate::alert::{LogNotifier, Notifier};
use crate::channel::{self, DeliveryChannel};
use crate::config::{Config, ConfigSource};
use crate::contacts::read_contacts;
use crate::error::{Error, Result};
use crate::logging;
use crate::message::read_message;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Command-line level inputs for a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    /// Overrides `default_message_file`
    pub message: Option<PathBuf>,
    /// Overrides `default_contacts_file`
    pub contacts: Option<PathBuf>,
    pub dry_run: bool,
}

/// Outcome of the recipient loop
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
    /// (recipient, error description)
    pub failures: Vec<(String, String)>,
}

/// Send `message` to every contact in order. A failing recipient is logged and
/// alerted, then the loop moves on.
pub fn send_all(
    channel: &dyn DeliveryChannel,
    notifier: &dyn Notifier,
    contacts: &[String],
    message: &str,
    dry_run: bool,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for recipient in contacts {
        report.attempted += 1;

        match channel.send(recipient, message, dry_run) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                error!("Failed to send to {} via {}: {}", recipient, channel.name(), e);
                notifier.notify("Send failure", &format!("{}: {}", recipient, e));
                report.failures.push((recipient.clone(), e.to_string()));
            }
        }
    }

    info!(
        "Run complete: {} attempted, {} sent, {} failed",
        report.attempted,
        report.delivered,
        report.failures.len()
    );
    report
}

/// Message and contacts file paths, CLI overrides first
pub fn resolve_paths(config: &Config, opts: &RunOptions) -> (PathBuf, PathBuf) {
    let message = opts
        .message
        .clone()
        .unwrap_or_else(|| config.default_message_file.clone());
    let contacts = opts
        .contacts
        .clone()
        .unwrap_or_else(|| config.default_contacts_file.clone());
    (message, contacts)
}

/// Read the message, then the contacts. An empty contact list is alerted
/// before it is returned as an error.
pub fn load_inputs(
    message_path: &Path,
    contacts_path: &Path,
    notifier: &dyn Notifier,
) -> Result<(String, Vec<String>)> {
    let message = read_message(message_path)?;

    let contacts = match read_contacts(contacts_path) {
        Ok(contacts) => contacts,
        Err(e @ Error::EmptyContacts(_)) => {
            error!("Contacts file is empty.");
            notifier.notify("Empty contact file", "No recipients found.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    info!(
        "Loaded message ({} chars) and {} contacts",
        message.chars().count(),
        contacts.len()
    );
    Ok((message, contacts))
}

/// Everything after logging is up: inputs, channel, recipient loop
pub fn run_with_config(
    config: &Config,
    source: &ConfigSource,
    opts: &RunOptions,
) -> Result<DispatchReport> {
    if let ConfigSource::Defaults(path) = source {
        warn!("Config {} not found, using defaults.", path.display());
    }
    if opts.dry_run {
        info!("Dry run: nothing will be sent");
    }

    let notifier = LogNotifier::new(config.alert_email.clone());
    let (message_path, contacts_path) = resolve_paths(config, opts);
    let (message, contacts) = load_inputs(&message_path, &contacts_path, &notifier)?;

    let channel = channel::from_config(config)?;
    info!("Sending via {} channel", channel.name());

    Ok(send_all(
        channel.as_ref(),
        &notifier,
        &contacts,
        &message,
        opts.dry_run,
    ))
}

/// Full run: load config, set up logging, then dispatch with that logger in scope
pub fn run(opts: &RunOptions) -> Result<DispatchReport> {
    let (config, source) = Config::load(&opts.config_path, Local::now().time())?;
    let dispatch = logging::init(&config.log_file)?;

    tracing::dispatcher::with_default(&dispatch, || run_with_config(&config, &source, opts))
}
