//! WhatsApp Web fallback - schedules a send through the desktop browser

use super::DeliveryChannel;
use crate::config::Config;
use crate::contacts::{has_country_code, phone_digits};
use crate::error::{Error, Result};
use chrono::{Local, NaiveTime, Timelike};
use reqwest::Url;
use std::process::Command;
use std::thread;
use std::time::Duration;
use tracing::info;

const WHATSAPP_WEB_SEND: &str = "https://web.whatsapp.com/send";
const SECONDS_PER_DAY: i64 = 86_400;

/// Wall-clock send time and page-load wait
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendSchedule {
    pub hour: u32,
    pub minute: u32,
    pub wait_time: u64,
}

/// Concrete timing for one send, relative to the moment it was planned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendPlan {
    /// How long to sleep before opening the browser
    pub delay: Duration,
    /// How long the page gets to load before the message is submitted
    pub wait: Duration,
}

impl SendSchedule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            hour: config.send_hour,
            minute: config.send_minute,
            wait_time: config.wait_time,
        }
    }

    /// Plan a send at `hour:minute` as seen from `now`.
    ///
    /// A time already passed today means the same time tomorrow. The target
    /// must leave at least `wait_time` seconds for WhatsApp Web to load.
    pub fn plan(&self, now: NaiveTime) -> Result<SendPlan> {
        let target = NaiveTime::from_hms_opt(self.hour, self.minute, 0).ok_or_else(|| {
            Error::Config(format!("invalid send time {}:{}", self.hour, self.minute))
        })?;

        let remaining = (i64::from(target.num_seconds_from_midnight())
            - i64::from(now.num_seconds_from_midnight()))
        .rem_euclid(SECONDS_PER_DAY) as u64;

        if remaining < self.wait_time {
            return Err(Error::Fallback(format!(
                "call time {:02}:{:02} is {}s away, must be greater than wait time ({}s)",
                self.hour, self.minute, remaining, self.wait_time
            )));
        }

        Ok(SendPlan {
            delay: Duration::from_secs(remaining - self.wait_time),
            wait: Duration::from_secs(self.wait_time),
        })
    }
}

/// WhatsApp Web URL that opens a chat with the message prefilled
pub fn whatsapp_web_url(recipient: &str, message: &str) -> Result<Url> {
    Url::parse_with_params(
        WHATSAPP_WEB_SEND,
        &[("phone", phone_digits(recipient).as_str()), ("text", message)],
    )
    .map_err(|e| Error::Fallback(format!("bad WhatsApp Web URL: {}", e)))
}

/// Something that can carry out a planned WhatsApp Web send
pub trait AutomationTrigger {
    fn trigger(&self, url: &Url, plan: &SendPlan) -> Result<()>;
}

/// Opens the URL with a local program, waits for the page, then optionally
/// runs a submit command (e.g. a synthetic Enter key press).
#[derive(Debug, Clone)]
pub struct SystemTrigger {
    browser_command: String,
    submit_command: Option<Vec<String>>,
}

impl SystemTrigger {
    pub fn new(browser_command: impl Into<String>, submit_command: Option<Vec<String>>) -> Self {
        Self {
            browser_command: browser_command.into(),
            submit_command,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.browser_command.clone(), config.submit_command.clone())
    }
}

fn run_command(program: &str, args: &[String]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| Error::Fallback(format!("{}: {}", program, e)))?;

    if !status.success() {
        return Err(Error::Fallback(format!("{} exited with {}", program, status)));
    }
    Ok(())
}

impl AutomationTrigger for SystemTrigger {
    fn trigger(&self, url: &Url, plan: &SendPlan) -> Result<()> {
        info!(
            "In {}s WhatsApp Web will open, message goes out {}s later",
            plan.delay.as_secs(),
            plan.wait.as_secs()
        );
        thread::sleep(plan.delay);

        run_command(&self.browser_command, &[url.to_string()])?;
        thread::sleep(plan.wait);

        if let Some((program, args)) = self.submit_command.as_ref().and_then(|c| c.split_first()) {
            run_command(program, args)?;
        }
        Ok(())
    }
}

/// Fallback channel. Failures are returned to the caller like any other channel's.
pub struct BrowserChannel<T: AutomationTrigger> {
    schedule: SendSchedule,
    trigger: T,
    clock: fn() -> NaiveTime,
}

fn local_time() -> NaiveTime {
    Local::now().time()
}

impl<T: AutomationTrigger> BrowserChannel<T> {
    pub fn new(schedule: SendSchedule, trigger: T) -> Self {
        Self {
            schedule,
            trigger,
            clock: local_time,
        }
    }

    /// Replace the time-of-day source
    pub fn with_clock(mut self, clock: fn() -> NaiveTime) -> Self {
        self.clock = clock;
        self
    }
}

impl<T: AutomationTrigger> DeliveryChannel for BrowserChannel<T> {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn send(&self, recipient: &str, message: &str, dry_run: bool) -> Result<()> {
        let SendSchedule { hour, minute, .. } = self.schedule;

        if dry_run {
            info!(
                "[DRY-RUN][BROWSER] Would send to {} at {:02}:{:02}",
                recipient, hour, minute
            );
            return Ok(());
        }

        if !has_country_code(recipient) {
            return Err(Error::Fallback(format!(
                "{} has no country code (expected a leading '+')",
                recipient
            )));
        }

        let plan = self.schedule.plan((self.clock)())?;
        let url = whatsapp_web_url(recipient, message)?;
        self.trigger.trigger(&url, &plan)?;

        info!(
            "Fallback message scheduled to {} at {:02}:{:02}",
            recipient, hour, minute
        );
        info!("Keep WhatsApp Web open in browser.");
        Ok(())
    }
}
