//! Contact list - one phone number per line

use crate::error::{Error, Result};
use crate::message::read_required_file;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Loose phone shape: optional leading +, then digits with common separators
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ().\-]{5,}[0-9]$").expect("Invalid phone regex")
});

/// Parse contacts from file content: trimmed, blank lines dropped, order kept
pub fn parse_contacts(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the contacts file. An empty list is an error for the whole run.
pub fn read_contacts(path: &Path) -> Result<Vec<String>> {
    let content = read_required_file(path)?;
    let contacts = parse_contacts(&content);

    if contacts.is_empty() {
        return Err(Error::EmptyContacts(path.to_path_buf()));
    }

    for contact in contacts.iter().filter(|c| !looks_like_phone(c)) {
        tracing::warn!("Contact '{}' does not look like a phone number", contact);
    }

    Ok(contacts)
}

/// Check whether a recipient has the shape of a phone number
pub fn looks_like_phone(contact: &str) -> bool {
    PHONE_PATTERN.is_match(contact)
}

/// Whether the number carries an international prefix
pub fn has_country_code(contact: &str) -> bool {
    contact.starts_with('+')
}

/// Strip everything but digits, e.g. for a WhatsApp Web `phone=` parameter
pub fn phone_digits(contact: &str) -> String {
    contact.chars().filter(|c| c.is_ascii_digit()).collect()
}
