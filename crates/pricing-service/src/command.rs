//! `/po-price <location> [YYYY-MM]` chat command.

use pricing_core::YearMonth;
use thiserror::Error;

pub const COMMAND: &str = "/po-price";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Not a po-price command")]
    NotACommand,
    #[error("Location is required. Usage: /po-price <location> [month]")]
    MissingLocation,
    #[error("Month must be between 01-12")]
    InvalidMonth,
    #[error("Year must be between 2020-2030")]
    InvalidYear,
}

/// Parsed command. The location is lowercased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoPriceCommand {
    pub location: String,
    pub period: Option<YearMonth>,
}

fn looks_like_month(token: &str) -> bool {
    let b = token.as_bytes();
    b.len() == 7
        && b[4] == b'-'
        && b.iter().enumerate().all(|(i, c)| i == 4 || c.is_ascii_digit())
}

/// Parse a chat message. A trailing `YYYY-MM` token is the month only when a
/// location precedes it.
pub fn parse_po_price_command(text: &str) -> Result<PoPriceCommand, CommandError> {
    let text = text.trim().to_lowercase();
    let args = text
        .strip_prefix(COMMAND)
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        .ok_or(CommandError::NotACommand)?
        .trim();
    let mut parts: Vec<&str> = args.split_whitespace().collect();
    if parts.is_empty() {
        return Err(CommandError::MissingLocation);
    }

    let mut period = None;
    if parts.len() > 1 && parts.last().is_some_and(|t| looks_like_month(t)) {
        let token = parts.pop().unwrap_or_default();
        let (year, month) = token.split_at(4);
        let month: u32 = month[1..].parse().map_err(|_| CommandError::InvalidMonth)?;
        if !(1..=12).contains(&month) {
            return Err(CommandError::InvalidMonth);
        }
        let year: i32 = year.parse().map_err(|_| CommandError::InvalidYear)?;
        if !(2020..=2030).contains(&year) {
            return Err(CommandError::InvalidYear);
        }
        period = YearMonth::new(year, month);
    }

    Ok(PoPriceCommand {
        location: parts.join(" "),
        period,
    })
}
