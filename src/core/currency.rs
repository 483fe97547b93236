use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Display currency for a pre-qualification.
///
/// The currency never changes the arithmetic; it only selects the code
/// printed in front of every formatted amount.
///
/// # Examples
///
/// ```
/// use prequal_engine::core::currency::Currency;
///
/// assert_eq!(Currency::default(), Currency::Ttd);
/// assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ttd,
    Usd,
    Cad,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Ttd => "TTD",
            Currency::Usd => "USD",
            Currency::Cad => "CAD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported currency '{0}', expected one of TTD, USD, CAD")]
pub struct UnknownCurrency(pub String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TTD" => Ok(Currency::Ttd),
            "USD" => Ok(Currency::Usd),
            "CAD" => Ok(Currency::Cad),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

/// Round a monetary amount to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Group the digits of a non-negative cent-rounded amount: `1234567.8` → `1,234,567.80`.
pub fn group_thousands(amount: Decimal) -> String {
    let rounded = round_money(amount.abs());
    let text = format!("{:.2}", rounded);
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped.push('.');
    grouped.push_str(cents);
    grouped
}

/// Format an amount for display, e.g. `TTD $1,234.56`.
///
/// Negative amounts keep the sign after the code: `TTD -$12.00`.
///
/// # Examples
///
/// ```
/// use prequal_engine::core::currency::{format_money, Currency};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_money(dec!(379588.8), Currency::Ttd), "TTD $379,588.80");
/// ```
pub fn format_money(amount: Decimal, currency: Currency) -> String {
    let sign = if round_money(amount) < Decimal::ZERO { "-" } else { "" };
    format!("{} {}${}", currency, sign, group_thousands(amount))
}
