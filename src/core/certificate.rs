use crate::core::request::ValidityDays;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Short identifier printed on a certificate, e.g. `3F9A01BC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(String);

impl CertificateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh identifier: the first eight hex digits of a v4 UUID, upper-cased.
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple[..8].to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CertificateId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identity and validity window assigned to a result when it is issued.
///
/// `expiry_date` is always `issue_date + validity` calendar days.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use prequal_engine::core::certificate::{CertificateId, CertificateStamp};
/// use prequal_engine::core::request::ValidityDays;
///
/// let issued = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
/// let stamp = CertificateStamp::new(CertificateId::new("ABCD1234"), issued, ValidityDays::default());
/// assert_eq!(stamp.expiry_date(), NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateStamp {
    certificate_id: CertificateId,
    issue_date: NaiveDate,
    expiry_date: NaiveDate,
}

impl CertificateStamp {
    /// # Panics
    ///
    /// Panics if the expiry date falls outside chrono's supported range,
    /// which no offered validity window can reach from a real issue date.
    pub fn new(certificate_id: CertificateId, issue_date: NaiveDate, validity: ValidityDays) -> Self {
        let expiry_date = issue_date
            .checked_add_days(Days::new(u64::from(validity.days())))
            .unwrap_or_else(|| panic!("expiry date out of range for issue date {}", issue_date));
        Self {
            certificate_id,
            issue_date,
            expiry_date,
        }
    }

    /// Stamp with a freshly generated identifier.
    pub fn issue(issue_date: NaiveDate, validity: ValidityDays) -> Self {
        Self::new(CertificateId::generate(), issue_date, validity)
    }

    pub fn certificate_id(&self) -> &CertificateId {
        &self.certificate_id
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }
}
