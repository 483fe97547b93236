use crate::core::result::CalculationResult;
use std::fmt;

pub const CERTIFICATE_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

const TITLE: &str = "PRE-QUALIFICATION CERTIFICATE";

const DISCLAIMER: [&str; 2] = [
    "This pre-qualification certificate is an estimate only and does not constitute a loan approval or commitment.",
    "Final loan approval is subject to credit verification, property appraisal, and other lending criteria.",
];

/// Render the downloadable certificate for an issued result.
///
/// A plain-text document: the result report followed by the validity
/// disclaimer.
pub fn render_certificate(result: &CalculationResult) -> String {
    CertificateText(result).to_string()
}

/// Text layout of a certificate over a borrowed result.
struct CertificateText<'a>(&'a CalculationResult);

impl fmt::Display for CertificateText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        writeln!(f, "{}", TITLE)?;
        writeln!(f, "{}", "=".repeat(TITLE.len()))?;
        writeln!(f)?;
        write!(f, "{}", result)?;
        if let Some(phone) = result.applicant().phone() {
            writeln!(f, "Phone:                 {}", phone)?;
        }
        writeln!(f)?;
        writeln!(f, "Important Disclaimer")?;
        for line in DISCLAIMER {
            writeln!(f, "  {}", line)?;
        }
        writeln!(
            f,
            "  This certificate is valid for {} days from the issue date.",
            result.validity_days()
        )?;
        writeln!(
            f,
            "  Interest rates and terms are subject to change. Please consult with a loan officer for details."
        )
    }
}
