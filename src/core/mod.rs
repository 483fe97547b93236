//! Foundational types: requests, results, currencies, certificates and
//! the validation rules a request must pass.

pub mod applicant;
pub mod certificate;
pub mod currency;
pub mod request;
pub mod result;
pub mod validation;
