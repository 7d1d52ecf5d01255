//! Submission validation.
//!
//! Fields are checked in a fixed order and the first failure wins, so callers
//! always see the same field named for the same bad input.

use rust_decimal::Decimal;

use crate::loan::error::LoanError;
use crate::loan::types::LoanSubmission;

/// Longest accepted repayment term.
pub const MAX_TERM_MONTHS: i64 = 600;

/// Largest accepted principal.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Most decimal places accepted on the principal.
pub const AMOUNT_SCALE: u32 = 2;

/// A submission that passed validation, with strings trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    /// Principal, normalized.
    pub amount: Decimal,
    /// Term in months.
    pub term_months: u32,
    /// Trimmed purpose.
    pub purpose: String,
    /// Trimmed employment status.
    pub employment_status: String,
    /// Trimmed employer name, empty when absent.
    pub employer_name: String,
    /// Trimmed employer address.
    pub employer_address: String,
}

/// Validates a submission.
///
/// Order: amount, termMonths, purpose, employmentStatus, employerAddress.
///
/// # Errors
///
/// Returns `LoanError::Validation` naming the first offending field.
pub fn validate_submission(input: &LoanSubmission) -> Result<ValidSubmission, LoanError> {
    let amount = validate_amount(input.amount)?;
    let term_months = validate_term(input.term_months)?;
    let purpose = required("purpose", &input.purpose)?;
    let employment_status = required("employmentStatus", &input.employment_status)?;
    let employer_address = required("employerAddress", &input.employer_address)?;

    let employer_name = input
        .employer_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    Ok(ValidSubmission {
        amount,
        term_months,
        purpose,
        employment_status,
        employer_name,
        employer_address,
    })
}

fn validate_amount(amount: Decimal) -> Result<Decimal, LoanError> {
    if amount <= Decimal::ZERO {
        return Err(LoanError::validation(
            "amount",
            "amount must be greater than zero",
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(LoanError::validation(
            "amount",
            format!("amount must not exceed {MAX_AMOUNT}"),
        ));
    }
    let normalized = amount.normalize();
    if normalized.scale() > AMOUNT_SCALE {
        return Err(LoanError::validation(
            "amount",
            format!("amount must have at most {AMOUNT_SCALE} decimal places"),
        ));
    }
    Ok(normalized)
}

fn validate_term(term_months: i64) -> Result<u32, LoanError> {
    if term_months <= 0 {
        return Err(LoanError::validation(
            "termMonths",
            "termMonths must be a positive integer",
        ));
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(LoanError::validation(
            "termMonths",
            format!("termMonths must not exceed {MAX_TERM_MONTHS}"),
        ));
    }
    u32::try_from(term_months).map_err(|_| {
        LoanError::validation("termMonths", "termMonths must be a positive integer")
    })
}

fn required(field: &'static str, value: &str) -> Result<String, LoanError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LoanError::validation(field, format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn submission() -> LoanSubmission {
        LoanSubmission {
            amount: dec!(5000),
            term_months: 12,
            purpose: "car".to_string(),
            employment_status: "employed".to_string(),
            employer_name: None,
            employer_address: "1 Main St".to_string(),
        }
    }

    fn field_of(result: Result<ValidSubmission, LoanError>) -> &'static str {
        match result {
            Err(LoanError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_submission_is_trimmed() {
        let mut input = submission();
        input.purpose = "  car  ".to_string();
        input.employer_name = Some(" Acme ".to_string());

        let valid = validate_submission(&input).unwrap();
        assert_eq!(valid.purpose, "car");
        assert_eq!(valid.employer_name, "Acme");
        assert_eq!(valid.term_months, 12);
    }

    #[test]
    fn test_missing_employer_name_becomes_empty() {
        let valid = validate_submission(&submission()).unwrap();
        assert_eq!(valid.employer_name, "");
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    #[case(dec!(1000000000.01))]
    #[case(dec!(10.005))]
    fn test_rejects_bad_amount(#[case] amount: Decimal) {
        let mut input = submission();
        input.amount = amount;
        assert_eq!(field_of(validate_submission(&input)), "amount");
    }

    #[test]
    fn test_accepts_trailing_zero_scale() {
        let mut input = submission();
        input.amount = dec!(10.5000);
        let valid = validate_submission(&input).unwrap();
        assert_eq!(valid.amount, dec!(10.5));
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    #[case(601)]
    fn test_rejects_bad_term(#[case] term: i64) {
        let mut input = submission();
        input.term_months = term;
        assert_eq!(field_of(validate_submission(&input)), "termMonths");
    }

    #[test]
    fn test_first_failure_wins() {
        let input = LoanSubmission {
            amount: dec!(0),
            term_months: 0,
            purpose: String::new(),
            employment_status: String::new(),
            employer_name: None,
            employer_address: String::new(),
        };
        assert_eq!(field_of(validate_submission(&input)), "amount");

        let mut input = submission();
        input.purpose = "   ".to_string();
        input.employer_address = String::new();
        assert_eq!(field_of(validate_submission(&input)), "purpose");
    }

    #[test]
    fn test_employment_status_required() {
        let mut input = submission();
        input.employment_status = " ".to_string();
        assert_eq!(field_of(validate_submission(&input)), "employmentStatus");
    }

    #[test]
    fn test_employer_address_required() {
        let mut input = submission();
        input.employer_address = String::new();
        assert_eq!(field_of(validate_submission(&input)), "employerAddress");
    }
}
