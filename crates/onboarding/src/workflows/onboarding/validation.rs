use super::domain::{Gender, Submission, UserId};

/// Client input problems. Surfaced verbatim and never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid gender")]
    InvalidGender,
    #[error("invalid mobile number")]
    InvalidMobile,
    #[error("invalid date of birth")]
    InvalidDateOfBirth,
    #[error("rejection notes must not be empty")]
    EmptyNotes,
}

/// Byte length, so multi-byte characters count more than once.
const MOBILE_LENGTH: usize = 10;

/// A submission whose gender and mobile passed structural checks.
///
/// The date of birth is still raw text; parsing it belongs to the merge step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub user_id: UserId,
    pub department_id: Option<i64>,
    pub gender: Gender,
    pub dob: String,
    pub mobile: String,
    pub country_id: Option<i64>,
    pub resident_country_id: Option<i64>,
}

/// Check gender and mobile on a raw submission.
///
/// Department and country references are optional and pass through untouched.
pub fn validate_submission(
    submission: Submission,
) -> Result<ValidatedSubmission, ValidationError> {
    let gender = submission
        .gender
        .as_deref()
        .and_then(Gender::parse)
        .ok_or(ValidationError::InvalidGender)?;

    let mobile = match submission.mobile {
        Some(mobile) if is_valid_mobile(&mobile) => mobile,
        _ => return Err(ValidationError::InvalidMobile),
    };

    Ok(ValidatedSubmission {
        user_id: submission.user_id,
        department_id: submission.department_id,
        gender,
        dob: submission.dob,
        mobile,
        country_id: submission.country_id,
        resident_country_id: submission.resident_country_id,
    })
}

fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == MOBILE_LENGTH && mobile.starts_with('0')
}
