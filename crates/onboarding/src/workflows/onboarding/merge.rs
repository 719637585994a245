use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{FlowKind, NewRequest, ProfilePatch, RequestStatus, RoleDefaults};
use super::validation::{ValidatedSubmission, ValidationError};

const DOB_FORMAT: &str = "%Y-%m-%d";

/// Paired writes produced from one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedSubmission {
    pub request: NewRequest,
    pub patch: ProfilePatch,
}

/// Build the pending request and the profile patch for a validated submission.
pub fn merge_submission(
    submission: ValidatedSubmission,
    flow: FlowKind,
    roles: &RoleDefaults,
) -> Result<MergedSubmission, ValidationError> {
    let dob = parse_dob(&submission.dob)?;

    let request = NewRequest {
        user_id: submission.user_id,
        request_type: flow.request_type(),
        status: RequestStatus::Pending,
        verifier_id: None,
    };

    let patch = ProfilePatch {
        user_id: submission.user_id,
        department_id: submission.department_id,
        gender: submission.gender,
        dob,
        mobile: submission.mobile,
        country_id: submission.country_id,
        resident_country_id: submission.resident_country_id,
        role_id: roles.role_for(flow),
    };

    Ok(MergedSubmission { request, patch })
}

/// An empty string means "no date"; anything else must be a real calendar day.
pub fn parse_dob(raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    if raw.is_empty() {
        return Ok(None);
    }

    if !has_dob_shape(raw) {
        return Err(ValidationError::InvalidDateOfBirth);
    }

    NaiveDate::parse_from_str(raw, DOB_FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::InvalidDateOfBirth)
}

/// Zero-padded `YYYY-MM-DD`; chrono alone accepts single digits and signs.
fn has_dob_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}
