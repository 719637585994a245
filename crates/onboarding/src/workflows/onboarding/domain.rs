use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for user profiles.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UserId(pub i64);

/// Identifier wrapper for onboarding requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference into the role lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(pub i64);

/// Raw onboarding input exactly as a registrant submitted it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub user_id: UserId,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub country_id: Option<i64>,
    #[serde(default)]
    pub resident_country_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Accepts the lowercase and capitalized spellings only.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Male" | "male" => Some(Self::Male),
            "Female" | "female" => Some(Self::Female),
            "Other" | "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

/// Which onboarding path a submission arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Applicant,
    Volunteer,
}

impl FlowKind {
    pub const fn request_type(self) -> RequestType {
        match self {
            FlowKind::Applicant => RequestType::Registration,
            FlowKind::Volunteer => RequestType::Verification,
        }
    }
}

/// Role assigned to a profile when its first request is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDefaults {
    pub applicant: RoleId,
    pub volunteer: RoleId,
}

impl RoleDefaults {
    pub const fn role_for(&self, flow: FlowKind) -> RoleId {
        match flow {
            FlowKind::Applicant => self.applicant,
            FlowKind::Volunteer => self.volunteer,
        }
    }
}

impl Default for RoleDefaults {
    fn default() -> Self {
        Self {
            applicant: RoleId(1),
            volunteer: RoleId(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Registration,
    Verification,
}

impl RequestType {
    pub const fn label(self) -> &'static str {
        match self {
            RequestType::Registration => "registration",
            RequestType::Verification => "verification",
        }
    }
}

/// Review status stored as a small ordered integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const fn code(self) -> u8 {
        match self {
            RequestStatus::Pending => 0,
            RequestStatus::Approved => 1,
            RequestStatus::Rejected => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl From<RequestStatus> for u8 {
    fn from(status: RequestStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for RequestStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RequestStatus::Pending),
            1 => Ok(RequestStatus::Approved),
            2 => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status code {other}")),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Persisted review unit tracking one onboarding attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub user_id: UserId,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub verifier_id: Option<UserId>,
    pub reject_notes: Option<String>,
}

/// Request row before the store assigns it an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRequest {
    pub user_id: UserId,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub verifier_id: Option<UserId>,
}

/// Identity fields captured by account registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub surname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub department_id: Option<i64>,
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
    pub mobile: Option<String>,
    pub country_id: Option<i64>,
    pub resident_country_id: Option<i64>,
    pub role_id: Option<RoleId>,
}

impl UserProfile {
    pub fn registered(id: UserId, user: NewUser) -> Self {
        Self {
            id,
            email: user.email,
            name: user.name,
            surname: user.surname,
            department_id: None,
            gender: None,
            dob: None,
            mobile: None,
            country_id: None,
            resident_country_id: None,
            role_id: None,
        }
    }

    pub fn apply(&mut self, patch: &ProfilePatch) {
        self.department_id = patch.department_id;
        self.gender = Some(patch.gender);
        self.dob = patch.dob;
        self.mobile = Some(patch.mobile.clone());
        self.country_id = patch.country_id;
        self.resident_country_id = patch.resident_country_id;
        self.role_id = Some(patch.role_id);
    }
}

/// Mutable onboarding fields written onto an existing profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub user_id: UserId,
    pub department_id: Option<i64>,
    pub gender: Gender,
    pub dob: Option<NaiveDate>,
    pub mobile: String,
    pub country_id: Option<i64>,
    pub resident_country_id: Option<i64>,
    pub role_id: RoleId,
}
