//! Notices, complaints, renovation permits, and copilot transcripts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GeoLocation, ProjectStatus, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeKind {
    Notice,
    Alert,
    Meeting,
    Activity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub time: i64,
    pub kind: NoticeKind,
    /// Empty means every role.
    #[serde(default)]
    pub target_roles: Vec<UserRole>,
}

impl Notice {
    #[must_use]
    pub fn visible_to(&self, role: UserRole) -> bool {
        self.target_roles.is_empty() || self.target_roles.contains(&role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintKind {
    IllegalDumping,
    Noise,
    Odor,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Pending,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub kind: ComplaintKind,
    pub location: GeoLocation,
    pub description: String,
    #[serde(default)]
    pub media_ref: String,
    pub status: ComplaintStatus,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicantRole {
    Owner,
    Tenant,
    Contractor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenovationType {
    Residential,
    Commercial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenovationApplication {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_name: String,
    pub applicant_phone: String,
    pub applicant_role: ApplicantRole,
    pub project_type: RenovationType,
    pub community_name: String,
    pub room_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renovation_company: Option<String>,
    pub start_date: i64,
    pub estimated_duration_days: u32,
    pub status: ProjectStatus,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatSender {
    Ai,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: ChatSender,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}
