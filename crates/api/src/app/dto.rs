//! Request DTOs and JSON mapping helpers for domain records.

use serde::Deserialize;
use serde_json::{Value, json};

use coalition_members::records::{Account, Club, MembershipRequest};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct MembershipRequestBody {
    pub club_id: String,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClubBody {
    pub name: String,
    pub description: Option<String>,
    pub country: Option<String>,
    pub president_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImpersonateBody {
    pub account_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleBody {
    pub role: String,
    /// Also flip the target's network membership alongside the role change.
    pub network_member: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct NominateBody {
    pub account_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DemandStatusBody {
    pub status: coalition_network::DemandStatus,
}

// -------------------------
// Response mapping
// -------------------------

pub fn account_to_json(account: &Account) -> Value {
    json!({
        "id": account.id.to_string(),
        "name": account.name,
        "email": account.email,
        "role": account.role.as_str(),
        "club_id": account.club_id.map(|c| c.to_string()),
        "membership_status": account.membership_status.as_str(),
        "country": account.country,
        "member_code": account.member_code.as_ref().map(|c| c.as_str()),
        "created_at": account.created_at,
    })
}

pub fn club_to_json(club: &Club) -> Value {
    json!({
        "id": club.id.to_string(),
        "name": club.name,
        "description": club.description,
        "country": club.country,
        "president_id": club.president_id.map(|p| p.to_string()),
        "created_at": club.created_at,
        "deleted_at": club.deleted_at,
    })
}

pub fn request_to_json(request: &MembershipRequest) -> Value {
    json!({
        "id": request.id.to_string(),
        "account_id": request.account_id.to_string(),
        "club_id": request.club_id.to_string(),
        "status": request.status.as_str(),
        "message": request.message,
        "reviewed_by": request.reviewed_by.map(|r| r.to_string()),
        "review_notes": request.review_notes,
        "reviewed_at": request.reviewed_at,
        "created_at": request.created_at,
    })
}
