use serde::{Deserialize, Serialize};

use crate::entities::accounts::Role;
use crate::entities::{certificates, contact_messages, profile, projects};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn decode_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize, Clone)]
pub struct AccountDto {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub last_login_at: Option<String>,
}

impl From<crate::db::Account> for AccountDto {
    fn from(account: crate::db::Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
            last_login_at: account.last_login_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
    pub resume_url: Option<String>,
    pub skills: Vec<String>,
    pub updated_at: String,
}

impl From<profile::Model> for ProfileDto {
    fn from(model: profile::Model) -> Self {
        Self {
            name: model.name,
            title: model.title,
            bio: model.bio,
            email: model.email,
            phone: model.phone,
            github: model.github,
            linkedin: model.linkedin,
            instagram: model.instagram,
            resume_url: model.resume_url,
            skills: decode_tags(&model.skills),
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDto {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub image_url: Option<String>,
    pub live_link: Option<String>,
    pub repo_link: Option<String>,
    pub created_at: String,
}

impl From<projects::Model> for ProjectDto {
    fn from(model: projects::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            tech_stack: decode_tags(&model.tech_stack),
            image_url: model.image_url,
            live_link: model.live_link,
            repo_link: model.repo_link,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CertificateDto {
    pub id: i32,
    pub title: String,
    pub issuer: String,
    pub issue_date: Option<String>,
    pub skills: Vec<String>,
    pub cert_url: Option<String>,
    pub created_at: String,
}

impl From<certificates::Model> for CertificateDto {
    fn from(model: certificates::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            issuer: model.issuer,
            issue_date: model.issue_date,
            skills: decode_tags(&model.skills),
            cert_url: model.cert_url,
            created_at: model.created_at,
        }
    }
}

/// Contact message as shown to the admin. The submitter IP and user agent
/// are write-only metadata and deliberately have no field here.
#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: String,
}

impl From<contact_messages::Model> for MessageDto {
    fn from(model: contact_messages::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            subject: model.subject,
            message: model.message,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PublicDataDto {
    pub profile: ProfileDto,
    pub projects: Vec<ProjectDto>,
    pub certificates: Vec<CertificateDto>,
}

// ============================================================================
// Request payloads
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AccountDto,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Allow-listed profile fields. Anything else in the body (role, password,
/// ...) is dropped at deserialization and can never reach storage.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
    pub resume_url: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl From<UpdateProfileRequest> for crate::db::ProfileUpdate {
    fn from(request: UpdateProfileRequest) -> Self {
        Self {
            name: request.name,
            title: request.title,
            bio: request.bio,
            email: request.email,
            phone: request.phone,
            github: request.github,
            linkedin: request.linkedin,
            instagram: request.instagram,
            resume_url: request.resume_url,
            skills: request.skills,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    pub image_url: Option<String>,
    pub live_link: Option<String>,
    pub repo_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCertificateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issuer: String,
    pub issue_date: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub cert_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
