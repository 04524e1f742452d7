use serde::{Deserialize, Serialize};

use crate::models::post::PostRequest;

/// A business profile plus its most recent post request, as persisted in the
/// flat-file document. Ids are sequential and assigned at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub specifics: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_request: Option<PostRequest>,
}

impl BusinessRecord {
    /// Profile blob substituted into prompt templates. Deliberately excludes
    /// email and password.
    pub fn prompt_context(&self) -> String {
        format!("{} - {}. {}", self.name, self.description, self.specifics)
    }
}

/// Typed selector for profile field updates. Replaces the stringly
/// key/value interface of the original store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Description,
    Specifics,
    Email,
    Password,
}

impl ProfileField {
    pub fn apply(self, record: &mut BusinessRecord, value: String) {
        match self {
            ProfileField::Name => record.name = value,
            ProfileField::Description => record.description = value,
            ProfileField::Specifics => record.specifics = value,
            ProfileField::Email => record.email = value,
            ProfileField::Password => record.password = value,
        }
    }
}

/// API-facing rendering of a business record. Omits the stored password.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessView {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub specifics: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_request: Option<PostRequest>,
}

impl From<BusinessRecord> for BusinessView {
    fn from(record: BusinessRecord) -> Self {
        BusinessView {
            id: record.id,
            name: record.name,
            description: record.description,
            specifics: record.specifics,
            email: record.email,
            post_request: record.post_request,
        }
    }
}
