use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generation::chain::ChainCheckpoint;

/// One caption+image generation attempt tied to a business record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    pub caption_mood: String,
    pub caption_tone: String,
    pub caption_description: String,
    pub picture_prompt: String,
    pub picture_size: String,
    pub status: PostStatus,
    pub requested_at: DateTime<Utc>,
    /// Completed stage outputs, persisted as the chain advances so a failed
    /// request can resume instead of restarting.
    #[serde(default)]
    pub stages: ChainCheckpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<AiResponse>,
}

impl PostRequest {
    /// True while the chain has been recorded but has not finished or failed.
    pub fn is_in_progress(&self) -> bool {
        matches!(self.status, PostStatus::Pending | PostStatus::Running)
    }
}

/// Explicit request lifecycle. `Failed` requests stay observable instead of
/// being stuck behind a forever-true boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PostStatus {
    Pending,
    Running,
    Completed,
    Failed { reason: String },
}

/// Final generated content. All three caption variants are exposed;
/// `caption_text` is the first one and is what the publish path sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    pub caption_text: String,
    pub captions: CaptionSet,
    pub picture_url: String,
}

/// The caption-generation call must return exactly these three string fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptionSet {
    pub caption1: String,
    pub caption2: String,
    pub caption3: String,
}
