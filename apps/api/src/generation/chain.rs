//! Typed prompt-chain stages.
//!
//! Flow: derive_intent → (derive_caption_prompt, derive_image_prompt) →
//!       generate_captions / generate_image.
//!
//! Each stage output is a distinct type so a later stage cannot accidentally
//! consume the wrong text, and completed outputs are checkpointed on the
//! record by the workflow.

use serde::{Deserialize, Serialize};

use crate::generation::prompts::{
    CAPTION_GENERATION_SYSTEM, CAPTION_GENERATION_TEMPLATE, CAPTION_PROMPT_SYSTEM,
    CAPTION_PROMPT_TEMPLATE, IMAGE_PROMPT_SYSTEM, IMAGE_PROMPT_TEMPLATE, INTENT_PROMPT_TEMPLATE,
    INTENT_SYSTEM,
};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{CompletionClient, CompletionError, IMAGE_MODEL};
use crate::models::business::BusinessRecord;
use crate::models::post::CaptionSet;

/// Per-request state threaded through every stage.
#[derive(Debug, Clone)]
pub struct ChainInput {
    pub mood: String,
    pub tone: String,
    pub description: String,
    pub business_context: String,
}

impl ChainInput {
    pub fn new(record: &BusinessRecord, mood: String, tone: String, description: String) -> Self {
        ChainInput {
            mood,
            tone,
            description,
            business_context: record.prompt_context(),
        }
    }
}

/// Expanded understanding of what the post should be about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intent(pub String);

/// Refined prompt text for the caption-generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptionPrompt(pub String);

/// Refined prompt text for the image-generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePrompt(pub String);

/// Intermediate stage outputs persisted on the post request as the chain
/// advances. A failed request resubmitted with identical inputs resumes from
/// here rather than restarting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainCheckpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_prompt: Option<CaptionPrompt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<ImagePrompt>,
}

/// Stage 1: expand the raw description into an intent.
pub async fn derive_intent(
    llm: &CompletionClient,
    input: &ChainInput,
) -> Result<Intent, CompletionError> {
    let prompt = INTENT_PROMPT_TEMPLATE
        .replace("{description}", &input.description)
        .replace("{business_context}", &input.business_context);
    let text = llm.complete(&prompt, INTENT_SYSTEM).await?;
    Ok(Intent(text))
}

/// Stage 2: synthesize the prompt that will generate the caption.
pub async fn derive_caption_prompt(
    llm: &CompletionClient,
    input: &ChainInput,
    intent: &Intent,
) -> Result<CaptionPrompt, CompletionError> {
    let prompt = CAPTION_PROMPT_TEMPLATE
        .replace("{intent}", &intent.0)
        .replace("{business_context}", &input.business_context);
    let text = llm.complete(&prompt, CAPTION_PROMPT_SYSTEM).await?;
    Ok(CaptionPrompt(text))
}

/// Stage 3: synthesize the prompt that will generate the image.
pub async fn derive_image_prompt(
    llm: &CompletionClient,
    input: &ChainInput,
    intent: &Intent,
) -> Result<ImagePrompt, CompletionError> {
    let prompt = IMAGE_PROMPT_TEMPLATE
        .replace("{intent}", &intent.0)
        .replace("{business_context}", &input.business_context)
        .replace("{image_model}", IMAGE_MODEL)
        .replace("{tone}", &input.tone)
        .replace("{mood}", &input.mood);
    let text = llm.complete(&prompt, IMAGE_PROMPT_SYSTEM).await?;
    Ok(ImagePrompt(text))
}

/// Stage 4: generate the three caption variants.
pub async fn generate_captions(
    llm: &CompletionClient,
    caption_prompt: &CaptionPrompt,
) -> Result<CaptionSet, CompletionError> {
    let prompt = CAPTION_GENERATION_TEMPLATE.replace("{caption_prompt}", &caption_prompt.0);
    let system = format!("{CAPTION_GENERATION_SYSTEM} {JSON_ONLY_SYSTEM}");
    llm.complete_json::<CaptionSet>(&prompt, &system).await
}

/// Stage 5: generate the image at the requested resolution.
pub async fn generate_image(
    llm: &CompletionClient,
    image_prompt: &ImagePrompt,
    size: &str,
) -> Result<String, CompletionError> {
    llm.generate_image(&image_prompt.0, size).await
}
