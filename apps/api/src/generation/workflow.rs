//! Post-request workflow — coordinates the store and the prompt chain.
//!
//! Lifecycle: the shell is written with status `Running` before the first
//! external call; a successful chain writes the response and `Completed` in
//! one store call; any stage failure persists `Failed { reason }` so the
//! request never reads as stuck or silently successful.

use chrono::Utc;
use tracing::{error, info};

use crate::errors::AppError;
use crate::generation::chain::{self, ChainCheckpoint, ChainInput};
use crate::llm_client::{CompletionClient, DEFAULT_PICTURE_SIZE};
use crate::models::post::{AiResponse, PostRequest, PostStatus};
use crate::store::Store;

/// Caller-supplied inputs for one caption+image generation attempt.
#[derive(Debug, Clone)]
pub struct PostRequestInput {
    pub mood: String,
    pub tone: String,
    pub description: String,
}

/// True when a prior attempt's checkpoint can seed this run: same inputs,
/// and the prior attempt failed. A resubmit with different inputs always
/// starts over (the prior request is overwritten).
fn resumes_from(previous: &PostRequest, input: &PostRequestInput) -> bool {
    matches!(previous.status, PostStatus::Failed { .. })
        && previous.caption_mood == input.mood
        && previous.caption_tone == input.tone
        && previous.caption_description == input.description
}

/// Runs the full five-stage chain for the given business and persists the
/// result. The business id is validated before any external call is issued.
pub async fn run_post_request(
    store: &dyn Store,
    llm: &CompletionClient,
    id: u64,
    input: PostRequestInput,
) -> Result<AiResponse, AppError> {
    let record = store.get(id).await?;

    let checkpoint = match &record.post_request {
        Some(previous) if resumes_from(previous, &input) => {
            info!("Resuming failed post request for business {id} from checkpoint");
            previous.stages.clone()
        }
        _ => ChainCheckpoint::default(),
    };

    let shell = PostRequest {
        caption_mood: input.mood.clone(),
        caption_tone: input.tone.clone(),
        caption_description: input.description.clone(),
        picture_prompt: input.description.clone(),
        picture_size: DEFAULT_PICTURE_SIZE.to_string(),
        status: PostStatus::Running,
        requested_at: Utc::now(),
        stages: checkpoint.clone(),
        ai_response: None,
    };
    let picture_size = shell.picture_size.clone();
    store.set_post_request(id, shell).await?;

    let chain_input = ChainInput::new(&record, input.mood, input.tone, input.description);

    match run_chain(store, llm, id, &chain_input, checkpoint, &picture_size).await {
        Ok(response) => {
            store.set_ai_response(id, response.clone()).await?;
            info!("Post request completed for business {id}");
            Ok(response)
        }
        Err(err) => {
            let reason = err.to_string();
            // Best effort: the original error is what the caller must see.
            if let Err(persist_err) = store
                .update_post_request(
                    id,
                    Box::new(move |request| request.status = PostStatus::Failed { reason }),
                )
                .await
            {
                error!("Failed to record failure for business {id}: {persist_err}");
            }
            Err(err)
        }
    }
}

async fn run_chain(
    store: &dyn Store,
    llm: &CompletionClient,
    id: u64,
    input: &ChainInput,
    checkpoint: ChainCheckpoint,
    picture_size: &str,
) -> Result<AiResponse, AppError> {
    // Stage 1
    let intent = match checkpoint.intent {
        Some(intent) => {
            info!("Reusing checkpointed intent for business {id}");
            intent
        }
        None => {
            info!("Deriving intent for business {id}");
            let intent = chain::derive_intent(llm, input).await?;
            let persisted = intent.clone();
            store
                .update_post_request(
                    id,
                    Box::new(move |request| request.stages.intent = Some(persisted)),
                )
                .await?;
            intent
        }
    };

    // Stages 2 and 3 both depend only on the intent and run concurrently.
    let (caption_prompt, image_prompt) = match (checkpoint.caption_prompt, checkpoint.image_prompt)
    {
        (Some(caption_prompt), Some(image_prompt)) => {
            info!("Reusing checkpointed prompts for business {id}");
            (caption_prompt, image_prompt)
        }
        (Some(caption_prompt), None) => {
            info!("Deriving image prompt for business {id}");
            let image_prompt = chain::derive_image_prompt(llm, input, &intent).await?;
            let persisted = image_prompt.clone();
            store
                .update_post_request(
                    id,
                    Box::new(move |request| request.stages.image_prompt = Some(persisted)),
                )
                .await?;
            (caption_prompt, image_prompt)
        }
        (None, Some(image_prompt)) => {
            info!("Deriving caption prompt for business {id}");
            let caption_prompt = chain::derive_caption_prompt(llm, input, &intent).await?;
            let persisted = caption_prompt.clone();
            store
                .update_post_request(
                    id,
                    Box::new(move |request| request.stages.caption_prompt = Some(persisted)),
                )
                .await?;
            (caption_prompt, image_prompt)
        }
        (None, None) => {
            info!("Deriving caption and image prompts for business {id}");
            let (caption_prompt, image_prompt) = tokio::try_join!(
                chain::derive_caption_prompt(llm, input, &intent),
                chain::derive_image_prompt(llm, input, &intent),
            )?;
            let (persisted_caption, persisted_image) =
                (caption_prompt.clone(), image_prompt.clone());
            store
                .update_post_request(
                    id,
                    Box::new(move |request| {
                        request.stages.caption_prompt = Some(persisted_caption);
                        request.stages.image_prompt = Some(persisted_image);
                    }),
                )
                .await?;
            (caption_prompt, image_prompt)
        }
    };

    // Stage 4
    info!("Generating captions for business {id}");
    let captions = chain::generate_captions(llm, &caption_prompt).await?;

    // Stage 5
    info!("Generating image for business {id}");
    let picture_url = chain::generate_image(llm, &image_prompt, picture_size).await?;

    Ok(AiResponse {
        caption_text: captions.caption1.clone(),
        captions,
        picture_url,
    })
}
