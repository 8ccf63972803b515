//! Face swap routes, one per job variant.
//!
//! Each handler validates the body, runs the job to completion and answers
//! with the published URLs. A client that disconnects drops the handler
//! future, which cancels the job.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use faceswap_core::{validate, JobOutcome, JobVariant};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::ApiError;
use crate::state::AppState;

const SWAP_COMPLETED: &str = "Face swap completed successfully";
const VIDEO_SWAP_COMPLETED: &str = "Face swap video completed successfully";
const SWAPS_COMPLETED: &str = "Face swaps completed successfully";

#[derive(Debug, Serialize)]
pub struct SwapResponse {
    pub message: String,
    pub output_s3_url: String,
}

#[derive(Debug, Serialize)]
pub struct DualSwapResponse {
    pub message: String,
    pub first_output_s3_url: String,
    pub second_output_s3_url: String,
}

#[derive(Debug, Serialize)]
pub struct MultiSwapResponse {
    pub message: String,
    pub output_s3_urls: Vec<String>,
}

pub async fn single_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SwapResponse>, ApiError> {
    let outcome = submit(&state, JobVariant::SingleImage, payload).await?;
    single_output(outcome, SWAP_COMPLETED)
}

pub async fn dual_source_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DualSwapResponse>, ApiError> {
    let outcome = submit(&state, JobVariant::DualSourceImage, payload).await?;

    let mut urls = outcome.urls().into_iter();
    match (urls.next(), urls.next()) {
        (Some(first), Some(second)) => Ok(Json(DualSwapResponse {
            message: SWAP_COMPLETED.to_string(),
            first_output_s3_url: first,
            second_output_s3_url: second,
        })),
        _ => Err(ApiError::Internal(format!(
            "Expected 2 outputs, job {} produced {}",
            outcome.job_id,
            outcome.outputs.len()
        ))),
    }
}

pub async fn dual_source_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SwapResponse>, ApiError> {
    let outcome = submit(&state, JobVariant::DualSourceBatch, payload).await?;
    single_output(outcome, SWAP_COMPLETED)
}

pub async fn video(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SwapResponse>, ApiError> {
    let outcome = submit(&state, JobVariant::Video, payload).await?;
    single_output(outcome, VIDEO_SWAP_COMPLETED)
}

pub async fn five_target(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MultiSwapResponse>, ApiError> {
    let outcome = submit(&state, JobVariant::FiveTarget, payload).await?;
    Ok(Json(MultiSwapResponse {
        message: SWAPS_COMPLETED.to_string(),
        output_s3_urls: outcome.urls(),
    }))
}

async fn submit(
    state: &AppState,
    variant: JobVariant,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<JobOutcome, ApiError> {
    let Json(body) = payload?;
    let request = validate(variant, &body)?;
    Ok(state.orchestrator().run(request).await?)
}

fn single_output(outcome: JobOutcome, message: &str) -> Result<Json<SwapResponse>, ApiError> {
    match outcome.outputs.first() {
        Some(output) => Ok(Json(SwapResponse {
            message: message.to_string(),
            output_s3_url: output.url.clone(),
        })),
        None => Err(ApiError::Internal(format!(
            "Job {} produced no output",
            outcome.job_id
        ))),
    }
}
