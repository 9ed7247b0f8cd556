//! Two-stage text-to-image pipeline.
//!
//! Stage one synthesizes a low-resolution base image from the prompt; stage
//! two upscales and refines it, conditioned on the same prompt. The models
//! themselves run in an inference backend reached over HTTP. This module
//! owns the wire format and the conversion from the backend's channel-first
//! float tensors to 8-bit RGB images.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("pipeline request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("pipeline {stage} returned {status}: {body}")]
    Status {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[error("malformed tensor: {0}")]
    Tensor(String),
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to prepare output: {0}")]
    Io(#[from] std::io::Error),
}

/// A channel-first (`[C, H, W]`) float image with values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageTensor {
    pub shape: [usize; 3],
    pub data: Vec<f32>,
}

impl ImageTensor {
    /// Convert to an 8-bit RGB image. Values are clamped to `[0, 1]` and
    /// scaled by 255 with truncation.
    pub fn to_rgb8(&self) -> Result<image::RgbImage, PipelineError> {
        let [c, h, w] = self.shape;
        if c != 3 {
            return Err(PipelineError::Tensor(format!("expected 3 channels, got {c}")));
        }
        let plane = h.checked_mul(w);
        let (Some(plane), Some(expected)) = (plane, plane.and_then(|p| p.checked_mul(c))) else {
            return Err(PipelineError::Tensor(format!(
                "shape {:?} is too large",
                self.shape
            )));
        };
        if self.data.len() != expected {
            return Err(PipelineError::Tensor(format!(
                "shape {:?} needs {expected} values, got {}",
                self.shape,
                self.data.len()
            )));
        }

        let mut pixels = Vec::with_capacity(expected);
        for i in 0..plane {
            for ch in 0..3 {
                let v = self.data[ch * plane + i].clamp(0.0, 1.0);
                pixels.push((v * 255.0) as u8);
            }
        }

        let (w, h) = (
            u32::try_from(w).map_err(|_| PipelineError::Tensor("width overflow".into()))?,
            u32::try_from(h).map_err(|_| PipelineError::Tensor("height overflow".into()))?,
        );
        image::RgbImage::from_raw(w, h, pixels)
            .ok_or_else(|| PipelineError::Tensor("pixel buffer size mismatch".into()))
    }
}

/// Parameters shared by both stages of one generation.
#[derive(Debug, Clone)]
pub struct StageRequest<'a> {
    pub prompt: &'a str,
    pub seed: u64,
}

/// A backend able to run both pipeline stages.
#[async_trait]
pub trait ImagePipeline: Send + Sync {
    /// Ask the backend to load its models. Called once at startup.
    async fn load(&self) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Stage one: base image from the prompt.
    async fn base(&self, req: &StageRequest<'_>) -> Result<ImageTensor, PipelineError>;

    /// Stage two: upscale and refine the stage-one output.
    async fn upscale(
        &self,
        req: &StageRequest<'_>,
        image: &ImageTensor,
    ) -> Result<ImageTensor, PipelineError>;
}

/// Which models the HTTP backend should run, and where.
#[derive(Debug, Clone)]
pub struct PipelineModels {
    pub stage_one: String,
    pub stage_two: String,
    pub device: String,
}

#[derive(Debug, Serialize)]
struct LoadRequest<'a> {
    stage_one_model: &'a str,
    stage_two_model: &'a str,
    variant: &'a str,
    device: &'a str,
    cpu_offload: bool,
    attention_slicing: bool,
}

#[derive(Debug, Serialize)]
struct StageBody<'a> {
    model: &'a str,
    prompt: &'a str,
    seed: u64,
    device: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a ImageTensor>,
}

#[derive(Debug, Deserialize)]
struct StageResponse {
    image: ImageTensor,
}

/// Pipeline backed by an HTTP inference service.
pub struct HttpPipeline {
    base_url: String,
    models: PipelineModels,
    http: reqwest::Client,
}

impl HttpPipeline {
    pub fn new(base_url: &str, models: PipelineModels) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            models,
            http: reqwest::Client::new(),
        }
    }

    async fn post<T: Serialize>(
        &self,
        stage: &'static str,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, PipelineError> {
        let resp = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Status {
                stage,
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn run_stage(
        &self,
        stage: &'static str,
        path: &str,
        model: &str,
        req: &StageRequest<'_>,
        image: Option<&ImageTensor>,
    ) -> Result<ImageTensor, PipelineError> {
        let body = StageBody {
            model,
            prompt: req.prompt,
            seed: req.seed,
            device: &self.models.device,
            image,
        };
        let resp = self.post(stage, path, &body).await?;
        let parsed: StageResponse = resp.json().await?;
        tracing::debug!(stage, shape = ?parsed.image.shape, "Stage complete");
        Ok(parsed.image)
    }
}

#[async_trait]
impl ImagePipeline for HttpPipeline {
    async fn load(&self) -> Result<(), PipelineError> {
        let body = LoadRequest {
            stage_one_model: &self.models.stage_one,
            stage_two_model: &self.models.stage_two,
            variant: "fp16",
            device: &self.models.device,
            cpu_offload: true,
            attention_slicing: true,
        };
        self.post("load", "/v1/models/load", &body).await?;
        tracing::info!(
            stage_one = %self.models.stage_one,
            stage_two = %self.models.stage_two,
            device = %self.models.device,
            "Pipeline models loaded"
        );
        Ok(())
    }

    async fn base(&self, req: &StageRequest<'_>) -> Result<ImageTensor, PipelineError> {
        self.run_stage("base", "/v1/stages/base", &self.models.stage_one, req, None)
            .await
    }

    async fn upscale(
        &self,
        req: &StageRequest<'_>,
        image: &ImageTensor,
    ) -> Result<ImageTensor, PipelineError> {
        self.run_stage(
            "upscale",
            "/v1/stages/upscale",
            &self.models.stage_two,
            req,
            Some(image),
        )
        .await
    }
}
