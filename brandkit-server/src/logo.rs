//! Logo artifacts: run the pipeline and persist the result as a PNG.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use brandkit_core::ids;

use crate::pipeline::{ImagePipeline, PipelineError, StageRequest};

/// Keep alphanumerics, spaces and underscores, then turn spaces into underscores.
pub fn sanitize_brand_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// File name for a new logo: `<brand>_<suffix>.png`, or `<suffix>.png`
/// without a brand name.
pub fn logo_file_name(brand_name: Option<&str>, suffix: &str) -> String {
    match brand_name {
        Some(name) if !name.is_empty() => format!("{}_{suffix}.png", sanitize_brand_name(name)),
        _ => format!("{suffix}.png"),
    }
}

/// Runs the two-stage pipeline and writes logos to a directory.
pub struct LogoGenerator {
    pipeline: Arc<dyn ImagePipeline>,
    logo_dir: PathBuf,
    seed: u64,
}

impl LogoGenerator {
    pub fn new(pipeline: Arc<dyn ImagePipeline>, logo_dir: PathBuf, seed: u64) -> Self {
        Self {
            pipeline,
            logo_dir,
            seed,
        }
    }

    pub fn logo_dir(&self) -> &Path {
        &self.logo_dir
    }

    /// Generate a logo for `prompt` and return the path it was written to.
    pub async fn generate(
        &self,
        prompt: &str,
        brand_name: Option<&str>,
    ) -> Result<PathBuf, PipelineError> {
        let path = self
            .logo_dir
            .join(logo_file_name(brand_name, &ids::artifact_suffix()));
        tracing::info!(%prompt, path = %path.display(), "Starting logo generation");

        let req = StageRequest {
            prompt,
            seed: self.seed,
        };

        tracing::info!("Stage 1: generating base image");
        let base = self.pipeline.base(&req).await?;

        tracing::info!(shape = ?base.shape, "Stage 2: upscaling and refining");
        let refined = self.pipeline.upscale(&req, &base).await?;

        let rgb = refined.to_rgb8()?;
        tokio::fs::create_dir_all(&self.logo_dir).await?;
        let out = path.clone();
        tokio::task::spawn_blocking(move || rgb.save_with_format(&out, image::ImageFormat::Png))
            .await
            .map_err(std::io::Error::other)??;

        tracing::info!(path = %path.display(), "Logo generated");
        Ok(path)
    }
}
