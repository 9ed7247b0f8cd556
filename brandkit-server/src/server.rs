//! Application state and HTTP listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use brandkit_core::catalog::Catalog;
use brandkit_core::llm::{LlmClient, TextGenerator};
use brandkit_core::naming::NameSuggester;
use brandkit_core::Conversation;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::logo::LogoGenerator;
use crate::pipeline::{HttpPipeline, ImagePipeline, PipelineModels};
use crate::web;

/// State shared by all request handlers.
pub struct AppState {
    pub conversation: Conversation,
    pub logos: LogoGenerator,
    pub config: ServerConfig,
    pub started_at: Instant,
}

pub struct Server {
    config: ServerConfig,
    text: Option<Arc<dyn TextGenerator>>,
    pipeline: Arc<dyn ImagePipeline>,
}

impl Server {
    /// Build a server whose backends come from the configuration.
    pub fn new(config: ServerConfig) -> Self {
        let text = config.openai_api_key.as_ref().map(|key| {
            Arc::new(
                LlmClient::new(key.clone())
                    .with_model(&config.text_model)
                    .with_base_url(&config.openai_base_url),
            ) as Arc<dyn TextGenerator>
        });
        if text.is_none() {
            tracing::warn!("OPENAI_API_KEY not set, brand names will come from fallback lists");
        }
        let pipeline = Arc::new(HttpPipeline::new(
            &config.pipeline_url,
            PipelineModels {
                stage_one: config.stage_one_model.clone(),
                stage_two: config.stage_two_model.clone(),
                device: config.device.clone(),
            },
        ));
        Self {
            config,
            text,
            pipeline,
        }
    }

    /// Create a server with explicit backends (for testing).
    pub fn with_backends(
        config: ServerConfig,
        text: Option<Arc<dyn TextGenerator>>,
        pipeline: Arc<dyn ImagePipeline>,
    ) -> Self {
        Self {
            config,
            text,
            pipeline,
        }
    }

    async fn build_state(&self) -> Result<Arc<AppState>> {
        tokio::fs::create_dir_all(&self.config.logo_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.config.logo_dir.display()))?;

        if let Err(e) = self.pipeline.load().await {
            tracing::warn!("Pipeline backend did not load models: {e}");
        }

        let suggester = match &self.text {
            Some(text) => NameSuggester::new(Arc::clone(text)),
            None => NameSuggester::offline(),
        };

        Ok(Arc::new(AppState {
            conversation: Conversation::new(Catalog::default(), suggester),
            logos: LogoGenerator::new(
                Arc::clone(&self.pipeline),
                self.config.logo_dir.clone(),
                self.config.seed,
            ),
            config: self.config.clone(),
            started_at: Instant::now(),
        }))
    }

    /// Serve until the process exits.
    pub async fn run(self) -> Result<()> {
        let state = self.build_state().await?;
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.listen_addr))?;
        tracing::info!("HTTP listener on {}", self.config.listen_addr);
        axum::serve(listener, web::router(state)).await?;
        Ok(())
    }

    /// Bind, spawn the server in the background and return the bound address.
    pub async fn start(self) -> Result<(SocketAddr, JoinHandle<Result<()>>)> {
        let state = self.build_state().await?;
        let listener = TcpListener::bind(&self.config.listen_addr).await?;
        let addr = listener.local_addr()?;
        tracing::info!("HTTP listener on {addr}");
        let handle = tokio::spawn(async move {
            axum::serve(listener, web::router(state)).await?;
            Ok(())
        });
        Ok((addr, handle))
    }
}
