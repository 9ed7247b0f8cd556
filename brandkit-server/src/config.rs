//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "brandkit-server", about = "Brand discovery and logo generation wizard")]
pub struct ServerConfig {
    /// Address to listen on (host:port)
    #[arg(long, env = "BRANDKIT_LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen_addr: String,

    /// Directory served for front-end assets
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Directory generated logos are written to
    #[arg(long, default_value = "static/logos")]
    pub logo_dir: PathBuf,

    /// API key for name generation. Without it, names come from the fallback tables.
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Base URL of the chat-completions API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = brandkit_core::llm::DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// Model used for name suggestions
    #[arg(long, default_value = brandkit_core::llm::DEFAULT_MODEL)]
    pub text_model: String,

    /// Image pipeline backend URL
    #[arg(long, env = "BRANDKIT_PIPELINE_URL", default_value = "http://127.0.0.1:7860")]
    pub pipeline_url: String,

    /// Base image model (stage one)
    #[arg(long, default_value = "DeepFloyd/IF-I-XL-v1.0")]
    pub stage_one_model: String,

    /// Upscale/refine model (stage two)
    #[arg(long, default_value = "DeepFloyd/IF-II-L-v1.0")]
    pub stage_two_model: String,

    /// Compute device for the pipeline: auto, cuda or cpu
    #[arg(long, default_value = "auto")]
    pub device: String,

    /// Generator seed shared by both stages
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            static_dir: PathBuf::from("static"),
            logo_dir: PathBuf::from("static/logos"),
            openai_api_key: None,
            openai_base_url: brandkit_core::llm::DEFAULT_BASE_URL.to_string(),
            text_model: brandkit_core::llm::DEFAULT_MODEL.to_string(),
            pipeline_url: "http://127.0.0.1:7860".to_string(),
            stage_one_model: "DeepFloyd/IF-I-XL-v1.0".to_string(),
            stage_two_model: "DeepFloyd/IF-II-L-v1.0".to_string(),
            device: "auto".to_string(),
            seed: 0,
        }
    }
}
