pub mod analyzer;
pub mod assembler;
pub mod bedrock;
pub mod config;
pub mod cost;
pub mod encoder;
pub mod error;
pub mod executor;
pub mod gemini;
pub mod history;
pub mod logger;
pub mod mock;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod service;

pub use bedrock::BedrockClient;
pub use config::{Backend, BedrockConfig, Config, GeminiConfig};
pub use cost::estimate_cost;
pub use encoder::ReferenceSource;
pub use error::{LuminaError, Result};
pub use executor::BoundedExecutor;
pub use gemini::GeminiClient;
pub use history::History;
pub use mock::MockImageService;
pub use models::{
    AspectRatio, BatchPlan, CostEstimate, EncodedImage, GeneratedImage, GenerationBatch,
    GenerationMode, GenerationOutcome, GenerationRequest, PlanControls,
};
pub use orchestrator::BatchOrchestrator;
pub use planner::{plan_batch, GroupSizer, RandomSizer, ScriptedSizer};
pub use service::ImageService;
