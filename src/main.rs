use clap::Parser;
use lumina::{
    encoder, estimate_cost,
    logger::{self, LogLevel, LoggerConfig},
    service, AspectRatio, Backend, BatchOrchestrator, Config, GenerationMode, GenerationRequest,
    History, PlanControls, RandomSizer, ReferenceSource,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "lumina")]
#[command(version)]
#[command(about = "Batch image generation against multimodal AI services")]
#[command(long_about = "Lumina sends a prompt and optional reference images to an image \
generation service, runs the requested number of generations with a small concurrency cap, \
and writes every image that came back to the output directory.")]
struct Cli {
    /// Prompt text. Left empty, it is suggested from the first reference image.
    #[arg(value_name = "PROMPT")]
    prompt: Option<String>,

    /// text (text-to-image) or image (image-to-image)
    #[arg(short, long, default_value = "text")]
    mode: GenerationMode,

    /// Reference image, repeatable
    #[arg(short, long = "reference", value_name = "IMAGE")]
    references: Vec<PathBuf>,

    /// Number of images when group mode is off (1-500)
    #[arg(short = 'n', long, default_value_t = 1)]
    count: u32,

    /// Enables group mode with this many groups (1-20)
    #[arg(short, long)]
    groups: Option<u32>,

    /// Images per group (1-15). Drawn between 5 and 15 per group when omitted.
    #[arg(long, requires = "groups")]
    per_group: Option<u32>,

    /// 1:1, 9:16, 16:9, 3:4 or 4:3
    #[arg(short, long, default_value = "1:1")]
    aspect_ratio: AspectRatio,

    /// gemini, bedrock or mock
    #[arg(short, long, env = "LUMINA_BACKEND")]
    backend: Option<Backend>,

    /// Maximum generation calls in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Seconds after which a single generation call counts as failed
    #[arg(long)]
    unit_timeout: Option<u64>,

    /// Seed for the per-group size draws
    #[arg(long)]
    seed: Option<u64>,

    /// Directory the generated images are written to
    #[arg(short, long, default_value = "lumina-output")]
    output: PathBuf,

    /// Print the credit estimate and exit
    #[arg(long)]
    estimate_only: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn plan_controls(&self) -> PlanControls {
        match self.groups {
            Some(groups) => PlanControls::grouped(groups, self.per_group),
            None => PlanControls::flat(self.count),
        }
    }

    fn logger_config(&self) -> LoggerConfig {
        let level = if self.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };
        let config = LoggerConfig::new().with_level(level);
        match &self.log_file {
            Some(path) => config.with_file_output(path.clone()),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    logger::init_with_config(cli.logger_config())?;
    if dotenv_loaded {
        log::debug!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }

    let mut config = Config::from_env()?;
    if let Some(backend) = cli.backend {
        config = config.with_backend(backend);
    }
    if let Some(limit) = cli.concurrency {
        config = config.with_concurrency(limit);
    }
    if let Some(secs) = cli.unit_timeout {
        config = config.with_unit_timeout(Duration::from_secs(secs));
    }
    logger::log_config_info(&config);

    let controls = cli.plan_controls();
    let estimate = estimate_cost(&controls);
    println!("Estimated cost: {} credits", estimate);
    if cli.estimate_only {
        return Ok(());
    }

    let sources: Vec<ReferenceSource> = cli.references.iter().cloned().map(ReferenceSource::from).collect();
    let references = encoder::encode_all(&sources).await?;

    let image_service = service::connect(&config).await?;
    let orchestrator = BatchOrchestrator::from_config(image_service, &config);

    let mut prompt = cli.prompt.clone().unwrap_or_default();
    if let Some(suggested) = orchestrator.suggest_prompt(&prompt, &references).await {
        println!("Suggested prompt: {}", suggested);
        prompt = suggested;
    }

    let request = GenerationRequest::new(prompt, cli.mode)
        .with_aspect_ratio(cli.aspect_ratio)
        .with_references(references);

    let mut sizer = match cli.seed {
        Some(seed) => RandomSizer::seeded(seed),
        None => RandomSizer::new(),
    };

    let batch = match orchestrator
        .plan_and_generate(&request, &controls, &mut sizer)
        .await
    {
        Ok(batch) => batch,
        Err(e) => {
            log::error!("❌ {}", e);
            return Err(e.into());
        }
    };

    let mut history = History::new();
    history.record(batch);

    let written = history.export(&cli.output).await?;
    if let Some(batch) = history.latest() {
        println!(
            "Batch {}: {} images written to {}",
            batch.id(),
            written.len(),
            cli.output.display()
        );
    }

    Ok(())
}
