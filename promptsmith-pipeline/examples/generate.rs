use promptsmith_pipeline::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let raw = RawGenerationRequest {
        user_input: args
            .next()
            .unwrap_or_else(|| "A red sports car driving through a neon city at night".into()),
        content_type: args.next().unwrap_or_else(|| "image".into()),
        platform: args.next().unwrap_or_else(|| "instagram".into()),
        target_model: args.next().unwrap_or_else(|| "flux-dev".into()),
    };

    let request = GenerationRequest::try_from(raw)?;
    let system = PromptAgentSystem::new(PipelineConfig::from_env()?)?;

    let result = system.generate(&request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
