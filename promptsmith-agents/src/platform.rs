//! Platform optimizers.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    agent::{Agent, complete_text},
    agent_types::{AgentResult, ContextFacts, Platform, VideoContextFacts, confidence},
    catalog::platform_profile,
    error::Result,
    inference::InferenceClient,
    prompts,
};

const PLATFORM_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct PlatformInput {
    pub facts: ContextFacts,
    pub base_prompt: String,
    pub platform: Platform,
}

#[derive(Debug, Clone)]
pub struct VideoPlatformInput {
    pub facts: VideoContextFacts,
    pub base_prompt: String,
    pub motion_specs: String,
    pub platform: Platform,
}

#[derive(Debug, Clone)]
pub struct PlatformOptimizer {
    client: Arc<dyn InferenceClient>,
}

impl PlatformOptimizer {
    pub const NAME: &'static str = "PlatformOptimizer";

    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for PlatformOptimizer {
    type Input = PlatformInput;

    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: &PlatformInput) -> Result<AgentResult> {
        let start = Instant::now();
        let profile = platform_profile(input.platform);
        let prompt = prompts::platform_prompt(&input.facts, &input.base_prompt, &profile);

        let (content, score) =
            match complete_text(&self.client, &prompt, PLATFORM_TEMPERATURE).await {
                Ok(text) => {
                    debug!("{} adapted prompt for {}", Self::NAME, input.platform);
                    (text, confidence::PLATFORM)
                }
                Err(e) => {
                    warn!(
                        "{} using {} keyword fallback: {}",
                        Self::NAME,
                        input.platform,
                        e
                    );
                    (
                        fallback_platform(&input.base_prompt, input.platform),
                        confidence::PLATFORM_FALLBACK,
                    )
                }
            };

        Ok(AgentResult::new(Self::NAME, content, score, start.elapsed()))
    }
}

/// Base prompt with the platform's ratio, trend keywords and engagement
/// language appended.
pub fn fallback_platform(base_prompt: &str, platform: Platform) -> String {
    let profile = platform_profile(platform);
    format!(
        "{}, {} aspect ratio, {}, {}",
        base_prompt.trim().trim_end_matches('.'),
        profile.image_aspect_ratio,
        profile.trend_keywords.join(", "),
        profile.engagement
    )
}

/// Video variant; inference failures are returned, not absorbed.
#[derive(Debug, Clone)]
pub struct VideoPlatformOptimizer {
    client: Arc<dyn InferenceClient>,
}

impl VideoPlatformOptimizer {
    pub const NAME: &'static str = "VideoPlatformOptimizer";

    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for VideoPlatformOptimizer {
    type Input = VideoPlatformInput;

    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: &VideoPlatformInput) -> Result<AgentResult> {
        let start = Instant::now();
        let profile = platform_profile(input.platform);
        let prompt = prompts::video_platform_prompt(
            &input.facts,
            &input.base_prompt,
            &input.motion_specs,
            &profile,
        );

        let text = complete_text(&self.client, &prompt, PLATFORM_TEMPERATURE).await?;
        debug!("{} adapted prompt for {}", Self::NAME, input.platform);
        Ok(AgentResult::new(
            Self::NAME,
            text,
            confidence::PLATFORM,
            start.elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::*;
    use crate::test_support::ScriptedClient;

    fn input(platform: Platform) -> PlatformInput {
        PlatformInput {
            facts: ContextFacts::generic(),
            base_prompt: "A latte on a marble counter.".to_string(),
            platform,
        }
    }

    #[tokio::test]
    async fn happy_path_mentions_platform_profile() {
        let client = ScriptedClient::replying("A latte framed vertically");
        let result = PlatformOptimizer::new(client.clone())
            .process(&input(Platform::Pinterest))
            .await
            .unwrap();

        assert_eq!(result.content, "A latte framed vertically");
        assert_eq!(result.confidence, confidence::PLATFORM);
        let (prompt, _) = &client.prompts()[0];
        assert!(prompt.starts_with(prompts::PLATFORM_OPTIMIZER_ROLE));
        assert!(prompt.contains("Aspect ratio: 2:3"));
    }

    #[tokio::test]
    #[traced_test]
    async fn fallback_appends_platform_keywords() {
        let result = PlatformOptimizer::new(ScriptedClient::failing())
            .process(&input(Platform::Instagram))
            .await
            .unwrap();

        assert_eq!(result.confidence, 0.6);
        assert!(result.content.starts_with("A latte on a marble counter, 4:5 aspect ratio"));
        assert!(result.content.contains("scroll-stopping"));
        assert!(logs_contain("keyword fallback"));
    }

    #[tokio::test]
    async fn video_optimizer_propagates_failure() {
        let err = VideoPlatformOptimizer::new(ScriptedClient::failing())
            .process(&VideoPlatformInput {
                facts: VideoContextFacts::generic(),
                base_prompt: "A surfer".to_string(),
                motion_specs: "slow pan".to_string(),
                platform: Platform::Tiktok,
            })
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
