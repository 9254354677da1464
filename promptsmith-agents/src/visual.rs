//! Visual and motion base generators.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    agent::{Agent, complete_text},
    agent_types::{AgentResult, ContextFacts, VideoContextFacts, confidence},
    error::Result,
    inference::InferenceClient,
    prompts,
};

const GENERATION_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct VisualInput {
    /// Text sent to the model, variation marker included.
    pub user_input: String,
    /// The request as the user wrote it; used by the template fallback.
    pub subject: String,
    pub facts: ContextFacts,
}

#[derive(Debug, Clone)]
pub struct MotionInput {
    pub facts: VideoContextFacts,
    pub visual_base: String,
}

/// Writes the natural-language visual base shared by both routes.
#[derive(Debug, Clone)]
pub struct VisualGenerator {
    client: Arc<dyn InferenceClient>,
}

impl VisualGenerator {
    pub const NAME: &'static str = "VisualGenerator";

    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for VisualGenerator {
    type Input = VisualInput;

    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: &VisualInput) -> Result<AgentResult> {
        let start = Instant::now();
        let prompt = prompts::visual_prompt(&input.user_input, &input.facts);

        let (content, score) =
            match complete_text(&self.client, &prompt, GENERATION_TEMPERATURE).await {
                Ok(text) => {
                    debug!("{} produced {} chars", Self::NAME, text.len());
                    (text, confidence::GENERATOR)
                }
                Err(e) => {
                    warn!("{} using template fallback: {}", Self::NAME, e);
                    (
                        fallback_visual(&input.subject, &input.facts),
                        confidence::GENERATOR_FALLBACK,
                    )
                }
            };

        Ok(AgentResult::new(Self::NAME, content, score, start.elapsed()))
    }
}

/// Describes camera movement, subject motion and pacing for the video route.
#[derive(Debug, Clone)]
pub struct MotionGenerator {
    client: Arc<dyn InferenceClient>,
}

impl MotionGenerator {
    pub const NAME: &'static str = "MotionGenerator";

    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for MotionGenerator {
    type Input = MotionInput;

    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: &MotionInput) -> Result<AgentResult> {
        let start = Instant::now();
        let prompt = prompts::motion_prompt(&input.facts, &input.visual_base);

        let (content, score) =
            match complete_text(&self.client, &prompt, GENERATION_TEMPERATURE).await {
                Ok(text) => {
                    debug!("{} produced {} chars", Self::NAME, text.len());
                    (text, confidence::GENERATOR)
                }
                Err(e) => {
                    warn!("{} using template fallback: {}", Self::NAME, e);
                    (fallback_motion(&input.facts), confidence::GENERATOR_FALLBACK)
                }
            };

        Ok(AgentResult::new(Self::NAME, content, score, start.elapsed()))
    }
}

fn industry_phrase(industry: &str) -> &'static str {
    match industry {
        "food" => "appetizing food photography with rich textures",
        "automotive" => "sleek automotive photography with glossy reflections",
        "fashion" => "editorial fashion photography with tailored styling",
        "technology" => "crisp technology product shot with clean surfaces",
        "beauty" => "luminous beauty close-up with flawless detail",
        "fitness" => "energetic fitness photography capturing peak effort",
        "travel" => "immersive travel photography with a sense of place",
        "real estate" => "bright architectural photography with open space",
        _ => "professional commercial photography",
    }
}

fn lighting_phrase(temporal_context: &str) -> &'static str {
    match temporal_context {
        "night" => "dramatic night lighting with glowing highlights",
        "sunset" => "warm golden hour light",
        "morning" => "soft fresh morning light",
        "winter" => "cool crisp winter light",
        "summer" => "bright summer sunlight",
        _ => "balanced natural lighting",
    }
}

/// Template visual base built only from the request subject and the facts.
pub fn fallback_visual(subject: &str, facts: &ContextFacts) -> String {
    let subject = subject.trim().trim_end_matches(['.', '!']);
    format!(
        "{subject}, {}, {}, {} style, composed for {}",
        industry_phrase(&facts.industry),
        lighting_phrase(&facts.temporal_context),
        facts.visual_style,
        facts.audience
    )
}

pub fn fallback_motion(facts: &VideoContextFacts) -> String {
    let pacing = if facts.duration_preference.starts_with("10") {
        "unfolding gradually across a ten second shot"
    } else {
        "paced as a single five second shot"
    };
    format!(
        "{} following the subject, {} in a {} look, {}",
        facts.camera_movement, facts.motion_type, facts.video_style, pacing
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::ScriptedClient;

    fn food_facts() -> ContextFacts {
        ContextFacts {
            industry: "food".to_string(),
            temporal_context: "morning".to_string(),
            ..ContextFacts::generic()
        }
    }

    #[tokio::test]
    async fn visual_generator_cleans_model_text() {
        let client = ScriptedClient::replying("Prompt: \"A stack of pancakes at dawn\"");
        let generator = VisualGenerator::new(client.clone());
        let result = generator
            .process(&VisualInput {
                user_input: "Pancakes for breakfast".to_string(),
                subject: "Pancakes for breakfast".to_string(),
                facts: food_facts(),
            })
            .await
            .unwrap();

        assert_eq!(result.content, "A stack of pancakes at dawn");
        assert_eq!(result.confidence, confidence::GENERATOR);
        let (prompt, temperature) = &client.prompts()[0];
        assert!(prompt.starts_with(prompts::VISUAL_GENERATOR_ROLE));
        assert_eq!(*temperature, 0.7);
    }

    #[tokio::test]
    async fn visual_generator_falls_back_on_failure() {
        let generator = VisualGenerator::new(ScriptedClient::failing());
        let result = generator
            .process(&VisualInput {
                user_input: "Pancakes for breakfast.".to_string(),
                subject: "Pancakes for breakfast.".to_string(),
                facts: food_facts(),
            })
            .await
            .unwrap();

        assert_eq!(result.confidence, 0.5);
        assert!(result.content.starts_with("Pancakes for breakfast, appetizing food photography"));
        assert!(result.content.contains("soft fresh morning light"));
    }

    #[tokio::test]
    async fn visual_fallback_templates_the_subject_not_the_model_text() {
        let generator = VisualGenerator::new(ScriptedClient::failing());
        let result = generator
            .process(&VisualInput {
                user_input: "Pancakes for breakfast - variation 3".to_string(),
                subject: "Pancakes for breakfast".to_string(),
                facts: food_facts(),
            })
            .await
            .unwrap();

        assert!(result.content.starts_with("Pancakes for breakfast, appetizing"));
        assert!(!result.content.contains("variation"));
    }

    #[tokio::test]
    async fn empty_model_text_is_treated_as_failure() {
        let generator = VisualGenerator::new(ScriptedClient::replying("  \"\" "));
        let result = generator
            .process(&VisualInput {
                user_input: "Pancakes".to_string(),
                subject: "Pancakes".to_string(),
                facts: food_facts(),
            })
            .await
            .unwrap();
        assert_eq!(result.confidence, confidence::GENERATOR_FALLBACK);
    }

    #[tokio::test]
    async fn motion_generator_fallback_uses_video_facts() {
        let generator = MotionGenerator::new(ScriptedClient::failing());
        let facts = VideoContextFacts {
            camera_movement: "aerial drone shot".to_string(),
            duration_preference: "10s".to_string(),
            ..VideoContextFacts::generic()
        };
        let result = generator
            .process(&MotionInput {
                facts,
                visual_base: "A surfer on a wave".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.agent_name, "MotionGenerator");
        assert_eq!(result.confidence, confidence::GENERATOR_FALLBACK);
        assert!(result.content.starts_with("aerial drone shot"));
        assert!(result.content.contains("ten second"));
    }
}
