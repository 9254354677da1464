use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Output media family; selects the image or video route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Video,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(AgentError::validation(format!(
                "unknown content type '{other}'"
            ))),
        }
    }
}

/// Publishing platform the prompt is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
    Linkedin,
    Twitter,
    Facebook,
    Pinterest,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Instagram,
        Platform::Tiktok,
        Platform::Youtube,
        Platform::Linkedin,
        Platform::Twitter,
        Platform::Facebook,
        Platform::Pinterest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::Youtube => "youtube",
            Self::Linkedin => "linkedin",
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
            Self::Pinterest => "pinterest",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| AgentError::validation(format!("unknown platform '{wanted}'")))
    }
}

/// Generation model the final prompt targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetModel {
    #[serde(rename = "flux-pro")]
    FluxPro,
    #[serde(rename = "flux-dev")]
    FluxDev,
    #[serde(rename = "flux-schnell")]
    FluxSchnell,
    #[serde(rename = "kling-1.6")]
    Kling16,
    #[serde(rename = "kling-2.0")]
    Kling20,
    #[serde(rename = "kling-2.1")]
    Kling21,
}

impl TargetModel {
    pub const ALL: [TargetModel; 6] = [
        TargetModel::FluxPro,
        TargetModel::FluxDev,
        TargetModel::FluxSchnell,
        TargetModel::Kling16,
        TargetModel::Kling20,
        TargetModel::Kling21,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FluxPro => "flux-pro",
            Self::FluxDev => "flux-dev",
            Self::FluxSchnell => "flux-schnell",
            Self::Kling16 => "kling-1.6",
            Self::Kling20 => "kling-2.0",
            Self::Kling21 => "kling-2.1",
        }
    }

    /// The media family this model renders.
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::FluxPro | Self::FluxDev | Self::FluxSchnell => ContentType::Image,
            Self::Kling16 | Self::Kling20 | Self::Kling21 => ContentType::Video,
        }
    }

    pub fn supports(&self, content_type: ContentType) -> bool {
        self.content_type() == content_type
    }

    /// Models valid for the given content type.
    pub fn for_content_type(content_type: ContentType) -> impl Iterator<Item = TargetModel> {
        Self::ALL
            .into_iter()
            .filter(move |m| m.content_type() == content_type)
    }
}

impl fmt::Display for TargetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetModel {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| AgentError::validation(format!("unknown target model '{wanted}'")))
    }
}

/// Structured fact sheet extracted from the user's request.
///
/// `content_type` here is a content category (product, portrait, ...), not
/// the image/video route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextFacts {
    pub content_type: String,
    pub industry: String,
    pub objective: String,
    pub audience: String,
    pub visual_style: String,
    pub temporal_context: String,
    pub trending_topics: Vec<String>,
}

impl ContextFacts {
    /// Names of required text fields that are missing or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("content_type", &self.content_type),
            ("industry", &self.industry),
            ("objective", &self.objective),
            ("audience", &self.audience),
            ("visual_style", &self.visual_style),
            ("temporal_context", &self.temporal_context),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// All-generic facts used when no user request is available.
    pub fn generic() -> Self {
        Self {
            content_type: "general".to_string(),
            industry: "general".to_string(),
            objective: "brand awareness".to_string(),
            audience: "general audience".to_string(),
            visual_style: "modern professional".to_string(),
            temporal_context: "timeless".to_string(),
            trending_topics: vec!["authentic content".to_string()],
        }
    }
}

/// Video fact sheet: the image facts plus motion-related fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoContextFacts {
    #[serde(flatten)]
    pub base: ContextFacts,
    pub video_style: String,
    pub motion_type: String,
    pub camera_movement: String,
    pub duration_preference: String,
    pub narrative_structure: String,
}

impl VideoContextFacts {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = self.base.missing_fields();
        missing.extend(
            [
                ("video_style", &self.video_style),
                ("motion_type", &self.motion_type),
                ("camera_movement", &self.camera_movement),
                ("duration_preference", &self.duration_preference),
                ("narrative_structure", &self.narrative_structure),
            ]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name),
        );
        missing
    }

    pub fn generic() -> Self {
        Self {
            base: ContextFacts::generic(),
            video_style: "cinematic".to_string(),
            motion_type: "smooth natural motion".to_string(),
            camera_movement: "steady tracking shot".to_string(),
            duration_preference: "5s".to_string(),
            narrative_structure: "single continuous moment".to_string(),
        }
    }
}

/// Facts for either route, as carried in pipeline metadata.
///
/// Untagged: a fact sheet reads back as `Video` only when every video field
/// is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextData {
    Video(VideoContextFacts),
    Image(ContextFacts),
}

impl ContextData {
    /// The shared image-level facts.
    pub fn base(&self) -> &ContextFacts {
        match self {
            Self::Image(facts) => facts,
            Self::Video(facts) => &facts.base,
        }
    }

    pub fn as_video(&self) -> Option<&VideoContextFacts> {
        match self {
            Self::Video(facts) => Some(facts),
            Self::Image(_) => None,
        }
    }
}

/// Record of a single agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_name: String,
    pub content: String,
    pub confidence: f64,
    pub processing_time_ms: u64,
}

impl AgentResult {
    pub fn new(
        agent_name: impl Into<String>,
        content: impl Into<String>,
        confidence: f64,
        elapsed: Duration,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            content: content.into(),
            confidence: confidence.clamp(0.0, 1.0),
            processing_time_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Confidence bands reported by the agents.
pub mod confidence {
    pub const ANALYZER: f64 = 0.9;
    pub const ANALYZER_FALLBACK: f64 = 0.5;
    pub const GENERATOR: f64 = 0.85;
    pub const GENERATOR_FALLBACK: f64 = 0.5;
    pub const FLUX: f64 = 0.9;
    pub const FLUX_FALLBACK: f64 = 0.6;
    pub const KLING: f64 = 0.91;
    pub const PLATFORM: f64 = 0.88;
    pub const PLATFORM_FALLBACK: f64 = 0.6;
    pub const COORDINATOR: f64 = 0.95;
    pub const COORDINATOR_FALLBACK: f64 = 0.7;
}

/// Connection settings for the chat-completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1000,
            timeout: Duration::from_secs(60),
        }
    }
}

impl InferenceConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
