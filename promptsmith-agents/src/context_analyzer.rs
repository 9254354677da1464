//! Context analyzers: free text to a structured fact sheet.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    agent::Agent,
    agent_types::{AgentResult, ContextFacts, VideoContextFacts, confidence},
    error::{AgentError, Result},
    inference::InferenceClient,
    json_repair::parse_lenient,
    prompts,
};

const ANALYSIS_TEMPERATURE: f32 = 0.3;

/// Extracted facts together with the logged agent result.
#[derive(Debug, Clone)]
pub struct Analysis<T> {
    pub facts: T,
    pub result: AgentResult,
}

fn finish<T: Serialize>(
    agent_name: &str,
    facts: T,
    confidence: f64,
    start: Instant,
) -> Result<Analysis<T>> {
    let content = serde_json::to_string(&facts)?;
    Ok(Analysis {
        facts,
        result: AgentResult::new(agent_name, content, confidence, start.elapsed()),
    })
}

/// Analyzer reply as parsed: absent fields read as blank and are reported
/// by `missing_fields` after conversion.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFacts {
    content_type: String,
    industry: String,
    objective: String,
    audience: String,
    visual_style: String,
    temporal_context: String,
    trending_topics: Vec<String>,
}

impl From<RawFacts> for ContextFacts {
    fn from(raw: RawFacts) -> Self {
        Self {
            content_type: raw.content_type,
            industry: raw.industry,
            objective: raw.objective,
            audience: raw.audience,
            visual_style: raw.visual_style,
            temporal_context: raw.temporal_context,
            trending_topics: raw.trending_topics,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawVideoFacts {
    #[serde(flatten)]
    base: RawFacts,
    video_style: String,
    motion_type: String,
    camera_movement: String,
    duration_preference: String,
    narrative_structure: String,
}

impl From<RawVideoFacts> for VideoContextFacts {
    fn from(raw: RawVideoFacts) -> Self {
        Self {
            base: raw.base.into(),
            video_style: raw.video_style,
            motion_type: raw.motion_type,
            camera_movement: raw.camera_movement,
            duration_preference: raw.duration_preference,
            narrative_structure: raw.narrative_structure,
        }
    }
}

fn require_complete(missing: Vec<&'static str>) -> Result<()> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AgentError::malformed(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Image-route analyzer.
#[derive(Debug, Clone)]
pub struct ContextAnalyzer {
    client: Arc<dyn InferenceClient>,
}

impl ContextAnalyzer {
    pub const NAME: &'static str = "ContextAnalyzer";

    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    pub async fn analyze(&self, user_input: &str) -> Result<Analysis<ContextFacts>> {
        let start = Instant::now();
        let prompt = prompts::context_analysis_prompt(user_input);

        let extracted = match self.client.complete(&prompt, ANALYSIS_TEMPERATURE).await {
            Ok(raw) => parse_lenient::<RawFacts>(&raw).and_then(|raw| {
                let mut facts = ContextFacts::from(raw);
                backfill_topics(&mut facts, user_input);
                require_complete(facts.missing_fields()).map(|_| facts)
            }),
            Err(e) => Err(e),
        };

        match extracted {
            Ok(facts) => {
                debug!("{} extracted facts for industry '{}'", Self::NAME, facts.industry);
                finish(Self::NAME, facts, confidence::ANALYZER, start)
            }
            Err(e) => {
                warn!(
                    "{} falling back to keyword heuristic ({}): {}",
                    Self::NAME,
                    e.category(),
                    e
                );
                finish(
                    Self::NAME,
                    heuristic_facts(user_input),
                    confidence::ANALYZER_FALLBACK,
                    start,
                )
            }
        }
    }
}

#[async_trait]
impl Agent for ContextAnalyzer {
    type Input = String;

    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: &String) -> Result<AgentResult> {
        Ok(self.analyze(input).await?.result)
    }
}

/// Video-route analyzer.
#[derive(Debug, Clone)]
pub struct VideoContextAnalyzer {
    client: Arc<dyn InferenceClient>,
}

impl VideoContextAnalyzer {
    pub const NAME: &'static str = "VideoContextAnalyzer";

    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    pub async fn analyze(&self, user_input: &str) -> Result<Analysis<VideoContextFacts>> {
        let start = Instant::now();
        let prompt = prompts::video_context_analysis_prompt(user_input);

        let extracted = match self.client.complete(&prompt, ANALYSIS_TEMPERATURE).await {
            Ok(raw) => parse_lenient::<RawVideoFacts>(&raw).and_then(|raw| {
                let mut facts = VideoContextFacts::from(raw);
                backfill_topics(&mut facts.base, user_input);
                require_complete(facts.missing_fields()).map(|_| facts)
            }),
            Err(e) => Err(e),
        };

        match extracted {
            Ok(facts) => {
                debug!(
                    "{} extracted facts, motion '{}'",
                    Self::NAME,
                    facts.motion_type
                );
                finish(Self::NAME, facts, confidence::ANALYZER, start)
            }
            Err(e) => {
                warn!(
                    "{} falling back to keyword heuristic ({}): {}",
                    Self::NAME,
                    e.category(),
                    e
                );
                finish(
                    Self::NAME,
                    heuristic_video_facts(user_input),
                    confidence::ANALYZER_FALLBACK,
                    start,
                )
            }
        }
    }
}

#[async_trait]
impl Agent for VideoContextAnalyzer {
    type Input = String;

    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: &String) -> Result<AgentResult> {
        Ok(self.analyze(input).await?.result)
    }
}

fn backfill_topics(facts: &mut ContextFacts, user_input: &str) {
    facts.trending_topics.retain(|t| !t.trim().is_empty());
    if facts.trending_topics.is_empty() {
        facts.trending_topics = trending_topics_for(&classify(user_input, INDUSTRIES, "general"));
    }
}

type KeywordTable = &'static [(&'static str, &'static [&'static str])];

const CONTENT_TYPES: KeywordTable = &[
    ("food", &["food", "dish", "meal", "recipe", "pizza", "burger", "cake", "coffee"]),
    (
        "product",
        &[
            "product", "products", "bottle", "packaging", "shoe", "shoes", "watch", "gadget",
            "device", "car", "cars", "vehicle",
        ],
    ),
    (
        "portrait",
        &["portrait", "person", "woman", "man", "face", "headshot", "people", "model"],
    ),
    (
        "landscape",
        &[
            "landscape", "mountain", "mountains", "beach", "forest", "city", "skyline", "nature",
            "ocean",
        ],
    ),
    ("lifestyle", &["lifestyle", "family", "friends", "home", "everyday"]),
];

const INDUSTRIES: KeywordTable = &[
    (
        "food",
        &[
            "food", "restaurant", "coffee", "cafe", "pizza", "burger", "meal", "dish", "recipe",
            "bakery", "cake", "drink",
        ],
    ),
    (
        "automotive",
        &["car", "cars", "vehicle", "truck", "motorcycle", "automotive", "suv"],
    ),
    (
        "fashion",
        &["fashion", "clothing", "dress", "outfit", "apparel", "sneakers", "jewelry"],
    ),
    (
        "technology",
        &[
            "tech", "technology", "phone", "smartphone", "app", "software", "laptop", "gadget",
            "ai", "robot",
        ],
    ),
    (
        "beauty",
        &["beauty", "makeup", "skincare", "cosmetics", "cosmetic", "salon", "perfume"],
    ),
    (
        "fitness",
        &["fitness", "gym", "workout", "yoga", "athlete", "running", "sport"],
    ),
    (
        "travel",
        &["travel", "hotel", "vacation", "resort", "tourism", "adventure"],
    ),
    (
        "real estate",
        &["house", "apartment", "property", "interior", "real estate"],
    ),
];

const OBJECTIVES: KeywordTable = &[
    (
        "sales",
        &["sell", "sale", "sales", "buy", "discount", "offer", "promo", "promotion", "shop"],
    ),
    (
        "product launch",
        &["launch", "new", "introducing", "announce", "release"],
    ),
    (
        "engagement",
        &["engage", "engagement", "community", "fun", "share", "viral"],
    ),
    ("education", &["learn", "tutorial", "how", "explain", "guide"]),
];

const AUDIENCES: KeywordTable = &[
    ("young adults", &["young", "teen", "teens", "gen z", "students"]),
    (
        "professionals",
        &["professional", "professionals", "business", "b2b", "corporate"],
    ),
    ("families", &["family", "families", "kids", "parents", "children"]),
    ("luxury buyers", &["luxury", "premium", "exclusive"]),
];

const VISUAL_STYLES: KeywordTable = &[
    ("cyberpunk neon", &["neon", "cyberpunk", "futuristic"]),
    ("minimalist", &["minimal", "minimalist", "clean", "simple"]),
    ("vintage", &["vintage", "retro", "nostalgic"]),
    ("cinematic", &["cinematic", "dramatic", "epic", "film"]),
    ("luxury", &["luxury", "elegant", "premium"]),
    ("playful", &["playful", "colorful", "fun", "cartoon"]),
];

const TEMPORAL_CONTEXTS: KeywordTable = &[
    ("night", &["night", "midnight", "evening", "dark"]),
    ("sunset", &["sunset", "dusk", "golden hour"]),
    ("morning", &["morning", "sunrise", "dawn"]),
    ("holiday season", &["christmas", "holiday", "holidays"]),
    ("halloween", &["halloween"]),
    ("summer", &["summer"]),
    ("winter", &["winter", "snow"]),
];

const VIDEO_STYLES: KeywordTable = &[
    ("documentary", &["documentary", "authentic", "real"]),
    ("animated", &["animation", "animated", "cartoon"]),
    (
        "commercial",
        &["commercial", "ad", "advert", "advertisement", "promo"],
    ),
    ("vlog", &["vlog"]),
    ("music video", &["music"]),
];

const MOTION_TYPES: KeywordTable = &[
    ("slow motion", &["slow motion", "slow mo", "slowmo"]),
    ("time-lapse", &["timelapse", "time lapse"]),
    (
        "dynamic action",
        &[
            "driving", "running", "racing", "flying", "jumping", "dancing", "moving", "chase",
        ],
    ),
    (
        "gentle ambient motion",
        &["calm", "peaceful", "serene", "relaxing"],
    ),
];

const CAMERA_MOVEMENTS: KeywordTable = &[
    ("aerial drone shot", &["drone", "aerial", "overhead"]),
    (
        "tracking shot",
        &["tracking", "follow", "following", "chase", "driving"],
    ),
    ("slow pan", &["pan", "panning", "panoramic"]),
    ("slow zoom in", &["zoom", "close up", "closeup"]),
    ("orbit around subject", &["orbit", "360", "around"]),
];

const DURATIONS: KeywordTable = &[
    ("10s", &["long", "extended", "10s", "10 seconds", "story"]),
    ("5s", &["short", "quick", "brief", "5s", "5 seconds"]),
];

const NARRATIVES: KeywordTable = &[
    ("story arc", &["story", "journey", "narrative"]),
    ("product reveal", &["reveal", "unveil", "unboxing", "launch"]),
    ("before and after", &["before", "after", "transformation"]),
    ("seamless loop", &["loop", "looping"]),
];

/// Lower-cased input with every non-alphanumeric run collapsed to one space,
/// padded so keywords can be matched on word boundaries.
fn normalize(text: &str) -> String {
    let words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    format!(" {} ", words.join(" "))
}

fn classify(text: &str, table: KeywordTable, default: &str) -> String {
    let normalized = normalize(text);
    table
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|kw| normalized.contains(&format!(" {kw} ")))
        })
        .map(|(label, _)| *label)
        .unwrap_or(default)
        .to_string()
}

fn trending_topics_for(industry: &str) -> Vec<String> {
    let topics: &[&str] = match industry {
        "food" => &["food styling", "farm to table"],
        "automotive" => &["electric vehicles", "car culture"],
        "fashion" => &["sustainable fashion", "street style"],
        "technology" => &["ai innovation", "smart devices"],
        "beauty" => &["clean beauty", "self care"],
        "fitness" => &["wellness", "home workouts"],
        "travel" => &["hidden gems", "slow travel"],
        "real estate" => &["dream homes", "interior design"],
        _ => &["authentic content", "visual storytelling"],
    };
    topics.iter().map(|t| t.to_string()).collect()
}

/// Total keyword heuristic; every field has a default.
pub fn heuristic_facts(user_input: &str) -> ContextFacts {
    let industry = classify(user_input, INDUSTRIES, "general");
    ContextFacts {
        content_type: classify(user_input, CONTENT_TYPES, "general"),
        objective: classify(user_input, OBJECTIVES, "brand awareness"),
        audience: classify(user_input, AUDIENCES, "general audience"),
        visual_style: classify(user_input, VISUAL_STYLES, "modern professional"),
        temporal_context: classify(user_input, TEMPORAL_CONTEXTS, "timeless"),
        trending_topics: trending_topics_for(&industry),
        industry,
    }
}

pub fn heuristic_video_facts(user_input: &str) -> VideoContextFacts {
    VideoContextFacts {
        base: heuristic_facts(user_input),
        video_style: classify(user_input, VIDEO_STYLES, "cinematic"),
        motion_type: classify(user_input, MOTION_TYPES, "smooth natural motion"),
        camera_movement: classify(user_input, CAMERA_MOVEMENTS, "smooth dolly forward"),
        duration_preference: classify(user_input, DURATIONS, "5s"),
        narrative_structure: classify(user_input, NARRATIVES, "single continuous moment"),
    }
}
