//! Prompt templates for agents.
//!
//! Every template opens with a distinct role line so that transcripts (and
//! scripted test clients) can tell the stages apart.

use crate::{
    agent_types::{ContextFacts, VideoContextFacts},
    catalog::{ModelProfile, PlatformProfile},
};

pub const CONTEXT_ANALYZER_ROLE: &str = "You are a creative brief analyst for image generation.";
pub const VIDEO_CONTEXT_ANALYZER_ROLE: &str =
    "You are a creative brief analyst for video generation.";
pub const VISUAL_GENERATOR_ROLE: &str = "You are a visual director composing a scene.";
pub const MOTION_GENERATOR_ROLE: &str = "You are a motion director planning camera and movement.";
pub const FLUX_SPECIALIST_ROLE: &str = "You are a Flux image model prompt specialist.";
pub const KLING_SPECIALIST_ROLE: &str = "You are a Kling video model prompt specialist.";
pub const PLATFORM_OPTIMIZER_ROLE: &str = "You are a social media image optimization expert.";
pub const VIDEO_PLATFORM_OPTIMIZER_ROLE: &str =
    "You are a social media video optimization expert.";
pub const COORDINATOR_ROLE: &str = "You are the final prompt coordinator for image generation.";
pub const VIDEO_COORDINATOR_ROLE: &str =
    "You are the final prompt coordinator for video generation.";

const FACT_FIELDS: &str = r#"  "content_type": category of content (product, portrait, landscape, lifestyle, ...),
  "industry": industry or niche,
  "objective": marketing objective,
  "audience": target audience,
  "visual_style": desired visual style,
  "temporal_context": time of day, season or event,
  "trending_topics": array of relevant trends"#;

const VIDEO_FACT_FIELDS: &str = r#"  "video_style": cinematic, documentary, commercial, ...,
  "motion_type": dominant motion in the scene,
  "camera_movement": preferred camera movement,
  "duration_preference": clip length such as 5s or 10s,
  "narrative_structure": how the clip unfolds"#;

pub fn context_analysis_prompt(user_input: &str) -> String {
    format!(
        "{CONTEXT_ANALYZER_ROLE}\n\n\
         Extract the key facts from this request:\n\"{user_input}\"\n\n\
         Respond with ONLY a JSON object with these fields:\n{{\n{FACT_FIELDS}\n}}"
    )
}

pub fn video_context_analysis_prompt(user_input: &str) -> String {
    format!(
        "{VIDEO_CONTEXT_ANALYZER_ROLE}\n\n\
         Extract the key facts from this request:\n\"{user_input}\"\n\n\
         Respond with ONLY a JSON object with these fields:\n{{\n{FACT_FIELDS},\n{VIDEO_FACT_FIELDS}\n}}"
    )
}

pub fn describe_context(facts: &ContextFacts) -> String {
    format!(
        "Content: {}\nIndustry: {}\nObjective: {}\nAudience: {}\nStyle: {}\nTime: {}\nTrends: {}",
        facts.content_type,
        facts.industry,
        facts.objective,
        facts.audience,
        facts.visual_style,
        facts.temporal_context,
        facts.trending_topics.join(", ")
    )
}

pub fn describe_video_context(facts: &VideoContextFacts) -> String {
    format!(
        "{}\nVideo style: {}\nMotion: {}\nCamera: {}\nDuration: {}\nNarrative: {}",
        describe_context(&facts.base),
        facts.video_style,
        facts.motion_type,
        facts.camera_movement,
        facts.duration_preference,
        facts.narrative_structure
    )
}

pub fn visual_prompt(user_input: &str, facts: &ContextFacts) -> String {
    format!(
        "{VISUAL_GENERATOR_ROLE}\n\n\
         Request: {user_input}\n\n{}\n\n\
         Write one paragraph of natural language describing the subject, action, \
         environment, atmosphere, composition and color palette. \
         No lists, no JSON, no preamble.",
        describe_context(facts)
    )
}

pub fn motion_prompt(facts: &VideoContextFacts, visual_base: &str) -> String {
    format!(
        "{MOTION_GENERATOR_ROLE}\n\n\
         Scene: {visual_base}\n\n{}\n\n\
         Describe the camera movement, subject motion and pacing for this scene in \
         two or three sentences. No lists, no preamble.",
        describe_video_context(facts)
    )
}

fn numbered(items: &[&str]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn flux_prompt(facts: &ContextFacts, base_prompt: &str, profile: &ModelProfile) -> String {
    format!(
        "{FLUX_SPECIALIST_ROLE}\n\n\
         Target model: {model}\nStyle: {style}\nGuidelines:\n{guidelines}\n\
         Example: {example}\n\n\
         Industry: {industry}\nObjective: {objective}\n\n\
         Rewrite this description for {model}, staying under {max} tokens:\n{base_prompt}\n\n\
         Return only the rewritten prompt.",
        model = profile.model,
        style = profile.style,
        guidelines = numbered(profile.guidelines),
        example = profile.example,
        industry = facts.industry,
        objective = facts.objective,
        max = profile.max_tokens,
    )
}

pub fn kling_prompt(
    facts: &VideoContextFacts,
    base_prompt: &str,
    motion_specs: &str,
    profile: &ModelProfile,
) -> String {
    format!(
        "{KLING_SPECIALIST_ROLE}\n\n\
         Target model: {model}\nStyle: {style}\nGuidelines:\n{guidelines}\n\
         Example: {example}\n\n{facts}\n\n\
         Scene: {base_prompt}\nMotion: {motion_specs}\n\n\
         Rewrite scene and motion as one {model} prompt under {max} tokens. \
         Return only the prompt.",
        model = profile.model,
        style = profile.style,
        guidelines = numbered(profile.guidelines),
        example = profile.example,
        facts = describe_video_context(facts),
        max = profile.max_tokens,
    )
}

pub fn platform_prompt(facts: &ContextFacts, base_prompt: &str, profile: &PlatformProfile) -> String {
    format!(
        "{PLATFORM_OPTIMIZER_ROLE}\n\n\
         Platform: {platform}\nAspect ratio: {ratio}\nTrends: {trends}\n\
         Constraints: {constraints}\nEngagement: {engagement}\n\n\
         Audience: {audience}\nObjective: {objective}\n\n\
         Adapt this description so it performs well on {platform}:\n{base_prompt}\n\n\
         Return only the adapted prompt.",
        platform = profile.platform,
        ratio = profile.image_aspect_ratio,
        trends = profile.trend_keywords.join(", "),
        constraints = profile.constraints.join(", "),
        engagement = profile.engagement,
        audience = facts.audience,
        objective = facts.objective,
    )
}

pub fn video_platform_prompt(
    facts: &VideoContextFacts,
    base_prompt: &str,
    motion_specs: &str,
    profile: &PlatformProfile,
) -> String {
    format!(
        "{VIDEO_PLATFORM_OPTIMIZER_ROLE}\n\n\
         Platform: {platform}\nAspect ratio: {ratio}\nMax length: {seconds}s\n\
         Trends: {trends}\nConstraints: {constraints}\nEngagement: {engagement}\n\n\
         Audience: {audience}\nDuration preference: {duration}\n\n\
         Scene: {base_prompt}\nMotion: {motion_specs}\n\n\
         Adapt scene and motion so the clip performs well on {platform}. \
         Return only the adapted prompt.",
        platform = profile.platform,
        ratio = profile.video_aspect_ratio,
        seconds = profile.max_video_seconds,
        trends = profile.trend_keywords.join(", "),
        constraints = profile.constraints.join(", "),
        engagement = profile.engagement,
        audience = facts.base.audience,
        duration = facts.duration_preference,
    )
}

pub struct CoordinationSections<'a> {
    pub facts: String,
    pub visual_base: &'a str,
    pub motion_base: Option<&'a str>,
    pub specialist: &'a str,
    pub platform: &'a str,
}

pub fn coordinator_prompt(
    role: &str,
    sections: &CoordinationSections<'_>,
    model: &ModelProfile,
    platform: &PlatformProfile,
) -> String {
    let motion = sections
        .motion_base
        .map(|m| format!("MOTION PLAN:\n{m}\n\n"))
        .unwrap_or_default();
    format!(
        "{role}\n\n\
         CONTEXT:\n{facts}\n\n\
         VISUAL BASE:\n{visual}\n\n{motion}\
         MODEL SPECIALIST ({model}):\n{specialist}\n\n\
         PLATFORM OPTIMIZER ({platform}):\n{platform_text}\n\n\
         Merge these into ONE final prompt for {model} on {platform}. Remove repeated \
         phrases; where the specialist and the platform advice conflict, keep the \
         model's conventions and the platform's framing. Stay under {max} tokens. \
         Return only the final prompt.",
        facts = sections.facts,
        visual = sections.visual_base,
        model = model.model,
        specialist = sections.specialist,
        platform = platform.platform,
        platform_text = sections.platform,
        max = model.max_tokens,
    )
}
