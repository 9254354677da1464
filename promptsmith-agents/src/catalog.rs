//! Static prompting profiles for target models and publishing platforms.

use serde::Serialize;

use crate::agent_types::{Platform, TargetModel};

/// How a target model likes to be prompted.
#[derive(Debug, Clone, Serialize)]
pub struct ModelProfile {
    pub model: TargetModel,
    pub style: &'static str,
    pub guidelines: &'static [&'static str],
    pub example: &'static str,
    /// Upper bound for the final prompt, in estimated tokens.
    pub max_tokens: usize,
}

/// Composition and engagement conventions of a publishing platform.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub image_aspect_ratio: &'static str,
    pub video_aspect_ratio: &'static str,
    pub trend_keywords: &'static [&'static str],
    pub constraints: &'static [&'static str],
    pub engagement: &'static str,
    pub max_video_seconds: u32,
}

pub fn model_profile(model: TargetModel) -> ModelProfile {
    match model {
        TargetModel::FluxPro => ModelProfile {
            model,
            style: "rich, highly descriptive natural language with precise photographic detail",
            guidelines: &[
                "Lead with the main subject and its defining attributes",
                "Describe lighting, lens and camera settings explicitly",
                "Specify materials, textures and fine surface detail",
                "Close with overall mood and color grading",
            ],
            example: "A sleek matte-black sports car parked on wet cobblestones at dusk, \
                      shot on a 35mm lens at f/2.8, warm streetlight reflections rippling \
                      across the bodywork, cinematic teal and orange grade, ultra-detailed",
            max_tokens: 200,
        },
        TargetModel::FluxDev => ModelProfile {
            model,
            style: "clear natural-language description with balanced detail",
            guidelines: &[
                "Describe the subject, setting and action in one flowing sentence",
                "Mention lighting and atmosphere",
                "Keep technical jargon light",
                "Avoid comma-separated keyword lists",
            ],
            example: "A red vintage bicycle leaning against a sunlit brick wall covered \
                      in ivy, soft morning light, calm and nostalgic atmosphere",
            max_tokens: 150,
        },
        TargetModel::FluxSchnell => ModelProfile {
            model,
            style: "short, direct description focused on the essentials",
            guidelines: &[
                "One sentence, subject first",
                "Only the most important visual attributes",
                "No secondary details",
            ],
            example: "Steaming cup of coffee on a wooden table, cozy morning light",
            max_tokens: 80,
        },
        TargetModel::Kling16 => ModelProfile {
            model,
            style: "subject plus a single clear motion and camera instruction",
            guidelines: &[
                "State the subject and one primary movement",
                "Name one camera movement",
                "Keep the scene physically plausible",
            ],
            example: "A golden retriever runs across a sunny meadow, camera tracks \
                      alongside at ground level, gentle slow motion",
            max_tokens: 120,
        },
        TargetModel::Kling20 => ModelProfile {
            model,
            style: "cinematic shot description with explicit motion, camera and pacing",
            guidelines: &[
                "Open with shot type and subject",
                "Describe subject motion in sequence",
                "Specify camera movement and speed",
                "Describe lighting changes over the shot",
            ],
            example: "Wide shot: a surfer paddles into a cresting wave at sunrise, rises \
                      and carves down the face; drone camera pulls back slowly, golden \
                      light sparkling on the spray",
            max_tokens: 150,
        },
        TargetModel::Kling21 => ModelProfile {
            model,
            style: "detailed multi-beat cinematic direction with precise physics and camera choreography",
            guidelines: &[
                "Structure the shot as beginning, middle and end beats",
                "Describe realistic physics of moving elements",
                "Choreograph the camera relative to the subject",
                "Specify lighting, lens feel and color grade",
            ],
            example: "Opening on a close-up of rain hitting a neon sign, the camera cranes \
                      down to a courier weaving a bicycle through traffic, then tracks \
                      beside them as reflections streak across the wet asphalt, anamorphic \
                      flares, moody cyberpunk grade",
            max_tokens: 180,
        },
    }
}

pub fn platform_profile(platform: Platform) -> PlatformProfile {
    match platform {
        Platform::Instagram => PlatformProfile {
            platform,
            image_aspect_ratio: "4:5",
            video_aspect_ratio: "9:16",
            trend_keywords: &["aesthetic", "scroll-stopping", "vibrant colors"],
            constraints: &["strong focal point", "works on small mobile screens"],
            engagement: "bold, visually striking composition that stops the scroll",
            max_video_seconds: 90,
        },
        Platform::Tiktok => PlatformProfile {
            platform,
            image_aspect_ratio: "9:16",
            video_aspect_ratio: "9:16",
            trend_keywords: &["authentic", "dynamic", "trend-driven energy"],
            constraints: &["vertical framing", "hook within the first second"],
            engagement: "energetic, authentic moment with an immediate visual hook",
            max_video_seconds: 60,
        },
        Platform::Youtube => PlatformProfile {
            platform,
            image_aspect_ratio: "16:9",
            video_aspect_ratio: "16:9",
            trend_keywords: &["cinematic", "high production value", "thumbnail-ready"],
            constraints: &["horizontal framing", "clear subject separation"],
            engagement: "cinematic framing with a clear, curiosity-driving subject",
            max_video_seconds: 600,
        },
        Platform::Linkedin => PlatformProfile {
            platform,
            image_aspect_ratio: "1.91:1",
            video_aspect_ratio: "1:1",
            trend_keywords: &["professional", "clean", "trustworthy"],
            constraints: &["uncluttered background", "business-appropriate tone"],
            engagement: "polished, credible scene that conveys expertise",
            max_video_seconds: 120,
        },
        Platform::Twitter => PlatformProfile {
            platform,
            image_aspect_ratio: "16:9",
            video_aspect_ratio: "16:9",
            trend_keywords: &["bold", "timely", "high contrast"],
            constraints: &["readable at small sizes", "single clear message"],
            engagement: "punchy, high-contrast image that reads instantly in a feed",
            max_video_seconds: 140,
        },
        Platform::Facebook => PlatformProfile {
            platform,
            image_aspect_ratio: "1:1",
            video_aspect_ratio: "4:5",
            trend_keywords: &["relatable", "warm", "shareable"],
            constraints: &["centered subject", "friendly tone"],
            engagement: "warm, relatable scene people want to share",
            max_video_seconds: 120,
        },
        Platform::Pinterest => PlatformProfile {
            platform,
            image_aspect_ratio: "2:3",
            video_aspect_ratio: "2:3",
            trend_keywords: &["inspirational", "styled", "dreamy"],
            constraints: &["tall vertical framing", "space for a title overlay"],
            engagement: "aspirational, carefully styled scene worth saving",
            max_video_seconds: 60,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_model_has_a_profile() {
        for model in TargetModel::ALL {
            let profile = model_profile(model);
            assert_eq!(profile.model, model);
            assert!(!profile.guidelines.is_empty());
            assert!(profile.max_tokens > 0);
        }
        assert_eq!(model_profile(TargetModel::FluxDev).max_tokens, 150);
    }

    #[test]
    fn every_platform_has_a_profile() {
        for platform in Platform::ALL {
            let profile = platform_profile(platform);
            assert_eq!(profile.platform, platform);
            assert!(!profile.trend_keywords.is_empty());
        }
    }
}
