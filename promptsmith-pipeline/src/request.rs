//! Generation requests and their validation.

use promptsmith_agents::{ContentType, Platform, TargetModel};
use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;

pub const MIN_INPUT_CHARS: usize = 10;
pub const MAX_INPUT_CHARS: usize = 2000;

/// Untyped request as received from a web layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGenerationRequest {
    pub user_input: String,
    pub content_type: String,
    pub platform: String,
    pub target_model: String,
}

/// Validated, immutable generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub user_input: String,
    pub content_type: ContentType,
    pub platform: Platform,
    pub target_model: TargetModel,
}

impl GenerationRequest {
    pub fn new(
        user_input: impl Into<String>,
        content_type: ContentType,
        platform: Platform,
        target_model: TargetModel,
    ) -> Self {
        Self {
            user_input: user_input.into(),
            content_type,
            platform,
            target_model,
        }
    }

    /// Check the invariants a typed request can still violate.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_user_input(&self.user_input, &mut errors);
        check_model(self.target_model, self.content_type, &mut errors);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Copy of this request with the variation marker appended to the input.
    pub fn variation(&self, index: usize) -> Self {
        Self {
            user_input: format!("{} - variation {index}", self.user_input),
            ..self.clone()
        }
    }
}

impl TryFrom<RawGenerationRequest> for GenerationRequest {
    type Error = ValidationErrors;

    /// Parse every field, collecting one error per rejected field.
    fn try_from(raw: RawGenerationRequest) -> Result<Self, Self::Error> {
        let mut errors = ValidationErrors::default();
        check_user_input(&raw.user_input, &mut errors);

        let content_type = raw
            .content_type
            .parse::<ContentType>()
            .map_err(|e| errors.push("content_type", e.to_string()))
            .ok();
        let platform = raw
            .platform
            .parse::<Platform>()
            .map_err(|e| errors.push("platform", e.to_string()))
            .ok();
        let target_model = raw
            .target_model
            .parse::<TargetModel>()
            .map_err(|e| errors.push("target_model", e.to_string()))
            .ok();

        if let (Some(model), Some(content_type)) = (target_model, content_type) {
            check_model(model, content_type, &mut errors);
        }

        match (content_type, platform, target_model) {
            (Some(content_type), Some(platform), Some(target_model)) if errors.is_empty() => {
                Ok(Self {
                    user_input: raw.user_input,
                    content_type,
                    platform,
                    target_model,
                })
            }
            _ => Err(errors),
        }
    }
}

fn check_user_input(user_input: &str, errors: &mut ValidationErrors) {
    let chars = user_input.trim().chars().count();
    if chars == 0 {
        errors.push("user_input", "must not be empty");
    } else if chars < MIN_INPUT_CHARS {
        errors.push(
            "user_input",
            format!("must be at least {MIN_INPUT_CHARS} characters, got {chars}"),
        );
    } else if chars > MAX_INPUT_CHARS {
        errors.push(
            "user_input",
            format!("must be at most {MAX_INPUT_CHARS} characters, got {chars}"),
        );
    }
}

pub(crate) fn check_model(
    target_model: TargetModel,
    content_type: ContentType,
    errors: &mut ValidationErrors,
) {
    if !target_model.supports(content_type) {
        errors.push(
            "target_model",
            format!("{target_model} does not generate {content_type} content"),
        );
    }
}
