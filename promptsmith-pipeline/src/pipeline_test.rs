use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use promptsmith_agents::{
    AgentError, ContentType, InferenceClient, Platform, TargetModel, agent::estimate_tokens,
    catalog::model_profile, prompts,
};
use tokio_test::{assert_err, assert_ok};
use tracing_test::traced_test;

use crate::{
    config::PipelineConfig, orchestrator::PromptAgentSystem, pacing::PacingPolicy,
    request::GenerationRequest,
};

const ROLES: [&str; 10] = [
    prompts::CONTEXT_ANALYZER_ROLE,
    prompts::VIDEO_CONTEXT_ANALYZER_ROLE,
    prompts::VISUAL_GENERATOR_ROLE,
    prompts::MOTION_GENERATOR_ROLE,
    prompts::FLUX_SPECIALIST_ROLE,
    prompts::KLING_SPECIALIST_ROLE,
    prompts::PLATFORM_OPTIMIZER_ROLE,
    prompts::VIDEO_PLATFORM_OPTIMIZER_ROLE,
    prompts::COORDINATOR_ROLE,
    prompts::VIDEO_COORDINATOR_ROLE,
];

const RED_CAR: &str = "A red sports car driving through a neon city at night";

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail,
}

/// Answers by matching the role line each prompt opens with.
#[derive(Debug, Default)]
struct RoleClient {
    replies: HashMap<&'static str, Reply>,
    delays: HashMap<&'static str, Duration>,
    prompts: Mutex<Vec<String>>,
    events: Mutex<Vec<String>>,
}

impl RoleClient {
    fn happy() -> Self {
        let mut client = Self::default();
        client
            .reply(
                prompts::CONTEXT_ANALYZER_ROLE,
                r#"{"content_type": "product", "industry": "automotive",
                    "objective": "brand awareness", "audience": "young drivers",
                    "visual_style": "neon noir", "temporal_context": "night",
                    "trending_topics": ["ev culture"]}"#,
            )
            .reply(
                prompts::VIDEO_CONTEXT_ANALYZER_ROLE,
                r#"Here you go: {content_type: 'product', industry: 'automotive',
                    objective: 'awareness', audience: 'young drivers',
                    visual_style: 'neon noir', temporal_context: 'night',
                    video_style: 'cinematic', motion_type: 'fast driving',
                    camera_movement: 'low tracking shot', duration_preference: '5s',
                    narrative_structure: 'single continuous moment'}"#,
            )
            .reply(
                prompts::VISUAL_GENERATOR_ROLE,
                "A glossy red sports car racing through neon-lit city streets at night",
            )
            .reply(
                prompts::MOTION_GENERATOR_ROLE,
                "Low tracking shot following the car as light trails streak past",
            )
            .reply(
                prompts::FLUX_SPECIALIST_ROLE,
                "A glossy red sports car on rain-slick neon streets, 35mm, cinematic grade",
            )
            .reply(
                prompts::KLING_SPECIALIST_ROLE,
                "Wide shot: a red sports car speeds through neon streets, camera tracks low",
            )
            .reply(
                prompts::PLATFORM_OPTIMIZER_ROLE,
                "Scroll-stopping 4:5 frame of a red sports car under vibrant neon",
            )
            .reply(
                prompts::VIDEO_PLATFORM_OPTIMIZER_ROLE,
                "Vertical 9:16 clip of a red sports car with a hook in the first second",
            )
            .reply(
                prompts::COORDINATOR_ROLE,
                "Final prompt: A glossy red sports car on rain-slick neon streets at night, \
                 vibrant 4:5 composition, cinematic grade",
            )
            .reply(
                prompts::VIDEO_COORDINATOR_ROLE,
                "A red sports car speeds through neon streets at night, low tracking \
                 camera, light trails, vertical framing",
            );
        client
    }

    fn failing() -> Self {
        Self::default()
    }

    fn reply(&mut self, role: &'static str, text: &str) -> &mut Self {
        self.replies.insert(role, Reply::Text(text.to_string()));
        self
    }

    fn fail(&mut self, role: &'static str) -> &mut Self {
        self.replies.insert(role, Reply::Fail);
        self
    }

    fn delay(&mut self, role: &'static str, delay: Duration) -> &mut Self {
        self.delays.insert(role, delay);
        self
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn prompts_for(&self, role: &str) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| p.starts_with(role))
            .collect()
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for RoleClient {
    async fn complete(&self, prompt: &str, _temperature: f32) -> promptsmith_agents::Result<String> {
        let role = ROLES
            .into_iter()
            .find(|role| prompt.starts_with(role))
            .unwrap_or("unknown");
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.events.lock().unwrap().push(format!("start {role}"));
        tokio::task::yield_now().await;

        if let Some(delay) = self.delays.get(role) {
            tokio::time::sleep(*delay).await;
        }
        self.events.lock().unwrap().push(format!("end {role}"));

        match self.replies.get(role) {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Fail) | None => Err(AgentError::http(500, "internal server error")),
        }
    }
}

fn system(client: Arc<RoleClient>) -> PromptAgentSystem {
    let config = PipelineConfig::default().with_pacing(PacingPolicy::Unpaced);
    PromptAgentSystem::with_client(client, config).unwrap()
}

fn image_request() -> GenerationRequest {
    GenerationRequest::new(
        RED_CAR,
        ContentType::Image,
        Platform::Instagram,
        TargetModel::FluxDev,
    )
}

fn video_request() -> GenerationRequest {
    GenerationRequest::new(
        RED_CAR,
        ContentType::Video,
        Platform::Tiktok,
        TargetModel::Kling20,
    )
}

fn agent_names(result: &crate::PipelineResult) -> Vec<&str> {
    result
        .agent_responses
        .iter()
        .map(|r| r.agent_name.as_str())
        .collect()
}

#[tokio::test]
async fn image_run_produces_five_ordered_responses() {
    let client = Arc::new(RoleClient::happy());
    let result = assert_ok!(system(client.clone()).generate(&image_request()).await);

    assert_eq!(
        agent_names(&result),
        vec![
            "ContextAnalyzer",
            "VisualGenerator",
            "FluxSpecialist",
            "PlatformOptimizer",
            "Coordinator"
        ]
    );
    assert_eq!(result.metadata.agents_used, agent_names(&result));
    assert_eq!(result.metadata.content_type, ContentType::Image);
    assert_eq!(result.metadata.target_model, TargetModel::FluxDev);
    assert!(result.metadata.video_specs.is_none());
    assert_eq!(result.metadata.context.base().industry, "automotive");

    assert!(result.final_prompt.starts_with("A glossy red sports car"));
    assert!(result.metadata.estimated_tokens <= model_profile(TargetModel::FluxDev).max_tokens);
    assert_eq!(
        result.metadata.estimated_tokens,
        result.final_prompt.chars().count().div_ceil(4)
    );

    let mean = result
        .agent_responses
        .iter()
        .map(|r| r.confidence)
        .sum::<f64>()
        / 5.0;
    assert!((result.metadata.confidence_score - mean).abs() < 1e-9);
    assert!((0.0..=1.0).contains(&result.metadata.confidence_score));
    assert_eq!(client.prompts().len(), 5);
}

#[tokio::test]
async fn video_run_produces_six_responses_and_specs() {
    let client = Arc::new(RoleClient::happy());
    let result = assert_ok!(system(client).generate(&video_request()).await);

    assert_eq!(
        agent_names(&result),
        vec![
            "VideoContextAnalyzer",
            "VisualGenerator",
            "MotionGenerator",
            "KlingSpecialist",
            "VideoPlatformOptimizer",
            "VideoCoordinator"
        ]
    );
    // repaired from JavaScript-style output, so no fallback
    assert_eq!(result.agent_responses[0].confidence, 0.9);

    let specs = result.metadata.video_specs.clone().unwrap();
    assert_eq!(specs.aspect_ratio, "9:16");
    assert_eq!(specs.camera_movement, "low tracking shot");
    assert_eq!(specs.duration, "5s");

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["metadata"]["context"]["motion_type"], "fast driving");
    assert_eq!(json["metadata"]["target_model"], "kling-2.0");
}

#[tokio::test]
async fn image_result_survives_a_json_round_trip() {
    let client = Arc::new(RoleClient::happy());
    let result = assert_ok!(system(client).generate(&image_request()).await);

    let json = serde_json::to_string(&result).unwrap();
    let back: crate::PipelineResult = serde_json::from_str(&json).unwrap();
    assert!(back.metadata.context.as_video().is_none());
    assert!(back.metadata.video_specs.is_none());
    assert_eq!(back.metadata.context, result.metadata.context);
    assert_eq!(back.final_prompt, result.final_prompt);
    assert_eq!(agent_names(&back), agent_names(&result));
}

#[tokio::test]
async fn failing_inference_degrades_image_route() {
    let client = Arc::new(RoleClient::failing());
    let result = assert_ok!(system(client).generate(&image_request()).await);

    assert_eq!(result.agent_responses.len(), 5);
    for response in &result.agent_responses {
        assert!(
            response.confidence <= 0.7,
            "{} reported {}",
            response.agent_name,
            response.confidence
        );
    }
    assert_eq!(result.agent_responses[0].confidence, 0.5);
    assert_eq!(result.agent_responses[4].confidence, 0.7);
    assert!(!result.final_prompt.is_empty());
    assert!(estimate_tokens(&result.final_prompt) <= 150);
    assert!(result.metadata.confidence_score < 0.7);
}

#[tokio::test]
#[traced_test]
async fn failing_inference_aborts_video_route_at_kling() {
    let client = Arc::new(RoleClient::failing());
    let err = assert_err!(system(client.clone()).generate(&video_request()).await);

    assert_eq!(err.failed_agent(), Some("KlingSpecialist"));
    assert!(client.prompts_for(prompts::VIDEO_COORDINATOR_ROLE).is_empty());
    assert!(logs_contain("run aborted by KlingSpecialist"));
}

#[tokio::test]
async fn video_platform_optimizer_failure_is_fatal() {
    let mut client = RoleClient::happy();
    client.fail(prompts::VIDEO_PLATFORM_OPTIMIZER_ROLE);
    let err = assert_err!(system(Arc::new(client)).generate(&video_request()).await);
    assert_eq!(err.failed_agent(), Some("VideoPlatformOptimizer"));
}

#[tokio::test]
async fn unparseable_facts_fall_back_to_heuristic() {
    let mut client = RoleClient::happy();
    client.reply(prompts::CONTEXT_ANALYZER_ROLE, "I'd rather describe it in prose.");
    let result = assert_ok!(system(Arc::new(client)).generate(&image_request()).await);

    let analyzer = &result.agent_responses[0];
    assert_eq!(analyzer.agent_name, "ContextAnalyzer");
    assert_eq!(analyzer.confidence, 0.5);

    let facts = result.metadata.context.base();
    assert!(facts.missing_fields().is_empty());
    assert_eq!(facts.industry, "automotive");
    assert_eq!(facts.temporal_context, "night");
}

#[tokio::test]
async fn response_order_is_stable_under_delay() {
    for delayed in [prompts::FLUX_SPECIALIST_ROLE, prompts::PLATFORM_OPTIMIZER_ROLE] {
        let mut client = RoleClient::happy();
        client.delay(delayed, Duration::from_millis(80));
        let client = Arc::new(client);

        let result = assert_ok!(system(client.clone()).generate(&image_request()).await);
        assert_eq!(result.agent_responses[2].agent_name, "FluxSpecialist");
        assert_eq!(result.agent_responses[3].agent_name, "PlatformOptimizer");

        // both calls are in flight before either returns
        let events = client.events();
        let position = |event: String| events.iter().position(|e| *e == event).unwrap();
        let starts = [prompts::FLUX_SPECIALIST_ROLE, prompts::PLATFORM_OPTIMIZER_ROLE]
            .map(|role| position(format!("start {role}")));
        let first_end = [prompts::FLUX_SPECIALIST_ROLE, prompts::PLATFORM_OPTIMIZER_ROLE]
            .map(|role| position(format!("end {role}")))
            .into_iter()
            .min()
            .unwrap();
        assert!(starts.iter().all(|start| *start < first_end));
    }
}

#[tokio::test]
async fn variations_are_paced_and_marked() {
    let client = Arc::new(RoleClient::happy());
    let config = PipelineConfig::default()
        .with_pacing(PacingPolicy::FixedInterval(Duration::from_millis(50)));
    let system = PromptAgentSystem::with_client(client.clone(), config).unwrap();

    let start = Instant::now();
    let results = assert_ok!(system.generate_variations(&image_request(), 3).await);
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(results.len(), 3);

    let analyzed = client.prompts_for(prompts::CONTEXT_ANALYZER_ROLE);
    assert_eq!(analyzed.len(), 3);
    for (i, prompt) in analyzed.iter().enumerate() {
        assert!(prompt.contains(&format!("{RED_CAR} - variation {}", i + 1)));
    }

    let run_ids: std::collections::HashSet<_> =
        results.iter().map(|r| r.metadata.run_id).collect();
    assert_eq!(run_ids.len(), 3);
}

#[tokio::test]
async fn degraded_variations_keep_the_marker_out_of_the_prompt() {
    let client = Arc::new(RoleClient::failing());
    let results = assert_ok!(system(client.clone()).generate_variations(&image_request(), 2).await);

    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(result.final_prompt.starts_with(RED_CAR));
        assert!(
            !result.final_prompt.contains("variation"),
            "{}",
            result.final_prompt
        );
    }
    let analyzed = client.prompts_for(prompts::CONTEXT_ANALYZER_ROLE);
    assert!(analyzed[1].contains(&format!("{RED_CAR} - variation 2")));
}

#[tokio::test]
async fn variation_count_is_bounded() {
    let client = Arc::new(RoleClient::happy());
    let system = system(client.clone());

    for count in [0, 6] {
        let err = assert_err!(system.generate_variations(&image_request(), count).await);
        match err {
            crate::PipelineError::Validation(errors) => assert_eq!(errors.fields(), vec!["count"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn fatal_variation_aborts_the_batch() {
    let mut client = RoleClient::happy();
    client.fail(prompts::KLING_SPECIALIST_ROLE);
    let client = Arc::new(client);

    let err = assert_err!(system(client.clone()).generate_variations(&video_request(), 3).await);
    assert_eq!(err.failed_agent(), Some("KlingSpecialist"));
    assert_eq!(client.prompts_for(prompts::VIDEO_CONTEXT_ANALYZER_ROLE).len(), 1);
}

#[tokio::test]
async fn invalid_request_is_rejected_before_any_call() {
    let client = Arc::new(RoleClient::happy());
    let request = GenerationRequest::new(
        "red car",
        ContentType::Video,
        Platform::Instagram,
        TargetModel::FluxPro,
    );
    let err = assert_err!(system(client.clone()).generate(&request).await);
    match err {
        crate::PipelineError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["user_input", "target_model"])
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn optimize_existing_runs_only_final_stages() {
    let client = Arc::new(RoleClient::happy());
    let system = system(client.clone());

    let prompt = assert_ok!(
        system
            .optimize_existing(
                "  A bowl of ramen on a dark wooden table  ",
                Platform::Instagram,
                ContentType::Image,
                TargetModel::FluxPro,
            )
            .await
    );
    assert!(prompt.starts_with("A glossy red sports car"));

    let roles: Vec<&str> = client
        .prompts()
        .iter()
        .filter_map(|p| ROLES.into_iter().find(|r| p.starts_with(r)))
        .collect();
    assert_eq!(roles.len(), 3);
    assert!(!roles.contains(&prompts::CONTEXT_ANALYZER_ROLE));
    assert!(!roles.contains(&prompts::VISUAL_GENERATOR_ROLE));
    assert_eq!(roles.last(), Some(&prompts::COORDINATOR_ROLE));

    let flux = client.prompts_for(prompts::FLUX_SPECIALIST_ROLE);
    assert!(flux[0].contains("A bowl of ramen on a dark wooden table\n"));
    assert!(flux[0].contains("Industry: general"));
}

#[tokio::test]
async fn optimize_existing_video_uses_generic_motion() {
    let client = Arc::new(RoleClient::happy());
    let prompt = assert_ok!(
        system(client.clone())
            .optimize_existing(
                "A surfer carving a wave at sunrise",
                Platform::Youtube,
                ContentType::Video,
                TargetModel::Kling21,
            )
            .await
    );
    assert!(prompt.contains("low tracking camera"));

    let kling = client.prompts_for(prompts::KLING_SPECIALIST_ROLE);
    assert!(kling[0].contains("Motion: steady tracking shot"));
    assert!(client.prompts_for(prompts::MOTION_GENERATOR_ROLE).is_empty());
}

#[tokio::test]
async fn optimize_existing_validates_inputs() {
    let client = Arc::new(RoleClient::happy());
    let err = assert_err!(
        system(client.clone())
            .optimize_existing("   ", Platform::Tiktok, ContentType::Image, TargetModel::Kling16)
            .await
    );
    match err {
        crate::PipelineError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["prompt", "target_model"])
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn oversized_synthesis_is_clamped_to_the_model_ceiling() {
    let mut client = RoleClient::happy();
    let long = "neon reflections ripple across the glossy red bodywork ".repeat(40);
    client.reply(prompts::COORDINATOR_ROLE, &long);
    let request = GenerationRequest {
        target_model: TargetModel::FluxSchnell,
        ..image_request()
    };

    let result = assert_ok!(system(Arc::new(client)).generate(&request).await);
    assert!(result.metadata.estimated_tokens <= 80);
    assert!(long.starts_with(&result.final_prompt));
}
