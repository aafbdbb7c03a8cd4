//! Shared test fixtures

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dd_agentic::{LlmClient, LlmError};

use crate::validator::MetadataSource;

/// Valid model reply for a cyberpunk dashboard prompt
pub fn cyberpunk_reply() -> &'static str {
    r##"{"theme":"dark","colorPalette":{"background":"#0d0d1a","foreground":"#00ffff","primary":"#ff0080","accent":"#00ff9f","highlight":"#ffff00"},"typography":{"fontFamily":"Orbitron, monospace","fontMood":"futuristic"},"layout":{"borderRadius":"md","spacing":"compact","depth":"deep"},"visualStyle":{"illustrationType":"holographic","backgroundVisual":"particle-field","lightingStyle":"neon","materialStyle":"glossy","blurLevel":"heavy"},"motionDesign":{"animationStyle":"dynamic","motionIntensity":"high","scrollBehavior":"layered","hoverEffects":"morph"},"vfx":{"particleEffects":"rich","glowEffects":"strong","noiseTexture":"grain"}}"##
}

/// Deterministic id and clock
#[derive(Debug, Default)]
pub struct FixedMetadata;

impl FixedMetadata {
    pub const ID: &'static str = "11111111-2222-3333-4444-555555555555";
}

impl MetadataSource for FixedMetadata {
    fn new_id(&self) -> String {
        Self::ID.to_string()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }
}

/// LLM client returning a canned reply and recording every call
pub struct MockLlmClient {
    reply: Result<String, fn() -> LlmError>,
    pub calls: AtomicUsize,
    pub last_user_prompt: Mutex<Option<String>>,
}

impl MockLlmClient {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_user_prompt: Mutex::new(None),
        }
    }

    pub fn failing(error: fn() -> LlmError) -> Self {
        Self {
            reply: Err(error),
            calls: AtomicUsize::new(0),
            last_user_prompt: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn chat_json(&self, _system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user_prompt.lock().unwrap() = Some(user_prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}
