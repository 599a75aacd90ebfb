//! Data models and structures
//!
//! Defines the brand, audit, trend and prompt results produced by the
//! assistant, plus runtime configuration loaded from the environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A color normalized to uppercase `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse `#RGB`, `#RRGGBB` (with or without `#`) into normalized form.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        Some(Self(format!("#{}", expanded.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green and blue channels in `0.0..=1.0`, as the document sandbox expects.
    pub fn to_rgb(&self) -> (f32, f32, f32) {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.0[range], 16).unwrap_or(0) as f32 / 255.0
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid hex color '{}'", value))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_font: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub font_weights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spacing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
}

/// Structured summary of a brand's visual and verbal identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandProfile {
    pub primary_colors: Vec<HexColor>,
    pub brand_voice: String,
    pub design_guidelines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_patterns: Option<Vec<String>>,
    /// Screenshot the profile was extracted from. Only carried into a single
    /// audit call; never serialized or cached.
    #[serde(skip)]
    pub reference_screenshot: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignAuditResult {
    pub overall_score: u8,
    pub color_score: u8,
    pub typography_score: u8,
    pub spacing_score: u8,
    pub accessibility_score: u8,
    pub feedback: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendInsight {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignPrompt {
    pub title: String,
    pub prompt: String,
    #[serde(default)]
    pub style: Option<String>,
}

/// Where a brand extraction starts from.
#[derive(Debug, Clone)]
pub enum BrandSource {
    Text(String),
    Url(String),
    Screenshot(Vec<u8>),
}

/// Output language requested from the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Japanese,
    Korean,
    Chinese,
}

impl Language {
    /// Parse an ISO 639-1 code (region suffixes such as `pt-BR` are ignored).
    /// Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        let primary = code
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "es" => Language::Spanish,
            "fr" => Language::French,
            "de" => Language::German,
            "it" => Language::Italian,
            "pt" => Language::Portuguese,
            "ja" => Language::Japanese,
            "ko" => Language::Korean,
            "zh" => Language::Chinese,
            _ => Language::English,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Japanese => "ja",
            Language::Korean => "ko",
            Language::Chinese => "zh",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::Chinese => "Chinese",
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    pub text_model: String,
    pub vision_model: String,
    pub profanity_url: String,
    pub moderation_timeout: Duration,
    pub cache_ttl: Duration,
    pub retry_max_attempts: usize,
    pub retry_base_delay: Duration,
    pub store_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            groq_base_url: "https://api.groq.com/openai".to_string(),
            text_model: "llama-3.3-70b-versatile".to_string(),
            vision_model: "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            profanity_url: "https://www.purgomalum.com/service/containsprofanity".to_string(),
            moderation_timeout: Duration::from_secs(8),
            cache_ttl: Duration::from_secs(30 * 60),
            retry_max_attempts: 4,
            retry_base_delay: Duration::from_millis(1000),
            store_path: ".brand-assistant/settings.json".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |name: &str, default: String| lookup(name).unwrap_or(default);
        let number = |name: &str, default: u64| -> Result<u64> {
            match lookup(name) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    Error::Configuration(format!("{} must be a whole number, got '{}'", name, raw))
                }),
                None => Ok(default),
            }
        };

        Ok(Self {
            groq_api_key: lookup("GROQ_API_KEY").filter(|key| !key.trim().is_empty()),
            groq_base_url: text("GROQ_BASE_URL", defaults.groq_base_url),
            text_model: text("GROQ_TEXT_MODEL", defaults.text_model),
            vision_model: text("GROQ_VISION_MODEL", defaults.vision_model),
            profanity_url: text("PROFANITY_URL", defaults.profanity_url),
            moderation_timeout: Duration::from_secs(number(
                "MODERATION_TIMEOUT_SECS",
                defaults.moderation_timeout.as_secs(),
            )?),
            cache_ttl: Duration::from_secs(number("CACHE_TTL_SECS", defaults.cache_ttl.as_secs())?),
            retry_max_attempts: number("RETRY_MAX_ATTEMPTS", defaults.retry_max_attempts as u64)?
                as usize,
            retry_base_delay: Duration::from_millis(number(
                "RETRY_BASE_DELAY_MS",
                defaults.retry_base_delay.as_millis() as u64,
            )?),
            store_path: text("BRAND_ASSISTANT_STORE", defaults.store_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_hex_color_normalization() {
        assert_eq!(HexColor::parse("#635bff").unwrap().as_str(), "#635BFF");
        assert_eq!(HexColor::parse("0a2540").unwrap().as_str(), "#0A2540");
        assert_eq!(HexColor::parse("#fff").unwrap().as_str(), "#FFFFFF");
        assert!(HexColor::parse("#12345").is_none());
        assert!(HexColor::parse("blue").is_none());
    }

    #[test]
    fn test_hex_color_to_rgb() {
        let (r, g, b) = HexColor::parse("#FF0000").unwrap().to_rgb();
        assert_eq!((r, g, b), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_brand_profile_json_uses_camel_case_and_skips_screenshot() {
        let profile = BrandProfile {
            primary_colors: vec![HexColor::parse("#635BFF").unwrap()],
            brand_voice: "Confident and developer friendly".to_string(),
            design_guidelines: vec!["Use whitespace".to_string()],
            typography: None,
            spacing: None,
            layout_patterns: None,
            reference_screenshot: Some(vec![1, 2, 3]),
        };

        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"primaryColors\":[\"#635BFF\"]"));
        assert!(json.contains("\"brandVoice\""));
        assert!(!json.contains("referenceScreenshot"));
        assert!(!json.contains("typography"));

        let back: BrandProfile = serde_json::from_str(&json).unwrap();
        assert!(back.reference_screenshot.is_none());
    }

    #[test]
    fn test_brand_profile_rejects_invalid_color_on_load() {
        let json = r##"{"primaryColors":["nope"],"brandVoice":"x","designGuidelines":[]}"##;
        assert!(serde_json::from_str::<BrandProfile>(json).is_err());
    }

    #[test]
    fn test_language_from_code() {
        assert_eq!(Language::from_code("en"), Language::English);
        assert_eq!(Language::from_code("pt-BR"), Language::Portuguese);
        assert_eq!(Language::from_code("JA"), Language::Japanese);
        assert_eq!(Language::from_code("xx"), Language::English);
        assert_eq!(Language::from_code("fr").code(), "fr");
    }

    #[test]
    fn test_config_defaults_without_variables() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(config.groq_api_key.is_none());
        assert_eq!(config.retry_max_attempts, 4);
        assert_eq!(config.cache_ttl, Duration::from_secs(1800));
        assert_eq!(config.moderation_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_config_reads_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GROQ_API_KEY", "gsk_test"),
            ("GROQ_TEXT_MODEL", "llama-3.1-8b-instant"),
            ("CACHE_TTL_SECS", "60"),
        ]);
        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.groq_api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.text_model, "llama-3.1-8b-instant");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_config_blank_key_is_absent() {
        let config = Config::from_lookup(|name| {
            (name == "GROQ_API_KEY").then(|| "   ".to_string())
        })
        .unwrap();
        assert!(config.groq_api_key.is_none());
    }

    #[test]
    fn test_config_rejects_malformed_number() {
        let err = Config::from_lookup(|name| {
            (name == "RETRY_MAX_ATTEMPTS").then(|| "four".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
