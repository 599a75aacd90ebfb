//! Prompt templates and request builders.
//!
//! Every builder is a pure function from typed inputs to a
//! [`CompletionRequest`]. The expected output schema is spelled out in the
//! template text; the assistant still validates every response itself.

use crate::ai::mime::image_data_url;
use crate::ai::{CompletionRequest, ContentPart, Message, ModelTier};
use crate::models::{BrandProfile, Language};

pub const BRAND_SYSTEM: &str = include_str!("../data/prompts/brand_system.txt");
pub const BRAND_TEXT_USER: &str = include_str!("../data/prompts/brand_text_user.txt");
pub const BRAND_URL_USER: &str = include_str!("../data/prompts/brand_url_user.txt");
pub const BRAND_SCREENSHOT_USER: &str = include_str!("../data/prompts/brand_screenshot_user.txt");
pub const PROMPTS_USER: &str = include_str!("../data/prompts/prompts_user.txt");
pub const TRENDS_USER: &str = include_str!("../data/prompts/trends_user.txt");
pub const AUDIT_SYSTEM: &str = include_str!("../data/prompts/audit_system.txt");
pub const AUDIT_USER: &str = include_str!("../data/prompts/audit_user.txt");
pub const MODERATION_SYSTEM: &str = include_str!("../data/prompts/moderation_system.txt");
pub const MODERATION_USER: &str = include_str!("../data/prompts/moderation_user.txt");

const DESIGN_SYSTEM: &str =
    "You are a creative director who follows brand guidelines closely and answers only in JSON.";

/// Replace `{{key}}` placeholders in a template string in a single pass.
///
/// Substituted values are never rescanned, so user text containing
/// `{{...}}` comes through verbatim. Unknown placeholders are left as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            rest = &rest[open..];
            break;
        };

        let key = &after[..close];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[open..open + close + 4]),
        }
        rest = &after[close + 2..];
    }
    result.push_str(rest);
    result
}

fn brand_system(language: Language) -> Message {
    Message::system(render(BRAND_SYSTEM, &[("language", language.name())]))
}

pub fn brand_from_text(text: &str, language: Language) -> CompletionRequest {
    CompletionRequest {
        tier: ModelTier::Text,
        messages: vec![
            brand_system(language),
            Message::user(render(BRAND_TEXT_USER, &[("text", text)])),
        ],
        temperature: 0.4,
        max_tokens: 1200,
        json_mode: true,
    }
}

pub fn brand_from_url(url: &str, language: Language) -> CompletionRequest {
    CompletionRequest {
        tier: ModelTier::Text,
        messages: vec![
            brand_system(language),
            Message::user(render(BRAND_URL_USER, &[("url", url)])),
        ],
        temperature: 0.4,
        max_tokens: 1200,
        json_mode: true,
    }
}

pub fn brand_from_screenshot(image: &[u8], language: Language) -> CompletionRequest {
    CompletionRequest {
        tier: ModelTier::Vision,
        messages: vec![
            brand_system(language),
            Message::user_parts(vec![
                ContentPart::Text(BRAND_SCREENSHOT_USER.to_string()),
                ContentPart::Image(image_data_url(image)),
            ]),
        ],
        temperature: 0.3,
        max_tokens: 1200,
        json_mode: false,
    }
}

pub fn design_prompts(brand: &BrandProfile, topic: &str, language: Language) -> CompletionRequest {
    let summary = brand_summary(brand);
    CompletionRequest {
        tier: ModelTier::Text,
        messages: vec![
            Message::system(DESIGN_SYSTEM),
            Message::user(render(
                PROMPTS_USER,
                &[
                    ("topic", topic),
                    ("brand", &summary),
                    ("language", language.name()),
                ],
            )),
        ],
        temperature: 0.8,
        max_tokens: 1500,
        json_mode: true,
    }
}

pub fn trends(topic: &str, language: Language) -> CompletionRequest {
    CompletionRequest {
        tier: ModelTier::Text,
        messages: vec![
            Message::system(DESIGN_SYSTEM),
            Message::user(render(
                TRENDS_USER,
                &[("topic", topic), ("language", language.name())],
            )),
        ],
        temperature: 0.7,
        max_tokens: 1200,
        json_mode: true,
    }
}

/// Vision request comparing `design` with the brand; the brand's reference
/// screenshot is attached as a second image when present.
pub fn design_audit(design: &[u8], brand: &BrandProfile, language: Language) -> CompletionRequest {
    let summary = brand_summary(brand);
    let mut parts = vec![
        ContentPart::Text(render(AUDIT_USER, &[("brand", &summary)])),
        ContentPart::Image(image_data_url(design)),
    ];
    if let Some(reference) = &brand.reference_screenshot {
        parts.push(ContentPart::Text(
            "Reference screenshot of the brand:".to_string(),
        ));
        parts.push(ContentPart::Image(image_data_url(reference)));
    }

    CompletionRequest {
        tier: ModelTier::Vision,
        messages: vec![
            Message::system(render(AUDIT_SYSTEM, &[("language", language.name())])),
            Message::user_parts(parts),
        ],
        temperature: 0.2,
        max_tokens: 1000,
        json_mode: false,
    }
}

pub fn moderation_classifier(text: &str) -> CompletionRequest {
    CompletionRequest {
        tier: ModelTier::Text,
        messages: vec![
            Message::system(MODERATION_SYSTEM),
            Message::user(render(MODERATION_USER, &[("text", text)])),
        ],
        temperature: 0.0,
        max_tokens: 20,
        json_mode: true,
    }
}

/// Plain-text rendering of a profile for embedding in prompts.
pub fn brand_summary(brand: &BrandProfile) -> String {
    let colors: Vec<&str> = brand.primary_colors.iter().map(|c| c.as_str()).collect();
    let mut lines = vec![
        format!("- Colors: {}", colors.join(", ")),
        format!("- Voice: {}", brand.brand_voice),
        format!("- Guidelines: {}", brand.design_guidelines.join("; ")),
    ];

    if let Some(typography) = &brand.typography {
        let fonts: Vec<&str> = [&typography.primary_font, &typography.secondary_font]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        if !fonts.is_empty() {
            lines.push(format!("- Fonts: {}", fonts.join(", ")));
        }
        if let Some(style) = &typography.heading_style {
            lines.push(format!("- Headings: {}", style));
        }
    }
    if let Some(spacing) = &brand.spacing {
        if let Some(unit) = &spacing.base_unit {
            lines.push(format!("- Spacing unit: {}", unit));
        }
    }
    if let Some(patterns) = &brand.layout_patterns {
        if !patterns.is_empty() {
            lines.push(format!("- Layout: {}", patterns.join("; ")));
        }
    }

    lines.join("\n")
}
