//! Parsing and schema validation of model output.
//!
//! Model text is first stripped of any markdown code fence, then parsed as
//! JSON, then checked field by field. Most violations reject the whole
//! result with [`Error::Validation`]; the four audit sub-scores and the audit
//! feedback list are the exception and fall back to documented defaults.

use crate::models::{
    BrandProfile, DesignAuditResult, DesignPrompt, HexColor, Spacing, TrendInsight, Typography,
};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::RangeInclusive;

pub const COLOR_COUNT: RangeInclusive<usize> = 3..=5;
pub const GUIDELINE_COUNT: usize = 4;
pub const MIN_BRAND_VOICE_CHARS: usize = 20;
pub const PROMPT_COUNT: RangeInclusive<usize> = 3..=5;
pub const TREND_COUNT: RangeInclusive<usize> = 3..=6;
pub const MAX_AUDIT_ITEMS: usize = 5;
pub const DEFAULT_SUB_SCORE: u8 = 50;
pub const DEFAULT_FEEDBACK: &str = "No specific feedback was provided for this design.";

/// Remove a surrounding ```` ```json ... ``` ```` wrapper, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after = &trimmed[start + 3..];
    let body = match after.find('\n') {
        Some(newline) if after[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &after[newline + 1..]
        }
        _ => after.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Span from the first `{` or `[` to the matching last `}` or `]`, for
/// replies that wrap bare JSON in prose.
fn bare_json_span(raw: &str) -> Option<&str> {
    let start = raw.find(['{', '['])?;
    let close = if raw[start..].starts_with('{') { '}' } else { ']' };
    let end = raw.rfind(close)?;
    (end > start).then(|| &raw[start..=end])
}

/// Parse model text as JSON. The text is tried as-is first; a code-fence
/// wrapper is stripped only when that fails, and a bare object or array
/// embedded in prose is the last resort.
pub fn parse_json(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    let first_error = match serde_json::from_str(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let fenced = trimmed.contains("```").then(|| strip_code_fence(trimmed));
    let candidates = fenced
        .into_iter()
        .chain(bare_json_span(trimmed))
        .chain(fenced.and_then(bare_json_span));
    for candidate in candidates {
        if let Ok(value) = serde_json::from_str(candidate) {
            return Ok(value);
        }
    }

    tracing::warn!("Model returned malformed JSON: {}\nBody: {}", first_error, trimmed);
    Err(Error::Validation(format!(
        "Model response is not valid JSON: {}",
        first_error
    )))
}

fn required<'a>(value: &'a Value, field: &str) -> Result<&'a Value> {
    value
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| Error::Validation(format!("Missing required field '{}'", field)))
}

fn string_list(value: &Value, field: &str) -> Result<Vec<String>> {
    let items = required(value, field)?
        .as_array()
        .ok_or_else(|| Error::Validation(format!("'{}' must be a list", field)))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    Error::Validation(format!("'{}[{}]' must be a non-empty string", field, i))
                })
        })
        .collect()
}

fn optional<T: DeserializeOwned>(value: &Value, field: &str) -> Option<T> {
    let raw = value.get(field).filter(|v| !v.is_null())?;
    match serde_json::from_value(raw.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Ignoring malformed optional field '{}': {}", field, e);
            None
        }
    }
}

pub fn brand_profile(value: &Value) -> Result<BrandProfile> {
    let colors = string_list(value, "primaryColors")?;
    let primary_colors = colors
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            HexColor::parse(raw).ok_or_else(|| {
                Error::Validation(format!("primaryColors[{}] is not a hex color: '{}'", i, raw))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    if !COLOR_COUNT.contains(&primary_colors.len()) {
        return Err(Error::Validation(format!(
            "Expected {} to {} primary colors, got {}",
            COLOR_COUNT.start(),
            COLOR_COUNT.end(),
            primary_colors.len()
        )));
    }

    let brand_voice = required(value, "brandVoice")?
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| Error::Validation("'brandVoice' must be a string".to_string()))?;
    if brand_voice.chars().count() < MIN_BRAND_VOICE_CHARS {
        return Err(Error::Validation(format!(
            "brandVoice must be at least {} characters",
            MIN_BRAND_VOICE_CHARS
        )));
    }

    let design_guidelines = string_list(value, "designGuidelines")?;
    if design_guidelines.len() != GUIDELINE_COUNT {
        return Err(Error::Validation(format!(
            "Expected exactly {} design guidelines, got {}",
            GUIDELINE_COUNT,
            design_guidelines.len()
        )));
    }

    Ok(BrandProfile {
        primary_colors,
        brand_voice,
        design_guidelines,
        typography: optional::<Typography>(value, "typography"),
        spacing: optional::<Spacing>(value, "spacing"),
        layout_patterns: optional::<Vec<String>>(value, "layoutPatterns"),
        reference_screenshot: None,
    })
}

/// Numbers and numeric strings, clamped to `0..=100`. `Ok(None)` when the
/// field is absent; any other value is a validation error.
fn score(value: &Value, field: &str) -> Result<Option<u8>> {
    let raw = match value.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(raw) => raw,
    };
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
    .ok_or_else(|| Error::Validation(format!("'{}' must be a number, got {}", field, raw)))?;

    Ok(Some(number.round().clamp(0.0, 100.0) as u8))
}

/// Up to [`MAX_AUDIT_ITEMS`] non-blank strings. `Ok(None)` when the field is
/// absent; a non-list value is a validation error.
fn audit_items(value: &Value, field: &str) -> Result<Option<Vec<String>>> {
    let items = match value.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(raw) => raw
            .as_array()
            .ok_or_else(|| Error::Validation(format!("'{}' must be a list", field)))?,
    };

    let mut items: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    items.truncate(MAX_AUDIT_ITEMS);
    Ok(Some(items))
}

/// Only the four sub-scores and the feedback list have fallbacks; a missing
/// overall score or recommendation list rejects the audit.
pub fn audit_result(value: &Value) -> Result<DesignAuditResult> {
    if !value.is_object() {
        return Err(Error::Validation(
            "Audit response must be a JSON object".to_string(),
        ));
    }

    let overall_score = score(value, "overallScore")?
        .ok_or_else(|| Error::Validation("Missing required field 'overallScore'".to_string()))?;
    let sub = |field: &str| -> Result<u8> { Ok(score(value, field)?.unwrap_or(DEFAULT_SUB_SCORE)) };

    let feedback = match audit_items(value, "feedback")? {
        Some(items) if !items.is_empty() => items,
        _ => vec![DEFAULT_FEEDBACK.to_string()],
    };
    let recommendations = audit_items(value, "recommendations")?.ok_or_else(|| {
        Error::Validation("Missing required field 'recommendations'".to_string())
    })?;

    Ok(DesignAuditResult {
        overall_score,
        color_score: sub("colorScore")?,
        typography_score: sub("typographyScore")?,
        spacing_score: sub("spacingScore")?,
        accessibility_score: sub("accessibilityScore")?,
        feedback,
        recommendations,
    })
}

/// Lists may arrive wrapped (`{"trends": [...]}`) or bare (`[...]`).
fn wrapped_list<T: DeserializeOwned>(value: &Value, field: &str) -> Result<Vec<T>> {
    let list = match value {
        Value::Array(_) => value,
        _ => required(value, field)?,
    };
    serde_json::from_value(list.clone())
        .map_err(|e| Error::Validation(format!("Malformed '{}' list: {}", field, e)))
}

fn check_count(field: &str, len: usize, range: &RangeInclusive<usize>) -> Result<()> {
    if range.contains(&len) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Expected {} to {} {}, got {}",
            range.start(),
            range.end(),
            field,
            len
        )))
    }
}

pub fn trend_list(value: &Value) -> Result<Vec<TrendInsight>> {
    let trends: Vec<TrendInsight> = wrapped_list(value, "trends")?;
    check_count("trends", trends.len(), &TREND_COUNT)?;
    if let Some(i) = trends
        .iter()
        .position(|t| t.name.trim().is_empty() || t.description.trim().is_empty())
    {
        return Err(Error::Validation(format!(
            "trends[{}] is missing a name or description",
            i
        )));
    }
    Ok(trends)
}

pub fn prompt_list(value: &Value) -> Result<Vec<DesignPrompt>> {
    let prompts: Vec<DesignPrompt> = wrapped_list(value, "prompts")?;
    check_count("prompts", prompts.len(), &PROMPT_COUNT)?;
    if let Some(i) = prompts
        .iter()
        .position(|p| p.title.trim().is_empty() || p.prompt.trim().is_empty())
    {
        return Err(Error::Validation(format!(
            "prompts[{}] is missing a title or prompt",
            i
        )));
    }
    Ok(prompts)
}
