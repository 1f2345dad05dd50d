//! Prompt templates for the content generation proxy.
//!
//! Brand-voice context is passed in explicitly as [`BrandContext`]; templates
//! never read ambient state. Settings that are unset or blank fall back to
//! neutral defaults so generation works before a brand profile is filled in.

use std::collections::HashMap;

const DEFAULT_NAME: &str = "a premium brand";
const DEFAULT_VOICE: &str = "premium, aspirational, authentic";
const DEFAULT_AUDIENCE: &str = "outdoor enthusiasts";
const DEFAULT_PILLARS: &str = "adventure, quality, style";
const DEFAULT_HASHTAGS: &str = "#adventure #outdoors";

/// Brand-voice settings snapshot used to render prompts.
#[derive(Debug, Clone, Default)]
pub struct BrandContext {
    pub name: Option<String>,
    pub voice: Option<String>,
    pub audience: Option<String>,
    pub content_pillars: Option<String>,
    pub hashtags: Option<String>,
}

impl BrandContext {
    /// Builds a context from a `brand_settings` key/value map.
    #[must_use]
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let get = |key: &str| settings.get(key).cloned();
        Self {
            name: get("name"),
            voice: get("voice"),
            audience: get("audience"),
            content_pillars: get("content_pillars"),
            hashtags: get("hashtags"),
        }
    }

    fn name(&self) -> &str {
        non_blank(self.name.as_deref(), DEFAULT_NAME)
    }

    fn voice(&self) -> &str {
        non_blank(self.voice.as_deref(), DEFAULT_VOICE)
    }

    fn audience(&self) -> &str {
        non_blank(self.audience.as_deref(), DEFAULT_AUDIENCE)
    }

    fn content_pillars(&self) -> &str {
        non_blank(self.content_pillars.as_deref(), DEFAULT_PILLARS)
    }

    fn hashtags(&self) -> &str {
        non_blank(self.hashtags.as_deref(), DEFAULT_HASHTAGS)
    }
}

fn non_blank<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => default,
    }
}

#[must_use]
pub fn caption_prompt(
    brand: &BrandContext,
    topic: &str,
    platform: &str,
    content_type: &str,
) -> String {
    format!(
        "You are a social media copywriter for {name}.\n\
         Brand voice: {voice}\n\
         Target audience: {audience}\n\
         Content pillars: {pillars}\n\
         \n\
         Write a compelling {platform} {content_type} caption about: {topic}\n\
         \n\
         Requirements:\n\
         - Match the brand voice exactly\n\
         - Include a hook in the first line\n\
         - Include a call-to-action\n\
         - Keep it under 2200 characters\n\
         - Do NOT include hashtags (those will be generated separately)\n\
         \n\
         Return only the caption text.",
        name = brand.name(),
        voice = brand.voice(),
        audience = brand.audience(),
        pillars = brand.content_pillars(),
    )
}

#[must_use]
pub fn hashtags_prompt(brand: &BrandContext, topic: &str, platform: &str) -> String {
    format!(
        "You are a social media strategist for {name}.\n\
         Brand hashtags: {hashtags}\n\
         \n\
         Generate 20-30 relevant {platform} hashtags for a post about: {topic}\n\
         \n\
         Mix of:\n\
         - 5 brand-specific hashtags\n\
         - 10 niche hashtags (10K-500K posts)\n\
         - 10 broader hashtags (500K-5M posts)\n\
         \n\
         Return only the hashtags, space-separated.",
        name = brand.name(),
        hashtags = brand.hashtags(),
    )
}

#[must_use]
pub fn ideas_prompt(brand: &BrandContext, platform: &str) -> String {
    format!(
        "You are a content strategist for {name}.\n\
         Brand voice: {voice}\n\
         Target audience: {audience}\n\
         Content pillars: {pillars}\n\
         \n\
         Generate 10 creative {platform} content ideas for this brand.\n\
         \n\
         For each idea, provide:\n\
         1. A catchy title\n\
         2. Content type (post/reel/story/carousel)\n\
         3. A brief description (2-3 sentences)\n\
         4. Best time to post\n\
         \n\
         Format as a numbered list.",
        name = brand.name(),
        voice = brand.voice(),
        audience = brand.audience(),
        pillars = brand.content_pillars(),
    )
}

#[must_use]
pub fn post_plan_prompt(brand: &BrandContext, platform: &str, days: i64) -> String {
    format!(
        "You are a content strategist for {name}.\n\
         Brand voice: {voice}\n\
         Content pillars: {pillars}\n\
         \n\
         Create a {days}-day {platform} content plan.\n\
         \n\
         For each day, provide:\n\
         1. Content type\n\
         2. Topic/theme\n\
         3. Caption concept (1-2 sentences)\n\
         4. Best posting time\n\
         \n\
         Format as a structured daily plan.",
        name = brand.name(),
        voice = brand.voice(),
        pillars = brand.content_pillars(),
    )
}

#[must_use]
pub fn suggestions_prompt(
    brand: &BrandContext,
    recent_metrics: &str,
    calendar_gaps: &str,
) -> String {
    format!(
        "You are a social media strategist for {name}.\n\
         Brand voice: {voice}\n\
         Content pillars: {pillars}\n\
         \n\
         Based on these recent performance metrics:\n\
         {recent_metrics}\n\
         \n\
         And these gaps in the content calendar:\n\
         {calendar_gaps}\n\
         \n\
         Provide 3-5 actionable suggestions to improve social media performance.\n\
         Be specific and reference the data. Keep each suggestion to 2-3 sentences.\n\
         Format as a numbered list.",
        name = brand.name(),
        voice = brand.voice(),
        pillars = brand.content_pillars(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_brand() -> BrandContext {
        BrandContext {
            name: Some("Summit & Pine".to_string()),
            voice: Some("warm, rugged".to_string()),
            audience: Some("weekend hikers".to_string()),
            content_pillars: Some("trails, gear".to_string()),
            hashtags: Some("#summitandpine".to_string()),
        }
    }

    #[test]
    fn from_settings_picks_known_keys() {
        let mut settings = HashMap::new();
        settings.insert("name".to_string(), "Summit & Pine".to_string());
        settings.insert("voice".to_string(), "warm".to_string());
        settings.insert("make_api_key".to_string(), "mk_abc".to_string());
        let brand = BrandContext::from_settings(&settings);
        assert_eq!(brand.name.as_deref(), Some("Summit & Pine"));
        assert_eq!(brand.voice.as_deref(), Some("warm"));
        assert!(brand.audience.is_none());
    }

    #[test]
    fn caption_prompt_uses_brand_context() {
        let prompt = caption_prompt(&named_brand(), "spring sale", "instagram", "reel");
        assert!(prompt.contains("copywriter for Summit & Pine"));
        assert!(prompt.contains("Brand voice: warm, rugged"));
        assert!(prompt.contains("instagram reel caption about: spring sale"));
        assert!(prompt.contains("Do NOT include hashtags"));
    }

    #[test]
    fn caption_prompt_falls_back_to_defaults() {
        let prompt = caption_prompt(&BrandContext::default(), "topic", "tiktok", "post");
        assert!(prompt.contains("copywriter for a premium brand"));
        assert!(prompt.contains("Brand voice: premium, aspirational, authentic"));
        assert!(prompt.contains("Target audience: outdoor enthusiasts"));
    }

    #[test]
    fn blank_setting_falls_back_to_default() {
        let brand = BrandContext {
            name: Some("   ".to_string()),
            ..BrandContext::default()
        };
        let prompt = ideas_prompt(&brand, "instagram");
        assert!(prompt.contains("strategist for a premium brand"));
    }

    #[test]
    fn hashtags_prompt_includes_brand_hashtags() {
        let prompt = hashtags_prompt(&named_brand(), "new drop", "instagram");
        assert!(prompt.contains("Brand hashtags: #summitandpine"));
        assert!(prompt.contains("20-30 relevant instagram hashtags"));
    }

    #[test]
    fn post_plan_prompt_interpolates_days() {
        let prompt = post_plan_prompt(&named_brand(), "tiktok", 14);
        assert!(prompt.contains("Create a 14-day tiktok content plan."));
    }

    #[test]
    fn suggestions_prompt_threads_metrics_and_gaps() {
        let prompt = suggestions_prompt(&named_brand(), "followers up 5%", "Mon, May 5");
        assert!(prompt.contains("Based on these recent performance metrics:\nfollowers up 5%"));
        assert!(prompt.contains("gaps in the content calendar:\nMon, May 5"));
    }
}
