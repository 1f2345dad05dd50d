//! Shared vocabulary for content entities: platforms, draft lifecycle states,
//! content formats, and generation kinds.

/// A supported social platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Instagram,
    Tiktok,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Instagram, Platform::Tiktok];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "instagram" => Some(Platform::Instagram),
            "tiktok" => Some(Platform::Tiktok),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftStatus {
    Draft,
    Review,
    Approved,
    Posted,
}

impl DraftStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DraftStatus::Draft => "draft",
            DraftStatus::Review => "review",
            DraftStatus::Approved => "approved",
            DraftStatus::Posted => "posted",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(DraftStatus::Draft),
            "review" => Some(DraftStatus::Review),
            "approved" => Some(DraftStatus::Approved),
            "posted" => Some(DraftStatus::Posted),
            _ => None,
        }
    }
}

/// Format of a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Post,
    Reel,
    Story,
    Carousel,
    Tiktok,
}

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Post => "post",
            ContentType::Reel => "reel",
            ContentType::Story => "story",
            ContentType::Carousel => "carousel",
            ContentType::Tiktok => "tiktok",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "post" => Some(ContentType::Post),
            "reel" => Some(ContentType::Reel),
            "story" => Some(ContentType::Story),
            "carousel" => Some(ContentType::Carousel),
            "tiktok" => Some(ContentType::Tiktok),
            _ => None,
        }
    }
}

/// Kind of AI generation request.
///
/// `Suggestions` is produced by the calendar-gap endpoint rather than the
/// generic generate endpoint, so [`GenerationType::parse`] does not accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationType {
    Caption,
    Hashtags,
    Ideas,
    PostPlan,
    Suggestions,
}

impl GenerationType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationType::Caption => "caption",
            GenerationType::Hashtags => "hashtags",
            GenerationType::Ideas => "ideas",
            GenerationType::PostPlan => "post_plan",
            GenerationType::Suggestions => "suggestions",
        }
    }

    /// Parses a generation type requested through the generate endpoint.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "caption" => Some(GenerationType::Caption),
            "hashtags" => Some(GenerationType::Hashtags),
            "ideas" => Some(GenerationType::Ideas),
            "post_plan" => Some(GenerationType::PostPlan),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips() {
        for p in Platform::ALL {
            assert_eq!(Platform::parse(p.as_str()), Some(p));
        }
        assert_eq!(Platform::parse("facebook"), None);
        assert_eq!(Platform::parse("Instagram"), None, "case sensitive");
    }

    #[test]
    fn draft_status_round_trips() {
        for s in ["draft", "review", "approved", "posted"] {
            let parsed = DraftStatus::parse(s).expect("known status");
            assert_eq!(parsed.as_str(), s);
        }
        assert_eq!(DraftStatus::parse("published"), None);
    }

    #[test]
    fn content_type_round_trips() {
        for s in ["post", "reel", "story", "carousel", "tiktok"] {
            let parsed = ContentType::parse(s).expect("known content type");
            assert_eq!(parsed.as_str(), s);
        }
        assert_eq!(ContentType::parse("short"), None);
    }

    #[test]
    fn generation_type_parse_rejects_suggestions() {
        assert_eq!(GenerationType::parse("caption"), Some(GenerationType::Caption));
        assert_eq!(GenerationType::parse("post_plan"), Some(GenerationType::PostPlan));
        // Only reachable through the suggestions endpoint.
        assert_eq!(GenerationType::parse("suggestions"), None);
    }
}
