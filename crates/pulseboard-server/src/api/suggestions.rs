//! Calendar-gap suggestions: summarizes recent metrics and the current
//! month's unscheduled days, then asks the generative-text service for
//! actionable recommendations.

use std::collections::HashSet;
use std::fmt::Write as _;

use axum::{extract::State, Extension, Json};
use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::Serialize;

use pulseboard_core::prompts::{suggestions_prompt, BrandContext};
use pulseboard_core::GenerationType;
use pulseboard_db::InsightRow;

use crate::middleware::AccountId;

use super::{map_db_error, ApiError, AppState};

/// How many gap days are listed by name before collapsing to a count.
const MAX_LISTED_GAPS: usize = 10;
const RECENT_INSIGHT_LIMIT: i64 = 14;

#[derive(Debug, Serialize)]
pub(super) struct SuggestionsResponse {
    pub suggestions: String,
}

/// GET /api/v1/suggestions — generate content suggestions from recent
/// metrics and this month's calendar gaps.
pub(super) async fn calendar_suggestions(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let client = state
        .genai
        .clone()
        .ok_or_else(|| ApiError::internal("generation service is not configured"))?;

    let settings = pulseboard_db::load_settings_map(&state.pool, account.0)
        .await
        .map_err(|e| map_db_error(&e))?;
    let brand = BrandContext::from_settings(&settings);

    let today = Utc::now().date_naive();
    let (month_start, month_end) = month_bounds(today);
    let event_dates =
        pulseboard_db::list_event_dates(&state.pool, account.0, month_start, month_end)
            .await
            .map_err(|e| map_db_error(&e))?;
    let calendar_gaps = describe_calendar_gaps(month_start, month_end, &event_dates);

    let recent = pulseboard_db::list_recent_insights(&state.pool, account.0, RECENT_INSIGHT_LIMIT)
        .await
        .map_err(|e| map_db_error(&e))?;
    let recent_metrics = describe_recent_metrics(&recent);

    let prompt = suggestions_prompt(&brand, &recent_metrics, &calendar_gaps);

    let generation = client.generate(&prompt).await.map_err(|e| {
        tracing::error!(error = %e, "suggestions generation failed");
        ApiError::internal(e.to_string())
    })?;

    if let Err(e) = pulseboard_db::insert_generation(
        &state.pool,
        account.0,
        GenerationType::Suggestions.as_str(),
        &prompt,
        &generation.text,
        &generation.model,
        generation.tokens,
    )
    .await
    {
        tracing::error!(error = %e, "failed to log generation");
    }

    Ok(Json(SuggestionsResponse {
        suggestions: generation.text,
    }))
}

/// First and last day of the month containing `today`.
fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(start);
    (start, end)
}

/// Describes the days in `[start, end]` with no scheduled event, e.g.
/// "Days without scheduled content: Wed, May 1, Thu, May 2 and 3 more".
fn describe_calendar_gaps(start: NaiveDate, end: NaiveDate, event_dates: &[NaiveDate]) -> String {
    let scheduled: HashSet<NaiveDate> = event_dates.iter().copied().collect();
    let gap_days: Vec<String> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !scheduled.contains(d))
        .map(|d| d.format("%a, %b %-d").to_string())
        .collect();

    if gap_days.is_empty() {
        return "All days this month have scheduled content.".to_string();
    }

    let mut text = format!(
        "Days without scheduled content: {}",
        gap_days[..gap_days.len().min(MAX_LISTED_GAPS)].join(", ")
    );
    if gap_days.len() > MAX_LISTED_GAPS {
        let _ = write!(text, " and {} more", gap_days.len() - MAX_LISTED_GAPS);
    }
    text
}

/// One line per recent insight row, newest first.
fn describe_recent_metrics(rows: &[InsightRow]) -> String {
    if rows.is_empty() {
        return "No recent metrics available.".to_string();
    }

    rows.iter()
        .map(|row| {
            format!(
                "{} {}: followers {}, reach {}, impressions {}, engagement rate {}%, \
                 likes {}, comments {}, shares {}, saves {}, profile visits {}",
                row.platform,
                row.date,
                row.followers,
                row.reach,
                row.impressions,
                row.engagement_rate,
                row.likes,
                row.comments,
                row.shares,
                row.saves,
                row.profile_visits,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
    }

    #[test]
    fn month_bounds_spans_whole_month() {
        let (start, end) = month_bounds(date("2024-05-17"));
        assert_eq!(start, date("2024-05-01"));
        assert_eq!(end, date("2024-05-31"));
    }

    #[test]
    fn month_bounds_handles_december_rollover() {
        let (start, end) = month_bounds(date("2023-12-25"));
        assert_eq!(start, date("2023-12-01"));
        assert_eq!(end, date("2023-12-31"));
    }

    #[test]
    fn fully_scheduled_month_reports_no_gaps() {
        let start = date("2024-02-01");
        let end = date("2024-02-29");
        let all_days: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
        assert_eq!(
            describe_calendar_gaps(start, end, &all_days),
            "All days this month have scheduled content."
        );
    }

    #[test]
    fn gaps_are_named_with_weekday_format() {
        let start = date("2024-05-01");
        let end = date("2024-05-03");
        let scheduled = vec![date("2024-05-02")];
        assert_eq!(
            describe_calendar_gaps(start, end, &scheduled),
            "Days without scheduled content: Wed, May 1, Fri, May 3"
        );
    }

    #[test]
    fn long_gap_lists_collapse_to_a_count() {
        let start = date("2024-05-01");
        let end = date("2024-05-31");
        let text = describe_calendar_gaps(start, end, &[]);
        assert!(text.starts_with("Days without scheduled content: Wed, May 1,"));
        assert!(text.ends_with(" and 21 more"), "got: {text}");
    }

    #[test]
    fn empty_metrics_digest_says_so() {
        assert_eq!(describe_recent_metrics(&[]), "No recent metrics available.");
    }

    #[test]
    fn metrics_digest_lists_rows() {
        let row = InsightRow {
            id: 1,
            user_id: Uuid::nil(),
            platform: "instagram".to_string(),
            date: date("2024-05-01"),
            followers: 1000,
            reach: 500,
            impressions: 800,
            engagement_rate: 4.2,
            likes: 50,
            comments: 3,
            shares: 2,
            saves: 7,
            profile_visits: 12,
            created_at: Utc::now(),
        };
        let digest = describe_recent_metrics(&[row]);
        assert!(digest.starts_with("instagram 2024-05-01: followers 1000, reach 500"));
        assert!(digest.contains("engagement rate 4.2%"));
        assert!(digest.contains("profile visits 12"));
    }
}
