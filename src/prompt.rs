//! Builds the analysis instruction block submitted to the completion service.
//!
//! The downstream model's output quality depends on this exact section
//! layout; reordering or dropping a section is a behavioral change.

use crate::extract::ExtractedSignals;
use crate::youtube::VideoMetadata;

/// Comments included in the prompt, regardless of how many were fetched.
const MAX_PROMPT_COMMENTS: usize = 10;
/// Description preview length in characters.
const DESCRIPTION_PREVIEW_CHARS: usize = 300;

pub fn build_analysis_prompt(
    meta: &VideoMetadata,
    signals: &ExtractedSignals,
    comments: &[String],
) -> String {
    let description = preview(&meta.description);
    let hashtags = join_or_none(&signals.hashtags, ", ");
    let ctas = join_or_none(&signals.ctas, "\n");
    let links = join_or_none(&signals.links, "\n");

    let comment_sample = comments
        .iter()
        .take(MAX_PROMPT_COMMENTS)
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert short-form video coach. Analyze this video and give specific, actionable suggestions for each point:

1. Hook strength: how well do the first seconds grab attention?
2. Pacing: is the duration right for the content, and where does it drag?
3. Loop potential: does the ending feed back into the opening for rewatches?
4. Title optimization: rewrite the title for clarity and click-through.
5. Hashtag use: are the hashtags relevant and well-chosen, and what is missing?
6. CTA and link review: do the calls to action and links help or hurt?
7. Audience feedback synthesis: what are the comments telling the creator?

VIDEO METADATA:
Title: {}
Description: {}
Duration: {} seconds
Views: {} | Likes: {} | Comments: {}
Hashtags: {}
CTA lines:
{}
Links:
{}

SAMPLE COMMENTS:
{}"#,
        meta.title,
        description,
        meta.duration_seconds,
        meta.view_count,
        meta.like_count,
        meta.comment_count,
        hashtags,
        ctas,
        links,
        if comment_sample.is_empty() {
            "None"
        } else {
            &comment_sample
        },
    )
}

fn preview(description: &str) -> String {
    if description.chars().count() <= DESCRIPTION_PREVIEW_CHARS {
        return description.to_string();
    }
    let mut out: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

fn join_or_none(items: &[String], sep: &str) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(sep)
    }
}
