//! Pure text extraction helpers: video id normalization, ISO-8601 duration
//! decoding, hashtag and CTA/link scanning.

use regex::Regex;
use std::sync::LazyLock;

static SHORTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"shorts/([A-Za-z0-9_-]{11})").unwrap());
static WATCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"watch\?v=([A-Za-z0-9_-]{11})").unwrap());
static BARE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").unwrap());
static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());
static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Lines containing any of these (case-insensitive) count as calls to action.
const CTA_KEYWORDS: [&str; 7] = [
    "subscribe",
    "follow",
    "like",
    "share",
    "check out",
    "buy",
    "visit",
];

/// Signals derived from a video's title and description.
#[derive(Debug, Clone)]
pub struct ExtractedSignals {
    pub hashtags: Vec<String>,
    pub ctas: Vec<String>,
    pub links: Vec<String>,
}

impl ExtractedSignals {
    /// Run all extractors over the video's free text. Hashtags come from
    /// title and description combined; CTA and link scanning only makes
    /// sense on the multi-line description.
    pub fn from_video(title: &str, description: &str) -> Self {
        let hashtags = extract_hashtags(&[title, description]);
        let (links, ctas) = extract_links_and_ctas(description);
        Self {
            hashtags,
            ctas,
            links,
        }
    }
}

/// Normalize a caller-supplied video reference to an 11-character video id.
///
/// URL forms are tried before the bare-token form so that a full URL never
/// falls through to the bare pattern and fails on its path segments.
pub fn extract_video_id(reference: &str) -> Option<String> {
    let reference = reference.trim();

    for re in [&*SHORTS_RE, &*WATCH_RE] {
        if let Some(caps) = re.captures(reference) {
            return Some(caps[1].to_string());
        }
    }

    if BARE_ID_RE.is_match(reference) {
        return Some(reference.to_string());
    }

    None
}

/// Decode an ISO-8601 duration code (`PT1H2M3S`) to total seconds.
///
/// Duration is non-critical metadata; anything malformed decodes to 0 rather
/// than failing the request.
pub fn parse_duration_seconds(duration: &str) -> u64 {
    let Some(caps) = DURATION_RE.captures(duration.trim()) else {
        return 0;
    };

    let component = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    // Saturate rather than overflow on absurdly large upstream values.
    component(1)
        .saturating_mul(3600)
        .saturating_add(component(2).saturating_mul(60))
        .saturating_add(component(3))
}

/// Collect every `#word` token across the given texts, deduplicated with
/// case-sensitive equality, first occurrence first.
pub fn extract_hashtags(texts: &[&str]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for text in texts {
        for m in HASHTAG_RE.find_iter(text) {
            if !tags.iter().any(|t| t == m.as_str()) {
                tags.push(m.as_str().to_string());
            }
        }
    }
    tags
}

/// Scan free text line by line for embedded links and call-to-action lines.
///
/// A line can contribute to both lists. Both outputs preserve source line
/// order.
pub fn extract_links_and_ctas(text: &str) -> (Vec<String>, Vec<String>) {
    let mut links = Vec::new();
    let mut ctas = Vec::new();

    for line in text.lines() {
        for m in URL_RE.find_iter(line) {
            links.push(m.as_str().to_string());
        }

        let lowered = line.to_lowercase();
        if CTA_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            ctas.push(line.trim().to_string());
        }
    }

    (links, ctas)
}
