//! Simulated skill backends for the reference runtime.
//!
//! All data in this module is hardcoded and fictional. No external systems are
//! contacted; each function stands in for one social-platform or wallet API.

use serde_json::{Map, Value};
use uuid::Uuid;

use chimera_contracts::payload::{
    GeneratedContent, PublishReceipt, ReviewVerdict, Trend, TrendReport, WalletBalance,
};

/// Platforms the trend and publish backends know about.
pub const PLATFORMS: [&str; 4] = ["twitter", "instagram", "tiktok", "reddit"];

/// Trend categories the analytics backend indexes.
pub const CATEGORIES: [&str; 6] = [
    "tech",
    "fashion",
    "sports",
    "entertainment",
    "politics",
    "business",
];

/// Content formats the generator supports.
pub const CONTENT_TYPES: [&str; 3] = ["post", "image", "video"];

/// Starting balance of every agent wallet, in USD.
pub const WALLET_BALANCE_USD: f64 = 100.0;

// ── Trends ────────────────────────────────────────────────────────────────────

/// The top `limit` trends for a platform and category.
///
/// Volumes fall off linearly from 10 000; sentiment alternates so the
/// generator has both positive and neutral topics to pick from.
pub fn trending_topics(platform: &str, category: &str, limit: usize) -> TrendReport {
    let tag = capitalize(category);
    let trends = (0..limit)
        .map(|i| Trend {
            topic: format!("#{platform}{tag}{i}"),
            volume: 1000 * (10 - (i as u64).min(9)),
            sentiment: if i % 2 == 0 { 0.72 } else { 0.5 },
        })
        .collect();
    TrendReport {
        platform: platform.to_string(),
        trends,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── Content ───────────────────────────────────────────────────────────────────

/// Draft a post for `prompt`, weaving in the strongest trend from each report.
pub fn draft_content(prompt: &str, reports: &[TrendReport]) -> GeneratedContent {
    let hooks: Vec<String> = reports
        .iter()
        .filter_map(|r| r.trends.first().map(|t| t.topic.clone()))
        .collect();
    let content = if hooks.is_empty() {
        format!("Generated content for prompt: {prompt}")
    } else {
        format!("Generated content for prompt: {prompt} {}", hooks.join(" "))
    };
    GeneratedContent {
        content,
        confidence: 0.85,
        citations: hooks,
    }
}

/// Check `content` against brand guidelines.
///
/// Recognised guideline keys: `banned_terms` (array of strings, matched
/// case-insensitively) and `max_length` (characters).
pub fn review_against_guidelines(content: &str, guidelines: &Map<String, Value>) -> ReviewVerdict {
    let lowered = content.to_lowercase();
    let mut violations: Vec<String> = guidelines
        .get("banned_terms")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .filter(|term| lowered.contains(&term.to_lowercase()))
        .map(|term| format!("banned term '{term}'"))
        .collect();

    if let Some(max) = guidelines.get("max_length").and_then(Value::as_u64) {
        let length = content.chars().count() as u64;
        if length > max {
            violations.push(format!("length {length} exceeds {max}"));
        }
    }

    ReviewVerdict {
        is_valid: violations.is_empty(),
        confidence: 0.95,
        violations,
    }
}

// ── Publishing & wallet ───────────────────────────────────────────────────────

pub fn publish_receipt(platform: &str) -> PublishReceipt {
    let post = Uuid::new_v4();
    PublishReceipt {
        post_id: format!("{platform}:{post}"),
        post_url: format!("https://{platform}.com/post/{}", post.simple()),
        receipt_id: format!("receipt:{}", Uuid::new_v4()),
    }
}

pub fn wallet_after(spent_usd: f64) -> WalletBalance {
    WalletBalance {
        balance: WALLET_BALANCE_USD - spent_usd,
        currency: "USD".to_string(),
    }
}
