//! Headline classification and the canned fallback feed.
//!
//! Classification is plain keyword matching: cheap, deterministic and good
//! enough to tag a dashboard feed.

use chrono::{DateTime, Duration, Utc};

use crate::types::{Impact, NewsItem, Sentiment};

/// Tickers recognised when mentioned directly
const TRACKED_TICKERS: &[&str] = &[
    "AAPL", "NVDA", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "JPM", "JNJ", "V", "XOM", "SPY", "QQQ",
];

/// Lowercase company names and the ticker they imply
const COMPANY_NAMES: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("nvidia", "NVDA"),
    ("microsoft", "MSFT"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("amazon", "AMZN"),
    ("tesla", "TSLA"),
    ("meta", "META"),
    ("facebook", "META"),
    ("jpmorgan", "JPM"),
    ("johnson", "JNJ"),
    ("visa", "V"),
    ("exxon", "XOM"),
    ("s&p", "SPY"),
    ("nasdaq", "QQQ"),
];

const POSITIVE_WORDS: &[&str] = &[
    "growth", "profit", "beat", "strong", "bullish", "upgrade", "buy", "surge", "rally", "gains",
];
const NEGATIVE_WORDS: &[&str] = &[
    "loss", "decline", "miss", "weak", "bearish", "downgrade", "sell", "crash", "fall", "drop",
];

const HIGH_IMPACT_WORDS: &[&str] = &[
    "fed",
    "federal reserve",
    "earnings",
    "merger",
    "acquisition",
    "bankruptcy",
    "lawsuit",
    "rate cut",
    "inflation",
];
const MEDIUM_IMPACT_WORDS: &[&str] = &[
    "guidance", "forecast", "analyst", "rating", "target", "upgrade", "downgrade",
];

/// Spacing between consecutive canned headlines
const CANNED_STAGGER_MINUTES: i64 = 30;
const CANNED_SOURCE: &str = "Financial Times";

/// Symbols mentioned in `text`, in first-seen order without duplicates.
///
/// Tickers must appear as whole words (so "V" does not match every "v");
/// company names match as lowercase substrings.
pub fn extract_symbols(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut push = |symbol: &str| {
        if !found.iter().any(|s| s == symbol) {
            found.push(symbol.to_string());
        }
    };

    for word in text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '.')) {
        let word = word.trim_matches('.').to_ascii_uppercase();
        if let Some(ticker) = TRACKED_TICKERS.iter().find(|t| **t == word) {
            push(*ticker);
        }
    }

    let lower = text.to_lowercase();
    for (name, ticker) in COMPANY_NAMES {
        if lower.contains(name) {
            push(*ticker);
        }
    }

    found
}

pub fn analyze_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Impact is judged on the headline alone
pub fn assess_impact(title: &str) -> Impact {
    let lower = title.to_lowercase();
    if HIGH_IMPACT_WORDS.iter().any(|w| lower.contains(w)) {
        Impact::High
    } else if MEDIUM_IMPACT_WORDS.iter().any(|w| lower.contains(w)) {
        Impact::Medium
    } else {
        Impact::Low
    }
}

/// Build a classified item from raw article text
pub fn classify_article(
    id: String,
    title: &str,
    summary: &str,
    source: &str,
    timestamp: DateTime<Utc>,
) -> NewsItem {
    let text = format!("{} {}", title, summary);
    NewsItem {
        id,
        title: title.to_string(),
        summary: summary.to_string(),
        source: source.to_string(),
        timestamp,
        relevant_symbols: extract_symbols(&text),
        sentiment: analyze_sentiment(&text),
        impact: assess_impact(title),
    }
}

struct CannedHeadline {
    title: &'static str,
    summary: &'static str,
    symbols: &'static [&'static str],
    sentiment: Sentiment,
    impact: Impact,
}

const CANNED_HEADLINES: &[CannedHeadline] = &[
    CannedHeadline {
        title: "S&P 500 Reaches New All-Time High as Tech Stocks Rally",
        summary: "The S&P 500 index climbed to a fresh record as technology stocks led broad market gains",
        symbols: &["SPY", "QQQ", "AAPL", "MSFT", "NVDA"],
        sentiment: Sentiment::Positive,
        impact: Impact::High,
    },
    CannedHeadline {
        title: "Federal Reserve Officials Signal Cautious Approach to Rate Changes",
        summary: "Fed policymakers indicate they will carefully monitor economic data before making rate decisions",
        symbols: &["SPY", "QQQ", "JPM", "XOM"],
        sentiment: Sentiment::Neutral,
        impact: Impact::High,
    },
    CannedHeadline {
        title: "NVIDIA Reports Strong AI Chip Demand in Latest Quarter",
        summary: "Graphics chip maker sees continued growth in data center and AI applications",
        symbols: &["NVDA", "AMD", "TSM"],
        sentiment: Sentiment::Positive,
        impact: Impact::High,
    },
    CannedHeadline {
        title: "Apple iPhone Sales Show Resilience Despite Market Concerns",
        summary: "Tech giant's latest smartphone lineup continues to perform well in key markets",
        symbols: &["AAPL", "GOOGL", "MSFT"],
        sentiment: Sentiment::Positive,
        impact: Impact::Medium,
    },
    CannedHeadline {
        title: "Energy Sector Faces Headwinds as Oil Prices Fluctuate",
        summary: "Major energy companies navigate volatile commodity markets and changing demand patterns",
        symbols: &["XOM", "CVX", "COP"],
        sentiment: Sentiment::Negative,
        impact: Impact::Medium,
    },
];

/// Fallback feed: fixed headlines with timestamps stepping back from `now`
pub fn canned_headlines(now: DateTime<Utc>) -> Vec<NewsItem> {
    let stamp = now.timestamp_millis();
    CANNED_HEADLINES
        .iter()
        .enumerate()
        .map(|(index, headline)| NewsItem {
            id: format!("mock_news_{}_{}", stamp, index),
            title: headline.title.to_string(),
            summary: headline.summary.to_string(),
            source: CANNED_SOURCE.to_string(),
            timestamp: now - Duration::minutes(CANNED_STAGGER_MINUTES * index as i64),
            relevant_symbols: headline.symbols.iter().map(|s| s.to_string()).collect(),
            sentiment: headline.sentiment,
            impact: headline.impact,
        })
        .collect()
}
