//! Grounding metadata returned alongside the model's text.
//!
//! Sources come from this side channel only, never from the narrative JSON.

use serde::{Deserialize, Serialize};

use crate::report::{SourceLink, MAX_SOURCES};

/// One grounding chunk as returned by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

impl GroundingChunk {
    pub fn web(title: &str, uri: &str) -> Self {
        Self {
            web: Some(WebSource {
                title: Some(title.to_string()),
                uri: Some(uri.to_string()),
            }),
        }
    }
}

/// Extract up to `MAX_SOURCES` title/URL pairs in original order.
///
/// Entries without a URL are dropped before the cap applies. A missing title
/// falls back to the URL so both fields are always populated.
pub fn extract_sources(chunks: &[GroundingChunk]) -> Vec<SourceLink> {
    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| {
            let uri = web.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            let title = web
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(uri);
            Some(SourceLink {
                title: title.to_string(),
                uri: uri.to_string(),
            })
        })
        .take(MAX_SOURCES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_uri_dropped() {
        let chunks = vec![
            GroundingChunk::web("CoinGecko", "https://www.coingecko.com/en/coins/ethereum"),
            GroundingChunk {
                web: Some(WebSource {
                    title: Some("No link".to_string()),
                    uri: None,
                }),
            },
            GroundingChunk { web: None },
        ];
        let sources = extract_sources(&chunks);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "CoinGecko");
    }

    #[test]
    fn test_missing_title_uses_uri() {
        let chunks = vec![GroundingChunk {
            web: Some(WebSource {
                title: None,
                uri: Some("https://etherscan.io/token/0xabc".to_string()),
            }),
        }];
        let sources = extract_sources(&chunks);
        assert_eq!(sources[0].title, "https://etherscan.io/token/0xabc");
    }

    #[test]
    fn test_chunk_deserializes_without_web() {
        let chunk: GroundingChunk = serde_json::from_str("{}").unwrap();
        assert!(chunk.web.is_none());
    }
}
