//! Video URL classification.
//!
//! Maps a pasted URL onto the platform it belongs to and the platform's
//! canonical id for the video or channel. Pure and deterministic: no network
//! access and no state.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::error::{Result, TwillError};

/// Streaming platform a video reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    Twitch,
    Kick,
}

impl Platform {
    /// Human readable platform name
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Twitch => "Twitch",
            Platform::Kick => "Kick",
        }
    }

    /// Watch URL for a canonical id on this platform.
    ///
    /// Twitch ids are treated as channel logins here; use
    /// [`ParsedVideo::source_url`] when the liveness of the id is known.
    pub fn watch_url(&self, video_id: &str) -> String {
        match self {
            Platform::YouTube => format!("https://www.youtube.com/watch?v={}", video_id),
            Platform::Twitch => format!("https://www.twitch.tv/{}", video_id),
            Platform::Kick => format!("https://kick.com/{}", video_id),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Successful classification of a video URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedVideo {
    pub platform: Platform,
    pub video_id: String,
    pub is_live: bool,
}

impl ParsedVideo {
    fn new(platform: Platform, video_id: &str, is_live: bool) -> Self {
        Self {
            platform,
            video_id: video_id.to_string(),
            is_live,
        }
    }

    /// Rebuild a URL that points at the same content
    pub fn source_url(&self) -> String {
        match (self.platform, self.is_live) {
            (Platform::Twitch, false) => format!("https://www.twitch.tv/videos/{}", self.video_id),
            (platform, _) => platform.watch_url(&self.video_id),
        }
    }
}

/// Classify free-text input as a YouTube, Twitch or Kick video reference.
///
/// Hosts are matched by substring, in the order YouTube, Twitch, Kick, so
/// subdomains such as `m.youtube.com` or `clips.twitch.tv` are accepted. The
/// first host pattern that matches decides the branch; a URL whose shape does
/// not fit that branch is rejected rather than tried against later ones.
pub fn classify(input: &str) -> Result<ParsedVideo> {
    let input = input.trim();
    let url = Url::parse(input)
        .map_err(|e| TwillError::InvalidUrl(format!("'{}' is not a valid URL: {}", input, e)))?;

    let host = url
        .host_str()
        .map(|h| h.to_lowercase())
        .ok_or_else(|| TwillError::InvalidUrl(format!("'{}' has no host", input)))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|parts| parts.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    if host.contains("youtube.com") {
        let video_id = url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| missing_id(Platform::YouTube, input))?;
        return Ok(ParsedVideo::new(Platform::YouTube, &video_id, false));
    }

    if host.contains("youtu.be") {
        let video_id = segments
            .first()
            .ok_or_else(|| missing_id(Platform::YouTube, input))?;
        return Ok(ParsedVideo::new(Platform::YouTube, video_id, false));
    }

    if host.contains("twitch.tv") {
        return match segments.as_slice() {
            ["videos", vod_id, ..] => Ok(ParsedVideo::new(Platform::Twitch, vod_id, false)),
            ["videos"] | [] => Err(missing_id(Platform::Twitch, input)),
            [channel, ..] => Ok(ParsedVideo::new(Platform::Twitch, channel, true)),
        };
    }

    if host.contains("kick.com") {
        let channel = segments
            .first()
            .ok_or_else(|| missing_id(Platform::Kick, input))?;
        return Ok(ParsedVideo::new(Platform::Kick, channel, true));
    }

    Err(TwillError::InvalidUrl(format!(
        "'{}' is not a YouTube, Twitch or Kick URL",
        input
    )))
}

fn missing_id(platform: Platform, input: &str) -> TwillError {
    TwillError::InvalidUrl(format!("no {} video id in '{}'", platform, input))
}
