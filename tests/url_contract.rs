use twill::classify::{classify, ParsedVideo, Platform};
use twill::error::TwillError;

fn expect(input: &str, platform: Platform, video_id: &str, is_live: bool) {
    let parsed = classify(input).unwrap_or_else(|e| panic!("{} was rejected: {}", input, e));
    assert_eq!(
        parsed,
        ParsedVideo {
            platform,
            video_id: video_id.to_string(),
            is_live,
        },
        "classifying {}",
        input
    );
}

#[test]
fn accepted_url_shapes() {
    expect("https://www.youtube.com/watch?v=abc123", Platform::YouTube, "abc123", false);
    expect("https://music.youtube.com/watch?v=abc123&list=RD", Platform::YouTube, "abc123", false);
    expect("https://youtu.be/xyz789?t=5", Platform::YouTube, "xyz789", false);
    expect("https://www.twitch.tv/somechannel", Platform::Twitch, "somechannel", true);
    expect("https://m.twitch.tv/somechannel/about", Platform::Twitch, "somechannel", true);
    expect("https://www.twitch.tv/videos/998877", Platform::Twitch, "998877", false);
    expect("https://kick.com/somestreamer", Platform::Kick, "somestreamer", true);
    expect("  https://kick.com/somestreamer  ", Platform::Kick, "somestreamer", true);
}

#[test]
fn rejected_inputs() {
    for input in [
        "not a url",
        "https://example.com/",
        "youtube.com/watch?v=abc123",
        "https://www.youtube.com/",
        "https://youtu.be",
        "https://www.twitch.tv/videos/",
        "https://kick.com/",
    ] {
        assert!(
            matches!(classify(input), Err(TwillError::InvalidUrl(_))),
            "{} should be rejected",
            input
        );
    }
}

#[test]
fn classification_is_deterministic() {
    let input = "https://www.twitch.tv/videos/998877";
    assert_eq!(classify(input).unwrap(), classify(input).unwrap());
}
