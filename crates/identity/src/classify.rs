use crate::consts::{BARE_CHANNEL_ID_REGEX, BARE_HANDLE_REGEX, BARE_PLAYLIST_ID_REGEX, BARE_VIDEO_ID_REGEX};
use crate::kind::IdentityType;
use crate::url::{SurfaceUrl, YoutubeHost};

/// What classification found, before any validation.
#[derive(Debug, Clone)]
pub(crate) struct Classification {
    pub(crate) kind: IdentityType,
    pub(crate) url: Option<SurfaceUrl>,
    /// The identifier the surface form points at, exactly as it appeared.
    pub(crate) subject: Option<String>,
    /// Trailing channel tab segment, unvalidated.
    pub(crate) tab: Option<String>,
}
impl Classification {
    fn unrecognized(url: Option<SurfaceUrl>) -> Self {
        Self {
            kind: IdentityType::Unrecognized,
            url,
            subject: None,
            tab: None,
        }
    }
}

/// Classify an identifier or URL by its surface form.
///
/// Pure and infallible: anything that doesn't look like a supported form is
/// [`IdentityType::Unrecognized`].
///
/// ```
/// use tubesync_identity::{IdentityType, classify};
/// assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ?t=30s"), IdentityType::VideoShortUrl);
/// assert_eq!(classify("youtube.com/@mkbhd/videos"), IdentityType::ChannelByHandle);
/// assert_eq!(classify("https://example.com/watch?v=dQw4w9WgXcQ"), IdentityType::Unrecognized);
/// ```
pub fn classify(raw: &str) -> IdentityType {
    classify_parts(raw).kind
}

pub(crate) fn classify_parts(raw: &str) -> Classification {
    let raw = raw.trim();
    if let Some(kind) = classify_bare(raw) {
        return Classification {
            kind,
            url: None,
            subject: Some(raw.to_string()),
            tab: None,
        };
    }
    let Some(url) = SurfaceUrl::parse(raw) else {
        return Classification::unrecognized(None);
    };
    let Some(host) = url.youtube_host() else {
        return Classification::unrecognized(Some(url));
    };
    let (kind, subject, tab) = {
        let segments = url.segments();
        match (host, segments.as_slice()) {
            (YoutubeHost::Short, [id, ..]) => (IdentityType::VideoShortUrl, Some(*id), None),
            (YoutubeHost::NoCookie, ["embed", id, ..]) => (IdentityType::VideoNoCookieEmbed, Some(*id), None),
            (YoutubeHost::Main, ["watch"]) => match (url.query_param("v"), url.query_param("list")) {
                (Some(v), Some(_)) => (IdentityType::VideoWatchPlaylist, Some(v), None),
                (Some(v), None) => (IdentityType::VideoWatch, Some(v), None),
                (None, Some(list)) => (IdentityType::Playlist, Some(list), None),
                (None, None) => (IdentityType::Unrecognized, None, None),
            },
            (YoutubeHost::Main, ["embed", "videoseries"] | ["playlist"]) => match url.query_param("list") {
                Some(list) => (IdentityType::Playlist, Some(list), None),
                None => (IdentityType::Unrecognized, None, None),
            },
            (YoutubeHost::Main, ["embed", id]) => (IdentityType::VideoEmbed, Some(*id), None),
            (YoutubeHost::Main, ["v", id]) => (IdentityType::VideoLegacyV, Some(*id), None),
            (YoutubeHost::Main, ["e", id]) => (IdentityType::VideoLegacyE, Some(*id), None),
            (YoutubeHost::Main, ["shorts", id]) => (IdentityType::VideoShorts, Some(*id), None),
            (YoutubeHost::Main, ["live", id]) => (IdentityType::VideoLive, Some(*id), None),
            (YoutubeHost::Main, ["channel", id]) => (IdentityType::ChannelById, Some(*id), None),
            (YoutubeHost::Main, ["channel", id, tab]) => (IdentityType::ChannelById, Some(*id), Some(*tab)),
            (YoutubeHost::Main, [handle]) if handle.starts_with('@') => {
                (IdentityType::ChannelByHandle, Some(*handle), None)
            },
            (YoutubeHost::Main, [handle, tab]) if handle.starts_with('@') => {
                (IdentityType::ChannelByHandle, Some(*handle), Some(*tab))
            },
            _ => (IdentityType::Unrecognized, None, None),
        }
    };
    Classification {
        kind,
        // Ancient `/v/ID&hl=en&fs=1` embeds put their parameters in the path.
        subject: subject.map(|s| s.split('&').next().unwrap_or(s).to_string()),
        tab: tab.map(str::to_string),
        url: Some(url),
    }
}

fn classify_bare(raw: &str) -> Option<IdentityType> {
    // Order matters: an 11-character ID starting with "PL" is a video.
    if BARE_VIDEO_ID_REGEX.is_match(raw) {
        Some(IdentityType::VideoId)
    } else if BARE_CHANNEL_ID_REGEX.is_match(raw) {
        Some(IdentityType::ChannelById)
    } else if BARE_HANDLE_REGEX.is_match(raw) {
        Some(IdentityType::ChannelByHandle)
    } else if BARE_PLAYLIST_ID_REGEX.is_match(raw) {
        Some(IdentityType::PlaylistId)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dQw4w9WgXcQ", IdentityType::VideoId)]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", IdentityType::VideoWatch)]
    #[case("http://youtube.com/watch?feature=share&v=dQw4w9WgXcQ", IdentityType::VideoWatch)]
    #[case("youtube.com/watch?v=dQw4w9WgXcQ", IdentityType::VideoWatch)]
    #[case("//m.youtube.com/watch?v=dQw4w9WgXcQ", IdentityType::VideoWatch)]
    #[case("https://music.youtube.com/watch?v=dQw4w9WgXcQ", IdentityType::VideoWatch)]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI&index=3", IdentityType::VideoWatchPlaylist)]
    #[case("https://youtu.be/dQw4w9WgXcQ?t=30s", IdentityType::VideoShortUrl)]
    #[case("https://www.youtube.com/embed/dQw4w9WgXcQ?start=10", IdentityType::VideoEmbed)]
    #[case("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ", IdentityType::VideoNoCookieEmbed)]
    #[case("https://www.youtube.com/v/dQw4w9WgXcQ?version=3", IdentityType::VideoLegacyV)]
    #[case("https://www.youtube.com/v/dQw4w9WgXcQ&hl=en_US&fs=1", IdentityType::VideoLegacyV)]
    #[case("https://www.youtube.com/e/dQw4w9WgXcQ", IdentityType::VideoLegacyE)]
    #[case("https://youtube.com/shorts/dQw4w9WgXcQ?feature=share", IdentityType::VideoShorts)]
    #[case("https://www.youtube.com/live/dQw4w9WgXcQ", IdentityType::VideoLive)]
    #[case("UCuAXFkgsw1L7xaCfnd5JJOw", IdentityType::ChannelById)]
    #[case("https://www.youtube.com/channel/UCuAXFkgsw1L7xaCfnd5JJOw", IdentityType::ChannelById)]
    #[case("https://www.youtube.com/channel/UCuAXFkgsw1L7xaCfnd5JJOw/videos", IdentityType::ChannelById)]
    #[case("@mkbhd", IdentityType::ChannelByHandle)]
    #[case("https://www.youtube.com/@mkbhd", IdentityType::ChannelByHandle)]
    #[case("m.youtube.com/@mkbhd/shorts", IdentityType::ChannelByHandle)]
    #[case("PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI", IdentityType::PlaylistId)]
    #[case("https://www.youtube.com/playlist?list=PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI", IdentityType::Playlist)]
    #[case("https://www.youtube.com/embed/videoseries?list=PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI", IdentityType::Playlist)]
    #[case("https://www.youtube.com/watch?list=PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI", IdentityType::Playlist)]
    fn test_classify(#[case] raw: &str, #[case] expected: IdentityType) {
        let kind = classify(raw);
        assert_eq!(kind, expected);
        assert!(kind.is_recognized());
    }

    #[rstest]
    #[case("")]
    #[case("not an id")]
    #[case("dQw4w9WgXc")]
    #[case("https://vimeo.com/12345")]
    #[case("https://www.youtube.com/")]
    #[case("https://www.youtube.com/watch")]
    #[case("https://www.youtube.com/feed/subscriptions")]
    #[case("https://www.youtube.com/playlist")]
    fn test_unrecognized(#[case] raw: &str) {
        let kind = classify(raw);
        assert_eq!(kind, IdentityType::Unrecognized);
        assert!(!kind.is_recognized());
    }

    #[test]
    fn test_loose_match_keeps_malformed_subject() {
        let classification = classify_parts("https://youtu.be/short");
        assert_eq!(classification.kind, IdentityType::VideoShortUrl);
        assert_eq!(classification.subject.as_deref(), Some("short"));
    }

    #[test]
    fn test_legacy_path_parameters_are_dropped() {
        let classification = classify_parts("https://www.youtube.com/v/dQw4w9WgXcQ&hl=en_US&fs=1");
        assert_eq!(classification.subject.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_channel_tab_is_captured() {
        let classification = classify_parts("https://www.youtube.com/@mkbhd/videos");
        assert_eq!(classification.subject.as_deref(), Some("@mkbhd"));
        assert_eq!(classification.tab.as_deref(), Some("videos"));
    }
}
