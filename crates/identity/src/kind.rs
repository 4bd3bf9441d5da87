use derive_more::Display;
use std::str::FromStr;

use crate::violation::Rule;

/// The kind of remote resource a [`RemoteIdentity`](crate::RemoteIdentity)
/// addresses.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RemoteKind {
    #[display("video")]
    Video,
    #[display("channel")]
    Channel,
    #[display("image")]
    Image,
    #[display("stream")]
    Stream,
    #[display("caption")]
    Caption,
    #[display("comment")]
    Comment,
}

/// Coarse class of a user-facing identifier, used as a parse expectation.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityFamily {
    #[display("video")]
    Video,
    #[display("channel")]
    Channel,
    #[display("playlist")]
    Playlist,
}

/// Surface form an identifier was recognized as.
///
/// Classification is purely structural: a URL can be classified (say, as a
/// [`VideoShortUrl`](Self::VideoShortUrl)) and still fail validation later
/// because the ID it carries has the wrong length.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityType {
    /// Bare 11-character video ID.
    #[display("bare video id")]
    VideoId,
    /// `youtube.com/watch?v=ID`
    #[display("watch url")]
    VideoWatch,
    /// `youtube.com/watch?v=ID&list=PL…`
    #[display("watch url with playlist")]
    VideoWatchPlaylist,
    /// `youtu.be/ID`
    #[display("short url")]
    VideoShortUrl,
    /// `youtube.com/embed/ID`
    #[display("embed url")]
    VideoEmbed,
    /// `youtube-nocookie.com/embed/ID`
    #[display("no-cookie embed url")]
    VideoNoCookieEmbed,
    /// `youtube.com/v/ID`
    #[display("legacy /v/ url")]
    VideoLegacyV,
    /// `youtube.com/e/ID`
    #[display("legacy /e/ url")]
    VideoLegacyE,
    /// `youtube.com/shorts/ID`
    #[display("shorts url")]
    VideoShorts,
    /// `youtube.com/live/ID`
    #[display("live url")]
    VideoLive,
    /// `UC…` as a bare ID or `youtube.com/channel/UC…[/tab]`
    #[display("channel id")]
    ChannelById,
    /// `@name` as a bare handle or `youtube.com/@name[/tab]`
    #[display("channel handle")]
    ChannelByHandle,
    /// Bare playlist ID (`PL…`, `UU…`, …).
    #[display("bare playlist id")]
    PlaylistId,
    /// `youtube.com/playlist?list=…` or any other URL whose only subject is `list=`.
    #[display("playlist url")]
    Playlist,
    #[display("unrecognized")]
    Unrecognized,
}
impl IdentityType {
    /// The family this surface form belongs to, `None` when unrecognized.
    pub fn family(&self) -> Option<IdentityFamily> {
        Some(match self {
            Self::VideoId
            | Self::VideoWatch
            | Self::VideoWatchPlaylist
            | Self::VideoShortUrl
            | Self::VideoEmbed
            | Self::VideoNoCookieEmbed
            | Self::VideoLegacyV
            | Self::VideoLegacyE
            | Self::VideoShorts
            | Self::VideoLive => IdentityFamily::Video,
            Self::ChannelById | Self::ChannelByHandle => IdentityFamily::Channel,
            Self::PlaylistId | Self::Playlist => IdentityFamily::Playlist,
            Self::Unrecognized => return None,
        })
    }

    /// Whether an identifier of this form may stand in where `expected` is
    /// required. A watch URL with playlist context addresses both a video
    /// and a playlist.
    pub fn satisfies(&self, expected: IdentityFamily) -> bool {
        match (self, expected) {
            (Self::VideoWatchPlaylist, IdentityFamily::Playlist) => true,
            _ => self.family() == Some(expected),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

/// Trailing channel tab segment (`/@name/videos`).
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelTab {
    #[display("featured")]
    Featured,
    #[display("videos")]
    Videos,
    #[display("shorts")]
    Shorts,
    #[display("streams")]
    Streams,
    #[display("playlists")]
    Playlists,
    #[display("community")]
    Community,
    #[display("podcasts")]
    Podcasts,
    #[display("releases")]
    Releases,
    #[display("store")]
    Store,
    #[display("channels")]
    Channels,
    #[display("about")]
    About,
    #[display("search")]
    Search,
}
impl FromStr for ChannelTab {
    type Err = Rule;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "featured" => Self::Featured,
            "videos" => Self::Videos,
            "shorts" => Self::Shorts,
            "streams" | "live" => Self::Streams,
            "playlists" => Self::Playlists,
            "community" | "posts" => Self::Community,
            "podcasts" => Self::Podcasts,
            "releases" => Self::Releases,
            "store" => Self::Store,
            "channels" => Self::Channels,
            "about" => Self::About,
            "search" => Self::Search,
            _ => return Err(Rule::Unknown(s.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(IdentityType::VideoShorts, IdentityFamily::Video, true)]
    #[case(IdentityType::VideoWatchPlaylist, IdentityFamily::Video, true)]
    #[case(IdentityType::VideoWatchPlaylist, IdentityFamily::Playlist, true)]
    #[case(IdentityType::VideoWatch, IdentityFamily::Playlist, false)]
    #[case(IdentityType::ChannelByHandle, IdentityFamily::Video, false)]
    #[case(IdentityType::Unrecognized, IdentityFamily::Channel, false)]
    fn test_satisfies(#[case] kind: IdentityType, #[case] expected: IdentityFamily, #[case] result: bool) {
        assert_eq!(kind.satisfies(expected), result);
    }

    #[rstest]
    #[case("videos", ChannelTab::Videos)]
    #[case("Shorts", ChannelTab::Shorts)]
    #[case("live", ChannelTab::Streams)]
    #[case("posts", ChannelTab::Community)]
    fn test_tab_from_str(#[case] input: &str, #[case] expected: ChannelTab) {
        assert_eq!(input.parse::<ChannelTab>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_tab() {
        assert_eq!("merch".parse::<ChannelTab>(), Err(Rule::Unknown("merch".to_string())));
    }
}
