use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

pub(crate) const VIDEO_ID_LENGTH: usize = 11;
pub(crate) const CHANNEL_ID_LENGTH: usize = 24;
pub(crate) const CHANNEL_ID_PREFIX: &str = "UC";
pub(crate) const HANDLE_MIN_LENGTH: usize = 3;
pub(crate) const HANDLE_MAX_LENGTH: usize = 30;
pub(crate) const PLAYLIST_ID_MIN_LENGTH: usize = 10;
pub(crate) const PLAYLIST_ID_MAX_LENGTH: usize = 64;
/// Auto-generated playlists that are shorter than any regular playlist ID.
pub(crate) const SPECIAL_PLAYLISTS: [&str; 3] = ["LL", "WL", "LM"];

pub(crate) const CANONICAL_ORIGIN: &str = "https://www.youtube.com";
pub(crate) const THUMBNAIL_HOST: &str = "i.ytimg.com";
pub(crate) const AVATAR_HOST: &str = "yt3.ggpht.com";

regex!(BARE_VIDEO_ID_REGEX, r"^[A-Za-z0-9_-]{11}$");
regex!(BARE_CHANNEL_ID_REGEX, r"^UC[A-Za-z0-9_-]{22}$");
regex!(BARE_HANDLE_REGEX, r"^@[^/?#&\s]+$");
regex!(
    BARE_PLAYLIST_ID_REGEX,
    r"^(?:PL|UU|FL|LL|RD|OL|UL|PU|EL|TL|OLAK5uy_)[A-Za-z0-9_-]{8,}$"
);
regex!(SCHEME_REGEX, r"^([A-Za-z][A-Za-z0-9+.-]*)://");
regex!(HOST_REGEX, r"^[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+(?::\d+)?$");
regex!(TIMESTAMP_REGEX, r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s?)?$");
regex!(MIRROR_THUMBNAIL_HOST_REGEX, r"^i\d\.ytimg\.com$");
regex!(LANGUAGE_CODE_REGEX, r"^[A-Za-z]{2,3}(?:-[A-Za-z0-9]{1,8})*$");
