//! Stable addresses for remote resources.
//!
//! A [`RemoteIdentity`] is the canonical URL of a resource plus a 64-bit hash
//! of it. Every surface form of the same resource (a short URL, an embed, a
//! thumbnail proxied through some Invidious instance) produces the same
//! canonical URL and therefore the same hash.

use tracing::trace;

use crate::consts::{AVATAR_HOST, CANONICAL_ORIGIN, MIRROR_THUMBNAIL_HOST_REGEX, THUMBNAIL_HOST};
use crate::error::{ErrorKind, Result};
use crate::kind::{IdentityFamily, RemoteKind};
use crate::parse::parse;
use crate::url::SurfaceUrl;
use crate::validate;
use crate::violation::{Field, Rule, Violation, Violations};

/// The storage hash of a canonical URL: the first 8 bytes of its BLAKE3
/// digest, read little-endian.
///
/// ```
/// let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
/// assert_eq!(tubesync_identity::hash(url), tubesync_identity::hash(url));
/// assert_ne!(tubesync_identity::hash(url), tubesync_identity::hash("https://www.youtube.com/@mkbhd"));
/// ```
pub fn hash(canonical_url: &str) -> i64 {
    let [a, b, c, d, e, f, g, h, ..] = *blake3::hash(canonical_url.as_bytes()).as_bytes();
    i64::from_le_bytes([a, b, c, d, e, f, g, h])
}

pub(crate) fn video_url(video_id: &str) -> String {
    format!("{CANONICAL_ORIGIN}/watch?v={video_id}")
}

pub(crate) fn channel_id_url(channel_id: &str) -> String {
    format!("{CANONICAL_ORIGIN}/channel/{channel_id}")
}

/// `handle` is without its leading `@`.
pub(crate) fn channel_handle_url(handle: &str) -> String {
    format!("{CANONICAL_ORIGIN}/@{}", handle.to_lowercase())
}

pub(crate) fn playlist_url(playlist_id: &str) -> String {
    format!("{CANONICAL_ORIGIN}/playlist?list={playlist_id}")
}

fn comment_url(video_id: &str, comment_id: &str) -> String {
    format!("{CANONICAL_ORIGIN}/watch?v={video_id}&lc={comment_id}")
}

fn stream_url(video_id: &str, itag: u32) -> String {
    format!("{CANONICAL_ORIGIN}/watch?v={video_id}&itag={itag}")
}

fn caption_url(video_id: &str, language_code: &str, auto_generated: bool) -> String {
    let kind = if auto_generated { "&kind=asr" } else { "" };
    format!("{CANONICAL_ORIGIN}/api/timedtext?v={video_id}&lang={language_code}{kind}")
}

/// Immutable address of a remote resource.
///
/// The hash is computed once, when the identity is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteIdentity {
    kind: RemoteKind,
    canonical_url: String,
    hash: i64,
    short_id: Option<String>,
}

impl RemoteIdentity {
    pub(crate) fn from_canonical(kind: RemoteKind, canonical_url: String, short_id: Option<String>) -> Self {
        Self {
            kind,
            hash: hash(&canonical_url),
            canonical_url,
            short_id,
        }
    }

    /// A video, from a bare ID or any supported video URL.
    pub fn video(raw: &str) -> Result<Self> {
        let parsed = parse(raw, Some(IdentityFamily::Video)).map_err(ErrorKind::invalid)?;
        Ok(Self::from_canonical(RemoteKind::Video, parsed.canonical_url, parsed.parts.video_id))
    }

    /// A channel, from a `UC…` ID, an `@handle` or a channel URL.
    pub fn channel(raw: &str) -> Result<Self> {
        let parsed = parse(raw, Some(IdentityFamily::Channel)).map_err(ErrorKind::invalid)?;
        parsed
            .identity()
            .ok_or_else(|| ErrorKind::invalid(Violations::single(Violation::UnsupportedIdentity(raw.trim().to_string()))))
    }

    /// A comment on `video`, which may be any video identifier.
    pub fn comment(video: &str, comment_id: &str) -> Result<Self> {
        let (video_id, mut violations) = match parse(video, Some(IdentityFamily::Video)) {
            Ok(parsed) => (parsed.parts.video_id.unwrap_or_default(), Vec::new()),
            Err(found) => (String::new(), found.into_inner()),
        };
        validate::comment_id(comment_id, &mut violations);
        Violations::check(violations).map_err(ErrorKind::invalid)?;
        Ok(Self::from_canonical(
            RemoteKind::Comment,
            comment_url(&video_id, comment_id),
            Some(comment_id.to_string()),
        ))
    }

    /// An image (thumbnail, avatar, banner), from any absolute or
    /// instance-relative URL.
    ///
    /// ```
    /// use tubesync_identity::RemoteIdentity;
    /// let proxied = RemoteIdentity::image("/vi/dQw4w9WgXcQ/hqdefault.jpg", Some("https://invidious.example")).unwrap();
    /// let direct = RemoteIdentity::image("https://i3.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg", None).unwrap();
    /// assert_eq!(proxied.canonical_url(), "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg");
    /// assert_eq!(proxied.hash(), direct.hash());
    /// ```
    pub fn image(raw: &str, base: Option<&str>) -> Result<Self> {
        let url = normalize(raw, base).map_err(ErrorKind::invalid)?;
        Ok(Self::from_canonical(RemoteKind::Image, url.to_absolute(), None))
    }

    /// The stream `itag` of a video.
    pub fn stream(video_id: &str, itag: u32) -> Result<Self> {
        let mut violations = Vec::new();
        validate::video_id(video_id, &mut violations);
        Violations::check(violations).map_err(ErrorKind::invalid)?;
        Ok(Self::from_canonical(RemoteKind::Stream, stream_url(video_id, itag), None))
    }

    /// A stream by URL. Invidious `/latest_version?id=…&itag=…` URLs map to
    /// the same identity as [`stream`](Self::stream); anything else is
    /// addressed by its normalized URL.
    pub fn stream_url(raw: &str, base: Option<&str>) -> Result<Self> {
        let url = normalize(raw, base).map_err(ErrorKind::invalid)?;
        if url.path == "/latest_version"
            && let Some(video_id) = url.query_param("id")
        {
            let itag = url.query_param("itag").unwrap_or_default();
            let mut violations = Vec::new();
            validate::video_id(video_id, &mut violations);
            let itag = itag.parse::<u32>().ok().or_else(|| {
                violations.push(Violation::structure(Field::Url, Rule::PositiveInteger(itag.to_string())));
                None
            });
            Violations::check(violations).map_err(ErrorKind::invalid)?;
            return Ok(Self::from_canonical(
                RemoteKind::Stream,
                stream_url(video_id, itag.unwrap_or_default()),
                None,
            ));
        }
        Ok(Self::from_canonical(RemoteKind::Stream, url.to_absolute(), None))
    }

    /// The caption track `language_code` of a video.
    pub fn caption(video_id: &str, language_code: &str, auto_generated: bool) -> Result<Self> {
        let mut violations = Vec::new();
        validate::video_id(video_id, &mut violations);
        validate::language_code(language_code, &mut violations);
        Violations::check(violations).map_err(ErrorKind::invalid)?;
        Ok(Self::from_canonical(
            RemoteKind::Caption,
            caption_url(video_id, language_code, auto_generated),
            None,
        ))
    }

    /// A caption track by URL. Invidious `/api/v1/captions/{id}?lang=…` and
    /// YouTube `/api/timedtext?v=…&lang=…` URLs map to the same identity as
    /// [`caption`](Self::caption); anything else is addressed by its
    /// normalized URL.
    pub fn caption_url(raw: &str, base: Option<&str>) -> Result<Self> {
        let url = normalize(raw, base).map_err(ErrorKind::invalid)?;
        let video_id = match url.segments().as_slice() {
            ["api", "v1", "captions", id] => Some(id.to_string()),
            ["api", "timedtext"] => url.query_param("v").map(str::to_string),
            _ => None,
        };
        match (video_id, url.query_param("lang")) {
            (Some(video_id), Some(lang)) => {
                Self::caption(&video_id, lang, url.query_param("kind") == Some("asr"))
            },
            _ => Ok(Self::from_canonical(RemoteKind::Caption, url.to_absolute(), None)),
        }
    }

    pub fn kind(&self) -> RemoteKind {
        self.kind
    }

    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    pub fn hash(&self) -> i64 {
        self.hash
    }

    /// The provider's own ID, where the resource has one.
    pub fn short_id(&self) -> Option<&str> {
        self.short_id.as_deref()
    }
}

/// Resolve `raw` to an absolute `https` URL with the upstream host.
fn normalize(raw: &str, base: Option<&str>) -> std::result::Result<SurfaceUrl, Violations> {
    let unsupported = || Violations::single(Violation::UnsupportedIdentity(raw.trim().to_string()));
    let mut url = SurfaceUrl::parse(raw).ok_or_else(unsupported)?;
    if url.is_relative() {
        let base = base.ok_or_else(|| Violations::single(Violation::structure(Field::Url, Rule::Relative)))?;
        let base = SurfaceUrl::parse(base)
            .filter(|base| !base.is_relative())
            .ok_or_else(|| Violations::single(Violation::structure(Field::Url, Rule::MissingHost)))?;
        url.scheme = base.scheme;
        url.host = base.host;
        url.port = base.port;
    }
    match url.scheme.as_deref() {
        None | Some("https") => {},
        Some("http") => {
            if url.port == Some(80) {
                url.port = None;
            }
        },
        Some(other) => {
            return Err(Violations::single(Violation::structure(
                Field::Url,
                Rule::Scheme(other.to_string()),
            )));
        },
    }
    url.scheme = Some("https".to_string());
    if url.port == Some(443) {
        url.port = None;
    }
    url.fragment = None;
    let Some(host) = url.host.clone() else {
        return Err(Violations::single(Violation::structure(Field::Url, Rule::MissingHost)));
    };
    if url.path.starts_with("/vi/") || url.path.starts_with("/vi_webp/") {
        url.host = Some(THUMBNAIL_HOST.to_string());
    } else if let Some(rest) = url.path.strip_prefix("/ggpht/") {
        url.host = Some(AVATAR_HOST.to_string());
        url.path = format!("/{rest}");
    } else if host == "img.youtube.com" || MIRROR_THUMBNAIL_HOST_REGEX.is_match(&host) {
        url.host = Some(THUMBNAIL_HOST.to_string());
    }
    if url.host.as_deref() != Some(host.as_str()) {
        url.port = None;
        trace!(from = %host, to = ?url.host, "mapped proxied media url to upstream host");
    }
    Ok(url)
}

impl SurfaceUrl {
    fn to_absolute(&self) -> String {
        let mut out = format!(
            "{}://{}",
            self.scheme.as_deref().unwrap_or("https"),
            self.host.as_deref().unwrap_or_default()
        );
        if let Some(port) = self.port {
            out.push_str(&format!(":{port}"));
        }
        match self.path.is_empty() {
            true => out.push('/'),
            false => out.push_str(&self.path),
        }
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const RICK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[test]
    fn test_hash_is_stable() {
        // Persisted rows rely on this value never changing.
        assert_eq!(hash(RICK), hash(&video_url("dQw4w9WgXcQ")));
        let digest = blake3::hash(RICK.as_bytes());
        let expected = i64::from_le_bytes(digest.as_bytes()[..8].try_into().unwrap());
        assert_eq!(hash(RICK), expected);
    }

    #[rstest]
    #[case("dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    #[case("https://youtu.be/dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/embed/dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/v/dQw4w9WgXcQ")]
    fn test_video_identity(#[case] raw: &str) {
        let identity = RemoteIdentity::video(raw).unwrap();
        assert_eq!(identity.kind(), RemoteKind::Video);
        assert_eq!(identity.canonical_url(), RICK);
        assert_eq!(identity.hash(), hash(RICK));
        assert_eq!(identity.short_id(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_video_identity_rejects_channel() {
        let error = RemoteIdentity::video("@mkbhd").unwrap_err();
        let ErrorKind::InvalidIdentity(violations) = &*error;
        assert!(matches!(violations[0], Violation::AmbiguousKindMismatch { .. }));
    }

    #[test]
    fn test_channel_handle_is_case_insensitive() {
        let upper = RemoteIdentity::channel("@MKBHD").unwrap();
        let lower = RemoteIdentity::channel("https://www.youtube.com/@mkbhd/videos").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.short_id(), Some("@mkbhd"));
    }

    #[rstest]
    #[case("@MKBHD")]
    #[case("https://www.youtube.com/@MKBHD/videos")]
    #[case("UCuAXFkgsw1L7xaCfnd5JJOw")]
    fn test_channel_matches_parsed_identity(#[case] raw: &str) {
        let parsed = parse(raw, Some(IdentityFamily::Channel)).unwrap().identity().unwrap();
        assert_eq!(parsed, RemoteIdentity::channel(raw).unwrap());
    }

    #[test]
    fn test_comment() {
        let identity = RemoteIdentity::comment("https://youtu.be/dQw4w9WgXcQ", "UgzSLbO8G7Xr2Q1eL6t4AaABAg").unwrap();
        assert_eq!(identity.canonical_url(), format!("{RICK}&lc=UgzSLbO8G7Xr2Q1eL6t4AaABAg"));
        assert!(RemoteIdentity::comment("dQw4w9WgXcQ", "bad id").is_err());
    }

    #[rstest]
    #[case("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg", None, "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")]
    #[case("http://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg", None, "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")]
    #[case("//i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg", None, "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")]
    #[case("HTTPS://I.YTIMG.COM:443/vi/dQw4w9WgXcQ/hqdefault.jpg#x", None, "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")]
    #[case("https://i9.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg", None, "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")]
    #[case("https://img.youtube.com/vi/dQw4w9WgXcQ/0.jpg", None, "https://i.ytimg.com/vi/dQw4w9WgXcQ/0.jpg")]
    #[case("https://inv.example:3000/vi/dQw4w9WgXcQ/hqdefault.jpg", None, "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")]
    #[case("/vi_webp/dQw4w9WgXcQ/maxres.webp", Some("https://inv.example"), "https://i.ytimg.com/vi_webp/dQw4w9WgXcQ/maxres.webp")]
    #[case("/ggpht/ytc/AIdro_abc=s176-c-k", Some("https://inv.example/"), "https://yt3.ggpht.com/ytc/AIdro_abc=s176-c-k")]
    #[case("https://yt3.ggpht.com/ytc/AIdro_abc=s176-c-k", None, "https://yt3.ggpht.com/ytc/AIdro_abc=s176-c-k")]
    #[case("/banner/abc.jpg", Some("http://inv.example:8080"), "https://inv.example:8080/banner/abc.jpg")]
    fn test_image_normalization(#[case] raw: &str, #[case] base: Option<&str>, #[case] canonical: &str) {
        let identity = RemoteIdentity::image(raw, base).unwrap();
        assert_eq!(identity.canonical_url(), canonical);
        assert_eq!(identity.kind(), RemoteKind::Image);
        assert_eq!(identity.short_id(), None);
    }

    #[rstest]
    #[case("/vi/dQw4w9WgXcQ/hqdefault.jpg", None, Violation::structure(Field::Url, Rule::Relative))]
    #[case("ftp://i.ytimg.com/vi/x.jpg", None, Violation::structure(Field::Url, Rule::Scheme("ftp".to_string())))]
    #[case("/vi/x.jpg", Some("/not/a/base"), Violation::structure(Field::Url, Rule::MissingHost))]
    #[case("not a url", None, Violation::UnsupportedIdentity("not a url".to_string()))]
    fn test_image_errors(#[case] raw: &str, #[case] base: Option<&str>, #[case] expected: Violation) {
        let error = RemoteIdentity::image(raw, base).unwrap_err();
        let ErrorKind::InvalidIdentity(violations) = &*error;
        assert_eq!(violations.to_vec(), vec![expected]);
    }

    #[test]
    fn test_stream_url_maps_to_template() {
        let direct = RemoteIdentity::stream("dQw4w9WgXcQ", 22).unwrap();
        let proxied =
            RemoteIdentity::stream_url("/latest_version?id=dQw4w9WgXcQ&itag=22&local=true", Some("https://inv.example"))
                .unwrap();
        assert_eq!(direct.canonical_url(), format!("{RICK}&itag=22"));
        assert_eq!(direct, proxied);
    }

    #[test]
    fn test_stream_url_rejects_bad_itag() {
        assert!(RemoteIdentity::stream_url("https://inv.example/latest_version?id=dQw4w9WgXcQ&itag=x", None).is_err());
    }

    #[rstest]
    #[case("https://inv.example/api/v1/captions/dQw4w9WgXcQ?lang=en", false)]
    #[case("https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en", false)]
    #[case("https://www.youtube.com/api/timedtext?lang=en&v=dQw4w9WgXcQ&kind=asr", true)]
    fn test_caption_url_maps_to_template(#[case] raw: &str, #[case] auto: bool) {
        let expected = RemoteIdentity::caption("dQw4w9WgXcQ", "en", auto).unwrap();
        assert_eq!(RemoteIdentity::caption_url(raw, None).unwrap(), expected);
    }

    #[test]
    fn test_caption_template() {
        let identity = RemoteIdentity::caption("dQw4w9WgXcQ", "pt-BR", true).unwrap();
        assert_eq!(
            identity.canonical_url(),
            "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=pt-BR&kind=asr"
        );
        assert!(RemoteIdentity::caption("dQw4w9WgXcQ", "", false).is_err());
    }
}
