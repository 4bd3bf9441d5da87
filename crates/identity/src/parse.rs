use tracing::instrument;

use crate::classify::{Classification, classify_parts};
use crate::identity::{RemoteIdentity, channel_handle_url, channel_id_url, hash, playlist_url, video_url};
use crate::kind::{ChannelTab, IdentityFamily, IdentityType, RemoteKind};
use crate::timestamp::parse_timestamp;
use crate::url::SurfaceUrl;
use crate::validate;
use crate::violation::{Field, Rule, Violation, Violations};

/// Every component that could be extracted from an identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityParts {
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
    /// Handle without the leading `@`, in its original case.
    pub channel_handle: Option<String>,
    pub playlist_id: Option<String>,
    /// 1-based position within `playlist_id`.
    pub playlist_index: Option<u32>,
    pub start_time_seconds: Option<u64>,
    pub tab: Option<ChannelTab>,
    /// Linked comment (`lc=`) on a watch URL.
    pub comment_id: Option<String>,
}

/// A successfully parsed identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIdentity {
    pub kind: IdentityType,
    /// The family the canonical URL was built for.
    pub family: IdentityFamily,
    pub parts: IdentityParts,
    pub canonical_url: String,
    pub hash: i64,
}
impl ParsedIdentity {
    /// The [`RemoteIdentity`] for this identifier. Playlists are not a
    /// cached resource kind, so they have none.
    pub fn identity(&self) -> Option<RemoteIdentity> {
        let (kind, short_id) = match self.family {
            IdentityFamily::Video => (RemoteKind::Video, self.parts.video_id.clone()),
            IdentityFamily::Channel => (
                RemoteKind::Channel,
                self.parts
                    .channel_id
                    .clone()
                    .or_else(|| self.parts.channel_handle.as_ref().map(|h| format!("@{}", h.to_lowercase()))),
            ),
            IdentityFamily::Playlist => return None,
        };
        Some(RemoteIdentity::from_canonical(kind, self.canonical_url.clone(), short_id))
    }
}

/// Parse an identifier or URL into its parts and canonical URL.
///
/// When `expected` is given, an identifier of another family is rejected
/// with [`Violation::AmbiguousKindMismatch`]. All violations are collected:
/// a channel URL with a malformed ID passed where a video was expected
/// reports both problems.
///
/// ```
/// use tubesync_identity::{IdentityFamily, IdentityType, parse};
/// let short = parse("https://youtu.be/dQw4w9WgXcQ?t=30s", Some(IdentityFamily::Video)).unwrap();
/// assert_eq!(short.kind, IdentityType::VideoShortUrl);
/// assert_eq!(short.parts.start_time_seconds, Some(30));
///
/// let watch = parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=30", None).unwrap();
/// assert_eq!(short.canonical_url, watch.canonical_url);
/// assert_eq!(short.hash, watch.hash);
/// ```
#[instrument(level = "trace", ret(level = "trace"))]
pub fn parse(raw: &str, expected: Option<IdentityFamily>) -> Result<ParsedIdentity, Violations> {
    let classification = classify_parts(raw);
    let Some(found) = classification.kind.family() else {
        return Err(Violations::single(Violation::UnsupportedIdentity(raw.trim().to_string())));
    };
    let mut violations = Vec::new();
    if let Some(expected) = expected
        && !classification.kind.satisfies(expected)
    {
        violations.push(Violation::AmbiguousKindMismatch {
            expected,
            found: classification.kind,
        });
    }
    let parts = match found {
        IdentityFamily::Video => video_parts(&classification, &mut violations),
        IdentityFamily::Channel => channel_parts(&classification, &mut violations),
        IdentityFamily::Playlist => playlist_parts(&classification, &mut violations),
    };
    Violations::check(violations)?;
    let family = match expected {
        Some(expected) if classification.kind.satisfies(expected) => expected,
        _ => found,
    };
    let canonical_url = canonical_url(family, &parts)
        .ok_or_else(|| Violations::single(Violation::UnsupportedIdentity(raw.trim().to_string())))?;
    Ok(ParsedIdentity {
        kind: classification.kind,
        family,
        hash: hash(&canonical_url),
        canonical_url,
        parts,
    })
}

fn canonical_url(family: IdentityFamily, parts: &IdentityParts) -> Option<String> {
    match family {
        IdentityFamily::Video => parts.video_id.as_deref().map(video_url),
        IdentityFamily::Channel => parts
            .channel_id
            .as_deref()
            .map(channel_id_url)
            .or_else(|| parts.channel_handle.as_deref().map(channel_handle_url)),
        IdentityFamily::Playlist => parts.playlist_id.as_deref().map(playlist_url),
    }
}

fn video_parts(classification: &Classification, violations: &mut Vec<Violation>) -> IdentityParts {
    let mut parts = IdentityParts::default();
    let video_id = classification.subject.clone().unwrap_or_default();
    validate::video_id(&video_id, violations);
    parts.video_id = Some(video_id);
    if let Some(url) = &classification.url {
        parts.start_time_seconds = start_time(url, violations);
        if let Some(list) = url.query_param("list") {
            validate::playlist_id(list, violations);
            parts.playlist_id = Some(list.to_string());
            parts.playlist_index = playlist_index(url, violations);
        }
        if let Some(comment) = url.query_param("lc") {
            validate::comment_id(comment, violations);
            parts.comment_id = Some(comment.to_string());
        }
    }
    parts
}

fn channel_parts(classification: &Classification, violations: &mut Vec<Violation>) -> IdentityParts {
    let mut parts = IdentityParts::default();
    let subject = classification.subject.clone().unwrap_or_default();
    match classification.kind {
        IdentityType::ChannelByHandle => {
            let handle = subject.strip_prefix('@').unwrap_or(&subject);
            validate::handle(handle, violations);
            parts.channel_handle = Some(handle.to_string());
        },
        _ => {
            validate::channel_id(&subject, violations);
            parts.channel_id = Some(subject);
        },
    }
    if let Some(tab) = &classification.tab {
        match tab.parse::<ChannelTab>() {
            Ok(tab) => parts.tab = Some(tab),
            Err(rule) => violations.push(Violation::structure(Field::Tab, rule)),
        }
    }
    parts
}

fn playlist_parts(classification: &Classification, violations: &mut Vec<Violation>) -> IdentityParts {
    let mut parts = IdentityParts::default();
    let playlist_id = classification.subject.clone().unwrap_or_default();
    validate::playlist_id(&playlist_id, violations);
    parts.playlist_id = Some(playlist_id);
    if let Some(url) = &classification.url {
        parts.playlist_index = playlist_index(url, violations);
    }
    parts
}

/// `t=` wins over the embed-style `start=`, which wins over `#t=`.
fn start_time(url: &SurfaceUrl, violations: &mut Vec<Violation>) -> Option<u64> {
    let value = url
        .query_param("t")
        .or_else(|| url.query_param("start"))
        .or_else(|| url.fragment_param("t"))?;
    match parse_timestamp(value) {
        Ok(seconds) => Some(seconds),
        Err(rule) => {
            violations.push(Violation::structure(Field::StartTime, rule));
            None
        },
    }
}

fn playlist_index(url: &SurfaceUrl, violations: &mut Vec<Violation>) -> Option<u32> {
    let value = url.query_param("index")?;
    match value.parse::<u32>() {
        Ok(index) if index > 0 => Some(index),
        _ => {
            violations.push(Violation::structure(
                Field::PlaylistIndex,
                Rule::PositiveInteger(value.to_string()),
            ));
            None
        },
    }
}
