//! Minimal URL splitting.
//!
//! Only what identity classification needs: scheme, host, port, path, query
//! and fragment. Nothing is percent-decoded; IDs never contain escapes and
//! everything else is kept verbatim.

use crate::consts::{HOST_REGEX, SCHEME_REGEX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum YoutubeHost {
    /// `youtube.com`, including `www.`, `m.` and `music.`
    Main,
    /// `youtu.be`
    Short,
    /// `youtube-nocookie.com`
    NoCookie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SurfaceUrl {
    pub(crate) scheme: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) fragment: Option<String>,
}

impl SurfaceUrl {
    /// Split `raw` into its components.
    ///
    /// Accepts absolute URLs, protocol-relative URLs (`//host/…`), host-first
    /// URLs with the scheme missing (`youtube.com/watch?v=…`) and absolute
    /// paths (`/vi/…`). Returns `None` for anything else, including bare IDs.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return None;
        }
        let (scheme, rest) = match SCHEME_REGEX.captures(raw) {
            Some(captures) => {
                let end = captures.get(0)?.end();
                (Some(captures.get(1)?.as_str().to_ascii_lowercase()), &raw[end..])
            },
            None => (None, raw),
        };
        let (authority, rest) = if scheme.is_some() {
            split_authority(rest)
        } else if let Some(stripped) = rest.strip_prefix("//") {
            split_authority(stripped)
        } else if rest.starts_with('/') {
            (None, rest)
        } else {
            match split_authority(rest) {
                (Some(candidate), remainder) if HOST_REGEX.is_match(candidate) => (Some(candidate), remainder),
                _ => return None,
            }
        };
        let (host, port) = match authority {
            Some(authority) => {
                // Credentials have no meaning for any of the hosts we care about.
                let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
                match authority.rsplit_once(':') {
                    Some((host, port)) => (Some(host.to_ascii_lowercase()), Some(port.parse::<u16>().ok()?)),
                    None => (Some(authority.to_ascii_lowercase()), None),
                }
            },
            None => (None, None),
        };
        let (rest, fragment) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (rest, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (rest, None),
        };
        Some(Self {
            scheme,
            host: host.filter(|h| !h.is_empty()),
            port,
            path: path.to_string(),
            query,
            fragment,
        })
    }

    pub(crate) fn is_relative(&self) -> bool {
        self.host.is_none()
    }

    /// Non-empty path segments.
    pub(crate) fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// First value of `key` in the query string. A key without `=` yields
    /// an empty value.
    pub(crate) fn query_param(&self, key: &str) -> Option<&str> {
        find_param(self.query.as_deref()?, key)
    }

    /// First value of `key` in a `k=v&…` style fragment (`#t=1m30s`).
    pub(crate) fn fragment_param(&self, key: &str) -> Option<&str> {
        find_param(self.fragment.as_deref()?, key)
    }

    pub(crate) fn youtube_host(&self) -> Option<YoutubeHost> {
        let host = self.host.as_deref()?;
        let host = ["www.", "m.", "music."]
            .iter()
            .find_map(|prefix| host.strip_prefix(prefix))
            .unwrap_or(host);
        match host {
            "youtube.com" => Some(YoutubeHost::Main),
            "youtu.be" => Some(YoutubeHost::Short),
            "youtube-nocookie.com" => Some(YoutubeHost::NoCookie),
            _ => None,
        }
    }
}

fn split_authority(s: &str) -> (Option<&str>, &str) {
    let end = s.find(['/', '?', '#']).unwrap_or(s.len());
    let authority = &s[..end];
    (Some(authority).filter(|a| !a.is_empty()), &s[end..])
}

fn find_param<'a>(pairs: &'a str, key: &str) -> Option<&'a str> {
    pairs.split('&').find_map(|pair| match pair.split_once('=') {
        Some((k, v)) if k == key => Some(v),
        None if pair == key => Some(""),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_full_url() {
        let url = SurfaceUrl::parse("HTTPS://User@WWW.YouTube.com:8443/watch?v=abc&t=30#t=1m").unwrap();
        assert_eq!(url.scheme.as_deref(), Some("https"));
        assert_eq!(url.host.as_deref(), Some("www.youtube.com"));
        assert_eq!(url.port, Some(8443));
        assert_eq!(url.path, "/watch");
        assert_eq!(url.query_param("v"), Some("abc"));
        assert_eq!(url.query_param("t"), Some("30"));
        assert_eq!(url.fragment_param("t"), Some("1m"));
        assert_eq!(url.youtube_host(), Some(YoutubeHost::Main));
    }

    #[rstest]
    #[case("//m.youtube.com/shorts/abc", Some("m.youtube.com"), "/shorts/abc")]
    #[case("youtu.be/abc", Some("youtu.be"), "/abc")]
    #[case("/vi/abc/hqdefault.jpg", None, "/vi/abc/hqdefault.jpg")]
    fn test_partial_urls(#[case] raw: &str, #[case] host: Option<&str>, #[case] path: &str) {
        let url = SurfaceUrl::parse(raw).unwrap();
        assert_eq!(url.host.as_deref(), host);
        assert_eq!(url.path, path);
    }

    #[rstest]
    #[case("")]
    #[case("dQw4w9WgXcQ")]
    #[case("@handle")]
    #[case("watch?v=abc")]
    #[case("has spaces.com/path")]
    fn test_not_a_url(#[case] raw: &str) {
        assert!(SurfaceUrl::parse(raw).is_none());
    }

    #[test]
    fn test_flag_param_without_value() {
        let url = SurfaceUrl::parse("https://youtube.com/watch?v=abc&feature").unwrap();
        assert_eq!(url.query_param("feature"), Some(""));
        assert_eq!(url.query_param("list"), None);
    }
}
