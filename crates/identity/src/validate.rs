//! Structural validation of bare identifiers.
//!
//! Length, alphabet and prefix only. Nothing here knows whether a video or
//! channel actually exists.

use crate::consts::{
    CHANNEL_ID_LENGTH, CHANNEL_ID_PREFIX, HANDLE_MAX_LENGTH, HANDLE_MIN_LENGTH, LANGUAGE_CODE_REGEX,
    PLAYLIST_ID_MAX_LENGTH, PLAYLIST_ID_MIN_LENGTH, SPECIAL_PLAYLISTS, VIDEO_ID_LENGTH,
};
use crate::kind::IdentityFamily;
use crate::violation::{Field, Rule, Violation, Violations};

/// Validate a bare identifier for the given family.
///
/// Channels accept either a `UC…` channel ID or an `@handle`. All violated
/// rules are reported, not just the first.
///
/// ```
/// use tubesync_identity::{IdentityFamily, validate};
/// assert!(validate("dQw4w9WgXcQ", IdentityFamily::Video).is_ok());
/// assert!(validate("@LinusTechTips", IdentityFamily::Channel).is_ok());
/// let errors = validate("dQw4w9!", IdentityFamily::Video).unwrap_err();
/// assert_eq!(errors.len(), 2); // too short *and* bad alphabet
/// ```
pub fn validate(raw: &str, family: IdentityFamily) -> Result<(), Violations> {
    let raw = raw.trim();
    let mut violations = Vec::new();
    match family {
        IdentityFamily::Video => video_id(raw, &mut violations),
        IdentityFamily::Channel => match raw.strip_prefix('@') {
            Some(handle) => self::handle(handle, &mut violations),
            None => channel_id(raw, &mut violations),
        },
        IdentityFamily::Playlist => playlist_id(raw, &mut violations),
    }
    Violations::check(violations)
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Returns `false` (and records it) when the value is empty, so callers can
/// skip the rules that would only repeat the same complaint.
fn not_empty(field: Field, value: &str, out: &mut Vec<Violation>) -> bool {
    if value.is_empty() {
        out.push(Violation::structure(field, Rule::Empty));
        return false;
    }
    true
}

fn exact_length(field: Field, value: &str, expected: usize, out: &mut Vec<Violation>) {
    let actual = value.chars().count();
    if actual != expected {
        out.push(Violation::structure(field, Rule::ExactLength { expected, actual }));
    }
}

fn length_range(field: Field, value: &str, min: usize, max: usize, out: &mut Vec<Violation>) {
    let actual = value.chars().count();
    if !(min..=max).contains(&actual) {
        out.push(Violation::structure(field, Rule::LengthRange { min, max, actual }));
    }
}

fn id_alphabet(field: Field, value: &str, out: &mut Vec<Violation>) {
    if !value.chars().all(is_id_char) {
        out.push(Violation::structure(field, Rule::Alphabet));
    }
}

pub(crate) fn video_id(value: &str, out: &mut Vec<Violation>) {
    if not_empty(Field::VideoId, value, out) {
        exact_length(Field::VideoId, value, VIDEO_ID_LENGTH, out);
        id_alphabet(Field::VideoId, value, out);
    }
}

pub(crate) fn channel_id(value: &str, out: &mut Vec<Violation>) {
    if not_empty(Field::ChannelId, value, out) {
        if !value.starts_with(CHANNEL_ID_PREFIX) {
            out.push(Violation::structure(Field::ChannelId, Rule::Prefix(CHANNEL_ID_PREFIX)));
        }
        exact_length(Field::ChannelId, value, CHANNEL_ID_LENGTH, out);
        id_alphabet(Field::ChannelId, value, out);
    }
}

/// `value` is the handle without its leading `@`.
pub(crate) fn handle(value: &str, out: &mut Vec<Violation>) {
    if not_empty(Field::ChannelHandle, value, out) {
        length_range(Field::ChannelHandle, value, HANDLE_MIN_LENGTH, HANDLE_MAX_LENGTH, out);
        if !value.chars().all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_')) {
            out.push(Violation::structure(Field::ChannelHandle, Rule::HandleAlphabet));
        }
    }
}

pub(crate) fn playlist_id(value: &str, out: &mut Vec<Violation>) {
    if not_empty(Field::PlaylistId, value, out) {
        if !SPECIAL_PLAYLISTS.contains(&value) {
            length_range(Field::PlaylistId, value, PLAYLIST_ID_MIN_LENGTH, PLAYLIST_ID_MAX_LENGTH, out);
        }
        id_alphabet(Field::PlaylistId, value, out);
    }
}

pub(crate) fn comment_id(value: &str, out: &mut Vec<Violation>) {
    if not_empty(Field::CommentId, value, out) {
        // Reply IDs are `parent.child`.
        if !value.split('.').all(|part| !part.is_empty() && part.chars().all(is_id_char)) {
            out.push(Violation::structure(Field::CommentId, Rule::Alphabet));
        }
    }
}

pub(crate) fn language_code(value: &str, out: &mut Vec<Violation>) {
    if not_empty(Field::LanguageCode, value, out) && !LANGUAGE_CODE_REGEX.is_match(value) {
        out.push(Violation::structure(Field::LanguageCode, Rule::Unknown(value.to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dQw4w9WgXcQ", IdentityFamily::Video)]
    #[case("_-abcdefghi", IdentityFamily::Video)]
    #[case("UCuAXFkgsw1L7xaCfnd5JJOw", IdentityFamily::Channel)]
    #[case("@mkbhd", IdentityFamily::Channel)]
    #[case("@some.name-1_2", IdentityFamily::Channel)]
    #[case("PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI", IdentityFamily::Playlist)]
    #[case("WL", IdentityFamily::Playlist)]
    fn test_valid(#[case] raw: &str, #[case] family: IdentityFamily) {
        assert_eq!(validate(raw, family), Ok(()));
    }

    #[test]
    fn test_video_id_reports_every_rule() {
        let violations = validate("ab$", IdentityFamily::Video).unwrap_err();
        assert_eq!(
            violations.into_inner(),
            vec![
                Violation::structure(Field::VideoId, Rule::ExactLength { expected: 11, actual: 3 }),
                Violation::structure(Field::VideoId, Rule::Alphabet),
            ]
        );
    }

    #[test]
    fn test_empty_reports_only_empty() {
        let violations = validate("", IdentityFamily::Video).unwrap_err();
        assert_eq!(violations.into_inner(), vec![Violation::structure(Field::VideoId, Rule::Empty)]);
    }

    #[test]
    fn test_channel_id_prefix_and_length() {
        let violations = validate("XXuAXFkgsw1L7xaCfnd5JJ", IdentityFamily::Channel).unwrap_err();
        assert_eq!(
            violations.into_inner(),
            vec![
                Violation::structure(Field::ChannelId, Rule::Prefix("UC")),
                Violation::structure(Field::ChannelId, Rule::ExactLength { expected: 24, actual: 22 }),
            ]
        );
    }

    #[rstest]
    #[case("@ab")]
    #[case("@has/slash")]
    #[case("@")]
    fn test_invalid_handles(#[case] raw: &str) {
        let violations = validate(raw, IdentityFamily::Channel).unwrap_err();
        assert!(violations.concerns(Field::ChannelHandle));
    }

    #[rstest]
    #[case("abc.def", true)]
    #[case("UgzSLbO8G7Xr2Q1eL6t4AaABAg", true)]
    #[case("abc..def", false)]
    #[case("bad id", false)]
    fn test_comment_ids(#[case] raw: &str, #[case] valid: bool) {
        let mut out = Vec::new();
        comment_id(raw, &mut out);
        assert_eq!(out.is_empty(), valid);
    }
}
