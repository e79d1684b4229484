//! Jamendo item extraction
//!
//! Turns one raw `results` element into a [`NormalizedAudioRecord`], or
//! rejects it. A track is only kept when it has a landing URL with a numeric
//! id, an audio URL, and a license the shared resolver understands; every
//! other field is best effort.

use crate::models::JamendoTrack;
use crate::tags::get_tags;
use crate::url_utils::{query_param_value, remove_param_from_url};
use catalog_common::licenses::get_license_info;
use catalog_common::{AudioMetadata, LicenseInfo, MediaCategory, NormalizedAudioRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Public site, base of track/album/artist landing pages
pub const SITE_BASE_URL: &str = "https://www.jamendo.com";

/// Image service serving album covers
pub const IMAGE_BASE_URL: &str = "https://usercontent.jamendo.com";

/// Width requested for thumbnails
pub const THUMBNAIL_WIDTH: u32 = 200;

/// Tracking parameter Jamendo appends to audio URLs
const TRACKING_PARAM: &str = "from";

static TRACK_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/track/(\d+)").expect("valid track id regex"));

/// Album ("set") a track belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioSetInfo {
    pub set_foreign_id: Option<String>,
    pub set_name: Option<String>,
    pub set_position: Option<u32>,
    pub set_url: Option<String>,
    pub set_thumbnail: Option<String>,
}

/// Artist credited for a track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorInfo {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Extract a record from one raw API item
///
/// `Value::Null` (a missing item) and items that do not fit the track shape
/// yield `None`, as does any track failing [`extract_track`]'s checks.
pub fn extract_audio_data(raw: &Value) -> Option<NormalizedAudioRecord> {
    if raw.is_null() {
        return None;
    }

    match JamendoTrack::deserialize(raw) {
        Ok(track) => extract_track(&track),
        Err(e) => {
            warn!(error = %e, "Skipping Jamendo item with unexpected shape");
            None
        }
    }
}

/// Extract a record from a decoded track
pub fn extract_track(track: &JamendoTrack) -> Option<NormalizedAudioRecord> {
    let Some((foreign_identifier, foreign_landing_url)) = get_foreign_identity(track) else {
        debug!(track_id = ?track.id, "Skipping track without parsable share URL");
        return None;
    };

    let Some(audio_url) = present(&track.audio) else {
        debug!(%foreign_identifier, "Skipping track without audio URL");
        return None;
    };
    let audio_url = remove_param_from_url(audio_url, TRACKING_PARAM);

    let Some(license_info) = get_license(track) else {
        debug!(
            %foreign_identifier,
            license_url = ?track.license_ccurl,
            "Skipping track with unresolvable license"
        );
        return None;
    };

    let audio_set = get_audio_set_info(track);
    let creator = get_creator_data(track);
    let thumbnail_url = get_thumbnail_url(track, &audio_set, &foreign_identifier);
    let filetype = query_param_value(&audio_url, "format");

    let genres = track
        .musicinfo
        .as_ref()
        .and_then(|info| info.tags.as_ref())
        .and_then(|tags| tags.genres.clone())
        .unwrap_or_default();

    let stats = track.stats.clone().unwrap_or_default();
    let meta_data = AudioMetadata {
        downloads: stats.rate_downloads_total.unwrap_or(0),
        listens: stats.rate_listened_total.unwrap_or(0),
        playlists: stats.playlisted.unwrap_or(0),
        release_date: present(&track.releasedate).map(str::to_string),
    };

    Some(NormalizedAudioRecord {
        foreign_identifier: foreign_identifier.clone(),
        foreign_landing_url,
        audio_url,
        filetype,
        duration: duration_ms(track, &foreign_identifier),
        title: track.name.clone(),
        creator: creator.name,
        creator_url: creator.url,
        audio_set: audio_set.set_name,
        set_foreign_id: audio_set.set_foreign_id,
        set_position: audio_set.set_position,
        set_url: audio_set.set_url,
        set_thumbnail: audio_set.set_thumbnail,
        thumbnail_url,
        genres,
        raw_tags: get_tags(track),
        license_info,
        meta_data,
        category: MediaCategory::Music,
    })
}

/// Numeric track id parsed from the share URL, plus the share URL itself
pub fn get_foreign_identity(track: &JamendoTrack) -> Option<(String, String)> {
    let share_url = present(&track.shareurl)?;
    let id = TRACK_ID_RE.captures(share_url)?.get(1)?.as_str();
    Some((id.to_string(), share_url.to_string()))
}

/// License of the track, resolved from `license_ccurl`
pub fn get_license(track: &JamendoTrack) -> Option<LicenseInfo> {
    // Jamendo encodes the version in the URL path, so no hint is passed
    get_license_info(track.license_ccurl.as_deref(), None)
}

/// Album information; absent keys leave the matching slot empty
pub fn get_audio_set_info(track: &JamendoTrack) -> AudioSetInfo {
    let set_foreign_id = present(&track.album_id).map(str::to_string);
    let set_name = present(&track.album_name).map(str::to_string);

    let set_url = set_foreign_id.as_ref().map(|id| {
        match set_name.as_deref().map(slugify).filter(|s| !s.is_empty()) {
            Some(slug) => format!("{}/album/{}/{}", SITE_BASE_URL, id, slug),
            None => format!("{}/album/{}", SITE_BASE_URL, id),
        }
    });
    let set_thumbnail = set_foreign_id.as_ref().map(|id| album_image_url(id));

    AudioSetInfo {
        set_position: track.position.and_then(|p| u32::try_from(p).ok()),
        set_foreign_id,
        set_name,
        set_url,
        set_thumbnail,
    }
}

/// Artist name and landing page
///
/// The landing page needs both the numeric artist id and the artist slug;
/// without them only the name is returned. Without a name nothing is.
pub fn get_creator_data(track: &JamendoTrack) -> CreatorInfo {
    let Some(name) = present(&track.artist_name) else {
        return CreatorInfo::default();
    };

    let url = match (present(&track.artist_id), present(&track.artist_idstr)) {
        (Some(id), Some(slug)) => Some(format!("{}/artist/{}/{}", SITE_BASE_URL, id, slug)),
        _ => None,
    };

    CreatorInfo {
        name: Some(name.to_string()),
        url,
    }
}

/// Seconds to milliseconds; a value that does not fit is dropped
fn duration_ms(track: &JamendoTrack, foreign_identifier: &str) -> Option<u64> {
    let secs = track.duration?;
    let ms = secs.checked_mul(1000);
    if ms.is_none() {
        debug!(%foreign_identifier, duration = secs, "Dropping out-of-range duration");
    }
    ms
}

fn get_thumbnail_url(
    track: &JamendoTrack,
    audio_set: &AudioSetInfo,
    foreign_identifier: &str,
) -> Option<String> {
    match &audio_set.set_foreign_id {
        Some(album_id) => Some(format!(
            "{}&trackid={}",
            album_image_url(album_id),
            foreign_identifier
        )),
        None => present(&track.image).map(str::to_string),
    }
}

fn album_image_url(album_id: &str) -> String {
    format!(
        "{}?type=album&id={}&width={}",
        IMAGE_BASE_URL, album_id, THUMBNAIL_WIDTH
    )
}

/// Lowercase, alphanumeric runs joined by `-` ("Opera I" → "opera-i")
fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn example_track() -> JamendoTrack {
        serde_json::from_str(include_str!("../tests/fixtures/audio_data_example.json"))
            .expect("fixture should decode")
    }

    #[test]
    fn test_get_audio_set_info() {
        assert_eq!(
            get_audio_set_info(&example_track()),
            AudioSetInfo {
                set_foreign_id: Some("119".to_string()),
                set_name: Some("Opera I".to_string()),
                set_position: Some(6),
                set_url: Some("https://www.jamendo.com/album/119/opera-i".to_string()),
                set_thumbnail: Some(
                    "https://usercontent.jamendo.com?type=album&id=119&width=200".to_string()
                ),
            }
        );
    }

    #[test]
    fn test_get_audio_set_info_without_album() {
        let mut track = example_track();
        track.album_id = None;
        track.album_name = None;
        track.position = None;

        assert_eq!(get_audio_set_info(&track), AudioSetInfo::default());
    }

    #[test]
    fn test_get_audio_set_info_without_album_name() {
        let mut track = example_track();
        track.album_name = None;

        let info = get_audio_set_info(&track);
        assert_eq!(info.set_name, None);
        assert_eq!(info.set_url.as_deref(), Some("https://www.jamendo.com/album/119"));
        assert!(info.set_thumbnail.is_some());
    }

    #[test]
    fn test_get_creator_data() {
        assert_eq!(
            get_creator_data(&example_track()),
            CreatorInfo {
                name: Some("Haeresis".to_string()),
                url: Some("https://www.jamendo.com/artist/92/haeresis".to_string()),
            }
        );
    }

    #[test]
    fn test_get_creator_data_handles_no_url() {
        let mut track = example_track();
        track.artist_idstr = None;

        let creator = get_creator_data(&track);
        assert_eq!(creator.name.as_deref(), Some("Haeresis"));
        assert_eq!(creator.url, None);
    }

    #[test]
    fn test_get_creator_data_returns_none_when_no_artist() {
        let mut track = example_track();
        track.artist_name = None;

        assert_eq!(get_creator_data(&track), CreatorInfo::default());
    }

    #[test]
    fn test_foreign_identity_requires_numeric_track_path() {
        let mut track = example_track();
        assert_eq!(
            get_foreign_identity(&track),
            Some(("732".to_string(), "https://www.jamendo.com/track/732".to_string()))
        );

        track.shareurl = Some("https://www.jamendo.com/track/732/thoughtful".to_string());
        assert_eq!(get_foreign_identity(&track).map(|(id, _)| id).as_deref(), Some("732"));

        track.shareurl = Some("https://www.jamendo.com/album/119".to_string());
        assert_eq!(get_foreign_identity(&track), None);

        track.shareurl = Some(String::new());
        assert_eq!(get_foreign_identity(&track), None);
    }

    #[test]
    fn test_thumbnail_falls_back_to_image_without_album() {
        let mut track = example_track();
        track.album_id = None;

        let record = extract_track(&track).expect("track should still extract");
        assert_eq!(record.thumbnail_url, track.image);
        assert_eq!(record.set_thumbnail, None);
    }

    #[test]
    fn test_extract_audio_data_returns_none_for_null_and_wrong_shape() {
        assert!(extract_audio_data(&Value::Null).is_none());
        assert!(extract_audio_data(&json!("not an object")).is_none());
        assert!(extract_audio_data(&json!({"shareurl": 42})).is_none());
    }

    #[test]
    fn test_extract_audio_data_strips_tracking_param() {
        let record = extract_track(&example_track()).unwrap();
        assert_eq!(record.audio_url, "https://mp3d.jamendo.com/?trackid=732&format=mp32");
        assert_eq!(record.filetype.as_deref(), Some("mp32"));
    }

    #[test]
    fn test_extract_defaults_missing_counters() {
        let mut track = example_track();
        track.stats = None;
        track.releasedate = None;
        track.musicinfo = None;

        let record = extract_track(&track).unwrap();
        assert_eq!(record.meta_data, AudioMetadata::default());
        assert!(record.genres.is_empty());
        assert!(record.raw_tags.is_empty());
    }

    #[test]
    fn test_huge_duration_is_dropped() {
        let mut track = example_track();
        track.duration = Some(u64::MAX / 10);

        let record = extract_track(&track).expect("track should still extract");
        assert_eq!(record.duration, None);
        assert_eq!(record.foreign_identifier, "732");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Opera I"), "opera-i");
        assert_eq!(slugify("  Rock & Roll!! Vol. 2 "), "rock-roll-vol-2");
        assert_eq!(slugify("---"), "");
    }
}
