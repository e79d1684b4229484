//! Jamendo API response types
//!
//! Mirrors one element of the `results` array returned by `/v3.0/tracks`.
//! Every field is optional: the API omits, nulls, or empties fields freely,
//! and sends identifiers as strings on some endpoints and numbers on others.

use serde::{Deserialize, Deserializer};

/// One track as returned by the Jamendo API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JamendoTrack {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Duration in seconds
    #[serde(default, deserialize_with = "lenient_u64")]
    pub duration: Option<u64>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    /// URL slug of the artist, e.g. "haeresis"
    #[serde(default)]
    pub artist_idstr: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub album_id: Option<String>,
    /// Track position within the album
    #[serde(default, deserialize_with = "lenient_u64")]
    pub position: Option<u64>,
    #[serde(default)]
    pub releasedate: Option<String>,
    #[serde(default)]
    pub license_ccurl: Option<String>,
    /// Streaming URL (carries a `from` tracking parameter)
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub audiodownload: Option<String>,
    /// Landing page, e.g. "https://www.jamendo.com/track/732"
    #[serde(default)]
    pub shareurl: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub musicinfo: Option<MusicInfo>,
    #[serde(default)]
    pub stats: Option<TrackStats>,
}

/// `musicinfo` block (requested with `include=musicinfo`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MusicInfo {
    #[serde(default)]
    pub vocalinstrumental: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub tags: Option<MusicTags>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MusicTags {
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub instruments: Option<Vec<String>>,
    /// Free-form tags
    #[serde(default)]
    pub vartags: Option<Vec<String>>,
}

/// `stats` block (requested with `include=stats`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackStats {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub rate_downloads_total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub rate_listened_total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub playlisted: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

/// Accept `"732"` or `732`; empty strings become `None`
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::String(s)) if !s.trim().is_empty() => Some(s),
        Some(StringOrNumber::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept `6` or `"6"`; anything non-numeric becomes `None`
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::String(s)) => s.trim().parse().ok(),
        Some(StringOrNumber::Number(n)) => n.as_u64(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_accept_strings_and_numbers() {
        let track: JamendoTrack = serde_json::from_value(json!({
            "id": 732,
            "album_id": "119",
            "artist_id": "",
        }))
        .unwrap();

        assert_eq!(track.id.as_deref(), Some("732"));
        assert_eq!(track.album_id.as_deref(), Some("119"));
        assert_eq!(track.artist_id, None);
    }

    #[test]
    fn test_numbers_accept_numeric_strings() {
        let track: JamendoTrack = serde_json::from_value(json!({
            "duration": "144",
            "position": 6,
            "stats": {"rate_listened_total": "5616", "playlisted": "n/a"},
        }))
        .unwrap();

        assert_eq!(track.duration, Some(144));
        assert_eq!(track.position, Some(6));
        let stats = track.stats.unwrap();
        assert_eq!(stats.rate_listened_total, Some(5616));
        assert_eq!(stats.playlisted, None);
        assert_eq!(stats.rate_downloads_total, None);
    }

    #[test]
    fn test_nulls_and_unknown_keys() {
        let track: JamendoTrack = serde_json::from_value(json!({
            "id": null,
            "musicinfo": {"tags": {"genres": null, "vartags": ["chill"]}},
            "waveform": "{\"peaks\": []}",
        }))
        .unwrap();

        assert!(track.id.is_none());
        let tags = track.musicinfo.unwrap().tags.unwrap();
        assert!(tags.genres.is_none());
        assert_eq!(tags.vartags, Some(vec!["chill".to_string()]));
    }
}
