//! Query parameters for the Jamendo tracks endpoint

use catalog_common::QueryParams;

/// Tracks endpoint of the Jamendo v3 API
pub const TRACKS_ENDPOINT: &str = "https://api.jamendo.com/v3.0/tracks";

/// Results per page (the API maximum)
pub const PAGE_SIZE: u32 = 200;

/// Audio format requested for `audio` URLs
pub const AUDIO_FORMAT: &str = "mp32";

/// Parameters every tracks request carries, minus the client id
///
/// `include` asks for the `musicinfo`, `licenses` and `stats` blocks the
/// extractor reads.
pub fn default_query_params() -> QueryParams {
    [
        ("format", "json".to_string()),
        ("include", "musicinfo licenses stats".to_string()),
        ("imagesize", "200".to_string()),
        ("limit", PAGE_SIZE.to_string()),
        ("audioformat", AUDIO_FORMAT.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Copy of `base_params` (or the defaults) with `offset` set
pub fn build_query_params(offset: u32, base_params: Option<&QueryParams>) -> QueryParams {
    let mut params = match base_params {
        Some(base) => base.clone(),
        None => default_query_params(),
    };
    params.insert("offset".to_string(), offset.to_string());
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_params_adds_offset() {
        let params = build_query_params(200, None);
        assert_eq!(params["offset"], "200");
        assert_eq!(params["limit"], "200");
        assert_eq!(params["format"], "json");
    }

    #[test]
    fn test_build_query_params_leaves_other_keys() {
        let mut base = QueryParams::new();
        base.insert("test".to_string(), "value".to_string());

        let params = build_query_params(200, Some(&base));

        assert_eq!(params["test"], "value");
        assert_eq!(params["offset"], "200");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_build_query_params_overwrites_offset_without_touching_base() {
        let mut base = default_query_params();
        base.insert("client_id".to_string(), "abc".to_string());
        base.insert("offset".to_string(), "0".to_string());

        let params = build_query_params(400, Some(&base));

        assert_eq!(params["offset"], "400");
        assert_eq!(params["client_id"], "abc");
        assert_eq!(params.len(), base.len());
        assert_eq!(base["offset"], "0");
    }
}
