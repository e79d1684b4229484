//! URL helpers
//!
//! String-level query manipulation. Parsing into a full URL type would
//! normalize the URL (adding a `/` path, re-encoding), so we only ever touch
//! the query part and keep everything else byte for byte.

/// Remove every occurrence of `param` from the query string of `url`
///
/// The URL is returned unchanged when it has no query or `param` is not in
/// it. Remaining parameters keep their original order and encoding. When no
/// parameters remain the `?` is dropped as well. A `#fragment` is kept.
pub fn remove_param_from_url(url: &str, param: &str) -> String {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (url, None),
    };
    let Some((base, query)) = without_fragment.split_once('?') else {
        return url.to_string();
    };

    let pairs: Vec<&str> = query.split('&').filter(|pair| !pair.is_empty()).collect();
    if !pairs.iter().any(|pair| pair_key(pair) == param) {
        return url.to_string();
    }

    let kept: Vec<&str> = pairs
        .into_iter()
        .filter(|pair| pair_key(pair) != param)
        .collect();

    let mut cleaned = base.to_string();
    if !kept.is_empty() {
        cleaned.push('?');
        cleaned.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        cleaned.push('#');
        cleaned.push_str(fragment);
    }
    cleaned
}

/// First value of `param` in the query string of `url`, percent-decoded
pub fn query_param_value(url: &str, param: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| decode(key) == param)
        .map(|(_, value)| decode(value))
}

/// Decoded key of a `key=value` pair (a bare `key` counts as a key too)
fn pair_key(pair: &str) -> String {
    let key = pair.split_once('=').map_or(pair, |(key, _)| key);
    decode(key)
}

fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|c| c.into_owned())
        .unwrap_or(spaced)
}
