//! Tag aggregation from the `musicinfo` block

use crate::models::JamendoTrack;

/// Flatten `musicinfo` into raw tags
///
/// Order: vocal/instrumental, gender, `speed_<speed>`, genres, instruments,
/// free-form tags. Nothing is sorted, deduplicated or case-folded.
pub fn get_tags(track: &JamendoTrack) -> Vec<String> {
    let Some(info) = &track.musicinfo else {
        return Vec::new();
    };

    let mut tags = Vec::new();

    if let Some(vocal) = present(&info.vocalinstrumental) {
        tags.push(vocal.to_string());
    }
    if let Some(gender) = present(&info.gender) {
        tags.push(gender.to_string());
    }
    if let Some(speed) = present(&info.speed) {
        tags.push(format!("speed_{}", speed));
    }

    if let Some(lists) = &info.tags {
        for list in [&lists.genres, &lists.instruments, &lists.vartags] {
            tags.extend(list.iter().flatten().cloned());
        }
    }

    tags
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
