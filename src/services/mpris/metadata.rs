use std::collections::HashMap;

use zbus::zvariant::{Array, OwnedValue, Value};

use crate::arbitration::UNKNOWN_METADATA;

/// Title and artist of the current track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Track title
    pub title: String,

    /// Track artist, several artists joined with ", "
    pub artist: String,
}

impl Default for TrackInfo {
    fn default() -> Self {
        Self {
            title: UNKNOWN_METADATA.to_string(),
            artist: UNKNOWN_METADATA.to_string(),
        }
    }
}

impl From<&HashMap<String, OwnedValue>> for TrackInfo {
    fn from(metadata: &HashMap<String, OwnedValue>) -> Self {
        let mut track = Self::default();

        if let Some(title) = metadata.get("xesam:title").and_then(|v| text(v)) {
            if !title.is_empty() {
                track.title = title;
            }
        }

        if let Some(artist) = metadata.get("xesam:artist") {
            let artists: Vec<String> = if let Ok(array) = artist.downcast_ref::<&Array>() {
                array.iter().filter_map(text).collect()
            } else {
                text(artist).into_iter().collect()
            };

            let artists: Vec<String> = artists.into_iter().filter(|a| !a.is_empty()).collect();
            if !artists.is_empty() {
                track.artist = artists.join(", ");
            }
        }

        track
    }
}

fn text(value: &Value<'_>) -> Option<String> {
    value.downcast_ref::<&str>().ok().map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn owned(value: Value<'_>) -> OwnedValue {
        value.try_to_owned().unwrap()
    }

    #[test]
    fn missing_fields_are_unknown() {
        let track = TrackInfo::from(&HashMap::new());

        assert_eq!(track.title, "Unknown");
        assert_eq!(track.artist, "Unknown");
    }

    #[test]
    fn artist_list_is_joined() {
        let mut metadata = HashMap::new();
        metadata.insert("xesam:title".to_string(), owned(Value::from("Song")));
        metadata.insert(
            "xesam:artist".to_string(),
            owned(Value::from(vec!["First", "Second"])),
        );

        let track = TrackInfo::from(&metadata);

        assert_eq!(track.title, "Song");
        assert_eq!(track.artist, "First, Second");
    }

    #[test]
    fn plain_string_artist_is_accepted() {
        let mut metadata = HashMap::new();
        metadata.insert("xesam:artist".to_string(), owned(Value::from("Solo")));

        assert_eq!(TrackInfo::from(&metadata).artist, "Solo");
    }

    #[test]
    fn empty_values_fall_back_to_unknown() {
        let mut metadata = HashMap::new();
        metadata.insert("xesam:title".to_string(), owned(Value::from("")));
        metadata.insert(
            "xesam:artist".to_string(),
            owned(Value::from(Vec::<&str>::new())),
        );

        let track = TrackInfo::from(&metadata);

        assert_eq!(track, TrackInfo::default());
    }
}
