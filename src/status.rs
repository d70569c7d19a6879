use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl FromStr for MediaKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(MediaKind::Movie),
            "tv" | "series" => Ok(MediaKind::Tv),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a title as TMDB reports it. Movies and series use
/// different subsets; `Unknown` covers everything unmapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Returning,
    Rumored,
    Planned,
    InProduction,
    PostProduction,
    Released,
    Ended,
    Canceled,
    Pilot,
    #[default]
    Unknown,
}

const SERIES_STATUSES: [Status; 6] = [
    Status::Returning,
    Status::Planned,
    Status::InProduction,
    Status::Ended,
    Status::Canceled,
    Status::Pilot,
];

const MOVIE_STATUSES: [Status; 6] = [
    Status::Rumored,
    Status::Planned,
    Status::InProduction,
    Status::PostProduction,
    Status::Released,
    Status::Canceled,
];

fn statuses_for(kind: MediaKind) -> &'static [Status; 6] {
    match kind {
        MediaKind::Movie => &MOVIE_STATUSES,
        MediaKind::Tv => &SERIES_STATUSES,
    }
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Returning => "returning",
            Status::Rumored => "rumored",
            Status::Planned => "planned",
            Status::InProduction => "in_production",
            Status::PostProduction => "post_production",
            Status::Released => "released",
            Status::Ended => "ended",
            Status::Canceled => "canceled",
            Status::Pilot => "pilot",
            Status::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Returning => "Returning",
            Status::Rumored => "Rumored",
            Status::Planned => "Planned",
            Status::InProduction => "In Production",
            Status::PostProduction => "Post Production",
            Status::Released => "Released",
            Status::Ended => "Ended",
            Status::Canceled => "Canceled",
            Status::Pilot => "Pilot",
            Status::Unknown => "Unknown",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        let status = match s.to_ascii_lowercase().as_str() {
            "returning" => Status::Returning,
            "rumored" => Status::Rumored,
            "planned" => Status::Planned,
            "in_production" => Status::InProduction,
            "post_production" => Status::PostProduction,
            "released" => Status::Released,
            "ended" => Status::Ended,
            "canceled" | "cancelled" => Status::Canceled,
            "pilot" => Status::Pilot,
            _ => return None,
        };
        Some(status)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn id_to_status(kind: MediaKind, code: Option<i64>) -> Status {
    code.and_then(|c| usize::try_from(c).ok())
        .and_then(|c| statuses_for(kind).get(c).copied())
        .unwrap_or(Status::Unknown)
}

pub fn string_to_id(status: &str, kind: MediaKind) -> Option<i64> {
    let status = Status::parse(status.trim())?;
    statuses_for(kind)
        .iter()
        .position(|s| *s == status)
        .map(|p| p as i64)
}

/// Maps a details label such as "Returning Series" or "Post Production"
/// through the numeric code table.
pub fn status_from_label(kind: MediaKind, label: &str) -> Status {
    let normalized = label.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    let normalized = normalized.strip_suffix("_series").unwrap_or(&normalized);
    id_to_status(kind, string_to_id(normalized, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_codes_map_in_order() {
        assert_eq!(id_to_status(MediaKind::Movie, Some(0)), Status::Rumored);
        assert_eq!(id_to_status(MediaKind::Movie, Some(3)), Status::PostProduction);
        assert_eq!(id_to_status(MediaKind::Movie, Some(4)), Status::Released);
        assert_eq!(id_to_status(MediaKind::Movie, Some(5)), Status::Canceled);
    }

    #[test]
    fn series_codes_map_in_order() {
        assert_eq!(id_to_status(MediaKind::Tv, Some(0)), Status::Returning);
        assert_eq!(id_to_status(MediaKind::Tv, Some(3)), Status::Ended);
        assert_eq!(id_to_status(MediaKind::Tv, Some(5)), Status::Pilot);
    }

    #[test]
    fn out_of_range_and_missing_codes_are_unknown() {
        assert_eq!(id_to_status(MediaKind::Tv, Some(99)), Status::Unknown);
        assert_eq!(id_to_status(MediaKind::Movie, Some(-1)), Status::Unknown);
        assert_eq!(id_to_status(MediaKind::Movie, None), Status::Unknown);
        assert_eq!(Status::Unknown.as_str(), "unknown");
    }

    #[test]
    fn string_lookup_ignores_case_and_spelling_of_cancel() {
        assert_eq!(
            string_to_id("Cancelled", MediaKind::Movie),
            string_to_id("canceled", MediaKind::Movie)
        );
        assert_eq!(string_to_id("CANCELED", MediaKind::Movie), Some(5));
        assert_eq!(string_to_id("canceled", MediaKind::Tv), Some(4));
        assert_eq!(string_to_id("Released", MediaKind::Movie), Some(4));
    }

    #[test]
    fn string_lookup_rejects_empty_unknown_and_wrong_kind() {
        assert_eq!(string_to_id("", MediaKind::Movie), None);
        assert_eq!(string_to_id("streaming", MediaKind::Movie), None);
        assert_eq!(string_to_id("released", MediaKind::Tv), None);
        assert_eq!(string_to_id("pilot", MediaKind::Movie), None);
    }

    #[test]
    fn empty_status_always_resolves_to_unknown() {
        let code = string_to_id("", MediaKind::Movie);
        assert_eq!(id_to_status(MediaKind::Movie, code), Status::Unknown);
    }

    #[test]
    fn details_labels_resolve_through_the_table() {
        assert_eq!(
            status_from_label(MediaKind::Tv, "Returning Series"),
            Status::Returning
        );
        assert_eq!(
            status_from_label(MediaKind::Tv, "In Production"),
            Status::InProduction
        );
        assert_eq!(
            status_from_label(MediaKind::Movie, "Post Production"),
            Status::PostProduction
        );
        assert_eq!(status_from_label(MediaKind::Movie, "Ended"), Status::Unknown);
    }

    #[test]
    fn media_kind_parses_aliases() {
        assert_eq!("tv".parse::<MediaKind>(), Ok(MediaKind::Tv));
        assert_eq!("Series".parse::<MediaKind>(), Ok(MediaKind::Tv));
        assert_eq!("MOVIE".parse::<MediaKind>(), Ok(MediaKind::Movie));
        assert!("person".parse::<MediaKind>().is_err());
    }
}
