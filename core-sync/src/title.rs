//! Splitting of `"Artist - Song"` style titles.

/// Artist recorded when a title has no `" - "` separator.
pub const UNKNOWN_ARTIST: &str = "Unknown";

const SEPARATOR: &str = " - ";

/// Artist and song parts of a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub artist: Option<String>,
    pub song: String,
}

impl ParsedTitle {
    /// Artist, or [`UNKNOWN_ARTIST`] when the title had none.
    pub fn artist_or_unknown(&self) -> &str {
        self.artist.as_deref().unwrap_or(UNKNOWN_ARTIST)
    }
}

/// Splits on the first `" - "`. Both parts are trimmed.
///
/// ```
/// use core_sync::title::parse_title;
///
/// let parsed = parse_title("Daft Punk - One More Time - Radio Edit");
/// assert_eq!(parsed.artist.as_deref(), Some("Daft Punk"));
/// assert_eq!(parsed.song, "One More Time - Radio Edit");
///
/// let parsed = parse_title("Jay-Z");
/// assert_eq!(parsed.artist, None);
/// assert_eq!(parsed.song, "Jay-Z");
/// ```
pub fn parse_title(title: &str) -> ParsedTitle {
    match title.split_once(SEPARATOR) {
        Some((artist, song)) if !artist.trim().is_empty() => ParsedTitle {
            artist: Some(artist.trim().to_string()),
            song: song.trim().to_string(),
        },
        _ => ParsedTitle {
            artist: None,
            song: title.trim().to_string(),
        },
    }
}
