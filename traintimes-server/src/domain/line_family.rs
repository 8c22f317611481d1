//! Subway line families.

use std::fmt;

use serde::{Serialize, Serializer};

/// A named group of routes sharing trunk infrastructure.
///
/// A stop belongs to the family of the leading character of its stop id
/// (`R16` is Broadway, `631` is Lexington Avenue). Stops whose leading
/// character is not in the table classify as [`LineFamily::Unknown`].
///
/// # Examples
///
/// ```
/// use traintimes_server::domain::LineFamily;
///
/// assert_eq!(LineFamily::of_stop("R16"), LineFamily::Broadway);
/// assert_eq!(LineFamily::of_stop("R16").name(), "Broadway");
/// assert_eq!(LineFamily::of_stop("H04"), LineFamily::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineFamily {
    SeventhAvenue,
    LexingtonAvenue,
    Flushing,
    Shuttle,
    EighthAvenue,
    SixthAvenue,
    Broadway,
    FourteenthStreet,
    NassauStreet,
    Crosstown,
    Unknown,
}

impl LineFamily {
    /// Every known family, in menu order. `Unknown` is not listed.
    pub const ALL: [LineFamily; 10] = [
        LineFamily::SeventhAvenue,
        LineFamily::LexingtonAvenue,
        LineFamily::EighthAvenue,
        LineFamily::SixthAvenue,
        LineFamily::Broadway,
        LineFamily::Shuttle,
        LineFamily::FourteenthStreet,
        LineFamily::NassauStreet,
        LineFamily::Crosstown,
        LineFamily::Flushing,
    ];

    /// Classify a line code (the leading character of a stop id).
    pub fn of_line(code: char) -> Self {
        match code {
            '1' | '2' | '3' => LineFamily::SeventhAvenue,
            '4' | '5' | '6' => LineFamily::LexingtonAvenue,
            '7' => LineFamily::Flushing,
            '9' => LineFamily::Shuttle,
            'A' | 'C' | 'E' => LineFamily::EighthAvenue,
            'B' | 'D' | 'F' | 'M' => LineFamily::SixthAvenue,
            'N' | 'Q' | 'R' | 'W' => LineFamily::Broadway,
            'L' => LineFamily::FourteenthStreet,
            'J' | 'Z' => LineFamily::NassauStreet,
            'G' => LineFamily::Crosstown,
            _ => LineFamily::Unknown,
        }
    }

    /// Classify a stop by the leading character of its stop id.
    pub fn of_stop(stop_id: &str) -> Self {
        stop_id
            .chars()
            .next()
            .map_or(LineFamily::Unknown, LineFamily::of_line)
    }

    /// Look a family up by its display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// The display name used by the menu and the `family` filter.
    pub fn name(self) -> &'static str {
        match self {
            LineFamily::SeventhAvenue => "7 Avenue",
            LineFamily::LexingtonAvenue => "Lexington Avenue",
            LineFamily::Flushing => "Flushing",
            LineFamily::Shuttle => "Shuttle",
            LineFamily::EighthAvenue => "8 Avenue",
            LineFamily::SixthAvenue => "6 Avenue",
            LineFamily::Broadway => "Broadway",
            LineFamily::FourteenthStreet => "14 Street",
            LineFamily::NassauStreet => "Nassau Street",
            LineFamily::Crosstown => "Crosstown",
            LineFamily::Unknown => "Unknown",
        }
    }

    /// Route ids (as they appear in `route_id`) served by this family.
    pub fn routes(self) -> &'static [&'static str] {
        match self {
            LineFamily::SeventhAvenue => &["1", "2", "3"],
            LineFamily::LexingtonAvenue => &["4", "5", "6"],
            LineFamily::EighthAvenue => &["A", "C", "E"],
            LineFamily::SixthAvenue => &["B", "D", "F", "M"],
            LineFamily::Broadway => &["N", "Q", "R", "W"],
            LineFamily::Shuttle => &["S"],
            LineFamily::FourteenthStreet => &["L"],
            LineFamily::NassauStreet => &["J", "Z"],
            LineFamily::Crosstown => &["G"],
            LineFamily::Flushing => &["7"],
            LineFamily::Unknown => &[],
        }
    }
}

impl fmt::Display for LineFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for LineFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
