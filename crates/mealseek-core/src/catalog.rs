//! Genre and search-radius codes understood by the search API.

/// A selectable restaurant genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub code: &'static str,
    pub label: &'static str,
}

pub const GENRES: &[Genre] = &[
    Genre { code: "G001", label: "Izakaya" },
    Genre { code: "G002", label: "Udon" },
    Genre { code: "G003", label: "Creative cuisine" },
    Genre { code: "G004", label: "Japanese" },
    Genre { code: "G005", label: "Western" },
    Genre { code: "G006", label: "Italian / French" },
    Genre { code: "G007", label: "Chinese" },
    Genre { code: "G008", label: "Yakiniku / Horumon" },
    Genre { code: "G010", label: "International" },
    Genre { code: "G011", label: "Karaoke / Party" },
    Genre { code: "G012", label: "Bar / Cocktails" },
    Genre { code: "G013", label: "Ramen" },
    Genre { code: "G014", label: "Cafe / Sweets" },
    Genre { code: "G015", label: "Okonomiyaki / Monja" },
    Genre { code: "G017", label: "Korean" },
];

/// Radius codes `1..=5` and their distance in metres.
const RADII: &[(&str, u32)] = &[("1", 300), ("2", 500), ("3", 1000), ("4", 2000), ("5", 3000)];

#[must_use]
pub fn genre_label(code: &str) -> Option<&'static str> {
    GENRES.iter().find(|g| g.code == code).map(|g| g.label)
}

/// Search radius in metres for a radius code, used to draw the search circle.
#[must_use]
pub fn radius_meters(code: &str) -> Option<u32> {
    RADII.iter().find(|(c, _)| *c == code).map(|(_, m)| *m)
}

/// `"within 500 m"`, `"within 1 km"`, ...
#[must_use]
pub fn radius_label(code: &str) -> Option<String> {
    let meters = radius_meters(code)?;
    Some(if meters % 1000 == 0 {
        format!("within {} km", meters / 1000)
    } else {
        format!("within {meters} m")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_genre_has_label() {
        assert_eq!(genre_label("G013"), Some("Ramen"));
    }

    #[test]
    fn unknown_genre_has_no_label() {
        assert_eq!(genre_label("G999"), None);
    }

    #[test]
    fn radius_codes_map_to_meters() {
        assert_eq!(radius_meters("1"), Some(300));
        assert_eq!(radius_meters("5"), Some(3000));
        assert_eq!(radius_meters("9"), None);
    }

    #[test]
    fn radius_labels_switch_to_km() {
        assert_eq!(radius_label("2").as_deref(), Some("within 500 m"));
        assert_eq!(radius_label("3").as_deref(), Some("within 1 km"));
    }
}
