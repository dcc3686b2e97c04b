//! Rendered article documents and their on-disk naming

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// File name prefix of the national article. Sorts before every county slug.
pub const NATIONAL_SLUG_PREFIX: &str = "000_orszagos-elorejelzes";

const COUNTY_SLUG_PREFIX: &str = "milyen_idolesz_holnap";

/// Which level of the hierarchy a document covers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DocumentScope {
    National,
    County(String),
}

impl DocumentScope {
    /// Slug without the date suffix
    pub fn slug(&self) -> String {
        match self {
            DocumentScope::National => NATIONAL_SLUG_PREFIX.to_string(),
            DocumentScope::County(name) => format!("{}-{}ben", COUNTY_SLUG_PREFIX, slugify(name)),
        }
    }

    /// `{slug}-{YYYY-MM-DD}.{ext}`
    pub fn file_name(&self, date: NaiveDate, ext: &str) -> String {
        format!("{}-{}.{}", self.slug(), date.format("%Y-%m-%d"), ext)
    }

    pub fn label(&self) -> &str {
        match self {
            DocumentScope::National => "Országos",
            DocumentScope::County(name) => name,
        }
    }
}

/// Rendered text for one scope, opaque to the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderedDocument {
    pub scope_label: String,
    pub body_text: String,
    pub associated_date: NaiveDate,
}

impl RenderedDocument {
    pub fn new(scope_label: impl Into<String>, body_text: impl Into<String>, associated_date: NaiveDate) -> Self {
        Self {
            scope_label: scope_label.into(),
            body_text: body_text.into(),
            associated_date,
        }
    }
}

/// ASCII slug: accents stripped, lowercase, spaces to single dashes.
/// Characters without an ASCII base letter are dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some(base) = ascii_base(c) {
            slug.push(base.to_ascii_lowercase());
        } else if c == ' ' {
            slug.push('-');
        }
    }
    while slug.contains("--") {
        slug = slug.replace("--", "-");
    }
    slug
}

fn ascii_base(c: char) -> Option<char> {
    if c.is_ascii() {
        return if c == ' ' { None } else { Some(c) };
    }
    let base = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ă' | 'ą' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' | 'Ă' | 'Ą' => 'A',
        'é' | 'è' | 'ê' | 'ë' | 'ě' | 'ę' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' | 'Ě' | 'Ę' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ő' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ő' => 'O',
        'ú' | 'ù' | 'û' | 'ü' | 'ű' | 'ů' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' | 'Ű' | 'Ů' => 'U',
        'ç' | 'č' | 'ć' => 'c',
        'Ç' | 'Č' | 'Ć' => 'C',
        'š' | 'ś' => 's',
        'Š' | 'Ś' => 'S',
        'ž' | 'ź' | 'ż' => 'z',
        'Ž' | 'Ź' | 'Ż' => 'Z',
        'ñ' | 'ń' | 'ň' => 'n',
        'Ñ' | 'Ń' | 'Ň' => 'N',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        'ř' => 'r',
        'Ř' => 'R',
        'ď' => 'd',
        'Ď' => 'D',
        'ť' => 't',
        'Ť' => 'T',
        'ľ' | 'ĺ' | 'ł' => 'l',
        'Ľ' | 'Ĺ' | 'Ł' => 'L',
        _ => return None,
    };
    Some(base)
}

/// First `YYYY-MM-DD` found in a file name
pub fn extract_date(file_name: &str) -> Option<NaiveDate> {
    let bytes = file_name.as_bytes();
    if bytes.len() < 10 {
        return None;
    }
    (0..=bytes.len() - 10).find_map(|start| {
        let candidate = file_name.get(start..start + 10)?;
        if !looks_like_iso_date(candidate) {
            return None;
        }
        NaiveDate::parse_from_str(candidate, "%Y-%m-%d").ok()
    })
}

fn looks_like_iso_date(s: &str) -> bool {
    s.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    })
}

pub fn is_national_file(file_name: &str) -> bool {
    file_name.starts_with("000_orszagos-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    #[test]
    fn test_slugify_hungarian() {
        assert_eq!(slugify("Győr-Moson-Sopron"), "gyor-moson-sopron");
        assert_eq!(slugify("Csongrád-Csanád"), "csongrad-csanad");
        assert_eq!(slugify("Budapest  és  agglomeráció"), "budapest-es-agglomeracio");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            DocumentScope::National.file_name(day(), "txt"),
            "000_orszagos-elorejelzes-2025-11-03.txt"
        );
        assert_eq!(
            DocumentScope::County("Baranya".to_string()).file_name(day(), "md"),
            "milyen_idolesz_holnap-baranyaben-2025-11-03.md"
        );
    }

    #[test]
    fn test_national_sorts_first() {
        let national = DocumentScope::National.file_name(day(), "txt");
        for county in ["Bács-Kiskun", "Zala", "Baranya"] {
            let county_file = DocumentScope::County(county.to_string()).file_name(day(), "txt");
            assert!(national < county_file);
        }
    }

    #[test]
    fn test_extract_date() {
        assert_eq!(
            extract_date("milyen_idolesz_holnap-zalaben-2025-11-03.txt"),
            Some(day())
        );
        assert_eq!(extract_date("notes.txt"), None);
        assert_eq!(extract_date("x-2025-13-40.txt"), None);
    }
}
