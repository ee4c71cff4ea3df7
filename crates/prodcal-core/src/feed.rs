//! Decoding of yearly calendar feed documents.
//!
//! The default [`XmlCalendarDecoder`] reads documents shaped like
//!
//! ```xml
//! <calendar year="2024" lang="ru" country="ru">
//!   <holidays><holiday id="1" title="..."/></holidays>
//!   <days>
//!     <day d="01.01" t="1" h="1"/>
//!     <day d="04.27" t="3" f="11.03"/>
//!   </days>
//! </calendar>
//! ```
//!
//! where `d` is `MM.DD` and `t` is a type code (see [`CODE_TABLE`]).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{DayType, DecodeError};

/// Feed type codes and the day types they stand for.
pub const CODE_TABLE: &[(&str, DayType)] = &[
    ("1", DayType::Holiday),
    ("2", DayType::PreHoliday),
    ("3", DayType::Regular),
];

/// Day type for a feed code; unmapped codes are `Unknown`.
pub fn day_type_for_code(code: &str) -> DayType {
    CODE_TABLE
        .iter()
        .find(|(known, _)| *known == code.trim())
        .map_or(DayType::Unknown, |(_, day_type)| *day_type)
}

/// One day entry of a feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDay {
    pub month: u8,
    pub day: u8,
    pub code: String,
}

/// A decoded yearly document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    pub year: i32,
    pub days: Vec<FeedDay>,
}

/// Format-specific decoder turning a raw document into day entries.
pub trait FeedDecoder: Send + Sync {
    fn decode(&self, document: &str) -> Result<FeedDocument, DecodeError>;
}

/// Decoder for the xmlcalendar document format.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlCalendarDecoder;

impl FeedDecoder for XmlCalendarDecoder {
    fn decode(&self, document: &str) -> Result<FeedDocument, DecodeError> {
        let mut reader = Reader::from_str(document);
        reader.config_mut().trim_text(true);

        let mut year = None;
        let mut days = Vec::new();
        let mut in_days = false;
        let mut depth = 0_usize;

        loop {
            match reader.read_event()? {
                Event::Start(element) => {
                    depth += 1;
                    match element.name().as_ref() {
                        b"calendar" => year = Some(parse_year(&element)?),
                        b"days" => in_days = true,
                        b"day" if in_days => days.push(parse_day(&element)?),
                        _ => {}
                    }
                }
                Event::Empty(element) => match element.name().as_ref() {
                    b"calendar" => year = Some(parse_year(&element)?),
                    b"day" if in_days => days.push(parse_day(&element)?),
                    _ => {}
                },
                Event::End(element) => {
                    depth = depth.saturating_sub(1);
                    if element.name().as_ref() == b"days" {
                        in_days = false;
                    }
                }
                Event::Eof if depth > 0 => {
                    return Err(DecodeError::Syntax(String::from(
                        "document ended inside an open element",
                    )));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let year = year.ok_or(DecodeError::MissingYear("year"))?;
        Ok(FeedDocument { year, days })
    }
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, DecodeError> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn parse_year(element: &BytesStart<'_>) -> Result<i32, DecodeError> {
    let raw = attribute(element, b"year")?.ok_or(DecodeError::MissingYear("year"))?;
    raw.trim()
        .parse()
        .map_err(|_| DecodeError::InvalidYear(raw))
}

fn parse_day(element: &BytesStart<'_>) -> Result<FeedDay, DecodeError> {
    let raw = attribute(element, b"d")?.ok_or(DecodeError::MissingAttribute("d"))?;
    let code = attribute(element, b"t")?.ok_or(DecodeError::MissingAttribute("t"))?;

    let (month, day) = raw
        .trim()
        .split_once('.')
        .and_then(|(month, day)| Some((month.parse::<u8>().ok()?, day.parse::<u8>().ok()?)))
        .filter(|(month, day)| (1..=12).contains(month) && (1..=31).contains(day))
        .ok_or_else(|| DecodeError::InvalidDay(raw.clone()))?;

    Ok(FeedDay { month, day, code })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<calendar year="2024" lang="ru" date="2024.01.01" country="ru">
  <holidays>
    <holiday id="1" title="New Year"/>
  </holidays>
  <days>
    <day d="01.01" t="1" h="1"/>
    <day d="04.27" t="3" f="11.03"/>
    <day d="05.08" t="2"/>
    <day d="06.13" t="9"/>
  </days>
</calendar>"#;

    #[test]
    fn decodes_year_and_day_entries() {
        let document = XmlCalendarDecoder.decode(SAMPLE).expect("valid document");

        assert_eq!(document.year, 2024);
        assert_eq!(document.days.len(), 4);
        assert_eq!(
            document.days[1],
            FeedDay {
                month: 4,
                day: 27,
                code: String::from("3"),
            }
        );
    }

    #[test]
    fn holiday_elements_are_not_mistaken_for_days() {
        let document = XmlCalendarDecoder
            .decode(r#"<calendar year="2020"><holidays><day d="xx" t="1"/></holidays><days/></calendar>"#)
            .expect("days outside <days> are ignored");
        assert!(document.days.is_empty());
    }

    #[test]
    fn codes_map_through_the_table() {
        assert_eq!(day_type_for_code("1"), DayType::Holiday);
        assert_eq!(day_type_for_code("2"), DayType::PreHoliday);
        assert_eq!(day_type_for_code(" 3 "), DayType::Regular);
        assert_eq!(day_type_for_code("9"), DayType::Unknown);
        assert_eq!(day_type_for_code(""), DayType::Unknown);
    }

    #[test]
    fn missing_year_is_an_error() {
        let error = XmlCalendarDecoder
            .decode(r#"<calendar><days><day d="01.01" t="1"/></days></calendar>"#)
            .expect_err("no year attribute");
        assert_eq!(error, DecodeError::MissingYear("year"));
    }

    #[test]
    fn malformed_day_is_an_error() {
        let error = XmlCalendarDecoder
            .decode(r#"<calendar year="2024"><days><day d="13.01" t="1"/></days></calendar>"#)
            .expect_err("month 13");
        assert_eq!(error, DecodeError::InvalidDay(String::from("13.01")));
    }

    #[test]
    fn truncated_document_is_an_error() {
        let error = XmlCalendarDecoder
            .decode(r#"<calendar year="2024"><days><day d="01.01" t="1"/>"#)
            .expect_err("unterminated elements");
        assert!(matches!(error, DecodeError::Syntax(_)));
    }

    #[test]
    fn non_xml_body_is_an_error() {
        assert!(XmlCalendarDecoder.decode("<html><body>502 Bad Gateway").is_err());
        assert!(XmlCalendarDecoder.decode("").is_err());
    }
}
