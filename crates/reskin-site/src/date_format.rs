//! Java `SimpleDateFormat` patterns, as written in `publishDate/@format`
//!
//! Patterns are translated once into a chrono format string. Letters with
//! no chrono counterpart are rejected.

use chrono::{DateTime, TimeZone};

use crate::error::{Result, SiteError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaDateFormat {
    pattern: String,
    chrono_format: String,
}

impl JavaDateFormat {
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: String| SiteError::InvalidDateFormat {
            pattern: pattern.to_string(),
            reason,
        };

        let mut out = String::new();
        let chars: Vec<char> = pattern.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];

            if c == '\'' {
                // '' is a literal quote, inside or outside a quoted run
                if chars.get(i + 1) == Some(&'\'') {
                    out.push('\'');
                    i += 2;
                    continue;
                }
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(invalid("unterminated quote".to_string())),
                        Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                            out.push('\'');
                            i += 2;
                        }
                        Some('\'') => {
                            i += 1;
                            break;
                        }
                        Some(&literal) => {
                            push_literal(&mut out, literal);
                            i += 1;
                        }
                    }
                }
                continue;
            }

            if !c.is_ascii_alphabetic() {
                push_literal(&mut out, c);
                i += 1;
                continue;
            }

            let run = chars[i..].iter().take_while(|&&x| x == c).count();
            let spec = match (c, run) {
                ('y', 2) => "%y",
                ('y', _) => "%Y",
                ('M', 1) => "%-m",
                ('M', 2) => "%m",
                ('M', 3) => "%b",
                ('M', _) => "%B",
                ('d', 1) => "%-d",
                ('d', _) => "%d",
                ('D', _) => "%j",
                ('H', 1) => "%-H",
                ('H', _) => "%H",
                ('h', 1) => "%-I",
                ('h', _) => "%I",
                ('m', 1) => "%-M",
                ('m', _) => "%M",
                ('s', 1) => "%-S",
                ('s', _) => "%S",
                ('S', _) => "%3f",
                ('E', 1..=3) => "%a",
                ('E', _) => "%A",
                ('a', _) => "%p",
                ('z', _) => "%Z",
                ('Z', _) => "%z",
                ('X', _) => "%:z",
                _ => return Err(invalid(format!("unsupported pattern letter '{}'", c))),
            };
            out.push_str(spec);
            i += run;
        }

        Ok(Self {
            pattern: pattern.to_string(),
            chrono_format: out,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format<Tz>(&self, date: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        date.format(&self.chrono_format).to_string()
    }
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2011, 3, 4, 9, 5, 7).unwrap()
    }

    fn render(pattern: &str) -> String {
        JavaDateFormat::parse(pattern).unwrap().format(&date())
    }

    #[test]
    fn test_default_pattern() {
        assert_eq!(render("MM/dd/yyyy"), "03/04/2011");
    }

    #[test]
    fn test_textual_fields() {
        assert_eq!(render("EEEE, d MMMM yy"), "Friday, 4 March 11");
        assert_eq!(render("EEE MMM d"), "Fri Mar 4");
    }

    #[test]
    fn test_time_fields() {
        assert_eq!(render("HH:mm:ss"), "09:05:07");
        assert_eq!(render("h:m a"), "9:5 AM");
    }

    #[test]
    fn test_quoted_literals() {
        assert_eq!(render("yyyy-MM-dd'T'HH"), "2011-03-04T09");
        assert_eq!(render("'at' h 'o''clock'"), "at 9 o'clock");
        assert_eq!(render("dd''MM"), "04'03");
        assert_eq!(render("100% yyyy"), "100% 2011");
    }

    #[test]
    fn test_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = date().with_timezone(&offset);
        let format = JavaDateFormat::parse("HH:mm Z").unwrap();
        assert_eq!(format.format(&local), "11:05 +0200");
    }

    #[test]
    fn test_rejects_unknown_letters_and_open_quotes() {
        assert!(JavaDateFormat::parse("yyyy QQ").is_err());
        assert!(JavaDateFormat::parse("yyyy 'open").is_err());
    }
}
