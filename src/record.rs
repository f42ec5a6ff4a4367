use crate::{error::ScrapeError, listing::RowFields};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRecord {
    pub category: String,
    pub link: Option<String>,
    pub title: String,
    pub difficulty_label: String,
    pub is_premium: bool,
    pub detail_markup: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum Delimiter {
    #[strum(to_string = "comma", serialize = ",")]
    Comma,
    #[default]
    #[strum(to_string = "pipe", serialize = "|")]
    Pipe,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Pipe => '|',
        }
    }
}

/// Column layout of delimited output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DelimitedSchema {
    /// `Category, Title, Level, Question`
    #[default]
    Standard,
    /// `Category, Link, Text, Difficulty, IsPremium`
    Legacy,
}

impl DelimitedSchema {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Standard => &["Category", "Title", "Level", "Question"],
            Self::Legacy => &["Category", "Link", "Text", "Difficulty", "IsPremium"],
        }
    }

    fn fields(self, record: &ProblemRecord) -> Vec<String> {
        match self {
            Self::Standard => vec![
                record.category.clone(),
                record.title.clone(),
                record.difficulty_label.clone(),
                record.detail_markup.clone().unwrap_or_default(),
            ],
            Self::Legacy => vec![
                record.category.clone(),
                record.link.clone().unwrap_or_default(),
                record.title.clone(),
                record.difficulty_label.clone(),
                record.is_premium.to_string(),
            ],
        }
    }
}

pub fn assemble(fields: RowFields, category: String, detail_markup: Option<String>) -> ProblemRecord {
    ProblemRecord {
        category,
        link: fields.link,
        title: fields.title.unwrap_or_default(),
        difficulty_label: fields.difficulty_label.unwrap_or_default(),
        is_premium: fields.has_premium_marker,
        detail_markup,
    }
}

pub fn to_json(records: &[ProblemRecord]) -> Result<String, ScrapeError> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn from_json(json: &str) -> Result<Vec<ProblemRecord>, ScrapeError> {
    Ok(serde_json::from_str(json)?)
}

/// Render records as delimited text: a header line, then one line per
/// record, with no trailing newline.
///
/// Fields holding the delimiter, a double quote or a line break are quoted
/// and inner quotes doubled, so [`parse_delimited`] recovers every value
/// that was written. `Legacy` keeps everything but the detail markup;
/// `Standard` keeps category, title, difficulty and detail markup.
pub fn to_delimited(records: &[ProblemRecord], schema: DelimitedSchema, delimiter: Delimiter) -> String {
    let d = delimiter.as_char();
    let header = schema.columns().join(&d.to_string());
    let lines = records.iter().map(|record| {
        schema
            .fields(record)
            .iter()
            .map(|field| escape_field(field, d))
            .collect::<Vec<_>>()
            .join(&d.to_string())
    });

    std::iter::once(header)
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_field(field: &str, d: char) -> String {
    if field.contains(|c: char| c == d || c == '"' || c == '\n' || c == '\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split delimited text back into lines of fields, honouring quoting.
pub fn parse_delimited(text: &str, delimiter: Delimiter) -> Vec<Vec<String>> {
    let d = delimiter.as_char();
    let mut lines = vec![];
    let mut fields = vec![];
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' if field.is_empty() => quoted = true,
            '\n' if !quoted => {
                fields.push(std::mem::take(&mut field));
                lines.push(std::mem::take(&mut fields));
            }
            c if c == d && !quoted => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }

    if !text.is_empty() {
        fields.push(field);
        lines.push(fields);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<ProblemRecord> {
        vec![
            ProblemRecord {
                category: "Arrays".into(),
                link: Some("https://x/1".into()),
                title: "Contains Duplicate".into(),
                difficulty_label: "Easy".into(),
                is_premium: false,
                detail_markup: Some(r#"<div class="elfjS"><p>Given nums, return true</p></div>"#.into()),
            },
            ProblemRecord {
                category: "Arrays".into(),
                link: None,
                title: "Sum | Product, \"Except\" Self".into(),
                difficulty_label: "Medium".into(),
                is_premium: true,
                detail_markup: None,
            },
        ]
    }

    #[test]
    fn assemble_should_default_missing_text() {
        let record = assemble(
            RowFields {
                link: Some("https://x/1".into()),
                has_premium_marker: true,
                ..Default::default()
            },
            "Arrays".into(),
            None,
        );
        assert_eq!(record.title, "");
        assert_eq!(record.difficulty_label, "");
        assert!(record.is_premium);
        assert_eq!(record.category, "Arrays");
    }

    #[test]
    fn json_should_round_trip() {
        let records = records();
        let json = to_json(&records).unwrap();
        assert!(json.contains("\"difficultyLabel\": \"Easy\""));
        assert!(json.contains("\"detailMarkup\": null"));
        assert_eq!(from_json(&json).unwrap(), records);
    }

    #[test]
    fn to_delimited_should_render_standard_schema() {
        let out = to_delimited(&records(), DelimitedSchema::Standard, Delimiter::Pipe);
        insta::assert_snapshot!(out, @r###"
        Category|Title|Level|Question
        Arrays|Contains Duplicate|Easy|"<div class=""elfjS""><p>Given nums, return true</p></div>"
        Arrays|"Sum | Product, ""Except"" Self"|Medium|
        "###);
    }

    #[test]
    fn to_delimited_should_render_legacy_schema() {
        let out = to_delimited(&records(), DelimitedSchema::Legacy, Delimiter::Comma);
        insta::assert_snapshot!(out, @r###"
        Category,Link,Text,Difficulty,IsPremium
        Arrays,https://x/1,Contains Duplicate,Easy,false
        Arrays,,"Sum | Product, ""Except"" Self",Medium,true
        "###);
    }

    #[test]
    fn to_delimited_should_emit_one_line_per_record() {
        let records = records();
        for schema in [DelimitedSchema::Standard, DelimitedSchema::Legacy] {
            for delimiter in [Delimiter::Comma, Delimiter::Pipe] {
                let out = to_delimited(&records, schema, delimiter);
                assert_eq!(out.lines().count(), records.len() + 1);
                assert_eq!(
                    out.lines().next().unwrap(),
                    schema.columns().join(&delimiter.as_char().to_string())
                );
            }
        }

        let out = to_delimited(&[], DelimitedSchema::Standard, Delimiter::Comma);
        assert_eq!(out, "Category,Title,Level,Question");
    }

    #[test]
    fn parse_delimited_should_recover_written_fields() {
        let mut records = records();
        records[0].detail_markup = Some("<p>line one\nline two, with \"quotes\"</p>".into());

        let out = to_delimited(&records, DelimitedSchema::Standard, Delimiter::Comma);
        let lines = parse_delimited(&out, Delimiter::Comma);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], vec!["Category", "Title", "Level", "Question"]);
        assert_eq!(
            lines[1],
            vec![
                "Arrays",
                "Contains Duplicate",
                "Easy",
                "<p>line one\nline two, with \"quotes\"</p>"
            ]
        );
        assert_eq!(
            lines[2],
            vec!["Arrays", "Sum | Product, \"Except\" Self", "Medium", ""]
        );
    }

    #[test]
    fn enums_should_parse_from_cli_values() {
        assert_eq!("pipe".parse::<Delimiter>().unwrap(), Delimiter::Pipe);
        assert_eq!(",".parse::<Delimiter>().unwrap(), Delimiter::Comma);
        assert_eq!("Legacy".parse::<DelimitedSchema>().unwrap(), DelimitedSchema::Legacy);
        assert!("tab".parse::<Delimiter>().is_err());
    }
}
