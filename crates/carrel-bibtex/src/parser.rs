//! Single-entry BibTeX parser implementation using nom
//!
//! This parser handles exactly one entry of the conventional form
//! `@type{key, field = {value}, ...}` with brace-delimited field values.
//! Values must not themselves contain unescaped braces; field names and
//! values are trimmed of surrounding whitespace. Anything after the entry's
//! closing brace is ignored.

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    IResult,
};

use super::entry::{EntryType, Field, ParsedEntry};

/// Error type for parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input does not match the single-entry wrapper.
    #[error("malformed bibtex: expected `@type{{key, field = {{value}}, ...}}`")]
    Malformed,
    /// The entry type token is not one of the known types.
    #[error("`{0}` is not a known entry type")]
    UnknownEntryType(String),
}

/// Parse a single BibTeX entry
pub fn parse_entry(input: &str) -> Result<ParsedEntry, ParseError> {
    let (_, (type_token, cite_key, fields)) = entry(input).map_err(|_| ParseError::Malformed)?;
    let entry_type = type_token.parse::<EntryType>()?;
    Ok(ParsedEntry {
        entry_type,
        cite_key: cite_key.to_string(),
        fields: fields
            .into_iter()
            .map(|(name, value)| Field {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
    })
}

/// Parse the outer wrapper: `@type{key, <fields> }`
fn entry(input: &str) -> IResult<&str, (&str, &str, Vec<(&str, &str)>)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('@')(rest)?;
    let (rest, entry_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, cite_key) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./".contains(c))(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(',')(rest)?;
    let (rest, fields) = fields(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;
    Ok((rest, (entry_type, cite_key, fields)))
}

/// Parse fields within an entry body, up to the closing brace
fn fields(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        // Check for end of entry
        if rest.starts_with('}') {
            return Ok((rest, fields));
        }

        let (rest, field) = single_field(rest)?;
        fields.push(field);

        // Skip optional comma
        let (rest, _) = multispace0(rest)?;
        remaining = rest.strip_prefix(',').unwrap_or(rest);
    }
}

/// Parse a single `name = {value}` pair
fn single_field(input: &str) -> IResult<&str, (&str, &str)> {
    let (rest, _) = multispace0(input)?;
    let (rest, name) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, value) = take_while(|c: char| c != '{' && c != '}')(rest)?;
    let (rest, _) = char('}')(rest)?;
    Ok((rest, (name, value.trim())))
}
