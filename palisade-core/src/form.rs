//! Form body parsing: `application/x-www-form-urlencoded` and
//! `multipart/form-data`.

use crate::Error;
use std::collections::HashMap;

/// Parse URL-encoded form data into a map. Later duplicates win.
pub fn parse_form_map(body: &[u8]) -> Result<HashMap<String, String>, Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| Error::BadRequest(format!("Failed to parse form data: {}", e)))?;
    Ok(pairs.into_iter().collect())
}

/// Encode pairs as an URL-encoded form body.
pub fn encode_form(pairs: &[(&str, &str)]) -> Result<Vec<u8>, Error> {
    serde_urlencoded::to_string(pairs)
        .map(String::into_bytes)
        .map_err(|e| Error::Serialization(e.to_string()))
}

/// One part of a multipart body
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    /// Text value, `None` for file parts
    pub value: Option<String>,
    pub file: Option<FormFile>,
}

/// Uploaded file
#[derive(Debug, Clone)]
pub struct FormFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FormFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Multipart form data parser
pub struct MultipartParser {
    boundary: String,
}

impl MultipartParser {
    /// Build a parser from a `multipart/form-data; boundary=...` content type.
    pub fn from_content_type(content_type: &str) -> Result<Self, Error> {
        let boundary = content_type
            .split(';')
            .find_map(|part| {
                let (key, value) = part.trim().split_once('=')?;
                key.eq_ignore_ascii_case("boundary")
                    .then(|| value.trim_matches('"').to_string())
            })
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::BadRequest("Missing boundary in Content-Type".to_string()))?;

        Ok(Self { boundary })
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Split the body into fields.
    pub fn parse(&self, body: &[u8]) -> Result<Vec<FormField>, Error> {
        let delimiter = format!("--{}", self.boundary);
        let delimiter = delimiter.as_bytes();

        let mut fields = Vec::new();
        let mut rest = match find(body, delimiter) {
            Some(start) => &body[start + delimiter.len()..],
            None => return Err(Error::BadRequest("Multipart boundary not found".to_string())),
        };

        loop {
            // "--" right after a delimiter closes the body
            if rest.starts_with(b"--") {
                break;
            }
            let end = find(rest, delimiter)
                .ok_or_else(|| Error::BadRequest("Unterminated multipart body".to_string()))?;
            if let Some(field) = parse_part(&rest[..end])? {
                fields.push(field);
            }
            rest = &rest[end + delimiter.len()..];
        }

        Ok(fields)
    }

    /// Text fields as a map. File parts are left out.
    pub fn to_map(fields: Vec<FormField>) -> HashMap<String, String> {
        fields
            .into_iter()
            .filter_map(|field| field.value.map(|value| (field.name, value)))
            .collect()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn trim_line_break_start(mut part: &[u8]) -> &[u8] {
    if let Some(p) = part.strip_prefix(b"\r\n") {
        part = p;
    } else if let Some(p) = part.strip_prefix(b"\n") {
        part = p;
    }
    part
}

fn trim_line_break_end(mut part: &[u8]) -> &[u8] {
    if let Some(p) = part.strip_suffix(b"\r\n") {
        part = p;
    } else if let Some(p) = part.strip_suffix(b"\n") {
        part = p;
    }
    part
}

fn parse_part(raw: &[u8]) -> Result<Option<FormField>, Error> {
    let raw = trim_line_break_start(raw);
    if raw.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }

    let (head, content) = match find(raw, b"\r\n\r\n") {
        Some(i) => (&raw[..i], &raw[i + 4..]),
        None => match find(raw, b"\n\n") {
            Some(i) => (&raw[..i], &raw[i + 2..]),
            None => return Err(Error::BadRequest("Malformed multipart part".to_string())),
        },
    };
    let content = trim_line_break_end(content);

    let head = String::from_utf8_lossy(head);
    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    for line in head.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("content-disposition") {
            for attr in value.split(';').map(str::trim) {
                if let Some(v) = attr.strip_prefix("name=") {
                    name = Some(v.trim_matches('"').to_string());
                } else if let Some(v) = attr.strip_prefix("filename=") {
                    filename = Some(v.trim_matches('"').to_string());
                }
            }
        } else if key.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_string());
        }
    }

    let name = name.ok_or_else(|| Error::BadRequest("Missing field name".to_string()))?;

    let field = match filename {
        Some(filename) => FormField {
            name,
            value: None,
            file: Some(FormFile {
                filename,
                content_type: content_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                data: content.to_vec(),
            }),
        },
        None => FormField {
            name,
            value: Some(String::from_utf8_lossy(content).into_owned()),
            file: None,
        },
    };
    Ok(Some(field))
}
