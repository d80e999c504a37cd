// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Reading and writing configuration files.
//!
//! The native format is line oriented:
//!
//! ```text
//! # comment
//! name = value
//! [section]
//!     key = "quoted value"
//!     [[subsection]]
//!         key = '''multi
//!         line'''
//! ```
//!
//! The number of brackets around a section header gives its depth. Files
//! with a `.toml` extension are read with the TOML parser instead.

use crate::error::{ConfigError, Error, Result};
use std::io::Write;
use std::path::Path;

use super::value::{Section, Value};

const INDENT: &str = "    ";

/// Read and parse a configuration file, picking the parser by extension.
pub fn read_file(path: &Path) -> Result<Section> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => parse_toml(&content, path),
        _ => parse(&content, path),
    }
}

/// Parse native-format content. `path` is only used in error messages.
pub fn parse(content: &str, path: &Path) -> Result<Section> {
    Parser::new(path).run(content)
}

/// Parse TOML content into a section tree.
///
/// Tables become sections. Other values are stored as their text; arrays
/// are joined with `", "`.
pub fn parse_toml(content: &str, path: &Path) -> Result<Section> {
    let table: toml::Table = content.parse().map_err(|e: toml::de::Error| ConfigError::Toml {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;
    Ok(section_from_toml(table))
}

fn section_from_toml(table: toml::Table) -> Section {
    table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::Table(table) => Value::Section(section_from_toml(table)),
                other => Value::Scalar(toml_text(&other)),
            };
            (key, value)
        })
        .collect()
}

fn toml_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items.iter().map(toml_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Serialize a section tree in the native format.
///
/// An empty tree is written as a single newline.
pub fn write<W: Write + ?Sized>(section: &Section, out: &mut W) -> Result<()> {
    let mut lines = Vec::new();
    write_section(section, 0, &mut lines)?;

    let mut text = lines.join("\n");
    text.push('\n');
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Serialize a section tree to a string.
pub fn to_string(section: &Section) -> Result<String> {
    let mut buf = Vec::new();
    write(section, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_section(section: &Section, depth: usize, lines: &mut Vec<String>) -> Result<()> {
    let indent = INDENT.repeat(depth);

    for (key, value) in section.scalars() {
        let key = quote_key(key)?;
        let value = quote_value(value)
            .ok_or_else(|| unrepresentable(&key, "value mixes every quote style"))?;
        lines.push(format!("{}{} = {}", indent, key, value));
    }

    for (name, child) in section.sections() {
        let name = quote_key(name)?;
        let brackets = depth + 1;
        lines.push(format!(
            "{}{}{}{}",
            indent,
            "[".repeat(brackets),
            name,
            "]".repeat(brackets)
        ));
        write_section(child, depth + 1, lines)?;
    }

    Ok(())
}

fn unrepresentable(key: &str, message: &str) -> Error {
    ConfigError::Unrepresentable {
        key: key.to_string(),
        message: message.to_string(),
    }
    .into()
}

fn quote_key(key: &str) -> Result<String> {
    if key.contains('\n') {
        return Err(unrepresentable(key, "keys cannot contain newlines"));
    }

    let plain = !key.is_empty()
        && key == key.trim()
        && !key.starts_with(['"', '\''])
        && !key.contains(['=', '#', '[', ']']);
    if plain {
        return Ok(key.to_string());
    }

    for quote in ['"', '\''] {
        if !key.contains(quote) {
            return Ok(format!("{quote}{key}{quote}"));
        }
    }
    Err(unrepresentable(key, "keys cannot contain both quote styles"))
}

fn quote_value(value: &str) -> Option<String> {
    let plain = !value.is_empty()
        && value == value.trim()
        && !value.starts_with(['"', '\''])
        && !value.contains(['#', '\n']);
    if plain {
        return Some(value.to_string());
    }

    if !value.contains('\n') {
        for quote in ['"', '\''] {
            if !value.contains(quote) {
                return Some(format!("{quote}{value}{quote}"));
            }
        }
    }

    for quote in ['"', '\''] {
        let triple = quote.to_string().repeat(3);
        if !value.contains(&triple) && !value.ends_with(quote) {
            return Some(format!("{triple}{value}{triple}"));
        }
    }
    None
}

struct Parser<'p> {
    path: &'p Path,
    root: Section,
    // Open sections, outermost first: (name, contents, header line)
    open: Vec<(String, Section, usize)>,
}

impl<'p> Parser<'p> {
    fn new(path: &'p Path) -> Self {
        Self {
            path,
            root: Section::new(),
            open: Vec::new(),
        }
    }

    fn error(&self, line: usize, message: impl Into<String>) -> Error {
        ConfigError::Parse {
            path: self.path.to_path_buf(),
            line,
            message: message.into(),
        }
        .into()
    }

    fn current(&self) -> &Section {
        self.open.last().map(|(_, section, _)| section).unwrap_or(&self.root)
    }

    fn current_mut(&mut self) -> &mut Section {
        match self.open.last_mut() {
            Some((_, section, _)) => section,
            None => &mut self.root,
        }
    }

    fn run(mut self, content: &str) -> Result<Section> {
        // Split on '\n' only so triple-quoted values keep any '\r'
        let mut lines = content.split('\n').enumerate().map(|(i, l)| (i + 1, l));

        while let Some((number, raw)) = lines.next() {
            let line = raw.trim_start();
            if line.trim_end().is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') {
                self.header(number, line.trim_end())?;
                continue;
            }

            let (key, rest) = self.key(number, line)?;
            let value = self.value(number, rest, &mut lines)?;
            if self.current().contains_key(&key) {
                return Err(self.error(number, format!("duplicate key '{}'", key)));
            }
            self.current_mut().insert(key, value);
        }

        while !self.open.is_empty() {
            self.close_section()?;
        }
        Ok(self.root)
    }

    fn header(&mut self, number: usize, line: &str) -> Result<()> {
        let depth = line.chars().take_while(|&c| c == '[').count();
        let (name, quoted, rest) = match take_token(&line[depth..], ']') {
            Some(parts) => parts,
            None => return Err(self.error(number, "unterminated quote in section header")),
        };
        let name = name.to_string();

        let closing = rest.chars().take_while(|&c| c == ']').count();
        if closing != depth {
            return Err(self.error(number, "mismatched brackets in section header"));
        }
        if !is_blank_or_comment(&rest[closing..]) {
            return Err(self.error(number, "unexpected text after section header"));
        }
        if name.is_empty() && !quoted {
            return Err(self.error(number, "empty section name"));
        }

        if depth > self.open.len() + 1 {
            return Err(self.error(number, format!("section '{}' is nested too deeply", name)));
        }
        while self.open.len() >= depth {
            self.close_section()?;
        }

        if self.current().contains_key(&name) {
            return Err(self.error(number, format!("duplicate section '{}'", name)));
        }
        self.open.push((name, Section::new(), number));
        Ok(())
    }

    fn close_section(&mut self) -> Result<()> {
        if let Some((name, section, number)) = self.open.pop() {
            if self.current().contains_key(&name) {
                return Err(self.error(number, format!("duplicate section '{}'", name)));
            }
            self.current_mut().insert(name, section);
        }
        Ok(())
    }

    fn key<'l>(&self, number: usize, line: &'l str) -> Result<(String, &'l str)> {
        let (key, quoted, rest) = match take_token(line, '=') {
            Some(parts) => parts,
            None => return Err(self.error(number, "unterminated quote in key")),
        };
        let rest = match rest.strip_prefix('=') {
            Some(rest) => rest,
            None => return Err(self.error(number, "expected 'key = value'")),
        };
        if key.is_empty() && !quoted {
            return Err(self.error(number, "empty key"));
        }
        Ok((key.to_string(), rest.trim_start()))
    }

    fn value<'c>(
        &self,
        number: usize,
        rest: &str,
        lines: &mut impl Iterator<Item = (usize, &'c str)>,
    ) -> Result<String> {
        for quote in ["\"\"\"", "'''"] {
            if let Some(body) = rest.strip_prefix(quote) {
                return self.triple_quoted(number, quote, body, lines);
            }
        }

        for quote in ['"', '\''] {
            if let Some(body) = rest.strip_prefix(quote) {
                let end = match body.find(quote) {
                    Some(end) => end,
                    None => return Err(self.error(number, "unterminated quoted value")),
                };
                if !is_blank_or_comment(&body[end + 1..]) {
                    return Err(self.error(number, "unexpected text after quoted value"));
                }
                return Ok(body[..end].to_string());
            }
        }

        let value = match rest.find('#') {
            Some(comment) => &rest[..comment],
            None => rest,
        };
        Ok(value.trim().to_string())
    }

    fn triple_quoted<'c>(
        &self,
        number: usize,
        quote: &str,
        body: &str,
        lines: &mut impl Iterator<Item = (usize, &'c str)>,
    ) -> Result<String> {
        let mut value = String::new();
        let mut current = body.to_string();
        let mut current_number = number;

        loop {
            if let Some(end) = current.find(quote) {
                if !is_blank_or_comment(&current[end + quote.len()..]) {
                    return Err(self.error(current_number, "unexpected text after quoted value"));
                }
                value.push_str(&current[..end]);
                return Ok(value);
            }

            value.push_str(&current);
            value.push('\n');
            match lines.next() {
                Some((next_number, next)) => {
                    current = next.to_string();
                    current_number = next_number;
                }
                None => return Err(self.error(number, "unterminated triple-quoted value")),
            }
        }
    }
}

/// Split off a possibly quoted token ending at `stop`.
///
/// Returns the token text, whether it was quoted, and the remainder
/// starting at `stop` (or at the end of input). Unquoted tokens are
/// trimmed; quoted ones are kept verbatim. Returns `None` when a quote is
/// left open.
fn take_token(text: &str, stop: char) -> Option<(&str, bool, &str)> {
    let trimmed = text.trim_start();
    for quote in ['"', '\''] {
        if let Some(body) = trimmed.strip_prefix(quote) {
            let end = body.find(quote)?;
            return Some((&body[..end], true, body[end + 1..].trim_start()));
        }
    }
    match trimmed.find(stop) {
        Some(end) => Some((trimmed[..end].trim_end(), false, &trimmed[end..])),
        None => Some((trimmed.trim_end(), false, "")),
    }
}

fn is_blank_or_comment(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text.starts_with('#')
}
