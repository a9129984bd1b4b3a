//! Documentation text parsing
//!
//! Extracts the short description, long description and per-parameter hints
//! from documentation written in any of four conventional layouts:
//!
//! - Google: `Args:` / `Attributes:` sections with `name (type): text` items
//! - reStructuredText: `:param [type] name: text`
//! - Epydoc: `@param name: text`
//! - numpydoc: `Parameters` sections underlined with dashes, `name : type` items
//!
//! [`parse`] tries every layout and keeps the one that recognizes the most
//! entries.
//!
//! Copyright (c) 2025 Callschema Team
//! Licensed under the Apache-2.0 license

use regex::Regex;
use std::sync::OnceLock;

/// Documentation layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocstringStyle {
    Google,
    Rest,
    Epydoc,
    Numpy,
}

impl DocstringStyle {
    /// Tie-break order for automatic detection
    pub const ALL: [DocstringStyle; 4] = [
        DocstringStyle::Google,
        DocstringStyle::Rest,
        DocstringStyle::Epydoc,
        DocstringStyle::Numpy,
    ];
}

/// A documented parameter or attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocParam {
    pub name: String,
    pub type_name: Option<String>,
    pub description: Option<String>,
}

/// Parsed documentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Docstring {
    pub style: DocstringStyle,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub params: Vec<DocParam>,
    /// Entries the layout recognized, parameters included
    meta_count: usize,
}

impl Docstring {
    fn empty(style: DocstringStyle) -> Self {
        Self {
            style,
            short_description: None,
            long_description: None,
            params: Vec::new(),
            meta_count: 0,
        }
    }

    /// Hint for parameter `name`; empty descriptions are not hints
    pub fn param_hint(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.description.as_deref())
            .filter(|d| !d.is_empty())
    }
}

/// Parse documentation in whichever layout fits best
pub fn parse(text: &str) -> Docstring {
    let text = cleandoc(text);
    let mut best: Option<Docstring> = None;
    for style in DocstringStyle::ALL {
        let parsed = parse_cleaned(&text, style);
        let better = match &best {
            None => true,
            Some(current) => parsed.meta_count > current.meta_count,
        };
        if better {
            best = Some(parsed);
        }
    }
    best.unwrap_or_else(|| Docstring::empty(DocstringStyle::Google))
}

/// Parse documentation in a specific layout
pub fn parse_as(text: &str, style: DocstringStyle) -> Docstring {
    parse_cleaned(&cleandoc(text), style)
}

fn parse_cleaned(text: &str, style: DocstringStyle) -> Docstring {
    match style {
        DocstringStyle::Google => parse_google(text),
        DocstringStyle::Rest => parse_tagged(text, style, ':', rest_item_regex()),
        DocstringStyle::Epydoc => parse_tagged(text, style, '@', epydoc_item_regex()),
        DocstringStyle::Numpy => parse_numpy(text),
    }
}

/// Dedent documentation the way doc tools do: the first line is stripped,
/// the common indentation of the remaining lines is removed, and leading and
/// trailing blank lines are dropped.
pub fn cleandoc(text: &str) -> String {
    let expanded = text.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    let margin = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim_start().to_string());
    for line in &lines[1..] {
        cleaned.push(strip_margin(line, margin).trim_end().to_string());
    }
    while cleaned.first().is_some_and(|line| line.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.trim().is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

/// Leading whitespace, counted in characters
fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Drop up to `margin` leading whitespace characters
fn strip_margin(line: &str, margin: usize) -> &str {
    let cut = line
        .char_indices()
        .take_while(|(_, c)| c.is_whitespace())
        .nth(margin)
        .map_or_else(|| line.len() - line.trim_start().len(), |(i, _)| i);
    &line[cut..]
}

/// Dedent a block of continuation lines by their common indentation
fn dedent(lines: &[&str]) -> String {
    let margin = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);
    let body: Vec<&str> = lines
        .iter()
        .map(|line| strip_margin(line, margin).trim_end())
        .collect();
    body.join("\n").trim().to_string()
}

/// Split a description block into short and long descriptions
fn split_description(block: &str) -> (Option<String>, Option<String>) {
    let block = block.trim();
    if block.is_empty() {
        return (None, None);
    }
    let (short, long) = match block.split_once('\n') {
        Some((short, long)) => (short, long.trim()),
        None => (block, ""),
    };
    let short = Some(short.trim().to_string()).filter(|s| !s.is_empty());
    let long = Some(long.to_string()).filter(|s| !s.is_empty());
    (short, long)
}

fn join_description(first: &str, rest: &[&str]) -> Option<String> {
    let first = first.trim();
    let rest = dedent(rest);
    let description = match (first.is_empty(), rest.is_empty()) {
        (true, _) => rest,
        (false, true) => first.to_string(),
        (false, false) => format!("{}\n{}", first, rest),
    };
    Some(description).filter(|d| !d.is_empty())
}

const GOOGLE_PARAM_SECTIONS: &[&str] = &[
    "Args",
    "Arguments",
    "Parameters",
    "Params",
    "Attributes",
    "Attrs",
    "Keyword Args",
    "Keyword Arguments",
    "Kwargs",
    "Other Parameters",
];

fn google_header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(Args|Arguments|Parameters|Params|Attributes|Attrs|Keyword Args|Keyword Arguments|Kwargs|Other Parameters|Returns|Return|Yields|Yield|Raises|Raise|Exceptions|Except|Examples|Example|Notes|Note|Warnings|Warning|Todo|See Also|References):\s*$",
        )
        .expect("static regex")
    })
}

fn google_item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\*{0,2}[A-Za-z_][\w.]*)\s*(?:\(([^)]*)\))?\s*:(.*)$").expect("static regex")
    })
}

fn parse_google(text: &str) -> Docstring {
    let lines: Vec<&str> = text.lines().collect();
    let headers: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| {
            google_header_regex()
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|title| (i, title.as_str()))
        })
        .collect();

    let description_end = headers.first().map(|(i, _)| *i).unwrap_or(lines.len());
    let (short, long) = split_description(&lines[..description_end].join("\n"));
    let mut doc = Docstring::empty(DocstringStyle::Google);
    doc.short_description = short;
    doc.long_description = long;

    for (index, (start, title)) in headers.iter().enumerate() {
        let end = headers.get(index + 1).map(|(i, _)| *i).unwrap_or(lines.len());
        let body = &lines[start + 1..end];
        doc.meta_count += 1;
        if !GOOGLE_PARAM_SECTIONS.contains(title) {
            continue;
        }
        let Some(item_indent) = body
            .iter()
            .find(|line| !line.trim().is_empty())
            .map(|line| indent_of(line))
        else {
            continue;
        };

        let mut i = 0;
        while i < body.len() {
            let line = body[i];
            if line.trim().is_empty() || indent_of(line) != item_indent {
                i += 1;
                continue;
            }
            let mut j = i + 1;
            while j < body.len() && (body[j].trim().is_empty() || indent_of(body[j]) > item_indent) {
                j += 1;
            }
            if let Some(caps) = google_item_regex().captures(line.trim()) {
                let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let first = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
                doc.params.push(DocParam {
                    name: name.trim_start_matches('*').to_string(),
                    type_name: caps.get(2).map(|m| m.as_str().trim().to_string()),
                    description: join_description(first, &body[i + 1..j]),
                });
                doc.meta_count += 1;
            }
            i = j;
        }
    }
    doc
}

fn rest_item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^:(param|parameter|arg|argument|attribute|key|keyword|type|returns?|rtype|raises?|except|exception|yields?)(?:\s+(?:([^:]+?)\s+)?([^\s:]+))?\s*:(.*)$")
            .expect("static regex")
    })
}

fn epydoc_item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^@(param|kwparam|ivar|type|returns?|rtype|raises?)(?:\s+(?:([^:]+?)\s+)?([^\s:]+))?\s*:(.*)$")
            .expect("static regex")
    })
}

/// Field-list layouts: every entry starts at column zero with `marker`
fn parse_tagged(text: &str, style: DocstringStyle, marker: char, item: &Regex) -> Docstring {
    let lines: Vec<&str> = text.lines().collect();
    let description_end = lines
        .iter()
        .position(|line| line.starts_with(marker))
        .unwrap_or(lines.len());
    let (short, long) = split_description(&lines[..description_end].join("\n"));
    let mut doc = Docstring::empty(style);
    doc.short_description = short;
    doc.long_description = long;

    let mut i = description_end;
    while i < lines.len() {
        let line = lines[i];
        let mut j = i + 1;
        while j < lines.len() && !lines[j].starts_with(marker) {
            j += 1;
        }
        if let Some(caps) = item.captures(line) {
            doc.meta_count += 1;
            let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let type_name = caps.get(2).map(|m| m.as_str().trim().to_string());
            let name = caps.get(3).map(|m| m.as_str().to_string());
            let first = caps.get(4).map(|m| m.as_str()).unwrap_or_default();
            let description = join_description(first, &lines[i + 1..j]);
            match (tag, name) {
                ("type", Some(name)) => {
                    let type_name = description.or(type_name);
                    match doc.params.iter_mut().find(|p| p.name == name) {
                        Some(param) => param.type_name = type_name,
                        None => doc.params.push(DocParam {
                            name,
                            type_name,
                            description: None,
                        }),
                    }
                }
                (
                    "param" | "parameter" | "arg" | "argument" | "attribute" | "key" | "keyword"
                    | "kwparam" | "ivar",
                    Some(name),
                ) => match doc.params.iter_mut().find(|p| p.name == name) {
                    Some(param) => {
                        param.description = description;
                        if type_name.is_some() {
                            param.type_name = type_name;
                        }
                    }
                    None => doc.params.push(DocParam {
                        name,
                        type_name,
                        description,
                    }),
                },
                _ => {}
            }
        }
        i = j;
    }
    doc
}

const NUMPY_PARAM_SECTIONS: &[&str] = &[
    "Parameters",
    "Params",
    "Arguments",
    "Args",
    "Other Parameters",
    "Attributes",
    "Receives",
];

fn numpy_underline_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*-{3,}\s*$").expect("static regex"))
}

fn parse_numpy(text: &str) -> Docstring {
    let lines: Vec<&str> = text.lines().collect();
    let headers: Vec<(usize, &str)> = (0..lines.len().saturating_sub(1))
        .filter(|&i| !lines[i].trim().is_empty() && numpy_underline_regex().is_match(lines[i + 1]))
        .map(|i| (i, lines[i].trim()))
        .collect();

    let description_end = headers.first().map(|(i, _)| *i).unwrap_or(lines.len());
    let (short, long) = split_description(&lines[..description_end].join("\n"));
    let mut doc = Docstring::empty(DocstringStyle::Numpy);
    doc.short_description = short;
    doc.long_description = long;

    for (index, (start, title)) in headers.iter().enumerate() {
        let end = headers.get(index + 1).map(|(i, _)| *i).unwrap_or(lines.len());
        let body = &lines[start + 2..end];
        doc.meta_count += 1;
        if !NUMPY_PARAM_SECTIONS.contains(title) {
            continue;
        }
        let Some(item_indent) = body
            .iter()
            .find(|line| !line.trim().is_empty())
            .map(|line| indent_of(line))
        else {
            continue;
        };

        let mut i = 0;
        while i < body.len() {
            let line = body[i];
            if line.trim().is_empty() || indent_of(line) != item_indent {
                i += 1;
                continue;
            }
            let mut j = i + 1;
            while j < body.len() && (body[j].trim().is_empty() || indent_of(body[j]) > item_indent) {
                j += 1;
            }
            let (names, type_name) = match line.trim().split_once(':') {
                Some((names, type_name)) => (
                    names.trim(),
                    Some(type_name.trim().to_string()).filter(|t| !t.is_empty()),
                ),
                None => (line.trim(), None),
            };
            let description = join_description("", &body[i + 1..j]);
            for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                doc.params.push(DocParam {
                    name: name.trim_start_matches('*').to_string(),
                    type_name: type_name.clone(),
                    description: description.clone(),
                });
                doc.meta_count += 1;
            }
            i = j;
        }
    }
    doc
}
