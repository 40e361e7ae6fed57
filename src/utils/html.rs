//! HTML start-tag scanning.
//!
//! Walks a document the way the HTML tokenizer does, but only reports start
//! tags, each attribute carrying the exact byte range of its raw value:
//!
//! ```text
//! <link rel=stylesheet href=css/site.css>
//!                           ^^^^^^^^^^^^ span of `href`
//! ```
//!
//! Comments, doctypes and end tags are skipped. The bodies of raw text
//! (`script`, `style`) and escapable raw text (`textarea`, `title`) elements
//! are text, so markup inside them never yields a tag. Entities in values
//! are left undecoded.

use std::ops::Range;

/// One attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    /// Raw value, `None` for a bare attribute (`<script async>`).
    pub value: Option<&'a str>,
    /// Byte range of `value` in the document (empty when there is none).
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    pub name: &'a str,
    pub attributes: Vec<Attribute<'a>>,
}

impl<'a> StartTag<'a> {
    /// Tag name comparison, ASCII case-insensitive.
    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// First attribute called `name`. Browsers drop later duplicates.
    pub fn attribute(&self, name: &str) -> Option<&Attribute<'a>> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }
}

/// Check if tag is a raw text element (content is never parsed as markup).
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    ["script", "style", "xmp", "iframe", "noembed", "noframes"]
        .iter()
        .any(|raw| raw.eq_ignore_ascii_case(tag))
}

/// Check if tag is an escapable raw text element (entities only, no tags).
#[inline]
pub fn is_escapable_raw_text_element(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("textarea") || tag.eq_ignore_ascii_case("title")
}

/// Iterate over the start tags of `html` in document order.
pub fn start_tags(html: &str) -> StartTags<'_> {
    StartTags {
        html,
        pos: 0,
        text_until: None,
    }
}

pub struct StartTags<'a> {
    html: &'a str,
    pos: usize,
    /// Inside a text-only element: the name whose end tag closes it.
    text_until: Option<&'a str>,
}

impl<'a> Iterator for StartTags<'a> {
    type Item = StartTag<'a>;

    fn next(&mut self) -> Option<StartTag<'a>> {
        let bytes = self.html.as_bytes();

        loop {
            if let Some(name) = self.text_until.take() {
                self.pos = find_end_tag(bytes, self.pos, name).unwrap_or(bytes.len());
            }

            let open = self.pos + bytes.get(self.pos..)?.iter().position(|&b| b == b'<')?;
            match bytes.get(open + 1) {
                Some(b'!') => self.pos = skip_markup_declaration(bytes, open),
                Some(b'?') => self.pos = skip_past_gt(bytes, open + 2),
                Some(b'/') => self.pos = skip_end_tag(self.html, open),
                Some(b) if b.is_ascii_alphabetic() => {
                    // A tag cut off by the end of the document is dropped.
                    let Some((tag, end)) = parse_tag(self.html, open + 1) else {
                        self.pos = bytes.len();
                        return None;
                    };
                    self.pos = end;
                    if tag.is("plaintext") {
                        self.pos = bytes.len();
                    } else if is_raw_text_element(tag.name)
                        || is_escapable_raw_text_element(tag.name)
                    {
                        self.text_until = Some(tag.name);
                    }
                    return Some(tag);
                }
                _ => self.pos = open + 1,
            }
        }
    }
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c)
}

fn skip_spaces(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(|&b| is_space(b)) {
        i += 1;
    }
    i
}

/// Index just past the next `>` at or after `from`, or the end of input.
fn skip_past_gt(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.iter().position(|&b| b == b'>'))
        .map_or(bytes.len(), |off| from + off + 1)
}

/// `<!-- ... -->`, `<!DOCTYPE ...>` and other `<!...>` constructs.
fn skip_markup_declaration(bytes: &[u8], open: usize) -> usize {
    let rest = &bytes[open..];
    if !rest.starts_with(b"<!--") {
        return skip_past_gt(bytes, open + 2);
    }

    let body = open + 4;
    // `<!-->` and `<!--->` are complete (empty) comments
    if bytes[body..].starts_with(b">") {
        return body + 1;
    }
    if bytes[body..].starts_with(b"->") {
        return body + 2;
    }
    bytes[body..]
        .windows(3)
        .position(|w| w == b"-->")
        .map_or(bytes.len(), |off| body + off + 3)
}

fn skip_end_tag(html: &str, open: usize) -> usize {
    let bytes = html.as_bytes();
    match bytes.get(open + 2) {
        Some(b'>') => open + 3,
        // Attributes on end tags are tokenized (and ignored), so a quoted
        // `>` does not end the tag.
        Some(b) if b.is_ascii_alphabetic() => {
            parse_tag(html, open + 2).map_or(bytes.len(), |(_, end)| end)
        }
        _ => skip_past_gt(bytes, open + 2),
    }
}

/// Position of the `</name` closing a text-only element.
fn find_end_tag(bytes: &[u8], from: usize, name: &str) -> Option<usize> {
    let name = name.as_bytes();
    let mut i = from;
    while let Some(off) = bytes.get(i..)?.windows(2).position(|w| w == b"</") {
        let at = i + off;
        let after = at + 2 + name.len();
        let matches_name = bytes
            .get(at + 2..after)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name));
        let terminated = matches!(bytes.get(after), Some(&b) if is_space(b) || b == b'/' || b == b'>');
        if matches_name && terminated {
            return Some(at);
        }
        i = at + 2;
    }
    None
}

/// Parse a tag starting at its name (just after `<` or `</`).
///
/// Returns the tag and the index just past its `>`, or `None` if the input
/// ends inside the tag.
fn parse_tag(html: &str, start: usize) -> Option<(StartTag<'_>, usize)> {
    let bytes = html.as_bytes();
    let len = bytes.len();

    let mut i = start;
    while i < len && !is_space(bytes[i]) && bytes[i] != b'/' && bytes[i] != b'>' {
        i += 1;
    }
    let name = &html[start..i];
    let mut attributes = Vec::new();

    loop {
        while i < len && (is_space(bytes[i]) || bytes[i] == b'/') {
            i += 1;
        }
        if *bytes.get(i)? == b'>' {
            return Some((StartTag { name, attributes }, i + 1));
        }

        // The first character of a name may be `=`
        let name_start = i;
        i += 1;
        while i < len && !is_space(bytes[i]) && !matches!(bytes[i], b'/' | b'>' | b'=') {
            i += 1;
        }
        let attr_name = &html[name_start..i];
        let name_end = i;

        i = skip_spaces(bytes, i);
        if bytes.get(i) != Some(&b'=') {
            attributes.push(Attribute {
                name: attr_name,
                value: None,
                span: name_end..name_end,
            });
            continue;
        }

        i = skip_spaces(bytes, i + 1);
        let span = match *bytes.get(i)? {
            quote @ (b'"' | b'\'') => {
                let open = i + 1;
                let close = open + bytes[open..].iter().position(|&b| b == quote)?;
                i = close + 1;
                open..close
            }
            // `href=>` has an empty value
            b'>' => i..i,
            _ => {
                let open = i;
                while i < len && !is_space(bytes[i]) && bytes[i] != b'>' {
                    i += 1;
                }
                open..i
            }
        };
        attributes.push(Attribute {
            name: attr_name,
            value: Some(&html[span.clone()]),
            span,
        });
    }
}
