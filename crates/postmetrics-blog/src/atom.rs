//! Atom service-document and feed parsing.
//!
//! The service document is read leniently (case-insensitive names, no end-tag
//! checks) since only the first `collection` href matters. Feeds are read with
//! namespace resolution so only Atom `entry` elements produce posts.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Reader};

use postmetrics_core::PostRecord;

use crate::error::BlogError;

const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";

/// Posts listed on one collection page plus the `rel="next"` link, if any.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FeedPage {
    pub posts: Vec<PostRecord>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum TextField {
    Title,
    Published,
}

/// Extract the `href` of the first `collection` element.
///
/// # Errors
///
/// Returns [`BlogError::Malformed`] if the markup cannot be tokenized, or
/// [`BlogError::MissingField`] if no `collection` element carries an `href`.
pub fn parse_service_document(xml: &str) -> Result<String, BlogError> {
    const CONTEXT: &str = "service document";

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e))
                if e.local_name().as_ref().eq_ignore_ascii_case(b"collection") =>
            {
                if let Some(href) = attribute(&e, b"href", CONTEXT)? {
                    return Ok(href);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(CONTEXT, &e)),
            _ => {}
        }
    }

    Err(BlogError::MissingField {
        context: CONTEXT.to_string(),
        field: "collection href",
    })
}

/// Parse an Atom feed into post records, in document order.
///
/// For each Atom `entry` directly under the root, the direct children are scanned: the `href` of the
/// `link` with `rel="alternate"` becomes the URL, and the text of `title` and
/// `published` is captured. Missing children leave the field `None`.
///
/// # Errors
///
/// Returns [`BlogError::Malformed`] if the XML is not well-formed.
pub fn parse_feed(xml: &str) -> Result<FeedPage, BlogError> {
    const CONTEXT: &str = "collection feed";

    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page = FeedPage::default();
    // Number of currently open elements.
    let mut depth = 0usize;
    let mut entry: Option<(usize, PostRecord)> = None;
    let mut capture: Option<(usize, TextField)> = None;
    let mut text = String::new();

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                let atom = is_atom(&ns);
                if let Some((entry_depth, post)) = entry.as_mut() {
                    if atom && depth == *entry_depth + 1 {
                        match e.local_name().as_ref() {
                            b"title" => capture = Some((depth, TextField::Title)),
                            b"published" => capture = Some((depth, TextField::Published)),
                            b"link" => apply_alternate_link(&e, post, CONTEXT)?,
                            _ => {}
                        }
                        text.clear();
                    }
                } else if atom && depth == 1 && e.local_name().as_ref() == b"entry" {
                    entry = Some((depth, PostRecord::default()));
                } else if atom && depth == 1 && e.local_name().as_ref() == b"link" {
                    read_next_link(&e, &mut page, CONTEXT)?;
                }
                depth += 1;
            }
            Ok((ns, Event::Empty(e))) => {
                if !is_atom(&ns) {
                    continue;
                }
                let name = e.local_name();
                if let Some((entry_depth, post)) = entry.as_mut() {
                    if depth == *entry_depth + 1 {
                        match name.as_ref() {
                            b"link" => apply_alternate_link(&e, post, CONTEXT)?,
                            // Same as an element with no text.
                            b"title" => post.title = Some(String::new()),
                            b"published" => post.published = Some(String::new()),
                            _ => {}
                        }
                    }
                } else if depth == 1 {
                    match name.as_ref() {
                        b"entry" => page.posts.push(PostRecord::default()),
                        b"link" => read_next_link(&e, &mut page, CONTEXT)?,
                        _ => {}
                    }
                }
            }
            Ok((_, Event::Text(e))) => {
                if capture.is_some() {
                    let chunk = e.unescape().map_err(|err| malformed(CONTEXT, &err))?;
                    text.push_str(&chunk);
                }
            }
            Ok((_, Event::CData(e))) => {
                if capture.is_some() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok((_, Event::End(_))) => {
                depth = depth.saturating_sub(1);
                if let Some((capture_depth, field)) = capture {
                    if capture_depth == depth {
                        capture = None;
                        if let Some((_, post)) = entry.as_mut() {
                            let value = std::mem::take(&mut text);
                            match field {
                                TextField::Title => post.title = Some(value),
                                TextField::Published => post.published = Some(value),
                            }
                        }
                    }
                }
                if entry.as_ref().is_some_and(|(entry_depth, _)| *entry_depth == depth) {
                    if let Some((_, post)) = entry.take() {
                        page.posts.push(post);
                    }
                }
            }
            Ok((_, Event::Eof)) => break,
            Err(e) => return Err(malformed(CONTEXT, &e)),
            _ => {}
        }
    }

    Ok(page)
}

fn is_atom(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == ATOM_NS)
}

fn apply_alternate_link(
    e: &BytesStart<'_>,
    post: &mut PostRecord,
    context: &str,
) -> Result<(), BlogError> {
    if attribute(e, b"rel", context)?.as_deref() == Some("alternate") {
        post.url = attribute(e, b"href", context)?;
    }
    Ok(())
}

fn read_next_link(e: &BytesStart<'_>, page: &mut FeedPage, context: &str) -> Result<(), BlogError> {
    if attribute(e, b"rel", context)?.as_deref() == Some("next") {
        page.next = attribute(e, b"href", context)?;
    }
    Ok(())
}

/// Look up an attribute by local name and return its unescaped value.
fn attribute(e: &BytesStart<'_>, name: &[u8], context: &str) -> Result<Option<String>, BlogError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(context, &err))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|err| malformed(context, &err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn malformed(context: &str, err: &dyn std::fmt::Display) -> BlogError {
    BlogError::Malformed {
        context: context.to_string(),
        reason: err.to_string(),
    }
}
