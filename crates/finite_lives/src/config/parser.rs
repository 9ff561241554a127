use std::collections::HashMap;

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use super::chapter::Chapter;
use super::types::{ConfigError, ParseNote, ParseNoteKind, ParseReport, SourceLocation};

const NODE_CHAPTER: &str = "chapter";
const NODE_LEVEL: &str = "level";
const ATTR_NAME: &str = "name";
const ATTR_LIVES: &str = "lives";

struct PendingLevel {
    name: String,
    lives: i32,
}

enum Edge<'a, 'input> {
    Open(Node<'a, 'input>),
    Close(Node<'a, 'input>),
}

/// Single forward pass over element open/close edges.
///
/// A source that is not well formed keeps every chapter closed before the
/// fault; the rest of it is dropped and noted as `MalformedXml`.
pub(crate) fn parse_into(
    chapters: &mut HashMap<String, Chapter>,
    source_name: &str,
    raw: &str,
) -> Result<ParseReport, ConfigError> {
    let error = match Document::parse(raw) {
        Ok(doc) => return Ok(apply_document(chapters, source_name, &doc)),
        Err(error) => error,
    };
    let location = SourceLocation {
        line: error.pos().row as usize,
        column: error.pos().col as usize,
    };
    let malformed = |message: String| ConfigError::XmlMalformed {
        source_name: source_name.to_string(),
        message,
        location,
    };

    let Some(salvaged) = well_formed_prefix(raw, byte_offset(raw, location)) else {
        return Err(malformed(error.to_string()));
    };
    let doc = Document::parse(&salvaged).map_err(|_| malformed(error.to_string()))?;
    let mut report = apply_document(chapters, source_name, &doc);
    warn!(
        source = source_name,
        line = location.line,
        column = location.column,
        error = %error,
        chapters_kept = report.chapters_added.len(),
        "config_source_truncated"
    );
    report.notes.push(ParseNote {
        kind: ParseNoteKind::MalformedXml,
        location,
    });
    Ok(report)
}

fn apply_document(
    chapters: &mut HashMap<String, Chapter>,
    source_name: &str,
    doc: &Document<'_>,
) -> ParseReport {
    let mut report = ParseReport {
        source_name: source_name.to_string(),
        ..ParseReport::default()
    };
    let mut open_chapter: Option<Chapter> = None;
    let mut pending_level: Option<PendingLevel> = None;

    let mut edges = Vec::new();
    walk(doc.root(), &mut edges);

    for edge in edges {
        match edge {
            Edge::Open(node) if node.is_element() => match node.tag_name().name() {
                NODE_CHAPTER => {
                    if open_chapter.is_some() {
                        note(&mut report, doc, node, ParseNoteKind::NestedChapter);
                        continue;
                    }
                    let Some(name) = node.attribute(ATTR_NAME) else {
                        note(&mut report, doc, node, ParseNoteKind::MissingChapterName);
                        continue;
                    };
                    if chapters.contains_key(name) {
                        note(&mut report, doc, node, ParseNoteKind::DuplicateChapter);
                        continue;
                    }
                    debug!(source = source_name, chapter = name, "chapter_opened");
                    open_chapter = Some(Chapter::new(name));
                }
                NODE_LEVEL => {
                    if open_chapter.is_none() {
                        note(&mut report, doc, node, ParseNoteKind::LevelOutsideChapter);
                        continue;
                    }
                    if pending_level.is_some() {
                        note(&mut report, doc, node, ParseNoteKind::NestedLevel);
                        continue;
                    }
                    let (Some(name), Some(raw_lives)) =
                        (node.attribute(ATTR_NAME), node.attribute(ATTR_LIVES))
                    else {
                        note(&mut report, doc, node, ParseNoteKind::MissingLevelAttribute);
                        continue;
                    };
                    let lives = match raw_lives.trim().parse::<i32>() {
                        Ok(value) => value,
                        Err(_) => {
                            note(&mut report, doc, node, ParseNoteKind::InvalidLives);
                            0
                        }
                    };
                    pending_level = Some(PendingLevel {
                        name: name.to_string(),
                        lives,
                    });
                }
                _ => {}
            },
            Edge::Close(node) if node.is_element() => match node.tag_name().name() {
                NODE_CHAPTER => {
                    let Some(chapter) = open_chapter.take() else {
                        continue;
                    };
                    debug!(
                        source = source_name,
                        chapter = chapter.name(),
                        level_count = chapter.level_count(),
                        "chapter_committed"
                    );
                    report.chapters_added.push(chapter.name().to_string());
                    chapters
                        .entry(chapter.name().to_string())
                        .or_insert(chapter);
                }
                NODE_LEVEL => {
                    let Some(chapter) = open_chapter.as_mut() else {
                        continue;
                    };
                    let Some(level) = pending_level.take() else {
                        continue;
                    };
                    debug!(
                        source = source_name,
                        chapter = chapter.name(),
                        level = %level.name,
                        lives = level.lives,
                        "level_added"
                    );
                    chapter.add_or_update_level(level.name, level.lives);
                }
                _ => {}
            },
            _ => {}
        }
    }

    report
}

fn walk<'a, 'input>(node: Node<'a, 'input>, edges: &mut Vec<Edge<'a, 'input>>) {
    edges.push(Edge::Open(node));
    for child in node.children() {
        walk(child, edges);
    }
    edges.push(Edge::Close(node));
}

fn note(report: &mut ParseReport, doc: &Document<'_>, node: Node<'_, '_>, kind: ParseNoteKind) {
    let pos = doc.text_pos_at(node.range().start);
    let location = SourceLocation {
        line: pos.row as usize,
        column: pos.col as usize,
    };
    debug!(
        source = %report.source_name,
        kind = ?kind,
        line = location.line,
        column = location.column,
        "config_fragment_skipped"
    );
    report.notes.push(ParseNote { kind, location });
}

/// Cuts `raw` after the last chapter that closes before `fault_offset` and
/// closes the root element again. Falls back to an empty root.
fn well_formed_prefix(raw: &str, fault_offset: usize) -> Option<String> {
    let (root_name, root_open_end) = root_start_tag(raw)?;
    if root_name == NODE_CHAPTER || root_open_end > fault_offset {
        return None;
    }

    let before_fault = &raw[..fault_offset];
    let closing = format!("</{NODE_CHAPTER}");
    let mut cuts = vec![root_open_end];
    for (start, _) in before_fault.match_indices(&closing) {
        let rest = &before_fault[start + closing.len()..];
        if !rest.starts_with(|c: char| c == '>' || c.is_whitespace()) {
            continue;
        }
        if let Some(end) = rest.find('>') {
            cuts.push(start + closing.len() + end + 1);
        }
    }

    cuts.into_iter().rev().find_map(|cut| {
        let candidate = format!("{}</{}>", &raw[..cut], root_name);
        Document::parse(&candidate).is_ok().then_some(candidate)
    })
}

fn root_start_tag(raw: &str) -> Option<(&str, usize)> {
    let mut from = 0;
    loop {
        let lt = from + raw[from..].find('<')?;
        let after = &raw[lt + 1..];
        if after.starts_with('?') || after.starts_with('!') {
            from = lt + 1;
            continue;
        }
        let name_len = after.find(|c: char| c.is_whitespace() || c == '/' || c == '>')?;
        let tag_len = after.find('>')?;
        if name_len == 0 || after[..tag_len].ends_with('/') {
            return None;
        }
        return Some((&after[..name_len], lt + 1 + tag_len + 1));
    }
}

fn byte_offset(raw: &str, location: SourceLocation) -> usize {
    let mut line_start = 0;
    for _ in 1..location.line {
        match raw[line_start..].find('\n') {
            Some(idx) => line_start += idx + 1,
            None => return raw.len(),
        }
    }
    raw[line_start..]
        .char_indices()
        .nth(location.column.saturating_sub(1))
        .map_or(raw.len(), |(idx, _)| line_start + idx)
}
