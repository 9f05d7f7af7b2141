//! Lesson discovery and rendering.
//!
//! A course's lessons live one-per-subdirectory under
//! `<content>/unterlagen/<slug>/`; a subdirectory qualifies as a lesson iff
//! it contains an `index.md`. The entry document may start with a YAML
//! front-matter block delimited by `---` lines.
//!
//! Leniency policy: malformed front-matter degrades to empty metadata with
//! the whole document as body. A single bad lesson must never take down the
//! course listing, so parse errors here are swallowed by design — unlike the
//! JSON content loader, which propagates them.

use std::path::{Path, PathBuf};

use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default sort order for lessons without an explicit `order`, pushing them
/// past any numbered lesson.
pub const DEFAULT_ORDER: i64 = 999;

const ENTRY_DOCUMENT: &str = "index.md";

/// Metadata for one lesson, derived from its front-matter on every listing
/// call; nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LessonMeta {
    /// Lesson id; defaults to the folder name.
    pub id: String,
    /// Display title; `title`, then `titel`, then the folder name.
    pub title: String,
    /// Sort key, ascending; unspecified lessons get [`DEFAULT_ORDER`].
    pub order: i64,
    /// Free-form date string, if the author supplied one.
    pub date: Option<String>,
    /// The folder the lesson was read from.
    pub folder: String,
}

/// A fully rendered lesson.
#[derive(Debug, Clone)]
pub struct RenderedLesson {
    pub meta: LessonMeta,
    pub html: String,
    pub folder: String,
}

/// Recognized front-matter keys. Everything else is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    id: Option<String>,
    title: Option<String>,
    titel: Option<String>,
    order: Option<i64>,
    date: Option<String>,
}

/// Reads lesson folders beneath a course-materials root.
#[derive(Debug, Clone)]
pub struct LessonLibrary {
    root: PathBuf,
}

impl LessonLibrary {
    /// Create a library rooted at the materials directory
    /// (`<content>/unterlagen`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding a course's lesson folders and shared assets.
    pub fn course_dir(&self, slug: &str) -> PathBuf {
        self.root.join(slug)
    }

    /// List a course's lessons, sorted by `(order ascending, id ascending)`.
    ///
    /// An unknown course yields an empty list, not an error.
    pub fn list_lessons(&self, slug: &str) -> Vec<LessonMeta> {
        let dir = self.course_dir(slug);
        let mut lessons: Vec<LessonMeta> = lesson_folders(&dir)
            .into_iter()
            .filter_map(|folder| {
                let text = std::fs::read_to_string(folder.join(ENTRY_DOCUMENT)).ok()?;
                let folder_name = folder.file_name()?.to_string_lossy().into_owned();
                let (fm, _) = split_front_matter(&text);
                Some(meta_from(fm, folder_name))
            })
            .collect();

        lessons.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        debug!(slug, count = lessons.len(), "Listed lessons");
        lessons
    }

    /// Render one lesson to HTML.
    ///
    /// Resolution order: (1) exact folder name, (2) scan folders in lexical
    /// order and match on the front-matter `id`. Lexical scanning makes the
    /// winner deterministic when several folders claim the same id: the
    /// lexically-smallest folder wins.
    ///
    /// Missing course or lesson yields `None`, never an error.
    pub fn render_lesson(&self, slug: &str, lesson_id: &str) -> Option<RenderedLesson> {
        let dir = self.course_dir(slug);

        let exact = dir.join(lesson_id).join(ENTRY_DOCUMENT);
        if exact.is_file() {
            return self.render_entry(&exact, lesson_id.to_string());
        }

        for folder in lesson_folders(&dir) {
            let entry = folder.join(ENTRY_DOCUMENT);
            let Ok(text) = std::fs::read_to_string(&entry) else {
                continue;
            };
            let (fm, _) = split_front_matter(&text);
            if fm.id.as_deref() == Some(lesson_id) {
                let folder_name = folder.file_name()?.to_string_lossy().into_owned();
                return self.render_entry(&entry, folder_name);
            }
        }

        None
    }

    fn render_entry(&self, entry: &Path, folder: String) -> Option<RenderedLesson> {
        let text = match std::fs::read_to_string(entry) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %entry.display(), error = %e, "Failed to read lesson entry");
                return None;
            }
        };
        let (fm, body) = split_front_matter(&text);
        let meta = meta_from(fm, folder.clone());
        Some(RenderedLesson {
            meta,
            html: render_markdown(body),
            folder,
        })
    }
}

/// Subdirectories containing an entry document, in lexical order.
fn lesson_folders(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut folders: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir() && p.join(ENTRY_DOCUMENT).is_file())
        .collect();
    folders.sort();
    folders
}

fn meta_from(fm: FrontMatter, folder: String) -> LessonMeta {
    LessonMeta {
        id: fm.id.unwrap_or_else(|| folder.clone()),
        title: fm
            .title
            .or(fm.titel)
            .unwrap_or_else(|| folder.clone()),
        order: fm.order.unwrap_or(DEFAULT_ORDER),
        date: fm.date,
        folder,
    }
}

/// Split an entry document into front-matter and body.
///
/// Front-matter is a leading `---` line, a YAML block, and a closing `---`
/// line. No delimiter → empty metadata, whole document as body. Malformed
/// YAML → empty metadata (the leniency policy documented above).
fn split_front_matter(text: &str) -> (FrontMatter, &str) {
    let Some(rest) = text.strip_prefix("---") else {
        return (FrontMatter::default(), text);
    };
    match rest.split_once("\n---") {
        Some((block, body)) => {
            let fm = serde_yaml::from_str(block).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring malformed lesson front-matter");
                FrontMatter::default()
            });
            (fm, body.trim_start_matches(['\r', '\n']).trim_end())
        }
        // Opening delimiter without a closing one: treat as body text.
        None => (FrontMatter::default(), text),
    }
}

/// Markdown→HTML with the extended syntax lessons actually use: tables,
/// fenced code, strikethrough, footnotes, task lists.
///
/// Output is not sanitized here; lesson sources are operator-authored.
pub fn render_markdown(body: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(body, options);
    let mut out = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
