//! Content loading for the Kursportal site.
//!
//! This crate covers everything the portal reads from the content directory:
//! - **JSON documents**: site configuration and course catalogs, resolved
//!   across the `meta/` override tier and the legacy root tier
//! - **Lessons**: per-course Markdown folders with YAML front-matter,
//!   rendered to HTML with relative asset links rewritten to the media route
//! - **TTL cache**: in-process memoization for the loads above
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use kursportal_content::{ContentStore, LessonLibrary, TtlCache, rewrite_links};
//!
//! let store = ContentStore::new("content");
//! let courses = store.load_courses()?;
//!
//! let library = LessonLibrary::new("content/unterlagen");
//! if let Some(lesson) = library.render_lesson("py101", "L01") {
//!     let html = rewrite_links(&lesson.html, "py101", &lesson.folder);
//! }
//!
//! let cache: TtlCache<String> = TtlCache::new();
//! cache.set("greeting", "hallo".to_string());
//! assert!(cache.get("greeting", Duration::from_secs(60)).is_some());
//! # Ok::<(), kursportal_content::ContentError>(())
//! ```

pub mod cache;
pub mod content;
pub mod error;
pub mod lessons;
pub mod rewrite;

pub use cache::TtlCache;
pub use content::{course_label, ContentStore, Course};
pub use error::{ContentError, Result};
pub use lessons::{render_markdown, LessonLibrary, LessonMeta, RenderedLesson};
pub use rewrite::rewrite_links;
