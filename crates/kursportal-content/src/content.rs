//! JSON content documents and the course catalogue.
//!
//! Documents resolve across a two-tier search path: `<root>/meta/<name>`
//! first, then `<root>/<name>`. The `meta/` tier lets operators override
//! individual documents without touching the bulk legacy data underneath.
//!
//! This layer does no caching; callers that need memoization wrap their
//! loads with [`crate::cache::TtlCache`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ContentError, Result};

/// Preferred course catalogue document.
pub const COURSES_DOC: &str = "courses.json";
/// Legacy catalogue name, consulted when [`COURSES_DOC`] is absent.
pub const LEGACY_COURSES_DOC: &str = "alle_kurse.json";

/// A course catalogue entry.
///
/// Only the fields the service itself interprets are typed; everything else
/// (price, status, schedule…) is carried in `extra` and round-trips through
/// the JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub label: String,
    /// Courses are listed unless explicitly hidden.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Preferred detail-document slug, overriding `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beschreibung_slug: Option<String>,
    /// Course type, second fallback for the detail document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Resolves JSON documents against the two-tier content directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    content_dir: PathBuf,
    meta_dir: PathBuf,
}

impl ContentStore {
    /// Create a store rooted at the content directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let content_dir = root.into();
        let meta_dir = content_dir.join("meta");
        Self {
            content_dir,
            meta_dir,
        }
    }

    /// The content root this store reads from.
    pub fn root(&self) -> &Path {
        &self.content_dir
    }

    /// First existing path for `name`, `meta/` winning over the legacy tier.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        [self.meta_dir.join(name), self.content_dir.join(name)]
            .into_iter()
            .find(|p| p.is_file())
    }

    /// Load a JSON document by file name (e.g. `"courses.json"`).
    ///
    /// Missing in both tiers → [`ContentError::NotFound`]. Present but
    /// malformed → [`ContentError::Parse`], propagated untouched.
    pub fn load_json(&self, name: &str) -> Result<Value> {
        let path = self
            .resolve(name)
            .ok_or_else(|| ContentError::NotFound(name.to_string()))?;
        let raw = std::fs::read_to_string(&path)?;
        let doc = serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!(name, path = %path.display(), "Loaded content document");
        Ok(doc)
    }

    /// Load the course catalogue, falling back to the legacy document name.
    pub fn load_courses(&self) -> Result<Vec<Course>> {
        let doc = match self.load_json(COURSES_DOC) {
            Ok(doc) => doc,
            Err(ContentError::NotFound(_)) => self.load_json(LEGACY_COURSES_DOC)?,
            Err(e) => return Err(e),
        };
        serde_json::from_value(doc).map_err(|source| ContentError::Parse {
            path: COURSES_DOC.to_string(),
            source,
        })
    }

    /// Merge a course's base record with its detail document.
    ///
    /// Detail candidates are tried in order — `beschreibung_slug`, `typ`,
    /// the course id — and the first document that exists wins. Detail keys
    /// override base keys. A course without any detail document is returned
    /// as-is; a malformed detail document is an error.
    pub fn course_detail(&self, course: &Course) -> Result<Value> {
        let mut base = serde_json::to_value(course).map_err(|source| ContentError::Parse {
            path: course.id.clone(),
            source,
        })?;

        // Deduplicate while keeping candidate priority.
        let mut candidates: Vec<&str> = Vec::new();
        for cand in [
            course.beschreibung_slug.as_deref(),
            course.typ.as_deref(),
            Some(course.id.as_str()),
        ]
        .into_iter()
        .flatten()
        {
            if !candidates.contains(&cand) {
                candidates.push(cand);
            }
        }

        for name in candidates {
            match self.load_json(&format!("{name}.json")) {
                Ok(Value::Object(detail)) => {
                    if let Value::Object(ref mut merged) = base {
                        for (k, v) in detail {
                            merged.insert(k, v);
                        }
                    }
                    return Ok(base);
                }
                Ok(_) => continue,
                Err(ContentError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(base)
    }
}

fn default_visible() -> bool {
    true
}

/// Human-readable label for a course id, falling back to the id itself.
pub fn course_label<'a>(courses: &'a [Course], id: &'a str) -> &'a str {
    courses
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.label.as_str())
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, ContentStore) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("meta")).unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let store = ContentStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn meta_tier_wins_over_legacy() {
        let (_dir, store) = store_with(&[
            ("courses.json", r#"{"tier": "legacy"}"#),
            ("meta/courses.json", r#"{"tier": "meta"}"#),
        ]);

        let doc = store.load_json("courses.json").unwrap();
        assert_eq!(doc["tier"], "meta");
    }

    #[test]
    fn legacy_tier_is_the_fallback() {
        let (_dir, store) = store_with(&[("home.json", r#"{"tier": "legacy"}"#)]);
        let doc = store.load_json("home.json").unwrap();
        assert_eq!(doc["tier"], "legacy");
    }

    #[test]
    fn missing_document_is_not_found() {
        let (_dir, store) = store_with(&[]);
        let err = store.load_json("nope.json").unwrap_err();
        assert!(matches!(err, ContentError::NotFound(_)));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let (_dir, store) = store_with(&[("bad.json", "{not json")]);
        let err = store.load_json("bad.json").unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
    }

    #[test]
    fn courses_fall_back_to_legacy_name() {
        let (_dir, store) = store_with(&[(
            "alle_kurse.json",
            r#"[{"id": "py101", "label": "Python Grundkurs"},
                {"id": "intern", "label": "Probelauf", "visible": false}]"#,
        )]);

        let courses = store.load_courses().unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].id, "py101");
        // Unspecified visibility means listed.
        assert!(courses[0].visible);
        assert!(!courses[1].visible);
    }

    #[test]
    fn course_extra_fields_round_trip() {
        let (_dir, store) = store_with(&[(
            "courses.json",
            r#"[{"id": "py101", "label": "Python", "visible": true, "preis": "CHF 120"}]"#,
        )]);

        let courses = store.load_courses().unwrap();
        assert_eq!(courses[0].extra["preis"], "CHF 120");
    }

    #[test]
    fn course_detail_merges_first_candidate() {
        let (_dir, store) = store_with(&[(
            "meta/grundkurs.json",
            r#"{"titel": "Grundkurs im Detail", "themen": ["Mail", "Web"]}"#,
        )]);

        let course: Course = serde_json::from_str(
            r#"{"id": "py101", "label": "Python", "visible": true, "beschreibung_slug": "grundkurs"}"#,
        )
        .unwrap();

        let detail = store.course_detail(&course).unwrap();
        // Base fields survive, detail fields are merged on top.
        assert_eq!(detail["id"], "py101");
        assert_eq!(detail["titel"], "Grundkurs im Detail");
        assert_eq!(detail["themen"][0], "Mail");
    }

    #[test]
    fn course_detail_without_document_is_the_base_record() {
        let (_dir, store) = store_with(&[]);
        let course: Course =
            serde_json::from_str(r#"{"id": "py101", "label": "Python", "visible": true}"#).unwrap();

        let detail = store.course_detail(&course).unwrap();
        assert_eq!(detail["label"], "Python");
    }

    #[test]
    fn course_label_falls_back_to_id() {
        let courses = vec![Course {
            id: "py101".into(),
            label: "Python Grundkurs".into(),
            visible: true,
            beschreibung_slug: None,
            typ: None,
            extra: Default::default(),
        }];

        assert_eq!(course_label(&courses, "py101"), "Python Grundkurs");
        assert_eq!(course_label(&courses, "unknown"), "unknown");
    }
}
