//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use kursportal_config::AppConfig;
use kursportal_content::{ContentStore, Course, LessonLibrary, TtlCache};
use kursportal_mailer::Mailer;
use kursportal_registry::ParticipantStore;

use crate::error::{Result, ServerError};
use crate::ratelimit::SlidingWindowLimiter;

/// How long the course catalog and course details stay cached.
pub const CONTENT_TTL: Duration = Duration::from_secs(600);

const COURSES_CACHE_KEY: &str = "courses:all";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,

    /// JSON document loader (site config, course catalog).
    pub content: Arc<ContentStore>,

    /// Lesson loader for course materials.
    pub lessons: Arc<LessonLibrary>,

    /// Memoized course catalog.
    courses: Arc<TtlCache<Vec<Course>>>,

    /// Memoized course detail documents, keyed by course id.
    details: Arc<TtlCache<serde_json::Value>>,

    /// Participant registry (None when no database is configured).
    pub registry: Option<Arc<ParticipantStore>>,

    /// Email delivery (None when no provider is configured).
    pub mailer: Option<Arc<Mailer>>,

    /// Sliding-window limiter for the registration endpoint.
    pub limiter: Arc<SlidingWindowLimiter>,
}

impl AppState {
    /// Create a new application state with content loading wired up.
    pub fn new(config: AppConfig, content: ContentStore, lessons: LessonLibrary) -> Self {
        Self {
            config: Arc::new(config),
            content: Arc::new(content),
            lessons: Arc::new(lessons),
            courses: Arc::new(TtlCache::new()),
            details: Arc::new(TtlCache::new()),
            registry: None,
            mailer: None,
            limiter: Arc::new(SlidingWindowLimiter::new()),
        }
    }

    /// Attach the participant registry.
    pub fn with_registry(mut self, registry: ParticipantStore) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// Attach the mailer.
    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = Some(Arc::new(mailer));
        self
    }

    /// The full course catalog, cached for [`CONTENT_TTL`].
    pub fn load_courses(&self) -> Result<Vec<Course>> {
        self.courses
            .get_or_try_insert_with(COURSES_CACHE_KEY, CONTENT_TTL, || {
                self.content.load_courses()
            })
            .map_err(Into::into)
    }

    /// Courses with the hidden ones filtered out.
    pub fn visible_courses(&self) -> Result<Vec<Course>> {
        Ok(self
            .load_courses()?
            .into_iter()
            .filter(|c| c.visible)
            .collect())
    }

    /// Look up one visible course by id; unknown and hidden ids both come
    /// back as a 404.
    pub fn visible_course(&self, id: &str) -> Result<Course> {
        self.visible_courses()?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ServerError::NotFound(format!("Kurs '{}' nicht gefunden", id)))
    }

    /// The merged detail document for one course, cached per course id.
    pub fn course_detail(&self, course: &Course) -> Result<serde_json::Value> {
        self.details
            .get_or_try_insert_with(&course.id, CONTENT_TTL, || {
                self.content.course_detail(course)
            })
            .map_err(Into::into)
    }

    /// The participant registry, or a 503 if no database is configured.
    pub fn registry(&self) -> Result<&Arc<ParticipantStore>> {
        self.registry
            .as_ref()
            .ok_or_else(|| ServerError::ServiceUnavailable("DB nicht konfiguriert".to_string()))
    }
}
