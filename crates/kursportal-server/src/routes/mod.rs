//! API routes.

pub mod courses;
pub mod health;
pub mod lessons;
pub mod media;
pub mod openapi;
pub mod participants;
pub mod registration;

pub use courses::{CourseListResponse, get_course, list_courses};
pub use health::{HealthResponse, LivenessResponse, health_routes};
pub use lessons::{
    LessonListResponse, LessonResponse, get_lesson, list_lessons, list_material_courses,
};
pub use media::get_media;
pub use openapi::openapi_json;
pub use participants::{CountResponse, ParticipantListResponse};
pub use registration::{RegistrationRequest, RegistrationResponse, register};
