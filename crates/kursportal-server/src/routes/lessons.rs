//! Course material endpoints: lesson listing and rendered lessons.
//!
//! Materials hang off the course catalog: every route here first resolves
//! the slug against the visible courses, so hidden and unknown courses do
//! not leak content.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use kursportal_content::{LessonMeta, rewrite_links};

use crate::error::{Result, ServerError};
use crate::state::AppState;

use super::courses::CourseListResponse;

// ── Response types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LessonListResponse {
    pub kurs: String,
    pub lektionen: Vec<LessonMeta>,
}

#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub kurs: String,
    pub meta: LessonMeta,
    pub html: String,
}

// ── Handlers ────────────────────────────────────────────────────────

/// Index of visible courses that have published materials.
pub async fn list_material_courses(
    State(state): State<AppState>,
) -> Result<Json<CourseListResponse>> {
    let kurse = state
        .visible_courses()?
        .into_iter()
        .filter(|c| state.lessons.course_dir(&c.id).is_dir())
        .collect();
    Ok(Json(CourseListResponse { kurse }))
}

/// List a course's lessons in teaching order.
pub async fn list_lessons(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<LessonListResponse>> {
    state.visible_course(&slug)?;
    let lektionen = state.lessons.list_lessons(&slug);
    Ok(Json(LessonListResponse {
        kurs: slug,
        lektionen,
    }))
}

/// One lesson, rendered to HTML with asset links pointing at the media
/// route.
pub async fn get_lesson(
    State(state): State<AppState>,
    Path((slug, lesson_id)): Path<(String, String)>,
) -> Result<Json<LessonResponse>> {
    state.visible_course(&slug)?;
    let lesson = state.lessons.render_lesson(&slug, &lesson_id).ok_or_else(|| {
        ServerError::NotFound(format!("Lektion '{}' in '{}' nicht gefunden", lesson_id, slug))
    })?;

    let html = rewrite_links(&lesson.html, &slug, &lesson.folder);
    Ok(Json(LessonResponse {
        kurs: slug,
        meta: lesson.meta,
        html,
    }))
}
