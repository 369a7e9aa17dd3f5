//! Lesson catalog reads.

use serde::{Deserialize, Serialize};

use crate::error::{LabError, LabResult};
use crate::rowstore::{Filter, Row, RowStore, SelectQuery};

pub const LESSONS_TABLE: &str = "lessons";
pub const EXERCISES_TABLE: &str = "exercises";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub order_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub lesson_id: i64,
    pub title: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub points: u32,
}

fn decode<T: serde::de::DeserializeOwned>(table: &str, rows: Vec<Row>) -> LabResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(serde_json::Value::Object(row))
                .map_err(|e| LabError::Decode(format!("{} row: {}", table, e)))
        })
        .collect()
}

/// Published lessons in catalog order
pub fn published_lessons<R: RowStore + ?Sized>(store: &R) -> LabResult<Vec<Lesson>> {
    let query = SelectQuery::from(LESSONS_TABLE)
        .filter(Filter::eq("is_published", true))
        .order_by("order_index", true);
    let lessons: Vec<Lesson> = decode(LESSONS_TABLE, store.select(&query)?)?;
    tracing::debug!(count = lessons.len(), "Loaded published lessons");
    Ok(lessons)
}

/// Exercises of one lesson, oldest first
pub fn lesson_exercises<R: RowStore + ?Sized>(store: &R, lesson_id: i64) -> LabResult<Vec<Exercise>> {
    let query = SelectQuery::from(EXERCISES_TABLE)
        .filter(Filter::eq("lesson_id", lesson_id))
        .order_by("id", true);
    decode(EXERCISES_TABLE, store.select(&query)?)
}
