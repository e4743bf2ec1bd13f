use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TodoId(pub i64);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub target_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTodo {
    pub text: String,
    pub target_date: NaiveDate,
}

/// Which todos a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoFilter {
    /// Due on or after the date, ordered by date then id.
    From(NaiveDate),
    /// Due exactly on the date, ordered by id.
    On(NaiveDate),
}

impl TodoFilter {
    pub fn includes(&self, todo: &Todo) -> bool {
        match *self {
            TodoFilter::From(date) => todo.target_date >= date,
            TodoFilter::On(date) => todo.target_date == date,
        }
    }
}
