use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A todo as stored in the `todo` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub completed: bool,
    #[serde(
        rename = "createdAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// New todos always start incomplete, whatever the client sent.
    pub fn new(title: String) -> Self {
        Self {
            id: ObjectId::new(),
            title,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Fields an update may touch. `created_at` is deliberately absent.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoChanges {
    pub title: String,
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, Bson};

    #[test]
    fn new_todo_is_incomplete() {
        let todo = Todo::new("buy milk".to_string());
        assert!(!todo.completed);
        assert_eq!(todo.title, "buy milk");
    }

    #[test]
    fn new_todos_get_distinct_ids() {
        let a = Todo::new("a".to_string());
        let b = Todo::new("b".to_string());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn stores_with_native_types() {
        let todo = Todo::new("write tests".to_string());
        let doc = bson::to_document(&todo).unwrap();

        assert!(matches!(doc.get("_id"), Some(Bson::ObjectId(id)) if *id == todo.id));
        assert!(matches!(doc.get("createdAt"), Some(Bson::DateTime(_))));
        assert_eq!(doc.get_str("title").unwrap(), "write tests");
        assert!(!doc.get_bool("completed").unwrap());
    }
}
