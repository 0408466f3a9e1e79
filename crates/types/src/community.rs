use serde::{Deserialize, Serialize};

/// Private note of the signed-in doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: i64,
    pub author_name: String,
    #[serde(default)]
    pub author_specialty: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub comments: Vec<ForumComment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumComment {
    pub id: i64,
    pub author_name: String,
    #[serde(default)]
    pub author_specialty: Option<String>,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewForumPost {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewForumComment {
    /// Id of the post being answered
    pub post: i64,
    pub content: String,
}
