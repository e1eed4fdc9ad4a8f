use serde::{Deserialize, Serialize};

/// Upper bound on posts considered for a single classification
pub const MAX_POSTS: usize = 50;

/// Input of one classification call: optional bio plus recent posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub bio: Option<String>,
    pub posts: Vec<String>,
}

impl EvaluationRequest {
    /// Normalizes the inputs: blank bio becomes `None`, posts are trimmed,
    /// blank posts dropped, and only the first [`MAX_POSTS`] kept.
    pub fn new<I, S>(bio: Option<String>, posts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bio = bio
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        let posts = posts
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .take(MAX_POSTS)
            .collect();

        Self { bio, posts }
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
