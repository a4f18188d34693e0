/// Success payload of a like or unlike call
///
/// Both fields are optional: a board may answer with an empty body.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked_by_me: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
}

/// Which call a like toggle turns into
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LikeIntent {
    Like,
    Unlike,
}

impl LikeIntent {
    /// The call that flips a comment currently liked (or not) by the viewer
    pub fn toggling(currently_liked: bool) -> LikeIntent {
        match currently_liked {
            true => LikeIntent::Unlike,
            false => LikeIntent::Like,
        }
    }

    /// Value of `likedByMe` once the call went through
    pub fn target(&self) -> bool {
        matches!(self, LikeIntent::Like)
    }
}
