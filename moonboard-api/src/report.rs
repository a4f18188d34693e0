use crate::CommentId;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    #[serde(rename = "targetId")]
    pub comment: CommentId,
    pub reason: String,
}

impl NewReport {
    pub fn validate(&self, max_len: usize) -> Result<(), crate::Error> {
        if self.reason.trim().is_empty() {
            return Err(crate::Error::Validation(String::from(
                "report reason is empty",
            )));
        }
        if self.reason.chars().count() > max_len {
            return Err(crate::Error::Validation(format!(
                "report reason is longer than {max_len} characters"
            )));
        }
        crate::validate_string(&self.reason)
    }
}
