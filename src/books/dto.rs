use serde::Deserialize;

/// Request body for creating or replacing a book. The catalog has no
/// field constraints beyond well-formed JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub price: i32,
    pub stock: i32,
}
