use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
}

/// A vendor as the backend returns it. The identifier is assigned by the
/// backend and never generated on this side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(rename = "vendorlogo", default)]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
}

// Older records carry explicit nulls where newer ones omit the key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
