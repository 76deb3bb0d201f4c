use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: String,
    pub name: String,
    pub area: String,
    pub slug: String,
}

impl Clinic {
    pub fn new(id: &str, name: &str, area: &str, slug: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            area: area.to_string(),
            slug: slug.to_string(),
        }
    }
}
