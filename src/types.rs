use serde::{Deserialize, Deserializer, Serialize};

/// One catalog entry describing a vehicle fault, its symptoms and where it
/// was reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    /// Empty when the producer left it out; the loader does not check it.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Empty when the producer could not detect a manufacturer (`null` in JSON).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub model: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub error_codes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<String>,
}

/// Ordered sequence of records as published in the shared slot.
pub type Catalog = Vec<ProblemRecord>;

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record_keeps_every_field() {
        let raw = json!({
            "id": "a1",
            "title": "T1",
            "brand": "X",
            "model": "Y",
            "symptoms": ["s1"],
            "error_codes": [],
            "source_url": "http://e",
            "source": "t"
        });

        let record: ProblemRecord = serde_json::from_value(raw).unwrap();

        assert_eq!(record.id, "a1");
        assert_eq!(record.title, "T1");
        assert_eq!(record.brand, "X");
        assert_eq!(record.model, "Y");
        assert_eq!(record.symptoms, vec!["s1"]);
        assert!(record.error_codes.is_empty());
        assert_eq!(record.source_url, "http://e");
        assert_eq!(record.source, "t");
        assert_eq!(record.date_added, None);
    }

    #[test]
    fn test_scraped_record_with_null_brand_and_no_model() {
        let raw = json!({
            "id": "https://drive2.ru/t/1",
            "title": "Не заводится утром",
            "brand": null,
            "symptoms": ["не заводится"],
            "error_codes": [],
            "source_url": "https://drive2.ru/t/1",
            "date_added": "2025-11-29"
        });

        let record: ProblemRecord = serde_json::from_value(raw).unwrap();

        assert_eq!(record.brand, "");
        assert_eq!(record.model, "");
        assert_eq!(record.source, "");
        assert_eq!(record.date_added.as_deref(), Some("2025-11-29"));
    }

    #[test]
    fn test_record_without_id_or_title_still_deserializes() {
        let record: ProblemRecord = serde_json::from_value(json!({ "symptoms": [] })).unwrap();
        assert_eq!(record.id, "");
        assert_eq!(record.title, "");

        let record: ProblemRecord = serde_json::from_value(json!({ "id": "x", "title": null })).unwrap();
        assert_eq!(record.id, "x");
        assert_eq!(record.title, "");
    }

    #[test]
    fn test_date_added_omitted_when_absent() {
        let record = ProblemRecord {
            id: "a1".into(),
            title: "T1".into(),
            brand: "X".into(),
            model: "Y".into(),
            symptoms: vec![],
            error_codes: vec![],
            source_url: "http://e".into(),
            source: "t".into(),
            date_added: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("date_added").is_none());
        assert_eq!(value["error_codes"], json!([]));
    }
}
