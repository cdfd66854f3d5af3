//! Source-document representation of header/footer parts

use crate::header_footer::{SectionKind, Variant};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Header/footer content and id tables as imported from the DOCX.
///
/// Id tables map a key (canonical variant, legacy alias, or importer
/// specific name) to a record id. Non-string entries such as
/// `"titlePg": true` carry section flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderFooterStore {
    pub headers: BTreeMap<String, Value>,
    pub footers: BTreeMap<String, Value>,
    pub header_ids: BTreeMap<String, Value>,
    pub footer_ids: BTreeMap<String, Value>,
}

impl HeaderFooterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self, kind: SectionKind) -> &BTreeMap<String, Value> {
        match kind {
            SectionKind::Header => &self.headers,
            SectionKind::Footer => &self.footers,
        }
    }

    pub fn contents_mut(&mut self, kind: SectionKind) -> &mut BTreeMap<String, Value> {
        match kind {
            SectionKind::Header => &mut self.headers,
            SectionKind::Footer => &mut self.footers,
        }
    }

    pub fn ids(&self, kind: SectionKind) -> &BTreeMap<String, Value> {
        match kind {
            SectionKind::Header => &self.header_ids,
            SectionKind::Footer => &self.footer_ids,
        }
    }

    pub fn ids_mut(&mut self, kind: SectionKind) -> &mut BTreeMap<String, Value> {
        match kind {
            SectionKind::Header => &mut self.header_ids,
            SectionKind::Footer => &mut self.footer_ids,
        }
    }

    /// Bind a canonical variant key to a record id
    pub fn set_variant_id(&mut self, kind: SectionKind, variant: Variant, id: &str) {
        self.ids_mut(kind)
            .insert(variant.as_str().to_string(), Value::String(id.to_string()));
    }

    /// True if any id table carries `key: true`
    pub fn flag(&self, key: &str) -> bool {
        SectionKind::ALL.iter().any(|kind| {
            self.ids(*kind)
                .iter()
                .any(|(k, v)| k.eq_ignore_ascii_case(key) && v.as_bool() == Some(true))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_with_missing_tables() {
        let store: HeaderFooterStore =
            serde_json::from_value(json!({"headers": {"h1": {"type": "doc"}}})).unwrap();
        assert_eq!(store.headers.len(), 1);
        assert!(store.footers.is_empty());
        assert!(store.footer_ids.is_empty());
    }

    #[test]
    fn test_flags() {
        let store: HeaderFooterStore = serde_json::from_value(json!({
            "headerIds": {"titlePg": true, "default": "h1"},
            "footerIds": {"evenAndOddHeaders": false}
        }))
        .unwrap();
        assert!(store.flag("titlePg"));
        assert!(!store.flag("evenAndOddHeaders"));
        assert!(!store.flag("default"));
    }

    #[test]
    fn test_set_variant_id() {
        let mut store = HeaderFooterStore::new();
        store.set_variant_id(SectionKind::Footer, Variant::Even, "f2");
        assert_eq!(store.footer_ids["even"], json!("f2"));
    }
}
