//! Header/footer records, variant mapping and height cache

use crate::error::RepositoryError;
use crate::header_footer::variant::resolve_variant_id;
use crate::header_footer::{HeaderFooterStore, SectionKind, Variant};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;

/// One header or footer part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFooterRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub content_json: Value,
    pub meta: Map<String, Value>,
    /// Last measured content height; cleared when the record goes dirty
    pub height_px: Option<f64>,
    /// Content changed since the last measurement
    pub dirty: bool,
}

impl HeaderFooterRecord {
    fn new(id: &str, kind: SectionKind, content_json: Value) -> Self {
        Self {
            id: id.to_string(),
            kind,
            content_json,
            meta: Map::new(),
            height_px: None,
            dirty: false,
        }
    }

    /// Variants currently bound to this record
    pub fn variants(&self) -> Vec<Variant> {
        self.meta
            .get("variants")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(|s| s.parse().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn needs_measure(&self) -> bool {
        self.dirty || self.height_px.is_none()
    }
}

/// Partial update for [`HeaderFooterRepository::update`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordUpdate {
    pub content_json: Option<Value>,
    /// Keys merged into the record's meta
    pub meta: Option<Map<String, Value>>,
}

impl RecordUpdate {
    pub fn content(content_json: Value) -> Self {
        Self {
            content_json: Some(content_json),
            meta: None,
        }
    }
}

/// Canonical mapping `kind -> variant -> record id`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariantLookup {
    pub header: BTreeMap<Variant, String>,
    pub footer: BTreeMap<Variant, String>,
}

impl VariantLookup {
    fn slots(&self, kind: SectionKind) -> &BTreeMap<Variant, String> {
        match kind {
            SectionKind::Header => &self.header,
            SectionKind::Footer => &self.footer,
        }
    }

    fn slots_mut(&mut self, kind: SectionKind) -> &mut BTreeMap<Variant, String> {
        match kind {
            SectionKind::Header => &mut self.header,
            SectionKind::Footer => &mut self.footer,
        }
    }

    pub fn get(&self, kind: SectionKind, variant: Variant) -> Option<&str> {
        self.slots(kind).get(&variant).map(String::as_str)
    }

    /// Variants bound to `id`, in canonical order
    pub fn variants_of(&self, kind: SectionKind, id: &str) -> Vec<Variant> {
        self.slots(kind)
            .iter()
            .filter(|(_, bound)| bound.as_str() == id)
            .map(|(variant, _)| *variant)
            .collect()
    }
}

/// Serializable snapshot for persistence and collaboration sync
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderFooterSnapshot {
    pub headers: Vec<HeaderFooterRecord>,
    pub footers: Vec<HeaderFooterRecord>,
}

/// Sole owner of header/footer state.
///
/// Records are never removed; variant changes rebind ids instead.
#[derive(Debug, Clone)]
pub struct HeaderFooterRepository {
    store: HeaderFooterStore,
    records: Vec<HeaderFooterRecord>,
    index: FxHashMap<String, usize>,
    variant_lookup: VariantLookup,
}

impl HeaderFooterRepository {
    /// Seed records and the variant mapping from the source document
    pub fn new(store: HeaderFooterStore) -> Self {
        let mut records = Vec::new();
        let mut index = FxHashMap::default();

        for kind in SectionKind::ALL {
            for (id, content) in store.contents(kind) {
                if index.contains_key(id) {
                    log::warn!("Duplicate header/footer id `{id}` ({kind}), keeping the first");
                    continue;
                }
                index.insert(id.clone(), records.len());
                records.push(HeaderFooterRecord::new(id, kind, content.clone()));
            }
        }

        let mut repository = Self {
            store,
            records,
            index,
            variant_lookup: VariantLookup::default(),
        };

        for kind in SectionKind::ALL {
            for variant in Variant::ALL {
                let resolved = resolve_variant_id(repository.store.ids(kind), variant, |id| {
                    repository.record_of_kind(id, kind).is_some()
                })
                .map(str::to_string);
                if let Some(id) = resolved {
                    repository
                        .variant_lookup
                        .slots_mut(kind)
                        .insert(variant, id);
                }
            }
        }

        for idx in 0..repository.records.len() {
            repository.sync_variant_meta(idx);
        }

        log::debug!(
            "Seeded {} header/footer records ({} header slots, {} footer slots)",
            repository.records.len(),
            repository.variant_lookup.header.len(),
            repository.variant_lookup.footer.len(),
        );

        repository
    }

    /// Records in seeding order, optionally filtered by kind
    pub fn list(&self, kind: Option<SectionKind>) -> Vec<&HeaderFooterRecord> {
        self.records
            .iter()
            .filter(|r| kind.map_or(true, |k| r.kind == k))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&HeaderFooterRecord> {
        self.index.get(id).map(|&idx| &self.records[idx])
    }

    pub fn get_by_variant(&self, kind: SectionKind, variant: Variant) -> Option<&HeaderFooterRecord> {
        self.variant_lookup
            .get(kind, variant)
            .and_then(|id| self.record_of_kind(id, kind))
    }

    /// Apply a partial update; new content marks the record dirty and is
    /// mirrored into the source store.
    ///
    /// `meta.variants` always reflects the variant lookup; a caller-supplied
    /// value for it is overwritten. Use `assign_variant` to rebind slots.
    pub fn update(&mut self, id: &str, update: RecordUpdate) -> Option<&HeaderFooterRecord> {
        let idx = *self.index.get(id)?;
        let record = &mut self.records[idx];

        if let Some(content) = update.content_json {
            self.store
                .contents_mut(record.kind)
                .insert(record.id.clone(), content.clone());
            record.content_json = content;
            record.dirty = true;
            record.height_px = None;
        }
        if let Some(meta) = update.meta {
            record.meta.extend(meta);
            self.sync_variant_meta(idx);
        }

        Some(&self.records[idx])
    }

    /// Cache a measured height. Non-finite or negative heights are rejected
    /// and leave the record untouched.
    pub fn set_height(&mut self, id: &str, px: f64) -> bool {
        let Some(&idx) = self.index.get(id) else {
            return false;
        };
        if !px.is_finite() || px < 0.0 {
            log::warn!("Ignoring invalid height {px} for header/footer `{id}`");
            return false;
        }
        let record = &mut self.records[idx];
        record.height_px = Some(px);
        record.dirty = false;
        true
    }

    pub fn get_height(&self, id: &str) -> Option<f64> {
        self.get(id).and_then(|r| r.height_px)
    }

    /// Drop the cached height and flag the record for re-measurement
    pub fn mark_dirty(&mut self, id: &str) -> Option<&HeaderFooterRecord> {
        let idx = *self.index.get(id)?;
        let record = &mut self.records[idx];
        record.dirty = true;
        record.height_px = None;
        Some(&*record)
    }

    /// Return the cached height, measuring first when dirty or unset.
    ///
    /// A non-finite measurement is logged and the previous cache value
    /// (possibly `None`) is returned.
    pub async fn ensure_measured<F, Fut>(&mut self, id: &str, measure: F) -> Option<f64>
    where
        F: FnOnce(HeaderFooterRecord) -> Fut,
        Fut: Future<Output = f64>,
    {
        let record = self.get(id)?;
        if !record.needs_measure() {
            return record.height_px;
        }

        let measured = measure(record.clone()).await;
        if self.set_height(id, measured) {
            Some(measured)
        } else {
            self.get_height(id)
        }
    }

    /// Rebind a canonical variant slot to an existing record
    pub fn assign_variant(
        &mut self,
        kind: SectionKind,
        variant: Variant,
        id: &str,
    ) -> Result<(), RepositoryError> {
        let idx = self
            .index
            .get(id)
            .copied()
            .filter(|&idx| self.records[idx].kind == kind)
            .ok_or_else(|| RepositoryError::UnknownRecord {
                kind,
                id: id.to_string(),
            })?;

        let previous = self
            .variant_lookup
            .slots_mut(kind)
            .insert(variant, id.to_string());
        self.store.set_variant_id(kind, variant, id);

        if let Some(prev_idx) = previous.and_then(|prev| self.index.get(&prev).copied()) {
            self.sync_variant_meta(prev_idx);
        }
        self.sync_variant_meta(idx);
        Ok(())
    }

    pub fn variant_lookup(&self) -> &VariantLookup {
        &self.variant_lookup
    }

    /// The mirrored source-document representation
    pub fn store(&self) -> &HeaderFooterStore {
        &self.store
    }

    pub fn into_store(self) -> HeaderFooterStore {
        self.store
    }

    pub fn to_json(&self) -> HeaderFooterSnapshot {
        let collect = |kind| -> Vec<HeaderFooterRecord> {
            self.list(Some(kind)).into_iter().cloned().collect()
        };
        HeaderFooterSnapshot {
            headers: collect(SectionKind::Header),
            footers: collect(SectionKind::Footer),
        }
    }

    fn record_of_kind(&self, id: &str, kind: SectionKind) -> Option<&HeaderFooterRecord> {
        self.get(id).filter(|r| r.kind == kind)
    }

    fn sync_variant_meta(&mut self, idx: usize) {
        let record = &self.records[idx];
        let variants: Vec<Value> = self
            .variant_lookup
            .variants_of(record.kind, &record.id)
            .into_iter()
            .map(|v| Value::String(v.as_str().to_string()))
            .collect();

        let meta = &mut self.records[idx].meta;
        if variants.is_empty() {
            meta.remove("variants");
        } else {
            meta.insert("variants".to_string(), Value::Array(variants));
        }
    }
}
