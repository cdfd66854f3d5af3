//! Per-page header/footer resolution

use crate::header_footer::{
    HeaderFooterRecord, HeaderFooterRepository, HeaderFooterStore, SectionKind, Variant,
};
use serde::{Deserialize, Serialize};

/// Extra facts about the page being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveContext {
    pub is_last_page: bool,
}

/// Vertical space a header or footer claims on the page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionHeightMetrics {
    pub content_height_px: f64,
    /// Distance between the page edge and the section content
    pub distance_px: f64,
    /// Always `distance_px + content_height_px`
    pub effective_height_px: f64,
}

impl SectionHeightMetrics {
    pub fn new(content_height_px: f64, distance_px: f64) -> Self {
        Self {
            content_height_px,
            distance_px,
            effective_height_px: distance_px + content_height_px,
        }
    }
}

/// Header or footer selected for a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMetrics {
    pub id: String,
    pub metrics: SectionHeightMetrics,
    pub height_px: Option<f64>,
}

impl SectionMetrics {
    pub fn new(id: impl Into<String>, content_height_px: f64, distance_px: f64) -> Self {
        Self {
            id: id.into(),
            metrics: SectionHeightMetrics::new(content_height_px, distance_px),
            height_px: Some(content_height_px),
        }
    }

    /// Effective height, if usable for margin resolution
    pub fn effective_height(&self) -> Option<f64> {
        Some(self.metrics.effective_height_px).filter(|h| h.is_finite())
    }
}

/// Header and footer applying to one page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSections {
    pub header: Option<SectionMetrics>,
    pub footer: Option<SectionMetrics>,
}

impl ResolvedSections {
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.footer.is_none()
    }

    pub fn get(&self, kind: SectionKind) -> Option<&SectionMetrics> {
        match kind {
            SectionKind::Header => self.header.as_ref(),
            SectionKind::Footer => self.footer.as_ref(),
        }
    }
}

/// Pull-based source of per-page header/footer metrics.
///
/// Called once per candidate page, and once more for the final page with
/// `is_last_page` set.
pub trait ResolveHeaderFooter {
    fn resolve(&mut self, page_index: usize, ctx: ResolveContext) -> ResolvedSections;
}

impl<F> ResolveHeaderFooter for F
where
    F: FnMut(usize, ResolveContext) -> ResolvedSections,
{
    fn resolve(&mut self, page_index: usize, ctx: ResolveContext) -> ResolvedSections {
        self(page_index, ctx)
    }
}

/// Resolver for documents without headers or footers
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSections;

impl ResolveHeaderFooter for NoSections {
    fn resolve(&mut self, _page_index: usize, _ctx: ResolveContext) -> ResolvedSections {
        ResolvedSections::default()
    }
}

/// Section-level switches controlling variant selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionSettings {
    /// `w:titlePg`: the first page uses the `first` variant
    pub different_first_page: bool,
    /// `w:evenAndOddHeaders`: even pages use the `even` variant
    pub different_odd_even: bool,
    pub header_distance_px: f64,
    pub footer_distance_px: f64,
}

impl Default for SectionSettings {
    fn default() -> Self {
        Self {
            different_first_page: false,
            different_odd_even: false,
            header_distance_px: 48.0, // 0.5" at 96 DPI
            footer_distance_px: 48.0,
        }
    }
}

impl SectionSettings {
    /// Read the section flags carried in the store's id tables
    pub fn from_store(store: &HeaderFooterStore) -> Self {
        Self {
            different_first_page: store.flag("titlePg"),
            different_odd_even: store.flag("evenAndOddHeaders") || store.flag("alternateHeaders"),
            ..Self::default()
        }
    }

    fn distance(&self, kind: SectionKind) -> f64 {
        match kind {
            SectionKind::Header => self.header_distance_px,
            SectionKind::Footer => self.footer_distance_px,
        }
    }
}

/// Resolves headers/footers per page from a repository, the way a word
/// processor picks them for a section
pub struct SectionResolver<'a> {
    repository: &'a HeaderFooterRepository,
    settings: SectionSettings,
}

impl<'a> SectionResolver<'a> {
    pub fn new(repository: &'a HeaderFooterRepository, settings: SectionSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Record applying to `page_index` (0-based)
    pub fn select(
        &self,
        kind: SectionKind,
        page_index: usize,
        ctx: ResolveContext,
    ) -> Option<&'a HeaderFooterRecord> {
        let repo = self.repository;
        if ctx.is_last_page {
            if let Some(record) = repo.get_by_variant(kind, Variant::Last) {
                return Some(record);
            }
        }
        if page_index == 0 && self.settings.different_first_page {
            return repo.get_by_variant(kind, Variant::First);
        }
        if self.settings.different_odd_even {
            // page_index 1 is the second, even-numbered page
            if page_index % 2 == 1 {
                return repo.get_by_variant(kind, Variant::Even);
            }
            return repo
                .get_by_variant(kind, Variant::Odd)
                .or_else(|| repo.get_by_variant(kind, Variant::Default));
        }
        repo.get_by_variant(kind, Variant::Default)
    }

    fn metrics(&self, kind: SectionKind, page_index: usize, ctx: ResolveContext) -> Option<SectionMetrics> {
        let record = self.select(kind, page_index, ctx)?;
        let content = record.height_px.unwrap_or(0.0);
        Some(SectionMetrics {
            id: record.id.clone(),
            metrics: SectionHeightMetrics::new(content, self.settings.distance(kind)),
            height_px: record.height_px,
        })
    }
}

impl ResolveHeaderFooter for SectionResolver<'_> {
    fn resolve(&mut self, page_index: usize, ctx: ResolveContext) -> ResolvedSections {
        ResolvedSections {
            header: self.metrics(SectionKind::Header, page_index, ctx),
            footer: self.metrics(SectionKind::Footer, page_index, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repository(ids: serde_json::Value) -> HeaderFooterRepository {
        let store: HeaderFooterStore = serde_json::from_value(json!({
            "headers": {"hDefault": {}, "hFirst": {}, "hEven": {}, "hLast": {}},
            "footers": {"fDefault": {}},
            "headerIds": ids,
            "footerIds": {"default": "fDefault"}
        }))
        .unwrap();
        let mut repo = HeaderFooterRepository::new(store);
        repo.set_height("hDefault", 20.0);
        repo.set_height("hFirst", 60.0);
        repo
    }

    const LAST: ResolveContext = ResolveContext { is_last_page: true };
    const NOT_LAST: ResolveContext = ResolveContext { is_last_page: false };

    #[test]
    fn test_metrics_invariant() {
        let m = SectionHeightMetrics::new(30.0, 48.0);
        assert_eq!(m.effective_height_px, m.distance_px + m.content_height_px);
        let s = SectionMetrics::new("h", f64::NAN, 10.0);
        assert_eq!(s.effective_height(), None);
    }

    #[test]
    fn test_default_only() {
        let repo = repository(json!({"default": "hDefault", "first": "hFirst"}));
        let mut resolver = SectionResolver::new(&repo, SectionSettings::default());
        for page in 0..3 {
            let sections = resolver.resolve(page, NOT_LAST);
            assert_eq!(sections.header.unwrap().id, "hDefault");
            assert_eq!(sections.footer.unwrap().id, "fDefault");
        }
    }

    #[test]
    fn test_first_page_variant() {
        let repo = repository(json!({"default": "hDefault", "first": "hFirst"}));
        let settings = SectionSettings {
            different_first_page: true,
            ..SectionSettings::default()
        };
        let mut resolver = SectionResolver::new(&repo, settings);

        let first = resolver.resolve(0, NOT_LAST).header.unwrap();
        assert_eq!(first.id, "hFirst");
        assert_eq!(first.metrics.effective_height_px, 108.0);
        assert_eq!(resolver.resolve(1, NOT_LAST).header.unwrap().id, "hDefault");
        // no first footer bound: the first page has none
        assert!(resolver.resolve(0, NOT_LAST).footer.is_none());
    }

    #[test]
    fn test_odd_even_pages() {
        let repo = repository(json!({"default": "hDefault", "even": "hEven"}));
        let settings = SectionSettings {
            different_odd_even: true,
            ..SectionSettings::default()
        };
        let resolver = SectionResolver::new(&repo, settings);
        let ids: Vec<_> = (0..4)
            .map(|p| resolver.select(SectionKind::Header, p, NOT_LAST).unwrap().id.clone())
            .collect();
        assert_eq!(ids, vec!["hDefault", "hEven", "hDefault", "hEven"]);
    }

    #[test]
    fn test_last_page_variant() {
        let repo = repository(json!({"default": "hDefault", "lastPage": "hLast"}));
        let resolver = SectionResolver::new(&repo, SectionSettings::default());
        assert_eq!(resolver.select(SectionKind::Header, 4, NOT_LAST).unwrap().id, "hDefault");
        assert_eq!(resolver.select(SectionKind::Header, 4, LAST).unwrap().id, "hLast");
        // footer has no last variant and keeps its default
        assert_eq!(resolver.select(SectionKind::Footer, 4, LAST).unwrap().id, "fDefault");
    }

    #[test]
    fn test_unmeasured_record_contributes_distance_only() {
        let repo = repository(json!({"default": "hDefault"}));
        let mut resolver = SectionResolver::new(&repo, SectionSettings::default());
        let footer = resolver.resolve(0, NOT_LAST).footer.unwrap();
        assert_eq!(footer.height_px, None);
        assert_eq!(footer.metrics.effective_height_px, 48.0);
    }

    #[test]
    fn test_settings_from_store() {
        let store: HeaderFooterStore = serde_json::from_value(json!({
            "headerIds": {"titlePg": true},
            "footerIds": {"alternateHeaders": true}
        }))
        .unwrap();
        let settings = SectionSettings::from_store(&store);
        assert!(settings.different_first_page);
        assert!(settings.different_odd_even);
    }

    #[test]
    fn test_closure_resolver() {
        let mut calls = Vec::new();
        let mut resolver = |page: usize, ctx: ResolveContext| {
            calls.push((page, ctx.is_last_page));
            ResolvedSections::default()
        };
        assert!(resolver.resolve(3, LAST).is_empty());
        assert_eq!(calls, vec![(3, true)]);
    }
}
