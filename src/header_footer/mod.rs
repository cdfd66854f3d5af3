//! Header/footer ownership: records, variants, heights and per-page resolution

mod repository;
mod resolver;
mod store;
pub mod variant;

pub use repository::{
    HeaderFooterRecord, HeaderFooterRepository, HeaderFooterSnapshot, RecordUpdate, VariantLookup,
};
pub use resolver::{
    NoSections, ResolveContext, ResolveHeaderFooter, ResolvedSections, SectionHeightMetrics,
    SectionMetrics, SectionResolver, SectionSettings,
};
pub use store::HeaderFooterStore;
pub use variant::{SectionKind, Variant};
