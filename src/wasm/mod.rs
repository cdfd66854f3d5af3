//! WASM bindings for the editor

use crate::document::{Document, Node};
use crate::error::ProbeError;
use crate::header_footer::{
    HeaderFooterRepository, HeaderFooterStore, RecordUpdate, ResolveContext, ResolveHeaderFooter,
    ResolvedSections, SectionKind, SectionResolver, SectionSettings, Variant,
};
use crate::pagination::{
    CollectingSink, DiagnosticEntry, PageBreakCalculator, Pagination, PaginationParams,
};
use crate::probe::{CoordinateProbe, Coords};
use crate::Rect;
use js_sys::{Function, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WASM-exposed paginator owning the header/footer repository
#[wasm_bindgen]
pub struct WasmPaginator {
    repository: HeaderFooterRepository,
    params: PaginationParams,
    settings: SectionSettings,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Create a paginator seeded from a header/footer store.
    ///
    /// `null`/`undefined` give an empty repository.
    #[wasm_bindgen(constructor)]
    pub fn new(store: JsValue) -> Result<WasmPaginator, JsError> {
        let store: HeaderFooterStore = if store.is_null() || store.is_undefined() {
            HeaderFooterStore::new()
        } else {
            serde_wasm_bindgen::from_value(store)?
        };
        let settings = SectionSettings::from_store(&store);

        Ok(Self {
            repository: HeaderFooterRepository::new(store),
            params: PaginationParams::default(),
            settings,
        })
    }

    /// Replace page geometry (`{pageHeightPx, marginsPx, startPos}`)
    #[wasm_bindgen(js_name = setParams)]
    pub fn set_params(&mut self, params: JsValue) -> Result<(), JsError> {
        self.params = serde_wasm_bindgen::from_value(params)?;
        Ok(())
    }

    /// Replace the switches used by the built-in header/footer resolver
    #[wasm_bindgen(js_name = setSectionSettings)]
    pub fn set_section_settings(&mut self, settings: JsValue) -> Result<(), JsError> {
        self.settings = serde_wasm_bindgen::from_value(settings)?;
        Ok(())
    }

    /// Compute page breaks for a document rendered by the host.
    ///
    /// `coordsAtPos(pos)` must return `{top, bottom}`; `nodeRect(pos)` may
    /// return a rect-like object or `null`. Without `resolveHeaderFooter`
    /// the repository's own variants are used. Returns
    /// `{pages, truncated, diagnostics}`.
    pub fn paginate(
        &self,
        doc: JsValue,
        coords_at_pos: Function,
        node_rect: Option<Function>,
        resolve_header_footer: Option<Function>,
    ) -> Result<JsValue, JsError> {
        let root: Node = serde_wasm_bindgen::from_value(doc)?;
        let doc = Document::new(root);
        let probe = JsProbe {
            coords_at_pos,
            node_rect,
        };
        let sink = CollectingSink::new();
        let calculator = PageBreakCalculator::new().with_diagnostics(&sink);

        let pagination = match resolve_header_footer {
            Some(callback) => {
                calculator.calculate(&doc, &probe, &self.params, &mut JsResolver { callback })
            }
            None => {
                let mut resolver = SectionResolver::new(&self.repository, self.settings);
                calculator.calculate(&doc, &probe, &self.params, &mut resolver)
            }
        };

        to_js(&PaginateOutput {
            pagination: &pagination,
            diagnostics: sink.take(),
        })
    }

    /// Records in seeding order; `kind` is `"header"`, `"footer"` or omitted
    pub fn list(&self, kind: Option<String>) -> Result<JsValue, JsError> {
        let kind = kind.as_deref().map(parse_kind).transpose()?;
        to_js(&self.repository.list(kind))
    }

    pub fn get(&self, id: &str) -> Result<JsValue, JsError> {
        to_js(&self.repository.get(id))
    }

    #[wasm_bindgen(js_name = getByVariant)]
    pub fn get_by_variant(&self, kind: &str, variant: &str) -> Result<JsValue, JsError> {
        let (kind, variant) = parse_slot(kind, variant)?;
        to_js(&self.repository.get_by_variant(kind, variant))
    }

    /// Apply `{contentJson?, meta?}`; returns the updated record or `null`
    pub fn update(&mut self, id: &str, update: JsValue) -> Result<JsValue, JsError> {
        let update: RecordUpdate = serde_wasm_bindgen::from_value(update)?;
        to_js(&self.repository.update(id, update))
    }

    #[wasm_bindgen(js_name = setHeight)]
    pub fn set_height(&mut self, id: &str, px: f64) -> bool {
        self.repository.set_height(id, px)
    }

    #[wasm_bindgen(js_name = getHeight)]
    pub fn get_height(&self, id: &str) -> Option<f64> {
        self.repository.get_height(id)
    }

    #[wasm_bindgen(js_name = markDirty)]
    pub fn mark_dirty(&mut self, id: &str) -> Result<JsValue, JsError> {
        to_js(&self.repository.mark_dirty(id))
    }

    /// Bind a variant slot to an existing record; throws for unknown ids
    #[wasm_bindgen(js_name = assignVariant)]
    pub fn assign_variant(&mut self, kind: &str, variant: &str, id: &str) -> Result<(), JsError> {
        let (kind, variant) = parse_slot(kind, variant)?;
        self.repository.assign_variant(kind, variant, id)?;
        Ok(())
    }

    /// Snapshot of all records for persistence
    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> Result<JsValue, JsError> {
        to_js(&self.repository.to_json())
    }

    /// The source store with every edit mirrored into it
    pub fn store(&self) -> Result<JsValue, JsError> {
        to_js(self.repository.store())
    }
}

#[derive(Serialize)]
struct PaginateOutput<'a> {
    #[serde(flatten)]
    pagination: &'a Pagination,
    diagnostics: Vec<DiagnosticEntry>,
}

/// Coordinate probe backed by JS callbacks
struct JsProbe {
    coords_at_pos: Function,
    node_rect: Option<Function>,
}

impl CoordinateProbe for JsProbe {
    fn coords_at_pos(&self, pos: usize) -> Result<Coords, ProbeError> {
        let value = self
            .coords_at_pos
            .call1(&JsValue::NULL, &JsValue::from_f64(pos as f64))
            .map_err(host_error)?;
        match (number(&value, "top"), number(&value, "bottom")) {
            (Some(top), Some(bottom)) => Ok(Coords::new(top, bottom)),
            _ => Err(ProbeError::Unrendered { pos }),
        }
    }

    fn node_rect(&self, pos: usize) -> Option<Rect> {
        let value = self
            .node_rect
            .as_ref()?
            .call1(&JsValue::NULL, &JsValue::from_f64(pos as f64))
            .ok()?;
        if value.is_null() || value.is_undefined() {
            return None;
        }
        // DOMRect exposes `x`/`y`; ProseMirror-style rects only `left`/`top`
        let x = number(&value, "x").or_else(|| number(&value, "left"))?;
        let y = number(&value, "y").or_else(|| number(&value, "top"))?;
        Some(Rect::new(
            x,
            y,
            number(&value, "width")?,
            number(&value, "height")?,
        ))
    }
}

/// Header/footer resolution delegated to a JS callback
struct JsResolver {
    callback: Function,
}

impl ResolveHeaderFooter for JsResolver {
    fn resolve(&mut self, page_index: usize, ctx: ResolveContext) -> ResolvedSections {
        let ctx_js = serde_wasm_bindgen::to_value(&ctx).unwrap_or(JsValue::UNDEFINED);
        let value = match self
            .callback
            .call2(&JsValue::NULL, &JsValue::from_f64(page_index as f64), &ctx_js)
        {
            Ok(value) => value,
            Err(e) => {
                log::warn!("resolveHeaderFooter threw for page {page_index}: {e:?}");
                return ResolvedSections::default();
            }
        };
        if value.is_null() || value.is_undefined() {
            return ResolvedSections::default();
        }
        serde_wasm_bindgen::from_value(value).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed header/footer metrics for page {page_index}: {e}");
            ResolvedSections::default()
        })
    }
}

fn number(value: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(value, &JsValue::from_str(key))
        .ok()?
        .as_f64()
}

fn host_error(e: JsValue) -> ProbeError {
    ProbeError::Host(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

fn parse_kind(kind: &str) -> Result<SectionKind, JsError> {
    kind.parse().map_err(|e: String| JsError::new(&e))
}

fn parse_slot(kind: &str, variant: &str) -> Result<(SectionKind, Variant), JsError> {
    let variant = variant.parse().map_err(|e: String| JsError::new(&e))?;
    Ok((parse_kind(kind)?, variant))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use js_sys::Array;
    use serde_json::json;
    use wasm_bindgen_test::wasm_bindgen_test;

    fn ok<T>(result: Result<T, JsError>) -> T {
        result.unwrap_or_else(|_| panic!("binding call failed"))
    }

    fn paginator() -> WasmPaginator {
        let store = json!({
            "headers": {"rIdH1": {"type": "doc", "content": [{"type": "paragraph"}]}},
            "headerIds": {"default": "rIdH1"}
        });
        ok(WasmPaginator::new(ok(to_js(&store))))
    }

    #[wasm_bindgen_test]
    fn test_repository_methods() {
        let mut paginator = paginator();
        assert!(paginator.set_height("rIdH1", 24.0));
        assert_eq!(paginator.get_height("rIdH1"), Some(24.0));
        assert!(!paginator.set_height("rIdH1", f64::NAN));
        assert!(paginator.assign_variant("header", "first", "rIdH1").is_ok());
        assert!(paginator.assign_variant("header", "first", "missing").is_err());
        assert!(ok(paginator.get("missing")).is_null());
    }

    #[wasm_bindgen_test]
    fn test_paginate_with_js_coordinates() {
        let mut paginator = ok(WasmPaginator::new(JsValue::NULL));
        let params = json!({"pageHeightPx": 70, "marginsPx": {"top": 10, "bottom": 10}});
        ok(paginator.set_params(ok(to_js(&params))));

        let doc = json!({"type": "doc", "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": "ab"}]},
            {"type": "paragraph", "content": [{"type": "text", "text": "cd"}]},
            {"type": "paragraph", "content": [{"type": "text", "text": "ef"}]}
        ]});
        let coords = Function::new_with_args("pos", "return { top: pos * 10, bottom: pos * 10 + 10 };");

        let result = ok(paginator.paginate(ok(to_js(&doc)), coords, None, None));
        let pages: Array = Reflect::get(&result, &JsValue::from_str("pages")).unwrap().into();
        assert_eq!(pages.length(), 3);
        let truncated = Reflect::get(&result, &JsValue::from_str("truncated")).unwrap();
        assert_eq!(truncated.as_bool(), Some(false));
    }
}
