//! Building one PDF from a print request.

use crate::blocks::{MapClientConfig, RenderingContext};
use crate::config::PrintConfig;
use crate::error::PrintError;
use crate::spec::PrintSpec;
use crate::transform::DocumentContext;
use log::{debug, info};
use mapsheet_layout::FlowLayout;
use mapsheet_render_core::ContentSink;
use mapsheet_render_lopdf::PdfAssembler;
use mapsheet_traits::LayerSource;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

/// What a client needs to offer sensible choices and reserve room for the
/// map in its own preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientInfo {
    pub scales: Vec<f64>,
    pub dpis: Vec<u32>,
    pub layouts: Vec<LayoutInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapClientConfig>,
}

/// Turns print requests into PDF documents.
///
/// A printer is immutable after construction and can be shared between
/// request threads; every call to [`print`](Self::print) builds its own
/// layout, registry and assembler.
#[derive(Debug)]
pub struct MapPrinter {
    config: PrintConfig,
    layers: Arc<dyn LayerSource>,
}

impl MapPrinter {
    pub fn new(config: PrintConfig, layers: Arc<dyn LayerSource>) -> Result<Self, PrintError> {
        config.validate()?;
        info!(
            "[PRINT] Printer ready with {} layout(s), DPIs {:?}, layer source '{}'.",
            config.layouts.len(),
            config.dpis,
            layers.name()
        );
        Ok(Self { config, layers })
    }

    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    /// Build the document described by `spec` and write it to `out`.
    ///
    /// Nothing is written unless the whole document could be built.
    pub fn print(&self, spec: &PrintSpec, out: &mut dyn Write) -> Result<(), PrintError> {
        let layout = self.config.layout(spec.layout()?.as_deref())?;
        let units = match spec.units()? {
            Some(units) => units,
            None => self.config.default_units()?.ok_or_else(|| PrintError::missing("units"))?,
        };
        let document = DocumentContext {
            allowed_dpis: self.config.dpis.clone(),
            global_dpi: spec.dpi()?,
            units,
        };
        let pages = spec.pages()?;
        info!(
            "[PRINT] Building {} page(s) with layout '{}' in {}.",
            pages.len(),
            layout.name,
            units
        );

        let mut context = RenderingContext::new(document, Arc::clone(&self.layers));
        let mut flow = FlowLayout::new(layout.geometry());
        for (index, page) in pages.iter().enumerate() {
            if index > 0 {
                flow.new_page();
            }
            for block in &layout.main_page.items {
                block.render(page, &mut flow, &mut context)?;
            }
        }

        let mut assembler = PdfAssembler::new(flow.finish());
        let report = context.registry.resolve_all(&mut assembler)?;
        debug!(
            "[PRINT] Deferred blocks: {} in flow, {} absolute, {} dropped.",
            report.flow_rendered, report.absolute_rendered, report.dropped
        );

        let page_count = assembler.page_count();
        let mut out = out;
        assembler.write_to(&mut out)?;
        info!("[PRINT] Document complete: {} page(s).", page_count);
        Ok(())
    }

    /// Parse `json` and print it.
    pub fn print_json(&self, json: &str, out: &mut dyn Write) -> Result<(), PrintError> {
        let spec = PrintSpec::parse(json)?;
        self.print(&spec, out)
    }

    pub fn print_to_vec(&self, spec: &PrintSpec) -> Result<Vec<u8>, PrintError> {
        let mut buffer = Vec::new();
        self.print(spec, &mut buffer)?;
        Ok(buffer)
    }

    pub fn client_info(&self) -> ClientInfo {
        ClientInfo {
            scales: self.config.scales.clone(),
            dpis: self.config.dpis.clone(),
            layouts: self
                .config
                .layouts
                .iter()
                .map(|layout| LayoutInfo {
                    name: layout.name.clone(),
                    map: layout.main_map().map(|map| map.client_config()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapsheet_traits::InMemoryLayerSource;

    const CONFIG: &str = r#"{
        "dpis": [72, 150],
        "scales": [1000, 25000],
        "layouts": [
            { "name": "Plain", "mainPage": { "items": [ { "type": "text", "text": "${title}" } ] } },
            { "name": "Map", "mainPage": { "items": [ { "type": "map", "width": 200, "height": 100 } ] } }
        ]
    }"#;

    fn printer() -> MapPrinter {
        MapPrinter::new(
            PrintConfig::from_json(CONFIG).unwrap(),
            Arc::new(InMemoryLayerSource::new()),
        )
        .unwrap()
    }

    #[test]
    fn text_only_document_is_a_pdf() {
        let spec = PrintSpec::parse(r#"{"units": "m", "title": "Hello"}"#).unwrap();
        let bytes = printer().print_to_vec(&spec).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn units_are_required_without_a_default() {
        let spec = PrintSpec::parse(r#"{"title": "Hello"}"#).unwrap();
        let err = printer().print_to_vec(&spec).unwrap_err();
        assert!(matches!(err, PrintError::MissingField(ref f) if f == "units"));
    }

    #[test]
    fn failed_build_writes_nothing() {
        let mut out = Vec::new();
        let err = printer()
            .print_json(r#"{"layout": "Map", "units": "m", "dpi": 72, "center": [0, 0]}"#, &mut out)
            .unwrap_err();
        assert!(matches!(err, PrintError::MissingField(ref f) if f == "scale"));
        assert!(out.is_empty());
    }

    #[test]
    fn client_info_lists_main_map_size_per_layout() {
        let info = printer().client_info();
        assert_eq!(info.dpis, vec![72, 150]);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json["layouts"],
            serde_json::json!([
                {"name": "Plain"},
                {"name": "Map", "map": {"width": 200.0, "height": 100.0}}
            ])
        );
    }
}
