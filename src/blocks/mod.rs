//! Page blocks: the configured items rendered for every page of a request.

pub mod map;
pub mod text;

pub use map::{MapBlock, MapClientConfig, Placement};
pub use text::TextBlock;

use crate::deferred::DeferredBlockRegistry;
use crate::error::PrintError;
use crate::spec::PageParams;
use crate::transform::DocumentContext;
use mapsheet_render_core::ContentSink;
use mapsheet_traits::LayerSource;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Text(TextBlock),
    Map(MapBlock),
}

impl Block {
    pub fn render(
        &self,
        params: &PageParams<'_>,
        target: &mut dyn ContentSink,
        context: &mut RenderingContext,
    ) -> Result<(), PrintError> {
        match self {
            Block::Text(text) => {
                text.render(params, target);
                Ok(())
            }
            Block::Map(map) => map.render(params, target, context),
        }
    }
}

/// State shared by all blocks of one document build.
#[derive(Debug)]
pub struct RenderingContext {
    pub document: DocumentContext,
    pub registry: DeferredBlockRegistry,
    pub layers: Arc<dyn LayerSource>,
}

impl RenderingContext {
    pub fn new(document: DocumentContext, layers: Arc<dyn LayerSource>) -> Self {
        Self {
            document,
            registry: DeferredBlockRegistry::new(),
            layers,
        }
    }
}
