//! Page processor: the generation handler for page types.

use std::sync::Arc;

use bass_markup::Converter;

use crate::error::SiteError;
use crate::event::{EventBus, EventContext, HandlerResult, PAGE_EXTENSION_PREFIX};
use crate::metadata::MetaNormalizer;
use crate::tree::split_extension;

/// Turns a freshly read page into a finished one.
///
/// For the page the event was fired for, the processor converts preview
/// (if any) and content to HTML, completes the metadata, copies `id`, `tags`
/// and `skin` onto the node and sets the URL.
#[derive(Clone)]
pub struct Processor {
    converter: Option<Arc<dyn Converter>>,
    normalizer: MetaNormalizer,
}

impl Processor {
    /// Create a processor that converts markup with `converter`.
    ///
    /// Without a converter the text is kept as is.
    pub fn new(converter: Option<Arc<dyn Converter>>, normalizer: MetaNormalizer) -> Self {
        Self {
            converter,
            normalizer,
        }
    }

    /// Process the node of `ctx`.
    ///
    /// # Errors
    ///
    /// Fails if the node is not a page or its metadata cannot be completed.
    pub fn process(&self, ctx: &mut EventContext<'_>) -> HandlerResult {
        let root_url = ctx.tree.root_url().to_owned();
        let node = ctx.tree.node_mut(ctx.node);
        let path = node.path.clone();
        let page = node
            .as_page_mut()
            .ok_or_else(|| SiteError::NotAPage(path.clone()))?;

        if let Some(converter) = &self.converter {
            if !page.preview.is_empty() {
                page.preview = converter.convert(&page.preview);
            }
            page.content = converter.convert(&page.content);
        }

        let meta = self
            .normalizer
            .complete(&page.front_matter, &path, page.created)
            .map_err(|source| SiteError::Metadata {
                path: path.clone(),
                source,
            })?;
        page.skin.clone_from(&meta.skin);
        page.url = format!("{root_url}{}.html", split_extension(&path).0);
        let (id, tags) = (meta.id.clone(), meta.tags.clone());
        page.meta = Some(meta);

        node.id = id;
        node.tags = tags;
        Ok(())
    }
}

/// Register a page processor for each converter, plus `mkd` as an alias
/// of `md`.
pub fn register_converters(
    bus: &mut EventBus,
    converters: Vec<(&'static str, Arc<dyn Converter>)>,
    normalizer: &MetaNormalizer,
) {
    for (extension, converter) in converters {
        let processor = Processor::new(Some(converter), normalizer.clone());
        bus.register(format!("{PAGE_EXTENSION_PREFIX}{extension}"), move |ctx| {
            processor.process(ctx)
        });
    }
    bus.alias(
        &format!("{PAGE_EXTENSION_PREFIX}md"),
        &format!("{PAGE_EXTENSION_PREFIX}mkd"),
    );
}
