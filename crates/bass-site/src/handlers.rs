//! Built-in handlers and their registration from configuration.

use std::path::PathBuf;

use bass_config::{HookConfig, HookHandler, TocConfig};

use crate::error::SiteError;
use crate::event::{EventBus, EventContext, HandlerResult};
use crate::idref::resolve_idref;
use crate::toc::{TocItem, TocOptions, add_toc};
use crate::tree::PageQuery;

/// Add `class="table"` to every plain `<table>` tag in the page content.
pub fn table_class(ctx: &mut EventContext<'_>) -> HandlerResult {
    if let Some(page) = ctx.tree.page_mut(ctx.node) {
        page.content = page.content.replace("<table>", r#"<table class="table">"#);
    }
    Ok(())
}

/// Bind the configured built-in handlers to their event labels.
pub fn register_hooks(bus: &mut EventBus, hooks: &[HookConfig]) {
    for hook in hooks {
        match hook.handler {
            HookHandler::ResolveIdref => bus.register(hook.event.as_str(), resolve_idref),
            HookHandler::TableClass => bus.register(hook.event.as_str(), table_class),
        }
    }
}

/// Bind a TOC handler to the `render:pre:page:path:` event of each
/// configured index page.
pub fn register_tocs(bus: &mut EventBus, tocs: &[TocConfig]) {
    for toc in tocs {
        let config = toc.clone();
        bus.register(format!("render:pre:page:path:{}", toc.page), move |ctx| {
            toc_handler(ctx, &config)
        });
    }
}

fn toc_handler(ctx: &mut EventContext<'_>, config: &TocConfig) -> HandlerResult {
    let page = ctx.node;
    let folder = match config.folder.as_deref() {
        Some("") => ctx.tree.root(),
        Some(path) => ctx
            .tree
            .find(path)
            .filter(|&id| ctx.tree.node(id).is_folder())
            .ok_or_else(|| SiteError::MissingDirectory(PathBuf::from(path)))?,
        None => ctx
            .tree
            .node(page)
            .parent()
            .unwrap_or_else(|| ctx.tree.root()),
    };

    let query = PageQuery {
        tag: config.tag.as_deref(),
        idref: None,
        deep: config.deep,
        sort: config.sort,
    };
    let mut pages = ctx.tree.pages(folder, &query);
    pages.retain(|&id| id != page);
    if config.reverse {
        pages.reverse();
    }

    let options = TocOptions {
        separator: config.separator.clone(),
        page_size: config.size,
    };
    add_toc(ctx, &pages, TocItem::Skin(&config.item), &options)
}
