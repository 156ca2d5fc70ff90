//! Resolution of `idref:` links.
//!
//! A link written as `href="idref:intro"` (or with single quotes) points to
//! the page whose id is `intro`. Resolution is a textual substitution over
//! the converted HTML: any text matching the pattern is rewritten, whether or
//! not it is part of an actual tag.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::event::{EventContext, HandlerResult};
use crate::tree::{PageQuery, SiteTree};

static IDREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href=(?:'idref:\s*(\w+)'|"idref:\s*(\w+)")"#).unwrap()
});

/// Rewrite `idref:` links in the preview and content of the page of `ctx`.
///
/// The link target becomes the URL of the first page (by name, anywhere in
/// the tree) with the referenced id, or `#` if there is none. The quote
/// style is preserved. Folders and assets are left alone.
pub fn resolve_idref(ctx: &mut EventContext<'_>) -> HandlerResult {
    let tree: &SiteTree = ctx.tree;
    let Some(page) = tree.page(ctx.node) else {
        return Ok(());
    };
    let preview = resolve_text(tree, &page.preview);
    let content = resolve_text(tree, &page.content);

    if let Some(page) = ctx.tree.page_mut(ctx.node) {
        page.preview = preview;
        page.content = content;
    }
    Ok(())
}

fn resolve_text(tree: &SiteTree, text: &str) -> String {
    IDREF
        .replace_all(text, |caps: &Captures<'_>| {
            let (quote, idref) = match (caps.get(1), caps.get(2)) {
                (Some(single), _) => ('\'', single.as_str()),
                (None, Some(double)) => ('"', double.as_str()),
                (None, None) => return caps[0].to_owned(),
            };
            let query = PageQuery {
                idref: Some(idref),
                deep: true,
                ..PageQuery::default()
            };
            let pages = tree.pages(tree.root(), &query);
            let url = match pages.first() {
                Some(&found) => tree.page(found).map_or("#", |p| p.url.as_str()),
                None => {
                    tracing::debug!(idref = %idref, "Unresolved idref");
                    "#"
                }
            };
            format!("href={quote}{url}{quote}")
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::metadata::FrontMatter;
    use crate::tree::{NodeId, NodeKind, Page};

    fn add_page(tree: &mut SiteTree, parent: NodeId, path: &str, id: &str, content: &str) -> NodeId {
        let created = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let url = format!("/{}.html", crate::tree::split_extension(path).0);
        let page = Page::new(FrontMatter::new(), String::new(), content.to_owned(), url, created);
        let name = path.rsplit('/').next().unwrap_or(path).to_owned();
        let node = tree.add_child(parent, name, path, NodeKind::Page(Box::new(page)));
        tree.node_mut(node).id = id.to_owned();
        node
    }

    #[test]
    fn test_resolve_idref() {
        let mut tree = SiteTree::new("/");
        let root = tree.root();
        let docs = tree.add_child(root, "docs", "docs", NodeKind::Folder);
        add_page(&mut tree, docs, "docs/intro.md", "intro", "");
        let page = add_page(
            &mut tree,
            root,
            "index.md",
            "",
            r#"<a href="idref:intro">Intro</a> <a href='idref: intro'>again</a> <a href="idref:nowhere">x</a>"#,
        );

        resolve_idref(&mut EventContext::new(&mut tree, page)).unwrap();

        assert_eq!(
            tree.page(page).unwrap().content,
            r##"<a href="/docs/intro.html">Intro</a> <a href='/docs/intro.html'>again</a> <a href="#">x</a>"##
        );
    }

    #[test]
    fn test_resolve_idref_first_match_by_name() {
        let mut tree = SiteTree::new("/");
        let root = tree.root();
        add_page(&mut tree, root, "b.md", "dup", "");
        add_page(&mut tree, root, "a.md", "dup", "");
        let page = add_page(&mut tree, root, "c.md", "", r#"href="idref:dup""#);

        resolve_idref(&mut EventContext::new(&mut tree, page)).unwrap();

        assert_eq!(tree.page(page).unwrap().content, r#"href="/a.html""#);
    }

    #[test]
    fn test_resolve_idref_in_preview() {
        let mut tree = SiteTree::new("/");
        let root = tree.root();
        add_page(&mut tree, root, "target.md", "t", "");
        let page = add_page(&mut tree, root, "p.md", "", "");
        tree.page_mut(page).unwrap().preview = "href='idref:t'".to_owned();

        resolve_idref(&mut EventContext::new(&mut tree, page)).unwrap();

        assert_eq!(tree.page(page).unwrap().preview, "href='/target.html'");
    }

    #[test]
    fn test_mismatched_quotes_untouched() {
        let mut tree = SiteTree::new("/");
        let root = tree.root();
        let text = r#"href="idref:t' and plain idref:t"#;
        let page = add_page(&mut tree, root, "p.md", "t", text);

        resolve_idref(&mut EventContext::new(&mut tree, page)).unwrap();

        assert_eq!(tree.page(page).unwrap().content, text);
    }
}
