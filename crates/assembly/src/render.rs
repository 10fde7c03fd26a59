//! Body templates for each kind of context section.
//!
//! Every renderer returns an empty string for an empty item list so the
//! assembler drops the whole section.

use crate::item::{ContextItem, DocumentRef};
use serde::{Deserialize, Serialize};

pub const RECENT_VIEWS_HEADER: &str = "Here are some snippets of code I have recently viewed, roughly from oldest to newest. They may or may not be relevant to the code I am editing:";
pub const RECENT_VIEWS_RECENT_HEADER: &str =
    "Here are snippets of code I viewed in the last few moments, roughly from oldest to newest:";
pub const EDIT_HISTORY_HEADER: &str =
    "Here is the older history of edits I made in the repository, from oldest to newest:";
pub const RECENT_EDITS_HEADER: &str =
    "Here are the edits I just made, from oldest to newest. The code to rewrite continues from them:";
pub const SIMILAR_SNIPPETS_HEADER: &str =
    "Here are code snippets from other files that look similar to the code I am editing:";
pub const DIAGNOSTICS_HEADER: &str = "Here are the diagnostics reported for the files I am working on:";
pub const RECENT_COPY_HEADER: &str = "Here is text I recently copied, which I may be about to use:";
pub const CURSOR_AREA_HEADER: &str =
    "Here is the file I am editing, with the code to rewrite marked:";

/// The region around the cursor in the file being edited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorContext {
    pub display_path: String,
    /// Text before the region to rewrite
    #[serde(default)]
    pub prefix: String,
    /// The region to rewrite, containing the cursor
    pub code_to_rewrite: String,
    /// Text after the region to rewrite
    #[serde(default)]
    pub suffix: String,
}

/// Recently viewed snippets; `items` are newest-first and rendered oldest-first
#[must_use]
pub fn recent_views(items: &[ContextItem]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let snippets: Vec<String> = items
        .iter()
        .rev()
        .map(|item| {
            format!(
                "<snippet>\n<file_path>{}</file_path>\n<content>\n{}\n</content>\n</snippet>",
                item.document.display_path, item.content
            )
        })
        .collect();
    format!(
        "<recently_viewed_snippets>\n{}\n</recently_viewed_snippets>",
        snippets.join("\n")
    )
}

/// Compacted diff hunks; `items` are newest-first and rendered oldest-first
#[must_use]
pub fn edit_history(items: &[ContextItem]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let hunks: Vec<String> = items
        .iter()
        .rev()
        .map(|item| format!("{}\n{}", item.document.display_path, item.content))
        .collect();
    format!("<diff_history>\n{}\n</diff_history>", hunks.join("\n"))
}

/// Diagnostics grouped per document in first-appearance order
#[must_use]
pub fn diagnostics(items: &[ContextItem]) -> String {
    let mut groups: Vec<(&DocumentRef, Vec<&str>)> = Vec::new();
    for item in items {
        match groups
            .iter_mut()
            .find(|(document, _)| document.same_document(&item.document))
        {
            Some((_, lines)) => lines.push(item.content.as_str()),
            None => groups.push((&item.document, vec![item.content.as_str()])),
        }
    }
    groups
        .into_iter()
        .map(|(document, lines)| {
            format!(
                "<diagnostic>\n<file_path>{}</file_path>\n<lints>\n{}\n</lints>\n</diagnostic>",
                document.display_path,
                lines.join("\n")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Recently copied text; `items` are newest-first and rendered oldest-first
#[must_use]
pub fn recent_copies(items: &[ContextItem]) -> String {
    items
        .iter()
        .rev()
        .map(|item| {
            format!(
                "<recent_copy>\n<file_path>{}</file_path>\n<content>\n{}\n</content>\n</recent_copy>",
                item.document.display_path, item.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lexically similar regions, labelled with 1-indexed inclusive line ranges
#[must_use]
pub fn similar_snippets(items: &[ContextItem]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let snippets: Vec<String> = items
        .iter()
        .map(|item| {
            let location = match (item.start_line, item.end_line) {
                (Some(start), Some(end)) => {
                    format!("{}:{}-{}", item.document.display_path, start + 1, end)
                }
                _ => item.document.display_path.clone(),
            };
            format!(
                "<snippet>\n<file_path>{location}</file_path>\n<content>\n{}\n</content>\n</snippet>",
                item.content
            )
        })
        .collect();
    format!(
        "<similar_code_snippets>\n{}\n</similar_code_snippets>",
        snippets.join("\n")
    )
}

/// The file being edited, with the region to rewrite wrapped in tags
#[must_use]
pub fn cursor_area(cursor: &CursorContext) -> String {
    if cursor.prefix.is_empty() && cursor.code_to_rewrite.is_empty() && cursor.suffix.is_empty() {
        return String::new();
    }
    let mut parts = vec![format!("<file_path>{}</file_path>", cursor.display_path)];
    if !cursor.prefix.is_empty() {
        parts.push(cursor.prefix.clone());
    }
    parts.push(format!(
        "<code_to_rewrite>\n{}\n</code_to_rewrite>",
        cursor.code_to_rewrite
    ));
    if !cursor.suffix.is_empty() {
        parts.push(cursor.suffix.clone());
    }
    format!("<current_file>\n{}\n</current_file>", parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SourceId;
    use pretty_assertions::assert_eq;

    fn item(source: SourceId, path: &str, content: &str) -> ContextItem {
        ContextItem::new(source, DocumentRef::from_path(path), content)
    }

    #[test]
    fn empty_lists_render_nothing() {
        assert_eq!(recent_views(&[]), "");
        assert_eq!(edit_history(&[]), "");
        assert_eq!(diagnostics(&[]), "");
        assert_eq!(recent_copies(&[]), "");
        assert_eq!(similar_snippets(&[]), "");
        assert_eq!(cursor_area(&CursorContext::default()), "");
    }

    #[test]
    fn recent_views_render_oldest_first() {
        let items = vec![
            item(SourceId::RecentView, "new.rs", "new"),
            item(SourceId::RecentView, "old.rs", "old"),
        ];
        let out = recent_views(&items);
        let old_at = out.find("old.rs").unwrap();
        let new_at = out.find("new.rs").unwrap();
        assert!(old_at < new_at);
        assert!(out.starts_with("<recently_viewed_snippets>\n<snippet>"));
    }

    #[test]
    fn edit_history_prefixes_each_hunk_with_its_path() {
        let items = vec![
            item(SourceId::RecentEdit, "b.rs", "+b"),
            item(SourceId::RecentEdit, "a.rs", "-a\n+a2"),
        ];
        assert_eq!(
            edit_history(&items),
            "<diff_history>\na.rs\n-a\n+a2\nb.rs\n+b\n</diff_history>"
        );
    }

    #[test]
    fn diagnostics_are_grouped_per_document() {
        let items = vec![
            item(SourceId::Diagnostics, "a.rs", "line 3: unused variable"),
            item(SourceId::Diagnostics, "b.rs", "line 1: missing semicolon"),
            item(SourceId::Diagnostics, "a.rs", "line 9: type mismatch"),
        ];
        let out = diagnostics(&items);
        assert_eq!(out.matches("<diagnostic>").count(), 2);
        assert!(out.contains("<lints>\nline 3: unused variable\nline 9: type mismatch\n</lints>"));
    }

    #[test]
    fn recent_copies_render_oldest_first() {
        let items = vec![
            item(SourceId::RecentCopy, "new.rs", "copied_later()"),
            item(SourceId::RecentCopy, "old.rs", "copied_first()"),
        ];
        let out = recent_copies(&items);
        assert!(out.find("copied_first()").unwrap() < out.find("copied_later()").unwrap());
        assert!(out.starts_with("<recent_copy>\n<file_path>old.rs</file_path>"));
    }

    #[test]
    fn similar_snippets_show_one_indexed_ranges() {
        let items = vec![item(SourceId::SimilarSnippet, "src/a.rs", "fn a() {}").with_lines(4, 7)];
        assert!(similar_snippets(&items).contains("<file_path>src/a.rs:5-7</file_path>"));
    }

    #[test]
    fn cursor_area_marks_rewrite_region() {
        let cursor = CursorContext {
            display_path: "src/main.rs".to_string(),
            prefix: "fn main() {".to_string(),
            code_to_rewrite: "    let x = ".to_string(),
            suffix: "}".to_string(),
        };
        assert_eq!(
            cursor_area(&cursor),
            "<current_file>\n<file_path>src/main.rs</file_path>\nfn main() {\n<code_to_rewrite>\n    let x = \n</code_to_rewrite>\n}\n</current_file>"
        );
    }
}
