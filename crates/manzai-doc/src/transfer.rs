//! Export/import of scripts as standalone JSON documents.
//!
//! The export shape drops ids and timestamps:
//!
//! ```text
//! {"title": "...", "blocks": [{"type": "line", "content": "...", "role": "boke"},
//!                             {"type": "heading", "content": "..."}]}
//! ```
//!
//! Import validates the whole payload before building anything, so a bad file
//! never partially applies. Imported ids are discarded: every block gets a
//! fresh one, and both timestamps are set to the import instant.

use serde::Serialize;
use serde_json::Value;

use manzai_types::{Block, BlockKind, HeadingBlock, LineBlock, Role, Script};

use crate::{DocError, Result};

/// Fallback export file stem for an untitled script.
const FALLBACK_FILE_STEM: &str = "台本";

#[derive(Serialize)]
struct ExportDocument<'a> {
    title: &'a str,
    blocks: Vec<ExportBlock<'a>>,
}

#[derive(Serialize)]
struct ExportBlock<'a> {
    #[serde(rename = "type")]
    kind: BlockKind,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
}

/// Serialize `script` to the export format (pretty-printed).
pub fn export_json(script: &Script) -> Result<String> {
    let doc = ExportDocument {
        title: &script.title,
        blocks: script
            .blocks
            .iter()
            .map(|b| ExportBlock {
                kind: b.kind(),
                content: b.content(),
                role: b.role(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Suggested download name: `<title>.json`.
pub fn export_file_name(script: &Script) -> String {
    let stem: String = script
        .title
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect();
    if stem.is_empty() {
        format!("{FALLBACK_FILE_STEM}.json")
    } else {
        format!("{stem}.json")
    }
}

/// Parse an exported document into a brand-new script.
pub fn import_json(text: &str) -> Result<Script> {
    let value: Value = serde_json::from_str(text)?;

    let title = match value.get("title") {
        Some(Value::String(t)) if !t.is_empty() => t.clone(),
        _ => return Err(DocError::MissingTitle),
    };
    let raw_blocks = value
        .get("blocks")
        .and_then(Value::as_array)
        .ok_or(DocError::MissingBlocks)?;

    let blocks = raw_blocks
        .iter()
        .enumerate()
        .map(|(index, raw)| import_block(index, raw))
        .collect::<Result<Vec<_>>>()?;

    let script = Script::with_content(title, blocks);
    tracing::debug!(script_id = %script.id, blocks = script.blocks.len(), "imported script");
    Ok(script)
}

fn import_block(index: usize, raw: &Value) -> Result<Block> {
    let invalid = |reason: &str| DocError::InvalidBlock {
        index,
        reason: reason.to_string(),
    };

    let kind = raw.get("type").and_then(Value::as_str).ok_or_else(|| invalid("missing type"))?;
    let content = match raw.get("content") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(invalid("content is not a string")),
    };

    match kind {
        "line" => {
            let role = raw
                .get("role")
                .and_then(Value::as_str)
                .and_then(Role::from_str)
                .ok_or_else(|| invalid("line without a valid role"))?;
            Ok(Block::Line(LineBlock {
                content,
                ..LineBlock::new(role)
            }))
        }
        "heading" => Ok(Block::Heading(HeadingBlock {
            content,
            ..HeadingBlock::new()
        })),
        other => Err(invalid(&format!("unknown block type '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptDocument;

    fn sample() -> Script {
        let mut doc = ScriptDocument::default();
        doc.set_title("コンビニ");
        let h = doc.add_heading();
        doc.update_block(h, "つかみ");
        let a = doc.add_line();
        doc.update_block(a, "コンビニ店員やってみたいねん");
        let b = doc.add_line();
        doc.update_block(b, "やってみ");
        doc.script().clone()
    }

    #[test]
    fn test_export_shape() {
        let json: Value = serde_json::from_str(&export_json(&sample()).unwrap()).unwrap();
        assert_eq!(json["title"], "コンビニ");
        assert_eq!(
            json["blocks"][0],
            serde_json::json!({"type": "heading", "content": "つかみ"})
        );
        assert_eq!(json["blocks"][1]["role"], "boke");
        assert_eq!(json["blocks"][2]["role"], "tsukkomi");
        assert!(json["blocks"][1].get("id").is_none());
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_export_then_import_preserves_content_not_ids() {
        let original = sample();
        let imported = import_json(&export_json(&original).unwrap()).unwrap();

        assert_eq!(imported.title, original.title);
        assert_ne!(imported.id, original.id);
        assert_eq!(imported.blocks.len(), original.blocks.len());
        for (a, b) in original.blocks.iter().zip(&imported.blocks) {
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.content(), b.content());
            assert_eq!(a.role(), b.role());
            assert_ne!(a.id(), b.id());
        }
        assert_eq!(imported.created_at, imported.updated_at);
    }

    #[test]
    fn test_import_rejects_missing_title() {
        let err = import_json(r#"{ "blocks": [] }"#).unwrap_err();
        assert!(matches!(err, DocError::MissingTitle));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_import_rejects_missing_blocks() {
        let err = import_json(r#"{ "title": "x" }"#).unwrap_err();
        assert!(matches!(err, DocError::MissingBlocks));
    }

    #[test]
    fn test_import_rejects_non_array_blocks() {
        let err = import_json(r#"{ "title": "x", "blocks": {} }"#).unwrap_err();
        assert!(matches!(err, DocError::MissingBlocks));
    }

    #[test]
    fn test_import_rejects_empty_title() {
        assert!(matches!(
            import_json(r#"{ "title": "", "blocks": [] }"#),
            Err(DocError::MissingTitle)
        ));
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(matches!(import_json("not json"), Err(DocError::Json(_))));
    }

    #[test]
    fn test_import_rejects_line_without_role() {
        let err = import_json(r#"{ "title": "x", "blocks": [{"type": "line", "content": "a"}] }"#)
            .unwrap_err();
        assert!(matches!(err, DocError::InvalidBlock { index: 0, .. }));
    }

    #[test]
    fn test_import_rejects_unknown_type() {
        let text = r#"{ "title": "x", "blocks": [
            {"type": "heading"},
            {"type": "aside", "content": "a"}
        ] }"#;
        let err = import_json(text).unwrap_err();
        assert!(matches!(err, DocError::InvalidBlock { index: 1, .. }));
    }

    #[test]
    fn test_import_ignores_supplied_ids() {
        let supplied = manzai_types::BlockId::new();
        let text = format!(
            r#"{{ "title": "x", "blocks": [
                {{"id": "{supplied}", "type": "heading", "content": "h"}}
            ] }}"#
        );
        let script = import_json(&text).unwrap();
        assert_ne!(script.blocks[0].id(), supplied);
        assert_eq!(script.blocks[0].content(), "h");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(export_file_name(&sample()), "コンビニ.json");
        let mut script = Script::new();
        script.title = "  ".into();
        assert_eq!(export_file_name(&script), "台本.json");
        script.title = "a/b".into();
        assert_eq!(export_file_name(&script), "a_b.json");
    }
}
