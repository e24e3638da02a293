//! Plain-text rendering of a script.

use std::fmt::Write;

use manzai_types::{Block, Script};

/// Render `script` as readable text, one block per line.
///
/// ```text
/// コンビニ
///
/// ■ つかみ
/// ボケ: コンビニ店員やってみたいねん
/// ツッコミ: やってみ
/// ```
pub fn transcript(script: &Script) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", script.title);
    if !script.blocks.is_empty() {
        out.push('\n');
    }
    for block in &script.blocks {
        let _ = match block {
            Block::Heading(h) => writeln!(out, "■ {}", h.content),
            Block::Line(l) => writeln!(out, "{}: {}", l.role.label(), l.content),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use manzai_types::{HeadingBlock, LineBlock, Role};

    #[test]
    fn test_renders_headings_and_lines() {
        let blocks = vec![
            Block::Heading(HeadingBlock {
                content: "つかみ".into(),
                ..HeadingBlock::new()
            }),
            Block::Line(LineBlock {
                content: "どうも".into(),
                ..LineBlock::new(Role::Boke)
            }),
            Block::Line(LineBlock {
                content: "よろしく".into(),
                ..LineBlock::new(Role::Tsukkomi)
            }),
        ];
        let script = Script::with_content("漫才", blocks);
        assert_eq!(
            transcript(&script),
            "漫才\n\n■ つかみ\nボケ: どうも\nツッコミ: よろしく\n"
        );
    }

    #[test]
    fn test_empty_script_is_title_only() {
        let script = Script::new();
        assert_eq!(transcript(&script), format!("{}\n", manzai_types::DEFAULT_TITLE));
    }
}
