//! 版式文本中的表格识别与跨页拼接

use regex::Regex;
use std::sync::OnceLock;

use crate::models::Grid;

/// 两个及以上连续空白视为列分隔
fn column_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\s{2,}|\t").expect("valid column separator regex"))
}

/// 把一行拆成单元格；少于两列的行不是表格行
fn split_row(line: &str) -> Option<Vec<String>> {
    let cells: Vec<String> = column_separator()
        .split(line.trim())
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect();
    (cells.len() >= 2).then_some(cells)
}

/// 识别一页中的表格
///
/// 连续的表格行构成一个块（空行不打断），遇到普通文本行结束；
/// 取行数最多且至少两行的块作为该页的表格
pub fn detect_grid(page: &str) -> Option<Grid> {
    let mut best: Vec<Vec<String>> = Vec::new();
    let mut block: Vec<Vec<String>> = Vec::new();

    for line in page.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match split_row(line) {
            Some(cells) => block.push(cells),
            None => {
                if block.len() > best.len() {
                    best = std::mem::take(&mut block);
                } else {
                    block.clear();
                }
            }
        }
    }
    if block.len() > best.len() {
        best = block;
    }

    (best.len() >= 2).then(|| Grid::new(best))
}

/// 拼接各页表格
///
/// 第一张有表格的页整体保留；之后每页去掉第一行（重复的表头）再追加。
/// 没有任何表格时返回 None
pub fn stitch_pages<I>(pages: I) -> Option<Grid>
where
    I: IntoIterator<Item = Option<Grid>>,
{
    let mut merged: Option<Grid> = None;
    for grid in pages.into_iter().flatten() {
        match merged.as_mut() {
            None => merged = Some(grid),
            Some(table) => table.append_rows(grid.into_rows().into_iter().skip(1)),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_stitch_drops_continuation_headers() {
        let merged = stitch_pages(vec![
            Some(grid(&[&["h1", "h2"], &["a", "b"]])),
            Some(grid(&[&["h1", "h2"], &["c", "d"]])),
        ])
        .unwrap();

        assert_eq!(merged, grid(&[&["h1", "h2"], &["a", "b"], &["c", "d"]]));
    }

    #[test]
    fn test_stitch_skips_pages_without_grid() {
        let merged = stitch_pages(vec![
            None,
            Some(grid(&[&["h1", "h2"], &["a", "b"]])),
            None,
            Some(grid(&[&["h1", "h2"], &["c", "d"]])),
        ])
        .unwrap();

        assert_eq!(merged.rows().len(), 3);
        assert_eq!(merged.header(), Some(&["h1".to_string(), "h2".to_string()][..]));
        assert!(stitch_pages(vec![None, None]).is_none());
    }

    #[test]
    fn test_detect_grid_from_layout_text() {
        let page = "Rúbrica de exposición oral\n\n\
                    Criterio        Excelente (10)     Bueno (8)\n\
                    Contenido       Completo           Parcial\n\n\
                    Diseño          Claro              Confuso\n\
                    Firma del docente\n";

        let grid = detect_grid(page).unwrap();
        assert_eq!(grid.rows().len(), 3);
        assert_eq!(grid.rows()[0], vec!["Criterio", "Excelente (10)", "Bueno (8)"]);
        assert_eq!(grid.rows()[2][0], "Diseño");
    }

    #[test]
    fn test_detect_grid_requires_two_rows() {
        assert!(detect_grid("solo texto corrido\nSolo    una fila\n").is_none());
    }
}
