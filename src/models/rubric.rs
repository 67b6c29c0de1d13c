use serde::Serialize;

/// 矩形表格，第一行为表头
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// 创建表格，行宽不一致时用空字符串补齐
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        let mut grid = Self { rows };
        grid.pad_to_rectangle();
        grid
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 追加另一页的数据行（续页表头已去除）
    pub fn append_rows(&mut self, rows: impl IntoIterator<Item = Vec<String>>) {
        self.rows.extend(rows);
        self.pad_to_rectangle();
    }

    fn pad_to_rectangle(&mut self) {
        let width = self.width();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }
}

/// 评分标准
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RubricSpec {
    /// 评分维度，按出现顺序，允许重复
    pub measures: Vec<String>,
    /// 分值档位，降序，可能为空
    pub point_scale: Vec<u32>,
    pub table: Option<Grid>,
}

impl RubricSpec {
    /// 单个维度的最高分值
    pub fn top_points(&self) -> Option<u32> {
        self.point_scale.iter().copied().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_grid_pads_ragged_rows() {
        let grid = Grid::new(vec![row(&["a", "b", "c"]), row(&["d"])]);
        assert_eq!(grid.rows()[1], row(&["d", "", ""]));
        assert_eq!(grid.width(), 3);
    }

    #[test]
    fn test_grid_header_and_append() {
        let mut grid = Grid::new(vec![row(&["h1", "h2"]), row(&["a", "b"])]);
        grid.append_rows(vec![row(&["c", "d", "e"])]);

        assert_eq!(grid.header(), Some(&row(&["h1", "h2", ""])[..]));
        assert_eq!(grid.rows().len(), 3);
        assert_eq!(Grid::default().header(), None);
    }
}
