use std::{fmt::Display, mem::swap};

use tracing::{debug, warn};

use crate::{
    Grammar, NonTerminal, Terminal,
    error::Error,
    token::{EOF, EPSILON},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableCell {
    /// 展开使用的产生式编号.
    Prod(usize),
    /// 包含冲突的两个或者多个表项(树状嵌套).
    Conflict(Box<TableCell>, Box<TableCell>),
    #[default]
    Empty,
}

impl Display for TableCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&match self {
            Self::Prod(p) => format!("{p}"),
            Self::Conflict(_, _) => "[conflict]".to_string(),
            Self::Empty => "".to_string(),
        })
    }
}

impl TableCell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_, _))
    }

    /// 放入新的 cell 内容, 返回是否冲突, 重复放入同一个产生式不算冲突.
    fn update(&mut self, cell: TableCell) -> bool {
        let mut conflict = false;
        let mut this = TableCell::Empty;
        swap(&mut this, self);
        match (this, cell) {
            (Self::Empty, other) => *self = other,
            (this, Self::Empty) => *self = this,
            (Self::Prod(a), Self::Prod(b)) if a == b => *self = Self::Prod(a),
            (a, b) => {
                *self = Self::Conflict(Box::new(a), Box::new(b));
                conflict = true;
            }
        }
        conflict
    }

    /// 展开所有的叶子节点(非 [`TableCell::Conflict`] 节点)(从树的左侧到右侧).
    #[must_use]
    pub fn flatten(&self) -> Box<dyn Iterator<Item = &TableCell> + '_> {
        match self {
            Self::Conflict(left, right) => Box::new(left.flatten().chain(right.flatten())),
            _ => Box::new(std::iter::once(self)),
        }
    }
}

/// LL(1) 预测分析表, 行为非终结符, 列为终结符 (顺序与 [`Grammar::non_terms`], [`Grammar::terms`] 相同).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable<'a> {
    cells: Vec<Vec<TableCell>>,
    grammar: &'a Grammar<'a>,
    /// 文法是否不是 LL(1) 的.
    conflict: bool,
}

impl<'a> ParseTable<'a> {
    fn empty(grammar: &'a Grammar<'a>) -> Self {
        Self {
            cells: vec![vec![TableCell::Empty; grammar.terms().len()]; grammar.non_terms().len()],
            grammar,
            conflict: false,
        }
    }

    /// 使用 first 集和 follow 集构造预测分析表:
    /// - 对 `A -> alpha`, first(alpha) 中的每个终结符 a, 表项 `[A, a]` 放入这个产生式.
    /// - 如果 first(alpha) 包含空串, follow(A) 中的每个终结符 b (包括 `$`), 表项 `[A, b]` 放入这个产生式.
    ///
    /// 多个产生式落在同一个表项时记为冲突, 见 [`ParseTable::conflict`].
    #[must_use]
    pub fn build_from(grammar: &'a Grammar<'a>) -> Self {
        let mut table = Self::empty(grammar);
        let firsts = grammar.first_sets();
        let follows = grammar.follow_sets();
        for (row, &nt) in grammar.non_terms().iter().enumerate() {
            for prod_idx in grammar.prods_of(nt) {
                let Some(prod) = grammar.prod(prod_idx) else {
                    continue;
                };
                let first = Grammar::first_of_seq(&firsts, prod.tail().iter().copied());
                let mut lookaheads: Vec<Terminal<'a>> =
                    first.iter().copied().filter(|t| *t != EPSILON).collect();
                if first.contains(&EPSILON) {
                    lookaheads.extend(follows.get(&nt).into_iter().flatten().copied());
                }
                for t in lookaheads {
                    let Some(col) = grammar.index_of_term(t) else {
                        continue;
                    };
                    if table.cells[row][col].update(TableCell::Prod(prod_idx)) {
                        warn!("LL(1) conflict at ({nt}, {t})");
                        table.conflict = true;
                    }
                }
            }
        }
        debug!("parse table:\n{}", table.to_markdown());
        table
    }

    /// 使用手写的表项构造预测分析表, 表项为 (非终结符, 终结符, 产生式编号).
    /// # Errors
    /// - [`Error::NonTerminalNotFound`] / [`Error::TerminalNotFound`] 文法中没有这个符号.
    /// - [`Error::ProductionOutOfRange`] 产生式编号不存在.
    /// - [`Error::HeadMismatch`] 产生式头部和表项的非终结符不一致.
    /// - [`Error::ConflictingTable`] 同一个表项出现两个不同的产生式.
    pub fn from_entries<'b>(
        grammar: &'a Grammar<'a>,
        entries: impl IntoIterator<Item = (NonTerminal<'b>, Terminal<'b>, usize)>,
    ) -> Result<Self, Error> {
        let mut table = Self::empty(grammar);
        for (nt, t, prod_idx) in entries {
            let row = grammar
                .index_of_non_term(nt)
                .ok_or(Error::NonTerminalNotFound(nt.to_string()))?;
            let col = grammar
                .index_of_term(t)
                .ok_or(Error::TerminalNotFound(t.to_string()))?;
            let prod = grammar
                .prod(prod_idx)
                .ok_or(Error::ProductionOutOfRange(prod_idx))?;
            if prod.head() != nt {
                Err(Error::HeadMismatch {
                    prod: prod_idx,
                    non_terminal: nt.to_string(),
                })?
            }
            if table.cells[row][col].update(TableCell::Prod(prod_idx)) {
                Err(Error::ConflictingTable {
                    non_terminal: nt.to_string(),
                    terminal: t.to_string(),
                })?
            }
        }
        Ok(table)
    }

    /// 内置表达式文法 (见 [`Grammar::expression`]) 的手写预测分析表.
    /// # Errors
    /// 见 [`ParseTable::from_entries`], 当 `grammar` 不是内置文法时可能触发.
    pub fn expression(grammar: &'a Grammar<'a>) -> Result<Self, Error> {
        Self::from_entries(
            grammar,
            [("E", "id", 0), ("Eprime", "+", 1), ("Eprime", EOF.as_str(), 2), ("T", "id", 3)]
                .map(|(nt, t, p)| (NonTerminal::from(nt), Terminal::from(t), p)),
        )
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.grammar.terms().len()
    }

    #[must_use]
    pub fn conflict(&self) -> bool {
        self.conflict
    }

    /// 遍历所有冲突的表项.
    pub fn conflicts(&self) -> impl Iterator<Item = (NonTerminal<'a>, Terminal<'a>)> + '_ {
        self.cells.iter().enumerate().flat_map(move |(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_conflict())
                .map(move |(col, _)| (self.grammar.non_terms()[row], self.grammar.terms()[col]))
        })
    }

    /// 查询表项, 如果文法中没有这两个符号, 那么返回 [`None`].
    #[must_use]
    pub fn cell(&self, nt: NonTerminal, t: Terminal) -> Option<&TableCell> {
        let row = self.grammar.index_of_non_term(nt)?;
        let col = self.grammar.index_of_term(t)?;
        Some(&self.cells[row][col])
    }

    /// 查询 `[nt, t]` 应该展开的产生式编号, 空表项, 冲突表项或者未知符号返回 [`None`].
    #[must_use]
    pub fn lookup(&self, nt: NonTerminal, t: Terminal) -> Option<usize> {
        match self.cell(nt, t)? {
            TableCell::Prod(p) => Some(*p),
            _ => None,
        }
    }

    /// 使用 markdown 形式输出表格.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut header_line = "| |".to_string();
        header_line += &self
            .grammar
            .terms()
            .iter()
            .map(|t| format!(" `{}` |", t.as_str()))
            .collect::<String>();
        let sep_line: String =
            String::from("| - |") + &std::iter::repeat_n(" - |", self.cols()).collect::<String>();
        let mut data_lines = String::new();
        for (nt, row) in self.grammar.non_terms().iter().zip(self.cells.iter()) {
            let line = format!("| `{nt}` |")
                + &row
                    .iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            "  |".to_string()
                        } else {
                            format!(" {cell} |")
                        }
                    })
                    .collect::<String>();
            data_lines += &line;
            data_lines += "\n";
        }
        format!("{header_line}\n{sep_line}\n{}", data_lines.trim_end())
    }

    #[inline]
    #[must_use]
    pub fn grammar(&self) -> &'a Grammar<'a> {
        self.grammar
    }
}
