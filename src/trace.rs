//! 预测分析过程的逐步记录.

use std::fmt::Display;

use crate::{Grammar, Terminal, Token};

/// 一步分析执行的动作.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// 栈顶终结符与当前输入匹配, 输入前进一个.
    Match,
    /// 使用非空产生式展开栈顶非终结符.
    Apply(usize),
    /// 使用空产生式展开栈顶非终结符.
    Epsilon(usize),
    Reject,
}

impl Action {
    /// 展开使用的产生式编号.
    #[must_use]
    pub fn prod(&self) -> Option<usize> {
        match self {
            Self::Apply(p) | Self::Epsilon(p) => Some(*p),
            Self::Match | Self::Reject => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<'a> {
    /// 弹出 `popped` 之后, 执行动作之前的栈, 栈顶在前.
    stack: Vec<Token<'a>>,
    lookahead: Terminal<'a>,
    popped: Token<'a>,
    action: Action,
}

impl<'a> Step<'a> {
    #[must_use]
    pub(crate) fn new(
        stack: Vec<Token<'a>>,
        lookahead: Terminal<'a>,
        popped: Token<'a>,
        action: Action,
    ) -> Self {
        Self {
            stack,
            lookahead,
            popped,
            action,
        }
    }

    #[must_use]
    pub fn stack(&self) -> &[Token<'a>] {
        &self.stack
    }

    #[must_use]
    pub fn lookahead(&self) -> Terminal<'a> {
        self.lookahead
    }

    #[must_use]
    pub fn popped(&self) -> Token<'a> {
        self.popped
    }

    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// 栈的文本形式, 例如 `[T, Eprime, $]`.
    #[must_use]
    pub fn stack_str(&self) -> String {
        format!(
            "[{}]",
            self.stack
                .iter()
                .map(|tok| tok.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }

    /// 动作的文本形式, 展开时输出产生式右侧.
    #[must_use]
    pub fn action_str(&self, grammar: &Grammar) -> String {
        match self.action {
            Action::Match => "match".to_string(),
            Action::Apply(p) => grammar
                .prod(p)
                .map_or_else(|| format!("production {p}"), |prod| prod.tail_str()),
            Action::Epsilon(_) => "epsilon".to_string(),
            Action::Reject => "REJECTED".to_string(),
        }
    }
}

impl Display for Step<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self.action {
            Action::Match => "match".to_string(),
            Action::Apply(p) => format!("apply {p}"),
            Action::Epsilon(p) => format!("epsilon {p}"),
            Action::Reject => "reject".to_string(),
        };
        f.pad(&format!(
            "{} {} {} {action}",
            self.stack_str(),
            self.lookahead,
            self.popped
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace<'a> {
    steps: Vec<Step<'a>>,
}

impl<'a> Trace<'a> {
    pub(crate) fn push(&mut self, step: Step<'a>) {
        self.steps.push(step);
    }

    #[must_use]
    pub fn steps(&self) -> &[Step<'a>] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 所有匹配步骤消耗的终结符.
    pub fn matched(&self) -> impl Iterator<Item = Terminal<'a>> + '_ {
        self.steps
            .iter()
            .filter(|s| s.action == Action::Match)
            .filter_map(|s| s.popped.as_term())
    }

    /// 依次使用的产生式编号, 即最左推导的过程.
    #[must_use]
    pub fn derivation(&self) -> Vec<usize> {
        self.steps.iter().filter_map(|s| s.action.prod()).collect()
    }

    /// 最后一步记录的栈.
    #[must_use]
    pub fn final_stack(&self) -> Option<&[Token<'a>]> {
        self.steps.last().map(Step::stack)
    }

    /// 以表格形式输出, 列依次为: 栈, 前瞻符号, 栈顶符号, 动作.
    #[must_use]
    pub fn to_table(&self, grammar: &Grammar) -> String {
        let mut out = format!(
            "{:<25} {:<10} {:<10} {:<25}\n",
            "Stack", "Lookahead", "Top", "Production"
        );
        out += &"-".repeat(67);
        for step in &self.steps {
            out += &format!(
                "\n{:<25} {:<10} {:<10} {}",
                step.stack_str(),
                step.lookahead,
                step.popped,
                step.action_str(grammar)
            );
        }
        out
    }
}
