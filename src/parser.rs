//! 表驱动的 LL(1) 预测分析.
//!
//! ```text
//! 将 $ 和起始符 S 依次压栈, 令 a 为输入的第一个符号;
//! while (栈非空) {
//!     弹出栈顶 X;
//!     if (X 是终结符) {
//!         if (X == a) 令 a 为下一个输入符号;
//!         else 拒绝;
//!     } else if (M[X, a] = X -> Y1 Y2 ... Yk) {
//!         依次压入 Yk, ..., Y2, Y1;
//!     } else 拒绝;
//! }
//! 输入全部被消耗则接受.
//! ```

use tracing::{debug, info};

use crate::{
    NonTerminal, ParseTable, Terminal, Token,
    error::Error,
    token::EOF,
    trace::{Action, Step, Trace},
};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection<'a> {
    #[error("terminal mismatch, expected {expected}, found {found}")]
    TerminalMismatch {
        expected: Terminal<'a>,
        found: Terminal<'a>,
    },
    #[error("no rule for ({non_terminal}, {lookahead})")]
    NoRule {
        non_terminal: NonTerminal<'a>,
        lookahead: Terminal<'a>,
    },
    #[error("input not fully consumed, {remaining} tokens left")]
    InputNotConsumed { remaining: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    Accepted {
        trace: Trace<'a>,
    },
    Rejected {
        reason: Rejection<'a>,
        trace: Trace<'a>,
    },
}

impl<'a> Outcome<'a> {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    #[must_use]
    pub fn trace(&self) -> &Trace<'a> {
        match self {
            Self::Accepted { trace } | Self::Rejected { trace, .. } => trace,
        }
    }

    #[must_use]
    pub fn reason(&self) -> Option<&Rejection<'a>> {
        match self {
            Self::Accepted { .. } => None,
            Self::Rejected { reason, .. } => Some(reason),
        }
    }

    /// 见 [`Trace::derivation`].
    #[must_use]
    pub fn derivation(&self) -> Vec<usize> {
        self.trace().derivation()
    }
}

/// 一次分析的栈, 输入指针和记录, 每次 [`Parser::parse`] 单独创建.
struct Config<'a> {
    /// 栈顶在末尾.
    stack: Vec<Token<'a>>,
    cursor: usize,
    trace: Trace<'a>,
}

impl<'a> Config<'a> {
    fn new(start: NonTerminal<'a>) -> Self {
        Self {
            stack: vec![EOF.into(), start.into()],
            cursor: 0,
            trace: Trace::default(),
        }
    }

    fn record(&mut self, lookahead: Terminal<'a>, popped: Token<'a>, action: Action) {
        let stack = self.stack.iter().rev().copied().collect();
        let step = Step::new(stack, lookahead, popped, action);
        debug!("{step}");
        self.trace.push(step);
    }

    fn reject(
        mut self,
        lookahead: Terminal<'a>,
        popped: Token<'a>,
        reason: Rejection<'a>,
    ) -> Outcome<'a> {
        self.record(lookahead, popped, Action::Reject);
        info!("rejected: {reason}");
        Outcome::Rejected {
            reason,
            trace: self.trace,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    table: &'a ParseTable<'a>,
}

impl<'a> Parser<'a> {
    /// # Errors
    /// - [`Error::ConflictingTable`] 分析表存在冲突, 不能用于预测分析.
    pub fn new(table: &'a ParseTable<'a>) -> Result<Self, Error> {
        if let Some((nt, t)) = table.conflicts().next() {
            Err(Error::ConflictingTable {
                non_terminal: nt.to_string(),
                terminal: t.to_string(),
            })?
        }
        Ok(Self { table })
    }

    #[must_use]
    pub fn table(&self) -> &'a ParseTable<'a> {
        self.table
    }

    /// 分析终结符序列, 超出序列末尾的前瞻符号视为 [`EOF`].
    ///
    /// 只有栈被清空时所有输入 (包括结尾的 [`EOF`]) 都被消耗才接受.
    #[must_use]
    pub fn parse<'s>(&self, tokens: &[Terminal<'s>]) -> Outcome<'s>
    where
        'a: 's,
    {
        let grammar = self.table.grammar();
        let mut config = Config::new(grammar.symbol_start());
        while let Some(top) = config.stack.pop() {
            let lookahead = tokens.get(config.cursor).copied().unwrap_or(EOF);
            match top {
                Token::Terminal(expected) => {
                    if expected != lookahead {
                        return config.reject(
                            lookahead,
                            top,
                            Rejection::TerminalMismatch {
                                expected,
                                found: lookahead,
                            },
                        );
                    }
                    config.record(lookahead, top, Action::Match);
                    config.cursor += 1;
                }
                Token::NonTerminal(nt) => {
                    let Some((idx, prod)) = self
                        .table
                        .lookup(nt, lookahead)
                        .and_then(|idx| Some((idx, grammar.prod(idx)?)))
                    else {
                        return config.reject(
                            lookahead,
                            top,
                            Rejection::NoRule {
                                non_terminal: nt,
                                lookahead,
                            },
                        );
                    };
                    let action = if prod.is_empty() {
                        Action::Epsilon(idx)
                    } else {
                        Action::Apply(idx)
                    };
                    config.record(lookahead, top, action);
                    config.stack.extend(prod.tail().iter().rev().copied());
                }
            }
        }
        if config.cursor < tokens.len() {
            let remaining = tokens.len() - config.cursor;
            // 栈已经为空, 没有可以弹出的符号, 记录最后一个匹配的符号.
            let popped = Token::from(EOF);
            let lookahead = tokens[config.cursor];
            return config.reject(lookahead, popped, Rejection::InputNotConsumed { remaining });
        }
        info!("accepted in {} steps", config.trace.len());
        Outcome::Accepted {
            trace: config.trace,
        }
    }

    /// 切分句子并分析, 见 [`crate::token::tokenize`].
    #[must_use]
    pub fn parse_sentence<'s>(&self, sentence: &'s str) -> Outcome<'s>
    where
        'a: 's,
    {
        self.parse(&crate::token::tokenize(sentence))
    }
}
