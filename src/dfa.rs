//! 表驱动的确定有限自动机.
//!
//! 一个 [`Dfa`] 由字符分类函数, 状态转移表和接受状态集合组成, 所有模式共用同一个 [`Dfa::walk`] 执行.

use std::collections::BTreeSet;

use tracing::trace;

use crate::error::Error;

/// 状态编号, 0 永远是唯一的起始状态.
pub type State = usize;

/// 转移表中表示 "没有转移" 的死状态, 进入之后不会再离开.
pub const DEAD: Option<State> = None;

/// 把输入字符映射到字母表下标 (转移表的列), 未分类的字符映射到保留的 "其他" 列.
pub type Classifier = fn(char) -> usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Verdict {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Clone)]
pub struct Dfa {
    name: &'static str,
    classifier: Classifier,
    /// 行为状态, 列为字母表下标.
    transitions: Vec<Vec<Option<State>>>,
    accept: BTreeSet<State>,
}

impl std::fmt::Debug for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dfa")
            .field("name", &self.name)
            .field("states", &self.states())
            .field("classes", &self.classes())
            .field("accept", &self.accept)
            .finish()
    }
}

/// 一次执行经过的状态.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    /// 依次到达的状态, 第一个一定是起始状态 0.
    states: Vec<State>,
    /// 导致进入死状态的字符位置 (按字符计数).
    dead_at: Option<usize>,
    verdict: Verdict,
}

impl Walk {
    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    #[must_use]
    pub fn dead_at(&self) -> Option<usize> {
        self.dead_at
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }
}

impl Dfa {
    /// 构造并检查一个自动机.
    /// # Errors
    /// - [`Error::EmptyTable`] 转移表没有状态.
    /// - [`Error::RaggedTable`] 转移表各行列数不一致.
    /// - [`Error::TargetOutOfRange`] 转移到了不存在的状态.
    /// - [`Error::AcceptOutOfRange`] 接受状态不存在.
    pub fn new(
        name: &'static str,
        classifier: Classifier,
        transitions: Vec<Vec<Option<State>>>,
        accept: impl IntoIterator<Item = State>,
    ) -> Result<Self, Error> {
        let states = transitions.len();
        let expected = transitions.first().ok_or(Error::EmptyTable(name))?.len();
        for (state, row) in transitions.iter().enumerate() {
            if row.len() != expected {
                Err(Error::RaggedTable {
                    state,
                    width: row.len(),
                    expected,
                })?
            }
            for (class, target) in row.iter().enumerate() {
                if let Some(target) = *target
                    && target >= states
                {
                    Err(Error::TargetOutOfRange {
                        state,
                        class,
                        target,
                        states,
                    })?
                }
            }
        }
        let accept: BTreeSet<State> = accept.into_iter().collect();
        if let Some(&state) = accept.iter().find(|s| **s >= states) {
            Err(Error::AcceptOutOfRange { state, states })?
        }
        Ok(Self {
            name,
            classifier,
            transitions,
            accept,
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn states(&self) -> usize {
        self.transitions.len()
    }

    /// 字母表大小 (转移表列数).
    #[must_use]
    pub fn classes(&self) -> usize {
        self.transitions.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_accept(&self, state: State) -> bool {
        self.accept.contains(&state)
    }

    #[must_use]
    pub fn classify(&self, c: char) -> usize {
        (self.classifier)(c)
    }

    /// 查询转移表, 超出字母表的列视为死状态.
    #[must_use]
    pub fn next(&self, state: State, class: usize) -> Option<State> {
        self.transitions
            .get(state)
            .and_then(|row| row.get(class))
            .copied()
            .flatten()
    }

    /// 从状态 0 开始逐字符执行, 进入死状态之后立即停止.
    #[must_use]
    pub fn walk(&self, input: &str) -> Walk {
        let mut current = Some(0);
        let mut states = vec![0];
        let mut dead_at = None;
        for (pos, c) in input.chars().enumerate() {
            let class = self.classify(c);
            let Some(state) = current else {
                trace!("{}: dead before {c:?}, stop", self.name);
                break;
            };
            current = self.next(state, class);
            trace!("{}: {state} -- {c:?}({class}) --> {current:?}", self.name);
            match current {
                Some(next) => states.push(next),
                None => dead_at = Some(pos),
            }
        }
        let verdict = match current {
            Some(state) if self.is_accept(state) => Verdict::Accepted,
            _ => Verdict::Rejected,
        };
        Walk {
            states,
            dead_at,
            verdict,
        }
    }

    #[must_use]
    pub fn recognize(&self, input: &str) -> Verdict {
        self.walk(input).verdict()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        dfa::{Classifier, DEAD, Dfa, Verdict},
        error::Error,
    };
    use pretty_assertions::assert_eq;

    // a+b, 字母表: a -> 0, b -> 1, 其他 -> 2
    fn ab() -> Dfa {
        Dfa::new(
            "ab",
            |c| match c {
                'a' => 0,
                'b' => 1,
                _ => 2,
            },
            vec![
                vec![Some(1), DEAD, DEAD],
                vec![Some(1), Some(2), DEAD],
                vec![DEAD, DEAD, DEAD],
            ],
            [2],
        )
        .unwrap()
    }

    #[test]
    fn recognize() {
        let dfa = ab();
        assert_eq!(dfa.recognize("ab"), Verdict::Accepted);
        assert_eq!(dfa.recognize("aaab"), Verdict::Accepted);
        assert_eq!(dfa.recognize(""), Verdict::Rejected);
        assert_eq!(dfa.recognize("b"), Verdict::Rejected);
        // 严格结尾: 接受状态之后不能再有字符.
        assert_eq!(dfa.recognize("abb"), Verdict::Rejected);
        assert_eq!(dfa.recognize("a?b"), Verdict::Rejected);
    }

    #[test]
    fn walk_stops_at_dead() {
        let dfa = ab();
        let walk = dfa.walk("abab");
        assert_eq!(walk.states(), &[0, 1, 2]);
        assert_eq!(walk.dead_at(), Some(2));
        assert_eq!(walk.verdict(), Verdict::Rejected);

        let walk = dfa.walk("aab");
        assert_eq!(walk.states(), &[0, 1, 1, 2]);
        assert_eq!(walk.dead_at(), None);
        assert!(walk.verdict().is_accepted());
    }

    #[test]
    fn class_out_of_table_is_dead() {
        let dfa = Dfa::new("narrow", |_| 7, vec![vec![Some(0)]], [0]).unwrap();
        assert_eq!(dfa.recognize(""), Verdict::Accepted);
        assert_eq!(dfa.recognize("x"), Verdict::Rejected);
    }

    #[test]
    fn invalid_tables() {
        let other: Classifier = |_| 0;
        assert_eq!(
            Dfa::new("empty", other, vec![], [0]).unwrap_err(),
            Error::EmptyTable("empty")
        );
        assert_eq!(
            Dfa::new("ragged", other, vec![vec![DEAD, DEAD], vec![DEAD]], [1]).unwrap_err(),
            Error::RaggedTable {
                state: 1,
                width: 1,
                expected: 2
            }
        );
        assert_eq!(
            Dfa::new("target", other, vec![vec![DEAD, Some(3)]], [0]).unwrap_err(),
            Error::TargetOutOfRange {
                state: 0,
                class: 1,
                target: 3,
                states: 1
            }
        );
        assert_eq!(
            Dfa::new("accept", other, vec![vec![DEAD]], [1]).unwrap_err(),
            Error::AcceptOutOfRange {
                state: 1,
                states: 1
            }
        );
    }
}
