//! 三种词法模式: 变量名, 函数名和循环标签.

use std::fmt::Display;

use tracing::debug;

use crate::{
    dfa::{DEAD, Dfa, State, Verdict},
    error::Error,
};

const X: Option<State> = DEAD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pattern {
    /// `_` 字母+ 数字 字母
    Variable,
    /// 字母+ `Fn`
    Function,
    /// `loop_` 字母+ 数字 数字 `:`
    LoopLabel,
}

impl Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Variable => "VARIABLE",
            Self::Function => "FUNCTION",
            Self::LoopLabel => "LOOP_LABEL",
        })
    }
}

impl Pattern {
    pub const ALL: [Pattern; 3] = [Self::Variable, Self::Function, Self::LoopLabel];

    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Variable => "_letters+[0-9][letter]",
            Self::Function => "letters+Fn",
            Self::LoopLabel => "loop_[letters]+[0-9][0-9]:",
        }
    }

    #[must_use]
    fn index(&self) -> usize {
        match self {
            Self::Variable => 0,
            Self::Function => 1,
            Self::LoopLabel => 2,
        }
    }

    /// 构造这个模式对应的自动机.
    /// # Errors
    /// 见 [`Dfa::new`], 内置的转移表不会触发.
    pub fn dfa(&self) -> Result<Dfa, Error> {
        let name = match self {
            Self::Variable => "variable",
            Self::Function => "function",
            Self::LoopLabel => "loop-label",
        };
        match self {
            Self::Variable => Dfa::new(name, classify_variable, rows(&VARIABLE), [4]),
            Self::Function => Dfa::new(name, classify_function, rows(&FUNCTION), [3]),
            Self::LoopLabel => Dfa::new(name, classify_loop_label, rows(&LOOP_LABEL), [9]),
        }
    }
}

fn rows<const N: usize>(table: &[[Option<State>; N]]) -> Vec<Vec<Option<State>>> {
    table.iter().map(|row| row.to_vec()).collect()
}

// _ -> 0, 字母 -> 1, 数字 -> 2, 其他 -> 3
fn classify_variable(c: char) -> usize {
    match c {
        '_' => 0,
        c if c.is_ascii_alphabetic() => 1,
        c if c.is_ascii_digit() => 2,
        _ => 3,
    }
}

const VARIABLE: [[Option<State>; 4]; 5] = [
    /* S0 */ [Some(1), X, X, X],
    /* S1 */ [X, Some(2), X, X],
    /* S2 */ [X, Some(2), Some(3), X],
    /* S3 */ [X, Some(4), X, X],
    /* S4 */ [X, X, X, X],
];

// F -> 0, n -> 1, 其他字母 -> 2, 其他 -> 3
fn classify_function(c: char) -> usize {
    match c {
        'F' => 0,
        'n' => 1,
        c if c.is_ascii_alphabetic() => 2,
        _ => 3,
    }
}

// S1: 最后一个字符不是 F, S2: 最后一个字符是 F, 只有 S2 上的 n 能到达接受状态.
const FUNCTION: [[Option<State>; 4]; 4] = [
    /* S0 */ [X, X, Some(1), X],
    /* S1 */ [Some(2), X, Some(1), X],
    /* S2 */ [Some(2), Some(3), Some(1), X],
    /* S3 */ [X, X, X, X],
];

// l -> 0, o -> 1, p -> 2, _ -> 3, : -> 4, 数字 -> 5, 其他字母 -> 6, 其他 -> 7
fn classify_loop_label(c: char) -> usize {
    match c {
        'l' => 0,
        'o' => 1,
        'p' => 2,
        '_' => 3,
        ':' => 4,
        c if c.is_ascii_digit() => 5,
        c if c.is_ascii_alphabetic() => 6,
        _ => 7,
    }
}

// S5 之后至少一个字母, 然后恰好两个数字.
const LOOP_LABEL: [[Option<State>; 8]; 10] = [
    /* S0 */ [Some(1), X, X, X, X, X, X, X],
    /* S1 */ [X, Some(2), X, X, X, X, X, X],
    /* S2 */ [X, Some(3), X, X, X, X, X, X],
    /* S3 */ [X, X, Some(4), X, X, X, X, X],
    /* S4 */ [X, X, X, Some(5), X, X, X, X],
    /* S5 */ [Some(6), Some(6), Some(6), X, X, X, Some(6), X],
    // 标签主体, l, o, p 在这里也是普通字母.
    /* S6 */ [Some(6), Some(6), Some(6), X, X, Some(7), Some(6), X],
    /* S7 */ [X, X, X, X, X, Some(8), X, X],
    /* S8 */ [X, X, X, X, Some(9), X, X, X],
    /* S9 */ [X, X, X, X, X, X, X, X],
];

/// 所有模式的自动机, 构造之后只读.
#[derive(Debug, Clone)]
pub struct Registry {
    dfas: Vec<Dfa>,
}

impl Registry {
    /// # Errors
    /// 见 [`Pattern::dfa`].
    pub fn new() -> Result<Self, Error> {
        let dfas = Pattern::ALL
            .iter()
            .map(Pattern::dfa)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { dfas })
    }

    #[must_use]
    pub fn dfa(&self, pattern: Pattern) -> &Dfa {
        &self.dfas[pattern.index()]
    }

    #[must_use]
    pub fn recognize(&self, pattern: Pattern, input: &str) -> Verdict {
        let verdict = self.dfa(pattern).recognize(input);
        debug!("{input:?} as {pattern}: {verdict:?}");
        verdict
    }

    /// 按 [`Pattern::ALL`] 的顺序找到第一个接受输入的模式.
    #[must_use]
    pub fn classify(&self, input: &str) -> Option<Pattern> {
        Pattern::ALL
            .into_iter()
            .find(|p| self.recognize(*p, input).is_accepted())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        dfa::Verdict,
        pattern::{Pattern, Registry},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_tables_are_valid() {
        let registry = Registry::new().unwrap();
        let shape: Vec<_> = Pattern::ALL
            .iter()
            .map(|p| (registry.dfa(*p).states(), registry.dfa(*p).classes()))
            .collect();
        assert_eq!(shape, vec![(5, 4), (4, 4), (10, 8)]);
    }

    #[test]
    fn variable() {
        let registry = Registry::new().unwrap();
        let walk = registry.dfa(Pattern::Variable).walk("_temp5x");
        // 标记, 4 个字母收敛到循环状态, 数字 5, 结尾字母 x.
        assert_eq!(walk.states(), &[0, 1, 2, 2, 2, 2, 3, 4]);
        assert_eq!(walk.verdict(), Verdict::Accepted);
        assert_eq!(
            registry.recognize(Pattern::Variable, "_value"),
            Verdict::Rejected
        );
        assert_eq!(
            registry.recognize(Pattern::Variable, "_temp5xy"),
            Verdict::Rejected
        );
    }

    #[test]
    fn function() {
        let registry = Registry::new().unwrap();
        assert_eq!(
            registry.recognize(Pattern::Function, "computeValueFn"),
            Verdict::Accepted
        );
        assert_eq!(
            registry.recognize(Pattern::Function, "getValue"),
            Verdict::Rejected
        );
        // F 可以重复出现, 之后的普通字母回到主体循环.
        assert_eq!(
            registry.recognize(Pattern::Function, "getFFn"),
            Verdict::Accepted
        );
        assert_eq!(
            registry.recognize(Pattern::Function, "aFbFn"),
            Verdict::Accepted
        );
        assert_eq!(registry.recognize(Pattern::Function, "Fn"), Verdict::Rejected);
        // n 只能作为结尾.
        assert_eq!(
            registry.recognize(Pattern::Function, "runFn"),
            Verdict::Rejected
        );
    }

    #[test]
    fn loop_label() {
        let registry = Registry::new().unwrap();
        assert_eq!(
            registry.recognize(Pattern::LoopLabel, "loop_main01:"),
            Verdict::Accepted
        );
        assert_eq!(
            registry.recognize(Pattern::LoopLabel, "loop_outer99:"),
            Verdict::Accepted
        );
        assert_eq!(
            registry.recognize(Pattern::LoopLabel, "loop_abc1:"),
            Verdict::Rejected
        );
        assert_eq!(
            registry.recognize(Pattern::LoopLabel, "loop_abc123:"),
            Verdict::Rejected
        );
        assert_eq!(
            registry.recognize(Pattern::LoopLabel, "lopo_abc12:"),
            Verdict::Rejected
        );
        assert_eq!(
            registry.recognize(Pattern::LoopLabel, "loop_12:"),
            Verdict::Rejected
        );
    }

    #[test]
    fn classify() {
        let registry = Registry::new().unwrap();
        assert_eq!(registry.classify("_x1y"), Some(Pattern::Variable));
        assert_eq!(registry.classify("xFn"), Some(Pattern::Function));
        assert_eq!(registry.classify("loop_inner00:"), Some(Pattern::LoopLabel));
        assert_eq!(registry.classify("valla"), None);
        assert_eq!(format!("{:<12}|", Pattern::LoopLabel), "LOOP_LABEL  |");
    }
}
