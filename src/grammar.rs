use bumpalo::Bump;
use std::{
    collections::{HashMap, HashSet},
    fmt::{Debug, Display},
};

use tracing::debug;

use crate::{
    NonTerminal, Terminal, Token,
    error::{Error, ParseProductionError},
    token::{EOF, EPSILON},
};

/// 内置的表达式文法, 第一个非终结符是起始符.
pub const EXPRESSION: &str = "E -> T Eprime
Eprime -> + T Eprime | ε
T -> id";

#[derive(Clone, Hash, PartialOrd, Ord)]
pub struct Production<'a> {
    // 产生式 `->` 左侧内容.
    head: NonTerminal<'a>,
    // 产生式 `->` 右侧内容, 为空表示空产生式.
    tail: Vec<Token<'a>>,
}

impl Debug for Production<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Production")
            .field(&format_args!(
                "{:?} -> {}",
                self.head,
                self.tail
                    .iter()
                    .map(|t| format!("{:?} ", t))
                    .collect::<String>()
                    .trim_end()
            ))
            .finish()
    }
}

impl Display for Production<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{} -> {}", self.head, self.tail_str()))
    }
}

impl PartialEq for Production<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.tail == other.tail
    }
}

impl Eq for Production<'_> {}

impl<'a> Production<'a> {
    #[must_use]
    pub fn new(head: NonTerminal<'a>, tail: Vec<Token<'a>>) -> Self {
        Self { head, tail }
    }

    #[must_use]
    pub fn head(&self) -> NonTerminal<'a> {
        self.head
    }

    #[must_use]
    pub fn tail(&self) -> &[Token<'a>] {
        &self.tail
    }

    /// 产生式右侧的文本, 空产生式输出 [`EPSILON`].
    #[must_use]
    pub fn tail_str(&self) -> String {
        if self.tail.is_empty() {
            return EPSILON.to_string();
        }
        self.tail
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tail.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tail.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Grammar<'a> {
    prods: Vec<&'a Production<'a>>,
    /// 按声明顺序排列, 第一个是起始符.
    non_terms: Vec<NonTerminal<'a>>,
    /// 按出现顺序排列, 最后一个一定是 [`EOF`].
    terms: Vec<Terminal<'a>>,
    start: NonTerminal<'a>,
}

impl PartialEq for Grammar<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.prods == other.prods && self.start == other.start && self.terms == other.terms
    }
}

impl Eq for Grammar<'_> {}

impl<'a> Grammar<'a> {
    /// 按产生式编号遍历产生式.
    pub fn prods(&self) -> &[&'a Production<'a>] {
        &self.prods
    }

    #[must_use]
    pub fn prod(&self, idx: usize) -> Option<&'a Production<'a>> {
        self.prods.get(idx).copied()
    }

    #[must_use]
    pub fn symbol_start(&self) -> NonTerminal<'a> {
        self.start
    }

    #[must_use]
    pub fn non_terms(&self) -> &[NonTerminal<'a>] {
        &self.non_terms
    }

    #[must_use]
    pub fn terms(&self) -> &[Terminal<'a>] {
        &self.terms
    }

    #[must_use]
    pub fn index_of_non_term(&self, nt: NonTerminal) -> Option<usize> {
        self.non_terms.iter().position(|x| *x == nt)
    }

    #[must_use]
    pub fn index_of_term(&self, t: Terminal) -> Option<usize> {
        self.terms.iter().position(|x| *x == t)
    }

    /// 内置的四产生式表达式文法:
    /// ```text
    /// 0: E -> T Eprime
    /// 1: Eprime -> + T Eprime
    /// 2: Eprime -> ε
    /// 3: T -> id
    /// ```
    /// # Errors
    /// 见 [`Grammar::from_cfg`], 内置文法不会触发.
    pub fn expression(bump: &'a Bump) -> Result<Self, Error> {
        Self::from_cfg(EXPRESSION, "E".into(), bump)
    }

    /// 解析 `head -> alt | alt` 形式的文法文本, 每行一个非终结符,
    /// 出现在某行头部的符号是非终结符, 其他符号是终结符, [`EPSILON`] 表示空产生式.
    /// # Errors
    /// - [`Error::ParseProductionError`] 文本格式错误或者起始符不存在.
    pub(crate) fn from_cfg(s: &'a str, start: NonTerminal<'_>, bump: &'a Bump) -> Result<Self, Error> {
        let mut non_terms: Vec<NonTerminal<'a>> = Vec::new();
        let mut splitted: Vec<(&str, &str)> = Vec::new();
        // 找出所有的非终结符.
        for (line_num, line) in s
            .lines()
            .enumerate()
            .filter(|(_, s)| !s.is_empty() && s.chars().any(|c| !c.is_whitespace()))
        {
            let parts = line.split_once("->").ok_or(Error::parse_production_error(
                line_num,
                ParseProductionError::NoArrow,
            ))?;
            let head_ident = parts.0.trim();
            if head_ident.is_empty()
                || head_ident == EOF.as_str()
                || head_ident == EPSILON.as_str()
            {
                Err(Error::parse_production_error(
                    line_num,
                    ParseProductionError::ReservedHead(head_ident.to_string()),
                ))?
            }
            splitted.push((head_ident, parts.1));
            let head = NonTerminal::from(head_ident);
            if !non_terms.contains(&head) {
                non_terms.push(head);
            }
        }
        // 起始符排在第一位.
        let start_pos = non_terms
            .iter()
            .position(|nt| nt.as_str() == start.as_str())
            .ok_or(Error::parse_production_error(
                0,
                ParseProductionError::StartSymbolNotFound,
            ))?;
        let start = non_terms.remove(start_pos);
        non_terms.insert(0, start);
        // 解析所有产生式.
        let mut terms = Vec::new();
        let mut prods = Vec::new();
        for (head_ident, tails) in splitted {
            for tail_s in tails.split('|') {
                let tail = tail_s
                    .split_ascii_whitespace()
                    .filter(|s| *s != EPSILON.as_str())
                    .map(|s| {
                        let nt = NonTerminal::from(s);
                        if non_terms.contains(&nt) {
                            Token::from(nt)
                        } else {
                            Token::from(Terminal::from(s))
                        }
                    })
                    .inspect(|tok| {
                        if let Some(t) = tok.as_term()
                            && t != EOF
                            && !terms.contains(&t)
                        {
                            terms.push(t);
                        }
                    })
                    .collect();
                let prod = &*bump.alloc(Production::new(NonTerminal::from(head_ident), tail));
                prods.push(prod);
            }
        }
        terms.push(EOF);
        Ok(Grammar {
            prods,
            non_terms,
            terms,
            start,
        })
    }

    /// 获取以某个非终结符为头部的所有产生式编号, 结果可能为空.
    pub(crate) fn prods_of(&self, nt: NonTerminal<'a>) -> impl Iterator<Item = usize> + '_ {
        self.prods
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.head == nt)
            .map(|(idx, _)| idx)
    }

    /// 计算所有非终结符的 first 集, 可以推出空串的非终结符的 first 集包含 [`EPSILON`].
    ///
    /// 反复扫描所有产生式直到没有变化, 左递归也可以收敛.
    #[must_use]
    pub fn first_sets(&self) -> HashMap<NonTerminal<'a>, HashSet<Terminal<'a>>> {
        let mut sets: HashMap<NonTerminal<'a>, HashSet<Terminal<'a>>> = self
            .non_terms
            .iter()
            .map(|nt| (*nt, HashSet::new()))
            .collect();
        let mut changed = true;
        while changed {
            changed = false;
            for prod in &self.prods {
                let fs = Self::first_of_seq(&sets, prod.tail().iter().copied());
                let entry = sets.entry(prod.head).or_default();
                for t in fs {
                    changed |= entry.insert(t);
                }
            }
        }
        debug!("first sets: {sets:?}");
        sets
    }

    /// 使用已有的 first 集计算一个 token 序列的 first 集.
    ///
    /// 空序列的 first 集只包含 [`EPSILON`].
    pub(crate) fn first_of_seq(
        sets: &HashMap<NonTerminal<'a>, HashSet<Terminal<'a>>>,
        seq: impl Iterator<Item = Token<'a>>,
    ) -> HashSet<Terminal<'a>> {
        let mut first_set = HashSet::new();
        for tok in seq {
            match tok {
                Token::Terminal(t) => {
                    first_set.insert(t);
                    return first_set;
                }
                Token::NonTerminal(nt) => {
                    let fs = sets.get(&nt);
                    first_set.extend(fs.into_iter().flatten().filter(|t| **t != EPSILON));
                    if !fs.is_some_and(|fs| fs.contains(&EPSILON)) {
                        return first_set;
                    }
                }
            }
        }
        first_set.insert(EPSILON);
        first_set
    }

    /// 计算一个 token 序列的 first 集, 序列可以推出空串时结果包含 [`EPSILON`].
    pub fn first_set(&self, seq: impl Iterator<Item = Token<'a>>) -> HashSet<Terminal<'a>> {
        Self::first_of_seq(&self.first_sets(), seq)
    }

    /// 计算所有非终结符的 follow 集, 起始符的 follow 集包含 [`EOF`].
    #[must_use]
    pub fn follow_sets(&self) -> HashMap<NonTerminal<'a>, HashSet<Terminal<'a>>> {
        let firsts = self.first_sets();
        let mut sets: HashMap<NonTerminal<'a>, HashSet<Terminal<'a>>> = self
            .non_terms
            .iter()
            .map(|nt| (*nt, HashSet::new()))
            .collect();
        sets.entry(self.start).or_default().insert(EOF);
        let mut changed = true;
        while changed {
            changed = false;
            for prod in &self.prods {
                for (pos, tok) in prod.tail().iter().enumerate() {
                    let Token::NonTerminal(nt) = tok else {
                        continue;
                    };
                    let rest = Self::first_of_seq(&firsts, prod.tail()[pos + 1..].iter().copied());
                    let mut add: Vec<Terminal<'a>> =
                        rest.iter().copied().filter(|t| *t != EPSILON).collect();
                    if rest.contains(&EPSILON) {
                        add.extend(sets.get(&prod.head).into_iter().flatten().copied());
                    }
                    let entry = sets.entry(*nt).or_default();
                    for t in add {
                        changed |= entry.insert(t);
                    }
                }
            }
        }
        debug!("follow sets: {sets:?}");
        sets
    }

    /// 从起始符开始, 依次用给定的产生式替换最左边的非终结符, 返回最后得到的句型.
    /// # Errors
    /// - [`Error::ProductionOutOfRange`] 产生式编号不存在.
    /// - [`Error::DerivationExhausted`] 句型中已经没有非终结符.
    /// - [`Error::HeadMismatch`] 产生式头部和最左非终结符不一致.
    pub fn derive_leftmost(&self, prods: &[usize]) -> Result<Vec<Token<'a>>, Error> {
        let mut form: Vec<Token<'a>> = vec![self.start.into()];
        for &idx in prods {
            let prod = self.prod(idx).ok_or(Error::ProductionOutOfRange(idx))?;
            let pos = form
                .iter()
                .position(Token::is_non_term)
                .ok_or(Error::DerivationExhausted(idx))?;
            if form[pos] != Token::from(prod.head()) {
                Err(Error::HeadMismatch {
                    prod: idx,
                    non_terminal: form[pos].to_string(),
                })?
            }
            form.splice(pos..=pos, prod.tail().iter().copied());
        }
        Ok(form)
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use crate::{
        NonTerminal, Production, Terminal, Token,
        error::{Error, ParseProductionError},
        grammar::Grammar,
        token::{EOF, EPSILON},
    };
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_productions() {
        let input = "
            stmt -> ifstmt | whilestmt | assgstmt
            program -> compoundstmt
            compoundstmt -> { stmts }
        ";
        let bump = Bump::new();
        let grammar = Grammar::from_cfg(input, "program".into(), &bump).unwrap();

        let prods = [
            Production::new("stmt".into(), vec![Terminal::from("ifstmt").into()]),
            Production::new("stmt".into(), vec![Terminal::from("whilestmt").into()]),
            Production::new("stmt".into(), vec![Terminal::from("assgstmt").into()]),
            Production::new(
                "program".into(),
                vec![NonTerminal::from("compoundstmt").into()],
            ),
            Production::new(
                "compoundstmt".into(),
                vec![
                    Terminal::from("{").into(),
                    Terminal::from("stmts").into(),
                    Terminal::from("}").into(),
                ],
            ),
        ];

        assert_eq!(grammar.start, "program".into());
        assert_eq!(grammar.prods, prods.iter().collect::<Vec<_>>());
        assert_eq!(
            grammar.non_terms,
            vec![
                NonTerminal::from("program"),
                NonTerminal::from("stmt"),
                NonTerminal::from("compoundstmt")
            ]
        );
        assert_eq!(
            grammar.terms,
            vec![
                Terminal::from("ifstmt"),
                Terminal::from("whilestmt"),
                Terminal::from("assgstmt"),
                Terminal::from("{"),
                Terminal::from("stmts"),
                Terminal::from("}"),
                EOF,
            ]
        );
    }

    #[test]
    fn parse_errors() {
        let bump = Bump::new();
        assert_eq!(
            Grammar::from_cfg("S -> a\nS a", "S".into(), &bump),
            Err(Error::ParseProductionError {
                line: 1,
                cause: ParseProductionError::NoArrow
            })
        );
        assert_eq!(
            Grammar::from_cfg("S -> a", "T".into(), &bump),
            Err(Error::ParseProductionError {
                line: 0,
                cause: ParseProductionError::StartSymbolNotFound
            })
        );
        assert_eq!(
            Grammar::from_cfg("S -> a\n$ -> b", "S".into(), &bump),
            Err(Error::ParseProductionError {
                line: 1,
                cause: ParseProductionError::ReservedHead("$".into())
            })
        );
    }

    #[test]
    fn expression() {
        let bump = Bump::new();
        let grammar = Grammar::expression(&bump).unwrap();
        assert_eq!(
            grammar.prods().iter().map(|p| p.to_string()).collect::<Vec<_>>(),
            vec![
                "E -> T Eprime",
                "Eprime -> + T Eprime",
                "Eprime -> ε",
                "T -> id"
            ]
        );
        assert_eq!(
            grammar.non_terms(),
            &[
                NonTerminal::from("E"),
                NonTerminal::from("Eprime"),
                NonTerminal::from("T")
            ]
        );
        assert_eq!(
            grammar.terms(),
            &[Terminal::from("+"), Terminal::from("id"), EOF]
        );
        assert!(grammar.prod(2).unwrap().is_empty());
    }

    #[test]
    fn first_and_follow() {
        let bump = Bump::new();
        let grammar = Grammar::expression(&bump).unwrap();
        let id = Terminal::from("id");
        let plus = Terminal::from("+");
        let (e, e_prime, t) = (
            NonTerminal::from("E"),
            NonTerminal::from("Eprime"),
            NonTerminal::from("T"),
        );
        let firsts = grammar.first_sets();
        assert_eq!(firsts[&e], [id].into());
        assert_eq!(firsts[&e_prime], [plus, EPSILON].into());
        assert_eq!(firsts[&t], [id].into());
        assert_eq!(
            grammar.first_set([NonTerminal::from("Eprime").into()].into_iter()),
            [plus, EPSILON].into()
        );
        assert_eq!(grammar.first_set(std::iter::empty()), [EPSILON].into());

        let follows = grammar.follow_sets();
        assert_eq!(follows[&e], [EOF].into());
        assert_eq!(follows[&e_prime], [EOF].into());
        assert_eq!(follows[&t], [plus, EOF].into());
    }

    #[test]
    fn first_with_left_recursion() {
        let bump = Bump::new();
        let grammar = Grammar::from_cfg(
            "program -> stmts
            stmts -> { stmt stmts } | stmt | ε | program",
            "program".into(),
            &bump,
        )
        .unwrap();
        let expected: HashSet<Terminal> =
            [Terminal::from("{"), Terminal::from("stmt"), EPSILON].into();
        assert_eq!(
            grammar.first_set([NonTerminal::from("stmts").into()].into_iter()),
            expected
        );
        assert_eq!(
            grammar.first_set([NonTerminal::from("program").into()].into_iter()),
            expected
        );
    }

    #[test]
    fn derive_leftmost() {
        let bump = Bump::new();
        let grammar = Grammar::expression(&bump).unwrap();
        let id: Token = Terminal::from("id").into();
        let plus: Token = Terminal::from("+").into();
        assert_eq!(
            grammar.derive_leftmost(&[0, 3, 1, 3, 2]).unwrap(),
            vec![id, plus, id]
        );
        assert_eq!(
            grammar.derive_leftmost(&[0, 3]).unwrap(),
            vec![id, NonTerminal::from("Eprime").into()]
        );
        assert_eq!(
            grammar.derive_leftmost(&[1]),
            Err(Error::HeadMismatch {
                prod: 1,
                non_terminal: "E".into()
            })
        );
        assert_eq!(
            grammar.derive_leftmost(&[0, 3, 2, 3]),
            Err(Error::DerivationExhausted(3))
        );
        assert_eq!(
            grammar.derive_leftmost(&[9]),
            Err(Error::ProductionOutOfRange(9))
        );
    }
}
