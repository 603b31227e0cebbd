use std::fmt::{Debug, Display};

#[derive(PartialEq, Eq, Clone, Hash, Copy, PartialOrd, Ord)]
pub struct Terminal<'a> {
    ident: &'a str,
}

impl Debug for Terminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!(r#"t{:?}"#, self.ident))
    }
}

impl Display for Terminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.ident)
    }
}

impl<'a> From<&'a str> for Terminal<'a> {
    fn from(ident: &'a str) -> Self {
        Terminal { ident }
    }
}

impl<'a> Terminal<'a> {
    pub fn as_str(&self) -> &'a str {
        self.ident
    }
}

#[derive(PartialEq, Eq, Clone, Hash, Copy, PartialOrd, Ord)]
pub struct NonTerminal<'a> {
    ident: &'a str,
}

impl Debug for NonTerminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!(r#"nt{:?}"#, self.ident))
    }
}

impl Display for NonTerminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.ident)
    }
}

/// 产生式右侧的空串标记, 只出现在文法文本中, 解析之后的产生式尾部不包含它.
pub const EPSILON: Terminal<'static> = Terminal { ident: "ε" };
/// 输入结束标记.
pub const EOF: Terminal<'static> = Terminal { ident: "$" };

impl<'a> From<&'a str> for NonTerminal<'a> {
    fn from(ident: &'a str) -> Self {
        Self { ident }
    }
}

impl<'a> NonTerminal<'a> {
    pub fn as_str(&self) -> &'a str {
        self.ident
    }
}

#[derive(Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Token<'a> {
    Terminal(Terminal<'a>),
    NonTerminal(NonTerminal<'a>),
}

impl Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal(arg0) => f.pad(&format!("{:?}", arg0)),
            Self::NonTerminal(arg0) => f.pad(&format!("{:?}", arg0)),
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal(arg0) => f.pad(&format!("{}", arg0)),
            Self::NonTerminal(arg0) => f.pad(&format!("{}", arg0)),
        }
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Terminal(l0), Self::Terminal(r0)) => l0 == r0,
            (Self::NonTerminal(l0), Self::NonTerminal(r0)) => l0 == r0,
            _ => false,
        }
    }
}

impl Eq for Token<'_> {}

impl<'a> Token<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Terminal(t) => t.as_str(),
            Self::NonTerminal(nt) => nt.as_str(),
        }
    }

    #[must_use]
    pub fn is_term(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    #[must_use]
    pub fn is_non_term(&self) -> bool {
        matches!(self, Self::NonTerminal(_))
    }

    #[must_use]
    pub fn as_term(&self) -> Option<Terminal<'a>> {
        match self {
            Self::Terminal(t) => Some(*t),
            Self::NonTerminal(_) => None,
        }
    }

    #[must_use]
    pub fn as_non_term(&self) -> Option<NonTerminal<'a>> {
        match self {
            Self::NonTerminal(nt) => Some(*nt),
            Self::Terminal(_) => None,
        }
    }
}

impl<'a> From<Terminal<'a>> for Token<'a> {
    fn from(value: Terminal<'a>) -> Self {
        Self::Terminal(value)
    }
}

impl<'a> From<NonTerminal<'a>> for Token<'a> {
    fn from(value: NonTerminal<'a>) -> Self {
        Self::NonTerminal(value)
    }
}

/// 按空白字符切分输入句子, 得到终结符序列.
///
/// 如果序列为空或者最后一个终结符不是 [`EOF`], 那么在末尾追加 [`EOF`],
/// 因此对已经以 [`EOF`] 结尾的句子再次切分不会产生第二个 [`EOF`].
#[must_use]
pub fn tokenize(sentence: &str) -> Vec<Terminal<'_>> {
    let mut terms: Vec<Terminal> = sentence.split_whitespace().map(Terminal::from).collect();
    if terms.last() != Some(&EOF) {
        terms.push(EOF);
    }
    terms
}

#[cfg(test)]
mod test {
    use crate::token::{EOF, NonTerminal, Terminal, Token, tokenize};
    use pretty_assertions::assert_eq;

    #[test]
    fn tokenize_appends_eof() {
        assert_eq!(
            tokenize("id + id"),
            vec![
                Terminal::from("id"),
                Terminal::from("+"),
                Terminal::from("id"),
                EOF
            ]
        );
        assert_eq!(tokenize("  \t\n"), vec![EOF]);
        assert_eq!(tokenize(""), vec![EOF]);
    }

    #[test]
    fn tokenize_keeps_single_eof() {
        let once = tokenize("id + id $");
        assert_eq!(once.iter().filter(|t| **t == EOF).count(), 1);
        let sentence = once
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(tokenize(&sentence), once);
        // 中间的 `$` 不算结尾.
        assert_eq!(
            tokenize("id $ id"),
            vec![
                Terminal::from("id"),
                EOF,
                Terminal::from("id"),
                EOF
            ]
        );
    }

    #[test]
    fn token_kinds() {
        let t: Token = Terminal::from("id").into();
        let nt: Token = NonTerminal::from("id").into();
        assert_ne!(t, nt);
        assert!(t.is_term());
        assert!(nt.is_non_term());
        assert_eq!(t.as_term(), Some(Terminal::from("id")));
        assert_eq!(nt.as_term(), None);
        assert_eq!(format!("{t:?} {nt:?}"), r#"t"id" nt"id""#);
    }
}
