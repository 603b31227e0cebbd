#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("Error parsing productions, line: {line}, cause: {cause:?}.")]
    ParseProductionError {
        line: usize,
        cause: ParseProductionError,
    },
    #[error("Transition table of `{0}` has no states.")]
    EmptyTable(&'static str),
    #[error("Transition table row {state} has {width} columns, expected {expected}.")]
    RaggedTable {
        state: usize,
        width: usize,
        expected: usize,
    },
    #[error("Transition ({state}, {class}) targets state {target}, but there are only {states} states.")]
    TargetOutOfRange {
        state: usize,
        class: usize,
        target: usize,
        states: usize,
    },
    #[error("Accept state {state} is out of range, there are only {states} states.")]
    AcceptOutOfRange { state: usize, states: usize },
    #[error("Grammar does not contain the production: {0}.")]
    ProductionOutOfRange(usize),
    #[error("Production {prod} does not expand the non-terminal: {non_terminal}.")]
    HeadMismatch { prod: usize, non_terminal: String },
    #[error("Derivation has no non-terminal left for production {0}.")]
    DerivationExhausted(usize),
    #[error("Grammar does not contain the non-terminal: {0}.")]
    NonTerminalNotFound(String),
    #[error("Grammar does not contain the terminal: {0}.")]
    TerminalNotFound(String),
    #[error("Parse table is not LL(1), conflict at ({non_terminal}, {terminal}).")]
    ConflictingTable {
        non_terminal: String,
        terminal: String,
    },
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum ParseProductionError {
    #[error("No arrow in production line")]
    NoArrow,
    #[error("Reserved symbol used as production head: {0}")]
    ReservedHead(String),
    #[error("Start symbol not found")]
    StartSymbolNotFound,
}

impl Error {
    pub(crate) fn parse_production_error(line: usize, cause: ParseProductionError) -> Self {
        Self::ParseProductionError { line, cause }
    }
}
