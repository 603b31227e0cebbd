use std::{
    error::Error,
    io::{self, BufRead, Write},
};

use bumpalo::Bump;
use clap::Parser as _;
use ll_analysis::*;
use tracing::{info, level_filters::LevelFilter};

#[derive(clap::Parser)]
struct AppArgs {
    /// 日志详细程度, 可以重复: -v info, -vv debug, -vvv trace.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// 读取标准输入直到遇到结束行, 然后运行内置的词法和语法分析演示.
    Demo {
        #[clap(long, default_value = "END")]
        sentinel: String,
        #[clap(long, default_value = "id + id")]
        sentence: String,
    },
    /// 使用 DFA 识别输入, 不指定模式时依次尝试所有模式.
    Lex {
        #[clap(short, long, value_enum)]
        pattern: Option<PatternArg>,
        #[clap(required = true)]
        inputs: Vec<String>,
    },
    /// 使用 LL(1) 预测分析器分析一个以空白分隔的句子.
    Parse {
        /// 使用由 first / follow 集构造的分析表, 而不是手写的分析表.
        #[clap(short, long)]
        built: bool,
        /// 同时输出预测分析表.
        #[clap(long)]
        table: bool,
        sentence: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum PatternArg {
    Variable,
    Function,
    LoopLabel,
}

impl From<PatternArg> for Pattern {
    fn from(value: PatternArg) -> Self {
        match value {
            PatternArg::Variable => Pattern::Variable,
            PatternArg::Function => Pattern::Function,
            PatternArg::LoopLabel => Pattern::LoopLabel,
        }
    }
}

const DEMO_INPUTS: [(Pattern, &[&str]); 3] = [
    (
        Pattern::Variable,
        &["_temp5x", "_abc9z", "_x1y", "_value", "_val1", "valla"],
    ),
    (
        Pattern::Function,
        &[
            "computeValueFn",
            "getFn",
            "processFn",
            "xFn",
            "Fn",
            "computeFn",
            "getValue",
        ],
    ),
    (
        Pattern::LoopLabel,
        &["loop_main01:", "loop_outer99:", "loop_inner00:", "loop_abc1:"],
    ),
];

fn init_logging(verbose: u8) {
    use tracing_subscriber::{Layer, fmt, layer::SubscriberExt, registry, util::SubscriberInitExt};

    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let layer = fmt::layer()
        .without_time()
        .with_writer(io::stderr)
        .with_filter(level);
    registry().with(layer).init();
}

/// 读取并丢弃输入行, 直到某一行包含 `sentinel` 或者输入结束.
fn skip_until(input: impl BufRead, sentinel: &str) -> io::Result<usize> {
    let mut skipped = 0;
    for line in input.lines() {
        if line?.contains(sentinel) {
            break;
        }
        skipped += 1;
    }
    Ok(skipped)
}

fn print_outcome(outcome: &Outcome, grammar: &Grammar) {
    println!("{}", outcome.trace().to_table(grammar));
    match outcome.reason() {
        None => println!("\nACCEPTED"),
        Some(reason) => println!("\nREJECTED: {reason}"),
    }
}

fn demo(sentinel: &str, sentence: &str) -> Result<(), Box<dyn Error>> {
    println!("Enter program code (end with a line containing {sentinel}):");
    io::stdout().flush()?;
    let skipped = skip_until(io::stdin().lock(), sentinel)?;
    info!("skipped {skipped} lines");

    let registry = Registry::new()?;
    for (pattern, inputs) in DEMO_INPUTS {
        println!("\n--- {pattern} Tests ({}) ---", pattern.describe());
        for input in inputs {
            let verdict = registry.recognize(pattern, input);
            let label = if verdict.is_accepted() {
                pattern.to_string()
            } else {
                "Rejected".to_string()
            };
            println!("{input:<16} -> {label}");
        }
    }

    println!("\n--- LL(1) Parser Demo (showing Stack) ---");
    println!("Input string: {sentence}");
    let bump = Bump::new();
    let grammar = Grammar::expression(&bump)?;
    let table = ParseTable::expression(&grammar)?;
    let outcome = ll_analysis::Parser::new(&table)?.parse_sentence(sentence);
    print_outcome(&outcome, &grammar);
    Ok(())
}

fn lex(pattern: Option<Pattern>, inputs: &[String]) -> Result<(), Box<dyn Error>> {
    let registry = Registry::new()?;
    for input in inputs {
        let matched = match pattern {
            Some(pattern) => registry
                .recognize(pattern, input)
                .is_accepted()
                .then_some(pattern),
            None => registry.classify(input),
        };
        match matched {
            Some(pattern) => println!("{input:<16} -> {pattern}"),
            None => println!("{input:<16} -> Rejected"),
        }
    }
    Ok(())
}

fn parse(built: bool, show_table: bool, sentence: &str) -> Result<(), Box<dyn Error>> {
    let bump = Bump::new();
    let grammar = Grammar::expression(&bump)?;
    for (idx, prod) in grammar.prods().iter().enumerate() {
        info!("{idx:>4} {prod}");
    }
    let table = if built {
        ParseTable::build_from(&grammar)
    } else {
        ParseTable::expression(&grammar)?
    };
    if show_table {
        println!("{}\n", table.to_markdown());
    }
    let outcome = ll_analysis::Parser::new(&table)?.parse_sentence(sentence);
    print_outcome(&outcome, &grammar);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = AppArgs::parse();
    init_logging(args.verbose);
    match args.command {
        None => demo("END", "id + id"),
        Some(Command::Demo { sentinel, sentence }) => demo(&sentinel, &sentence),
        Some(Command::Lex { pattern, inputs }) => lex(pattern.map(Pattern::from), &inputs),
        Some(Command::Parse {
            built,
            table,
            sentence,
        }) => parse(built, table, &sentence),
    }
}
