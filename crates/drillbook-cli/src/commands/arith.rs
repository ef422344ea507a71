//! The `drillbook arith` command.

use anyhow::{Context, Result};

use drillbook_core::config::Quiz;
use drillbook_core::generator::{ArithmeticQuiz, QuestionGenerator};
use drillbook_core::range_spec::OperandSpec;

use super::drill;
use crate::SessionArgs;

pub fn execute(
    left: Option<String>,
    right: Option<String>,
    digits: Option<String>,
    args: SessionArgs,
) -> Result<()> {
    let config = drill::resolve_config(&args, Quiz::Arithmetic)?;

    let quiz = match (left, right, digits) {
        (_, _, Some(digits)) => {
            let (n, m) = parse_digits(&digits)?;
            ArithmeticQuiz::digits(n, m)?
        }
        (Some(left), Some(right), None) => {
            let left = OperandSpec::parse(&left).context("invalid left operand")?;
            let right = OperandSpec::parse(&right).context("invalid right operand")?;
            ArithmeticQuiz::new(left, right)
        }
        _ => anyhow::bail!("give either --left and --right, or --digits NxM"),
    };

    let detail = format!("{} × {}", quiz.left(), quiz.right());
    println!("Multiplying {detail}");

    let generator = QuestionGenerator::new(Box::new(quiz))
        .with_replay_probability(config.arithmetic_replay_probability)?;

    drill::run_session(generator, detail, &config, Quiz::Arithmetic, args.seed)
}

/// Parse "NxM" into two digit counts.
fn parse_digits(input: &str) -> Result<(u32, u32)> {
    let (n, m) = input
        .split_once(['x', 'X', '×'])
        .with_context(|| format!("expected digit counts like 2x3, got '{input}'"))?;
    let n = n
        .trim()
        .parse()
        .with_context(|| format!("invalid digit count '{n}'"))?;
    let m = m
        .trim()
        .parse()
        .with_context(|| format!("invalid digit count '{m}'"))?;
    Ok((n, m))
}
