//! Evaluation of operand expressions.
//!
//! Evaluation never fails.  An undefined symbol has the value zero
//! and division by zero yields zero; the caller decides whether (and
//! when) to report these, because only the second pass should.
use super::ast::{BinaryOperator, Expression};
use super::symbol::SymbolName;
use super::symtab::{Lookup, SymbolTable};

#[derive(Debug, Clone, Copy)]
pub(crate) struct EvaluationContext<'a> {
    pub(crate) symbols: &'a SymbolTable,
    /// The value of `*`.
    pub(crate) here: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Evaluation {
    pub(crate) value: u16,
    /// Names which had no definition, in the order they were met.
    pub(crate) undefined: Vec<SymbolName>,
    /// Set if the expression uses a name declared with `EXTRN`,
    /// whose value is not known until link time.
    pub(crate) external: bool,
    pub(crate) division_by_zero: bool,
}

impl Evaluation {
    /// True when every symbol the expression used was defined (or
    /// external).
    pub(crate) fn is_defined(&self) -> bool {
        self.undefined.is_empty()
    }
}

fn quoted_value(text: &str) -> u16 {
    text.chars()
        .next()
        .map_or(0, |ch| u16::try_from(u32::from(ch) & 0xFFFF).unwrap_or(0))
}

fn apply(op: BinaryOperator, left: u16, right: u16, result: &mut Evaluation) -> u16 {
    match op {
        BinaryOperator::Add => left.wrapping_add(right),
        BinaryOperator::Subtract => left.wrapping_sub(right),
        BinaryOperator::Multiply => left.wrapping_mul(right),
        BinaryOperator::Divide => match left.checked_div(right) {
            Some(quotient) => quotient,
            None => {
                result.division_by_zero = true;
                0
            }
        },
    }
}

fn eval_into(expr: &Expression, ctx: &EvaluationContext<'_>, result: &mut Evaluation) -> u16 {
    match expr {
        Expression::Literal(n) => *n,
        Expression::Here => ctx.here,
        Expression::Quoted(text) => quoted_value(text),
        Expression::Symbol(name) => match ctx.symbols.lookup(name) {
            Lookup::Defined(value) => value,
            Lookup::External => {
                result.external = true;
                0
            }
            Lookup::Undefined => {
                if !result.undefined.contains(name) {
                    result.undefined.push(name.clone());
                }
                0
            }
        },
        Expression::Select(select, inner) => select.apply(eval_into(inner, ctx, result)),
        Expression::Binary(op, left, right) => {
            let l = eval_into(left, ctx, result);
            let r = eval_into(right, ctx, result);
            apply(*op, l, r, result)
        }
    }
}

pub(crate) fn evaluate(expr: &Expression, ctx: &EvaluationContext<'_>) -> Evaluation {
    let mut result = Evaluation::default();
    result.value = eval_into(expr, ctx, &mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ByteSelect;
    use crate::parser::parse_source;
    use crate::source::SourcePosition;
    use test_strategy::proptest;

    fn operand(text: &str) -> Expression {
        parse_source(&format!(" DW {text}"))
            .into_iter()
            .next()
            .and_then(|st| st.operand)
            .expect("test input should have an operand")
    }

    fn eval_with(text: &str, symbols: &SymbolTable, here: u16) -> Evaluation {
        evaluate(&operand(text), &EvaluationContext { symbols, here })
    }

    fn eval(text: &str) -> u16 {
        let e = eval_with(text, &SymbolTable::default(), 0x1000);
        assert!(e.is_defined());
        e.value
    }

    #[test]
    fn test_left_to_right() {
        assert_eq!(eval("2+3*4"), 20);
        assert_eq!(eval("10-2-3"), 5);
        assert_eq!(eval("2*(3+4)"), 14);
        assert_eq!(eval("7/2"), 3);
    }

    #[test]
    fn test_wrapping() {
        assert_eq!(eval("$FFFF+2"), 1);
        assert_eq!(eval("0-1"), 0xFFFF);
        assert_eq!(eval("$100*$100"), 0);
        assert_eq!(eval("-1"), 0xFFFF);
    }

    #[test]
    fn test_here_and_quoted() {
        assert_eq!(eval("*"), 0x1000);
        assert_eq!(eval("*+2"), 0x1002);
        assert_eq!(eval("\"A\""), 0x41);
        assert_eq!(eval("'Z'+1"), 0x5B);
        let symbols = SymbolTable::default();
        let ctx = EvaluationContext {
            symbols: &symbols,
            here: 0,
        };
        assert_eq!(evaluate(&Expression::Quoted(String::new()), &ctx).value, 0);
    }

    #[test]
    fn test_byte_select() {
        assert_eq!(eval("<$1234"), 0x34);
        assert_eq!(eval(">$1234"), 0x12);
        let e = Expression::Select(ByteSelect::High, Box::new(Expression::Here));
        let symbols = SymbolTable::default();
        assert_eq!(
            evaluate(&e, &EvaluationContext { symbols: &symbols, here: 0xBEEF }).value,
            0xBE
        );
    }

    #[test]
    fn test_symbols() {
        let mut symbols = SymbolTable::default();
        symbols.define(SymbolName::from("BUF"), 0x2000, SourcePosition::default());
        symbols.declare_external(SymbolName::from("COUT"));
        assert_eq!(eval_with("BUF+1", &symbols, 0).value, 0x2001);
        let e = eval_with("COUT", &symbols, 0);
        assert_eq!(e.value, 0);
        assert!(e.is_defined());
        assert!(e.external);
        assert!(!eval_with("BUF", &symbols, 0).external);
        let e = eval_with("MISSING+MISSING+OTHER", &symbols, 0);
        assert_eq!(e.value, 0);
        assert_eq!(
            e.undefined,
            vec![SymbolName::from("MISSING"), SymbolName::from("OTHER")]
        );
    }

    #[test]
    fn test_division_by_zero() {
        let e = eval_with("5/0", &SymbolTable::default(), 0);
        assert_eq!(e.value, 0);
        assert!(e.division_by_zero);
    }

    #[proptest]
    fn addition_wraps(a: u16, b: u16) {
        let expr = Expression::Binary(
            BinaryOperator::Add,
            Box::new(Expression::Literal(a)),
            Box::new(Expression::Literal(b)),
        );
        let symbols = SymbolTable::default();
        let got = evaluate(&expr, &EvaluationContext { symbols: &symbols, here: 0 });
        assert_eq!(got.value, a.wrapping_add(b));
    }
}
