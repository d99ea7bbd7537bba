// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the SQL expression parser.

//  Heavily inspired by
//    https://matklad.github.io/2020/04/13/simple-but-powerful-pratt-parsing.html
//    https://arzg.github.io/lang/10/

use super::{is_select_start, parse_ident, parse_type_name};
use crate::ast::{
    BindParamKind, BindParameter, CaseArm, ColumnRef, ColumnTarget, ExprKind, Expression,
    FunctionArgs, Literal, Operator, RaiseAction,
};
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::util::SqlIdent;
use text_size::TextSize;

/// Upper bound of `BETWEEN` binds one step above `AND`, so the separating
/// `AND` stays with the `BETWEEN`.
const BETWEEN_UPPER_BP: u8 = 3;
/// Operands of the equality family bind one step above their own level.
const COMPARISON_OPERAND_BP: u8 = 5;

pub(crate) fn parse_expr(p: &mut Parser) -> Expression {
    expr_bp(p, 0)
}

fn mk(p: &mut Parser, start: TextSize, kind: ExprKind) -> Expression {
    Expression {
        id: p.next_id(),
        range: p.span_from(start),
        kind,
    }
}

fn expr_bp(p: &mut Parser, min_bp: u8) -> Expression {
    let start = p.current_range().start();
    let mut lhs = parse_primary(p, start);

    loop {
        // Postfix forms first: `ISNULL`, `NOTNULL`, `NOT NULL`, `COLLATE`.
        match p.current() {
            TokenKind::IsNullKw => {
                let bp = Operator::IsNull.postfix_precedence().unwrap();
                if bp < min_bp {
                    break;
                }
                p.bump();
                lhs = mk(
                    p,
                    start,
                    ExprKind::Postfix {
                        expr: Box::new(lhs),
                        op: Operator::IsNull,
                    },
                );
                continue;
            }
            TokenKind::NotNullKw => {
                let bp = Operator::NotNull.postfix_precedence().unwrap();
                if bp < min_bp {
                    break;
                }
                p.bump();
                lhs = mk(
                    p,
                    start,
                    ExprKind::Postfix {
                        expr: Box::new(lhs),
                        op: Operator::NotNull,
                    },
                );
                continue;
            }
            TokenKind::NotKw if p.nth(1) == TokenKind::NullKw => {
                let bp = Operator::NotNull.postfix_precedence().unwrap();
                if bp < min_bp {
                    break;
                }
                p.bump();
                p.bump();
                lhs = mk(
                    p,
                    start,
                    ExprKind::Postfix {
                        expr: Box::new(lhs),
                        op: Operator::NotNull,
                    },
                );
                continue;
            }
            TokenKind::CollateKw => {
                let bp = Operator::Collate.postfix_precedence().unwrap();
                if bp < min_bp {
                    break;
                }
                p.bump();
                let collation = match parse_ident(p) {
                    Some(ident) => ident,
                    None => break,
                };
                lhs = mk(
                    p,
                    start,
                    ExprKind::Collate {
                        expr: Box::new(lhs),
                        collation,
                    },
                );
                continue;
            }
            _ => {}
        }

        let Some((op, negated)) = guess_infix_operator(p) else {
            break;
        };
        let bp = op.infix_precedence().unwrap();
        if bp < min_bp {
            break;
        }

        if negated {
            p.bump();
        }

        match op {
            Operator::Between => {
                p.bump();
                let lower = expr_bp(p, COMPARISON_OPERAND_BP);
                p.expect(TokenKind::AndKw);
                let upper = expr_bp(p, BETWEEN_UPPER_BP);
                lhs = mk(
                    p,
                    start,
                    ExprKind::Between {
                        not: negated,
                        expr: Box::new(lhs),
                        lower: Box::new(lower),
                        upper: Box::new(upper),
                    },
                );
            }
            Operator::Is => {
                p.bump();
                let op = consume_is_variant(p);
                let rhs = expr_bp(p, COMPARISON_OPERAND_BP);
                lhs = mk(
                    p,
                    start,
                    ExprKind::Infix {
                        lhs: Box::new(lhs),
                        op,
                        rhs: Box::new(rhs),
                    },
                );
            }
            Operator::In => {
                p.bump();
                let rhs = parse_in_rhs(p);
                let op = if negated { Operator::NotIn } else { Operator::In };
                lhs = mk(
                    p,
                    start,
                    ExprKind::Infix {
                        lhs: Box::new(lhs),
                        op,
                        rhs: Box::new(rhs),
                    },
                );
            }
            _ => {
                p.bump();
                let op = if negated { op.negated().unwrap_or(op) } else { op };
                let rhs = expr_bp(p, bp + 1);
                lhs = mk(
                    p,
                    start,
                    ExprKind::Infix {
                        lhs: Box::new(lhs),
                        op,
                        rhs: Box::new(rhs),
                    },
                );
            }
        }
    }

    lhs
}

/// Looks at the current (and for `NOT …` the next) token and names the infix
/// operator it starts, without consuming anything. The `IS` family is
/// reported as [`Operator::Is`]; the consumer extends it to the longest
/// matching form.
fn guess_infix_operator(p: &Parser) -> Option<(Operator, bool)> {
    let op = match p.current() {
        TokenKind::PipePipe => Operator::Concat,
        TokenKind::Arrow => Operator::Extract,
        TokenKind::LongArrow => Operator::ExtractText,
        TokenKind::Asterisk => Operator::Multiply,
        TokenKind::Slash => Operator::Divide,
        TokenKind::Percent => Operator::Modulo,
        TokenKind::Plus => Operator::Add,
        TokenKind::Minus => Operator::Subtract,
        TokenKind::Ampersand => Operator::BitAnd,
        TokenKind::Pipe => Operator::BitOr,
        TokenKind::ShiftLeft => Operator::ShiftLeft,
        TokenKind::ShiftRight => Operator::ShiftRight,
        TokenKind::EscapeKw => Operator::Escape,
        TokenKind::Less => Operator::Less,
        TokenKind::LessEq => Operator::LessEq,
        TokenKind::Greater => Operator::Greater,
        TokenKind::GreaterEq => Operator::GreaterEq,
        TokenKind::Eq | TokenKind::EqEq => Operator::Eq,
        TokenKind::BangEq | TokenKind::NotEq => Operator::NotEq,
        TokenKind::IsKw => Operator::Is,
        TokenKind::BetweenKw => Operator::Between,
        TokenKind::InKw => Operator::In,
        TokenKind::MatchKw => Operator::Match,
        TokenKind::LikeKw => Operator::Like,
        TokenKind::RegexpKw => Operator::Regexp,
        TokenKind::GlobKw => Operator::Glob,
        TokenKind::AndKw => Operator::And,
        TokenKind::OrKw => Operator::Or,
        TokenKind::NotKw => {
            let op = match p.nth(1) {
                TokenKind::BetweenKw => Operator::Between,
                TokenKind::InKw => Operator::In,
                TokenKind::MatchKw => Operator::Match,
                TokenKind::LikeKw => Operator::Like,
                TokenKind::RegexpKw => Operator::Regexp,
                TokenKind::GlobKw => Operator::Glob,
                _ => return None,
            };
            debug_assert!(op.negatable());
            return Some((op, true));
        }
        _ => return None,
    };
    Some((op, false))
}

/// Called with the `IS` already consumed; picks the longest of `IS`,
/// `IS NOT`, `IS DISTINCT FROM` and `IS NOT DISTINCT FROM`.
fn consume_is_variant(p: &mut Parser) -> Operator {
    if p.eat(TokenKind::NotKw) {
        if p.eat(TokenKind::DistinctKw) {
            p.expect(TokenKind::FromKw);
            Operator::IsNotDistinctFrom
        } else {
            Operator::IsNot
        }
    } else if p.eat(TokenKind::DistinctKw) {
        p.expect(TokenKind::FromKw);
        Operator::IsDistinctFrom
    } else {
        Operator::Is
    }
}

/// The right-hand side of `IN`: a subquery, a parenthesized list (kept as a
/// list even with one element), a bind parameter to be splatted, or a table
/// name.
fn parse_in_rhs(p: &mut Parser) -> Expression {
    let start = p.current_range().start();
    if p.at(TokenKind::LParen) {
        if is_select_start(p.nth(1)) {
            p.bump();
            let select = super::query::parse_select(p, None);
            p.expect(TokenKind::RParen);
            return mk(p, start, ExprKind::Subquery(Box::new(select)));
        }
        p.bump();
        let mut exprs = Vec::new();
        if !p.at(TokenKind::RParen) {
            loop {
                exprs.push(parse_expr(p));
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        p.expect(TokenKind::RParen);
        return mk(p, start, ExprKind::Grouped { exprs });
    }
    expr_bp(p, COMPARISON_OPERAND_BP)
}

fn parse_primary(p: &mut Parser, start: TextSize) -> Expression {
    match p.current() {
        TokenKind::Integer => {
            let token = p.bump();
            let text = token.text.replace('_', "");
            let literal = match text.parse::<i64>() {
                Ok(value) => Literal::Integer(value),
                // Integers beyond i64 fall back to real, as SQLite stores them.
                Err(_) => match text.parse::<f64>() {
                    Ok(value) => Literal::Real(value),
                    Err(_) => {
                        p.warn("malformed integer literal", token.range);
                        Literal::Integer(0)
                    }
                },
            };
            mk(p, start, ExprKind::Literal(literal))
        }
        TokenKind::Decimal => {
            let token = p.bump();
            let text = token.text.replace('_', "");
            let literal = match text.parse::<f64>() {
                Ok(value) => Literal::Real(value),
                Err(_) => {
                    p.warn("malformed numeric literal", token.range);
                    Literal::Real(0.0)
                }
            };
            mk(p, start, ExprKind::Literal(literal))
        }
        TokenKind::HexInteger => {
            let token = p.bump();
            let digits = token.text[2..].replace('_', "");
            let literal = match u64::from_str_radix(&digits, 16) {
                Ok(value) => Literal::Hex(value),
                Err(_) => {
                    p.warn("hex literal out of range", token.range);
                    Literal::Hex(0)
                }
            };
            mk(p, start, ExprKind::Literal(literal))
        }
        TokenKind::QuotedLiteral => {
            let token = p.bump();
            let interior = token.text[1..token.text.len() - 1].replace("''", "'");
            mk(p, start, ExprKind::Literal(Literal::String(interior)))
        }
        TokenKind::BlobLiteral => {
            let token = p.bump();
            let digits = token.text[2..token.text.len() - 1].to_owned();
            if digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                p.warn("malformed blob literal", token.range);
            }
            mk(p, start, ExprKind::Literal(Literal::Blob(digits)))
        }
        TokenKind::NullKw => {
            p.bump();
            mk(p, start, ExprKind::Literal(Literal::Null))
        }
        TokenKind::TrueKw => {
            p.bump();
            mk(p, start, ExprKind::Literal(Literal::True))
        }
        TokenKind::FalseKw => {
            p.bump();
            mk(p, start, ExprKind::Literal(Literal::False))
        }
        TokenKind::CurrentTimeKw => {
            p.bump();
            mk(p, start, ExprKind::Literal(Literal::CurrentTime))
        }
        TokenKind::CurrentDateKw => {
            p.bump();
            mk(p, start, ExprKind::Literal(Literal::CurrentDate))
        }
        TokenKind::CurrentTimestampKw => {
            p.bump();
            mk(p, start, ExprKind::Literal(Literal::CurrentTimestamp))
        }
        TokenKind::QuestionMark => {
            p.bump();
            let index = p.param_anonymous();
            mk(
                p,
                start,
                ExprKind::BindParameter(BindParameter {
                    kind: BindParamKind::QuestionMark,
                    index,
                }),
            )
        }
        TokenKind::NumberedParam => {
            let token = p.bump();
            let n = token.text[1..].parse::<u32>().unwrap_or_else(|_| {
                p.warn("parameter number out of range", token.range);
                1
            });
            let index = p.param_numbered(n);
            mk(
                p,
                start,
                ExprKind::BindParameter(BindParameter {
                    kind: BindParamKind::Numbered(n),
                    index,
                }),
            )
        }
        TokenKind::NamedParam => {
            let token = p.bump();
            let index = p.param_named(token.text);
            let name = SqlIdent::new(&token.text[1..], false);
            let kind = if token.text.starts_with(':') {
                BindParamKind::Colon(name)
            } else {
                BindParamKind::At(name)
            };
            mk(p, start, ExprKind::BindParameter(BindParameter { kind, index }))
        }
        TokenKind::DollarParam => {
            let token = p.bump();
            let index = p.param_named(token.text);
            let mut body = &token.text[1..];
            let suffix = match body.find('(') {
                Some(open) => {
                    let suffix = body[open + 1..body.len() - 1].to_owned();
                    body = &body[..open];
                    Some(suffix)
                }
                None => None,
            };
            let path = body.split("::").map(|s| SqlIdent::new(s, false)).collect();
            mk(
                p,
                start,
                ExprKind::BindParameter(BindParameter {
                    kind: BindParamKind::Dollar { path, suffix },
                    index,
                }),
            )
        }
        TokenKind::CaseKw => parse_case(p, start),
        TokenKind::CastKw => parse_cast(p, start),
        TokenKind::RaiseKw => parse_raise(p, start),
        TokenKind::ExistsKw => parse_exists(p, start, false),
        TokenKind::NotKw if p.nth(1) == TokenKind::ExistsKw => {
            p.bump();
            parse_exists(p, start, true)
        }
        TokenKind::NotKw => {
            p.bump();
            let bp = Operator::Not.prefix_precedence().unwrap();
            let expr = expr_bp(p, bp);
            mk(
                p,
                start,
                ExprKind::Prefix {
                    op: Operator::Not,
                    expr: Box::new(expr),
                },
            )
        }
        TokenKind::Tilde | TokenKind::Plus | TokenKind::Minus => {
            let op = match p.bump().kind {
                TokenKind::Tilde => Operator::BitNot,
                TokenKind::Plus => Operator::UnaryPlus,
                _ => Operator::UnaryMinus,
            };
            // Prefix operators recurse at their own precedence, so `- - x`
            // nests right-to-left.
            let bp = op.prefix_precedence().unwrap();
            let expr = expr_bp(p, bp);
            mk(
                p,
                start,
                ExprKind::Prefix {
                    op,
                    expr: Box::new(expr),
                },
            )
        }
        TokenKind::LParen => {
            if is_select_start(p.nth(1)) {
                p.bump();
                let select = super::query::parse_select(p, None);
                p.expect(TokenKind::RParen);
                return mk(p, start, ExprKind::Subquery(Box::new(select)));
            }
            p.bump();
            let mut exprs = vec![parse_expr(p)];
            while p.eat(TokenKind::Comma) {
                exprs.push(parse_expr(p));
            }
            p.expect(TokenKind::RParen);
            if exprs.len() == 1 {
                // Plain parenthesization, not a row value.
                exprs.pop().unwrap()
            } else {
                mk(p, start, ExprKind::Grouped { exprs })
            }
        }
        _ if p.at_ident() => parse_column_or_function(p, start),
        found => {
            p.error_here(format!("expected expression, found {found}"));
            if !matches!(
                found,
                TokenKind::SemiColon | TokenKind::Eof | TokenKind::RParen | TokenKind::Comma
            ) {
                p.bump();
            }
            mk(p, start, ExprKind::Invalid)
        }
    }
}

/// A constrained value expression for `DEFAULT` clauses: a literal, a signed
/// number, or a parenthesized expression. Deliberately not [`parse_expr`];
/// a following constraint keyword like `NOT NULL` must stay unconsumed.
pub(crate) fn parse_simple_value(p: &mut Parser) -> Expression {
    let start = p.current_range().start();
    match p.current() {
        TokenKind::LParen => {
            p.bump();
            let expr = parse_expr(p);
            p.expect(TokenKind::RParen);
            expr
        }
        TokenKind::Plus | TokenKind::Minus => {
            let op = if p.bump().kind == TokenKind::Plus {
                Operator::UnaryPlus
            } else {
                Operator::UnaryMinus
            };
            let operand = parse_simple_value(p);
            mk(
                p,
                start,
                ExprKind::Prefix {
                    op,
                    expr: Box::new(operand),
                },
            )
        }
        _ => parse_primary(p, start),
    }
}

fn parse_case(p: &mut Parser, start: TextSize) -> Expression {
    p.bump();
    let scrutinee = if p.at(TokenKind::WhenKw) {
        None
    } else {
        Some(Box::new(parse_expr(p)))
    };

    let mut arms = Vec::new();
    p.expect(TokenKind::WhenKw);
    loop {
        let when = parse_expr(p);
        p.expect(TokenKind::ThenKw);
        let then = parse_expr(p);
        arms.push(CaseArm { when, then });
        if !p.eat(TokenKind::WhenKw) {
            break;
        }
    }

    let else_expr = if p.eat(TokenKind::ElseKw) {
        Some(Box::new(parse_expr(p)))
    } else {
        None
    };
    p.expect(TokenKind::EndKw);

    mk(
        p,
        start,
        ExprKind::Case {
            scrutinee,
            arms,
            else_expr,
        },
    )
}

fn parse_cast(p: &mut Parser, start: TextSize) -> Expression {
    p.bump();
    p.expect(TokenKind::LParen);
    let expr = parse_expr(p);
    p.expect(TokenKind::AsKw);
    let type_name = match parse_type_name(p) {
        Some(type_name) => type_name,
        None => {
            p.error_here("expected type name");
            return mk(p, start, ExprKind::Invalid);
        }
    };
    p.expect(TokenKind::RParen);
    mk(
        p,
        start,
        ExprKind::Cast {
            expr: Box::new(expr),
            type_name,
        },
    )
}

fn parse_exists(p: &mut Parser, start: TextSize, not: bool) -> Expression {
    p.bump();
    p.expect(TokenKind::LParen);
    let select = super::query::parse_select(p, None);
    p.expect(TokenKind::RParen);
    mk(
        p,
        start,
        ExprKind::Exists {
            not,
            select: Box::new(select),
        },
    )
}

fn parse_raise(p: &mut Parser, start: TextSize) -> Expression {
    p.bump();
    p.expect(TokenKind::LParen);
    let action = match p.current() {
        TokenKind::IgnoreKw => RaiseAction::Ignore,
        TokenKind::RollbackKw => RaiseAction::Rollback,
        TokenKind::AbortKw => RaiseAction::Abort,
        TokenKind::FailKw => RaiseAction::Fail,
        found => {
            p.error_here(format!(
                "expected IGNORE, ROLLBACK, ABORT or FAIL, found {found}"
            ));
            p.sync_to_statement_end();
            return mk(p, start, ExprKind::Invalid);
        }
    };
    p.bump();

    let message = if p.eat(TokenKind::Comma) {
        if p.at(TokenKind::QuotedLiteral) {
            let token = p.bump();
            Some(token.text[1..token.text.len() - 1].replace("''", "'"))
        } else {
            p.error_here("expected error message string");
            None
        }
    } else {
        None
    };
    p.expect(TokenKind::RParen);
    mk(p, start, ExprKind::Raise { action, message })
}

fn parse_column_or_function(p: &mut Parser, start: TextSize) -> Expression {
    let first = match parse_ident(p) {
        Some(ident) => ident,
        None => return mk(p, start, ExprKind::Invalid),
    };

    if p.at(TokenKind::LParen) {
        let args = parse_function_args(p);
        return mk(
            p,
            start,
            ExprKind::Function {
                table: None,
                name: first,
                args,
            },
        );
    }

    if !p.at(TokenKind::Dot) {
        return mk(
            p,
            start,
            ExprKind::Column(ColumnRef {
                schema: None,
                table: None,
                column: ColumnTarget::Named(first),
            }),
        );
    }
    p.bump();

    if p.eat(TokenKind::Asterisk) {
        return mk(
            p,
            start,
            ExprKind::Column(ColumnRef {
                schema: None,
                table: Some(first),
                column: ColumnTarget::Star,
            }),
        );
    }

    let second = match parse_ident(p) {
        Some(ident) => ident,
        None => {
            p.error_here("expected column name after '.'");
            return mk(p, start, ExprKind::Invalid);
        }
    };

    if p.at(TokenKind::LParen) {
        let args = parse_function_args(p);
        return mk(
            p,
            start,
            ExprKind::Function {
                table: Some(first),
                name: second,
                args,
            },
        );
    }

    if !p.at(TokenKind::Dot) {
        return mk(
            p,
            start,
            ExprKind::Column(ColumnRef {
                schema: None,
                table: Some(first),
                column: ColumnTarget::Named(second),
            }),
        );
    }
    p.bump();

    if p.eat(TokenKind::Asterisk) {
        return mk(
            p,
            start,
            ExprKind::Column(ColumnRef {
                schema: Some(first),
                table: Some(second),
                column: ColumnTarget::Star,
            }),
        );
    }

    let third = match parse_ident(p) {
        Some(ident) => ident,
        None => {
            p.error_here("expected column name after '.'");
            return mk(p, start, ExprKind::Invalid);
        }
    };
    mk(
        p,
        start,
        ExprKind::Column(ColumnRef {
            schema: Some(first),
            table: Some(second),
            column: ColumnTarget::Named(third),
        }),
    )
}

fn parse_function_args(p: &mut Parser) -> FunctionArgs {
    p.expect(TokenKind::LParen);
    if p.eat(TokenKind::Asterisk) {
        p.expect(TokenKind::RParen);
        return FunctionArgs::Star;
    }

    let distinct = p.eat(TokenKind::DistinctKw);
    let mut args = Vec::new();
    if !p.at(TokenKind::RParen) {
        loop {
            args.push(parse_expr(p));
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(TokenKind::RParen);

    if p.at(TokenKind::FilterKw) || p.at(TokenKind::OverKw) {
        p.error_here("window and FILTER clauses are not supported");
        p.sync_to_statement_end();
    }

    FunctionArgs::List { distinct, args }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Expression {
        let mut p = Parser::new(input);
        let expr = parse_expr(&mut p);
        assert!(
            p.diagnostics.is_empty(),
            "unexpected diagnostics for {input:?}: {:#?}",
            p.diagnostics
        );
        expr
    }

    fn check(input: &str, rendered: &str) {
        assert_eq!(parse(input).to_string(), rendered);
    }

    #[test]
    fn parses_precedence_levels() {
        check("1 + 2 * 3", "(1 + (2 * 3))");
        check("1 * 2 + 3", "((1 * 2) + 3)");
        check("a || b || c", "((a || b) || c)");
        check("a + b < c - d", "((a + b) < (c - d))");
        check("a < b = c", "((a < b) = c)");
        check("a AND b OR c AND d", "((a AND b) OR (c AND d))");
        check("a = b AND c = d", "((a = b) AND (c = d))");
        check("a & b + c", "(a & (b + c))");
        check("a << 1 | b", "((a << 1) | b)");
    }

    #[test]
    fn parses_prefix_operators() {
        check("-a", "(-a)");
        check("- - a", "(-(-a))");
        check("~a + b", "((~a) + b)");
        check("-a * b", "((-a) * b)");
        check("NOT a = b", "(NOT (a = b))");
        check("NOT a AND b", "((NOT a) AND b)");
    }

    #[test]
    fn parses_between_with_documented_binding() {
        check("a BETWEEN 1 + 2 AND 3 * 4", "(a BETWEEN (1 + 2) AND (3 * 4))");
        check(
            "a BETWEEN b AND c AND d",
            "((a BETWEEN b AND c) AND d)",
        );
        check("a NOT BETWEEN 1 AND 2", "(a NOT BETWEEN 1 AND 2)");
    }

    #[test]
    fn parses_is_family_longest_match() {
        check("a IS b", "(a IS b)");
        check("a IS NOT b", "(a IS NOT b)");
        check("a IS NULL", "(a IS NULL)");
        check("a IS NOT NULL", "(a IS NOT NULL)");
        check("a IS DISTINCT FROM b", "(a IS DISTINCT FROM b)");
        check("a IS NOT DISTINCT FROM b", "(a IS NOT DISTINCT FROM b)");
    }

    #[test]
    fn parses_postfix_operators() {
        check("a ISNULL", "(a ISNULL)");
        check("a NOTNULL", "(a NOTNULL)");
        check("a NOT NULL", "(a NOTNULL)");
        check("a COLLATE nocase", "(a COLLATE nocase)");
        check("a COLLATE nocase = b", "((a COLLATE nocase) = b)");
    }

    #[test]
    fn parses_not_prefixed_comparisons() {
        check("a NOT LIKE '%x%'", "(a NOT LIKE '%x%')");
        check("a NOT IN (1, 2)", "(a NOT IN (1, 2))");
        check("a NOT GLOB '*'", "(a NOT GLOB '*')");
        check("name LIKE :pat ESCAPE '\\'", "(name LIKE (:pat ESCAPE '\\'))");
    }

    #[test]
    fn parses_in_forms() {
        check("a IN (1)", "(a IN (1))");
        check("a IN ()", "(a IN ())");
        check("id IN :ids", "(id IN :ids)");
        check("id IN other_table", "(id IN other_table)");
    }

    #[test]
    fn parses_case_forms() {
        check(
            "CASE WHEN a THEN 1 ELSE 2 END",
            "CASE WHEN a THEN 1 ELSE 2 END",
        );
        check(
            "CASE x WHEN 1 THEN 'one' WHEN 2 THEN 'two' END",
            "CASE x WHEN 1 THEN 'one' WHEN 2 THEN 'two' END",
        );
    }

    #[test]
    fn parses_calls_and_columns() {
        check("count(*)", "count(*)");
        check("count(DISTINCT name)", "count(DISTINCT name)");
        check("coalesce(a, b, 0)", "coalesce(a, b, 0)");
        check("t.c", "t.c");
        check("main.t.c", "main.t.c");
        check("t.*", "t.*");
        check("max(a + 1, b)", "max((a + 1), b)");
    }

    #[test]
    fn parses_literals() {
        check("1_000", "1000");
        check("0x1F", "0x1f");
        check("1.5e2", "150.0");
        check("'it''s'", "'it''s'");
        check("x'0a'", "x'0a'");
        check("NULL", "NULL");
        check("TRUE", "TRUE");
        check("CURRENT_TIMESTAMP", "CURRENT_TIMESTAMP");
    }

    #[test]
    fn parses_bind_parameters() {
        check("?", "?");
        check("?7", "?7");
        check(":name", ":name");
        check("@name", "@name");
        check("$config::path(suffix)", "$config::path(suffix)");
    }

    #[test]
    fn collapses_redundant_parens() {
        check("(((1)))", "1");
        check("(1 + 2) * 3", "((1 + 2) * 3)");
        check("(1, 2, 3)", "(1, 2, 3)");
    }

    #[test]
    fn invalid_expression_recovers() {
        let mut p = Parser::new("1 + ;");
        let expr = parse_expr(&mut p);
        assert_eq!(expr.to_string(), "(1 + <invalid>)");
        assert_eq!(p.diagnostics.len(), 1);
        assert!(p.at(TokenKind::SemiColon));
    }

    #[test]
    fn renderings_reparse_to_equal_trees() {
        for input in [
            "a BETWEEN 1 + 2 AND 3 * 4",
            "NOT a = b AND c",
            "a IS NOT DISTINCT FROM -b",
            "CASE x WHEN 1 THEN 'one' ELSE '' END",
            "f(a, b) + t.c * 2",
            "~x << 2 | y & 3",
        ] {
            let first = parse(input).to_string();
            let second = parse(&first).to_string();
            assert_eq!(first, second, "round-trip failed for {input:?}");
        }
    }
}
