use chumsky::prelude::*;
use chumsky::Stream;

use crate::ast::*;
use crate::desugar::bind_implicit_params;
use crate::errors::{to_parse_error, ParseError};
use crate::lexer::lexer;
use crate::span::{LineIndex, Span};
use crate::tokens::{Number, Token};

/// Parse an expression and bind the implicit `value`/`acc` lambda parameters.
pub fn parse_expression(source: &str) -> Result<Expr, Vec<ParseError>> {
    parse_syntax(source).map(bind_implicit_params)
}

/// Parse an expression exactly as written, without desugaring.
pub fn parse_syntax(source: &str) -> Result<Expr, Vec<ParseError>> {
    let line_index = LineIndex::new(source);
    let (tokens, lex_errs) = lexer().parse_recovery(source);
    if !lex_errs.is_empty() {
        return Err(lex_errs
            .into_iter()
            .map(|e| to_parse_error(e, &line_index))
            .collect());
    }

    let tokens = tokens.unwrap_or_default();
    if tokens.is_empty() {
        let (line, col) = line_index.line_col(0);
        return Err(vec![ParseError {
            message: "empty expression".to_string(),
            span: Span {
                start: 0,
                end: source.len(),
                line,
                col,
            },
        }]);
    }
    let span_end = source.len()..source.len() + 1;
    let stream = Stream::from_iter(span_end, tokens.into_iter());

    let (parsed, parse_errs) = expr_parser().then_ignore(end()).parse_recovery(stream);
    if !parse_errs.is_empty() {
        return Err(parse_errs
            .into_iter()
            .map(|e| to_parse_error(e, &line_index))
            .collect());
    }
    parsed.ok_or_else(|| {
        vec![ParseError {
            message: "could not parse expression".to_string(),
            span: Span {
                start: 0,
                end: source.len(),
                line: 1,
                col: 1,
            },
        }]
    })
}

fn expr_parser() -> impl Parser<Token, Expr, Error = Simple<Token>> + Clone {
    let ident = select! { Token::Ident(s) => s };

    recursive(|expr| {
        let args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let literal = select! {
            Token::Number(Number(n)) => Literal::Number(n),
            Token::Str(s) => Literal::Str(s),
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Null => Literal::Null,
        }
        .map(Expr::Literal);

        let list = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .map(Expr::List);

        let call_or_path = ident
            .clone()
            .then(args.clone().or_not())
            .map(|(name, args)| match args {
                Some(args) => Expr::Call { name, args },
                None => Expr::Path(vec![name]),
            });

        let atom = choice::<_, Simple<Token>>((
            literal,
            list,
            call_or_path,
            expr.clone()
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        ));

        let postfix = atom
            .then(
                just(Token::Dot)
                    .ignore_then(ident.clone())
                    .then(args.or_not())
                    .repeated(),
            )
            .foldl(|target, (name, args)| match (target, args) {
                (target, Some(args)) => Expr::Method {
                    target: Box::new(target),
                    name,
                    args,
                },
                (Expr::Path(mut segments), None) => {
                    segments.push(name);
                    Expr::Path(segments)
                }
                (target, None) => Expr::Member {
                    target: Box::new(target),
                    name,
                },
            })
            .boxed();

        let unary = choice::<_, Simple<Token>>((
            just(Token::Bang).to(UnaryOp::Not),
            just(Token::Minus).to(UnaryOp::Neg),
        ))
        .repeated()
        .then(postfix)
        .foldr(|op, expr| Expr::Unary {
            op,
            expr: Box::new(expr),
        })
        .boxed();

        let sum = unary
            .clone()
            .then(just(Token::Plus).to(BinaryOp::Add).then(unary).repeated())
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
            .boxed();

        let cmp_op = choice::<_, Simple<Token>>((
            just(Token::CmpEq).to(BinaryOp::Eq),
            just(Token::CmpNeq).to(BinaryOp::Neq),
            just(Token::CmpGte).to(BinaryOp::Gte),
            just(Token::CmpGt).to(BinaryOp::Gt),
            just(Token::CmpLte).to(BinaryOp::Lte),
            just(Token::CmpLt).to(BinaryOp::Lt),
            just(Token::Ident("contains".to_string())).to(BinaryOp::Contains),
        ));
        let comparison = sum
            .clone()
            .then(cmp_op.then(sum).repeated())
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
            .boxed();

        let conjunction = comparison
            .clone()
            .then(just(Token::AndAnd).to(BinaryOp::And).then(comparison).repeated())
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
            .boxed();

        let disjunction = conjunction
            .clone()
            .then(just(Token::OrOr).to(BinaryOp::Or).then(conjunction).repeated())
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs));

        let params = choice::<_, Simple<Token>>((
            ident.clone().map(|p| vec![p]),
            ident
                .clone()
                .separated_by(just(Token::Comma))
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        ));
        let lambda = params
            .then_ignore(just(Token::FatArrow))
            .then(expr)
            .map(|(params, body)| Expr::Lambda {
                params,
                body: Box::new(body),
            });

        choice::<_, Simple<Token>>((lambda, disjunction))
    })
}
