use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Add,
    And,
    Or,
    Contains,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Add => "+",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Contains => "contains",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// Dotted identifier chain, e.g. `file.name` or `note.address.city`.
    Path(Vec<String>),
    /// Property access on a computed value, e.g. `file("x").status`.
    Member { target: Box<Expr>, name: String },
    Call { name: String, args: Vec<Expr> },
    Method {
        target: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    Unary { op: UnaryOp, expr: Box<Expr> },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    List(Vec<Expr>),
    Lambda { params: Vec<String>, body: Box<Expr> },
}

impl Expr {
    pub fn path(segments: &[&str]) -> Self {
        Expr::Path(segments.iter().map(|s| s.to_string()).collect())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::Str(s.into()))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// The dotted path text when this node is a plain path.
    pub fn as_path(&self) -> Option<String> {
        match self {
            Expr::Path(segments) => Some(segments.join(".")),
            _ => None,
        }
    }
}
