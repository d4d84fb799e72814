//! Formula expression tree.

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `not x`: 1 when `x` is zero, else 0.
    Not,
    Neg,
    Pos,
    /// `inc x`: `x + 1`.
    Inc,
    /// `dec x`: `x - 1`.
    Dec,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Eq,
}

impl BinaryOp {
    pub fn is_relational(self) -> bool {
        matches!(self, BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Eq)
    }
}

/// A parsed formula. References are kept as uppercase address text and are
/// only resolved at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Reference(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Group(Box<Expr>),
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Collect every referenced address, in order of appearance.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Reference(addr) => out.push(addr),
            Expr::Unary { operand, .. } => operand.collect_references(out),
            Expr::Binary { left, right, .. } => {
                left.collect_references(out);
                right.collect_references(out);
            }
            Expr::Group(inner) => inner.collect_references(out),
        }
    }
}
