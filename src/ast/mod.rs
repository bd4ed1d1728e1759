//! Abstract syntax tree consumed by the analyzer
//!
//! The tree is produced by the upstream parser and AST builder and arrives
//! either in memory or as JSON. Every node carries:
//! - a unique [`NodeId`], used to key scopes and inferred types
//! - a source [`Span`]
//!
//! Both default when missing from JSON input.

pub mod build;

use crate::diagnostics::Span;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for AST nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Generate a new unique node ID
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// One source file worth of declarations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub name: String,
    pub decls: Vec<Decl>,
}

/// Top-level declarations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Decl {
    Function(FunctionDecl),
    Class(ClassDecl),
    Struct(StructDecl),
    Spark(StructDecl),
    Data(DataDecl),
    Trait(TraitDecl),
    Interface(TraitDecl),
    Impl(ImplDecl),
    /// Script-level `let`, bound in the global scope
    Let(LetStmt),
    /// Script-level expression statement
    Expr(ExprStmt),
}

impl Decl {
    pub fn span(&self) -> &Span {
        match self {
            Decl::Function(d) => &d.span,
            Decl::Class(d) => &d.span,
            Decl::Struct(d) | Decl::Spark(d) => &d.span,
            Decl::Data(d) => &d.span,
            Decl::Trait(d) | Decl::Interface(d) => &d.span,
            Decl::Impl(d) => &d.span,
            Decl::Let(s) => &s.span,
            Decl::Expr(s) => &s.span,
        }
    }
}

/// A generic parameter with its trait bounds, e.g. `T: Display + Eq`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<String>,
}

/// Function or method parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    pub ty: TypeExpr,
    #[serde(default)]
    pub mutable: bool,
}

/// Function or method declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub return_type: Option<TypeExpr>,
    #[serde(default)]
    pub is_async: bool,
    pub body: Block,
}

/// What flavour of class-like declaration this is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Actor,
    Exception,
}

/// Class, actor or exception declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub kind: ClassKind,
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<FunctionDecl>,
}

/// A field of a class, struct, spark or data variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    pub ty: TypeExpr,
    #[serde(default)]
    pub mutable: bool,
    #[serde(default)]
    pub initializer: Option<Expr>,
}

/// Struct or spark declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

/// Sum type declaration (`data Shape { Circle(radius: Float), ... }`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    pub variants: Vec<VariantDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

/// Trait or interface declaration: a named set of method signatures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub methods: Vec<MethodSig>,
}

/// A method signature inside a trait
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodSig {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub return_type: Option<TypeExpr>,
    #[serde(default)]
    pub is_async: bool,
}

/// `impl Trait<Args> for Target { ... }` or inherent `impl Target { ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub trait_name: Option<String>,
    #[serde(default)]
    pub trait_args: Vec<TypeExpr>,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    pub target: TypeExpr,
    #[serde(default)]
    pub methods: Vec<FunctionDecl>,
}

/// Type expression as written in source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TypeExpr {
    /// `Int`, `Shape`, `List<T>`, `T`
    Named {
        #[serde(default)]
        span: Span,
        name: String,
        #[serde(default)]
        args: Vec<TypeExpr>,
    },
    /// `T?`
    Optional {
        #[serde(default)]
        span: Span,
        inner: Box<TypeExpr>,
    },
    /// `[T]`
    Array {
        #[serde(default)]
        span: Span,
        element: Box<TypeExpr>,
    },
    /// `(A, B)`
    Tuple {
        #[serde(default)]
        span: Span,
        elements: Vec<TypeExpr>,
    },
    /// `(A, B) -> R`
    Function {
        #[serde(default)]
        span: Span,
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
    },
}

impl TypeExpr {
    pub fn span(&self) -> &Span {
        match self {
            TypeExpr::Named { span, .. }
            | TypeExpr::Optional { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Tuple { span, .. }
            | TypeExpr::Function { span, .. } => span,
        }
    }
}

/// A block of statements with optional trailing expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub stmts: Vec<Stmt>,
    #[serde(default)]
    pub expr: Option<Box<Expr>>,
}

/// `let [mut] pattern [: T] = value`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetStmt {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub pattern: Pattern,
    #[serde(default)]
    pub ty: Option<TypeExpr>,
    #[serde(default)]
    pub mutable: bool,
    pub value: Expr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExprStmt {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub expr: Expr,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    Let(LetStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn id(&self) -> NodeId {
        match self {
            Stmt::Let(s) => s.id,
            Stmt::Expr(s) => s.id,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Stmt::Let(s) => &s.span,
            Stmt::Expr(s) => &s.span,
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Char(char),
    Bool(bool),
    None,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "xor",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `x?`
    Unwrap,
    /// `x!!`
    ForceUnwrap,
}

/// Expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Literal {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        value: Literal,
    },
    Ident {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        name: String,
    },
    Binary {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Call {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// `receiver.method(args)` or `receiver.Trait::method(args)`
    MethodCall {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        receiver: Box<Expr>,
        #[serde(default)]
        qualifier: Option<String>,
        method: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    FieldAccess {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        expr: Box<Expr>,
        field: String,
    },
    Index {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        expr: Box<Expr>,
        index: Box<Expr>,
    },
    If {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        cond: Box<Expr>,
        then_branch: Box<Block>,
        #[serde(default)]
        else_branch: Option<Box<Expr>>,
    },
    Match {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Block {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        block: Box<Block>,
    },
    Lambda {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        params: Vec<LambdaParam>,
        #[serde(default)]
        is_async: bool,
        body: Box<Block>,
    },
    While {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        cond: Box<Expr>,
        body: Box<Block>,
    },
    For {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        pattern: Pattern,
        iterable: Box<Expr>,
        body: Box<Block>,
    },
    Break {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
    },
    Continue {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
    },
    Return {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        #[serde(default)]
        value: Option<Box<Expr>>,
    },
    Assign {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    ArrayLit {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        elements: Vec<Expr>,
    },
    TupleLit {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        elements: Vec<Expr>,
    },
    /// `Point { x: 1, y: 2 }`
    StructLit {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        name: String,
        fields: Vec<FieldInit>,
    },
    Try {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        body: Box<Block>,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Box<Block>>,
    },
    Throw {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        expr: Box<Expr>,
    },

    // Concurrency
    Await {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        expr: Box<Expr>,
    },
    /// `concurrent { let a = f(); let b = g() }`; the bindings stay visible
    /// to the statements that follow in the enclosing block
    Concurrent {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        bindings: Vec<ConcurrentBinding>,
    },
    Race {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        body: Box<Block>,
    },
    Timeout {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        duration: Box<Expr>,
        body: Box<Block>,
    },
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Literal { id, .. }
            | Expr::Ident { id, .. }
            | Expr::Binary { id, .. }
            | Expr::Unary { id, .. }
            | Expr::Call { id, .. }
            | Expr::MethodCall { id, .. }
            | Expr::FieldAccess { id, .. }
            | Expr::Index { id, .. }
            | Expr::If { id, .. }
            | Expr::Match { id, .. }
            | Expr::Block { id, .. }
            | Expr::Lambda { id, .. }
            | Expr::While { id, .. }
            | Expr::For { id, .. }
            | Expr::Break { id, .. }
            | Expr::Continue { id, .. }
            | Expr::Return { id, .. }
            | Expr::Assign { id, .. }
            | Expr::ArrayLit { id, .. }
            | Expr::TupleLit { id, .. }
            | Expr::StructLit { id, .. }
            | Expr::Try { id, .. }
            | Expr::Throw { id, .. }
            | Expr::Await { id, .. }
            | Expr::Concurrent { id, .. }
            | Expr::Race { id, .. }
            | Expr::Timeout { id, .. } => *id,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Ident { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Call { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::FieldAccess { span, .. }
            | Expr::Index { span, .. }
            | Expr::If { span, .. }
            | Expr::Match { span, .. }
            | Expr::Block { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::While { span, .. }
            | Expr::For { span, .. }
            | Expr::Break { span, .. }
            | Expr::Continue { span, .. }
            | Expr::Return { span, .. }
            | Expr::Assign { span, .. }
            | Expr::ArrayLit { span, .. }
            | Expr::TupleLit { span, .. }
            | Expr::StructLit { span, .. }
            | Expr::Try { span, .. }
            | Expr::Throw { span, .. }
            | Expr::Await { span, .. }
            | Expr::Concurrent { span, .. }
            | Expr::Race { span, .. }
            | Expr::Timeout { span, .. } => span,
        }
    }
}

/// Lambda parameter; the annotation is optional
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LambdaParam {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    #[serde(default)]
    pub ty: Option<TypeExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInit {
    #[serde(default)]
    pub span: Span,
    pub name: String,
    pub value: Expr,
}

/// Match arm with optional guard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchArm {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub pattern: Pattern,
    #[serde(default)]
    pub guard: Option<Expr>,
    pub body: Expr,
}

/// `catch name[: Type] { ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchClause {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    #[serde(default)]
    pub ty: Option<TypeExpr>,
    pub body: Block,
}

/// `let name = value` inside a `concurrent` block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrentBinding {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
    pub value: Expr,
}

/// A field inside a struct pattern; `None` means shorthand `{ x }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPattern {
    pub name: String,
    #[serde(default)]
    pub pattern: Option<Pattern>,
}

/// Pattern for `let`, `for` and `match`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Pattern {
    Variable {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        name: String,
    },
    Typed {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        name: String,
        ty: TypeExpr,
    },
    Literal {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        value: Literal,
    },
    Wildcard {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
    },
    Tuple {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        elements: Vec<Pattern>,
    },
    /// `[first, second, ..rest]`
    Array {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        elements: Vec<Pattern>,
        #[serde(default)]
        rest: Option<String>,
    },
    Struct {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        name: String,
        fields: Vec<FieldPattern>,
    },
    /// `Circle(r)`
    TupleStruct {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        name: String,
        elements: Vec<Pattern>,
    },
    Or {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        left: Box<Pattern>,
        right: Box<Pattern>,
    },
    Range {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        start: Literal,
        end: Literal,
        #[serde(default)]
        inclusive: bool,
    },
}

impl Pattern {
    pub fn id(&self) -> NodeId {
        match self {
            Pattern::Variable { id, .. }
            | Pattern::Typed { id, .. }
            | Pattern::Literal { id, .. }
            | Pattern::Wildcard { id, .. }
            | Pattern::Tuple { id, .. }
            | Pattern::Array { id, .. }
            | Pattern::Struct { id, .. }
            | Pattern::TupleStruct { id, .. }
            | Pattern::Or { id, .. }
            | Pattern::Range { id, .. } => *id,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Pattern::Variable { span, .. }
            | Pattern::Typed { span, .. }
            | Pattern::Literal { span, .. }
            | Pattern::Wildcard { span, .. }
            | Pattern::Tuple { span, .. }
            | Pattern::Array { span, .. }
            | Pattern::Struct { span, .. }
            | Pattern::TupleStruct { span, .. }
            | Pattern::Or { span, .. }
            | Pattern::Range { span, .. } => span,
        }
    }

    /// Names bound by this pattern, in source order. For an or-pattern the
    /// left side comes first, followed by names only the right side binds.
    pub fn bindings(&self) -> Vec<(&str, &Span)> {
        let mut out = Vec::new();
        self.collect_bindings(&mut out);
        out
    }

    fn collect_bindings<'a>(&'a self, out: &mut Vec<(&'a str, &'a Span)>) {
        match self {
            Pattern::Variable { name, span, .. } | Pattern::Typed { name, span, .. } => {
                out.push((name.as_str(), span))
            }
            Pattern::Tuple { elements, .. } | Pattern::TupleStruct { elements, .. } => {
                for element in elements {
                    element.collect_bindings(out);
                }
            }
            Pattern::Array {
                elements,
                rest,
                span,
                ..
            } => {
                for element in elements {
                    element.collect_bindings(out);
                }
                if let Some(rest) = rest {
                    out.push((rest.as_str(), span));
                }
            }
            Pattern::Struct { fields, span, .. } => {
                for field in fields {
                    match &field.pattern {
                        Some(pattern) => pattern.collect_bindings(out),
                        None => out.push((field.name.as_str(), span)),
                    }
                }
            }
            Pattern::Or { left, right, .. } => {
                let start = out.len();
                left.collect_bindings(out);
                let mut extra = Vec::new();
                right.collect_bindings(&mut extra);
                for binding in extra {
                    if !out[start..].iter().any(|(name, _)| *name == binding.0) {
                        out.push(binding);
                    }
                }
            }
            Pattern::Literal { .. } | Pattern::Wildcard { .. } | Pattern::Range { .. } => {}
        }
    }
}
