use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Kinds of nodes in a bound Java tree.
///
/// The set is closed and intentionally coarse: constructs the fix engine never inspects (for
/// example array creation or lambdas) can be represented by their nearest kind, usually a
/// [`SyntaxKind::Literal`] leaf carrying the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxKind {
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,

    TypeDeclaration,
    AnonymousClassDeclaration,
    EnumConstantDeclaration,
    FieldDeclaration,
    /// Methods and constructors (see [`crate::MethodBinding::is_constructor`]).
    MethodDeclaration,
    Initializer,
    AnnotationTypeMemberDeclaration,
    SingleVariableDeclaration,
    VariableDeclarationFragment,

    Block,
    IfStatement,
    ExpressionStatement,
    VariableDeclarationStatement,
    ReturnStatement,
    SwitchStatement,
    SwitchCase,
    ForStatement,
    WhileStatement,

    SimpleName,
    QualifiedName,
    FieldAccess,
    SuperFieldAccess,
    ThisExpression,
    MethodInvocation,
    SuperMethodInvocation,
    ClassInstanceCreation,
    Assignment,
    InfixExpression,
    PrefixExpression,
    Literal,
    CastExpression,
    ParenthesizedExpression,

    SimpleType,
    PrimitiveType,
    Annotation,
    MemberValuePair,
}

impl SyntaxKind {
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::Block
                | SyntaxKind::IfStatement
                | SyntaxKind::ExpressionStatement
                | SyntaxKind::VariableDeclarationStatement
                | SyntaxKind::ReturnStatement
                | SyntaxKind::SwitchStatement
                | SyntaxKind::ForStatement
                | SyntaxKind::WhileStatement
        )
    }

    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::SimpleName
                | SyntaxKind::QualifiedName
                | SyntaxKind::FieldAccess
                | SyntaxKind::SuperFieldAccess
                | SyntaxKind::ThisExpression
                | SyntaxKind::MethodInvocation
                | SyntaxKind::SuperMethodInvocation
                | SyntaxKind::ClassInstanceCreation
                | SyntaxKind::Assignment
                | SyntaxKind::InfixExpression
                | SyntaxKind::PrefixExpression
                | SyntaxKind::Literal
                | SyntaxKind::CastExpression
                | SyntaxKind::ParenthesizedExpression
        )
    }

    pub fn is_name(self) -> bool {
        matches!(self, SyntaxKind::SimpleName | SyntaxKind::QualifiedName)
    }

    /// Declarations that own a type body (`AbstractTypeDeclaration` or anonymous class body).
    pub fn is_type_body(self) -> bool {
        matches!(
            self,
            SyntaxKind::TypeDeclaration | SyntaxKind::AnonymousClassDeclaration
        )
    }

    /// Members of a type body. Statement lookups never cross these.
    pub fn is_body_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::TypeDeclaration
                | SyntaxKind::EnumConstantDeclaration
                | SyntaxKind::FieldDeclaration
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::Initializer
                | SyntaxKind::AnnotationTypeMemberDeclaration
        )
    }
}

/// Role of a node inside its parent (JDT's structural property descriptor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Root,
    Package,
    Import,
    /// Type members and top-level types.
    Member,
    Name,
    /// Receiver of a field access / invocation, expression of an expression or return
    /// statement, switch selector.
    Expression,
    /// Qualifier of a qualified name, `Outer.this` or `Outer.super`.
    Qualifier,
    Argument,
    Statement,
    Then,
    Else,
    Body,
    Condition,
    LeftHandSide,
    RightHandSide,
    Operand,
    SwitchCaseLabel,
    Fragment,
    Initializer,
    Type,
    ReturnType,
    Parameter,
    ForInit,
    ForUpdate,
    AnonymousBody,
    Annotation,
    MemberValue,
}

/// Java modifiers, encoded with the JVM access-flag bit values.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const PUBLIC: Modifiers = Modifiers(0x0001);
    pub const PRIVATE: Modifiers = Modifiers(0x0002);
    pub const PROTECTED: Modifiers = Modifiers(0x0004);
    pub const STATIC: Modifiers = Modifiers(0x0008);
    pub const FINAL: Modifiers = Modifiers(0x0010);
    pub const ABSTRACT: Modifiers = Modifiers(0x0400);

    const ORDER: [(Modifiers, &'static str); 6] = [
        (Modifiers::PUBLIC, "public"),
        (Modifiers::PROTECTED, "protected"),
        (Modifiers::PRIVATE, "private"),
        (Modifiers::ABSTRACT, "abstract"),
        (Modifiers::STATIC, "static"),
        (Modifiers::FINAL, "final"),
    ];

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    pub const fn without(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 & !other.0)
    }

    pub const fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    pub const fn is_final(self) -> bool {
        self.contains(Modifiers::FINAL)
    }

    pub const fn is_public(self) -> bool {
        self.contains(Modifiers::PUBLIC)
    }

    pub const fn is_protected(self) -> bool {
        self.contains(Modifiers::PROTECTED)
    }

    pub const fn is_private(self) -> bool {
        self.contains(Modifiers::PRIVATE)
    }

    /// No access modifier at all.
    pub const fn is_package_private(self) -> bool {
        self.0 & (Modifiers::PUBLIC.0 | Modifiers::PROTECTED.0 | Modifiers::PRIVATE.0) == 0
    }

    /// Keywords in canonical source order.
    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        Self::ORDER
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, kw)| kw)
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.union(rhs)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Modifiers) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keywords: Vec<_> = self.keywords().collect();
        write!(f, "Modifiers({})", keywords.join(" "))
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for kw in self.keywords() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(kw)?;
            first = false;
        }
        Ok(())
    }
}
