//! Node kinds the matching heuristics branch on, and the per-language vocabularies
//! that classify raw parser type names into them.

use serde::{Deserialize, Serialize};

/// Closed set of node kinds.
///
/// Anything a heuristic does not need to recognise is [`NodeKind::Other`],
/// in which case type equality falls back to comparing raw type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    CompilationUnit,
    ImportDeclaration,
    PackageDeclaration,
    TypeDeclaration,
    MethodDeclaration,
    FieldDeclaration,
    Annotation,
    Modifier,
    Javadoc,
    LineComment,
    BlockComment,
    Block,
    ReturnStatement,
    ExpressionStatement,
    VariableDeclarationStatement,
    IfStatement,
    ForStatement,
    EnhancedForStatement,
    WhileStatement,
    DoStatement,
    TryStatement,
    CatchClause,
    ThrowStatement,
    SwitchStatement,
    BreakStatement,
    ContinueStatement,
    AssertStatement,
    MethodInvocation,
    MethodInvocationReceiver,
    MethodInvocationArguments,
    ClassInstanceCreation,
    InfixExpression,
    InfixOperator,
    PrefixExpression,
    ConditionalExpression,
    Assignment,
    SimpleName,
    QualifiedName,
    SimpleType,
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,
    CharacterLiteral,
    NullLiteral,
    Other,
}

impl NodeKind {
    /// Canonical name, used as the type key when hashing.
    pub fn as_str(&self) -> &'static str {
        use NodeKind::*;
        match self {
            CompilationUnit => "CompilationUnit",
            ImportDeclaration => "ImportDeclaration",
            PackageDeclaration => "PackageDeclaration",
            TypeDeclaration => "TypeDeclaration",
            MethodDeclaration => "MethodDeclaration",
            FieldDeclaration => "FieldDeclaration",
            Annotation => "Annotation",
            Modifier => "Modifier",
            Javadoc => "Javadoc",
            LineComment => "LineComment",
            BlockComment => "BlockComment",
            Block => "Block",
            ReturnStatement => "ReturnStatement",
            ExpressionStatement => "ExpressionStatement",
            VariableDeclarationStatement => "VariableDeclarationStatement",
            IfStatement => "IfStatement",
            ForStatement => "ForStatement",
            EnhancedForStatement => "EnhancedForStatement",
            WhileStatement => "WhileStatement",
            DoStatement => "DoStatement",
            TryStatement => "TryStatement",
            CatchClause => "CatchClause",
            ThrowStatement => "ThrowStatement",
            SwitchStatement => "SwitchStatement",
            BreakStatement => "BreakStatement",
            ContinueStatement => "ContinueStatement",
            AssertStatement => "AssertStatement",
            MethodInvocation => "MethodInvocation",
            MethodInvocationReceiver => "METHOD_INVOCATION_RECEIVER",
            MethodInvocationArguments => "METHOD_INVOCATION_ARGUMENTS",
            ClassInstanceCreation => "ClassInstanceCreation",
            InfixExpression => "InfixExpression",
            InfixOperator => "INFIX_EXPRESSION_OPERATOR",
            PrefixExpression => "PrefixExpression",
            ConditionalExpression => "ConditionalExpression",
            Assignment => "Assignment",
            SimpleName => "SimpleName",
            QualifiedName => "QualifiedName",
            SimpleType => "SimpleType",
            StringLiteral => "StringLiteral",
            NumberLiteral => "NumberLiteral",
            BooleanLiteral => "BooleanLiteral",
            CharacterLiteral => "CharacterLiteral",
            NullLiteral => "NullLiteral",
            Other => "Other",
        }
    }

    /// Statement kinds, [`NodeKind::Block`] included.
    pub fn is_statement(&self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            Block
                | ReturnStatement
                | ExpressionStatement
                | VariableDeclarationStatement
                | IfStatement
                | ForStatement
                | EnhancedForStatement
                | WhileStatement
                | DoStatement
                | TryStatement
                | ThrowStatement
                | SwitchStatement
                | BreakStatement
                | ContinueStatement
                | AssertStatement
        )
    }

    pub fn is_comment(&self) -> bool {
        matches!(
            self,
            NodeKind::Javadoc | NodeKind::LineComment | NodeKind::BlockComment
        )
    }

    pub fn is_name(&self) -> bool {
        matches!(self, NodeKind::SimpleName | NodeKind::QualifiedName)
    }

    /// Leaf-like kinds whose ambiguous matches are settled by their local context
    /// before the ranked walk.
    pub fn is_atomic(&self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            StringLiteral
                | NumberLiteral
                | BooleanLiteral
                | CharacterLiteral
                | NullLiteral
                | PrefixExpression
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The surface syntax a tree was parsed from.
///
/// Each language is a type vocabulary: the same semantic kind is spelled
/// differently by each grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Java,
    Kotlin,
    Python,
}

impl Language {
    pub fn classify(&self, ty: &str) -> NodeKind {
        match self {
            Language::Java => classify_java(ty),
            Language::Kotlin => classify_kotlin(ty),
            Language::Python => classify_python(ty),
        }
    }

    /// Like [`Language::classify`], for types covering several kinds told
    /// apart by their leading keyword: the node's own label, or else the
    /// label or type of its first child.
    pub fn classify_node(&self, ty: &str, keyword: Option<&str>) -> NodeKind {
        match (self, ty) {
            (Language::Kotlin, "jump_expression") => kotlin_jump(keyword.unwrap_or_default()),
            _ => self.classify(ty),
        }
    }

    /// Annotation names marking a method as a test.
    pub fn test_annotations(&self) -> &'static [&'static str] {
        match self {
            Language::Java | Language::Kotlin => &[
                "Test",
                "ParameterizedTest",
                "RepeatedTest",
                "TestFactory",
                "TestTemplate",
                "org.junit.Test",
                "org.junit.jupiter.api.Test",
            ],
            Language::Python => &[],
        }
    }

    /// Prefix of the name of test functions, for languages whose test
    /// runners collect tests by name.
    pub fn test_name_prefix(&self) -> Option<&'static str> {
        match self {
            Language::Python => Some("test"),
            Language::Java | Language::Kotlin => None,
        }
    }
}

/// `return`, `return@label`, `throw`, `break`, `continue` and their labeled forms.
fn kotlin_jump(keyword: &str) -> NodeKind {
    let keyword = keyword.trim_start();
    if keyword.starts_with("throw") {
        NodeKind::ThrowStatement
    } else if keyword.starts_with("break") {
        NodeKind::BreakStatement
    } else if keyword.starts_with("continue") {
        NodeKind::ContinueStatement
    } else {
        NodeKind::ReturnStatement
    }
}

fn classify_java(ty: &str) -> NodeKind {
    use NodeKind::*;
    match ty {
        "CompilationUnit" => CompilationUnit,
        "ImportDeclaration" => ImportDeclaration,
        "PackageDeclaration" => PackageDeclaration,
        "TypeDeclaration" | "EnumDeclaration" | "RecordDeclaration"
        | "AnnotationTypeDeclaration" => TypeDeclaration,
        "MethodDeclaration" => MethodDeclaration,
        "FieldDeclaration" => FieldDeclaration,
        "MarkerAnnotation" | "NormalAnnotation" | "SingleMemberAnnotation" => Annotation,
        "Modifier" => Modifier,
        "Javadoc" => Javadoc,
        "LineComment" => LineComment,
        "BlockComment" => BlockComment,
        "Block" => Block,
        "ReturnStatement" => ReturnStatement,
        "ExpressionStatement" => ExpressionStatement,
        "VariableDeclarationStatement" => VariableDeclarationStatement,
        "IfStatement" => IfStatement,
        "ForStatement" => ForStatement,
        "EnhancedForStatement" => EnhancedForStatement,
        "WhileStatement" => WhileStatement,
        "DoStatement" => DoStatement,
        "TryStatement" => TryStatement,
        "CatchClause" => CatchClause,
        "ThrowStatement" => ThrowStatement,
        "SwitchStatement" => SwitchStatement,
        "BreakStatement" => BreakStatement,
        "ContinueStatement" => ContinueStatement,
        "AssertStatement" => AssertStatement,
        "MethodInvocation" => MethodInvocation,
        "METHOD_INVOCATION_RECEIVER" => MethodInvocationReceiver,
        "METHOD_INVOCATION_ARGUMENTS" => MethodInvocationArguments,
        "ClassInstanceCreation" => ClassInstanceCreation,
        "InfixExpression" => InfixExpression,
        "INFIX_EXPRESSION_OPERATOR" => InfixOperator,
        "PrefixExpression" => PrefixExpression,
        "ConditionalExpression" => ConditionalExpression,
        "Assignment" => Assignment,
        "SimpleName" => SimpleName,
        "QualifiedName" => QualifiedName,
        "SimpleType" => SimpleType,
        "StringLiteral" | "TextBlock" => StringLiteral,
        "NumberLiteral" => NumberLiteral,
        "BooleanLiteral" => BooleanLiteral,
        "CharacterLiteral" => CharacterLiteral,
        "NullLiteral" => NullLiteral,
        _ => Other,
    }
}

fn classify_kotlin(ty: &str) -> NodeKind {
    use NodeKind::*;
    match ty {
        "source_file" => CompilationUnit,
        "import_header" => ImportDeclaration,
        "package_header" => PackageDeclaration,
        "class_declaration" | "object_declaration" => TypeDeclaration,
        "function_declaration" => MethodDeclaration,
        "property_declaration" => FieldDeclaration,
        "annotation" => Annotation,
        "visibility_modifier" => Modifier,
        "line_comment" => LineComment,
        "multiline_comment" => BlockComment,
        "statements" | "block" => Block,
        "jump_expression" => ReturnStatement,
        "expression_statement" => ExpressionStatement,
        "if_expression" => IfStatement,
        "for_statement" => ForStatement,
        "while_statement" => WhileStatement,
        "do_while_statement" => DoStatement,
        "try_expression" => TryStatement,
        "catch_block" => CatchClause,
        "when_expression" => SwitchStatement,
        "call_expression" => MethodInvocation,
        "navigation_expression" => MethodInvocationReceiver,
        "value_arguments" => MethodInvocationArguments,
        "constructor_invocation" => ClassInstanceCreation,
        "additive_expression" | "multiplicative_expression" | "comparison_expression"
        | "equality_expression" | "conjunction" | "disjunction" => InfixExpression,
        "prefix_expression" => PrefixExpression,
        "assignment" => Assignment,
        "simple_identifier" => SimpleName,
        "identifier" => QualifiedName,
        "user_type" => SimpleType,
        "string_literal" => StringLiteral,
        "integer_literal" | "real_literal" | "long_literal" | "hex_literal" => NumberLiteral,
        "boolean_literal" => BooleanLiteral,
        "character_literal" => CharacterLiteral,
        "null_literal" => NullLiteral,
        _ => Other,
    }
}

fn classify_python(ty: &str) -> NodeKind {
    use NodeKind::*;
    match ty {
        "module" => CompilationUnit,
        "import_statement" | "import_from_statement" => ImportDeclaration,
        "class_definition" => TypeDeclaration,
        "function_definition" => MethodDeclaration,
        "decorator" => Annotation,
        "comment" | "line_comment" => LineComment,
        "block" => Block,
        "return_statement" => ReturnStatement,
        "expression_statement" => ExpressionStatement,
        "if_statement" => IfStatement,
        "for_statement" => EnhancedForStatement,
        "while_statement" => WhileStatement,
        "try_statement" => TryStatement,
        "except_clause" => CatchClause,
        "raise_statement" => ThrowStatement,
        "match_statement" => SwitchStatement,
        "break_statement" => BreakStatement,
        "continue_statement" => ContinueStatement,
        "assert_statement" => AssertStatement,
        "call" => MethodInvocation,
        "attribute" => MethodInvocationReceiver,
        "argument_list" => MethodInvocationArguments,
        "binary_operator" | "comparison_operator" | "boolean_operator" => InfixExpression,
        "unary_operator" | "prefix_expression" => PrefixExpression,
        "conditional_expression" => ConditionalExpression,
        "assignment" => Assignment,
        "identifier" => SimpleName,
        "dotted_name" => QualifiedName,
        "type" => SimpleType,
        "string" => StringLiteral,
        "integer" | "float" => NumberLiteral,
        "true" | "false" | "boolean_literal" => BooleanLiteral,
        "none" => NullLiteral,
        _ => Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_kind_across_vocabularies() {
        assert_eq!(
            Language::Java.classify("MethodInvocation"),
            Language::Kotlin.classify("call_expression")
        );
        assert_eq!(
            Language::Java.classify("MethodInvocation"),
            Language::Python.classify("call")
        );
        assert_eq!(Language::Java.classify("call"), NodeKind::Other);
    }

    #[test]
    fn atomic_kinds() {
        assert!(NodeKind::StringLiteral.is_atomic());
        assert!(NodeKind::PrefixExpression.is_atomic());
        assert!(!NodeKind::SimpleName.is_atomic());
        assert!(NodeKind::Block.is_statement());
        assert!(!NodeKind::MethodInvocation.is_statement());
    }

    #[test]
    fn kotlin_jumps_by_keyword() {
        let kotlin = Language::Kotlin;
        assert_eq!(
            kotlin.classify_node("jump_expression", Some("throw")),
            NodeKind::ThrowStatement
        );
        assert_eq!(
            kotlin.classify_node("jump_expression", Some("break@outer")),
            NodeKind::BreakStatement
        );
        assert_eq!(
            kotlin.classify_node("jump_expression", Some("continue")),
            NodeKind::ContinueStatement
        );
        assert_eq!(
            kotlin.classify_node("jump_expression", Some("return@forEach")),
            NodeKind::ReturnStatement
        );
        assert_eq!(kotlin.classify_node("jump_expression", None), NodeKind::ReturnStatement);
        assert_eq!(
            Language::Java.classify_node("ThrowStatement", Some("return")),
            NodeKind::ThrowStatement
        );
    }

    #[test]
    fn test_discovery() {
        assert!(Language::Python.test_annotations().is_empty());
        assert_eq!(Language::Python.test_name_prefix(), Some("test"));
        assert_eq!(Language::Kotlin.test_name_prefix(), None);
        assert!(Language::Kotlin.test_annotations().contains(&"Test"));
    }
}
