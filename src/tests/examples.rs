use crate::tree::SimpleTree;

/// `f(x);`
pub(crate) fn call_statement(f: &str, x: &str) -> SimpleTree {
    tree!("ExpressionStatement"; [
        tree!("MethodInvocation"; [
            tree!("SimpleName", f),
            tree!("METHOD_INVOCATION_ARGUMENTS"; [tree!("SimpleName", x)]),
        ]),
    ])
}

/// `f(x);` spelled by the Kotlin grammar.
pub(crate) fn kotlin_call_statement(f: &str, x: &str) -> SimpleTree {
    tree!("expression_statement"; [
        tree!("call_expression"; [
            tree!("simple_identifier", f),
            tree!("value_arguments"; [tree!("simple_identifier", x)]),
        ]),
    ])
}

/// `{a=1;b=2;}`
pub(crate) fn assignments_block() -> SimpleTree {
    fn assign(name: &str, value: &str) -> SimpleTree {
        tree!("ExpressionStatement"; [
            tree!("Assignment"; [
                tree!("SimpleName", name),
                tree!("ASSIGNMENT_OPERATOR", "="),
                tree!("NumberLiteral", value),
            ]),
        ])
    }
    tree!("Block"; [assign("a", "1"), assign("b", "2")])
}

/// A method whose body holds `statements`, annotated with `annotation`.
pub(crate) fn annotated_method(annotation: &str, name: &str, statements: Vec<SimpleTree>) -> SimpleTree {
    tree!("TypeDeclaration"; [
        tree!("SimpleName", "Foo"),
        tree!("MethodDeclaration"; [
            tree!("MarkerAnnotation"; [tree!("SimpleName", annotation)]),
            tree!("SimpleName", name),
            SimpleTree::new("Block", None, statements),
        ]),
    ])
}

fn int_type() -> SimpleTree {
    tree!("PrimitiveType", "int")
}

/// A small class computing a sum, with a test.
pub(crate) fn class_before() -> SimpleTree {
    tree!("CompilationUnit"; [
        tree!("ImportDeclaration"; [tree!("QualifiedName", "java.util.List")]),
        tree!("TypeDeclaration"; [
            tree!("Modifier", "public"),
            tree!("SimpleName", "Calc"),
            tree!("MethodDeclaration"; [
                tree!("Modifier", "public"),
                int_type(),
                tree!("SimpleName", "sum"),
                tree!("SingleVariableDeclaration"; [
                    tree!("ParameterizedType"; [
                        tree!("SimpleType"; [tree!("SimpleName", "List")]),
                        tree!("SimpleType"; [tree!("SimpleName", "Integer")]),
                    ]),
                    tree!("SimpleName", "xs"),
                ]),
                tree!("Block"; [
                    tree!("VariableDeclarationStatement"; [
                        int_type(),
                        tree!("VariableDeclarationFragment"; [
                            tree!("SimpleName", "s"),
                            tree!("NumberLiteral", "0"),
                        ]),
                    ]),
                    tree!("EnhancedForStatement"; [
                        tree!("SingleVariableDeclaration"; [int_type(), tree!("SimpleName", "x")]),
                        tree!("SimpleName", "xs"),
                        tree!("Block"; [
                            tree!("ExpressionStatement"; [
                                tree!("Assignment"; [
                                    tree!("SimpleName", "s"),
                                    tree!("ASSIGNMENT_OPERATOR", "+="),
                                    tree!("SimpleName", "x"),
                                ]),
                            ]),
                        ]),
                    ]),
                    tree!("ReturnStatement"; [tree!("SimpleName", "s")]),
                ]),
            ]),
            tree!("MethodDeclaration"; [
                tree!("MarkerAnnotation"; [tree!("SimpleName", "Test")]),
                tree!("PrimitiveType", "void"),
                tree!("SimpleName", "testSum"),
                tree!("Block"; [
                    tree!("ExpressionStatement"; [
                        tree!("MethodInvocation"; [
                            tree!("SimpleName", "assertEquals"),
                            tree!("METHOD_INVOCATION_ARGUMENTS"; [
                                tree!("NumberLiteral", "3"),
                                tree!("MethodInvocation"; [
                                    tree!("SimpleName", "sum"),
                                    tree!("METHOD_INVOCATION_ARGUMENTS"; [tree!("SimpleName", "xs")]),
                                ]),
                            ]),
                        ]),
                    ]),
                ]),
            ]),
        ]),
    ])
}

/// [`class_before`] with `sum` renamed, a logging call added and the
/// accumulation rewritten as an infix expression.
pub(crate) fn class_after() -> SimpleTree {
    tree!("CompilationUnit"; [
        tree!("ImportDeclaration"; [tree!("QualifiedName", "java.util.List")]),
        tree!("ImportDeclaration"; [tree!("QualifiedName", "java.util.logging.Logger")]),
        tree!("TypeDeclaration"; [
            tree!("Modifier", "public"),
            tree!("SimpleName", "Calc"),
            tree!("MethodDeclaration"; [
                tree!("Modifier", "public"),
                int_type(),
                tree!("SimpleName", "total"),
                tree!("SingleVariableDeclaration"; [
                    tree!("ParameterizedType"; [
                        tree!("SimpleType"; [tree!("SimpleName", "List")]),
                        tree!("SimpleType"; [tree!("SimpleName", "Integer")]),
                    ]),
                    tree!("SimpleName", "xs"),
                ]),
                tree!("Block"; [
                    tree!("VariableDeclarationStatement"; [
                        int_type(),
                        tree!("VariableDeclarationFragment"; [
                            tree!("SimpleName", "s"),
                            tree!("NumberLiteral", "0"),
                        ]),
                    ]),
                    tree!("EnhancedForStatement"; [
                        tree!("SingleVariableDeclaration"; [int_type(), tree!("SimpleName", "x")]),
                        tree!("SimpleName", "xs"),
                        tree!("Block"; [
                            tree!("ExpressionStatement"; [
                                tree!("MethodInvocation"; [
                                    tree!("METHOD_INVOCATION_RECEIVER"; [tree!("SimpleName", "log")]),
                                    tree!("SimpleName", "fine"),
                                    tree!("METHOD_INVOCATION_ARGUMENTS"; [tree!("SimpleName", "x")]),
                                ]),
                            ]),
                            tree!("ExpressionStatement"; [
                                tree!("Assignment"; [
                                    tree!("SimpleName", "s"),
                                    tree!("ASSIGNMENT_OPERATOR", "="),
                                    tree!("InfixExpression"; [
                                        tree!("SimpleName", "s"),
                                        tree!("INFIX_EXPRESSION_OPERATOR", "+"),
                                        tree!("SimpleName", "x"),
                                    ]),
                                ]),
                            ]),
                        ]),
                    ]),
                    tree!("ReturnStatement"; [tree!("SimpleName", "s")]),
                ]),
            ]),
            tree!("MethodDeclaration"; [
                tree!("MarkerAnnotation"; [tree!("SimpleName", "Test")]),
                tree!("PrimitiveType", "void"),
                tree!("SimpleName", "testTotal"),
                tree!("Block"; [
                    tree!("ExpressionStatement"; [
                        tree!("MethodInvocation"; [
                            tree!("SimpleName", "assertEquals"),
                            tree!("METHOD_INVOCATION_ARGUMENTS"; [
                                tree!("NumberLiteral", "3"),
                                tree!("MethodInvocation"; [
                                    tree!("SimpleName", "total"),
                                    tree!("METHOD_INVOCATION_ARGUMENTS"; [tree!("SimpleName", "xs")]),
                                ]),
                            ]),
                        ]),
                    ]),
                ]),
            ]),
        ]),
    ])
}
