//! Lowering from AST to HIR
//!
//! Resolves function names against the registry, checks arity, substitutes
//! constants and folds negative literals. No type checking happens here; type
//! mismatches surface during evaluation.

use std::sync::Arc;

use crate::ast::AstNode;
use crate::constants::{ConstantTable, RESOURCE_CONSTANTS};
use crate::error::{Error, Result};
use crate::functions;
use crate::hir::{Function, HirNode};
use crate::value::{Value, ValueData};

/// Namespaces accepted in front of `ofType` type names.
const TYPE_NAMESPACES: [&str; 2] = ["FHIR.", "System."];

pub struct Compiler<'a> {
    constants: &'a ConstantTable,
}

impl<'a> Compiler<'a> {
    pub fn new(constants: &'a ConstantTable) -> Self {
        Self { constants }
    }

    pub fn compile(&self, ast: &AstNode) -> Result<HirNode> {
        self.lower(ast)
    }

    fn lower(&self, node: &AstNode) -> Result<HirNode> {
        match node {
            AstNode::Invoke { target, invocation } => {
                let base = self.lower(target)?;
                self.lower_invocation(invocation, Some(base))
            }
            AstNode::Member { .. } | AstNode::Function { .. } | AstNode::This => {
                self.lower_invocation(node, None)
            }
            AstNode::Group(inner) => self.lower(inner),
            AstNode::Literal(literal) => Ok(HirNode::Literal(literal.to_value())),
            AstNode::Constant { name, .. } => self.lower_constant(name),
            AstNode::Negate(inner) => {
                let inner = self.lower(inner)?;
                // fold negative numeric literals
                if let HirNode::Literal(value) = &inner {
                    match value.data() {
                        ValueData::Integer(i) => return Ok(HirNode::Literal(Value::integer(-*i))),
                        ValueData::Decimal(d) => return Ok(HirNode::Literal(Value::decimal(-*d))),
                        _ => {}
                    }
                }
                Ok(HirNode::Negate(Box::new(inner)))
            }
            AstNode::Binary { op, left, right } => Ok(HirNode::Binary {
                op: *op,
                left: Box::new(self.lower(left)?),
                right: Box::new(self.lower(right)?),
            }),
        }
    }

    fn lower_constant(&self, name: &str) -> Result<HirNode> {
        if let Some(value) = self.constants.get(name) {
            return Ok(value.to_hir());
        }
        if RESOURCE_CONSTANTS.contains(&name) {
            return Ok(HirNode::Resource);
        }
        Err(Error::UnknownConstant(name.to_string()))
    }

    fn lower_invocation(&self, invocation: &AstNode, base: Option<HirNode>) -> Result<HirNode> {
        match invocation {
            AstNode::Member { name } => Ok(HirNode::Path {
                base: base.map(Box::new),
                name: Arc::from(name.as_str()),
            }),
            AstNode::This => Ok(base.unwrap_or(HirNode::This)),
            AstNode::Function {
                name,
                args,
                position,
            } => {
                let meta = functions::lookup(name)
                    .ok_or_else(|| Error::syntax(format!("Unknown function '{}'", name), *position))?;

                if args.len() < meta.min_args || args.len() > meta.max_args {
                    return Err(Error::syntax(
                        format!(
                            "Function '{}' expects {} argument(s), got {}",
                            meta.name,
                            meta.arity(),
                            args.len()
                        ),
                        *position,
                    ));
                }

                // type arguments are names, not paths to navigate
                let args = if matches!(meta.function, Function::OfType | Function::GetId) {
                    args.iter()
                        .map(|arg| self.lower_type_specifier(meta.name, arg, *position))
                        .collect::<Result<Vec<_>>>()?
                } else {
                    args.iter().map(|arg| self.lower(arg)).collect::<Result<Vec<_>>>()?
                };

                Ok(HirNode::Function {
                    base: base.map(Box::new),
                    function: meta.function,
                    args,
                })
            }
            other => Err(Error::Evaluation(format!(
                "Not an invocation: {:?}",
                other
            ))),
        }
    }

    fn lower_type_specifier(&self, function: &str, node: &AstNode, position: usize) -> Result<HirNode> {
        let name = node
            .as_qualified_identifier()
            .ok_or_else(|| Error::syntax(format!("{}() expects a type name", function), position))?;
        let name = TYPE_NAMESPACES
            .iter()
            .find_map(|ns| name.strip_prefix(ns))
            .unwrap_or(name.as_str());
        if name.contains('.') {
            return Err(Error::syntax(
                format!("Unknown type namespace in '{}'", name),
                position,
            ));
        }
        Ok(HirNode::Literal(Value::string(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ConstantValue;
    use crate::parser::parse;

    fn compile_with(text: &str, constants: &ConstantTable) -> Result<HirNode> {
        Compiler::new(constants).compile(&parse(text)?)
    }

    fn compile(text: &str) -> Result<HirNode> {
        compile_with(text, &ConstantTable::new())
    }

    #[test]
    fn test_path_chain() {
        let hir = compile("name.given").unwrap();
        assert_eq!(
            hir,
            HirNode::Path {
                base: Some(Box::new(HirNode::Path {
                    base: None,
                    name: "name".into()
                })),
                name: "given".into(),
            }
        );
    }

    #[test]
    fn test_unknown_function_and_arity() {
        match compile("name.select(given)") {
            Err(Error::Syntax { message, position }) => {
                assert!(message.contains("select"));
                assert_eq!(position, 5);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
        assert!(matches!(compile("where()"), Err(Error::Syntax { .. })));
        assert!(matches!(compile("first(1)"), Err(Error::Syntax { .. })));
        assert!(compile("exists()").is_ok());
        assert!(compile("exists(use = 'official')").is_ok());
    }

    #[test]
    fn test_literal_constant_substitution() {
        let constants = ConstantTable::new().with_literal("system", Value::string("http://loinc.org"));
        let hir = compile_with("system = %system", &constants).unwrap();
        let HirNode::Binary { right, .. } = hir else {
            panic!("expected binary");
        };
        assert_eq!(*right, HirNode::Literal(Value::string("http://loinc.org")));
    }

    #[test]
    fn test_expression_constant_is_inlined() {
        let mut constants = ConstantTable::new();
        let component = compile("component.first()").unwrap();
        constants.insert("c", ConstantValue::Expression(Arc::new(component.clone())));

        assert_eq!(compile_with("%c", &constants).unwrap(), component);
    }

    #[test]
    fn test_unknown_constant() {
        assert_eq!(
            compile("%sbp_componnet.exists()"),
            Err(Error::UnknownConstant("sbp_componnet".into()))
        );
        assert_eq!(compile("%resource.id").unwrap(), HirNode::Path {
            base: Some(Box::new(HirNode::Resource)),
            name: "id".into(),
        });
    }

    #[test]
    fn test_of_type_specifier() {
        let hir = compile("value.ofType(FHIR.Quantity)").unwrap();
        let HirNode::Function { function, args, .. } = hir else {
            panic!("expected function");
        };
        assert_eq!(function, Function::OfType);
        assert_eq!(args, vec![HirNode::Literal(Value::string("Quantity"))]);

        assert!(matches!(compile("value.ofType('Quantity')"), Err(Error::Syntax { .. })));

        let HirNode::Function { args, .. } = compile("subject.getId(Patient)").unwrap() else {
            panic!("expected function");
        };
        assert_eq!(args, vec![HirNode::Literal(Value::string("Patient"))]);
    }

    #[test]
    fn test_negative_literals_fold() {
        assert_eq!(compile("-5").unwrap(), HirNode::Literal(Value::integer(-5)));
        assert!(matches!(compile("-value").unwrap(), HirNode::Negate(_)));
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let text = "component.where(code.coding.exists(system = 'http://loinc.org' and code = '8480-6')).value.ofType(Quantity).value";
        assert_eq!(compile(text).unwrap(), compile(text).unwrap());
    }
}
