//! Expression typer
//!
//! Walks the body of one user function, asking the operator table for the
//! type of every node and the unifier for the type at every join. Nodes are
//! numbered in post-order, so the body is always the last node.

use maskjit_types::{
    classify_conversion, BinaryOp, Conversion, NumericPromotion, PrimitiveType, ScalarTyping, Type,
    TypeContext, TypeError, TypeId, UnaryOp, Unifier,
};
use rustc_hash::FxHashMap;

use crate::attrs::{resolve_attribute, Attribute};
use crate::config::TypingConfig;
use crate::rules::{OpKey, OperatorTable, RuleContext};
use crate::signature::Signature;

/// Post-order index of a node in the function body
pub type NodeId = usize;

/// Constant in source
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer constant
    Int(i64),
    /// Float constant
    Float(f64),
    /// `True` / `False`
    Bool(bool),
    /// String constant
    Str(String),
}

/// Expression tree of a user function body
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Constant
    Literal(Literal),
    /// Function parameter, by position
    Param(usize),
    /// The null literal
    Na,
    /// `Masked(value, valid)`
    Masked {
        /// Value
        value: Box<Expr>,
        /// Validity
        valid: Box<Expr>,
    },
    /// `lhs op rhs`
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
    /// `op operand`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expr>,
    },
    /// `lhs is rhs`
    Is {
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
    /// `len(operand)`
    Len(Box<Expr>),
    /// `base.name`
    Attr {
        /// Receiver
        base: Box<Expr>,
        /// Attribute name
        name: String,
    },
    /// `recv.method(args...)`
    Call {
        /// Receiver
        recv: Box<Expr>,
        /// Method name
        method: String,
        /// Arguments
        args: Vec<Expr>,
    },
    /// `then if cond else otherwise`
    If {
        /// Branch condition
        cond: Box<Expr>,
        /// Taken when the condition holds
        then: Box<Expr>,
        /// Taken otherwise
        otherwise: Box<Expr>,
    },
}

impl Expr {
    /// Integer literal
    pub fn int(v: i64) -> Expr {
        Expr::Literal(Literal::Int(v))
    }

    /// Float literal
    pub fn float(v: f64) -> Expr {
        Expr::Literal(Literal::Float(v))
    }

    /// Bool literal
    pub fn bool(v: bool) -> Expr {
        Expr::Literal(Literal::Bool(v))
    }

    /// String literal
    pub fn str(v: &str) -> Expr {
        Expr::Literal(Literal::Str(v.to_string()))
    }

    /// Parameter reference
    pub fn param(index: usize) -> Expr {
        Expr::Param(index)
    }

    /// `Masked(value, valid)`
    pub fn masked(value: Expr, valid: Expr) -> Expr {
        Expr::Masked {
            value: Box::new(value),
            valid: Box::new(valid),
        }
    }

    /// `lhs op rhs`
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// `op operand`
    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// `lhs is rhs`
    pub fn is(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Is {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// `len(operand)`
    pub fn len(operand: Expr) -> Expr {
        Expr::Len(Box::new(operand))
    }

    /// `base.name`
    pub fn attr(base: Expr, name: &str) -> Expr {
        Expr::Attr {
            base: Box::new(base),
            name: name.to_string(),
        }
    }

    /// `recv.method(args...)`
    pub fn call(recv: Expr, method: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            recv: Box::new(recv),
            method: method.to_string(),
            args,
        }
    }

    /// `then if cond else otherwise`
    pub fn if_else(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::If {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }
}

/// A conversion the backend must emit on a node's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSite {
    /// Node whose value is converted
    pub node: NodeId,
    /// Type produced by the node
    pub from: TypeId,
    /// Type expected by the consumer
    pub to: TypeId,
    /// How to convert
    pub conversion: Conversion,
}

/// Result of typing one function
#[derive(Debug)]
pub struct TypedFunction {
    /// Type of every node, by [`NodeId`]
    pub node_types: Vec<TypeId>,
    /// Signatures chosen for operator, constructor and call nodes
    pub signatures: FxHashMap<NodeId, Signature>,
    /// Conversions at joins and constructor arguments
    pub conversions: Vec<ConversionSite>,
    /// Type of the body expression
    pub body: TypeId,
    /// Type after return packing; always masked
    pub ret: TypeId,
}

impl TypedFunction {
    /// Type of a node
    pub fn node_type(&self, node: NodeId) -> Option<TypeId> {
        self.node_types.get(node).copied()
    }

    /// Signature chosen for a node
    pub fn signature(&self, node: NodeId) -> Option<&Signature> {
        self.signatures.get(&node)
    }
}

/// Types function bodies against a shared [`TypeContext`]
pub struct Typer<'a> {
    ctx: &'a mut TypeContext,
    rules: RuleContext<'a>,
    table: &'static OperatorTable,
    params: Vec<Type>,
    node_types: Vec<TypeId>,
    signatures: FxHashMap<NodeId, Signature>,
    conversions: Vec<ConversionSite>,
}

impl<'a> Typer<'a> {
    /// Create a typer
    pub fn new(
        ctx: &'a mut TypeContext,
        scalar: &'a dyn ScalarTyping,
        config: &'a TypingConfig,
    ) -> Self {
        Typer {
            ctx,
            rules: RuleContext::new(scalar, config),
            table: OperatorTable::global(),
            params: Vec::new(),
            node_types: Vec::new(),
            signatures: FxHashMap::default(),
            conversions: Vec::new(),
        }
    }

    /// Type `body` given the parameter types
    pub fn check_function(
        mut self,
        params: &[Type],
        body: &Expr,
    ) -> Result<TypedFunction, TypeError> {
        self.params = params.to_vec();
        for param in params {
            self.ctx.intern(param.clone());
        }

        let (_, body_ty) = self.check_expr(body)?;
        let packed = self.table.resolve(&self.rules, OpKey::Pack, &[body_ty.clone()])?;

        let body = self.ctx.intern(body_ty);
        let ret = self.ctx.intern(packed.ret);
        log::debug!(
            "typed function with {} nodes: {} packs to {}",
            self.node_types.len(),
            self.ctx.name(body),
            self.ctx.name(ret)
        );

        Ok(TypedFunction {
            node_types: self.node_types,
            signatures: self.signatures,
            conversions: self.conversions,
            body,
            ret,
        })
    }

    fn record(&mut self, ty: Type, sig: Option<Signature>) -> (NodeId, Type) {
        let id = self.node_types.len();
        let type_id = self.ctx.intern(ty.clone());
        self.node_types.push(type_id);
        if let Some(sig) = sig {
            self.signatures.insert(id, sig);
        }
        (id, ty)
    }

    fn convert(&mut self, node: NodeId, from: &Type, to: &Type, conversion: Conversion) {
        let from = self.ctx.intern(from.clone());
        let to = self.ctx.intern(to.clone());
        self.conversions.push(ConversionSite {
            node,
            from,
            to,
            conversion,
        });
    }

    fn resolve(&self, key: OpKey, operands: &[Type]) -> Result<Signature, TypeError> {
        self.table.resolve(&self.rules, key, operands)
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<(NodeId, Type), TypeError> {
        match expr {
            Expr::Literal(lit) => {
                let ty = match lit {
                    Literal::Int(_) => Type::Primitive(self.rules.config.literal_int),
                    Literal::Float(_) => Type::Primitive(self.rules.config.literal_float),
                    Literal::Bool(_) => Type::Primitive(PrimitiveType::Boolean),
                    Literal::Str(_) => Type::StringLiteral,
                };
                Ok(self.record(ty, None))
            }

            Expr::Param(index) => {
                let ty = self
                    .params
                    .get(*index)
                    .cloned()
                    .ok_or(TypeError::UnknownParameter { index: *index })?;
                Ok(self.record(ty, None))
            }

            Expr::Na => Ok(self.record(Type::Null, None)),

            Expr::Masked { value, valid } => {
                let (value_node, value_ty) = self.check_expr(value)?;
                let (_, valid_ty) = self.check_expr(valid)?;
                let sig = self.resolve(OpKey::MaskedCtor, &[value_ty.clone(), valid_ty])?;
                if value_ty == Type::StringView {
                    let owned = Type::OwnedString;
                    self.convert(value_node, &value_ty, &owned, Conversion::Materialize);
                }
                Ok(self.record(sig.ret.clone(), Some(sig)))
            }

            Expr::Binary { op, lhs, rhs } => {
                let (_, l) = self.check_expr(lhs)?;
                let (_, r) = self.check_expr(rhs)?;
                let sig = self.resolve(OpKey::Binary(*op), &[l, r])?;
                Ok(self.record(sig.ret.clone(), Some(sig)))
            }

            Expr::Unary { op, operand } => {
                let (_, t) = self.check_expr(operand)?;
                let sig = self.resolve(OpKey::Unary(*op), &[t])?;
                Ok(self.record(sig.ret.clone(), Some(sig)))
            }

            Expr::Is { lhs, rhs } => {
                let (_, l) = self.check_expr(lhs)?;
                let (_, r) = self.check_expr(rhs)?;
                let sig = self.resolve(OpKey::Is, &[l, r])?;
                Ok(self.record(sig.ret.clone(), Some(sig)))
            }

            Expr::Len(operand) => {
                let (_, t) = self.check_expr(operand)?;
                let sig = self.resolve(OpKey::Len, &[t])?;
                Ok(self.record(sig.ret.clone(), Some(sig)))
            }

            Expr::Attr { base, name } => {
                let (_, recv) = self.check_expr(base)?;
                match resolve_attribute(&self.rules, &recv, name)? {
                    Attribute::Member(ty) => Ok(self.record(ty, None)),
                    // Bound methods are not values
                    Attribute::Method(_) => Err(TypeError::UnknownAttribute {
                        ty: recv.to_string(),
                        attr: name.clone(),
                    }),
                }
            }

            Expr::Call { recv, method, args } => {
                let (_, recv_ty) = self.check_expr(recv)?;
                let mut arg_types = Vec::with_capacity(args.len());
                for arg in args {
                    arg_types.push(self.check_expr(arg)?.1);
                }
                let Attribute::Method(method) = resolve_attribute(&self.rules, &recv_ty, method)?
                else {
                    return Err(TypeError::UnknownAttribute {
                        ty: recv_ty.to_string(),
                        attr: format!("{}()", method),
                    });
                };
                let sig = method.signature(&self.rules, &recv_ty, &arg_types)?;
                Ok(self.record(sig.ret.clone(), Some(sig)))
            }

            Expr::If {
                cond,
                then,
                otherwise,
            } => {
                let (_, cond_ty) = self.check_expr(cond)?;
                self.resolve(OpKey::Truth, &[cond_ty])?;

                let (then_node, then_ty) = self.check_expr(then)?;
                let (else_node, else_ty) = self.check_expr(otherwise)?;
                let unified = Unifier::new(self.rules.scalar).unify(&then_ty, &else_ty)?;

                for (node, ty) in [(then_node, &then_ty), (else_node, &else_ty)] {
                    let conversion = classify_conversion(self.rules.scalar, ty, &unified)?;
                    if !conversion.is_noop() {
                        self.convert(node, ty, &unified, conversion);
                    }
                }
                Ok(self.record(unified, None))
            }
        }
    }
}

/// Type `body` with the default scalar rules
pub fn infer_function(
    ctx: &mut TypeContext,
    config: &TypingConfig,
    params: &[Type],
    body: &Expr,
) -> Result<TypedFunction, TypeError> {
    Typer::new(ctx, &NumericPromotion, config).check_function(params, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maskjit_types::MaskedType;

    use PrimitiveType as P;

    fn infer(params: &[Type], body: &Expr) -> Result<(TypeContext, TypedFunction), TypeError> {
        let mut ctx = TypeContext::new();
        let typed = infer_function(&mut ctx, &TypingConfig::default(), params, body)?;
        Ok((ctx, typed))
    }

    fn ret_type(params: &[Type], body: &Expr) -> Result<Type, TypeError> {
        let (ctx, typed) = infer(params, body)?;
        Ok(ctx.get(typed.ret).cloned().unwrap())
    }

    #[test]
    fn test_literals_follow_config() {
        let (ctx, typed) = infer(&[], &Expr::int(1)).unwrap();
        assert_eq!(ctx.get(typed.body), Some(&Type::Primitive(P::Int64)));
        assert_eq!(ctx.get(typed.ret), Some(&Type::masked(P::Int64)));

        let mut ctx = TypeContext::new();
        let config = TypingConfig {
            literal_float: P::Float32,
            ..TypingConfig::default()
        };
        let typed = infer_function(&mut ctx, &config, &[], &Expr::float(0.5)).unwrap();
        assert_eq!(ctx.get(typed.body), Some(&Type::Primitive(P::Float32)));
    }

    #[test]
    fn test_post_order_numbering() {
        let body = Expr::binary(BinaryOp::Add, Expr::param(0), Expr::param(1));
        let params = [Type::masked(P::Int32), Type::masked(P::Int32)];
        let (ctx, typed) = infer(&params, &body).unwrap();

        assert_eq!(typed.node_types.len(), 3);
        assert_eq!(typed.node_type(2), Some(typed.body));
        assert_eq!(ctx.name(typed.body), "Masked(int32)");
        assert!(typed.signature(2).is_some());
        assert!(typed.signature(0).is_none());
    }

    #[test]
    fn test_unknown_parameter() {
        assert_eq!(
            ret_type(&[], &Expr::param(3)),
            Err(TypeError::UnknownParameter { index: 3 })
        );
    }

    #[test]
    fn test_masked_ctor_materializes_views() {
        let body = Expr::masked(Expr::param(0), Expr::bool(true));
        let (ctx, typed) = infer(&[Type::StringView], &body).unwrap();

        assert_eq!(ctx.get(typed.ret), Some(&Type::Masked(MaskedType::owned_string())));
        assert_eq!(typed.conversions.len(), 1);
        let site = typed.conversions[0];
        assert_eq!(site.node, 0);
        assert_eq!(site.conversion, Conversion::Materialize);
        assert_eq!(site.to, TypeContext::OWNED_STRING);
    }

    #[test]
    fn test_if_else_join_records_conversions() {
        // Masked(x) if cond else NA
        let body = Expr::if_else(Expr::param(1), Expr::param(0), Expr::Na);
        let (ctx, typed) = infer(&[P::Float64.into(), P::Boolean.into()], &body).unwrap();

        assert_eq!(ctx.get(typed.body), Some(&Type::masked(P::Float64)));
        let kinds: Vec<_> = typed.conversions.iter().map(|c| c.conversion).collect();
        assert_eq!(kinds, [Conversion::WrapValid, Conversion::NullToMasked]);
    }

    #[test]
    fn test_view_joining_null_is_materialized() {
        // x if c else NA, x a string view
        let body = Expr::if_else(Expr::param(1), Expr::param(0), Expr::Na);
        let (ctx, typed) = infer(&[Type::StringView, P::Boolean.into()], &body).unwrap();

        let masked_string = Type::Masked(MaskedType::owned_string());
        assert_eq!(ctx.get(typed.body), Some(&masked_string));

        let sites: Vec<_> = typed.conversions.iter().map(|c| (c.node, c.conversion)).collect();
        assert_eq!(sites, [(1, Conversion::MaterializeValid), (2, Conversion::NullToMasked)]);
        assert_eq!(typed.conversions[0].from, TypeContext::STRING_VIEW);
    }

    #[test]
    fn test_masked_condition_uses_truthiness() {
        let cond = Expr::binary(BinaryOp::Gt, Expr::param(0), Expr::int(0));
        let body = Expr::if_else(cond, Expr::param(0), Expr::int(0));
        assert_eq!(
            ret_type(&[Type::masked(P::Int64)], &body),
            Ok(Type::masked(P::Int64))
        );

        let bad = Expr::if_else(Expr::param(0), Expr::int(1), Expr::int(0));
        assert!(matches!(
            ret_type(&[Type::masked(P::Int64)], &bad),
            Err(TypeError::NoApplicableOperator { .. })
        ));
    }

    #[test]
    fn test_join_without_common_type() {
        let body = Expr::if_else(Expr::bool(true), Expr::int(1), Expr::str("x"));
        assert_eq!(
            ret_type(&[], &body),
            Err(TypeError::UnificationFailed {
                left: "int64".to_string(),
                right: "Literal[str]".to_string(),
            })
        );
    }

    #[test]
    fn test_attributes_and_methods() {
        let s = Type::Masked(MaskedType::owned_string());

        let body = Expr::attr(Expr::param(0), "valid");
        assert_eq!(ret_type(&[s.clone()], &body), Ok(Type::masked(P::Boolean)));

        let body = Expr::call(Expr::param(0), "upper", vec![]);
        assert_eq!(ret_type(&[s.clone()], &body), Ok(s.clone()));

        let body = Expr::call(Expr::param(0), "find", vec![Expr::param(1)]);
        assert_eq!(
            ret_type(&[s.clone(), s.clone()], &body),
            Ok(Type::masked(P::Int32))
        );

        let body = Expr::attr(Expr::param(0), "lower");
        assert!(matches!(
            ret_type(&[s.clone()], &body),
            Err(TypeError::UnknownAttribute { .. })
        ));

        let body = Expr::call(Expr::param(0), "value", vec![]);
        assert!(matches!(
            ret_type(&[s], &body),
            Err(TypeError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_returning_null_fails() {
        assert_eq!(
            ret_type(&[], &Expr::Na),
            Err(TypeError::InvalidReturn {
                ty: "NA".to_string()
            })
        );
    }
}
