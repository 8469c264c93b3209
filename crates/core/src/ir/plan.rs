//! Call-shape planning for function and method wrappers.
//!
//! Every callable lowers to one uniform TypeScript signature:
//!
//! ```text
//! name(fixed..., extra?: unknown[], options?: NameOptions)
//! ```
//!
//! The required positional prefix becomes individually typed parameters.
//! Star-args and optional positional-only parameters flow through a single
//! `extra` array. Everything keyword-addressable lands in a per-function
//! options interface extending the runtime `CallOptions`. There are no
//! overload families: one source callable, one wrapper.

use crate::manifest::{ParamKind, ParameterDesc};

use super::typemap::map_type;
use super::types::TsType;
use super::utils::sanitize_identifier;

/// Planned call shape for one callable.
#[derive(Debug, Clone)]
pub struct CallPlan {
    /// Required positional prefix, in source order.
    pub fixed: Vec<FixedParam>,
    /// Whether the wrapper takes a trailing `extra?: unknown[]` channel.
    pub extra: bool,
    /// Keyword-addressable surface.
    pub options: OptionsPlan,
}

/// One individually typed positional parameter.
#[derive(Debug, Clone)]
pub struct FixedParam {
    /// TypeScript identifier.
    pub ident: String,
    /// Original source parameter name, for docs.
    pub source: String,
    /// Mapped parameter type.
    pub ty: TsType,
}

/// The options-bag side of a call plan.
#[derive(Debug, Clone, Default)]
pub struct OptionsPlan {
    /// Named keyword fields, in source order.
    pub fields: Vec<OptionField>,
    /// Whether `**kwargs` adds an open index signature.
    pub has_kwargs: bool,
    /// Whether the options parameter itself is required.
    pub required: bool,
}

/// One named field of an options interface.
#[derive(Debug, Clone)]
pub struct OptionField {
    /// Property name in the interface (quoted at emit time if needed).
    pub name: String,
    /// Original source parameter name, used as the runtime kwarg key.
    pub source: String,
    /// Mapped field type.
    pub ty: TsType,
    /// Whether the field is required.
    pub required: bool,
}

impl OptionsPlan {
    /// True when no dedicated interface is needed and the wrapper can take
    /// the runtime `CallOptions` directly.
    pub fn is_plain(&self) -> bool {
        self.fields.is_empty() && !self.has_kwargs
    }
}

impl CallPlan {
    /// True when every runtime kwarg key equals its interface property name,
    /// letting the wrapper forward the destructured rest object as-is.
    pub fn kwargs_passthrough(&self) -> bool {
        self.options.fields.iter().all(|f| f.name == f.source)
    }
}

/// Plan the wrapper signature for a parameter list.
///
/// `self` receivers are stripped by normalization before planning; this
/// function sees only the parameters a caller supplies.
pub fn plan_call(params: &[ParameterDesc]) -> CallPlan {
    let mut plan = CallPlan { fixed: Vec::new(), extra: false, options: OptionsPlan::default() };
    // every binding the emitted wrapper introduces itself: the method
    // receiver, the extra/options parameters, and the destructured flags
    // plus `...kwargs` rest inside the body
    let mut taken: Vec<String> = ["self", "extra", "options", "kwargs", "timeoutMs", "idempotencyKey"]
        .into_iter()
        .map(String::from)
        .collect();
    let mut past_optional_positional = false;

    for param in params {
        match param.kind {
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword => {
                if param.required && !past_optional_positional {
                    let ident = unique_ident(&param.name, &mut taken);
                    plan.fixed.push(FixedParam {
                        ident,
                        source: param.name.clone(),
                        ty: param.ty.as_ref().map_or_else(TsType::unknown, map_type),
                    });
                } else if !param.required && param.kind == ParamKind::PositionalOnly {
                    // Optional positional-only params have no keyword channel;
                    // they ride the extra array.
                    plan.extra = true;
                    past_optional_positional = true;
                } else {
                    // Optional keyword-addressable, or required but stranded
                    // behind an optional positional slot.
                    if !param.required {
                        past_optional_positional = true;
                    }
                    plan.options.fields.push(OptionField {
                        name: sanitize_identifier(&param.name),
                        source: param.name.clone(),
                        ty: param.ty.as_ref().map_or_else(TsType::unknown, map_type),
                        required: param.required,
                    });
                }
            }
            ParamKind::VarPositional => {
                plan.extra = true;
                past_optional_positional = true;
            }
            ParamKind::KeywordOnly => {
                plan.options.fields.push(OptionField {
                    name: sanitize_identifier(&param.name),
                    source: param.name.clone(),
                    ty: param.ty.as_ref().map_or_else(TsType::unknown, map_type),
                    required: param.required,
                });
            }
            ParamKind::VarKeyword => {
                plan.options.has_kwargs = true;
            }
        }
    }

    plan.options.required = plan.options.fields.iter().any(|f| f.required);
    plan
}

/// Sanitize `source` and keep appending `_` until it collides with nothing
/// already claimed in this signature.
fn unique_ident(source: &str, taken: &mut Vec<String>) -> String {
    let mut ident = sanitize_identifier(source);
    while taken.iter().any(|t| t == &ident) {
        ident.push('_');
    }
    taken.push(ident.clone());
    ident
}
