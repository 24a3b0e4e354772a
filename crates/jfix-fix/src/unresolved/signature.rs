//! Matching call arguments against existing overloads.
//!
//! For a varargs method the last entry of `params` is the component type.

use jfix_ast::{BindingTable, MethodId, NodeId, SyntaxTree, TypeId};

use crate::messages;
use crate::operation::{ArgumentChange, ArgumentSlot, ParameterSlot, SignatureChange};
use crate::unresolved::naming;

/// Parameter list shape used for matching.
#[derive(Clone, Debug)]
pub(crate) struct Shape {
    pub params: Vec<TypeId>,
    pub varargs: bool,
}

impl Shape {
    pub fn of(b: &BindingTable, method: MethodId) -> Self {
        let binding = b.method(method);
        Self {
            params: binding.params.clone(),
            varargs: binding.varargs && !binding.params.is_empty(),
        }
    }

    fn fixed(&self) -> usize {
        if self.varargs {
            self.params.len() - 1
        } else {
            self.params.len()
        }
    }

    fn component(&self) -> Option<TypeId> {
        self.varargs.then(|| self.params[self.params.len() - 1])
    }

    /// The call is accepted as is, trailing arguments included.
    pub fn accepts(&self, b: &BindingTable, args: &[TypeId]) -> bool {
        let fixed = self.fixed();
        if args.len() < fixed || (!self.varargs && args.len() != fixed) {
            return false;
        }
        let fixed_ok = args
            .iter()
            .zip(&self.params[..fixed])
            .all(|(arg, param)| b.is_assignable(*arg, *param));
        let rest_ok = match self.component() {
            Some(component) => args[fixed..]
                .iter()
                .all(|arg| b.is_assignable(*arg, component)),
            None => true,
        };
        fixed_ok && rest_ok
    }

    /// Indices of arguments to drop so the remaining ones match, matching greedily left to
    /// right. `None` when some fixed parameter stays unmatched.
    fn extra_arguments(&self, b: &BindingTable, args: &[TypeId]) -> Option<Vec<usize>> {
        let fixed = self.fixed();
        let mut param = 0;
        let mut extras = Vec::new();
        for (idx, arg) in args.iter().enumerate() {
            let consumed = if param < fixed {
                let matches = b.is_assignable(*arg, self.params[param]);
                param += usize::from(matches);
                matches
            } else {
                self.component()
                    .is_some_and(|component| b.is_assignable(*arg, component))
            };
            if !consumed {
                extras.push(idx);
            }
        }
        (param == fixed).then_some(extras)
    }

    /// Indices of fixed parameters no argument matches. `None` when some argument stays
    /// unmatched.
    fn missing_parameters(&self, b: &BindingTable, args: &[TypeId]) -> Option<Vec<usize>> {
        let fixed = self.fixed();
        let mut arg = 0;
        let mut missing = Vec::new();
        for param in 0..fixed {
            if arg < args.len() && b.is_assignable(args[arg], self.params[param]) {
                arg += 1;
            } else {
                missing.push(param);
            }
        }
        if let Some(component) = self.component() {
            while arg < args.len() && b.is_assignable(args[arg], component) {
                arg += 1;
            }
        }
        (arg == args.len()).then_some(missing)
    }

    fn swapped(&self, i: usize, j: usize) -> Shape {
        let mut params = self.params.clone();
        params.swap(i, j);
        Shape {
            params,
            varargs: self.varargs,
        }
    }

    /// First pair of positions whose exchange makes the call match.
    fn swap(&self, b: &BindingTable, args: &[TypeId]) -> Option<(usize, usize)> {
        if args.len() != self.params.len() {
            return None;
        }
        let limit = self.fixed();
        (0..limit)
            .flat_map(|i| (i + 1..limit).map(move |j| (i, j)))
            .find(|(i, j)| self.swapped(*i, *j).accepts(b, args))
    }
}

/// `foo(int, String...)`.
pub(crate) fn signature(b: &BindingTable, name: &str, shape: &Shape) -> String {
    let params: Vec<String> = shape
        .params
        .iter()
        .enumerate()
        .map(|(idx, ty)| {
            let mut text = b.display(*ty);
            if shape.varargs && idx + 1 == shape.params.len() {
                text.push_str("...");
            }
            text
        })
        .collect();
    format!("{name}({})", params.join(", "))
}

/// One argument of the call being fixed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Argument {
    pub node: NodeId,
    /// Static type, used for matching.
    pub ty: TypeId,
    /// Type written for a parameter receiving the argument.
    pub stub_ty: TypeId,
}

fn types(args: &[Argument]) -> Vec<TypeId> {
    args.iter().map(|arg| arg.ty).collect()
}

/// Call-site changes that make `args` match `method`: drop extra arguments, add missing ones
/// named after the parameters, or swap two arguments.
pub(crate) fn argument_changes(
    tree: &SyntaxTree,
    b: &BindingTable,
    method: MethodId,
    args: &[Argument],
) -> Vec<ArgumentChange> {
    let binding = b.method(method);
    let shape = Shape::of(b, method);
    let arg_types = types(args);
    let sig = signature(b, &binding.name, &shape);
    let mut changes = Vec::new();

    if let Some(extras) = shape.extra_arguments(b, &arg_types).filter(|e| !e.is_empty()) {
        changes.push(ArgumentChange {
            arguments: (0..args.len())
                .filter(|idx| !extras.contains(idx))
                .map(ArgumentSlot::Existing)
                .collect(),
            label: messages::remove_arguments(extras.len(), &sig),
        });
    }

    if let Some(missing) = shape.missing_parameters(b, &arg_types).filter(|m| !m.is_empty()) {
        let mut arguments = Vec::new();
        let mut next_arg = 0;
        for param in 0..shape.params.len() {
            if missing.contains(&param) {
                let name = binding
                    .param_names
                    .get(param)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| naming::name_for_type(b, shape.params[param]));
                arguments.push(ArgumentSlot::New(name));
            } else if shape.varargs && param + 1 == shape.params.len() {
                arguments.extend((next_arg..args.len()).map(ArgumentSlot::Existing));
                next_arg = args.len();
            } else {
                arguments.push(ArgumentSlot::Existing(next_arg));
                next_arg += 1;
            }
        }
        changes.push(ArgumentChange {
            arguments,
            label: messages::add_arguments(missing.len(), &sig),
        });
    }

    if let Some((i, j)) = shape.swap(b, &arg_types) {
        let mut arguments: Vec<ArgumentSlot> =
            (0..args.len()).map(ArgumentSlot::Existing).collect();
        arguments.swap(i, j);
        changes.push(ArgumentChange {
            arguments,
            label: messages::swap_arguments(tree.source(args[i].node), tree.source(args[j].node)),
        });
    }
    changes
}

/// Declaration changes that make `method` accept `args`: add parameters for extra arguments,
/// remove unmatched parameters, swap two parameters or retype mismatched ones. A varargs
/// parameter stays last; changes that would not accept the call are dropped.
pub(crate) fn signature_changes(
    tree: &SyntaxTree,
    b: &BindingTable,
    method: MethodId,
    args: &[Argument],
) -> Vec<SignatureChange> {
    let binding = b.method(method);
    let shape = Shape::of(b, method);
    let arg_types = types(args);
    let old = signature(b, &binding.name, &shape);
    let reserved: Vec<String> = binding.param_names.iter().map(|n| n.to_string()).collect();
    let mut changes = Vec::new();

    let mut push = |params: Vec<ParameterSlot>| {
        let new_shape = Shape {
            params: params
                .iter()
                .map(|slot| match slot {
                    ParameterSlot::Existing(idx) => shape.params[*idx],
                    ParameterSlot::Retyped(_, ty) | ParameterSlot::New { ty, .. } => *ty,
                })
                .collect(),
            varargs: shape.varargs
                && matches!(
                    params.last(),
                    Some(ParameterSlot::Existing(idx)) if *idx + 1 == shape.params.len()
                ),
        };
        if !new_shape.accepts(b, &arg_types) {
            return;
        }
        let new = signature(b, &binding.name, &new_shape);
        changes.push(SignatureChange {
            params,
            label: messages::change_signature(binding.is_constructor, &old, &new),
        });
    };

    if let Some(extras) = shape.extra_arguments(b, &arg_types).filter(|e| !e.is_empty()) {
        let added: Vec<(NodeId, TypeId)> = extras
            .iter()
            .map(|idx| (args[*idx].node, args[*idx].stub_ty))
            .collect();
        let names = naming::parameter_names(tree, b, &added, &reserved);
        let mut params = Vec::new();
        let mut param = 0;
        for idx in 0..args.len() {
            if let Some(pos) = extras.iter().position(|e| *e == idx) {
                params.push(ParameterSlot::New {
                    ty: args[idx].stub_ty,
                    name: names[pos].clone(),
                });
            } else if param < shape.fixed() {
                params.push(ParameterSlot::Existing(param));
                param += 1;
            }
        }
        if shape.varargs {
            params.push(ParameterSlot::Existing(shape.params.len() - 1));
        }
        push(params);
    }

    if let Some(missing) = shape.missing_parameters(b, &arg_types).filter(|m| !m.is_empty()) {
        push(
            (0..shape.params.len())
                .filter(|idx| !missing.contains(idx))
                .map(ParameterSlot::Existing)
                .collect(),
        );
    }

    if args.len() == shape.params.len() && !shape.accepts(b, &arg_types) {
        if let Some((i, j)) = shape.swap(b, &arg_types) {
            let mut params: Vec<ParameterSlot> =
                (0..shape.params.len()).map(ParameterSlot::Existing).collect();
            params.swap(i, j);
            push(params);
        } else {
            let limit = shape.fixed();
            push(
                (0..shape.params.len())
                    .map(|idx| {
                        if idx < limit && !b.is_assignable(args[idx].ty, shape.params[idx]) {
                            ParameterSlot::Retyped(idx, args[idx].stub_ty)
                        } else {
                            ParameterSlot::Existing(idx)
                        }
                    })
                    .collect(),
            );
        }
    }
    changes
}
