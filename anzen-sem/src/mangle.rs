//! Name mangling (§6): turns a fully-solved [`Type`] into a stable string a
//! backend can use as a linker symbol, independent of declaration order or
//! any particular `TypeId` numbering (which is only unique within one
//! compilation and never meant to escape it).
//!
//! Grammar (a struct/union/interface's own name is always ASCII and never
//! contains an underscore in source, so `_` is a safe separator):
//!
//! ```text
//! mangled    := builtin | nominal | function
//! builtin    := 'a' | 'n' | 'i' | 'd' | 'b' | 's'   -- Anything/Nothing/Int/Float/Bool/String
//! nominal    := len ':' name ('_' mangled)*          -- name, then each type argument
//! function   := 'F' params '_' mangled               -- params, then codomain
//! params     := len ':' (mangled)*
//! ```

use std::fmt::Write as _;

use anzen_ast::TypeId;

use crate::builtin_contract::BuiltinIds;
use crate::types::{NominalType, Type, TypeContext};

pub fn mangle(ctx: &TypeContext, builtins: &BuiltinIds, ty: &Type) -> String {
    let mut out = String::new();
    write_mangled(ctx, builtins, ty, &mut out);
    out
}

fn builtin_letter(builtins: &BuiltinIds, id: TypeId) -> Option<char> {
    if id == builtins.anything {
        Some('a')
    } else if id == builtins.nothing {
        Some('n')
    } else if id == builtins.int {
        Some('i')
    } else if id == builtins.float {
        Some('d')
    } else if id == builtins.bool_ {
        Some('b')
    } else if id == builtins.string {
        Some('s')
    } else {
        None
    }
}

fn write_mangled(ctx: &TypeContext, builtins: &BuiltinIds, ty: &Type, out: &mut String) {
    let ty = crate::types::deref(ctx, ty);
    match ty {
        Type::Error => out.push('?'),
        Type::Var(_) => out.push('?'),
        Type::Placeholder { name, .. } => {
            let _ = write!(out, "P{}:{}", name.as_str().len(), name.as_str());
        }
        Type::SelfType(_) => out.push_str("Self"),
        Type::Metatype(inner) => {
            out.push('M');
            write_mangled(ctx, builtins, inner, out);
        }
        Type::Function(f) => {
            out.push('F');
            let mut params = String::new();
            for (_, qty) in &f.params {
                write_mangled(ctx, builtins, &qty.ty, &mut params);
            }
            let _ = write!(out, "{}:{}", params.len(), params);
            out.push('_');
            write_mangled(ctx, builtins, &f.codomain.ty, out);
        }
        Type::Alias { id, .. } => {
            if let Some(letter) = builtin_letter(builtins, *id) {
                out.push(letter);
                return;
            }
            match ctx.nominal(*id) {
                Some(NominalType::Struct(s)) => write_nominal_name(s.name.as_str(), out),
                Some(NominalType::Union(u)) => write_nominal_name(u.name.as_str(), out),
                Some(NominalType::Interface(i)) => write_nominal_name(i.name.as_str(), out),
                None => out.push('?'),
            }
        }
    }
}

fn write_nominal_name(name: &str, out: &mut String) {
    let _ = write!(out, "{}:{}", name.len(), name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin_contract::register_minimal;
    use crate::scope::{ScopeTree, SymbolTable};

    #[test]
    fn int_mangles_to_a_single_letter() {
        let mut types = TypeContext::new();
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (_scope, builtins) = register_minimal(&mut types, &mut scopes, &mut symbols);
        let int_ty = Type::Alias { name: anzen_util::Symbol::intern("Int"), id: builtins.int };
        assert_eq!(mangle(&types, &builtins, &int_ty), "i");
    }

    #[test]
    fn a_struct_mangles_to_its_length_prefixed_name() {
        let mut types = TypeContext::new();
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (_scope, builtins) = register_minimal(&mut types, &mut scopes, &mut symbols);
        let id = types.fresh_id();
        types.define_nominal(NominalType::Struct(crate::types::StructType {
            name: anzen_util::Symbol::intern("Pair"),
            id,
            placeholders: vec![],
            properties: indexmap::IndexMap::new(),
            methods: indexmap::IndexMap::new(),
        }));
        let ty = Type::Alias { name: anzen_util::Symbol::intern("Pair"), id };
        assert_eq!(mangle(&types, &builtins, &ty), "4:Pair");
    }

    #[test]
    fn a_function_mangles_params_then_codomain() {
        let mut types = TypeContext::new();
        let mut scopes = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (_scope, builtins) = register_minimal(&mut types, &mut scopes, &mut symbols);
        let int_ty = Type::Alias { name: anzen_util::Symbol::intern("Int"), id: builtins.int };
        let bool_ty = Type::Alias { name: anzen_util::Symbol::intern("Bool"), id: builtins.bool_ };
        let f = Type::Function(crate::types::FunctionType {
            placeholders: vec![],
            params: vec![(None, crate::qualifier_ty::QualifiedType::unqualified(int_ty))],
            codomain: Box::new(crate::qualifier_ty::QualifiedType::unqualified(bool_ty)),
        });
        assert_eq!(mangle(&types, &builtins, &f), "F1:i_b");
    }
}
