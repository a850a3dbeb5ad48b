use crate::{UnsupportedKind, matches_path};
use syn::{GenericArgument, PathArguments, Type, TypePath};

/// How a struct member type is stored, as seen from its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDecoded {
    /// The type implements `Field`: scalars, `Vec<u8>`, time, codecs, nested mapped structs.
    Field,
    Unsupported(UnsupportedKind),
}

fn first_generic(path: &syn::Path) -> Option<&Type> {
    let PathArguments::AngleBracketed(arguments) = &path.segments.last()?.arguments else {
        return None;
    };
    arguments.args.iter().find_map(|v| match v {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn is_byte(ty: &Type) -> bool {
    matches!(ty, Type::Path(TypePath { path, .. }) if path.is_ident("u8"))
}

pub fn decode_type(ty: &Type) -> TypeDecoded {
    match ty {
        Type::Path(TypePath { path, .. }) => {
            let is_list = matches_path(path, &["std", "vec", "Vec"])
                || matches_path(path, &["std", "collections", "VecDeque"])
                || matches_path(path, &["std", "collections", "LinkedList"]);
            if is_list {
                return match first_generic(path) {
                    Some(inner)
                        if is_byte(inner)
                            && path.segments.last().is_some_and(|v| v.ident == "Vec") =>
                    {
                        TypeDecoded::Field
                    }
                    _ => TypeDecoded::Unsupported(UnsupportedKind::Slice),
                };
            }
            if matches_path(path, &["std", "collections", "HashMap"])
                || matches_path(path, &["std", "collections", "BTreeMap"])
                || matches_path(path, &["indexmap", "IndexMap"])
            {
                return TypeDecoded::Unsupported(UnsupportedKind::Map);
            }
            if matches_path(path, &["std", "collections", "HashSet"])
                || matches_path(path, &["std", "collections", "BTreeSet"])
                || matches_path(path, &["indexmap", "IndexSet"])
            {
                return TypeDecoded::Unsupported(UnsupportedKind::Set);
            }
            if matches_path(path, &["mpsc", "Sender"])
                || matches_path(path, &["mpsc", "Receiver"])
                || matches_path(path, &["mpsc", "SyncSender"])
                || matches_path(path, &["mpsc", "UnboundedSender"])
                || matches_path(path, &["mpsc", "UnboundedReceiver"])
                || matches_path(path, &["oneshot", "Sender"])
                || matches_path(path, &["oneshot", "Receiver"])
            {
                return TypeDecoded::Unsupported(UnsupportedKind::Channel);
            }
            if matches_path(path, &["std", "option", "Option"]) {
                if let Some(inner) = first_generic(path) {
                    return decode_type(inner);
                }
            }
            TypeDecoded::Field
        }
        Type::Array(..) => TypeDecoded::Unsupported(UnsupportedKind::Array),
        Type::Slice(..) | Type::Reference(..) => TypeDecoded::Unsupported(UnsupportedKind::Slice),
        Type::Tuple(..) => TypeDecoded::Unsupported(UnsupportedKind::Tuple),
        Type::BareFn(..) | Type::ImplTrait(..) | Type::TraitObject(..) => {
            TypeDecoded::Unsupported(UnsupportedKind::Function)
        }
        Type::Paren(v) => decode_type(&v.elem),
        Type::Group(v) => decode_type(&v.elem),
        _ => panic!("Unknown type, it can't be mapped to a column"),
    }
}
