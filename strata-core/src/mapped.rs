use crate::{Field, StrataError};
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use std::fmt::{self, Display};

/// Member shapes that can't be stored in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedKind {
    /// Sequence of anything but bytes.
    Slice,
    Map,
    Set,
    Array,
    Tuple,
    Function,
    Channel,
}

impl UnsupportedKind {
    pub fn into_error(self, field: &str) -> StrataError {
        match self {
            UnsupportedKind::Slice => StrataError::FieldSliceType {
                field: field.into(),
            },
            kind => StrataError::UnsupportedFieldType {
                field: field.into(),
                kind: kind.name(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnsupportedKind::Slice => "slice",
            UnsupportedKind::Map => "map",
            UnsupportedKind::Set => "set",
            UnsupportedKind::Array => "array",
            UnsupportedKind::Tuple => "tuple",
            UnsupportedKind::Function => "function",
            UnsupportedKind::Channel => "channel",
        }
    }
}

impl Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ToTokens for UnsupportedKind {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            UnsupportedKind::Slice => quote!(::strata::UnsupportedKind::Slice),
            UnsupportedKind::Map => quote!(::strata::UnsupportedKind::Map),
            UnsupportedKind::Set => quote!(::strata::UnsupportedKind::Set),
            UnsupportedKind::Array => quote!(::strata::UnsupportedKind::Array),
            UnsupportedKind::Tuple => quote!(::strata::UnsupportedKind::Tuple),
            UnsupportedKind::Function => quote!(::strata::UnsupportedKind::Function),
            UnsupportedKind::Channel => quote!(::strata::UnsupportedKind::Channel),
        });
    }
}

pub enum Access<'a> {
    Field(&'a dyn Field),
    Unsupported(UnsupportedKind),
}

pub enum AccessMut<'a> {
    Field(&'a mut dyn Field),
    Unsupported(UnsupportedKind),
}

/// One public member of a mapped struct, in declaration order.
pub struct Member<'a> {
    pub name: &'static str,
    /// Raw tag text, parsed with [`crate::Tag::parse`].
    pub tag: &'static str,
    pub access: Access<'a>,
}

pub struct MemberMut<'a> {
    pub name: &'static str,
    pub tag: &'static str,
    pub access: AccessMut<'a>,
}

/// A struct whose members map to table columns.
///
/// Usually implemented with `#[derive(Mapped)]`.
pub trait Mapped: Send + Sync {
    /// Name of the type, empty for anonymous projections.
    fn type_name(&self) -> &'static str;

    /// Table declared by the type, optionally in the form `"name as alias"`, empty when none.
    fn table(&self) -> &str {
        ""
    }

    fn primary_key(&self) -> &str {
        "id"
    }

    fn members(&self) -> Vec<Member<'_>>;

    fn members_mut(&mut self) -> Vec<MemberMut<'_>>;
}
