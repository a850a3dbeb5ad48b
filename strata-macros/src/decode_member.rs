use strata_core::{Tag, TypeDecoded, UnsupportedKind, decode_type};
use syn::{Field, Ident, LitStr, Visibility};

pub(crate) struct MemberMetadata {
    pub(crate) ident: Ident,
    pub(crate) name: String,
    pub(crate) tag: String,
    pub(crate) unsupported: Option<UnsupportedKind>,
}

/// Public members only, the tag is validated here so a malformed one fails the build.
pub(crate) fn decode_member(field: &Field) -> Option<MemberMetadata> {
    if !matches!(field.vis, Visibility::Public(..)) {
        return None;
    }
    let ident = field
        .ident
        .clone()
        .expect("Field is expected to have a name");
    let name = ident.to_string();
    let tag = field
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("strata"))
        .map(|attr| match attr.parse_args::<LitStr>() {
            Ok(v) => v.value(),
            Err(..) => panic!(
                "Error while parsing `strata` on `{name}`, use it like #[strata(\"col:{name};use_alias:false\")]"
            ),
        })
        .unwrap_or_default();
    if let Err(e) = Tag::parse(&tag) {
        panic!("Error while parsing the tag of `{name}`: {e:#}");
    }
    let unsupported = match decode_type(&field.ty) {
        TypeDecoded::Field => None,
        TypeDecoded::Unsupported(kind) => Some(kind),
    };
    Some(MemberMetadata {
        ident,
        name,
        tag,
        unsupported,
    })
}
