use syn::{ItemStruct, LitStr};

#[derive(Default)]
pub(crate) struct StructAttributes {
    pub(crate) table: Option<String>,
    pub(crate) primary_key: Option<String>,
    pub(crate) anonymous: bool,
}

pub(crate) fn struct_attributes(item: &ItemStruct) -> StructAttributes {
    let mut result = StructAttributes::default();
    for attr in item.attrs.iter().filter(|v| v.path().is_ident("strata")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                result.table = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("primary_key") {
                result.primary_key = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("anonymous") {
                result.anonymous = true;
            } else {
                return Err(meta.error("unknown attribute"));
            }
            Ok(())
        });
        if let Err(e) = parsed {
            panic!(
                "Error while parsing `strata` on `{}` ({e}), use it like #[strata(table = \"users as u\", primary_key = \"id\", anonymous)]",
                item.ident
            );
        }
    }
    result
}
