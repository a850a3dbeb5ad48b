mod decode_member;
mod new_empty_factory;
mod struct_attributes;

use decode_member::decode_member;
use new_empty_factory::new_empty_factory;
use proc_macro::TokenStream;
use quote::quote;
use struct_attributes::struct_attributes;
use syn::{ItemStruct, parse_macro_input};

#[proc_macro_derive(Mapped, attributes(strata))]
pub fn derive_mapped(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let attributes = struct_attributes(&item);
    let type_name = if attributes.anonymous {
        String::new()
    } else {
        name.to_string()
    };
    let table = attributes.table.map(|table| {
        quote! {
            fn table(&self) -> &str {
                #table
            }
        }
    });
    let primary_key = attributes.primary_key.map(|primary_key| {
        quote! {
            fn primary_key(&self) -> &str {
                #primary_key
            }
        }
    });
    let members = item.fields.iter().filter_map(decode_member).collect::<Vec<_>>();
    let member = |mutable: bool| {
        members.iter().map(move |m| {
            let (ident, name, tag) = (&m.ident, &m.name, &m.tag);
            let access = match (&m.unsupported, mutable) {
                (Some(kind), false) => quote!(::strata::Access::Unsupported(#kind)),
                (Some(kind), true) => quote!(::strata::AccessMut::Unsupported(#kind)),
                (None, false) => quote!(::strata::Access::Field(&self.#ident)),
                (None, true) => quote!(::strata::AccessMut::Field(&mut self.#ident)),
            };
            let member = if mutable {
                quote!(::strata::MemberMut)
            } else {
                quote!(::strata::Member)
            };
            quote! {
                #member {
                    name: #name,
                    tag: #tag,
                    access: #access,
                }
            }
        })
    };
    let members_ref = member(false);
    let members_mut = member(true);
    let (factory, factory_definition) = new_empty_factory(&item);
    quote! {
        #factory_definition

        impl #impl_generics ::strata::Mapped for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            #table

            #primary_key

            fn members(&self) -> Vec<::strata::Member<'_>> {
                vec![#(#members_ref),*]
            }

            fn members_mut(&mut self) -> Vec<::strata::MemberMut<'_>> {
                vec![#(#members_mut),*]
            }
        }

        impl #impl_generics ::strata::Field for #name #ty_generics #where_clause {
            fn type_kind() -> ::strata::FieldKind {
                ::strata::FieldKind::Nested
            }

            fn kind(&self) -> ::strata::FieldKind {
                ::strata::FieldKind::Nested
            }

            fn to_value(&self) -> ::strata::Value {
                ::strata::Value::Null
            }

            fn is_zero(&self) -> bool {
                false
            }

            fn scan_buffer(&self) -> ::strata::Value {
                ::strata::Value::Null
            }

            fn assign(&mut self, _value: ::strata::Value) -> ::strata::Result<()> {
                Err(::strata::Error::msg(format!(
                    "Cannot assign a column value to the nested struct `{}`",
                    stringify!(#name)
                )))
            }

            fn as_mapped(&self) -> Option<&dyn ::strata::Mapped> {
                Some(self)
            }

            fn as_mapped_mut(&mut self) -> Option<&mut dyn ::strata::Mapped> {
                Some(self)
            }

            fn new_empty() -> Option<Self> {
                #factory::<Self>::new_empty()
            }
        }
    }
    .into()
}
