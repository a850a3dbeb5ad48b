use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, ItemStruct, spanned::Spanned};

/// Picks `Default::default()` when the struct implements it, `None` otherwise.
pub(crate) fn new_empty_factory(item: &ItemStruct) -> (Ident, TokenStream) {
    let trait_name = Ident::new(&format!("{}NewEmptyTrait", item.ident), item.span());
    let factory_name = Ident::new(&format!("{}NewEmptyFactory", item.ident), item.span());
    (
        factory_name.clone(),
        quote! {
            trait #trait_name<T> {
                fn new_empty() -> Option<T>;
            }
            struct #factory_name<T>(::std::marker::PhantomData<T>);
            impl<T: Default> #factory_name<T> {
                // Called when T has Default Trait
                fn new_empty() -> Option<T> {
                    Some(T::default())
                }
            }
            impl<T> #trait_name<T> for #factory_name<T> {
                // Called when T doesn't have default trait
                fn new_empty() -> Option<T> {
                    None
                }
            }
        },
    )
}
