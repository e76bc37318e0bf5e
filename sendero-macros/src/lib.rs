//! Route attribute macros for Sendero.
//!
//! `#[get("/items/{item_id}")]` on an `async fn` replaces the function with
//! a unit struct of the same name implementing `sendero::handler::Handler`.
//! Each argument is built through `FromRequestParts` before the body runs;
//! the first failing extractor's error becomes the response.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Attribute, FnArg, ItemFn, LitStr, Visibility, parse_macro_input};

#[proc_macro_attribute]
pub fn get(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_macro("GET", attr, item)
}

#[proc_macro_attribute]
pub fn post(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_macro("POST", attr, item)
}

#[proc_macro_attribute]
pub fn put(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_macro("PUT", attr, item)
}

#[proc_macro_attribute]
pub fn delete(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_macro("DELETE", attr, item)
}

fn route_macro(method: &str, attr: TokenStream, item: TokenStream) -> TokenStream {
    let path = parse_macro_input!(attr as LitStr);
    let func = parse_macro_input!(item as ItemFn);

    match expand(method, &path, func) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(method: &str, path: &LitStr, func: ItemFn) -> syn::Result<TokenStream2> {
    if !path.value().starts_with('/') {
        return Err(syn::Error::new_spanned(path, "route path must start with `/`"));
    }
    if func.sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            func.sig.fn_token,
            "route handlers must be `async fn`",
        ));
    }
    if !func.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &func.sig.generics,
            "route handlers cannot be generic",
        ));
    }

    let name = func.sig.ident.clone();
    let name_str = name.to_string();
    let vis = func.vis.clone();
    let method_ident = format_ident!("{}", method);

    let mut args = Vec::new();
    let mut extractions = Vec::new();
    for (index, input) in func.sig.inputs.iter().enumerate() {
        let FnArg::Typed(pat_type) = input else {
            return Err(syn::Error::new_spanned(
                input,
                "route handlers cannot take `self`",
            ));
        };
        let ty = &pat_type.ty;
        let arg = format_ident!("__arg{}", index);
        extractions.push(quote! {
            let #arg = match <#ty as ::sendero::extract::FromRequestParts>::from_request_parts(
                &__parts, &__params, &__state,
            )
            .await
            {
                ::core::result::Result::Ok(value) => value,
                ::core::result::Result::Err(err) => {
                    return ::sendero::response::IntoResponse::into_response(err);
                }
            };
        });
        args.push(arg);
    }

    let (docs, other_attrs): (Vec<Attribute>, Vec<Attribute>) = func
        .attrs
        .iter()
        .cloned()
        .partition(|attr| attr.path().is_ident("doc"));

    let mut inner = func;
    inner.attrs = other_attrs;
    inner.vis = Visibility::Inherited;
    inner.sig.ident = format_ident!("__{}_body", name);
    let inner_ident = inner.sig.ident.clone();

    Ok(quote! {
        #(#docs)*
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy)]
        #vis struct #name;

        impl ::sendero::handler::Handler for #name {
            const NAME: &'static str = #name_str;
            const METHOD: ::sendero::http::Method = ::sendero::http::Method::#method_ident;
            const PATH: &'static str = #path;

            fn call(
                &self,
                __req: ::sendero::http::Request<::sendero::hyper::body::Incoming>,
                __params: ::sendero::extract::PathParams,
                __state: ::std::sync::Arc<::sendero::state::AppState>,
            ) -> ::sendero::handler::BoxFuture {
                #inner

                ::std::boxed::Box::pin(async move {
                    let (__parts, _) = __req.into_parts();
                    #(#extractions)*
                    let output = #inner_ident(#(#args),*).await;
                    ::sendero::response::IntoResponse::into_response(output)
                })
            }
        }
    })
}
