use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    FnArg, GenericArgument, Ident, ItemFn, LitStr, Pat, PathArguments, Result as SynResult, ReturnType,
    Token, Type,
};

/// One `key = "value"` option of `#[handler(...)]`.
struct HandlerOption {
    key: Ident,
    value: LitStr,
}

impl Parse for HandlerOption {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let value: LitStr = input.parse()?;
        Ok(HandlerOption { key, value })
    }
}

#[derive(Default)]
struct HandlerArgs {
    name: Option<LitStr>,
    returns: Option<LitStr>,
}

impl Parse for HandlerArgs {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut args = HandlerArgs::default();
        let options = Punctuated::<HandlerOption, Token![,]>::parse_terminated(input)?;
        for opt in options {
            match opt.key.to_string().as_str() {
                "name" => args.name = Some(opt.value),
                "returns" => args.returns = Some(opt.value),
                other => {
                    return Err(syn::Error::new(
                        opt.key.span(),
                        format!("unexpected option {other}, expected `name` or `returns`"),
                    ))
                }
            }
        }
        Ok(args)
    }
}

/// Last path segment and its generic type arguments.
fn last_segment(ty: &Type) -> Option<(String, Vec<&Type>)> {
    let Type::Path(p) = ty else {
        return None;
    };
    let seg = p.path.segments.last()?;
    let generics = match &seg.arguments {
        PathArguments::AngleBracketed(a) => a
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(t) => Some(t),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Some((seg.ident.to_string(), generics))
}

/// `TypeRef` expression for a Rust type.
fn type_ref(ty: &Type) -> TokenStream2 {
    let tr = quote! { ::routebridge::types::TypeRef };
    if let Type::Reference(r) = ty {
        return type_ref(&r.elem);
    }
    let Some((ident, generics)) = last_segment(ty) else {
        return quote! { #tr::any() };
    };
    match (ident.as_str(), generics.as_slice()) {
        ("String" | "str", _) => quote! { #tr::string() },
        (
            "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize",
            _,
        ) => quote! { #tr::integer() },
        ("f32" | "f64", _) => quote! { #tr::float() },
        ("bool", _) => quote! { #tr::boolean() },
        ("Value" | "JsonValue", _) => quote! { #tr::any() },
        ("HostResponse", _) => quote! { #tr::Response },
        ("Arc", [inner]) if last_segment(inner).is_some_and(|(i, _)| i == "HostResponse") => {
            quote! { #tr::Response }
        }
        ("Option", [inner]) => {
            let inner = type_ref(inner);
            quote! { #tr::optional(#inner) }
        }
        ("Vec", [inner]) => {
            let inner = type_ref(inner);
            quote! { #tr::list(#inner) }
        }
        ("HashSet" | "BTreeSet", [inner]) => {
            let inner = type_ref(inner);
            quote! { #tr::set(#inner) }
        }
        ("HashMap" | "BTreeMap", [_, value]) => {
            let value = type_ref(value);
            quote! { #tr::map(#value) }
        }
        (other, _) => quote! { #tr::named(#other) },
    }
}

/// `T` of a syntactic `Result<T, E>`
fn result_ok_type(ty: &Type) -> Option<&Type> {
    match last_segment(ty)? {
        (ident, generics) if ident == "Result" && !generics.is_empty() => Some(generics[0]),
        _ => None,
    }
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(t) if t.elems.is_empty())
}

/// Take `#[declared("Name")]` off a parameter, returning the name.
fn take_declared(attrs: &mut Vec<syn::Attribute>) -> SynResult<Option<LitStr>> {
    let mut declared = None;
    let mut kept = Vec::with_capacity(attrs.len());
    for attr in attrs.drain(..) {
        if attr.path().is_ident("declared") {
            declared = Some(attr.parse_args::<LitStr>()?);
        } else {
            kept.push(attr);
        }
    }
    *attrs = kept;
    Ok(declared)
}

/// Doc comment lines joined into one description
fn doc_string(attrs: &[syn::Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| match &a.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect();
    let joined = lines.join(" ").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

/// Declare a route handler.
///
/// Emits a companion `<fn>_def() -> routebridge::signature::FunctionDef`
/// describing the function's parameters and return type, with a callable that
/// extracts each keyword argument through `FromValue` and converts the result
/// through `IntoValue`.
///
/// Options: `name = "..."` overrides the registered function name,
/// `returns = "Name"` declares the return type as a forward reference.
/// `#[declared("Name")]` on a parameter does the same for that parameter.
#[proc_macro_attribute]
pub fn handler(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as HandlerArgs);
    let mut input = parse_macro_input!(item as ItemFn);
    match expand(args, &mut input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(args: HandlerArgs, input: &mut ItemFn) -> SynResult<TokenStream2> {
    let fn_ident = input.sig.ident.clone();
    let def_ident = format_ident!("{}_def", fn_ident);
    let vis = input.vis.clone();
    let registered = args
        .name
        .map_or_else(|| fn_ident.to_string(), |n| n.value());

    let mut extracts = Vec::new();
    let mut call_args = Vec::new();
    let mut params = Vec::new();
    for (i, arg) in input.sig.inputs.iter_mut().enumerate() {
        let pt = match arg {
            FnArg::Typed(pt) => pt,
            FnArg::Receiver(r) => return Err(syn::Error::new_spanned(r, "#[handler] needs a free function")),
        };
        let declared = take_declared(&mut pt.attrs)?;
        let name = match pt.pat.as_ref() {
            Pat::Ident(p) => p.ident.to_string().trim_start_matches("r#").to_string(),
            other => return Err(syn::Error::new_spanned(other, "parameters must be plain identifiers")),
        };
        let ty = &pt.ty;
        let local = format_ident!("__arg{}", i);
        extracts.push(quote! {
            let #local = <#ty as ::routebridge::value::FromValue>::from_value(__args.take(#name))?;
        });
        call_args.push(local);
        let ty_ref = match declared {
            Some(lit) => quote! { ::routebridge::types::TypeRef::named(#lit) },
            None => type_ref(ty),
        };
        params.push(quote! { .param(#name, #ty_ref) });
    }

    let call = quote! { #fn_ident(#(#call_args),*) };
    let (returns, finish) = match &input.sig.output {
        ReturnType::Default => (
            None,
            quote! {
                #call;
                Ok(::routebridge::value::Value::Null)
            },
        ),
        ReturnType::Type(_, ty) => {
            let ok_ty = result_ok_type(ty);
            let finish = if ok_ty.is_some() {
                quote! {
                    let __out = #call.map_err(|e| -> ::routebridge::error::HandlerError { e.into() })?;
                    Ok(::routebridge::value::IntoValue::into_value(__out))
                }
            } else {
                quote! { Ok(::routebridge::value::IntoValue::into_value(#call)) }
            };
            let shown = ok_ty.unwrap_or(ty);
            let returns = (!is_unit(shown)).then(|| type_ref(shown));
            (returns, finish)
        }
    };
    let returns = match (args.returns, returns) {
        (Some(lit), _) => Some(quote! { ::routebridge::types::TypeRef::named(#lit) }),
        (None, r) => r,
    };
    let returns = returns.map(|r| quote! { .returns(#r) });
    let description = doc_string(&input.attrs).map(|d| quote! { .description(#d) });
    let args_binding = if call_args.is_empty() {
        quote! { _ }
    } else {
        quote! { mut __args }
    };

    Ok(quote! {
        #input

        #[doc = concat!("Handler declaration for [`", stringify!(#fn_ident), "`].")]
        #vis fn #def_ident() -> ::routebridge::signature::FunctionDef {
            ::routebridge::signature::FunctionDef::new(
                #registered,
                |#args_binding: ::routebridge::value::CallArgs| -> ::std::result::Result<
                    ::routebridge::value::Value,
                    ::routebridge::error::HandlerError,
                > {
                    #(#extracts)*
                    #finish
                },
            )
            #(#params)*
            #returns
            #description
        }
    })
}
