use crate::subscribed::{self, SubscribedAttr};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, LitStr, Receiver, Result, Type, parse_macro_input};

/// #[listener] 宏实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::TokenStream::from(attr).span(),
            "#[listener] takes no arguments",
        )
        .to_compile_error()
        .into();
    }

    let mut imp = parse_macro_input!(item as ItemImpl);
    match build(&mut imp) {
        Ok(out) => out.into(),
        Err(err) => {
            let err = err.to_compile_error();
            quote! { #err #imp }.into()
        }
    }
}

struct Handler {
    method: syn::Ident,
    event: Type,
    name: LitStr,
    priority: syn::Ident,
}

fn build(imp: &mut ItemImpl) -> Result<proc_macro2::TokenStream> {
    if let Some((_, path, _)) = &imp.trait_ {
        return Err(syn::Error::new(
            path.span(),
            "#[listener] must be placed on an inherent impl block",
        ));
    }

    let mut handlers = Vec::new();
    for item in imp.items.iter_mut() {
        let ImplItem::Fn(func) = item else {
            continue;
        };
        let Some(attr) = take_subscribed(func)? else {
            continue;
        };
        handlers.push(handler(func, attr)?);
    }

    let self_ty = &imp.self_ty;
    let (impl_generics, _, where_clause) = imp.generics.split_for_impl();
    let calls = handlers.iter().map(|h| {
        let Handler {
            method,
            event,
            name,
            priority,
        } = h;
        quote! {
            handlers.handle::<#event, _, _>(#name, ::eventbus::Priority::#priority, Self::#method);
        }
    });

    Ok(quote! {
        #imp

        impl #impl_generics ::eventbus::Listener for #self_ty #where_clause {
            #[allow(unused_variables)]
            fn register(handlers: &mut ::eventbus::Handlers<Self>) {
                #(#calls)*
            }
        }
    })
}

// 移除方法上的 #[subscribed]，返回解析后的参数
fn take_subscribed(func: &mut ImplItemFn) -> Result<Option<SubscribedAttr>> {
    let mut found = None;
    let mut kept = Vec::with_capacity(func.attrs.len());
    for attr in func.attrs.drain(..) {
        if !subscribed::is_subscribed(&attr) {
            kept.push(attr);
            continue;
        }
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[subscribed] attribute"));
        }
        found = Some(subscribed::parse(&attr)?);
    }
    func.attrs = kept;
    Ok(found)
}

fn handler(func: &ImplItemFn, attr: SubscribedAttr) -> Result<Handler> {
    let sig = &func.sig;
    if sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            sig.asyncness,
            "#[subscribed] methods must be synchronous",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "#[subscribed] methods cannot be generic",
        ));
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(recv)) if is_shared_self(recv) => {}
        Some(FnArg::Receiver(recv)) => {
            return Err(syn::Error::new_spanned(
                recv,
                "#[subscribed] methods must take `&self`",
            ));
        }
        _ => {
            return Err(syn::Error::new(
                sig.ident.span(),
                "#[subscribed] methods must take `&self` and exactly one event parameter",
            ));
        }
    }

    let params: Vec<_> = inputs.collect();
    let [FnArg::Typed(param)] = params.as_slice() else {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            format!(
                "#[subscribed] methods must take exactly one event parameter, found {}",
                params.len()
            ),
        ));
    };

    let event = match param.ty.as_ref() {
        Type::Reference(r) if r.mutability.is_none() => (*r.elem).clone(),
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "the event parameter must be a shared reference, e.g. `event: &MyEvent`",
            ));
        }
    };

    let method = sig.ident.clone();
    let name = attr
        .name
        .unwrap_or_else(|| LitStr::new(&method.to_string(), method.span()));
    let priority = attr
        .priority
        .unwrap_or_else(|| format_ident!("Normal"));

    Ok(Handler {
        method,
        event,
        name,
        priority,
    })
}

// `&self` 与 `self: &Self` 两种写法
fn is_shared_self(recv: &Receiver) -> bool {
    match recv.ty.as_ref() {
        Type::Reference(r) if r.mutability.is_none() => {
            matches!(r.elem.as_ref(), Type::Path(p) if p.qself.is_none() && p.path.is_ident("Self"))
        }
        _ => false,
    }
}
