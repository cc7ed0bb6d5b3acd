use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, Ident, LitStr, Result, Token, parse::Parse, parse::ParseStream};

const PRIORITIES: [&str; 5] = ["Lowest", "Low", "Normal", "High", "Highest"];

/// `#[subscribed(...)]` 的参数
pub(crate) struct SubscribedAttr {
    pub priority: Option<Ident>,
    pub name: Option<LitStr>,
}

pub(crate) fn is_subscribed(attr: &Attribute) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|seg| seg.ident == "subscribed")
}

pub(crate) fn parse(attr: &Attribute) -> Result<SubscribedAttr> {
    match &attr.meta {
        syn::Meta::Path(_) => Ok(SubscribedAttr {
            priority: None,
            name: None,
        }),
        syn::Meta::List(_) => {
            let mut priority: Option<Ident> = None;
            let mut name: Option<LitStr> = None;
            let pairs = attr.parse_args_with(Punctuated::<Kv, Token![,]>::parse_terminated)?;

            for kv in pairs {
                let key = kv.key.to_string();
                match key.as_str() {
                    "priority" => {
                        if priority.is_some() {
                            return Err(syn::Error::new(
                                kv.key.span(),
                                "duplicate key 'priority' in attribute",
                            ));
                        }
                        priority = Some(parse_priority(kv.value)?);
                    }
                    "name" => {
                        if name.is_some() {
                            return Err(syn::Error::new(
                                kv.key.span(),
                                "duplicate key 'name' in attribute",
                            ));
                        }
                        let lit = match kv.value {
                            Expr::Lit(syn::ExprLit {
                                lit: syn::Lit::Str(lit),
                                ..
                            }) => lit,
                            other => {
                                return Err(syn::Error::new(
                                    other.span(),
                                    "expected string literal for 'name'",
                                ));
                            }
                        };
                        if lit.value().trim().is_empty() {
                            return Err(syn::Error::new_spanned(lit, "handler name must not be empty"));
                        }
                        name = Some(lit);
                    }
                    _ => {
                        return Err(syn::Error::new(
                            kv.key.span(),
                            "unknown key; expected 'priority' | 'name'",
                        ));
                    }
                }
            }

            Ok(SubscribedAttr { priority, name })
        }
        other => Err(syn::Error::new(
            other.span(),
            "expected #[subscribed] or #[subscribed(...)]",
        )),
    }
}

// 接受 `High` 或 `Priority::High`
fn parse_priority(value: Expr) -> Result<Ident> {
    let ident = match &value {
        Expr::Path(p) => p.path.segments.last().map(|s| s.ident.clone()),
        _ => None,
    };
    match ident {
        Some(ident) if PRIORITIES.iter().any(|p| ident == p) => Ok(ident),
        _ => Err(syn::Error::new_spanned(
            &value,
            "expected one of Lowest | Low | Normal | High | Highest for 'priority'",
        )),
    }
}

struct Kv {
    key: Ident,
    #[allow(dead_code)]
    eq: Token![=],
    value: Expr,
}

impl Parse for Kv {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Self {
            key: input.parse()?,
            eq: input.parse()?,
            value: input.parse()?,
        })
    }
}
