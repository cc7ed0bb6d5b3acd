use proc_macro::TokenStream;

mod event;
mod listener;
mod subscribed;

/// 为事件类型实现 `::eventbus::Event`
///
/// 泛型参数自动追加 `Send + Sync + 'static` 约束。
#[proc_macro_derive(Event)]
pub fn derive_event(item: TokenStream) -> TokenStream {
    event::expand(item)
}

/// 监听器宏
/// - 作用于固有 impl 块，收集其中带 `#[subscribed]` 的方法并移除该标记
/// - 为目标类型生成 `::eventbus::Listener` 实现，按方法声明顺序登记处理器
/// - 处理方法签名须为 `fn name(&self, event: &E)`，返回 `()` 或 `Result<(), E>`
/// - 标记参数：`#[subscribed(priority = High, name = "audit")]`，均可省略
///
/// 未包含任何 `#[subscribed]` 方法的监听器在订阅时被拒绝（`InvalidListener`）。
#[proc_macro_attribute]
pub fn listener(attr: TokenStream, item: TokenStream) -> TokenStream {
    listener::expand(attr, item)
}

/// 订阅标记，仅在 `#[listener]` impl 块内有效
#[proc_macro_attribute]
pub fn subscribed(attr: TokenStream, item: TokenStream) -> TokenStream {
    let _ = attr;
    let item = proc_macro2::TokenStream::from(item);
    let err = syn::Error::new_spanned(
        &item,
        "#[subscribed] is only valid on methods inside a #[listener] impl block",
    )
    .to_compile_error();
    TokenStream::from(quote::quote! { #err #item })
}
