use crate::functions::NativeFn;

/// Metadata emitted by `#[function]` for each annotated function.
pub struct FnMeta {
    pub name: &'static str,
    pub func: NativeFn,
    pub mod_path: &'static str,
}

inventory::collect!(FnMeta);

pub(crate) fn registered() -> impl Iterator<Item = &'static FnMeta> {
    inventory::iter::<FnMeta>.into_iter()
}
