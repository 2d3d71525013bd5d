use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, ItemFn, Pat, Type, parse_macro_input};

// #[function]
// Registers a plain `fn(f64, ..) -> f64` (one to three parameters) so that
// `FunctionTable::with_registered()` can pick it up. The original function is
// left untouched; an `extern "C"` shim is generated for the JIT to call.
#[proc_macro_attribute]
pub fn function(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);
    let sig = &func.sig;
    let ident = &sig.ident;

    let ret_ok = match &sig.output {
        syn::ReturnType::Type(_, ty) => matches!(**ty, Type::Path(ref tp) if tp.path.is_ident("f64")),
        syn::ReturnType::Default => false,
    };
    if !ret_ok {
        return syn::Error::new_spanned(&sig.output, "#[function] requires return type f64")
            .to_compile_error()
            .into();
    }

    let mut param_idents: Vec<syn::Ident> = Vec::new();
    for input in &sig.inputs {
        match input {
            FnArg::Typed(pt) => {
                let pat_ident = match &*pt.pat {
                    Pat::Ident(pi) => pi.ident.clone(),
                    other => {
                        return syn::Error::new_spanned(
                            other,
                            "#[function] requires simple identifier parameters",
                        )
                        .to_compile_error()
                        .into();
                    }
                };
                if !matches!(*pt.ty, Type::Path(ref tp) if tp.path.is_ident("f64")) {
                    return syn::Error::new_spanned(&pt.ty, "#[function] only supports f64 parameters")
                        .to_compile_error()
                        .into();
                }
                param_idents.push(pat_ident);
            }
            _ => {
                return syn::Error::new_spanned(
                    input,
                    "#[function] does not support receiver parameters",
                )
                .to_compile_error()
                .into();
            }
        }
    }

    let variant = match param_idents.len() {
        1 => format_ident!("Unary"),
        2 => format_ident!("Binary"),
        3 => format_ident!("Ternary"),
        _ => {
            return syn::Error::new_spanned(
                &sig.inputs,
                "#[function] supports one to three f64 parameters",
            )
            .to_compile_error()
            .into();
        }
    };

    let name_str = ident.to_string();
    let shim_ident = format_ident!("__levelcurve_shim_{}", ident);
    let params = param_idents.iter();
    let call_args = param_idents.iter();

    let output = quote! {
        #func

        #[allow(non_snake_case)]
        extern "C" fn #shim_ident( #( #params: f64 ),* ) -> f64 {
            #ident( #( #call_args ),* )
        }

        ::levelcurve::inventory::submit! {
            ::levelcurve::FnMeta {
                name: #name_str,
                func: ::levelcurve::NativeFn::#variant(#shim_ident),
                mod_path: module_path!(),
            }
        }
    };

    output.into()
}
