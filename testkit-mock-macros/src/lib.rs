//! Procedural macros for testkit-mock
//!
//! This crate provides the `#[testkit_mock::test]` attribute macro, which runs
//! a test with a fresh `MockRegistry` and applies the configured lifecycle
//! operation to every double in it when the test ends.
//!
//! # Example
//!
//! ```rust,ignore
//! use testkit_mock::prelude::*;
//!
//! #[testkit_mock::test(restore_mocks = true)]
//! fn my_test(registry: MockRegistry) {
//!     let spy = registry.spy_on(&SERVICE.send);
//!     // ...
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, FnArg, Ident, ItemFn, Lit, Pat, Token, Type,
};

/// Configuration options for the test macro.
#[derive(Default)]
struct TestConfig {
    /// Clear recorded history when the test ends
    clear_mocks: Option<bool>,
    /// Reset doubles when the test ends
    reset_mocks: Option<bool>,
    /// Restore doubles when the test ends
    restore_mocks: Option<bool>,
    /// Flavor for tokio runtime ("current_thread" or "multi_thread")
    flavor: Option<String>,
}

impl Parse for TestConfig {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut config = TestConfig::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let lit: Lit = input.parse()?;

            match ident.to_string().as_str() {
                "clear_mocks" => config.clear_mocks = Some(expect_bool(&ident, &lit)?),
                "reset_mocks" => config.reset_mocks = Some(expect_bool(&ident, &lit)?),
                "restore_mocks" => config.restore_mocks = Some(expect_bool(&ident, &lit)?),
                "flavor" => match lit {
                    Lit::Str(s) => match s.value().as_str() {
                        "current_thread" | "multi_thread" => config.flavor = Some(s.value()),
                        other => {
                            return Err(syn::Error::new(
                                s.span(),
                                format!(
                                    "unsupported flavor: {other}. Use \"current_thread\" or \"multi_thread\""
                                ),
                            ));
                        }
                    },
                    other => {
                        return Err(syn::Error::new_spanned(other, "flavor must be a string"));
                    }
                },
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {ident}"),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(config)
    }
}

fn expect_bool(ident: &Ident, lit: &Lit) -> syn::Result<bool> {
    if let Lit::Bool(b) = lit {
        Ok(b.value())
    } else {
        Err(syn::Error::new_spanned(
            lit,
            format!("{ident} must be `true` or `false`"),
        ))
    }
}

/// Determines if a function parameter is requesting a MockRegistry.
fn is_registry_param(arg: &FnArg) -> bool {
    if let FnArg::Typed(pat_type) = arg {
        if let Type::Path(type_path) = &*pat_type.ty {
            if let Some(segment) = type_path.path.segments.last() {
                return segment.ident == "MockRegistry";
            }
        }
    }
    false
}

/// Extracts the parameter pattern from a function argument.
fn get_param_pat(arg: &FnArg) -> Option<&Pat> {
    if let FnArg::Typed(pat_type) = arg {
        Some(&pat_type.pat)
    } else {
        None
    }
}

/// Test attribute macro that manages mock lifecycles.
///
/// Works on both sync and async test functions. Async tests run on tokio.
///
/// # With MockRegistry Injection
///
/// Add a `registry: MockRegistry` parameter to receive a fresh registry.
/// Doubles created through it are cleared, reset or restored when the test
/// ends, including when it panics.
///
/// ```rust,ignore
/// use testkit_mock::prelude::*;
///
/// #[testkit_mock::test(restore_mocks = true)]
/// fn test_with_registry(registry: MockRegistry) {
///     let send = registry.spy_on(&client.send);
///     client.send.call(("ping".into(),)).unwrap();
///     assert_eq!(send.call_count(), 1);
/// }
/// ```
///
/// # Configuration Options
///
/// - `clear_mocks = true` - Clear recorded history afterwards
/// - `reset_mocks = true` - Also drop configured implementations
/// - `restore_mocks = true` - Also reinstate originals and put spied methods back
/// - `flavor = "multi_thread"` - Tokio runtime flavor (async tests only)
///
/// Flags that are not given fall back to the `TESTKIT_MOCK_CLEAR_MOCKS`,
/// `TESTKIT_MOCK_RESET_MOCKS` and `TESTKIT_MOCK_RESTORE_MOCKS` environment
/// variables read when the test starts.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let config = parse_macro_input!(attr as TestConfig);
    let input = parse_macro_input!(item as ItemFn);

    expand_test(config, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_test(config: TestConfig, input: ItemFn) -> syn::Result<TokenStream2> {
    let name = &input.sig.ident;
    let body = &input.block;
    let attrs = &input.attrs;
    let vis = &input.vis;
    let output = &input.sig.output;
    let is_async = input.sig.asyncness.is_some();

    if !input.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.sig.generics,
            "test function must not be generic",
        ));
    }

    let mut registry_pat = None;
    for arg in &input.sig.inputs {
        if !is_registry_param(arg) {
            return Err(syn::Error::new_spanned(
                arg,
                "only a `MockRegistry` parameter can be injected",
            ));
        }
        if registry_pat.is_some() {
            return Err(syn::Error::new_spanned(
                arg,
                "at most one `MockRegistry` parameter is supported",
            ));
        }
        registry_pat = get_param_pat(arg);
    }

    if config.flavor.is_some() && !is_async {
        return Err(syn::Error::new_spanned(
            &input.sig,
            "`flavor` only applies to async test functions",
        ));
    }

    let overrides: Vec<TokenStream2> = [
        ("with_clear_mocks", config.clear_mocks),
        ("with_reset_mocks", config.reset_mocks),
        ("with_restore_mocks", config.restore_mocks),
    ]
    .into_iter()
    .filter_map(|(setter, value)| {
        value.map(|enabled| {
            let setter = Ident::new(setter, proc_macro2::Span::call_site());
            quote! { .#setter(#enabled) }
        })
    })
    .collect();

    // Generate registry initialization
    let registry_init = match registry_pat {
        Some(pat) => quote! {
            let __testkit_mock_registry = ::testkit_mock::registry::MockRegistry::new();
            let __testkit_mock_scope = __testkit_mock_registry.scoped(
                ::testkit_mock::registry::MockConfig::from_env()
                    .unwrap_or_else(|err| panic!("{}", err))
                    #(#overrides)*,
            );
            let #pat = __testkit_mock_registry.clone();
        },
        None => quote! {},
    };

    let test_attr = if is_async {
        match config.flavor.as_deref() {
            Some("multi_thread") => quote! { #[::tokio::test(flavor = "multi_thread")] },
            _ => quote! { #[::tokio::test] },
        }
    } else {
        quote! { #[::core::prelude::v1::test] }
    };
    let asyncness = if is_async {
        quote! { async }
    } else {
        quote! {}
    };

    Ok(quote! {
        #test_attr
        #(#attrs)*
        #vis #asyncness fn #name() #output {
            #registry_init
            #body
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{expand_test, TestConfig};

    #[::core::prelude::v1::test]
    fn test_config_parse_empty() {
        let config: TestConfig = syn::parse_str("").unwrap();
        assert!(config.clear_mocks.is_none());
        assert!(config.reset_mocks.is_none());
        assert!(config.restore_mocks.is_none());
        assert!(config.flavor.is_none());
    }

    #[::core::prelude::v1::test]
    fn test_config_parse_multiple() {
        let config: TestConfig =
            syn::parse_str("clear_mocks = true, restore_mocks = false, flavor = \"multi_thread\"")
                .unwrap();
        assert_eq!(config.clear_mocks, Some(true));
        assert_eq!(config.restore_mocks, Some(false));
        assert_eq!(config.flavor, Some("multi_thread".to_string()));
    }

    #[::core::prelude::v1::test]
    fn test_config_rejects_non_bool() {
        assert!(syn::parse_str::<TestConfig>("reset_mocks = 1").is_err());
    }

    #[::core::prelude::v1::test]
    fn test_config_rejects_unknown_key() {
        assert!(syn::parse_str::<TestConfig>("start_paused = true").is_err());
    }

    #[::core::prelude::v1::test]
    fn test_config_rejects_unknown_flavor() {
        assert!(syn::parse_str::<TestConfig>("flavor = \"single\"").is_err());
    }

    #[::core::prelude::v1::test]
    fn test_expand_sync_with_registry() {
        let input = syn::parse_str("fn t(registry: MockRegistry) { body(); }").unwrap();
        let config: TestConfig = syn::parse_str("restore_mocks = true").unwrap();

        let out = expand_test(config, input).unwrap().to_string();

        assert!(out.contains("MockRegistry :: new"));
        assert!(out.contains("with_restore_mocks (true)"));
        assert!(out.contains("fn t ()"));
        assert!(!out.contains("async"));
    }

    #[::core::prelude::v1::test]
    fn test_expand_async_uses_tokio() {
        let input = syn::parse_str("async fn t() {}").unwrap();
        let config: TestConfig = syn::parse_str("flavor = \"multi_thread\"").unwrap();

        let out = expand_test(config, input).unwrap().to_string();

        assert!(out.contains("tokio :: test"));
        assert!(out.contains("multi_thread"));
        assert!(!out.contains("MockRegistry"));
    }

    #[::core::prelude::v1::test]
    fn test_expand_rejects_other_params() {
        let input = syn::parse_str("fn t(x: u32) {}").unwrap();
        assert!(expand_test(TestConfig::default(), input).is_err());
    }

    #[::core::prelude::v1::test]
    fn test_expand_rejects_flavor_on_sync() {
        let input = syn::parse_str("fn t() {}").unwrap();
        let config: TestConfig = syn::parse_str("flavor = \"current_thread\"").unwrap();
        assert!(expand_test(config, input).is_err());
    }
}
