use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta};

/// Derive a column-oriented collector for a flat record of `f64` fluxes.
///
/// For `struct StepFluxes { .. }` this generates `StepFluxesSeries`, holding one
/// `Vec<f64>` per field, with `with_capacity`, `push`, `len`, `is_empty`,
/// `get` and `totals`. The record itself gains `field_names()` and `to_array()`.
///
/// `#[series(name = "Custom")]` overrides the generated type name.
#[proc_macro_derive(Series, attributes(series))]
pub fn derive_series(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let series_name = series_name_override(&input).unwrap_or_else(|| format_ident!("{}Series", name));

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(name, "Series requires named fields")
                    .to_compile_error()
                    .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "Series can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    if fields.is_empty() {
        return syn::Error::new_spanned(name, "Series record needs at least one field")
            .to_compile_error()
            .into();
    }

    let mut idents = Vec::with_capacity(fields.len());
    for field in fields {
        if !is_f64(&field.ty) {
            return syn::Error::new_spanned(&field.ty, "Series fields must be f64")
                .to_compile_error()
                .into();
        }
        // named fields always carry an ident
        if let Some(ident) = field.ident.as_ref() {
            idents.push(ident);
        }
    }

    let n_fields = idents.len();
    let first = idents[0];
    let labels: Vec<String> = idents.iter().map(|i| i.to_string()).collect();

    let expanded = quote! {
        /// Per-timestep values collected column by column.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct #series_name {
            #(pub #idents: Vec<f64>,)*
        }

        impl #series_name {
            pub fn with_capacity(n: usize) -> Self {
                Self {
                    #(#idents: Vec::with_capacity(n),)*
                }
            }

            pub fn push(&mut self, record: &#name) {
                #(self.#idents.push(record.#idents);)*
            }

            pub fn len(&self) -> usize {
                self.#first.len()
            }

            pub fn is_empty(&self) -> bool {
                self.#first.is_empty()
            }

            /// Record at timestep `t`, if stored.
            pub fn get(&self, t: usize) -> Option<#name> {
                if t >= self.len() {
                    return None;
                }
                Some(#name {
                    #(#idents: self.#idents[t],)*
                })
            }

            /// Column sums over every stored timestep.
            pub fn totals(&self) -> #name {
                #name {
                    #(#idents: self.#idents.iter().sum(),)*
                }
            }
        }

        impl #name {
            pub fn field_names() -> &'static [&'static str] {
                &[#(#labels),*]
            }

            pub fn to_array(&self) -> [f64; #n_fields] {
                [#(self.#idents),*]
            }
        }
    };

    expanded.into()
}

fn series_name_override(input: &DeriveInput) -> Option<proc_macro2::Ident> {
    let attr = input.attrs.iter().find(|a| a.path().is_ident("series"))?;
    let nested = attr
        .parse_args_with(syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated)
        .ok()?;
    nested.into_iter().find_map(|meta| match meta {
        Meta::NameValue(nv) if nv.path.is_ident("name") => match &nv.value {
            syn::Expr::Lit(syn::ExprLit {
                lit: Lit::Str(s), ..
            }) => Some(format_ident!("{}", s.value())),
            _ => None,
        },
        _ => None,
    })
}

fn is_f64(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(p) if p.qself.is_none() && p.path.is_ident("f64"))
}
