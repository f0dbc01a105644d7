use proc_macro::{self, TokenStream};
use proc_macro2::Literal;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use super::utils::{clog2, get_enum_encode_value, get_enum_width, get_member_symbol};

pub fn derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let name = &ast.ident;
    match ast.data {
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(syn::FieldsNamed { ref named, .. }), ..
        }) => {
            let fields = named;

            let ty_widths = fields.iter().map(|f| {
                let ty = &f.ty;
                quote! { + <#ty as Signal>::WIDTH }
            });

            // fields for `transl`.
            let into_fields = fields.iter().map(|f| {
                let name = &f.ident;
                quote! { .chain(Signal::transl(self.#name)) }
            });

            // fields for `port_decls`.
            let port_decls_fields = fields.iter().map(|f| {
                let name = f.ident.as_ref().unwrap();
                let ty = &f.ty;
                let symbol = get_member_symbol(&f.attrs, name);

                match symbol {
                    None => quote! { (None, <#ty as Signal>::port_decls()) },
                    Some(symbol) => quote! { (Some(#symbol.to_string()), <#ty as Signal>::port_decls()) },
                }
            });

            let expanded = quote! {
                impl #impl_generics Signal for #name #ty_generics #where_clause {
                    const WIDTH: usize = 0 #(#ty_widths)*;
                    fn transl(self) -> Vec<bool> {
                        ::std::iter::empty()#(#into_fields)*.collect::<Vec<bool>>()
                    }
                    fn port_decls() -> PortDecls {
                        PortDecls::Struct(vec![
                            #(#port_decls_fields,)*
                        ])
                    }
                }
            };

            expanded.into()
        }
        syn::Data::Enum(syn::DataEnum { ref variants, .. }) => {
            let variant_count = variants.iter().count();
            assert!(variant_count > 0, "{name}: Empty enums cannot be derived as `Signal`");
            let width = if let Some(width) = get_enum_width(&ast.attrs) {
                width.base10_parse::<usize>().unwrap_or_else(|_| panic!("{name}: Enum width should be usize"))
            } else if variant_count == 1 {
                1
            } else {
                clog2(variant_count)
            };
            assert!(width <= 64, "{name}: Enum width should not exceed 64 bits");

            let mut encodings = Vec::with_capacity(variant_count);
            for (i, f) in variants.iter().enumerate() {
                let variant_name = &f.ident;
                assert!(
                    matches!(f.fields, syn::Fields::Unit),
                    "{name}::{variant_name}: Only Unit Variant is allowed to be derived as `Signal`"
                );

                let encode_value = if let Some(encode_value_lit) = get_enum_encode_value(&f.attrs) {
                    encode_value_lit
                        .base10_parse::<u64>()
                        .unwrap_or_else(|_| panic!("encoding value of {name}::{variant_name} should be u64"))
                } else {
                    i as u64
                };
                assert!(
                    width == 64 || encode_value < (1 << width),
                    "{encode_value}(encoding of {name}::{variant_name}) exceeds maximum for {width} bits",
                );
                assert!(
                    !encodings.iter().any(|(_, v)| *v == encode_value),
                    "{name}::{variant_name}: encoding {encode_value} is used twice",
                );
                encodings.push((variant_name.clone(), encode_value));
            }

            let encode_arms = encodings.iter().map(|(variant_name, value)| {
                let value = Literal::u64_unsuffixed(*value);
                quote! { Self::#variant_name => #value, }
            });
            let decode_arms = encodings.iter().map(|(variant_name, value)| {
                let value = Literal::u64_unsuffixed(*value);
                quote! { #value => Some(Self::#variant_name), }
            });

            let expanded = quote! {
                impl #impl_generics Signal for #name #ty_generics #where_clause {
                    const WIDTH: usize = #width;
                    fn transl(self) -> Vec<bool> {
                        let value = EnumValue::encode(self);
                        (0..Self::WIDTH).map(|idx| ((value >> idx) & 1) != 0).collect::<Vec<bool>>()
                    }
                    fn port_decls() -> PortDecls {
                        PortDecls::Bits(Self::WIDTH)
                    }
                }

                impl #impl_generics EnumValue for #name #ty_generics #where_clause {
                    fn encode(self) -> u64 {
                        match self {
                            #(#encode_arms)*
                        }
                    }
                    fn decode(value: u64) -> Option<Self> {
                        match value {
                            #(#decode_arms)*
                            _ => None,
                        }
                    }
                }
            };

            expanded.into()
        }
        _ => todo!("Signal macro is not implemented for union type"),
    }
}
