//! Derive macros for the Murmur flocking simulation.
//!
//! This crate provides one derive macro:
//!
//! - [`Faction`] - Creates type-safe enums for agent factions (teams)
//!
//! # Usage
//!
//! The macro is re-exported from the main `murmur` crate. You don't need
//! to add this crate directly:
//!
//! ```ignore
//! use murmur::prelude::*;
//!
//! #[derive(Faction, Clone, Copy, PartialEq)]
//! enum Team {
//!     #[rgb(255, 0, 255)]
//!     Sparrows,
//!     #[rgb(0, 255, 0)]
//!     Falcons,
//! }
//! ```
//!
//! # The Faction Macro
//!
//! `#[derive(Faction)]` turns a unit-variant enum into faction tags that
//! restrict alignment and cohesion to teammates.
//!
//! It generates:
//! - `From<EnumName> for FactionId` - Convert a variant to the simulation tag
//! - `From<FactionId> for EnumName` - Convert back (defaults to first variant)
//! - `EnumName::count() -> u32` - Number of variants
//! - `impl FactionKind for EnumName` - Display color and name per variant

use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitInt, Token, Variant};

/// Derive macro for faction enums.
///
/// Variants are assigned sequential faction ids starting from 0.
///
/// # Generated Items
///
/// For an enum `Team`:
///
/// - `impl From<Team> for murmur::FactionId` - Convert variant to tag
/// - `impl From<murmur::FactionId> for Team` - Convert tag to variant (unknown ids default to the first variant)
/// - `Team::count() -> u32` - Returns number of variants
/// - `impl murmur::FactionKind for Team` - `color()` and `name()` per variant
///
/// # Attributes
///
/// - `#[rgb(r, g, b)]` on a variant sets its draw color (0-255 per channel).
///   Variants without the attribute are drawn white.
///
/// # Requirements
///
/// - Must be an enum (not a struct)
/// - All variants must be unit variants (no fields)
/// - Enum must also derive `Clone` and `Copy`
///
/// # Example
///
/// ```ignore
/// #[derive(Faction, Clone, Copy, PartialEq)]
/// enum Team {
///     #[rgb(0, 0, 255)]
///     Blue,      // = 0
///     #[rgb(255, 255, 255)]
///     White,     // = 1
///     Purple,    // = 2, drawn white
/// }
///
/// let blue: FactionId = Team::Blue.into();
/// let teams = Team::count();  // 3
/// ```
///
/// # Panics
///
/// The macro panics at compile time if:
/// - Applied to a struct instead of an enum
/// - Any variant has fields (tuple or struct variants)
/// - Enum has zero variants
/// - An `#[rgb]` attribute does not hold exactly three integers in 0-255
#[proc_macro_derive(Faction, attributes(rgb))]
pub fn derive_faction(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => panic!("Faction derive only supports enums"),
    };

    for variant in variants.iter() {
        if !matches!(variant.fields, Fields::Unit) {
            panic!(
                "Faction enum variants must be unit variants (no fields). \
                 Found fields on variant '{}'",
                variant.ident
            );
        }
    }

    let into_arms: Vec<_> = variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            let variant_name = &variant.ident;
            let idx = i as u32;
            quote! { #name::#variant_name => ::murmur::FactionId(#idx) }
        })
        .collect();

    let from_arms: Vec<_> = variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            let variant_name = &variant.ident;
            let idx = i as u32;
            quote! { #idx => #name::#variant_name }
        })
        .collect();

    let color_arms: Vec<_> = variants.iter().map(|v| color_arm(name, v)).collect();

    let name_arms: Vec<_> = variants
        .iter()
        .map(|variant| {
            let variant_name = &variant.ident;
            let label = variant_name.to_string();
            quote! { #name::#variant_name => #label }
        })
        .collect();

    let first_variant = &variants
        .first()
        .expect("Faction enum must have at least one variant")
        .ident;
    let variant_count = variants.len() as u32;

    let expanded = quote! {
        impl From<#name> for ::murmur::FactionId {
            fn from(value: #name) -> ::murmur::FactionId {
                match value {
                    #(#into_arms),*
                }
            }
        }

        impl From<::murmur::FactionId> for #name {
            fn from(value: ::murmur::FactionId) -> #name {
                match value.0 {
                    #(#from_arms,)*
                    _ => #name::#first_variant,
                }
            }
        }

        impl #name {
            /// Returns the number of variants in this faction enum.
            pub const fn count() -> u32 {
                #variant_count
            }
        }

        impl ::murmur::FactionKind for #name {
            const COUNT: u32 = #variant_count;

            fn color(&self) -> [f32; 3] {
                match self {
                    #(#color_arms),*
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// `Enum::Variant => [r, g, b]`, white when the variant has no `#[rgb]`.
fn color_arm(name: &Ident, variant: &Variant) -> proc_macro2::TokenStream {
    let variant_name = &variant.ident;
    let [r, g, b] = rgb_attribute(&variant.attrs).unwrap_or([1.0, 1.0, 1.0]);
    quote! { #name::#variant_name => [#r, #g, #b] }
}

/// Read `#[rgb(r, g, b)]` from a variant's attributes as normalized floats.
fn rgb_attribute(attrs: &[Attribute]) -> Option<[f32; 3]> {
    let attr = attrs.iter().find(|a| a.path().is_ident("rgb"))?;
    let channels = attr
        .parse_args_with(Punctuated::<LitInt, Token![,]>::parse_terminated)
        .unwrap_or_else(|e| panic!("#[rgb] expects three integers: {}", e));

    let values: Vec<f32> = channels
        .iter()
        .map(|lit| {
            let channel = lit
                .base10_parse::<u8>()
                .unwrap_or_else(|_| panic!("#[rgb] channel '{}' must be in 0-255", lit));
            f32::from(channel) / 255.0
        })
        .collect();

    match values.as_slice() {
        [r, g, b] => Some([*r, *g, *b]),
        _ => panic!("#[rgb] expects exactly three channels, found {}", values.len()),
    }
}
