use proc_macro::TokenStream;
use quote::quote;
use syn::{ext::IdentExt, parse_macro_input};

enum Node {
	String(syn::LitStr),
	Block(syn::Block),
	Fragment(Fragment),
	Element(Element),
}

struct Fragment {
	children: Vec<Node>,
}

struct Element {
	name: syn::Path,
	attributes: Vec<Attribute>,
	children: Vec<Node>,
	self_closing: bool,
}

enum Attribute {
	Shorthand(AttributeKey),
	Longhand(AttributeKey, AttributeValue),
}

/// Attribute names like `data-options` are parsed as identifiers separated by `-`.
type AttributeKey = syn::punctuated::Punctuated<syn::Ident, syn::Token![-]>;

enum AttributeValue {
	String(syn::LitStr),
	Block(syn::Block),
}

fn parse_children(input: syn::parse::ParseStream) -> syn::parse::Result<Vec<Node>> {
	let mut children = Vec::new();
	while !(input.peek(syn::Token![<]) && input.peek2(syn::Token![/])) {
		if input.is_empty() {
			return Err(input.error("unexpected end of input, expected a closing tag"));
		}
		children.push(input.parse::<Node>()?);
	}
	Ok(children)
}

impl syn::parse::Parse for Node {
	fn parse(input: syn::parse::ParseStream) -> syn::parse::Result<Self> {
		if input.peek(syn::LitStr) {
			input.parse().map(Node::String)
		} else if input.peek(syn::token::Brace) {
			input.parse().map(Node::Block)
		} else if input.peek(syn::Token![<]) && input.peek2(syn::Token![>]) {
			input.parse().map(Node::Fragment)
		} else if input.peek(syn::Token![<]) {
			input.parse().map(Node::Element)
		} else {
			Err(input.error("expected a string, a block, a fragment or an element"))
		}
	}
}

impl syn::parse::Parse for Fragment {
	fn parse(input: syn::parse::ParseStream) -> syn::parse::Result<Self> {
		input.parse::<syn::Token![<]>()?;
		input.parse::<syn::Token![>]>()?;
		let children = parse_children(input)?;
		input.parse::<syn::Token![<]>()?;
		input.parse::<syn::Token![/]>()?;
		input.parse::<syn::Token![>]>()?;
		Ok(Fragment { children })
	}
}

impl syn::parse::Parse for Element {
	fn parse(input: syn::parse::ParseStream) -> syn::parse::Result<Self> {
		input.parse::<syn::Token![<]>()?;
		let name = input.parse::<syn::Path>()?;
		let mut attributes = Vec::new();
		while !(input.peek(syn::Token![>]) || input.peek(syn::Token![/])) {
			let key = AttributeKey::parse_separated_nonempty_with(input, syn::Ident::parse_any)?;
			if input.peek(syn::Token![=]) {
				input.parse::<syn::Token![=]>()?;
				let value = if input.peek(syn::LitStr) {
					AttributeValue::String(input.parse()?)
				} else {
					AttributeValue::Block(input.parse()?)
				};
				attributes.push(Attribute::Longhand(key, value));
			} else {
				attributes.push(Attribute::Shorthand(key));
			}
		}
		let self_closing = input.peek(syn::Token![/]);
		if self_closing {
			input.parse::<syn::Token![/]>()?;
		}
		input.parse::<syn::Token![>]>()?;
		let mut children = Vec::new();
		if !self_closing {
			children = parse_children(input)?;
			input.parse::<syn::Token![<]>()?;
			input.parse::<syn::Token![/]>()?;
			let close_name = input.parse::<syn::Path>()?;
			if close_name != name {
				return Err(syn::Error::new_spanned(
					close_name,
					"closing tag does not match the opening tag",
				));
			}
			input.parse::<syn::Token![>]>()?;
		}
		Ok(Element {
			name,
			attributes,
			children,
			self_closing,
		})
	}
}

impl quote::ToTokens for Node {
	fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
		match self {
			Node::String(string) => string.to_tokens(tokens),
			Node::Block(block) => block.to_tokens(tokens),
			Node::Fragment(fragment) => fragment.to_tokens(tokens),
			Node::Element(element) => element.to_tokens(tokens),
		}
	}
}

impl quote::ToTokens for Fragment {
	fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
		let children = self.children.iter();
		let code = quote! {
			::html::Node::Fragment(::html::FragmentNode {
				children: vec![#(#children.into()),*],
			})
		};
		code.to_tokens(tokens);
	}
}

fn attribute_name(key: &AttributeKey) -> String {
	key.iter()
		.map(|ident| ident.unraw().to_string())
		.collect::<Vec<_>>()
		.join("-")
}

impl quote::ToTokens for Element {
	fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
		// Lowercase names are html elements. Anything else names a component.
		let host_name = self.name.get_ident().filter(|ident| {
			ident
				.to_string()
				.chars()
				.next()
				.map_or(false, |c| c.is_ascii_lowercase())
		});
		let children = self.children.iter();
		let children = quote! { vec![#(#children.into()),*] };
		let code = if let Some(host_name) = host_name {
			let host_name = host_name.to_string();
			let attributes = self.attributes.iter().map(|attribute| {
				let (key, value) = match attribute {
					Attribute::Shorthand(key) => (key, quote! { #key.into() }),
					Attribute::Longhand(key, AttributeValue::String(string)) => {
						(key, quote! { #string.into() })
					}
					Attribute::Longhand(key, AttributeValue::Block(block)) => {
						(key, quote! { #block.into() })
					}
				};
				let key = attribute_name(key);
				quote! { (#key, #value) }
			});
			let self_closing = self.self_closing;
			quote! {
				::html::Node::Host(::html::HostNode {
					name: #host_name,
					attributes: vec![#(#attributes),*],
					children: #children,
					self_closing: #self_closing,
				})
			}
		} else {
			let name = &self.name;
			let fields = self.attributes.iter().map(|attribute| match attribute {
				Attribute::Shorthand(key) => quote! { #key },
				Attribute::Longhand(key, AttributeValue::String(string)) => quote! { #key: #string },
				Attribute::Longhand(key, AttributeValue::Block(block)) => quote! { #key: #block },
			});
			quote! {
				::html::Node::Component(::html::ComponentNode::Unrendered {
					component: Some(Box::new(#name { #(#fields),* })),
					children: Some(#children),
				})
			}
		};
		code.to_tokens(tokens);
	}
}

/// Turn `fn Name(props...) { html!(...) }` into a struct holding the props and a `Component` impl whose `render` runs the body with `children` in scope.
fn component_transform(function: syn::ItemFn) -> TokenStream {
	let visibility = function.vis;
	let struct_name = function.sig.ident;
	let generics = function.sig.generics;
	let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
	let inputs: Vec<_> = function
		.sig
		.inputs
		.iter()
		.filter_map(|argument| match argument {
			syn::FnArg::Typed(typed) => Some(typed),
			syn::FnArg::Receiver(_) => None,
		})
		.collect();
	let patterns = inputs.iter().map(|typed| &typed.pat);
	let block = function.block;
	let code = quote! {
		#[derive(Clone)]
		#visibility struct #struct_name #impl_generics #where_clause { #(#visibility #inputs),* }
		impl #impl_generics ::html::Component for #struct_name #ty_generics #where_clause {
			#[allow(unused_variables)]
			fn render(self: Box<Self>, children: Vec<::html::Node>) -> ::html::Node {
				let #struct_name { #(#patterns),* } = *self;
				#block
			}
		}
	};
	code.into()
}

#[proc_macro]
pub fn html(input: TokenStream) -> TokenStream {
	let node = parse_macro_input!(input as Node);
	quote!(#node).into()
}

#[proc_macro_attribute]
pub fn component(_attr: TokenStream, input: TokenStream) -> TokenStream {
	component_transform(parse_macro_input!(input as syn::ItemFn))
}
