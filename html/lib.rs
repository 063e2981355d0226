/*!
Server side html rendering. Markup is written with the `html!` macro, reusable pieces are functions annotated with `#[component]`, and the resulting tree is written out with `Node::render_to_string`.
*/

use derive_more::From;
use std::{borrow::Cow, fmt, fmt::Write};

pub use html_macro::{component, html};

#[derive(Clone, From)]
pub enum Node {
	RawText(RawTextNode),
	EscapedText(EscapedTextNode),
	Fragment(FragmentNode),
	Host(HostNode),
	Component(ComponentNode),
	Option(Option<Box<Node>>),
	Vec(Vec<Node>),
}

/// Text written out as is. Only use this for markup that is already trusted.
#[derive(Clone)]
pub struct RawTextNode(pub Cow<'static, str>);

#[derive(Clone)]
pub struct EscapedTextNode(pub Cow<'static, str>);

#[derive(Clone)]
pub struct FragmentNode {
	pub children: Vec<Node>,
}

#[derive(Clone)]
pub struct HostNode {
	pub name: &'static str,
	pub attributes: Vec<(AttributeKey, AttributeValue)>,
	pub children: Vec<Node>,
	pub self_closing: bool,
}

pub type AttributeKey = &'static str;

/// A `None` value leaves the attribute out. `Bool(Some(true))` writes the bare attribute name.
#[derive(Clone, From)]
pub enum AttributeValue {
	Bool(Option<bool>),
	String(Option<Cow<'static, str>>),
}

#[derive(Clone)]
pub enum ComponentNode {
	Unrendered {
		component: Option<Box<dyn Component>>,
		children: Option<Vec<Node>>,
	},
	Rendered(Box<Node>),
}

pub trait Component: ComponentClone {
	fn render(self: Box<Self>, children: Vec<Node>) -> Node;
}

pub trait ComponentClone {
	fn clone_box(&self) -> Box<dyn Component>;
}

impl<T> ComponentClone for T
where
	T: Component + Clone + 'static,
{
	fn clone_box(&self) -> Box<dyn Component> {
		Box::new(self.clone())
	}
}

impl Clone for Box<dyn Component> {
	fn clone(&self) -> Box<dyn Component> {
		self.clone_box()
	}
}

impl Node {
	pub fn render_to_string(mut self) -> String {
		self.render().to_string()
	}

	/// Expand every component in the tree into the nodes it renders.
	fn render(&mut self) -> &mut Node {
		match self {
			Node::Fragment(FragmentNode { children }) | Node::Host(HostNode { children, .. }) => {
				for child in children.iter_mut() {
					child.render();
				}
			}
			Node::Vec(children) => {
				for child in children.iter_mut() {
					child.render();
				}
			}
			Node::Option(Some(child)) => {
				child.render();
			}
			Node::Component(node) => {
				if let ComponentNode::Unrendered {
					component,
					children,
				} = node
				{
					if let (Some(component), Some(children)) = (component.take(), children.take()) {
						let mut rendered = component.render(children);
						rendered.render();
						*node = ComponentNode::Rendered(Box::new(rendered));
					}
				}
			}
			Node::RawText(_) | Node::EscapedText(_) | Node::Option(None) => {}
		};
		self
	}
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
	for c in text.chars() {
		match c {
			'>' => f.write_str("&gt;")?,
			'<' => f.write_str("&lt;")?,
			'"' => f.write_str("&quot;")?,
			'&' => f.write_str("&amp;")?,
			'\'' => f.write_str("&apos;")?,
			c => f.write_char(c)?,
		};
	}
	Ok(())
}

impl fmt::Display for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Node::RawText(node) => write!(f, "{}", node),
			Node::EscapedText(node) => write!(f, "{}", node),
			Node::Fragment(node) => write!(f, "{}", node),
			Node::Host(node) => write!(f, "{}", node),
			Node::Component(node) => write!(f, "{}", node),
			Node::Option(node) => match node {
				Some(node) => write!(f, "{}", node),
				None => Ok(()),
			},
			Node::Vec(nodes) => {
				for node in nodes {
					write!(f, "{}", node)?;
				}
				Ok(())
			}
		}
	}
}

impl fmt::Display for FragmentNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for child in self.children.iter() {
			write!(f, "{}", child)?;
		}
		Ok(())
	}
}

impl fmt::Display for HostNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<{}", self.name)?;
		for (key, value) in self.attributes.iter() {
			match value {
				AttributeValue::Bool(Some(true)) => write!(f, " {}", key)?,
				AttributeValue::String(Some(value)) => {
					write!(f, r#" {}=""#, key)?;
					write_escaped(f, value)?;
					f.write_char('"')?;
				}
				AttributeValue::Bool(_) | AttributeValue::String(None) => {}
			}
		}
		if self.self_closing {
			return write!(f, " />");
		}
		write!(f, ">")?;
		for child in self.children.iter() {
			write!(f, "{}", child)?;
		}
		write!(f, "</{}>", self.name)
	}
}

/// Components must be expanded with `Node::render_to_string` first. Writing an unexpanded one is an error.
impl fmt::Display for ComponentNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ComponentNode::Rendered(rendered) => write!(f, "{}", rendered),
			ComponentNode::Unrendered { .. } => Err(fmt::Error),
		}
	}
}

impl fmt::Display for RawTextNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Display for EscapedTextNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_escaped(f, &self.0)
	}
}

impl From<Option<String>> for AttributeValue {
	fn from(value: Option<String>) -> AttributeValue {
		AttributeValue::String(value.map(Into::into))
	}
}

impl From<Option<&'static str>> for AttributeValue {
	fn from(value: Option<&'static str>) -> AttributeValue {
		AttributeValue::String(value.map(Into::into))
	}
}

impl From<bool> for AttributeValue {
	fn from(value: bool) -> AttributeValue {
		AttributeValue::Bool(Some(value))
	}
}

impl From<String> for AttributeValue {
	fn from(value: String) -> AttributeValue {
		AttributeValue::String(Some(value.into()))
	}
}

impl From<&'static str> for AttributeValue {
	fn from(value: &'static str) -> AttributeValue {
		AttributeValue::String(Some(value.into()))
	}
}

impl From<String> for Node {
	fn from(value: String) -> Node {
		Node::EscapedText(EscapedTextNode(value.into()))
	}
}

impl From<&'static str> for Node {
	fn from(value: &'static str) -> Node {
		Node::EscapedText(EscapedTextNode(value.into()))
	}
}

impl<T> From<Option<T>> for Node
where
	T: Into<Node>,
{
	fn from(value: Option<T>) -> Node {
		Node::Option(value.map(|value| Box::new(value.into())))
	}
}

/// Insert trusted markup without escaping it.
#[macro_export]
macro_rules! raw {
	($t:expr) => {
		::html::RawTextNode($t.into())
	};
}
