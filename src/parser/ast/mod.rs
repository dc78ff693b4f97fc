//! Typed AST wrappers over the untyped rowan CST.
//!
//! This module provides strongly-typed accessors for Pure syntax nodes.
//! Each struct wraps a SyntaxNode and provides methods to access children.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

// ============================================================================
// Helper utilities for reducing code duplication
// ============================================================================

/// Check if a token kind can be used as a name.
/// A handful of keywords (`stereotypes`, `tags`, `extends`) are only reserved
/// in their own clause and are ordinary names everywhere else.
#[inline]
fn is_name_token(kind: SyntaxKind) -> bool {
    kind.is_contextual_name()
}

/// Check if a syntax node has a direct child token of the specified kind.
#[inline]
fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind() == kind)
}

/// Find the first direct child token that can be used as a name.
#[inline]
fn find_name_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| is_name_token(t.kind()))
}

/// Find the first direct child token of the given kind.
#[inline]
fn find_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// First non-trivia direct child token (usually the operator of a part).
#[inline]
fn first_significant_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| !t.kind().is_trivia())
}

/// Macro to generate boolean property methods that check for a specific token kind.
macro_rules! has_token_method {
    ($name:ident, $kind:ident, $example:literal) => {
        #[doc = concat!("Check if this node has the `", stringify!($kind), "` token (e.g., `", $example, "`).")]
        pub fn $name(&self) -> bool {
            has_token(&self.0, SyntaxKind::$kind)
        }
    };
}

/// Macro to generate a method that finds the first child of a specific AST type.
macro_rules! first_child_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get the first `", stringify!($type), "` child of this node.")]
        pub fn $name(&self) -> Option<$type> {
            self.0.children().find_map($type::cast)
        }
    };
}

/// Macro to generate a method that returns an iterator over children of a specific AST type.
macro_rules! children_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get all `", stringify!($type), "` children of this node.")]
        pub fn $name(&self) -> impl Iterator<Item = $type> + '_ {
            self.0.children().filter_map($type::cast)
        }
    };
}

/// Macro to generate a `name()` accessor returning the node's own name token.
macro_rules! name_token_method {
    () => {
        /// The declared name token of this node.
        pub fn name(&self) -> Option<SyntaxToken> {
            find_name_token(&self.0)
        }
    };
}

/// Macro to generate the `<<stereotypes>>` / `{tagged values}` accessors.
macro_rules! annotations_methods {
    () => {
        /// Stereotypes applied to this declaration.
        pub fn stereotypes(&self) -> Vec<Stereotype> {
            self.0
                .children()
                .filter_map(Stereotypes::cast)
                .flat_map(|s| s.items().collect::<Vec<_>>())
                .collect()
        }

        /// Tagged values applied to this declaration.
        pub fn tagged_values(&self) -> Vec<TaggedValue> {
            self.0
                .children()
                .filter_map(TaggedValues::cast)
                .flat_map(|s| s.items().collect::<Vec<_>>())
                .collect()
        }
    };
}

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    /// Find all descendant nodes of a specific AST type
    fn descendants<T: AstNode>(&self) -> impl Iterator<Item = T> {
        self.syntax().descendants().filter_map(T::cast)
    }
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

/// Macro to generate a sum type over several node wrappers, with `cast` dispatch.
macro_rules! ast_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident($type:ident)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant($type),)+
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                $($type::can_cast(kind))||+
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                $(
                    if $type::can_cast(node.kind()) {
                        return $type::cast(node).map(Self::$variant);
                    }
                )+
                None
            }

            fn syntax(&self) -> &SyntaxNode {
                match self {
                    $(Self::$variant(inner) => inner.syntax(),)+
                }
            }
        }
    };
}

// Submodules are declared after macros so macro_rules! are in scope
mod elements;
mod expressions;

// Re-export all public types so external code sees a flat namespace
pub use self::elements::*;
pub use self::expressions::*;
