//! Indexed view over a descriptor tree.
//!
//! The descriptor types only point downwards. [`DeclarationTree`] flattens a
//! file into pre-order so that rules and the suppression engine can walk
//! upwards (parent, ancestors, enclosing file) without the descriptors
//! carrying back-references.

use crate::descriptor::{Descriptor, DescriptorKind, FileDescriptor, Span};

#[derive(Debug)]
struct Node<'a> {
    descriptor: Descriptor<'a>,
    parent: Option<usize>,
    children: Vec<usize>,
    full_name: String,
}

/// A file's declarations in depth-first pre-order.
#[derive(Debug)]
pub struct DeclarationTree<'a> {
    file: &'a FileDescriptor,
    nodes: Vec<Node<'a>>,
}

impl<'a> DeclarationTree<'a> {
    /// Flattens a file. Index 0 is always the file itself.
    #[must_use]
    pub fn build(file: &'a FileDescriptor) -> Self {
        let mut tree = Self {
            file,
            nodes: Vec::new(),
        };
        tree.push(Descriptor::File(file), None, file.package.clone());
        tree
    }

    fn push(&mut self, descriptor: Descriptor<'a>, parent: Option<usize>, full_name: String) {
        let index = self.nodes.len();
        self.nodes.push(Node {
            descriptor,
            parent,
            children: Vec::new(),
            full_name: full_name.clone(),
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(index);
        }

        // Files scope their children by package; everything else by its own name.
        for child in descriptor.children() {
            let child_name = if full_name.is_empty() {
                child.name().to_string()
            } else {
                format!("{full_name}.{}", child.name())
            };
            self.push(child, Some(index), child_name);
        }
    }

    /// The file this tree was built from.
    #[must_use]
    pub fn file(&self) -> &'a FileDescriptor {
        self.file
    }

    /// Number of declarations, including the file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree contains at least its file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The file declaration.
    #[must_use]
    pub fn root(&self) -> Declaration<'a, '_> {
        Declaration {
            tree: self,
            index: 0,
        }
    }

    /// Returns the declaration at a pre-order position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Declaration<'a, '_>> {
        (index < self.nodes.len()).then_some(Declaration { tree: self, index })
    }

    /// Iterates all declarations in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = Declaration<'a, '_>> + '_ {
        (0..self.nodes.len()).map(move |index| Declaration { tree: self, index })
    }
}

/// One declaration together with its position in a [`DeclarationTree`].
#[derive(Clone, Copy)]
pub struct Declaration<'a, 't> {
    tree: &'t DeclarationTree<'a>,
    index: usize,
}

impl<'a, 't> Declaration<'a, 't> {
    /// The underlying descriptor.
    #[must_use]
    pub fn descriptor(self) -> Descriptor<'a> {
        self.node().descriptor
    }

    /// The declaration kind.
    #[must_use]
    pub fn kind(self) -> DescriptorKind {
        self.descriptor().kind()
    }

    /// The short name.
    #[must_use]
    pub fn name(self) -> &'a str {
        self.descriptor().name()
    }

    /// Fully-qualified name (`package.Message.field`); the package for files.
    #[must_use]
    pub fn full_name(self) -> &'t str {
        &self.tree.nodes[self.index].full_name
    }

    /// Leading comment blocks attached to this declaration.
    #[must_use]
    pub fn comments(self) -> &'a [String] {
        self.descriptor().comments()
    }

    /// Pre-order position within the file.
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }

    /// Source position of the declaration.
    #[must_use]
    pub fn span(self) -> Span {
        self.descriptor().spans().declaration
    }

    /// The enclosing file descriptor.
    #[must_use]
    pub fn file(self) -> &'a FileDescriptor {
        self.tree.file
    }

    /// The containing declaration; `None` for the file.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.node().parent.map(|index| Self {
            tree: self.tree,
            index,
        })
    }

    /// Containing declarations from the parent up to and including the file.
    pub fn ancestors(self) -> impl Iterator<Item = Self> {
        std::iter::successors(self.parent(), |d| d.parent())
    }

    /// This declaration followed by its ancestors.
    pub fn scope_chain(self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |d| d.parent())
    }

    /// Direct children in declaration order.
    pub fn children(self) -> impl Iterator<Item = Self> + 't {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |&index| Self { tree, index })
    }

    /// Returns true if `self` is `other` or nested inside it.
    #[must_use]
    pub fn is_within(self, other: Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.scope_chain().any(|d| d.index == other.index)
    }

    fn node(self) -> &'t Node<'a> {
        &self.tree.nodes[self.index]
    }
}

impl std::fmt::Debug for Declaration<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Declaration")
            .field("kind", &self.kind())
            .field("full_name", &self.full_name())
            .field("index", &self.index)
            .finish()
    }
}
