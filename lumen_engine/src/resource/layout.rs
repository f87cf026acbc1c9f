/// Interleaved element layout of a buffer.
///
/// A `Layout` is an ordered list of attributes (position, normal, color...).
/// `finalize` walks the attributes in declaration order, assigns each one a
/// byte offset and accumulates the stride:
///
/// ```text
/// Position3D (3 x 4 bytes)  offset 0
/// Normal     (3 x 4 bytes)  offset 12
///                           stride 24
/// ```
///
/// A stride of 0 is legal and means the buffer has no interleaved layout
/// (raw index data, for example).

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;

// ===== ATTRIBUTE KIND =====

/// Semantic kind of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position2D,
    Position3D,
    Normal,
    Color,
    TextureCoord,
    Uniform,
    Storage,
}

impl AttributeKind {
    /// Number of scalar components of this kind
    pub fn component_count(&self) -> u32 {
        match self {
            AttributeKind::Position2D => 2,
            AttributeKind::Position3D => 3,
            AttributeKind::Normal => 3,
            AttributeKind::Color => 4,
            AttributeKind::TextureCoord => 2,
            AttributeKind::Uniform => 1,
            AttributeKind::Storage => 1,
        }
    }
}

// ===== ATTRIBUTE DESCRIPTOR =====

/// One attribute of a layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    kind: AttributeKind,
    name: String,
    /// Byte offset inside one element, assigned by `Layout::finalize`
    offset: u64,
    /// Size of one component in bytes
    element_size: u64,
    /// Component size requested at construction; `None` takes the size
    /// passed to `Layout::finalize`
    requested_size: Option<u64>,
}

impl AttributeDescriptor {
    /// Attribute whose component size is decided by the buffer element type
    pub fn new(kind: AttributeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            offset: 0,
            element_size: 0,
            requested_size: None,
        }
    }

    /// Attribute with an explicit component size in bytes
    ///
    /// A size of 0 behaves like `new`.
    pub fn with_element_size(kind: AttributeKind, name: impl Into<String>, element_size: u64) -> Self {
        let requested_size = (element_size > 0).then_some(element_size);
        Self {
            kind,
            name: name.into(),
            offset: 0,
            element_size,
            requested_size,
        }
    }

    pub fn kind(&self) -> AttributeKind { self.kind }

    pub fn name(&self) -> &str { &self.name }

    /// Byte offset inside one element (0 before finalize)
    pub fn offset(&self) -> u64 { self.offset }

    /// Size of one component in bytes
    pub fn element_size(&self) -> u64 { self.element_size }

    /// Total size of the attribute in bytes
    pub fn byte_size(&self) -> u64 {
        self.element_size * self.kind.component_count() as u64
    }
}

// ===== LAYOUT =====

/// Ordered list of attributes with the resulting stride
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    attributes: Vec<AttributeDescriptor>,
    attribute_names: FxHashMap<String, usize>,
    stride: u64,
}

impl Layout {
    /// Empty layout (stride 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a layout from attributes in declaration order
    ///
    /// Fails on duplicate attribute names.
    pub fn from_attributes(attributes: impl IntoIterator<Item = AttributeDescriptor>) -> Result<Self> {
        let mut layout = Self::new();
        for attribute in attributes {
            layout.push(attribute)?;
        }
        Ok(layout)
    }

    /// Append an attribute
    ///
    /// The layout must be finalized again before its offsets and stride are
    /// meaningful.
    pub fn push(&mut self, attribute: AttributeDescriptor) -> Result<()> {
        if self.attribute_names.contains_key(&attribute.name) {
            engine_bail!("lumen::Layout", "Duplicate attribute name '{}'", attribute.name);
        }
        self.attribute_names.insert(attribute.name.clone(), self.attributes.len());
        self.attributes.push(attribute);
        Ok(())
    }

    /// Assign offsets and compute the stride
    ///
    /// Attributes without an explicit component size take
    /// `element_byte_size`. Offsets and stride are recomputed from scratch,
    /// so finalizing twice gives the same result as finalizing once.
    pub fn finalize(&mut self, element_byte_size: u64) {
        let mut offset = 0;
        for attribute in &mut self.attributes {
            attribute.element_size = attribute.requested_size.unwrap_or(element_byte_size);
            attribute.offset = offset;
            offset += attribute.byte_size();
        }
        self.stride = offset;
    }

    /// Bytes per element (sum of attribute sizes)
    pub fn stride(&self) -> u64 { self.stride }

    pub fn attributes(&self) -> &[AttributeDescriptor] { &self.attributes }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeDescriptor> {
        self.attributes.iter()
    }

    /// Find an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attribute_names.get(name).map(|&index| &self.attributes[index])
    }

    pub fn len(&self) -> usize { self.attributes.len() }

    pub fn is_empty(&self) -> bool { self.attributes.is_empty() }

    /// Number of whole elements fitting in `byte_size` (0 when stride is 0)
    pub fn element_count(&self, byte_size: u64) -> u64 {
        if self.stride == 0 {
            0
        } else {
            byte_size / self.stride
        }
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a AttributeDescriptor;
    type IntoIter = std::slice::Iter<'a, AttributeDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
