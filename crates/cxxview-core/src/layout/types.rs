//! Explicit type layouts.

use std::rc::Rc;

use crate::host::{CompilerType, FieldInfo, ScalarEncoding, TemplateArgument, TypeRef};
use crate::types::ArchitectureProfile;

/// What kind of type a [`TypeLayout`] describes
#[derive(Debug, Clone)]
pub enum LayoutKind
{
    /// Integer, floating point, `bool` or character
    Scalar(ScalarEncoding),
    /// Pointer to the given type
    Pointer(TypeRef),
    /// Aggregate with data members
    Struct(Vec<FieldInfo>),
}

/// A type described by hand: name, size, alignment and members
///
/// ## Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use cxxview_core::host::CompilerType;
/// use cxxview_core::layout::TypeLayout;
/// use cxxview_core::types::ArchitectureProfile;
///
/// let arch = ArchitectureProfile::lp64();
/// let key = Rc::new(TypeLayout::primitive("char", &arch).unwrap());
/// let value = Rc::new(TypeLayout::primitive("double", &arch).unwrap());
///
/// let pair = TypeLayout::pair(&key, &value);
/// assert_eq!(pair.byte_size(), Some(16));
/// assert_eq!(pair.field_at_index(1).unwrap().offset, 8);
/// ```
#[derive(Debug, Clone)]
pub struct TypeLayout
{
    name: String,
    byte_size: u64,
    alignment: u64,
    kind: LayoutKind,
    template_arguments: Vec<TemplateArgument>,
}

impl TypeLayout
{
    /// A scalar of `byte_size` bytes, naturally aligned
    pub fn scalar(name: impl Into<String>, byte_size: u64, encoding: ScalarEncoding) -> Self
    {
        Self {
            name: name.into(),
            byte_size,
            alignment: byte_size.max(1),
            kind: LayoutKind::Scalar(encoding),
            template_arguments: Vec::new(),
        }
    }

    /// A pointer to `pointee` on a target described by `arch`
    pub fn pointer_to(pointee: TypeRef, arch: &ArchitectureProfile) -> Self
    {
        Self {
            name: format!("{} *", pointee.name()),
            byte_size: arch.pointer_size(),
            alignment: arch.pointer_size(),
            kind: LayoutKind::Pointer(pointee),
            template_arguments: Vec::new(),
        }
    }

    /// An aggregate with explicit member offsets
    pub fn record(name: impl Into<String>, byte_size: u64, alignment: u64, fields: Vec<FieldInfo>) -> Self
    {
        Self {
            name: name.into(),
            byte_size,
            alignment: alignment.max(1),
            kind: LayoutKind::Struct(fields),
            template_arguments: Vec::new(),
        }
    }

    /// An aggregate whose size is not known to the host
    pub fn opaque(name: impl Into<String>) -> Self
    {
        Self::record(name, 0, 1, Vec::new())
    }

    /// `std::pair<const K, V>` laid out with the usual C++ alignment rules
    pub fn pair(key: &Rc<TypeLayout>, value: &Rc<TypeLayout>) -> Self
    {
        let second_offset = align_up(key.byte_size, value.alignment);
        let alignment = key.alignment.max(value.alignment);
        let byte_size = align_up(second_offset + value.byte_size, alignment);

        let key_ref: TypeRef = key.clone();
        let value_ref: TypeRef = value.clone();
        let fields = vec![
            FieldInfo {
                name: "first".to_owned(),
                offset: 0,
                ty: key_ref.clone(),
            },
            FieldInfo {
                name: "second".to_owned(),
                offset: second_offset,
                ty: value_ref.clone(),
            },
        ];

        Self::record(format!("std::pair<const {}, {}>", key.name, value.name), byte_size, alignment, fields)
            .with_template_argument(TemplateArgument::of_type(key_ref))
            .with_template_argument(TemplateArgument::of_type(value_ref))
    }

    /// Append a template argument
    #[must_use]
    pub fn with_template_argument(mut self, argument: TemplateArgument) -> Self
    {
        self.template_arguments.push(argument);
        self
    }

    /// Alignment requirement in bytes
    pub fn alignment(&self) -> u64
    {
        self.alignment
    }

    /// Kind and members
    pub fn kind(&self) -> &LayoutKind
    {
        &self.kind
    }

    /// Look up a scalar type by its C++ name (`int`, `unsigned long`, `double`, ...)
    ///
    /// Fixed-width spellings (`i32`, `u64`, `f32`, ...) are accepted too.
    /// `long` follows the target: 8 bytes on LP64, 4 bytes on ILP32 and LLP64.
    pub fn primitive(name: &str, arch: &ArchitectureProfile) -> Option<Self>
    {
        let long = if arch.pointer_size() == 8 && arch.wchar_bit_size() != Some(16) {
            8
        } else {
            4
        };
        let wchar = arch.wchar_bit_size().map_or(4, |bits| u64::from(bits / 8).max(1));

        let (canonical, size, encoding) = match name {
            "bool" => ("bool", 1, ScalarEncoding::Bool),
            "char" => ("char", 1, ScalarEncoding::Char),
            "wchar_t" => ("wchar_t", wchar, ScalarEncoding::Char),
            "char16_t" => ("char16_t", 2, ScalarEncoding::Char),
            "char32_t" => ("char32_t", 4, ScalarEncoding::Char),
            "signed char" | "i8" => ("signed char", 1, ScalarEncoding::Signed),
            "unsigned char" | "u8" => ("unsigned char", 1, ScalarEncoding::Unsigned),
            "short" | "i16" => ("short", 2, ScalarEncoding::Signed),
            "unsigned short" | "u16" => ("unsigned short", 2, ScalarEncoding::Unsigned),
            "int" | "i32" => ("int", 4, ScalarEncoding::Signed),
            "unsigned int" | "u32" => ("unsigned int", 4, ScalarEncoding::Unsigned),
            "long" => ("long", long, ScalarEncoding::Signed),
            "unsigned long" => ("unsigned long", long, ScalarEncoding::Unsigned),
            "long long" | "i64" => ("long long", 8, ScalarEncoding::Signed),
            "unsigned long long" | "u64" => ("unsigned long long", 8, ScalarEncoding::Unsigned),
            "float" | "f32" => ("float", 4, ScalarEncoding::Float),
            "double" | "f64" => ("double", 8, ScalarEncoding::Float),
            _ => return None,
        };
        Some(Self::scalar(canonical, size, encoding))
    }
}

impl CompilerType for TypeLayout
{
    fn name(&self) -> String
    {
        self.name.clone()
    }

    fn byte_size(&self) -> Option<u64>
    {
        (self.byte_size > 0).then_some(self.byte_size)
    }

    fn num_template_arguments(&self) -> usize
    {
        self.template_arguments.len()
    }

    fn template_argument(&self, index: usize) -> Option<TemplateArgument>
    {
        self.template_arguments.get(index).cloned()
    }

    fn pointee_type(&self) -> Option<TypeRef>
    {
        match &self.kind {
            LayoutKind::Pointer(pointee) => Some(pointee.clone()),
            _ => None,
        }
    }

    fn num_fields(&self) -> usize
    {
        match &self.kind {
            LayoutKind::Struct(fields) => fields.len(),
            _ => 0,
        }
    }

    fn field_at_index(&self, index: usize) -> Option<FieldInfo>
    {
        match &self.kind {
            LayoutKind::Struct(fields) => fields.get(index).cloned(),
            _ => None,
        }
    }

    fn encoding(&self) -> ScalarEncoding
    {
        match &self.kind {
            LayoutKind::Scalar(encoding) => *encoding,
            LayoutKind::Pointer(_) => ScalarEncoding::Pointer,
            LayoutKind::Struct(_) => ScalarEncoding::None,
        }
    }
}

pub(crate) const fn align_up(value: u64, alignment: u64) -> u64
{
    if alignment <= 1 {
        value
    } else {
        value.div_ceil(alignment) * alignment
    }
}
