//! Type-name based formatter lookup.
//!
//! The host decides which decoder handles a value by looking at its type
//! name. [`FormatterRegistry::libstdcpp`] carries the registrations for the
//! libstdc++ types this crate understands; hosts with other naming schemes
//! can build their own with [`FormatterRegistry::add_summary`] and
//! [`FormatterRegistry::add_synthetic`].

use std::fmt;

use regex::Regex;
use tracing::{trace, warn};

use super::{string_summary, wstring_summary, SummaryOptions, SyntheticChildren};
use crate::error::{FormatterError, FormatterResult};
use crate::host::{ValueObject, ValueRef};

/// Which summary provider renders a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryKind
{
    /// [`string_summary`]
    String,
    /// [`wstring_summary`]
    WString,
}

/// Which synthetic children provider expands a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticKind
{
    /// Red-black tree iterator
    MapIterator,
    /// Pointer-wrapping contiguous iterator
    VectorIterator,
}

/// How a registration matches type names
#[derive(Debug, Clone)]
enum TypeMatcher
{
    Exact(String),
    Regex(Regex),
}

impl TypeMatcher
{
    fn matches(&self, type_name: &str) -> bool
    {
        match self {
            TypeMatcher::Exact(name) => name == type_name,
            TypeMatcher::Regex(regex) => regex.is_match(type_name),
        }
    }
}

/// Ordered list of type matchers; the first match wins
#[derive(Debug, Clone, Default)]
pub struct FormatterRegistry
{
    summaries: Vec<(TypeMatcher, SummaryKind)>,
    synthetics: Vec<(TypeMatcher, SyntheticKind)>,
}

const LIBSTDCPP_STRINGS: &[&str] = &[
    "std::string",
    "std::basic_string<char>",
    "std::basic_string<char,std::char_traits<char>,std::allocator<char> >",
    "std::basic_string<char, std::char_traits<char>, std::allocator<char> >",
    "std::__cxx11::string",
    "std::__cxx11::basic_string<char>",
    "std::__cxx11::basic_string<char,std::char_traits<char>,std::allocator<char> >",
    "std::__cxx11::basic_string<char, std::char_traits<char>, std::allocator<char> >",
];

const LIBSTDCPP_WSTRINGS: &[&str] = &[
    "std::wstring",
    "std::basic_string<wchar_t>",
    "std::basic_string<wchar_t,std::char_traits<wchar_t>,std::allocator<wchar_t> >",
    "std::basic_string<wchar_t, std::char_traits<wchar_t>, std::allocator<wchar_t> >",
    "std::__cxx11::wstring",
    "std::__cxx11::basic_string<wchar_t>",
    "std::__cxx11::basic_string<wchar_t,std::char_traits<wchar_t>,std::allocator<wchar_t> >",
    "std::__cxx11::basic_string<wchar_t, std::char_traits<wchar_t>, std::allocator<wchar_t> >",
];

const LIBSTDCPP_MAP_ITERATORS: &[&str] = &["^std::_Rb_tree_iterator<.+>$", "^std::_Rb_tree_const_iterator<.+>$"];

const LIBSTDCPP_VECTOR_ITERATORS: &[&str] = &["^__gnu_cxx::__normal_iterator<.+>$"];

impl FormatterRegistry
{
    /// An empty registry
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Registrations for the GNU C++ standard library
    #[must_use]
    pub fn libstdcpp() -> Self
    {
        let mut registry = Self::new();
        for &name in LIBSTDCPP_STRINGS {
            registry.add_summary_exact(name, SummaryKind::String);
        }
        for &name in LIBSTDCPP_WSTRINGS {
            registry.add_summary_exact(name, SummaryKind::WString);
        }
        for &pattern in LIBSTDCPP_MAP_ITERATORS {
            registry.push_synthetic_regex(pattern, SyntheticKind::MapIterator);
        }
        for &pattern in LIBSTDCPP_VECTOR_ITERATORS {
            registry.push_synthetic_regex(pattern, SyntheticKind::VectorIterator);
        }
        registry
    }

    /// Register a summary provider for exactly `type_name`
    pub fn add_summary_exact(&mut self, type_name: &str, kind: SummaryKind)
    {
        self.summaries.push((TypeMatcher::Exact(type_name.to_owned()), kind));
    }

    /// Register a summary provider for type names matching `pattern`
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` if `pattern` is not a valid regular expression.
    pub fn add_summary(&mut self, pattern: &str, kind: SummaryKind) -> FormatterResult<()>
    {
        self.summaries.push((TypeMatcher::Regex(compile(pattern)?), kind));
        Ok(())
    }

    /// Register a synthetic children provider for type names matching `pattern`
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` if `pattern` is not a valid regular expression.
    pub fn add_synthetic(&mut self, pattern: &str, kind: SyntheticKind) -> FormatterResult<()>
    {
        self.synthetics.push((TypeMatcher::Regex(compile(pattern)?), kind));
        Ok(())
    }

    fn push_synthetic_regex(&mut self, pattern: &'static str, kind: SyntheticKind)
    {
        match Regex::new(pattern) {
            Ok(regex) => self.synthetics.push((TypeMatcher::Regex(regex), kind)),
            Err(err) => warn!(pattern, ?kind, "built-in type pattern does not compile: {err}"),
        }
    }

    /// Summary provider for `type_name`, if any
    pub fn summary_kind(&self, type_name: &str) -> Option<SummaryKind>
    {
        self.summaries
            .iter()
            .find(|(matcher, _)| matcher.matches(type_name))
            .map(|(_, kind)| *kind)
    }

    /// Synthetic children provider for `type_name`, if any
    pub fn synthetic_kind(&self, type_name: &str) -> Option<SyntheticKind>
    {
        self.synthetics
            .iter()
            .find(|(matcher, _)| matcher.matches(type_name))
            .map(|(_, kind)| *kind)
    }

    /// Instantiate the synthetic children provider registered for `value`'s type
    ///
    /// The returned provider has already been refreshed once.
    pub fn synthetic_for(&self, value: &ValueRef) -> Option<SyntheticChildren>
    {
        let type_name = value.compiler_type().name();
        let kind = self.synthetic_kind(&type_name)?;
        trace!(value = value.name(), %type_name, ?kind, "binding synthetic children");

        Some(SyntheticChildren::new(kind, value))
    }

    /// Render the summary registered for `value`'s type
    ///
    /// Returns `None` when no provider is registered, otherwise the
    /// provider's own result.
    pub fn summarize(&self, value: &dyn ValueObject, stream: &mut dyn fmt::Write, options: &SummaryOptions) -> Option<bool>
    {
        let type_name = value.compiler_type().name();
        let kind = self.summary_kind(&type_name)?;
        trace!(value = value.name(), %type_name, ?kind, "summarizing");

        Some(match kind {
            SummaryKind::String => string_summary(value, stream, options),
            SummaryKind::WString => wstring_summary(value, stream, options),
        })
    }
}

fn compile(pattern: &str) -> FormatterResult<Regex>
{
    Regex::new(pattern).map_err(|err| FormatterError::InvalidArgument(format!("bad type pattern {pattern:?}: {err}")))
}
