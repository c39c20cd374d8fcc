//! Binding keys, type tokens and search specifications.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime descriptor for one of the type slots of a [`Key`].
///
/// Tokens are built at registration time and compared structurally, so two
/// tokens for the same Rust type are always equal no matter where they were
/// created.
///
/// # Variants
///
/// - **Any**: no constraint. As a binding's context type it means "no
///   context"; as a binding's argument type it accepts any argument.
/// - **Concrete**: a fully known Rust type.
/// - **Parameterized**: a generic type described by its raw name and type
///   arguments, for callers that assemble tokens by hand.
///
/// # Examples
///
/// ```rust
/// use ferrous_bind::TypeToken;
///
/// let token = TypeToken::of::<Vec<String>>();
/// assert_eq!(token.simple_name(), "Vec<String>");
/// assert_eq!(token, TypeToken::of::<Vec<String>>());
/// assert_ne!(token, TypeToken::of::<Vec<u8>>());
///
/// let manual = TypeToken::parameterized("alloc::vec::Vec", vec![TypeToken::of::<u8>()]);
/// assert_eq!(manual.simple_name(), "Vec<u8>");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeToken {
    /// Wildcard / absent type
    Any,
    /// Concrete type with TypeId and name for diagnostics
    Concrete { id: TypeId, name: &'static str },
    /// Generic type with explicit type arguments
    Parameterized { raw: &'static str, args: Arc<[TypeToken]> },
}

impl TypeToken {
    /// Token for the Rust type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeToken::Concrete {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Token for `()`, the argument type of bindings that take no argument.
    #[inline]
    pub fn unit() -> Self {
        Self::of::<()>()
    }

    pub fn parameterized(raw: &'static str, args: impl Into<Arc<[TypeToken]>>) -> Self {
        TypeToken::Parameterized { raw, args: args.into() }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeToken::Any)
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, TypeToken::Concrete { id, .. } if *id == TypeId::of::<()>())
    }

    /// Whether a binding declared with this token accepts a request for `requested`.
    ///
    /// Only the binding side acts as a wildcard.
    #[inline]
    pub fn accepts(&self, requested: &TypeToken) -> bool {
        self.is_any() || self == requested
    }

    /// Complete type path, e.g. `alloc::vec::Vec<alloc::string::String>`.
    pub fn full_name(&self) -> String {
        match self {
            TypeToken::Any => "Any".to_string(),
            TypeToken::Concrete { name, .. } => (*name).to_string(),
            TypeToken::Parameterized { raw, args } => {
                let args: Vec<String> = args.iter().map(TypeToken::full_name).collect();
                format!("{}<{}>", raw, args.join(", "))
            }
        }
    }

    /// Type name with module paths removed, e.g. `Vec<String>`.
    pub fn simple_name(&self) -> String {
        strip_paths(&self.full_name())
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Drops every `segment::` prefix, keeping generic structure intact.
fn strip_paths(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
        } else {
            out.push(c);
            if !(c.is_alphanumeric() || c == '_') {
                segment_start = out.len();
            }
        }
    }
    out
}

/// Object-safe equality and hashing for tag values.
pub trait TagValue: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn TagValue) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T> TagValue for T
where
    T: Any + Send + Sync + fmt::Debug + Eq + Hash,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn TagValue) -> bool {
        other.as_any().downcast_ref::<T>().map_or(false, |o| self == o)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// Optional discriminator distinguishing several bindings of the same type.
///
/// Tags compare by value: `Tag::from("db")` equals `Tag::from(String::from("db"))`.
/// String slices are stored as owned `String`s so both spellings meet.
///
/// ```rust
/// use ferrous_bind::Tag;
///
/// assert_eq!(Tag::from("primary"), Tag::from("primary".to_string()));
/// assert_ne!(Tag::from("primary"), Tag::new(1u8));
/// ```
#[derive(Clone)]
pub struct Tag(Arc<dyn TagValue>);

impl Tag {
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync + fmt::Debug + Eq + Hash,
    {
        Tag(Arc::new(value))
    }

    /// Borrows the tag value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::new(value.to_string())
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::new(value)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(&*other.0)
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Identifier of a binding: context type, argument type, return type and tag.
///
/// Equality and hashing are structural over all four fields.
///
/// # Examples
///
/// ```rust
/// use ferrous_bind::{Key, Tag};
///
/// struct Database;
///
/// let key = Key::of::<Database>();
/// assert_eq!(key.bind_description(), "bind<Database>()");
/// assert_eq!(key.description(), "bind<Database>() with ? { ? }");
///
/// let tagged = Key::of::<Database>().tagged("replica");
/// assert_eq!(tagged.bind_description(), "bind<Database>(tag = \"replica\")");
/// assert_ne!(key, tagged);
///
/// let with_arg = Key::with_argument::<String, Database>();
/// assert_eq!(with_arg.description(), "bind<Database>() with ? { String -> ? }");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub context_type: TypeToken,
    pub argument_type: TypeToken,
    pub return_type: TypeToken,
    pub tag: Option<Tag>,
}

impl Key {
    pub fn new(
        context_type: TypeToken,
        argument_type: TypeToken,
        return_type: TypeToken,
        tag: Option<Tag>,
    ) -> Self {
        Self { context_type, argument_type, return_type, tag }
    }

    /// Key for a `T` taking no argument and no context.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeToken::Any, TypeToken::unit(), TypeToken::of::<T>(), None)
    }

    /// Key for a `T` built from an argument of type `A`.
    #[inline]
    pub fn with_argument<A: 'static, T: ?Sized + 'static>() -> Self {
        Self::new(TypeToken::Any, TypeToken::of::<A>(), TypeToken::of::<T>(), None)
    }

    pub fn tagged(mut self, tag: impl Into<Tag>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Restricts the key to the context type `C`.
    pub fn in_context<C: 'static>(self) -> Self {
        self.with_context_type(TypeToken::of::<C>())
    }

    pub fn with_context_type(mut self, context_type: TypeToken) -> Self {
        self.context_type = context_type;
        self
    }

    /// `bind<Type>()` or `bind<Type>(tag = ...)` with short type names.
    pub fn bind_description(&self) -> String {
        self.bind_display(TypeToken::simple_name)
    }

    /// Same as [`bind_description`](Self::bind_description) with full type paths.
    pub fn bind_full_description(&self) -> String {
        self.bind_display(TypeToken::full_name)
    }

    /// Describes the whole key, including context and argument types.
    pub fn description(&self) -> String {
        self.describe(TypeToken::simple_name)
    }

    pub fn full_description(&self) -> String {
        self.describe(TypeToken::full_name)
    }

    fn bind_display(&self, disp: fn(&TypeToken) -> String) -> String {
        match &self.tag {
            Some(tag) => format!("bind<{}>(tag = {:?})", disp(&self.return_type), tag),
            None => format!("bind<{}>()", disp(&self.return_type)),
        }
    }

    fn describe(&self, disp: fn(&TypeToken) -> String) -> String {
        let mut s = self.bind_display(disp);
        s.push_str(" with ");
        if !self.context_type.is_any() {
            s.push_str(&format!("?<{}>().", disp(&self.context_type)));
        }
        s.push_str("? { ");
        if !self.argument_type.is_unit() {
            s.push_str(&disp(&self.argument_type));
            s.push_str(" -> ");
        }
        s.push_str("? }");
        s
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.full_description())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Partial key used to search the binding tree. `None` fields are wildcards.
///
/// `tag: Some(None)` searches for untagged bindings only, `tag: None` ignores tags.
///
/// ```rust
/// use ferrous_bind::{Key, SearchSpecs, TypeToken};
///
/// struct Mailer;
///
/// let search = SearchSpecs::for_type(TypeToken::of::<Mailer>());
/// assert!(search.matches(&Key::of::<Mailer>()));
/// assert!(search.matches(&Key::of::<Mailer>().tagged("smtp")));
/// assert!(!search.matches(&Key::of::<String>()));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SearchSpecs {
    pub context_type: Option<TypeToken>,
    pub argument_type: Option<TypeToken>,
    pub return_type: Option<TypeToken>,
    pub tag: Option<Option<Tag>>,
}

impl SearchSpecs {
    /// Spec matching every binding that returns `return_type`.
    pub fn for_type(return_type: TypeToken) -> Self {
        Self { return_type: Some(return_type), ..Self::default() }
    }

    /// True if every non-wildcard field equals the corresponding field of `key`.
    pub fn matches(&self, key: &Key) -> bool {
        self.context_type.as_ref().map_or(true, |t| *t == key.context_type)
            && self.argument_type.as_ref().map_or(true, |t| *t == key.argument_type)
            && self.return_type.as_ref().map_or(true, |t| *t == key.return_type)
            && self.tag.as_ref().map_or(true, |t| *t == key.tag)
    }
}

impl From<&Key> for SearchSpecs {
    fn from(key: &Key) -> Self {
        Self {
            context_type: Some(key.context_type.clone()),
            argument_type: Some(key.argument_type.clone()),
            return_type: Some(key.return_type.clone()),
            tag: Some(key.tag.clone()),
        }
    }
}
