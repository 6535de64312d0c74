//! Descriptors of the engine members to synthesize, spelled with engine
//! type names exactly as the extension API reports them.
//!
//! With the `serde` feature these deserialize from JSON:
//!
//! ```json
//! {
//!   "name": "SetPosition",
//!   "class": "Node2D",
//!   "kind": "method_bind",
//!   "hash": 743155724,
//!   "arguments": [
//!     { "name": "position", "type": "Vector2" },
//!     { "name": "keep_offsets", "type": "bool", "default_value": "false" }
//!   ]
//! }
//! ```

/// An engine type reference: name plus optional metadata (`int` + `uint8`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeRef {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub meta: Option<String>,
}

impl TypeRef {
    pub fn new(ty: impl Into<String>) -> Self {
        Self { ty: ty.into(), meta: None }
    }

    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }
}

/// A member argument.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArgumentDescriptor {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub ty: TypeRef,
    /// Engine default literal, e.g. `Vector2(0, 0)`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub default_value: Option<String>,
}

impl ArgumentDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: None,
        }
    }

    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default_value = Some(literal.into());
        self
    }
}

/// What a member calls into, which picks its call strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum MemberKind {
    /// An engine class method, called through its method bind.
    MethodBind,
    /// A global utility function.
    UtilityFunction,
    /// A method of a built-in type (`class` is the built-in).
    BuiltInMethod,
    /// The `index`th constructor of the built-in `class`.
    BuiltInConstructor { index: usize },
    /// The destructor of the built-in `class`.
    BuiltInDestructor,
    /// An operator of the built-in `class`. `right_type` is absent for
    /// unary operators.
    BuiltInOperator {
        operator: String,
        #[cfg_attr(feature = "serde", serde(default))]
        right_type: Option<String>,
    },
}

/// One engine member to synthesize a body for.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberDescriptor {
    /// Managed (already cased) method name.
    pub name: String,
    /// Engine name, when it differs from `name` (`get_name` for `GetName`).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub engine_name: Option<String>,
    /// Declaring engine class or built-in type. Absent for utility functions.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub class: Option<String>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: MemberKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hash: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_static: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_vararg: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub arguments: Vec<ArgumentDescriptor>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub return_value: Option<TypeRef>,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            engine_name: None,
            class: None,
            kind,
            hash: 0,
            is_static: false,
            is_vararg: false,
            arguments: Vec::new(),
            return_value: None,
        }
    }

    pub fn with_engine_name(mut self, engine_name: impl Into<String>) -> Self {
        self.engine_name = Some(engine_name.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_hash(mut self, hash: i64) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_vararg(mut self, is_vararg: bool) -> Self {
        self.is_vararg = is_vararg;
        self
    }

    pub fn with_argument(mut self, argument: ArgumentDescriptor) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.return_value = Some(ty);
        self
    }

    /// The engine-side name, falling back to the managed one.
    pub fn engine_name(&self) -> &str {
        self.engine_name.as_deref().unwrap_or(&self.name)
    }
}
