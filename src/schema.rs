//! Accessor registry mapping property names to typed field readers.
//!
//! A [`Schema`] is built once per record type and handed to the compiler
//! as a capability; the compiler never inspects record types directly.

use crate::value::{FieldType, FieldValue};
use std::collections::HashMap;
use std::sync::Arc;

type Reader<R> = Arc<dyn Fn(&R) -> FieldValue + Send + Sync>;

/// A typed reader for one property of `R`: its semantic type, whether it
/// may hold null, and the closure extracting its current value.
pub struct FieldAccessor<R> {
    ty: FieldType,
    nullable: bool,
    read: Reader<R>,
}

impl<R> FieldAccessor<R> {
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn read(&self, record: &R) -> FieldValue {
        (self.read)(record)
    }

    pub(crate) fn reader(&self) -> Reader<R> {
        self.read.clone()
    }
}

impl<R> Clone for FieldAccessor<R> {
    fn clone(&self) -> Self {
        Self { ty: self.ty, nullable: self.nullable, read: self.read.clone() }
    }
}

impl<R> std::fmt::Debug for FieldAccessor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("ty", &self.ty)
            .field("nullable", &self.nullable)
            .finish_non_exhaustive()
    }
}

/// Property-name → accessor registry for a record type.
pub struct Schema<R> {
    fields: HashMap<String, FieldAccessor<R>>,
}

impl<R> Clone for Schema<R> {
    fn clone(&self) -> Self {
        Self { fields: self.fields.clone() }
    }
}

impl<R> Default for Schema<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema").field("fields", &self.fields).finish()
    }
}

impl<R> Schema<R> {
    pub fn new() -> Self {
        Self { fields: HashMap::new() }
    }

    /// Register a non-nullable field. The reader must never return
    /// [`FieldValue::Null`] for such a field.
    pub fn field(
        self,
        name: impl Into<String>,
        ty: FieldType,
        read: impl Fn(&R) -> FieldValue + Send + Sync + 'static,
    ) -> Self {
        self.insert(name, ty, false, read)
    }

    /// Register a field whose reader may return [`FieldValue::Null`].
    pub fn nullable_field(
        self,
        name: impl Into<String>,
        ty: FieldType,
        read: impl Fn(&R) -> FieldValue + Send + Sync + 'static,
    ) -> Self {
        self.insert(name, ty, true, read)
    }

    fn insert(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        nullable: bool,
        read: impl Fn(&R) -> FieldValue + Send + Sync + 'static,
    ) -> Self {
        self.fields.insert(name.into(), FieldAccessor { ty, nullable, read: Arc::new(read) });
        self
    }

    pub fn accessor(&self, name: &str) -> Option<&FieldAccessor<R>> {
        self.fields.get(name)
    }
}

/// Record types that publish an accessor registry, enabling
/// [`FilterRule::compile`](crate::rules::FilterRule::compile).
pub trait Filterable: Sized {
    fn schema() -> Schema<Self>;
}
