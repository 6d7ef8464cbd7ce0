// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type registry for message definitions.
//!
//! A [`TypeRegistry`] accumulates every message type seen while reading a
//! bag: the builtin types in [`crate::schema::builtin_types`], plus whatever
//! `.msg`/`.idl` text the bag itself carries (rosbag1 connection headers,
//! rosbag2 `metadata.yaml` topic entries). Registration is atomic and
//! all-or-nothing — either every type in a schema is new or matches its
//! existing definition, or none of them are committed, and a
//! [`crate::CodecError::TypeConflict`] is returned.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::{CodecError, Result};
use crate::schema::{builtin_types, MessageSchema, MessageType};

/// Registry of message type definitions, keyed by fully-qualified name.
pub struct TypeRegistry {
    inner: RwLock<HashMap<String, MessageType>>,
}

impl TypeRegistry {
    /// Create an empty registry with no builtin types preloaded.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry preloaded with the curated builtin ROS2 types.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for msg_type in builtin_types::get_all() {
            // Builtins never conflict with each other; insert directly.
            registry
                .inner
                .write()
                .expect("registry lock poisoned")
                .insert(msg_type.name.clone(), msg_type);
        }
        registry
    }

    fn lock_poisoned(e: impl std::fmt::Display) -> CodecError {
        CodecError::parse("type registry", format!("lock poisoned: {e}"))
    }

    /// Register every type carried by `schema`, atomically.
    ///
    /// If any type in `schema` already exists in the registry under the
    /// same name with a *different* definition, no types from `schema` are
    /// committed and a [`CodecError::TypeConflict`] names the offending
    /// type. Re-registering an identical definition is a no-op success.
    pub fn register_schema(&self, schema: &MessageSchema) -> Result<()> {
        let inner = self.inner.read().map_err(Self::lock_poisoned)?;
        for (name, msg_type) in &schema.types {
            if let Some(existing) = inner.get(name) {
                if existing != msg_type {
                    return Err(CodecError::type_conflict(
                        name.clone(),
                        "re-registration does not match the existing definition",
                    ));
                }
            }
        }
        drop(inner);

        let mut inner = self.inner.write().map_err(Self::lock_poisoned)?;
        for (name, msg_type) in &schema.types {
            inner.entry(name.clone()).or_insert_with(|| msg_type.clone());
        }
        Ok(())
    }

    /// Register a single type by name, atomically.
    pub fn register_type(&self, name: impl Into<String>, msg_type: MessageType) -> Result<()> {
        let name = name.into();
        let mut inner = self.inner.write().map_err(Self::lock_poisoned)?;
        if let Some(existing) = inner.get(&name) {
            if existing != &msg_type {
                return Err(CodecError::type_conflict(
                    name,
                    "re-registration does not match the existing definition",
                ));
            }
            return Ok(());
        }
        inner.insert(name, msg_type);
        Ok(())
    }

    /// Look up a type by exact name.
    pub fn get(&self, name: &str) -> Result<Option<MessageType>> {
        let inner = self.inner.read().map_err(Self::lock_poisoned)?;
        Ok(inner.get(name).cloned())
    }

    /// Look up a type, trying the same name-variant resolution as
    /// [`MessageSchema::get_type_variants`].
    pub fn get_variants(&self, name: &str) -> Result<Option<MessageType>> {
        let inner = self.inner.read().map_err(Self::lock_poisoned)?;

        if let Some(t) = inner.get(name) {
            return Ok(Some(t.clone()));
        }

        let normalized = name.replace("::", "/");
        if let Some(t) = inner.get(&normalized) {
            return Ok(Some(t.clone()));
        }

        if !normalized.contains("/msg/") {
            let with_msg = normalized.replace('/', "/msg/");
            if let Some(t) = inner.get(&with_msg) {
                return Ok(Some(t.clone()));
            }
        }

        if normalized.contains("/msg/") {
            let without_msg = normalized.replace("/msg/", "/");
            if let Some(t) = inner.get(&without_msg) {
                return Ok(Some(t.clone()));
            }
        }

        if !normalized.contains('/') {
            for (full_name, msg_type) in inner.iter() {
                if full_name.ends_with(&format!("/{normalized}"))
                    || full_name.ends_with(&format!("/msg/{normalized}"))
                {
                    return Ok(Some(msg_type.clone()));
                }
            }
        }

        Ok(None)
    }

    /// Check whether a type is registered under this exact name.
    pub fn contains(&self, name: &str) -> Result<bool> {
        let inner = self.inner.read().map_err(Self::lock_poisoned)?;
        Ok(inner.contains_key(name))
    }

    /// All registered type names.
    pub fn names(&self) -> Result<Vec<String>> {
        let inner = self.inner.read().map_err(Self::lock_poisoned)?;
        Ok(inner.keys().cloned().collect())
    }

    /// Number of registered types.
    pub fn len(&self) -> Result<usize> {
        let inner = self.inner.read().map_err(Self::lock_poisoned)?;
        Ok(inner.len())
    }

    /// Whether the registry holds no types.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

static GLOBAL_REGISTRY: std::sync::OnceLock<TypeRegistry> = std::sync::OnceLock::new();

/// The process-wide registry, preloaded with builtin types on first use.
pub fn global_registry() -> &'static TypeRegistry {
    GLOBAL_REGISTRY.get_or_init(TypeRegistry::with_builtins)
}
